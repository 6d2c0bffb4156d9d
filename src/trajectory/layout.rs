//! Gas trajectory column layout
//!
//! Column 0 is time, then four columns per particle in the order
//! x, y, vx, vy. Particle `i` owns columns `1+4i ..= 4+4i`.
//! The particle count is `(columns - 1) / 4`; a remainder is not an error,
//! the trailing columns are simply ignored.

use log::warn;

use crate::trajectory::table::TrajectoryTable;

pub const FIELDS_PER_PARTICLE: usize = 4;

pub fn particle_count(n_cols: usize) -> usize {
    n_cols.saturating_sub(1) / FIELDS_PER_PARTICLE
}

pub fn x_col(i: usize) -> usize {
    1 + FIELDS_PER_PARTICLE * i
}

pub fn y_col(i: usize) -> usize {
    2 + FIELDS_PER_PARTICLE * i
}

pub fn vx_col(i: usize) -> usize {
    3 + FIELDS_PER_PARTICLE * i
}

pub fn vy_col(i: usize) -> usize {
    4 + FIELDS_PER_PARTICLE * i
}

/// Particle owning column `c`, `None` for the time column
pub fn particle_of_column(c: usize) -> Option<usize> {
    (c >= 1).then(|| (c - 1) / FIELDS_PER_PARTICLE)
}

/// `# t x0 y0 vx0 vy0 x1 ...` for `n` particles
pub fn header_line(n: usize) -> String {
    let mut line = String::from("# t");
    for i in 0..n {
        line.push_str(&format!(" x{i} y{i} vx{i} vy{i}"));
    }
    line
}

/// Per-particle view over a gas trajectory table
#[derive(Debug, Clone, Copy)]
pub struct GasFrames<'a> {
    table: &'a TrajectoryTable,
    n: usize,
}

impl<'a> GasFrames<'a> {
    pub fn new(table: &'a TrajectoryTable) -> Self {
        let cols = table.n_cols();
        let n = particle_count(cols);
        let extra = cols.saturating_sub(1) % FIELDS_PER_PARTICLE;
        if extra != 0 {
            warn!("{} columns is not 1 + 4N, ignoring {} trailing column(s)", cols, extra);
        }
        Self { table, n }
    }

    pub fn table(&self) -> &'a TrajectoryTable {
        self.table
    }

    pub fn n_particles(&self) -> usize {
        self.n
    }

    pub fn n_frames(&self) -> usize {
        self.table.n_rows()
    }

    fn pair_series(&self, i: usize, a: usize, b: usize) -> Option<(Vec<f64>, Vec<f64>)> {
        if i >= self.n {
            return None;
        }
        let data = self.table.data();
        Some((data.column(a).to_vec(), data.column(b).to_vec()))
    }

    fn frame_pairs(&self, k: usize, a: fn(usize) -> usize, b: fn(usize) -> usize) -> Option<Vec<(f64, f64)>> {
        let row = self.table.row(k)?;
        Some((0..self.n).map(|i| (row[a(i)], row[b(i)])).collect())
    }

    /// (x, y) series of particle `i`, `None` past the last particle
    pub fn positions(&self, i: usize) -> Option<(Vec<f64>, Vec<f64>)> {
        self.pair_series(i, x_col(i), y_col(i))
    }

    /// (vx, vy) series of particle `i`, `None` past the last particle
    pub fn velocities(&self, i: usize) -> Option<(Vec<f64>, Vec<f64>)> {
        self.pair_series(i, vx_col(i), vy_col(i))
    }

    /// (x, y) of every particle in frame `k`, `None` past the last frame
    pub fn frame_positions(&self, k: usize) -> Option<Vec<(f64, f64)>> {
        self.frame_pairs(k, x_col, y_col)
    }

    /// (vx, vy) of every particle in frame `k`, `None` past the last frame
    pub fn frame_velocities(&self, k: usize) -> Option<Vec<(f64, f64)>> {
        self.frame_pairs(k, vx_col, vy_col)
    }
}
