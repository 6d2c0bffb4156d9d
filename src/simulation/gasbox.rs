//! Hard-disk gas in a rectangular box
//!
//! Balls fly freely (or under a uniform field), bounce specularly off the
//! four walls and collide elastically with each other. Collision detection
//! is the plain all-pairs O(N²) sweep after each drift.
//!
//! A full run writes a whitespace-separated trajectory whose column layout
//! is described in [`crate::trajectory::layout`].

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::configuration::config::IntegratorConfig;
use crate::error::{Error, Result};
use crate::simulation::forces::AccelSet;
use crate::simulation::integrator::{euler_integrator, verlet_integrator};
use crate::simulation::params::GasParameters;
use crate::simulation::states::{Ball, GasBox};
use crate::trajectory::layout;

/// Placement attempts per ball before giving up in the random layout
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Pairs closer than this are treated as coincident and left alone
const COINCIDENT_EPS: f64 = 1e-10;

/// Extra separation added when pushing overlapping balls apart
const SEPARATION_SLACK: f64 = 1e-6;

/// Totals reported at the end of [`GasBox::run`]
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub frames: usize, // rows written, final state included
    pub steps: usize, // integration steps taken
    pub wall_hits: u64, // ball-wall bounces during the run
    pub wall_hit_rate: f64, // bounces per unit time, a pressure proxy
    pub initial_energy: f64,
    pub final_energy: f64,
}

impl RunSummary {
    /// Final energy as a percentage of the initial one
    pub fn conservation_pct(&self) -> f64 {
        100.0 * self.final_energy / self.initial_energy
    }
}

impl Ball {
    /// Reflect off the walls of a `w` x `h` box.
    /// Returns true when at least one wall was hit
    pub fn bounce_walls(&mut self, w: f64, h: f64) -> bool {
        let mut hit = false;
        let r = self.radius;

        // specular reflection: put the disc back on the wall, flip the normal component
        if self.x.x - r < 0.0 {
            self.x.x = r;
            self.v.x = -self.v.x;
            hit = true;
        }
        if self.x.x + r > w {
            self.x.x = w - r;
            self.v.x = -self.v.x;
            hit = true;
        }
        if self.x.y - r < 0.0 {
            self.x.y = r;
            self.v.y = -self.v.y;
            hit = true;
        }
        if self.x.y + r > h {
            self.x.y = h - r;
            self.v.y = -self.v.y;
            hit = true;
        }
        hit
    }

    /// Elastic collision with `other` along the line of centres.
    /// Does nothing unless the balls overlap and are approaching
    pub fn collide(&mut self, other: &mut Ball) {
        let r = other.x - self.x;
        let dist = r.norm();
        if dist >= self.radius + other.radius || dist < COINCIDENT_EPS {
            return;
        }

        let n = r / dist; // unit normal from self to other

        // normal component of the relative velocity; positive means separating
        let dvn = (other.v - self.v).dot(&n);
        if dvn > 0.0 {
            return;
        }

        // elastic impulse along n: J = 2 m1 m2 dvn / (m1 + m2)
        // v1 += J/m1 n, v2 -= J/m2 n; tangential components untouched
        let total = self.m + other.m;
        self.v += (2.0 * other.m * dvn / total) * n;
        other.v -= (2.0 * self.m * dvn / total) * n;

        // split the overlap evenly, plus slack so the pair is not re-detected next step
        let overlap = (self.radius + other.radius) - dist;
        if overlap > 0.0 {
            let sep = overlap / 2.0 + SEPARATION_SLACK;
            self.x -= sep * n;
            other.x += sep * n;
        }
    }
}

impl GasBox {
    /// Place `n` balls on a regular lattice with random velocities
    pub fn init_grid<R: Rng>(&mut self, n: usize, mass: f64, radius: f64, v_max: f64, rng: &mut R) {
        self.balls.clear();

        let cols = (n as f64).sqrt().ceil() as usize;
        let rows = (n as f64 / cols as f64).ceil() as usize;
        let dx = self.width / (cols + 1) as f64;
        let dy = self.height / (rows + 1) as f64;
        let vel = Uniform::new_inclusive(-v_max, v_max);

        'fill: for i in 0..rows {
            for j in 0..cols {
                if self.balls.len() == n {
                    break 'fill;
                }
                let x = (j + 1) as f64 * dx;
                let y = (i + 1) as f64 * dy;
                let vx = vel.sample(rng);
                let vy = vel.sample(rng);
                self.balls.push(Ball::new(x, y, vx, vy, mass, radius));
            }
        }

        info!("initialised {} particles on a grid", self.balls.len());
    }

    /// Place `n` balls uniformly at random without overlaps.
    /// A ball that cannot be placed after [`MAX_PLACEMENT_ATTEMPTS`] is skipped
    pub fn init_random<R: Rng>(&mut self, n: usize, mass: f64, radius: f64, v_max: f64, rng: &mut R) {
        self.balls.clear();

        let px = Uniform::new_inclusive(radius, self.width - radius);
        let py = Uniform::new_inclusive(radius, self.height - radius);
        let vel = Uniform::new_inclusive(-v_max, v_max);

        for i in 0..n {
            let placed = (0..MAX_PLACEMENT_ATTEMPTS).find_map(|_| {
                let candidate = Ball::new(px.sample(rng), py.sample(rng), 0.0, 0.0, mass, radius);
                if self.balls.iter().any(|b| candidate.overlaps(b)) {
                    None
                } else {
                    Some(candidate)
                }
            });

            match placed {
                Some(mut ball) => {
                    ball.v.x = vel.sample(rng);
                    ball.v.y = vel.sample(rng);
                    self.balls.push(ball);
                }
                None => warn!("could not place particle {}", i),
            }
        }

        info!("initialised {} particles at random", self.balls.len());
    }

    /// Resolve every overlapping, approaching pair once, in index order
    pub fn resolve_collisions(&mut self) {
        let n = self.balls.len();
        for i in 0..n {
            let (head, tail) = self.balls.split_at_mut(i + 1);
            let bi = &mut head[i];
            for bj in tail.iter_mut() {
                if bi.overlaps(bj) {
                    bi.collide(bj);
                }
            }
        }
    }

    /// Bounce every ball off the walls, counting balls that hit
    pub fn bounce_walls(&mut self) -> u64 {
        let (w, h) = (self.width, self.height);
        let hits = self.balls.iter_mut().filter_map(|b| b.bounce_walls(w, h).then_some(())).count() as u64;
        self.wall_hits += hits;
        hits
    }

    /// One full step: drift, walls, pair collisions
    pub fn evolve(&mut self, integrator: IntegratorConfig, forces: &AccelSet, dt: f64) {
        match integrator {
            IntegratorConfig::Euler => euler_integrator(self, forces, dt),
            _ => verlet_integrator(self, forces, dt),
        }
        self.bounce_walls();
        self.resolve_collisions();
    }

    /// Append the current state as one trajectory row
    pub fn write_frame<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        write!(out, "{}", self.t)?;
        for b in &self.balls {
            write!(out, " {} {} {} {}", b.x.x, b.x.y, b.v.x, b.v.y)?;
        }
        writeln!(out)
    }

    /// Integrate until `params.t_final`, writing a frame every `params.dt_out`
    /// and the final state unconditionally
    pub fn run<W: Write>(
        &mut self,
        integrator: IntegratorConfig,
        forces: &AccelSet,
        params: &GasParameters,
        out: &mut W,
    ) -> std::io::Result<RunSummary> {
        writeln!(out, "{}", layout::header_line(self.balls.len()))?;

        let initial_energy = self.total_energy();
        let hits_before = self.wall_hits;
        let t_start = self.t;
        let mut next_out = self.t;
        let mut frames = 0;
        let mut steps = 0;

        // progress every 10% of the run
        let progress_every = ((params.t_final / (10.0 * params.dt)).round() as usize).max(1);

        while self.t < params.t_final {
            if self.t >= next_out {
                self.write_frame(out)?;
                frames += 1;
                next_out += params.dt_out;
            }

            self.evolve(integrator, forces, params.dt);
            steps += 1;

            if steps % progress_every == 0 {
                info!("progress: {:.0}%", 100.0 * self.t / params.t_final);
            }
        }

        self.write_frame(out)?;
        frames += 1;
        out.flush()?;

        let wall_hits = self.wall_hits - hits_before;
        let elapsed = self.t - t_start;
        Ok(RunSummary {
            frames,
            steps,
            wall_hits,
            wall_hit_rate: if elapsed > 0.0 { wall_hits as f64 / elapsed } else { 0.0 },
            initial_energy,
            final_energy: self.total_energy(),
        })
    }

    /// [`GasBox::run`] into a file, creating parent directories
    pub fn run_to_file(
        &mut self,
        integrator: IntegratorConfig,
        forces: &AccelSet,
        params: &GasParameters,
        path: &Path,
    ) -> Result<RunSummary> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.run(integrator, forces, params, &mut writer)
            .map_err(|e| Error::io(path, e))
    }
}
