//! Kinetic energy of a gas trajectory and how well it is conserved

use ndarray::ArrayView1;

use crate::error::{Error, Result};
use crate::trajectory::layout::{vx_col, vy_col, GasFrames};
use crate::trajectory::table::TrajectoryTable;

/// Σ ½ m (vx² + vy²) over all particles, one value per frame
pub fn total_kinetic_energy(table: &TrajectoryTable, mass: f64) -> Vec<f64> {
    let n = GasFrames::new(table).n_particles();
    table
        .data()
        .rows()
        .into_iter()
        .map(|row| {
            (0..n)
                .map(|i| {
                    let (vx, vy) = (row[vx_col(i)], row[vy_col(i)]);
                    0.5 * mass * (vx * vx + vy * vy)
                })
                .sum()
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConservationStats {
    pub e0: f64,
    pub e_final: f64,
    pub mean: f64,
    pub std: f64, // population standard deviation
    pub relative_error_pct: f64, // |E_final - E0| / E0 * 100
    pub fluctuation_pct: f64, // std / mean * 100
}

impl ConservationStats {
    pub fn from_series(energy: &[f64]) -> Result<Self> {
        let (&e0, &e_final) = energy.first().zip(energy.last()).ok_or(Error::EmptyTable)?;
        if e0 == 0.0 {
            return Err(Error::ZeroReferenceEnergy);
        }

        let (mean, std) = mean_std(energy);
        let fluctuation_pct = if mean != 0.0 { std / mean * 100.0 } else { 0.0 };

        Ok(Self {
            e0,
            e_final,
            mean,
            std,
            relative_error_pct: (e_final - e0).abs() / e0 * 100.0,
            fluctuation_pct,
        })
    }
}

/// (E - E0) / E0 * 100 for every frame
pub fn relative_error_series(energy: &[f64]) -> Result<Vec<f64>> {
    let e0 = reference(energy)?;
    Ok(energy.iter().map(|e| (e - e0) / e0 * 100.0).collect())
}

/// E / E0 for every frame
pub fn normalized_series(energy: &[f64]) -> Result<Vec<f64>> {
    let e0 = reference(energy)?;
    Ok(energy.iter().map(|e| e / e0).collect())
}

fn reference(energy: &[f64]) -> Result<f64> {
    match energy.first() {
        None => Err(Error::EmptyTable),
        Some(&e0) if e0 == 0.0 => Err(Error::ZeroReferenceEnergy),
        Some(&e0) => Ok(e0),
    }
}

/// Mean and population standard deviation; (0, 0) for an empty slice
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    let view = ArrayView1::from(values);
    match view.mean() {
        Some(mean) => (mean, view.std(0.0)),
        None => (0.0, 0.0),
    }
}
