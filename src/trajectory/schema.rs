//! Named-column schemas for pendulum tables
//!
//! Pendulum files either carry a header (plain or `#`-commented) or follow
//! one of two positional conventions:
//! - 6 columns: `t, theta1, omega1, theta2, omega2, E`
//! - 8 columns: `t, theta1, omega1, theta2, omega2, E1, E2, E_total`
//!
//! The total energy goes by `ET`, `E_total` or `E` depending on the producer.

use crate::error::{Error, Result};
use crate::trajectory::table::TrajectoryTable;

pub const TOTAL_ENERGY_ALIASES: [&str; 3] = ["ET", "E_total", "E"];

const SWEEP_COLUMNS: [&str; 6] = ["t", "theta1", "omega1", "theta2", "omega2", "E"];
const FULL_COLUMNS: [&str; 8] = ["t", "theta1", "omega1", "theta2", "omega2", "E1", "E2", "E_total"];

/// Column indices of a pendulum table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendulumColumns {
    pub t: usize,
    pub theta1: usize,
    pub omega1: usize,
    pub theta2: usize,
    pub omega2: usize,
    pub e1: Option<usize>,
    pub e2: Option<usize>,
    pub e_total: Option<usize>,
}

impl PendulumColumns {
    pub fn resolve(table: &TrajectoryTable) -> Result<Self> {
        match table.names() {
            Some(names) => Self::from_names(names),
            None => {
                let positional: &[&str] = match table.n_cols() {
                    6 => &SWEEP_COLUMNS,
                    8 => &FULL_COLUMNS,
                    n => {
                        return Err(Error::MissingColumn(format!(
                            "header-less pendulum table needs 6 or 8 columns, found {}",
                            n
                        )))
                    }
                };
                let names: Vec<String> = positional.iter().map(|s| s.to_string()).collect();
                Self::from_names(&names)
            }
        }
    }

    pub fn from_names(names: &[String]) -> Result<Self> {
        let find = |name: &str| names.iter().position(|n| n == name);
        let require = |name: &str| find(name).ok_or_else(|| Error::MissingColumn(name.to_string()));

        Ok(Self {
            t: require("t")?,
            theta1: require("theta1")?,
            omega1: require("omega1")?,
            theta2: require("theta2")?,
            omega2: require("omega2")?,
            e1: find("E1"),
            e2: find("E2"),
            e_total: TOTAL_ENERGY_ALIASES.iter().find_map(|a| find(*a)),
        })
    }
}

/// Owned series of a pendulum run
#[derive(Debug, Clone)]
pub struct PendulumSeries {
    pub t: Vec<f64>,
    pub theta1: Vec<f64>,
    pub omega1: Vec<f64>,
    pub theta2: Vec<f64>,
    pub omega2: Vec<f64>,
    pub e1: Option<Vec<f64>>,
    pub e2: Option<Vec<f64>>,
    pub e_total: Option<Vec<f64>>,
}

impl PendulumSeries {
    pub fn from_table(table: &TrajectoryTable) -> Result<Self> {
        let cols = PendulumColumns::resolve(table)?;
        let opt = |c: Option<usize>| c.map(|i| table.column_at(i)).transpose();

        Ok(Self {
            t: table.column_at(cols.t)?,
            theta1: table.column_at(cols.theta1)?,
            omega1: table.column_at(cols.omega1)?,
            theta2: table.column_at(cols.theta2)?,
            omega2: table.column_at(cols.omega2)?,
            e1: opt(cols.e1)?,
            e2: opt(cols.e2)?,
            e_total: opt(cols.e_total)?,
        })
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Resonance curve: forcing frequency against peak amplitude of pendulum 1
#[derive(Debug, Clone)]
pub struct ResonanceSeries {
    pub omega_f: Vec<f64>,
    pub max_amp: Vec<f64>,
}

impl ResonanceSeries {
    /// Named `omega_f, max_amp_theta1`, or the first two columns without a header
    pub fn from_table(table: &TrajectoryTable) -> Result<Self> {
        if table.names().is_some() {
            return Ok(Self {
                omega_f: table.column("omega_f")?,
                max_amp: table.column("max_amp_theta1")?,
            });
        }
        Ok(Self {
            omega_f: table.column_at(0)?,
            max_amp: table.column_at(1)?,
        })
    }
}
