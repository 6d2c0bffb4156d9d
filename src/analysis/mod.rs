//! Derived quantities computed from loaded trajectories

pub mod energy;
pub mod velocity;
pub mod spectrum;
pub mod phase;

use ndarray::Array1;

/// `n` values evenly spaced over `[lo, hi]`, both ends included
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    Array1::linspace(lo, hi, n).to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_includes_both_ends() {
        let v = linspace(0.5, 2.0, 4);
        assert_eq!(v.len(), 4);
        assert_eq!(v[0], 0.5);
        assert!((v[3] - 2.0).abs() < 1e-12);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }
}
