//! Rectangular sampling domain for field evaluation

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{FieldError, Result};

/// Bounds and resolution as they appear in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub nx: usize,
    pub ny: usize,
}

impl GridSpec {
    pub fn build(&self) -> Result<SampleGrid> {
        SampleGrid::new(self.x_min, self.x_max, self.y_min, self.y_max, self.nx, self.ny)
    }
}

/// Immutable 2D grid; the field is sampled at every `(xs[i], ys[j])`.
///
/// Coordinate arrays are shared, so clones handed to each frame or field
/// point at the same samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    spec: GridSpec,
    xs: Arc<[f64]>,
    ys: Arc<[f64]>,
}

impl SampleGrid {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64, nx: usize, ny: usize) -> Result<Self> {
        check_axis("x", x_min, x_max, nx)?;
        check_axis("y", y_min, y_max, ny)?;

        Ok(Self {
            spec: GridSpec {
                x_min,
                x_max,
                y_min,
                y_max,
                nx,
                ny,
            },
            xs: linspace(x_min, x_max, nx).into(),
            ys: linspace(y_min, y_max, ny).into(),
        })
    }

    pub fn spec(&self) -> GridSpec {
        self.spec
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn nx(&self) -> usize {
        self.spec.nx
    }

    pub fn ny(&self) -> usize {
        self.spec.ny
    }

    /// Field shape as `(rows, cols)` = `(ny, nx)`
    pub fn shape(&self) -> (usize, usize) {
        (self.spec.ny, self.spec.nx)
    }

    /// `(x_min, x_max, y_min, y_max)`
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (self.spec.x_min, self.spec.x_max, self.spec.y_min, self.spec.y_max)
    }

    /// Width over height of the physical domain
    pub fn aspect(&self) -> f64 {
        (self.spec.x_max - self.spec.x_min) / (self.spec.y_max - self.spec.y_min)
    }

    /// Index of the row whose y sample is closest to `y`
    pub fn nearest_row(&self, y: f64) -> usize {
        nearest_index(&self.ys, y)
    }

    /// Index of the column whose x sample is closest to `x`
    pub fn nearest_col(&self, x: f64) -> usize {
        nearest_index(&self.xs, x)
    }
}

fn check_axis(axis: &str, min: f64, max: f64, n: usize) -> Result<()> {
    if n == 0 {
        return Err(FieldError::invalid(format!("{axis} sample count must be positive")));
    }
    if !(min.is_finite() && max.is_finite()) || min >= max {
        return Err(FieldError::invalid(format!(
            "{axis} range must satisfy min < max, got [{min}, {max}]"
        )));
    }
    Ok(())
}

/// `n` evenly spaced samples from `min` to `max` inclusive
pub fn linspace(min: f64, max: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![min],
        _ => {
            let step = (max - min) / (n - 1) as f64;
            // Pin the last sample so it is exactly `max`
            (0..n)
                .map(|i| if i == n - 1 { max } else { min + i as f64 * step })
                .collect()
        }
    }
}

fn nearest_index(samples: &[f64], value: f64) -> usize {
    samples
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(-10.0, 10.0, 500);
        assert_eq!(xs.len(), 500);
        assert_eq!(xs[0], -10.0);
        assert_eq!(xs[499], 10.0);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_grid_shape() {
        let grid = SampleGrid::new(-10.0, 10.0, 0.0, 5.0, 500, 250).unwrap();
        assert_eq!(grid.shape(), (250, 500));
        assert_eq!(grid.xs().len(), 500);
        assert_eq!(grid.ys().len(), 250);
        assert!((grid.aspect() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_grids() {
        assert!(SampleGrid::new(0.0, 1.0, 0.0, 1.0, 0, 10).is_err());
        assert!(SampleGrid::new(0.0, 1.0, 0.0, 1.0, 10, 0).is_err());
        assert!(SampleGrid::new(1.0, 1.0, 0.0, 1.0, 10, 10).is_err());
        assert!(SampleGrid::new(0.0, 1.0, 2.0, -1.0, 10, 10).is_err());
    }

    #[test]
    fn test_nearest_row() {
        let grid = SampleGrid::new(-1.0, 1.0, 0.0, 5.0, 3, 251).unwrap();
        assert_eq!(grid.nearest_row(5.0), 250);
        assert_eq!(grid.nearest_row(0.0), 0);
        assert_eq!(grid.nearest_row(2.5), 125);
        assert_eq!(grid.nearest_col(100.0), 2);
    }
}
