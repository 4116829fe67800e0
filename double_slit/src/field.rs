//! Multi-slit superposition on a sample grid
//!
//! Every emitter contributes one free Gaussian packet centered on its
//! position at time `t`. Contributions are summed coherently, divided by
//! `√n` and squared:
//!
//! ```text
//! ψ_total(x,y,t) = Σ ψ(|(x,y) - p_i(t)|, t) / √n
//! ρ(x,y,t)       = |ψ_total|²
//! ```

use ndarray::Array2;
use num_complex::Complex64;
use rayon::prelude::*;

use crate::error::{FieldError, Result};
use crate::grid::SampleGrid;
use crate::slits::Emitter;
use crate::wavepacket::{PacketPropagator, PhysicalConstants};

/// One complete set of inputs for a field evaluation
#[derive(Debug, Clone)]
pub struct EvaluationRequest {
    pub constants: PhysicalConstants,
    pub grid: SampleGrid,
    pub emitters: Vec<Emitter>,
    pub time: f64,
}

impl EvaluationRequest {
    pub fn new(
        constants: PhysicalConstants,
        grid: SampleGrid,
        emitters: Vec<Emitter>,
        time: f64,
    ) -> Self {
        Self {
            constants,
            grid,
            emitters,
            time,
        }
    }

    /// Same geometry at another time
    pub fn at_time(&self, time: f64) -> Self {
        Self {
            time,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.constants.validate()?;
        if self.emitters.is_empty() {
            return Err(FieldError::invalid("at least one emitter is required"));
        }
        if !self.time.is_finite() {
            return Err(FieldError::invalid(format!(
                "time must be finite, got {}",
                self.time
            )));
        }
        for (i, e) in self.emitters.iter().enumerate() {
            if ![e.x0, e.y0, e.vx, e.vy].iter().all(|v| v.is_finite()) {
                return Err(FieldError::invalid(format!("emitter {i} has a non-finite coordinate")));
            }
        }
        Ok(())
    }
}

/// Evaluate `f(ψ_total)` at every grid point, rows in parallel
fn evaluate_grid<T, F>(request: &EvaluationRequest, f: F) -> Result<Array2<T>>
where
    T: Copy + Default + Send,
    F: Fn(Complex64) -> T + Sync,
{
    request.validate()?;
    let propagator = PacketPropagator::new(&request.constants, request.time)?;

    let centers: Vec<(f64, f64)> = request
        .emitters
        .iter()
        .map(|e| e.position_at(request.time))
        .collect();
    let norm = 1.0 / (centers.len() as f64).sqrt();

    let grid = &request.grid;
    let (ny, nx) = grid.shape();
    let xs = grid.xs();

    log::debug!(
        "superposing {} emitters on {}x{} grid at t={:.3}",
        centers.len(),
        nx,
        ny,
        request.time
    );

    let mut data = vec![T::default(); nx * ny];
    data.par_chunks_mut(nx)
        .zip(grid.ys().par_iter())
        .for_each(|(row, &y)| {
            for (cell, &x) in row.iter_mut().zip(xs) {
                let mut psi = Complex64::new(0.0, 0.0);
                for &(cx, cy) in &centers {
                    let dx = x - cx;
                    let dy = y - cy;
                    psi += propagator.amplitude_sq_dist(dx * dx + dy * dy);
                }
                *cell = f(psi * norm);
            }
        });

    Array2::from_shape_vec((ny, nx), data)
        .map_err(|e| FieldError::invalid(format!("field shape mismatch: {e}")))
}

/// Normalized complex amplitude ψ_total on the grid
pub fn superpose_amplitude(request: &EvaluationRequest) -> Result<AmplitudeField> {
    let values = evaluate_grid(request, |psi| psi)?;
    Ok(AmplitudeField {
        values,
        grid: request.grid.clone(),
        time: request.time,
    })
}

/// Probability density |ψ_total|² on the grid
pub fn superpose(request: &EvaluationRequest) -> Result<DensityField> {
    let values = evaluate_grid(request, |psi| psi.norm_sqr())?;
    Ok(DensityField {
        values,
        grid: request.grid.clone(),
        time: request.time,
    })
}

fn check_row(grid: &SampleGrid, row: usize) -> Result<()> {
    if row >= grid.ny() {
        return Err(FieldError::invalid(format!(
            "detector row {row} outside grid with {} rows",
            grid.ny()
        )));
    }
    Ok(())
}

/// Complex amplitude field, shape `(ny, nx)`
#[derive(Debug, Clone)]
pub struct AmplitudeField {
    values: Array2<Complex64>,
    grid: SampleGrid,
    time: f64,
}

impl AmplitudeField {
    pub fn values(&self) -> &Array2<Complex64> {
        &self.values
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Amplitudes along one row
    pub fn row(&self, row: usize) -> Result<Vec<Complex64>> {
        check_row(&self.grid, row)?;
        Ok(self.values.row(row).to_vec())
    }

    pub fn density(&self) -> DensityField {
        DensityField {
            values: self.values.mapv(|c| c.norm_sqr()),
            grid: self.grid.clone(),
            time: self.time,
        }
    }
}

/// Which 1D view of the field stands in for the detector screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detector {
    /// Last row, the screen farthest from the slits
    LastRow,
    /// Mean over all rows for each column
    Average,
}

/// Probability density field, shape `(ny, nx)`, rows indexed by y
#[derive(Debug, Clone)]
pub struct DensityField {
    values: Array2<f64>,
    grid: SampleGrid,
    time: f64,
}

impl DensityField {
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn grid(&self) -> &SampleGrid {
        &self.grid
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values.get((row, col)).copied()
    }

    pub fn row(&self, row: usize) -> Result<Vec<f64>> {
        check_row(&self.grid, row)?;
        Ok(self.values.row(row).to_vec())
    }

    /// Row closest to the screen at height `y`
    pub fn row_nearest(&self, y: f64) -> Vec<f64> {
        self.values.row(self.grid.nearest_row(y)).to_vec()
    }

    /// Mean over all rows for each column
    pub fn column_average(&self) -> Vec<f64> {
        let rows = self.values.nrows() as f64;
        self.values
            .columns()
            .into_iter()
            .map(|col| col.sum() / rows)
            .collect()
    }

    pub fn detector(&self, detector: Detector) -> Vec<f64> {
        match detector {
            Detector::LastRow => self.values.row(self.values.nrows() - 1).to_vec(),
            Detector::Average => self.column_average(),
        }
    }

    /// Largest density and its `(row, col)`
    pub fn max(&self) -> (f64, (usize, usize)) {
        self.values
            .indexed_iter()
            .fold((f64::NEG_INFINITY, (0, 0)), |best, (idx, &v)| {
                if v > best.0 {
                    (v, idx)
                } else {
                    best
                }
            })
    }

    /// Grid coordinates `(x, y)` of the largest density
    pub fn argmax_position(&self) -> (f64, f64) {
        let (_, (row, col)) = self.max();
        (self.grid.xs()[col], self.grid.ys()[row])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_request(emitters: Vec<Emitter>, time: f64) -> EvaluationRequest {
        let grid = SampleGrid::new(-3.0, 3.0, 0.0, 2.0, 31, 11).unwrap();
        EvaluationRequest::new(PhysicalConstants::default(), grid, emitters, time)
    }

    #[test]
    fn test_density_matches_amplitude() {
        let request = small_request(vec![Emitter::at(-1.0, 0.0), Emitter::at(1.0, 0.0)], 0.4);
        let density = superpose(&request).unwrap();
        let amplitude = superpose_amplitude(&request).unwrap().density();
        for (a, b) in density.values().iter().zip(amplitude.values().iter()) {
            assert!((a - b).abs() < 1e-14);
        }
    }

    #[test]
    fn test_empty_emitters_rejected() {
        let err = superpose(&small_request(vec![], 0.0)).unwrap_err();
        assert!(err.is_invalid_parameter());
    }

    #[test]
    fn test_detector_views() {
        let request = small_request(vec![Emitter::at(0.0, 0.0)], 0.0);
        let field = superpose(&request).unwrap();
        assert_eq!(field.shape(), (11, 31));
        assert_eq!(field.row(10).unwrap(), field.detector(Detector::LastRow));
        assert_eq!(field.row_nearest(2.0), field.row(10).unwrap());
        assert!(field.row(11).is_err());

        let avg = field.column_average();
        assert_eq!(avg.len(), 31);
        let manual: f64 = (0..11).map(|r| field.get(r, 15).unwrap()).sum::<f64>() / 11.0;
        assert!((avg[15] - manual).abs() < 1e-14);
    }

    #[test]
    fn test_max_at_single_emitter() {
        let request = small_request(vec![Emitter::at(0.0, 0.0)], 0.0);
        let field = superpose(&request).unwrap();
        let (_, (row, col)) = field.max();
        assert_eq!((row, col), (0, 15));
        assert_eq!(field.argmax_position(), (0.0, 0.0));
    }

    #[test]
    fn test_at_time_keeps_geometry() {
        let request = small_request(vec![Emitter::at(0.0, 0.0).with_drift(1.0)], 0.0);
        let later = request.at_time(1.0);
        assert_eq!(later.emitters, request.emitters);
        assert_eq!(later.time, 1.0);
        let field = superpose(&later).unwrap();
        assert_eq!(field.grid().nearest_row(1.0), field.max().1 .0);
    }
}
