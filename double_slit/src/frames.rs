//! Animation frame sequences
//!
//! Frames are rendered independently, one figure per time value, and written
//! as numbered PNG files. Encoding them into a video is left to external tools.

use image::RgbImage;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::SceneConfig;
use crate::error::{FieldError, Result};
use crate::field::{superpose, superpose_amplitude, AmplitudeField};
use crate::grid::linspace;
use crate::render::{
    render_amplitude_profile, render_figure, render_line_panel, save_png, Colormap, Series, SERIES_COLORS,
};

/// Evenly spaced frame times from `start` to `end` inclusive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSchedule {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Default for FrameSchedule {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 4.99,
            count: 500,
        }
    }
}

impl FrameSchedule {
    pub fn new(start: f64, end: f64, count: usize) -> Result<Self> {
        let schedule = Self { start, end, count };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(FieldError::invalid("frame count must be positive"));
        }
        if !(self.start.is_finite() && self.end.is_finite()) || self.end < self.start {
            return Err(FieldError::invalid(format!(
                "frame times must satisfy start <= end, got [{}, {}]",
                self.start, self.end
            )));
        }
        Ok(())
    }

    pub fn times(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.count)
    }
}

/// File name for frame `index` at time `t`; the index keeps names unique
/// when neighbouring times round to the same label
pub fn frame_file_name(prefix: &str, index: usize, t: f64) -> String {
    format!("{prefix}_{index:04}_{t:06.3}.png")
}

/// Render `frame(t)` for every scheduled time and save it under `out_dir`
fn write_frames<F>(
    schedule: &FrameSchedule,
    out_dir: &Path,
    prefix: &str,
    mut frame: F,
) -> Result<Vec<PathBuf>>
where
    F: FnMut(f64) -> Result<RgbImage>,
{
    schedule.validate()?;
    std::fs::create_dir_all(out_dir)?;

    let mut written = Vec::with_capacity(schedule.count);
    for (i, t) in schedule.times().into_iter().enumerate() {
        let path = out_dir.join(frame_file_name(prefix, i, t));
        save_png(&frame(t)?, &path)?;
        log::debug!("wrote {}", path.display());
        written.push(path);
    }

    log::info!("wrote {} frames to {}", written.len(), out_dir.display());
    Ok(written)
}

/// Render every scheduled density figure into `out_dir`; paths come back in time order
pub fn export_frames(
    config: &SceneConfig,
    schedule: &FrameSchedule,
    out_dir: impl AsRef<Path>,
    colormap: Colormap,
) -> Result<Vec<PathBuf>> {
    schedule.validate()?;
    let grid = config.build_grid()?;
    let base = config.request_on(&grid, schedule.start)?;

    write_frames(schedule, out_dir.as_ref(), "double_slit", |t| {
        let field = superpose(&base.at_time(t))?;
        Ok(render_figure(&field, &config.display, colormap))
    })
}

/// ψ along the grid row nearest the slits at the field's time
pub fn slit_row_amplitude(config: &SceneConfig, field: &AmplitudeField) -> Result<Vec<Complex64>> {
    let slit_y = config.y0 + config.motion.vy * field.time();
    field.row(field.grid().nearest_row(slit_y))
}

/// Real and imaginary parts of ψ along the slit row, one panel per time.
/// The vertical range is fixed by the first frame, where the packets are
/// narrowest, so later frames show the decay.
pub fn export_amplitude_frames(
    config: &SceneConfig,
    schedule: &FrameSchedule,
    out_dir: impl AsRef<Path>,
    height: u32,
) -> Result<Vec<PathBuf>> {
    schedule.validate()?;
    let grid = config.build_grid()?;
    let base = config.request_on(&grid, schedule.start)?;
    let width = grid.nx() as u32;

    let first = slit_row_amplitude(config, &superpose_amplitude(&base)?)?;
    let limit = amplitude_limit(&first);

    write_frames(schedule, out_dir.as_ref(), "amplitude", |t| {
        let row = slit_row_amplitude(config, &superpose_amplitude(&base.at_time(t))?)?;
        Ok(render_amplitude_profile(&row, width, height, limit))
    })
}

/// Symmetric plot bound just above the largest |ψ|
pub fn amplitude_limit(values: &[Complex64]) -> f64 {
    values.iter().map(|c| c.norm()).fold(0.0, f64::max).max(1e-12) * 1.1
}

/// Detector profiles at several times overlaid in one panel
pub fn render_profile_snapshots(
    config: &SceneConfig,
    times: &[f64],
    width: u32,
    height: u32,
) -> Result<RgbImage> {
    let grid = config.build_grid()?;
    let base = config.request_on(&grid, config.time)?;

    let mut series = Vec::with_capacity(times.len());
    for (i, &t) in times.iter().enumerate() {
        let field = superpose(&base.at_time(t))?;
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        series.push(Series::new(field.detector(config.display.detector), color));
    }

    Ok(render_line_panel(&series, width, height, 0.0, config.display.profile_max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_times() {
        let schedule = FrameSchedule::new(0.0, 1.0, 5).unwrap();
        assert_eq!(schedule.times(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(FrameSchedule::default().times().len(), 500);
        assert!(FrameSchedule::new(1.0, 0.0, 3).is_err());
        assert!(FrameSchedule::new(0.0, 1.0, 0).is_err());
    }

    #[test]
    fn test_frame_file_name() {
        assert_eq!(frame_file_name("double_slit", 3, 0.5), "double_slit_0003_00.500.png");
        assert_eq!(frame_file_name("amplitude", 499, 4.99), "amplitude_0499_04.990.png");
        // Times that share a rounded label still get distinct names
        assert_ne!(frame_file_name("double_slit", 1, 0.001), frame_file_name("double_slit", 2, 0.001));
    }
}
