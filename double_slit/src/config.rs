//! Scene configuration and presets
//!
//! A scene fixes everything except the time value: constants, grid, slit
//! layout and motion, and display ranges. Presets reproduce the setups of the
//! web view, the interactive window and the frame exporter.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants;
use crate::error::{FieldError, Result};
use crate::field::{Detector, EvaluationRequest};
use crate::grid::{GridSpec, SampleGrid};
use crate::slits::{Emitter, Motion, SlitLayout};
use crate::wavepacket::PhysicalConstants;

/// How a field is turned into pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Densities at or above this map to white
    pub clim: f64,
    /// Upper bound of the profile panel
    pub profile_max: f64,
    pub detector: Detector,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            clim: 0.3,
            profile_max: 0.3,
            detector: Detector::Average,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub constants: PhysicalConstants,
    pub grid: GridSpec,
    pub layout: SlitLayout,
    /// Height of the slit row at t = 0
    #[serde(default)]
    pub y0: f64,
    #[serde(default)]
    pub motion: Motion,
    #[serde(default)]
    pub time: f64,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Web,
    Interactive,
    Pixels,
    Diverging,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Web,
        Preset::Interactive,
        Preset::Pixels,
        Preset::Diverging,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Web => "web",
            Preset::Interactive => "interactive",
            Preset::Pixels => "pixels",
            Preset::Diverging => "diverging",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| FieldError::invalid(format!("unknown preset '{name}'")))
    }

    pub fn config(self) -> SceneConfig {
        match self {
            Preset::Web => SceneConfig::web(2, 2.0, 1.0),
            Preset::Interactive => SceneConfig::interactive(),
            Preset::Pixels => SceneConfig::pixels(),
            Preset::Diverging => SceneConfig::diverging(),
        }
    }
}

const PRESET_CONSTANTS: PhysicalConstants = PhysicalConstants {
    hbar: constants::HBAR,
    mass: constants::MASS,
    packet_width: constants::PACKET_WIDTH,
};

const PIXELS_GRID: GridSpec = GridSpec {
    x_min: -5.0,
    x_max: 5.0,
    y_min: 0.0,
    y_max: 5.0,
    nx: 500,
    ny: 250,
};

impl SceneConfig {
    /// `n` equally spaced slits drifting up at `v` on the wide web grid
    pub fn web(n: usize, spacing: f64, v: f64) -> Self {
        Self {
            constants: PRESET_CONSTANTS,
            grid: GridSpec {
                x_min: -15.0,
                x_max: 15.0,
                y_min: 0.0,
                y_max: 15.0,
                nx: 500,
                ny: 250,
            },
            layout: SlitLayout::Equal { count: n, spacing },
            y0: 0.0,
            motion: Motion::drift(v),
            time: 0.0,
            display: DisplayConfig::default(),
        }
    }

    /// Three independently placed slits
    pub fn interactive() -> Self {
        Self {
            constants: PRESET_CONSTANTS,
            grid: GridSpec {
                x_min: -10.0,
                x_max: 10.0,
                y_min: 0.0,
                y_max: 5.0,
                nx: 500,
                ny: 250,
            },
            layout: SlitLayout::Explicit {
                positions: vec![-3.0, 3.0, 0.0],
            },
            y0: 0.0,
            motion: Motion::drift(1.0),
            time: 0.0,
            display: DisplayConfig {
                clim: 0.3,
                profile_max: 1.0,
                detector: Detector::LastRow,
            },
        }
    }

    /// Classic double slit at x = ±1
    pub fn pixels() -> Self {
        Self {
            constants: PRESET_CONSTANTS,
            grid: PIXELS_GRID,
            layout: SlitLayout::Explicit {
                positions: vec![-1.0, 1.0],
            },
            y0: 0.0,
            motion: Motion::drift(1.0),
            time: 0.0,
            display: DisplayConfig {
                clim: 0.3,
                profile_max: 0.17,
                detector: Detector::LastRow,
            },
        }
    }

    /// Double slit whose slits separate while rising
    pub fn diverging() -> Self {
        Self {
            motion: Motion {
                vx: 0.0,
                vy: 2.0,
                spread: 1.0,
            },
            ..Self::pixels()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn emitters(&self) -> Result<Vec<Emitter>> {
        self.layout.emitters(self.y0, &self.motion)
    }

    pub fn build_grid(&self) -> Result<SampleGrid> {
        self.grid.build()
    }

    /// Request at the configured time
    pub fn request(&self) -> Result<EvaluationRequest> {
        self.request_on(&self.build_grid()?, self.time)
    }

    /// Request on an existing grid at time `t`
    pub fn request_on(&self, grid: &SampleGrid, t: f64) -> Result<EvaluationRequest> {
        self.constants.validate()?;
        Ok(EvaluationRequest::new(
            self.constants,
            grid.clone(),
            self.emitters()?,
            t,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_build() {
        for preset in Preset::ALL {
            let config = preset.config();
            let request = config.request().unwrap();
            assert!(request.validate().is_ok(), "{}", preset.name());
            assert_eq!(Preset::from_name(preset.name()).unwrap(), preset);
        }
        assert!(Preset::from_name("nope").is_err());
    }

    #[test]
    fn test_web_layout() {
        let config = SceneConfig::web(3, 2.0, 1.0);
        let xs: Vec<f64> = config.emitters().unwrap().iter().map(|e| e.x0).collect();
        assert_eq!(xs, vec![-2.0, 0.0, 2.0]);
    }

    #[test]
    fn test_json_roundtrip_and_defaults() {
        let json = r#"{
            "constants": { "hbar": 1.0, "mass": 1.0, "packet_width": 1.0 },
            "grid": { "x_min": -10.0, "x_max": 10.0, "y_min": 0.0, "y_max": 5.0, "nx": 50, "ny": 25 },
            "layout": { "kind": "equal", "count": 2, "spacing": 2.0 },
            "motion": { "vy": 1.0 }
        }"#;
        let config = SceneConfig::from_json_str(json).unwrap();
        assert_eq!(config.time, 0.0);
        assert_eq!(config.motion, Motion::drift(1.0));
        assert_eq!(config.display, DisplayConfig::default());

        let again = SceneConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SceneConfig::pixels();
        config.constants.mass = 0.0;
        assert!(config.request().unwrap_err().is_invalid_parameter());

        let mut config = SceneConfig::pixels();
        config.grid.nx = 0;
        assert!(config.request().unwrap_err().is_invalid_parameter());

        assert!(matches!(
            SceneConfig::from_json_str("{ not json"),
            Err(FieldError::Config(_))
        ));
    }
}
