//! Multi-Slit Wave Packet Interference
//!
//! Evaluates the closed-form free Gaussian wave packet for a row of point
//! emitters ("slits"), superposes them coherently and exposes the probability
//! density on a sample grid. Around that core sit several views:
//!
//! - **Static figure**: profile panel over a grayscale heatmap, saved as PNG
//! - **Frame sequence**: one figure per time step for animations
//! - **Web view**: HTTP endpoints serving figures and detector profiles
//! - **Interactive window**: GPU heatmap with sliders for slits, drift and time

pub mod error;
pub mod wavepacket;
pub mod grid;
pub mod slits;
pub mod field;
pub mod config;
pub mod render;
pub mod frames;
pub mod renderer;
pub mod equations_ui;

pub use config::{DisplayConfig, Preset, SceneConfig};
pub use error::{FieldError, Result};
pub use field::{superpose, superpose_amplitude, AmplitudeField, DensityField, Detector, EvaluationRequest};
pub use grid::{GridSpec, SampleGrid};
pub use slits::{equally_spaced_positions, Emitter, Motion, SlitLayout};
pub use wavepacket::{evaluate_single, PacketPropagator, PhysicalConstants};

/// Default physical constants (natural units)
pub mod constants {
    /// Reduced Planck constant
    pub const HBAR: f64 = 1.0;

    /// Particle mass
    pub const MASS: f64 = 1.0;

    /// Packet width parameter used by the bundled presets
    pub const PACKET_WIDTH: f64 = 2.0;
}
