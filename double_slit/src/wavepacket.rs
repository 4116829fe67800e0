//! Free-particle Gaussian wave packet
//!
//! Closed-form solution of the free Schrödinger equation for a packet that
//! starts as a real Gaussian of width parameter `a`:
//!
//! ```text
//! γ(t) = √(1 + 2iℏat/m)
//! ψ(r,t) = (2a/π)^¼ / γ(t) · exp(-a r² / γ(t)²)
//! ```
//!
//! The solution is exact in time; only the spatial sampling of a grid adds error.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::error::{FieldError, Result};

/// Fixed parameters of the simulated particle, shared by every emitter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Reduced Planck constant
    pub hbar: f64,
    /// Particle mass
    pub mass: f64,
    /// Inverse squared width of the initial Gaussian
    pub packet_width: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            hbar: 1.0,
            mass: 1.0,
            packet_width: 1.0,
        }
    }
}

impl PhysicalConstants {
    pub fn new(hbar: f64, mass: f64, packet_width: f64) -> Result<Self> {
        let constants = Self {
            hbar,
            mass,
            packet_width,
        };
        constants.validate()?;
        Ok(constants)
    }

    /// Natural units with the given width parameter
    pub fn natural(packet_width: f64) -> Result<Self> {
        Self::new(1.0, 1.0, packet_width)
    }

    pub fn validate(&self) -> Result<()> {
        check_positive("hbar", self.hbar)?;
        check_positive("mass", self.mass)?;
        check_positive("packet width", self.packet_width)
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::invalid(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

/// Time-dependent part of the packet, fixed for one `(constants, t)` pair.
///
/// Every grid point of a frame shares `γ(t)`, so it is computed once here and
/// each evaluation costs a single complex exponential.
#[derive(Debug, Clone, Copy)]
pub struct PacketPropagator {
    packet_width: f64,
    gamma: Complex64,
    prefactor: Complex64,
    inv_gamma_sq: Complex64,
}

impl PacketPropagator {
    pub fn new(constants: &PhysicalConstants, t: f64) -> Result<Self> {
        constants.validate()?;
        if !t.is_finite() {
            return Err(FieldError::invalid(format!("time must be finite, got {t}")));
        }

        let a = constants.packet_width;
        // γ² = 1 + 2iℏat/m
        let gamma_sq = Complex64::new(1.0, 2.0 * constants.hbar * a * t / constants.mass);
        let gamma = gamma_sq.sqrt();
        let prefactor = Complex64::new((2.0 * a / PI).powf(0.25), 0.0) / gamma;

        Ok(Self {
            packet_width: a,
            gamma,
            prefactor,
            inv_gamma_sq: gamma_sq.inv(),
        })
    }

    /// Principal root γ(t)
    pub fn gamma(&self) -> Complex64 {
        self.gamma
    }

    /// ψ at distance `r` from the packet center
    pub fn amplitude(&self, r: f64) -> Complex64 {
        self.amplitude_sq_dist(r * r)
    }

    /// ψ given the squared distance, skipping the square root
    pub fn amplitude_sq_dist(&self, r_sq: f64) -> Complex64 {
        self.prefactor * (self.inv_gamma_sq * (-self.packet_width * r_sq)).exp()
    }

    /// |ψ|² at the packet center: √(2a/π) / |γ|²
    pub fn peak_density(&self) -> f64 {
        self.prefactor.norm_sqr()
    }
}

/// Evaluate a single packet at distance `r` and time `t`
pub fn evaluate_single(r: f64, t: f64, constants: &PhysicalConstants) -> Result<Complex64> {
    Ok(PacketPropagator::new(constants, t)?.amplitude(r))
}
