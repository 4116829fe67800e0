//! Emitters ("slits") and their layout helpers

use serde::{Deserialize, Serialize};

use crate::error::{FieldError, Result};

/// Point source of a wave packet, optionally drifting at constant velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub x0: f64,
    pub y0: f64,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
}

impl Emitter {
    /// Stationary emitter
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x0: x,
            y0: y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    /// Vertical drift: `y(t) = y0 + v·t`
    pub fn with_drift(mut self, v: f64) -> Self {
        self.vy = v;
        self
    }

    pub fn with_velocity(mut self, vx: f64, vy: f64) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Center of the packet at time `t`
    pub fn position_at(&self, t: f64) -> (f64, f64) {
        (self.x0 + self.vx * t, self.y0 + self.vy * t)
    }
}

/// `n` positions centered on 0 with pitch `spacing`
pub fn equally_spaced_positions(n: usize, spacing: f64) -> Vec<f64> {
    let start = -((n as f64) - 1.0) * spacing / 2.0;
    (0..n).map(|i| start + i as f64 * spacing).collect()
}

/// Shared motion of a slit row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Motion {
    /// Common horizontal velocity
    #[serde(default)]
    pub vx: f64,
    /// Common vertical drift
    #[serde(default)]
    pub vy: f64,
    /// Outward horizontal speed, signed by which side of x = 0 a slit sits
    #[serde(default)]
    pub spread: f64,
}

impl Motion {
    pub fn drift(v: f64) -> Self {
        Self {
            vy: v,
            ..Self::default()
        }
    }

    fn velocity_for(&self, x0: f64) -> (f64, f64) {
        let outward = if x0 > 0.0 {
            self.spread
        } else if x0 < 0.0 {
            -self.spread
        } else {
            0.0
        };
        (self.vx + outward, self.vy)
    }
}

/// How the x coordinates of a slit row are chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlitLayout {
    /// Explicit x coordinates
    Explicit { positions: Vec<f64> },
    /// `count` slits centered on x = 0, `spacing` apart
    Equal { count: usize, spacing: f64 },
}

impl SlitLayout {
    pub fn positions(&self) -> Vec<f64> {
        match self {
            SlitLayout::Explicit { positions } => positions.clone(),
            SlitLayout::Equal { count, spacing } => equally_spaced_positions(*count, *spacing),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SlitLayout::Explicit { positions } => positions.len(),
            SlitLayout::Equal { count, .. } => *count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Emitters on the line `y = y0` moving with `motion`
    pub fn emitters(&self, y0: f64, motion: &Motion) -> Result<Vec<Emitter>> {
        let positions = self.positions();
        if positions.is_empty() {
            return Err(FieldError::invalid("slit layout has no emitters"));
        }
        if let Some(bad) = positions.iter().find(|x| !x.is_finite()) {
            return Err(FieldError::invalid(format!("slit position {bad} is not finite")));
        }
        Ok(positions
            .into_iter()
            .map(|x| {
                let (vx, vy) = motion.velocity_for(x);
                Emitter::at(x, y0).with_velocity(vx, vy)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equally_spaced_positions() {
        assert_eq!(equally_spaced_positions(3, 2.0), vec![-2.0, 0.0, 2.0]);
        assert_eq!(equally_spaced_positions(2, 2.0), vec![-1.0, 1.0]);
        assert_eq!(equally_spaced_positions(1, 5.0), vec![0.0]);
        assert!(equally_spaced_positions(0, 1.0).is_empty());
    }

    #[test]
    fn test_drift_moves_y_only() {
        let e = Emitter::at(-1.0, 0.0).with_drift(1.5);
        assert_eq!(e.position_at(0.0), (-1.0, 0.0));
        assert_eq!(e.position_at(2.0), (-1.0, 3.0));
    }

    #[test]
    fn test_layout_emitters() {
        let layout = SlitLayout::Equal {
            count: 3,
            spacing: 1.0,
        };
        let emitters = layout.emitters(0.5, &Motion::drift(1.0)).unwrap();
        assert_eq!(emitters.len(), 3);
        assert_eq!(emitters[0].position_at(1.0), (-1.0, 1.5));

        let empty = SlitLayout::Explicit { positions: vec![] };
        assert!(empty.emitters(0.0, &Motion::default()).is_err());
    }

    #[test]
    fn test_spread_moves_slits_apart() {
        let layout = SlitLayout::Explicit {
            positions: vec![-1.0, 0.0, 1.0],
        };
        let motion = Motion {
            vx: 0.0,
            vy: 2.0,
            spread: 1.0,
        };
        let emitters = layout.emitters(0.0, &motion).unwrap();
        assert_eq!(emitters[0].position_at(1.0), (-2.0, 2.0));
        assert_eq!(emitters[1].position_at(1.0), (0.0, 2.0));
        assert_eq!(emitters[2].position_at(1.0), (2.0, 2.0));
    }
}
