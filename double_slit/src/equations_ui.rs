//! egui panels for the interactive window
//!
//! A right-hand sidebar lists the wave packet equations; a bottom panel holds
//! the sliders that drive the field.

use egui::{Color32, Context, FontFamily, FontId, RichText};
use std::ops::RangeInclusive;

use crate::config::SceneConfig;

/// One formula shown in the sidebar
pub struct Equation {
    pub name: &'static str,
    pub formula: &'static str,
    pub description: &'static str,
}

const TITLE_COLOR: Color32 = Color32::from_rgb(100, 200, 255);
const SECTION_COLOR: Color32 = Color32::from_rgb(255, 200, 100);
const FORMULA_COLOR: Color32 = Color32::from_rgb(200, 220, 255);
const SYMBOL_COLOR: Color32 = Color32::from_rgb(150, 255, 150);

fn monospace(size: f32) -> FontId {
    FontId::new(size, FontFamily::Monospace)
}

/// Right-hand panel with collapsible equation and symbol sections
pub fn draw_equations_sidebar(
    ctx: &Context,
    title: &str,
    equations: &[Equation],
    variables: &[(&str, &str)],
) {
    egui::SidePanel::right("equations_panel")
        .min_width(260.0)
        .max_width(340.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading(RichText::new(title).color(TITLE_COLOR));
            });
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Equations").strong().color(SECTION_COLOR))
                .default_open(true)
                .show(ui, |ui| {
                    for eq in equations {
                        ui.group(|ui| {
                            ui.label(RichText::new(eq.name).strong().color(Color32::WHITE));
                            ui.label(RichText::new(eq.formula).font(monospace(16.0)).color(FORMULA_COLOR));
                            ui.label(RichText::new(eq.description).small().color(Color32::GRAY));
                        });
                        ui.add_space(6.0);
                    }
                });

            egui::CollapsingHeader::new(RichText::new("Symbols").strong().color(SECTION_COLOR))
                .default_open(true)
                .show(ui, |ui| {
                    egui::Grid::new("symbols").num_columns(2).spacing([12.0, 4.0]).show(ui, |ui| {
                        for (symbol, meaning) in variables {
                            ui.label(RichText::new(*symbol).font(monospace(14.0)).color(SYMBOL_COLOR));
                            ui.label(RichText::new(*meaning).color(Color32::LIGHT_GRAY));
                            ui.end_row();
                        }
                    });
                });
        });
}

pub const DOUBLE_SLIT_EQUATIONS: &[Equation] = &[
    Equation {
        name: "Spreading Factor",
        formula: "γ(t) = √(1 + 2iℏat/m)",
        description: "Principal branch, γ(0) = 1",
    },
    Equation {
        name: "Gaussian Packet",
        formula: "ψ(r,t) = (2a/π)^¼ / γ · e^(-ar²/γ²)",
        description: "Exact free-particle solution",
    },
    Equation {
        name: "Slit Position",
        formula: "y_i(t) = y₀ + v·t",
        description: "Emitters drift with the screen",
    },
    Equation {
        name: "Superposition",
        formula: "ψ = Σ ψ(|r - r_i|, t) / √n",
        description: "Coherent sum over n slits",
    },
    Equation {
        name: "Probability Density",
        formula: "ρ(x,y,t) = |ψ|²",
        description: "Interference fringes",
    },
];

pub const DOUBLE_SLIT_VARIABLES: &[(&str, &str)] = &[
    ("ψ", "Wavefunction"),
    ("ℏ", "Reduced Planck constant"),
    ("m", "Particle mass"),
    ("a", "Packet width parameter"),
    ("γ", "Complex spreading factor"),
    ("r_i", "Position of slit i"),
    ("v", "Slit drift velocity"),
    ("n", "Number of slits"),
];

/// Slider-backed parameters of the interactive view
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    pub slits: Vec<f64>,
    pub velocity: f64,
    pub time: f64,
    pub playing: bool,
    /// Simulated time per wall-clock second while playing
    pub speed: f64,
    pub slit_range: RangeInclusive<f64>,
    pub velocity_range: RangeInclusive<f64>,
    pub time_range: RangeInclusive<f64>,
}

/// Smallest range containing both `range` and `value`
fn widen(range: RangeInclusive<f64>, value: f64) -> RangeInclusive<f64> {
    if !value.is_finite() {
        return range;
    }
    range.start().min(value)..=range.end().max(value)
}

impl ControlState {
    pub const SLIT_RANGE: RangeInclusive<f64> = -5.0..=5.0;
    pub const VELOCITY_RANGE: RangeInclusive<f64> = 0.1..=5.0;
    pub const TIME_RANGE: RangeInclusive<f64> = 0.0..=5.0;

    pub fn new(slits: Vec<f64>, velocity: f64) -> Self {
        Self {
            slits,
            velocity,
            time: 0.0,
            playing: false,
            speed: 0.5,
            slit_range: Self::SLIT_RANGE,
            velocity_range: Self::VELOCITY_RANGE,
            time_range: Self::TIME_RANGE,
        }
    }

    /// Controls seeded from a scene; ranges grow to cover the grid and every
    /// configured value so loading never clamps the scene
    pub fn from_scene(scene: &SceneConfig) -> Self {
        let slits = scene.layout.positions();
        let (x_min, x_max) = (scene.grid.x_min, scene.grid.x_max);
        let slit_range = slits
            .iter()
            .fold(widen(widen(Self::SLIT_RANGE, x_min), x_max), |r, &x| widen(r, x));

        Self {
            time: scene.time,
            slit_range,
            velocity_range: widen(Self::VELOCITY_RANGE, scene.motion.vy),
            time_range: widen(Self::TIME_RANGE, scene.time),
            ..Self::new(slits, scene.motion.vy)
        }
    }

    /// Move time forward while playing, wrapping at the end of the range
    pub fn advance(&mut self, dt: f64) -> bool {
        if !self.playing {
            return false;
        }
        self.time += dt * self.speed;
        if self.time > *self.time_range.end() {
            self.time = *self.time_range.start();
        }
        true
    }

    /// Shift time by `dt`, staying inside the slider range
    pub fn step_time(&mut self, dt: f64) {
        self.time = (self.time + dt).clamp(*self.time_range.start(), *self.time_range.end());
    }
}

/// Bottom slider panel; returns true when a field parameter changed
pub fn draw_controls(ctx: &Context, controls: &mut ControlState) -> bool {
    let before = controls.clone();

    egui::TopBottomPanel::bottom("controls").show(ctx, |ui| {
        let slit_range = controls.slit_range.clone();
        ui.horizontal(|ui| {
            for (i, x) in controls.slits.iter_mut().enumerate() {
                ui.add(egui::Slider::new(x, slit_range.clone()).step_by(0.1).text(format!("slit {}", i + 1)));
            }
        });
        ui.horizontal(|ui| {
            ui.add(
                egui::Slider::new(&mut controls.velocity, controls.velocity_range.clone())
                    .step_by(0.1)
                    .text("v (velocity)"),
            );
            ui.add(egui::Slider::new(&mut controls.time, controls.time_range.clone()).text("t (time)"));
            let label = if controls.playing { "Pause" } else { "Play" };
            if ui.button(label).clicked() {
                controls.playing = !controls.playing;
            }
            ui.add(egui::Slider::new(&mut controls.speed, 0.05..=2.0).text("speed"));
        });
    });

    controls.slits != before.slits || controls.velocity != before.velocity || controls.time != before.time
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slits::SlitLayout;

    #[test]
    fn test_advance_wraps() {
        let mut controls = ControlState::new(vec![-1.0, 1.0], 1.0);
        assert!(!controls.advance(1.0));
        controls.playing = true;
        controls.speed = 1.0;
        controls.time = 4.9;
        assert!(controls.advance(0.2));
        assert_eq!(controls.time, 0.0);
    }

    #[test]
    fn test_from_scene_keeps_configured_values() {
        let mut scene = SceneConfig::interactive();
        scene.time = 7.5;
        scene.motion.vy = 6.0;
        scene.layout = SlitLayout::Explicit {
            positions: vec![-8.0, 0.0, 12.0],
        };

        let controls = ControlState::from_scene(&scene);
        assert_eq!(controls.time, 7.5);
        assert_eq!(controls.velocity, 6.0);
        assert_eq!(controls.slits, vec![-8.0, 0.0, 12.0]);

        // Slits span the grid extent and any slit outside it
        assert_eq!(controls.slit_range, -10.0..=12.0);
        assert_eq!(controls.velocity_range, 0.1..=6.0);
        assert_eq!(controls.time_range, 0.0..=7.5);
        for x in &controls.slits {
            assert!(controls.slit_range.contains(x));
        }
    }

    #[test]
    fn test_step_time_clamps() {
        let mut controls = ControlState::from_scene(&SceneConfig::pixels());
        controls.step_time(-1.0);
        assert_eq!(controls.time, 0.0);
        controls.step_time(100.0);
        assert_eq!(controls.time, 5.0);
    }
}
