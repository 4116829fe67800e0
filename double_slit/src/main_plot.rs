//! Static interference figure
//!
//! Evaluates one scene and writes the profile-over-heatmap figure as PNG.
//! Optional outputs: the real and imaginary amplitude along the slit row and
//! detector profiles at several times overlaid in one panel.

use clap::Parser;
use double_slit::render::{render_amplitude_profile, render_figure, save_png, Colormap};
use double_slit::frames::{amplitude_limit, render_profile_snapshots, slit_row_amplitude};
use double_slit::{superpose_amplitude, Motion, Preset, SceneConfig, SlitLayout};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "double_slit_plot")]
#[command(about = "Render a multi-slit interference figure to PNG")]
struct Args {
    /// Preset scene (web, interactive, pixels, diverging)
    #[arg(long, short = 'p', default_value = "web")]
    preset: String,

    /// Scene JSON file, overrides the preset
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Number of equally spaced slits
    #[arg(long, short = 'n')]
    slits: Option<usize>,

    /// Distance between neighbouring slits
    #[arg(long, short = 'd')]
    spacing: Option<f64>,

    /// Upward drift velocity of the slit row
    #[arg(long, short = 'v')]
    velocity: Option<f64>,

    #[arg(long, short = 't')]
    time: Option<f64>,

    #[arg(long, default_value = "gray")]
    colormap: String,

    #[arg(long, short = 'o', default_value = "double_slit.png")]
    out: PathBuf,

    /// Also write the real/imaginary amplitude along the slit row
    #[arg(long)]
    amplitude: Option<PathBuf>,

    /// Times for an overlaid detector profile panel, e.g. 0,0.5,1
    #[arg(long, value_delimiter = ',')]
    snapshots: Vec<f64>,

    #[arg(long, default_value = "snapshots.png")]
    snapshots_out: PathBuf,

    /// Print the resolved scene as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

/// Preset or file, then command-line overrides
fn resolve_scene(args: &Args) -> double_slit::Result<SceneConfig> {
    let mut scene = match &args.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => Preset::from_name(&args.preset)?.config(),
    };

    if args.slits.is_some() || args.spacing.is_some() {
        let (count, spacing) = match &scene.layout {
            SlitLayout::Equal { count, spacing } => (*count, *spacing),
            SlitLayout::Explicit { positions } => (positions.len(), 2.0),
        };
        scene.layout = SlitLayout::Equal {
            count: args.slits.unwrap_or(count),
            spacing: args.spacing.unwrap_or(spacing),
        };
    }
    if let Some(v) = args.velocity {
        scene.motion = Motion {
            vy: v,
            ..scene.motion
        };
    }
    if let Some(t) = args.time {
        scene.time = t;
    }
    Ok(scene)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let scene = resolve_scene(&args)?;
    if args.dump_config {
        println!("{}", scene.to_json_string()?);
        return Ok(());
    }

    let colormap = Colormap::from_name(&args.colormap)
        .ok_or_else(|| format!("unknown colormap '{}'", args.colormap))?;

    let request = scene.request()?;
    let amplitude = superpose_amplitude(&request)?;
    let field = amplitude.density();

    let (max, (x, y)) = (field.max().0, field.argmax_position());
    log::info!("t = {:.3}: max density {max:.5} at ({x:.3}, {y:.3})", scene.time);

    save_png(&render_figure(&field, &scene.display, colormap), &args.out)?;
    log::info!("wrote {}", args.out.display());

    if let Some(path) = &args.amplitude {
        let row = slit_row_amplitude(&scene, &amplitude)?;
        save_png(
            &render_amplitude_profile(&row, field.grid().nx() as u32, 300, amplitude_limit(&row)),
            path,
        )?;
        log::info!("wrote {}", path.display());
    }

    if !args.snapshots.is_empty() {
        let panel = render_profile_snapshots(&scene, &args.snapshots, field.grid().nx() as u32, 300)?;
        save_png(&panel, &args.snapshots_out)?;
        log::info!("wrote {}", args.snapshots_out.display());
    }

    Ok(())
}
