//! Frame sequence exporter
//!
//! Writes one figure per time step into a directory, ready to be stitched
//! into an animation by an external encoder. With `--amplitude` each frame
//! is the real and imaginary part of ψ along the slit row instead.

use clap::Parser;
use double_slit::frames::{export_amplitude_frames, export_frames, FrameSchedule};
use double_slit::render::Colormap;
use double_slit::{Preset, SceneConfig};
use std::error::Error;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "double_slit_frames")]
#[command(about = "Export a multi-slit interference animation as PNG frames")]
struct Args {
    /// Preset scene (web, interactive, pixels, diverging)
    #[arg(long, short = 'p', default_value = "pixels")]
    preset: String,

    /// Scene JSON file, overrides the preset
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 0.0)]
    start: f64,

    #[arg(long, default_value_t = 4.99)]
    end: f64,

    #[arg(long, default_value_t = 500)]
    count: usize,

    #[arg(long, short = 'o', default_value = "frames")]
    out_dir: PathBuf,

    #[arg(long, default_value = "gray")]
    colormap: String,

    /// Write real/imaginary ψ along the slit row instead of density figures
    #[arg(long)]
    amplitude: bool,

    /// Panel height for amplitude frames
    #[arg(long, default_value_t = 300)]
    height: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let scene = match &args.config {
        Some(path) => SceneConfig::from_json_file(path)?,
        None => Preset::from_name(&args.preset)?.config(),
    };
    let schedule = FrameSchedule::new(args.start, args.end, args.count)?;
    let colormap = Colormap::from_name(&args.colormap)
        .ok_or_else(|| format!("unknown colormap '{}'", args.colormap))?;

    log::info!(
        "rendering {} frames for t in [{}, {}]",
        schedule.count,
        schedule.start,
        schedule.end
    );
    let started = Instant::now();
    let written = if args.amplitude {
        export_amplitude_frames(&scene, &schedule, &args.out_dir, args.height)?
    } else {
        export_frames(&scene, &schedule, &args.out_dir, colormap)?
    };
    log::info!(
        "{} frames in {:.2}s",
        written.len(),
        started.elapsed().as_secs_f64()
    );

    Ok(())
}
