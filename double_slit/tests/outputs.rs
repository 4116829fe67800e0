use double_slit::frames::{export_amplitude_frames, export_frames, render_profile_snapshots, FrameSchedule};
use double_slit::render::{encode_png, render_figure, Colormap};
use double_slit::{superpose, GridSpec, SceneConfig};
use std::collections::HashSet;
use std::path::PathBuf;

fn tiny_scene() -> SceneConfig {
    SceneConfig {
        grid: GridSpec {
            x_min: -5.0,
            x_max: 5.0,
            y_min: 0.0,
            y_max: 5.0,
            nx: 40,
            ny: 20,
        },
        ..SceneConfig::pixels()
    }
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("double_slit_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_figure_png_decodes() {
    let scene = tiny_scene();
    let field = superpose(&scene.request().unwrap()).unwrap();
    let img = render_figure(&field, &scene.display, Colormap::Gray);
    assert!(img.width() > 40 && img.height() > 20);

    let png = encode_png(&img).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    let decoded = image::load_from_memory(&png).unwrap();
    assert_eq!(decoded.width(), img.width());
    assert_eq!(decoded.height(), img.height());
}

#[test]
fn test_export_frames_writes_each_time() {
    let dir = scratch_dir("frames");
    let schedule = FrameSchedule::new(0.0, 1.0, 3).unwrap();
    let written = export_frames(&tiny_scene(), &schedule, &dir, Colormap::Heat).unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "double_slit_0000_00.000.png",
            "double_slit_0001_00.500.png",
            "double_slit_0002_01.000.png"
        ]
    );
    for path in &written {
        assert!(image::open(path).is_ok(), "{}", path.display());
    }

    std::fs::remove_dir_all(&dir).unwrap();
}

fn png_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "png"))
        .count()
}

#[test]
fn test_close_frame_times_do_not_overwrite() {
    let dir = scratch_dir("close_times");
    // Step of 0.0005 rounds neighbouring times to the same 3-decimal label
    let schedule = FrameSchedule::new(0.0, 0.002, 5).unwrap();
    let written = export_frames(&tiny_scene(), &schedule, &dir, Colormap::Gray).unwrap();

    let unique: HashSet<&PathBuf> = written.iter().collect();
    assert_eq!(unique.len(), 5);
    assert_eq!(png_count(&dir), 5);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_amplitude_frames() {
    let dir = scratch_dir("amplitude");
    let schedule = FrameSchedule::new(0.0, 2.0, 4).unwrap();
    let written = export_amplitude_frames(&tiny_scene(), &schedule, &dir, 60).unwrap();

    assert_eq!(written.len(), 4);
    assert_eq!(png_count(&dir), 4);
    let first = written[0].file_name().unwrap().to_string_lossy().into_owned();
    assert_eq!(first, "amplitude_0000_00.000.png");

    // One column per x sample plus margins
    let img = image::open(&written[3]).unwrap();
    assert_eq!((img.width(), img.height()), (40 + 40, 60 + 40));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_profile_snapshots_panel() {
    let panel = render_profile_snapshots(&tiny_scene(), &[0.0, 0.5, 1.0], 120, 80).unwrap();
    // Plot area plus a margin on every side
    assert_eq!((panel.width(), panel.height()), (160, 120));
}

#[test]
fn test_invalid_scene_propagates() {
    let mut scene = tiny_scene();
    scene.constants.packet_width = -1.0;
    let dir = scratch_dir("invalid");
    let err = export_frames(&scene, &FrameSchedule::new(0.0, 1.0, 2).unwrap(), &dir, Colormap::Gray).unwrap_err();
    assert!(err.is_invalid_parameter());
    let _ = std::fs::remove_dir_all(&dir);
}
