use double_slit::{
    equally_spaced_positions, evaluate_single, superpose, superpose_amplitude, Emitter, EvaluationRequest,
    FieldError, PhysicalConstants, SampleGrid,
};
use std::f64::consts::PI;

fn natural() -> PhysicalConstants {
    PhysicalConstants::natural(1.0).unwrap()
}

fn small_grid() -> SampleGrid {
    SampleGrid::new(-6.0, 6.0, 0.0, 4.0, 121, 41).unwrap()
}

fn drifting(xs: &[f64], v: f64) -> Vec<Emitter> {
    xs.iter().map(|&x| Emitter::at(x, 0.0).with_drift(v)).collect()
}

#[test]
fn test_single_packet_at_time_zero() {
    for a in [0.5, 1.0, 2.0] {
        let constants = PhysicalConstants::natural(a).unwrap();
        for r in [0.0, 0.3, 1.0, 2.5] {
            let psi = evaluate_single(r, 0.0, &constants).unwrap();
            let expected = (2.0 * a / PI).powf(0.25) * (-a * r * r).exp();
            assert!((psi.re - expected).abs() < 1e-12, "a={a} r={r}");
            assert!(psi.im.abs() < 1e-12);

            let density = (2.0 * a / PI).sqrt() * (-2.0 * a * r * r).exp();
            assert!((psi.norm_sqr() - density).abs() < 1e-12);
        }
    }
}

#[test]
fn test_superpose_reduces_to_gaussian() {
    for a in [0.5, 1.0, 2.0] {
        let constants = PhysicalConstants::natural(a).unwrap();
        let grid = SampleGrid::new(-3.0, 3.0, -2.0, 2.0, 31, 21).unwrap();
        let field = superpose(&EvaluationRequest::new(constants, grid.clone(), vec![Emitter::at(0.0, 0.0)], 0.0)).unwrap();
        for (j, &y) in grid.ys().iter().enumerate() {
            for (i, &x) in grid.xs().iter().enumerate() {
                let expected = (2.0 * a / PI).sqrt() * (-2.0 * a * (x * x + y * y)).exp();
                assert!((field.get(j, i).unwrap() - expected).abs() < 1e-12, "a={a} ({x}, {y})");
            }
        }
    }
}

#[test]
fn test_negative_time_accepted() {
    let constants = natural();
    let forward = evaluate_single(0.7, 1.2, &constants).unwrap();
    let backward = evaluate_single(0.7, -1.2, &constants).unwrap();
    assert!((forward.conj() - backward).norm() < 1e-12);
}

#[test]
fn test_packet_spreads_over_time() {
    let constants = natural();
    let early = evaluate_single(0.0, 0.5, &constants).unwrap().norm_sqr();
    let late = evaluate_single(0.0, 3.0, &constants).unwrap().norm_sqr();
    assert!(late < early);

    // Far tail gains weight as the packet widens
    let tail_early = evaluate_single(3.0, 0.0, &constants).unwrap().norm_sqr();
    let tail_late = evaluate_single(3.0, 3.0, &constants).unwrap().norm_sqr();
    assert!(tail_late > tail_early);
}

#[test]
fn test_coincident_emitters_scale_density() {
    let grid = small_grid();
    let single = superpose(&EvaluationRequest::new(natural(), grid.clone(), drifting(&[0.5], 1.0), 0.7)).unwrap();

    for n in 1..=3 {
        let emitters = drifting(&vec![0.5; n], 1.0);
        let field = superpose(&EvaluationRequest::new(natural(), grid.clone(), emitters, 0.7)).unwrap();
        for (a, b) in field.values().iter().zip(single.values().iter()) {
            assert!((a - n as f64 * b).abs() < 1e-12 * (1.0 + a.abs()), "n={n}");
        }
    }
}

#[test]
fn test_coincident_emitters_at_center() {
    let constants = natural();
    let grid = SampleGrid::new(-1.0, 1.0, -1.0, 1.0, 3, 3).unwrap();
    let single = superpose(&EvaluationRequest::new(constants, grid.clone(), vec![Emitter::at(0.0, 0.0)], 0.0))
        .unwrap()
        .get(1, 1)
        .unwrap();
    assert!((single - (2.0 / PI).sqrt()).abs() < 1e-12);

    for n in 1..=3 {
        let emitters = vec![Emitter::at(0.0, 0.0); n];
        let field = superpose(&EvaluationRequest::new(constants, grid.clone(), emitters, 0.0)).unwrap();
        let ratio = field.get(1, 1).unwrap() / single;
        assert!((ratio - n as f64).abs() < 1e-12, "n={n} ratio={ratio}");
    }
}

#[test]
fn test_mirror_symmetry() {
    let grid = SampleGrid::new(-5.0, 5.0, 0.0, 5.0, 101, 51).unwrap();
    let emitters = drifting(&equally_spaced_positions(3, 2.0), 1.0);
    for t in [0.0, 0.5, 1.7, 4.0] {
        let field = superpose(&EvaluationRequest::new(natural(), grid.clone(), emitters.clone(), t)).unwrap();
        let (ny, nx) = field.shape();
        for row in 0..ny {
            for col in 0..nx {
                let a = field.get(row, col).unwrap();
                let b = field.get(row, nx - 1 - col).unwrap();
                assert!((a - b).abs() < 1e-9, "t={t} row={row} col={col}");
            }
        }
    }
}

#[test]
fn test_density_non_negative_and_matches_amplitude() {
    let grid = small_grid();
    let request = EvaluationRequest::new(natural(), grid, drifting(&[-2.0, 0.3, 1.1, 2.0], 0.4), 1.3);
    let amplitude = superpose_amplitude(&request).unwrap();
    let density = superpose(&request).unwrap();

    assert!(density.values().iter().all(|&v| v >= 0.0 && v.is_finite()));
    for (psi, rho) in amplitude.values().iter().zip(density.values().iter()) {
        assert!((psi.norm_sqr() - rho).abs() < 1e-14);
    }
}

#[test]
fn test_layout_helper() {
    assert_eq!(equally_spaced_positions(3, 2.0), vec![-2.0, 0.0, 2.0]);
    assert_eq!(equally_spaced_positions(2, 2.0), vec![-1.0, 1.0]);
    assert_eq!(equally_spaced_positions(1, 5.0), vec![0.0]);
    assert!(equally_spaced_positions(0, 1.0).is_empty());
}

#[test]
fn test_invalid_requests() {
    let err = superpose(&EvaluationRequest::new(natural(), small_grid(), Vec::new(), 0.0)).unwrap_err();
    assert!(matches!(err, FieldError::InvalidParameter(_)));

    let bad = PhysicalConstants {
        mass: 0.0,
        ..natural()
    };
    let err = superpose(&EvaluationRequest::new(bad, small_grid(), drifting(&[0.0], 1.0), 0.0)).unwrap_err();
    assert!(err.is_invalid_parameter());
    assert!(evaluate_single(1.0, 0.0, &bad).unwrap_err().is_invalid_parameter());
    assert!(SampleGrid::new(0.0, 1.0, 0.0, 1.0, 0, 10).unwrap_err().is_invalid_parameter());
}

#[test]
fn test_double_slit_scenario() {
    let grid = SampleGrid::new(-10.0, 10.0, 0.0, 5.0, 500, 250).unwrap();
    let request = EvaluationRequest::new(natural(), grid, drifting(&[-1.0, 1.0], 1.0), 0.0);
    let field = superpose(&request).unwrap();

    assert_eq!(field.shape(), (250, 500));

    // Two packets overlap slightly, pulling the peaks just inside x = ±1
    let (max, (row, _)) = field.max();
    let (x, y) = field.argmax_position();
    assert_eq!(row, 0);
    assert_eq!(y, 0.0);
    assert!(x.abs() > 0.8 && x.abs() < 1.2, "peak at x={x}");
    assert!(max > 0.40 && max < 0.42, "max={max}");

    let (ny, nx) = field.shape();
    for row in (0..ny).step_by(10) {
        for col in 0..nx {
            let a = field.get(row, col).unwrap();
            assert!(a >= 0.0);
            assert!((a - field.get(row, nx - 1 - col).unwrap()).abs() < 1e-9);
        }
    }

    // Fringes have moved off the slit row once time passes
    let later = superpose(&request.at_time(2.0)).unwrap();
    let (_, (later_row, _)) = later.max();
    assert!(later_row > 0);
}
