//! Coarser, full-driver integration tests covering a handful of
//! end-to-end scenarios, scaled down from production ray counts so the
//! suite stays fast. These exercise the full `Driver` against the crate's
//! public API, so they live under `tests/` rather than as inline
//! `#[cfg(test)]` modules.

use shem_trace::config::{SampleType, ScanType, ScatteringKind, SourceKind};
use shem_trace::diagnostics::Diagnostics;
use shem_trace::driver::{build_scattering_law, CancellationToken, Driver};
use shem_trace::material::MaterialTable;
use shem_trace::scene::build_scene;
use shem_trace::Config;

fn base_config() -> Config {
    Config {
        working_distance: 2.1,
        incidence_angle: 45.0,
        scan_type: ScanType::SinglePixel,
        detector_full_axes: vec![(1.4, 1.0)],
        detector_centres: vec![(2.1, 0.0)],
        rotation_angles: vec![],
        pinhole_radius: 0.2,
        ray_count: 4000,
        source_model: SourceKind::Uniform,
        angular_source_size: 0.02,
        source_stddev: 0.0,
        effuse_beam: false,
        effuse_relative_size: 0.0,
        sample_type: SampleType::Flat,
        scattering: ScatteringKind::Specular,
        reflectivity: 1.0,
        scattering_stddev: 0.0,
        sphere_radius: None,
        flat_side_length: 10.0,
        pixel_separation: 0.01,
        scan_range_x: 0.0,
        scan_range_y: 0.0,
        ignore_incidence_angle: false,
        max_scatter: 20,
        plate_represent: false,
        output_label: "test".to_string(),
        seed: 12345,
    }
}

fn run(cfg: &Config) -> shem_trace::ScanOutput {
    let scene = build_scene(cfg, None).unwrap();
    let law = build_scattering_law(cfg.scattering, cfg.scattering_stddev);
    let materials = MaterialTable::uniform(law, cfg.reflectivity);
    let diag = Diagnostics::default();
    let driver = Driver::new(cfg, &scene, &materials, 4);
    let cancel = CancellationToken::new();
    driver.run(&cancel, &diag)
}

/// Scenario 1: flat specular sample, on-axis detector. Most rays should be
/// detected after exactly one scatter, with no killed rays.
#[test]
fn flat_specular_on_axis_detector() {
    let cfg = base_config();
    let out = run(&cfg);

    let total_detected: u64 = (0..out.max_scatter).map(|k| out.counter(k, 0, 0)).sum();
    let one_scatter = out.counter(0, 0, 0);

    assert!(
        (one_scatter as f32) >= 0.9 * (cfg.ray_count as f32),
        "expected >=90% detected after one scatter, got {} of {}",
        one_scatter,
        cfg.ray_count
    );
    assert_eq!(out.killed[0], 0);
    assert_eq!(total_detected, one_scatter);
}

/// Scenario 2: flat cosine-scattering sample. Some fraction of the beam
/// should still find an on-axis detector, and every ray must land in
/// exactly one of detected/killed/escaped.
#[test]
fn flat_cosine_scattering() {
    let mut cfg = base_config();
    cfg.scattering = ScatteringKind::Cosine;
    let out = run(&cfg);

    let detected: u64 = (0..out.max_scatter).map(|k| out.counter(k, 0, 0)).sum();
    assert!(detected > 0, "cosine scattering onto an on-axis detector should yield detections");
    assert!(
        out.accounted_for(0, 0) <= cfg.ray_count as u64,
        "detected + killed should never exceed the rays fired"
    );
}

/// Scenario 4: a narrow specular trench. A ray walking down the trench at
/// a shallow angle should exhaust a tight scatter budget (`Killed`) but
/// escape once the budget is raised enough for it to climb out the open
/// end. The bounce geometry here is purely deterministic (specular, full
/// reflectivity), so a single traced ray per budget is enough.
#[test]
fn scatter_budget_exhaustion_in_a_trench() {
    use shem_trace::intersect::{PixelPose, PlateParticipation};
    use shem_trace::math::{Point, Vector};
    use shem_trace::mesh::build_triangle_surface;
    use shem_trace::plate::{ApertureSet, BackWallPlate, Plate};
    use shem_trace::propagate::{trace_ray, RayOutcome};
    use shem_trace::ray::Ray;
    use shem_trace::rng::WorkerRng;
    use shem_trace::scene::Scene;
    use shem_trace::sphere::AnalyticSphere;

    let v = [
        [-0.1, -5.0, -5.0],
        [-0.1, 5.0, -5.0],
        [-0.1, 5.0, 5.0],
        [-0.1, -5.0, 5.0],
        [0.1, -5.0, -5.0],
        [0.1, 5.0, -5.0],
        [0.1, 5.0, 5.0],
        [0.1, -5.0, 5.0],
    ];
    let f = [[0, 1, 2], [0, 2, 3], [4, 6, 5], [4, 7, 6]];
    let n = [
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
    ];
    let c = [0, 0, 0, 0];
    let p = [0.0, 0.0, 0.0, 0.0];
    let trench = build_triangle_surface(&v, &f, &n, &c, &p).unwrap();

    let trace_with_budget = |max_scatter: u32| {
        let scene = Scene::new(
            trench.clone(),
            Plate::BackWall(BackWallPlate {
                radius: 0.001,
                apertures: ApertureSet::default(),
                plate_represent: false,
            }),
            AnalyticSphere::absent(),
        );
        let law = build_scattering_law(ScatteringKind::Specular, 0.0);
        let materials = MaterialTable::uniform(law, 1.0);
        let diag = Diagnostics::default();
        let mut rng = WorkerRng::new(99, 0);
        let ray = Ray::new(Point::new(0.0, 0.0, 0.0), Vector::new(1.0, 0.001, 0.0).normalized());
        trace_ray(
            ray,
            &scene,
            PixelPose::default(),
            &materials,
            max_scatter,
            PlateParticipation::Exclude,
            &mut rng,
            &diag,
        )
    };

    // At ~0.0002 of y-drift per bounce, reaching the trench's y = 5 open
    // end takes on the order of 25,000 bounces; give the high-budget case
    // generous headroom above that estimate.
    assert_eq!(trace_with_budget(5), RayOutcome::Killed);
    assert_eq!(trace_with_budget(60_000), RayOutcome::Escaped);
}

/// Scenario 5: determinism. Identical seed and thread count (the output is
/// also independent of thread count, exercised separately in the driver's
/// own unit tests) must reproduce bit-identical tallies.
#[test]
fn determinism_identical_seed_yields_identical_tallies() {
    let cfg = base_config();
    let out_a = run(&cfg);
    let out_b = run(&cfg);
    assert_eq!(out_a.counters, out_b.counters);
    assert_eq!(out_a.killed, out_b.killed);
    assert_eq!(out_a.effuse, out_b.effuse);
}

/// Scenario 6: four symmetric detectors under cosine scattering off a flat
/// sample should receive statistically similar counts.
#[test]
fn symmetric_multi_detector_counts_are_comparable() {
    let mut cfg = base_config();
    cfg.scattering = ScatteringKind::Cosine;
    cfg.incidence_angle = 0.0;
    cfg.detector_centres = vec![(1.5, 0.0), (-1.5, 0.0), (0.0, 1.5), (0.0, -1.5)];
    cfg.detector_full_axes = vec![(0.8, 0.8); 4];
    cfg.ray_count = 20_000;

    let out = run(&cfg);
    let counts: Vec<u64> = out.per_aperture.iter().map(|bucket| bucket[0]).collect();
    let total: u64 = counts.iter().sum();
    assert!(total > 0, "symmetric detectors should register detections");

    let mean = total as f64 / counts.len() as f64;
    // Generous tolerance band (well beyond 3-sigma Poisson noise at this
    // sample size) since this integration test runs at reduced ray counts.
    for &c in &counts {
        let diff = (c as f64 - mean).abs();
        assert!(
            diff < mean * 0.5 + 50.0,
            "detector counts should be roughly symmetric, got {:?} (mean {})",
            counts,
            mean
        );
    }
}
