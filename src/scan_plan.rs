//! Scan plan: produces the per-task pose sequence for each of the four
//! scan types the parameter file can select.
#![allow(dead_code)]

use crate::config::{Config, ScanType};
use crate::intersect::PixelPose;
use crate::math::{rotate_about_axis, Vector};

/// One unit of work for the driver: a pixel index into the output arrays,
/// the sample-translation pose to apply, and (for the `rotations` scan
/// type only) an override of the nominal source direction.
#[derive(Debug, Copy, Clone)]
pub struct Task {
    pub i: usize,
    pub j: usize,
    pub pose: PixelPose,
    pub mean_dir: Vector,
}

/// The full plan: output raster dimensions plus the tasks that fill it.
pub struct ScanPlan {
    pub nx: usize,
    pub nz: usize,
    pub step: f32,
    pub tasks: Vec<Task>,
}

impl ScanPlan {
    pub fn build(config: &Config, nominal_mean_dir: Vector, rotation_axis: Vector) -> ScanPlan {
        match config.scan_type {
            ScanType::SinglePixel => ScanPlan {
                nx: 1,
                nz: 1,
                step: 0.0,
                tasks: vec![Task {
                    i: 0,
                    j: 0,
                    pose: PixelPose::default(),
                    mean_dir: nominal_mean_dir,
                }],
            },
            ScanType::Line => {
                let step = config.pixel_separation;
                let nx = line_pixel_count(config.scan_range_x, step);
                let x_lo = -(config.scan_range_x / 2.0);
                let tasks = (0..nx)
                    .map(|i| Task {
                        i,
                        j: 0,
                        pose: PixelPose {
                            offset: (x_lo + (i as f32 * step), 0.0, 0.0),
                        },
                        mean_dir: nominal_mean_dir,
                    })
                    .collect();
                ScanPlan { nx, nz: 1, step, tasks }
            }
            ScanType::Rectangular => {
                let step = config.pixel_separation;
                let nx = line_pixel_count(config.scan_range_x, step);
                let nz = line_pixel_count(config.scan_range_y, step);
                let x_lo = -(config.scan_range_x / 2.0);
                let z_lo = -(config.scan_range_y / 2.0);
                let mut tasks = Vec::with_capacity(nx * nz);
                for j in 0..nz {
                    for i in 0..nx {
                        tasks.push(Task {
                            i,
                            j,
                            pose: PixelPose {
                                offset: (x_lo + (i as f32 * step), 0.0, z_lo + (j as f32 * step)),
                            },
                            mean_dir: nominal_mean_dir,
                        });
                    }
                }
                ScanPlan { nx, nz, step, tasks }
            }
            ScanType::Rotations => {
                let tasks = config
                    .rotation_angles
                    .iter()
                    .enumerate()
                    .map(|(i, &angle)| Task {
                        i,
                        j: 0,
                        pose: PixelPose::default(),
                        mean_dir: rotate_about_axis(nominal_mean_dir, rotation_axis, angle),
                    })
                    .collect();
                ScanPlan {
                    nx: config.rotation_angles.len(),
                    nz: 1,
                    step: 0.0,
                    tasks,
                }
            }
        }
    }
}

fn line_pixel_count(range: f32, step: f32) -> usize {
    if step <= 0.0 || range <= 0.0 {
        1
    } else {
        ((range / step).floor() as usize) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SampleType, ScatteringKind, SourceKind};

    fn base_config(scan_type: ScanType) -> Config {
        Config {
            working_distance: 3.0,
            incidence_angle: 45.0,
            scan_type,
            detector_full_axes: vec![(1.4, 1.0)],
            detector_centres: vec![(2.1, 0.0)],
            rotation_angles: vec![0.1, 0.2, 0.3],
            pinhole_radius: 0.2,
            ray_count: 100,
            source_model: SourceKind::Uniform,
            angular_source_size: 0.1,
            source_stddev: 0.0,
            effuse_beam: false,
            effuse_relative_size: 0.0,
            sample_type: SampleType::Flat,
            scattering: ScatteringKind::Specular,
            reflectivity: 1.0,
            scattering_stddev: 0.0,
            sphere_radius: None,
            flat_side_length: 10.0,
            pixel_separation: 0.1,
            scan_range_x: 0.5,
            scan_range_y: 0.3,
            ignore_incidence_angle: false,
            max_scatter: 20,
            plate_represent: false,
            output_label: "test".to_string(),
            seed: 1,
        }
    }

    #[test]
    fn single_pixel_plan_has_exactly_one_task() {
        let cfg = base_config(ScanType::SinglePixel);
        let plan = ScanPlan::build(&cfg, Vector::new(0.0, -1.0, 0.0), Vector::new(0.0, 1.0, 0.0));
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.nx, 1);
        assert_eq!(plan.nz, 1);
    }

    #[test]
    fn rectangular_plan_covers_nx_times_nz_pixels() {
        let cfg = base_config(ScanType::Rectangular);
        let plan = ScanPlan::build(&cfg, Vector::new(0.0, -1.0, 0.0), Vector::new(0.0, 1.0, 0.0));
        assert_eq!(plan.tasks.len(), plan.nx * plan.nz);
        assert_eq!(plan.nx, 6);
        assert_eq!(plan.nz, 4);
    }

    #[test]
    fn rotations_plan_has_one_task_per_angle_with_rotated_mean_dir() {
        let cfg = base_config(ScanType::Rotations);
        let mean = Vector::new(0.0, -1.0, 0.0);
        let plan = ScanPlan::build(&cfg, mean, Vector::new(0.0, 0.0, 1.0));
        assert_eq!(plan.tasks.len(), 3);
        for (task, &angle) in plan.tasks.iter().zip(cfg.rotation_angles.iter()) {
            let expected = rotate_about_axis(mean, Vector::new(0.0, 0.0, 1.0), angle);
            assert!((task.mean_dir.x - expected.x).abs() < 1e-6);
            assert!((task.mean_dir.y - expected.y).abs() < 1e-6);
        }
    }

    #[test]
    fn line_plan_is_one_dimensional() {
        let cfg = base_config(ScanType::Line);
        let plan = ScanPlan::build(&cfg, Vector::new(0.0, -1.0, 0.0), Vector::new(0.0, 1.0, 0.0));
        assert_eq!(plan.nz, 1);
        assert!(plan.tasks.iter().all(|t| t.j == 0));
    }
}
