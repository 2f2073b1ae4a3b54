//! Ray propagator: the per-ray state machine wrapping intersection and
//! scattering.
#![allow(dead_code)]

use crate::diagnostics::Diagnostics;
use crate::intersect::{nearest_hit, PixelPose, PlateParticipation};
use crate::material::MaterialTable;
use crate::ray::Ray;
use crate::rng::WorkerRng;
use crate::scene::Scene;

/// The terminal outcome of a single ray.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RayOutcome {
    /// `scatter_count` is the number of sample-scattering events (always
    /// at least one) the ray underwent before reaching the detector.
    /// `aperture` is its 1-based detector index.
    Detected { scatter_count: u32, aperture: u32 },
    Escaped,
    Killed,
}

/// Drives a single ray from its initial state to a terminal outcome.
///
/// `first_flight_plate` controls whether the plate participates in the
/// very first intersection test (the configurable first-scatter policy);
/// every subsequent flight always includes the plate.
pub fn trace_ray(
    mut ray: Ray,
    scene: &Scene,
    pose: PixelPose,
    materials: &MaterialTable,
    max_scatter: u32,
    first_flight_plate: PlateParticipation,
    rng: &mut WorkerRng,
    diag: &Diagnostics,
) -> RayOutcome {
    use RayOutcome::{Detected, Escaped, Killed};

    let mut plate_participation = first_flight_plate;

    loop {
        let hit = match nearest_hit(&ray, scene, pose, plate_participation, diag) {
            Some(hit) => hit,
            None => return Escaped,
        };

        if hit.is_detection() {
            return Detected {
                scatter_count: ray.scatter_count,
                aperture: hit.aperture,
            };
        }

        let material = materials.get(hit.material_id);
        if rng.uniform_01() > material.reflectivity {
            return Killed;
        }

        ray.origin = hit.point;
        ray.on_element = Some(hit.on_element());
        ray.dir = material
            .law
            .sample(ray.dir, hit.normal, rng, diag)
            .normalized();
        ray.scatter_count += 1;

        if ray.scatter_count >= max_scatter {
            return Killed;
        }

        plate_participation = PlateParticipation::Include;
    }
}
