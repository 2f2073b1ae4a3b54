//! Intersection kernel: given a ray and the scene, returns the nearest
//! forward intersection, evaluating candidates in a fixed order (sample,
//! then sphere, then plate) so that exact distance ties resolve to the
//! earlier-evaluated candidate.
#![allow(dead_code)]

use crate::diagnostics::Diagnostics;
use crate::geometry::{behind_ray, intersect_sphere, intersect_triangle, sphere_normal, TriTest};
use crate::math::{dot, propagate};
use crate::plate::Plate;
use crate::ray::{Hit, Ray};
use crate::scene::{OnElement, Scene, SurfaceId};

/// Per-pixel pose applied to the sample surface: world point `p` maps to
/// sample-local `p - offset`.
#[derive(Debug, Copy, Clone, Default)]
pub struct PixelPose {
    pub offset: (f32, f32, f32),
}

/// Whether the plate participates in this intersection test, per the
/// configurable first-scatter policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlateParticipation {
    Include,
    Exclude,
}

fn on_sample_face(on: Option<OnElement>, j: usize) -> bool {
    matches!(
        on,
        Some(OnElement {
            surface: SurfaceId::Sample,
            element_index,
        }) if element_index == j
    )
}

fn on_sphere(on: Option<OnElement>) -> bool {
    matches!(
        on,
        Some(OnElement {
            surface: SurfaceId::Sphere,
            ..
        })
    )
}

fn on_plate_face(on: Option<OnElement>, j: usize) -> bool {
    matches!(
        on,
        Some(OnElement {
            surface: SurfaceId::Plate,
            element_index,
        }) if element_index == j
    )
}

/// Translates the ray into sample-local coordinates for the given pose (so
/// the sample mesh itself never needs to be copied per pixel).
fn local_origin(ray: &Ray, pose: PixelPose) -> crate::math::Point {
    crate::math::Point::new(
        ray.origin.x - pose.offset.0,
        ray.origin.y - pose.offset.1,
        ray.origin.z - pose.offset.2,
    )
}

fn world_point(local: crate::math::Point, pose: PixelPose) -> crate::math::Point {
    crate::math::Point::new(
        local.x + pose.offset.0,
        local.y + pose.offset.1,
        local.z + pose.offset.2,
    )
}

pub fn nearest_hit(
    ray: &Ray,
    scene: &Scene,
    pose: PixelPose,
    plate_participation: PlateParticipation,
    diag: &Diagnostics,
) -> Option<Hit> {
    let mut best: Option<Hit> = None;
    let mut min_dist2 = f32::INFINITY;

    // Candidate 1: sample surface, in sample-local coordinates.
    let local_orig = local_origin(ray, pose);
    for j in scene.sample.face_indices() {
        if on_sample_face(ray.on_element, j) {
            continue;
        }
        let (a, b, c, nor) = scene.sample.get_element(j);
        if dot(ray.dir, nor.into_vector()) > 0.0 {
            continue;
        }
        if behind_ray(local_orig, ray.dir, (a, b, c)) {
            continue;
        }
        match intersect_triangle(local_orig, ray.dir, (a, b, c)) {
            TriTest::Singular => diag.degenerate_triangles.incr(),
            TriTest::Miss => {}
            TriTest::Hit(tri_hit) => {
                let dist2 = tri_hit.t * tri_hit.t;
                if dist2 < min_dist2 {
                    min_dist2 = dist2;
                    let (material_id, material_param) = scene.sample.material(j);
                    let local_point = propagate(local_orig, ray.dir, tri_hit.t);
                    best = Some(Hit {
                        dist2,
                        point: world_point(local_point, pose),
                        normal: nor,
                        surface: SurfaceId::Sample,
                        element_index: j as i64,
                        material_id,
                        material_param,
                        aperture: 0,
                    });
                }
            }
        }
    }

    // Candidate 2: analytic sphere, also in sample-local coordinates (it
    // rests on the sample and translates with it).
    if scene.sphere.present && !on_sphere(ray.on_element) {
        if let Some(t) = intersect_sphere(local_orig, ray.dir, scene.sphere.centre, scene.sphere.radius) {
            let dist2 = t * t;
            if dist2 < min_dist2 {
                min_dist2 = dist2;
                let local_point = propagate(local_orig, ray.dir, t);
                let nor = sphere_normal(local_point, scene.sphere.centre);
                best = Some(Hit {
                    dist2,
                    point: world_point(local_point, pose),
                    normal: nor,
                    surface: SurfaceId::Sphere,
                    element_index: -1,
                    material_id: scene.sphere.material_id,
                    material_param: scene.sphere.material_param,
                    aperture: 0,
                });
            }
        }
    }

    // Candidate 3: plate, in world coordinates (the plate does not
    // translate with the sample).
    if plate_participation == PlateParticipation::Include {
        match &scene.plate {
            Plate::Triangulated(surf) => {
                for j in surf.face_indices() {
                    if on_plate_face(ray.on_element, j) {
                        continue;
                    }
                    let (a, b, c, nor) = surf.get_element(j);
                    if dot(ray.dir, nor.into_vector()) > 0.0 {
                        continue;
                    }
                    if behind_ray(ray.origin, ray.dir, (a, b, c)) {
                        continue;
                    }
                    match intersect_triangle(ray.origin, ray.dir, (a, b, c)) {
                        TriTest::Singular => diag.degenerate_triangles.incr(),
                        TriTest::Miss => {}
                        TriTest::Hit(tri_hit) => {
                            let dist2 = tri_hit.t * tri_hit.t;
                            if dist2 < min_dist2 {
                                min_dist2 = dist2;
                                let (material_id, material_param) = surf.material(j);
                                let point = propagate(ray.origin, ray.dir, tri_hit.t);
                                best = Some(Hit {
                                    dist2,
                                    point,
                                    normal: nor,
                                    surface: SurfaceId::Plate,
                                    element_index: j as i64,
                                    material_id,
                                    material_param,
                                    // A triangulated plate reuses material id
                                    // 0 for the opaque substrate and ids >= 1
                                    // as the 1-based detector aperture they
                                    // carry, consistent with aperture 0 =
                                    // "no detection".
                                    aperture: material_id,
                                });
                            }
                        }
                    }
                }
            }
            Plate::BackWall(wall) => {
                if ray.dir.y > 0.0 {
                    let t = -ray.origin.y / ray.dir.y;
                    if t > 0.0 {
                        let dist2 = t * t;
                        if dist2 < min_dist2 {
                            let point = propagate(ray.origin, ray.dir, t);
                            let r2 = (point.x * point.x) + (point.z * point.z);
                            if r2 <= wall.radius * wall.radius {
                                let aperture = wall.apertures.test((point.x, point.z));
                                if aperture > 0 || wall.plate_represent {
                                    min_dist2 = dist2;
                                    best = Some(Hit {
                                        dist2,
                                        point,
                                        normal: crate::math::Normal::new(0.0, -1.0, 0.0),
                                        surface: SurfaceId::Plate,
                                        element_index: -1,
                                        material_id: 0,
                                        material_param: 0.0,
                                        aperture,
                                    });
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    best
}
