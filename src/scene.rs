//! Scene: the immutable, read-only-shared bundle of geometry that the
//! intersection kernel and propagator traverse. Built once before tracing
//! begins and never mutated afterwards, so it can be shared across worker
//! threads without synchronization.
#![allow(dead_code)]

use crate::config::{Config, SampleType};
use crate::error::SimError;
use crate::math::Point;
use crate::mesh::{build_triangle_surface, TriangleSurface};
use crate::plate::{Aperture, ApertureSet, BackWallPlate, Plate};
use crate::sphere::AnalyticSphere;

/// Identifies which surface a hit or a ray's point of origin lies on, used
/// to exclude the originating element from self-intersection during the
/// next intersection test. Identified by `(surface_id, element_index)`, not
/// by pointer, since elements are indices into owned arrays.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SurfaceId {
    Sample,
    Plate,
    Sphere,
}

/// The element a ray currently sits on, for self-intersection exclusion.
/// `element_index` is the face index for `Sample`/`Plate` surfaces and is
/// unused (but present for uniformity) for `Sphere`.
#[derive(Debug, Copy, Clone)]
pub struct OnElement {
    pub surface: SurfaceId,
    pub element_index: usize,
}

impl OnElement {
    pub fn none() -> Option<OnElement> {
        None
    }
}

/// The full, immutable scene: sample mesh, detector plate, and optional
/// analytic sphere sitting on the sample.
///
/// The sample is built once and an implicit offset is applied to ray
/// origins during intersection for each pixel, rather than rebuilding or
/// copying the mesh per pixel.
pub struct Scene {
    pub sample: TriangleSurface,
    pub plate: Plate,
    pub sphere: AnalyticSphere,
}

impl Scene {
    pub fn new(sample: TriangleSurface, plate: Plate, sphere: AnalyticSphere) -> Scene {
        Scene {
            sample,
            plate,
            sphere,
        }
    }

    /// Translates a world-space point into sample-local coordinates for the
    /// given per-pixel offset, so the same immutable sample mesh can be
    /// intersected against a translated ray without copying geometry.
    pub fn to_sample_local(&self, p: Point, pixel_offset: (f32, f32, f32)) -> Point {
        Point::new(
            p.x - pixel_offset.0,
            p.y - pixel_offset.1,
            p.z - pixel_offset.2,
        )
    }

    pub fn has_sphere(&self) -> bool {
        self.sphere.present
    }
}

/// Synthesizes a square flat sample of the given half-side length, centred
/// on the beam axis in the `y = -depth` plane with outward normal
/// `(0, 1, 0)` (facing the plate at `y = 0`). Used for `sample type: flat`
/// and as the base surface a sphere rests on for `sample type: sphere`;
/// `custom`/`photoStereo` sample types instead require an
/// externally-loaded mesh.
pub fn build_flat_sample(half_side: f32, depth: f32) -> TriangleSurface {
    let s = half_side;
    let y = -depth;
    let v = [[-s, y, -s], [s, y, -s], [s, y, s], [-s, y, s]];
    let f = [[0, 1, 2], [0, 2, 3]];
    let n = [[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
    let c = [0, 0];
    let p = [0.0, 0.0];
    build_triangle_surface(&v, &f, &n, &c, &p).expect("flat sample is well-formed by construction")
}

/// Builds the analytic back-wall plate from the parsed detector apertures,
/// sized generously enough to contain them with margin.
pub fn build_back_wall_plate(config: &Config) -> Plate {
    let apertures: Vec<Aperture> = config
        .detector_centres
        .iter()
        .zip(config.detector_full_axes.iter())
        .map(|(&centre, &full_axes)| Aperture { centre, full_axes })
        .collect();

    let max_extent = apertures
        .iter()
        .map(|ap| {
            let (cx, cz) = ap.centre;
            let (ax, az) = ap.full_axes;
            ((cx * cx) + (cz * cz)).sqrt() + ax.max(az)
        })
        .fold(0.0f32, f32::max);

    let radius = (max_extent * 1.5).max(config.flat_side_length);

    Plate::BackWall(BackWallPlate {
        radius,
        apertures: ApertureSet::new(apertures),
        plate_represent: config.plate_represent,
    })
}

/// Assembles the full scene from a parsed [`Config`] and, for `custom` or
/// `photoStereo` sample types, an externally-loaded sample mesh (mesh
/// ingestion from STL/OBJ stays outside this crate; this only accepts the
/// already-decoded result).
pub fn build_scene(config: &Config, custom_sample: Option<TriangleSurface>) -> Result<Scene, SimError> {
    let depth = config.working_distance;

    let sample = match config.sample_type {
        SampleType::Flat | SampleType::Sphere => build_flat_sample(config.flat_side_length / 2.0, depth),
        SampleType::Custom | SampleType::PhotoStereo => custom_sample.ok_or_else(|| {
            SimError::Resource(
                "sample type 'custom'/'photoStereo' requires an externally-loaded mesh".to_string(),
            )
        })?,
    };

    let plate = build_back_wall_plate(config);

    let sphere = match (config.sample_type, config.sphere_radius) {
        (SampleType::Sphere, Some(r)) => AnalyticSphere::new(Point::new(0.0, -depth + r, 0.0), r, 0, 0.0),
        _ => AnalyticSphere::absent(),
    };

    Ok(Scene::new(sample, plate, sphere))
}
