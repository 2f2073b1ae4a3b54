//! Source sampler: draws an initial ray position/direction from a chosen
//! source model. Stateless apart from its RNG.
#![allow(dead_code)]

use crate::math::{zup_to_vec, Point, Vector};
use crate::rng::WorkerRng;
use crate::scattering::cosine_sample_hemisphere;

/// Uniformly samples a point in a disc of `radius` centred on `centre`, in
/// the plane perpendicular to `normal`, via rejection sampling.
fn disc_point(radius: f32, normal: Vector, centre: Point, rng: &mut WorkerRng) -> Point {
    let (u, v) = loop {
        let u = rng.uniform_signed();
        let v = rng.uniform_signed();
        if (u * u) + (v * v) <= 1.0 {
            break (u, v);
        }
    };
    let local = Vector::new(u * radius, v * radius, 0.0);
    centre + tangent_frame(local, normal)
}

/// Places a vector given in the local `(x, y, 0)` plane into the plane
/// perpendicular to `normal`, reusing the same orthonormal-basis
/// construction the scattering kernel uses to place hemisphere samples.
fn tangent_frame(local: Vector, normal: Vector) -> Vector {
    zup_to_vec(Vector::new(local.x, local.y, 0.0), normal)
        + (normal.normalized() * local.z)
}

/// Tilts `mean_dir` by a polar angle `theta` (from the mean) and azimuth
/// `phi`, both given in radians.
fn tilt(mean_dir: Vector, theta: f32, phi: f32) -> Vector {
    let local = Vector::new(theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos());
    zup_to_vec(local, mean_dir).normalized()
}

/// A source model and its parameters, per the parameter file's `source
/// model` key.
#[derive(Debug, Copy, Clone)]
pub enum SourceModel {
    /// Direction tilted from the mean by a uniform random angle up to
    /// `angular_size` radians; position drawn uniformly in the pinhole disc.
    UniformPencil {
        pinhole_radius: f32,
        angular_size: f32,
    },
    /// Direction tilted from the mean by a Gaussian of stddev `sigma`
    /// radians; position as above.
    Gaussian { pinhole_radius: f32, sigma: f32 },
    /// Position on the pinhole disc, direction cosine-distributed about the
    /// pinhole normal (effuse beam).
    Effuse { pinhole_radius: f32 },
}

impl SourceModel {
    /// Samples `(position, direction)`. `mean_dir` is the nominal beam axis
    /// (the incidence direction); `pinhole_normal` is the outward normal of
    /// the pinhole plane; `pinhole_center` is where that plane's disc is
    /// centred.
    pub fn sample(
        &self,
        mean_dir: Vector,
        pinhole_normal: Vector,
        pinhole_center: Point,
        rng: &mut WorkerRng,
    ) -> (Point, Vector) {
        match *self {
            SourceModel::UniformPencil {
                pinhole_radius,
                angular_size,
            } => {
                let pos = disc_point(pinhole_radius, pinhole_normal, pinhole_center, rng);
                let theta = angular_size * rng.uniform_01();
                let phi = 2.0 * std::f32::consts::PI * rng.uniform_01();
                (pos, tilt(mean_dir, theta, phi))
            }
            SourceModel::Gaussian {
                pinhole_radius,
                sigma,
            } => {
                let pos = disc_point(pinhole_radius, pinhole_normal, pinhole_center, rng);
                let theta = rng.gaussian(0.0, sigma).abs();
                let phi = 2.0 * std::f32::consts::PI * rng.uniform_01();
                (pos, tilt(mean_dir, theta, phi))
            }
            SourceModel::Effuse { pinhole_radius } => {
                let pos = disc_point(pinhole_radius, pinhole_normal, pinhole_center, rng);
                let local = cosine_sample_hemisphere(rng.uniform_01(), rng.uniform_01());
                let dir = zup_to_vec(local, pinhole_normal);
                (pos, dir)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::dot;

    fn rng() -> WorkerRng {
        WorkerRng::new(11, 0)
    }

    #[test]
    fn uniform_pencil_directions_are_unit() {
        let mut rng = rng();
        let model = SourceModel::UniformPencil {
            pinhole_radius: 0.5,
            angular_size: 0.3,
        };
        let mean = Vector::new(0.0, -1.0, 0.0);
        for _ in 0..500 {
            let (_pos, dir) = model.sample(mean, Vector::new(0.0, 1.0, 0.0), Point::origin(), &mut rng);
            assert!((dir.length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn uniform_pencil_positions_stay_within_disc() {
        let mut rng = rng();
        let model = SourceModel::UniformPencil {
            pinhole_radius: 2.0,
            angular_size: 0.1,
        };
        let normal = Vector::new(0.0, 1.0, 0.0);
        for _ in 0..500 {
            let (pos, _dir) = model.sample(Vector::new(0.0, -1.0, 0.0), normal, Point::origin(), &mut rng);
            // Within the disc plane, the point's distance from the origin
            // along the tangent axes must not exceed the radius.
            let radial = pos.into_vector() - (normal.normalized() * dot(pos.into_vector(), normal.normalized()));
            assert!(radial.length() <= 2.0 + 1e-4);
        }
    }

    #[test]
    fn gaussian_direction_is_unit_and_converges_to_mean_for_small_sigma() {
        let mut rng = rng();
        let model = SourceModel::Gaussian {
            pinhole_radius: 0.1,
            sigma: 1e-4,
        };
        let mean = Vector::new(0.0, -1.0, 0.0);
        let (_pos, dir) = model.sample(mean, Vector::new(0.0, 1.0, 0.0), Point::origin(), &mut rng);
        assert!((dir.length() - 1.0).abs() < 1e-4);
        assert!(dot(dir, mean) > 0.999);
    }

    #[test]
    fn effuse_direction_is_outgoing_from_pinhole_normal() {
        let mut rng = rng();
        let model = SourceModel::Effuse { pinhole_radius: 0.3 };
        let normal = Vector::new(0.0, 1.0, 0.0);
        for _ in 0..500 {
            let (_pos, dir) = model.sample(Vector::new(0.0, -1.0, 0.0), normal, Point::origin(), &mut rng);
            assert!(dot(dir, normal) > 0.0);
        }
    }
}
