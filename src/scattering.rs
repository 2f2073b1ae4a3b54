//! Scattering kernel: samples an outgoing direction given an incoming
//! direction, a surface normal, and a per-facet scattering law.
//!
//! Small structs implementing a common trait, unified under an enum for
//! static dispatch.
#![allow(dead_code)]

use std::f32::consts::PI;

use crate::diagnostics::Diagnostics;
use crate::math::{dot, zup_to_vec, Normal, Vector};
use crate::rng::WorkerRng;

/// Maximum number of resample attempts before falling back to the nominal
/// (un-perturbed) direction.
const MAX_RESAMPLE_ATTEMPTS: u32 = 8;

/// A per-facet scattering law.
pub trait ScatterLaw {
    /// Samples a new outgoing direction for incoming direction `inc` off a
    /// surface with normal `nor`. The returned direction is unit-norm and
    /// satisfies `dot(d', nor) > 0`.
    fn sample(&self, inc: Vector, nor: Normal, rng: &mut WorkerRng, diag: &Diagnostics)
        -> Vector;
}

/// Mirror reflection: `d' = d - 2(d.n)n`.
#[derive(Debug, Copy, Clone)]
pub struct Specular;

impl ScatterLaw for Specular {
    fn sample(&self, inc: Vector, nor: Normal, _rng: &mut WorkerRng, _diag: &Diagnostics) -> Vector {
        specular_direction(inc, nor)
    }
}

/// Cosine-weighted (Lambertian) scattering: density proportional to
/// `cos(theta)` about the normal, sampled as `phi ~ U[0, 2pi)`, `theta`
/// drawn so that `p(theta) = sin(2*theta)` on `[0, pi/2]`.
#[derive(Debug, Copy, Clone)]
pub struct Cosine;

impl ScatterLaw for Cosine {
    fn sample(&self, _inc: Vector, nor: Normal, rng: &mut WorkerRng, _diag: &Diagnostics) -> Vector {
        cosine_hemisphere_direction(nor, rng)
    }
}

/// Uniform sampling over the hemisphere about the normal.
#[derive(Debug, Copy, Clone)]
pub struct UniformHemisphere;

impl ScatterLaw for UniformHemisphere {
    fn sample(&self, _inc: Vector, nor: Normal, rng: &mut WorkerRng, _diag: &Diagnostics) -> Vector {
        uniform_hemisphere_direction(nor, rng)
    }
}

/// Specular reflection broadened by a Gaussian perturbation of standard
/// deviation `sigma_radians` applied in the two tangent axes.
#[derive(Debug, Copy, Clone)]
pub struct BroadenedSpecular {
    pub sigma_radians: f32,
}

impl ScatterLaw for BroadenedSpecular {
    fn sample(&self, inc: Vector, nor: Normal, rng: &mut WorkerRng, diag: &Diagnostics) -> Vector {
        let nominal = specular_direction(inc, nor);

        for _ in 0..MAX_RESAMPLE_ATTEMPTS {
            let (dx, dy) = rng.gaussian_pair(0.0, self.sigma_radians);
            let perturbed = zup_to_vec(
                Vector::new(dx.sin(), dy.sin(), 1.0).normalized(),
                nominal,
            );
            if perturbed.length() > 1e-8 {
                let perturbed = perturbed.normalized();
                if dot(perturbed, nor.into_vector()) > 0.0 {
                    return perturbed;
                }
            } else {
                diag.zero_length_dirs.incr();
            }
        }

        diag.resample_exhausted.incr();
        nominal
    }
}

/// Per-event mixture: with probability `cosine_prob`, scatter cosine;
/// otherwise specular.
#[derive(Debug, Copy, Clone)]
pub struct Mixed {
    pub cosine_prob: f32,
}

impl ScatterLaw for Mixed {
    fn sample(&self, inc: Vector, nor: Normal, rng: &mut WorkerRng, diag: &Diagnostics) -> Vector {
        if rng.uniform_01() < self.cosine_prob {
            Cosine.sample(inc, nor, rng, diag)
        } else {
            Specular.sample(inc, nor, rng, diag)
        }
    }
}

/// Statically-dispatched union of the supported scattering laws.
#[derive(Debug, Copy, Clone)]
pub enum ScatterLawUnion {
    Specular(Specular),
    Cosine(Cosine),
    UniformHemisphere(UniformHemisphere),
    BroadenedSpecular(BroadenedSpecular),
    Mixed(Mixed),
}

impl ScatterLawUnion {
    pub fn sample(
        &self,
        inc: Vector,
        nor: Normal,
        rng: &mut WorkerRng,
        diag: &Diagnostics,
    ) -> Vector {
        match *self {
            ScatterLawUnion::Specular(ref s) => s.sample(inc, nor, rng, diag),
            ScatterLawUnion::Cosine(ref s) => s.sample(inc, nor, rng, diag),
            ScatterLawUnion::UniformHemisphere(ref s) => s.sample(inc, nor, rng, diag),
            ScatterLawUnion::BroadenedSpecular(ref s) => s.sample(inc, nor, rng, diag),
            ScatterLawUnion::Mixed(ref s) => s.sample(inc, nor, rng, diag),
        }
    }
}

fn specular_direction(inc: Vector, nor: Normal) -> Vector {
    crate::math::reflect(inc, nor).normalized()
}

/// Maps the unit square to the unit circle via a concentric-disk mapping.
fn square_to_circle(x: f32, y: f32) -> (f32, f32) {
    if x == 0.0 && y == 0.0 {
        return (0.0, 0.0);
    }

    const QPI: f32 = PI / 4.0;
    let (radius, angle) = if x > y.abs() {
        (x, QPI * (y / x))
    } else if y > x.abs() {
        (y, QPI * (2.0 - (x / y)))
    } else if x < -(y.abs()) {
        (-x, QPI * (4.0 + (y / x)))
    } else {
        (-y, QPI * (6.0 - (x / y)))
    };

    (radius * angle.cos(), radius * angle.sin())
}

/// Samples a direction in the local z-up hemisphere with density
/// proportional to `cos(theta)`. Shared with the source sampler, which
/// uses the same distribution for the effuse beam.
pub(crate) fn cosine_sample_hemisphere(u: f32, v: f32) -> Vector {
    let (u, v) = square_to_circle((u * 2.0) - 1.0, (v * 2.0) - 1.0);
    let z = (1.0 - ((u * u) + (v * v))).max(0.0).sqrt();
    Vector::new(u, v, z)
}

/// Samples a direction in the local z-up hemisphere uniformly.
fn uniform_sample_hemisphere(u: f32, v: f32) -> Vector {
    let z = u;
    let r = (1.0 - (z * z)).max(0.0).sqrt();
    let phi = 2.0 * PI * v;
    Vector::new(r * phi.cos(), r * phi.sin(), z)
}

fn cosine_hemisphere_direction(nor: Normal, rng: &mut WorkerRng) -> Vector {
    let local = cosine_sample_hemisphere(rng.uniform_01(), rng.uniform_01());
    zup_to_vec(local, nor.into_vector())
}

fn uniform_hemisphere_direction(nor: Normal, rng: &mut WorkerRng) -> Vector {
    let local = uniform_sample_hemisphere(rng.uniform_01(), rng.uniform_01());
    zup_to_vec(local, nor.into_vector())
}
