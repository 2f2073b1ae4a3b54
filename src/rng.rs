//! RNG service: a reproducible per-worker pseudorandom stream.
#![allow(dead_code)]

use std::f32::consts::PI;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;

use crate::hash::hash_u64;
use crate::math::Vector;

/// A single worker's random stream.
///
/// Seeding is deterministic from a user-supplied seed combined with the
/// worker index via [`crate::hash::hash_u64`], which implements the
/// "combine a seed with an index into a new well-distributed seed"
/// operation this needs. Reproducing a run with an identical seed and
/// worker count yields identical streams, and therefore identical
/// tallies.
pub struct WorkerRng {
    rng: Pcg32,
    spare_gaussian: Option<f32>,
}

impl WorkerRng {
    pub fn new(seed: u64, worker_index: u32) -> WorkerRng {
        let combined = hash_u64(seed, worker_index as u64);
        WorkerRng {
            rng: Pcg32::seed_from_u64(combined),
            spare_gaussian: None,
        }
    }

    /// Uniform real on `[0, 1)`.
    pub fn uniform_01(&mut self) -> f32 {
        // 24 bits of mantissa precision, scaled into [0, 1).
        (self.rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Uniform real on `[-1, 1)`.
    pub fn uniform_signed(&mut self) -> f32 {
        (self.uniform_01() * 2.0) - 1.0
    }

    /// Uniform unit vector on the sphere.
    pub fn uniform_unit_vector(&mut self) -> Vector {
        let z = 1.0 - (2.0 * self.uniform_01());
        let r = (1.0 - (z * z)).max(0.0).sqrt();
        let phi = 2.0 * PI * self.uniform_01();
        Vector::new(r * phi.cos(), r * phi.sin(), z)
    }

    /// A pair of independent, standard-normal-distributed samples scaled to
    /// mean `mu` and standard deviation `sigma`, via the Box-Muller
    /// transform.
    pub fn gaussian_pair(&mut self, mu: f32, sigma: f32) -> (f32, f32) {
        let u1 = self.uniform_01().max(f32::MIN_POSITIVE);
        let u2 = self.uniform_01();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        let z0 = r * theta.cos();
        let z1 = r * theta.sin();
        (mu + (sigma * z0), mu + (sigma * z1))
    }

    /// A single standard-normal-distributed sample, scaled to mean `mu` and
    /// standard deviation `sigma`. Caches the Box-Muller transform's second
    /// output across calls so no entropy is wasted.
    pub fn gaussian(&mut self, mu: f32, sigma: f32) -> f32 {
        if let Some(spare) = self.spare_gaussian.take() {
            return mu + (sigma * spare);
        }
        let (z0, z1) = self.standard_normal_pair();
        self.spare_gaussian = Some(z1);
        mu + (sigma * z0)
    }

    fn standard_normal_pair(&mut self) -> (f32, f32) {
        let u1 = self.uniform_01().max(f32::MIN_POSITIVE);
        let u2 = self.uniform_01();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        (r * theta.cos(), r * theta.sin())
    }
}
