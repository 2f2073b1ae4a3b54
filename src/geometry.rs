//! Geometry primitives: ray-triangle and ray-sphere intersection tests,
//! built on top of the vector algebra in [`crate::math`].
#![allow(dead_code)]

use crate::math::{cross, dot, solve3x3, Normal, Point, Vector};

/// Tolerance below which a 3x3 system is considered singular in the
/// ray-triangle solve.
pub const SINGULAR_EPS: f32 = 1e-10;

/// The result of a successful ray-triangle intersection test.
#[derive(Debug, Copy, Clone)]
pub struct TriHit {
    pub t: f32,
    pub beta: f32,
    pub gamma: f32,
}

/// The outcome of testing a ray against a single triangle: a genuine hit, an
/// ordinary miss (outside the triangle or behind the origin), or a singular
/// 3x3 system (a numerical degeneracy tallied by the caller rather than
/// treated as a plain miss).
#[derive(Debug, Copy, Clone)]
pub enum TriTest {
    Hit(TriHit),
    Miss,
    Singular,
}

/// Intersects the ray `orig + t * dir` (`t > 0`) against the triangle
/// `(a, b, c)` using the parametric form `e + t*d = a + beta*(b-a) +
/// gamma*(c-a)`, i.e. solving `-t*dir + beta*edge1 + gamma*edge2 = orig - a`.
///
/// Reports [`TriTest::Singular`] when `|det| <= `[`SINGULAR_EPS`], a miss
/// when the solution falls outside the triangle (`beta < 0`, `gamma < 0`,
/// `beta + gamma > 1`) or behind the ray origin (`t <= 0`), else a hit.
pub fn intersect_triangle(orig: Point, dir: Vector, tri: (Point, Point, Point)) -> TriTest {
    let (a, b, c) = tri;
    let edge1 = b - a;
    let edge2 = c - a;
    let rhs = orig - a;

    let (t, beta, gamma) = match solve3x3((-dir, edge1, edge2), rhs, SINGULAR_EPS) {
        Some(solved) => solved,
        None => return TriTest::Singular,
    };

    if beta < 0.0 || gamma < 0.0 || (beta + gamma) > 1.0 || t <= 0.0 {
        return TriTest::Miss;
    }

    TriTest::Hit(TriHit { t, beta, gamma })
}

/// Intersects the ray `orig + t * dir` against the sphere centred at `c`
/// with radius `r`.
///
/// Solves `t^2 + beta*t + gamma = 0` with `beta = 2*d.(e-c)`, `gamma =
/// |e-c|^2 - r^2`, taking the smaller non-negative root. Returns `None` on a
/// negative discriminant or when both roots are non-positive.
pub fn intersect_sphere(orig: Point, dir: Vector, centre: Point, radius: f32) -> Option<f32> {
    let oc = orig - centre;
    let a = dot(dir, dir);
    let beta = 2.0 * dot(dir, oc);
    let gamma = dot(oc, oc) - (radius * radius);

    let discriminant = (beta * beta) - (4.0 * a * gamma);
    if discriminant < 0.0 {
        return None;
    }

    let sqrt_disc = discriminant.sqrt();
    let inv_2a = 0.5 / a;
    let t0 = (-beta - sqrt_disc) * inv_2a;
    let t1 = (-beta + sqrt_disc) * inv_2a;

    let (t_near, t_far) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };

    if t_near > 0.0 {
        Some(t_near)
    } else if t_far > 0.0 {
        Some(t_far)
    } else {
        None
    }
}

/// Computes the outward normal of a sphere at `point`, given its centre.
pub fn sphere_normal(point: Point, centre: Point) -> Normal {
    (point - centre).normalized().into_normal()
}

/// Returns whether all three triangle vertices lie strictly behind the ray
/// origin along `dir` (i.e. the ray is moving away from the whole triangle).
/// A cheap reject used by the intersection kernel ahead of the full solve.
pub fn behind_ray(orig: Point, dir: Vector, tri: (Point, Point, Point)) -> bool {
    dot(tri.0 - orig, dir) <= 0.0 && dot(tri.1 - orig, dir) <= 0.0 && dot(tri.2 - orig, dir) <= 0.0
}

/// Interpolates a triangle's face point at barycentric coordinates
/// `(1 - beta - gamma, beta, gamma)`.
pub fn triangle_point(tri: (Point, Point, Point), beta: f32, gamma: f32) -> Point {
    let alpha = 1.0 - beta - gamma;
    Point::new(
        (tri.0.x * alpha) + (tri.1.x * beta) + (tri.2.x * gamma),
        (tri.0.y * alpha) + (tri.1.y * beta) + (tri.2.y * gamma),
        (tri.0.z * alpha) + (tri.1.z * beta) + (tri.2.z * gamma),
    )
}
