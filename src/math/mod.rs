#![allow(dead_code)]

mod normal;
mod point;
mod vector;

pub use self::normal::Normal;
pub use self::point::Point;
pub use self::vector::Vector;

/// Trait for calculating dot products.
pub trait DotProduct {
    fn dot(self, other: Self) -> f32;
}

pub fn dot<T: DotProduct>(a: T, b: T) -> f32 {
    a.dot(b)
}

/// Trait for calculating cross products.
pub trait CrossProduct {
    fn cross(self, other: Self) -> Self;
}

pub fn cross<T: CrossProduct>(a: T, b: T) -> T {
    a.cross(b)
}

/// Clamps a value between a min and max.
pub fn clamp<T: PartialOrd>(v: T, lower: T, upper: T) -> T {
    if v < lower {
        lower
    } else if v > upper {
        upper
    } else {
        v
    }
}

/// Propagates a ray origin `t` units along `dir`: `origin + t * dir`.
pub fn propagate(origin: Point, dir: Vector, t: f32) -> Point {
    origin + (dir * t)
}

/// Reflects direction `d` about normal `n`: `d - 2(d.n)n`.
///
/// `n` is assumed normalized; `d` need not be.
pub fn reflect(d: Vector, n: Normal) -> Vector {
    let n = n.into_vector();
    d - (n * (2.0 * dot(d, n)))
}

/// Solves the 3x3 linear system `a * (u0, u1, u2) = v` via Cramer's rule.
///
/// `a` is given as three column vectors. Returns `None` when the system is
/// singular to within `eps` (i.e. `|det a| <= eps`), mirroring the
/// "ok" flag of the original formulation but as an `Option` rather than a
/// bool-and-value pair.
pub fn solve3x3(a: (Vector, Vector, Vector), v: Vector, eps: f32) -> Option<(f32, f32, f32)> {
    let (c0, c1, c2) = a;
    let det = dot(c0, cross(c1, c2));
    if det.abs() <= eps {
        return None;
    }

    let inv_det = 1.0 / det;
    let u0 = dot(v, cross(c1, c2)) * inv_det;
    let u1 = dot(c0, cross(v, c2)) * inv_det;
    let u2 = dot(c0, cross(c1, v)) * inv_det;

    Some((u0, u1, u2))
}

/// Maps `from`, a vector expressed in a z-up local frame, into the space
/// whose z-up is `toz` (which need not be normalized).
///
/// Used to place hemisphere/cone samples generated around (0,0,1) around an
/// arbitrary surface normal. Orthonormal basis construction follows "Building
/// an Orthonormal Basis, Revisited" by Duff et al.
pub fn zup_to_vec(from: Vector, toz: Vector) -> Vector {
    let toz = toz.normalized();
    let sign = toz.z().signum();
    let a = -1.0 / (sign + toz.z());
    let b = toz.x() * toz.y() * a;

    let tox = Vector::new(1.0 + (sign * toz.x() * toz.x() * a), sign * b, -sign * toz.x());
    let toy = Vector::new(b, sign + (toz.y() * toz.y() * a), -toz.y());

    (tox * from.x()) + (toy * from.y()) + (toz * from.z())
}

/// Rotates `v` about unit axis `axis` by `angle` radians, via Rodrigues'
/// rotation formula.
pub fn rotate_about_axis(v: Vector, axis: Vector, angle: f32) -> Vector {
    let (s, c) = angle.sin_cos();
    (v * c) + (cross(axis, v) * s) + (axis * (dot(axis, v) * (1.0 - c)))
}
