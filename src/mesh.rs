//! Triangulated surfaces and the mesh-ingestion boundary: the core never
//! reads STL/OBJ itself, only already-decoded `(V, F, N, C, P)` array
//! views, which it copies into owned, normal-validated storage.
#![allow(dead_code)]

use crate::error::GeometryError;
use crate::math::{cross, Normal, Point};

/// Tolerance for the unit-normal invariant.
const NORMAL_UNIT_EPS: f32 = 1e-4;

/// An immutable, owned triangulated surface: vertices, faces, per-face
/// outward normals, and per-face material id/parameter.
///
/// Layout favors cache locality in the intersection kernel's inner loop:
/// vertices are stored contiguously as `(x, y, z)` triples, while
/// faces/normals/materials are face-contiguous (row-major) so that
/// iterating faces touches one cache line of each array in step.
#[derive(Debug, Clone)]
pub struct TriangleSurface {
    vertices: Vec<Point>,
    faces: Vec<[u32; 3]>,
    normals: Vec<Normal>,
    material_id: Vec<u32>,
    material_param: Vec<f32>,
}

impl TriangleSurface {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns the face's three vertex positions and its outward normal.
    pub fn get_element(&self, j: usize) -> (Point, Point, Point, Normal) {
        let f = self.faces[j];
        (
            self.vertices[f[0] as usize],
            self.vertices[f[1] as usize],
            self.vertices[f[2] as usize],
            self.normals[j],
        )
    }

    pub fn material(&self, j: usize) -> (u32, f32) {
        (self.material_id[j], self.material_param[j])
    }

    pub fn face_indices(&self) -> impl Iterator<Item = usize> {
        0..self.faces.len()
    }
}

/// Builds a validated [`TriangleSurface`] from raw array views, the
/// external mesh-loading collaborator's contract.
///
/// `v`: vertex positions. `f`: 0-based vertex index triples per face.
/// `n`: per-face outward unit normals. `c`: per-face material ids.
/// `p`: per-face material parameters.
pub fn build_triangle_surface(
    v: &[[f32; 3]],
    f: &[[u32; 3]],
    n: &[[f32; 3]],
    c: &[u32],
    p: &[f32],
) -> Result<TriangleSurface, GeometryError> {
    if n.len() != f.len() {
        return Err(GeometryError::MismatchedLength {
            what: "normals",
            faces: f.len(),
            got: n.len(),
        });
    }
    if c.len() != f.len() {
        return Err(GeometryError::MismatchedLength {
            what: "material ids",
            faces: f.len(),
            got: c.len(),
        });
    }
    if p.len() != f.len() {
        return Err(GeometryError::MismatchedLength {
            what: "material params",
            faces: f.len(),
            got: p.len(),
        });
    }

    let vertices: Vec<Point> = v.iter().map(|p| Point::new(p[0], p[1], p[2])).collect();

    for (face_idx, face) in f.iter().enumerate() {
        for &idx in face {
            if idx as usize >= vertices.len() {
                return Err(GeometryError::IndexOutOfRange {
                    face: face_idx,
                    index: idx,
                });
            }
        }

        let a = vertices[face[0] as usize];
        let b = vertices[face[1] as usize];
        let c_pt = vertices[face[2] as usize];
        let twice_area = cross(b - a, c_pt - a).length();
        if twice_area <= f32::EPSILON {
            return Err(GeometryError::ZeroAreaFace { face: face_idx });
        }
    }

    let normals: Vec<Normal> = n
        .iter()
        .enumerate()
        .map(|(face_idx, n)| {
            let nv = Normal::new(n[0], n[1], n[2]);
            let len = nv.length();
            if (len - 1.0).abs() > NORMAL_UNIT_EPS {
                Err(GeometryError::NonUnitNormal {
                    face: face_idx,
                    length: len,
                })
            } else {
                Ok(nv.normalized())
            }
        })
        .collect::<Result<_, _>>()?;

    Ok(TriangleSurface {
        vertices,
        faces: f.to_vec(),
        normals,
        material_id: c.to_vec(),
        material_param: p.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_quad() -> (Vec<[f32; 3]>, Vec<[u32; 3]>, Vec<[f32; 3]>, Vec<u32>, Vec<f32>) {
        let v = vec![
            [-1.0, 0.0, -1.0],
            [1.0, 0.0, -1.0],
            [1.0, 0.0, 1.0],
            [-1.0, 0.0, 1.0],
        ];
        let f = vec![[0, 1, 2], [0, 2, 3]];
        let n = vec![[0.0, 1.0, 0.0], [0.0, 1.0, 0.0]];
        let c = vec![0, 0];
        let p = vec![0.0, 0.0];
        (v, f, n, c, p)
    }

    #[test]
    fn builds_valid_surface() {
        let (v, f, n, c, p) = unit_quad();
        let surf = build_triangle_surface(&v, &f, &n, &c, &p).unwrap();
        assert_eq!(surf.face_count(), 2);
        let (a, b, cc, nor) = surf.get_element(0);
        assert_eq!(a, Point::new(-1.0, 0.0, -1.0));
        assert_eq!(b, Point::new(1.0, 0.0, -1.0));
        assert_eq!(cc, Point::new(1.0, 0.0, 1.0));
        assert!((nor.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_index_out_of_range() {
        let (v, mut f, n, c, p) = unit_quad();
        f[0][2] = 99;
        assert!(matches!(
            build_triangle_surface(&v, &f, &n, &c, &p),
            Err(GeometryError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_non_unit_normal() {
        let (v, f, mut n, c, p) = unit_quad();
        n[0] = [0.0, 2.0, 0.0];
        assert!(matches!(
            build_triangle_surface(&v, &f, &n, &c, &p),
            Err(GeometryError::NonUnitNormal { .. })
        ));
    }

    #[test]
    fn rejects_zero_area_face() {
        let (mut v, f, n, c, p) = unit_quad();
        v[1] = v[0];
        assert!(matches!(
            build_triangle_surface(&v, &f, &n, &c, &p),
            Err(GeometryError::ZeroAreaFace { .. })
        ));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let (v, f, n, c, p) = unit_quad();
        assert!(matches!(
            build_triangle_surface(&v, &f, &n, &c, &p[..1]),
            Err(GeometryError::MismatchedLength { .. })
        ));
    }
}
