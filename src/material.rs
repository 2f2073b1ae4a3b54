//! Maps a face's material id to the scattering law and reflectivity it
//! selects, closing the loop between C3's per-face material ids and C4's
//! per-facet scattering laws.
#![allow(dead_code)]

use crate::scattering::ScatterLawUnion;

/// One entry: the scattering law a material id selects, and the
/// probability a ray survives a scattering event off it (the complement is
/// absorption, which kills the ray immediately).
#[derive(Debug, Copy, Clone)]
pub struct Material {
    pub law: ScatterLawUnion,
    pub reflectivity: f32,
}

/// An ordered table of materials, indexed by the material id carried by
/// mesh faces and the analytic sphere.
#[derive(Debug, Clone)]
pub struct MaterialTable {
    entries: Vec<Material>,
}

impl MaterialTable {
    pub fn new(entries: Vec<Material>) -> MaterialTable {
        MaterialTable { entries }
    }

    /// A table with a single material at id 0, covering the common case of
    /// a uniformly-scattering sample (the parameter file's single
    /// `scattering`/`reflectivity` configuration keys).
    pub fn uniform(law: ScatterLawUnion, reflectivity: f32) -> MaterialTable {
        MaterialTable::new(vec![Material { law, reflectivity }])
    }

    pub fn get(&self, material_id: u32) -> Material {
        self.entries[material_id as usize % self.entries.len()]
    }
}
