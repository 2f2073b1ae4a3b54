//! Analytic sphere (part of C3 Scene): a sphere resting on the sample,
//! optionally present.
#![allow(dead_code)]

use crate::math::Point;

#[derive(Debug, Copy, Clone)]
pub struct AnalyticSphere {
    pub centre: Point,
    pub radius: f32,
    pub material_id: u32,
    pub material_param: f32,
    pub present: bool,
}

impl AnalyticSphere {
    pub fn new(centre: Point, radius: f32, material_id: u32, material_param: f32) -> AnalyticSphere {
        AnalyticSphere {
            centre,
            radius,
            material_id,
            material_param,
            present: true,
        }
    }

    pub fn absent() -> AnalyticSphere {
        AnalyticSphere {
            centre: Point::origin(),
            radius: 1.0,
            material_id: 0,
            material_param: 0.0,
            present: false,
        }
    }
}
