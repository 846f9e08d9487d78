use glam::Vec3;

use crate::object::{Pose, PrefabKey};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryKind {
    Ground,
    StaticBox,
}

/// Static collision geometry. Never replicated; every peer loads it with
/// the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapGeometry {
    pub kind: GeometryKind,
    pub position: Vec3,
    pub half_extents: Vec3,
}

impl MapGeometry {
    pub fn ground(y: f32, half_size: f32) -> Self {
        Self {
            kind: GeometryKind::Ground,
            position: Vec3::new(0.0, y, 0.0),
            half_extents: Vec3::new(half_size, 0.1, half_size),
        }
    }

    pub fn static_box(position: Vec3, half_extents: Vec3) -> Self {
        Self {
            kind: GeometryKind::StaticBox,
            position,
            half_extents,
        }
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.half_extents.y
    }

    /// Whether `point` lies inside this geometry's footprint on the xz plane.
    pub fn covers(&self, point: Vec3) -> bool {
        (point.x - self.position.x).abs() <= self.half_extents.x
            && (point.z - self.position.z).abs() <= self.half_extents.z
    }
}

/// A replicated object that exists as part of the map itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartingObject {
    /// Server-side prefab key.
    pub prefab: PrefabKey,
    pub pose: Pose,
}

impl StartingObject {
    pub fn new(prefab: PrefabKey, position: Vec3) -> Self {
        Self {
            prefab,
            pose: Pose::at(position),
        }
    }
}
