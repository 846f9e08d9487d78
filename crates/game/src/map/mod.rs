mod objects;
pub mod testing_ground;

pub use objects::{GeometryKind, MapGeometry, StartingObject};
pub use testing_ground::testing_ground;

use crate::object::Pose;
use crate::physics::PhysicsWorld;

/// Everything a lobby loads from its map.
#[derive(Debug, Clone)]
pub struct MapDefinition {
    pub name: String,
    pub geometry: Vec<MapGeometry>,
    /// Spawned in this order when the lobby starts.
    pub starting_objects: Vec<StartingObject>,
    pub spawn_points: Vec<Pose>,
}

impl MapDefinition {
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            testing_ground::NAME => Some(testing_ground()),
            _ => None,
        }
    }

    pub fn build_geometry(&self, physics: &mut PhysicsWorld) {
        for piece in &self.geometry {
            match piece.kind {
                GeometryKind::Ground => {
                    physics.add_ground(piece.position.y, piece.half_extents.x);
                }
                GeometryKind::StaticBox => {
                    physics.add_static_box(piece.position, piece.half_extents);
                }
            }
        }
    }
}
