use glam::Vec3;

use crate::map::MapDefinition;
use crate::net::rand_u64;
use crate::object::Pose;

/// World queries used when placing a player avatar.
pub trait SceneQuery: Send {
    /// A spawn pose, preferring points away from `existing` positions.
    fn random_spawn_point(&self, existing: &[Vec3]) -> Pose;

    /// The highest walkable surface at or below `point`.
    fn ground_position_below(&self, point: Vec3) -> Vec3;
}

/// Answers scene queries from a map's static geometry.
#[derive(Debug, Clone)]
pub struct MapScene {
    map: MapDefinition,
}

impl MapScene {
    /// Spawn points closer than this to an existing player are avoided.
    const CLEARANCE: f32 = 1.5;

    pub fn new(map: MapDefinition) -> Self {
        Self { map }
    }

    pub fn map(&self) -> &MapDefinition {
        &self.map
    }
}

impl SceneQuery for MapScene {
    fn random_spawn_point(&self, existing: &[Vec3]) -> Pose {
        let points = &self.map.spawn_points;
        if points.is_empty() {
            return Pose::IDENTITY;
        }

        let clear: Vec<&Pose> = points
            .iter()
            .filter(|p| {
                existing
                    .iter()
                    .all(|e| e.distance(p.position) > Self::CLEARANCE)
            })
            .collect();

        let pool: Vec<&Pose> = if clear.is_empty() {
            points.iter().collect()
        } else {
            clear
        };
        *pool[(rand_u64() % pool.len() as u64) as usize]
    }

    fn ground_position_below(&self, point: Vec3) -> Vec3 {
        let y = self
            .map
            .geometry
            .iter()
            .filter(|g| g.covers(point) && g.top() <= point.y)
            .map(|g| g.top())
            .fold(f32::NEG_INFINITY, f32::max);

        if y.is_finite() {
            Vec3::new(point.x, y, point.z)
        } else {
            point
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::testing_ground;

    #[test]
    fn spawn_avoids_occupied_points() {
        let scene = MapScene::new(testing_ground());
        let occupied: Vec<Vec3> = scene.map().spawn_points[1..]
            .iter()
            .map(|p| p.position)
            .collect();

        for _ in 0..10 {
            let pose = scene.random_spawn_point(&occupied);
            assert_eq!(pose, scene.map().spawn_points[0]);
        }
    }

    #[test]
    fn spawn_falls_back_when_everything_is_taken() {
        let scene = MapScene::new(testing_ground());
        let occupied: Vec<Vec3> = scene.map().spawn_points.iter().map(|p| p.position).collect();

        let pose = scene.random_spawn_point(&occupied);
        assert!(scene.map().spawn_points.contains(&pose));
    }

    #[test]
    fn ground_below_finds_highest_surface() {
        let scene = MapScene::new(testing_ground());

        let on_box = scene.ground_position_below(Vec3::new(18.0, 10.0, 0.0));
        assert!((on_box.y - 4.0).abs() < 1e-5);

        let on_ground = scene.ground_position_below(Vec3::new(-20.0, 3.0, -20.0));
        assert!((on_ground.y - 0.1).abs() < 1e-5);
    }
}
