use glam::{Quat, Vec3};

use crate::object::Pose;

use super::{MapDefinition, MapGeometry, StartingObject};

pub const NAME: &str = "testing_ground";

/// Server prefab keys used by the testing ground.
pub mod prefabs {
    use crate::object::PrefabKey;

    pub const CRATE: PrefabKey = 1;
    pub const LANTERN: PrefabKey = 2;
    pub const BELL: PrefabKey = 3;
}

const GROUND_SIZE: f32 = 100.0;
const GROUND_Y: f32 = 0.0;

pub fn testing_ground() -> MapDefinition {
    let mut geometry = vec![MapGeometry::ground(GROUND_Y, GROUND_SIZE)];
    add_platform_obstacles(&mut geometry);
    add_stair_platforms(&mut geometry);

    MapDefinition {
        name: String::from(NAME),
        geometry,
        starting_objects: starting_objects(),
        spawn_points: spawn_points(),
    }
}

fn add_platform_obstacles(geometry: &mut Vec<MapGeometry>) {
    let steps = [
        (Vec3::new(5.0, 0.25, 0.0), Vec3::new(1.0, 0.25, 1.0)),
        (Vec3::new(8.0, 0.5, 0.0), Vec3::new(1.0, 0.5, 1.0)),
        (Vec3::new(11.0, 1.0, 0.0), Vec3::new(1.0, 1.0, 1.0)),
        (Vec3::new(14.0, 1.5, 0.0), Vec3::new(1.5, 1.5, 1.5)),
        (Vec3::new(18.0, 2.0, 0.0), Vec3::new(2.0, 2.0, 2.0)),
    ];
    for (position, half_extents) in steps {
        geometry.push(MapGeometry::static_box(position, half_extents));
    }
}

fn add_stair_platforms(geometry: &mut Vec<MapGeometry>) {
    let stair_start = Vec3::new(-5.0, 0.0, 5.0);
    let step_height = 0.3;
    let step_depth = 0.4;
    let step_width = 2.0;

    for i in 0..10 {
        let y = step_height * (i as f32 + 0.5);
        let z = stair_start.z + step_depth * i as f32;
        geometry.push(MapGeometry::static_box(
            Vec3::new(stair_start.x, y, z),
            Vec3::new(step_width, step_height * 0.5, step_depth * 0.5),
        ));
    }
}

fn starting_objects() -> Vec<StartingObject> {
    let mut objects = vec![
        StartingObject::new(prefabs::LANTERN, Vec3::new(3.0, 1.0, 3.0)),
        StartingObject::new(prefabs::BELL, Vec3::new(3.5, 1.0, 3.0)),
        StartingObject::new(prefabs::CRATE, Vec3::new(4.0, 1.0, 3.0)),
    ];

    for i in 0..5 {
        objects.push(StartingObject::new(
            prefabs::CRATE,
            Vec3::new(-3.0 + i as f32 * 0.5, 0.5 + i as f32 * 0.5, -5.0),
        ));
    }

    objects
}

fn spawn_points() -> Vec<Pose> {
    (0..8)
        .map(|i| {
            let angle = i as f32 * std::f32::consts::TAU / 8.0;
            let position = Vec3::new(angle.cos() * 6.0, 1.0, angle.sin() * 6.0);
            // face the centre of the ground
            Pose::new(position, Quat::from_rotation_y(-angle - std::f32::consts::FRAC_PI_2))
        })
        .collect()
}
