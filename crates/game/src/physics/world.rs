use glam::{Quat, Vec3};
use rapier3d::prelude::*;

/// Server-side rigid body world.
///
/// Free objects are dynamic bodies; an object somebody holds is switched to
/// a kinematic position-based body that follows the holder's reported pose.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(crate::net::DEFAULT_TICK_RATE)
    }
}

impl PhysicsWorld {
    pub fn new(tick_rate: u32) -> Self {
        let dt = 1.0 / tick_rate.max(1) as Real;
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = dt;
        integration_parameters.min_ccd_dt = dt / 100.0;

        Self {
            pipeline: PhysicsPipeline::new(),
            integration_parameters,
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, -9.81, 0.0),
        }
    }

    pub fn step(&mut self) {
        self.pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn add_ground(&mut self, y: Real, half_size: Real) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_size, 0.1, half_size)
            .translation(Vector::new(0.0, y, 0.0))
            .build();
        self.colliders.insert(collider)
    }

    pub fn add_static_box(&mut self, position: Vec3, half_extents: Vec3) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(Vector::new(position.x, position.y, position.z))
            .build();
        self.colliders.insert(collider)
    }

    pub fn add_dynamic_box(
        &mut self,
        position: Vec3,
        rotation: Quat,
        half_extents: Vec3,
        mass: Real,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(position.x, position.y, position.z))
            .ccd_enabled(true)
            .build();

        let handle = self.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .mass(mass)
            .friction(0.5)
            .restitution(0.3)
            .build();

        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        self.set_body_pose(handle, position, rotation);
        handle
    }

    /// Player avatars are driven entirely by their owner's reports.
    pub fn add_kinematic_capsule(
        &mut self,
        position: Vec3,
        radius: Real,
        height: Real,
    ) -> RigidBodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .translation(Vector::new(position.x, position.y, position.z))
            .lock_rotations()
            .build();

        let handle = self.bodies.insert(body);

        let half_height = height / 2.0;
        let collider = ColliderBuilder::cylinder(half_height, radius)
            .friction(0.0)
            .build();

        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);

        handle
    }

    /// Switches a body between free simulation and kinematic follow.
    pub fn set_kinematic(&mut self, handle: RigidBodyHandle, kinematic: bool) {
        let Some(body) = self.bodies.get_mut(handle) else {
            return;
        };

        if kinematic {
            body.set_body_type(RigidBodyType::KinematicPositionBased, true);
        } else {
            body.set_body_type(RigidBodyType::Dynamic, true);
            body.set_linvel(Vector::new(0.0, 0.0, 0.0), true);
            body.set_angvel(Vector::new(0.0, 0.0, 0.0), true);
        }
    }

    pub fn is_kinematic(&self, handle: RigidBodyHandle) -> bool {
        self.bodies
            .get(handle)
            .is_some_and(|b| b.is_kinematic())
    }

    pub fn set_next_kinematic_pose(
        &mut self,
        handle: RigidBodyHandle,
        position: Vec3,
        rotation: Quat,
    ) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let rot =
                Rotation::from_xyzw(rotation.x, rotation.y, rotation.z, rotation.w).normalize();
            let new_pose = Pose::from_parts(Vector::new(position.x, position.y, position.z), rot);
            body.set_next_kinematic_position(new_pose);
        }
    }

    pub fn set_body_pose(&mut self, handle: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(body) = self.bodies.get_mut(handle) {
            let rot =
                Rotation::from_xyzw(rotation.x, rotation.y, rotation.z, rotation.w).normalize();
            let new_pose = Pose::from_parts(Vector::new(position.x, position.y, position.z), rot);
            body.set_position(new_pose, true);
        }
    }

    pub fn body_transform(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        self.bodies.get(handle).map(|b| {
            let t = b.translation();
            let r = b.rotation();
            (
                Vec3::new(t.x, t.y, t.z),
                Quat::from_xyzw(r.x, r.y, r.z, r.w).normalize(),
            )
        })
    }

    pub fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_body_falls_onto_ground() {
        let mut physics = PhysicsWorld::new(60);
        physics.add_ground(0.0, 50.0);
        let handle = physics.add_dynamic_box(
            Vec3::new(0.0, 3.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(0.25),
            1.0,
        );

        for _ in 0..240 {
            physics.step();
        }

        let (position, _) = physics.body_transform(handle).unwrap();
        assert!(position.y < 1.0);
        assert!(position.y > 0.0);
    }

    #[test]
    fn kinematic_body_follows_target_and_ignores_gravity() {
        let mut physics = PhysicsWorld::new(60);
        let handle = physics.add_dynamic_box(
            Vec3::new(0.0, 5.0, 0.0),
            Quat::IDENTITY,
            Vec3::splat(0.25),
            1.0,
        );

        physics.set_kinematic(handle, true);
        assert!(physics.is_kinematic(handle));

        let target = Vec3::new(1.0, 5.0, -2.0);
        for _ in 0..10 {
            physics.set_next_kinematic_pose(handle, target, Quat::IDENTITY);
            physics.step();
        }

        let (position, _) = physics.body_transform(handle).unwrap();
        assert!(position.abs_diff_eq(target, 1e-3));

        physics.set_kinematic(handle, false);
        assert!(!physics.is_kinematic(handle));
        for _ in 0..30 {
            physics.step();
        }
        let (position, _) = physics.body_transform(handle).unwrap();
        assert!(position.y < target.y);
    }

    #[test]
    fn removed_body_has_no_transform() {
        let mut physics = PhysicsWorld::new(30);
        let handle = physics.add_dynamic_box(Vec3::ZERO, Quat::IDENTITY, Vec3::splat(0.5), 2.0);
        physics.remove_body(handle);

        assert!(physics.body_transform(handle).is_none());
        assert_eq!(physics.body_count(), 0);
    }
}
