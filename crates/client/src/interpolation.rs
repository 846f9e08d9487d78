use grasp::Pose;

/// Client-side view of one replicated pose.
///
/// Snapshots only move the target; `update` walks the rendered pose toward
/// it every frame, so a dropped snapshot just means a longer walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicatedTransform {
    current: Pose,
    target: Pose,
    latest_tick: Option<u32>,
}

impl ReplicatedTransform {
    /// A transform that has not seen a snapshot yet; the first one teleports.
    pub fn spawned_at(pose: Pose) -> Self {
        Self {
            current: pose,
            target: pose,
            latest_tick: None,
        }
    }

    /// Returns false when the snapshot is older than one already applied.
    pub fn apply_snapshot(&mut self, tick: u32, pose: Pose) -> bool {
        match self.latest_tick {
            None => {
                self.current = pose;
                self.target = pose;
            }
            Some(latest) if tick < latest => return false,
            Some(_) => self.target = pose,
        }
        self.latest_tick = Some(tick);
        true
    }

    /// Moves the target without touching snapshot ordering.
    pub fn set_target(&mut self, pose: Pose) {
        self.target = pose;
    }

    /// Jumps straight to `pose`, e.g. for objects this client drives itself.
    pub fn teleport(&mut self, pose: Pose) {
        self.current = pose;
        self.target = pose;
    }

    pub fn update(&mut self, dt: f32, rate: f32) {
        let t = dt * rate;
        if t >= 1.0 {
            self.current = self.target;
        } else if t > 0.0 {
            self.current = self.current.lerp(&self.target, t);
        }
    }

    pub fn current(&self) -> Pose {
        self.current
    }

    pub fn target(&self) -> Pose {
        self.target
    }

    pub fn latest_tick(&self) -> Option<u32> {
        self.latest_tick
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;

    fn at(x: f32) -> Pose {
        Pose::at(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn first_snapshot_teleports() {
        let mut transform = ReplicatedTransform::spawned_at(Pose::IDENTITY);
        assert!(transform.apply_snapshot(40, at(10.0)));

        assert_eq!(transform.current(), at(10.0));
        assert_eq!(transform.latest_tick(), Some(40));
    }

    #[test]
    fn later_snapshots_only_move_the_target() {
        let mut transform = ReplicatedTransform::spawned_at(Pose::IDENTITY);
        transform.apply_snapshot(1, at(0.0));
        transform.apply_snapshot(2, at(4.0));

        assert_eq!(transform.current(), at(0.0));
        assert_eq!(transform.target(), at(4.0));
    }

    #[test]
    fn out_of_order_snapshot_loses_to_newer_one() {
        let mut transform = ReplicatedTransform::spawned_at(Pose::IDENTITY);
        transform.apply_snapshot(1, at(0.0));

        assert!(transform.apply_snapshot(10, at(10.0)));
        assert!(!transform.apply_snapshot(9, at(9.0)));

        assert_eq!(transform.target(), at(10.0));
        assert_eq!(transform.latest_tick(), Some(10));
    }

    #[test]
    fn same_tick_is_accepted() {
        let mut transform = ReplicatedTransform::spawned_at(Pose::IDENTITY);
        transform.apply_snapshot(5, at(1.0));
        assert!(transform.apply_snapshot(5, at(2.0)));
        assert_eq!(transform.target(), at(2.0));
    }

    #[test]
    fn smoothing_converges_on_target() {
        let mut transform = ReplicatedTransform::spawned_at(Pose::IDENTITY);
        transform.apply_snapshot(1, at(0.0));
        let target = Pose::new(Vec3::new(3.0, 1.0, -2.0), Quat::from_rotation_y(1.2));
        transform.apply_snapshot(2, target);

        let mut previous = transform.current().distance(&target);
        for _ in 0..120 {
            transform.update(1.0 / 60.0, 15.0);
            let distance = transform.current().distance(&target);
            assert!(distance <= previous + 1e-5);
            previous = distance;
        }
        assert!(previous < 1e-3);
        assert!(transform.current().rotation.abs_diff_eq(target.rotation, 1e-3));
    }

    #[test]
    fn large_step_does_not_overshoot() {
        let mut transform = ReplicatedTransform::spawned_at(Pose::IDENTITY);
        transform.apply_snapshot(1, at(0.0));
        transform.apply_snapshot(2, at(1.0));

        transform.update(10.0, 15.0);
        assert_eq!(transform.current(), at(1.0));
    }
}
