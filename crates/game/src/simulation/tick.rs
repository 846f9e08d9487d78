/// Real-time accumulator that turns frame deltas into whole fixed ticks.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
}

impl FixedTimestep {
    /// Longest frame delta that is fed into the accumulator at once.
    const MAX_FRAME_DELTA: f32 = 0.25;

    pub fn new(tick_rate: u32) -> Self {
        let tick_rate = tick_rate.max(1);
        Self {
            dt: 1.0 / tick_rate as f32,
            accumulator: 0.0,
        }
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.clamp(0.0, Self::MAX_FRAME_DELTA);
    }

    pub fn should_tick(&self) -> bool {
        self.accumulator >= self.dt
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.dt {
            self.accumulator -= self.dt;
            true
        } else {
            false
        }
    }

    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }
}

/// Ticks `delta` seconds are worth, consuming them from `timestep`.
pub fn drain_ticks(timestep: &mut FixedTimestep, delta: f32) -> u32 {
    timestep.accumulate(delta);
    let mut ticks = 0;
    while timestep.consume_tick() {
        ticks += 1;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_timestep_accumulation() {
        let mut ts = FixedTimestep::new(60);

        ts.accumulate(1.0 / 30.0);
        assert!(ts.should_tick());
        assert!(ts.consume_tick());
        assert!(ts.consume_tick());
        assert!(!ts.consume_tick());
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut ts = FixedTimestep::new(10);
        assert_eq!(drain_ticks(&mut ts, 5.0), 2);
        assert!(ts.alpha() < 1.0);
    }

    #[test]
    fn negative_delta_is_ignored() {
        let mut ts = FixedTimestep::new(20);
        ts.accumulate(-1.0);
        assert!(!ts.should_tick());
    }
}
