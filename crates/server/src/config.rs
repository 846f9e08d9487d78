use grasp::{DEFAULT_TICK_RATE, LobbyId, LobbySettings};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub lobby_id: LobbyId,
    pub lobby: LobbySettings,
    pub tick_rate: u32,
    /// How long a connected peer may take to send its connection request.
    pub handshake_timeout_secs: f32,
    /// Transform snapshots go out every this many ticks.
    pub snapshot_send_rate: u32,
    /// Owners already know the pose of what they drive.
    pub exclude_owner_from_snapshots: bool,
    pub lobby_tick_interval: u32,
    pub heartbeat_interval_ticks: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            lobby_id: 1,
            lobby: LobbySettings::default(),
            tick_rate: DEFAULT_TICK_RATE,
            handshake_timeout_secs: 5.0,
            snapshot_send_rate: 1,
            exclude_owner_from_snapshots: true,
            lobby_tick_interval: DEFAULT_TICK_RATE,
            heartbeat_interval_ticks: DEFAULT_TICK_RATE * 30,
        }
    }
}

impl ServerConfig {
    pub fn handshake_timeout_ticks(&self) -> u32 {
        (self.handshake_timeout_secs.max(0.0) * self.tick_rate as f32).ceil() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_timeout_rounds_up_to_whole_ticks() {
        let config = ServerConfig {
            tick_rate: 30,
            handshake_timeout_secs: 0.5,
            ..Default::default()
        };
        assert_eq!(config.handshake_timeout_ticks(), 15);

        let config = ServerConfig {
            tick_rate: 60,
            handshake_timeout_secs: 0.01,
            ..Default::default()
        };
        assert_eq!(config.handshake_timeout_ticks(), 1);
    }
}
