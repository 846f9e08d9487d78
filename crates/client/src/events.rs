use glam::Vec3;
use grasp::{ObjectId, PlayerId, Verb};

#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    Connected {
        player_id: PlayerId,
        lobby_id: u64,
    },
    Rejected {
        reason: String,
    },
    Disconnected,
    UserJoined {
        player_id: PlayerId,
        display_name: String,
    },
    UserRenamed {
        player_id: PlayerId,
        display_name: String,
    },
    UserLeft {
        player_id: PlayerId,
    },
    UserJoinedGame {
        player_id: PlayerId,
    },
    /// The authority accepted `verb` on `target` for `player`.
    Granted {
        verb: Verb,
        target: ObjectId,
        player: PlayerId,
    },
    /// Only ever raised on the client that asked.
    Denied {
        verb: Verb,
        target: ObjectId,
    },
    ObjectSpawned {
        id: ObjectId,
    },
    ObjectDestroyed {
        id: ObjectId,
    },
    GroundHit {
        player_id: PlayerId,
        position: Vec3,
        speed: f32,
    },
}
