use grasp::{ObjectId, PeerId, PlayerId, PrefabKey};

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    PeerConnected {
        peer: PeerId,
    },
    UserJoined {
        player_id: PlayerId,
        display_name: String,
    },
    UserJoinedGame {
        player_id: PlayerId,
    },
    UserLeft {
        player_id: PlayerId,
        reason: DisconnectReason,
    },
    HandshakeTimedOut {
        peer: PeerId,
    },
    ConnectionDenied {
        peer: PeerId,
        reason: String,
    },
    ObjectSpawned {
        id: ObjectId,
        prefab: PrefabKey,
    },
    ObjectDestroyed {
        id: ObjectId,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    Graceful,
    Kicked,
    Shutdown,
}

impl DisconnectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisconnectReason::Graceful => "disconnected",
            DisconnectReason::Kicked => "kicked",
            DisconnectReason::Shutdown => "server shutting down",
        }
    }
}
