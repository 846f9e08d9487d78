use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::net::{Decode, Encode, Packet, PacketError};
use crate::object::PlayerId;

pub type LobbyId = u64;
pub type UserId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LobbySettings {
    pub name: String,
    pub max_users: u8,
    pub map_name: String,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            name: String::from("Game Lobby"),
            max_users: 16,
            map_name: String::from("testing_ground"),
        }
    }
}

impl LobbySettings {
    pub fn is_full(&self, user_count: usize) -> bool {
        user_count >= usize::from(self.max_users)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub display_name: String,
}

impl UserSettings {
    pub const MAX_NAME_LEN: usize = 32;

    pub fn new(display_name: impl Into<String>) -> Self {
        let mut settings = Self {
            display_name: display_name.into(),
        };
        settings.sanitize();
        settings
    }

    /// Trims whitespace and caps the name length on a char boundary.
    pub fn sanitize(&mut self) {
        let trimmed = self.display_name.trim();
        let capped: String = trimmed.chars().take(Self::MAX_NAME_LEN).collect();
        self.display_name = if capped.is_empty() {
            String::from("Player")
        } else {
            capped
        };
    }
}

/// What every lobby member knows about another member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub player_id: PlayerId,
    pub guid: Uuid,
    pub display_name: String,
    pub in_game: bool,
}

impl Encode for UserInfo {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.player_id.encode(buf);
        self.guid.encode(buf);
        self.display_name.encode(buf);
        self.in_game.encode(buf);
    }
}

impl Decode for UserInfo {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        Ok(Self {
            player_id: packet.read()?,
            guid: packet.read()?,
            display_name: packet.read()?,
            in_game: packet.read()?,
        })
    }
}
