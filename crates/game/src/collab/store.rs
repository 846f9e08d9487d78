use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use rkyv::util::AlignedVec;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::lobby::{LobbyId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct LobbyMetadata {
    pub lobby_id: LobbyId,
    pub name: String,
    pub map_name: String,
    pub user_count: u8,
    pub max_users: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct UserMetadata {
    pub user_id: UserId,
    pub guid: [u8; 16],
    pub display_name: String,
    pub lobby_id: LobbyId,
}

/// Best-effort persistence of lobby and user records.
///
/// Calls come from the tick thread and must return immediately; slow
/// backends hand the work off (see the server's detached store).
pub trait MetadataStore: Send {
    fn save_lobby_metadata(&mut self, metadata: LobbyMetadata);

    fn save_user_metadata(&mut self, metadata: UserMetadata);

    fn heartbeat(&mut self, lobby_id: LobbyId, tick: u32);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStore;

impl MetadataStore for NullStore {
    fn save_lobby_metadata(&mut self, _metadata: LobbyMetadata) {}

    fn save_user_metadata(&mut self, _metadata: UserMetadata) {}

    fn heartbeat(&mut self, _lobby_id: LobbyId, _tick: u32) {}
}

/// In-process key-value store holding rkyv archives. Clones share storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, AlignedVec>>>,
    heartbeats: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lobby_key(lobby_id: LobbyId) -> String {
        format!("lobby/{lobby_id}")
    }

    fn user_key(user_id: UserId) -> String {
        format!("user/{user_id}")
    }

    pub fn put(&self, key: String, bytes: AlignedVec) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, bytes);
    }

    pub fn delete(&self, key: &str) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    pub fn lobby(&self, lobby_id: LobbyId) -> Option<LobbyMetadata> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = records.get(&Self::lobby_key(lobby_id))?;
        rkyv::from_bytes::<LobbyMetadata, rancor::Error>(bytes).ok()
    }

    pub fn user(&self, user_id: UserId) -> Option<UserMetadata> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let bytes = records.get(&Self::user_key(user_id))?;
        rkyv::from_bytes::<UserMetadata, rancor::Error>(bytes).ok()
    }

    pub fn heartbeats(&self) -> u64 {
        self.heartbeats.load(Ordering::Relaxed)
    }
}

impl MetadataStore for MemoryStore {
    fn save_lobby_metadata(&mut self, metadata: LobbyMetadata) {
        match rkyv::to_bytes::<rancor::Error>(&metadata) {
            Ok(bytes) => self.put(Self::lobby_key(metadata.lobby_id), bytes),
            Err(e) => log::error!("Failed to archive lobby {}: {}", metadata.lobby_id, e),
        }
    }

    fn save_user_metadata(&mut self, metadata: UserMetadata) {
        match rkyv::to_bytes::<rancor::Error>(&metadata) {
            Ok(bytes) => self.put(Self::user_key(metadata.user_id), bytes),
            Err(e) => log::error!("Failed to archive user {}: {}", metadata.user_id, e),
        }
    }

    fn heartbeat(&mut self, _lobby_id: LobbyId, _tick: u32) {
        self.heartbeats.fetch_add(1, Ordering::Relaxed);
    }
}
