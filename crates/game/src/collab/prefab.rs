use glam::Vec3;

use crate::map::testing_ground::prefabs;
use crate::object::{Archetype, InteractEffect, PrefabKey};

/// A prefab key together with the asset path it resolves to on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefabPath {
    pub key: PrefabKey,
    pub path: String,
}

/// How the server simulates an instance of a prefab.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrefabDescriptor {
    pub archetype: Archetype,
    pub half_extents: Vec3,
    pub mass: f32,
}

/// Maps prefab keys between the server's and the clients' asset spaces.
///
/// An unknown key is an `Option::None`, never a panic; the caller refuses
/// the spawn.
pub trait PrefabResolver: Send {
    fn resolve_client_path(&self, server_key: PrefabKey) -> Option<PrefabPath>;

    fn resolve_server_path(&self, client_key: PrefabKey) -> Option<PrefabPath>;

    fn descriptor(&self, server_key: PrefabKey) -> Option<PrefabDescriptor>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefabEntry {
    pub server_key: PrefabKey,
    pub client_key: PrefabKey,
    pub server_path: String,
    pub client_path: String,
    pub descriptor: PrefabDescriptor,
}

#[derive(Debug, Clone, Default)]
pub struct PrefabCatalog {
    entries: Vec<PrefabEntry>,
}

impl PrefabCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later entries with an already known server or client key replace the
    /// earlier one.
    pub fn insert(&mut self, entry: PrefabEntry) {
        self.entries
            .retain(|e| e.server_key != entry.server_key && e.client_key != entry.client_key);
        self.entries.push(entry);
    }

    pub fn with(mut self, entry: PrefabEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn testing_ground() -> Self {
        let entry = |server_key, client_key, name: &str, archetype, half_extents, mass| PrefabEntry {
            server_key,
            client_key,
            server_path: format!("server/props/{name}"),
            client_path: format!("client/props/{name}"),
            descriptor: PrefabDescriptor {
                archetype,
                half_extents,
                mass,
            },
        };

        Self::new()
            .with(entry(
                prefabs::CRATE,
                11,
                "crate",
                Archetype::Prop,
                Vec3::splat(0.25),
                3.0,
            ))
            .with(entry(
                prefabs::LANTERN,
                12,
                "lantern",
                Archetype::Interactable(InteractEffect::Vfx { id: 4, scale: 1.5 }),
                Vec3::new(0.15, 0.3, 0.15),
                1.0,
            ))
            .with(entry(
                prefabs::BELL,
                13,
                "bell",
                Archetype::Interactable(InteractEffect::Sfx { id: 9, volume: 0.8 }),
                Vec3::splat(0.2),
                2.0,
            ))
    }
}

impl PrefabResolver for PrefabCatalog {
    fn resolve_client_path(&self, server_key: PrefabKey) -> Option<PrefabPath> {
        self.entries
            .iter()
            .find(|e| e.server_key == server_key)
            .map(|e| PrefabPath {
                key: e.client_key,
                path: e.client_path.clone(),
            })
    }

    fn resolve_server_path(&self, client_key: PrefabKey) -> Option<PrefabPath> {
        self.entries
            .iter()
            .find(|e| e.client_key == client_key)
            .map(|e| PrefabPath {
                key: e.server_key,
                path: e.server_path.clone(),
            })
    }

    fn descriptor(&self, server_key: PrefabKey) -> Option<PrefabDescriptor> {
        self.entries
            .iter()
            .find(|e| e.server_key == server_key)
            .map(|e| e.descriptor)
    }
}
