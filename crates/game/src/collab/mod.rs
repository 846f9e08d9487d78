//! Narrow interfaces to everything outside the protocol core, with simple
//! in-process implementations.

mod effects;
mod prefab;
mod scene;
mod store;

pub use effects::{EffectLog, EffectsPlayer, LogEffects, PlayedEffect};
pub use prefab::{PrefabCatalog, PrefabDescriptor, PrefabEntry, PrefabPath, PrefabResolver};
pub use scene::{MapScene, SceneQuery};
pub use store::{LobbyMetadata, MemoryStore, MetadataStore, NullStore, UserMetadata};
