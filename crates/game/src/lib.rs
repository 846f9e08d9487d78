pub mod collab;
pub mod lobby;
pub mod map;
pub mod net;
pub mod object;
pub mod physics;
pub mod service;
pub mod simulation;

pub use collab::{
    EffectsPlayer, MetadataStore, PrefabCatalog, PrefabResolver, SceneQuery,
};
pub use lobby::{LobbyId, LobbySettings, UserId, UserInfo, UserSettings};
pub use map::MapDefinition;
pub use net::{
    DEFAULT_TICK_RATE, Packet, PacketError, PeerId, PROTOCOL_VERSION, Reliability, SERVER_PEER,
    ServiceId, Transport, TransportEvent, Verb,
};
pub use object::{
    Archetype, FIRST_DYNAMIC_OBJECT_ID, InteractEffect, ObjectId, PlayerFlags, PlayerId, Pose,
    PrefabKey,
};
pub use physics::PhysicsWorld;
pub use service::{RegistryError, RoutingError, Service, ServiceRegistry};
pub use simulation::FixedTimestep;
