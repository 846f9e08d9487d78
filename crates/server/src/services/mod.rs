//! Server-side services. Each owns one service id; the lobby core invokes
//! their lifecycle hooks in ascending execution order.

mod connection;
mod event;
mod fx;
mod game;
mod lobby;
mod object;
mod player;

pub use connection::ConnectionService;
pub use event::EventService;
pub use fx::FxService;
pub use game::GameService;
pub use lobby::LobbyService;
pub use object::ObjectService;
pub use player::PlayerService;

use grasp::{PlayerId, RegistryError, Service, ServiceRegistry};

use crate::context::LobbyContext;

pub mod order {
    pub const CONNECTION: i32 = 0;
    pub const GAME: i32 = 10;
    pub const FX: i32 = 20;
    pub const EVENT: i32 = 20;
    pub const PLAYER: i32 = 50;
    /// After everything that may spawn objects.
    pub const OBJECT: i32 = 100;
    /// Last, so the user record outlives every other service's cleanup.
    pub const LOBBY: i32 = i32::MAX;
}

pub trait ServerService: Service<LobbyContext> {
    fn user_joined(&mut self, _ctx: &mut LobbyContext, _player: PlayerId) {}

    fn user_joined_game(&mut self, _ctx: &mut LobbyContext, _player: PlayerId) {}

    fn user_left(&mut self, _ctx: &mut LobbyContext, _player: PlayerId) {}

    fn tick(&mut self, _ctx: &mut LobbyContext) {}
}

pub type ServerRegistry = ServiceRegistry<LobbyContext, dyn ServerService>;

pub fn default_registry() -> Result<ServerRegistry, RegistryError> {
    let mut registry = ServerRegistry::new();
    registry.register(Box::new(ConnectionService))?;
    registry.register(Box::new(LobbyService::default()))?;
    registry.register(Box::new(GameService))?;
    registry.register(Box::new(PlayerService))?;
    registry.register(Box::new(FxService))?;
    registry.register(Box::new(EventService))?;
    registry.register(Box::new(ObjectService::default()))?;
    Ok(registry)
}
