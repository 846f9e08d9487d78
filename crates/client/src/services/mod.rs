//! Client-side services, one per service id the server talks to.

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

use grasp::{RegistryError, ServiceRegistry};

use crate::context::ClientContext;

pub type ClientRegistry = ServiceRegistry<ClientContext>;

pub fn default_registry() -> Result<ClientRegistry, RegistryError> {
    let mut registry = ClientRegistry::new();
    registry.register(Box::new(ConnectionService))?;
    registry.register(Box::new(LobbyService))?;
    registry.register(Box::new(GameService))?;
    registry.register(Box::new(PlayerService))?;
    registry.register(Box::new(FxService))?;
    registry.register(Box::new(EventService))?;
    registry.register(Box::new(ObjectService))?;
    Ok(registry)
}

/// Every server packet arrives from the single server peer; anything else
/// is refused.
fn from_server(sender: grasp::PeerId) -> Result<(), grasp::RoutingError> {
    if sender == grasp::SERVER_PEER {
        Ok(())
    } else {
        Err(grasp::RoutingError::Unauthorized(sender))
    }
}
