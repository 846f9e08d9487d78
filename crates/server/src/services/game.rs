use grasp::net::GameCommand;
use grasp::{Packet, PeerId, RoutingError, Service, ServiceId};

use super::{ServerService, order};
use crate::context::{Lifecycle, LobbyContext};

/// Moves lobby users into the running game.
pub struct GameService;

impl Service<LobbyContext> for GameService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Game
    }

    fn execution_order(&self) -> i32 {
        order::GAME
    }

    fn receive(
        &mut self,
        ctx: &mut LobbyContext,
        sender: PeerId,
        command: u8,
        _packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        match GameCommand::try_from(command)? {
            GameCommand::UserJoined => {
                let user = ctx
                    .users
                    .by_peer(sender)
                    .ok_or(RoutingError::Unauthorized(sender))?;
                if user.in_game {
                    log::debug!("Player {} is already in game", user.player_id);
                    return Ok(());
                }
                let player = user.player_id;
                ctx.push_lifecycle(Lifecycle::JoinGame(player));
                Ok(())
            }
        }
    }
}

impl ServerService for GameService {}
