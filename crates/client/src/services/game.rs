use grasp::net::GameCommand;
use grasp::{Packet, PeerId, PlayerId, RoutingError, Service, ServiceId};

use super::from_server;
use crate::context::ClientContext;
use crate::events::ClientEvent;

pub struct GameService;

impl Service<ClientContext> for GameService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Game
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match GameCommand::try_from(command)? {
            GameCommand::UserJoined => {
                let player_id = packet.read::<PlayerId>()?;
                if let Some(user) = ctx.users.get_mut(&player_id) {
                    user.in_game = true;
                }
                if ctx.is_local(player_id) {
                    ctx.in_game = true;
                    // requests sent from the lobby were answered or are moot
                    ctx.pending.clear();
                }
                ctx.push_event(ClientEvent::UserJoinedGame { player_id });
                Ok(())
            }
        }
    }
}
