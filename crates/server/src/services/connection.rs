use grasp::net::ConnectionCommand;
use grasp::{
    PROTOCOL_VERSION, Packet, PeerId, PlayerId, Reliability, RoutingError, Service, ServiceId,
    UserSettings,
};
use uuid::Uuid;

use super::{ServerService, order};
use crate::context::{Lifecycle, LobbyContext};

/// Handshake: validates connection requests from pending peers and answers
/// them.
pub struct ConnectionService;

impl ConnectionService {
    fn handle_request(
        ctx: &mut LobbyContext,
        peer: PeerId,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        if !ctx.users.is_pending(peer) {
            log::debug!("Ignoring connection request from non-pending peer {}", peer);
            return Ok(());
        }

        let version = packet.read::<u32>()?;
        let guid = packet.read::<Uuid>()?;
        let display_name = packet.read::<String>()?;

        if version != PROTOCOL_VERSION {
            ctx.deny_connection(peer, "unsupported protocol version");
        } else if ctx.config.lobby.is_full(ctx.users.len()) {
            ctx.deny_connection(peer, "lobby is full");
        } else if ctx.users.contains_guid(guid) {
            ctx.deny_connection(peer, "already connected");
        } else {
            ctx.push_lifecycle(Lifecycle::Join {
                peer,
                guid,
                settings: UserSettings::new(display_name),
            });
        }
        Ok(())
    }
}

impl Service<LobbyContext> for ConnectionService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Connection
    }

    fn execution_order(&self) -> i32 {
        order::CONNECTION
    }

    fn receive(
        &mut self,
        ctx: &mut LobbyContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        match ConnectionCommand::try_from(command)? {
            ConnectionCommand::Request => Self::handle_request(ctx, sender, packet),
            ConnectionCommand::Response => Err(RoutingError::UnexpectedCommand {
                service: ServiceId::Connection,
                command,
            }),
        }
    }
}

impl ServerService for ConnectionService {
    fn user_joined(&mut self, ctx: &mut LobbyContext, player: PlayerId) {
        let Some(user) = ctx.users.get(player) else {
            return;
        };
        let peer = user.peer;
        let mut packet = Packet::command(ServiceId::Connection, ConnectionCommand::Response);
        packet
            .write(true)
            .write(user.player_id)
            .write(user.user_id)
            .write(user.lobby_id);
        ctx.send_to_peer(peer, &packet, Reliability::ReliableOrdered);
    }
}
