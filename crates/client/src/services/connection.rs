use grasp::net::ConnectionCommand;
use grasp::{Packet, PeerId, RoutingError, Service, ServiceId};

use super::from_server;
use crate::context::{ClientContext, ConnectionState, LocalIdentity};
use crate::events::ClientEvent;

pub struct ConnectionService;

impl Service<ClientContext> for ConnectionService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Connection
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match ConnectionCommand::try_from(command)? {
            ConnectionCommand::Response => {
                if packet.read::<bool>()? {
                    let identity = LocalIdentity {
                        player_id: packet.read()?,
                        user_id: packet.read()?,
                        lobby_id: packet.read()?,
                    };
                    log::info!(
                        "Joined lobby {} as player {}",
                        identity.lobby_id,
                        identity.player_id
                    );
                    ctx.identity = Some(identity);
                    ctx.state = ConnectionState::Connected;
                    ctx.push_event(ClientEvent::Connected {
                        player_id: identity.player_id,
                        lobby_id: identity.lobby_id,
                    });
                } else {
                    let reason = packet.read::<String>()?;
                    log::warn!("Connection denied: {}", reason);
                    ctx.reset();
                    ctx.push_event(ClientEvent::Rejected { reason });
                }
                Ok(())
            }
            ConnectionCommand::Request => Err(RoutingError::UnexpectedCommand {
                service: ServiceId::Connection,
                command,
            }),
        }
    }
}
