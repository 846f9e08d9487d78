use glam::Vec3;
use grasp::net::EventCommand;
use grasp::{Packet, PeerId, PlayerId, RoutingError, Service, ServiceId};

use super::from_server;
use crate::context::ClientContext;
use crate::events::ClientEvent;

pub struct EventService;

impl Service<ClientContext> for EventService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Event
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match EventCommand::try_from(command)? {
            EventCommand::GroundHit => {
                let player_id = packet.read::<PlayerId>()?;
                let position = packet.read::<Vec3>()?;
                let speed = packet.read::<f32>()?;
                ctx.push_event(ClientEvent::GroundHit {
                    player_id,
                    position,
                    speed,
                });
                Ok(())
            }
        }
    }
}
