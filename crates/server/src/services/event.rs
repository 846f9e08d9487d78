use glam::Vec3;
use grasp::net::EventCommand;
use grasp::{Packet, PeerId, Reliability, RoutingError, Service, ServiceId};

use super::{ServerService, order};
use crate::context::LobbyContext;

/// Gameplay events reported by one client and shown to the others.
pub struct EventService;

impl Service<LobbyContext> for EventService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Event
    }

    fn execution_order(&self) -> i32 {
        order::EVENT
    }

    fn receive(
        &mut self,
        ctx: &mut LobbyContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        match EventCommand::try_from(command)? {
            EventCommand::GroundHit => {
                let player = ctx
                    .users
                    .by_peer(sender)
                    .filter(|u| u.in_game)
                    .map(|u| u.player_id)
                    .ok_or(RoutingError::Unauthorized(sender))?;
                let position = packet.read::<Vec3>()?;
                let speed = packet.read::<f32>()?;

                let mut relay = Packet::command(ServiceId::Event, EventCommand::GroundHit);
                relay.write(player).write(position).write(speed);
                ctx.send_to_game_except(player, &relay, Reliability::ReliableOrdered);
                Ok(())
            }
        }
    }
}

impl ServerService for EventService {}
