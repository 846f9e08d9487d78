use glam::Vec3;
use grasp::net::FxCommand;
use grasp::{Packet, PeerId, Reliability, RoutingError, Service, ServiceId};

use super::{ServerService, order};
use crate::context::LobbyContext;

/// Relays client-triggered effects to everyone else in the game.
pub struct FxService;

impl Service<LobbyContext> for FxService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Fx
    }

    fn execution_order(&self) -> i32 {
        order::FX
    }

    fn receive(
        &mut self,
        ctx: &mut LobbyContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let player = ctx
            .users
            .by_peer(sender)
            .filter(|u| u.in_game)
            .map(|u| u.player_id)
            .ok_or(RoutingError::Unauthorized(sender))?;

        let mut relay = Packet::command(ServiceId::Fx, command);
        match FxCommand::try_from(command)? {
            FxCommand::Sfx => {
                relay.write(packet.read::<u16>()?).write(packet.read::<f32>()?);
                if packet.unread_length() > 0 {
                    relay.write(packet.read::<Vec3>()?);
                }
            }
            FxCommand::Vfx => {
                relay
                    .write(packet.read::<u16>()?)
                    .write(packet.read::<Vec3>()?)
                    .write(packet.read::<f32>()?);
            }
        }

        ctx.send_to_game_except(player, &relay, Reliability::ReliableOrdered);
        Ok(())
    }
}

impl ServerService for FxService {}
