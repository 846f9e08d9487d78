use glam::Vec3;
use grasp::net::FxCommand;
use grasp::{Packet, PeerId, RoutingError, Service, ServiceId};

use super::from_server;
use crate::context::ClientContext;

/// Hands effects to the local effects player.
pub struct FxService;

impl Service<ClientContext> for FxService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Fx
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match FxCommand::try_from(command)? {
            FxCommand::Sfx => {
                let id = packet.read::<u16>()?;
                let volume = packet.read::<f32>()?;
                let position = if packet.unread_length() > 0 {
                    Some(packet.read::<Vec3>()?)
                } else {
                    None
                };
                ctx.effects.play_sfx(id, volume, position);
            }
            FxCommand::Vfx => {
                let id = packet.read::<u16>()?;
                let position = packet.read::<Vec3>()?;
                let scale = packet.read::<f32>()?;
                ctx.effects.play_vfx(id, position, scale);
            }
        }
        Ok(())
    }
}
