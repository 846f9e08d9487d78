use grasp::net::PlayerCommand;
use grasp::object::player_object_id;
use grasp::{
    ObjectId, Packet, PeerId, PlayerFlags, PlayerId, Pose, RoutingError, Service, ServiceId,
    Verb,
};

use super::from_server;
use crate::context::ClientContext;
use crate::events::ClientEvent;
use crate::interpolation::ReplicatedTransform;
use crate::objects::{ClientObject, ClientPlayer};

/// Avatar spawn and destroy.
pub struct PlayerService;

impl Service<ClientContext> for PlayerService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Player
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match PlayerCommand::try_from(command)? {
            PlayerCommand::Spawn => {
                let player_id = packet.read::<PlayerId>()?;
                let pose = packet.read::<Pose>()?;
                let avatar = ClientObject::Player(ClientPlayer {
                    player_id,
                    transform: ReplicatedTransform::spawned_at(pose),
                    flags: PlayerFlags::GROUNDED,
                    current_interactable: None,
                });
                if ctx.objects.insert(avatar) {
                    ctx.push_event(ClientEvent::ObjectSpawned {
                        id: player_object_id(player_id),
                    });
                } else {
                    log::debug!("Player {} already spawned", player_id);
                }
                Ok(())
            }
            PlayerCommand::Destroy => {
                let player_id = packet.read::<PlayerId>()?;
                let id = player_object_id(player_id);
                if ctx.objects.remove(id).is_some() {
                    ctx.push_event(ClientEvent::ObjectDestroyed { id });
                }
                Ok(())
            }
            _ => Err(RoutingError::UnexpectedCommand {
                service: ServiceId::Player,
                command,
            }),
        }
    }
}

/// A PLAYER command the server addressed to `target`'s avatar.
pub(crate) fn receive_envelope(
    ctx: &mut ClientContext,
    target: PlayerId,
    command: u8,
    packet: &mut Packet,
) -> Result<(), RoutingError> {
    let command = PlayerCommand::try_from(command)?;

    if let Some(verb) = Verb::from_deny(command) {
        let interactable = packet.read::<ObjectId>()?;
        if !ctx.is_local(target) {
            log::debug!("Ignoring deny addressed to player {}", target);
            return Ok(());
        }
        ctx.pending.resolve(verb, interactable);
        log::debug!("{} on {} denied", verb.as_str(), interactable);
        ctx.push_event(ClientEvent::Denied {
            verb,
            target: interactable,
        });
        return Ok(());
    }

    match command {
        PlayerCommand::Transform => {
            let tick = packet.read::<u32>()?;
            let pose = packet.read::<Pose>()?;
            ctx.observe_tick(tick);
            if ctx.is_local(target) {
                return Ok(());
            }
            if let Some(avatar) = ctx.objects.player_mut(target) {
                avatar.transform.apply_snapshot(tick, pose);
            }
            Ok(())
        }
        PlayerCommand::Anim => {
            let flags = packet.read::<PlayerFlags>()?;
            if let Some(avatar) = ctx.objects.player_mut(target) {
                avatar.flags = flags;
            }
            Ok(())
        }
        _ => Err(RoutingError::UnexpectedCommand {
            service: ServiceId::Player,
            command: command.into(),
        }),
    }
}
