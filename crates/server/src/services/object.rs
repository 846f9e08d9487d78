use grasp::net::{InteractableCommand, ObjectCommand, PlayerCommand};
use grasp::object::{Ownable, is_player_object, player_object_id};
use grasp::{
    ObjectId, Packet, PeerId, PlayerId, Pose, Reliability, RoutingError, Service, ServiceId, Verb,
};

use super::{ServerService, order, player};
use crate::context::LobbyContext;
use crate::directory::{NetObject, Reported};
use crate::replication;

/// Object directory traffic: envelopes, spawn and destroy requests, the
/// replication tick and late-joiner catch-up.
#[derive(Default)]
pub struct ObjectService;

impl ObjectService {
    fn in_game_sender(ctx: &LobbyContext, peer: PeerId) -> Result<PlayerId, RoutingError> {
        ctx.users
            .by_peer(peer)
            .filter(|u| u.in_game)
            .map(|u| u.player_id)
            .ok_or(RoutingError::Unauthorized(peer))
    }

    fn handle_communication(
        ctx: &mut LobbyContext,
        peer: PeerId,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let (sender, in_game) = ctx
            .users
            .by_peer(peer)
            .map(|u| (u.player_id, u.in_game))
            .ok_or(RoutingError::Unauthorized(peer))?;
        let target = packet.read::<ObjectId>()?;
        let service = ServiceId::try_from(packet.read::<u8>()?)?;
        let command = packet.read::<u8>()?;

        // every ownership request from a joined user gets an answer
        if service == ServiceId::Player {
            if let Some(verb) = PlayerCommand::try_from(command)
                .ok()
                .and_then(Verb::from_request)
            {
                let interactable = packet.read::<ObjectId>()?;
                player::receive_request(ctx, sender, in_game, target, verb, interactable);
                return Ok(());
            }
        }
        if !in_game {
            return Err(RoutingError::Unauthorized(peer));
        }

        match (ctx.objects.get(target), service) {
            (None, _) => Err(RoutingError::ObjectNotFound(target)),
            (Some(NetObject::Player(p)), ServiceId::Player) => {
                let target = p.player_id;
                player::receive_envelope(ctx, sender, target, command, packet)
            }
            (Some(NetObject::Interactable(_) | NetObject::Prop(_)), ServiceId::Interactable) => {
                receive_interactable_envelope(ctx, sender, target, command, packet)
            }
            (Some(_), _) => Err(RoutingError::UnexpectedCommand { service, command }),
        }
    }

    fn handle_spawn_request(
        ctx: &mut LobbyContext,
        peer: PeerId,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let sender = Self::in_game_sender(ctx, peer)?;
        let client_key = packet.read::<u32>()?;
        let pose = packet.read::<Pose>()?;

        let Some(server) = ctx.prefabs.resolve_server_path(client_key) else {
            log::error!(
                "Player {} requested spawn of unknown prefab {}",
                sender,
                client_key
            );
            return Ok(());
        };

        if let Err(e) = ctx.spawn_object(server.key, pose, None, false) {
            log::warn!("Spawn request from player {} failed: {}", sender, e);
        }
        Ok(())
    }

    fn handle_destroy_request(
        ctx: &mut LobbyContext,
        peer: PeerId,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let sender = Self::in_game_sender(ctx, peer)?;
        let id = packet.read::<ObjectId>()?;

        let allowed = match ctx.objects.get(id) {
            None => return Err(RoutingError::ObjectNotFound(id)),
            Some(NetObject::Player(_)) => false,
            Some(NetObject::Prop(_)) => true,
            Some(NetObject::Interactable(i)) => i.owner().is_none_or(|owner| owner == sender),
        };
        if !allowed {
            log::debug!("Player {} may not destroy object {}", sender, id);
            return Ok(());
        }

        ctx.destroy_object(id);
        Ok(())
    }

    /// Catch-up for a user entering a game that is already running.
    ///
    /// Order matters: every object must be known to the user before anyone
    /// tells it who holds what.
    fn catch_up(ctx: &mut LobbyContext, player: PlayerId) {
        // 1. map objects, in map order
        let starting = ctx.objects.starting_ids().to_vec();
        let mut init = Packet::command(ServiceId::Object, ObjectCommand::ObjectsInit);
        init.write(starting.len() as u16);
        for id in &starting {
            init.write(*id);
        }
        ctx.send_to_player(player, &init, Reliability::ReliableOrdered);

        // 2. map objects destroyed before this user arrived
        let destroyed = ctx.objects.destroyed_starting().to_vec();
        for id in destroyed {
            let mut packet = Packet::command(ServiceId::Object, ObjectCommand::Destroy);
            packet.write(id);
            ctx.send_to_player(player, &packet, Reliability::ReliableOrdered);
        }

        // 3. everything spawned at runtime
        let dynamic: Vec<ObjectId> = ctx
            .objects
            .iter()
            .map(NetObject::id)
            .filter(|&id| !is_player_object(id) && !ctx.objects.is_starting(id))
            .collect();
        for id in dynamic {
            if let Some(packet) = ctx.spawn_packet(id) {
                ctx.send_to_player(player, &packet, Reliability::ReliableOrdered);
            }
        }

        // 4. per-object state
        let mut state = Vec::new();
        for object in ctx.objects.iter() {
            match object {
                NetObject::Interactable(i) => {
                    if let Some(owner) = i.owner() {
                        let mut packet = Packet::new();
                        packet.write(owner).wrap_for_object(
                            i.id,
                            ServiceId::Interactable,
                            InteractableCommand::Grab,
                        );
                        state.push(packet);
                    }
                }
                NetObject::Player(p) if p.player_id != player => {
                    let mut packet = Packet::new();
                    packet.write(p.flags).wrap_for_object(
                        player_object_id(p.player_id),
                        ServiceId::Player,
                        PlayerCommand::Anim,
                    );
                    state.push(packet);
                }
                _ => {}
            }
        }
        for packet in &state {
            ctx.send_to_player(player, packet, Reliability::ReliableOrdered);
        }
    }
}

fn receive_interactable_envelope(
    ctx: &mut LobbyContext,
    sender: PlayerId,
    target: ObjectId,
    command: u8,
    packet: &mut Packet,
) -> Result<(), RoutingError> {
    match InteractableCommand::try_from(command)? {
        InteractableCommand::Transform => {
            let tick = packet.read::<u32>()?;
            let pose = packet.read::<Pose>()?;
            match ctx.objects.interactable_mut(target) {
                Some(i) if i.owner == Some(sender) => {
                    Reported::accept(&mut i.reported, tick, pose);
                }
                _ => log::debug!("Dropping transform for {} from non-owner {}", target, sender),
            }
            Ok(())
        }
        _ => {
            log::debug!("Player {} may not send command {} to {}", sender, command, target);
            Ok(())
        }
    }
}

impl Service<LobbyContext> for ObjectService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Object
    }

    fn execution_order(&self) -> i32 {
        order::OBJECT
    }

    fn receive(
        &mut self,
        ctx: &mut LobbyContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        match ObjectCommand::try_from(command)? {
            ObjectCommand::Communication => Self::handle_communication(ctx, sender, packet),
            ObjectCommand::SpawnRequest => Self::handle_spawn_request(ctx, sender, packet),
            ObjectCommand::DestroyRequest => Self::handle_destroy_request(ctx, sender, packet),
            ObjectCommand::ObjectsInit | ObjectCommand::Spawn | ObjectCommand::Destroy => {
                Err(RoutingError::UnexpectedCommand {
                    service: ServiceId::Object,
                    command,
                })
            }
        }
    }
}

impl ServerService for ObjectService {
    fn user_joined_game(&mut self, ctx: &mut LobbyContext, player: PlayerId) {
        Self::catch_up(ctx, player);
    }

    fn tick(&mut self, ctx: &mut LobbyContext) {
        replication::simulate(&mut ctx.objects, &mut ctx.physics);

        let rate = ctx.config.snapshot_send_rate.max(1);
        if ctx.tick % rate == 0 {
            replication::broadcast_snapshots(ctx);
        }
    }
}
