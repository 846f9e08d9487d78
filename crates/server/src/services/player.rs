use glam::Vec3;
use grasp::net::{FxCommand, InteractableCommand, PlayerCommand};
use grasp::object::{Transformable, player_object_id};
use grasp::{
    InteractEffect, ObjectId, Packet, PeerId, PlayerFlags, PlayerId, Pose, Reliability,
    RoutingError, Service, ServiceId, Verb,
};

use super::{ServerService, order};
use crate::context::LobbyContext;
use crate::directory::{NetObject, PlayerObject, Reported};
use crate::ownership::{self, Granted};

const PLAYER_RADIUS: f32 = 0.3;
const PLAYER_HEIGHT: f32 = 1.8;

/// Player avatars: spawned when a user enters the game, torn down (after
/// releasing anything held) when the user leaves.
pub struct PlayerService;

fn spawn_packet(player: &PlayerObject) -> Packet {
    let mut packet = Packet::command(ServiceId::Player, PlayerCommand::Spawn);
    packet
        .write(player.player_id)
        .write(player.pose.position)
        .write(player.pose.rotation);
    packet
}

impl PlayerService {
    fn spawn_avatar(ctx: &mut LobbyContext, player: PlayerId) -> Option<Packet> {
        let existing: Vec<Vec3> = ctx.objects.players().map(|p| p.pose.position).collect();
        let spawn = ctx.scene.random_spawn_point(&existing);
        let ground = ctx.scene.ground_position_below(spawn.position);
        let pose = Pose::new(ground + Vec3::Y * (PLAYER_HEIGHT / 2.0), spawn.rotation);

        let body = ctx
            .physics
            .add_kinematic_capsule(pose.position, PLAYER_RADIUS, PLAYER_HEIGHT);
        let avatar = PlayerObject {
            player_id: player,
            pose,
            flags: PlayerFlags::GROUNDED,
            current_interactable: None,
            reported: Some(Reported { tick: 0, pose }),
            body,
        };
        let packet = spawn_packet(&avatar);

        if ctx.objects.insert(NetObject::Player(avatar)).is_err() {
            ctx.physics.remove_body(body);
            return None;
        }
        Some(packet)
    }
}

impl Service<LobbyContext> for PlayerService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Player
    }

    fn execution_order(&self) -> i32 {
        order::PLAYER
    }

    /// Player traffic from clients always travels inside an object envelope.
    fn receive(
        &mut self,
        _ctx: &mut LobbyContext,
        _sender: PeerId,
        command: u8,
        _packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        Err(RoutingError::UnexpectedCommand {
            service: ServiceId::Player,
            command,
        })
    }
}

impl ServerService for PlayerService {
    fn user_joined_game(&mut self, ctx: &mut LobbyContext, player: PlayerId) {
        let others: Vec<Packet> = ctx
            .objects
            .players()
            .filter(|p| p.player_id != player)
            .map(spawn_packet)
            .collect();
        for packet in &others {
            ctx.send_to_player(player, packet, Reliability::ReliableOrdered);
        }

        if let Some(packet) = Self::spawn_avatar(ctx, player) {
            ctx.send_to_game(&packet, Reliability::ReliableOrdered);
        }
    }

    fn user_left(&mut self, ctx: &mut LobbyContext, player: PlayerId) {
        if let Some((target, pose)) =
            ownership::force_drop(&mut ctx.objects, &mut ctx.physics, player)
        {
            log::debug!("Player {} left holding {}; dropped", player, target);
            ctx.broadcast_drop(target, player, pose);
        }

        let Some(avatar) = ctx.objects.remove(player_object_id(player)) else {
            return;
        };
        ctx.physics.remove_body(avatar.body());

        let mut packet = Packet::command(ServiceId::Player, PlayerCommand::Destroy);
        packet.write(player);
        ctx.send_to_game_except(player, &packet, Reliability::ReliableOrdered);
    }
}

/// Handles a PLAYER command addressed to `target`'s avatar through an
/// object envelope sent by `sender`.
pub(crate) fn receive_envelope(
    ctx: &mut LobbyContext,
    sender: PlayerId,
    target: PlayerId,
    command: u8,
    packet: &mut Packet,
) -> Result<(), RoutingError> {
    let command = PlayerCommand::try_from(command)?;

    if sender != target {
        log::debug!("Dropping {:?} from player {} for player {}", command, sender, target);
        return Ok(());
    }

    match command {
        PlayerCommand::Transform => {
            let tick = packet.read::<u32>()?;
            let pose = packet.read::<Pose>()?;
            if let Some(avatar) = ctx.objects.player_mut(target) {
                Reported::accept(&mut avatar.reported, tick, pose);
            }
            Ok(())
        }
        PlayerCommand::Anim => {
            let flags = packet.read::<PlayerFlags>()?;
            let Some(avatar) = ctx.objects.player_mut(target) else {
                return Err(RoutingError::ObjectNotFound(player_object_id(target)));
            };
            avatar.flags = flags;

            let mut update = Packet::new();
            update.write(flags).wrap_for_object(
                player_object_id(target),
                ServiceId::Player,
                PlayerCommand::Anim,
            );
            ctx.send_to_game_except(target, &update, Reliability::ReliableOrdered);
            Ok(())
        }
        _ => Err(RoutingError::UnexpectedCommand {
            service: ServiceId::Player,
            command: command.into(),
        }),
    }
}

/// A grab, interact or drop request sent through the envelope addressed to
/// `envelope_target`. Anything but the sender's own in-game avatar is
/// denied, so the requester never waits on an answer that will not come.
pub(crate) fn receive_request(
    ctx: &mut LobbyContext,
    sender: PlayerId,
    in_game: bool,
    envelope_target: ObjectId,
    verb: Verb,
    interactable: ObjectId,
) {
    if !in_game {
        log::debug!("Player {} sent {} outside the game", sender, verb.as_str());
        send_deny(ctx, sender, verb, interactable);
    } else if envelope_target != player_object_id(sender) {
        log::debug!(
            "Player {} sent {} through object {}",
            sender,
            verb.as_str(),
            envelope_target
        );
        send_deny(ctx, sender, verb, interactable);
    } else {
        handle_request(ctx, sender, verb, interactable);
    }
}

fn handle_request(ctx: &mut LobbyContext, player: PlayerId, verb: Verb, target: ObjectId) {
    match ownership::try_verb(&mut ctx.objects, &mut ctx.physics, verb, player, target) {
        Ok(granted) => broadcast_granted(ctx, player, target, granted),
        Err(violation) => {
            log::debug!("{} by player {} denied: {}", verb.as_str(), player, violation);
            send_deny(ctx, player, verb, target);
        }
    }
}

fn send_deny(ctx: &mut LobbyContext, player: PlayerId, verb: Verb, target: ObjectId) {
    let mut packet = Packet::new();
    packet
        .write(target)
        .wrap_for_object(player_object_id(player), ServiceId::Player, verb.deny_command());
    ctx.send_to_player(player, &packet, Reliability::ReliableOrdered);
}

fn broadcast_granted(ctx: &mut LobbyContext, player: PlayerId, target: ObjectId, granted: Granted) {
    match granted {
        Granted::Grab => {
            let mut packet = Packet::new();
            packet
                .write(player)
                .wrap_for_object(target, ServiceId::Interactable, InteractableCommand::Grab);
            ctx.send_to_game(&packet, Reliability::ReliableOrdered);
        }
        Granted::Interact(effect) => {
            let mut packet = Packet::new();
            packet
                .write(player)
                .wrap_for_object(target, ServiceId::Interactable, InteractableCommand::Interact);
            ctx.send_to_game(&packet, Reliability::ReliableOrdered);

            let position = ctx
                .objects
                .interactable(target)
                .map(|i| i.pose().position)
                .unwrap_or_default();
            broadcast_effect(ctx, effect, position);
        }
        Granted::Drop(pose) => ctx.broadcast_drop(target, player, pose),
    }
}

fn broadcast_effect(ctx: &mut LobbyContext, effect: InteractEffect, position: Vec3) {
    let packet = match effect {
        InteractEffect::None => return,
        InteractEffect::Sfx { id, volume } => {
            let mut packet = Packet::command(ServiceId::Fx, FxCommand::Sfx);
            packet.write(id).write(volume).write(position);
            packet
        }
        InteractEffect::Vfx { id, scale } => {
            let mut packet = Packet::command(ServiceId::Fx, FxCommand::Vfx);
            packet.write(id).write(position).write(scale);
            packet
        }
    };
    ctx.send_to_game(&packet, Reliability::ReliableOrdered);
}
