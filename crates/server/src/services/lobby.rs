use grasp::net::LobbyCommand;
use grasp::{Packet, PeerId, PlayerId, Reliability, RoutingError, Service, ServiceId, UserSettings};

use super::{ServerService, order};
use crate::context::LobbyContext;

/// Lobby membership, user settings and the lobby clock. Runs last.
#[derive(Default)]
pub struct LobbyService;

impl LobbyService {
    fn settings_packet(ctx: &LobbyContext) -> Packet {
        let mut packet = Packet::command(ServiceId::Lobby, LobbyCommand::Settings);
        packet
            .write(ctx.config.lobby.name.as_str())
            .write(ctx.config.lobby.max_users)
            .write(ctx.config.tick_rate)
            .write(ctx.map.name.as_str());
        packet
    }

    fn users_list_packet(ctx: &LobbyContext) -> Packet {
        let infos: Vec<_> = ctx.users.iter().map(|u| u.info()).collect();
        let mut packet = Packet::command(ServiceId::Lobby, LobbyCommand::UsersList);
        packet.write(infos.len() as u8);
        for info in &infos {
            packet.write(info);
        }
        packet
    }

    fn handle_user_settings(
        ctx: &mut LobbyContext,
        sender: PeerId,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let player = ctx
            .users
            .player_of(sender)
            .ok_or(RoutingError::Unauthorized(sender))?;
        let settings = UserSettings::new(packet.read::<String>()?);

        if let Some(user) = ctx.users.get_mut(player) {
            user.settings = settings.clone();
        }

        let mut update = Packet::command(ServiceId::Lobby, LobbyCommand::UserSettings);
        update.write(player).write(settings.display_name.as_str());
        ctx.send_to_lobby(&update, Reliability::ReliableOrdered);
        ctx.save_user_metadata(player);
        Ok(())
    }
}

impl Service<LobbyContext> for LobbyService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Lobby
    }

    fn execution_order(&self) -> i32 {
        order::LOBBY
    }

    fn receive(
        &mut self,
        ctx: &mut LobbyContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        match LobbyCommand::try_from(command)? {
            LobbyCommand::UserSettings => Self::handle_user_settings(ctx, sender, packet),
            _ => Err(RoutingError::UnexpectedCommand {
                service: ServiceId::Lobby,
                command,
            }),
        }
    }
}

impl ServerService for LobbyService {
    fn user_joined(&mut self, ctx: &mut LobbyContext, player: PlayerId) {
        let Some(user) = ctx.users.get(player) else {
            return;
        };
        let peer = user.peer;
        let info = user.info();

        let settings = Self::settings_packet(ctx);
        ctx.send_to_peer(peer, &settings, Reliability::ReliableOrdered);
        let users = Self::users_list_packet(ctx);
        ctx.send_to_peer(peer, &users, Reliability::ReliableOrdered);

        let mut joined = Packet::command(ServiceId::Lobby, LobbyCommand::UserJoined);
        joined
            .write(info.player_id)
            .write(info.guid)
            .write(info.display_name.as_str());
        ctx.send_to_lobby_except(player, &joined, Reliability::ReliableOrdered);

        ctx.save_user_metadata(player);
        ctx.save_lobby_metadata();
    }

    fn user_left(&mut self, ctx: &mut LobbyContext, player: PlayerId) {
        if ctx.users.remove(player).is_none() {
            return;
        }

        let mut left = Packet::command(ServiceId::Lobby, LobbyCommand::UserLeft);
        left.write(player);
        ctx.send_to_lobby(&left, Reliability::ReliableOrdered);
        ctx.save_lobby_metadata();
    }

    fn tick(&mut self, ctx: &mut LobbyContext) {
        let tick = ctx.tick;

        if ctx.config.lobby_tick_interval > 0 && tick % ctx.config.lobby_tick_interval == 0 {
            let mut packet = Packet::command(ServiceId::Lobby, LobbyCommand::Tick);
            packet.write(tick);
            ctx.send_to_lobby(&packet, Reliability::Unreliable);
        }

        if ctx.config.heartbeat_interval_ticks > 0
            && tick % ctx.config.heartbeat_interval_ticks == 0
        {
            let lobby_id = ctx.config.lobby_id;
            ctx.store.heartbeat(lobby_id, tick);
        }
    }
}
