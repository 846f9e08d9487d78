use grasp::net::LobbyCommand;
use grasp::{
    LobbySettings, MapDefinition, Packet, PeerId, PlayerId, RoutingError, Service, ServiceId,
    UserInfo,
};
use uuid::Uuid;

use super::from_server;
use crate::context::ClientContext;
use crate::events::ClientEvent;

pub struct LobbyService;

impl LobbyService {
    fn settings(ctx: &mut ClientContext, packet: &mut Packet) -> Result<(), RoutingError> {
        let name = packet.read::<String>()?;
        let max_users = packet.read::<u8>()?;
        let tick_rate = packet.read::<u32>()?;
        let map_name = packet.read::<String>()?;

        ctx.map = MapDefinition::by_name(&map_name);
        if ctx.map.is_none() {
            log::error!("Server runs unknown map '{}'", map_name);
        }
        ctx.server_tick_rate = tick_rate;
        ctx.settings = Some(LobbySettings {
            name,
            max_users,
            map_name,
        });
        Ok(())
    }

    fn users_list(ctx: &mut ClientContext, packet: &mut Packet) -> Result<(), RoutingError> {
        let count = packet.read::<u8>()?;
        ctx.users.clear();
        for _ in 0..count {
            let info = packet.read::<UserInfo>()?;
            ctx.users.insert(info.player_id, info);
        }
        Ok(())
    }
}

impl Service<ClientContext> for LobbyService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Lobby
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match LobbyCommand::try_from(command)? {
            LobbyCommand::Settings => Self::settings(ctx, packet),
            LobbyCommand::UsersList => Self::users_list(ctx, packet),
            LobbyCommand::UserSettings => {
                let player_id = packet.read::<PlayerId>()?;
                let display_name = packet.read::<String>()?;
                if let Some(user) = ctx.users.get_mut(&player_id) {
                    user.display_name = display_name.clone();
                }
                ctx.push_event(ClientEvent::UserRenamed {
                    player_id,
                    display_name,
                });
                Ok(())
            }
            LobbyCommand::UserJoined => {
                let player_id = packet.read::<PlayerId>()?;
                let guid = packet.read::<Uuid>()?;
                let display_name = packet.read::<String>()?;
                ctx.users.insert(
                    player_id,
                    UserInfo {
                        player_id,
                        guid,
                        display_name: display_name.clone(),
                        in_game: false,
                    },
                );
                ctx.push_event(ClientEvent::UserJoined {
                    player_id,
                    display_name,
                });
                Ok(())
            }
            LobbyCommand::UserLeft => {
                let player_id = packet.read::<PlayerId>()?;
                ctx.users.remove(&player_id);
                ctx.push_event(ClientEvent::UserLeft { player_id });
                Ok(())
            }
            LobbyCommand::Tick => {
                let tick = packet.read::<u32>()?;
                ctx.observe_tick(tick);
                Ok(())
            }
        }
    }
}
