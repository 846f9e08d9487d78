use grasp::net::GameCommand;
use grasp::object::is_player_object;
use grasp::simulation::drain_ticks;
use grasp::{
    FixedTimestep, MapDefinition, ObjectId, Packet, PeerId, PlayerId, Pose, PrefabKey,
    Reliability, RoutingError, ServiceId, Transport, TransportEvent, UserSettings,
};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::context::{Collaborators, Lifecycle, LobbyContext};
use crate::error::{DirectoryError, LobbyError};
use crate::events::{DisconnectReason, ServerEvent};
use crate::services::{ServerRegistry, default_registry};
use crate::users::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobbyStats {
    pub tick: u32,
    pub users: usize,
    pub in_game: usize,
    pub pending: usize,
    pub objects: usize,
}

/// One authoritative lobby: its services, its context and its clock.
///
/// Everything runs on whichever thread calls `update` / `tick_once`; the
/// transport only hands events over through its inbound queue.
pub struct ServerLobby {
    ctx: LobbyContext,
    services: ServerRegistry,
    timestep: FixedTimestep,
}

impl ServerLobby {
    pub fn new(
        config: ServerConfig,
        transport: Box<dyn Transport>,
        collaborators: Collaborators,
    ) -> Result<Self, LobbyError> {
        let map = MapDefinition::by_name(&config.lobby.map_name)
            .ok_or_else(|| LobbyError::UnknownMap(config.lobby.map_name.clone()))?;
        Self::with_map(config, map, transport, collaborators)
    }

    pub fn with_map(
        config: ServerConfig,
        map: MapDefinition,
        transport: Box<dyn Transport>,
        collaborators: Collaborators,
    ) -> Result<Self, LobbyError> {
        let services = default_registry()?;
        let timestep = FixedTimestep::new(config.tick_rate);
        let mut ctx = LobbyContext::new(config, map, transport, collaborators);

        ctx.map.build_geometry(&mut ctx.physics);
        let starting = ctx.map.starting_objects.clone();
        for (index, object) in starting.iter().enumerate() {
            match ctx.spawn_object(object.prefab, object.pose, None, true) {
                Ok(_) => {}
                Err(DirectoryError::UnknownPrefab(prefab)) => {
                    return Err(LobbyError::StartingObject { index, prefab });
                }
                Err(e) => return Err(e.into()),
            }
        }
        ctx.save_lobby_metadata();

        log::info!(
            "Lobby {} '{}' running {} at {} Hz with {} starting objects",
            ctx.config.lobby_id,
            ctx.config.lobby.name,
            ctx.map.name,
            ctx.config.tick_rate,
            starting.len()
        );

        Ok(Self {
            ctx,
            services,
            timestep,
        })
    }

    pub fn context(&self) -> &LobbyContext {
        &self.ctx
    }

    pub fn tick(&self) -> u32 {
        self.ctx.tick
    }

    pub fn stats(&self) -> LobbyStats {
        LobbyStats {
            tick: self.ctx.tick,
            users: self.ctx.users.len(),
            in_game: self.ctx.users.iter().filter(|u| u.in_game).count(),
            pending: self.ctx.users.pending_count(),
            objects: self.ctx.objects.len(),
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.ctx.drain_events()
    }

    /// Advances real time by `delta` seconds, running as many fixed ticks
    /// as that covers.
    pub fn update(&mut self, delta: f32) -> u32 {
        let ticks = drain_ticks(&mut self.timestep, delta);
        for _ in 0..ticks {
            self.tick_once();
        }
        ticks
    }

    pub fn tick_once(&mut self) {
        self.ctx.tick = self.ctx.tick.wrapping_add(1);

        self.process_transport();
        for service in self.services.iter_mut() {
            service.tick(&mut self.ctx);
        }
        self.process_lifecycle();
        self.expire_handshakes();
    }

    pub fn spawn_object(
        &mut self,
        server_key: PrefabKey,
        pose: Pose,
        owner: Option<PlayerId>,
    ) -> Result<ObjectId, DirectoryError> {
        self.ctx.spawn_object(server_key, pose, owner, false)
    }

    pub fn destroy_object(&mut self, id: ObjectId) -> bool {
        if is_player_object(id) {
            return false;
        }
        self.ctx.destroy_object(id)
    }

    pub fn kick(&mut self, player: PlayerId) -> bool {
        if self.ctx.users.get(player).is_none() {
            return false;
        }
        self.ctx.push_lifecycle(Lifecycle::Leave {
            player,
            reason: DisconnectReason::Kicked,
        });
        self.process_lifecycle();
        true
    }

    pub fn shutdown(&mut self) {
        let players: Vec<PlayerId> = self.ctx.users.iter().map(|u| u.player_id).collect();
        for player in players {
            self.ctx.push_lifecycle(Lifecycle::Leave {
                player,
                reason: DisconnectReason::Shutdown,
            });
        }
        self.process_lifecycle();
    }

    fn process_transport(&mut self) {
        let events = self.ctx.transport_mut().poll();
        for event in events {
            match event {
                TransportEvent::Connected(peer) => {
                    let deadline = self
                        .ctx
                        .tick
                        .wrapping_add(self.ctx.config.handshake_timeout_ticks());
                    self.ctx.users.add_pending(peer, deadline);
                    self.ctx.push_event(ServerEvent::PeerConnected { peer });
                }
                TransportEvent::Disconnected(peer) => {
                    if self.ctx.users.remove_pending(peer) {
                        log::debug!("Peer {} left during handshake", peer);
                    } else if let Some(player) = self.ctx.users.player_of(peer) {
                        self.ctx.push_lifecycle(Lifecycle::Leave {
                            player,
                            reason: DisconnectReason::Graceful,
                        });
                    }
                }
                TransportEvent::Received {
                    peer, mut packet, ..
                } => self.dispatch(peer, &mut packet),
            }
            self.process_lifecycle();
        }
    }

    fn dispatch(&mut self, peer: PeerId, packet: &mut Packet) {
        match self.services.dispatch(&mut self.ctx, peer, packet) {
            Ok(()) => {}
            Err(RoutingError::Unauthorized(_)) => {
                log::debug!("Ignoring packet from unauthorized peer {}", peer);
            }
            Err(e) => log::warn!("Dropped packet from peer {}: {}", peer, e),
        }
    }

    fn process_lifecycle(&mut self) {
        while let Some(request) = self.ctx.pop_lifecycle() {
            match request {
                Lifecycle::Join {
                    peer,
                    guid,
                    settings,
                } => self.user_joined(peer, guid, settings),
                Lifecycle::JoinGame(player) => self.user_joined_game(player),
                Lifecycle::Leave { player, reason } => self.user_left(player, reason),
            }
        }
    }

    fn user_joined(&mut self, peer: PeerId, guid: Uuid, settings: UserSettings) {
        self.ctx.users.remove_pending(peer);
        let Some(player_id) = self.ctx.users.allocate_player_id() else {
            self.ctx.deny_connection(peer, "no free player slot");
            return;
        };

        let display_name = settings.display_name.clone();
        let user = User {
            global_guid: guid,
            user_id: self.ctx.users.next_user_id(),
            player_id,
            lobby_id: self.ctx.config.lobby_id,
            in_game: false,
            settings,
            peer,
        };
        self.ctx.users.insert(user);
        log::info!("{} joined as player {}", display_name, player_id);

        for service in self.services.iter_mut() {
            service.user_joined(&mut self.ctx, player_id);
        }
        self.ctx.push_event(ServerEvent::UserJoined {
            player_id,
            display_name,
        });
    }

    fn user_joined_game(&mut self, player: PlayerId) {
        let Some(user) = self.ctx.users.get_mut(player) else {
            return;
        };
        if user.in_game {
            return;
        }
        user.in_game = true;

        // lobby members hear about it before any avatar exists
        let mut packet = Packet::command(ServiceId::Game, GameCommand::UserJoined);
        packet.write(player);
        self.ctx.send_to_lobby(&packet, Reliability::ReliableOrdered);

        for service in self.services.iter_mut() {
            service.user_joined_game(&mut self.ctx, player);
        }
        log::info!("Player {} joined the game", player);
        self.ctx.push_event(ServerEvent::UserJoinedGame { player_id: player });
    }

    fn user_left(&mut self, player: PlayerId, reason: DisconnectReason) {
        let Some(peer) = self.ctx.users.get(player).map(|u| u.peer) else {
            return;
        };

        // the LOBBY service runs last and drops the user record
        for service in self.services.iter_mut() {
            service.user_left(&mut self.ctx, player);
        }
        self.ctx.disconnect(peer);

        log::info!("Player {} left: {}", player, reason.as_str());
        self.ctx.push_event(ServerEvent::UserLeft {
            player_id: player,
            reason,
        });
    }

    fn expire_handshakes(&mut self) {
        let tick = self.ctx.tick;
        for peer in self.ctx.users.take_expired(tick) {
            log::info!("Peer {} did not complete its handshake in time", peer);
            self.ctx.disconnect(peer);
            self.ctx.push_event(ServerEvent::HandshakeTimedOut { peer });
        }
    }
}
