use glam::Vec3;
use grasp::net::{
    ConnectionCommand, EventCommand, FxCommand, GameCommand, InteractableCommand, LobbyCommand,
    ObjectCommand, PlayerCommand,
};
use grasp::object::player_object_id;
use grasp::{
    ObjectId, PROTOCOL_VERSION, Packet, PlayerFlags, PlayerId, Pose, PrefabKey, RegistryError,
    Reliability, RoutingError, SERVER_PEER, ServiceId, Transport, TransportEvent, UserInfo,
    UserSettings, Verb,
};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::context::{ClientCollaborators, ClientContext, ConnectionState, LocalIdentity};
use crate::events::ClientEvent;
use crate::objects::{ClientObject, ClientObjects};
use crate::services::{ClientRegistry, default_registry};

/// One participant's view of a lobby.
///
/// Owns the client services and the object mirror; `update` drains the
/// transport and advances interpolation once per rendered frame.
pub struct ClientLobby {
    ctx: ClientContext,
    services: ClientRegistry,
    guid: Uuid,
    sequence: u32,
}

impl ClientLobby {
    pub fn new(
        config: ClientConfig,
        transport: Box<dyn Transport>,
        collaborators: ClientCollaborators,
    ) -> Result<Self, RegistryError> {
        let guid = config.guid.unwrap_or_else(Uuid::new_v4);
        Ok(Self {
            ctx: ClientContext::new(config, transport, collaborators),
            services: default_registry()?,
            guid,
            sequence: 0,
        })
    }

    pub fn connect(&mut self, display_name: &str) {
        let settings = UserSettings::new(display_name);
        let mut packet = Packet::command(ServiceId::Connection, ConnectionCommand::Request);
        packet
            .write(PROTOCOL_VERSION)
            .write(self.guid)
            .write(settings.display_name.as_str());
        self.ctx.state = ConnectionState::Connecting;
        self.ctx.send(&packet, Reliability::ReliableOrdered);
        log::info!("Connecting as {}", settings.display_name);
    }

    pub fn disconnect(&mut self) {
        if self.ctx.state == ConnectionState::Disconnected {
            return;
        }
        self.ctx.transport_mut().disconnect(SERVER_PEER);
        self.ctx.reset();
        self.ctx.push_event(ClientEvent::Disconnected);
    }

    pub fn set_display_name(&mut self, display_name: &str) {
        let settings = UserSettings::new(display_name);
        let mut packet = Packet::command(ServiceId::Lobby, LobbyCommand::UserSettings);
        packet.write(settings.display_name.as_str());
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    pub fn join_game(&mut self) {
        let packet = Packet::command(ServiceId::Game, GameCommand::UserJoined);
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    pub fn request_grab(&mut self, target: ObjectId) -> bool {
        self.request(Verb::Grab, target)
    }

    pub fn request_interact(&mut self, target: ObjectId) -> bool {
        self.request(Verb::Interact, target)
    }

    pub fn request_drop(&mut self, target: ObjectId) -> bool {
        self.request(Verb::Drop, target)
    }

    /// Asks the authority for `verb` on `target`. Returns false if nothing
    /// was sent because the same request is still unanswered.
    pub fn request(&mut self, verb: Verb, target: ObjectId) -> bool {
        let Some(player) = self.ctx.player_id() else {
            return false;
        };
        if !self.ctx.pending.insert(verb, target) {
            return false;
        }

        let mut body = Packet::new();
        body.write(target);
        self.ctx.send_to_object(
            player_object_id(player),
            ServiceId::Player,
            verb.request_command(),
            body,
            Reliability::ReliableOrdered,
        );
        true
    }

    pub fn send_player_transform(&mut self, pose: Pose) {
        let Some(player) = self.ctx.player_id() else {
            return;
        };
        if let Some(avatar) = self.ctx.objects.player_mut(player) {
            avatar.transform.teleport(pose);
        }

        let mut body = Packet::new();
        body.write(self.next_sequence()).write(pose);
        self.ctx.send_to_object(
            player_object_id(player),
            ServiceId::Player,
            PlayerCommand::Transform,
            body,
            Reliability::Unreliable,
        );
    }

    /// Reports the pose of whatever the local player holds. Does nothing
    /// when empty-handed.
    pub fn send_held_transform(&mut self, pose: Pose) -> bool {
        let Some(held) = self.holding() else {
            return false;
        };
        if let Some(object) = self.ctx.objects.get_mut(held) {
            object.transform_mut().teleport(pose);
        }

        let mut body = Packet::new();
        body.write(self.next_sequence()).write(pose);
        self.ctx.send_to_object(
            held,
            ServiceId::Interactable,
            InteractableCommand::Transform,
            body,
            Reliability::Unreliable,
        );
        true
    }

    pub fn send_anim(&mut self, flags: PlayerFlags) {
        let Some(player) = self.ctx.player_id() else {
            return;
        };
        if let Some(avatar) = self.ctx.objects.player_mut(player) {
            avatar.flags = flags;
        }

        let mut body = Packet::new();
        body.write(flags);
        self.ctx.send_to_object(
            player_object_id(player),
            ServiceId::Player,
            PlayerCommand::Anim,
            body,
            Reliability::ReliableOrdered,
        );
    }

    pub fn request_spawn(&mut self, client_key: PrefabKey, pose: Pose) {
        let mut packet = Packet::command(ServiceId::Object, ObjectCommand::SpawnRequest);
        packet.write(client_key).write(pose);
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    pub fn request_destroy(&mut self, id: ObjectId) {
        let mut packet = Packet::command(ServiceId::Object, ObjectCommand::DestroyRequest);
        packet.write(id);
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    /// Plays a sound locally and asks the server to play it for everyone
    /// else.
    pub fn play_sfx(&mut self, id: u16, volume: f32, position: Option<Vec3>) {
        self.ctx.effects.play_sfx(id, volume, position);

        let mut packet = Packet::command(ServiceId::Fx, FxCommand::Sfx);
        packet.write(id).write(volume);
        if let Some(position) = position {
            packet.write(position);
        }
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    pub fn play_vfx(&mut self, id: u16, position: Vec3, scale: f32) {
        self.ctx.effects.play_vfx(id, position, scale);

        let mut packet = Packet::command(ServiceId::Fx, FxCommand::Vfx);
        packet.write(id).write(position).write(scale);
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    pub fn report_ground_hit(&mut self, position: Vec3, speed: f32) {
        let mut packet = Packet::command(ServiceId::Event, EventCommand::GroundHit);
        packet.write(position).write(speed);
        self.ctx.send(&packet, Reliability::ReliableOrdered);
    }

    /// Processes everything the server sent, then advances interpolation by
    /// `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.process_transport();

        let rate = self.ctx.config.interpolation_rate;
        for object in self.ctx.objects.iter_mut() {
            object.transform_mut().update(dt, rate);
        }
    }

    fn process_transport(&mut self) {
        let events = self.ctx.transport_mut().poll();
        for event in events {
            match event {
                TransportEvent::Connected(_) => {}
                TransportEvent::Disconnected(_) => {
                    if self.ctx.state != ConnectionState::Disconnected {
                        log::info!("Disconnected from server");
                        self.ctx.reset();
                        self.ctx.push_event(ClientEvent::Disconnected);
                    }
                }
                TransportEvent::Received {
                    peer, mut packet, ..
                } => match self.services.dispatch(&mut self.ctx, peer, &mut packet) {
                    Ok(()) => {}
                    Err(RoutingError::ObjectNotFound(id)) => {
                        log::debug!("Packet for unknown object {}", id);
                    }
                    Err(e) => log::warn!("Dropped packet from server: {}", e),
                },
            }
        }
    }

    fn next_sequence(&mut self) -> u32 {
        self.sequence = self.sequence.wrapping_add(1);
        self.sequence
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = ClientEvent> + '_ {
        self.ctx.drain_events()
    }

    pub fn state(&self) -> ConnectionState {
        self.ctx.state
    }

    pub fn is_connected(&self) -> bool {
        self.ctx.state == ConnectionState::Connected
    }

    pub fn identity(&self) -> Option<LocalIdentity> {
        self.ctx.identity
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.ctx.player_id()
    }

    pub fn guid(&self) -> Uuid {
        self.guid
    }

    pub fn in_game(&self) -> bool {
        self.ctx.in_game
    }

    pub fn server_tick(&self) -> u32 {
        self.ctx.server_tick
    }

    pub fn users(&self) -> impl Iterator<Item = &UserInfo> {
        self.ctx.users.values()
    }

    pub fn user(&self, player: PlayerId) -> Option<&UserInfo> {
        self.ctx.users.get(&player)
    }

    pub fn objects(&self) -> &ClientObjects {
        &self.ctx.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&ClientObject> {
        self.ctx.objects.get(id)
    }

    pub fn holding(&self) -> Option<ObjectId> {
        self.ctx.player_id().and_then(|p| self.ctx.objects.held_by(p))
    }

    pub fn is_pending(&self, verb: Verb, target: ObjectId) -> bool {
        self.ctx.pending.contains(verb, target)
    }

    pub fn context(&self) -> &ClientContext {
        &self.ctx
    }
}
