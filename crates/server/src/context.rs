use std::collections::VecDeque;

use grasp::collab::{
    LobbyMetadata, MapScene, MetadataStore, NullStore, PrefabCatalog, PrefabResolver, SceneQuery,
    UserMetadata,
};
use grasp::net::{ConnectionCommand, InteractableCommand, ObjectCommand};
use grasp::object::{Archetype, Ownable};
use grasp::{
    MapDefinition, ObjectId, Packet, PeerId, PhysicsWorld, PlayerId, Pose, PrefabKey, Reliability,
    ServiceId, Transport, UserSettings,
};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::directory::{InteractableObject, NetObject, ObjectDirectory, PropObject};
use crate::error::DirectoryError;
use crate::events::{DisconnectReason, ServerEvent};
use crate::ownership;
use crate::users::UserDirectory;

/// Session transitions queued by services and applied by the lobby core,
/// which owns the hook fan-out order.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle {
    Join {
        peer: PeerId,
        guid: Uuid,
        settings: UserSettings,
    },
    JoinGame(PlayerId),
    Leave {
        player: PlayerId,
        reason: DisconnectReason,
    },
}

/// External services the lobby talks to.
pub struct Collaborators {
    pub prefabs: Box<dyn PrefabResolver>,
    pub scene: Box<dyn SceneQuery>,
    pub store: Box<dyn MetadataStore>,
}

impl Collaborators {
    /// In-process defaults: the built-in prefab catalog, scene queries
    /// answered from `map`, and no persistence.
    pub fn for_map(map: &MapDefinition) -> Self {
        Self {
            prefabs: Box::new(PrefabCatalog::testing_ground()),
            scene: Box::new(MapScene::new(map.clone())),
            store: Box::new(NullStore),
        }
    }

    pub fn with_store(mut self, store: impl MetadataStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }
}

/// Everything one lobby's services read and mutate. Owned by the tick
/// thread.
pub struct LobbyContext {
    pub config: ServerConfig,
    pub tick: u32,
    pub map: MapDefinition,
    pub users: UserDirectory,
    pub objects: ObjectDirectory,
    pub physics: PhysicsWorld,
    pub prefabs: Box<dyn PrefabResolver>,
    pub scene: Box<dyn SceneQuery>,
    pub store: Box<dyn MetadataStore>,
    transport: Box<dyn Transport>,
    lifecycle: VecDeque<Lifecycle>,
    events: VecDeque<ServerEvent>,
}

impl LobbyContext {
    pub fn new(
        config: ServerConfig,
        map: MapDefinition,
        transport: Box<dyn Transport>,
        collaborators: Collaborators,
    ) -> Self {
        let physics = PhysicsWorld::new(config.tick_rate);
        Self {
            config,
            tick: 0,
            map,
            users: UserDirectory::new(),
            objects: ObjectDirectory::new(),
            physics,
            prefabs: collaborators.prefabs,
            scene: collaborators.scene,
            store: collaborators.store,
            transport,
            lifecycle: VecDeque::new(),
            events: VecDeque::new(),
        }
    }

    pub fn push_lifecycle(&mut self, request: Lifecycle) {
        self.lifecycle.push_back(request);
    }

    pub(crate) fn pop_lifecycle(&mut self) -> Option<Lifecycle> {
        self.lifecycle.pop_front()
    }

    pub fn push_event(&mut self, event: ServerEvent) {
        self.events.push_back(event);
    }

    pub(crate) fn drain_events(&mut self) -> impl Iterator<Item = ServerEvent> + '_ {
        self.events.drain(..)
    }

    pub(crate) fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    /// Refuses a handshake: answers with the reason, then drops the peer.
    pub fn deny_connection(&mut self, peer: PeerId, reason: &str) {
        let mut packet = Packet::command(ServiceId::Connection, ConnectionCommand::Response);
        packet.write(false).write(reason);
        self.send_to_peer(peer, &packet, Reliability::ReliableOrdered);

        self.users.remove_pending(peer);
        self.disconnect(peer);
        log::info!("Denied connection from peer {}: {}", peer, reason);
        self.push_event(ServerEvent::ConnectionDenied {
            peer,
            reason: reason.to_string(),
        });
    }

    pub fn disconnect(&mut self, peer: PeerId) {
        self.transport.disconnect(peer);
    }

    pub fn send_to_peer(&mut self, peer: PeerId, packet: &Packet, reliability: Reliability) {
        self.transport.send(peer, packet, reliability);
    }

    pub fn send_to_player(&mut self, player: PlayerId, packet: &Packet, reliability: Reliability) {
        if let Some(peer) = self.users.get(player).map(|u| u.peer) {
            self.transport.send(peer, packet, reliability);
        }
    }

    /// Every user who has joined the lobby, in game or not.
    pub fn send_to_lobby(&mut self, packet: &Packet, reliability: Reliability) {
        let peers = self.users.lobby_peers();
        self.transport.send_to_list(&peers, packet, reliability);
    }

    pub fn send_to_lobby_except(
        &mut self,
        except: PlayerId,
        packet: &Packet,
        reliability: Reliability,
    ) {
        let peers: Vec<PeerId> = self
            .users
            .iter()
            .filter(|u| u.player_id != except)
            .map(|u| u.peer)
            .collect();
        self.transport.send_to_list(&peers, packet, reliability);
    }

    pub fn send_to_game(&mut self, packet: &Packet, reliability: Reliability) {
        let peers = self.users.in_game_peers();
        self.transport.send_to_list(&peers, packet, reliability);
    }

    pub fn send_to_game_except(
        &mut self,
        except: PlayerId,
        packet: &Packet,
        reliability: Reliability,
    ) {
        let peers: Vec<PeerId> = self
            .users
            .iter()
            .filter(|u| u.in_game && u.player_id != except)
            .map(|u| u.peer)
            .collect();
        self.transport.send_to_list(&peers, packet, reliability);
    }

    pub fn lobby_metadata(&self) -> LobbyMetadata {
        LobbyMetadata {
            lobby_id: self.config.lobby_id,
            name: self.config.lobby.name.clone(),
            map_name: self.map.name.clone(),
            user_count: u8::try_from(self.users.len()).unwrap_or(u8::MAX),
            max_users: self.config.lobby.max_users,
        }
    }

    pub fn save_user_metadata(&mut self, player: PlayerId) {
        let Some(user) = self.users.get(player) else {
            return;
        };
        let metadata = UserMetadata {
            user_id: user.user_id,
            guid: *user.global_guid.as_bytes(),
            display_name: user.settings.display_name.clone(),
            lobby_id: user.lobby_id,
        };
        self.store.save_user_metadata(metadata);
    }

    pub fn save_lobby_metadata(&mut self) {
        let metadata = self.lobby_metadata();
        self.store.save_lobby_metadata(metadata);
    }

    /// Creates a map or dynamic object from a server prefab key.
    ///
    /// Starting objects are only remembered for late-joiner catch-up;
    /// anything else is announced to every in-game user right away.
    pub fn spawn_object(
        &mut self,
        server_key: PrefabKey,
        pose: Pose,
        owner: Option<PlayerId>,
        starting: bool,
    ) -> Result<ObjectId, DirectoryError> {
        let (Some(client), Some(descriptor)) = (
            self.prefabs.resolve_client_path(server_key),
            self.prefabs.descriptor(server_key),
        ) else {
            log::error!("Refusing spawn of unknown prefab {}", server_key);
            return Err(DirectoryError::UnknownPrefab(server_key));
        };

        let id = self.objects.generate_object_id()?;
        let body = self.physics.add_dynamic_box(
            pose.position,
            pose.rotation,
            descriptor.half_extents,
            descriptor.mass,
        );
        let object = match descriptor.archetype {
            Archetype::Interactable(effect) => NetObject::Interactable(InteractableObject {
                id,
                prefab: server_key,
                client_key: client.key,
                pose,
                owner: None,
                effect,
                reported: None,
                body,
            }),
            Archetype::Prop => NetObject::Prop(PropObject {
                id,
                prefab: server_key,
                client_key: client.key,
                pose,
                body,
            }),
        };

        let inserted = if starting {
            self.objects.insert_starting(object)
        } else {
            self.objects.insert(object)
        };
        if let Err(e) = inserted {
            self.physics.remove_body(body);
            return Err(e);
        }

        if let Some(player) = owner {
            if let Err(e) = ownership::try_grab(&mut self.objects, &mut self.physics, player, id) {
                log::warn!("Spawned object {} without owner: {}", id, e);
            }
        }

        log::debug!("Spawned object {} from prefab {} ({})", id, server_key, client.path);
        self.push_event(ServerEvent::ObjectSpawned {
            id,
            prefab: server_key,
        });

        if !starting {
            if let Some(packet) = self.spawn_packet(id) {
                self.send_to_game(&packet, Reliability::ReliableOrdered);
            }
        }
        Ok(id)
    }

    /// OBJECT.SPAWN for a live non-player object.
    pub fn spawn_packet(&self, id: ObjectId) -> Option<Packet> {
        let object = self.objects.get(id)?;
        let client_key = object.client_key()?;
        let pose = object.pose();

        let mut packet = Packet::command(ServiceId::Object, ObjectCommand::Spawn);
        packet
            .write(id)
            .write(client_key)
            .write(pose.position)
            .write(pose.rotation);
        if let NetObject::Interactable(i) = object {
            if let Some(owner) = i.owner() {
                packet.write(owner);
            }
        }
        Some(packet)
    }

    /// Removes a non-player object and tells every in-game user. A held
    /// object is dropped first so no player keeps a reference to it.
    pub fn destroy_object(&mut self, id: ObjectId) -> bool {
        let holder = self.objects.interactable(id).and_then(|i| i.owner());
        if let Some(player) = holder {
            if let Some((released, pose)) =
                ownership::force_drop(&mut self.objects, &mut self.physics, player)
            {
                self.broadcast_drop(released, player, pose);
            }
        }

        let Some(object) = self.objects.remove(id) else {
            return false;
        };
        self.physics.remove_body(object.body());

        let mut packet = Packet::command(ServiceId::Object, ObjectCommand::Destroy);
        packet.write(id);
        self.send_to_game(&packet, Reliability::ReliableOrdered);
        self.push_event(ServerEvent::ObjectDestroyed { id });
        true
    }

    pub fn broadcast_drop(&mut self, target: ObjectId, player: PlayerId, pose: Pose) {
        let mut packet = Packet::new();
        packet
            .write(player)
            .write(pose.position)
            .write(pose.rotation)
            .wrap_for_object(target, ServiceId::Interactable, InteractableCommand::Drop);
        self.send_to_game(&packet, Reliability::ReliableOrdered);
    }
}
