use std::collections::{BTreeMap, VecDeque};

use grasp::collab::{EffectsPlayer, LogEffects, PrefabCatalog, PrefabResolver};
use grasp::object::player_object_id;
use grasp::{
    LobbySettings, MapDefinition, ObjectId, Packet, PlayerId, Reliability, SERVER_PEER,
    ServiceId, Transport, UserInfo,
};

use crate::config::ClientConfig;
use crate::events::ClientEvent;
use crate::objects::ClientObjects;
use crate::requests::PendingRequests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// What the server told this client about itself when it accepted the
/// handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalIdentity {
    pub player_id: PlayerId,
    pub user_id: u32,
    pub lobby_id: u64,
}

pub struct ClientCollaborators {
    pub prefabs: Box<dyn PrefabResolver>,
    pub effects: Box<dyn EffectsPlayer>,
}

impl Default for ClientCollaborators {
    fn default() -> Self {
        Self {
            prefabs: Box::new(PrefabCatalog::testing_ground()),
            effects: Box::new(LogEffects),
        }
    }
}

impl ClientCollaborators {
    pub fn with_effects(mut self, effects: impl EffectsPlayer + 'static) -> Self {
        self.effects = Box::new(effects);
        self
    }
}

/// State shared by the client services.
pub struct ClientContext {
    pub config: ClientConfig,
    pub state: ConnectionState,
    pub identity: Option<LocalIdentity>,
    pub settings: Option<LobbySettings>,
    pub server_tick_rate: u32,
    pub map: Option<MapDefinition>,
    pub users: BTreeMap<PlayerId, UserInfo>,
    pub in_game: bool,
    pub server_tick: u32,
    pub objects: ClientObjects,
    pub pending: PendingRequests,
    pub prefabs: Box<dyn PrefabResolver>,
    pub effects: Box<dyn EffectsPlayer>,
    transport: Box<dyn Transport>,
    events: VecDeque<ClientEvent>,
}

impl ClientContext {
    pub fn new(
        config: ClientConfig,
        transport: Box<dyn Transport>,
        collaborators: ClientCollaborators,
    ) -> Self {
        Self {
            config,
            state: ConnectionState::Disconnected,
            identity: None,
            settings: None,
            server_tick_rate: 0,
            map: None,
            users: BTreeMap::new(),
            in_game: false,
            server_tick: 0,
            objects: ClientObjects::new(),
            pending: PendingRequests::new(),
            prefabs: collaborators.prefabs,
            effects: collaborators.effects,
            transport,
            events: VecDeque::new(),
        }
    }

    pub fn player_id(&self) -> Option<PlayerId> {
        self.identity.map(|i| i.player_id)
    }

    pub fn is_local(&self, player: PlayerId) -> bool {
        self.player_id() == Some(player)
    }

    /// Whether this client drives `id` itself and so ignores snapshots for it.
    pub fn drives(&self, id: ObjectId) -> bool {
        let Some(local) = self.player_id() else {
            return false;
        };
        id == player_object_id(local) || self.objects.held_by(local) == Some(id)
    }

    pub fn observe_tick(&mut self, tick: u32) {
        self.server_tick = self.server_tick.max(tick);
    }

    pub fn push_event(&mut self, event: ClientEvent) {
        self.events.push_back(event);
    }

    pub(crate) fn drain_events(&mut self) -> impl Iterator<Item = ClientEvent> + '_ {
        self.events.drain(..)
    }

    pub(crate) fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    pub fn send(&mut self, packet: &Packet, reliability: Reliability) {
        self.transport.send(SERVER_PEER, packet, reliability);
    }

    /// Sends `body` as an object envelope for `target`.
    pub fn send_to_object(
        &mut self,
        target: ObjectId,
        service: ServiceId,
        command: impl Into<u8>,
        mut body: Packet,
        reliability: Reliability,
    ) {
        body.wrap_for_object(target, service, command);
        self.send(&body, reliability);
    }

    /// Forgets everything learned from the server.
    pub fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.identity = None;
        self.settings = None;
        self.map = None;
        self.users.clear();
        self.in_game = false;
        self.server_tick = 0;
        self.objects.clear();
        self.pending.clear();
    }
}
