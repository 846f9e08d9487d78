use glam::Vec3;
use grasp::collab::{EffectLog, MemoryStore, PlayedEffect};
use grasp::map::testing_ground::prefabs;
use grasp::net::{ConnectionCommand, LoopbackClient, LoopbackConnector, LoopbackServer};
use grasp::object::{Ownable, player_object_id};
use grasp::{
    MapDefinition, ObjectId, PROTOCOL_VERSION, Packet, Pose, Reliability, SERVER_PEER, ServiceId,
    Transport, TransportEvent, Verb,
};
use grasp_client::{ClientCollaborators, ClientConfig, ClientEvent, ClientLobby};
use grasp_server::{
    Collaborators, DisconnectReason, NetObject, ServerConfig, ServerEvent, ServerLobby,
};
use uuid::Uuid;

struct Session {
    server: ServerLobby,
    connector: LoopbackConnector,
}

fn session_with(config: ServerConfig) -> Session {
    let transport = LoopbackServer::new();
    let connector = transport.connector();
    let map = MapDefinition::by_name(&config.lobby.map_name).unwrap();
    let server =
        ServerLobby::new(config, Box::new(transport), Collaborators::for_map(&map)).unwrap();
    Session { server, connector }
}

fn session() -> Session {
    session_with(ServerConfig::default())
}

impl Session {
    fn client(&self, name: &str) -> ClientLobby {
        let mut client = ClientLobby::new(
            ClientConfig::default(),
            Box::new(self.connector.connect()),
            ClientCollaborators::default(),
        )
        .unwrap();
        client.connect(name);
        client
    }

    fn pump(&mut self, clients: &mut [&mut ClientLobby]) {
        for _ in 0..4 {
            self.server.tick_once();
            for client in clients.iter_mut() {
                client.update(1.0 / 60.0);
            }
        }
    }

    fn join_game(&mut self, name: &str, others: &mut [&mut ClientLobby]) -> ClientLobby {
        let mut client = self.client(name);
        {
            let mut all: Vec<&mut ClientLobby> = others.iter_mut().map(|c| &mut **c).collect();
            all.push(&mut client);
            self.pump(&mut all);
        }
        assert!(client.is_connected());
        client.join_game();
        {
            let mut all: Vec<&mut ClientLobby> = others.iter_mut().map(|c| &mut **c).collect();
            all.push(&mut client);
            self.pump(&mut all);
        }
        assert!(client.in_game());
        client
    }

    fn owner_of(&self, id: ObjectId) -> Option<u8> {
        self.server
            .context()
            .objects
            .interactable(id)
            .and_then(|i| i.owner())
    }

    fn server_ids(&self) -> Vec<ObjectId> {
        self.server
            .context()
            .objects
            .iter()
            .map(NetObject::id)
            .collect()
    }
}

fn events(client: &mut ClientLobby) -> Vec<ClientEvent> {
    client.drain_events().collect()
}

fn spawn_lantern(session: &mut Session) -> ObjectId {
    session
        .server
        .spawn_object(prefabs::LANTERN, Pose::at(Vec3::new(0.0, 1.0, 2.0)), None)
        .unwrap()
}

#[test]
fn test_clients_connect_and_see_each_other() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let b = session.join_game("bob", &mut [&mut a]);

    let a_id = a.player_id().unwrap();
    let b_id = b.player_id().unwrap();
    assert_ne!(a_id, b_id);

    assert_eq!(a.users().count(), 2);
    assert_eq!(b.user(a_id).map(|u| u.display_name.as_str()), Some("alice"));
    assert!(a.objects().player(b_id).is_some());
    assert!(b.objects().player(a_id).is_some());
    assert_eq!(session.server.stats().in_game, 2);
}

#[test]
fn test_grab_is_broadcast_and_interact_is_owner_only() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a, &mut b]);
    events(&mut a);
    events(&mut b);

    let a_id = a.player_id().unwrap();
    assert!(a.request_grab(x));
    session.pump(&mut [&mut a, &mut b]);

    assert!(events(&mut b).contains(&ClientEvent::Granted {
        verb: Verb::Grab,
        target: x,
        player: a_id,
    }));
    assert_eq!(b.objects().held_by(a_id), Some(x));
    assert_eq!(a.holding(), Some(x));
    events(&mut a);

    assert!(a.request_interact(x));
    assert!(b.request_interact(x));
    session.pump(&mut [&mut a, &mut b]);

    let a_events = events(&mut a);
    let b_events = events(&mut b);
    assert!(a_events.contains(&ClientEvent::Granted {
        verb: Verb::Interact,
        target: x,
        player: a_id,
    }));
    assert!(!a_events.iter().any(|e| matches!(e, ClientEvent::Denied { .. })));
    assert!(b_events.contains(&ClientEvent::Denied {
        verb: Verb::Interact,
        target: x,
    }));
    assert!(!b.is_pending(Verb::Interact, x));
    assert_eq!(session.owner_of(x), Some(a_id));
}

#[test]
fn test_second_grab_and_foreign_drop_are_denied() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a, &mut b]);

    a.request_grab(x);
    session.pump(&mut [&mut a, &mut b]);
    events(&mut b);

    b.request_grab(x);
    b.request_drop(x);
    session.pump(&mut [&mut a, &mut b]);

    let b_events = events(&mut b);
    assert!(b_events.contains(&ClientEvent::Denied {
        verb: Verb::Grab,
        target: x
    }));
    assert!(b_events.contains(&ClientEvent::Denied {
        verb: Verb::Drop,
        target: x
    }));
    assert!(!events(&mut a).iter().any(|e| matches!(e, ClientEvent::Denied { .. })));
    assert_eq!(session.owner_of(x), a.player_id());
}

#[test]
fn test_request_before_joining_game_is_denied_and_not_stuck() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let x = spawn_lantern(&mut session);
    let mut b = session.client("bob");
    session.pump(&mut [&mut a, &mut b]);
    assert!(b.is_connected());
    assert!(!b.in_game());
    events(&mut b);

    assert!(b.request_grab(x));
    session.pump(&mut [&mut a, &mut b]);

    assert!(events(&mut b).contains(&ClientEvent::Denied {
        verb: Verb::Grab,
        target: x
    }));
    assert!(!b.is_pending(Verb::Grab, x));
    assert_eq!(session.owner_of(x), None);

    b.join_game();
    session.pump(&mut [&mut a, &mut b]);
    assert!(b.in_game());

    assert!(b.request_grab(x));
    session.pump(&mut [&mut a, &mut b]);
    assert_eq!(session.owner_of(x), b.player_id());
    assert_eq!(b.holding(), Some(x));
}

#[test]
fn test_request_through_foreign_avatar_is_denied() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a]);
    let a_id = a.player_id().unwrap();

    let mut raw = session.connector.connect();
    raw.send(
        SERVER_PEER,
        &raw_request(PROTOCOL_VERSION),
        Reliability::ReliableOrdered,
    );
    session.server.tick_once();
    let (accepted, mut response) = first_response(&mut raw).unwrap();
    assert!(accepted);
    let player = response.read::<u8>().unwrap();

    let join = Packet::command(ServiceId::Game, grasp::net::GameCommand::UserJoined);
    raw.send(SERVER_PEER, &join, Reliability::ReliableOrdered);
    session.pump(&mut [&mut a]);
    raw.poll();
    events(&mut a);

    // grab sent through alice's avatar instead of its own
    let mut grab = Packet::new();
    grab.write(x).wrap_for_object(
        player_object_id(a_id),
        ServiceId::Player,
        Verb::Grab.request_command(),
    );
    raw.send(SERVER_PEER, &grab, Reliability::ReliableOrdered);
    session.pump(&mut [&mut a]);

    assert_eq!(session.owner_of(x), None);
    let denies: Vec<(ObjectId, ObjectId)> = raw
        .poll()
        .into_iter()
        .filter_map(|event| match event {
            TransportEvent::Received { mut packet, .. } => {
                packet.read_header().ok()?;
                let target = packet.read::<ObjectId>().ok()?;
                let service = packet.read::<u8>().ok()?;
                let command = packet.read::<u8>().ok()?;
                if service != ServiceId::Player as u8
                    || command != u8::from(Verb::Grab.deny_command())
                {
                    return None;
                }
                Some((target, packet.read::<ObjectId>().ok()?))
            }
            _ => None,
        })
        .collect();
    assert_eq!(denies, vec![(player_object_id(player), x)]);
    assert!(!events(&mut a).iter().any(|e| matches!(e, ClientEvent::Denied { .. })));
}

#[test]
fn test_owner_drop_frees_object() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a, &mut b]);

    a.request_grab(x);
    session.pump(&mut [&mut a, &mut b]);
    a.request_drop(x);
    session.pump(&mut [&mut a, &mut b]);

    assert_eq!(session.owner_of(x), None);
    assert_eq!(a.holding(), None);
    assert_eq!(b.objects().interactable(x).and_then(|i| i.owner), None);
    assert!(!session.server.context().physics.is_kinematic(
        session.server.context().objects.get(x).unwrap().body()
    ));
}

#[test]
fn test_held_object_follows_reported_pose() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a]);

    a.request_grab(x);
    session.pump(&mut [&mut a]);
    let target = Pose::at(Vec3::new(2.0, 3.0, 4.0));
    assert!(a.send_held_transform(target));
    session.pump(&mut [&mut a]);

    let pose = session.server.context().objects.get(x).unwrap().pose();
    assert!(pose.position.abs_diff_eq(target.position, 1e-3));
}

#[test]
fn test_unknown_client_prefab_spawns_nothing() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    session.server.drain_events().for_each(drop);
    events(&mut b);
    let before = session.server_ids();

    a.request_spawn(7, Pose::at(Vec3::new(0.0, 2.0, 0.0)));
    session.pump(&mut [&mut a, &mut b]);

    assert_eq!(session.server_ids(), before);
    assert!(
        !session
            .server
            .drain_events()
            .any(|e| matches!(e, ServerEvent::ObjectSpawned { .. }))
    );
    assert!(
        !events(&mut b)
            .iter()
            .any(|e| matches!(e, ClientEvent::ObjectSpawned { .. }))
    );
}

#[test]
fn test_known_client_prefab_spawns_for_everyone() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    events(&mut b);

    a.request_spawn(11, Pose::at(Vec3::new(0.0, 2.0, 0.0)));
    session.pump(&mut [&mut a, &mut b]);

    let spawned: Vec<ObjectId> = events(&mut b)
        .into_iter()
        .filter_map(|e| match e {
            ClientEvent::ObjectSpawned { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 1);
    assert!(spawned[0] >= 256);
    assert!(a.object(spawned[0]).is_some());
}

#[test]
fn test_late_joiner_matches_server_directory() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);

    let starting = session.server.context().objects.starting_ids().to_vec();
    let destroyed = starting[2];
    assert!(session.server.destroy_object(destroyed));
    let x = spawn_lantern(&mut session);
    let crate_id = session
        .server
        .spawn_object(prefabs::CRATE, Pose::at(Vec3::new(1.0, 1.0, 1.0)), None)
        .unwrap();
    session.pump(&mut [&mut a]);
    a.request_grab(x);
    session.pump(&mut [&mut a]);

    let c = session.join_game("carol", &mut [&mut a]);

    let mut server_ids = session.server_ids();
    let mut client_ids = c.objects().ids();
    server_ids.sort_unstable();
    client_ids.sort_unstable();
    assert_eq!(client_ids, server_ids);
    assert!(c.object(destroyed).is_none());
    assert!(c.object(crate_id).is_some());
    assert_eq!(c.objects().held_by(a.player_id().unwrap()), Some(x));
}

#[test]
fn test_disconnect_while_holding_frees_object() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a, &mut b]);

    let a_id = a.player_id().unwrap();
    a.request_grab(x);
    session.pump(&mut [&mut a, &mut b]);
    events(&mut b);

    drop(a);
    session.pump(&mut [&mut b]);

    assert_eq!(session.owner_of(x), None);
    assert!(session.server.context().objects.player(a_id).is_none());
    assert_eq!(b.objects().interactable(x).and_then(|i| i.owner), None);
    assert!(b.objects().player(a_id).is_none());

    let b_events = events(&mut b);
    let drop_at = b_events.iter().position(|e| {
        *e == ClientEvent::Granted {
            verb: Verb::Drop,
            target: x,
            player: a_id,
        }
    });
    let left_at = b_events
        .iter()
        .position(|e| *e == ClientEvent::UserLeft { player_id: a_id });
    assert!(drop_at.unwrap() < left_at.unwrap());
    assert!(session.server.drain_events().any(|e| matches!(
        e,
        ServerEvent::UserLeft {
            reason: DisconnectReason::Graceful,
            ..
        }
    )));
}

#[test]
fn test_player_ids_are_reclaimed() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let b = session.join_game("bob", &mut [&mut a]);
    let b_id = b.player_id().unwrap();

    drop(b);
    session.pump(&mut [&mut a]);
    let c = session.join_game("carol", &mut [&mut a]);
    assert_eq!(c.player_id(), Some(b_id));
}

#[test]
fn test_silent_peer_times_out() {
    let mut session = session_with(ServerConfig {
        handshake_timeout_secs: 0.1,
        ..Default::default()
    });
    let mut silent: LoopbackClient = session.connector.connect();

    for _ in 0..10 {
        session.server.tick_once();
    }

    assert!(
        session
            .server
            .drain_events()
            .any(|e| matches!(e, ServerEvent::HandshakeTimedOut { .. }))
    );
    silent.poll();
    assert!(!silent.is_connected());
    assert_eq!(session.server.stats().pending, 0);
}

fn raw_request(version: u32) -> Packet {
    let mut packet = Packet::command(ServiceId::Connection, ConnectionCommand::Request);
    packet.write(version).write(Uuid::new_v4()).write("raw");
    packet
}

fn first_response(client: &mut LoopbackClient) -> Option<(bool, Packet)> {
    client.poll().into_iter().find_map(|event| match event {
        TransportEvent::Received { mut packet, .. } => {
            let (service, command) = packet.read_header().ok()?;
            if service != ServiceId::Connection as u8
                || command != u8::from(ConnectionCommand::Response)
            {
                return None;
            }
            let accepted = packet.read::<bool>().ok()?;
            Some((accepted, packet))
        }
        _ => None,
    })
}

#[test]
fn test_wrong_protocol_version_is_denied() {
    let mut session = session();
    let mut raw = session.connector.connect();
    raw.send(
        SERVER_PEER,
        &raw_request(PROTOCOL_VERSION + 1),
        Reliability::ReliableOrdered,
    );
    session.server.tick_once();

    let (accepted, mut packet) = first_response(&mut raw).unwrap();
    assert!(!accepted);
    assert!(packet.read::<String>().unwrap().contains("version"));
    assert!(!raw.is_connected());
    assert_eq!(session.server.stats().users, 0);
}

#[test]
fn test_full_lobby_rejects_newcomer() {
    let mut config = ServerConfig::default();
    config.lobby.max_users = 1;
    let mut session = session_with(config);
    let mut a = session.join_game("alice", &mut []);

    let mut b = session.client("bob");
    session.pump(&mut [&mut a, &mut b]);

    assert!(!b.is_connected());
    assert!(
        events(&mut b)
            .iter()
            .any(|e| matches!(e, ClientEvent::Rejected { .. }))
    );
    assert_eq!(session.server.stats().users, 1);
}

#[test]
fn test_kick_removes_user() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let b_id = b.player_id().unwrap();

    assert!(session.server.kick(b_id));
    session.pump(&mut [&mut a, &mut b]);

    assert!(!b.is_connected());
    assert!(a.user(b_id).is_none());
    assert!(a.objects().player(b_id).is_none());
    assert_eq!(session.server.stats().users, 1);
    assert!(session.server.context().users.get(b_id).is_none());
    assert!(!session.server.kick(b_id));
}

#[test]
fn test_rename_reaches_whole_lobby() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let b_id = b.player_id().unwrap();
    events(&mut a);

    b.set_display_name("  robert ");
    session.pump(&mut [&mut a, &mut b]);

    assert!(events(&mut a).contains(&ClientEvent::UserRenamed {
        player_id: b_id,
        display_name: String::from("robert"),
    }));
    assert_eq!(b.user(b_id).map(|u| u.display_name.as_str()), Some("robert"));
    assert_eq!(
        session
            .server
            .context()
            .users
            .get(b_id)
            .map(|u| u.settings.display_name.as_str()),
        Some("robert")
    );
}

#[test]
fn test_destroy_request_respects_holder() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a, &mut b]);

    a.request_grab(x);
    session.pump(&mut [&mut a, &mut b]);
    b.request_destroy(x);
    session.pump(&mut [&mut a, &mut b]);
    assert!(session.server_ids().contains(&x));
    assert!(b.object(x).is_some());

    events(&mut b);
    a.request_destroy(x);
    session.pump(&mut [&mut a, &mut b]);

    assert!(!session.server_ids().contains(&x));
    assert!(events(&mut b).contains(&ClientEvent::ObjectDestroyed { id: x }));
    assert!(a.object(x).is_none());
    assert_eq!(a.holding(), None);
}

#[test]
fn test_ground_hit_reaches_other_players() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let a_id = a.player_id().unwrap();
    events(&mut a);
    events(&mut b);

    a.report_ground_hit(Vec3::new(1.0, 0.0, 2.0), 7.5);
    session.pump(&mut [&mut a, &mut b]);

    assert!(events(&mut b).contains(&ClientEvent::GroundHit {
        player_id: a_id,
        position: Vec3::new(1.0, 0.0, 2.0),
        speed: 7.5,
    }));
    assert!(!events(&mut a).iter().any(|e| matches!(e, ClientEvent::GroundHit { .. })));
}

#[test]
fn test_interact_effect_plays_on_other_clients() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let played = EffectLog::new();
    let mut b = ClientLobby::new(
        ClientConfig::default(),
        Box::new(session.connector.connect()),
        ClientCollaborators::default().with_effects(played.clone()),
    )
    .unwrap();
    b.connect("bob");
    session.pump(&mut [&mut a, &mut b]);
    b.join_game();
    session.pump(&mut [&mut a, &mut b]);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a, &mut b]);
    played.take();

    a.request_grab(x);
    session.pump(&mut [&mut a, &mut b]);
    a.request_interact(x);
    session.pump(&mut [&mut a, &mut b]);

    let effects = played.take();
    assert_eq!(effects.len(), 1);
    assert!(matches!(
        effects[0],
        PlayedEffect::Vfx { id: 4, scale, .. } if scale == 1.5
    ));
}

#[test]
fn test_player_transform_reaches_others() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let mut b = session.join_game("bob", &mut [&mut a]);
    let a_id = a.player_id().unwrap();

    let pose = Pose::at(Vec3::new(-2.0, 0.9, 1.0));
    a.send_player_transform(pose);
    for _ in 0..60 {
        session.server.tick_once();
        a.update(1.0 / 60.0);
        b.update(1.0 / 60.0);
    }

    let seen = b.objects().player(a_id).unwrap().transform.current();
    assert!(seen.position.abs_diff_eq(pose.position, 1e-2));
    let avatar = session.server.context().objects.get(player_object_id(a_id)).unwrap();
    assert!(avatar.pose().position.abs_diff_eq(pose.position, 1e-3));
}

#[test]
fn test_holder_keeps_its_own_pose() {
    let mut session = session();
    let mut a = session.join_game("alice", &mut []);
    let x = spawn_lantern(&mut session);
    session.pump(&mut [&mut a]);
    a.request_grab(x);
    session.pump(&mut [&mut a]);

    let held = Pose::at(Vec3::new(0.5, 1.5, 0.5));
    a.send_held_transform(held);
    let before = a.object(x).unwrap().transform().latest_tick();
    session.pump(&mut [&mut a]);

    let transform = a.object(x).unwrap().transform();
    assert_eq!(transform.latest_tick(), before);
    assert_eq!(transform.current(), held);
}

#[test]
fn test_metadata_reaches_store() {
    let store = MemoryStore::new();
    let transport = LoopbackServer::new();
    let connector = transport.connector();
    let config = ServerConfig::default();
    let lobby_id = config.lobby_id;
    let map = MapDefinition::by_name(&config.lobby.map_name).unwrap();
    let server = ServerLobby::new(
        config,
        Box::new(transport),
        Collaborators::for_map(&map).with_store(store.clone()),
    )
    .unwrap();
    let mut session = Session { server, connector };

    let _a = session.join_game("alice", &mut []);

    let lobby = store.lobby(lobby_id).unwrap();
    assert_eq!(lobby.user_count, 1);
    assert_eq!(lobby.map_name, "testing_ground");
}

fn envelope_targets(events: Vec<TransportEvent>) -> Vec<ObjectId> {
    events
        .into_iter()
        .filter_map(|event| match event {
            TransportEvent::Received { mut packet, .. } => {
                let (service, command) = packet.read_header().ok()?;
                if service != ServiceId::Object as u8
                    || command != u8::from(grasp::net::ObjectCommand::Communication)
                {
                    return None;
                }
                packet.read::<ObjectId>().ok()
            }
            _ => None,
        })
        .collect()
}

#[test]
fn test_owner_is_left_out_of_snapshots() {
    let mut session = session();
    let mut raw = session.connector.connect();
    raw.send(
        SERVER_PEER,
        &raw_request(PROTOCOL_VERSION),
        Reliability::ReliableOrdered,
    );
    session.server.tick_once();
    let (accepted, mut response) = first_response(&mut raw).unwrap();
    assert!(accepted);
    let player = response.read::<u8>().unwrap();

    let join = Packet::command(ServiceId::Game, grasp::net::GameCommand::UserJoined);
    raw.send(SERVER_PEER, &join, Reliability::ReliableOrdered);
    session.server.tick_once();
    let x = spawn_lantern(&mut session);

    let mut grab = Packet::new();
    grab.write(x).wrap_for_object(
        player_object_id(player),
        ServiceId::Player,
        Verb::Grab.request_command(),
    );
    raw.send(SERVER_PEER, &grab, Reliability::ReliableOrdered);
    session.server.tick_once();
    assert_eq!(session.owner_of(x), Some(player));
    raw.poll();

    for _ in 0..3 {
        session.server.tick_once();
    }
    let targets = envelope_targets(raw.poll());

    assert!(!targets.is_empty());
    assert!(!targets.contains(&x));
    assert!(!targets.contains(&player_object_id(player)));
}
