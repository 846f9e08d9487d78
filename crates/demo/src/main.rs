mod bot;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use grasp::collab::MemoryStore;
use grasp::net::{LoopbackServer, PacketLossSimulation};
use grasp::{LobbySettings, MapDefinition};
use grasp_server::{Collaborators, DetachedStore, ServerConfig, ServerEvent, ServerLobby};

use bot::BotReport;

#[derive(Parser)]
#[command(name = "grasp-demo")]
#[command(about = "Local lobby with bot players fighting over the same props")]
struct Args {
    #[arg(short, long, default_value_t = 3)]
    bots: usize,

    #[arg(short, long, default_value_t = 10.0, help = "Seconds to run")]
    duration: f32,

    #[arg(short, long, default_value_t = grasp::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    #[arg(long, default_value = "testing_ground")]
    map: String,

    #[arg(long, default_value_t = 0.0, help = "Unreliable packet loss percentage (0-100)")]
    loss_percent: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    let store = MemoryStore::new();

    let mut transport = LoopbackServer::new();
    if args.loss_percent > 0.0 {
        transport.set_loss_simulation(PacketLossSimulation::with_loss(args.loss_percent));
    }
    let connector = transport.connector();

    let config = ServerConfig {
        tick_rate: args.tick_rate,
        lobby: LobbySettings {
            map_name: args.map.clone(),
            ..Default::default()
        },
        ..Default::default()
    };
    let lobby_id = config.lobby_id;
    let map = MapDefinition::by_name(&args.map)
        .ok_or_else(|| anyhow::anyhow!("unknown map '{}'", args.map))?;
    let collaborators = Collaborators::for_map(&map)
        .with_store(DetachedStore::new(store.clone(), runtime.handle().clone()));
    let mut server = ServerLobby::new(config, Box::new(transport), collaborators)?;

    let running = Arc::new(AtomicBool::new(true));
    let bots: Vec<_> = (0..args.bots)
        .map(|index| {
            let connector = connector.clone();
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name(format!("bot-{index}"))
                .spawn(move || bot::run(index, connector, running))
        })
        .collect::<Result<_, _>>()?;

    let deadline = Duration::from_secs_f32(args.duration.max(0.0));
    let started = Instant::now();
    let mut last_frame = Instant::now();
    while started.elapsed() < deadline {
        let now = Instant::now();
        server.update(now.duration_since(last_frame).as_secs_f32());
        last_frame = now;

        for event in server.drain_events() {
            log_event(&event);
        }
        thread::sleep(Duration::from_millis(1));
    }

    running.store(false, Ordering::SeqCst);
    let reports: Vec<BotReport> = bots
        .into_iter()
        .filter_map(|handle| match handle.join() {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                log::error!("Bot failed: {e:#}");
                None
            }
            Err(_) => {
                log::error!("Bot thread panicked");
                None
            }
        })
        .collect();

    server.update(1.0 / server.context().config.tick_rate.max(1) as f32);
    server.shutdown();
    for event in server.drain_events() {
        log_event(&event);
    }

    let stats = server.stats();
    log::info!(
        "Ran {} ticks, {} objects alive at shutdown",
        stats.tick,
        stats.objects
    );
    for report in &reports {
        log::info!(
            "{}: {} grabs, {} interacts, {} drops, {} denied",
            report.name,
            report.grabs,
            report.interacts,
            report.drops,
            report.denied
        );
    }

    drop(server);
    // let the detached writes land before reading them back
    runtime.shutdown_timeout(Duration::from_secs(1));
    if let Some(lobby) = store.lobby(lobby_id) {
        log::info!(
            "Stored lobby '{}' on {} with {} users, {} heartbeats",
            lobby.name,
            lobby.map_name,
            lobby.user_count,
            store.heartbeats()
        );
    }

    Ok(())
}

fn log_event(event: &ServerEvent) {
    match event {
        ServerEvent::PeerConnected { peer } => log::debug!("Peer {} connected", peer),
        ServerEvent::UserJoined {
            player_id,
            display_name,
        } => log::info!("{} joined as player {}", display_name, player_id),
        ServerEvent::UserJoinedGame { player_id } => {
            log::info!("Player {} entered the game", player_id)
        }
        ServerEvent::UserLeft { player_id, reason } => {
            log::info!("Player {} left ({})", player_id, reason.as_str())
        }
        ServerEvent::HandshakeTimedOut { peer } => {
            log::warn!("Peer {} timed out during handshake", peer)
        }
        ServerEvent::ConnectionDenied { peer, reason } => {
            log::warn!("Peer {} denied: {}", peer, reason)
        }
        ServerEvent::ObjectSpawned { id, prefab } => {
            log::debug!("Object {} spawned from prefab {}", id, prefab)
        }
        ServerEvent::ObjectDestroyed { id } => log::debug!("Object {} destroyed", id),
    }
}
