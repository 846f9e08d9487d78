use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;
use glam::{Quat, Vec3};

use grasp::net::{LoopbackConnector, rand_u64};
use grasp::object::Transformable;
use grasp::{ObjectId, PlayerFlags, Pose, Verb};
use grasp_client::{ClientCollaborators, ClientConfig, ClientEvent, ClientLobby, ClientObject};

const FRAME: f32 = 1.0 / 60.0;
const WALK_RADIUS: f32 = 4.0;
const HOLD_DISTANCE: f32 = 0.8;
/// Seconds between decisions.
const THINK_INTERVAL: f32 = 0.75;

#[derive(Debug, Default, Clone)]
pub struct BotReport {
    pub name: String,
    pub grabs: u32,
    pub interacts: u32,
    pub drops: u32,
    pub denied: u32,
}

/// Walks in a circle and keeps grabbing, using and dropping whatever free
/// interactable it sees, until `running` goes false.
pub fn run(
    index: usize,
    connector: LoopbackConnector,
    running: Arc<AtomicBool>,
) -> Result<BotReport> {
    let name = format!("bot-{index}");
    let mut client = ClientLobby::new(
        ClientConfig::default(),
        Box::new(connector.connect()),
        ClientCollaborators::default(),
    )?;
    client.connect(&name);

    let mut report = BotReport {
        name,
        ..Default::default()
    };
    let mut elapsed = 0.0f32;
    let mut next_think = THINK_INTERVAL;
    let phase = index as f32 * 1.3;

    while running.load(Ordering::SeqCst) {
        client.update(FRAME);
        elapsed += FRAME;

        let events: Vec<ClientEvent> = client.drain_events().collect();
        for event in events {
            match event {
                ClientEvent::Connected { .. } => client.join_game(),
                ClientEvent::Rejected { reason } => {
                    log::warn!("{} was rejected: {}", report.name, reason);
                    return Ok(report);
                }
                ClientEvent::Disconnected => return Ok(report),
                ClientEvent::Granted { verb, player, .. } if client.player_id() == Some(player) => {
                    match verb {
                        Verb::Grab => report.grabs += 1,
                        Verb::Interact => report.interacts += 1,
                        Verb::Drop => report.drops += 1,
                    }
                }
                ClientEvent::Denied { .. } => report.denied += 1,
                _ => {}
            }
        }

        if client.in_game() {
            let pose = walk_pose(elapsed + phase);
            client.send_player_transform(pose);
            client.send_held_transform(Pose::new(
                pose.position + pose.forward() * HOLD_DISTANCE,
                pose.rotation,
            ));

            if elapsed >= next_think {
                next_think = elapsed + THINK_INTERVAL;
                think(&mut client, pose);
            }
        }

        thread::sleep(Duration::from_secs_f32(FRAME));
    }

    client.send_anim(PlayerFlags::empty());
    client.disconnect();
    Ok(report)
}

fn walk_pose(t: f32) -> Pose {
    let angle = t * 0.5;
    let position = Vec3::new(angle.cos() * WALK_RADIUS, 0.9, angle.sin() * WALK_RADIUS);
    Pose::new(position, Quat::from_rotation_y(-angle))
}

fn think(client: &mut ClientLobby, pose: Pose) {
    if let Some(held) = client.holding() {
        if rand_u64() % 3 == 0 {
            client.request_drop(held);
        } else {
            client.request_interact(held);
        }
        return;
    }

    // also goes for objects somebody else holds; the authority sorts it out
    if let Some(target) = nearest_interactable(client, pose.position) {
        client.send_anim(PlayerFlags::GROUNDED | PlayerFlags::WALKING);
        client.request_grab(target);
    }
}

fn nearest_interactable(client: &ClientLobby, from: Vec3) -> Option<ObjectId> {
    client
        .objects()
        .iter()
        .filter_map(|object| match object {
            ClientObject::Interactable(i) => Some((i.id, object.pose().position)),
            _ => None,
        })
        .min_by(|(_, a), (_, b)| a.distance(from).total_cmp(&b.distance(from)))
        .map(|(id, _)| id)
}
