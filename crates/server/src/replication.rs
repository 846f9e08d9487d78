//! Server half of transform replication: kinematic follow for driven
//! objects, physics readback for free ones, and the unreliable snapshot
//! broadcast.

use grasp::net::{InteractableCommand, PlayerCommand};
use grasp::object::TickHandler;
use grasp::{Packet, PhysicsWorld, PlayerId, Reliability, ServiceId};

use crate::context::LobbyContext;
use crate::directory::{NetObject, ObjectDirectory};

/// One tick of the authoritative world.
pub fn simulate(objects: &mut ObjectDirectory, physics: &mut PhysicsWorld) {
    for object in objects.iter() {
        object.drive(physics);
    }
    physics.step();
    for object in objects.iter_mut() {
        object.on_tick(physics);
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub packet: Packet,
    /// Player left out of the broadcast, normally whoever drives the object.
    pub exclude: Option<PlayerId>,
}

pub fn snapshots(objects: &ObjectDirectory, tick: u32, exclude_owner: bool) -> Vec<Snapshot> {
    objects
        .iter()
        .map(|object| {
            let pose = object.pose();
            let mut packet = Packet::new();
            packet.write(tick).write(pose.position).write(pose.rotation);
            match object {
                NetObject::Player(_) => {
                    packet.wrap_for_object(object.id(), ServiceId::Player, PlayerCommand::Transform)
                }
                _ => packet.wrap_for_object(
                    object.id(),
                    ServiceId::Interactable,
                    InteractableCommand::Transform,
                ),
            };
            Snapshot {
                packet,
                exclude: if exclude_owner { object.driver() } else { None },
            }
        })
        .collect()
}

pub fn broadcast_snapshots(ctx: &mut LobbyContext) {
    if ctx.users.in_game_peers().is_empty() {
        return;
    }
    let snapshots = snapshots(&ctx.objects, ctx.tick, ctx.config.exclude_owner_from_snapshots);
    for snapshot in snapshots {
        match snapshot.exclude {
            Some(player) => {
                ctx.send_to_game_except(player, &snapshot.packet, Reliability::Unreliable)
            }
            None => ctx.send_to_game(&snapshot.packet, Reliability::Unreliable),
        }
    }
}
