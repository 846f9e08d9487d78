//! Grab / interact / drop transitions over interactables.
//!
//! Every check runs against the authoritative directory; nothing a client
//! claims about ownership is trusted. A refused transition leaves all state
//! untouched.

use grasp::object::Ownable;
use grasp::{InteractEffect, ObjectId, PhysicsWorld, PlayerId, Pose, Verb};

use crate::directory::{InteractableObject, NetObject, ObjectDirectory};
use crate::error::AuthorityViolation;

/// What a granted request turns into on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Granted {
    Grab,
    Interact(InteractEffect),
    Drop(Pose),
}

pub fn try_verb(
    objects: &mut ObjectDirectory,
    physics: &mut PhysicsWorld,
    verb: Verb,
    player: PlayerId,
    target: ObjectId,
) -> Result<Granted, AuthorityViolation> {
    match verb {
        Verb::Grab => try_grab(objects, physics, player, target).map(|()| Granted::Grab),
        Verb::Interact => try_interact(objects, player, target).map(Granted::Interact),
        Verb::Drop => try_drop(objects, physics, player, target).map(Granted::Drop),
    }
}

/// `Free -> Held(player)`, only while the player's hands are empty.
pub fn try_grab(
    objects: &mut ObjectDirectory,
    physics: &mut PhysicsWorld,
    player: PlayerId,
    target: ObjectId,
) -> Result<(), AuthorityViolation> {
    let holder = objects
        .player(player)
        .ok_or(AuthorityViolation::UnknownPlayer(player))?;
    if let Some(holding) = holder.current_interactable {
        return Err(AuthorityViolation::HandsFull { player, holding });
    }

    let interactable = match objects.get(target) {
        Some(NetObject::Interactable(i)) => i,
        Some(_) => return Err(AuthorityViolation::NotInteractable(target)),
        None => return Err(AuthorityViolation::UnknownTarget(target)),
    };
    if let Some(owner) = interactable.owner() {
        return Err(AuthorityViolation::AlreadyHeld { target, owner });
    }
    let body = interactable.body;

    if let Some(i) = objects.interactable_mut(target) {
        i.set_owner(Some(player));
        i.reported = None;
    }
    if let Some(p) = objects.player_mut(player) {
        p.current_interactable = Some(target);
    }
    physics.set_kinematic(body, true);
    Ok(())
}

/// Only the holder may interact; the state does not change.
pub fn try_interact(
    objects: &ObjectDirectory,
    player: PlayerId,
    target: ObjectId,
) -> Result<InteractEffect, AuthorityViolation> {
    let interactable = held_by(objects, player, target)?;
    Ok(interactable.effect)
}

/// `Held(player) -> Free`, giving the object back to the physics world.
pub fn try_drop(
    objects: &mut ObjectDirectory,
    physics: &mut PhysicsWorld,
    player: PlayerId,
    target: ObjectId,
) -> Result<Pose, AuthorityViolation> {
    held_by(objects, player, target)?;
    Ok(release(objects, physics, player, target))
}

/// Drops whatever `player` is holding, without any permission check.
/// Returns the released object and the pose it was let go at.
pub fn force_drop(
    objects: &mut ObjectDirectory,
    physics: &mut PhysicsWorld,
    player: PlayerId,
) -> Option<(ObjectId, Pose)> {
    let target = objects.player(player)?.current_interactable?;
    Some((target, release(objects, physics, player, target)))
}

fn held_by(
    objects: &ObjectDirectory,
    player: PlayerId,
    target: ObjectId,
) -> Result<&InteractableObject, AuthorityViolation> {
    if objects.player(player).is_none() {
        return Err(AuthorityViolation::UnknownPlayer(player));
    }
    let interactable = match objects.get(target) {
        Some(NetObject::Interactable(i)) => i,
        Some(_) => return Err(AuthorityViolation::NotInteractable(target)),
        None => return Err(AuthorityViolation::UnknownTarget(target)),
    };
    if interactable.owner() != Some(player) {
        return Err(AuthorityViolation::NotOwner { player, target });
    }
    Ok(interactable)
}

fn release(
    objects: &mut ObjectDirectory,
    physics: &mut PhysicsWorld,
    player: PlayerId,
    target: ObjectId,
) -> Pose {
    if let Some(p) = objects.player_mut(player) {
        if p.current_interactable == Some(target) {
            p.current_interactable = None;
        }
    }

    let Some(interactable) = objects.interactable_mut(target) else {
        return Pose::IDENTITY;
    };
    // the last pose the holder reported is where it leaves their hands
    if let Some(report) = interactable.reported.take() {
        interactable.pose = report.pose;
        physics.set_body_pose(interactable.body, report.pose.position, report.pose.rotation);
    }
    interactable.set_owner(None);
    physics.set_kinematic(interactable.body, false);
    interactable.pose
}

/// Whether every owner link is matched by a back link and vice versa.
pub fn ownership_consistent(objects: &ObjectDirectory) -> bool {
    let forward = objects.interactables().all(|i| match i.owner() {
        None => true,
        Some(owner) => objects
            .player(owner)
            .is_some_and(|p| p.current_interactable == Some(i.id)),
    });
    let backward = objects.players().all(|p| match p.current_interactable {
        None => true,
        Some(target) => objects
            .interactable(target)
            .is_some_and(|i| i.owner() == Some(p.player_id)),
    });
    forward && backward
}
