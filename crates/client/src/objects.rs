//! The client's mirror of the lobby's object directory. Ownership is kept as
//! ids on both sides, exactly as the authority announced it.

use std::collections::BTreeMap;

use grasp::object::{Identifiable, Ownable, Transformable, player_object_id};
use grasp::{InteractEffect, ObjectId, PlayerFlags, PlayerId, Pose, PrefabKey};

use crate::interpolation::ReplicatedTransform;

#[derive(Debug, Clone, PartialEq)]
pub struct ClientPlayer {
    pub player_id: PlayerId,
    pub transform: ReplicatedTransform,
    pub flags: PlayerFlags,
    pub current_interactable: Option<ObjectId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientInteractable {
    pub id: ObjectId,
    pub client_key: PrefabKey,
    pub transform: ReplicatedTransform,
    pub owner: Option<PlayerId>,
    pub effect: InteractEffect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientProp {
    pub id: ObjectId,
    pub client_key: PrefabKey,
    pub transform: ReplicatedTransform,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientObject {
    Player(ClientPlayer),
    Interactable(ClientInteractable),
    Prop(ClientProp),
}

impl ClientObject {
    pub fn transform(&self) -> &ReplicatedTransform {
        match self {
            Self::Player(p) => &p.transform,
            Self::Interactable(i) => &i.transform,
            Self::Prop(p) => &p.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut ReplicatedTransform {
        match self {
            Self::Player(p) => &mut p.transform,
            Self::Interactable(i) => &mut i.transform,
            Self::Prop(p) => &mut p.transform,
        }
    }
}

impl Identifiable for ClientObject {
    fn id(&self) -> ObjectId {
        match self {
            Self::Player(p) => player_object_id(p.player_id),
            Self::Interactable(i) => i.id,
            Self::Prop(p) => p.id,
        }
    }

    fn prefab_key(&self) -> PrefabKey {
        match self {
            Self::Player(_) => 0,
            Self::Interactable(i) => i.client_key,
            Self::Prop(p) => p.client_key,
        }
    }
}

impl Transformable for ClientObject {
    fn pose(&self) -> Pose {
        self.transform().current()
    }

    fn set_pose(&mut self, pose: Pose) {
        self.transform_mut().teleport(pose);
    }
}

impl Ownable for ClientInteractable {
    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<PlayerId>) {
        self.owner = owner;
    }
}

#[derive(Debug, Default, Clone)]
pub struct ClientObjects {
    objects: BTreeMap<ObjectId, ClientObject>,
}

impl ClientObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false and leaves the existing object alone if the id is taken.
    pub fn insert(&mut self, object: ClientObject) -> bool {
        let id = object.id();
        if self.objects.contains_key(&id) {
            return false;
        }
        self.objects.insert(id, object);
        true
    }

    /// Removes an object, clearing whichever side of an ownership link
    /// pointed at it.
    pub fn remove(&mut self, id: ObjectId) -> Option<ClientObject> {
        let object = self.objects.remove(&id)?;
        match &object {
            ClientObject::Interactable(i) => {
                if let Some(owner) = i.owner {
                    if let Some(player) = self.player_mut(owner) {
                        player.current_interactable = None;
                    }
                }
            }
            ClientObject::Player(p) => {
                if let Some(held) = p.current_interactable {
                    if let Some(interactable) = self.interactable_mut(held) {
                        interactable.owner = None;
                    }
                }
            }
            ClientObject::Prop(_) => {}
        }
        Some(object)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn get(&self, id: ObjectId) -> Option<&ClientObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut ClientObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn player(&self, player: PlayerId) -> Option<&ClientPlayer> {
        match self.objects.get(&player_object_id(player)) {
            Some(ClientObject::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self, player: PlayerId) -> Option<&mut ClientPlayer> {
        match self.objects.get_mut(&player_object_id(player)) {
            Some(ClientObject::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn interactable(&self, id: ObjectId) -> Option<&ClientInteractable> {
        match self.objects.get(&id) {
            Some(ClientObject::Interactable(i)) => Some(i),
            _ => None,
        }
    }

    pub fn interactable_mut(&mut self, id: ObjectId) -> Option<&mut ClientInteractable> {
        match self.objects.get_mut(&id) {
            Some(ClientObject::Interactable(i)) => Some(i),
            _ => None,
        }
    }

    /// Records `player` as holding `target`, dropping any stale link on
    /// either side first.
    pub fn set_holder(&mut self, target: ObjectId, player: PlayerId) -> bool {
        let previous_owner = match self.interactable(target) {
            Some(i) => i.owner,
            None => return false,
        };
        if let Some(previous) = previous_owner.filter(|&p| p != player) {
            if let Some(p) = self.player_mut(previous) {
                p.current_interactable = None;
            }
        }
        let previous_held = self.player(player).and_then(|p| p.current_interactable);
        if let Some(held) = previous_held.filter(|&h| h != target) {
            if let Some(i) = self.interactable_mut(held) {
                i.owner = None;
            }
        }

        if let Some(i) = self.interactable_mut(target) {
            i.owner = Some(player);
        }
        if let Some(p) = self.player_mut(player) {
            p.current_interactable = Some(target);
        }
        true
    }

    pub fn clear_holder(&mut self, target: ObjectId) -> Option<PlayerId> {
        let owner = self.interactable_mut(target)?.owner.take()?;
        if let Some(p) = self.player_mut(owner) {
            if p.current_interactable == Some(target) {
                p.current_interactable = None;
            }
        }
        Some(owner)
    }

    pub fn held_by(&self, player: PlayerId) -> Option<ObjectId> {
        self.player(player).and_then(|p| p.current_interactable)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClientObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ClientObject> {
        self.objects.values_mut()
    }

    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: PlayerId) -> ClientObject {
        ClientObject::Player(ClientPlayer {
            player_id: id,
            transform: ReplicatedTransform::spawned_at(Pose::IDENTITY),
            flags: PlayerFlags::empty(),
            current_interactable: None,
        })
    }

    fn interactable(id: ObjectId) -> ClientObject {
        ClientObject::Interactable(ClientInteractable {
            id,
            client_key: 12,
            transform: ReplicatedTransform::spawned_at(Pose::IDENTITY),
            owner: None,
            effect: InteractEffect::None,
        })
    }

    #[test]
    fn duplicate_insert_keeps_first() {
        let mut objects = ClientObjects::new();
        assert!(objects.insert(interactable(300)));
        assert!(!objects.insert(interactable(300)));
        assert_eq!(objects.len(), 1);
    }

    #[test]
    fn holder_links_both_ways() {
        let mut objects = ClientObjects::new();
        objects.insert(player(1));
        objects.insert(interactable(300));

        assert!(objects.set_holder(300, 1));
        assert_eq!(objects.interactable(300).and_then(|i| i.owner), Some(1));
        assert_eq!(objects.held_by(1), Some(300));

        assert_eq!(objects.clear_holder(300), Some(1));
        assert_eq!(objects.held_by(1), None);
    }

    #[test]
    fn repeated_grab_announcement_is_idempotent() {
        let mut objects = ClientObjects::new();
        objects.insert(player(1));
        objects.insert(interactable(300));

        objects.set_holder(300, 1);
        objects.set_holder(300, 1);
        assert_eq!(objects.held_by(1), Some(300));
    }

    #[test]
    fn removing_holder_frees_interactable() {
        let mut objects = ClientObjects::new();
        objects.insert(player(2));
        objects.insert(interactable(300));
        objects.set_holder(300, 2);

        objects.remove(player_object_id(2));
        assert_eq!(objects.interactable(300).and_then(|i| i.owner), None);
    }

    #[test]
    fn removing_held_object_clears_holder() {
        let mut objects = ClientObjects::new();
        objects.insert(player(2));
        objects.insert(interactable(300));
        objects.set_holder(300, 2);

        objects.remove(300);
        assert_eq!(objects.held_by(2), None);
    }
}
