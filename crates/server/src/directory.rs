use std::collections::{BTreeMap, BTreeSet};

use grasp::object::{Identifiable, Ownable, TickHandler, Transformable};
use grasp::{
    FIRST_DYNAMIC_OBJECT_ID, InteractEffect, ObjectId, PhysicsWorld, PlayerFlags, PlayerId, Pose,
    PrefabKey,
};
use rapier3d::prelude::RigidBodyHandle;

use crate::error::DirectoryError;

/// The most recent pose an owner reported, with the tick it was sent on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reported {
    pub tick: u32,
    pub pose: Pose,
}

impl Reported {
    /// Keeps only the newest report; reordered datagrams are discarded.
    pub fn accept(slot: &mut Option<Reported>, tick: u32, pose: Pose) -> bool {
        match slot {
            Some(current) if tick < current.tick => false,
            _ => {
                *slot = Some(Reported { tick, pose });
                true
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerObject {
    pub player_id: PlayerId,
    pub pose: Pose,
    pub flags: PlayerFlags,
    pub current_interactable: Option<ObjectId>,
    pub reported: Option<Reported>,
    pub body: RigidBodyHandle,
}

#[derive(Debug, Clone)]
pub struct InteractableObject {
    pub id: ObjectId,
    pub prefab: PrefabKey,
    pub client_key: PrefabKey,
    pub pose: Pose,
    pub owner: Option<PlayerId>,
    pub effect: InteractEffect,
    pub reported: Option<Reported>,
    pub body: RigidBodyHandle,
}

#[derive(Debug, Clone)]
pub struct PropObject {
    pub id: ObjectId,
    pub prefab: PrefabKey,
    pub client_key: PrefabKey,
    pub pose: Pose,
    pub body: RigidBodyHandle,
}

#[derive(Debug, Clone)]
pub enum NetObject {
    Player(PlayerObject),
    Interactable(InteractableObject),
    Prop(PropObject),
}

impl Identifiable for PlayerObject {
    fn id(&self) -> ObjectId {
        grasp::object::player_object_id(self.player_id)
    }

    fn prefab_key(&self) -> PrefabKey {
        0
    }
}

impl Identifiable for InteractableObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn prefab_key(&self) -> PrefabKey {
        self.prefab
    }
}

impl Identifiable for PropObject {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn prefab_key(&self) -> PrefabKey {
        self.prefab
    }
}

impl Transformable for PlayerObject {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

impl Transformable for InteractableObject {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

impl Transformable for PropObject {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }
}

impl Ownable for InteractableObject {
    fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    fn set_owner(&mut self, owner: Option<PlayerId>) {
        self.owner = owner;
    }
}

impl NetObject {
    fn as_identifiable(&self) -> &dyn Identifiable {
        match self {
            NetObject::Player(p) => p,
            NetObject::Interactable(i) => i,
            NetObject::Prop(p) => p,
        }
    }

    fn as_transformable(&self) -> &dyn Transformable {
        match self {
            NetObject::Player(p) => p,
            NetObject::Interactable(i) => i,
            NetObject::Prop(p) => p,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.as_identifiable().id()
    }

    pub fn prefab_key(&self) -> PrefabKey {
        self.as_identifiable().prefab_key()
    }

    pub fn pose(&self) -> Pose {
        self.as_transformable().pose()
    }

    pub fn body(&self) -> RigidBodyHandle {
        match self {
            NetObject::Player(p) => p.body,
            NetObject::Interactable(i) => i.body,
            NetObject::Prop(p) => p.body,
        }
    }

    /// Key clients instantiate this object from. Players have none.
    pub fn client_key(&self) -> Option<PrefabKey> {
        match self {
            NetObject::Player(_) => None,
            NetObject::Interactable(i) => Some(i.client_key),
            NetObject::Prop(p) => Some(p.client_key),
        }
    }

    /// Player whose reports drive this object's pose, if any.
    pub fn driver(&self) -> Option<PlayerId> {
        match self {
            NetObject::Player(p) => Some(p.player_id),
            NetObject::Interactable(i) => i.owner,
            NetObject::Prop(_) => None,
        }
    }

    /// Pushes the driver's latest report into the physics world as the
    /// kinematic target for the coming step.
    pub fn drive(&self, physics: &mut PhysicsWorld) {
        let reported = match self {
            NetObject::Player(p) => p.reported,
            NetObject::Interactable(i) if i.owner.is_some() => i.reported,
            _ => None,
        };
        if let Some(report) = reported {
            physics.set_next_kinematic_pose(
                self.body(),
                report.pose.position,
                report.pose.rotation,
            );
        }
    }
}

/// Reads the post-step pose back from the physics world.
impl TickHandler<PhysicsWorld> for NetObject {
    fn on_tick(&mut self, physics: &mut PhysicsWorld) {
        let Some((position, rotation)) = physics.body_transform(self.body()) else {
            return;
        };
        let pose = Pose::new(position, rotation);
        match self {
            NetObject::Player(p) => p.set_pose(pose),
            NetObject::Interactable(i) => i.set_pose(pose),
            NetObject::Prop(p) => p.set_pose(pose),
        }
    }
}

/// Every live object in one lobby, keyed by id.
///
/// Player objects live at their player id (below 256); everything else is
/// allocated from 256 upwards by a rolling cursor so a freed id is not
/// handed straight back out.
#[derive(Debug)]
pub struct ObjectDirectory {
    objects: BTreeMap<ObjectId, NetObject>,
    next_id: ObjectId,
    retired: BTreeSet<ObjectId>,
    starting: Vec<ObjectId>,
    destroyed_starting: Vec<ObjectId>,
}

impl Default for ObjectDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectDirectory {
    pub fn new() -> Self {
        Self {
            objects: BTreeMap::new(),
            next_id: FIRST_DYNAMIC_OBJECT_ID,
            retired: BTreeSet::new(),
            starting: Vec::new(),
            destroyed_starting: Vec::new(),
        }
    }

    fn is_free(&self, id: ObjectId) -> bool {
        !self.objects.contains_key(&id) && !self.retired.contains(&id)
    }

    pub fn generate_object_id(&mut self) -> Result<ObjectId, DirectoryError> {
        let span = u32::from(ObjectId::MAX - FIRST_DYNAMIC_OBJECT_ID) + 1;
        let mut candidate = self.next_id;
        for _ in 0..span {
            let next = if candidate == ObjectId::MAX {
                FIRST_DYNAMIC_OBJECT_ID
            } else {
                candidate + 1
            };
            if self.is_free(candidate) {
                self.next_id = next;
                return Ok(candidate);
            }
            candidate = next;
        }
        Err(DirectoryError::IdsExhausted)
    }

    pub fn insert(&mut self, object: NetObject) -> Result<ObjectId, DirectoryError> {
        let id = object.id();
        if self.objects.contains_key(&id) {
            log::warn!("Ignoring duplicate spawn of object {}", id);
            return Err(DirectoryError::DuplicateSpawn(id));
        }
        self.objects.insert(id, object);
        Ok(id)
    }

    /// Inserts an object that is part of the map itself.
    pub fn insert_starting(&mut self, object: NetObject) -> Result<ObjectId, DirectoryError> {
        let id = self.insert(object)?;
        self.starting.push(id);
        Ok(id)
    }

    /// Removes `id`. A destroyed starting object's id is retired for the
    /// rest of the lobby so late joiners can replay its destruction.
    pub fn remove(&mut self, id: ObjectId) -> Option<NetObject> {
        let object = self.objects.remove(&id)?;
        if self.is_starting(id) {
            self.destroyed_starting.push(id);
            self.retired.insert(id);
        }
        Some(object)
    }

    pub fn is_starting(&self, id: ObjectId) -> bool {
        self.starting.contains(&id)
    }

    /// Ids of every starting object in map order, destroyed ones included.
    pub fn starting_ids(&self) -> &[ObjectId] {
        &self.starting
    }

    pub fn destroyed_starting(&self) -> &[ObjectId] {
        &self.destroyed_starting
    }

    pub fn get(&self, id: ObjectId) -> Option<&NetObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut NetObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerObject> {
        match self.objects.get(&ObjectId::from(player_id)) {
            Some(NetObject::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut PlayerObject> {
        match self.objects.get_mut(&ObjectId::from(player_id)) {
            Some(NetObject::Player(p)) => Some(p),
            _ => None,
        }
    }

    pub fn interactable(&self, id: ObjectId) -> Option<&InteractableObject> {
        match self.objects.get(&id) {
            Some(NetObject::Interactable(i)) => Some(i),
            _ => None,
        }
    }

    pub fn interactable_mut(&mut self, id: ObjectId) -> Option<&mut InteractableObject> {
        match self.objects.get_mut(&id) {
            Some(NetObject::Interactable(i)) => Some(i),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut NetObject> {
        self.objects.values_mut()
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerObject> {
        self.objects.values().filter_map(|o| match o {
            NetObject::Player(p) => Some(p),
            _ => None,
        })
    }

    pub fn interactables(&self) -> impl Iterator<Item = &InteractableObject> {
        self.objects.values().filter_map(|o| match o {
            NetObject::Interactable(i) => Some(i),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
