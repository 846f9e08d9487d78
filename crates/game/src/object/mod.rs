use bitflags::bitflags;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::net::{Decode, Encode, Packet, PacketError};

/// Lobby-unique network object id.
pub type ObjectId = u16;

/// Lobby-scoped player slot. A player's own object uses the same number as
/// its object id.
pub type PlayerId = u8;

/// Identifies which concrete prefab an object is instantiated from.
pub type PrefabKey = u32;

/// Ids below this are reserved for player objects.
pub const FIRST_DYNAMIC_OBJECT_ID: ObjectId = 256;

pub fn player_object_id(player: PlayerId) -> ObjectId {
    ObjectId::from(player)
}

pub fn is_player_object(id: ObjectId) -> bool {
    id < FIRST_DYNAMIC_OBJECT_ID
}

/// Player id owning the object slot `id`, if `id` lies in the player range.
pub fn player_id_of(id: ObjectId) -> Option<PlayerId> {
    PlayerId::try_from(id).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn at(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Moves toward `target` by fraction `t` (clamped to `0..=1`).
    pub fn lerp(&self, target: &Pose, t: f32) -> Pose {
        let t = t.clamp(0.0, 1.0);
        Pose {
            position: self.position.lerp(target.position, t),
            rotation: self.rotation.slerp(target.rotation, t).normalize(),
        }
    }

    pub fn distance(&self, other: &Pose) -> f32 {
        self.position.distance(other.position)
    }
}

impl Encode for Pose {
    fn encode(&self, buf: &mut Vec<u8>) {
        self.position.encode(buf);
        self.rotation.encode(buf);
    }
}

impl Decode for Pose {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        let position = packet.read()?;
        let rotation = packet.read()?;
        Ok(Self { position, rotation })
    }
}

bitflags! {
    /// Locomotion and animation state a player replicates to others.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PlayerFlags: u8 {
        const GROUNDED  = 1 << 0;
        const WALKING   = 1 << 1;
        const SPRINTING = 1 << 2;
        const CROUCHING = 1 << 3;
        const JUMPED    = 1 << 4;
        const GRABBED   = 1 << 5;
    }
}

impl Encode for PlayerFlags {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.push(self.bits());
    }
}

impl Decode for PlayerFlags {
    fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
        Ok(Self::from_bits_truncate(packet.read::<u8>()?))
    }
}

/// Side effect broadcast after a successful interact.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum InteractEffect {
    #[default]
    None,
    Sfx { id: u16, volume: f32 },
    Vfx { id: u16, scale: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Archetype {
    /// Physics-driven object nobody can hold.
    Prop,
    Interactable(InteractEffect),
}

pub trait Identifiable {
    fn id(&self) -> ObjectId;

    fn prefab_key(&self) -> PrefabKey;
}

pub trait Transformable {
    fn pose(&self) -> Pose;

    fn set_pose(&mut self, pose: Pose);

    fn forward(&self) -> Vec3 {
        self.pose().forward()
    }
}

/// Object that at most one player can hold at a time.
pub trait Ownable {
    fn owner(&self) -> Option<PlayerId>;

    fn set_owner(&mut self, owner: Option<PlayerId>);

    fn is_held(&self) -> bool {
        self.owner().is_some()
    }
}

/// Per-tick behaviour driven by the lobby's fixed step.
pub trait TickHandler<C: ?Sized> {
    fn on_tick(&mut self, ctx: &mut C);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_range_is_low_byte() {
        assert!(is_player_object(0));
        assert!(is_player_object(255));
        assert!(!is_player_object(FIRST_DYNAMIC_OBJECT_ID));
        assert_eq!(player_object_id(7), 7);
        assert_eq!(player_id_of(12), Some(12));
        assert_eq!(player_id_of(300), None);
    }

    #[test]
    fn pose_lerp_reaches_target() {
        let from = Pose::IDENTITY;
        let to = Pose::new(Vec3::new(2.0, 0.0, 0.0), Quat::from_rotation_y(1.0));

        let half = from.lerp(&to, 0.5);
        assert!((half.position.x - 1.0).abs() < 1e-5);

        let full = from.lerp(&to, 3.0);
        assert!(full.distance(&to) < 1e-5);
        assert!(full.rotation.abs_diff_eq(to.rotation, 1e-5));
    }

    #[test]
    fn forward_is_negative_z() {
        let pose = Pose::IDENTITY;
        assert!(pose.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
    }

    #[test]
    fn unknown_flag_bits_are_dropped() {
        let mut packet = Packet::new();
        packet.write(0b1100_0011u8);
        let flags = packet.read::<PlayerFlags>().unwrap();
        assert_eq!(flags, PlayerFlags::GROUNDED | PlayerFlags::WALKING);
    }
}
