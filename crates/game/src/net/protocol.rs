use super::packet::{Decode, Encode, Packet, PacketError};

pub const PROTOCOL_VERSION: u32 = 1;
pub const DEFAULT_TICK_RATE: u32 = 60;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident = $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        $vis enum $name {
            $($variant = $value),+
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = PacketError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(PacketError::UnknownId {
                        kind: stringify!($name),
                        value,
                    }),
                }
            }
        }

        impl Encode for $name {
            fn encode(&self, buf: &mut Vec<u8>) {
                buf.push(*self as u8);
            }
        }

        impl Decode for $name {
            fn decode(packet: &mut Packet) -> Result<Self, PacketError> {
                let raw = packet.read::<u8>()?;
                Self::try_from(raw)
            }
        }
    };
}

wire_enum! {
    /// First header byte of every packet.
    pub enum ServiceId {
        Connection = 0,
        Lobby = 1,
        Game = 2,
        Player = 3,
        Fx = 4,
        Event = 5,
        Interactable = 6,
        Object = 7,
    }
}

wire_enum! {
    pub enum ConnectionCommand {
        Request = 0,
        Response = 1,
    }
}

wire_enum! {
    pub enum LobbyCommand {
        Settings = 0,
        UserSettings = 1,
        UsersList = 2,
        UserJoined = 3,
        UserLeft = 4,
        Tick = 5,
    }
}

wire_enum! {
    pub enum GameCommand {
        UserJoined = 0,
    }
}

wire_enum! {
    pub enum PlayerCommand {
        Spawn = 0,
        Destroy = 1,
        Transform = 2,
        Anim = 3,
        GrabRequest = 4,
        GrabDeny = 5,
        InteractRequest = 6,
        InteractDeny = 7,
        DropRequest = 8,
        DropDeny = 9,
    }
}

wire_enum! {
    pub enum FxCommand {
        Sfx = 0,
        Vfx = 1,
    }
}

wire_enum! {
    pub enum EventCommand {
        GroundHit = 0,
    }
}

wire_enum! {
    pub enum InteractableCommand {
        Grab = 0,
        Interact = 1,
        Drop = 2,
        Transform = 3,
    }
}

wire_enum! {
    pub enum ObjectCommand {
        Communication = 0,
        ObjectsInit = 1,
        SpawnRequest = 2,
        Spawn = 3,
        DestroyRequest = 4,
        Destroy = 5,
    }
}

/// The three ownership verbs a player can ask the authority for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Grab,
    Interact,
    Drop,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Grab, Verb::Interact, Verb::Drop];

    pub fn request_command(self) -> PlayerCommand {
        match self {
            Verb::Grab => PlayerCommand::GrabRequest,
            Verb::Interact => PlayerCommand::InteractRequest,
            Verb::Drop => PlayerCommand::DropRequest,
        }
    }

    pub fn deny_command(self) -> PlayerCommand {
        match self {
            Verb::Grab => PlayerCommand::GrabDeny,
            Verb::Interact => PlayerCommand::InteractDeny,
            Verb::Drop => PlayerCommand::DropDeny,
        }
    }

    pub fn granted_command(self) -> InteractableCommand {
        match self {
            Verb::Grab => InteractableCommand::Grab,
            Verb::Interact => InteractableCommand::Interact,
            Verb::Drop => InteractableCommand::Drop,
        }
    }

    pub fn from_request(command: PlayerCommand) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.request_command() == command)
    }

    pub fn from_deny(command: PlayerCommand) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.deny_command() == command)
    }

    pub fn from_granted(command: InteractableCommand) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|verb| verb.granted_command() == command)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Grab => "grab",
            Verb::Interact => "interact",
            Verb::Drop => "drop",
        }
    }
}
