mod loopback;
mod packet;
mod protocol;
mod stats;
mod transport;

pub use loopback::{LoopbackClient, LoopbackConnector, LoopbackServer};
pub use packet::{Decode, Encode, Packet, PacketError};
pub use protocol::{
    ConnectionCommand, DEFAULT_TICK_RATE, EventCommand, FxCommand, GameCommand,
    InteractableCommand, LobbyCommand, ObjectCommand, PROTOCOL_VERSION, PlayerCommand, ServiceId,
    Verb,
};
pub use stats::{NetworkStats, PacketLossSimulation, rand_percent, rand_u64};
pub use transport::{
    InboundQueue, InboundSender, PeerId, Reliability, SERVER_PEER, Transport, TransportEvent,
    inbound_channel,
};
