use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::packet::Packet;
use super::stats::{NetworkStats, PacketLossSimulation};
use super::transport::{
    InboundQueue, InboundSender, PeerId, Reliability, SERVER_PEER, Transport, TransportEvent,
    inbound_channel,
};

type PeerTable = Arc<Mutex<HashMap<PeerId, InboundSender>>>;

fn lock(peers: &PeerTable) -> std::sync::MutexGuard<'_, HashMap<PeerId, InboundSender>> {
    peers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Server end of the in-process transport.
pub struct LoopbackServer {
    peers: PeerTable,
    inbound_tx: InboundSender,
    inbound: InboundQueue,
    next_peer: Arc<AtomicU32>,
    loss: PacketLossSimulation,
    stats: NetworkStats,
}

impl Default for LoopbackServer {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackServer {
    pub fn new() -> Self {
        let (inbound_tx, inbound) = inbound_channel();
        Self {
            peers: Arc::new(Mutex::new(HashMap::new())),
            inbound_tx,
            inbound,
            next_peer: Arc::new(AtomicU32::new(SERVER_PEER + 1)),
            loss: PacketLossSimulation::default(),
            stats: NetworkStats::default(),
        }
    }

    pub fn set_loss_simulation(&mut self, loss: PacketLossSimulation) {
        self.loss = loss;
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    /// A handle other threads can use to open client ends.
    pub fn connector(&self) -> LoopbackConnector {
        LoopbackConnector {
            peers: Arc::clone(&self.peers),
            server_tx: self.inbound_tx.clone(),
            next_peer: Arc::clone(&self.next_peer),
        }
    }

    pub fn connect(&self) -> LoopbackClient {
        self.connector().connect()
    }
}

impl Transport for LoopbackServer {
    fn send(&mut self, peer: PeerId, packet: &Packet, reliability: Reliability) {
        if !reliability.is_reliable() && self.loss.should_drop() {
            self.stats.packets_dropped += 1;
            return;
        }

        let delivered = lock(&self.peers).get(&peer).is_some_and(|tx| {
            tx.push(TransportEvent::Received {
                peer: SERVER_PEER,
                packet: packet.clone(),
                reliability,
            })
        });

        if delivered {
            self.stats.packets_sent += 1;
            self.stats.bytes_sent += packet.len() as u64;
        } else {
            log::debug!("Dropping packet for unknown peer {}", peer);
        }
    }

    fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = lock(&self.peers).keys().copied().collect();
        peers.sort_unstable();
        peers
    }

    fn disconnect(&mut self, peer: PeerId) {
        if let Some(tx) = lock(&self.peers).remove(&peer) {
            tx.push(TransportEvent::Disconnected(SERVER_PEER));
            self.inbound_tx.push(TransportEvent::Disconnected(peer));
        }
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let events = self.inbound.drain();
        for event in &events {
            if let TransportEvent::Received { packet, .. } = event {
                self.stats.packets_received += 1;
                self.stats.bytes_received += packet.len() as u64;
            }
        }
        events
    }
}

#[derive(Clone)]
pub struct LoopbackConnector {
    peers: PeerTable,
    server_tx: InboundSender,
    next_peer: Arc<AtomicU32>,
}

impl LoopbackConnector {
    pub fn connect(&self) -> LoopbackClient {
        let peer = self.next_peer.fetch_add(1, Ordering::SeqCst);
        let (tx, inbound) = inbound_channel();
        lock(&self.peers).insert(peer, tx);
        self.server_tx.push(TransportEvent::Connected(peer));

        LoopbackClient {
            peer,
            peers: Arc::clone(&self.peers),
            to_server: self.server_tx.clone(),
            inbound,
            connected: true,
            loss: PacketLossSimulation::default(),
        }
    }
}

/// Client end of the in-process transport. Dropping it disconnects.
pub struct LoopbackClient {
    peer: PeerId,
    peers: PeerTable,
    to_server: InboundSender,
    inbound: InboundQueue,
    connected: bool,
    loss: PacketLossSimulation,
}

impl LoopbackClient {
    /// The id the server sees this client as.
    pub fn peer_id(&self) -> PeerId {
        self.peer
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn set_loss_simulation(&mut self, loss: PacketLossSimulation) {
        self.loss = loss;
    }
}

impl Transport for LoopbackClient {
    fn send(&mut self, _peer: PeerId, packet: &Packet, reliability: Reliability) {
        if !self.connected {
            return;
        }
        if !reliability.is_reliable() && self.loss.should_drop() {
            return;
        }
        self.to_server.push(TransportEvent::Received {
            peer: self.peer,
            packet: packet.clone(),
            reliability,
        });
    }

    fn peers(&self) -> Vec<PeerId> {
        if self.connected {
            vec![SERVER_PEER]
        } else {
            Vec::new()
        }
    }

    fn disconnect(&mut self, _peer: PeerId) {
        if !self.connected {
            return;
        }
        self.connected = false;
        lock(&self.peers).remove(&self.peer);
        self.to_server.push(TransportEvent::Disconnected(self.peer));
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let events = self.inbound.drain();
        if events
            .iter()
            .any(|e| matches!(e, TransportEvent::Disconnected(_)))
        {
            self.connected = false;
        }
        events
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        self.disconnect(SERVER_PEER);
    }
}
