use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::packet::Packet;

/// Transport-level identity of a connected peer.
pub type PeerId = u32;

/// Peer id a client uses to address the server.
pub const SERVER_PEER: PeerId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reliability {
    ReliableOrdered,
    ReliableUnordered,
    UnreliableSequenced,
    Unreliable,
}

impl Reliability {
    pub fn is_reliable(self) -> bool {
        matches!(self, Self::ReliableOrdered | Self::ReliableUnordered)
    }
}

#[derive(Debug, Clone)]
pub enum TransportEvent {
    Connected(PeerId),
    Disconnected(PeerId),
    Received {
        peer: PeerId,
        packet: Packet,
        reliability: Reliability,
    },
}

/// Delivery of packets to remote peers.
///
/// Implementations may receive on any thread, but everything they surface
/// through `poll` is consumed on the tick thread. Two packets sent to the
/// same peer on the same channel within one tick must arrive in send order.
pub trait Transport: Send {
    fn send(&mut self, peer: PeerId, packet: &Packet, reliability: Reliability);

    fn send_to_list(&mut self, peers: &[PeerId], packet: &Packet, reliability: Reliability) {
        for &peer in peers {
            self.send(peer, packet, reliability);
        }
    }

    fn send_to_all(&mut self, packet: &Packet, reliability: Reliability) {
        let peers = self.peers();
        self.send_to_list(&peers, packet, reliability);
    }

    fn peers(&self) -> Vec<PeerId>;

    fn disconnect(&mut self, peer: PeerId);

    /// Drains everything received since the last poll.
    fn poll(&mut self) -> Vec<TransportEvent>;
}

/// Thread-safe producer side of a tick thread's inbound queue.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: UnboundedSender<TransportEvent>,
}

impl InboundSender {
    /// Returns false once the consuming side is gone.
    pub fn push(&self, event: TransportEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[derive(Debug)]
pub struct InboundQueue {
    rx: UnboundedReceiver<TransportEvent>,
}

impl InboundQueue {
    pub fn drain(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

pub fn inbound_channel() -> (InboundSender, InboundQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (InboundSender { tx }, InboundQueue { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_marshals_across_threads_in_order() {
        let (tx, mut queue) = inbound_channel();

        let handle = std::thread::spawn(move || {
            for i in 0..100u32 {
                let mut packet = Packet::new();
                packet.write(i);
                tx.push(TransportEvent::Received {
                    peer: 1,
                    packet,
                    reliability: Reliability::ReliableOrdered,
                });
            }
        });
        handle.join().unwrap();

        let events = queue.drain();
        assert_eq!(events.len(), 100);
        for (i, event) in events.into_iter().enumerate() {
            let TransportEvent::Received { mut packet, .. } = event else {
                panic!("expected data");
            };
            assert_eq!(packet.read::<u32>().unwrap(), i as u32);
        }
    }

    #[test]
    fn push_after_consumer_dropped() {
        let (tx, queue) = inbound_channel();
        drop(queue);
        assert!(!tx.push(TransportEvent::Connected(3)));
    }
}
