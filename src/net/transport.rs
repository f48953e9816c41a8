//! Transport contract and the in-memory loopback implementation
//!
//! The core never blocks on the network: sends are fire-and-forget and
//! `poll_received` drains whatever complete messages are buffered, then
//! returns immediately. A TCP-backed implementation is an external
//! collaborator; it only has to satisfy this trait.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// Where an outbound message is routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageTarget {
    /// The hosting side (lobby/server traffic)
    Host,
    /// The opposing peer (gameplay traffic)
    Client,
    /// Everyone
    Both,
}

/// Non-blocking message transport
pub trait Transport {
    /// Fire-and-forget send; must never block or retry
    fn send(&mut self, encoded: &str, target: MessageTarget);

    /// Drain every fully-received message currently buffered
    fn poll_received(&mut self) -> Vec<String>;

    fn is_connected(&self) -> bool;
}

/// Transport for solo play or after a disconnect: sends vanish, nothing
/// arrives. The local simulation stays playable.
#[derive(Debug, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _encoded: &str, _target: MessageTarget) {}

    fn poll_received(&mut self) -> Vec<String> {
        Vec::new()
    }

    fn is_connected(&self) -> bool {
        false
    }
}

type SharedQueue = Rc<RefCell<VecDeque<String>>>;

/// One end of an in-memory message pipe. Used by the demo binary and the
/// integration tests; everything stays on the tick-loop thread.
#[derive(Debug)]
pub struct LoopbackTransport {
    outgoing: SharedQueue,
    incoming: SharedQueue,
    connected: Rc<RefCell<bool>>,
}

impl LoopbackTransport {
    /// Build a connected pair of transports
    pub fn pair() -> (LoopbackTransport, LoopbackTransport) {
        let a_to_b: SharedQueue = Rc::default();
        let b_to_a: SharedQueue = Rc::default();
        let connected = Rc::new(RefCell::new(true));
        (
            LoopbackTransport {
                outgoing: a_to_b.clone(),
                incoming: b_to_a.clone(),
                connected: connected.clone(),
            },
            LoopbackTransport {
                outgoing: b_to_a,
                incoming: a_to_b,
                connected,
            },
        )
    }

    /// Simulate a connection drop for both ends
    pub fn sever(&self) {
        *self.connected.borrow_mut() = false;
        self.outgoing.borrow_mut().clear();
        self.incoming.borrow_mut().clear();
    }
}

impl Transport for LoopbackTransport {
    fn send(&mut self, encoded: &str, _target: MessageTarget) {
        if *self.connected.borrow() {
            self.outgoing.borrow_mut().push_back(encoded.to_string());
        }
    }

    fn poll_received(&mut self) -> Vec<String> {
        self.incoming.borrow_mut().drain(..).collect()
    }

    fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_delivers_in_order() {
        let (mut a, mut b) = LoopbackTransport::pair();
        a.send("1 0 1 2 3 4", MessageTarget::Client);
        a.send("2 0", MessageTarget::Client);
        assert_eq!(b.poll_received(), vec!["1 0 1 2 3 4", "2 0"]);
        // Drained: a second poll is empty, not blocking
        assert!(b.poll_received().is_empty());
    }

    #[test]
    fn test_severed_transport_drops_sends() {
        let (mut a, mut b) = LoopbackTransport::pair();
        a.sever();
        assert!(!a.is_connected());
        assert!(!b.is_connected());
        a.send("11", MessageTarget::Both);
        assert!(b.poll_received().is_empty());
    }

    #[test]
    fn test_null_transport_is_silent() {
        let mut t = NullTransport;
        t.send("11", MessageTarget::Both);
        assert!(t.poll_received().is_empty());
        assert!(!t.is_connected());
    }
}
