//! Networking: wire codec, peer synchronization, transport contract

pub mod message;
pub mod sync;
pub mod transport;

pub use message::{DecodeError, Message};
pub use sync::SyncLayer;
pub use transport::{LoopbackTransport, MessageTarget, NullTransport, Transport};
