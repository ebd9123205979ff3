//! Many-to-one peer transport for the qlink learner
//!
//! One learner endpoint multiplexes any number of actor connections;
//! inbound experience frames are serialized to a single coordinator,
//! and snapshot replies are routed back by peer identity.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod channel;
pub mod client;
mod frame;
pub mod peer;

pub use channel::{PeerChannel, TcpPeerChannel};
pub use client::ActorClient;
pub use peer::PeerId;
