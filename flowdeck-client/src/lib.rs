//! Boundary layer for a flowdeck capture session.
//!
//! Three pieces, all speaking to the same backend: the [`message`] codec
//! for inbound stream envelopes, the [`actions`] REST client for outbound
//! commands, and the [`session`] dispatch loop that serializes stream
//! messages and user commands onto the engine's single writer.
//!
//! Transport is deliberately out of scope: anything that can deliver
//! [`message::Envelope`] values in order (a websocket reader, a test
//! harness) can feed a session.

pub mod actions;
pub mod error;
pub mod message;
pub mod session;

pub use actions::ActionClient;
pub use error::ClientError;
pub use message::{Envelope, ResourceKind, StreamCmd};
pub use session::{Session, SessionCommand, SessionInput, SessionVersions};
