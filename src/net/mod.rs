//! The TCP client: a cloneable handle ([`TextSocketClient`]) in front of a
//! single task ([`SocketTask`]) that owns the socket.
//!
//! All connection state lives inside the task; the handle talks to it over a
//! bounded command channel and lifecycle notifications come back on a
//! broadcast channel. Serializing connect completion, polls and disconnects
//! through one receiver is what makes the client race-free without locks.

pub mod client;
pub mod events;
pub mod task;
pub mod types;

pub use client::{SocketLayer, TextSocketClient};
pub use events::ClientEvent;
pub use task::SocketTask;
pub use types::{LinkStatus, NetError};

/// Bytes drained per non-blocking read call.
pub const READ_CHUNK: usize = 1024;
