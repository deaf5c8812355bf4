//! mudlink — a minimal TCP client for text-console (MUD/telnet-style) servers.
//!
//! One outbound connection, caller-driven polling, prompt detection, and a
//! console sink. No framing, no binary protocol, no reconnect policy: when
//! anything goes wrong the client logs the cause, tears the connection down,
//! and tells you about it.

pub mod command;
pub mod config;
pub mod console;
pub mod net;
pub mod telemetry;
