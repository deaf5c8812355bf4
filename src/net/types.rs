use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::oneshot;

use crate::command::NetCmd;

/// Errors from talking to the socket task itself.
///
/// Socket I/O failures are never surfaced here; they are consumed by the
/// error-disconnect path and observable only through the console output and
/// the `Disconnected` notification. These variants mean the task is gone or
/// wedged, not that the remote connection failed.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("socket task channel closed")]
    ChannelClosed,
    #[error("socket task request timed out")]
    Timeout,
}

/// Snapshot of the connection state.
#[derive(Debug, Clone)]
pub struct LinkStatus {
    /// True only while an open socket handle exists; no liveness probe.
    pub connected: bool,
    /// Remote host as given to `connect`, empty when disconnected.
    pub host: String,
    /// Remote port as given to `connect`, zero when disconnected.
    pub port: u16,
    /// Resolved peer address of the live socket.
    pub remote_addr: Option<SocketAddr>,
}

pub(crate) enum NetCommand {
    Connect {
        host: String,
        port: u16,
    },
    Disconnect {
        respond_to: oneshot::Sender<()>,
    },
    Status {
        respond_to: oneshot::Sender<LinkStatus>,
    },
    CheckHealth {
        respond_to: oneshot::Sender<()>,
    },
    Receive {
        respond_to: oneshot::Sender<()>,
    },
    SendText {
        content: String,
        respond_to: oneshot::Sender<()>,
    },
    SendPacket {
        cmd: NetCmd,
        respond_to: oneshot::Sender<()>,
    },
}
