use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::command::{CommandHandler, CommandRegistry, NetCmd};
use crate::console::Console;

use super::events::{ClientEvent, EVENT_BUFFER};
use super::task::SocketTask;
use super::types::{LinkStatus, NetCommand, NetError};

const COMMAND_BUFFER: usize = 16;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(1);

/// Constructs a connected pair of [`TextSocketClient`] and [`SocketTask`].
/// The caller spawns the task; the handle is cloneable.
pub struct SocketLayer;

impl SocketLayer {
    pub fn new(console: Arc<dyn Console>) -> (TextSocketClient, SocketTask) {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER);
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let client = TextSocketClient {
            sender,
            events: events.clone(),
            registry: Arc::new(Mutex::new(CommandRegistry::new())),
        };
        let task = SocketTask::new(receiver, events, console);
        (client, task)
    }
}

/// Handle to the socket task owning one outbound TCP connection.
///
/// `connect` is fire-and-forget; the connection is not usable until a
/// [`ClientEvent::Connected`] notification arrives. The two poll operations
/// are expected to be invoked periodically by the caller and return promptly.
#[derive(Clone)]
pub struct TextSocketClient {
    sender: mpsc::Sender<NetCommand>,
    events: broadcast::Sender<ClientEvent>,
    registry: Arc<Mutex<CommandRegistry>>,
}

impl TextSocketClient {
    /// Subscribes to lifecycle notifications. Each subscriber sees every
    /// event emitted after the call.
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Begins an asynchronous connection attempt and returns immediately.
    /// Completion is reported through the event channel: `Connected` on
    /// success, `Disconnected` (via the error-disconnect path) on failure.
    pub async fn connect(&self, host: impl Into<String>, port: u16) -> Result<(), NetError> {
        self.sender
            .send(NetCommand::Connect {
                host: host.into(),
                port,
            })
            .await
            .map_err(|_| NetError::ChannelClosed)
    }

    /// Closes the connection if one exists and fires `Disconnected`.
    /// Idempotent: a no-op when already disconnected.
    pub async fn disconnect(&self) -> Result<(), NetError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(NetCommand::Disconnect { respond_to })
            .await
            .map_err(|_| NetError::ChannelClosed)?;

        recv_with_timeout(receiver).await
    }

    pub async fn status(&self) -> Result<LinkStatus, NetError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(NetCommand::Status { respond_to })
            .await
            .map_err(|_| NetError::ChannelClosed)?;

        recv_with_timeout(receiver).await
    }

    /// True only while an open socket handle exists. Does not probe the peer;
    /// use [`poll_connection_health`](Self::poll_connection_health) for that.
    pub async fn is_connected(&self) -> Result<bool, NetError> {
        Ok(self.status().await?.connected)
    }

    /// Checks the live connection with a zero-consumption peek to detect a
    /// half-closed peer. On failure the error-disconnect path runs.
    pub async fn poll_connection_health(&self) -> Result<(), NetError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(NetCommand::CheckHealth { respond_to })
            .await
            .map_err(|_| NetError::ChannelClosed)?;

        recv_with_timeout(receiver).await
    }

    /// Drains all currently available bytes, forwards escaped text to the
    /// console, and fires `Prompted` when the cycle ends with the prompt
    /// marker. On I/O failure the error-disconnect path runs.
    pub async fn poll_receive(&self) -> Result<(), NetError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(NetCommand::Receive { respond_to })
            .await
            .map_err(|_| NetError::ChannelClosed)?;

        recv_with_timeout(receiver).await
    }

    /// Writes `content` to the socket as UTF-8. The whole payload is written
    /// before the call returns; on failure the error-disconnect path runs.
    pub async fn send_text(&self, content: impl Into<String>) -> Result<(), NetError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(NetCommand::SendText {
                content: content.into(),
                respond_to,
            })
            .await
            .map_err(|_| NetError::ChannelClosed)?;

        recv_with_timeout(receiver).await
    }

    /// Intentionally unsupported in this tool: structured packets are never
    /// written to the wire. Logs guidance to use [`send_text`](Self::send_text)
    /// and leaves the connection untouched.
    pub async fn send_packet(&self, cmd: NetCmd) -> Result<(), NetError> {
        let (respond_to, receiver) = oneshot::channel();
        self.sender
            .send(NetCommand::SendPacket { cmd, respond_to })
            .await
            .map_err(|_| NetError::ChannelClosed)?;

        recv_with_timeout(receiver).await
    }

    /// Pass-through registration into the shared command registry. The client
    /// itself never interprets commands.
    pub fn register_command_handler(&self, cmd: NetCmd, handler: CommandHandler) {
        self.registry.lock().register(cmd, handler);
    }

    /// The command registry shared with the external parsing collaborator.
    pub fn registry(&self) -> Arc<Mutex<CommandRegistry>> {
        Arc::clone(&self.registry)
    }
}

async fn recv_with_timeout<T>(receiver: oneshot::Receiver<T>) -> Result<T, NetError> {
    match tokio::time::timeout(REQUEST_TIMEOUT, receiver).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(_)) => Err(NetError::ChannelClosed),
        Err(_) => Err(NetError::Timeout),
    }
}
