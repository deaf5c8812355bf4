use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::console::{escape_markup, Console, LogStyle};

use super::events::ClientEvent;
use super::types::{LinkStatus, NetCommand};
use super::READ_CHUNK;

const CONNECT_BUFFER: usize = 4;

/// Result of an async connect attempt, delivered back to the task. Tagged
/// with the generation current when the attempt started so completions that
/// a disconnect or newer connect superseded can be discarded.
struct ConnectOutcome {
    generation: u64,
    result: io::Result<std::net::TcpStream>,
}

enum LinkState {
    Disconnected,
    Connecting { host: String, port: u16 },
    Connected(Connection),
}

struct Connection {
    stream: std::net::TcpStream,
    host: String,
    port: u16,
    peer: SocketAddr,
}

/// Task owning the socket and all connection state.
///
/// Commands from every handle and connect completions are serialized through
/// one `select!` loop, so connect/disconnect/poll can never interleave. The
/// socket is kept in non-blocking mode; both poll operations drain whatever
/// is ready and return without waiting.
pub struct SocketTask {
    commands: mpsc::Receiver<NetCommand>,
    connects: mpsc::Receiver<ConnectOutcome>,
    connect_tx: mpsc::Sender<ConnectOutcome>,
    events: broadcast::Sender<ClientEvent>,
    console: Arc<dyn Console>,
    state: LinkState,
    buffer: String,
    generation: u64,
}

impl SocketTask {
    pub(crate) fn new(
        commands: mpsc::Receiver<NetCommand>,
        events: broadcast::Sender<ClientEvent>,
        console: Arc<dyn Console>,
    ) -> Self {
        let (connect_tx, connects) = mpsc::channel(CONNECT_BUFFER);
        Self {
            commands,
            connects,
            connect_tx,
            events,
            console,
            state: LinkState::Disconnected,
            buffer: String::new(),
            generation: 0,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(outcome) = self.connects.recv() => {
                    self.handle_connect_outcome(outcome);
                }
            }
        }

        // Every handle is gone; tear down like an explicit disconnect.
        self.disconnect();
    }

    async fn handle_command(&mut self, command: NetCommand) {
        match command {
            NetCommand::Connect { host, port } => self.begin_connect(host, port),
            NetCommand::Disconnect { respond_to } => {
                self.disconnect();
                let _ = respond_to.send(());
            }
            NetCommand::Status { respond_to } => {
                let _ = respond_to.send(self.status());
            }
            NetCommand::CheckHealth { respond_to } => {
                self.check_health();
                let _ = respond_to.send(());
            }
            NetCommand::Receive { respond_to } => {
                self.receive();
                let _ = respond_to.send(());
            }
            NetCommand::SendText {
                content,
                respond_to,
            } => {
                self.send_text(&content).await;
                let _ = respond_to.send(());
            }
            NetCommand::SendPacket { cmd, respond_to } => {
                self.console.print(
                    LogStyle::Normal,
                    &format!(
                        "send_packet({cmd:?}) is not available for this tool, use send_text() instead."
                    ),
                );
                let _ = respond_to.send(());
            }
        }
    }

    fn begin_connect(&mut self, host: String, port: u16) {
        // A fresh connect supersedes whatever was open or in flight.
        self.disconnect();

        self.generation += 1;
        let generation = self.generation;

        self.console.print(
            LogStyle::Bold,
            &format!("connecting to [u]{host}:{port}[/u]..."),
        );
        self.state = LinkState::Connecting {
            host: host.clone(),
            port,
        };

        let connect_tx = self.connect_tx.clone();
        tokio::spawn(async move {
            let result = match tokio::net::TcpStream::connect((host.as_str(), port)).await {
                Ok(stream) => stream.into_std().and_then(|stream| {
                    stream.set_nonblocking(true)?;
                    Ok(stream)
                }),
                Err(err) => Err(err),
            };
            // The task may have shut down meanwhile; nothing to do then.
            let _ = connect_tx.send(ConnectOutcome { generation, result }).await;
        });
    }

    fn handle_connect_outcome(&mut self, outcome: ConnectOutcome) {
        if outcome.generation != self.generation {
            tracing::trace!("dropping superseded connect completion");
            return;
        }
        let LinkState::Connecting { host, port } = &self.state else {
            tracing::trace!("connect completion outside of a pending attempt; ignoring");
            return;
        };
        let (host, port) = (host.clone(), *port);

        let connected = outcome.result.and_then(|stream| {
            let peer = stream.peer_addr()?;
            Ok(Connection {
                stream,
                host,
                port,
                peer,
            })
        });

        match connected {
            Ok(connection) => {
                self.state = LinkState::Connected(connection);
                self.console.print(LogStyle::Normal, "connected successfully.");
                self.emit(ClientEvent::Connected);
            }
            Err(err) => {
                self.disconnect_on_error("connection failed while completing connect.", &err);
            }
        }
    }

    fn disconnect(&mut self) {
        if matches!(self.state, LinkState::Disconnected) {
            return;
        }

        // Dropping the Connection closes the socket.
        self.state = LinkState::Disconnected;
        self.buffer.clear();

        self.console.print(LogStyle::Normal, "connection closed.");
        self.emit(ClientEvent::Disconnected);
    }

    fn status(&self) -> LinkStatus {
        match &self.state {
            LinkState::Disconnected => LinkStatus {
                connected: false,
                host: String::new(),
                port: 0,
                remote_addr: None,
            },
            LinkState::Connecting { host, port } => LinkStatus {
                connected: false,
                host: host.clone(),
                port: *port,
                remote_addr: None,
            },
            LinkState::Connected(connection) => LinkStatus {
                connected: true,
                host: connection.host.clone(),
                port: connection.port,
                remote_addr: Some(connection.peer),
            },
        }
    }

    /// One-byte peek on the non-blocking socket: `Ok(0)` means the peer
    /// half-closed, `WouldBlock` means live but idle.
    fn check_health(&mut self) {
        let LinkState::Connected(connection) = &self.state else {
            return;
        };

        let mut probe = [0u8; 1];
        let failure = match connection.stream.peek(&mut probe) {
            Ok(0) => Some(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "peer closed the connection",
            )),
            Ok(_) => None,
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => None,
            Err(err) => Some(err),
        };

        if let Some(err) = failure {
            self.disconnect_on_error("disconnection detected while checking connection status.", &err);
        }
    }

    fn receive(&mut self) {
        let LinkState::Connected(connection) = &mut self.state else {
            return;
        };

        let mut chunk = [0u8; READ_CHUNK];
        let mut failure = None;
        loop {
            match connection.stream.read(&mut chunk) {
                Ok(0) => {
                    failure = Some(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "peer closed the connection",
                    ));
                    break;
                }
                Ok(read) => self
                    .buffer
                    .push_str(&String::from_utf8_lossy(&chunk[..read])),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            self.disconnect_on_error("error detected while receiving data.", &err);
            return;
        }

        if self.buffer.is_empty() {
            return;
        }

        self.console
            .print(LogStyle::Normal, &escape_markup(&self.buffer));
        if ends_with_prompt(&self.buffer) {
            self.emit(ClientEvent::Prompted);
        }
        self.buffer.clear();
    }

    async fn send_text(&mut self, content: &str) {
        let LinkState::Connected(connection) = &mut self.state else {
            self.console
                .print(LogStyle::Normal, "not connected; text was not sent.");
            return;
        };

        let bytes = content.as_bytes();
        let mut written = 0;
        let mut failure = None;
        while written < bytes.len() {
            match connection.stream.write(&bytes[written..]) {
                Ok(0) => {
                    failure = Some(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "socket accepted no further bytes",
                    ));
                    break;
                }
                Ok(count) => written += count,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                    tokio::task::yield_now().await;
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        if let Some(err) = failure {
            self.disconnect_on_error("error detected while sending text data.", &err);
        }
    }

    /// The shared error-disconnect path: log the cause, tear the connection
    /// down, notify disconnected. No retry, no backoff.
    fn disconnect_on_error(&mut self, info: &str, err: &io::Error) {
        self.console.print(LogStyle::Bold, info);
        self.console.print(LogStyle::Normal, &err.to_string());
        self.disconnect();
    }

    fn emit(&self, event: ClientEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(?event, "client event dropped (no subscribers)");
        }
    }
}

fn ends_with_prompt(buffer: &str) -> bool {
    buffer.ends_with("> ")
}
