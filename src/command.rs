//! Command-parsing collaborator surface.
//!
//! The client does not interpret commands itself; it only forwards handler
//! registrations into a [`CommandRegistry`] shared with whatever component
//! actually parses structured traffic. For this text-console tool that
//! component never runs against the wire (see
//! [`TextSocketClient::send_packet`](crate::net::TextSocketClient::send_packet)),
//! but the registration surface is kept so callers written against the full
//! protocol stack still work.

use std::collections::HashMap;

/// Identifiers for structured commands a handler can be registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetCmd {
    Handshake,
    Echo,
    Status,
    Quit,
}

/// Handler invoked when a parsed command arrives. Returns `true` when the
/// command was consumed.
pub type CommandHandler = Box<dyn Fn(NetCmd, &str) -> bool + Send + Sync>;

/// Registry of command handlers keyed by identifier.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<NetCmd, CommandHandler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for `cmd`. The last registration wins.
    pub fn register(&mut self, cmd: NetCmd, handler: CommandHandler) {
        self.handlers.insert(cmd, handler);
    }

    pub fn is_registered(&self, cmd: NetCmd) -> bool {
        self.handlers.contains_key(&cmd)
    }

    /// Dispatches `payload` to the handler registered for `cmd`. Returns
    /// `false` when no handler is registered or the handler declined it.
    pub fn dispatch(&self, cmd: NetCmd, payload: &str) -> bool {
        match self.handlers.get(&cmd) {
            Some(handler) => handler(cmd, payload),
            None => false,
        }
    }
}
