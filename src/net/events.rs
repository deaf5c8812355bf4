/// Lifecycle notifications delivered to subscribers of
/// [`TextSocketClient::subscribe`](super::TextSocketClient::subscribe).
///
/// Events carry no payload beyond their identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// The asynchronous connect attempt completed and the socket is usable.
    Connected,
    /// The connection was torn down, either explicitly or through the
    /// error-disconnect path.
    Disconnected,
    /// The last receive cycle ended with the remote prompt marker (`"> "`).
    Prompted,
}

/// Capacity of the event broadcast channel. A subscriber that falls further
/// behind than this observes a `Lagged` error rather than blocking the task.
pub(crate) const EVENT_BUFFER: usize = 32;
