//! Shared test utilities: a scripted TCP peer and a recording console.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use mudlink::console::{Console, LogStyle};
use mudlink::net::ClientEvent;

/// Console that records every line it is handed.
pub struct RecordingConsole {
    lines: Mutex<Vec<(LogStyle, String)>>,
}

impl RecordingConsole {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lines: Mutex::new(Vec::new()),
        })
    }

    pub fn lines(&self) -> Vec<(LogStyle, String)> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(_, line)| line.contains(needle))
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines
            .lock()
            .iter()
            .filter(|(_, line)| line.contains(needle))
            .count()
    }
}

impl Console for RecordingConsole {
    fn print(&self, style: LogStyle, text: &str) {
        self.lines.lock().push((style, text.to_string()));
    }
}

/// Binds a listener on an ephemeral port, accepts exactly one connection on
/// a background thread, and runs `script` against it. Returning from the
/// script closes the peer's end of the connection.
pub fn spawn_peer<F, T>(script: F) -> (u16, thread::JoinHandle<T>)
where
    F: FnOnce(std::net::TcpStream) -> T + Send + 'static,
    T: Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind listener");
    let port = listener.local_addr().expect("local addr").port();
    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        script(stream)
    });
    (port, handle)
}

/// Port that nothing is listening on: bind then immediately release.
pub fn dead_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind free port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Waits for `want` on the event channel, failing the test on timeout or if
/// a different event arrives first.
pub async fn expect_event(rx: &mut broadcast::Receiver<ClientEvent>, want: ClientEvent) {
    let got = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for client event")
        .expect("event channel closed");
    assert_eq!(got, want);
}

/// Asserts that no event is currently queued.
pub fn assert_no_event(rx: &mut broadcast::Receiver<ClientEvent>) {
    match rx.try_recv() {
        Err(TryRecvError::Empty) => {}
        other => panic!("expected no pending event, got {other:?}"),
    }
}
