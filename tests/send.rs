mod common;

use std::io::Read;
use std::time::Duration;

use common::{assert_no_event, expect_event, spawn_peer, RecordingConsole};
use mudlink::command::NetCmd;
use mudlink::net::{ClientEvent, SocketLayer};

#[tokio::test]
async fn send_text_writes_utf8_to_the_wire() {
    let (port, peer) = spawn_peer(|mut stream| {
        let mut buf = vec![0u8; 32];
        let mut filled = 0;
        while filled < 10 {
            let read = stream.read(&mut buf[filled..]).expect("read");
            if read == 0 {
                break;
            }
            filled += read;
        }
        buf.truncate(filled);
        buf
    });

    let console = RecordingConsole::new();
    let (client, task) = SocketLayer::new(console);
    let task_handle = tokio::spawn(task.run());
    let mut events = client.subscribe();

    client.connect("127.0.0.1", port).await.expect("connect");
    expect_event(&mut events, ClientEvent::Connected).await;

    client.send_text("look\n").await.expect("send_text");
    client.send_text("north").await.expect("send_text");

    let received = peer.join().expect("peer thread");
    assert_eq!(received, b"look\nnorth");

    drop(client);
    let _ = task_handle.await;
}

#[tokio::test]
async fn send_failure_runs_error_disconnect_exactly_once() {
    // Peer accepts and immediately closes; writes keep landing in the local
    // buffer until the broken pipe surfaces.
    let (port, peer) = spawn_peer(|_stream| {});

    let console = RecordingConsole::new();
    let (client, task) = SocketLayer::new(console.clone());
    let task_handle = tokio::spawn(task.run());
    let mut events = client.subscribe();

    client.connect("127.0.0.1", port).await.expect("connect");
    expect_event(&mut events, ClientEvent::Connected).await;

    let failure_logged = || console.contains("error detected while sending text data.");
    for _ in 0..200 {
        client.send_text("look\n").await.expect("send_text");
        if failure_logged() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(failure_logged());
    expect_event(&mut events, ClientEvent::Disconnected).await;
    assert!(!client.is_connected().await.expect("is_connected"));

    // Further sends are no-ops on a torn-down client: no second teardown.
    client.send_text("north\n").await.expect("send_text");
    assert_no_event(&mut events);
    assert_eq!(console.count_containing("error detected while sending text data."), 1);
    assert_eq!(console.count_containing("connection closed."), 1);

    drop(client);
    let _ = task_handle.await;
    let _ = peer.join();
}

#[tokio::test]
async fn send_packet_logs_guidance_and_touches_nothing() {
    let (port, peer) = spawn_peer(|mut stream| {
        // A short read timeout stands in for "nothing ever arrives".
        stream
            .set_read_timeout(Some(Duration::from_millis(300)))
            .expect("set timeout");
        let mut buf = [0u8; 16];
        match stream.read(&mut buf) {
            Ok(read) => read,
            Err(_) => 0,
        }
    });

    let console = RecordingConsole::new();
    let (client, task) = SocketLayer::new(console.clone());
    let task_handle = tokio::spawn(task.run());
    let mut events = client.subscribe();

    client.connect("127.0.0.1", port).await.expect("connect");
    expect_event(&mut events, ClientEvent::Connected).await;

    client.send_packet(NetCmd::Handshake).await.expect("send_packet");

    assert!(console.contains("use send_text() instead"));
    assert!(client.is_connected().await.expect("is_connected"));
    assert_no_event(&mut events);

    let received = peer.join().expect("peer thread");
    assert_eq!(received, 0);

    drop(client);
    let _ = task_handle.await;
}
