use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use mudlink::config::Config;
use mudlink::console::StdoutConsole;
use mudlink::net::{ClientEvent, SocketLayer};
use mudlink::telemetry;

#[derive(Debug, Parser)]
#[command(name = "mudlink", about = "Interactive text-console TCP client")]
struct Args {
    /// Remote host; falls back to the config file.
    host: Option<String>,

    /// Remote port; falls back to the config file.
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let args = Args::parse();
    let config = Config::load()?;
    let host = args
        .host
        .unwrap_or_else(|| config.connection.host.clone());
    let port = args.port.unwrap_or(config.connection.port);

    let (client, task) = SocketLayer::new(Arc::new(StdoutConsole));
    let task_handle = tokio::spawn(task.run());
    let mut events = client.subscribe();

    client.connect(host, port).await?;

    let mut ticker = tokio::time::interval(Duration::from_millis(config.client.poll_interval_ms));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                client.poll_connection_health().await?;
                client.poll_receive().await?;
            }
            event = events.recv() => match event {
                Ok(ClientEvent::Disconnected) => break,
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => client.send_text(format!("{line}\n")).await?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    client.disconnect().await?;
    drop(client);
    let _ = task_handle.await;
    Ok(())
}
