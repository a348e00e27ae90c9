//! CLI for loadcast
//!
//! Subcommands:
//! - `server`: run the WebSocket server
//! - `track`: connect, follow one load and print what arrives (smoke test)

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use loadcast::Hub;
use loadcast::config::load_config;
use loadcast::transport::{ClientMessage, start_websocket_server};
use loadcast::utils::{Result, logging};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "loadcast")]
enum Command {
    /// Start the WebSocket server
    Server {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Track a load and print every frame received
    Track {
        /// WebSocket server URL to connect to
        #[arg(long, default_value = "ws://127.0.0.1:5000")]
        url: String,
        /// Load to follow
        #[arg(long)]
        load_id: String,
        /// Optional JSON location to report for the same load after subscribing
        #[arg(long)]
        report: Option<String>,
        /// Stop after this many frames
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cmd = Command::parse();

    let result = match cmd {
        Command::Server { host, port } => run_server(host, port).await,
        Command::Track {
            url,
            load_id,
            report,
            count,
        } => {
            logging::init("info");
            run_tracker(&url, load_id, report, count).await
        }
    };

    if let Err(e) = result {
        // no-op if logging is already up
        logging::init("info");
        error!("loadcast failed: {e}");
        std::process::exit(1);
    }
}

async fn run_server(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    logging::init(&config.logging.level);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    let hub = Hub::from_settings(&config);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {e}");
            return;
        }
        info!("Shutdown signal received. Exiting gracefully.");
    };

    start_websocket_server(hub, config, shutdown).await
}

async fn run_tracker(url: &str, load_id: String, report: Option<String>, count: usize) -> Result<()> {
    let (mut ws_stream, _response) = connect_async(url).await?;

    let mut outgoing = vec![ClientMessage::TrackLoad {
        load_id: load_id.clone(),
    }];
    if let Some(raw) = report {
        outgoing.push(ClientMessage::UpdateLocation {
            load_id,
            payload: serde_json::from_str(&raw)?,
        });
    }

    for msg in &outgoing {
        let text = serde_json::to_string(msg)?;
        ws_stream.send(WsMessage::text(text)).await?;
    }

    let mut seen = 0;
    while seen < count {
        match ws_stream.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                println!("{text}");
                seen += 1;
            }
            Some(Ok(WsMessage::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
        }
    }

    let _ = ws_stream.close(None).await;
    Ok(())
}
