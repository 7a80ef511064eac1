use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use chord_overlay::overlay::client::HttpPeerClient;
use chord_overlay::overlay::handlers::{
    handle_find_successor, handle_notify, handle_predecessor, handle_state_dump, handle_successor,
    handle_successor_list,
};
use chord_overlay::overlay::node::ChordNode;
use chord_overlay::overlay::protocol::{
    API_PREFIX, ENDPOINT_NOTIFY, ENDPOINT_PREDECESSOR, ENDPOINT_SUCCESSOR, ENDPOINT_SUCCESSOR_LIST,
};
use chord_overlay::overlay::types::NodeRef;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} --port <port> [--host <host>] [--seed <host:port>]", args[0]);
        eprintln!("Example: {} --port 5000", args[0]);
        eprintln!("Example: {} --port 5001 --seed 127.0.0.1:5000", args[0]);

        std::process::exit(1);
    }

    let mut host = String::from("127.0.0.1");
    let mut port: Option<u16> = None;
    let mut seed: Option<NodeRef> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                host = args[i + 1].clone();
                i += 2;
            }
            "--port" => {
                port = Some(args[i + 1].parse()?);
                i += 2;
            }
            "--seed" => {
                let (seed_host, seed_port) = args[i + 1]
                    .rsplit_once(':')
                    .ok_or_else(|| anyhow::anyhow!("--seed expects host:port"))?;
                seed = Some(NodeRef::new(seed_host, seed_port.parse()?));
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let port = port.expect("--port is required");
    let local = NodeRef::new(host.clone(), port);

    tracing::info!("Starting overlay node {} with id {}", local, local.id);

    let client = Arc::new(HttpPeerClient::new());
    let node = ChordNode::new(local, client);

    match seed {
        Some(seed) => {
            // A failed join is not fatal: the seed is already stored, so
            // the rejoin task keeps retrying while we run solo.
            if let Err(e) = node.join(seed.clone()).await {
                tracing::error!("Join via seed {} failed, running solo: {}", seed, e);
            }
        }
        None => tracing::info!("No seed given, starting a new ring"),
    }

    node.start();

    let app = Router::new()
        .route("/health/state", get(handle_state_dump))
        .nest(
            API_PREFIX,
            Router::new()
                .route(ENDPOINT_SUCCESSOR, get(handle_successor))
                .route(
                    &format!("{}/:id", ENDPOINT_SUCCESSOR),
                    get(handle_find_successor),
                )
                .route(ENDPOINT_PREDECESSOR, get(handle_predecessor))
                .route(ENDPOINT_SUCCESSOR_LIST, get(handle_successor_list))
                .route(ENDPOINT_NOTIFY, post(handle_notify)),
        )
        .layer(Extension(node.clone()));

    tracing::info!("RPC endpoint listening on {}:{}", host, port);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    node.stop().await;

    Ok(())
}
