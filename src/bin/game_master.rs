//! Server binary: loads configuration, starts the match loop thread, and
//! serves the `GameMaster` RPC surface until shutdown (spec §6 CLI
//! surface). Grounded in `original`'s `gameserver/pong_server.py`
//! (insecure port, thread pool sizing via config).

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pong_master::config::Config;
use pong_master::context::Context as AppContext;
use pong_master::match_loop;
use pong_master::proto::game_master_server::GameMasterServer;
use pong_master::rpc::GameMasterService;

#[derive(Parser, Debug)]
#[command(name = "game_master", about = "Authoritative Pong game master server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config).with_context(|| format!("loading {}", args.config))?;
    let app_context = AppContext::new(config);

    let addr: std::net::SocketAddr = format!(
        "{}:{}",
        app_context.config.game_master_service.host, app_context.config.game_master_service.port
    )
    .parse()
    .context("parsing game_master_service host/port")?;

    let mut handle = match_loop::spawn(app_context.config.clone());
    let service = GameMasterService::new(&handle);

    tracing::info!(%addr, "starting game master server");

    let server = tonic::transport::Server::builder()
        .add_service(GameMasterServer::new(service))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received shutdown signal");
        });

    server.await.context("serving GameMaster")?;
    handle.shutdown();
    Ok(())
}
