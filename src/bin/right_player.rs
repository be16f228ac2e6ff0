//! Right-side paddle client binary (spec §6 CLI surface). Grounded in
//! `original`'s `apps/right_player_start.py`, which wires a concrete
//! `PaddleController` subclass per process.

use anyhow::Context;
use clap::Parser;
use pong_master::client::policies;
use pong_master::client::PlayerClient;
use pong_master::config::Config;
use pong_master::proto::{PaddleType, PlayerIdentifier};

#[derive(Parser, Debug)]
#[command(name = "right_player", about = "Right-side Pong paddle client")]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Overrides the configured paddle policy. One of: Stationary,
    /// AlwaysUp, AlwaysDown, FollowTheBall, EnhancedFollowTheBall.
    #[arg(long)]
    strategy: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config).with_context(|| format!("loading {}", args.config))?;

    let strategy_name = args.strategy.unwrap_or_else(|| "Stationary".to_string());
    let policy = policies::by_name(&strategy_name, config.game_arena.arena_height as f64);

    let identifier = PlayerIdentifier {
        player_name: config.player.right_player_name.clone(),
        paddle_strategy_name: strategy_name,
        paddle_type: PaddleType::Right as i32,
    };

    let endpoint = format!("http://{}:{}", config.game_master_service.host, config.game_master_service.port);
    let client = PlayerClient::connect(endpoint, identifier, policy).await.context("connecting to game master")?;
    client.run().await.context("running right player client")?;
    Ok(())
}
