use clap::Parser;
use log::info;
use server::config::GameConfig;
use server::engine::RoundEngine;
use server::network::GameServer;
use server::registry::PlayerRegistry;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Time between draws in milliseconds
    #[arg(short = 'r', long, default_value = "10000")]
    round_period_ms: u64,

    /// Payout multiplier applied to winning stakes
    #[arg(short = 'm', long, default_value = "9.9")]
    payout_multiplier: f64,

    /// Lowest number players can bet on
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    min_number: i64,

    /// Highest number players can bet on
    #[arg(long, default_value = "10", allow_negative_numbers = true)]
    max_number: i64,

    /// Seed for the winning-number draw (random if omitted)
    #[arg(short, long)]
    seed: Option<u64>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            round_period: Duration::from_millis(self.round_period_ms),
            payout_multiplier: self.payout_multiplier,
            min_number: self.min_number,
            max_number: self.max_number,
            rng_seed: self.seed,
        }
    }
}

/// Parses command-line arguments, builds the round engine and serves clients
/// until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    // Parse command line arguments
    let args = Args::parse();
    let config = args.game_config();

    info!("Starting server...");
    info!(
        "Draw every {:?} over {}..={}, paying x{}",
        config.round_period, config.min_number, config.max_number, config.payout_multiplier
    );

    // Shared player registry; rejects an invalid config before anything binds
    let registry = Arc::new(PlayerRegistry::new());
    let engine = RoundEngine::new(config, registry)?;
    let address = format!("{}:{}", args.host, args.port);
    // Create network server
    let server = GameServer::bind(&address, engine).await?;

    // Handle shutdown gracefully
    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
