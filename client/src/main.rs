use clap::Parser;
use client::network::Client;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket URL of the game server
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080")]
    server: String,

    /// Nickname to register on connect
    #[arg(short = 'n', long, default_value = "Player1")]
    nickname: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    println!("Commands: bet <number> <amount>, nick <name>, quit");

    let mut client = Client::new(&args.server, &args.nickname);
    client.run().await?;

    let state = client.state();
    info!(
        "Session over: {} wins, {} losses, {:.2} won",
        state.wins, state.losses, state.total_won
    );

    Ok(())
}
