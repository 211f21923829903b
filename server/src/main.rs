use clap::Parser;
use env_logger::Env;
use log::info;
use server::config::{self, ServerConfig};
use server::network::Server;
use std::io;

/// Authoritative multiplayer snake server.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "5555")]
    port: u16,
    /// Tick rate (updates per second)
    #[clap(short, long, default_value = "10")]
    tick_rate: u32,
    /// Players needed to start (2-4); prompts on stdin when omitted
    #[clap(short = 'n', long)]
    players: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let max_players = match args.players {
        Some(n) => config::clamp_room_size(n),
        None => config::prompt_room_size(io::stdin().lock(), io::stdout())?,
    };

    let config = ServerConfig {
        address: format!("{}:{}", args.host, args.port),
        tick_duration: config::tick_duration(args.tick_rate),
        max_players,
        ..ServerConfig::default()
    };

    let server = Server::bind(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
    }

    Ok(())
}
