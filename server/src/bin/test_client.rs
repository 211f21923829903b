//! Headless bot for exercising a running server.
//!
//! Connects, then steers greedily towards the food while staying on the
//! board, logging countdown and game-over events. Handy for filling a room
//! without a graphical client.

use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use rand::seq::SliceRandom;
use rand::thread_rng;
use server::codec;
use shared::{Board, Direction, Packet, PlayerView, Position, Snapshot, MAX_FRAME_LEN};
use tokio::net::TcpStream;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to connect to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port to connect to
    #[clap(short, long, default_value = "5555")]
    port: u16,
    /// Give up after this many snapshots
    #[clap(short, long, default_value = "3000")]
    ticks: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let address = format!("{}:{}", args.host, args.port);
    let stream = TcpStream::connect(&address).await?;
    let (mut reader, mut writer) = stream.into_split();
    info!("Connected to {}", address);

    let player_id = match codec::read_packet(&mut reader, MAX_FRAME_LEN).await? {
        Packet::Join {
            player_id,
            max_players,
            ..
        } => {
            info!("Joined as player {} in a room for {}", player_id, max_players);
            player_id
        }
        Packet::Rejected { reason } => {
            warn!("Server rejected us: {}", reason);
            return Ok(());
        }
        other => return Err(format!("expected Join, got {:?}", other).into()),
    };

    let board = Board::default();
    let mut last_countdown = None;

    for _ in 0..args.ticks {
        let snapshot = match codec::read_packet(&mut reader, MAX_FRAME_LEN).await? {
            Packet::Snapshot(snapshot) => snapshot,
            other => {
                warn!("Ignoring unexpected packet {:?}", other);
                continue;
            }
        };

        if snapshot.countdown && last_countdown != Some(snapshot.countdown_value) {
            info!("Starting in {}...", snapshot.countdown_value);
            last_countdown = Some(snapshot.countdown_value);
        }

        if snapshot.game_over {
            match (&snapshot.winner, snapshot.tie) {
                (_, true) => info!("Game over: tie"),
                (Some(winner), _) => info!("Game over: player {} wins", winner),
                (None, false) => info!("Game over"),
            }
            info!("Final scores: {:?}", snapshot.scores);
            return Ok(());
        }

        let Some(me) = snapshot.player(player_id) else {
            continue;
        };
        if !snapshot.game_started {
            continue;
        }

        if let Some(direction) = choose_direction(me, &snapshot, &board) {
            if direction != me.direction {
                let intent = Packet::Intent {
                    player_id,
                    direction,
                };
                codec::write_packet(&mut writer, &intent).await?;
            }
        }
    }

    info!("Reached the snapshot limit, disconnecting");
    Ok(())
}

/// Picks the legal direction that brings the head closest to the food.
fn choose_direction(me: &PlayerView, snapshot: &Snapshot, board: &Board) -> Option<Direction> {
    let head = *me.body.first()?;
    let mut candidates = Direction::ALL.to_vec();
    candidates.shuffle(&mut thread_rng());

    candidates
        .into_iter()
        .filter(|d| !d.is_opposite(me.direction))
        .map(|d| (d, head.step(d, board.cell_size)))
        .filter(|(_, next)| board.contains(*next))
        .min_by_key(|(_, next)| distance(*next, snapshot.food))
        .map(|(d, _)| d)
}

fn distance(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
