//! Server network layer: TCP accept loop, per-connection tasks and the
//! fixed-rate game loop.
//!
//! All game data lives in one [`Room`] behind one mutex. Connection readers
//! lock it briefly to apply an intent; the game loop locks it once per tick to
//! step the simulation and copy out a snapshot, then fans the snapshot out
//! after releasing the lock.

use crate::broadcast;
use crate::codec::{self, Frame};
use crate::config::ServerConfig;
use crate::error::{CodecError, ServerError};
use crate::game::GameState;
use crate::session_manager::{JoinTicket, SessionManager};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Board, Packet, MAX_FRAME_LEN};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, MissedTickBehavior};

/// Everything guarded by the state lock.
pub struct Room {
    pub game: GameState,
    pub sessions: SessionManager,
}

impl Room {
    pub fn new(config: &ServerConfig) -> Self {
        let sessions = SessionManager::new(config.max_players);
        let game = GameState::new(
            Board::default(),
            sessions.capacity(),
            &mut StdRng::from_entropy(),
        )
        .with_countdown(config.countdown_from, config.countdown_step);

        Self { game, sessions }
    }
}

pub type SharedRoom = Arc<Mutex<Room>>;

pub struct Server {
    listener: TcpListener,
    room: SharedRoom,
    config: ServerConfig,
}

impl Server {
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(&config.address).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            room: Arc::new(Mutex::new(Room::new(&config))),
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn room(&self) -> SharedRoom {
        Arc::clone(&self.room)
    }

    /// Accepts connections and drives the game loop until the loop fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let Server {
            listener,
            room,
            config,
        } = self;

        info!("Server started. Waiting for {} players...", config.max_players);
        let mut game_loop = tokio::spawn(run_game_loop(Arc::clone(&room), config.tick_duration));

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        tokio::spawn(handle_connection(stream, addr, Arc::clone(&room)));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                },
                finished = &mut game_loop => {
                    return finished?;
                }
            }
        }
    }
}

/// Steps the simulation once per `tick_duration` and broadcasts the result.
/// Returns only on a broken simulation invariant.
pub async fn run_game_loop(room: SharedRoom, tick_duration: Duration) -> Result<(), ServerError> {
    let mut interval_timer = interval(tick_duration);
    interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rng = StdRng::from_entropy();

    loop {
        interval_timer.tick().await;

        let (snapshot, recipients, tick) = {
            let mut guard = room.lock().await;
            let Room { game, sessions } = &mut *guard;

            if let Err(e) = game.tick(Instant::now(), &mut rng) {
                error!("Simulation stopped at tick {}: {}", game.tick, e);
                return Err(e.into());
            }
            (game.snapshot(), sessions.recipients(), game.tick)
        };

        match broadcast::publish(&snapshot, &recipients) {
            Ok(report) => {
                if tick % 100 == 0 {
                    debug!(
                        "Tick {}: {} sessions, {} delivered, {} lagging",
                        tick,
                        recipients.len(),
                        report.delivered,
                        report.lagging.len()
                    );
                }
            }
            Err(e) => error!("Error broadcasting tick {}: {}", tick, e),
        }
    }
}

/// Runs one player's connection from admission to cleanup.
pub async fn handle_connection(stream: TcpStream, addr: SocketAddr, room: SharedRoom) {
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Could not set TCP_NODELAY for {}: {}", addr, e);
    }
    let (mut reader, mut writer) = stream.into_split();

    let admitted: Result<JoinTicket, String> = {
        let mut guard = room.lock().await;
        let Room { game, sessions } = &mut *guard;

        match sessions.join(game, addr) {
            Ok(ticket) => {
                // Queued before any tick can see the session, so Join is always first.
                let join = Packet::Join {
                    player_id: ticket.id,
                    game_state: game.snapshot(),
                    max_players: sessions.capacity() as u32,
                };
                match codec::encode(&join) {
                    Ok(frame) => {
                        sessions.send_to(ticket.id, frame);
                        Ok(ticket)
                    }
                    Err(e) => {
                        error!("Failed to encode join for player {}: {}", ticket.id, e);
                        sessions.leave(game, ticket.id);
                        Err(e.to_string())
                    }
                }
            }
            Err(e) => Err(e.to_string()),
        }
    };

    let ticket = match admitted {
        Ok(ticket) => ticket,
        Err(reason) => {
            let rejected = Packet::Rejected { reason };
            if let Err(e) = codec::write_packet(&mut writer, &rejected).await {
                debug!("Failed to notify rejected client {}: {}", addr, e);
            }
            return;
        }
    };

    let id = ticket.id;
    let writer_task = tokio::spawn(write_loop(writer, ticket.receiver, id));

    match read_loop(&mut reader, id, &room).await {
        Err(CodecError::ConnectionClosed) => info!("Player {} closed the connection", id),
        Err(e) => warn!("Error processing player {} data: {}", id, e),
        Ok(()) => {}
    }

    {
        let mut guard = room.lock().await;
        let Room { game, sessions } = &mut *guard;
        sessions.leave(game, id);
    }
    writer_task.abort();
}

async fn read_loop(
    reader: &mut OwnedReadHalf,
    id: u32,
    room: &SharedRoom,
) -> Result<(), CodecError> {
    loop {
        match codec::read_packet(reader, MAX_FRAME_LEN).await? {
            Packet::Intent {
                player_id,
                direction,
            } => {
                if player_id != id {
                    warn!("Player {} sent an intent for player {}, ignoring", id, player_id);
                    continue;
                }
                let mut guard = room.lock().await;
                let Room { game, sessions } = &mut *guard;
                sessions.set_direction(game, id, direction);
            }
            _ => warn!("Unexpected packet type from player {}", id),
        }
    }
}

async fn write_loop(mut writer: OwnedWriteHalf, mut frames: mpsc::Receiver<Frame>, id: u32) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = codec::write_frame(&mut writer, &frame).await {
            debug!("Failed to send to player {}: {}", id, e);
            break;
        }
    }
}
