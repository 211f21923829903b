//! # Snake Arena Server Library
//!
//! Authoritative server for a small multiplayer snake game. Players connect
//! over TCP, each steers one snake, and the server alone decides movement,
//! growth, collisions and the winner. Clients only send direction changes and
//! render whatever the latest snapshot says.
//!
//! ## Game Flow
//!
//! A room waits until it holds the configured number of players (2-4). It
//! then counts down, runs the simulation at a fixed tick rate, and ends once
//! at most one snake is left alive. The last snake standing wins; if the
//! final snakes die on the same tick the game is a tie. Joins are only
//! accepted while the room is still waiting.
//!
//! ## Architecture
//!
//! ### Shared Room
//! The [`game::GameState`] and the [`session_manager::SessionManager`] live
//! together in one [`network::Room`] behind a single `tokio::sync::Mutex`.
//! Joins, leaves and direction intents take the lock briefly; the game loop
//! takes it once per tick.
//!
//! ### Tasks
//! - **Accept loop**: admits TCP connections and spawns a handler for each
//! - **Connection reader**: decodes intents and applies them under the lock
//! - **Connection writer**: drains the session's bounded outbound queue
//! - **Game loop**: ticks the simulation and fans out one snapshot per tick
//!
//! Broadcasting happens after the lock is released and never waits on a
//! slow client. A client whose queue is full simply misses that snapshot.
//!
//! ### Wire Format
//! Every message is a [`shared::Packet`] encoded with `bincode` and prefixed
//! by its length as a big-endian `u32`. See [`codec`].
//!
//! ## Module Organization
//!
//! - [`broadcast`]: per-tick snapshot fan-out
//! - [`codec`]: length-prefixed packet framing
//! - [`config`]: server settings and the room-size prompt
//! - [`error`]: error types for joins, framing and the simulation
//! - [`game`]: the tick state machine and scoring
//! - [`network`]: sockets, connection tasks and the game loop
//! - [`session_manager`]: connected players and their outbound queues
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         max_players: 3,
//!         ..ServerConfig::default()
//!     };
//!
//!     // Runs until the simulation hits an unrecoverable state.
//!     Server::bind(config).await?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod codec;
pub mod config;
pub mod error;
pub mod game;
pub mod network;
pub mod session_manager;
