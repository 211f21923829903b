use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod collision;
pub mod geometry;
pub mod snake;

pub use collision::{resolve, Collision, Verdict};
pub use geometry::{Board, Direction, Position};
pub use snake::Snake;

pub const BOARD_WIDTH: i32 = 1000;
pub const BOARD_HEIGHT: i32 = 1000;
pub const CELL_SIZE: i32 = 20;
pub const START_LENGTH: usize = 3;
pub const TICK_RATE: u32 = 10;
pub const COUNTDOWN_FROM: u32 = 3;
pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
/// Side of the centred square the first food is placed in.
pub const INITIAL_FOOD_AREA: i32 = 200;
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Where and which way each player slot starts.
pub const SPAWN_SLOTS: [(Position, Direction); MAX_PLAYERS] = [
    (Position::new(100, 100), Direction::Right),
    (Position::new(900, 900), Direction::Left),
    (Position::new(100, 900), Direction::Right),
    (Position::new(900, 100), Direction::Left),
];

/// Every message on the wire. One frame carries exactly one packet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Packet {
    Join {
        player_id: u32,
        game_state: Snapshot,
        max_players: u32,
    },
    Snapshot(Snapshot),
    Intent {
        player_id: u32,
        direction: Direction,
    },
    Rejected {
        reason: String,
    },
}

/// The full state clients render from. Maps are keyed by the decimal player id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub players: BTreeMap<String, PlayerView>,
    pub scores: BTreeMap<String, u32>,
    pub food: Position,
    pub countdown: bool,
    pub countdown_value: u32,
    pub game_started: bool,
    pub game_over: bool,
    pub winner: Option<String>,
    pub tie: bool,
}

impl Snapshot {
    pub fn player(&self, id: u32) -> Option<&PlayerView> {
        self.players.get(&id.to_string())
    }

    pub fn score(&self, id: u32) -> Option<u32> {
        self.scores.get(&id.to_string()).copied()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlayerView {
    /// Head first.
    pub body: Vec<Position>,
    pub direction: Direction,
}

impl From<&Snake> for PlayerView {
    fn from(snake: &Snake) -> Self {
        Self {
            body: snake.segments().copied().collect(),
            direction: snake.direction(),
        }
    }
}
