//! Authoritative game state and the per-tick state machine.
//!
//! `GameState` is plain data with no I/O. The network layer owns the single
//! instance behind its lock and calls [`GameState::tick`] once per interval.

use crate::error::SimulationError;
use log::{debug, info};
use rand::Rng;
use shared::{
    collision, Board, Collision, Direction, PlayerView, Position, Snake, Snapshot, COUNTDOWN_FROM,
    INITIAL_FOOD_AREA, SPAWN_SLOTS, START_LENGTH,
};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(u32),
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Countdown { value: u32, last_step: Instant },
    Running,
    Over(Outcome),
}

/// What happened during one running tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub eaten: Vec<u32>,
    pub killed: BTreeSet<u32>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub phase: Phase,
    pub snakes: BTreeMap<u32, Snake>,
    /// One entry per connected session. Survives the snake's death.
    pub scores: BTreeMap<u32, u32>,
    pub food: Position,
    board: Board,
    room_size: usize,
    countdown_from: u32,
    countdown_step: Duration,
}

impl GameState {
    pub fn new<R: Rng + ?Sized>(board: Board, room_size: usize, rng: &mut R) -> Self {
        Self {
            tick: 0,
            phase: Phase::Waiting,
            snakes: BTreeMap::new(),
            scores: BTreeMap::new(),
            food: board.random_central_cell(INITIAL_FOOD_AREA, rng),
            board,
            room_size,
            countdown_from: COUNTDOWN_FROM,
            countdown_step: Duration::from_secs(1),
        }
    }

    pub fn with_countdown(mut self, from: u32, step: Duration) -> Self {
        self.countdown_from = from;
        self.countdown_step = step;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn room_size(&self) -> usize {
        self.room_size
    }

    pub fn session_count(&self) -> usize {
        self.scores.len()
    }

    pub fn is_waiting(&self) -> bool {
        self.phase == Phase::Waiting
    }

    /// Places a fresh snake for `id` at spawn `slot` and opens its score.
    pub fn add_player(&mut self, id: u32, slot: usize) {
        let (head, direction) = SPAWN_SLOTS[slot % SPAWN_SLOTS.len()];
        let snake = Snake::new(head, direction, START_LENGTH, self.board.cell_size);

        info!("Added player {} at ({}, {}) facing {:?}", id, head.x, head.y, direction);
        self.snakes.insert(id, snake);
        self.scores.insert(id, 0);
    }

    /// Drops the snake and score of `id`. Returns false if nothing was there.
    pub fn remove_player(&mut self, id: u32) -> bool {
        let had_snake = self.snakes.remove(&id).is_some();
        let had_score = self.scores.remove(&id).is_some();
        had_snake || had_score
    }

    /// Steers a live snake. Unknown ids and reversals are ignored.
    pub fn set_direction(&mut self, id: u32, direction: Direction) -> bool {
        self.snakes
            .get_mut(&id)
            .map(|snake| snake.change_direction(direction))
            .unwrap_or(false)
    }

    /// Advances the state machine by one tick.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        now: Instant,
        rng: &mut R,
    ) -> Result<TickReport, SimulationError> {
        self.tick += 1;

        match self.phase {
            Phase::Waiting => {
                if self.session_count() >= self.room_size {
                    info!("All {} players connected. Starting countdown...", self.room_size);
                    self.phase = Phase::Countdown {
                        value: self.countdown_from,
                        last_step: now,
                    };
                }
                Ok(TickReport::default())
            }
            Phase::Countdown { value, last_step } => {
                if now.duration_since(last_step) >= self.countdown_step {
                    let value = value.saturating_sub(1);
                    if value == 0 {
                        info!("Game started!");
                        self.phase = Phase::Running;
                    } else {
                        info!("Countdown: {}", value);
                        self.phase = Phase::Countdown {
                            value,
                            last_step: now,
                        };
                    }
                }
                Ok(TickReport::default())
            }
            Phase::Running => self.step(rng),
            Phase::Over(_) => Ok(TickReport::default()),
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<TickReport, SimulationError> {
        let alive_before = self.snakes.len();
        if alive_before < 2 {
            self.finish();
            return Ok(TickReport::default());
        }

        let mut report = TickReport::default();
        let food = self.food;
        let cell_size = self.board.cell_size;

        for (id, snake) in self.snakes.iter_mut() {
            if snake.crawl(food, cell_size) {
                *self.scores.entry(*id).or_insert(0) += 1;
                report.eaten.push(*id);
            }
        }

        for id in self.snakes.keys() {
            let verdict = collision::resolve(*id, &self.snakes, &self.board);
            if let Some(collision) = verdict.collision {
                log_collision(*id, collision);
            }
            if verdict.dies {
                report.killed.insert(*id);
            }
            report.killed.extend(verdict.kills);
        }

        if !report.eaten.is_empty() {
            let occupied: HashSet<Position> = self
                .snakes
                .iter()
                .filter(|(id, _)| !report.killed.contains(*id))
                .flat_map(|(_, snake)| snake.segments().copied())
                .collect();
            self.food = self
                .board
                .random_unoccupied_cell(&occupied, rng)
                .ok_or(SimulationError::BoardFull)?;
            debug!("Food respawned at ({}, {})", self.food.x, self.food.y);
        }

        for id in &report.killed {
            if self.snakes.remove(id).is_some() {
                info!("Player {} removed from game", id);
            }
        }

        if self.snakes.len() <= 1 {
            self.finish();
        }

        Ok(report)
    }

    fn finish(&mut self) {
        let outcome = match (self.snakes.len(), self.snakes.keys().next()) {
            (1, Some(&id)) => Outcome::Winner(id),
            _ => Outcome::Tie,
        };

        match outcome {
            Outcome::Winner(id) => info!("Game over! Player {} wins!", id),
            Outcome::Tie => info!("Game over! All players died - it's a tie!"),
        }
        self.phase = Phase::Over(outcome);
    }

    pub fn snapshot(&self) -> Snapshot {
        let (countdown, countdown_value) = match self.phase {
            Phase::Waiting => (false, self.countdown_from),
            Phase::Countdown { value, .. } => (true, value),
            Phase::Running | Phase::Over(_) => (false, 0),
        };

        Snapshot {
            players: self
                .snakes
                .iter()
                .map(|(id, snake)| (id.to_string(), PlayerView::from(snake)))
                .collect(),
            scores: self
                .scores
                .iter()
                .map(|(id, score)| (id.to_string(), *score))
                .collect(),
            food: self.food,
            countdown,
            countdown_value,
            game_started: matches!(self.phase, Phase::Running | Phase::Over(_)),
            game_over: matches!(self.phase, Phase::Over(_)),
            winner: match self.phase {
                Phase::Over(Outcome::Winner(id)) => Some(id.to_string()),
                _ => None,
            },
            tie: self.phase == Phase::Over(Outcome::Tie),
        }
    }
}

fn log_collision(id: u32, collision: Collision) {
    match collision {
        Collision::Wall => info!("Player {} died by hitting a wall", id),
        Collision::OwnBody => info!("Player {} died by hitting own tail", id),
        Collision::Body { other } => info!("Player {} died by hitting Player {}'s tail", id, other),
        Collision::HeadOn {
            other,
            mine,
            theirs,
        } => info!(
            "Head collision: Player {} vs Player {} ({} vs {})",
            id, other, mine, theirs
        ),
    }
}
