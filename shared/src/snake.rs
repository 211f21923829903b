use crate::geometry::{Direction, Position};
use std::collections::VecDeque;

/// A snake on the board. `body[0]` is the head; the body is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: VecDeque<Position>,
    direction: Direction,
}

impl Snake {
    /// Lays out `length` segments (at least one) with the head at `head` and
    /// the rest trailing behind it, away from `direction`.
    pub fn new(head: Position, direction: Direction, length: usize, cell_size: i32) -> Self {
        let length = length.max(1);
        let behind = direction.opposite();
        let mut body = VecDeque::with_capacity(length);
        let mut segment = head;
        for _ in 0..length {
            body.push_back(segment);
            segment = segment.step(behind, cell_size);
        }
        Self { body, direction }
    }

    /// Builds a snake from explicit segments, head first. `None` if there are
    /// no segments.
    pub fn from_segments(
        segments: impl IntoIterator<Item = Position>,
        direction: Direction,
    ) -> Option<Self> {
        let body: VecDeque<Position> = segments.into_iter().collect();
        if body.is_empty() {
            return None;
        }
        Some(Self { body, direction })
    }

    pub fn head(&self) -> Position {
        self.body[0]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter()
    }

    /// All segments except the head.
    pub fn tail_segments(&self) -> impl Iterator<Item = &Position> {
        self.body.iter().skip(1)
    }

    /// Applies `requested` unless it would turn the snake back onto itself.
    /// Returns whether the heading changed.
    pub fn change_direction(&mut self, requested: Direction) -> bool {
        if requested.is_opposite(self.direction) {
            return false;
        }
        self.direction = requested;
        true
    }

    /// Pushes a new head one cell ahead. The tail stays until [`Snake::shrink`].
    pub fn advance(&mut self, cell_size: i32) -> Position {
        let new_head = self.head().step(self.direction, cell_size);
        self.body.push_front(new_head);
        new_head
    }

    /// Drops the last segment. The head is never dropped.
    pub fn shrink(&mut self) {
        if self.body.len() > 1 {
            self.body.pop_back();
        }
    }

    /// One tick of movement: advance, then keep the tail only if the new head
    /// landed on `food`. Returns whether food was eaten.
    pub fn crawl(&mut self, food: Position, cell_size: i32) -> bool {
        let ate = self.advance(cell_size) == food;
        if !ate {
            self.shrink();
        }
        ate
    }
}
