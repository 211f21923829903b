//! Board lattice, positions and headings.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A cell-aligned pixel coordinate. Travels on the wire as `[x, y]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one `cell_size` step away in `direction`.
    pub fn step(self, direction: Direction, cell_size: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * cell_size,
            y: self.y + dy * cell_size,
        }
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.x, pos.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Unit step in screen coordinates (y grows downwards).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// The playing field: a `width` x `height` pixel area divided into square cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(crate::BOARD_WIDTH, crate::BOARD_HEIGHT, crate::CELL_SIZE)
    }
}

impl Board {
    pub const fn new(width: i32, height: i32, cell_size: i32) -> Self {
        Self {
            width,
            height,
            cell_size,
        }
    }

    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        (self.columns().max(0) as usize) * (self.rows().max(0) as usize)
    }

    pub fn contains(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    /// Draws cells uniformly until one is not in `occupied`.
    ///
    /// Returns `None` only when every cell of the board is occupied, so the
    /// rejection loop always terminates.
    pub fn random_unoccupied_cell<R: Rng + ?Sized>(
        &self,
        occupied: &HashSet<Position>,
        rng: &mut R,
    ) -> Option<Position> {
        let taken = occupied.iter().filter(|pos| self.contains(**pos)).count();
        if taken >= self.cell_count() {
            return None;
        }

        loop {
            let candidate = Position::new(
                rng.gen_range(0..self.columns()) * self.cell_size,
                rng.gen_range(0..self.rows()) * self.cell_size,
            );
            if !occupied.contains(&candidate) {
                return Some(candidate);
            }
        }
    }

    /// Uniform cell inside the square of side `area` centred on the board.
    /// The square is shrunk to fit boards smaller than `area`.
    pub fn random_central_cell<R: Rng + ?Sized>(&self, area: i32, rng: &mut R) -> Position {
        let cs = self.cell_size;
        let area = area.min(self.width).min(self.height).max(cs);
        let (cx, cy) = (self.width / 2, self.height / 2);
        let min_x = (cx - area / 2) / cs;
        let max_x = (cx + area / 2 - cs) / cs;
        let min_y = (cy - area / 2) / cs;
        let max_y = (cy + area / 2 - cs) / cs;

        Position::new(
            rng.gen_range(min_x..=max_x) * cs,
            rng.gen_range(min_y..=max_y) * cs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_bounds_are_half_open() {
        let board = Board::default();
        assert!(board.contains(Position::new(0, 0)));
        assert!(board.contains(Position::new(980, 980)));
        assert!(!board.contains(Position::new(1000, 500)));
        assert!(!board.contains(Position::new(500, 1000)));
        assert!(!board.contains(Position::new(-20, 500)));
        assert!(!board.contains(Position::new(500, -20)));
    }

    #[test]
    fn test_step_moves_one_cell() {
        let p = Position::new(100, 100);
        assert_eq!(p.step(Direction::Up, 20), Position::new(100, 80));
        assert_eq!(p.step(Direction::Down, 20), Position::new(100, 120));
        assert_eq!(p.step(Direction::Left, 20), Position::new(80, 100));
        assert_eq!(p.step(Direction::Right, 20), Position::new(120, 100));
    }

    #[test]
    fn test_opposites() {
        for d in Direction::ALL {
            assert!(d.is_opposite(d.opposite()));
            assert!(!d.is_opposite(d));
            assert_eq!(d.opposite().opposite(), d);
        }
    }

    #[test]
    fn test_random_cell_is_aligned_and_free() {
        let board = Board::new(100, 100, 20);
        let mut rng = StdRng::seed_from_u64(7);
        let occupied: HashSet<Position> = (0..5)
            .flat_map(|x| (0..4).map(move |y| Position::new(x * 20, y * 20)))
            .collect();

        for _ in 0..50 {
            let cell = board.random_unoccupied_cell(&occupied, &mut rng).unwrap();
            assert!(board.contains(cell));
            assert_eq!(cell.x % 20, 0);
            assert_eq!(cell.y % 20, 0);
            assert_eq!(cell.y, 80, "only the last row is free");
        }
    }

    #[test]
    fn test_random_cell_on_full_board() {
        let board = Board::new(40, 40, 20);
        let mut rng = StdRng::seed_from_u64(1);
        let occupied: HashSet<Position> = [(0, 0), (20, 0), (0, 20), (20, 20)]
            .into_iter()
            .map(Position::from)
            .collect();

        assert_eq!(board.random_unoccupied_cell(&occupied, &mut rng), None);
    }

    #[test]
    fn test_central_cell_stays_in_area() {
        let board = Board::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let cell = board.random_central_cell(200, &mut rng);
            assert!((400..=580).contains(&cell.x));
            assert!((400..=580).contains(&cell.y));
            assert_eq!(cell.x % 20, 0);
        }
    }

    #[test]
    fn test_central_cell_on_small_board() {
        let board = Board::new(100, 20, 20);
        let mut rng = StdRng::seed_from_u64(3);
        let cell = board.random_central_cell(200, &mut rng);
        assert!(board.contains(cell));
        assert_eq!(cell, Position::new(40, 0));
    }
}
