//! Per-snake collision classification for one tick.
//!
//! Every snake has already moved when this runs, so each verdict is taken
//! against the complete post-move world. A snake marked for death earlier in
//! the same tick is still present and still collidable; removals happen only
//! after all verdicts are in.

use crate::geometry::Board;
use crate::snake::Snake;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// What a head ran into. Checked in declaration order, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    OwnBody,
    /// Heads sharing a cell. `other` is the longest rival there (lowest id
    /// on equal length). Lengths are post-move.
    HeadOn {
        other: u32,
        mine: usize,
        theirs: usize,
    },
    Body {
        other: u32,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub collision: Option<Collision>,
    pub dies: bool,
    /// Rivals on the same cell that are no longer than this snake.
    pub kills: Vec<u32>,
}

impl Verdict {
    fn dead(collision: Collision) -> Self {
        Self {
            collision: Some(collision),
            dies: true,
            kills: Vec::new(),
        }
    }
}

/// Classifies the snake `id` against the board and every other snake.
///
/// Returns a default (surviving, no kills) verdict if `id` is not present.
pub fn resolve(id: u32, snakes: &BTreeMap<u32, Snake>, board: &Board) -> Verdict {
    let Some(snake) = snakes.get(&id) else {
        return Verdict::default();
    };
    let head = snake.head();

    if !board.contains(head) {
        return Verdict::dead(Collision::Wall);
    }

    if snake.tail_segments().any(|segment| *segment == head) {
        return Verdict::dead(Collision::OwnBody);
    }

    let others = || snakes.iter().filter(move |(other_id, _)| **other_id != id);

    let mine = snake.len();
    let rivals: Vec<(u32, usize)> = others()
        .filter(|(_, rival)| rival.head() == head)
        .map(|(&other, rival)| (other, rival.len()))
        .collect();

    // Weigh every head on the cell, not just the first one found.
    let strongest = rivals
        .iter()
        .max_by_key(|(other, len)| (*len, Reverse(*other)));
    if let Some(&(other, theirs)) = strongest {
        return Verdict {
            collision: Some(Collision::HeadOn {
                other,
                mine,
                theirs,
            }),
            dies: theirs >= mine,
            kills: rivals
                .iter()
                .filter(|(_, len)| *len <= mine)
                .map(|(rival, _)| *rival)
                .collect(),
        };
    }

    if let Some((&other, _)) =
        others().find(|(_, rival)| rival.tail_segments().any(|segment| *segment == head))
    {
        return Verdict::dead(Collision::Body { other });
    }

    Verdict::default()
}
