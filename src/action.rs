use std::fmt;

use crate::board::{Board, Move};

/// An action produced by an agent: a slide, a tile placement, or a pass.
///
/// `Pass` is the null action; agents return it when they can no longer move,
/// and the harness treats it as the end of the episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Slide(Move),
    Place { pos: usize, tile: u8, hint: u8 },
    Pass,
}

impl Action {
    /// Apply this action to `board`.
    ///
    /// Returns the slide reward (or 0 for a placement) on success, `-1` if the
    /// action has no effect. `Pass` always returns `-1`. A rejected action
    /// never partially mutates the board.
    pub fn apply(self, board: &mut Board) -> i32 {
        match self {
            Action::Slide(dir) => board.slide(dir),
            Action::Place { pos, tile, hint } => board.place(pos, tile, hint),
            Action::Pass => -1,
        }
    }

    /// True for the null action.
    #[inline]
    pub fn is_pass(self) -> bool {
        self == Action::Pass
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Slide(dir) => write!(f, "slide {:?}", dir),
            Action::Place { pos, tile, hint } => {
                write!(f, "place {} at {} (hint {})", tile, pos, hint)
            }
            Action::Pass => write!(f, "pass"),
        }
    }
}
