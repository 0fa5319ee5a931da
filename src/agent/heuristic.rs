//! Merge-scan heuristic slider: no learning, no randomness.

use crate::action::Action;
use crate::agent::Agent;
use crate::board::{Board, Move};
use crate::config::Properties;

const PAIR_BONUS: u32 = 5;
const SPACE_BONUS: u32 = 1;

/// Deterministic slider that prefers the orientation with more merge
/// potential.
///
/// Each call scores the board once row-wise and once column-wise with the
/// pivot scan in [`merge_scan_score`], then slides LEFT when the horizontal
/// score is at least the vertical one, UP when the vertical score is strictly
/// larger, falling back to RIGHT then DOWN when the preferred direction is
/// illegal.
pub struct MergeScanSlider {
    props: Properties,
}

impl MergeScanSlider {
    pub fn new(args: &str) -> Self {
        MergeScanSlider {
            props: Properties::from_args("name=merge role=slider", args),
        }
    }
}

impl Agent for MergeScanSlider {
    fn props(&self) -> &Properties {
        &self.props
    }

    fn props_mut(&mut self) -> &mut Properties {
        &mut self.props
    }

    fn take_action(&mut self, board: &Board) -> Action {
        let horizontal = merge_scan_score(board);
        let vertical = {
            let mut t = *board;
            t.transpose();
            merge_scan_score(&t)
        };

        let legal = |dir: Move| {
            let mut probe = *board;
            probe.slide(dir) != -1
        };

        if horizontal >= vertical && legal(Move::Left) {
            return Action::Slide(Move::Left);
        }
        if vertical > horizontal && legal(Move::Up) {
            return Action::Slide(Move::Up);
        }
        if legal(Move::Right) {
            return Action::Slide(Move::Right);
        }
        if legal(Move::Down) {
            return Action::Slide(Move::Down);
        }
        Action::Pass
    }
}

/// Row-wise merge potential.
///
/// Scans each row left to right against a moving pivot: a 1+2 pair is worth
/// [`PAIR_BONUS`], an equal pair of ranks above 2 is worth the rank itself,
/// and seeing any empty cell anywhere adds [`SPACE_BONUS`] once for the whole
/// board.
fn merge_scan_score(board: &Board) -> u32 {
    let mut space = 0;
    let mut score = 0;

    for row in 0..4 {
        let mut pivot = board.at(row, 0);
        let mut col = 1;
        while col < 4 {
            let cell = board.at(row, col);
            if cell == 0 {
                space = SPACE_BONUS;
                col += 1;
                continue;
            }
            if pivot == 0 {
                pivot = cell;
                col += 1;
                continue;
            }
            if pivot + cell == 3 {
                score += PAIR_BONUS;
                if col < 3 {
                    pivot = board.at(row, col + 1);
                    col += 1;
                }
                col += 1;
                continue;
            }
            if cell > 2 && pivot > 2 && cell == pivot {
                score += pivot as u32;
                if col < 3 {
                    pivot = board.at(row, col + 1);
                    col += 1;
                }
                col += 1;
                continue;
            }
            pivot = cell;
            col += 1;
        }
    }

    score + space
}
