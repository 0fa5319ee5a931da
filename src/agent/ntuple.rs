//! N-tuple slider trained by a backward temporal-difference sweep.
//!
//! The value of an afterstate is the sum of one weight-table cell per
//! configured feature encoding, where an encoding is an ordered list of cell
//! positions packed (4 bits each, most significant first) into the table
//! index. During an episode the agent buffers the visited afterstates'
//! weight slots together with the transformed slide rewards; `close_episode`
//! replays the buffer newest-first, pushing each step's one-step TD error
//! into its cells.

use std::path::PathBuf;

use crate::action::Action;
use crate::agent::{Agent, AgentError};
use crate::board::{Board, Move};
use crate::config::Properties;
use crate::weights::{Slot, Weights, WeightsError};

/// Default feature set: the four rows and four columns.
const LINE_ENCODINGS: [[usize; 4]; 8] = [
    [0, 1, 2, 3],
    [4, 5, 6, 7],
    [8, 9, 10, 11],
    [12, 13, 14, 15],
    [0, 4, 8, 12],
    [1, 5, 9, 13],
    [2, 6, 10, 14],
    [3, 7, 11, 15],
];

const DEFAULT_SIZES: &str = "65536,65536";
const DEFAULT_REWARD_SCALE: f64 = 32.0;

/// One accepted slide: the afterstate's weight slots plus the transformed
/// reward collected for it.
struct Step {
    slots: Vec<Slot>,
    reward: f32,
}

/// Learned slider combining greedy afterstate-value selection with an
/// end-of-episode backward TD update.
///
/// Recognized configuration keys on top of the common ones: `init`
/// (comma-separated table sizes), `load`/`save` (weight file paths), `alpha`
/// (learning rate), `scale` (reward transform multiplier, default 32).
pub struct NTupleSlider {
    props: Properties,
    net: Weights,
    encodings: Vec<Vec<usize>>,
    alpha: f32,
    scale: f64,
    save_path: Option<PathBuf>,
    trajectory: Vec<Step>,
}

impl NTupleSlider {
    pub fn new(args: &str) -> Result<Self, AgentError> {
        let props = Properties::from_args("name=learn role=slider", args);

        let sizes = props.get_or("init", DEFAULT_SIZES).to_string();
        let mut net = Weights::from_sizes(&sizes)?;
        if props.contains("load") {
            net.load(props.get("load")?)?;
        }

        let alpha = if props.contains("alpha") {
            props.get_parsed::<f32>("alpha")?
        } else {
            0.0
        };
        let scale = if props.contains("scale") {
            props.get_parsed::<f64>("scale")?
        } else {
            DEFAULT_REWARD_SCALE
        };
        let save_path = props.get("save").ok().map(PathBuf::from);

        let mut slider = NTupleSlider {
            props,
            net,
            encodings: Vec::new(),
            alpha,
            scale,
            save_path,
            trajectory: Vec::new(),
        };
        // the line tuples fit the default 65536-entry tables; undersized
        // custom tables start with no encodings and expect `set_encodings`
        let line_tuples = LINE_ENCODINGS.iter().map(|e| e.to_vec()).collect();
        if slider.set_encodings(line_tuples).is_err() {
            slider.encodings = Vec::new();
        }
        Ok(slider)
    }

    /// Replace the feature encodings, revalidating against the table sizes.
    ///
    /// Encoding `i` indexes table `i % table_count`, so a short table list is
    /// shared across encodings. Every encoding must fit its table:
    /// `16^len <= table_len`.
    pub fn set_encodings(&mut self, encodings: Vec<Vec<usize>>) -> Result<(), AgentError> {
        for (i, encoding) in encodings.iter().enumerate() {
            let table = i % self.net.len();
            // 16 or more positions would overflow the shift; no table can
            // hold such a tuple anyway
            let needed = 1usize
                .checked_shl(4 * encoding.len() as u32)
                .unwrap_or(usize::MAX);
            let len = self.net.table_len(table);
            if needed > len || encoding.iter().any(|&pos| pos >= 16) {
                return Err(AgentError::EncodingRange {
                    encoding: i,
                    table,
                    needed,
                    len,
                });
            }
        }
        self.encodings = encodings;
        Ok(())
    }

    /// Number of active feature encodings.
    pub fn encoding_count(&self) -> usize {
        self.encodings.len()
    }

    /// Estimated value of a board state: the sum of the selected weight
    /// cells across all encodings.
    pub fn value(&self, board: &Board) -> f32 {
        self.slots(board).iter().map(|&slot| self.net.get(slot)).sum()
    }

    /// The weight store, exposed for inspection and tests.
    pub fn weights(&self) -> &Weights {
        &self.net
    }

    pub fn weights_mut(&mut self) -> &mut Weights {
        &mut self.net
    }

    /// Persist the tables to the configured `save` path, if any.
    pub fn save_weights(&self) -> Result<(), WeightsError> {
        match &self.save_path {
            Some(path) => self.net.save(path),
            None => Ok(()),
        }
    }

    fn slots(&self, board: &Board) -> Vec<Slot> {
        self.encodings
            .iter()
            .enumerate()
            .map(|(i, encoding)| {
                let index = encoding
                    .iter()
                    .fold(0usize, |idx, &pos| (idx << 4) | board.cell(pos) as usize);
                Slot {
                    table: i % self.net.len(),
                    index,
                }
            })
            .collect()
    }

    /// Compress a raw slide reward into the magnitude range of the learned
    /// values: `scale * 2^floor(ln(r + 1))`.
    fn transform_reward(&self, reward: i32) -> f32 {
        let exponent = ((reward as f64) + 1.0).ln().floor() as i32;
        (self.scale * 2f64.powi(exponent)) as f32
    }
}

impl Agent for NTupleSlider {
    fn props(&self) -> &Properties {
        &self.props
    }

    fn props_mut(&mut self) -> &mut Properties {
        &mut self.props
    }

    fn open_episode(&mut self, _flag: &str) {
        self.trajectory.clear();
        self.trajectory.reserve(1000);
    }

    /// Backward TD sweep over the buffered trajectory, newest step first.
    ///
    /// `next_value` carries the value estimate of the step processed just
    /// before (later in the episode); `return_so_far` lags one step behind
    /// the stored rewards. Both start at zero, so the terminal step is pulled
    /// toward zero and every earlier step toward its successor's
    /// reward-plus-value.
    fn close_episode(&mut self, _flag: &str) {
        let mut return_so_far = 0.0f32;
        let mut next_value = 0.0f32;

        for step in self.trajectory.iter().rev() {
            let current_value: f32 = step.slots.iter().map(|&slot| self.net.get(slot)).sum();
            let loss = return_so_far + next_value - current_value;
            for &slot in &step.slots {
                self.net.add(slot, self.alpha * loss);
            }
            next_value = current_value;
            return_so_far = step.reward;
        }
    }

    fn take_action(&mut self, board: &Board) -> Action {
        let mut best: Option<(Move, f32, Board, i32)> = None;

        for dir in Move::ALL {
            let mut after = *board;
            let reward = after.slide(dir);
            if reward == -1 {
                // illegal branch: never a candidate
                continue;
            }
            let score = self.transform_reward(reward) + self.value(&after);
            let improves = match best {
                Some((_, best_score, _, _)) => score > best_score,
                None => true,
            };
            if improves {
                best = Some((dir, score, after, reward));
            }
        }

        match best {
            None => Action::Pass,
            Some((dir, _, after, reward)) => {
                self.trajectory.push(Step {
                    slots: self.slots(&after),
                    reward: self.transform_reward(reward),
                });
                Action::Slide(dir)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A slider whose whole value function is a single shared cell: one
    /// table of size 1 indexed by the empty encoding.
    fn scalar_slider(alpha: f32) -> NTupleSlider {
        let mut slider = NTupleSlider::new(&format!("init=1 alpha={}", alpha)).unwrap();
        slider.set_encodings(vec![vec![]]).unwrap();
        slider
    }

    const CELL: Slot = Slot { table: 0, index: 0 };

    #[test]
    fn reward_transform_shape() {
        let slider = scalar_slider(0.0);
        // floor(ln(r+1)): r=0 -> 0, r=3 -> 1, r=9 -> 2
        assert_eq!(slider.transform_reward(0), 32.0);
        assert_eq!(slider.transform_reward(3), 64.0);
        assert_eq!(slider.transform_reward(9), 128.0);

        let scaled = NTupleSlider::new("init=1 scale=16").unwrap();
        assert_eq!(scaled.transform_reward(0), 16.0);
    }

    #[test]
    fn encoding_validation_rejects_oversized_tuples() {
        let mut slider = NTupleSlider::new("init=16").unwrap();
        // two cells need 256 entries, the table holds 16
        let err = slider.set_encodings(vec![vec![0, 1]]).unwrap_err();
        assert!(matches!(err, AgentError::EncodingRange { .. }));
        // single-cell tuples fit exactly
        slider.set_encodings(vec![vec![0], vec![5]]).unwrap();

        // a 16-position tuple must be rejected too, not wrap the size
        // computation around
        let err = slider.set_encodings(vec![vec![0usize; 16]]).unwrap_err();
        assert!(matches!(err, AgentError::EncodingRange { .. }));
        let err = slider.set_encodings(vec![vec![0usize; 20]]).unwrap_err();
        assert!(matches!(err, AgentError::EncodingRange { .. }));
    }

    #[test]
    fn default_encodings_require_line_sized_tables() {
        // default tables carry the eight row/column tuples
        let slider = NTupleSlider::new("").unwrap();
        assert_eq!(slider.encoding_count(), 8);

        // undersized tables start with no encodings at all
        let slider = NTupleSlider::new("init=1024").unwrap();
        assert_eq!(slider.encoding_count(), 0);
    }

    #[test]
    fn value_sums_assigned_cells() {
        let mut slider = NTupleSlider::new("init=16,16").unwrap();
        slider.set_encodings(vec![vec![0], vec![1]]).unwrap();
        // encoding 0 -> table 0, encoding 1 -> table 1 (index = cell rank)
        let board = Board::from_raw(0x1200_0000_0000_0000);
        slider.weights_mut().set(Slot { table: 0, index: 1 }, 0.25);
        slider.weights_mut().set(Slot { table: 1, index: 2 }, 0.5);
        assert!((slider.value(&board) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn no_legal_move_returns_pass_without_learning() {
        let mut slider = scalar_slider(0.5);
        slider.weights_mut().set(CELL, 7.0);
        slider.open_episode("");

        let board = Board::from_raw(0x1313_3131_1313_3131);
        assert!(slider.take_action(&board).is_pass());

        // empty trajectory: close is a no-op
        slider.close_episode("");
        assert_eq!(slider.weights().get(CELL), 7.0);
    }

    #[test]
    fn single_step_update_pulls_value_toward_zero() {
        let alpha = 0.5f32;
        let mut slider = scalar_slider(alpha);
        slider.weights_mut().set(CELL, 5.0);
        slider.open_episode("");

        // one legal slide, then close: loss = 0 + 0 - v
        let board = Board::from_raw(0x1200_0000_0000_0000);
        assert!(matches!(slider.take_action(&board), Action::Slide(_)));
        slider.close_episode("");

        assert!((slider.weights().get(CELL) - (5.0 - alpha * 5.0)).abs() < 1e-5);
    }

    #[test]
    fn two_step_backward_update_deltas() {
        let alpha = 0.25f32;
        let w0 = 2.0f32;
        let mut slider = scalar_slider(alpha);
        slider.weights_mut().set(CELL, w0);
        slider.open_episode("");

        // step 1 merges (raw reward 3 -> 64), step 2 only shifts tiles
        // (raw reward 0 -> 32); r2 below is the LATER step's stored reward
        let first = Board::from_raw(0x1200_0000_0000_0012);
        let action = slider.take_action(&first);
        let mut board = first;
        assert_ne!(action.apply(&mut board), -1);
        let action = slider.take_action(&board);
        let mut probe = board;
        assert_ne!(action.apply(&mut probe), -1);
        let r2 = 32.0f32;

        slider.close_episode("");

        // later step first, against the shared scalar cell:
        //   v2 = w0;           w' = w0 + a * (0 + 0 - w0)
        //   v1 = w' (same cell); w'' = w' + a * (r2 + w0 - w')
        let w_after_late = w0 + alpha * (0.0 + 0.0 - w0);
        let expected = w_after_late + alpha * (r2 + w0 - w_after_late);
        assert!((slider.weights().get(CELL) - expected).abs() < 1e-4);
    }

    #[test]
    fn open_episode_clears_the_trajectory() {
        let mut slider = scalar_slider(0.5);
        slider.open_episode("");
        let board = Board::from_raw(0x1200_0000_0000_0000);
        assert!(matches!(slider.take_action(&board), Action::Slide(_)));

        // a fresh episode discards the buffered step entirely
        slider.open_episode("");
        slider.close_episode("");
        assert_eq!(slider.weights().get(CELL), 0.0);
    }

    #[test]
    fn greedy_selection_prefers_higher_afterstate_value() {
        let mut slider = NTupleSlider::new("init=16,16").unwrap();
        slider.set_encodings(vec![vec![0]]).unwrap();

        // row0 = [0, 1, 0, 2]: LEFT afterstate has cell0 = 1, RIGHT has
        // cell0 = 0; rewards are both 0, so the weight on cell0 decides
        let board = Board::from_raw(0x0102_0000_0000_0000);
        slider.weights_mut().set(Slot { table: 0, index: 1 }, 10.0);
        assert_eq!(slider.take_action(&board), Action::Slide(Move::Left));

        // flip the preference: reward the empty leading cell instead
        let mut slider = NTupleSlider::new("init=16,16").unwrap();
        slider.set_encodings(vec![vec![0]]).unwrap();
        slider.weights_mut().set(Slot { table: 0, index: 0 }, 10.0);
        let action = slider.take_action(&board);
        assert_ne!(action, Action::Slide(Move::Left));
        assert!(matches!(action, Action::Slide(_)));
    }
}
