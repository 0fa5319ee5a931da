//! Uniform-random baseline agents: the tile-placing environment and a
//! legal-move-picking slider. Both are seedable through the `seed` property
//! for reproducible episodes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::action::Action;
use crate::agent::{Agent, AgentError};
use crate::board::{Board, Move};
use crate::config::Properties;

fn seeded_rng(props: &Properties) -> Result<StdRng, AgentError> {
    if props.contains("seed") {
        Ok(StdRng::seed_from_u64(props.get_parsed::<u64>("seed")?))
    } else {
        Ok(StdRng::from_entropy())
    }
}

/// Candidate placement cells per preceding slide direction, in [`Move`]
/// priority order, with the full board as index 4 for the opening placements.
/// A slide empties the edge opposite to its direction.
const SPACES: [&[usize]; 5] = [
    &[3, 7, 11, 15],                                        // after Left
    &[12, 13, 14, 15],                                      // after Up
    &[0, 4, 8, 12],                                         // after Right
    &[0, 1, 2, 3],                                          // after Down
    &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
];

/// Default random environment: places the pending hint tile on the emptied
/// edge and draws a fresh hint from the bag.
pub struct RandomPlacer {
    props: Properties,
    rng: StdRng,
}

impl RandomPlacer {
    pub fn new(args: &str) -> Result<Self, AgentError> {
        let props = Properties::from_args("name=place role=placer", args);
        let rng = seeded_rng(&props)?;
        Ok(RandomPlacer { props, rng })
    }
}

impl Agent for RandomPlacer {
    fn props(&self) -> &Properties {
        &self.props
    }

    fn props_mut(&mut self) -> &mut Properties {
        &mut self.props
    }

    fn take_action(&mut self, board: &Board) -> Action {
        let region = match board.last() {
            Some(dir) => dir.index(),
            None => 4,
        };
        let mut space: Vec<usize> = SPACES[region].to_vec();
        space.shuffle(&mut self.rng);

        for pos in space {
            if board.cell(pos) != 0 {
                continue;
            }

            let mut bag: Vec<u8> = Vec::with_capacity(3);
            for rank in 1..=3u8 {
                for _ in 0..board.bag(rank) {
                    bag.push(rank);
                }
            }
            bag.shuffle(&mut self.rng);

            let tile = match board.hint() {
                0 => match bag.pop() {
                    Some(rank) => rank,
                    None => return Action::Pass,
                },
                pending => pending,
            };
            let hint = match bag.pop() {
                Some(rank) => rank,
                None => return Action::Pass,
            };

            return Action::Place { pos, tile, hint };
        }
        Action::Pass
    }
}

/// Random player: slides in a uniformly chosen legal direction.
pub struct RandomSlider {
    props: Properties,
    rng: StdRng,
}

impl RandomSlider {
    pub fn new(args: &str) -> Result<Self, AgentError> {
        let props = Properties::from_args("name=slide role=slider", args);
        let rng = seeded_rng(&props)?;
        Ok(RandomSlider { props, rng })
    }
}

impl Agent for RandomSlider {
    fn props(&self) -> &Properties {
        &self.props
    }

    fn props_mut(&mut self) -> &mut Properties {
        &mut self.props
    }

    fn take_action(&mut self, board: &Board) -> Action {
        let mut dirs = Move::ALL;
        dirs.shuffle(&mut self.rng);
        for dir in dirs {
            let mut probe = *board;
            if probe.slide(dir) != -1 {
                return Action::Slide(dir);
            }
        }
        Action::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placer_lands_on_empty_cells_and_respects_bag() {
        let mut placer = RandomPlacer::new("seed=42").unwrap();
        let mut board = Board::EMPTY;

        for _ in 0..12 {
            // snapshot the reported bag before the draw
            let counts = [board.bag(1), board.bag(2), board.bag(3)];
            let had_hint = board.hint();

            let action = placer.take_action(&board);
            let Action::Place { pos, tile, hint } = action else {
                panic!("placer must place while empty cells remain");
            };
            assert_eq!(board.cell(pos), 0);

            // the placed tile is the pending hint when one exists; drawn
            // tiles never exceed what the bag reported available
            if had_hint != 0 {
                assert_eq!(tile, had_hint);
                assert!(counts[hint as usize - 1] >= 1);
            } else if tile == hint {
                assert!(counts[tile as usize - 1] >= 2);
            } else {
                assert!(counts[tile as usize - 1] >= 1);
                assert!(counts[hint as usize - 1] >= 1);
            }

            assert_eq!(action.apply(&mut board), 0);
            assert_eq!(board.hint(), hint);
        }
    }

    #[test]
    fn placer_targets_the_emptied_edge() {
        let mut placer = RandomPlacer::new("seed=9").unwrap();
        // a slide LEFT empties the right column
        let mut board = Board::from_raw(0x0120_0000_0000_0000);
        assert_ne!(board.slide(Move::Left), -1);
        for _ in 0..8 {
            match placer.take_action(&board) {
                Action::Place { pos, .. } => assert!(SPACES[0].contains(&pos)),
                other => panic!("expected a placement, got {other}"),
            }
        }
    }

    #[test]
    fn placer_passes_on_full_board() {
        let mut placer = RandomPlacer::new("seed=1").unwrap();
        let board = Board::from_raw(0x1313_3131_1313_3131);
        assert!(placer.take_action(&board).is_pass());
    }

    #[test]
    fn slider_only_returns_legal_moves() {
        let mut slider = RandomSlider::new("seed=5").unwrap();
        // only DOWN is legal
        let board = Board::from_raw(0x1313_3131_1313_0000);
        for _ in 0..8 {
            assert_eq!(slider.take_action(&board), Action::Slide(Move::Down));
        }
    }

    #[test]
    fn slider_passes_when_locked() {
        let mut slider = RandomSlider::new("seed=5").unwrap();
        let board = Board::from_raw(0x1313_3131_1313_3131);
        assert!(slider.take_action(&board).is_pass());
    }

    #[test]
    fn seeded_agents_are_reproducible() {
        let board = Board::EMPTY;
        let mut a = RandomPlacer::new("seed=123").unwrap();
        let mut b = RandomPlacer::new("seed=123").unwrap();
        assert_eq!(a.take_action(&board), b.take_action(&board));
    }
}
