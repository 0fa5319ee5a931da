//! Single-episode runner: alternates the placer and slider against one board.
//!
//! An episode opens with nine placements over the whole board, then repeats
//! slide-then-place until an action fails to apply. Both agents are bracketed
//! by `open_episode`/`close_episode`, which is where a learning slider runs
//! its weight update.

use crate::agent::Agent;
use crate::board::Board;

/// Number of tiles on the board before the first slide.
const OPENING_PLACEMENTS: usize = 9;

/// Outcome summary for one finished episode.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpisodeResult {
    /// Accumulated slide rewards.
    pub score: u64,
    /// Accepted slides.
    pub moves: u32,
    /// Highest tile rank on the final board.
    pub highest_rank: u8,
}

/// Play one episode to completion and return its summary.
pub fn run(placer: &mut dyn Agent, slider: &mut dyn Agent) -> EpisodeResult {
    let mut board = Board::EMPTY;

    placer.open_episode("");
    slider.open_episode("");

    for _ in 0..OPENING_PLACEMENTS {
        let action = placer.take_action(&board);
        if action.apply(&mut board) == -1 {
            break;
        }
    }

    let mut score = 0u64;
    let mut moves = 0u32;
    loop {
        let action = slider.take_action(&board);
        let reward = action.apply(&mut board);
        if reward == -1 {
            break;
        }
        score += reward as u64;
        moves += 1;

        let action = placer.take_action(&board);
        if action.apply(&mut board) == -1 {
            break;
        }
    }

    slider.close_episode("");
    placer.close_episode("");

    EpisodeResult {
        score,
        moves,
        highest_rank: board.highest_rank(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::heuristic::MergeScanSlider;
    use crate::agent::ntuple::NTupleSlider;
    use crate::agent::random::{RandomPlacer, RandomSlider};

    #[test]
    fn random_vs_random_terminates() {
        let mut placer = RandomPlacer::new("seed=1").unwrap();
        let mut slider = RandomSlider::new("seed=2").unwrap();
        let result = run(&mut placer, &mut slider);
        assert!(result.moves > 0);
        assert!(result.highest_rank >= 1);
    }

    #[test]
    fn heuristic_slider_plays_a_full_episode() {
        let mut placer = RandomPlacer::new("seed=3").unwrap();
        let mut slider = MergeScanSlider::new("");
        let result = run(&mut placer, &mut slider);
        assert!(result.moves > 0);
    }

    #[test]
    fn learning_slider_updates_weights_over_episodes() {
        let mut placer = RandomPlacer::new("seed=4").unwrap();
        let mut slider = NTupleSlider::new("alpha=0.025 seed=5").unwrap();

        for _ in 0..3 {
            let result = run(&mut placer, &mut slider);
            assert!(result.moves > 0);
        }

        // after closing episodes with nonzero alpha, some weights moved
        let weights = slider.weights();
        let touched = (0..weights.len()).any(|t| {
            (0..weights.table_len(t))
                .any(|i| weights.get(crate::weights::Slot { table: t, index: i }) != 0.0)
        });
        assert!(touched);
    }
}
