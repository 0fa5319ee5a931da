//! threes-ai: a Threes! game framework with pluggable decision agents
//!
//! This crate provides:
//! - A compact `Board` type for the 4x4 Threes! variant (packed nibbles,
//!   slide/merge mechanics, hint + tile-bag bookkeeping)
//! - Environment and player agents behind a common `Agent` contract:
//!   random placer/slider baselines, a merge-scan heuristic slider, and an
//!   n-tuple slider trained by a backward temporal-difference sweep
//! - Binary weight-table persistence (`weights` module)
//! - A single-episode runner (`episode` module) used by the CLI harness
//!
//! Quick start:
//! ```
//! use threes_ai::agent::random::{RandomPlacer, RandomSlider};
//! use threes_ai::episode;
//!
//! let mut placer = RandomPlacer::new("seed=7").unwrap();
//! let mut slider = RandomSlider::new("seed=11").unwrap();
//! let result = episode::run(&mut placer, &mut slider);
//! assert!(result.moves > 0);
//! ```
pub mod action;
pub mod agent;
pub mod board;
pub mod config;
pub mod episode;
pub mod weights;

pub use action::Action;
pub use agent::Agent;
pub use board::{Board, Move};
