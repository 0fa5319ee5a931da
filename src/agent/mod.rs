//! Agent implementations and the contract they share.
//!
//! An agent is constructed from a `key=value` argument string and then driven
//! through the episode lifecycle by the harness: `open_episode`, repeated
//! `take_action` calls against a shared board, `close_episode`. The four
//! lifecycle/action operations are the complete contract surface; the
//! `role` string ("placer" / "slider") is advisory metadata, not a type
//! discriminant.

pub mod heuristic;
pub mod ntuple;
pub mod random;

use crate::action::Action;
use crate::board::Board;
use crate::config::{ConfigError, Properties};
use crate::weights::WeightsError;

#[derive(thiserror::Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Weights(#[from] WeightsError),
    #[error("encoding {encoding} needs {needed} entries but table {table} holds {len}")]
    EncodingRange {
        encoding: usize,
        table: usize,
        needed: usize,
        len: usize,
    },
}

/// The capability set every agent exposes.
///
/// Implementations supply the property-map accessors; introspection and the
/// runtime `notify` mutator are provided on top of them, and each lifecycle
/// hook has a no-op (or null-action) default that concrete agents override
/// as needed.
pub trait Agent {
    fn props(&self) -> &Properties;
    fn props_mut(&mut self) -> &mut Properties;

    /// Agent name from configuration.
    fn name(&self) -> &str {
        self.props().get_or("name", "unknown")
    }

    /// Advisory role string from configuration.
    fn role(&self) -> &str {
        self.props().get_or("role", "unknown")
    }

    /// Read a configuration property; absent keys are a contract violation.
    fn property(&self, key: &str) -> Result<&str, ConfigError> {
        self.props().get(key)
    }

    /// Inject a runtime `key=value` fact, inserting or overwriting.
    fn notify(&mut self, msg: &str) {
        self.props_mut().notify(msg);
    }

    fn open_episode(&mut self, _flag: &str) {}

    fn close_episode(&mut self, _flag: &str) {}

    fn take_action(&mut self, _board: &Board) -> Action {
        Action::Pass
    }

    fn check_for_win(&self, _board: &Board) -> bool {
        false
    }
}
