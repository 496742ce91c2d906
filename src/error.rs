//! Engine error type

use thiserror::Error;

use crate::sim::GamePhase;

/// Errors surfaced by setup, tuning files and wire decoding.
///
/// Frame-time operations (`strike`, `update`, `reconcile`) never fail; they
/// log and skip instead.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a match needs at least one player")]
    NoPlayers,

    #[error("initial ball set has no cue ball (id 0)")]
    MissingCueBall,

    #[error("ball id {0} appears more than once in the initial ball set")]
    DuplicateBallId(u32),

    #[error("player id {0:?} appears more than once")]
    DuplicatePlayerId(String),

    #[error("setup is only allowed while waiting (current phase: {0:?})")]
    AlreadySetUp(GamePhase),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
