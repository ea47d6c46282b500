// Rating diagnostics and squad editing errors.

use serde::Serialize;
use thiserror::Error;

use crate::player::PlayerId;
use crate::position::PositionKey;

/// Non-fatal conditions hit while rating a squad. None of these abort the
/// aggregation; they are logged and reported alongside the result.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RatingIssue {
    #[error("player {player_id} is not on the roster")]
    MissingData { player_id: PlayerId },

    #[error("no weights configured for {position}, used general rating")]
    NoWeights { position: PositionKey },

    #[error("nothing to rate: no assignments or empty roster")]
    EmptyInput,

    #[error("player {player_id} has neither weighted metrics nor a general rating")]
    Unrated { player_id: PlayerId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquadError {
    #[error("slot index {index} out of range (squad has {len} slots)")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("player {player_id} is already the active player in slot {index}")]
    AlreadyActive { player_id: PlayerId, index: usize },

    #[error("player {player_id} is not an alternate for slot {index}")]
    NotAnAlternate { player_id: PlayerId, index: usize },

    #[error("unknown formation '{0}'")]
    UnknownFormation(String),
}
