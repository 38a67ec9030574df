//! Recoverable errors surfaced by grid edits and the generation job.
use thiserror::Error;

use crate::index::Index3;

/// Why a grid edit was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("tile at {0:?} has kind None and can't be stored")]
    NoneKind(Index3),
    #[error("tile at {index:?} is outside the {count_x}x{count_y} grid bounds")]
    OutOfBounds {
        index: Index3,
        count_x: i32,
        count_y: i32,
    },
}

/// Why a [`crate::generation::GenerationJob`] didn't deliver a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation was cancelled")]
    Cancelled,
    #[error("generation worker exited without delivering a result")]
    WorkerDisconnected,
}

/// Why a query was turned down before any search ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryRejection {
    #[error("start and target are the same tile")]
    SameStartAndTarget,
    #[error("start tile is missing or not walkable")]
    StartNotWalkable,
    #[error("target tile is missing or not walkable")]
    TargetNotWalkable,
    #[error("target is further than the cost budget allows")]
    TargetBeyondMaxCost,
    #[error("target tile kind isn't in the allowed kinds")]
    TargetKindNotAllowed,
    #[error("target tile is occupied")]
    TargetOccupied,
}
