//! Error type shared by the occupancy index, placer and pathfinder.

use thiserror::Error;

use crate::common::{Cell, ObstacleKind};

/// Failures surfaced to callers. A search that finds no route is not an
/// error: it comes back as `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NavError {
    #[error("cell {cell} is outside the {width}x{height} grid")]
    OutOfBounds {
        cell: Cell,
        width: usize,
        height: usize,
    },

    #[error("placed {placed}/{requested} {kind:?} obstacles, gave up after {attempts} attempts")]
    PlacementExhausted {
        kind: ObstacleKind,
        placed: usize,
        requested: usize,
        attempts: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, NavError>;
