use crate::types::{Coord, Day, SaveId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: Coord,
        y: Coord,
        width: u32,
        height: u32,
    },

    #[error("Cell ({x}, {y}) is already occupied")]
    CellOccupied { x: Coord, y: Coord },

    #[error("Not enough {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: String,
        required: f64,
        available: f64,
    },

    #[error("Unknown entity type '{id}'")]
    UnknownEntity { id: String },

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a save payload (or a fresh configuration) could not be turned into
/// a live simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("Grid has {actual} rows, config expects {expected}")]
    GridHeightMismatch { expected: u32, actual: usize },

    #[error("Grid row {row} has {actual} cells, config expects {expected}")]
    GridWidthMismatch {
        row: usize,
        expected: u32,
        actual: usize,
    },

    #[error("Cell ({x}, {y}) references unknown entity type '{id}'")]
    UnknownEntity { id: String, x: usize, y: usize },

    #[error("Invalid day {day}: days start at 1")]
    InvalidDay { day: Day },

    #[error("Duplicate entity type id '{id}' in catalog")]
    DuplicateEntity { id: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Malformed payload: {0}")]
    Malformed(String),

    #[error("Save {save_id} not found")]
    NotFound { save_id: SaveId },
}

pub type SimResult<T> = Result<T, SimError>;
