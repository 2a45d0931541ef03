use thiserror::Error;

use crate::math::TileCoord;

/// Top-level error type for the tilesight converter.
#[derive(Debug, Error)]
pub enum TilesightError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Savegame(#[from] SavegameError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Errors related to the obstacle grid and its index.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("position ({}, {}) is outside the {width}x{height} map", position.x, position.y)]
    InvalidPosition {
        position: TileCoord,
        width: i32,
        height: i32,
    },

    #[error("tile ({}, {}) already holds an obstacle", position.x, position.y)]
    Conflict { position: TileCoord },

    #[error("too many obstacles on map (current: {current}, limit: {limit})")]
    Capacity { current: usize, limit: usize },
}

/// Errors related to savegame ingestion.
#[derive(Debug, Error)]
pub enum SavegameError {
    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("missing required element: {element} in {context}")]
    MissingElement {
        element: &'static str,
        context: &'static str,
    },

    #[error("malformed {what}: {text:?}")]
    Malformed { what: &'static str, text: String },

    #[error("unknown wall-light rotation: {0}")]
    UnknownRotation(i64),
}

/// Errors related to UVTT export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read map image: {0}")]
    Image(#[source] std::io::Error),

    #[error("failed to write document: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for results using [`TilesightError`].
pub type Result<T> = std::result::Result<T, TilesightError>;
