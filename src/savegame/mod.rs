mod parser;

pub use parser::parse_savegame;

use crate::grid::ObstacleKind;
use crate::math::{TileCoord, TileVec};

/// A light-emitting fixture on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    /// The tile the fixture illuminates from.
    pub position: TileCoord,
    /// Illumination radius in tiles.
    pub range: f64,
}

/// One obstacle placement request parsed from the savegame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub position: TileCoord,
    pub kind: ObstacleKind,
}

/// Everything the converter needs from one savegame map.
#[derive(Debug, Clone)]
pub struct MapData {
    /// The map's unique id, for diagnostics.
    pub map_id: Option<u32>,
    /// Grid dimensions.
    pub size: TileVec,
    /// Lower corner of the rendered image area.
    pub image_origin: TileCoord,
    /// Dimensions of the rendered image area.
    pub image_size: TileVec,
    /// Obstacle placements in document order.
    pub placements: Vec<Placement>,
    /// Light fixtures in document order.
    pub lights: Vec<LightSource>,
}
