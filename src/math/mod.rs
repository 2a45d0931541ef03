pub mod tile_pos;

pub use tile_pos::TilePos;

/// Integer tile coordinate on the map grid.
pub type TileCoord = nalgebra::Point2<i32>;

/// Integer offset between tile coordinates.
pub type TileVec = nalgebra::Vector2<i32>;

/// Sub-tile fractional offset from a tile's center.
pub type FracVec = nalgebra::Vector2<f64>;
