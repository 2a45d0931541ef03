use crate::grid::ObstacleKind;
use crate::math::TilePos;

/// One line segment of the computed obstacle graph.
///
/// Endpoints carry a sub-tile fractional offset so a segment can terminate
/// at a tile edge instead of its center. Consumers treat the emitted
/// sequence as an unordered set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSegment {
    /// The two endpoints, in walk order.
    pub ends: [TilePos; 2],
    /// The material the segment represents.
    pub kind: ObstacleKind,
}
