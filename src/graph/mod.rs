mod resolve;
mod segment;
mod trace;

pub use segment::ObstacleSegment;

use crate::grid::ObstacleGrid;

/// Converts a populated grid's occupancy into the minimal segment set.
///
/// Runs the two phases in order: neighbor resolution for every node, then
/// run tracing. Resolution rebuilds the direction masks from scratch, so
/// calling this again on the same grid reproduces the same segments.
pub fn compute_obstacle_graph(grid: &mut ObstacleGrid) -> Vec<ObstacleSegment> {
    resolve::resolve_neighbors(grid);
    trace::trace_segments(grid)
}
