//! Neighbor resolution, the first phase of the graph computation.

use tracing::debug;

use crate::grid::{Direction, DirectionSet, NodeData, NodeId, ObstacleGrid};

/// Computes graph adjacency for every node in the grid.
///
/// Rebuilds both direction masks from scratch: directions without a kept
/// edge are retired into the traced mask immediately, as are the four
/// diagonals (they are never trace axes). Must complete for all nodes
/// before tracing starts: the double-wall scan reads neighbor kinds, and
/// the tracer consumes the masks seeded here.
pub(crate) fn resolve_neighbors(grid: &mut ObstacleGrid) {
    let ids: Vec<NodeId> = grid.order().to_vec();
    for &id in &ids {
        let (neighbors, traced, all_neighbors, cross_neighbors) = resolve_node(grid, id);
        grid.data_mut(id)
            .set_adjacency(neighbors, traced, all_neighbors, cross_neighbors);
    }
    debug!(nodes = ids.len(), "neighbor resolution complete");
}

fn resolve_node(grid: &ObstacleGrid, id: NodeId) -> (DirectionSet, DirectionSet, u8, u8) {
    let node = grid.data(id);
    let mut neighbors = DirectionSet::EMPTY;
    let mut traced = DirectionSet::EMPTY;
    let mut all_neighbors = 0_u8;
    let mut cross_neighbors = 0_u8;

    for direction in Direction::ALL {
        if !direction.is_axis() {
            // Diagonal edges are never walked; retire them up front so a
            // fully traced node means exactly that.
            traced.insert(direction);
        }

        let kept = match grid.node_at(node.position() + direction.tile_offset()) {
            Some(other_id) => {
                let other = grid.data(other_id);
                other.kind() == node.kind()
                    && !is_double_walled(grid, node, direction)
                    && !is_double_walled(grid, other, direction.inverse())
            }
            None => false,
        };

        if kept {
            neighbors.insert(direction);
            all_neighbors += 1;
            if direction.is_axis() {
                cross_neighbors += 1;
            }
        } else if direction.is_axis() {
            traced.insert(direction);
        }
    }

    (neighbors, traced, all_neighbors, cross_neighbors)
}

/// A node is double-walled toward `direction` when the half-circle of five
/// neighbor slots centered on that direction is fully occupied by nodes of
/// the same kind.
///
/// An edge between two such interiors belongs to the seam of a 2-tile-thick
/// wall; keeping it would trace a spurious parallel line along the seam.
fn is_double_walled(grid: &ObstacleGrid, node: &NodeData, direction: Direction) -> bool {
    let base = direction.index();
    for step in 0..5_u8 {
        // base - 2 .. base + 2, wrapped.
        let check = Direction::from_index(base + 6 + step);
        let same_kind = grid
            .node_at(node.position() + check.tile_offset())
            .is_some_and(|id| grid.data(id).kind() == node.kind());
        if !same_kind {
            return false;
        }
    }
    true
}
