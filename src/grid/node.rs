use crate::grid::direction::{Direction, DirectionSet};
use crate::math::TileCoord;

slotmap::new_key_type! {
    /// Unique identifier for an obstacle node in the grid arena.
    pub struct NodeId;
}

/// The material class of an occupied tile.
///
/// Constructed and natural-rock walls behave identically in the graph and
/// share the `Wall` kind. Only occupied tiles carry a node, so there is no
/// empty kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Wall,
    Window,
    Door,
}

/// Per-tile obstacle state.
///
/// Position and kind are fixed at placement; the two direction masks and the
/// derived neighbor counts are rewritten by neighbor resolution and consumed
/// by the tracer.
#[derive(Debug, Clone)]
pub struct NodeData {
    position: TileCoord,
    kind: ObstacleKind,
    neighbors: DirectionSet,
    traced: DirectionSet,
    all_neighbors: u8,
    cross_neighbors: u8,
}

impl NodeData {
    pub(crate) fn new(position: TileCoord, kind: ObstacleKind) -> Self {
        Self {
            position,
            kind,
            neighbors: DirectionSet::EMPTY,
            traced: DirectionSet::EMPTY,
            all_neighbors: 0,
            cross_neighbors: 0,
        }
    }

    /// The tile this node occupies.
    #[must_use]
    pub fn position(&self) -> TileCoord {
        self.position
    }

    /// The node's material class.
    #[must_use]
    pub fn kind(&self) -> ObstacleKind {
        self.kind
    }

    /// Whether a graph-adjacent node exists in `direction`.
    #[must_use]
    pub fn has_neighbor(&self, direction: Direction) -> bool {
        self.neighbors.contains(direction)
    }

    /// Whether the edge in `direction` was already consumed into a segment
    /// (or retired during resolution).
    #[must_use]
    pub fn was_traced(&self, direction: Direction) -> bool {
        self.traced.contains(direction)
    }

    /// Whether any direction is still eligible for a run.
    #[must_use]
    pub fn has_untraced_directions(&self) -> bool {
        !self.traced.is_full()
    }

    /// Number of graph-adjacent neighbors over all eight directions.
    #[must_use]
    pub fn all_neighbor_count(&self) -> u8 {
        self.all_neighbors
    }

    /// Number of graph-adjacent neighbors over the four axis directions.
    #[must_use]
    pub fn cross_neighbor_count(&self) -> u8 {
        self.cross_neighbors
    }

    pub(crate) fn mark_traced(&mut self, direction: Direction) {
        self.traced.insert(direction);
    }

    pub(crate) fn set_adjacency(
        &mut self,
        neighbors: DirectionSet,
        traced: DirectionSet,
        all_neighbors: u8,
        cross_neighbors: u8,
    ) {
        self.neighbors = neighbors;
        self.traced = traced;
        self.all_neighbors = all_neighbors;
        self.cross_neighbors = cross_neighbors;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fresh_node_has_no_adjacency() {
        let node = NodeData::new(TileCoord::new(3, 4), ObstacleKind::Door);
        assert_eq!(node.position(), TileCoord::new(3, 4));
        assert_eq!(node.kind(), ObstacleKind::Door);
        assert_eq!(node.all_neighbor_count(), 0);
        assert_eq!(node.cross_neighbor_count(), 0);
        assert!(node.has_untraced_directions());
        for direction in Direction::ALL {
            assert!(!node.has_neighbor(direction));
            assert!(!node.was_traced(direction));
        }
    }

    #[test]
    fn tracing_every_direction_exhausts_the_node() {
        let mut node = NodeData::new(TileCoord::new(0, 0), ObstacleKind::Wall);
        for direction in Direction::ALL {
            node.mark_traced(direction);
        }
        assert!(!node.has_untraced_directions());
    }
}
