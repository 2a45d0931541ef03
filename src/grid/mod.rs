pub mod direction;
pub mod node;

pub use direction::{Direction, DirectionSet};
pub use node::{NodeData, NodeId, ObstacleKind};

use slotmap::SlotMap;

use crate::error::GridError;
use crate::math::{TileCoord, TileVec};

/// Maximum number of nodes a grid may hold.
///
/// The coordinate index is sized for a 16-bit node space with one value
/// reserved as the empty marker.
pub const MAX_NODES: usize = 65_534;

/// Sparse occupancy grid over a fixed-size tile map.
///
/// Nodes live in an arena addressed by stable [`NodeId`]s; a dense
/// coordinate index maps tiles to ids. Bounds-checking and occupancy are
/// unified behind [`ObstacleGrid::node_at`], so callers never need a
/// separate validity check.
#[derive(Debug)]
pub struct ObstacleGrid {
    nodes: SlotMap<NodeId, NodeData>,
    order: Vec<NodeId>,
    index: Vec<Option<NodeId>>,
    size: TileVec,
}

impl ObstacleGrid {
    /// Creates an empty grid of the given dimensions.
    #[must_use]
    pub fn new(size: TileVec) -> Self {
        let width = usize::try_from(size.x.max(0)).unwrap_or(0);
        let height = usize::try_from(size.y.max(0)).unwrap_or(0);
        Self {
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            index: vec![None; width * height],
            size,
        }
    }

    /// The grid dimensions.
    #[must_use]
    pub fn size(&self) -> TileVec {
        self.size
    }

    /// Number of placed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no node has been placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether `position` lies within the map bounds.
    #[must_use]
    pub fn is_valid_position(&self, position: TileCoord) -> bool {
        position.x >= 0 && position.y >= 0 && position.x < self.size.x && position.y < self.size.y
    }

    /// Places an obstacle, returning the new node's id.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidPosition`] for an out-of-bounds position,
    /// [`GridError::Conflict`] if the tile already holds a node (the existing
    /// node is left untouched), and [`GridError::Capacity`] once the node
    /// count would exceed [`MAX_NODES`].
    pub fn place(&mut self, position: TileCoord, kind: ObstacleKind) -> Result<NodeId, GridError> {
        let Some(slot) = self.slot_of(position) else {
            return Err(GridError::InvalidPosition {
                position,
                width: self.size.x,
                height: self.size.y,
            });
        };
        if self.index[slot].is_some() {
            return Err(GridError::Conflict { position });
        }
        if self.nodes.len() >= MAX_NODES {
            return Err(GridError::Capacity {
                current: self.nodes.len(),
                limit: MAX_NODES,
            });
        }

        let id = self.nodes.insert(NodeData::new(position, kind));
        self.order.push(id);
        self.index[slot] = Some(id);
        Ok(id)
    }

    /// Looks up the node occupying `position`.
    ///
    /// Out-of-bounds and unoccupied positions both resolve to `None`.
    #[must_use]
    pub fn node_at(&self, position: TileCoord) -> Option<NodeId> {
        self.slot_of(position).and_then(|slot| self.index[slot])
    }

    /// Returns the node data for `id`, if the id is live.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Looks up the id of the node adjacent to `id` in `direction`.
    #[must_use]
    pub fn neighbor_of(&self, id: NodeId, direction: Direction) -> Option<NodeId> {
        self.node_at(self.nodes[id].position() + direction.tile_offset())
    }

    /// Iterates nodes in placement order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeData)> + '_ {
        self.order.iter().map(move |&id| (id, &self.nodes[id]))
    }

    pub(crate) fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id]
    }

    fn slot_of(&self, position: TileCoord) -> Option<usize> {
        if !self.is_valid_position(position) {
            return None;
        }
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        let width = usize::try_from(self.size.x).ok()?;
        Some(y * width + x)
    }
}
