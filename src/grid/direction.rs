use crate::math::{FracVec, TileVec};

/// One of the eight compass directions around a tile.
///
/// The index order is fixed: even indices are the four axis directions a
/// trace may run along, odd indices are diagonals (used only for double-wall
/// detection). Direction `d` and `d + 4` are mutual inverses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    West = 0,
    NorthWest = 1,
    North = 2,
    NorthEast = 3,
    East = 4,
    SouthEast = 5,
    South = 6,
    SouthWest = 7,
}

impl Direction {
    /// All eight directions in index order.
    pub const ALL: [Self; 8] = [
        Self::West,
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
    ];

    /// The four axis directions a run may extend along.
    pub const AXES: [Self; 4] = [Self::West, Self::North, Self::East, Self::South];

    /// The direction's fixed index.
    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Looks up a direction by index, wrapping modulo 8.
    #[must_use]
    pub fn from_index(index: u8) -> Self {
        Self::ALL[usize::from(index % 8)]
    }

    /// The opposite direction.
    #[must_use]
    pub fn inverse(self) -> Self {
        Self::from_index(self.index() + 4)
    }

    /// Whether this is one of the four cardinal directions.
    #[must_use]
    pub fn is_axis(self) -> bool {
        self.index() % 2 == 0
    }

    /// Whole-tile offset to the neighboring tile in this direction.
    #[must_use]
    pub fn tile_offset(self) -> TileVec {
        let (x, y) = match self {
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
        };
        TileVec::new(x, y)
    }

    /// Offset from a tile's center to its edge in this direction.
    #[must_use]
    pub fn frac_offset(self) -> FracVec {
        let tile = self.tile_offset();
        FracVec::new(f64::from(tile.x) * 0.5, f64::from(tile.y) * 0.5)
    }
}

/// A set of directions stored as an 8-bit mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionSet(u8);

impl DirectionSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// The set containing all eight directions.
    pub const FULL: Self = Self(0xFF);

    /// Whether `direction` is in the set.
    #[must_use]
    pub fn contains(self, direction: Direction) -> bool {
        self.0 & (1 << direction.index()) != 0
    }

    /// Adds `direction` to the set.
    pub fn insert(&mut self, direction: Direction) {
        self.0 |= 1 << direction.index();
    }

    /// Whether all eight directions are in the set.
    #[must_use]
    pub fn is_full(self) -> bool {
        self.0 == 0xFF
    }
}
