use std::ops::{Add, Div, Sub};

use crate::math::{FracVec, TileCoord};

/// A tile coordinate with a sub-tile fractional offset.
///
/// The fractional part stays within `[-0.5, 0.5]` per axis; arithmetic
/// re-normalizes by carrying whole tiles into the integer part, so positions
/// near tile boundaries keep a canonical representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePos {
    pub tile: TileCoord,
    pub frac: FracVec,
}

impl TilePos {
    /// Creates a normalized position from a tile and a fractional offset.
    #[must_use]
    pub fn new(tile: TileCoord, frac: FracVec) -> Self {
        let mut pos = Self { tile, frac };
        pos.normalize();
        pos
    }

    /// Position at the center of a tile.
    #[must_use]
    pub fn center(tile: TileCoord) -> Self {
        Self {
            tile,
            frac: FracVec::zeros(),
        }
    }

    /// Collapses tile and fraction into plain map coordinates.
    #[must_use]
    pub fn to_map(self) -> (f64, f64) {
        (
            f64::from(self.tile.x) + self.frac.x,
            f64::from(self.tile.y) + self.frac.y,
        )
    }

    fn normalize(&mut self) {
        for axis in 0..2 {
            while self.frac[axis] > 0.5 {
                self.frac[axis] -= 1.0;
                self.tile[axis] += 1;
            }
            while self.frac[axis] < -0.5 {
                self.frac[axis] += 1.0;
                self.tile[axis] -= 1;
            }
        }
    }
}

impl From<TileCoord> for TilePos {
    fn from(tile: TileCoord) -> Self {
        Self::center(tile)
    }
}

impl Add for TilePos {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.tile += rhs.tile.coords;
        self.frac += rhs.frac;
        self.normalize();
        self
    }
}

impl Sub for TilePos {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self.tile -= rhs.tile.coords;
        self.frac -= rhs.frac;
        self.normalize();
        self
    }
}

impl Div<f64> for TilePos {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        let (x, y) = self.to_map();
        Self::new(TileCoord::new(0, 0), FracVec::new(x / rhs, y / rhs))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_wraps_fractional_overflow() {
        let pos = TilePos::new(TileCoord::new(2, 3), FracVec::new(0.75, -1.25));
        assert_eq!(pos.tile, TileCoord::new(3, 2));
        assert_relative_eq!(pos.frac.x, -0.25);
        assert_relative_eq!(pos.frac.y, -0.25);
    }

    #[test]
    fn half_offsets_stay_unwrapped() {
        let pos = TilePos::new(TileCoord::new(0, 0), FracVec::new(0.5, -0.5));
        assert_eq!(pos.tile, TileCoord::new(0, 0));
        assert_relative_eq!(pos.frac.x, 0.5);
        assert_relative_eq!(pos.frac.y, -0.5);
    }

    #[test]
    fn add_carries_whole_tiles() {
        let a = TilePos::new(TileCoord::new(1, 1), FracVec::new(0.5, 0.5));
        let b = TilePos::new(TileCoord::new(2, 0), FracVec::new(0.25, 0.25));
        let sum = a + b;
        assert_eq!(sum.tile, TileCoord::new(4, 2));
        assert_relative_eq!(sum.frac.x, -0.25);
        assert_relative_eq!(sum.frac.y, -0.25);
    }

    #[test]
    fn sub_is_inverse_of_add() {
        let a = TilePos::new(TileCoord::new(5, 7), FracVec::new(0.25, -0.25));
        let b = TilePos::new(TileCoord::new(2, 3), FracVec::new(-0.5, 0.5));
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn div_averages_map_coordinates() {
        let a = TilePos::center(TileCoord::new(4, 2));
        let b = TilePos::center(TileCoord::new(5, 2));
        let mid = (a + b) / 2.0;
        assert_eq!(mid.to_map(), (4.5, 2.0));
    }

    #[test]
    fn to_map_combines_tile_and_fraction() {
        let pos = TilePos::new(TileCoord::new(3, -1), FracVec::new(-0.5, 0.25));
        assert_eq!(pos.to_map(), (2.5, -0.75));
    }
}
