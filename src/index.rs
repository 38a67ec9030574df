//! [`Index3`] is the integer coordinate every tile in the grid is keyed by.
use std::ops::{Add, Neg, Sub};

use bevy::math::{IVec2, IVec3};

/// Integer tile coordinate.
///
/// `x` and `y` are planar, `z` is a discrete height layer rather than a world height.
/// Ordering is lexicographic on `(x, y, z)` so indices can live in ordered containers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index3 {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Index3 {
    /// The origin tile `(0, 0, 0)`.
    pub const ZERO: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Index3 { x, y, z }
    }

    /// The `(x, y)` projection used as the key of the height-column index.
    pub const fn column(self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Returns this index moved by `dx`, `dy` on the plane, keeping the height layer.
    pub const fn planar_offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z)
    }

    /// Returns the same column at height layer `z`.
    pub const fn with_z(self, z: i32) -> Self {
        Self::new(self.x, self.y, z)
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }
}

impl From<IVec3> for Index3 {
    fn from(v: IVec3) -> Self {
        Index3::new(v.x, v.y, v.z)
    }
}

impl From<Index3> for IVec3 {
    fn from(index: Index3) -> Self {
        index.as_ivec3()
    }
}

impl From<(i32, i32, i32)> for Index3 {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Index3::new(x, y, z)
    }
}

impl Add for Index3 {
    type Output = Index3;

    fn add(self, rhs: Index3) -> Index3 {
        Index3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Index3 {
    type Output = Index3;

    fn sub(self, rhs: Index3) -> Index3 {
        Index3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for Index3 {
    type Output = Index3;

    fn neg(self) -> Index3 {
        Index3::new(-self.x, -self.y, -self.z)
    }
}
