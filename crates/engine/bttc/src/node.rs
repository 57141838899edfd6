//! Right isosceles triangle nodes on the sample lattice
//!
//! Corners are always listed with the right-angle corner first and the two
//! hypotenuse endpoints second and third. The evaluator interpolates relative to
//! the first corner and the splitting rule bisects the edge between the other
//! two, so every constructor here preserves that order.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// A triangle identified by three lattice points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TriangleNode {
    pub corners: [IVec2; 3],
}

impl TriangleNode {
    /// Create a node from its right-angle corner and hypotenuse endpoints
    #[inline]
    pub const fn new(right_angle: IVec2, second: IVec2, third: IVec2) -> Self {
        Self {
            corners: [right_angle, second, third],
        }
    }

    /// Create from a flat `[x0, y0, x1, y1, x2, y2]` batch
    pub fn from_coords(coords: [i32; 6]) -> Self {
        Self::new(
            IVec2::new(coords[0], coords[1]),
            IVec2::new(coords[2], coords[3]),
            IVec2::new(coords[4], coords[5]),
        )
    }

    /// Flatten into a `[x0, y0, x1, y1, x2, y2]` batch
    pub fn to_coords(&self) -> [i32; 6] {
        let [a, b, c] = self.corners;
        [a.x, a.y, b.x, b.y, c.x, c.y]
    }

    /// The two triangles covering a grid of side `size`, sharing its diagonal
    ///
    /// `size` must already be validated; both triangles have their right angle
    /// at a grid corner.
    pub fn initial_pair(size: usize) -> [TriangleNode; 2] {
        let s = (size - 1) as i32;
        [
            Self::new(IVec2::new(0, 0), IVec2::new(0, s), IVec2::new(s, 0)),
            Self::new(IVec2::new(s, s), IVec2::new(s, 0), IVec2::new(0, s)),
        ]
    }

    #[inline]
    pub fn right_angle(&self) -> IVec2 {
        self.corners[0]
    }

    /// Endpoints of the edge opposite the right angle
    #[inline]
    pub fn hypotenuse(&self) -> (IVec2, IVec2) {
        (self.corners[1], self.corners[2])
    }

    /// Floor-averaged midpoint of the hypotenuse
    pub fn hypotenuse_midpoint(&self) -> IVec2 {
        let (b, c) = self.hypotenuse();
        IVec2::new((b.x + c.x).div_euclid(2), (b.y + c.y).div_euclid(2))
    }

    /// Bisect the hypotenuse into two children
    ///
    /// The midpoint becomes the right-angle corner of both children. The first
    /// child keeps the parent's second corner, the second child the parent's
    /// third corner.
    pub fn split(&self) -> [TriangleNode; 2] {
        let [a, b, c] = self.corners;
        let mid = self.hypotenuse_midpoint();
        [Self::new(mid, a, b), Self::new(mid, c, a)]
    }

    /// Inclusive axis-aligned bounding box as `(min, max)`
    pub fn bounding_box(&self) -> (IVec2, IVec2) {
        let [a, b, c] = self.corners;
        (a.min(b).min(c), a.max(b).max(c))
    }

    /// Twice the triangle's area, exact in lattice units
    pub fn doubled_area(&self) -> u64 {
        let [a, b, c] = self.corners;
        let (ux, uy) = ((b.x - a.x) as i64, (b.y - a.y) as i64);
        let (vx, vy) = ((c.x - a.x) as i64, (c.y - a.y) as i64);
        (ux * vy - uy * vx).unsigned_abs()
    }

    /// True for the smallest triangle the lattice can hold: unit axis-aligned legs
    ///
    /// Its bounding box holds only its own corners, so it always matches the
    /// linear model exactly.
    #[inline]
    pub fn is_minimal(&self) -> bool {
        self.doubled_area() <= 1
    }

    /// True when the three corners are collinear
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.doubled_area() == 0
    }

    /// Number of splits separating this node from an initial triangle of a `size` grid
    pub fn level(&self, size: usize) -> u32 {
        let s = (size - 1) as u64;
        let area = self.doubled_area().max(1);
        (s * s / area).trailing_zeros()
    }
}

impl From<[i32; 6]> for TriangleNode {
    fn from(coords: [i32; 6]) -> Self {
        Self::from_coords(coords)
    }
}

impl From<TriangleNode> for [i32; 6] {
    fn from(node: TriangleNode) -> Self {
        node.to_coords()
    }
}
