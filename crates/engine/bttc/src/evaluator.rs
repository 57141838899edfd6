//! Per-triangle acceptance test
//!
//! A triangle is acceptable when the plane through its three corner samples
//! reproduces every sample inside it to within the threshold. Membership and
//! interpolation share the same barycentric weights, which are derived from
//! dot products computed once per triangle.
//!
//! Reference for the point-in-triangle method:
//! <http://www.blackpawn.com/texts/pointinpoly/default.html>

use glam::IVec2;

use crate::error::{BttcError, Result};
use crate::grid::Grid;
use crate::node::TriangleNode;

/// Barycentric weights of a point relative to the second and third corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub second: f64,
    pub third: f64,
}

impl Weights {
    /// Inside test, boundary included
    #[inline]
    pub fn is_inside(&self) -> bool {
        self.second >= 0.0 && self.third >= 0.0 && self.second + self.third <= 1.0
    }
}

/// Edge vectors and dot products of one triangle, hoisted out of the point loop
#[derive(Debug, Clone, Copy)]
pub struct BarycentricFrame {
    origin: IVec2,
    to_third: IVec2,
    to_second: IVec2,
    dot00: f64,
    dot01: f64,
    dot11: f64,
    denom: f64,
}

impl BarycentricFrame {
    /// Precompute the frame, or `None` for collinear corners
    pub fn new(node: &TriangleNode) -> Option<Self> {
        let [origin, second, third] = node.corners;
        let to_third = third - origin;
        let to_second = second - origin;

        let dot00 = dot(to_third, to_third);
        let dot01 = dot(to_third, to_second);
        let dot11 = dot(to_second, to_second);
        let denom = dot00 * dot11 - dot01 * dot01;
        if denom == 0.0 {
            return None;
        }

        Some(Self {
            origin,
            to_third,
            to_second,
            dot00,
            dot01,
            dot11,
            denom,
        })
    }

    /// Weights of `point`; exactly 0 or 1 at the corners
    #[inline]
    pub fn weights(&self, point: IVec2) -> Weights {
        let offset = point - self.origin;
        let dot02 = dot(self.to_third, offset);
        let dot12 = dot(self.to_second, offset);
        Weights {
            third: (self.dot11 * dot02 - self.dot01 * dot12) / self.denom,
            second: (self.dot00 * dot12 - self.dot01 * dot02) / self.denom,
        }
    }
}

#[inline]
fn dot(a: IVec2, b: IVec2) -> f64 {
    (a.x as i64 * b.x as i64 + a.y as i64 * b.y as i64) as f64
}

/// Plane through the three corner samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    pub corners: [f64; 3],
}

impl LinearModel {
    pub fn new(node: &TriangleNode, grid: &Grid<'_>) -> Self {
        Self {
            corners: node.corners.map(|corner| grid.sample_at(corner)),
        }
    }

    /// Model value at the given weights
    ///
    /// Written as a weighted sum rather than `c0 + w1(c1-c0) + w2(c2-c0)` so that
    /// the corners reproduce their samples bit for bit. Both forms describe the
    /// same plane but round differently, so a deviation lying exactly on the
    /// threshold may be accepted by one form and rejected by the other.
    #[inline]
    pub fn value(&self, weights: Weights) -> f64 {
        let [c0, c1, c2] = self.corners;
        let first = 1.0 - weights.second - weights.third;
        first * c0 + weights.second * c1 + weights.third * c2
    }
}

/// Checks triangles against a grid with a fixed error threshold
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'g, 'a> {
    grid: &'g Grid<'a>,
    threshold: f64,
}

impl<'g, 'a> Evaluator<'g, 'a> {
    /// Create an evaluator; the threshold must be finite and non-negative
    pub fn new(grid: &'g Grid<'a>, threshold: f64) -> Result<Self> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(BttcError::InvalidThreshold(threshold));
        }
        Ok(Self { grid, threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn grid(&self) -> &Grid<'a> {
        self.grid
    }

    /// True if every grid point inside `node` is within the threshold of the model
    ///
    /// Stops at the first point that is not. A collinear node has no interior
    /// and is accepted.
    pub fn accepts(&self, node: &TriangleNode) -> bool {
        let model = LinearModel::new(node, self.grid);
        inside_points(node).all(|(point, weights)| {
            (self.grid.sample_at(point) - model.value(weights)).abs() <= self.threshold
        })
    }

    /// Largest absolute deviation between the grid and the model inside `node`
    pub fn max_error(&self, node: &TriangleNode) -> f64 {
        let model = LinearModel::new(node, self.grid);
        inside_points(node)
            .map(|(point, weights)| (self.grid.sample_at(point) - model.value(weights)).abs())
            .fold(0.0, f64::max)
    }
}

/// Lattice points of the bounding box that fall inside `node`, with their weights
pub fn inside_points(node: &TriangleNode) -> impl Iterator<Item = (IVec2, Weights)> {
    let frame = BarycentricFrame::new(node);
    let (min, max) = node.bounding_box();

    frame.into_iter().flat_map(move |frame| {
        (min.x..=max.x).flat_map(move |x| {
            (min.y..=max.y).filter_map(move |y| {
                let point = IVec2::new(x, y);
                let weights = frame.weights(point);
                weights.is_inside().then_some((point, weights))
            })
        })
    })
}
