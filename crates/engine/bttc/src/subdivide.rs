//! Subdivision driver
//!
//! Starts from the two triangles sharing the grid's diagonal and processes a
//! stack of pending nodes: each popped node is either accepted as a face or
//! split at its hypotenuse midpoint into two pending children.

use serde::{Deserialize, Serialize};

use crate::buffer::{NodeBuffer, INITIAL_CAPACITY};
use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::grid::Grid;
use crate::mesh::Mesh;
use crate::node::TriangleNode;

/// Parameters for a subdivision run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubdivideConfig {
    /// Largest accepted deviation between a sample and its triangle's plane
    pub threshold: f64,
    /// Starting capacity of the work list and face list, in nodes
    pub initial_capacity: usize,
}

impl Default for SubdivideConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            initial_capacity: INITIAL_CAPACITY,
        }
    }
}

impl SubdivideConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }
}

/// Counters collected while subdividing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdivisionStats {
    /// Nodes popped from the work list
    pub evaluated: usize,
    /// Nodes rejected and replaced by two children
    pub splits: usize,
    /// Nodes accepted as faces
    pub faces: usize,
    /// Deepest split level among the faces
    pub max_level: u32,
    /// Largest work list length observed
    pub peak_pending: usize,
}

/// Accepted faces of one run, in processing order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subdivision {
    size: usize,
    faces: Vec<TriangleNode>,
    stats: SubdivisionStats,
}

impl Subdivision {
    pub(crate) fn new(size: usize, faces: Vec<TriangleNode>, mut stats: SubdivisionStats) -> Self {
        stats.faces = faces.len();
        stats.max_level = faces.iter().map(|face| face.level(size)).max().unwrap_or(0);
        Self { size, faces, stats }
    }

    /// Side length of the grid that was subdivided
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn faces(&self) -> &[TriangleNode] {
        &self.faces
    }

    pub fn into_faces(self) -> Vec<TriangleNode> {
        self.faces
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn stats(&self) -> &SubdivisionStats {
        &self.stats
    }

    /// Faces flattened into `[x0, y0, x1, y1, x2, y2]` batches
    pub fn to_coords(&self) -> Vec<i32> {
        self.faces.iter().flat_map(|face| face.to_coords()).collect()
    }

    /// Sum of the faces' doubled areas; `2 * (size - 1)^2` for a full cover
    pub fn doubled_area(&self) -> u64 {
        self.faces.iter().map(TriangleNode::doubled_area).sum()
    }

    pub fn max_level(&self) -> u32 {
        self.stats.max_level
    }

    /// Merge shared corners into an indexed mesh
    pub fn to_mesh(&self, grid: &Grid<'_>) -> Mesh {
        Mesh::from_faces(&self.faces, grid)
    }
}

/// Runs the subdivision with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Subdivider {
    config: SubdivideConfig,
}

impl Subdivider {
    pub fn new(config: SubdivideConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SubdivideConfig {
        &self.config
    }

    /// Subdivide `grid` until every face is within the threshold
    pub fn run(&self, grid: &Grid<'_>) -> Result<Subdivision> {
        let evaluator = Evaluator::new(grid, self.config.threshold)?;
        let size = grid.size();

        tracing::debug!(size, threshold = self.config.threshold, "subdividing grid");

        let mut pending = NodeBuffer::with_capacity(self.config.initial_capacity)?;
        let mut faces = NodeBuffer::with_capacity(self.config.initial_capacity)?;
        for node in TriangleNode::initial_pair(size) {
            pending.push(node)?;
        }

        let mut stats = SubdivisionStats {
            peak_pending: pending.len(),
            ..SubdivisionStats::default()
        };

        while let Some(node) = pending.pop() {
            stats.evaluated += 1;

            if node.is_minimal() || evaluator.accepts(&node) {
                faces.push(node)?;
                continue;
            }

            let [first, second] = node.split();
            tracing::trace!(?node, midpoint = ?first.right_angle(), "splitting triangle");
            pending.push(first)?;
            pending.push(second)?;

            stats.splits += 1;
            stats.peak_pending = stats.peak_pending.max(pending.len());
        }

        let subdivision = Subdivision::new(size, faces.into_vec(), stats);
        tracing::debug!(
            faces = subdivision.len(),
            splits = stats.splits,
            max_level = subdivision.max_level(),
            "subdivision complete"
        );

        Ok(subdivision)
    }
}

/// Subdivide `grid` with the given threshold
pub fn subdivide(grid: &Grid<'_>, threshold: f64) -> Result<Subdivision> {
    Subdivider::new(SubdivideConfig::with_threshold(threshold)).run(grid)
}

/// Subdivide a raw row-major buffer with row stride `pitch`
///
/// Validates the inputs before allocating anything and returns the faces in
/// processing order.
pub fn subdivide_raw(
    samples: &[f64],
    pitch: usize,
    size: usize,
    threshold: f64,
) -> Result<Vec<TriangleNode>> {
    let grid = Grid::new(samples, pitch, size)?;
    subdivide(&grid, threshold).map(Subdivision::into_faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BttcError;
    use crate::grid::GridBuf;

    #[test]
    fn test_constant_grid_keeps_initial_pair() {
        let buf = GridBuf::from_fn(5, |_, _| 7.0);
        let grid = buf.as_grid().unwrap();
        let result = subdivide(&grid, 0.0).unwrap();

        assert_eq!(result.len(), 2);
        let stats = result.stats();
        assert_eq!(stats.evaluated, 2);
        assert_eq!(stats.splits, 0);
        assert_eq!(stats.max_level, 0);
        assert_eq!(stats.peak_pending, 2);
    }

    #[test]
    fn test_processing_order_is_last_in_first_out() {
        let buf = GridBuf::from_fn(3, |_, _| 1.0);
        let faces = subdivide(&buf.as_grid().unwrap(), 0.0).unwrap().into_faces();
        let [first, second] = TriangleNode::initial_pair(3);
        assert_eq!(faces, vec![second, first]);
    }

    #[test]
    fn test_counts_are_consistent() {
        let buf = GridBuf::from_fn(9, |x, y| ((x * 7 + y * 13) % 5) as f64);
        let result = subdivide(&buf.as_grid().unwrap(), 0.25).unwrap();
        let stats = result.stats();

        // Every split adds one net node to the two initial ones
        assert_eq!(stats.faces, 2 + stats.splits);
        assert_eq!(stats.evaluated, stats.faces + stats.splits);
        assert_eq!(result.doubled_area(), 2 * 8 * 8);
    }

    #[test]
    fn test_small_initial_capacity_grows() {
        let buf = GridBuf::from_fn(17, |x, y| ((x * y) % 3) as f64);
        let grid = buf.as_grid().unwrap();

        let tiny = Subdivider::new(SubdivideConfig {
            threshold: 0.0,
            initial_capacity: 1,
        })
        .run(&grid)
        .unwrap();
        let default = subdivide(&grid, 0.0).unwrap();

        assert_eq!(tiny.faces(), default.faces());
    }

    #[test]
    fn test_invalid_threshold_is_reported() {
        let buf = GridBuf::from_fn(3, |_, _| 0.0);
        let err = subdivide(&buf.as_grid().unwrap(), -0.5).unwrap_err();
        assert!(matches!(err, BttcError::InvalidThreshold(_)));
    }

    #[test]
    fn test_raw_entry_point_with_pitch() {
        // 3x3 grid stored with a pitch of 4; padding holds garbage
        let samples = [
            0.0, 0.0, 0.0, 99.0, //
            10.0, 0.0, 10.0, 99.0, //
            0.0, 0.0, 0.0,
        ];
        let faces = subdivide_raw(&samples, 4, 3, 0.5).unwrap();
        assert!(faces.len() >= 4);

        assert!(matches!(
            subdivide_raw(&samples, 4, 4, 0.5),
            Err(BttcError::InvalidSize { size: 4 })
        ));
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: SubdivideConfig = serde_json::from_str(r#"{"threshold": 12.5}"#).unwrap();
        assert_eq!(config.threshold, 12.5);
        assert_eq!(config.initial_capacity, INITIAL_CAPACITY);
    }

    #[test]
    fn test_to_coords_layout() {
        let buf = GridBuf::from_fn(3, |_, _| 0.0);
        let result = subdivide(&buf.as_grid().unwrap(), 0.0).unwrap();
        assert_eq!(result.to_coords(), vec![2, 2, 2, 0, 0, 2, 0, 0, 0, 2, 2, 0]);
    }
}
