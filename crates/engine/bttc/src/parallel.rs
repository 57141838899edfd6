//! Level-synchronous parallel driver
//!
//! Sibling subtrees never interact, so each level of pending nodes can be
//! evaluated on the rayon pool at once. The faces form the same set as the
//! sequential driver's, in a different order. Every buffer grows through
//! fallible reservation, so running out of memory is reported as
//! [`BttcError::Allocation`](crate::BttcError::Allocation).

use rayon::prelude::*;

use crate::error::Result;
use crate::evaluator::Evaluator;
use crate::grid::Grid;
use crate::node::TriangleNode;
use crate::subdivide::{Subdivision, SubdivisionStats};

/// Subdivide `grid` using the rayon thread pool
pub fn subdivide_parallel(grid: &Grid<'_>, threshold: f64) -> Result<Subdivision> {
    let evaluator = Evaluator::new(grid, threshold)?;
    let size = grid.size();

    tracing::debug!(size, threshold, "subdividing grid in parallel");

    let mut frontier: Vec<TriangleNode> = Vec::new();
    frontier.try_reserve_exact(2)?;
    frontier.extend(TriangleNode::initial_pair(size));

    let mut next: Vec<TriangleNode> = Vec::new();
    let mut verdicts: Vec<bool> = Vec::new();
    let mut faces: Vec<TriangleNode> = Vec::new();
    let mut stats = SubdivisionStats::default();

    while !frontier.is_empty() {
        stats.evaluated += frontier.len();
        stats.peak_pending = stats.peak_pending.max(frontier.len());

        // Reserved up front so collecting the verdicts never reallocates
        verdicts.clear();
        verdicts.try_reserve_exact(frontier.len())?;
        frontier
            .par_iter()
            .map(|node| node.is_minimal() || evaluator.accepts(node))
            .collect_into_vec(&mut verdicts);

        let accepted = verdicts.iter().filter(|&&accept| accept).count();
        let rejected = frontier.len() - accepted;
        faces.try_reserve(accepted)?;
        next.clear();
        next.try_reserve_exact(2 * rejected)?;

        for (node, &accept) in frontier.iter().zip(&verdicts) {
            if accept {
                faces.push(*node);
            } else {
                next.extend(node.split());
            }
        }

        stats.splits += rejected;
        std::mem::swap(&mut frontier, &mut next);
    }

    Ok(Subdivision::new(size, faces, stats))
}
