//! B-tree triangular coding of square sample grids
//!
//! Approximates a grid of `2^m + 1` by `2^m + 1` samples with a mesh of right
//! isosceles triangles. A triangle becomes a face once the plane through its
//! three corner samples is within a threshold of every sample inside it;
//! otherwise it is split at the midpoint of its hypotenuse and both halves are
//! tried again.
//!
//! # Architecture
//!
//! - [`Grid`]: read-only view over a row-major buffer with a row stride
//! - [`TriangleNode`]: three lattice corners, right-angle corner first
//! - [`NodeBuffer`]: work list and face list storage, doubling on demand
//! - [`Evaluator`]: barycentric point-in-triangle test and plane error check
//! - [`Subdivider`]: the accept-or-split loop over a stack of pending nodes
//! - [`Mesh`]: optional pass merging shared corners into indexed vertices
//!
//! # Example
//!
//! ```
//! use bttc::{subdivide, GridBuf};
//!
//! let buf = GridBuf::from_fn(5, |x, y| if (x, y) == (2, 1) { 9.0 } else { 0.0 });
//! let grid = buf.as_grid()?;
//!
//! let result = subdivide(&grid, 0.5)?;
//! assert!(result.len() > 2);
//! assert_eq!(result.doubled_area(), 2 * 4 * 4);
//!
//! let mesh = result.to_mesh(&grid);
//! assert_eq!(mesh.triangle_count(), result.len());
//! # Ok::<(), bttc::BttcError>(())
//! ```
//!
//! # References
//!
//! Distasi, R.; Nappi, M.; Vitulano, S., "Image compression by B-tree
//! triangular coding", IEEE Transactions on Communications, vol. 45, no. 9,
//! pp. 1095-1100, Sep 1997.

pub mod buffer;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod mesh;
pub mod node;
pub mod subdivide;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use buffer::{NodeBuffer, INITIAL_CAPACITY};
pub use error::{BttcError, Result};
pub use evaluator::{BarycentricFrame, Evaluator, LinearModel, Weights};
pub use grid::{is_valid_size, Grid, GridBuf};
pub use mesh::{Mesh, MeshVertex};
pub use node::TriangleNode;
pub use subdivide::{
    subdivide, subdivide_raw, SubdivideConfig, Subdivider, Subdivision, SubdivisionStats,
};

#[cfg(feature = "parallel")]
pub use parallel::subdivide_parallel;

// Re-export glam for convenience
pub use glam;
