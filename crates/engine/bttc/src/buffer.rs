//! Growable node buffers backing the work list and the face list

use crate::error::Result;
use crate::node::TriangleNode;

/// Capacity, in nodes, that each buffer starts with
pub const INITIAL_CAPACITY: usize = 256;

/// Owned sequence of triangle nodes that doubles its capacity when full
///
/// Growth goes through fallible reservation, so running out of memory is
/// reported as [`crate::BttcError::Allocation`] instead of aborting or dropping
/// nodes.
#[derive(Debug, Clone, Default)]
pub struct NodeBuffer {
    nodes: Vec<TriangleNode>,
}

impl NodeBuffer {
    /// Create a buffer with [`INITIAL_CAPACITY`]
    pub fn new() -> Result<Self> {
        Self::with_capacity(INITIAL_CAPACITY)
    }

    /// Create a buffer with room for `capacity` nodes (at least one)
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(capacity.max(1))?;
        Ok(Self { nodes })
    }

    /// Append a node, doubling the capacity first if the buffer is full
    pub fn push(&mut self, node: TriangleNode) -> Result<()> {
        if self.nodes.len() == self.nodes.capacity() {
            let additional = self.nodes.capacity().max(1);
            self.nodes.try_reserve_exact(additional)?;
            tracing::trace!(capacity = self.nodes.capacity(), "node buffer grown");
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Remove and return the most recently pushed node
    #[inline]
    pub fn pop(&mut self) -> Option<TriangleNode> {
        self.nodes.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn as_slice(&self) -> &[TriangleNode] {
        &self.nodes
    }

    /// Hand the stored nodes to the caller
    pub fn into_vec(self) -> Vec<TriangleNode> {
        self.nodes
    }
}
