//! Mesh data structures for frame modal analysis.
//!
//! Nodes and elements carry arbitrary integer IDs (they arrive from an
//! external geometry layer and need not be contiguous). Internally the
//! mesh maps every node ID to a dense index in insertion order; all DOF
//! arithmetic runs on dense indices and the ID mapping is kept only at
//! the boundary.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Degrees of freedom tracked per node: 3 translations + 3 rotations.
pub const DOFS_PER_NODE: usize = 6;

/// A node in the frame mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node ID (unique, not necessarily contiguous)
    pub id: i32,
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Node {
    /// Create a new node.
    pub fn new(id: i32, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }

    /// Get coordinates as an array.
    pub fn coords(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// A 2-node beam element.
///
/// Node order matters: the local x-axis runs from `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamElement {
    /// Element ID (unique, not necessarily contiguous)
    pub id: i32,
    /// Start node ID
    pub start: i32,
    /// End node ID
    pub end: i32,
    /// Index into the analysis property table (material + section)
    pub property: usize,
}

impl BeamElement {
    /// Create a new beam element.
    pub fn new(id: i32, start: i32, end: i32, property: usize) -> Self {
        Self {
            id,
            start,
            end,
            property,
        }
    }
}

/// Bijection from (node ID, local DOF 0..5) to global DOF indices.
///
/// Built once from node insertion order; stable for the lifetime of the
/// mesh it was derived from.
#[derive(Debug, Clone)]
pub struct DofMap {
    node_index: HashMap<i32, usize>,
    num_dofs: usize,
}

impl DofMap {
    /// Total number of global DOFs.
    pub fn num_dofs(&self) -> usize {
        self.num_dofs
    }

    /// Dense node index for a node ID.
    pub fn node_index(&self, node_id: i32) -> Result<usize, ModelError> {
        self.node_index
            .get(&node_id)
            .copied()
            .ok_or(ModelError::UnknownNode(node_id))
    }

    /// Global DOF index for (node ID, local DOF).
    ///
    /// `local` must be in 0..6.
    pub fn global_dof(&self, node_id: i32, local: usize) -> Result<usize, ModelError> {
        debug_assert!(local < DOFS_PER_NODE);
        Ok(self.node_index(node_id)? * DOFS_PER_NODE + local)
    }

    /// All six global DOF indices of a node, in local order.
    pub fn node_dofs(&self, node_id: i32) -> Result<[usize; DOFS_PER_NODE], ModelError> {
        let base = self.node_index(node_id)? * DOFS_PER_NODE;
        Ok([base, base + 1, base + 2, base + 3, base + 4, base + 5])
    }
}

/// Frame mesh: nodes plus beam connectivity.
///
/// Owns the node and element records for one analysis session; immutable
/// once handed to the solver.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    nodes: Vec<Node>,
    node_index: HashMap<i32, usize>,
    elements: Vec<BeamElement>,
    element_index: HashMap<i32, usize>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the mesh.
    pub fn add_node(&mut self, node: Node) -> Result<(), ModelError> {
        if self.node_index.contains_key(&node.id) {
            return Err(ModelError::DuplicateNode(node.id));
        }
        self.node_index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Add a beam element to the mesh.
    ///
    /// Both endpoint nodes must already exist.
    pub fn add_element(&mut self, element: BeamElement) -> Result<(), ModelError> {
        if self.element_index.contains_key(&element.id) {
            return Err(ModelError::DuplicateElement(element.id));
        }
        for node_id in [element.start, element.end] {
            if !self.node_index.contains_key(&node_id) {
                return Err(ModelError::UnknownNode(node_id));
            }
        }
        self.element_index.insert(element.id, self.elements.len());
        self.elements.push(element);
        Ok(())
    }

    /// All nodes in insertion (dense-index) order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All elements in insertion order.
    pub fn elements(&self) -> &[BeamElement] {
        &self.elements
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of global DOFs (6 per node).
    pub fn num_dofs(&self) -> usize {
        self.nodes.len() * DOFS_PER_NODE
    }

    /// Get a node by ID.
    pub fn node(&self, id: i32) -> Option<&Node> {
        self.node_index.get(&id).map(|&i| &self.nodes[i])
    }

    /// Get a node by dense index.
    pub fn node_at(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Get an element by ID.
    pub fn element(&self, id: i32) -> Option<&BeamElement> {
        self.element_index.get(&id).map(|&i| &self.elements[i])
    }

    /// Build the DOF map from the current node set.
    pub fn dof_map(&self) -> DofMap {
        DofMap {
            node_index: self.node_index.clone(),
            num_dofs: self.num_dofs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
        mesh.add_node(Node::new(2, 1.0, 0.0, 0.0)).unwrap();
        mesh
    }

    #[test]
    fn node_creation() {
        let node = Node::new(1, 0.5, 1.0, 2.0);
        assert_eq!(node.id, 1);
        assert_eq!(node.coords(), [0.5, 1.0, 2.0]);
    }

    #[test]
    fn mesh_counts_dofs() {
        let mesh = two_node_mesh();
        assert_eq!(mesh.num_nodes(), 2);
        assert_eq!(mesh.num_dofs(), 12);
    }

    #[test]
    fn duplicate_node_rejected() {
        let mut mesh = two_node_mesh();
        let result = mesh.add_node(Node::new(1, 2.0, 0.0, 0.0));
        assert_eq!(result, Err(ModelError::DuplicateNode(1)));
    }

    #[test]
    fn element_requires_existing_nodes() {
        let mut mesh = two_node_mesh();
        let result = mesh.add_element(BeamElement::new(1, 1, 3, 0));
        assert_eq!(result, Err(ModelError::UnknownNode(3)));
    }

    #[test]
    fn duplicate_element_rejected() {
        let mut mesh = two_node_mesh();
        mesh.add_element(BeamElement::new(1, 1, 2, 0)).unwrap();
        let result = mesh.add_element(BeamElement::new(1, 2, 1, 0));
        assert_eq!(result, Err(ModelError::DuplicateElement(1)));
    }

    #[test]
    fn dof_map_uses_insertion_order() {
        let mut mesh = Mesh::new();
        // Deliberately non-contiguous, out-of-order IDs
        mesh.add_node(Node::new(10, 0.0, 0.0, 0.0)).unwrap();
        mesh.add_node(Node::new(3, 1.0, 0.0, 0.0)).unwrap();

        let map = mesh.dof_map();
        assert_eq!(map.num_dofs(), 12);
        assert_eq!(map.node_dofs(10).unwrap(), [0, 1, 2, 3, 4, 5]);
        assert_eq!(map.node_dofs(3).unwrap(), [6, 7, 8, 9, 10, 11]);
        assert_eq!(map.global_dof(3, 2).unwrap(), 8);
    }

    #[test]
    fn dof_map_unknown_node() {
        let mesh = two_node_mesh();
        let map = mesh.dof_map();
        assert_eq!(map.node_dofs(99), Err(ModelError::UnknownNode(99)));
    }
}
