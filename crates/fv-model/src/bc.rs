//! Displacement boundary conditions.
//!
//! For this formulation a prescribed DOF is fixed at zero displacement.
//! DOFs can be prescribed one at a time or a full node (all 6 DOFs) at
//! once. Prescribing a DOF twice is rejected: a duplicate in the input
//! almost always means two constraints were aimed at different DOFs and
//! one of them missed.

use crate::error::ModelError;
use crate::mesh::DofMap;
use std::collections::BTreeSet;

/// Set of global DOF indices prescribed to zero displacement.
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditions {
    prescribed: BTreeSet<usize>,
}

impl BoundaryConditions {
    /// Create an empty boundary-condition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prescribe a single global DOF to zero displacement.
    ///
    /// An already-prescribed DOF is rejected. Range checking against
    /// the system size happens at reduction time; this only records
    /// the index.
    pub fn fix_dof(&mut self, global_dof: usize) -> Result<(), ModelError> {
        if !self.prescribed.insert(global_dof) {
            return Err(ModelError::DuplicateDof(global_dof));
        }
        Ok(())
    }

    /// Prescribe all six DOFs of a node to zero displacement.
    ///
    /// Fails without modifying the set if any of the node's DOFs is
    /// already prescribed.
    pub fn fix_node(&mut self, dof_map: &DofMap, node_id: i32) -> Result<(), ModelError> {
        let dofs = dof_map.node_dofs(node_id)?;
        if let Some(&dof) = dofs.iter().find(|dof| self.prescribed.contains(dof)) {
            return Err(ModelError::DuplicateDof(dof));
        }
        self.prescribed.extend(dofs);
        Ok(())
    }

    /// Prescribed global DOF indices in ascending order.
    pub fn prescribed_dofs(&self) -> impl Iterator<Item = usize> + '_ {
        self.prescribed.iter().copied()
    }

    /// Whether a given global DOF is prescribed.
    pub fn is_prescribed(&self, global_dof: usize) -> bool {
        self.prescribed.contains(&global_dof)
    }

    /// Number of prescribed DOFs.
    pub fn num_prescribed(&self) -> usize {
        self.prescribed.len()
    }

    /// True when nothing is prescribed.
    pub fn is_empty(&self) -> bool {
        self.prescribed.is_empty()
    }
}
