//! Mode shape recovery.
//!
//! Eigenvectors come back over the reduced (free) DOFs; recovery
//! scatters them into full-DOF vectors with zeros at every prescribed
//! DOF and exposes per-node translation/rotation views.

use crate::error::SolverError;
use fv_model::{ModelError, DOFS_PER_NODE};
use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

/// Displacement of one node within a mode shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodalDisplacement {
    /// Translational components (ux, uy, uz)
    pub translation: Vector3<f64>,
    /// Rotational components (rx, ry, rz)
    pub rotation: Vector3<f64>,
}

impl NodalDisplacement {
    /// Euclidean magnitude of the translational part.
    pub fn magnitude(&self) -> f64 {
        self.translation.norm()
    }
}

/// A full-DOF mode shape: one value per global DOF, node-major with the
/// local order (ux, uy, uz, rx, ry, rz).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeShape {
    values: Vec<f64>,
}

impl ModeShape {
    /// All DOF values, node-major.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of nodes covered by this shape.
    pub fn num_nodes(&self) -> usize {
        self.values.len() / DOFS_PER_NODE
    }

    /// Displacement of the node at the given dense index.
    pub fn nodal(&self, node_index: usize) -> NodalDisplacement {
        let base = node_index * DOFS_PER_NODE;
        NodalDisplacement {
            translation: Vector3::new(
                self.values[base],
                self.values[base + 1],
                self.values[base + 2],
            ),
            rotation: Vector3::new(
                self.values[base + 3],
                self.values[base + 4],
                self.values[base + 5],
            ),
        }
    }

    /// Largest translational magnitude over all nodes.
    pub fn max_magnitude(&self) -> f64 {
        (0..self.num_nodes())
            .map(|i| self.nodal(i).magnitude())
            .fold(0.0, f64::max)
    }
}

/// Expand a reduced eigenvector to the full DOF set.
///
/// `free_dofs[i]` is the global DOF index of reduced entry `i`;
/// prescribed DOFs are filled with zero. A free-DOF index outside
/// [0, num_dofs) is rejected, not panicked on.
pub fn expand_mode(
    reduced: &DVector<f64>,
    free_dofs: &[usize],
    num_dofs: usize,
) -> Result<ModeShape, SolverError> {
    if reduced.len() != free_dofs.len() {
        return Err(SolverError::DimensionMismatch {
            k_dim: reduced.len(),
            m_dim: free_dofs.len(),
        });
    }

    let mut values = vec![0.0; num_dofs];
    for (i, &global_dof) in free_dofs.iter().enumerate() {
        if global_dof >= num_dofs {
            return Err(ModelError::InvalidDof {
                index: global_dof,
                num_dofs,
            }
            .into());
        }
        values[global_dof] = reduced[i];
    }
    Ok(ModeShape { values })
}
