//! Boundary-condition reduction.
//!
//! Partitions the global DOFs into prescribed and free sets and extracts
//! the free-free submatrices of K and M by filtering triplets and
//! remapping indices. Sparsity is preserved; no dense intermediate is
//! formed.

use crate::assembly::GlobalMatrices;
use crate::error::SolverError;
use fv_model::{BoundaryConditions, ModelError};
use log::debug;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Global system restricted to its free DOFs.
#[derive(Debug, Clone)]
pub struct ReducedSystem {
    /// Free-free stiffness submatrix
    pub stiffness: CsrMatrix<f64>,
    /// Free-free mass submatrix
    pub mass: CsrMatrix<f64>,
    /// Global DOF index of each reduced row/column, ascending
    pub free_dofs: Vec<usize>,
}

impl ReducedSystem {
    /// Dimension of the reduced system.
    pub fn dim(&self) -> usize {
        self.free_dofs.len()
    }
}

/// Reduce the global system by eliminating prescribed DOFs.
///
/// Every prescribed index is validated against the system size before
/// anything is extracted. Prescribing all DOFs leaves nothing to solve
/// and is rejected as [`SolverError::EmptyFreeSet`].
pub fn reduce(
    global: &GlobalMatrices,
    bcs: &BoundaryConditions,
) -> Result<ReducedSystem, SolverError> {
    let num_dofs = global.num_dofs;

    for dof in bcs.prescribed_dofs() {
        if dof >= num_dofs {
            return Err(ModelError::InvalidDof {
                index: dof,
                num_dofs,
            }
            .into());
        }
    }

    // Ascending complement of the prescribed set; position in this list
    // is the reduced index.
    let free_dofs: Vec<usize> = (0..num_dofs).filter(|dof| !bcs.is_prescribed(*dof)).collect();
    if free_dofs.is_empty() {
        return Err(SolverError::EmptyFreeSet { num_dofs });
    }

    let mut reduced_index = vec![usize::MAX; num_dofs];
    for (reduced, &global_dof) in free_dofs.iter().enumerate() {
        reduced_index[global_dof] = reduced;
    }

    let stiffness = extract_free(&global.stiffness, &reduced_index, free_dofs.len());
    let mass = extract_free(&global.mass, &reduced_index, free_dofs.len());

    debug!(
        "reduced {} DOFs to {} free ({} prescribed)",
        num_dofs,
        free_dofs.len(),
        bcs.num_prescribed()
    );

    Ok(ReducedSystem {
        stiffness,
        mass,
        free_dofs,
    })
}

fn extract_free(matrix: &CsrMatrix<f64>, reduced_index: &[usize], dim: usize) -> CsrMatrix<f64> {
    let mut coo = CooMatrix::new(dim, dim);
    for (i, j, v) in matrix.triplet_iter() {
        let (ri, rj) = (reduced_index[i], reduced_index[j]);
        if ri != usize::MAX && rj != usize::MAX {
            coo.push(ri, rj, *v);
        }
    }
    CsrMatrix::from(&coo)
}
