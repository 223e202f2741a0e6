//! Global sparse matrix assembly.
//!
//! Element matrices are formulated independently (in parallel, via
//! rayon) and scattered into COO triplet lists, where duplicate
//! (row, col) entries from shared nodes accumulate by summation. The
//! triplet lists are then compressed to CSR for reduction and solving.

use crate::elements::{formulate_beam, ElementMatrices};
use crate::error::SolverError;
use fv_model::{BeamProperty, Mesh, ModelError};
use log::{debug, warn};
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use rayon::prelude::*;

/// Relative off-diagonal asymmetry tolerated before assembly is
/// considered broken.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Assembled global system: sparse stiffness and mass over all DOFs.
#[derive(Debug, Clone)]
pub struct GlobalMatrices {
    /// Global stiffness matrix (CSR)
    pub stiffness: CsrMatrix<f64>,
    /// Global mass matrix (CSR)
    pub mass: CsrMatrix<f64>,
    /// Total number of degrees of freedom
    pub num_dofs: usize,
}

/// Assemble global K and M from the mesh and its property table.
///
/// Formulation is embarrassingly parallel across elements; the
/// scatter-add merge into the shared triplet lists is sequential so
/// overlapping contributions at shared nodes sum without lost updates.
pub fn assemble(mesh: &Mesh, properties: &[BeamProperty]) -> Result<GlobalMatrices, SolverError> {
    let dof_map = mesh.dof_map();
    let num_dofs = mesh.num_dofs();

    let element_matrices: Vec<ElementMatrices> = mesh
        .elements()
        .par_iter()
        .map(|element| {
            let property = properties.get(element.property).ok_or(
                ModelError::UnknownProperty {
                    element: element.id,
                    property: element.property,
                },
            )?;
            let start = mesh
                .node(element.start)
                .ok_or(ModelError::UnknownNode(element.start))?;
            let end = mesh
                .node(element.end)
                .ok_or(ModelError::UnknownNode(element.end))?;

            let start_dofs = dof_map.node_dofs(element.start)?;
            let end_dofs = dof_map.node_dofs(element.end)?;
            let mut dofs = [0usize; 12];
            dofs[..6].copy_from_slice(&start_dofs);
            dofs[6..].copy_from_slice(&end_dofs);

            formulate_beam(element, start, end, property, dofs)
        })
        .collect::<Result<_, SolverError>>()?;

    let mut k_coo = CooMatrix::new(num_dofs, num_dofs);
    let mut m_coo = CooMatrix::new(num_dofs, num_dofs);

    for em in &element_matrices {
        for i in 0..12 {
            for j in 0..12 {
                let kv = em.stiffness[(i, j)];
                if kv != 0.0 {
                    k_coo.push(em.dofs[i], em.dofs[j], kv);
                }
                let mv = em.mass[(i, j)];
                if mv != 0.0 {
                    m_coo.push(em.dofs[i], em.dofs[j], mv);
                }
            }
        }
    }

    // Duplicate (row, col) triplets are summed during compression
    let stiffness = CsrMatrix::from(&k_coo);
    let mass = CsrMatrix::from(&m_coo);

    debug!(
        "assembled {} DOFs from {} elements (K nnz = {}, M nnz = {})",
        num_dofs,
        mesh.elements().len(),
        stiffness.nnz(),
        mass.nnz()
    );

    check_symmetry("stiffness", &stiffness);
    check_symmetry("mass", &mass);

    Ok(GlobalMatrices {
        stiffness,
        mass,
        num_dofs,
    })
}

/// Largest |a_ij − a_ji| relative to the largest entry magnitude.
pub fn symmetry_defect(matrix: &CsrMatrix<f64>) -> f64 {
    let mut max_abs = 0.0f64;
    let mut max_defect = 0.0f64;
    for (i, j, v) in matrix.triplet_iter() {
        max_abs = max_abs.max(v.abs());
        let vt = matrix
            .get_entry(j, i)
            .map(|e| e.into_value())
            .unwrap_or(0.0);
        max_defect = max_defect.max((v - vt).abs());
    }
    if max_abs > 0.0 {
        max_defect / max_abs
    } else {
        0.0
    }
}

/// Asymmetry beyond tolerance means an assembly bug: fatal in debug
/// builds, logged in release.
fn check_symmetry(name: &str, matrix: &CsrMatrix<f64>) {
    let defect = symmetry_defect(matrix);
    debug_assert!(
        defect <= SYMMETRY_TOLERANCE,
        "{name} matrix asymmetric: relative defect {defect:.3e}"
    );
    if defect > SYMMETRY_TOLERANCE {
        warn!("{name} matrix asymmetric: relative defect {defect:.3e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fv_model::{BeamElement, Material, Node, TubeSection};

    fn steel_tube() -> BeamProperty {
        BeamProperty::new(
            Material::new(7850.0, 200e9, 0.3).unwrap(),
            TubeSection::new(0.1, 0.005).unwrap(),
        )
    }

    fn chain_mesh(num_elements: usize) -> Mesh {
        let mut mesh = Mesh::new();
        for i in 0..=num_elements {
            mesh.add_node(Node::new(i as i32 + 1, i as f64, 0.0, 0.0))
                .unwrap();
        }
        for i in 0..num_elements {
            mesh.add_element(BeamElement::new(i as i32 + 1, i as i32 + 1, i as i32 + 2, 0))
                .unwrap();
        }
        mesh
    }

    #[test]
    fn single_element_matches_formulation() {
        let mesh = chain_mesh(1);
        let properties = [steel_tube()];
        let global = assemble(&mesh, &properties).unwrap();

        assert_eq!(global.num_dofs, 12);
        let expected = properties[0].material.youngs_modulus * properties[0].section.area();
        let k00 = global.stiffness.get_entry(0, 0).unwrap().into_value();
        assert_relative_eq!(k00, expected, max_relative = 1e-9);
    }

    #[test]
    fn shared_node_contributions_sum() {
        // Two equal elements share node 2: its axial diagonal must be
        // exactly twice the single-element value, not overwritten.
        let properties = [steel_tube()];
        let one = assemble(&chain_mesh(1), &properties).unwrap();
        let two = assemble(&chain_mesh(2), &properties).unwrap();

        let k_end = one.stiffness.get_entry(6, 6).unwrap().into_value();
        let k_shared = two.stiffness.get_entry(6, 6).unwrap().into_value();
        assert_relative_eq!(k_shared, 2.0 * k_end, max_relative = 1e-12);

        let m_end = one.mass.get_entry(6, 6).unwrap().into_value();
        let m_shared = two.mass.get_entry(6, 6).unwrap().into_value();
        assert_relative_eq!(m_shared, 2.0 * m_end, max_relative = 1e-12);
    }

    #[test]
    fn assembled_matrices_are_symmetric() {
        let mesh = chain_mesh(4);
        let properties = [steel_tube()];
        let global = assemble(&mesh, &properties).unwrap();

        assert!(symmetry_defect(&global.stiffness) <= SYMMETRY_TOLERANCE);
        assert!(symmetry_defect(&global.mass) <= SYMMETRY_TOLERANCE);
    }

    #[test]
    fn unknown_property_index_fails() {
        let mesh = chain_mesh(1);
        let result = assemble(&mesh, &[]);
        assert!(matches!(
            result,
            Err(SolverError::Model(ModelError::UnknownProperty {
                element: 1,
                property: 0
            }))
        ));
    }

    #[test]
    fn degenerate_element_surfaces_from_assembly() {
        let mut mesh = Mesh::new();
        mesh.add_node(Node::new(1, 0.0, 0.0, 0.0)).unwrap();
        mesh.add_node(Node::new(2, 0.0, 0.0, 0.0)).unwrap();
        mesh.add_element(BeamElement::new(1, 1, 2, 0)).unwrap();

        let result = assemble(&mesh, &[steel_tube()]);
        assert!(matches!(
            result,
            Err(SolverError::DegenerateElement { element: 1, .. })
        ));
    }
}
