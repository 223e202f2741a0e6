//! 2-node 3D Euler-Bernoulli beam element.
//!
//! Each node carries 6 degrees of freedom (3 translations, 3 rotations)
//! for a 12×12 element matrix. The local stiffness combines axial,
//! torsional and two-plane bending terms; the consistent mass matrix
//! uses the standard 156/420 family of coefficients. Both are rotated
//! to the global frame via K_g = Tᵀ·K_l·T.
//!
//! References:
//! - Przemieniecki, "Theory of Matrix Structural Analysis"
//! - Cook et al., "Concepts and Applications of Finite Element Analysis"

use crate::error::SolverError;
use fv_model::{BeamElement, BeamProperty, Node};
use nalgebra::{SMatrix, Vector3};

/// Elements shorter than this are treated as coincident nodes.
pub const MIN_ELEMENT_LENGTH: f64 = 1e-10;

type Matrix12 = SMatrix<f64, 12, 12>;

/// Formulated element: global-frame matrices plus scatter indices.
#[derive(Debug, Clone)]
pub struct ElementMatrices {
    /// Element stiffness in global coordinates (12×12)
    pub stiffness: Matrix12,
    /// Element consistent mass in global coordinates (12×12)
    pub mass: Matrix12,
    /// Global DOF indices of the two endpoint nodes (6 per node)
    pub dofs: [usize; 12],
}

/// Formulate a beam element in the global frame.
///
/// `dofs` are the element's 12 global DOF indices (start node first),
/// already resolved through the mesh DOF map.
pub fn formulate_beam(
    element: &BeamElement,
    start: &Node,
    end: &Node,
    property: &BeamProperty,
    dofs: [usize; 12],
) -> Result<ElementMatrices, SolverError> {
    let axis = Vector3::new(end.x - start.x, end.y - start.y, end.z - start.z);
    let length = axis.norm();
    if length < MIN_ELEMENT_LENGTH {
        return Err(SolverError::DegenerateElement {
            element: element.id,
            length,
        });
    }

    let t = transformation(axis / length);
    let k_local = local_stiffness(length, property);
    let m_local = local_mass(length, property);

    Ok(ElementMatrices {
        stiffness: t.transpose() * k_local * t,
        mass: t.transpose() * m_local * t,
        dofs,
    })
}

/// Build the 12×12 local-to-global transformation from the beam axis.
///
/// Local x runs along the beam. The perpendicular reference is global X
/// unless the beam is near-colinear with it, in which case global Y is
/// used instead; this keeps the cross product well-conditioned for any
/// orientation.
fn transformation(ex: Vector3<f64>) -> Matrix12 {
    let reference = if ex.x.abs() < 0.9 {
        Vector3::new(1.0, 0.0, 0.0)
    } else {
        Vector3::new(0.0, 1.0, 0.0)
    };

    let ez = ex.cross(&reference).normalize();
    let ey = ez.cross(&ex);

    let mut t = Matrix12::zeros();
    for block in 0..4 {
        let o = block * 3;
        for i in 0..3 {
            t[(o, o + i)] = ex[i];
            t[(o + 1, o + i)] = ey[i];
            t[(o + 2, o + i)] = ez[i];
        }
    }
    t
}

/// Local stiffness: axial, torsional, and bending in two planes.
///
/// DOF order per node: (ux, uy, uz, θx, θy, θz); start node occupies
/// rows 0..6, end node rows 6..12.
fn local_stiffness(l: f64, property: &BeamProperty) -> Matrix12 {
    let e = property.material.youngs_modulus;
    let g = property.material.shear_modulus();
    let a = property.section.area();
    let iy = property.section.second_moment();
    let iz = property.section.second_moment();
    let j = property.section.polar_moment();

    let mut k = Matrix12::zeros();

    // Axial (DOFs 0, 6)
    let k_ax = e * a / l;
    k[(0, 0)] = k_ax;
    k[(0, 6)] = -k_ax;
    k[(6, 6)] = k_ax;

    // Torsion (DOFs 3, 9)
    let k_t = g * j / l;
    k[(3, 3)] = k_t;
    k[(3, 9)] = -k_t;
    k[(9, 9)] = k_t;

    // Bending in the local xy plane (DOFs 1, 5, 7, 11), uses Iz
    let b = 12.0 * e * iz / l.powi(3);
    let c = 6.0 * e * iz / l.powi(2);
    let d1 = 4.0 * e * iz / l;
    let d2 = 2.0 * e * iz / l;
    k[(1, 1)] = b;
    k[(1, 5)] = c;
    k[(1, 7)] = -b;
    k[(1, 11)] = c;
    k[(5, 5)] = d1;
    k[(5, 7)] = -c;
    k[(5, 11)] = d2;
    k[(7, 7)] = b;
    k[(7, 11)] = -c;
    k[(11, 11)] = d1;

    // Bending in the local xz plane (DOFs 2, 4, 8, 10), uses Iy; the
    // translation-rotation couplings flip sign relative to the xy plane
    let b = 12.0 * e * iy / l.powi(3);
    let c = 6.0 * e * iy / l.powi(2);
    let d1 = 4.0 * e * iy / l;
    let d2 = 2.0 * e * iy / l;
    k[(2, 2)] = b;
    k[(2, 4)] = -c;
    k[(2, 8)] = -b;
    k[(2, 10)] = -c;
    k[(4, 4)] = d1;
    k[(4, 8)] = c;
    k[(4, 10)] = d2;
    k[(8, 8)] = b;
    k[(8, 10)] = c;
    k[(10, 10)] = d1;

    mirror_lower(&mut k);
    k
}

/// Local consistent mass matrix: translational inertia plus torsional
/// rotary inertia about the beam axis.
fn local_mass(l: f64, property: &BeamProperty) -> Matrix12 {
    let rho = property.material.density;
    let a = property.section.area();
    let j = property.section.polar_moment();

    let m_lin = rho * a * l;
    let mut m = Matrix12::zeros();

    // Axial (DOFs 0, 6)
    m[(0, 0)] = m_lin / 3.0;
    m[(0, 6)] = m_lin / 6.0;
    m[(6, 6)] = m_lin / 3.0;

    // Torsion (DOFs 3, 9), rotational inertia per unit length ρJ
    let m_tor = rho * j * l;
    m[(3, 3)] = m_tor / 3.0;
    m[(3, 9)] = m_tor / 6.0;
    m[(9, 9)] = m_tor / 3.0;

    // Bending, local xy plane (DOFs 1, 5, 7, 11)
    let c = m_lin / 420.0;
    m[(1, 1)] = 156.0 * c;
    m[(1, 5)] = 22.0 * l * c;
    m[(1, 7)] = 54.0 * c;
    m[(1, 11)] = -13.0 * l * c;
    m[(5, 5)] = 4.0 * l * l * c;
    m[(5, 7)] = 13.0 * l * c;
    m[(5, 11)] = -3.0 * l * l * c;
    m[(7, 7)] = 156.0 * c;
    m[(7, 11)] = -22.0 * l * c;
    m[(11, 11)] = 4.0 * l * l * c;

    // Bending, local xz plane (DOFs 2, 4, 8, 10), couplings sign-flipped
    m[(2, 2)] = 156.0 * c;
    m[(2, 4)] = -22.0 * l * c;
    m[(2, 8)] = 54.0 * c;
    m[(2, 10)] = 13.0 * l * c;
    m[(4, 4)] = 4.0 * l * l * c;
    m[(4, 8)] = -13.0 * l * c;
    m[(4, 10)] = -3.0 * l * l * c;
    m[(8, 8)] = 156.0 * c;
    m[(8, 10)] = 22.0 * l * c;
    m[(10, 10)] = 4.0 * l * l * c;

    mirror_lower(&mut m);
    m
}

/// Copy the upper triangle into the lower one.
fn mirror_lower(m: &mut Matrix12) {
    for i in 0..12 {
        for j in (i + 1)..12 {
            m[(j, i)] = m[(i, j)];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fv_model::{Material, TubeSection};

    fn steel_tube() -> BeamProperty {
        BeamProperty::new(
            Material::new(7850.0, 200e9, 0.3).unwrap(),
            TubeSection::new(0.1, 0.005).unwrap(),
        )
    }

    fn dofs_0_to_11() -> [usize; 12] {
        core::array::from_fn(|i| i)
    }

    #[test]
    fn coincident_nodes_are_degenerate() {
        let element = BeamElement::new(1, 1, 2, 0);
        let p = Node::new(1, 0.5, 0.5, 0.5);
        let q = Node::new(2, 0.5, 0.5, 0.5);

        let result = formulate_beam(&element, &p, &q, &steel_tube(), dofs_0_to_11());
        assert!(matches!(
            result,
            Err(SolverError::DegenerateElement { element: 1, .. })
        ));
    }

    #[test]
    fn element_matrices_are_symmetric() {
        let element = BeamElement::new(1, 1, 2, 0);
        let p = Node::new(1, 0.0, 0.0, 0.0);
        let q = Node::new(2, 1.0, 2.0, 3.0);

        let em = formulate_beam(&element, &p, &q, &steel_tube(), dofs_0_to_11()).unwrap();
        let scale_k = em.stiffness.abs().max();
        let scale_m = em.mass.abs().max();
        for i in 0..12 {
            for j in 0..12 {
                assert!((em.stiffness[(i, j)] - em.stiffness[(j, i)]).abs() <= 1e-9 * scale_k);
                assert!((em.mass[(i, j)] - em.mass[(j, i)]).abs() <= 1e-9 * scale_m);
            }
        }
    }

    #[test]
    fn axial_stiffness_along_x() {
        let element = BeamElement::new(1, 1, 2, 0);
        let p = Node::new(1, 0.0, 0.0, 0.0);
        let q = Node::new(2, 2.0, 0.0, 0.0);
        let property = steel_tube();

        let em = formulate_beam(&element, &p, &q, &property, dofs_0_to_11()).unwrap();
        let expected = property.material.youngs_modulus * property.section.area() / 2.0;
        assert_relative_eq!(em.stiffness[(0, 0)], expected, max_relative = 1e-9);
        assert_relative_eq!(em.stiffness[(0, 6)], -expected, max_relative = 1e-9);
    }

    #[test]
    fn total_translational_mass_is_preserved() {
        // Row sums over the x-translation DOFs must equal ρAL
        let element = BeamElement::new(1, 1, 2, 0);
        let p = Node::new(1, 0.0, 0.0, 0.0);
        let q = Node::new(2, 1.5, 0.0, 0.0);
        let property = steel_tube();

        let em = formulate_beam(&element, &p, &q, &property, dofs_0_to_11()).unwrap();
        let expected = property.material.density * property.section.area() * 1.5;
        let total: f64 = [(0, 0), (0, 6), (6, 0), (6, 6)]
            .iter()
            .map(|&(i, j)| em.mass[(i, j)])
            .sum();
        assert_relative_eq!(total, expected, max_relative = 1e-9);
    }

    #[test]
    fn colinear_with_x_axis_has_valid_rotation() {
        // The reference-axis fallback must kick in for beams along X
        let element = BeamElement::new(1, 1, 2, 0);
        let p = Node::new(1, 0.0, 0.0, 0.0);
        let q = Node::new(2, 1.0, 0.0, 0.0);

        let em = formulate_beam(&element, &p, &q, &steel_tube(), dofs_0_to_11()).unwrap();
        assert!(em.stiffness.iter().all(|v| v.is_finite()));
        assert!(em.mass.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn rotated_element_keeps_spectrum() {
        // A rigid rotation must not change the stiffness trace scale:
        // diagonal sums match between an x-aligned and a z-aligned beam.
        let property = steel_tube();
        let element = BeamElement::new(1, 1, 2, 0);

        let along_x = formulate_beam(
            &element,
            &Node::new(1, 0.0, 0.0, 0.0),
            &Node::new(2, 1.0, 0.0, 0.0),
            &property,
            dofs_0_to_11(),
        )
        .unwrap();
        let along_z = formulate_beam(
            &element,
            &Node::new(1, 0.0, 0.0, 0.0),
            &Node::new(2, 0.0, 0.0, 1.0),
            &property,
            dofs_0_to_11(),
        )
        .unwrap();

        let trace_x: f64 = (0..12).map(|i| along_x.stiffness[(i, i)]).sum();
        let trace_z: f64 = (0..12).map(|i| along_z.stiffness[(i, i)]).sum();
        assert_relative_eq!(trace_x, trace_z, max_relative = 1e-9);
    }
}
