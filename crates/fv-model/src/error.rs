//! Error types for model construction and validation.

use thiserror::Error;

/// Errors raised while building or validating the analysis model.
///
/// All validation is eager: a constructor or mutator that would leave
/// the model in a non-physical or inconsistent state fails immediately
/// instead of deferring to the solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A material or section constant violates its physical constraint.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A node with this ID already exists in the mesh.
    #[error("duplicate node id {0}")]
    DuplicateNode(i32),

    /// An element with this ID already exists in the mesh.
    #[error("duplicate element id {0}")]
    DuplicateElement(i32),

    /// A node ID was referenced that the mesh does not contain.
    #[error("unknown node id {0}")]
    UnknownNode(i32),

    /// An element references a property index outside the property table.
    #[error("element {element} references unknown property index {property}")]
    UnknownProperty { element: i32, property: usize },

    /// A DOF was prescribed more than once.
    #[error("DOF index {0} is already prescribed")]
    DuplicateDof(usize),

    /// A prescribed DOF index lies outside [0, num_dofs).
    #[error("DOF index {index} out of range (system has {num_dofs} DOFs)")]
    InvalidDof { index: usize, num_dofs: usize },
}
