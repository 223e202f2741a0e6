//! Error types for the modal analysis pipeline.

use fv_model::ModelError;
use thiserror::Error;

/// Errors raised by assembly, reduction and the eigensolver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Model-side validation failure (bad DOF index, unknown node, ...).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Element endpoints are coincident (length below the minimum).
    #[error("element {element} is degenerate: length {length:.3e} m below minimum")]
    DegenerateElement { element: i32, length: f64 },

    /// Every DOF is prescribed; there is nothing to solve.
    #[error("all {num_dofs} DOFs are prescribed; free set is empty")]
    EmptyFreeSet { num_dofs: usize },

    /// Reduced stiffness and mass matrices differ in dimension.
    #[error("dimension mismatch: stiffness is {k_dim}x{k_dim}, mass is {m_dim}x{m_dim}")]
    DimensionMismatch { k_dim: usize, m_dim: usize },

    /// Requested mode count is zero or not below the reduced dimension.
    #[error("requested {requested} modes from a {dim}-DOF reduced system")]
    InvalidModeCount { requested: usize, dim: usize },

    /// The iterative eigensolver exhausted its budget before recovering
    /// the requested number of physical modes. The caller may retry with
    /// an adjusted mode count or shift; the solver never retries itself.
    #[error("eigensolver converged on {found} of {requested} modes (shift {shift:.3e})")]
    Convergence {
        requested: usize,
        found: usize,
        shift: f64,
    },
}
