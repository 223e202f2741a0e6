//! Modal analysis solver for 3D tubular beam frames.
//!
//! Pipeline: formulate 12×12 Euler-Bernoulli beam elements, assemble
//! sparse global stiffness and mass matrices, reduce by displacement
//! boundary conditions, solve the generalized eigenproblem with a
//! shift-invert Lanczos iteration, and recover full-DOF mode shapes
//! with natural frequencies in Hz.

pub mod assembly;
pub mod eigensolver;
pub mod elements;
pub mod error;
pub mod modal;
pub mod recovery;
pub mod reduction;

pub use assembly::{assemble, GlobalMatrices};
pub use eigensolver::{
    frequency_hz, solve_shift_invert, DiscardReason, DiscardedMode, EigenPair, EigenSolution,
    DEFAULT_SHIFT,
};
pub use elements::{formulate_beam, ElementMatrices, MIN_ELEMENT_LENGTH};
pub use error::SolverError;
pub use modal::{ModalAnalysis, ModalResults, Mode};
pub use recovery::{expand_mode, ModeShape, NodalDisplacement};
pub use reduction::{reduce, ReducedSystem};
