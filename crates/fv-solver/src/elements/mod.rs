//! Element formulation for the frame solver.

pub mod beam;

pub use beam::{formulate_beam, ElementMatrices, MIN_ELEMENT_LENGTH};
