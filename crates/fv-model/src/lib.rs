//! Analysis model for tubular frame structures.
//!
//! This crate holds the input side of a modal analysis: mesh topology
//! (nodes, beam connectivity, DOF indexing), material and tube-section
//! properties, and displacement boundary conditions. It performs no
//! numerical work beyond deriving section constants; the solver crate
//! consumes these types.

pub mod bc;
pub mod error;
pub mod materials;
pub mod mesh;

pub use bc::BoundaryConditions;
pub use error::ModelError;
pub use materials::{BeamProperty, Material, TubeSection};
pub use mesh::{BeamElement, DofMap, Mesh, Node, DOFS_PER_NODE};
