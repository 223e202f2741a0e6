//! Modal analysis pipeline.
//!
//! Ties the stages together: assemble global K and M, reduce by the
//! boundary conditions, solve the generalized eigenproblem near zero,
//! and recover full-DOF mode shapes with frequencies in Hz.

use crate::assembly::assemble;
use crate::eigensolver::{frequency_hz, solve_shift_invert, DiscardedMode, DEFAULT_SHIFT};
use crate::error::SolverError;
use crate::recovery::{expand_mode, ModeShape};
use crate::reduction::reduce;
use fv_model::{BeamProperty, BoundaryConditions, Mesh};
use log::debug;

/// One recovered natural mode.
#[derive(Debug, Clone)]
pub struct Mode {
    /// Position in the ascending-frequency ordering, from 0
    pub index: usize,
    /// Natural frequency in Hz
    pub frequency_hz: f64,
    /// Full-DOF mode shape (zeros at prescribed DOFs)
    pub shape: ModeShape,
}

/// Results of a modal analysis run.
#[derive(Debug, Clone)]
pub struct ModalResults {
    /// Modes sorted by ascending frequency
    pub modes: Vec<Mode>,
    /// Non-physical spectrum content the eigensolver rejected
    pub discarded: Vec<DiscardedMode>,
    /// Total DOFs of the full (unreduced) system
    pub num_dofs: usize,
}

impl ModalResults {
    /// Natural frequencies in Hz, ascending.
    pub fn frequencies_hz(&self) -> Vec<f64> {
        self.modes.iter().map(|m| m.frequency_hz).collect()
    }

    /// Mode shape by ascending-frequency index.
    pub fn mode_shape(&self, index: usize) -> Option<&ModeShape> {
        self.modes.get(index).map(|m| &m.shape)
    }
}

/// Modal analysis of a frame: borrows the model, owns only the shift.
pub struct ModalAnalysis<'a> {
    mesh: &'a Mesh,
    properties: &'a [BeamProperty],
    bcs: &'a BoundaryConditions,
    shift: f64,
}

impl<'a> ModalAnalysis<'a> {
    /// Set up an analysis with the default eigensolver shift.
    pub fn new(mesh: &'a Mesh, properties: &'a [BeamProperty], bcs: &'a BoundaryConditions) -> Self {
        Self {
            mesh,
            properties,
            bcs,
            shift: DEFAULT_SHIFT,
        }
    }

    /// Override the shift-invert target (rad²/s²).
    pub fn with_shift(mut self, shift: f64) -> Self {
        self.shift = shift;
        self
    }

    /// Run the full pipeline for the `num_modes` lowest modes.
    pub fn solve(&self, num_modes: usize) -> Result<ModalResults, SolverError> {
        let global = assemble(self.mesh, self.properties)?;
        let reduced = reduce(&global, self.bcs)?;
        debug!(
            "solving {} modes on {} free of {} DOFs",
            num_modes,
            reduced.dim(),
            global.num_dofs
        );

        let solution = solve_shift_invert(&reduced.stiffness, &reduced.mass, num_modes, self.shift)?;

        let mut modes = Vec::with_capacity(solution.pairs.len());
        for (index, pair) in solution.pairs.iter().enumerate() {
            let shape = expand_mode(&pair.vector, &reduced.free_dofs, global.num_dofs)?;
            modes.push(Mode {
                index,
                frequency_hz: frequency_hz(pair.lambda),
                shape,
            });
        }

        Ok(ModalResults {
            modes,
            discarded: solution.discarded,
            num_dofs: global.num_dofs,
        })
    }
}
