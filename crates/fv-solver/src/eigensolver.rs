//! Shift-invert Lanczos solver for the generalized eigenproblem
//! K·v = λ·M·v.
//!
//! The spectrum of interest sits just above zero (the lowest structural
//! modes), so the problem is transformed to (K − σM)⁻¹·M·v = θ·v with a
//! small positive shift σ; eigenvalues near σ map to the largest θ and
//! converge first. The Lanczos basis is M-orthonormal with full
//! reorthogonalization, and the projected tridiagonal problem is solved
//! with nalgebra's symmetric eigendecomposition.

use crate::error::SolverError;
use log::{debug, warn};
use nalgebra::linalg::SymmetricEigen;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CsrMatrix;

/// Default shift σ, slightly above zero to keep K − σM invertible for
/// constrained systems while targeting the lowest modes.
pub const DEFAULT_SHIFT: f64 = 1e-2;

/// Hard cap on the Lanczos subspace dimension.
pub const MAX_LANCZOS_ITER: usize = 300;

/// M-norm below which a Krylov vector is treated as an invariant
/// subspace breakdown.
pub const LANCZOS_TOL: f64 = 1e-10;

/// λ at or below this is a numerical artifact, not a structural mode.
pub const MIN_PHYSICAL_LAMBDA: f64 = 1e-6;

/// Relative residual ‖K·v − λ·M·v‖ / ‖λ·M·v‖ above which a Ritz pair
/// is treated as unconverged.
pub const RITZ_RESIDUAL_TOL: f64 = 1e-6;

/// A converged physical mode: eigenvalue λ = ω² and its eigenvector
/// over the reduced DOFs, normalized to unit Euclidean length.
#[derive(Debug, Clone)]
pub struct EigenPair {
    pub lambda: f64,
    pub vector: DVector<f64>,
}

/// Why a Ritz value was rejected from the physical spectrum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// λ ≤ the physical threshold (rigid-body remnant or round-off).
    NonPositive,
    /// λ was NaN or infinite.
    NonFinite,
    /// The pair failed the residual test ‖K·v − λ·M·v‖ ≤ tol·‖λ·M·v‖.
    Unconverged,
}

/// A Ritz value the solver rejected, kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscardedMode {
    pub lambda: f64,
    pub reason: DiscardReason,
}

/// Outcome of a shift-invert solve: the requested physical pairs in
/// ascending λ order, plus whatever the solver threw away.
#[derive(Debug, Clone)]
pub struct EigenSolution {
    pub pairs: Vec<EigenPair>,
    pub discarded: Vec<DiscardedMode>,
}

/// Natural frequency in Hz for an eigenvalue λ = ω².
pub fn frequency_hz(lambda: f64) -> f64 {
    lambda.sqrt() / (2.0 * std::f64::consts::PI)
}

/// Solve K·v = λ·M·v for the `num_modes` lowest physical modes.
///
/// Both matrices must be square with matching dimension, and
/// `num_modes` must be in 1..dim. Every returned pair has passed the
/// relative residual test at [`RITZ_RESIDUAL_TOL`]; fewer converged
/// physical pairs than requested is reported as
/// [`SolverError::Convergence`]. The solver never silently pads or
/// retries.
pub fn solve_shift_invert(
    k: &CsrMatrix<f64>,
    m: &CsrMatrix<f64>,
    num_modes: usize,
    sigma: f64,
) -> Result<EigenSolution, SolverError> {
    let n = k.nrows();
    if k.ncols() != n || m.nrows() != m.ncols() || m.nrows() != n {
        return Err(SolverError::DimensionMismatch {
            k_dim: k.nrows(),
            m_dim: m.nrows(),
        });
    }
    if num_modes == 0 || num_modes >= n {
        return Err(SolverError::InvalidModeCount {
            requested: num_modes,
            dim: n,
        });
    }

    // Headroom beyond num_modes: duplicate copies of degenerate
    // eigenvalues only emerge from round-off several iterations after
    // the first copy locks in, and they still have to pass the
    // residual test.
    let num_lanczos = (num_modes + 20).min(n).min(MAX_LANCZOS_ITER);
    debug!("shift-invert Lanczos: dim {n}, subspace {num_lanczos}, shift {sigma:.3e}");

    // Factor A = K - sigma*M with LU; the shifted matrix can be
    // indefinite when sigma sits above a low eigenvalue.
    let a_shifted = build_shifted_dense(k, m, sigma);
    let lu = a_shifted.clone().lu();
    let lu_factor = if lu.is_invertible() {
        lu
    } else {
        // Shift landed on an eigenvalue; nudge the diagonal and retry.
        warn!("shifted matrix singular at sigma {sigma:.3e}, regularizing diagonal");
        let mut a_reg = a_shifted;
        for i in 0..n {
            a_reg[(i, i)] += 1e-8 * a_reg[(i, i)].abs().max(1e-8);
        }
        let lu_reg = a_reg.lu();
        if !lu_reg.is_invertible() {
            return Err(SolverError::Convergence {
                requested: num_modes,
                found: 0,
                shift: sigma,
            });
        }
        lu_reg
    };

    // Deterministic start vector, M-orthonormalized.
    let mut v_prev = DVector::zeros(n);
    let mut v_curr = DVector::from_fn(n, |i, _| ((i * 7 + 13) % 101) as f64 / 100.0 - 0.5);
    let mv = m * &v_curr;
    let norm = v_curr.dot(&mv).sqrt();
    if norm < 1e-14 {
        return Err(SolverError::Convergence {
            requested: num_modes,
            found: 0,
            shift: sigma,
        });
    }
    v_curr /= norm;

    let mut v_matrix = DMatrix::zeros(n, num_lanczos);
    // Cache M*v columns so reorthogonalization costs O(1) SPMVs per step
    let mut mv_matrix = DMatrix::zeros(n, num_lanczos);
    let mut alpha = Vec::with_capacity(num_lanczos);
    let mut beta = Vec::with_capacity(num_lanczos);

    for j in 0..num_lanczos {
        v_matrix.set_column(j, &v_curr);

        let mv_curr = m * &v_curr;
        mv_matrix.set_column(j, &mv_curr);

        // w = (K - sigma*M)^(-1) * M * v_curr
        let w = lu_factor
            .solve(&mv_curr)
            .unwrap_or_else(|| DVector::zeros(n));

        let mw = m * &w;
        let alpha_j = v_curr.dot(&mw);
        alpha.push(alpha_j);

        let mut w_orth = w - alpha_j * &v_curr;
        if j > 0 {
            w_orth -= beta[j - 1] * &v_prev;
        }

        // Full reorthogonalization against the M-inner product
        for i in 0..=j {
            let v_i = v_matrix.column(i);
            let mv_i = mv_matrix.column(i);
            let coeff = w_orth.dot(&mv_i);
            w_orth -= coeff * &v_i;
        }

        let mw_orth = m * &w_orth;
        let beta_j = w_orth.dot(&mw_orth).sqrt();
        if beta_j < LANCZOS_TOL {
            // Invariant subspace found
            alpha.truncate(j + 1);
            break;
        }

        beta.push(beta_j);
        v_prev = v_curr;
        v_curr = w_orth / beta_j;
    }

    let m_lanczos = alpha.len();
    if m_lanczos == 0 {
        return Err(SolverError::Convergence {
            requested: num_modes,
            found: 0,
            shift: sigma,
        });
    }

    let mut tridiag = DMatrix::zeros(m_lanczos, m_lanczos);
    for i in 0..m_lanczos {
        tridiag[(i, i)] = alpha[i];
        if i < beta.len() && i + 1 < m_lanczos {
            tridiag[(i, i + 1)] = beta[i];
            tridiag[(i + 1, i)] = beta[i];
        }
    }

    let eig = SymmetricEigen::new(tridiag);
    let theta = eig.eigenvalues;
    let s = eig.eigenvectors;

    // Map theta back to lambda = sigma + 1/theta and split the Ritz
    // values into physical pairs and discards.
    let mut pairs: Vec<EigenPair> = Vec::new();
    let mut discarded: Vec<DiscardedMode> = Vec::new();
    for i in 0..m_lanczos {
        if theta[i].abs() <= 1e-14 {
            continue;
        }
        let lambda = sigma + 1.0 / theta[i];

        if !lambda.is_finite() {
            discarded.push(DiscardedMode {
                lambda,
                reason: DiscardReason::NonFinite,
            });
            continue;
        }
        if lambda <= MIN_PHYSICAL_LAMBDA {
            discarded.push(DiscardedMode {
                lambda,
                reason: DiscardReason::NonPositive,
            });
            continue;
        }

        // Ritz vector: y = V * s_i
        let s_col = s.column(i);
        let mut y = DVector::zeros(n);
        for j in 0..m_lanczos {
            y += s_col[j] * v_matrix.column(j);
        }
        let norm = y.norm();
        if norm <= 1e-14 {
            continue;
        }
        y /= norm;

        // A Ritz value is only a mode once its residual confirms it:
        // a truncated Krylov space can place spurious values anywhere
        // in the spectrum.
        let ky = k * &y;
        let my = m * &y;
        let residual = (&ky - lambda * &my).norm();
        let scale = (lambda.abs() * my.norm()).max(f64::MIN_POSITIVE);
        if residual > RITZ_RESIDUAL_TOL * scale {
            discarded.push(DiscardedMode {
                lambda,
                reason: DiscardReason::Unconverged,
            });
            continue;
        }

        pairs.push(EigenPair { lambda, vector: y });
    }

    pairs.sort_by(|a, b| a.lambda.total_cmp(&b.lambda));

    if pairs.len() < num_modes {
        return Err(SolverError::Convergence {
            requested: num_modes,
            found: pairs.len(),
            shift: sigma,
        });
    }
    pairs.truncate(num_modes);

    if !discarded.is_empty() {
        warn!(
            "discarded {} Ritz values (lowest kept lambda {:.3e})",
            discarded.len(),
            pairs[0].lambda
        );
    }

    Ok(EigenSolution { pairs, discarded })
}

fn build_shifted_dense(k: &CsrMatrix<f64>, m: &CsrMatrix<f64>, sigma: f64) -> DMatrix<f64> {
    let n = k.nrows();
    let mut a = DMatrix::zeros(n, n);
    for (i, j, v) in k.triplet_iter() {
        a[(i, j)] += *v;
    }
    for (i, j, v) in m.triplet_iter() {
        a[(i, j)] -= sigma * *v;
    }
    a
}
