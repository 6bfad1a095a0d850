//! Fixed-size 3×3 linear algebra used by the tag filters.

use nalgebra::Matrix3;

/// Relative singular-value cut-off, matching numpy's default `rcond`.
pub const PINV_RCOND: f64 = 1e-15;

/// Moore-Penrose pseudo-inverse of a 3×3 matrix together with its numerical rank.
#[derive(Clone, Copy, Debug)]
pub struct PseudoInverse {
    pub matrix: Matrix3<f64>,
    pub rank: usize,
}

impl PseudoInverse {
    /// True when the source matrix had full rank (the pseudo-inverse is the inverse).
    pub fn is_full_rank(&self) -> bool {
        self.rank == 3
    }
}

/// Compute the pseudo-inverse of `m` via SVD.
///
/// Singular values at or below `PINV_RCOND * σ_max` are treated as zero, so a
/// singular matrix yields a rank-deficient (possibly all-zero) result instead
/// of an error. A matrix with NaN or infinite entries has no meaningful
/// decomposition and maps to the zero matrix with rank 0.
pub fn pseudo_inverse(m: &Matrix3<f64>) -> PseudoInverse {
    if !m.iter().all(|v| v.is_finite()) {
        return PseudoInverse {
            matrix: Matrix3::zeros(),
            rank: 0,
        };
    }
    let svd = m.svd(true, true);
    let cutoff = PINV_RCOND * svd.singular_values.max();
    let rank = svd.rank(cutoff);
    // Only fails for a negative cut-off or missing U/V; neither can happen here.
    let matrix = svd.pseudo_inverse(cutoff).unwrap_or_else(|_| Matrix3::zeros());
    PseudoInverse { matrix, rank }
}
