//! Dense linear solver.

use crate::error::{OhmlabError, Result};

/// Solve `A x = z` for a row-major `n x n` matrix.
///
/// Gaussian elimination with partial pivoting on the augmented `[A|z]`,
/// followed by back substitution. A pivot whose magnitude is below
/// `pivot_tolerance` (or not finite) makes the system singular.
pub fn solve_dense(a: &[f64], z: &[f64], n: usize, pivot_tolerance: f64) -> Result<Vec<f64>> {
    debug_assert_eq!(a.len(), n * n);
    debug_assert_eq!(z.len(), n);

    let w = n + 1;
    let mut aug = vec![0.0; n * w];
    for row in 0..n {
        aug[row * w..row * w + n].copy_from_slice(&a[row * n..(row + 1) * n]);
        aug[row * w + n] = z[row];
    }

    for k in 0..n {
        // Find pivot
        let mut max_val = aug[k * w + k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = aug[i * w + k].abs();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if !max_val.is_finite() || max_val < pivot_tolerance {
            return Err(OhmlabError::SingularMatrix);
        }

        if max_row != k {
            for j in k..w {
                aug.swap(k * w + j, max_row * w + j);
            }
        }

        // Eliminate below the pivot
        let pivot = aug[k * w + k];
        for i in (k + 1)..n {
            let factor = aug[i * w + k] / pivot;
            if factor == 0.0 {
                continue;
            }
            aug[i * w + k] = 0.0;
            for j in (k + 1)..w {
                aug[i * w + j] -= factor * aug[k * w + j];
            }
        }
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = aug[i * w + n];
        for j in (i + 1)..n {
            sum -= aug[i * w + j] * x[j];
        }
        x[i] = sum / aug[i * w + i];
    }

    Ok(x)
}
