/*!
Linear algebra over the binary field GF(2).

Every entry is 0 or 1, addition is XOR and multiplication is AND. Nothing in
here is generic over the coefficient field: the elimination below relies on
the fact that every non-zero entry is its own inverse.
*/

mod bitvec;
mod matrix;

pub use bitvec::BitVector;
pub use matrix::BitMatrix;

use crate::error::Error;

/// Forward elimination over GF(2), returning the indices of the pivot columns.
///
/// Columns are scanned left to right. The pivot columns are the first
/// `rank(matrix)` linearly independent columns, so among equally good choices
/// the leftmost column always wins. The input matrix is not modified.
pub fn independent_columns(matrix: &BitMatrix) -> Vec<usize> {
    let mut rows = matrix.rows.clone();
    let nrows = rows.len();
    let mut pivots = Vec::new();
    let mut prow = 0usize;
    for col in 0..matrix.ncols() {
        if prow == nrows {
            break;
        }
        let Some(found) = (prow..nrows).find(|&r| rows[r].get(col)) else {
            // Dependent on the columns already processed.
            continue;
        };
        rows.swap(prow, found);
        // Rows at or below `prow` are zero in every column before `col`.
        let first_word = col / 64;
        let (top, bottom) = rows.split_at_mut(prow + 1);
        let pivot = &top[prow];
        for row in bottom.iter_mut().filter(|row| row.get(col)) {
            row.xor_from(pivot, first_word);
        }
        pivots.push(col);
        prow += 1;
    }
    pivots
}

/// Express every column of `targets` in terms of the columns of `coeffs`.
///
/// `coeffs` must have strictly more rows than columns and full column rank.
/// The returned matrix `X` has one row per column of `coeffs` and one column
/// per column of `targets`, such that `coeffs * X = targets`. A target outside
/// the column space of `coeffs` is reported as an error.
pub fn solve(coeffs: &BitMatrix, targets: &BitMatrix) -> Result<BitMatrix, Error> {
    let (m, n) = (coeffs.nrows(), coeffs.ncols());
    if targets.nrows() != m {
        return Err(Error::DimensionMismatch(m, targets.nrows()));
    }
    if m <= n {
        return Err(Error::RankMismatch {
            context: "solve: coefficient rows",
            expected: n + 1,
            actual: m,
        });
    }
    // Rows of `coeffs` that form an invertible square block.
    let row_pivots = independent_columns(&coeffs.transpose());
    if row_pivots.len() != n {
        return Err(Error::RankMismatch {
            context: "solve: coefficient column rank",
            expected: n,
            actual: row_pivots.len(),
        });
    }
    let mut square = coeffs.select_rows(&row_pivots);
    let mut rhs = targets.select_rows(&row_pivots);
    // Gauss-Jordan on [square | rhs] leaves the inverse applied to rhs.
    for col in 0..n {
        let found = (col..n)
            .find(|&r| square.rows[r].get(col))
            .ok_or(Error::RankMismatch {
                context: "solve: singular block",
                expected: n,
                actual: col,
            })?;
        square.rows.swap(col, found);
        rhs.rows.swap(col, found);
        let prow = square.rows[col].clone();
        let prhs = rhs.rows[col].clone();
        for r in (0..n).filter(|&r| r != col) {
            if square.rows[r].get(col) {
                square.rows[r] ^= &prow;
                rhs.rows[r] ^= &prhs;
            }
        }
    }
    let residual = coeffs.mul(&rhs)?;
    if residual != *targets {
        let bad = (0..targets.ncols())
            .filter(|&j| residual.column(j) != targets.column(j))
            .count();
        return Err(Error::RankMismatch {
            context: "solve: targets outside the column space",
            expected: 0,
            actual: bad,
        });
    }
    Ok(rhs)
}
