use super::bitvec::BitVector;
use crate::error::Error;

/// Dense matrix over GF(2), stored as packed rows.
///
/// Elimination works on rows, so rows are the unit of storage. Columns are
/// extracted on demand.
#[derive(Clone, PartialEq, Eq)]
pub struct BitMatrix {
    pub(crate) rows: Vec<BitVector>,
    ncols: usize,
}

impl BitMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        BitMatrix {
            rows: vec![BitVector::zeros(ncols); nrows],
            ncols,
        }
    }

    /// Build a matrix from rows of integer entries, all of which must be 0 or 1.
    pub fn from_values<R>(rows: &[R]) -> Result<Self, Error>
    where
        R: AsRef<[u8]>,
    {
        let ncols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let rows = rows
            .iter()
            .map(|r| {
                let r = r.as_ref();
                if r.len() != ncols {
                    return Err(Error::DimensionMismatch(ncols, r.len()));
                }
                BitVector::from_values(r)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(BitMatrix { rows, ncols })
    }

    /// Build a matrix with the given vectors as its columns. Every column must
    /// have `nrows` entries.
    pub fn from_columns<'a, I>(nrows: usize, columns: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = &'a BitVector>,
        I::IntoIter: ExactSizeIterator,
    {
        let columns = columns.into_iter();
        let mut out = BitMatrix::zeros(nrows, columns.len());
        for (j, col) in columns.enumerate() {
            if col.len() != nrows {
                return Err(Error::DimensionMismatch(nrows, col.len()));
            }
            for i in col.ones() {
                out.rows[i].set(j, true);
            }
        }
        Ok(out)
    }

    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows[i].get(j)
    }

    pub fn set(&mut self, i: usize, j: usize, val: bool) {
        self.rows[i].set(j, val)
    }

    pub fn column(&self, j: usize) -> BitVector {
        self.rows.iter().map(|r| r.get(j)).collect()
    }

    pub fn transpose(&self) -> BitMatrix {
        let mut out = BitMatrix::zeros(self.ncols, self.nrows());
        for (i, row) in self.rows.iter().enumerate() {
            for j in row.ones() {
                out.rows[j].set(i, true);
            }
        }
        out
    }

    /// New matrix made of the given columns, in the given order.
    pub fn select_columns(&self, cols: &[usize]) -> BitMatrix {
        BitMatrix {
            rows: self
                .rows
                .iter()
                .map(|r| cols.iter().map(|&j| r.get(j)).collect())
                .collect(),
            ncols: cols.len(),
        }
    }

    /// New matrix made of the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> BitMatrix {
        BitMatrix {
            rows: rows.iter().map(|&i| self.rows[i].clone()).collect(),
            ncols: self.ncols,
        }
    }

    /// Horizontal concatenation `[self | other]`.
    pub fn hconcat(&self, other: &BitMatrix) -> Result<BitMatrix, Error> {
        if self.nrows() != other.nrows() {
            return Err(Error::DimensionMismatch(self.nrows(), other.nrows()));
        }
        Ok(BitMatrix {
            rows: self
                .rows
                .iter()
                .zip(other.rows.iter())
                .map(|(a, b)| {
                    (0..self.ncols)
                        .map(|j| a.get(j))
                        .chain((0..other.ncols).map(|j| b.get(j)))
                        .collect()
                })
                .collect(),
            ncols: self.ncols + other.ncols,
        })
    }

    /// Matrix product over GF(2).
    pub fn mul(&self, other: &BitMatrix) -> Result<BitMatrix, Error> {
        if self.ncols != other.nrows() {
            return Err(Error::DimensionMismatch(self.ncols, other.nrows()));
        }
        Ok(BitMatrix {
            rows: self
                .rows
                .iter()
                .map(|r| {
                    r.ones().fold(BitVector::zeros(other.ncols), |mut acc, k| {
                        acc ^= &other.rows[k];
                        acc
                    })
                })
                .collect(),
            ncols: other.ncols,
        })
    }
}

impl std::fmt::Debug for BitMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BitMatrix {}x{}", self.nrows(), self.ncols)?;
        for row in &self.rows {
            writeln!(f, "  {:?}", row)?;
        }
        Ok(())
    }
}
