use crate::error::Error;
use std::ops::{BitXor, BitXorAssign};

const WORD_BITS: usize = u64::BITS as usize;

/// Number of 64 bit words needed to hold `len` bits.
pub(crate) const fn num_words(len: usize) -> usize {
    len.div_ceil(WORD_BITS)
}

/// A vector over GF(2), packed 64 entries to a word.
///
/// Bits past `len` in the last word are always zero, so two vectors of the
/// same length compare equal exactly when their entries do.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    /// The null vector of the given dimension.
    pub fn zeros(len: usize) -> Self {
        BitVector {
            words: vec![0; num_words(len)],
            len,
        }
    }

    /// Build a vector from integer entries, all of which must be 0 or 1.
    pub fn from_values<T>(values: &[T]) -> Result<Self, Error>
    where
        T: Copy + Into<u32>,
    {
        let mut out = Self::zeros(values.len());
        for (index, &value) in values.iter().enumerate() {
            match Into::<u32>::into(value) {
                0 => {}
                1 => out.set(index, true),
                value => return Err(Error::MalformedBinaryVector { index, value }),
            }
        }
        Ok(out)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> bool {
        debug_assert!(i < self.len);
        (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    pub fn set(&mut self, i: usize, val: bool) {
        debug_assert!(i < self.len);
        let mask = 1u64 << (i % WORD_BITS);
        if val {
            self.words[i / WORD_BITS] |= mask;
        } else {
            self.words[i / WORD_BITS] &= !mask;
        }
    }

    pub fn flip(&mut self, i: usize) {
        debug_assert!(i < self.len);
        self.words[i / WORD_BITS] ^= 1u64 << (i % WORD_BITS);
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Indices of the non-zero entries, in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut word = word;
            std::iter::from_fn(move || {
                if word == 0 {
                    None
                } else {
                    let bit = word.trailing_zeros() as usize;
                    word &= word - 1;
                    Some(wi * WORD_BITS + bit)
                }
            })
        })
    }

    /// Entries as 0/1 bytes, mostly useful for printing and tests.
    pub fn to_values(&self) -> Vec<u8> {
        (0..self.len).map(|i| self.get(i) as u8).collect()
    }

    /// XOR `other` into this vector, skipping the first `from_word` words. Used
    /// by elimination, where the leading words of both rows are known to be
    /// zero.
    pub(crate) fn xor_from(&mut self, other: &BitVector, from_word: usize) {
        debug_assert_eq!(self.len, other.len);
        for (a, b) in self.words[from_word..]
            .iter_mut()
            .zip(other.words[from_word..].iter())
        {
            *a ^= *b;
        }
    }
}

impl BitXorAssign<&BitVector> for BitVector {
    fn bitxor_assign(&mut self, rhs: &BitVector) {
        self.xor_from(rhs, 0);
    }
}

impl BitXor<&BitVector> for &BitVector {
    type Output = BitVector;

    fn bitxor(self, rhs: &BitVector) -> BitVector {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut words = Vec::new();
        let mut len = 0usize;
        for bit in iter {
            if len % WORD_BITS == 0 {
                words.push(0u64);
            }
            if bit {
                if let Some(last) = words.last_mut() {
                    *last |= 1u64 << (len % WORD_BITS);
                }
            }
            len += 1;
        }
        BitVector { words, len }
    }
}

impl std::fmt::Debug for BitVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for i in 0..self.len {
            write!(f, "{}", self.get(i) as u8)?;
        }
        write!(f, "]")
    }
}
