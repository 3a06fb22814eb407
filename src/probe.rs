use crate::error::CollisionError;
use crate::hash::{add_mod, HashParams, ALPHABET, ALPHABET_SIZE};
use core::fmt::{self, Write};

const LAST_DIGIT: u8 = (ALPHABET_SIZE - 1) as u8;

/// A fixed-length lowercase string that doubles as a base-26 counter.
///
/// `"aa..a"` is ordinal zero and `"zz..z"` is the last one; incrementing past
/// it wraps around to zero. The polynomial hash of the current content is
/// cached and kept up to date on every mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeString {
    /// Alphabet positions, most significant first.
    digits: Vec<u8>,
    params: HashParams,
    hash: u64,
}

impl ProbeString {
    /// The `ordinal`-th string of `length` characters.
    pub fn new(params: HashParams, length: usize, ordinal: u64) -> Self {
        let mut probe = Self {
            digits: vec![0; length],
            params,
            hash: 0,
        };
        probe.load_ordinal(ordinal);
        probe
    }

    /// Reseeds the counter at `ordinal`, keeping the current length.
    ///
    /// Ordinals past the last string of this length wrap around.
    pub fn load_ordinal(&mut self, ordinal: u64) {
        fill_digits(&mut self.digits, ordinal);
        self.rehash();
    }

    /// Replaces the content with an explicit lowercase string, adopting its length.
    pub fn load_str(&mut self, value: &str) -> Result<(), CollisionError> {
        if let Some(ch) = value.chars().find(|ch| !ch.is_ascii_lowercase()) {
            return Err(CollisionError::OutsideAlphabet { ch });
        }
        self.digits.clear();
        self.digits.extend(value.bytes().map(|ch| ch - ALPHABET[0]));
        self.rehash();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Position of the current content in the enumeration of its length.
    pub fn ordinal(&self) -> u64 {
        self.digits.iter().fold(0u64, |acc, &digit| {
            acc.wrapping_mul(ALPHABET_SIZE).wrapping_add(u64::from(digit))
        })
    }

    /// Advances to the next string of the same length.
    ///
    /// Bumping the last character raises its code by one, and the last
    /// character is weighted by `p^0`, so the hash simply grows by one. A
    /// carry touches more significant characters and forces a full rehash.
    pub fn increment(&mut self) {
        let Some(last) = self.digits.last_mut() else {
            return;
        };

        if *last < LAST_DIGIT {
            *last += 1;
            self.hash = add_mod(self.hash, 1, self.params.modulus());
            return;
        }

        for digit in self.digits.iter_mut().rev() {
            if *digit < LAST_DIGIT {
                *digit += 1;
                break;
            }
            *digit = 0;
        }
        self.rehash();
    }

    fn rehash(&mut self) {
        self.hash = self
            .params
            .hash_codes(self.digits.iter().map(|&digit| u64::from(digit) + 1));
    }
}

impl fmt::Display for ProbeString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &digit in &self.digits {
            f.write_char(char::from(ALPHABET[usize::from(digit)]))?;
        }
        Ok(())
    }
}

/// Appends the `ordinal`-th string of `length` characters to `out`.
pub(crate) fn push_ordinal(out: &mut String, length: usize, ordinal: u64) {
    let mut digits = vec![0; length];
    fill_digits(&mut digits, ordinal);
    out.extend(digits.into_iter().map(|d| char::from(ALPHABET[usize::from(d)])));
}

/// Writes `ordinal` in base 26, least significant digit into the last slot.
fn fill_digits(digits: &mut [u8], mut ordinal: u64) {
    for digit in digits.iter_mut().rev() {
        *digit = (ordinal % ALPHABET_SIZE) as u8;
        ordinal /= ALPHABET_SIZE;
    }
}
