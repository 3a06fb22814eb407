use crate::error::CollisionError;
use rand::Rng;

/// Symbols a probe string is built from, in enumeration order.
pub const ALPHABET: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";
pub const ALPHABET_SIZE: u64 = ALPHABET.len() as u64;

/// Power and modulus of the polynomial hash.
///
/// The hash is evaluated Horner-style, so the last character of a string is
/// weighted by `p^0` and the first by `p^(len - 1)`. Every character
/// contributes its 1-based alphabet position, which keeps `"a"` and `""`
/// apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashParams {
    power: u64,
    modulus: u64,
}

impl HashParams {
    pub fn new(power: u64, modulus: u64) -> Result<Self, CollisionError> {
        if modulus == 0 {
            return Err(CollisionError::ZeroModulus);
        }
        Ok(Self { power, modulus })
    }

    pub fn power(&self) -> u64 {
        self.power
    }

    pub fn modulus(&self) -> u64 {
        self.modulus
    }

    /// Hash of a byte string, in `[0, modulus)`.
    pub fn hash(&self, s: &[u8]) -> u64 {
        self.hash_codes(s.iter().map(|&ch| self.char_code(ch)))
    }

    /// Folds already reduced character codes, most significant first.
    pub(crate) fn hash_codes<I: IntoIterator<Item = u64>>(&self, codes: I) -> u64 {
        codes.into_iter().fold(0, |acc, code| {
            add_mod(mul_mod(acc, self.power, self.modulus), code, self.modulus)
        })
    }

    /// `p^length mod m`: how far a prefix moves when `length` characters follow it.
    pub(crate) fn shift(&self, length: usize) -> u64 {
        pow_mod(self.power, length as u64, self.modulus)
    }

    fn char_code(&self, ch: u8) -> u64 {
        let code = i128::from(ch) - i128::from(ALPHABET[0]) + 1;
        code.rem_euclid(i128::from(self.modulus)) as u64
    }
}

/// `Σ code(s[i]) · p^(len - 1 - i) mod m`.
pub fn hash(s: &str, params: HashParams) -> u64 {
    params.hash(s.as_bytes())
}

/// Exact `base^exponent` by repeated squaring, `None` if it overflows `u64`.
pub fn binary_pow(mut base: u64, mut exponent: u64) -> Option<u64> {
    let mut result: u64 = 1;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = result.checked_mul(base)?;
        }
        exponent >>= 1;
        // The squared base is only needed if another bit follows, and then it
        // ends up in the result anyway.
        if exponent > 0 {
            base = base.checked_mul(base)?;
        }
    }
    Some(result)
}

/// `base^exponent mod modulus` with 128-bit intermediates.
pub fn pow_mod(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    let mut result = 1 % modulus;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    result
}

#[inline]
pub(crate) fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    (u128::from(a) * u128::from(b) % u128::from(modulus)) as u64
}

#[inline]
pub(crate) fn add_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((u128::from(a) + u128::from(b)) % u128::from(modulus)) as u64
}

/// `a - b mod m` for `a, b` already reduced below `m`.
#[inline]
pub(crate) fn sub_mod(a: u64, b: u64, modulus: u64) -> u64 {
    ((u128::from(a) + u128::from(modulus) - u128::from(b)) % u128::from(modulus)) as u64
}

/// Uniformly random lowercase string of the given length.
pub fn random_string<R: Rng>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}
