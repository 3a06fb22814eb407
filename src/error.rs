use thiserror::Error;

/// Errors reported by the collision search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollisionError {
    /// Hashing modulo zero is undefined.
    #[error("hash modulus must be positive")]
    ZeroModulus,

    /// The number of strings of this length does not fit a 64-bit ordinal.
    #[error("enumerating all strings of length {length} overflows a 64-bit ordinal")]
    EnumerationOverflow { length: usize },

    /// A probe string may only hold lowercase latin letters.
    #[error("character {ch:?} is outside the lowercase alphabet")]
    OutsideAlphabet { ch: char },
}
