use thiserror::Error;

/// Errors raised by the number-theory toolkit and the ElGamal codec.
///
/// Every variant is terminal for the call that produced it; no operation in
/// this crate retries or substitutes a fallback value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// `mod_inverse` was called with operands whose gcd is not 1, so no
    /// inverse exists. Never expected when the modulus is prime.
    #[error("no modular inverse exists: operands are not coprime")]
    NoInverse,

    /// `primitive_root` was called on a composite modulus. This is a caller
    /// bug: the search is only meaningful modulo a prime.
    #[error("primitive root search requires a prime modulus")]
    NotPrime,

    /// The ciphertext did not tokenize into whole `(c, d)` pairs of decimal
    /// integers. Signals corrupted or non-ElGamal input.
    #[error("malformed ciphertext: expected an even number of decimal tokens")]
    MalformedCiphertext,

    /// The requested key size is below the practical floor for the
    /// primitive-root search to terminate.
    #[error("key size must be larger than 16 bits, got {bits}")]
    KeyTooSmall { bits: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
