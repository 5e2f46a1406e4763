//! DISCLAIMER: This crate is a toy implementation of the ElGamal cryptosystem
//! in pure Rust, built from first principles (its own primality testing, prime
//! generation, and primitive-root search). It is *EXCLUSIVELY* for
//! demonstration and educational purposes. Absolutely DO NOT use it for real
//! cryptographic or security-sensitive operations. It is not audited, not
//! vetted, performs no constant-time arithmetic, and is very likely insecure
//! in practice.
//!
//! If you need ElGamal or any cryptographic operations in production, please
//! use a vetted, well-reviewed cryptography library.

pub mod elgamal;
pub mod error;
pub mod number_theory;

// Re-export the ElGamal codec
pub use elgamal::{
    decode, decrypt, encode, encrypt, generate_keys, PrivateKey, PublicKey, MIN_KEY_BITS,
};

// Re-export the number-theory toolkit
pub use number_theory::{gcd, generate_prime, is_prime, mod_inverse, primitive_root, rabin_miller};

pub use error::{Error, Result};
