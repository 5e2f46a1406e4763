//! Modular-arithmetic and primality toolkit underpinning the ElGamal codec:
//! Euclidean gcd, extended-Euclidean modular inverse, a two-stage primality
//! test (trial division by a fixed low-prime table, then Rabin-Miller), a
//! primitive-root search for safe primes, and random prime generation.
//!
//! Every function that consumes entropy takes the RNG as an explicit
//! parameter, so callers can substitute a seeded generator for reproducible
//! results.

use log::debug;
use num_bigint_dig::{BigInt, BigUint, RandBigInt, Sign, ToBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::{Error, Result};

/// Number of independent witness rounds in the Rabin-Miller test. Five rounds
/// bound the false-positive rate at 4^-5 for a uniformly random composite.
const RABIN_MILLER_ROUNDS: usize = 5;

/// The 168 primes below 1000, used by `is_prime` as a membership and
/// trial-division fast path before the probabilistic test runs.
const LOW_PRIMES: [u32; 168] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251, 257, 263, 269, 271, 277, 281, 283, 293, 307,
    311, 313, 317, 331, 337, 347, 349, 353, 359, 367, 373, 379, 383, 389, 397, 401, 409, 419, 421,
    431, 433, 439, 443, 449, 457, 461, 463, 467, 479, 487, 491, 499, 503, 509, 521, 523, 541, 547,
    557, 563, 569, 571, 577, 587, 593, 599, 601, 607, 613, 617, 619, 631, 641, 643, 647, 653, 659,
    661, 673, 677, 683, 691, 701, 709, 719, 727, 733, 739, 743, 751, 757, 761, 769, 773, 787, 797,
    809, 811, 821, 823, 827, 829, 839, 853, 857, 859, 863, 877, 881, 883, 887, 907, 911, 919, 929,
    937, 941, 947, 953, 967, 971, 977, 983, 991, 997,
];

/// Compute the greatest common divisor of `a` and `b` with the Euclidean
/// algorithm. `gcd(0, 0)` is 0.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    let mut a = a.clone();
    let mut b = b.clone();
    while !a.is_zero() {
        let r = &b % &a;
        b = a;
        a = r;
    }
    b
}

/// Find the modular inverse of `a` modulo `m` using the extended Euclidean
/// algorithm: the `x` in `[0, m)` satisfying `(a * x) mod m = 1`.
///
/// Returns [`Error::NoInverse`] when `gcd(a, m) != 1`, in which case no
/// inverse exists.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Result<BigUint> {
    let a_int = a.to_bigint().unwrap();
    let m_int = m.to_bigint().unwrap();
    let (g, x, _) = extended_gcd(&a_int, &m_int);
    if !g.is_one() {
        return Err(Error::NoInverse);
    }
    // Normalize into [0, m)
    let mut inv = x % &m_int;
    if inv.sign() == Sign::Minus {
        inv += &m_int;
    }
    Ok(inv.to_biguint().unwrap())
}

/// Extended Euclidean algorithm in BigInts.
/// Returns (gcd(a, b), x, y) such that a*x + b*y = gcd(a, b).
fn extended_gcd(a: &BigInt, b: &BigInt) -> (BigInt, BigInt, BigInt) {
    if b.is_zero() {
        (a.clone(), BigInt::one(), BigInt::zero())
    } else {
        let (q, r) = a.div_rem(b);
        let (g, x, y) = extended_gcd(b, &r);
        (g, y.clone(), x - &q * y)
    }
}

/// Check whether `n` is prime.
///
/// Two-stage test: `n` is first compared against the fixed table of primes
/// below 1000 (an exact answer for any `n` the table covers, and a cheap
/// composite rejection for any `n` a table prime divides); survivors go to
/// the probabilistic [`rabin_miller`] test.
pub fn is_prime<R: Rng + ?Sized>(n: &BigUint, rng: &mut R) -> bool {
    if *n < BigUint::from(2u32) {
        return false;
    }
    for &low in LOW_PRIMES.iter() {
        let low = BigUint::from(low);
        if *n == low {
            return true;
        }
        if (n % &low).is_zero() {
            return false;
        }
    }
    rabin_miller(n, rng)
}

/// Rabin-Miller probabilistic primality test.
///
/// Decomposes `n - 1 = s * 2^t` with `s` odd and runs
/// [`RABIN_MILLER_ROUNDS`] independent witness rounds, each with a witness
/// drawn uniformly from `[2, n - 2]`. Every round must pass for `n` to be
/// reported (probably) prime; any witness that proves compositeness returns
/// `false` immediately.
pub fn rabin_miller<R: Rng + ?Sized>(n: &BigUint, rng: &mut R) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);
    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    let n_minus_one = n - &one;

    // n - 1 = s * 2^t with s odd
    let mut s = n_minus_one.clone();
    let mut t = 0usize;
    while s.is_even() {
        s >>= 1;
        t += 1;
    }

    'witness: for _ in 0..RABIN_MILLER_ROUNDS {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut v = a.modpow(&s, n);
        if v == one || v == n_minus_one {
            continue 'witness;
        }
        // Square up to t - 1 more times looking for n - 1
        for _ in 0..t - 1 {
            v = (&v * &v) % n;
            if v == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }

    true
}

/// Find a generator of the multiplicative group modulo the prime `p`.
///
/// Returns [`Error::NotPrime`] when `p` is composite. For `p = 2` the answer
/// is 1. For odd `p` the search assumes the safe-prime structure
/// `p - 1 = 2q` with `q` prime, so the only proper subgroups have index 2 or
/// `q`: a candidate `g` drawn from `[2, p - 1]` is accepted once
/// `g^((p-1)/2) mod p != 1` and `g^((p-1)/q) mod p != 1`, which rules out
/// membership in either subgroup.
///
/// When `p - 1` has other odd factors the accepted `g` is still a quadratic
/// non-residue of order greater than 2, but not necessarily a generator of
/// the full group.
pub fn primitive_root<R: Rng + ?Sized>(p: &BigUint, rng: &mut R) -> Result<BigUint> {
    if !is_prime(p, rng) {
        return Err(Error::NotPrime);
    }

    let one = BigUint::one();
    let two = BigUint::from(2u32);
    if *p == two {
        return Ok(one);
    }

    // The two prime divisors of p - 1 are 2 and q = (p - 1) / 2, so the
    // exponents to test are (p - 1) / 2 and (p - 1) / q.
    let p_minus_one = p - &one;
    let q = &p_minus_one / &two;
    let exp_q = &p_minus_one / &q;

    let mut candidates = 0usize;
    loop {
        let g = rng.gen_biguint_range(&two, p);
        candidates += 1;
        if g.modpow(&q, p) != one && g.modpow(&exp_q, p) != one {
            debug!("primitive root found after {} candidates", candidates);
            return Ok(g);
        }
    }
}

/// Generate a random prime of exactly `bits` bits by rejection sampling:
/// draw uniformly from `[2^(bits-1), 2^bits)` until [`is_prime`] accepts.
///
/// Expected number of candidates is O(bits) by the prime density near
/// `2^bits`. `bits` must be at least 2.
pub fn generate_prime<R: Rng + ?Sized>(bits: usize, rng: &mut R) -> BigUint {
    let low = BigUint::one() << (bits - 1);
    let high = BigUint::one() << bits;

    let mut candidates = 0usize;
    loop {
        let n = rng.gen_biguint_range(&low, &high);
        candidates += 1;
        if is_prime(&n, rng) {
            debug!("{}-bit prime found after {} candidates", bits, candidates);
            return n;
        }
    }
}
