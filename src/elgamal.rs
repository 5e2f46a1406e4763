//! ElGamal key generation and the text codec built on top of the
//! number-theory toolkit: strings are packed into big integers through their
//! UTF-16 representation, encrypted block-by-block into `(c, d)` pairs, and
//! serialized as space-separated decimal tokens.

use num_bigint_dig::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::{Error, Result};
use crate::number_theory::{generate_prime, primitive_root};

/// The key-size floor below which `generate_keys` refuses to run; the
/// primitive-root search becomes unreliable on tiny primes and the block
/// codec needs at least two bytes per block.
pub const MIN_KEY_BITS: usize = 16;

/// ElGamal private key: prime modulus `p`, generator `g`, secret exponent
/// `x` with `1 <= x <= (p-1)/2`, and the key size the pair was generated at.
/// Never transmitted; the matching [`PublicKey`] is derived from it once at
/// generation time.
#[derive(Debug, Clone)]
pub struct PrivateKey {
    pub p: BigUint,
    pub g: BigUint,
    pub x: BigUint,
    pub num_bits: usize,
}

/// ElGamal public key: prime modulus `p`, generator `g`, and
/// `h = g^x mod p` for the secret `x` of the matching [`PrivateKey`].
/// Shared freely.
#[derive(Debug, Clone)]
pub struct PublicKey {
    pub p: BigUint,
    pub g: BigUint,
    pub h: BigUint,
    pub num_bits: usize,
}

/// Generate an ElGamal key pair of the requested bit size.
///
/// Picks a `bits`-bit prime `p`, finds a primitive-root candidate of `p` and
/// squares it so the generator lands in the subgroup of order `(p-1)/2`,
/// draws the secret `x` uniformly from `[1, (p-1)/2]`, and derives
/// `h = g^x mod p`.
///
/// Returns [`Error::KeyTooSmall`] for `bits <= 16`.
pub fn generate_keys<R: Rng + ?Sized>(bits: usize, rng: &mut R) -> Result<(PrivateKey, PublicKey)> {
    if bits <= MIN_KEY_BITS {
        return Err(Error::KeyTooSmall { bits });
    }

    let one = BigUint::one();
    let two = BigUint::from(2u32);

    let p = generate_prime(bits, rng);
    let g = primitive_root(&p, rng)?.modpow(&two, &p);

    // x in [1, (p-1)/2]
    let half = (&p - &one) / &two;
    let x = rng.gen_biguint_range(&one, &(&half + &one));
    let h = g.modpow(&x, &p);

    let private = PrivateKey {
        p: p.clone(),
        g: g.clone(),
        x,
        num_bits: bits,
    };
    let public = PublicKey {
        p,
        g,
        h,
        num_bits: bits,
    };
    Ok((private, public))
}

/// Encode a string as a sequence of integers, each below `2^num_bits`.
///
/// The string's UTF-16 code units are flattened to little-endian bytes and
/// packed `num_bits / 8` bytes per integer, the byte at offset `i` of a
/// block contributing `b * 256^i`. A trailing partial block packs as if
/// zero-padded.
///
/// `num_bits` must be a multiple of 8 and at least 16 so no block can split
/// a code unit. Blocks of text whose high bytes reach `0x80` and beyond can
/// in principle reach the modulus; Latin-script text always stays below
/// `2^(num_bits-1)`.
pub fn encode(plain: &str, num_bits: usize) -> Vec<BigUint> {
    let k = num_bits / 8;
    let bytes: Vec<u8> = plain.encode_utf16().flat_map(u16::to_le_bytes).collect();
    bytes.chunks(k).map(BigUint::from_bytes_le).collect()
}

/// Decode a sequence of integers produced by [`encode`] back into a string.
///
/// Each integer yields `num_bits / 8` little-endian bytes (zero-padded up to
/// the block size); the byte stream is reassembled into UTF-16 code units
/// and decoded. Exact left inverse of [`encode`] up to trailing NUL
/// characters contributed by the final block's zero padding.
pub fn decode(ints: &[BigUint], num_bits: usize) -> String {
    let k = num_bits / 8;
    let mut bytes = Vec::with_capacity(ints.len() * k);
    for n in ints {
        let mut block = n.to_bytes_le();
        block.resize(k, 0);
        bytes.extend_from_slice(&block);
    }

    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|pair| {
            if pair.len() == 2 {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from(pair[0])
            }
        })
        .collect();
    String::from_utf16_lossy(&units)
}

/// Encrypt a plaintext string under an ElGamal public key.
///
/// The plaintext is encoded into integers `m_1..m_k`; each block gets a
/// fresh ephemeral exponent `y` drawn uniformly from `[0, p]` and becomes
/// the pair `c = g^y mod p`, `d = m * h^y mod p`. Ephemeral exponents are
/// never reused across blocks: a known-plaintext pair would otherwise leak
/// every block sharing its `y`.
///
/// The ciphertext is the decimal pairs joined by single spaces in order
/// (`c1 d1 c2 d2 ...`); the empty plaintext yields an empty string.
pub fn encrypt<R: Rng + ?Sized>(key: &PublicKey, plaintext: &str, rng: &mut R) -> String {
    let encoded = encode(plaintext, key.num_bits);

    let zero = BigUint::zero();
    let upper = &key.p + BigUint::one();

    let mut tokens = Vec::with_capacity(encoded.len() * 2);
    for m in &encoded {
        let y = rng.gen_biguint_range(&zero, &upper);
        let c = key.g.modpow(&y, &key.p);
        let d = (m * key.h.modpow(&y, &key.p)) % &key.p;
        tokens.push(c.to_string());
        tokens.push(d.to_string());
    }
    tokens.join(" ")
}

/// Decrypt a ciphertext string under an ElGamal private key.
///
/// Tokenizes on whitespace and fails with [`Error::MalformedCiphertext`] if
/// the token count is odd or any token is not a decimal integer. Each
/// `(c, d)` pair yields `s = c^x mod p` and recovers the block as
/// `m = d * s^(p-2) mod p`, inverting `s` by Fermat's little theorem. The
/// recovered blocks are decoded back to text and NUL characters left over
/// from block padding are stripped.
pub fn decrypt(key: &PrivateKey, ciphertext: &str) -> Result<String> {
    let tokens: Vec<&str> = ciphertext.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(Error::MalformedCiphertext);
    }

    // s^(p-2) = s^-1 mod p
    let inv_exp = &key.p - BigUint::from(2u32);

    let mut blocks = Vec::with_capacity(tokens.len() / 2);
    for pair in tokens.chunks(2) {
        let c: BigUint = pair[0].parse().map_err(|_| Error::MalformedCiphertext)?;
        let d: BigUint = pair[1].parse().map_err(|_| Error::MalformedCiphertext)?;

        let s = c.modpow(&key.x, &key.p);
        let m = (&d * s.modpow(&inv_exp, &key.p)) % &key.p;
        blocks.push(m);
    }

    Ok(decode(&blocks, key.num_bits).replace('\u{0}', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn strip_nulls(s: &str) -> String {
        s.trim_end_matches('\u{0}').to_string()
    }

    #[test]
    fn encode_packs_bytes_little_endian() {
        // "Hi" -> UTF-16LE bytes 48 00 69 00, one 32-bit block
        let ints = encode("Hi", 32);
        assert_eq!(ints, vec![BigUint::from(0x0069_0048u32)]);
    }

    #[test]
    fn encode_of_empty_string_is_empty() {
        assert!(encode("", 32).is_empty());
    }

    #[test]
    fn encode_decode_round_trip() {
        let samples = [
            "Hello, world!",
            "a",
            "Maitre Corbeau, sur un arbre perche",
            "spaces   and\ttabs\nand newlines",
            "0123456789",
        ];
        for bits in [16usize, 24, 32, 64, 128] {
            for s in samples {
                let decoded = decode(&encode(s, bits), bits);
                assert_eq!(strip_nulls(&decoded), *s, "{} bits", bits);
            }
        }
    }

    #[test]
    fn decode_pads_short_blocks() {
        // A block decoding to fewer than k bytes must be zero-extended, not
        // misaligned against the following block.
        let ints = vec![BigUint::from(0x48u32), BigUint::from(0x0069_0048u32)];
        assert_eq!(decode(&ints, 32), "H\u{0}Hi");
    }

    #[test]
    fn generate_keys_rejects_small_sizes() {
        let mut rng = StdRng::seed_from_u64(42);
        for bits in [0usize, 8, 16] {
            match generate_keys(bits, &mut rng) {
                Err(Error::KeyTooSmall { bits: got }) => assert_eq!(got, bits),
                other => panic!("expected KeyTooSmall for {} bits, got {:?}", bits, other),
            }
        }
    }

    #[test]
    fn generated_keys_are_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let (private, public) = generate_keys(64, &mut rng).unwrap();

        assert_eq!(private.p, public.p);
        assert_eq!(private.g, public.g);
        assert_eq!(private.num_bits, public.num_bits);
        assert_eq!(public.h, public.g.modpow(&private.x, &public.p));

        let half = (&private.p - BigUint::one()) / BigUint::from(2u32);
        assert!(private.x >= BigUint::one() && private.x <= half);
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let (private, public) = generate_keys(64, &mut rng).unwrap();

        for msg in ["Hello, world!", "a", "The quick brown fox", "  padded  "] {
            let ciphertext = encrypt(&public, msg, &mut rng);
            assert_eq!(decrypt(&private, &ciphertext).unwrap(), msg);
        }
    }

    #[test]
    fn ciphertext_token_count_is_even_and_fresh_per_block() {
        let mut rng = StdRng::seed_from_u64(42);
        let (_, public) = generate_keys(64, &mut rng).unwrap();

        let ciphertext = encrypt(&public, "Hello, world!", &mut rng);
        let tokens: Vec<&str> = ciphertext.split_whitespace().collect();
        assert_eq!(tokens.len() % 2, 0);
        assert_eq!(tokens.len() / 2, encode("Hello, world!", 64).len());

        // Same plaintext twice must produce different ciphertext: the
        // ephemeral exponents are drawn fresh per block.
        let again = encrypt(&public, "Hello, world!", &mut rng);
        assert_ne!(ciphertext, again);
    }

    #[test]
    fn empty_plaintext_round_trips_through_empty_ciphertext() {
        let mut rng = StdRng::seed_from_u64(42);
        let (private, public) = generate_keys(64, &mut rng).unwrap();

        let ciphertext = encrypt(&public, "", &mut rng);
        assert!(ciphertext.is_empty());
        assert_eq!(decrypt(&private, &ciphertext).unwrap(), "");
    }

    #[test]
    fn decrypt_rejects_odd_token_counts() {
        let mut rng = StdRng::seed_from_u64(42);
        let (private, public) = generate_keys(64, &mut rng).unwrap();

        let ciphertext = encrypt(&public, "Hello", &mut rng);
        let truncated: Vec<&str> = ciphertext.split_whitespace().skip(1).collect();
        let err = decrypt(&private, &truncated.join(" ")).unwrap_err();
        assert_eq!(err, Error::MalformedCiphertext);

        let err = decrypt(&private, "12345").unwrap_err();
        assert_eq!(err, Error::MalformedCiphertext);
    }

    #[test]
    fn decrypt_rejects_non_decimal_tokens() {
        let mut rng = StdRng::seed_from_u64(42);
        let (private, _) = generate_keys(64, &mut rng).unwrap();

        let err = decrypt(&private, "123 abc").unwrap_err();
        assert_eq!(err, Error::MalformedCiphertext);
    }

    #[test]
    fn round_trip_with_512_bit_keys() {
        let mut rng = StdRng::seed_from_u64(42);
        let (private, public) = generate_keys(512, &mut rng).unwrap();

        let msg = "Hello, world!";
        let ciphertext = encrypt(&public, msg, &mut rng);
        assert_eq!(decrypt(&private, &ciphertext).unwrap(), msg);
    }

    #[test]
    fn round_trip_with_odd_block_size() {
        // 24-bit keys pack three bytes per block, so code units straddle
        // block boundaries; the codec must still reassemble them exactly.
        let mut rng = StdRng::seed_from_u64(42);
        let (private, public) = generate_keys(24, &mut rng).unwrap();

        let msg = "Hi!";
        let ciphertext = encrypt(&public, msg, &mut rng);
        assert_eq!(decrypt(&private, &ciphertext).unwrap(), msg);
    }
}
