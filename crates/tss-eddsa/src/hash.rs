//! Tagged hashing and challenge derivation
//!
//! Two different reductions live here and must not be mixed up:
//! - sigma-protocol challenges are folded into `[0, q)` by rejection sampling
//!   ([`TaggedHash::challenge`]);
//! - the EdDSA signature challenge is a 64-byte pre-image reduced mod `q`,
//!   exactly as a verifier reduces it ([`signature_challenge`]).

use crate::{Error, Result};
use curve25519_dalek::Scalar;
use digest::Digest;
use num_bigint::BigUint;
use sha2::Sha512_256;
use std::sync::OnceLock;

#[cfg(feature = "poseidon")]
mod poseidon;

#[cfg(feature = "poseidon")]
pub use poseidon::Poseidon;

/// `q = 2^252 + 27742317777372353535851937790883648493`, little-endian
const GROUP_ORDER_LE: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde,
    0x14, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x10,
];

/// Order `q` of the Ed25519 prime-order subgroup
pub fn group_order() -> &'static BigUint {
    static ORDER: OnceLock<BigUint> = OnceLock::new();
    ORDER.get_or_init(|| BigUint::from_bytes_le(&GROUP_ORDER_LE))
}

/// Domain-separated SHA-512/256
///
/// The tag digest is absorbed twice ahead of the data, and every segment is
/// length-prefixed so segment boundaries are part of the hash input.
#[derive(Clone)]
pub struct TaggedHash {
    hasher: Sha512_256,
}

impl TaggedHash {
    /// Start a hash under `tag`
    pub fn new(tag: &[u8]) -> Self {
        let tag_digest = Sha512_256::digest(tag);
        let hasher = Sha512_256::new()
            .chain_update(tag_digest.as_slice())
            .chain_update(tag_digest.as_slice());
        Self { hasher }
    }

    /// Absorb one segment
    pub fn chain(mut self, segment: impl AsRef<[u8]>) -> Self {
        let segment = segment.as_ref();
        self.hasher.update((segment.len() as u64).to_be_bytes());
        self.hasher.update(segment);
        self
    }

    /// Raw 32-byte digest
    pub fn finalize(self) -> [u8; 32] {
        self.hasher.finalize().into()
    }

    /// Digest folded into `[0, modulus)` without modulo bias
    pub fn finalize_below(self, modulus: &BigUint) -> BigUint {
        rejection_sample(modulus, &self.finalize())
    }

    /// Sigma-protocol challenge, uniform in `[0, q)`
    pub fn challenge(self) -> Scalar {
        let c = self.finalize_below(group_order());
        let bytes = c.to_bytes_le();
        let mut repr = [0u8; 32];
        repr[..bytes.len()].copy_from_slice(&bytes);
        // c < q, so the reduction leaves it unchanged
        Scalar::from_bytes_mod_order(repr)
    }
}

/// Draw from `[0, modulus)` by rejection sampling over a hash-expanded seed
///
/// Each draw keeps the top `bits(modulus)` bits of
/// `SHA-512/256(seed || counter)`; draws that land at or above the modulus
/// are discarded. `modulus` must be non-zero and at most 256 bits wide.
pub fn rejection_sample(modulus: &BigUint, seed: &[u8; 32]) -> BigUint {
    let bits = modulus.bits();
    debug_assert!(bits > 0 && bits <= 256, "unsupported modulus width");
    let shift = 256u64.saturating_sub(bits);

    let mut counter = 0u32;
    loop {
        let block = Sha512_256::new()
            .chain_update(seed)
            .chain_update(counter.to_be_bytes())
            .finalize();
        let candidate = BigUint::from_bytes_be(&block) >> shift;
        if &candidate < modulus {
            return candidate;
        }
        counter = counter.wrapping_add(1);
    }
}

/// Hash used to derive the signature challenge pre-image
///
/// SHA-512 gives standard Ed25519 signatures. Any other implementation
/// must be used by the verifier too: `sha3::Sha3_512`, or `Poseidon` (an
/// algebraic sponge, cheap to prove inside a circuit) with the `poseidon`
/// feature.
pub trait ChallengeHash {
    /// 64-byte pre-image; shorter digests are zero-extended
    fn challenge_preimage(input: &[u8]) -> Result<[u8; 64]>;
}

fn wide_digest<D: Digest>(input: &[u8]) -> [u8; 64] {
    let digest = D::digest(input);
    let mut out = [0u8; 64];
    let len = digest.len().min(out.len());
    out[..len].copy_from_slice(&digest[..len]);
    out
}

impl ChallengeHash for sha2::Sha512 {
    fn challenge_preimage(input: &[u8]) -> Result<[u8; 64]> {
        Ok(wide_digest::<Self>(input))
    }
}

impl ChallengeHash for sha3::Sha3_512 {
    fn challenge_preimage(input: &[u8]) -> Result<[u8; 64]> {
        Ok(wide_digest::<Self>(input))
    }
}

/// Concatenate hash input segments, rejecting empty ones
pub fn flatten_segments(segments: &[&[u8]]) -> Result<Vec<u8>> {
    if let Some(index) = segments.iter().position(|s| s.is_empty()) {
        return Err(Error::EmptyHashSegment { index });
    }
    Ok(segments.concat())
}

/// EdDSA challenge `H(segments...) mod q`
pub fn signature_challenge<H: ChallengeHash>(segments: &[&[u8]]) -> Result<Scalar> {
    let input = flatten_segments(segments)?;
    Ok(Scalar::from_bytes_mod_order_wide(&H::challenge_preimage(
        &input,
    )?))
}
