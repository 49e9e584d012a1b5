//! Hash commitments over lists of byte strings

use crate::hash::TaggedHash;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

const COMMITMENT_TAG: &[u8] = b"tss-eddsa/hash-commitment";

/// Binding and hiding commitment `C = H(r, values...)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashCommitment(pub [u8; 32]);

/// Opening of a [`HashCommitment`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decommitment {
    /// Blinding randomness
    pub randomness: [u8; 32],
    /// Committed values
    pub values: Vec<Vec<u8>>,
}

fn digest(randomness: &[u8; 32], values: &[Vec<u8>]) -> [u8; 32] {
    let mut hash = TaggedHash::new(COMMITMENT_TAG)
        .chain(randomness)
        .chain((values.len() as u64).to_be_bytes());
    for value in values {
        hash = hash.chain(value);
    }
    hash.finalize()
}

/// Commit to `values` under fresh randomness
pub fn commit<R: RngCore + CryptoRng>(
    rng: &mut R,
    values: Vec<Vec<u8>>,
) -> (HashCommitment, Decommitment) {
    let mut randomness = [0u8; 32];
    rng.fill_bytes(&mut randomness);
    let commitment = HashCommitment(digest(&randomness, &values));
    (commitment, Decommitment { randomness, values })
}

impl HashCommitment {
    /// Check that `decommitment` opens this commitment
    pub fn verify(&self, decommitment: &Decommitment) -> bool {
        let expected = digest(&decommitment.randomness, &decommitment.values);
        self.0[..].ct_eq(&expected[..]).into()
    }

    /// Open the commitment, returning the committed values on success
    pub fn open<'a>(&self, decommitment: &'a Decommitment) -> Option<&'a [Vec<u8>]> {
        self.verify(decommitment)
            .then_some(decommitment.values.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_commit_open() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let values = vec![vec![1u8; 32], vec![2u8; 32]];
        let (c, d) = commit(&mut rng, values.clone());

        assert_eq!(c.open(&d), Some(values.as_slice()));
    }

    #[test]
    fn test_tampered_values_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (c, d) = commit(&mut rng, vec![vec![1u8; 32], vec![2u8; 32]]);

        let mut tampered = d.clone();
        tampered.values[1][0] ^= 1;
        assert!(c.open(&tampered).is_none());

        let mut moved = d.clone();
        moved.values = vec![vec![1u8; 31], [vec![1u8], vec![2u8; 32]].concat()];
        assert!(!c.verify(&moved));

        let mut reblinded = d;
        reblinded.randomness[0] ^= 1;
        assert!(!c.verify(&reblinded));
    }
}
