//! Proof of knowledge of a discrete logarithm

use crate::group::{self, GENERATOR};
use crate::hash::TaggedHash;
use crate::types::{point_serde, scalar_serde};
use crate::{Error, Result};
use curve25519_dalek::{EdwardsPoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

const DLOG_LABEL: &[u8] = b"tss-eddsa/zkp/dlog";

/// Proof of knowledge of `x` such that `X = x * G`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DlogProof {
    /// Commitment `alpha = a * G`
    #[serde(with = "point_serde")]
    pub alpha: EdwardsPoint,
    /// Response `t = a + c * x`
    #[serde(with = "scalar_serde")]
    pub t: Scalar,
}

fn challenge(session: &[u8], big_x: &EdwardsPoint, alpha: &EdwardsPoint) -> Scalar {
    TaggedHash::new(DLOG_LABEL)
        .chain(session)
        .chain(group::encode_point(big_x))
        .chain(group::encode_point(&GENERATOR))
        .chain(group::encode_point(alpha))
        .challenge()
}

impl DlogProof {
    /// Prove knowledge of `x` for the statement `big_x`
    ///
    /// `session` must be unique to the protocol run (and to the prover's slot
    /// within it); the same bytes are needed to verify.
    pub fn prove<R: RngCore + CryptoRng>(
        session: &[u8],
        x: &Scalar,
        big_x: &EdwardsPoint,
        rng: &mut R,
    ) -> Result<Self> {
        if !group::is_valid(big_x) {
            return Err(Error::InvalidWitness(
                "dlog statement is not a valid prime-order point".into(),
            ));
        }

        let a = Scalar::random(rng);
        let alpha = EdwardsPoint::mul_base(&a);
        let c = challenge(session, big_x, &alpha);

        Ok(Self { alpha, t: a + c * x })
    }

    /// Verify the proof for statement `big_x` under `session`
    pub fn verify(&self, session: &[u8], big_x: &EdwardsPoint) -> bool {
        if !group::is_valid(big_x) {
            return false;
        }
        let c = challenge(session, big_x, &self.alpha);

        EdwardsPoint::mul_base(&self.t) == self.alpha + big_x * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::traits::Identity;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    const SESSION: &[u8] = b"session-a";

    fn statement(rng: &mut ChaCha20Rng) -> (Scalar, EdwardsPoint) {
        let x = Scalar::random(rng);
        (x, EdwardsPoint::mul_base(&x))
    }

    #[test]
    fn test_prove_verify() {
        for seed in 0..16 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let (x, big_x) = statement(&mut rng);
            let proof = DlogProof::prove(SESSION, &x, &big_x, &mut rng).unwrap();
            assert!(proof.verify(SESSION, &big_x));
        }
    }

    #[test]
    fn test_tampered_proof_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let (x, big_x) = statement(&mut rng);
        let proof = DlogProof::prove(SESSION, &x, &big_x, &mut rng).unwrap();

        let mut bad_t = proof;
        bad_t.t += Scalar::ONE;
        assert!(!bad_t.verify(SESSION, &big_x));

        let mut bad_alpha = proof;
        bad_alpha.alpha = EdwardsPoint::mul_base(&Scalar::random(&mut rng));
        assert!(!bad_alpha.verify(SESSION, &big_x));

        let (_, other_x) = statement(&mut rng);
        assert!(!proof.verify(SESSION, &other_x));
    }

    #[test]
    fn test_wrong_witness_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let (x, big_x) = statement(&mut rng);
        let proof = DlogProof::prove(SESSION, &(x + Scalar::ONE), &big_x, &mut rng).unwrap();
        assert!(!proof.verify(SESSION, &big_x));
    }

    #[test]
    fn test_cross_session_replay_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let (x, big_x) = statement(&mut rng);
        let proof = DlogProof::prove(b"session-a", &x, &big_x, &mut rng).unwrap();

        assert!(proof.verify(b"session-a", &big_x));
        assert!(!proof.verify(b"session-b", &big_x));
    }

    #[test]
    fn test_invalid_statement() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let identity = EdwardsPoint::identity();
        assert!(matches!(
            DlogProof::prove(SESSION, &Scalar::ONE, &identity, &mut rng),
            Err(Error::InvalidWitness(_))
        ));

        // a proof with t * G == alpha would pass for the identity statement
        let a = Scalar::random(&mut rng);
        let forged = DlogProof {
            alpha: EdwardsPoint::mul_base(&a),
            t: a,
        };
        assert!(!forged.verify(SESSION, &identity));
    }

    #[test]
    fn test_serde_rejects_non_canonical_scalar() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let (x, big_x) = statement(&mut rng);
        let proof = DlogProof::prove(SESSION, &x, &big_x, &mut rng).unwrap();

        let json = serde_json::to_value(proof).unwrap();
        let decoded: DlogProof = serde_json::from_value(json.clone()).unwrap();
        assert!(decoded.verify(SESSION, &big_x));

        let mut bad = json;
        bad["t"] = serde_json::json!(vec![0xffu8; 32]);
        assert!(serde_json::from_value::<DlogProof>(bad).is_err());
    }
}
