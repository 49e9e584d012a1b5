//! Proof of knowledge of two exponents `(s, l)` with `V = s * R + l * G`

use crate::group::{self, GENERATOR};
use crate::hash::TaggedHash;
use crate::types::{point_serde, scalar_serde};
use crate::{Error, Result};
use curve25519_dalek::{EdwardsPoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

const DUAL_LABEL: &[u8] = b"tss-eddsa/zkp/dual";

/// Proof of knowledge of `(s, l)` such that `V = s * R + l * G`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualProof {
    /// Commitment `alpha = a * R + b * G`
    #[serde(with = "point_serde")]
    pub alpha: EdwardsPoint,
    /// Response `t = a + c * s`
    #[serde(with = "scalar_serde")]
    pub t: Scalar,
    /// Response `u = b + c * l`
    #[serde(with = "scalar_serde")]
    pub u: Scalar,
}

fn challenge(
    session: &[u8],
    v: &EdwardsPoint,
    r: &EdwardsPoint,
    alpha: &EdwardsPoint,
) -> Scalar {
    TaggedHash::new(DUAL_LABEL)
        .chain(session)
        .chain(group::encode_point(v))
        .chain(group::encode_point(r))
        .chain(group::encode_point(&GENERATOR))
        .chain(group::encode_point(alpha))
        .challenge()
}

impl DualProof {
    /// Prove knowledge of `(s, l)` for the statement `(v, r)`
    pub fn prove<R: RngCore + CryptoRng>(
        session: &[u8],
        v: &EdwardsPoint,
        r: &EdwardsPoint,
        s: &Scalar,
        l: &Scalar,
        rng: &mut R,
    ) -> Result<Self> {
        if !group::is_valid(v) || !group::is_valid(r) {
            return Err(Error::InvalidWitness(
                "dual-exponent statement contains an invalid point".into(),
            ));
        }

        let a = Scalar::random(rng);
        let b = Scalar::random(rng);
        let alpha = r * a + EdwardsPoint::mul_base(&b);
        let c = challenge(session, v, r, &alpha);

        Ok(Self {
            alpha,
            t: a + c * s,
            u: b + c * l,
        })
    }

    /// Verify the proof for statement `(v, r)` under `session`
    pub fn verify(&self, session: &[u8], v: &EdwardsPoint, r: &EdwardsPoint) -> bool {
        if !group::is_valid(&self.alpha) || !group::is_valid(v) || !group::is_valid(r) {
            return false;
        }
        let c = challenge(session, v, r, &self.alpha);

        // t * R + u * G; all inputs are public
        let lhs = EdwardsPoint::vartime_double_scalar_mul_basepoint(&self.t, r, &self.u);
        lhs == self.alpha + v * c
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::order_two_point;
    use curve25519_dalek::traits::Identity;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    const SESSION: &[u8] = b"dual-session";

    struct Statement {
        v: EdwardsPoint,
        r: EdwardsPoint,
        s: Scalar,
        l: Scalar,
    }

    fn statement(rng: &mut ChaCha20Rng) -> Statement {
        let r = EdwardsPoint::mul_base(&Scalar::random(rng));
        let s = Scalar::random(rng);
        let l = Scalar::random(rng);
        Statement {
            v: r * s + EdwardsPoint::mul_base(&l),
            r,
            s,
            l,
        }
    }

    fn prove(st: &Statement, rng: &mut ChaCha20Rng) -> DualProof {
        DualProof::prove(SESSION, &st.v, &st.r, &st.s, &st.l, rng).unwrap()
    }

    #[test]
    fn test_prove_verify() {
        for seed in 0..8 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let st = statement(&mut rng);
            assert!(prove(&st, &mut rng).verify(SESSION, &st.v, &st.r));
        }
    }

    #[test]
    fn test_each_field_is_checked() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let st = statement(&mut rng);
        let proof = prove(&st, &mut rng);

        let mut bad = proof;
        bad.alpha = EdwardsPoint::mul_base(&Scalar::random(&mut rng));
        assert!(!bad.verify(SESSION, &st.v, &st.r));

        let mut bad = proof;
        bad.t += Scalar::ONE;
        assert!(!bad.verify(SESSION, &st.v, &st.r));

        let mut bad = proof;
        bad.u += Scalar::ONE;
        assert!(!bad.verify(SESSION, &st.v, &st.r));

        assert!(!proof.verify(b"other-session", &st.v, &st.r));
    }

    #[test]
    fn test_swapped_exponents_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(10);
        let st = statement(&mut rng);
        let proof = DualProof::prove(SESSION, &st.v, &st.r, &st.l, &st.s, &mut rng).unwrap();
        assert!(!proof.verify(SESSION, &st.v, &st.r));
    }

    #[test]
    fn test_invalid_points() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let st = statement(&mut rng);
        let identity = EdwardsPoint::identity();

        assert!(matches!(
            DualProof::prove(SESSION, &identity, &st.r, &st.s, &st.l, &mut rng),
            Err(Error::InvalidWitness(_))
        ));
        assert!(matches!(
            DualProof::prove(SESSION, &st.v, &identity, &st.s, &st.l, &mut rng),
            Err(Error::InvalidWitness(_))
        ));

        // alpha carrying a small-order component fails closed
        let mut proof = prove(&st, &mut rng);
        proof.alpha += order_two_point();
        assert!(!proof.verify(SESSION, &st.v, &st.r));

        proof.alpha = identity;
        assert!(!proof.verify(SESSION, &st.v, &st.r));
    }
}
