//! Trusted-dealer Shamir sharing over the Ed25519 scalar field

use crate::{Error, KeyShare, Result};
use curve25519_dalek::{EdwardsPoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};
use zeroize::Zeroize;

/// Split a fresh random key into `n` shares, any `threshold` of which can sign
///
/// Share `j` is `f(j + 1)` for a random polynomial `f` of degree
/// `threshold - 1`; the joint public key is `f(0) * G`.
#[instrument(skip(rng))]
pub fn deal_shares<R: RngCore + CryptoRng>(
    threshold: usize,
    n_parties: usize,
    rng: &mut R,
) -> Result<Vec<KeyShare>> {
    if threshold < 2 {
        return Err(Error::InvalidConfig("Threshold must be at least 2".into()));
    }
    if n_parties < threshold {
        return Err(Error::ThresholdNotMet {
            required: threshold,
            actual: n_parties,
        });
    }

    let mut coefficients: Vec<Scalar> = (0..threshold).map(|_| Scalar::random(&mut *rng)).collect();
    let public_key = EdwardsPoint::mul_base(&coefficients[0]);

    let secret_shares: Vec<Scalar> = (0..n_parties)
        .map(|party_id| evaluate_polynomial(&coefficients, party_id as u64 + 1))
        .collect();
    coefficients.zeroize();

    let public_shares: Vec<EdwardsPoint> =
        secret_shares.iter().map(EdwardsPoint::mul_base).collect();

    debug!(n_parties, threshold, "Dealt key shares");

    Ok(secret_shares
        .into_iter()
        .enumerate()
        .map(|(party_id, secret_share)| KeyShare {
            party_id,
            n_parties,
            threshold,
            secret_share,
            public_key,
            public_shares: public_shares.clone(),
        })
        .collect())
}

/// Evaluate a polynomial at `x` (Horner)
pub fn evaluate_polynomial(coefficients: &[Scalar], x: u64) -> Scalar {
    let x = Scalar::from(x);
    coefficients
        .iter()
        .rev()
        .fold(Scalar::ZERO, |acc, coef| acc * x + coef)
}
