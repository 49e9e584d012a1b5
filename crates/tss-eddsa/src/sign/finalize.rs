//! Combine signature shares

use super::SignTemp;
use crate::group;
use crate::{Error, Result, Signature};
use curve25519_dalek::{EdwardsPoint, Scalar};
use tracing::{info, warn};

/// Everything needed to assemble the signature once all shares are in
pub struct Finalization {
    temp: SignTemp,
    big_r: EdwardsPoint,
    lambda: Scalar,
    nonce_points: Vec<EdwardsPoint>,
    shares: Vec<Scalar>,
    message: Vec<u8>,
}

impl Finalization {
    pub(crate) fn new(
        temp: SignTemp,
        big_r: EdwardsPoint,
        lambda: Scalar,
        nonce_points: Vec<EdwardsPoint>,
        shares: Vec<Scalar>,
        message: Vec<u8>,
    ) -> Self {
        Self {
            temp,
            big_r,
            lambda,
            nonce_points,
            shares,
            message,
        }
    }

    /// Joint public key the signature verifies under
    pub fn public_key(&self) -> EdwardsPoint {
        self.temp.public_key
    }

    /// Encoded message the challenge was computed over
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Sum the shares into `(R, S)` and check `S * G == R + lambda * A`
    ///
    /// On failure each share is checked against `R_j + lambda * W_j` to name
    /// the party responsible.
    pub fn finalize(&self) -> Result<Signature> {
        let s: Scalar = self.shares.iter().sum();
        let expected = self.big_r + self.temp.public_key * self.lambda;

        if EdwardsPoint::mul_base(&s) != expected {
            let culprit = self.find_invalid_share();
            warn!(
                party_index = self.temp.config.party_index,
                culprit = ?culprit,
                "Aggregated signature does not verify"
            );
            return Err(culprit.map_or(Error::InvalidSignature, |party| Error::InvalidShare {
                party,
            }));
        }

        let signature = Signature::new(group::encode_point(&self.big_r), s.to_bytes());
        info!(
            party_index = self.temp.config.party_index,
            r = hex::encode(signature.r),
            s = hex::encode(signature.s),
            "Signature assembled"
        );
        Ok(signature)
    }

    fn find_invalid_share(&self) -> Option<usize> {
        self.shares
            .iter()
            .zip(&self.nonce_points)
            .zip(&self.temp.weighted_public_shares)
            .position(|((s_j, r_j), w_j)| {
                EdwardsPoint::mul_base(s_j) != r_j + w_j * self.lambda
            })
    }
}
