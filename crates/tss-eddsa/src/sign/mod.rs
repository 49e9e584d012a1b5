//! Distributed Signature Generation (DSG) module
//!
//! Three broadcast rounds per signer:
//!
//! 1. commit to the affine coordinates of a fresh nonce point `R_i`
//! 2. open the commitment and prove knowledge of `r_i`
//! 3. check every peer's opening and proof, aggregate `R`, compute the
//!    challenge `lambda` and broadcast `s_i = lambda * w_i + r_i`
//!
//! [`Finalization`] sums the shares and checks the result before handing out
//! a standard Ed25519 signature.

mod dsg;
mod finalize;
mod messages;
mod round1;
mod round2;
mod round3;

#[cfg(test)]
pub(crate) mod testing;

pub use dsg::run_dsg;
pub use finalize::Finalization;
pub use messages::*;
pub use round1::CommitRound;
pub use round2::RevealRound;
pub use round3::ShareRound;

use crate::{Error, KeyShare, Result, SessionConfig, SigningMessage};
use curve25519_dalek::{EdwardsPoint, Scalar};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// State every round of one signing session needs
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SignTemp {
    #[zeroize(skip)]
    pub(crate) config: SessionConfig,
    #[zeroize(skip)]
    pub(crate) ssid: Vec<u8>,
    /// `w_i = lambda_i * x_i`
    pub(crate) signing_share: Scalar,
    #[zeroize(skip)]
    pub(crate) public_key: EdwardsPoint,
    /// `W_j = lambda_j * X_j`, by session index
    #[zeroize(skip)]
    pub(crate) weighted_public_shares: Vec<EdwardsPoint>,
    #[zeroize(skip)]
    pub(crate) message: SigningMessage,
}

impl SignTemp {
    pub(crate) fn new(
        config: SessionConfig,
        key_share: &KeyShare,
        message: SigningMessage,
    ) -> Result<Self> {
        key_share.validate()?;
        config.validate()?;

        if config.threshold != key_share.threshold {
            return Err(Error::InvalidConfig(format!(
                "session threshold {} does not match key share threshold {}",
                config.threshold, key_share.threshold
            )));
        }
        if config.party_id()? != key_share.party_id {
            return Err(Error::InvalidPartyId(key_share.party_id));
        }

        let weighted_public_shares = config
            .parties
            .iter()
            .map(|&id| key_share.weighted_public_share(id, &config.parties))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            ssid: config.ssid(&key_share.public_key),
            signing_share: key_share.signing_share(&config.parties)?,
            public_key: key_share.public_key,
            weighted_public_shares,
            message,
            config,
        })
    }
}

/// This party's nonce `r_i`, its point and the round 2 opening
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Nonce {
    pub(crate) secret: Scalar,
    #[zeroize(skip)]
    pub(crate) point: EdwardsPoint,
    #[zeroize(skip)]
    pub(crate) reveal: NonceReveal,
}
