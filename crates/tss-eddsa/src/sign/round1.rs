//! Round 1: commit to the nonce point

use super::{Envelope, Nonce, NonceCommitment, NonceReveal, RevealRound, SignContent, SignTemp};
use crate::commitment::{self, HashCommitment};
use crate::group;
use crate::hash::ChallengeHash;
use crate::round::{Phase, Round, RoundState};
use crate::types::party_context;
use crate::zkp::DlogProof;
use crate::{Error, KeyShare, Result, SessionConfig, SigningMessage};
use curve25519_dalek::{EdwardsPoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha512;
use std::marker::PhantomData;
use tracing::debug;

/// First signing round
///
/// `H` selects the hash behind the signature challenge; the default gives
/// standard Ed25519 signatures.
pub struct CommitRound<H = Sha512> {
    temp: SignTemp,
    nonce: Option<Nonce>,
    state: RoundState<HashCommitment>,
    _hash: PhantomData<fn() -> H>,
}

impl<H: ChallengeHash> CommitRound<H> {
    /// Set up signing of `message` with `key_share`
    pub fn new(config: SessionConfig, key_share: &KeyShare, message: SigningMessage) -> Result<Self> {
        let temp = SignTemp::new(config, key_share, message)?;
        let state = RoundState::new(Self::NUMBER, temp.config.n_parties());
        Ok(Self {
            temp,
            nonce: None,
            state,
            _hash: PhantomData,
        })
    }
}

impl<H: ChallengeHash> Round for CommitRound<H> {
    type Next = RevealRound<H>;
    const NUMBER: u32 = 1;

    fn start<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Result<Envelope> {
        self.state.begin()?;
        let i = self.temp.config.party_index;

        let secret = Scalar::random(rng);
        let point = EdwardsPoint::mul_base(&secret);
        let coords = group::to_affine(&point)
            .ok_or_else(|| Error::Internal("nonce point has no affine form".into()))?;
        let (commitment, decommitment) = commitment::commit(rng, coords.to_values());

        // Proved now so the reveal can go out as soon as round 1 completes
        let proof = DlogProof::prove(&party_context(&self.temp.ssid, i), &secret, &point, rng)?;

        self.state.table().accept(i, commitment);
        self.nonce = Some(Nonce {
            secret,
            point,
            reveal: NonceReveal {
                decommitment,
                proof,
            },
        });
        debug!(party_index = i, "Nonce committed");

        Ok(Envelope::broadcast(
            i,
            Self::NUMBER,
            SignContent::Commitment(NonceCommitment { commitment }),
        ))
    }

    fn can_accept(&self, msg: &Envelope) -> bool {
        msg.is_broadcast()
            && msg.round() == Self::NUMBER
            && msg.sender() != self.temp.config.party_index
            && matches!(msg.content(), SignContent::Commitment(_))
    }

    fn update(&self, incoming: &[Envelope]) -> bool {
        self.state.absorb(
            incoming,
            |msg| self.can_accept(msg),
            |msg| match msg.content() {
                SignContent::Commitment(c) => Some(c.commitment),
                _ => None,
            },
        )
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }

    fn next_round(self) -> Result<RevealRound<H>> {
        let commitments = self.state.finish()?;
        let nonce = self
            .nonce
            .ok_or(Error::RoundIncomplete { round: Self::NUMBER })?;
        Ok(RevealRound::new(self.temp, nonce, commitments))
    }
}
