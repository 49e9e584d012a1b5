//! Round 2: open the nonce commitment

use super::{Envelope, Nonce, NonceReveal, ShareRound, SignContent, SignTemp};
use crate::commitment::HashCommitment;
use crate::hash::ChallengeHash;
use crate::round::{Phase, Round, RoundState};
use crate::Result;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha512;
use std::marker::PhantomData;
use tracing::debug;

/// Second signing round
pub struct RevealRound<H = Sha512> {
    temp: SignTemp,
    nonce: Nonce,
    commitments: Vec<HashCommitment>,
    state: RoundState<NonceReveal>,
    _hash: PhantomData<fn() -> H>,
}

impl<H: ChallengeHash> RevealRound<H> {
    pub(crate) fn new(temp: SignTemp, nonce: Nonce, commitments: Vec<HashCommitment>) -> Self {
        let state = RoundState::new(Self::NUMBER, temp.config.n_parties());
        Self {
            temp,
            nonce,
            commitments,
            state,
            _hash: PhantomData,
        }
    }
}

impl<H: ChallengeHash> Round for RevealRound<H> {
    type Next = ShareRound<H>;
    const NUMBER: u32 = 2;

    fn start<R: RngCore + CryptoRng>(&mut self, _rng: &mut R) -> Result<Envelope> {
        self.state.begin()?;
        let i = self.temp.config.party_index;

        let reveal = self.nonce.reveal.clone();
        self.state.table().accept(i, reveal.clone());
        debug!(party_index = i, "Nonce revealed");

        Ok(Envelope::broadcast(i, Self::NUMBER, SignContent::Reveal(reveal)))
    }

    fn can_accept(&self, msg: &Envelope) -> bool {
        msg.is_broadcast()
            && msg.round() == Self::NUMBER
            && msg.sender() != self.temp.config.party_index
            && matches!(msg.content(), SignContent::Reveal(_))
    }

    fn update(&self, incoming: &[Envelope]) -> bool {
        self.state.absorb(
            incoming,
            |msg| self.can_accept(msg),
            |msg| match msg.content() {
                SignContent::Reveal(reveal) => Some(reveal.clone()),
                _ => None,
            },
        )
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }

    fn next_round(self) -> Result<ShareRound<H>> {
        let reveals = self.state.finish()?;
        Ok(ShareRound::new(self.temp, self.nonce, self.commitments, reveals))
    }
}
