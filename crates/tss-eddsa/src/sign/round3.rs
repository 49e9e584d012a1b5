//! Round 3: verify peer nonces and produce the signature share

use super::{Envelope, Finalization, Nonce, NonceReveal, SignContent, SignTemp, SignatureShare};
use crate::commitment::HashCommitment;
use crate::group;
use crate::hash::{self, ChallengeHash};
use crate::round::{Phase, Round, RoundState};
use crate::types::party_context;
use crate::{Error, PartyIndex, Result};
use curve25519_dalek::{traits::IsIdentity, EdwardsPoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use sha2::Sha512;
use std::marker::PhantomData;
use tracing::{debug, warn};

#[cfg(feature = "multi-thread")]
use rayon::prelude::*;

/// Values fixed by a successful `start`
struct ShareOutput {
    big_r: EdwardsPoint,
    lambda: Scalar,
    nonce_points: Vec<EdwardsPoint>,
    message: Vec<u8>,
}

/// Third signing round
pub struct ShareRound<H = Sha512> {
    temp: SignTemp,
    nonce: Nonce,
    commitments: Vec<HashCommitment>,
    reveals: Vec<NonceReveal>,
    state: RoundState<Scalar>,
    output: Option<ShareOutput>,
    _hash: PhantomData<fn() -> H>,
}

impl<H: ChallengeHash> ShareRound<H> {
    pub(crate) fn new(
        temp: SignTemp,
        nonce: Nonce,
        commitments: Vec<HashCommitment>,
        reveals: Vec<NonceReveal>,
    ) -> Self {
        let state = RoundState::new(Self::NUMBER, temp.config.n_parties());
        Self {
            temp,
            nonce,
            commitments,
            reveals,
            state,
            output: None,
            _hash: PhantomData,
        }
    }

    /// Aggregated nonce point `R`, once started
    pub fn aggregate_nonce(&self) -> Option<EdwardsPoint> {
        self.output.as_ref().map(|o| o.big_r)
    }

    /// Signature challenge `lambda`, once started
    pub fn challenge(&self) -> Option<Scalar> {
        self.output.as_ref().map(|o| o.lambda)
    }

    /// This party's signature share, once started
    pub fn share(&self) -> Option<Scalar> {
        self.state
            .table()
            .get(self.temp.config.party_index)
            .copied()
    }

    /// Open peer `j`'s commitment, rebuild `R_j` and check its proof
    fn open_peer_nonce(&self, j: PartyIndex) -> Result<EdwardsPoint> {
        let round = Self::NUMBER;
        let reveal = &self.reveals[j];

        let values = self.commitments[j]
            .open(&reveal.decommitment)
            .ok_or(Error::DecommitmentFailed { party: j, round })?;
        let [x, y] = values else {
            return Err(Error::MalformedDecommitment {
                party: j,
                round,
                len: values.len(),
            });
        };

        let point = group::from_affine(x, y).ok_or(Error::InvalidPoint { party: j, round })?;
        let point = group::clear_cofactor(&point);
        if point.is_identity() {
            return Err(Error::InvalidPoint { party: j, round });
        }

        if !reveal.proof.verify(&party_context(&self.temp.ssid, j), &point) {
            return Err(Error::ProofVerificationFailed { party: j, round });
        }
        Ok(point)
    }

    /// Open every peer's nonce; the first failure in index order wins
    fn open_peer_nonces(&self) -> Result<Vec<EdwardsPoint>> {
        let i = self.temp.config.party_index;
        let peers: Vec<PartyIndex> = (0..self.temp.config.n_parties())
            .filter(|j| *j != i)
            .collect();

        #[cfg(feature = "multi-thread")]
        let opened: Vec<Result<EdwardsPoint>> = peers
            .par_iter()
            .map(|&j| self.open_peer_nonce(j))
            .collect();

        #[cfg(not(feature = "multi-thread"))]
        let opened: Vec<Result<EdwardsPoint>> =
            peers.iter().map(|&j| self.open_peer_nonce(j)).collect();

        let mut nonce_points = vec![self.nonce.point; self.temp.config.n_parties()];
        for (j, result) in peers.into_iter().zip(opened) {
            nonce_points[j] = result.map_err(|e| {
                warn!(party_index = i, culprit = j, error = %e, "Peer nonce rejected");
                e
            })?;
        }
        Ok(nonce_points)
    }
}

impl<H: ChallengeHash> Round for ShareRound<H> {
    type Next = Finalization;
    const NUMBER: u32 = 3;

    fn start<R: RngCore + CryptoRng>(&mut self, _rng: &mut R) -> Result<Envelope> {
        self.state.begin()?;
        let i = self.temp.config.party_index;

        let nonce_points = self.open_peer_nonces()?;
        let big_r: EdwardsPoint = nonce_points.iter().sum();

        let encoded_r = group::encode_point(&big_r);
        let encoded_pk = group::encode_point(&self.temp.public_key);
        let message = self.temp.message.encode()?;
        let lambda = hash::signature_challenge::<H>(&[
            encoded_r.as_slice(),
            encoded_pk.as_slice(),
            message.as_slice(),
        ])?;

        let s = lambda * self.temp.signing_share + self.nonce.secret;

        debug!(
            party_index = i,
            r = hex::encode(encoded_r),
            lambda = hex::encode(lambda.as_bytes()),
            "Signature share computed"
        );

        self.state.table().accept(i, s);
        self.output = Some(ShareOutput {
            big_r,
            lambda,
            nonce_points,
            message,
        });

        Ok(Envelope::broadcast(
            i,
            Self::NUMBER,
            SignContent::Share(SignatureShare { s }),
        ))
    }

    fn can_accept(&self, msg: &Envelope) -> bool {
        msg.is_broadcast()
            && msg.round() == Self::NUMBER
            && msg.sender() != self.temp.config.party_index
            && matches!(msg.content(), SignContent::Share(_))
    }

    fn update(&self, incoming: &[Envelope]) -> bool {
        self.state.absorb(
            incoming,
            |msg| self.can_accept(msg),
            |msg| match msg.content() {
                SignContent::Share(share) => Some(share.s),
                _ => None,
            },
        )
    }

    fn phase(&self) -> Phase {
        self.state.phase()
    }

    fn next_round(self) -> Result<Finalization> {
        let shares = self.state.finish()?;
        let output = self
            .output
            .ok_or(Error::RoundIncomplete { round: Self::NUMBER })?;
        Ok(Finalization::new(
            self.temp,
            output.big_r,
            output.lambda,
            output.nonce_points,
            shares,
            output.message,
        ))
    }
}
