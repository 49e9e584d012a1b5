//! In-process lockstep runner for signing tests

use super::{CommitRound, Envelope, ShareRound};
use crate::hash::ChallengeHash;
use crate::keygen::deal_shares;
use crate::round::Round;
use crate::{KeyShare, PartyId, SessionConfig, SigningMessage};
use curve25519_dalek::EdwardsPoint;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;

pub(crate) struct Harness {
    /// Shares of every holder, indexed by `PartyId`
    pub key_shares: Vec<KeyShare>,
    /// One config per signer, indexed by session position
    pub configs: Vec<SessionConfig>,
    pub message: SigningMessage,
    pub rngs: Vec<ChaCha20Rng>,
}

impl Harness {
    /// Deal a `threshold`-of-`n` key and configure `parties` to sign `message`
    pub fn new(
        n: usize,
        threshold: usize,
        parties: &[PartyId],
        message: SigningMessage,
        seed: u64,
    ) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let key_shares = deal_shares(threshold, n, &mut rng).unwrap();
        let mut session_id = [0u8; 32];
        session_id[..8].copy_from_slice(&seed.to_be_bytes());

        let configs = (0..parties.len())
            .map(|i| SessionConfig::new(session_id, threshold, i, parties.to_vec()).unwrap())
            .collect();
        let rngs = (0..parties.len())
            .map(|i| ChaCha20Rng::seed_from_u64(seed * 1000 + i as u64))
            .collect();

        Self {
            key_shares,
            configs,
            message,
            rngs,
        }
    }

    pub fn public_key(&self) -> EdwardsPoint {
        self.key_shares[0].public_key
    }

    pub fn ssid(&self) -> Vec<u8> {
        self.configs[0].ssid(&self.public_key())
    }

    pub fn round1<H: ChallengeHash>(&self) -> Vec<CommitRound<H>> {
        self.configs
            .iter()
            .map(|config| {
                let key_share = &self.key_shares[config.party_id().unwrap()];
                CommitRound::new(config.clone(), key_share, self.message.clone()).unwrap()
            })
            .collect()
    }

    /// Start every round, pass each outgoing message through `tamper`,
    /// deliver everything to everyone and advance
    pub fn lockstep<T: Round>(&mut self, mut rounds: Vec<T>, tamper: impl Fn(&mut Envelope)) -> Vec<T::Next> {
        let mut outgoing: Vec<Envelope> = rounds
            .iter_mut()
            .zip(self.rngs.iter_mut())
            .map(|(round, rng)| round.start(rng).unwrap())
            .collect();
        outgoing.iter_mut().for_each(&tamper);

        for round in &rounds {
            assert!(round.update(&outgoing));
        }
        rounds
            .into_iter()
            .map(|round| match round.next_round() {
                Ok(next) => next,
                Err(e) => panic!("next_round failed: {e}"),
            })
            .collect()
    }

    /// Rounds 1 and 2 in lockstep; `tamper` sees the round 2 messages
    pub fn round3<H: ChallengeHash>(&mut self, tamper: impl Fn(&mut Envelope)) -> Vec<ShareRound<H>> {
        let round1 = self.round1::<H>();
        let round2 = self.lockstep(round1, |_| {});
        self.lockstep(round2, tamper)
    }
}
