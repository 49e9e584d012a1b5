//! DSG protocol driver

use super::{CommitRound, Envelope};
use crate::hash::ChallengeHash;
use crate::mpc::Relay;
use crate::round::Round;
use crate::{KeyShare, Result, SessionConfig, Signature, SigningMessage};
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info, instrument, trace, warn};

/// Run the distributed signature generation protocol
///
/// # Arguments
/// * `config` - Session configuration; `party_index` picks this signer
/// * `key_share` - This party's key share
/// * `message` - Message to sign
/// * `relay` - Message relay for communication
/// * `rng` - Source of nonces and proof randomness
///
/// # Returns
/// The Ed25519 signature, identical at every honest signer
#[instrument(
    skip(config, key_share, message, relay, rng),
    fields(party_index = config.party_index, n_parties = config.n_parties())
)]
pub async fn run_dsg<H, R, G>(
    config: &SessionConfig,
    key_share: &KeyShare,
    message: SigningMessage,
    relay: &R,
    rng: &mut G,
) -> Result<Signature>
where
    H: ChallengeHash,
    R: Relay,
    G: RngCore + CryptoRng + Send,
{
    info!(participants = ?config.parties, "Starting DSG");

    let round1 = CommitRound::<H>::new(config.clone(), key_share, message)?;
    let round2 = exchange(round1, config, relay, rng).await?;
    let round3 = exchange(round2, config, relay, rng).await?;
    let finalization = exchange(round3, config, relay, rng).await?;

    let signature = finalization.finalize()?;
    info!(
        r = hex::encode(signature.r),
        s = hex::encode(signature.s),
        "DSG completed successfully"
    );

    Ok(signature)
}

/// Start `round`, broadcast its message and feed it the mailbox until every
/// peer is accepted
///
/// Messages the round cannot use (duplicates, other rounds or kinds,
/// undecodable bytes) are skipped; only the relay timing out ends the wait.
async fn exchange<T, R, G>(
    mut round: T,
    config: &SessionConfig,
    relay: &R,
    rng: &mut G,
) -> Result<T::Next>
where
    T: Round,
    R: Relay,
    G: RngCore + CryptoRng,
{
    debug!(round = T::NUMBER, "Round started");
    let outgoing = round.start(rng)?;
    relay.broadcast(&config.session_id, T::NUMBER, &outgoing).await?;

    let mut seen = 0;
    loop {
        let batch = relay
            .receive_broadcasts::<Envelope>(&config.session_id, T::NUMBER, seen)
            .await?;
        seen += batch.len();

        let incoming: Vec<Envelope> = batch
            .into_iter()
            .filter_map(|msg| match msg {
                Ok(msg) => Some(msg),
                Err(e) => {
                    warn!(round = T::NUMBER, error = %e, "Dropping undecodable message");
                    None
                }
            })
            .collect();
        if round.update(&incoming) {
            break;
        }
        trace!(round = T::NUMBER, seen, "Waiting for more peers");
    }

    debug!(round = T::NUMBER, "Round completed");
    round.next_round()
}
