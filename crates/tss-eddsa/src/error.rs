//! Error types for threshold EdDSA signing

use crate::PartyIndex;
use thiserror::Error;

/// Result type alias for signing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during protocol execution
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid session configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Threshold requirements not met
    #[error("Threshold not met: required {required}, got {actual}")]
    ThresholdNotMet { required: usize, actual: usize },

    /// Invalid party ID
    #[error("Invalid party ID: {0}")]
    InvalidPartyId(usize),

    /// A proof constructor was given a witness or statement it cannot prove
    #[error("Invalid witness: {0}")]
    InvalidWitness(String),

    /// A peer's decommitment does not open its commitment
    #[error("Round {round}: decommitment from party {party} does not match its commitment")]
    DecommitmentFailed { party: PartyIndex, round: u32 },

    /// A peer revealed something other than a pair of coordinates
    #[error("Round {round}: decommitment from party {party} has {len} values, expected 2")]
    MalformedDecommitment {
        party: PartyIndex,
        round: u32,
        len: usize,
    },

    /// A peer revealed coordinates that are not a usable curve point
    #[error("Round {round}: party {party} revealed an invalid point")]
    InvalidPoint { party: PartyIndex, round: u32 },

    /// A peer's proof of knowledge did not verify
    #[error("Round {round}: proof from party {party} failed to verify")]
    ProofVerificationFailed { party: PartyIndex, round: u32 },

    /// A signature share made the aggregated signature invalid
    #[error("Signature share from party {party} is invalid")]
    InvalidShare { party: PartyIndex },

    /// A round object was started twice
    #[error("Round {round} already started")]
    AlreadyStarted { round: u32 },

    /// A round was advanced before every sender was accepted
    #[error("Round {round} has not received all messages")]
    RoundIncomplete { round: u32 },

    /// A hash input segment was empty
    #[error("Hash input segment {index} is empty")]
    EmptyHashSegment { index: usize },

    /// Message does not fit the declared fixed encoding length
    #[error("Message of {len} bytes exceeds fixed length {max}")]
    MessageTooLong { len: usize, max: usize },

    /// A challenge hash could not be computed
    #[error("Hash error: {0}")]
    Hash(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Network/relay error
    #[error("Relay error: {0}")]
    Relay(String),

    /// Timeout waiting for message
    #[error("Timeout waiting for {0}")]
    Timeout(String),

    /// Invalid signature
    #[error("Invalid signature")]
    InvalidSignature,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Index of the party that caused the abort, if the failure is attributable
    pub fn culprit(&self) -> Option<PartyIndex> {
        match self {
            Error::DecommitmentFailed { party, .. }
            | Error::MalformedDecommitment { party, .. }
            | Error::InvalidPoint { party, .. }
            | Error::ProofVerificationFailed { party, .. }
            | Error::InvalidShare { party } => Some(*party),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
