//! Signing message types

use crate::commitment::{Decommitment, HashCommitment};
use crate::types::scalar_serde;
use crate::zkp::DlogProof;
use crate::PartyIndex;
use curve25519_dalek::Scalar;
use serde::{Deserialize, Serialize};

/// Round 1 payload: commitment to the nonce point coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceCommitment {
    pub commitment: HashCommitment,
}

/// Round 2 payload: opening of the nonce commitment plus proof of knowledge
/// of the nonce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceReveal {
    pub decommitment: Decommitment,
    pub proof: DlogProof,
}

/// Round 3 payload: signature share `s_i = lambda * w_i + r_i`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureShare {
    #[serde(with = "scalar_serde")]
    pub s: Scalar,
}

/// Payload of a signing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignContent {
    Commitment(NonceCommitment),
    Reveal(NonceReveal),
    Share(SignatureShare),
}

/// A signing message as delivered by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Envelope {
    /// Sent to every party
    Broadcast {
        from: PartyIndex,
        round: u32,
        content: SignContent,
    },
    /// Sent point-to-point
    Direct {
        from: PartyIndex,
        to: PartyIndex,
        round: u32,
        content: SignContent,
    },
}

impl Envelope {
    /// Broadcast `content` from `from` in `round`
    pub fn broadcast(from: PartyIndex, round: u32, content: SignContent) -> Self {
        Envelope::Broadcast {
            from,
            round,
            content,
        }
    }

    /// Sender index
    pub fn sender(&self) -> PartyIndex {
        match self {
            Envelope::Broadcast { from, .. } | Envelope::Direct { from, .. } => *from,
        }
    }

    /// Round number
    pub fn round(&self) -> u32 {
        match self {
            Envelope::Broadcast { round, .. } | Envelope::Direct { round, .. } => *round,
        }
    }

    /// Payload
    pub fn content(&self) -> &SignContent {
        match self {
            Envelope::Broadcast { content, .. } | Envelope::Direct { content, .. } => content,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        matches!(self, Envelope::Broadcast { .. })
    }
}
