//! Core types for threshold EdDSA signing

use crate::group::{self, GENERATOR};
use crate::hash::TaggedHash;
use crate::{Error, Result};
use curve25519_dalek::{EdwardsPoint, Scalar};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Long-term identifier of a key share holder (Shamir evaluation point `id + 1`)
pub type PartyId = usize;

/// Position of a party within one signing session, in `[0, n)`
pub type PartyIndex = usize;

/// Unique identifier for a signing session
pub type SessionId = [u8; 32];

const SSID_TAG: &[u8] = b"tss-eddsa/ssid";

/// Generate a fresh random session identifier
pub fn new_session_id() -> SessionId {
    rand::random()
}

/// Ed25519 signature `(R, S)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Compressed nonce point R
    pub r: [u8; 32],
    /// Scalar S, little-endian
    pub s: [u8; 32],
}

impl Signature {
    /// Create a new signature
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Self { r, s }
    }

    /// Convert to bytes (R || S)
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..].copy_from_slice(&self.s);
        bytes
    }

    /// Verify as a standard Ed25519 signature over `message`
    pub fn verify(&self, public_key: &EdwardsPoint, message: &[u8]) -> Result<()> {
        let key = ed25519_dalek::VerifyingKey::from_bytes(&group::encode_point(public_key))
            .map_err(|e| Error::Deserialization(e.to_string()))?;
        let signature = ed25519_dalek::Signature::from_bytes(&self.to_bytes());
        key.verify_strict(message, &signature)
            .map_err(|_| Error::InvalidSignature)
    }
}

/// Message to be signed, treated as a big-endian integer
///
/// Without a fixed length the message is encoded minimally (leading zero
/// bytes dropped). With a fixed length it is left-padded with zeros to
/// exactly that many bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningMessage {
    value: Vec<u8>,
    fixed_len: Option<usize>,
}

impl SigningMessage {
    /// Message with its natural big-endian encoding
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self {
            value: value.into(),
            fixed_len: None,
        }
    }

    /// Message encoded to exactly `len` bytes
    pub fn fixed(value: impl Into<Vec<u8>>, len: usize) -> Self {
        Self {
            value: value.into(),
            fixed_len: Some(len),
        }
    }

    /// Bytes that enter the challenge hash and that a verifier checks against
    pub fn encode(&self) -> Result<Vec<u8>> {
        let start = self
            .value
            .iter()
            .position(|b| *b != 0)
            .unwrap_or(self.value.len());
        let minimal = &self.value[start..];

        match self.fixed_len {
            None => Ok(minimal.to_vec()),
            Some(len) if minimal.len() > len => Err(Error::MessageTooLong {
                len: minimal.len(),
                max: len,
            }),
            Some(len) => {
                let mut out = vec![0u8; len];
                out[len - minimal.len()..].copy_from_slice(minimal);
                Ok(out)
            }
        }
    }
}

pub(crate) mod scalar_serde {
    use crate::group;
    use curve25519_dalek::Scalar;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(scalar: &Scalar, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(scalar.as_bytes())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Scalar, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        group::decode_scalar(&bytes).ok_or_else(|| serde::de::Error::custom("Invalid scalar"))
    }
}

pub(crate) mod point_serde {
    use crate::group;
    use curve25519_dalek::EdwardsPoint;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(point: &EdwardsPoint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&group::encode_point(point))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<EdwardsPoint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes: Vec<u8> = Vec::deserialize(deserializer)?;
        group::decode_point(&bytes).ok_or_else(|| serde::de::Error::custom("Invalid point"))
    }
}

mod points_serde {
    use crate::group;
    use curve25519_dalek::EdwardsPoint;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(points: &[EdwardsPoint], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded: Vec<Vec<u8>> = points
            .iter()
            .map(|p| group::encode_point(p).to_vec())
            .collect();
        encoded.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<EdwardsPoint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded: Vec<Vec<u8>> = Vec::deserialize(deserializer)?;
        encoded
            .iter()
            .map(|bytes| {
                group::decode_point(bytes)
                    .ok_or_else(|| serde::de::Error::custom("Invalid point"))
            })
            .collect()
    }
}

/// Key share held by a party after key generation
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyShare {
    /// This party's ID
    pub party_id: PartyId,

    /// Total number of share holders
    pub n_parties: usize,

    /// Minimum number of signers
    pub threshold: usize,

    /// This party's secret share x_i
    #[serde(with = "scalar_serde")]
    pub secret_share: Scalar,

    /// Joint public key A
    #[zeroize(skip)]
    #[serde(with = "point_serde")]
    pub public_key: EdwardsPoint,

    /// Public key shares X_j = x_j * G of all share holders
    #[zeroize(skip)]
    #[serde(with = "points_serde")]
    pub public_shares: Vec<EdwardsPoint>,
}

impl KeyShare {
    /// Check internal consistency of the share
    pub fn validate(&self) -> Result<()> {
        if self.public_shares.len() != self.n_parties {
            return Err(Error::InvalidConfig(format!(
                "expected {} public shares, got {}",
                self.n_parties,
                self.public_shares.len()
            )));
        }
        let own_public = self
            .public_shares
            .get(self.party_id)
            .ok_or(Error::InvalidPartyId(self.party_id))?;
        if GENERATOR * self.secret_share != *own_public {
            return Err(Error::InvalidConfig(
                "secret share does not match its public share".into(),
            ));
        }
        if !group::is_valid(&self.public_key) {
            return Err(Error::InvalidConfig("invalid joint public key".into()));
        }
        Ok(())
    }

    /// Lagrange-weighted secret share `w_i = lambda_i * x_i` for this signing set
    pub fn signing_share(&self, parties: &[PartyId]) -> Result<Scalar> {
        Ok(lagrange_coefficient(self.party_id, parties)? * self.secret_share)
    }

    /// Lagrange-weighted public share `W_j = lambda_j * X_j` of a signer
    pub fn weighted_public_share(&self, party_id: PartyId, parties: &[PartyId]) -> Result<EdwardsPoint> {
        let public_share = self
            .public_shares
            .get(party_id)
            .ok_or(Error::InvalidPartyId(party_id))?;
        Ok(public_share * lagrange_coefficient(party_id, parties)?)
    }
}

/// Lagrange coefficient of `party_id` at zero over the signing set
pub fn lagrange_coefficient(party_id: PartyId, parties: &[PartyId]) -> Result<Scalar> {
    if !parties.contains(&party_id) {
        return Err(Error::InvalidPartyId(party_id));
    }
    check_distinct(parties)?;
    let i = Scalar::from(party_id as u64 + 1);
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;

    for &j_id in parties {
        if j_id == party_id {
            continue;
        }
        let j = Scalar::from(j_id as u64 + 1);
        numerator *= j;
        denominator *= j - i;
    }

    Ok(numerator * denominator.invert())
}

fn check_distinct(parties: &[PartyId]) -> Result<()> {
    let distinct: BTreeSet<_> = parties.iter().collect();
    if distinct.len() != parties.len() {
        return Err(Error::InvalidConfig(
            "Signing set contains duplicate parties".into(),
        ));
    }
    Ok(())
}

/// Configuration of one signing session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session identifier, shared by all signers
    pub session_id: SessionId,

    /// Minimum number of signers
    pub threshold: usize,

    /// This party's position in `parties`
    pub party_index: PartyIndex,

    /// Key share holders taking part, in session order
    pub parties: Vec<PartyId>,
}

impl SessionConfig {
    /// Create a new session configuration
    pub fn new(
        session_id: SessionId,
        threshold: usize,
        party_index: PartyIndex,
        parties: Vec<PartyId>,
    ) -> Result<Self> {
        let config = Self {
            session_id,
            threshold,
            party_index,
            parties,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants `new` enforces; configs built field by field or
    /// deserialized must pass this before use
    pub fn validate(&self) -> Result<()> {
        if self.threshold < 2 {
            return Err(Error::InvalidConfig(
                "Threshold must be at least 2".into(),
            ));
        }
        if self.parties.len() < self.threshold {
            return Err(Error::ThresholdNotMet {
                required: self.threshold,
                actual: self.parties.len(),
            });
        }
        check_distinct(&self.parties)?;
        if self.party_index >= self.parties.len() {
            return Err(Error::InvalidPartyId(self.party_index));
        }
        Ok(())
    }

    /// Number of signers in this session
    pub fn n_parties(&self) -> usize {
        self.parties.len()
    }

    /// Key share holder ID of this party
    pub fn party_id(&self) -> Result<PartyId> {
        self.parties
            .get(self.party_index)
            .copied()
            .ok_or(Error::InvalidPartyId(self.party_index))
    }

    /// Session tag binding the session id, the signing set and the public key
    pub fn ssid(&self, public_key: &EdwardsPoint) -> Vec<u8> {
        let mut hash = TaggedHash::new(SSID_TAG)
            .chain(self.session_id)
            .chain(group::encode_point(public_key))
            .chain((self.parties.len() as u64).to_be_bytes());
        for party in &self.parties {
            hash = hash.chain((*party as u64).to_be_bytes());
        }
        hash.finalize().to_vec()
    }
}

/// Per-party proof context `ssid || j`
pub fn party_context(ssid: &[u8], index: PartyIndex) -> Vec<u8> {
    [ssid, &(index as u64).to_be_bytes()].concat()
}
