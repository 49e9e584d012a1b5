//! # tss-eddsa
//!
//! Threshold EdDSA (Ed25519) signing.
//!
//! This crate provides:
//! - Fiat-Shamir proofs of knowledge of a discrete logarithm and of a pair
//!   of exponents
//! - A three-round signing protocol producing standard Ed25519 signatures
//!   from Shamir-shared keys
//! - Round bookkeeping with exactly-once message acceptance and an async
//!   driver over a message relay
//!
//! ## Protocol Overview
//!
//! Each signer commits to a fresh nonce point, reveals it together with a
//! proof of knowledge, then checks every peer's opening and proof before
//! releasing `s_i = lambda * w_i + r_i`. Any failure before the share is
//! released aborts the session and names the peer at fault.
//!
//! ## Example
//!
//! ```rust,ignore
//! use tss_eddsa::{sign, SessionConfig, SigningMessage};
//!
//! let config = SessionConfig::new(session_id, 2, my_index, vec![0, 2])?;
//! let signature = sign::run_dsg::<sha2::Sha512, _, _>(
//!     &config,
//!     &key_share,
//!     SigningMessage::new(message),
//!     &relay,
//!     &mut rand::rngs::OsRng,
//! )
//! .await?;
//! ```

pub mod commitment;
pub mod error;
pub mod group;
pub mod hash;
#[cfg(any(test, feature = "trusted-dealer"))]
pub mod keygen;
pub mod mpc;
pub mod round;
pub mod sign;
pub mod types;
pub mod zkp;

pub use error::{Error, Result};
pub use hash::ChallengeHash;
pub use types::{
    KeyShare, PartyId, PartyIndex, SessionConfig, SessionId, Signature, SigningMessage,
};

/// Protocol version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
