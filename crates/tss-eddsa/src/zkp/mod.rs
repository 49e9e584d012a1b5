//! Non-interactive zero-knowledge proofs
//!
//! Schnorr-style sigma protocols made non-interactive with Fiat-Shamir:
//! - [`DlogProof`]: knowledge of `x` with `X = x * G`
//! - [`DualProof`]: knowledge of `(s, l)` with `V = s * R + l * G`
//!
//! Challenges are tagged hashes of the session context and every public
//! value of the statement, folded into `[0, q)` by rejection sampling.

pub mod dlog;
pub mod dual;

pub use dlog::DlogProof;
pub use dual::DualProof;
