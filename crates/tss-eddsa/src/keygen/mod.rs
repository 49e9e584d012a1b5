//! Key share provisioning
//!
//! Signing takes key shares as input. The only way this crate produces them
//! is a trusted dealer, for tests and local demos; production shares come
//! from a distributed key generation run elsewhere.

mod dealer;

pub use dealer::{deal_shares, evaluate_polynomial};
