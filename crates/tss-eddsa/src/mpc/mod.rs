//! Message transport between signers

use crate::{Result, SessionId};
use serde::{de::DeserializeOwned, Serialize};

pub use ::async_trait::async_trait;

/// Message relay for MPC communication
///
/// Delivery is per `(session, round)` mailbox, in arrival order. A mailbox
/// may hold anything anyone posted to it: duplicates, messages of another
/// kind, bytes that do not decode. Filtering is up to the receiving round.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Broadcast a message to all parties
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()>;

    /// Wait until the mailbox holds more than `seen` messages and return the
    /// ones after the first `seen`, each decoded on its own
    ///
    /// Fails only when nothing new arrives in time.
    async fn receive_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        seen: usize,
    ) -> Result<Vec<Result<T>>>;
}

/// In-memory relay for testing
pub mod memory;

pub use memory::MemoryRelay;
