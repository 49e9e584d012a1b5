//! In-memory relay shared by tasks of one process

use super::{async_trait, Relay};
use crate::{Error, Result, SessionId};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// How long `receive_broadcasts` waits for something new before giving up
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// In-memory message relay for local testing
#[derive(Clone)]
pub struct MemoryRelay {
    /// (session_id, round) -> serialized messages
    broadcasts: Arc<DashMap<(SessionId, u32), Vec<Vec<u8>>>>,
    notify: broadcast::Sender<()>,
    timeout: Duration,
}

impl MemoryRelay {
    /// Create a new in-memory relay
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Relay whose receives fail with [`Error::Timeout`] after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        let (notify, _) = broadcast::channel(100);
        Self {
            broadcasts: Arc::new(DashMap::new()),
            notify,
            timeout,
        }
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| Error::Serialization(e.to_string()))
}

fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| Error::Deserialization(e.to_string()))
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()> {
        let bytes = serialize(message)?;
        self.broadcasts
            .entry((*session_id, round))
            .or_default()
            .push(bytes);
        // no receivers just means nobody is waiting yet
        let _ = self.notify.send(());
        Ok(())
    }

    async fn receive_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        seen: usize,
    ) -> Result<Vec<Result<T>>> {
        let key = (*session_id, round);
        let mut rx = self.notify.subscribe();
        let wait = async {
            loop {
                if let Some(messages) = self.broadcasts.get(&key) {
                    if messages.len() > seen {
                        return messages[seen..]
                            .iter()
                            .map(|bytes| deserialize(bytes))
                            .collect::<Vec<Result<T>>>();
                    }
                }
                trace!(round, seen, "Waiting for messages");

                tokio::select! {
                    _ = rx.recv() => continue,
                    _ = tokio::time::sleep(Duration::from_millis(100)) => continue,
                }
            }
        };

        tokio::time::timeout(self.timeout, wait).await.map_err(|_| {
            warn!(timeout = ?self.timeout, round, seen, "Timed out waiting for broadcasts");
            Error::Timeout(format!("round {round} broadcasts after the first {seen}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sign::{Envelope, SignContent, SignatureShare};
    use crate::types::new_session_id;
    use crate::PartyIndex;
    use curve25519_dalek::Scalar;

    fn share(from: PartyIndex, s: u64) -> Envelope {
        Envelope::broadcast(from, 3, SignContent::Share(SignatureShare { s: Scalar::from(s) }))
    }

    fn decoded(batch: Vec<Result<Envelope>>) -> Vec<Envelope> {
        batch.into_iter().map(|msg| msg.unwrap()).collect()
    }

    #[tokio::test]
    async fn test_broadcast() {
        let relay = MemoryRelay::new();
        let session_id = [0u8; 32];

        relay.broadcast(&session_id, 3, &share(0, 42)).await.unwrap();
        relay.broadcast(&session_id, 3, &share(1, 43)).await.unwrap();

        let messages = relay.receive_broadcasts(&session_id, 3, 0).await.unwrap();
        assert_eq!(decoded(messages), vec![share(0, 42), share(1, 43)]);

        let rest = relay.receive_broadcasts(&session_id, 3, 1).await.unwrap();
        assert_eq!(decoded(rest), vec![share(1, 43)]);
    }

    #[tokio::test]
    async fn test_undecodable_message_stands_alone() {
        let relay = MemoryRelay::new();
        let session_id = [4u8; 32];

        relay.broadcast(&session_id, 3, &share(0, 1)).await.unwrap();
        relay.broadcast(&session_id, 3, &"not an envelope").await.unwrap();
        relay.broadcast(&session_id, 3, &share(1, 2)).await.unwrap();

        let messages: Vec<Result<Envelope>> =
            relay.receive_broadcasts(&session_id, 3, 0).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].as_ref().unwrap(), &share(0, 1));
        assert!(matches!(messages[1], Err(Error::Deserialization(_))));
        assert_eq!(messages[2].as_ref().unwrap(), &share(1, 2));
    }

    #[tokio::test]
    async fn test_sessions_are_separate() {
        let relay = MemoryRelay::with_timeout(Duration::from_millis(200));
        let (ours, theirs) = (new_session_id(), new_session_id());
        assert_ne!(ours, theirs);
        relay.broadcast(&theirs, 1, &share(0, 1)).await.unwrap();

        let result = relay.receive_broadcasts::<Envelope>(&ours, 1, 0).await;
        assert!(matches!(result, Err(Error::Timeout(_))));
    }

    #[tokio::test]
    async fn test_waits_for_late_sender() {
        let relay = MemoryRelay::new();
        let session_id = [3u8; 32];
        relay.broadcast(&session_id, 2, &share(0, 1)).await.unwrap();

        let late = relay.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            late.broadcast(&session_id, 2, &share(1, 2)).await.unwrap();
        });

        let messages = relay.receive_broadcasts(&session_id, 2, 1).await.unwrap();
        assert_eq!(decoded(messages), vec![share(1, 2)]);
    }
}
