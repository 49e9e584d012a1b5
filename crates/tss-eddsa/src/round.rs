//! Round bookkeeping shared by the signing rounds
//!
//! Every round keeps one slot per expected sender. A slot is written at most
//! once ([`OnceLock`]), so re-delivery is a no-op and concurrent `update`
//! calls cannot overwrite an accepted message.

use crate::sign::Envelope;
use crate::{Error, PartyIndex, Result};
use rand_core::{CryptoRng, RngCore};
use std::sync::OnceLock;
use tracing::trace;

/// Lifecycle of a round object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, `start` not yet called
    NotStarted,
    /// Own message sent, waiting for peers
    Started,
    /// Every sender accepted
    Completed,
}

/// One exactly-once slot per sender
#[derive(Debug)]
pub struct AcceptanceTable<T> {
    slots: Box<[OnceLock<T>]>,
}

impl<T> AcceptanceTable<T> {
    /// Table for `n` senders
    pub fn new(n: usize) -> Self {
        Self {
            slots: (0..n).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Accept `value` from `sender`; returns false if the slot was already
    /// filled or the sender is out of range
    pub fn accept(&self, sender: PartyIndex, value: T) -> bool {
        self.slots
            .get(sender)
            .is_some_and(|slot| slot.set(value).is_ok())
    }

    /// Whether `sender` has been accepted
    pub fn is_accepted(&self, sender: PartyIndex) -> bool {
        self.get(sender).is_some()
    }

    /// Accepted value of `sender`
    pub fn get(&self, sender: PartyIndex) -> Option<&T> {
        self.slots.get(sender).and_then(OnceLock::get)
    }

    /// Number of accepted senders
    pub fn accepted(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    /// Whether every sender has been accepted
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|slot| slot.get().is_some())
    }

    /// All values in sender order, if complete
    pub fn into_values(self) -> Option<Vec<T>> {
        self.slots
            .into_vec()
            .into_iter()
            .map(OnceLock::into_inner)
            .collect()
    }
}

/// Phase tracking plus acceptance table of one round
#[derive(Debug)]
pub(crate) struct RoundState<T> {
    number: u32,
    started: bool,
    table: AcceptanceTable<T>,
}

impl<T> RoundState<T> {
    pub(crate) fn new(number: u32, n: usize) -> Self {
        Self {
            number,
            started: false,
            table: AcceptanceTable::new(n),
        }
    }

    /// Move `NotStarted -> Started`; a second call is a scheduling bug
    pub(crate) fn begin(&mut self) -> Result<()> {
        if self.started {
            return Err(Error::AlreadyStarted { round: self.number });
        }
        self.started = true;
        Ok(())
    }

    pub(crate) fn phase(&self) -> Phase {
        match (self.started, self.table.is_complete()) {
            (false, _) => Phase::NotStarted,
            (true, false) => Phase::Started,
            (true, true) => Phase::Completed,
        }
    }

    pub(crate) fn table(&self) -> &AcceptanceTable<T> {
        &self.table
    }

    /// Accept every well-formed message in `incoming`; returns whether all
    /// senders are now accepted
    pub(crate) fn absorb(
        &self,
        incoming: &[Envelope],
        can_accept: impl Fn(&Envelope) -> bool,
        extract: impl Fn(&Envelope) -> Option<T>,
    ) -> bool {
        for msg in incoming {
            if !can_accept(msg) {
                trace!(round = self.number, from = msg.sender(), "Ignoring message");
                continue;
            }
            if self.table.is_accepted(msg.sender()) {
                continue;
            }
            if let Some(value) = extract(msg) {
                self.table.accept(msg.sender(), value);
            }
        }
        self.table.is_complete()
    }

    /// Consume the round once completed, yielding the accepted values
    pub(crate) fn finish(self) -> Result<Vec<T>> {
        if self.phase() != Phase::Completed {
            return Err(Error::RoundIncomplete { round: self.number });
        }
        self.table
            .into_values()
            .ok_or(Error::RoundIncomplete { round: self.number })
    }
}

/// A signing round as seen by one party
pub trait Round: Sized {
    /// What the round turns into once complete
    type Next;

    /// Round number carried by this round's messages
    const NUMBER: u32;

    /// Compute and return this party's broadcast; callable once
    fn start<R: RngCore + CryptoRng>(&mut self, rng: &mut R) -> Result<Envelope>;

    /// Whether `msg` is the kind of message this round consumes
    fn can_accept(&self, msg: &Envelope) -> bool;

    /// Accept newly delivered messages; returns true once every sender is accepted
    fn update(&self, incoming: &[Envelope]) -> bool;

    /// Current phase
    fn phase(&self) -> Phase;

    /// Transition to the next round
    fn next_round(self) -> Result<Self::Next>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_written_once() {
        let table = AcceptanceTable::new(3);
        assert!(table.accept(1, "first"));
        assert!(!table.accept(1, "second"));
        assert_eq!(table.get(1), Some(&"first"));
        assert_eq!(table.accepted(), 1);
        assert!(!table.accept(3, "out of range"));
    }

    #[test]
    fn test_concurrent_accept() {
        let table = AcceptanceTable::new(4);
        let winners: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|t| {
                    let table = &table;
                    s.spawn(move || (0..4).filter(|j| table.accept(*j, t)).count())
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(winners, 4);
        assert!(table.is_complete());
    }

    #[test]
    fn test_round_state_transitions() {
        let mut state: RoundState<u8> = RoundState::new(3, 2);
        assert_eq!(state.phase(), Phase::NotStarted);

        state.begin().unwrap();
        assert!(matches!(state.begin(), Err(Error::AlreadyStarted { round: 3 })));
        assert_eq!(state.phase(), Phase::Started);

        state.table().accept(0, 10);
        state.table().accept(1, 11);
        assert_eq!(state.phase(), Phase::Completed);
        assert_eq!(state.finish().unwrap(), vec![10, 11]);
    }

    #[test]
    fn test_finish_before_complete() {
        let mut state: RoundState<u8> = RoundState::new(2, 2);
        state.begin().unwrap();
        state.table().accept(0, 1);
        assert!(matches!(state.finish(), Err(Error::RoundIncomplete { round: 2 })));
    }
}
