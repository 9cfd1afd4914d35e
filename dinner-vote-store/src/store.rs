use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::VoteError;
use crate::participant::Participant;

/// Participant to display string, the shape of every snapshot.
pub type Votes = BTreeMap<Participant, String>;

/// Joins an option and its description, e.g. `Club — Tacuarí`.
pub const ELABORATION_SEPARATOR: &str = " — ";

/// The one option that only counts together with free text naming the
/// concrete place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElaborationRule {
    label: String,
}

impl ElaborationRule {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Case and surrounding whitespace are ignored.
    #[must_use]
    pub fn applies_to(&self, option: &str) -> bool {
        option.trim().to_lowercase() == self.label.trim().to_lowercase()
    }
}

/// Single source of truth for the current round.
///
/// All reads and writes go through one mutex, so concurrent requests observe
/// the votes as if they had arrived one at a time. The store never hands out
/// the guarded map itself, only copies.
pub struct VoteStore<C = SystemClock> {
    votes: Mutex<Votes>,
    rule: ElaborationRule,
    deadline: Option<DateTime<Utc>>,
    clock: C,
}

impl VoteStore<SystemClock> {
    #[must_use]
    pub const fn new(rule: ElaborationRule) -> Self {
        Self {
            votes: Mutex::new(BTreeMap::new()),
            rule,
            deadline: None,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> VoteStore<C> {
    #[must_use]
    pub fn with_clock<D: Clock>(self, clock: D) -> VoteStore<D> {
        VoteStore {
            votes: self.votes,
            rule: self.rule,
            deadline: self.deadline,
            clock,
        }
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = deadline;
        self
    }

    // every critical section leaves the map consistent, a panic elsewhere
    // while holding the guard does not make the data invalid
    fn lock(&self) -> MutexGuard<'_, Votes> {
        self.votes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub const fn rule(&self) -> &ElaborationRule {
        &self.rule
    }

    #[must_use]
    pub const fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.deadline
            .map_or(true, |deadline| self.clock.now() < deadline)
    }

    #[must_use]
    pub fn snapshot(&self) -> Votes {
        self.lock().clone()
    }

    #[must_use]
    pub fn vote_of(&self, participant: &Participant) -> Option<String> {
        self.lock().get(participant).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Records the vote of `participant` and returns the stored display
    /// string.
    ///
    /// Authentication is the caller's job. The one-vote-per-participant rule
    /// is enforced here regardless: the lookup and the insert happen under
    /// the same lock, so of two racing calls for the same participant exactly
    /// one succeeds.
    pub fn register_vote(
        &self,
        participant: &Participant,
        option: &str,
        elaboration: Option<&str>,
    ) -> Result<String, VoteError> {
        let mut votes = self.lock();
        if !self.is_open() {
            debug!(%participant, "rejected vote, voting is closed");
            return Err(VoteError::VotingClosed);
        }
        let vote = self.compose(option, elaboration)?;
        match votes.entry(participant.clone()) {
            Entry::Occupied(existing) => {
                debug!(%participant, existing = %existing.get(), "rejected second vote");
                Err(VoteError::AlreadyVoted {
                    existing: existing.get().clone(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(vote.clone());
                info!(%participant, %vote, "vote registered");
                Ok(vote)
            }
        }
    }

    /// Discards every recorded vote and returns how many there were.
    pub fn reset(&self) -> usize {
        let cleared = {
            let mut votes = self.lock();
            let cleared = votes.len();
            votes.clear();
            cleared
        };
        info!(cleared, "votes reset");
        cleared
    }

    fn compose(&self, option: &str, elaboration: Option<&str>) -> Result<String, VoteError> {
        if !self.rule.applies_to(option) {
            return Ok(option.to_owned());
        }
        match elaboration.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(format!("{option}{ELABORATION_SEPARATOR}{text}")),
            _ => Err(VoteError::MissingElaboration {
                option: option.to_owned(),
            }),
        }
    }
}
