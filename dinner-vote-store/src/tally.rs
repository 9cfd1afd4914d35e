use std::collections::BTreeMap;

use itertools::Itertools as _;
use serde::Serialize;

use crate::participant::Participant;
use crate::store::Votes;

/// Standings computed from one snapshot.
///
/// Display strings are counted verbatim, so `Club — Atenas` and
/// `Club — Tacuarí` are separate entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TallyResult {
    pub counts: BTreeMap<String, usize>,
    /// Every option with `max_count` votes, in lexical order.
    pub leaders: Vec<String>,
    pub max_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome<'a> {
    NoVotes,
    Winner { option: &'a str, votes: usize },
    /// Ties are reported, never broken.
    Tie { options: &'a [String], votes: usize },
}

impl TallyResult {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn outcome(&self) -> Outcome<'_> {
        match self.leaders.as_slice() {
            [] => Outcome::NoVotes,
            [option] => Outcome::Winner {
                option,
                votes: self.max_count,
            },
            options => Outcome::Tie {
                options,
                votes: self.max_count,
            },
        }
    }
}

#[must_use]
pub fn tally(votes: &Votes) -> TallyResult {
    let counts: BTreeMap<String, usize> = votes.values().cloned().counts().into_iter().collect();
    let max_count = counts.values().copied().max().unwrap_or(0);
    let leaders = counts
        .iter()
        .filter(|&(_, &count)| count == max_count)
        .map(|(option, _)| option.clone())
        .collect();
    TallyResult {
        counts,
        leaders,
        max_count,
    }
}

/// Who has voted and who is still missing, in roster order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundProgress {
    pub voted: Vec<Participant>,
    pub pending: Vec<Participant>,
    pub complete: bool,
}

pub fn progress<'a>(
    roster: impl IntoIterator<Item = &'a Participant>,
    votes: &Votes,
) -> RoundProgress {
    let (voted, pending): (Vec<_>, Vec<_>) = roster
        .into_iter()
        .cloned()
        .partition(|participant| votes.contains_key(participant));
    RoundProgress {
        complete: pending.is_empty(),
        voted,
        pending,
    }
}
