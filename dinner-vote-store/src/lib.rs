//! The authoritative state of a dinner vote.
//!
//! [`VoteStore`] owns the mapping of participant to chosen venue and is the
//! only place it is mutated. Everything else works on [`Votes`] snapshots,
//! which are plain copies: [`tally`] turns one into counts and leaders,
//! [`progress`] into who is still missing.

pub mod clock;
pub mod deadline;
pub mod error;
pub mod options;
pub mod participant;
pub mod store;
pub mod tally;

pub use clock::{Clock, SystemClock};
pub use deadline::end_of_day;
pub use error::VoteError;
pub use options::{OptionBoard, OptionList};
pub use participant::Participant;
pub use store::{ElaborationRule, VoteStore, Votes, ELABORATION_SEPARATOR};
pub use tally::{progress, tally, Outcome, RoundProgress, TallyResult};
