use thiserror::Error;

/// Why [`crate::VoteStore::register_vote`] refused a vote.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("you already voted for {existing}")]
    AlreadyVoted { existing: String },
    #[error("tell us which one: {option:?} needs a short description")]
    MissingElaboration { option: String },
    #[error("voting is closed for this round")]
    VotingClosed,
}
