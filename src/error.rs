use thiserror::Error;

/// Errors reported by [`RankList`](crate::RankList) and
/// [`Leaderboard`](crate::Leaderboard).
///
/// Absent lookups are not errors; they come back as `None` or rank `0`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The `(score, uid)` pair (or, for a leaderboard, the uid) is already indexed.
    #[error("entity {uid} is already ranked with score {score}")]
    Duplicate { score: u32, uid: u64 },
    /// A structural check failed; the list is corrupt.
    #[error("skip list invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
