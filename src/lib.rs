//! Ranklist - a rank-aware skip list for leaderboards.
//!
//! Entities are kept sorted by `(score, uid)` and the list answers "what rank
//! does this entity hold" and "which entity holds rank K" in expected
//! O(log n), alongside ordered insertion and deletion.
//!
//! # Quick Start
//!
//! ```
//! use ranklist::RankList;
//!
//! // Bare `u64` ids are rankable; so are `&T`, `Rc<T>` and `Arc<T>`
//! // when `T: Rankable`.
//! let mut list = RankList::with_seed(7);
//! list.insert(10, 1u64);
//! list.insert(20, 2u64);
//! list.insert(30, 3u64);
//! assert_eq!(list.get_rank(20, &2u64), 2);
//!
//! // Re-rank: delete with the old score, insert with the new one.
//! list.delete(20, &2u64);
//! list.insert(5, 2u64);
//! assert_eq!(list.get_rank(5, &2u64), 1);
//! assert_eq!(list.get_element_by_rank(3).map(|n| *n.entity()), Some(3));
//! ```

mod dump;
pub mod entity;
pub mod error;
pub mod leaderboard;
pub mod level;
mod node;
mod skip_list;

pub use entity::Rankable;
pub use error::{Error, Result};
pub use leaderboard::Leaderboard;
pub use level::{MAX_LEVEL, random_level};
pub use node::{Entry, NodeRef};
pub use skip_list::{Iter, RankList};
