//! A leaderboard keyed by uid.
//!
//! [`RankList`] needs the caller to remember each entity's current score
//! before it can find, delete or re-rank it. `Leaderboard` keeps that record
//! in a hash map beside the list, so entities are addressed by uid alone and
//! re-ranking is a single [`upsert`](Leaderboard::upsert).
//!
//! Positions count from the top: position 1 holds the highest score.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_core::RngCore;
use rustc_hash::FxHashMap;

use crate::entity::Rankable;
use crate::error::{Error, Result};
use crate::node::{Entry, NodeRef};
use crate::skip_list::RankList;

pub struct Leaderboard<E, R = StdRng> {
    list: RankList<E, R>,
    /// Current score of every ranked uid.
    scores: FxHashMap<u64, u32>,
}

impl<E> Leaderboard<E, StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<E> Default for Leaderboard<E, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> Leaderboard<E, R> {
    pub fn with_rng(rng: R) -> Self {
        Leaderboard {
            list: RankList::with_rng(rng),
            scores: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// The underlying index, ascending by `(score, uid)`.
    pub fn list(&self) -> &RankList<E, R> {
        &self.list
    }

    pub fn score(&self, uid: u64) -> Option<u32> {
        self.scores.get(&uid).copied()
    }

    pub fn contains(&self, uid: u64) -> bool {
        self.scores.contains_key(&uid)
    }

    /// The node at a 1-based position counted from the highest score.
    pub fn at_position(&self, position: usize) -> Option<NodeRef<'_, E>> {
        if position == 0 || position > self.len() {
            return None;
        }
        self.list.get_element_by_rank(self.len() - position + 1)
    }

    /// The `n` highest-ranked entities, best first.
    pub fn top(&self, n: usize) -> Vec<&E> {
        self.list.top_rank_values(n)
    }

    /// Visit entities best first with their positions, until `visit`
    /// returns `false`.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(usize, &E) -> bool,
    {
        for (offset, (_, entity)) in self.list.iter().rev().enumerate() {
            if !visit(offset + 1, entity) {
                break;
            }
        }
    }
}

impl<E: Rankable, R> Leaderboard<E, R> {
    /// Ascending 1-based rank of `uid`, lowest score first.
    pub fn rank(&self, uid: u64) -> Option<usize> {
        let score = self.score(uid)?;
        match self.list.get_rank(score, &uid) {
            0 => None,
            rank => Some(rank),
        }
    }

    /// Position of `uid` counted from the highest score.
    pub fn position(&self, uid: u64) -> Option<usize> {
        self.rank(uid).map(|rank| self.len() - rank + 1)
    }

    pub fn get(&self, uid: u64) -> Option<&E> {
        let rank = self.rank(uid)?;
        self.list.get_element_by_rank(rank).map(|node| node.entity())
    }

    /// `uid` with up to `up` better-placed and `down` worse-placed
    /// neighbours, best first.
    pub fn around(&self, uid: u64, up: usize, down: usize) -> Vec<&E> {
        let Some(rank) = self.rank(uid) else {
            return Vec::new();
        };
        // Better positions are higher ranks.
        let mut range = self.list.nearby_range(rank, down, up);
        range.reverse();
        range
    }

    pub fn remove(&mut self, uid: u64) -> Option<Entry<E>> {
        let score = self.scores.remove(&uid)?;
        let entry = self.list.delete(score, &uid);
        debug_assert!(entry.is_some(), "entity {} missing from the list", uid);
        entry
    }
}

impl<E: Rankable, R: RngCore> Leaderboard<E, R> {
    /// Rank a new entity. Fails if its uid is already on the board.
    pub fn insert(&mut self, score: u32, entity: E) -> Result<()> {
        let uid = entity.uid();
        if let Some(existing) = self.score(uid) {
            return Err(Error::Duplicate {
                score: existing,
                uid,
            });
        }
        self.list.insert(score, entity);
        self.scores.insert(uid, score);
        Ok(())
    }

    /// Rank an entity under `score`, replacing any entry with the same uid.
    ///
    /// Returns the replaced entry.
    pub fn upsert(&mut self, score: u32, entity: E) -> Option<Entry<E>> {
        let uid = entity.uid();
        let replaced = self.remove(uid);
        self.list.insert(score, entity);
        self.scores.insert(uid, score);
        replaced
    }
}
