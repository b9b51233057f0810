//! Rank-aware Skip List
//!
//! A skip list ordered by `(score, uid)` whose links carry spans, so the rank
//! of an entity and the entity at a rank are both found in O(log n).
//!
//! # Span Semantics
//!
//! - `levels[i].span` = number of level-0 hops from a node to `levels[i].forward`
//! - Summing spans along any search path from the head gives the 1-based rank
//!   of the node the path ends on
//! - A link with no forward node spans the nodes remaining after it
//!
//! ```text
//! Level 2: HEAD ----------(3)---------> C ---------------(2)-------> NULL
//! Level 1: HEAD ---(1)--> A ---(2)----> C ---(1)--> D ---(1)-------> NULL
//! Level 0: HEAD -(1)-> A -(1)-> B -(1)-> C -(1)-> D -(1)-> E -(0)-> NULL
//!                     <-      <-       <-       <-       <-   (backward)
//! ```
//!
//! # Ordering
//!
//! Insert and delete stop *before* an equal key (strict `<` on the uid at
//! equal score) so they hold the predecessor of the position they mutate.
//! The rank walk advances *onto* an equal key (`<=`) so it ends on the node
//! it is asked about. The two predicates are kept separate on purpose.
//!
//! # Storage
//!
//! Nodes live in a dense arena addressed by `u32` indices. The head sentinel
//! is not part of the arena. Removing a node moves the last arena node into
//! the vacated slot and repoints its predecessors.

use std::iter::FusedIterator;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_core::RngCore;

use crate::entity::Rankable;
use crate::error::{Error, Result};
use crate::level::{MAX_LEVEL, random_level};
use crate::node::{Entry, HEAD, Idx, Level, NULL, Node, NodeRef};

/// A skip list of entities ranked ascending by `(score, uid)`.
///
/// The list owns the entity values it is handed. To index entities owned
/// elsewhere, store a handle: `&T`, `Rc<T>`, `Arc<T>` or the bare `u64` id.
///
/// Rank 1 is the smallest `(score, uid)`. For a descending leaderboard use
/// `len() - rank + 1`, or the [`Leaderboard`](crate::Leaderboard) wrapper.
pub struct RankList<E, R = StdRng> {
    /// Arena of nodes.
    nodes: Vec<Node<E>>,
    /// Head sentinel levels; only the first `level` are threaded.
    head: [Level; MAX_LEVEL],
    /// Last node in rank order.
    tail: Idx,
    /// Current height of the list, at least 1.
    level: usize,
    /// Random state for height generation.
    rng: R,
}

impl<E> RankList<E, StdRng> {
    /// Create an empty list whose level generator is seeded from the OS.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create an empty list with reproducible node heights.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_rng(capacity, StdRng::from_entropy())
    }
}

impl<E> Default for RankList<E, StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, R> RankList<E, R> {
    pub fn with_rng(rng: R) -> Self {
        Self::with_capacity_and_rng(0, rng)
    }

    pub fn with_capacity_and_rng(capacity: usize, rng: R) -> Self {
        RankList {
            nodes: Vec::with_capacity(capacity),
            head: [Level::EMPTY; MAX_LEVEL],
            tail: NULL,
            level: 1,
            rng,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Current height of the list: the tallest node, or 1 when empty.
    pub fn height(&self) -> usize {
        self.level
    }

    /// The node at rank 1.
    pub fn first(&self) -> Option<NodeRef<'_, E>> {
        NodeRef::at(&self.nodes, self.head[0].forward)
    }

    /// The node at rank `len()`.
    pub fn last(&self) -> Option<NodeRef<'_, E>> {
        NodeRef::at(&self.nodes, self.tail)
    }

    /// Span of the head sentinel at `level`, for levels below [`height`](Self::height).
    pub fn head_span(&self, level: usize) -> Option<usize> {
        (level < self.level).then(|| self.head[level].span)
    }

    /// First node that is at least `level + 1` tall.
    pub fn head_forward(&self, level: usize) -> Option<NodeRef<'_, E>> {
        if level < self.level {
            NodeRef::at(&self.nodes, self.head[level].forward)
        } else {
            None
        }
    }

    /// Iterate `(score, entity)` pairs in ascending rank order.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            nodes: &self.nodes,
            front: self.head[0].forward,
            back: self.tail,
            remaining: self.nodes.len(),
        }
    }

    /// Find the node at a 1-based rank.
    ///
    /// Returns `None` for rank 0 and for ranks past the end.
    pub fn get_element_by_rank(&self, rank: usize) -> Option<NodeRef<'_, E>> {
        let mut traversed = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let Level { forward, span } = self.levels(x)[i];
                if forward == NULL || traversed + span > rank {
                    break;
                }
                traversed += span;
                x = forward;
            }
            if traversed == rank {
                return NodeRef::at(&self.nodes, x);
            }
        }
        None
    }

    /// Up to `n` entities starting from the highest rank, highest first.
    pub fn top_rank_values(&self, n: usize) -> Vec<&E> {
        self.iter().rev().take(n).map(|(_, entity)| entity).collect()
    }

    /// The entity at `rank` with up to `up` entities before it and up to
    /// `down` after it, in ascending rank order.
    ///
    /// Empty when `rank` is not in `1..=len()`.
    pub fn nearby_range(&self, rank: usize, up: usize, down: usize) -> Vec<&E> {
        let Some(target) = self.get_element_by_rank(rank) else {
            return Vec::new();
        };
        let mut range = Vec::with_capacity(up.min(rank - 1) + down.min(self.len() - rank) + 1);

        let mut x = target.prev();
        while let Some(node) = x.filter(|_| range.len() < up) {
            range.push(node.entity());
            x = node.prev();
        }
        range.reverse();
        range.push(target.entity());

        let mut x = target.next();
        for _ in 0..down {
            let Some(node) = x else { break };
            range.push(node.entity());
            x = node.next();
        }
        range
    }

    /// Visit every entity with its rank, from rank 1 upwards or, when
    /// `from_tail` is set, from rank `len()` downwards.
    ///
    /// The walk stops early as soon as `visit` returns `false`.
    pub fn walk<F>(&self, from_tail: bool, mut visit: F)
    where
        F: FnMut(usize, &E) -> bool,
    {
        let len = self.len();
        if from_tail {
            for (offset, (_, entity)) in self.iter().rev().enumerate() {
                if !visit(len - offset, entity) {
                    break;
                }
            }
        } else {
            for (offset, (_, entity)) in self.iter().enumerate() {
                if !visit(offset + 1, entity) {
                    break;
                }
            }
        }
    }

    // --- Node access helpers ---

    fn levels(&self, at: Idx) -> &[Level] {
        if at == HEAD {
            &self.head
        } else {
            &self.nodes[at as usize].levels
        }
    }

    fn level_mut(&mut self, at: Idx, i: usize) -> &mut Level {
        if at == HEAD {
            &mut self.head[i]
        } else {
            &mut self.nodes[at as usize].levels[i]
        }
    }
}

impl<E: Rankable, R> RankList<E, R> {
    /// Whether the node at `idx` sorts strictly before `(score, uid)`.
    fn precedes(&self, idx: Idx, score: u32, uid: u64) -> bool {
        let node = &self.nodes[idx as usize];
        (node.score, node.entity.uid()) < (score, uid)
    }

    /// Like `precedes`, but also true for the node holding `(score, uid)`.
    fn precedes_or_is(&self, idx: Idx, score: u32, uid: u64) -> bool {
        let node = &self.nodes[idx as usize];
        (node.score, node.entity.uid()) <= (score, uid)
    }

    /// Last node strictly before `(score, uid)` at every active level.
    fn predecessors(&self, score: u32, uid: u64) -> [Idx; MAX_LEVEL] {
        let mut update = [HEAD; MAX_LEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let forward = self.levels(x)[i].forward;
                if forward == NULL || !self.precedes(forward, score, uid) {
                    break;
                }
                x = forward;
            }
            update[i] = x;
        }
        update
    }

    /// The 1-based rank of the entity indexed under `score`, or 0 if that
    /// `(score, uid)` pair is not in the list.
    pub fn get_rank<Q: Rankable + ?Sized>(&self, score: u32, entity: &Q) -> usize {
        let uid = entity.uid();
        let mut rank = 0;
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            loop {
                let Level { forward, span } = self.levels(x)[i];
                if forward == NULL || !self.precedes_or_is(forward, score, uid) {
                    break;
                }
                rank += span;
                x = forward;
            }
            if x != HEAD {
                let node = &self.nodes[x as usize];
                if node.score == score && node.entity.uid() == uid {
                    return rank;
                }
            }
        }
        0
    }

    /// Remove the entity indexed under `score` and return it.
    ///
    /// Returns `None`, leaving the list untouched, when the `(score, uid)`
    /// pair is not present.
    pub fn delete<Q: Rankable + ?Sized>(&mut self, score: u32, entity: &Q) -> Option<Entry<E>> {
        let uid = entity.uid();
        let update = self.predecessors(score, uid);

        // Several entities may share the score; only an exact uid match counts.
        let target = self.levels(update[0])[0].forward;
        if target == NULL {
            return None;
        }
        let found = &self.nodes[target as usize];
        if found.score != score || found.entity.uid() != uid {
            if found.score == score {
                log::debug!(
                    "delete of entity {} at score {} found entity {} instead",
                    uid,
                    score,
                    found.entity.uid()
                );
            }
            return None;
        }

        self.unlink(target, &update);
        Some(self.release(target))
    }

    /// Detach `target` from every level, given its predecessors.
    fn unlink(&mut self, target: Idx, update: &[Idx; MAX_LEVEL]) {
        for i in 0..self.level {
            let pred = self.levels(update[i])[i];
            let relinked = if pred.forward == target {
                let skipped = self.nodes[target as usize].levels[i];
                Level {
                    forward: skipped.forward,
                    span: pred.span + skipped.span - 1,
                }
            } else {
                // Target is shorter than this level; the link just covers one node less.
                Level {
                    forward: pred.forward,
                    span: pred.span - 1,
                }
            };
            *self.level_mut(update[i], i) = relinked;
        }

        let node = &self.nodes[target as usize];
        let (next, backward) = (node.next(), node.backward);
        if next == NULL {
            self.tail = backward;
        } else {
            self.nodes[next as usize].backward = backward;
        }

        while self.level > 1 && self.head[self.level - 1].forward == NULL {
            self.level -= 1;
            log::trace!("skip list height shrank to {}", self.level);
        }
    }

    /// Take an unlinked node out of the arena.
    ///
    /// The last arena node is moved into the freed slot, so every link that
    /// pointed at the old index is redirected first.
    fn release(&mut self, target: Idx) -> Entry<E> {
        let last = (self.nodes.len() - 1) as Idx;
        if target != last {
            let moved = &self.nodes[last as usize];
            let (score, uid, height, next) =
                (moved.score, moved.entity.uid(), moved.levels.len(), moved.next());
            let update = self.predecessors(score, uid);
            for (i, &pred) in update.iter().enumerate().take(height) {
                let link = self.level_mut(pred, i);
                debug_assert_eq!(link.forward, last);
                link.forward = target;
            }
            if next == NULL {
                self.tail = target;
            } else {
                self.nodes[next as usize].backward = target;
            }
        }
        let node = self.nodes.swap_remove(target as usize);
        Entry {
            score: node.score,
            entity: node.entity,
        }
    }

    /// Check every structural invariant of the list.
    ///
    /// Walks the whole list, so this is O(n * height); meant for tests and
    /// debugging.
    pub fn validate(&self) -> Result<()> {
        let len = self.nodes.len();
        let fail = |reason: String| Err(Error::Invariant(reason));

        if self.level == 0 || self.level > MAX_LEVEL {
            return fail(format!("height {} outside 1..={}", self.level, MAX_LEVEL));
        }
        if self.level > 1 && self.head[self.level - 1].forward == NULL {
            return fail(format!("top level {} is empty", self.level - 1));
        }
        if let Some(i) = (self.level..MAX_LEVEL).find(|&i| self.head[i].forward != NULL) {
            return fail(format!("head links at inactive level {}", i));
        }

        // Level 0: order, backward links, tail, and each node's rank.
        let mut rank_of = vec![0usize; len];
        let mut prev = NULL;
        let mut x = self.head[0].forward;
        let mut rank = 0;
        while x != NULL {
            if x as usize >= len {
                return fail(format!("dangling link to {} at level 0", x));
            }
            rank += 1;
            if rank > len {
                return fail("cycle at level 0".to_string());
            }
            let node = &self.nodes[x as usize];
            if node.backward != prev {
                return fail(format!("node at rank {} has a wrong backward link", rank));
            }
            if node.levels.is_empty() || node.levels.len() > self.level {
                return fail(format!(
                    "node at rank {} has height {} with list height {}",
                    rank,
                    node.levels.len(),
                    self.level
                ));
            }
            if prev != NULL {
                let before = &self.nodes[prev as usize];
                if (before.score, before.entity.uid()) >= (node.score, node.entity.uid()) {
                    return fail(format!("ranks {} and {} out of order", rank - 1, rank));
                }
            }
            rank_of[x as usize] = rank;
            prev = x;
            x = node.next();
        }
        if rank != len {
            return fail(format!("{} nodes reachable, {} allocated", rank, len));
        }
        if self.tail != prev {
            return fail("tail is not the last node".to_string());
        }

        // Every level: spans agree with level-0 ranks and every tall node is threaded.
        for i in 0..self.level {
            let mut x = HEAD;
            let mut from = 0;
            let mut threaded = 0;
            loop {
                let Level { forward, span } = self.levels(x)[i];
                let expected = if forward == NULL {
                    len - from
                } else {
                    if forward as usize >= len {
                        return fail(format!("dangling link to {} at level {}", forward, i));
                    }
                    let to = rank_of[forward as usize];
                    if to <= from {
                        return fail(format!("link backwards at level {}", i));
                    }
                    if self.nodes[forward as usize].levels.len() <= i {
                        return fail(format!("level {} links to a shorter node", i));
                    }
                    to - from
                };
                if span != expected {
                    return fail(format!(
                        "span {} at level {} after rank {}, expected {}",
                        span, i, from, expected
                    ));
                }
                if forward == NULL {
                    break;
                }
                threaded += 1;
                from = rank_of[forward as usize];
                x = forward;
            }
            let tall = self.nodes.iter().filter(|n| n.levels.len() > i).count();
            if threaded != tall {
                return fail(format!("level {} threads {} of {} nodes", i, threaded, tall));
            }
        }
        Ok(())
    }
}

impl<E: Rankable, R: RngCore> RankList<E, R> {
    /// Insert an entity ranked by `score`.
    ///
    /// The `(score, uid)` pair must not already be in the list: a second copy
    /// corrupts rank accounting. Debug builds assert this; use
    /// [`try_insert`](Self::try_insert) to have it checked.
    pub fn insert(&mut self, score: u32, entity: E) -> NodeRef<'_, E> {
        let uid = entity.uid();
        debug_assert_eq!(
            self.get_rank(score, &uid),
            0,
            "entity {} is already ranked with score {}",
            uid,
            score
        );

        let mut update = [HEAD; MAX_LEVEL];
        // Rank crossed to reach update[i].
        let mut rank = [0usize; MAX_LEVEL];
        let mut x = HEAD;
        for i in (0..self.level).rev() {
            if i + 1 < self.level {
                rank[i] = rank[i + 1];
            }
            loop {
                let Level { forward, span } = self.levels(x)[i];
                if forward == NULL || !self.precedes(forward, score, uid) {
                    break;
                }
                rank[i] += span;
                x = forward;
            }
            update[i] = x;
        }

        let height = random_level(&mut self.rng);
        if height > self.level {
            // Nothing is linked this high yet: the head spans the whole list.
            for i in self.level..height {
                self.head[i].span = self.nodes.len();
            }
            self.level = height;
            log::trace!("skip list height grew to {}", height);
        }

        debug_assert!(self.nodes.len() < HEAD as usize);
        let idx = self.nodes.len() as Idx;
        self.nodes.push(Node::new(height, score, entity));

        for i in 0..height {
            let pred = self.levels(update[i])[i];
            let offset = rank[0] - rank[i];
            self.nodes[idx as usize].levels[i] = Level {
                forward: pred.forward,
                span: pred.span - offset,
            };
            *self.level_mut(update[i], i) = Level {
                forward: idx,
                span: offset + 1,
            };
        }
        // Links above the new node now cover one more node.
        for i in height..self.level {
            self.level_mut(update[i], i).span += 1;
        }

        if update[0] != HEAD {
            self.nodes[idx as usize].backward = update[0];
        }
        let next = self.nodes[idx as usize].next();
        if next == NULL {
            self.tail = idx;
        } else {
            self.nodes[next as usize].backward = idx;
        }

        NodeRef::new(&self.nodes, idx)
    }

    /// Insert an entity, rejecting a `(score, uid)` pair that is already present.
    pub fn try_insert(&mut self, score: u32, entity: E) -> Result<NodeRef<'_, E>> {
        let uid = entity.uid();
        if self.get_rank(score, &uid) != 0 {
            return Err(Error::Duplicate { score, uid });
        }
        Ok(self.insert(score, entity))
    }
}

impl<'a, E, R> IntoIterator for &'a RankList<E, R> {
    type Item = (u32, &'a E);
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(score, entity)` pairs in rank order.
///
/// Forward iteration follows level-0 links; reverse iteration follows the
/// backward links from the tail.
pub struct Iter<'a, E> {
    nodes: &'a [Node<E>],
    front: Idx,
    back: Idx,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = (u32, &'a E);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.front as usize];
        self.front = node.next();
        self.remaining -= 1;
        Some((node.score, &node.entity))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> DoubleEndedIterator for Iter<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.back as usize];
        self.back = node.backward;
        self.remaining -= 1;
        Some((node.score, &node.entity))
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}
