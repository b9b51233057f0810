//! Arena nodes and the read-only handle exposed to callers.

use smallvec::SmallVec;

/// Node index type. u32 saves space vs usize on 64-bit.
pub(crate) type Idx = u32;

/// Null index marker.
pub(crate) const NULL: Idx = Idx::MAX;

/// Stands in for the head sentinel wherever a predecessor is recorded.
pub(crate) const HEAD: Idx = Idx::MAX - 1;

/// One level of a node: the next node that is at least this tall, and the
/// number of level-0 hops it takes to get there.
///
/// When `forward` is `NULL` the span counts the nodes remaining after this
/// one, which keeps the insert and delete arithmetic uniform at the end of a
/// level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Level {
    pub(crate) forward: Idx,
    pub(crate) span: usize,
}

impl Level {
    pub(crate) const EMPTY: Level = Level {
        forward: NULL,
        span: 0,
    };
}

/// A node in the skip list. Each node stores exactly one entity.
pub(crate) struct Node<E> {
    pub(crate) score: u32,
    pub(crate) entity: E,
    /// Previous node at level 0, `NULL` for the first node.
    pub(crate) backward: Idx,
    /// Most nodes are one or two levels tall, so four slots stay inline.
    pub(crate) levels: SmallVec<[Level; 4]>,
}

impl<E> Node<E> {
    pub(crate) fn new(height: usize, score: u32, entity: E) -> Self {
        Node {
            score,
            entity,
            backward: NULL,
            levels: SmallVec::from_elem(Level::EMPTY, height),
        }
    }

    pub(crate) fn next(&self) -> Idx {
        self.levels[0].forward
    }
}

/// An entity removed from the list together with the score it was ranked by.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<E> {
    pub score: u32,
    pub entity: E,
}

/// A borrowed view of one node in a [`RankList`](crate::RankList).
///
/// Handles walk the list in either direction and expose the per-level
/// links and spans for inspection.
pub struct NodeRef<'a, E> {
    nodes: &'a [Node<E>],
    idx: Idx,
}

impl<E> Clone for NodeRef<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for NodeRef<'_, E> {}

impl<'a, E> NodeRef<'a, E> {
    pub(crate) fn new(nodes: &'a [Node<E>], idx: Idx) -> Self {
        NodeRef { nodes, idx }
    }

    pub(crate) fn at(nodes: &'a [Node<E>], idx: Idx) -> Option<Self> {
        if idx == NULL || idx == HEAD {
            None
        } else {
            Some(NodeRef::new(nodes, idx))
        }
    }

    fn node(&self) -> &'a Node<E> {
        &self.nodes[self.idx as usize]
    }

    pub fn score(&self) -> u32 {
        self.node().score
    }

    pub fn entity(&self) -> &'a E {
        &self.node().entity
    }

    /// Number of levels this node participates in.
    pub fn height(&self) -> usize {
        self.node().levels.len()
    }

    /// Level-0 hops from this node to its forward link at `level`, or `None`
    /// if the node is not that tall.
    pub fn span(&self, level: usize) -> Option<usize> {
        self.node().levels.get(level).map(|l| l.span)
    }

    /// The next node that is at least `level + 1` tall.
    pub fn forward(&self, level: usize) -> Option<NodeRef<'a, E>> {
        let l = self.node().levels.get(level)?;
        NodeRef::at(self.nodes, l.forward)
    }

    /// The following node in rank order.
    pub fn next(&self) -> Option<NodeRef<'a, E>> {
        NodeRef::at(self.nodes, self.node().next())
    }

    /// The preceding node in rank order.
    pub fn prev(&self) -> Option<NodeRef<'a, E>> {
        NodeRef::at(self.nodes, self.node().backward)
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for NodeRef<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("score", &self.score())
            .field("entity", self.entity())
            .field("height", &self.height())
            .finish()
    }
}
