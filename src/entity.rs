//! The capability an entity needs to take part in a [`RankList`](crate::RankList).

use std::rc::Rc;
use std::sync::Arc;

/// A value that can be ranked.
///
/// The uid breaks ties between equal scores and identifies the exact node to
/// remove, so it must be unique among the entities currently indexed and must
/// not change while the entity is indexed.
pub trait Rankable {
    /// Unique id of this object.
    fn uid(&self) -> u64;
}

impl Rankable for u64 {
    fn uid(&self) -> u64 {
        *self
    }
}

impl<T: Rankable + ?Sized> Rankable for &T {
    fn uid(&self) -> u64 {
        (**self).uid()
    }
}

impl<T: Rankable + ?Sized> Rankable for Box<T> {
    fn uid(&self) -> u64 {
        (**self).uid()
    }
}

impl<T: Rankable + ?Sized> Rankable for Rc<T> {
    fn uid(&self) -> u64 {
        (**self).uid()
    }
}

impl<T: Rankable + ?Sized> Rankable for Arc<T> {
    fn uid(&self) -> u64 {
        (**self).uid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Player {
        id: u64,
    }

    impl Rankable for Player {
        fn uid(&self) -> u64 {
            self.id
        }
    }

    #[test]
    fn handles_forward_uid() {
        let player = Player { id: 42 };
        assert_eq!((&player).uid(), 42);
        assert_eq!(Rc::new(Player { id: 7 }).uid(), 7);
        assert_eq!(Arc::new(Player { id: 8 }).uid(), 8);
        assert_eq!(Box::new(Player { id: 9 }).uid(), 9);
        assert_eq!(5u64.uid(), 5);
    }
}
