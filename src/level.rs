//! Randomized node heights.

use rand_core::RngCore;

/// Maximum skip list height. Twelve levels at P = 1/4 comfortably index
/// millions of entries.
pub const MAX_LEVEL: usize = 12;

/// A coin flip promotes when the low 16 bits of a draw fall in the bottom
/// quarter of their range (P = 1/4).
const PROMOTE_BELOW: u32 = 0x4000;

/// Draw a node height in `1..=MAX_LEVEL`.
///
/// Each extra level is granted with probability 1/4, so heights follow a
/// geometric distribution and most nodes stay one or two levels tall.
pub fn random_level<R: RngCore + ?Sized>(rng: &mut R) -> usize {
    let mut level = 1;
    while level < MAX_LEVEL && (rng.next_u32() & 0xFFFF) < PROMOTE_BELOW {
        level += 1;
    }
    level
}
