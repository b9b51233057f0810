//! Scenario and churn tests for the rank list.
//!
//! The churn tests model a game server: a population of players with
//! clustered scores that are re-ranked over and over, checked against an
//! external sort of the same population.

use std::collections::HashSet;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ranklist::{RankList, Rankable};

// =============================================================================
// Test helpers
// =============================================================================

#[derive(Debug)]
struct Player {
    uid: u64,
    level: u16,
}

impl Rankable for Player {
    fn uid(&self) -> u64 {
        self.uid
    }
}

/// `(uid, score)` pairs. With `dup_scores` scores are drawn from `1..=max_score`,
/// otherwise every player gets a distinct score counting down from `max_score`.
fn make_players(rng: &mut StdRng, count: usize, max_score: u32, dup_scores: bool) -> Vec<(u64, u32)> {
    let mut next_id = 100_000_000u64;
    (0..count)
        .map(|i| {
            next_id += 1;
            let score = if dup_scores {
                rng.gen_range(1..=max_score)
            } else {
                max_score - i as u32
            };
            (next_id, score)
        })
        .collect()
}

/// The players sorted the way the list should rank them.
fn sorted(players: &[(u64, u32)]) -> Vec<(u64, u32)> {
    let mut sorted = players.to_vec();
    sorted.sort_by_key(|&(uid, score)| (score, uid));
    sorted
}

fn assert_ranks_match(list: &RankList<u64>, players: &[(u64, u32)]) {
    for (i, &(uid, score)) in sorted(players).iter().enumerate() {
        assert_eq!(list.get_rank(score, &uid), i + 1, "rank of uid {} score {}", uid, score);
    }
}

/// Re-rank up to `count` players: delete with the old score, bump it, insert again.
fn many_updates(list: &mut RankList<u64>, players: &mut [(u64, u32)], rng: &mut StdRng, count: usize) {
    for (uid, score) in players.iter_mut().take(count) {
        let entry = list
            .delete(*score, &*uid)
            .unwrap_or_else(|| panic!("delete of uid {} score {} failed", uid, score));
        assert_eq!(entry.entity, *uid);
        *score += rng.gen_range(1..=100);
        list.insert(*score, entry.entity);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn re_rank_three_players() {
    let a = Rc::new(Player { uid: 1, level: 3 });
    let b = Rc::new(Player { uid: 2, level: 7 });
    let c = Rc::new(Player { uid: 3, level: 1 });

    let mut list = RankList::with_seed(42);
    list.insert(10, Rc::clone(&a));
    list.insert(20, Rc::clone(&b));
    list.insert(30, Rc::clone(&c));
    assert_eq!(list.get_rank(20, &b), 2);

    let entry = list.delete(20, &b).unwrap();
    assert_eq!(entry.entity.level, 7);
    list.insert(5, entry.entity);

    assert_eq!(list.get_rank(5, &b), 1);
    assert_eq!(list.get_rank(10, &a), 2);
    assert_eq!(list.get_rank(30, &c), 3);
    // The list holds the other handle of each player.
    assert_eq!(Rc::strong_count(&b), 2);
    list.validate().unwrap();
}

#[test]
fn borrowed_entities() {
    let players: Vec<Player> = (0..50).map(|uid| Player { uid, level: 0 }).collect();
    let mut list = RankList::with_seed(1);
    for player in &players {
        list.insert((player.uid % 5) as u32, player);
    }
    let first = list.first().unwrap();
    assert_eq!(first.score(), 0);
    assert_eq!(first.entity().uid, 0);
    assert_eq!(list.get_rank(4, &&players[49]), 50);
}

#[test]
fn top_three_of_a_hundred() {
    let mut list = RankList::with_seed(7);
    for score in 1..=100u32 {
        list.insert(score, 1000 + score as u64);
    }
    let top: Vec<u64> = list.top_rank_values(3).into_iter().copied().collect();
    assert_eq!(top, vec![1100, 1099, 1098]);
}

#[test]
fn absent_lookups_do_not_mutate() {
    let mut list = RankList::with_seed(9);
    for uid in 0..100u64 {
        list.insert(uid as u32 * 2, uid);
    }
    let before = list.to_string();
    assert_eq!(list.get_rank(1, &0u64), 0);
    assert!(list.delete(1, &0u64).is_none());
    assert!(list.delete(200, &100u64).is_none());
    assert!(list.delete(10, &6u64).is_none());
    assert_eq!(list.len(), 100);
    assert_eq!(list.to_string(), before);
}

// =============================================================================
// Churn
// =============================================================================

#[test]
fn insert_remove_all_many_turns() {
    const UNITS: usize = 10_000;
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let players = make_players(&mut rng, UNITS, 1000, true);
    let mut list = RankList::with_capacity_and_rng(UNITS, StdRng::seed_from_u64(1));

    for _ in 0..5 {
        for &(uid, score) in &players {
            list.insert(score, uid);
        }
        assert_eq!(list.len(), UNITS);

        let unique: HashSet<u64> = list.iter().map(|(_, uid)| *uid).collect();
        assert_eq!(unique.len(), UNITS, "duplicate entity in list");

        for &(uid, score) in &players {
            let entry = list.delete(score, &uid).expect("delete failed");
            assert_eq!(entry.entity, uid);
        }
        assert_eq!(list.len(), 0);
        assert_eq!(list.height(), 1);
        assert!(list.last().is_none());
    }
    list.validate().unwrap();
}

#[test]
fn changed_insert_keeps_count() {
    const UNITS: usize = 10_000;
    let mut rng = StdRng::seed_from_u64(17);
    let mut players = make_players(&mut rng, UNITS, 1000, true);
    let mut list = RankList::with_seed(2);
    for &(uid, score) in &players {
        list.insert(score, uid);
    }

    many_updates(&mut list, &mut players, &mut rng, UNITS / 2);
    assert_eq!(list.len(), UNITS);
    list.validate().unwrap();
    assert_ranks_match(&list, &players);

    for &(uid, score) in &players {
        assert!(list.delete(score, &uid).is_some(), "delete uid {} score {}", uid, score);
    }
    assert!(list.is_empty());
}

#[test]
fn ranks_agree_with_sort() {
    const UNITS: usize = 10_000;
    let mut rng = StdRng::seed_from_u64(23);
    let players = make_players(&mut rng, UNITS, UNITS as u32, false);
    let mut list = RankList::with_seed(3);
    for &(uid, score) in &players {
        list.insert(score, uid);
    }
    assert_ranks_match(&list, &players);

    // Descending leaderboard position: the highest score is first.
    let (top_uid, top_score) = players[0];
    assert_eq!(list.len() - list.get_rank(top_score, &top_uid) + 1, 1);
}

#[test]
fn ranks_survive_repeated_updates() {
    const UNITS: usize = 2_000;
    let mut rng = StdRng::seed_from_u64(29);
    let mut players = make_players(&mut rng, UNITS, UNITS as u32, false);
    let mut list = RankList::with_seed(4);
    for &(uid, score) in &players {
        list.insert(score, uid);
    }

    for turn in 0..20 {
        // Rotate so every turn re-ranks a different half.
        players.rotate_left(turn * 37 % UNITS);
        many_updates(&mut list, &mut players, &mut rng, UNITS / 2);
        assert_ranks_match(&list, &players);

        for k in (1..=UNITS).step_by(97) {
            let node = list.get_element_by_rank(k).unwrap();
            assert_eq!(list.get_rank(node.score(), node.entity()), k);
        }
    }
    list.validate().unwrap();
}

#[test]
fn walk_visits_in_rank_order() {
    let mut rng = StdRng::seed_from_u64(31);
    let players = make_players(&mut rng, 500, 50, true);
    let mut list = RankList::with_seed(5);
    for &(uid, score) in &players {
        list.insert(score, uid);
    }
    let expected: Vec<u64> = sorted(&players).into_iter().map(|(uid, _)| uid).collect();

    let mut forward = Vec::new();
    list.walk(false, |rank, uid| {
        assert_eq!(rank, forward.len() + 1);
        forward.push(*uid);
        true
    });
    assert_eq!(forward, expected);

    let mut backward = Vec::new();
    list.walk(true, |rank, uid| {
        assert_eq!(rank, list.len() - backward.len());
        backward.push(*uid);
        true
    });
    backward.reverse();
    assert_eq!(backward, expected);
}
