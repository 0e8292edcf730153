use std::collections::HashMap;

use nexus_sortedset::{Config, ScoreRange, SortedSet};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Scenario: 1000 keys, random scores in [1, 750]
// =============================================================================

#[test]
fn thousand_keys_sorted_and_ranked() {
    let mut rng = SmallRng::seed_from_u64(2024);
    let mut set: SortedSet<u64, u64> = SortedSet::with_rng(SmallRng::seed_from_u64(12345));

    for key in 1..=1000u64 {
        let score = rng.random_range(1..=750) as f64;
        assert!(set.insert(key, score, key));
    }

    assert_eq!(set.len(), 1000);
    set.check_invariants();

    let all: Vec<_> = set.range_by_rank(1, 1000).collect();
    assert_eq!(all.len(), 1000);
    for pair in all.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            a.score() < b.score() || (a.score() == b.score() && a.value() < b.value()),
            "out of order: {a:?} then {b:?}"
        );
    }
    for (i, member) in all.iter().enumerate() {
        assert_eq!(set.rank(member.key()), Some(i + 1));
        assert_eq!(set.get_by_rank(i + 1), Some(*member));
    }
}

#[test]
fn thousand_keys_survive_churn() {
    let mut rng = SmallRng::seed_from_u64(7);
    let mut set: SortedSet<u64, u64> = SortedSet::from_config(&Config::new().with_seed(7)).unwrap();

    for key in 1..=1000u64 {
        set.insert(key, rng.random_range(1..=750) as f64, key);
    }
    // Remove every third key, rescore every fifth
    for key in (1..=1000u64).step_by(3) {
        assert!(set.remove(&key).is_some());
    }
    for key in (2..=1000u64).step_by(5) {
        if set.contains_key(&key) {
            let new_score = rng.random_range(1..=750) as f64;
            assert_eq!(set.update_score(&key, new_score).map(|m| m.score()), Some(new_score));
        }
    }

    assert_eq!(set.len(), 1000 - 334);
    set.check_invariants();
    for (i, member) in set.iter().enumerate() {
        assert_eq!(set.rank(member.key()), Some(i + 1));
    }
}

// =============================================================================
// Random operation mix against a HashMap model
// =============================================================================

#[test]
fn random_operation_mix() {
    let mut rng = SmallRng::seed_from_u64(99);
    let mut set: SortedSet<u32, u32> = SortedSet::with_rng(SmallRng::seed_from_u64(3));
    // key -> score; value is always the key, so positions never clash
    let mut model: HashMap<u32, f64> = HashMap::new();

    for step in 0..20_000 {
        let key = rng.random_range(0..500u32);
        match rng.random_range(0..10) {
            0..=3 => {
                let score = rng.random_range(0..100) as f64;
                let inserted = set.insert(key, score, key);
                assert_eq!(inserted, !model.contains_key(&key));
                model.entry(key).or_insert(score);
            }
            4..=5 => {
                let removed = set.remove(&key).map(|m| m.score());
                assert_eq!(removed, model.remove(&key));
            }
            6..=7 => {
                let score = rng.random_range(0..100) as f64;
                let updated = set.update_score(&key, score).is_some();
                assert_eq!(updated, model.contains_key(&key));
                if let Some(s) = model.get_mut(&key) {
                    *s = score;
                }
            }
            8 => {
                let lo = rng.random_range(0..100) as f64;
                let hi = lo + rng.random_range(0..5) as f64;
                let removed = set.delete_range_by_score(&ScoreRange::inclusive(lo, hi));
                for m in &removed {
                    assert!(m.score() >= lo && m.score() <= hi);
                    assert_eq!(model.remove(m.key()), Some(m.score()));
                }
                assert!(model.values().all(|&s| s < lo || s > hi));
            }
            _ => {
                assert_eq!(set.score(&key), model.get(&key).copied());
            }
        }

        assert_eq!(set.len(), model.len());
        if step % 1000 == 0 {
            set.check_invariants();
        }
    }

    set.check_invariants();
    let mut expected: Vec<(f64, u32)> = model.iter().map(|(&k, &s)| (s, k)).collect();
    expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let got: Vec<(f64, u32)> = set.iter().map(|m| (m.score(), *m.key())).collect();
    assert_eq!(got, expected);
}

#[test]
fn drain_from_both_ends() {
    let mut set: SortedSet<u32, u32> = SortedSet::with_rng(SmallRng::seed_from_u64(11));
    for k in 0..100 {
        set.insert(k, (k % 10) as f64, k);
    }

    let mut last_front = f64::NEG_INFINITY;
    let mut last_back = f64::INFINITY;
    while !set.is_empty() {
        let front = set.pop_first().unwrap();
        assert!(front.score() >= last_front);
        last_front = front.score();
        if let Some(back) = set.pop_last() {
            assert!(back.score() <= last_back);
            last_back = back.score();
        }
    }
    set.check_invariants();
}
