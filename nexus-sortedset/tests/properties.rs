//! Property tests against a sorted `Vec` oracle.

use proptest::prelude::*;

use nexus_sortedset::{ScoreRange, SkipList, SortedSet, ValueRange};
use rand::SeedableRng;
use rand::rngs::SmallRng;

// =============================================================================
// Generators
// =============================================================================

/// Distinct keys with small integer scores so ties are common.
fn entries() -> impl Strategy<Value = Vec<(u16, f64)>> {
    prop::collection::hash_map(any::<u16>(), 0u8..40, 0..300)
        .prop_map(|m| m.into_iter().map(|(k, s)| (k, s as f64)).collect())
}

fn score_range() -> impl Strategy<Value = ScoreRange> {
    (0u8..40, 0u8..10, any::<bool>(), any::<bool>()).prop_map(|(min, width, lo_ex, hi_ex)| {
        let min = min as f64;
        ScoreRange::new(min, lo_ex, min + width as f64, hi_ex)
    })
}

fn build(entries: &[(u16, f64)], seed: u64) -> SortedSet<u16, u16> {
    let mut set = SortedSet::with_rng(SmallRng::seed_from_u64(seed));
    for &(k, s) in entries {
        assert!(set.insert(k, s, k));
    }
    set
}

/// `(score, key)` pairs in list order.
fn oracle(entries: &[(u16, f64)]) -> Vec<(f64, u16)> {
    let mut sorted: Vec<(f64, u16)> = entries.iter().map(|&(k, s)| (s, k)).collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    sorted
}

fn snapshot(set: &SortedSet<u16, u16>) -> Vec<(f64, u16)> {
    set.iter().map(|m| (m.score(), *m.key())).collect()
}

// =============================================================================
// Ordering and ranks
// =============================================================================

proptest! {
    #[test]
    fn prop_iteration_is_sorted(entries in entries(), seed in any::<u64>()) {
        let set = build(&entries, seed);
        set.check_invariants();
        prop_assert_eq!(snapshot(&set), oracle(&entries));
    }

    #[test]
    fn prop_rank_agrees_with_position(entries in entries(), seed in any::<u64>()) {
        let set = build(&entries, seed);
        for (i, (_, key)) in oracle(&entries).into_iter().enumerate() {
            prop_assert_eq!(set.rank(&key), Some(i + 1));
            prop_assert_eq!(set.get_by_rank(i + 1).map(|m| *m.key()), Some(key));
        }
        prop_assert!(set.get_by_rank(entries.len() + 1).is_none());
    }

    #[test]
    fn prop_reverse_iteration_mirrors_forward(entries in entries(), seed in any::<u64>()) {
        let set = build(&entries, seed);
        let mut forward = snapshot(&set);
        forward.reverse();
        let backward: Vec<(f64, u16)> = set.iter().rev().map(|m| (m.score(), *m.key())).collect();
        prop_assert_eq!(backward, forward);
    }
}

// =============================================================================
// Ranges
// =============================================================================

proptest! {
    #[test]
    fn prop_score_range_matches_filter(entries in entries(), range in score_range(), seed in any::<u64>()) {
        let set = build(&entries, seed);
        let expected: Vec<(f64, u16)> = oracle(&entries)
            .into_iter()
            .filter(|&(s, _)| range.contains(s))
            .collect();

        let got: Vec<(f64, u16)> = set.range_by_score(&range).map(|m| (m.score(), *m.key())).collect();
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(set.count_by_score(&range), expected.len());
    }

    #[test]
    fn prop_delete_score_range_matches_filter(entries in entries(), range in score_range(), seed in any::<u64>()) {
        let mut set = build(&entries, seed);
        let (gone, kept): (Vec<_>, Vec<_>) = oracle(&entries)
            .into_iter()
            .partition(|&(s, _)| range.contains(s));

        let removed: Vec<(f64, u16)> = set
            .delete_range_by_score(&range)
            .into_iter()
            .map(|m| (m.score(), *m.key()))
            .collect();
        prop_assert_eq!(removed, gone);
        prop_assert_eq!(snapshot(&set), kept);
        set.check_invariants();
    }

    #[test]
    fn prop_rank_range_matches_slice(entries in entries(), a in 1usize..320, b in 1usize..320, seed in any::<u64>()) {
        let set = build(&entries, seed);
        let sorted = oracle(&entries);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let expected: Vec<(f64, u16)> = sorted
            .iter()
            .copied()
            .skip(lo - 1)
            .take(hi - lo + 1)
            .collect();

        let got: Vec<(f64, u16)> = set.range_by_rank(a, b).map(|m| (m.score(), *m.key())).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_delete_rank_range_matches_slice(entries in entries(), a in 1usize..320, b in 1usize..320, seed in any::<u64>()) {
        let mut set = build(&entries, seed);
        let mut sorted = oracle(&entries);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let start = (lo - 1).min(sorted.len());
        let end = hi.min(sorted.len());
        let expected: Vec<(f64, u16)> = sorted.drain(start..end).collect();

        let removed: Vec<(f64, u16)> = set
            .delete_range_by_rank(a, b)
            .into_iter()
            .map(|m| (m.score(), *m.key()))
            .collect();
        prop_assert_eq!(removed, expected);
        prop_assert_eq!(snapshot(&set), sorted);
        set.check_invariants();
    }

    #[test]
    fn prop_value_range_on_shared_score(
        values in prop::collection::btree_set(any::<u16>(), 0..200),
        lo in any::<u16>(),
        width in 0u16..2000,
        lo_ex in any::<bool>(),
        hi_ex in any::<bool>(),
        seed in any::<u64>(),
    ) {
        let mut list: SkipList<(), u16> = SkipList::new(SmallRng::seed_from_u64(seed));
        for &v in &values {
            list.insert((), 1.0, v).unwrap();
        }
        let range = ValueRange::new(lo, lo_ex, lo.saturating_add(width), hi_ex);
        let expected: Vec<u16> = values.iter().copied().filter(|v| range.contains(v)).collect();

        let got: Vec<u16> = list.range_by_value(&range).map(|m| *m.value()).collect();
        prop_assert_eq!(&got, &expected);

        let removed: Vec<u16> = list.delete_range_by_value(&range).into_iter().map(|m| *m.value()).collect();
        prop_assert_eq!(removed, expected);
        list.check_invariants();
    }
}

// =============================================================================
// Mutations
// =============================================================================

proptest! {
    #[test]
    fn prop_insert_then_remove_restores(entries in entries(), key in any::<u16>(), score in 0u8..40, seed in any::<u64>()) {
        prop_assume!(!entries.iter().any(|&(k, _)| k == key));
        let mut set = build(&entries, seed);
        let before = snapshot(&set);

        prop_assert!(set.insert(key, score as f64, key));
        set.check_invariants();
        prop_assert!(set.remove(&key).is_some());

        prop_assert_eq!(snapshot(&set), before);
        set.check_invariants();
    }

    #[test]
    fn prop_duplicate_insert_is_noop(entries in entries(), pick in any::<prop::sample::Index>(), seed in any::<u64>()) {
        prop_assume!(!entries.is_empty());
        let mut set = build(&entries, seed);
        let before = snapshot(&set);
        let (key, score) = entries[pick.index(entries.len())];

        prop_assert!(!set.insert(key, score + 1.0, key));
        prop_assert_eq!(set.score(&key), Some(score));
        prop_assert_eq!(snapshot(&set), before);
    }

    #[test]
    fn prop_update_score_is_consistent(
        entries in entries(),
        updates in prop::collection::vec((any::<prop::sample::Index>(), 0u8..40), 1..50),
        seed in any::<u64>(),
    ) {
        prop_assume!(!entries.is_empty());
        let mut set = build(&entries, seed);
        let mut model = entries.clone();

        for (pick, score) in updates {
            let i = pick.index(model.len());
            let score = score as f64;
            let key = model[i].0;
            let updated = set.update_score(&key, score).map(|m| m.score());
            prop_assert_eq!(updated, Some(score));
            prop_assert_eq!(set.score(&key), Some(score));
            model[i].1 = score;
        }

        set.check_invariants();
        prop_assert_eq!(snapshot(&set), oracle(&model));
    }

    #[test]
    fn prop_update_with_shared_values_matches_model(
        keys in prop::collection::btree_set(any::<u16>(), 1..80),
        moves in prop::collection::vec((any::<prop::sample::Index>(), 0u8..8), 1..60),
        seed in any::<u64>(),
    ) {
        // Four values and eight scores: ties and taken positions are common
        let mut set: SortedSet<u16, u16> = SortedSet::with_rng(SmallRng::seed_from_u64(seed));
        let mut model: Vec<(u16, f64, u16)> = Vec::new();
        for (i, &key) in keys.iter().enumerate() {
            let (score, value) = ((i % 8) as f64, key % 4);
            let free = !model.iter().any(|&(_, s, v)| s == score && v == value);
            prop_assert_eq!(set.insert(key, score, value), free);
            if free {
                model.push((key, score, value));
            }
        }

        for (pick, score) in moves {
            let i = pick.index(model.len());
            let (key, old, value) = model[i];
            let score = score as f64;
            let taken = model.iter().any(|&(k, s, v)| k != key && s == score && v == value);

            let updated = set.update_score(&key, score).map(|m| m.score());
            if taken {
                prop_assert_eq!(updated, None);
                prop_assert_eq!(set.score(&key), Some(old));
            } else {
                prop_assert_eq!(updated, Some(score));
                model[i].1 = score;
            }
        }

        set.check_invariants();
        let mut expected: Vec<(f64, u16, u16)> = model.iter().map(|&(k, s, v)| (s, v, k)).collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        let got: Vec<(f64, u16, u16)> = set.iter().map(|m| (m.score(), *m.value(), *m.key())).collect();
        prop_assert_eq!(got, expected);
    }
}
