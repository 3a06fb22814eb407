use birthday_collider::{
    binary_pow, find_collision, hash, split_segments, HashParams, IndexConfig, ProbeString,
    ShardedIndex, ALPHABET_SIZE,
};
use proptest::prelude::*;

proptest! {
    // Segments are sorted, disjoint, within bounds, and cover [from, to].
    #[test]
    fn prop_segments_cover_range(from in 0u64..1_000, len in 0u64..1_000, amount in 0usize..40) {
        let to = from + len;
        let segments = split_segments(from, to, amount);

        if amount == 0 {
            prop_assert!(segments.is_empty());
            return Ok(());
        }
        prop_assert!(segments.len() <= amount);
        prop_assert!(segments.len() as u64 <= len + 1);

        let mut next = from;
        for segment in &segments {
            prop_assert!(segment.lower <= segment.upper);
            prop_assert_eq!(segment.lower, next);
            next = segment.upper + 1;
        }
        prop_assert_eq!(next, to + 1);
    }

    #[test]
    fn prop_inverted_range_is_empty(to in 0u64..1_000, gap in 1u64..1_000, amount in 0usize..40) {
        prop_assert!(split_segments(to + gap, to, amount).is_empty());
    }

    // A full lap of the odometer visits every ordinal with a correct hash and
    // comes back to where it started.
    #[test]
    fn prop_odometer_full_cycle(length in 0usize..=2, power in 1u64..5_000, modulus in 1u64..1_000_000_007) {
        let params = HashParams::new(power, modulus).unwrap();
        let mut probe = ProbeString::new(params, length, 0);
        let start = probe.clone();
        for ordinal in 0..binary_pow(ALPHABET_SIZE, length as u64).unwrap() {
            prop_assert_eq!(probe.ordinal(), ordinal);
            prop_assert_eq!(probe.hash(), hash(&probe.to_string(), params));
            probe.increment();
        }
        prop_assert_eq!(probe, start);
    }

    // Reseeding anywhere gives the same state as counting up to it.
    #[test]
    fn prop_load_matches_increment(ordinal in 0u64..2_000) {
        let params = HashParams::new(31, 1_000_000_007).unwrap();
        let mut counted = ProbeString::new(params, 3, 0);
        for _ in 0..ordinal {
            counted.increment();
        }
        prop_assert_eq!(counted, ProbeString::new(params, 3, ordinal));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Everything inserted from several threads is found afterwards; hashes
    // that were never inserted are not.
    #[test]
    fn prop_index_concurrent_inserts(
        hashes in proptest::collection::vec(0u64..1_000_000, 1..500),
        threads in 1usize..8,
        buckets in 1usize..64,
        locks in 1usize..8,
    ) {
        let index = ShardedIndex::with_config(IndexConfig { bucket_count: buckets, lock_count: locks });
        std::thread::scope(|s| {
            for chunk in hashes.chunks(hashes.len().div_ceil(threads)) {
                let index = &index;
                s.spawn(move || {
                    for &h in chunk {
                        index.insert(h, h * 2);
                    }
                });
            }
        });

        prop_assert_eq!(index.len(), hashes.len());
        for &h in &hashes {
            prop_assert_eq!(index.find(h), Some(h * 2));
        }
        prop_assert_eq!(index.find(1_000_000), None);

        let frozen = index.freeze();
        for &h in &hashes {
            prop_assert_eq!(frozen.find(h), Some(&(h * 2)));
        }
        prop_assert_eq!(frozen.find(1_000_000), None);
    }

    // Prime moduli and powers above the alphabet size keep short collisions
    // plentiful; degenerate parameters can push the answer out of reach.
    #[test]
    fn prop_collision_is_valid(
        target in "[a-z]{0,12}",
        power in 27u64..2_000,
        modulus in prop::sample::select(vec![10_007u64, 10_009, 12_289, 19_993, 19_997]),
        concurrency in 1usize..5,
    ) {
        let params = HashParams::new(power, modulus).unwrap();
        let result = find_collision(&target, power, modulus, concurrency).unwrap();
        prop_assert_ne!(&result, &target);
        prop_assert_eq!(hash(&result, params), hash(&target, params));
    }

    // Tiny moduli make hash 0 common, so the empty string often has the
    // target's hash; it must never be the answer.
    #[test]
    fn prop_small_modulus_answer_is_non_empty(
        target in "[a-z]{0,12}",
        power in 1u64..2_000,
        modulus in 1u64..30,
        concurrency in 1usize..5,
    ) {
        // With p = 0 mod m only the last character counts, and for m > 26
        // some hashes have no non-empty preimage.
        prop_assume!(power % modulus != 0 || modulus <= 26);
        let params = HashParams::new(power, modulus).unwrap();
        let result = find_collision(&target, power, modulus, concurrency).unwrap();
        prop_assert!(!result.is_empty());
        prop_assert_ne!(&result, &target);
        prop_assert_eq!(hash(&result, params), hash(&target, params));
    }
}
