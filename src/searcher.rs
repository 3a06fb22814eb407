use crate::error::CollisionError;
use crate::hash::{binary_pow, mul_mod, sub_mod, HashParams, ALPHABET_SIZE};
use crate::index::{FrozenIndex, IndexConfig, ShardedIndex};
use crate::probe::{push_ordinal, ProbeString};
use crate::segments::{split_segments, Segment};
use crate::stats::{AtomicStats, LocalStats};
use core::sync::atomic::Ordering;
use std::sync::{Mutex, OnceLock};
use tracing::{debug, trace};

/// Every string of one length, keyed by hash. Values are ordinals, spelled
/// out again only when a lookup hits.
struct Shard {
    length: usize,
    /// `p^length mod m`.
    shift: u64,
    ordinals: FrozenIndex<u64>,
}

/// State of one probe-length attempt.
struct SearchState<'a> {
    target: &'a str,
    target_hash: u64,
    /// Write-once result. Winning the `set` is the claim, so a worker that
    /// sees it filled sees the whole string.
    result: OnceLock<String>,
}

impl SearchState<'_> {
    fn is_found(&self) -> bool {
        self.result.get().is_some()
    }
}

/// Birthday search for a string that hashes like a target.
///
/// Each call to [`find_collision`](Self::find_collision) first indexes all
/// strings of the requested length into a new shard, then looks for a prefix
/// of that length and a suffix from any shard whose concatenation has the
/// target's hash. Shards persist across calls.
pub struct CollisionSearcher {
    params: HashParams,
    config: IndexConfig,
    /// Sorted by length.
    shards: Mutex<Vec<Shard>>,
    pub(crate) stats: AtomicStats,
}

impl CollisionSearcher {
    pub fn new(params: HashParams) -> Self {
        Self::with_config(params, IndexConfig::default())
    }

    pub fn with_config(params: HashParams, config: IndexConfig) -> Self {
        Self {
            params,
            config,
            shards: Mutex::new(Vec::new()),
            stats: Default::default(),
        }
    }

    pub fn params(&self) -> HashParams {
        self.params
    }

    /// Lengths of the shards built so far.
    pub fn shard_lengths(&self) -> Vec<usize> {
        self.shards
            .lock()
            .expect("some other thread has crashed and poisoned a mutex")
            .iter()
            .map(|shard| shard.length)
            .collect()
    }

    /// Looks for a collision whose prefix has `probe_length` characters, using
    /// `concurrency` threads per phase.
    ///
    /// Returns `Ok(None)` when this length has no collision with the shards
    /// built so far, and immediately when `concurrency` is zero. When several
    /// collisions exist, which one is returned depends on thread timing.
    pub fn find_collision(
        &self,
        target: &str,
        probe_length: usize,
        concurrency: usize,
    ) -> Result<Option<String>, CollisionError> {
        if concurrency == 0 {
            return Ok(None);
        }

        let space = binary_pow(ALPHABET_SIZE, probe_length as u64).ok_or(
            CollisionError::EnumerationOverflow {
                length: probe_length,
            },
        )?;
        let segments = split_segments(0, space - 1, concurrency);

        self.stats
            .probe_length
            .store(probe_length as u64, Ordering::Relaxed);

        let mut shards = self
            .shards
            .lock()
            .expect("some other thread has crashed and poisoned a mutex");
        if let Err(position) = shards.binary_search_by_key(&probe_length, |shard| shard.length) {
            let shard = self.generate(probe_length, space, &segments);
            shards.insert(position, shard);
        }

        let state = SearchState {
            target,
            target_hash: self.params.hash(target.as_bytes()),
            result: OnceLock::new(),
        };
        std::thread::scope(|s| {
            for &segment in &segments {
                let (state, shards) = (&state, &shards[..]);
                s.spawn(move || self.scan(state, shards, probe_length, segment));
            }
        });

        let result = state.result.into_inner();
        if result.is_none() {
            debug!(probe_length, shards = shards.len(), "no collision at this probe length");
        }
        Ok(result)
    }

    /// Indexes every string of `length` characters. Returns only once all
    /// writers are done, so the search never sees a partial shard.
    fn generate(&self, length: usize, space: u64, segments: &[Segment]) -> Shard {
        let index = ShardedIndex::with_config(self.config.sized_for(space));
        std::thread::scope(|s| {
            for &segment in segments {
                let index = &index;
                s.spawn(move || self.fill(index, length, segment));
            }
        });

        self.stats
            .lock_contentions
            .fetch_add(index.lock_contentions(), Ordering::Relaxed);
        self.stats.shards.fetch_add(1, Ordering::Relaxed);
        debug!(
            length,
            strings = space,
            buckets = index.bucket_count(),
            "generated shard"
        );

        Shard {
            length,
            shift: self.params.shift(length),
            ordinals: index.freeze(),
        }
    }

    fn fill(&self, index: &ShardedIndex<u64>, length: usize, segment: Segment) {
        let mut local = LocalStats::default();
        let mut probe = ProbeString::new(self.params, length, segment.lower);
        let mut ordinal = segment.lower;
        loop {
            index.insert(probe.hash(), ordinal);
            local.strings += 1;
            if local.strings == LocalStats::FLUSH_INTERVAL {
                local.flush(&self.stats);
            }
            if ordinal == segment.upper {
                break;
            }
            ordinal += 1;
            probe.increment();
        }
        local.flush(&self.stats);
    }

    fn scan(&self, state: &SearchState<'_>, shards: &[Shard], length: usize, segment: Segment) {
        let mut local = LocalStats::default();
        let mut probe = ProbeString::new(self.params, length, segment.lower);
        let mut ordinal = segment.lower;
        while !state.is_found() {
            local.candidates += 1;
            if self.check_candidate(state, shards, &probe, &mut local) || ordinal == segment.upper
            {
                break;
            }
            if local.candidates == LocalStats::FLUSH_INTERVAL {
                local.flush(&self.stats);
            }
            ordinal += 1;
            probe.increment();
        }
        local.flush(&self.stats);
    }

    /// Tries `prefix + suffix` for every stored suffix length. Returns true
    /// once this worker found a collision, whether or not it won the claim.
    fn check_candidate(
        &self,
        state: &SearchState<'_>,
        shards: &[Shard],
        prefix: &ProbeString,
        local: &mut LocalStats,
    ) -> bool {
        let modulus = self.params.modulus();
        for shard in shards {
            if state.is_found() {
                return false;
            }

            // H(prefix + suffix) = H(prefix) * p^|suffix| + H(suffix)
            let shifted = mul_mod(prefix.hash(), shard.shift, modulus);
            let needed = sub_mod(state.target_hash, shifted, modulus);
            local.lookups += 1;

            for &ordinal in shard.ordinals.matches(needed) {
                let mut candidate = String::with_capacity(prefix.len() + shard.length);
                candidate.push_str(&prefix.to_string());
                push_ordinal(&mut candidate, shard.length, ordinal);

                // The empty string is reserved for "no work done".
                if candidate.is_empty() || candidate == state.target {
                    local.self_matches += 1;
                    trace!(%candidate, "skipping the target or the empty string");
                    continue;
                }

                if state.result.set(candidate).is_ok() {
                    self.stats.collisions.fetch_add(1, Ordering::Relaxed);
                }
                return true;
            }
        }
        false
    }
}
