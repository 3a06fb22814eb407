use core::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub(crate) struct AtomicStats {
    pub(crate) probe_length: AtomicU64,
    pub(crate) shards: AtomicU64,
    pub(crate) strings: AtomicU64,
    pub(crate) candidates: AtomicU64,
    pub(crate) lookups: AtomicU64,
    pub(crate) self_matches: AtomicU64,
    pub(crate) collisions: AtomicU64,
    pub(crate) lock_contentions: AtomicU64,
}

impl AtomicStats {
    pub(crate) fn report(&self) -> Stats {
        Stats {
            probe_length: self.probe_length.load(Ordering::Relaxed),
            shards: self.shards.load(Ordering::Relaxed),
            strings: self.strings.load(Ordering::Relaxed),
            candidates: self.candidates.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            self_matches: self.self_matches.load(Ordering::Relaxed),
            collisions: self.collisions.load(Ordering::Relaxed),
            lock_contentions: self.lock_contentions.load(Ordering::Relaxed),
        }
    }
}

/// Per-worker tallies, merged into [`AtomicStats`] in batches to keep the
/// shared counters off the hot path.
#[derive(Default)]
pub(crate) struct LocalStats {
    pub(crate) strings: u64,
    pub(crate) candidates: u64,
    pub(crate) lookups: u64,
    pub(crate) self_matches: u64,
}

impl LocalStats {
    pub(crate) const FLUSH_INTERVAL: u64 = 1 << 14;

    pub(crate) fn flush(&mut self, into: &AtomicStats) {
        into.strings.fetch_add(self.strings, Ordering::Relaxed);
        into.candidates.fetch_add(self.candidates, Ordering::Relaxed);
        into.lookups.fetch_add(self.lookups, Ordering::Relaxed);
        into.self_matches.fetch_add(self.self_matches, Ordering::Relaxed);
        *self = Self::default();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    /// Length of the strings currently being generated or searched.
    pub probe_length: u64,
    pub shards: u64,
    /// Strings inserted into shards.
    pub strings: u64,
    /// Prefixes checked against the shards.
    pub candidates: u64,
    pub lookups: u64,
    /// Hash matches rejected because they spelled the target itself.
    pub self_matches: u64,
    pub collisions: u64,
    pub lock_contentions: u64,
}

impl Stats {
    /// Chance that a single lookup hits a stored hash, assuming the stored
    /// hashes are spread uniformly over `modulus` values.
    pub fn hit_probability(&self, modulus: u64) -> f64 {
        let stored = self.strings as f64;
        1.0 - (-stored / modulus as f64).exp()
    }

    /// Expected seconds until the first hit at the current lookup rate.
    pub fn estimate_time_to_hit(&self, modulus: u64, elapsed_secs: f64) -> f64 {
        let p = self.hit_probability(modulus);
        let lps = self.lookups as f64 / elapsed_secs;
        if p <= 0.0 || lps <= 0.0 {
            return f64::INFINITY;
        }
        1.0 / (p * lps)
    }
}
