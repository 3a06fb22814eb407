//! Hash-keyed index that many threads can fill at once.
//!
//! Buckets are chosen by `hash % bucket_count` and guarded by a smaller pool
//! of locks, bucket `b` sharing lock `b % lock_count`. Writers to buckets on
//! different locks never wait for each other. Once the writers are done the
//! index is frozen into a plain table that is read without any locking.

use crate::probe::ProbeString;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

pub const DEFAULT_BUCKET_COUNT: usize = 300_000;
pub const DEFAULT_LOCK_COUNT: usize = 300;

/// Table dimensions. Only affects contention and scan lengths, never results.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    pub bucket_count: usize,
    pub lock_count: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            lock_count: DEFAULT_LOCK_COUNT,
        }
    }
}

impl IndexConfig {
    pub fn with_bucket_count(mut self, bucket_count: usize) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    pub fn with_lock_count(mut self, lock_count: usize) -> Self {
        self.lock_count = lock_count;
        self
    }

    /// Shrinks the table so it has no more buckets than expected entries.
    pub fn sized_for(self, entries: u64) -> Self {
        let cap = usize::try_from(entries).unwrap_or(usize::MAX);
        let bucket_count = self.bucket_count.min(cap).max(1);
        Self {
            bucket_count,
            lock_count: self.lock_count.clamp(1, bucket_count),
        }
    }
}

type Bucket<V> = Vec<(u64, V)>;

/// Concurrent multimap from hash to values. Entries are only ever appended.
pub struct ShardedIndex<V> {
    bucket_count: usize,
    /// Stripe `i` holds buckets `i, i + lock_count, i + 2 * lock_count, ...`.
    stripes: Box<[Mutex<Vec<Bucket<V>>>]>,
    lock_contentions: AtomicU64,
}

impl<V> Default for ShardedIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ShardedIndex<V> {
    pub fn new() -> Self {
        Self::with_config(IndexConfig::default())
    }

    pub fn with_config(config: IndexConfig) -> Self {
        let bucket_count = config.bucket_count.max(1);
        let lock_count = config.lock_count.clamp(1, bucket_count);
        let stripes = (0..lock_count)
            .map(|stripe| {
                let buckets = (bucket_count - stripe).div_ceil(lock_count);
                Mutex::new((0..buckets).map(|_| Vec::new()).collect())
            })
            .collect();
        Self {
            bucket_count,
            stripes,
            lock_contentions: AtomicU64::new(0),
        }
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    pub fn lock_count(&self) -> usize {
        self.stripes.len()
    }

    /// How many times `insert` found its lock already taken.
    pub fn lock_contentions(&self) -> u64 {
        self.lock_contentions.load(Ordering::Relaxed)
    }

    /// Stripe and position inside the stripe for a hash.
    fn locate(&self, hash: u64) -> (usize, usize) {
        let bucket = (hash % self.bucket_count as u64) as usize;
        let lock_count = self.stripes.len();
        (bucket % lock_count, bucket / lock_count)
    }

    fn lock_stripe(&self, stripe: usize) -> MutexGuard<'_, Vec<Bucket<V>>> {
        self.stripes[stripe]
            .lock()
            .expect("some other thread has crashed and poisoned a mutex")
    }

    /// Appends `value` under `hash`. Duplicate hashes accumulate.
    pub fn insert(&self, hash: u64, value: V) {
        let (stripe, position) = self.locate(hash);
        let mut buckets = if let Ok(lock) = self.stripes[stripe].try_lock() {
            lock
        } else {
            self.lock_contentions.fetch_add(1, Ordering::Relaxed);
            self.lock_stripe(stripe)
        };
        buckets[position].push((hash, value));
    }

    /// First value stored under `hash`.
    ///
    /// Holds the stripe lock only for the scan of one bucket, so every insert
    /// that returned before this call is visible.
    pub fn find(&self, hash: u64) -> Option<V>
    where
        V: Clone,
    {
        let (stripe, position) = self.locate(hash);
        self.lock_stripe(stripe)[position]
            .iter()
            .find(|(h, _)| *h == hash)
            .map(|(_, value)| value.clone())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        (0..self.stripes.len())
            .map(|stripe| self.lock_stripe(stripe).iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties every bucket, one stripe at a time.
    pub fn clear(&self) {
        for stripe in 0..self.stripes.len() {
            self.lock_stripe(stripe).iter_mut().for_each(Vec::clear);
        }
    }

    /// Ends the write phase and lays the buckets out flat for lock-free reads.
    pub fn freeze(self) -> FrozenIndex<V> {
        let lock_count = self.stripes.len();
        let mut stripes = self
            .stripes
            .into_vec()
            .into_iter()
            .map(|stripe| {
                stripe
                    .into_inner()
                    .expect("some other thread has crashed and poisoned a mutex")
                    .into_iter()
            })
            .collect::<Vec<_>>();

        // Bucket `b` is the `b / lock_count`-th entry of stripe `b % lock_count`,
        // so walking buckets in order drains each stripe front to back.
        let buckets = (0..self.bucket_count)
            .map(|bucket| stripes[bucket % lock_count].next().unwrap_or_default())
            .collect();
        FrozenIndex {
            bucket_count: self.bucket_count,
            buckets,
        }
    }
}

impl ShardedIndex<String> {
    /// Stores a probe string under its cached hash.
    pub fn insert_probe(&self, probe: &ProbeString) {
        self.insert(probe.hash(), probe.to_string());
    }
}

/// Read-only form of a [`ShardedIndex`].
pub struct FrozenIndex<V> {
    bucket_count: usize,
    buckets: Box<[Bucket<V>]>,
}

impl<V> FrozenIndex<V> {
    /// Every value stored under `hash`, in insertion order within its bucket.
    pub fn matches(&self, hash: u64) -> impl Iterator<Item = &V> + '_ {
        let bucket = (hash % self.bucket_count as u64) as usize;
        self.buckets[bucket]
            .iter()
            .filter(move |(h, _)| *h == hash)
            .map(|(_, value)| value)
    }

    pub fn find(&self, hash: u64) -> Option<&V> {
        self.matches(hash).next()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }
}
