mod error;
mod hash;
mod index;
mod printer;
mod probe;
mod searcher;
mod segments;
mod stats;

use core::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

pub use crate::error::CollisionError;
pub use crate::hash::{
    binary_pow, hash, pow_mod, random_string, HashParams, ALPHABET, ALPHABET_SIZE,
};
pub use crate::index::{
    FrozenIndex, IndexConfig, ShardedIndex, DEFAULT_BUCKET_COUNT, DEFAULT_LOCK_COUNT,
};
pub use crate::printer::stat_printer;
pub use crate::probe::ProbeString;
pub use crate::searcher::CollisionSearcher;
pub use crate::segments::{split_segments, Segment};
pub use crate::stats::Stats;

/// Finds a string other than `target` with the same hash under `power` and
/// `modulus`, growing the probe length from zero until one turns up.
///
/// Returns an empty string right away when `concurrency` is zero. Otherwise
/// there is no length limit: for a modulus far beyond what the enumerable
/// lengths can cover this keeps allocating shards until the 64-bit ordinal
/// space runs out.
pub fn find_collision(
    target: &str,
    power: u64,
    modulus: u64,
    concurrency: usize,
) -> Result<String, CollisionError> {
    Collider::new(HashParams::new(power, modulus)?).find(target, concurrency)
}

/// Drives a [`CollisionSearcher`] through increasing probe lengths.
pub struct Collider {
    searcher: CollisionSearcher,
    running: AtomicBool,
}

impl Collider {
    pub fn new(params: HashParams) -> Self {
        Self::with_config(params, IndexConfig::default())
    }

    pub fn with_config(params: HashParams, config: IndexConfig) -> Self {
        Self {
            searcher: CollisionSearcher::with_config(params, config),
            running: AtomicBool::new(false),
        }
    }

    pub fn params(&self) -> HashParams {
        self.searcher.params()
    }

    pub fn report_stats(&self) -> Stats {
        self.searcher.stats.report()
    }

    /// True while a search started by [`run`](Self::run) or [`find`](Self::find) is going.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Runs the search to completion on the current thread.
    pub fn find(&self, target: &str, concurrency: usize) -> Result<String, CollisionError> {
        if concurrency == 0 {
            return Ok(String::new());
        }

        self.running.store(true, Ordering::Relaxed);
        let _stopped = StopOnDrop(&self.running);
        self.drive(target, concurrency)
    }

    /// Runs the search on a scoped thread while `f` watches from this one.
    ///
    /// `f` should return once [`is_running`](Self::is_running) turns false;
    /// [`stat_printer`] does.
    pub fn run<F: FnOnce(&Self)>(
        &self,
        target: &str,
        concurrency: usize,
        f: F,
    ) -> Result<String, CollisionError> {
        if concurrency == 0 {
            return Ok(String::new());
        }

        std::thread::scope(|s| {
            self.running.store(true, Ordering::Relaxed);

            let driver = s.spawn(|| {
                let _stopped = StopOnDrop(&self.running);
                self.drive(target, concurrency)
            });

            f(self);

            match driver.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }

    fn drive(&self, target: &str, concurrency: usize) -> Result<String, CollisionError> {
        let mut probe_length = 0;
        loop {
            if let Some(found) = self
                .searcher
                .find_collision(target, probe_length, concurrency)?
            {
                info!(probe_length, %found, "found collision");
                return Ok(found);
            }
            probe_length += 1;
        }
    }
}

/// Clears the running flag when the driver returns or unwinds, so a monitor
/// polling [`Collider::is_running`] always gets to stop.
struct StopOnDrop<'a>(&'a AtomicBool);

impl Drop for StopOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const P: u64 = 31;
    const M: u64 = 1_000_000_007;

    fn check(target: &str, concurrency: usize, power: u64, modulus: u64) {
        let result = find_collision(target, power, modulus, concurrency).unwrap();
        let params = HashParams::new(power, modulus).unwrap();
        assert_ne!(result, target);
        assert_eq!(hash(&result, params), hash(target, params));
    }

    #[test]
    fn it_works() {
        check("aaaaaaaa", 4, P, M);
    }

    #[test]
    fn short_strings() {
        let mut target = String::new();
        for _ in 0..=10 {
            check(&target, 1, P, M);
            target.push('a');
        }
    }

    #[test]
    fn short_strings_big_power() {
        let mut target = String::new();
        for _ in 0..=5 {
            check(&target, 1, 1069, M);
            target.push('a');
        }
    }

    #[test]
    fn zero_concurrency_is_empty() {
        assert_eq!(find_collision("aaaaaaaa", P, M, 0), Ok(String::new()));

        let collider = Collider::new(HashParams::new(P, M).unwrap());
        let mut monitored = false;
        let result = collider.run("aaaaaaaa", 0, |_| monitored = true);
        assert_eq!(result, Ok(String::new()));
        assert!(!monitored);
        assert_eq!(collider.report_stats().strings, 0);
    }

    #[test]
    fn hash_zero_target_gets_non_empty_answer() {
        // hash("l") = 12 = 0 mod 12, the same as the empty string.
        let result = find_collision("l", P, 12, 1).unwrap();
        assert!(!result.is_empty());
        check("l", 1, P, 12);
    }

    #[test]
    fn running_flag_clears_on_panic() {
        let running = AtomicBool::new(true);
        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _stopped = StopOnDrop(&running);
            panic!("driver crashed");
        }));
        assert!(unwound.is_err());
        assert!(!running.load(Ordering::Relaxed));
    }

    #[test]
    fn zero_modulus() {
        assert_eq!(find_collision("a", P, 0, 1), Err(CollisionError::ZeroModulus));
    }

    #[test]
    fn run_with_monitor() {
        let collider = Collider::new(HashParams::new(P, 10_000_019).unwrap());
        let result = collider
            .run("monitored", 2, |c| {
                while c.is_running() {
                    std::thread::sleep(Duration::from_millis(5));
                }
            })
            .unwrap();
        assert_ne!(result, "monitored");
        assert_eq!(hash(&result, collider.params()), hash("monitored", collider.params()));

        let stats = collider.report_stats();
        assert_eq!(stats.collisions, 1);
        assert!(stats.shards >= 1);
        assert!(stats.lookups >= 1);
        assert!(!collider.is_running());
    }
}
