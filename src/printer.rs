use crate::Collider;
use std::time::{Duration, Instant};

/// Monitor for [`Collider::run`] that prints a progress row every `interval`
/// until the search is over.
pub fn stat_printer(interval: Duration) -> impl FnOnce(&Collider) {
    move |collider| {
        println!("{l:>3} {sh:>3} {s:>12} {c:>12} {lk:>13} {lps:>9} {et:>8} {sm:>4} {lc:>6}",
            l="len", sh="shd", s="strings", c="candidates", lk="lookups",
            lps="ml/s", et="ETA", sm="self", lc="locc",
        );
        let modulus = collider.params().modulus();
        let start = Instant::now();
        let mut prev_t = start;
        let mut prev_l = 0;

        while collider.is_running() {
            std::thread::sleep(interval);
            let now = Instant::now();
            let stats = collider.report_stats();
            let lps = stats.lookups.saturating_sub(prev_l) as f64
                / (now - prev_t).as_secs_f64();
            prev_t = now;
            prev_l = stats.lookups;

            let expected_time = stats.estimate_time_to_hit(modulus, start.elapsed().as_secs_f64());

            println!("{l:>3} {sh:>3} {s:>12} {c:>12} {lk:>13} {lps:>9.2} {et:>8.1} {sm:>4} {lc:>6}",
                l=stats.probe_length, sh=stats.shards, s=stats.strings,
                c=stats.candidates, lk=stats.lookups, lps=lps/1e6,
                et=expected_time, sm=stats.self_matches, lc=stats.lock_contentions,
            );
        }
    }
}
