use birthday_collider::{hash, random_string, stat_printer, Collider, HashParams};
use std::time::Duration;

const POWER: u64 = 31;
const MODULUS: u64 = 1_000_000_000_039;

fn main() {
    let params = HashParams::new(POWER, MODULUS).expect("modulus is positive");
    let target = random_string(&mut rand::thread_rng(), 100);
    println!("target: {target} (hash {})", hash(&target, params));

    let collider = Collider::new(params);
    let thread_count = num_cpus::get();
    match collider.run(&target, thread_count, stat_printer(Duration::from_secs(1))) {
        Ok(found) => {
            assert_eq!(hash(&found, params), hash(&target, params));
            println!("found collision! {found} (hash {})", hash(&found, params));
        }
        Err(e) => eprintln!("search failed: {e}"),
    }
}
