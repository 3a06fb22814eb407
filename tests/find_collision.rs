// End-to-end collision searches.
//
// Every test checks the same two things about the returned string: it is
// not the target, and it hashes to the target's value. Which collision comes
// back depends on thread timing, so nothing asserts a particular string.
use birthday_collider::{find_collision, hash, random_string, HashParams};

const POWER: u64 = 31;
const MODULUS: u64 = 1_000_000_007;

fn check(target: &str, concurrency: usize, power: u64, modulus: u64) {
    let result = find_collision(target, power, modulus, concurrency).expect("valid parameters");
    let params = HashParams::new(power, modulus).unwrap();
    assert_ne!(result, target);
    assert_eq!(hash(&result, params), hash(target, params));
}

#[test]
fn short_string_many_threads() {
    let max_threads = num_cpus::get();
    for threads in 1..=max_threads {
        check("aaaaaaaa", threads, POWER, MODULUS);
    }
}

#[test]
fn simple() {
    let target = concat!("this", "is", "test", "string");
    let max_threads = num_cpus::get();
    for threads in 1..=max_threads {
        check(target, threads, POWER, MODULUS);
    }
}

#[test]
fn more_threads_than_strings() {
    // Probe lengths 0 and 1 have fewer strings than workers.
    check("ab", 64, POWER, 97);
}

#[test]
fn target_outside_alphabet() {
    check("Hello, World!", 2, POWER, MODULUS);
}

#[test]
fn modulus_one_gives_shortest_other_string() {
    let result = find_collision("", POWER, 1, 2).unwrap();
    assert_eq!(result.len(), 1);
}

#[test]
fn big_module_multi_thread() {
    let modulus = 1_000_000_000_007;
    let mut rng = rand::thread_rng();
    let target = random_string(&mut rng, 100);
    check(&target, 4, POWER, modulus);
}

#[test]
fn zero_concurrency_returns_empty() {
    assert_eq!(find_collision("aaaaaaaa", POWER, MODULUS, 0).unwrap(), "");
}
