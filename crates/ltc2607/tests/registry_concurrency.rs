//! Device naming under concurrent attach.
//!
//! Every attach draws from one shared counter; names must stay unique and
//! cover a contiguous range no matter how threads interleave.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use std::collections::BTreeSet;
use std::thread;

use ltc2607::DeviceRegistry;

const THREADS: u32 = 8;
const PER_THREAD: u32 = 250;

#[test]
fn test_concurrent_sequences_are_unique_and_contiguous() {
    static REGISTRY: DeviceRegistry = DeviceRegistry::new();

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            thread::spawn(|| {
                (0..PER_THREAD)
                    .map(|_| REGISTRY.next_sequence())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = BTreeSet::new();
    for handle in handles {
        for sequence in handle.join().unwrap() {
            assert!(seen.insert(sequence), "sequence {sequence} handed out twice");
        }
    }
    let total = THREADS * PER_THREAD;
    assert_eq!(seen.len(), total as usize);
    assert_eq!(seen.iter().copied().collect::<Vec<_>>(), (0..total).collect::<Vec<_>>());
    assert_eq!(REGISTRY.peek(), total);
}

#[test]
fn test_concurrent_names_are_distinct() {
    let registry = DeviceRegistry::new();

    let names: BTreeSet<String> = thread::scope(|scope| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|| registry.next_name().unwrap()))
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap().as_str().to_owned())
            .collect()
    });

    let expected: BTreeSet<String> = (0..THREADS).map(|n| format!("DAC{n:02}")).collect();
    assert_eq!(names, expected);
}

#[test]
fn test_names_past_ninety_nine_widen() {
    let registry = DeviceRegistry::starting_at(99);
    assert_eq!(registry.next_name().unwrap().as_str(), "DAC99");
    assert_eq!(registry.next_name().unwrap().as_str(), "DAC100");
}
