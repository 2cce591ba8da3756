use cellplant::{Exhausted, SerialAllocator, SerialBatch, SerialNumber};
use std::collections::HashSet;
use std::sync::Arc;

fn pool(count: usize) -> (SerialBatch, SerialAllocator) {
    let batch = SerialBatch::generate("123", count).unwrap();
    (batch.clone(), SerialAllocator::new(batch))
}

#[test]
fn test_concurrent_callers_receive_distinct_serials() {
    let (batch, allocator) = pool(64);

    let results: Vec<Result<SerialNumber, Exhausted>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..64).map(|_| scope.spawn(|| allocator.allocate_one())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let mut successes: Vec<SerialNumber> =
        results.into_iter().map(|r| r.expect("pool covers every caller")).collect();
    successes.sort();

    // Pairwise distinct, and collectively the first 64 serials of the batch
    // in ascending order.
    assert_eq!(successes, batch.as_slice().to_vec());
}

#[test]
fn test_hundred_racers_over_pool_of_fifty() {
    let (batch, allocator) = pool(50);
    let allocator = Arc::new(allocator);

    let mut handles = Vec::new();
    for _ in 0..100 {
        let allocator = Arc::clone(&allocator);
        handles.push(std::thread::spawn(move || allocator.allocate_one()));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let successes: Vec<SerialNumber> = results.iter().filter_map(|r| r.ok()).collect();
    let exhausted = results.iter().filter(|r| **r == Err(Exhausted)).count();

    assert_eq!(successes.len(), 50);
    assert_eq!(exhausted, 50);

    let distinct: HashSet<u64> = successes.iter().map(|s| s.value()).collect();
    assert_eq!(distinct.len(), 50, "a serial was issued twice");

    let mut sorted = successes;
    sorted.sort();
    assert_eq!(sorted, batch.as_slice().to_vec());
}

#[test]
fn test_exhaustion_is_stable_after_a_race() {
    let (_, allocator) = pool(10);
    let allocator = Arc::new(allocator);

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            std::thread::spawn(move || allocator.allocate_one())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap().ok();
    }

    assert!(allocator.is_exhausted());
    for _ in 0..5 {
        assert_eq!(allocator.allocate_one(), Err(Exhausted));
    }
    assert_eq!(allocator.allocated(), 10);
    assert_eq!(allocator.remaining(), 0);
}

#[test]
fn test_no_serial_lost_under_interleaved_drain() {
    let (batch, allocator) = pool(200);
    let allocator = Arc::new(allocator);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let allocator = Arc::clone(&allocator);
            std::thread::spawn(move || {
                let mut claimed = Vec::new();
                while let Ok(serial) = allocator.allocate_one() {
                    claimed.push(serial);
                }
                claimed
            })
        })
        .collect();

    let mut all: Vec<SerialNumber> =
        handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    all.sort();

    // Every serial claimed exactly once across all drainers.
    assert_eq!(all, batch.as_slice().to_vec());
}
