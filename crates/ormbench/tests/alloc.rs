//! Allocation counting with the counting allocator installed.

use ormbench::alloc::{AllocSnapshot, CountingAllocator};
use ormbench::{Bencher, ErrorReporter};

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[test]
fn test_snapshot_counts_allocations() {
    let before = AllocSnapshot::now();
    let v: Vec<u64> = Vec::with_capacity(512);
    std::hint::black_box(&v);
    let delta = AllocSnapshot::now().since(&before);

    assert!(delta.allocations >= 1);
    assert!(delta.bytes >= 512 * 8);
}

#[test]
fn test_bencher_excludes_setup_allocations() {
    let mut b = Bencher::new(10, ErrorReporter::new());
    b.start();

    // Setup: a large allocation the measurement must not see.
    let setup = vec![0u8; 1 << 20];
    std::hint::black_box(&setup);

    b.reset();
    let mut boxes = Vec::new();
    for i in 0..b.iterations() {
        boxes.push(Box::new(i));
    }
    b.stop();
    std::hint::black_box(&boxes);

    let allocs = b.allocations();
    assert!(allocs.allocations >= 10);
    assert!(allocs.bytes < 1 << 20);
}
