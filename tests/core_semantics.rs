use mmg_bounded::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// 计数析构次数，用于检查所有权只释放一次
struct Tracked(Arc<AtomicUsize>);
impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn single_slot_roundtrip() {
    let q = BoundedQueue::new(1).expect("queue");
    q.enqueue("x");
    assert!(!q.is_empty());
    assert_eq!(q.dequeue(), Some("x"));
    assert!(q.is_empty());
}

#[test]
fn serialized_calls_preserve_fifo_order() {
    for cap in [1usize, 2, 3, 7, 16] {
        let q = BoundedQueue::new(cap).expect("queue");
        let mut next = 0u32;
        let mut expected = 0u32;
        // 交错填充/取出，覆盖多次回绕
        for _ in 0..50 {
            while q.len() < cap {
                q.enqueue(next);
                next += 1;
            }
            for _ in 0..(cap / 2).max(1) {
                assert_eq!(q.dequeue(), Some(expected));
                expected += 1;
            }
        }
        q.shutdown();
        while let Some(v) = q.dequeue() {
            assert_eq!(v, expected);
            expected += 1;
        }
        assert_eq!(expected, next, "capacity {cap}");
    }
}

#[test]
fn zero_capacity_is_rejected() {
    let r = BoundedQueue::<u8>::new(0);
    assert!(matches!(r, Err(QueueError::ZeroCapacity)));
}

#[test]
fn len_and_capacity_snapshots() {
    let q = BoundedQueue::with_name(3, "jobs").expect("queue");
    assert_eq!(q.capacity(), 3);
    assert_eq!(q.name(), Some("jobs"));
    assert_eq!(q.len(), 0);
    q.enqueue(1);
    q.enqueue(2);
    assert_eq!(q.len(), 2);
    let _ = q.dequeue();
    assert_eq!(q.len(), 1);
    assert_eq!(q.capacity(), 3);
}

#[test]
fn is_shutdown_is_monotonic_across_threads() {
    let q = Arc::new(BoundedQueue::<u8>::new(1).expect("queue"));
    assert!(!q.is_shutdown());
    let q2 = q.clone();
    std::thread::spawn(move || q2.shutdown())
        .join()
        .expect("join");
    for _ in 0..4 {
        let qc = q.clone();
        let seen = std::thread::spawn(move || qc.is_shutdown())
            .join()
            .expect("join");
        assert!(seen);
    }
    q.shutdown();
    assert!(q.is_shutdown());
}

#[test]
fn drop_after_clean_drain_releases_everything_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let q = BoundedQueue::new(4).expect("queue");
    for _ in 0..4 {
        q.enqueue(Tracked(drops.clone()));
    }
    for _ in 0..4 {
        let item = q.dequeue().expect("item");
        drop(item);
    }
    assert_eq!(drops.load(Ordering::SeqCst), 4);
    drop(q);
    assert_eq!(drops.load(Ordering::SeqCst), 4);
}

#[test]
fn drop_with_buffered_items_releases_them() {
    let drops = Arc::new(AtomicUsize::new(0));
    let q = BoundedQueue::new(4).expect("queue");
    q.enqueue(Tracked(drops.clone()));
    q.enqueue(Tracked(drops.clone()));
    q.enqueue(Tracked(drops.clone()));
    let first = q.dequeue().expect("item");
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(q);
    assert_eq!(drops.load(Ordering::SeqCst), 2);
    drop(first);
    assert_eq!(drops.load(Ordering::SeqCst), 3);
}

#[test]
fn debug_output_hides_items() {
    let q = BoundedQueue::with_name(2, "dbg").expect("queue");
    q.enqueue(String::from("secret"));
    let s = format!("{q:?}");
    assert!(s.contains("dbg"));
    assert!(s.contains("len: 1"));
    assert!(!s.contains("secret"));
}

#[test]
fn capacity_is_stable_through_wraparound_and_shutdown() {
    let q = BoundedQueue::new(3).expect("queue");
    for round in 0..4u32 {
        q.enqueue(round);
        q.enqueue(round + 100);
        assert_eq!(q.capacity(), 3);
        let _ = q.dequeue_up_to(2);
    }
    q.shutdown();
    assert_eq!(q.capacity(), 3);
    assert!(format!("{q:?}").contains("capacity: 3"));
}
