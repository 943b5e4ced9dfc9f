/*!
 * Bounded Queue Tests
 * Accounting, invariants and termination under concurrent producers/consumers
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use sync_coord::queue::{
    BoundedQueue, ConsumeOutcome, EventKind, ProduceOutcome, QueueConfig, QueueEvent,
    RecordingReporter,
};
use sync_coord::SyncError;

/// Drive `producers` and `consumers` threads to completion, returning every
/// produced and consumed item
fn drive<R: sync_coord::Reporter>(
    queue: &BoundedQueue<R>,
    producers: usize,
    consumers: usize,
) -> (Vec<u64>, Vec<u64>) {
    thread::scope(|scope| {
        let producer_handles: Vec<_> = (0..producers)
            .map(|id| {
                scope.spawn(move || {
                    let mut items = Vec::new();
                    while let ProduceOutcome::Produced(item) = queue.try_produce(id) {
                        items.push(item);
                    }
                    items
                })
            })
            .collect();
        let consumer_handles: Vec<_> = (0..consumers)
            .map(|id| {
                scope.spawn(move || {
                    let mut items = Vec::new();
                    while let ConsumeOutcome::Consumed(item) = queue.try_consume(id) {
                        items.push(item);
                    }
                    items
                })
            })
            .collect();

        let mut produced: Vec<u64> = producer_handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let mut consumed: Vec<u64> = consumer_handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        produced.sort_unstable();
        consumed.sort_unstable();
        (produced, consumed)
    })
}

#[test]
fn test_capacity_one_three_items_alternates() {
    let queue =
        BoundedQueue::with_reporter(QueueConfig::new(1, 3), RecordingReporter::new()).unwrap();

    let (produced, consumed) = drive(&queue, 1, 1);
    assert_eq!(produced, vec![0, 1, 2]);
    assert_eq!(consumed, vec![0, 1, 2]);

    let stats = queue.stats();
    assert_eq!((stats.produced, stats.consumed), (3, 3));
    assert_eq!(stats.peak_len, 1);
    assert_eq!(stats.len, 0);

    let events = queue.into_reporter().into_events();
    let expected: Vec<QueueEvent> = (0..3)
        .flat_map(|item| {
            [
                QueueEvent { kind: EventKind::Produced, item, actor: 0 },
                QueueEvent { kind: EventKind::Consumed, item, actor: 0 },
            ]
        })
        .collect();
    assert_eq!(events, expected);

    // Buffer length replayed from the event log: 0→1→0→1→0→1→0
    let mut len = 0i64;
    let lengths: Vec<i64> = events
        .iter()
        .map(|event| {
            len += match event.kind {
                EventKind::Produced => 1,
                EventKind::Consumed => -1,
            };
            len
        })
        .collect();
    assert_eq!(lengths, vec![1, 0, 1, 0, 1, 0]);
}

#[test]
fn test_every_item_exactly_once_many_workers() {
    let queue = BoundedQueue::new(8, 5_000).unwrap();
    let (produced, consumed) = drive(&queue, 4, 6);

    let expected: Vec<u64> = (0..5_000).collect();
    assert_eq!(produced, expected);
    assert_eq!(consumed, expected);
    assert!(queue.is_finished());
}

#[test]
fn test_liveness_large_run_capacity_one() {
    const TOTAL: u64 = 100_000;
    let queue = BoundedQueue::new(1, TOTAL).unwrap();
    let (produced, consumed) = drive(&queue, 3, 3);

    assert_eq!(produced.len() as u64, TOTAL);
    assert_eq!(consumed.len() as u64, TOTAL);
    assert_eq!(consumed.first(), Some(&0));
    assert_eq!(consumed.last(), Some(&(TOTAL - 1)));

    let stats = queue.stats();
    assert_eq!(stats.peak_len, 1);
    assert_eq!((stats.produced, stats.consumed, stats.len), (TOTAL, TOTAL, 0));
}

#[test]
fn test_sampled_invariants_hold_during_run() {
    const CAPACITY: usize = 3;
    const TOTAL: u64 = 20_000;
    let queue = BoundedQueue::new(CAPACITY, TOTAL).unwrap();
    let running = AtomicBool::new(true);

    thread::scope(|scope| {
        let sampler = scope.spawn(|| {
            let mut samples = 0u64;
            while running.load(Ordering::Acquire) {
                let stats = queue.stats();
                assert!(stats.len <= CAPACITY);
                assert!(stats.consumed <= stats.produced);
                assert!(stats.produced <= TOTAL);
                assert_eq!(stats.len as u64, stats.produced - stats.consumed);
                samples += 1;
            }
            samples
        });

        let (produced, consumed) = drive(&queue, 2, 2);
        running.store(false, Ordering::Release);

        assert_eq!(produced.len() as u64, TOTAL);
        assert_eq!(consumed.len() as u64, TOTAL);
        assert!(sampler.join().unwrap() > 0);
    });

    assert!(queue.stats().peak_len <= CAPACITY);
}

#[test]
fn test_parked_consumers_released_at_end() {
    let queue = BoundedQueue::new(2, 1).unwrap();
    let queue = &queue;

    thread::scope(|scope| {
        let consumers: Vec<_> = (0..5)
            .map(|id| scope.spawn(move || queue_consume_all(queue, id)))
            .collect();

        // Let the consumers park on the empty buffer
        thread::sleep(Duration::from_millis(50));
        assert_eq!(queue.try_produce(0), ProduceOutcome::Produced(0));
        assert_eq!(queue.try_produce(0), ProduceOutcome::Done);

        let consumed: usize = consumers.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(consumed, 1);
    });
}

fn queue_consume_all(queue: &BoundedQueue, id: usize) -> usize {
    let mut consumed = 0;
    while !queue.try_consume(id).is_done() {
        consumed += 1;
    }
    consumed
}

#[test]
fn test_timed_operations_report_done_after_run() {
    let queue = BoundedQueue::new(1, 1).unwrap();
    assert_eq!(
        queue.try_produce_timeout(0, Duration::from_millis(10)).unwrap(),
        ProduceOutcome::Produced(0)
    );
    assert_eq!(
        queue.try_produce_timeout(0, Duration::from_millis(10)).unwrap(),
        ProduceOutcome::Done
    );
    assert_eq!(
        queue.try_consume_timeout(0, Duration::from_millis(10)).unwrap(),
        ConsumeOutcome::Consumed(0)
    );
    assert_eq!(
        queue.try_consume_timeout(0, Duration::from_millis(10)).unwrap(),
        ConsumeOutcome::Done
    );
}

#[test]
fn test_timed_out_produce_is_recoverable() {
    let queue = BoundedQueue::new(1, 2).unwrap();
    queue.try_produce(0);

    let err = queue
        .try_produce_timeout(0, Duration::from_millis(20))
        .unwrap_err();
    assert!(err.is_recoverable());
    assert!(matches!(err, SyncError::TimedOut { timeout_ms: 20, .. }));

    // Retry succeeds once room is made
    queue.try_consume(0);
    assert_eq!(
        queue.try_produce_timeout(0, Duration::from_millis(20)).unwrap(),
        ProduceOutcome::Produced(1)
    );
}
