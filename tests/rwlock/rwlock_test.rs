/*!
 * Reader-Writer Lock Tests
 * Shared access, exclusion and release protocol under contention
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;
use sync_coord::rwlock::{LockConfig, LockState, LockStats, ReaderWriterLock};
use sync_coord::workload::{rw_mix, RwMixConfig};
use sync_coord::{LockRole, SyncError};

#[test]
fn test_fifty_readers_share_the_lock() {
    const READERS: usize = 50;
    let lock = Arc::new(ReaderWriterLock::new());
    let barrier = Arc::new(Barrier::new(READERS));

    let handles: Vec<_> = (0..READERS)
        .map(|_| {
            let lock = lock.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                lock.acquire_read();
                // Nobody passes until all fifty are inside at once
                barrier.wait();
                lock.release_read().unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = lock.stats();
    assert_eq!(stats.peak_readers, READERS);
    assert_eq!(stats.read_acquisitions, READERS as u64);
    assert_eq!(lock.state(), LockState::Idle);
}

#[test]
fn test_writer_never_sees_readers_inside() {
    let lock = Arc::new(ReaderWriterLock::new());
    let readers_inside = Arc::new(AtomicUsize::new(0));
    let writer_inside = Arc::new(AtomicBool::new(false));
    let violations = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..6 {
        let (lock, readers_inside, writer_inside, violations) = (
            lock.clone(),
            readers_inside.clone(),
            writer_inside.clone(),
            violations.clone(),
        );
        handles.push(thread::spawn(move || {
            for _ in 0..300 {
                let _guard = lock.read();
                readers_inside.fetch_add(1, Ordering::SeqCst);
                if writer_inside.load(Ordering::SeqCst) {
                    violations.fetch_add(1, Ordering::SeqCst);
                }
                thread::yield_now();
                readers_inside.fetch_sub(1, Ordering::SeqCst);
            }
        }));
    }
    for _ in 0..2 {
        let (lock, readers_inside, writer_inside, violations) = (
            lock.clone(),
            readers_inside.clone(),
            writer_inside.clone(),
            violations.clone(),
        );
        handles.push(thread::spawn(move || {
            for _ in 0..150 {
                let _guard = lock.write();
                if writer_inside.swap(true, Ordering::SeqCst)
                    || readers_inside.load(Ordering::SeqCst) != 0
                {
                    violations.fetch_add(1, Ordering::SeqCst);
                }
                thread::yield_now();
                writer_inside.store(false, Ordering::SeqCst);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(violations.load(Ordering::SeqCst), 0);
    let stats = lock.stats();
    assert_eq!(stats.read_acquisitions, 1_800);
    assert_eq!(stats.write_acquisitions, 300);
    assert_eq!(lock.state(), LockState::Idle);
}

#[test]
fn test_two_writers_three_readers_random_order() {
    let summary = rw_mix::run(RwMixConfig {
        readers: 3,
        writers: 2,
        operations: 1_000,
        seed: 42,
        max_hold: Duration::from_micros(100),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(summary.violations, 0);
    assert_eq!(summary.reads + summary.writes, 1_000);
    assert_eq!(summary.reads, 600);
    assert_eq!(summary.writes, 400);
    assert_eq!(summary.stats.state(), LockState::Idle);
    assert_eq!(summary.stats.waiting_writers, 0);
}

#[test]
fn test_reader_preferred_mix_keeps_exclusion() {
    let summary = rw_mix::run(RwMixConfig {
        readers: 3,
        writers: 2,
        operations: 500,
        seed: 9,
        max_hold: Duration::from_micros(50),
        preference: sync_coord::Preference::ReaderPreferred,
    })
    .unwrap();

    assert_eq!(summary.violations, 0);
    assert_eq!(summary.reads + summary.writes, 500);
}

#[test]
fn test_protocol_violation_leaves_counters_untouched() {
    let lock = ReaderWriterLock::new();
    lock.acquire_write();
    let before = lock.stats();

    let err = lock.release_read().unwrap_err();
    assert_eq!(
        err,
        SyncError::ProtocolViolation {
            role: LockRole::Reader,
            detail: "no active reader".to_string(),
        }
    );
    assert_eq!(lock.stats(), before);

    lock.release_write().unwrap();
    assert!(matches!(
        lock.release_write(),
        Err(SyncError::ProtocolViolation { role: LockRole::Writer, .. })
    ));
}

#[test]
fn test_timed_out_writer_releases_blocked_readers() {
    let lock = Arc::new(ReaderWriterLock::with_config(LockConfig::writer_preferred()));
    lock.acquire_read();

    // Writer queues behind the reader and will give up
    let writer_lock = lock.clone();
    let writer = thread::spawn(move || writer_lock.acquire_write_timeout(Duration::from_millis(200)));

    while lock.stats().waiting_writers == 0 {
        thread::sleep(Duration::from_millis(1));
    }

    // This reader parks behind the waiting writer
    let reader_lock = lock.clone();
    let reader = thread::spawn(move || {
        reader_lock.acquire_read();
        reader_lock.release_read().unwrap();
    });

    assert!(matches!(
        writer.join().unwrap(),
        Err(SyncError::TimedOut { .. })
    ));
    // Once the writer withdrew, the parked reader must get in
    reader.join().unwrap();

    lock.release_read().unwrap();
    let stats = lock.stats();
    assert_eq!(
        stats,
        LockStats {
            peak_readers: stats.peak_readers,
            read_acquisitions: 2,
            timeouts: 1,
            ..LockStats::default()
        }
    );
}

#[test]
fn test_release_write_hands_off_to_waiting_writer_before_readers() {
    let lock = Arc::new(ReaderWriterLock::new());
    let order = Arc::new(Mutex::new(Vec::new()));
    lock.acquire_write();

    let (writer_lock, writer_order) = (lock.clone(), order.clone());
    let writer = thread::spawn(move || {
        let _guard = writer_lock.write();
        writer_order.lock().unwrap().push("writer");
        // Hold long enough that a wrongly admitted reader would record first
        thread::sleep(Duration::from_millis(20));
    });
    while lock.stats().waiting_writers == 0 {
        thread::sleep(Duration::from_millis(1));
    }

    let (reader_lock, reader_order) = (lock.clone(), order.clone());
    let reader = thread::spawn(move || {
        let _guard = reader_lock.read();
        reader_order.lock().unwrap().push("reader");
    });
    // Let the reader park behind the waiting writer
    thread::sleep(Duration::from_millis(50));
    assert!(order.lock().unwrap().is_empty());

    lock.release_write().unwrap();
    writer.join().unwrap();
    reader.join().unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["writer", "reader"]);
    let stats = lock.stats();
    assert_eq!(stats.write_acquisitions, 2);
    assert_eq!(stats.read_acquisitions, 1);
    assert_eq!(stats.state(), LockState::Idle);
}
