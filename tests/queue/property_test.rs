/*!
 * Bounded Queue Property Tests
 *
 * For any capacity, target and pool sizes: every item is produced exactly
 * once and consumed exactly once.
 */

use proptest::prelude::*;
use sync_coord::queue::{Discipline, QueueConfig};
use sync_coord::workload::{master_worker, MasterWorkerConfig};
use sync_coord::queue::NoopReporter;

fn discipline() -> impl Strategy<Value = Discipline> {
    prop_oneof![Just(Discipline::Lifo), Just(Discipline::Fifo)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_counts_match_target(
        total_items in 0u64..2_000,
        capacity in 1usize..16,
        num_workers in 1usize..6,
        num_masters in 1usize..6,
        discipline in discipline(),
    ) {
        let config = MasterWorkerConfig {
            discipline,
            ..MasterWorkerConfig::new(total_items, capacity, num_workers, num_masters)
        };
        let summary = master_worker::run(config, NoopReporter).unwrap();

        prop_assert_eq!(summary.total_produced(), total_items);
        prop_assert_eq!(summary.total_consumed(), total_items);
        prop_assert_eq!(summary.stats.produced, total_items);
        prop_assert_eq!(summary.stats.consumed, total_items);
        prop_assert_eq!(summary.stats.len, 0);
        prop_assert!(summary.stats.peak_len <= capacity);
        prop_assert_eq!(summary.produced_by.len(), num_masters);
        prop_assert_eq!(summary.consumed_by.len(), num_workers);
    }

    #[test]
    fn prop_zero_capacity_always_rejected(total_items in 0u64..1_000) {
        prop_assert!(QueueConfig::new(0, total_items).validate().is_err());
    }
}
