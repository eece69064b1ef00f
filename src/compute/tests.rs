//! Compute Module Tests
//!
//! Exercises the map-reduce stage in isolation: seed construction, the
//! reduce fold, chunk invariance, rounding behavior, and the empty-batch
//! short circuit.

#[cfg(test)]
mod tests {
    use crate::compute::mapper::{map_record, map_records};
    use crate::compute::reducer::{finalize, reduce};
    use crate::compute::stage::{process_batch, run_map_phase, worker_count};
    use crate::compute::types::PartialAggregate;
    use crate::protocol::types::Record;

    fn record(year: i32, score: f64) -> Record {
        Record { year, score }
    }

    // ============================================================
    // TEST 1: Mapper
    // ============================================================

    #[test]
    fn test_map_record_seeds_all_fields_from_score() {
        let (year, seed) = map_record(&record(2020, 88.5));

        assert_eq!(year, 2020);
        assert_eq!(seed.min, 88.5);
        assert_eq!(seed.max, 88.5);
        assert_eq!(seed.sum, 88.5);
        assert_eq!(seed.count, 1);
    }

    #[test]
    fn test_map_records_preserves_order() {
        let batch = vec![record(2020, 1.0), record(2021, 2.0), record(2020, 3.0)];

        let pairs = map_records(&batch);

        let years: Vec<i32> = pairs.iter().map(|(year, _)| *year).collect();
        assert_eq!(years, vec![2020, 2021, 2020]);
    }

    // ============================================================
    // TEST 2: Reducer
    // ============================================================

    #[test]
    fn test_reduce_groups_by_year() {
        let pairs = vec![
            (2020, PartialAggregate::seed(80.0)),
            (2020, PartialAggregate::seed(90.0)),
            (2021, PartialAggregate::seed(70.0)),
        ];

        let groups = reduce(pairs);

        assert_eq!(groups.len(), 2);
        let y2020 = &groups[&2020];
        assert_eq!(y2020.min, 80.0);
        assert_eq!(y2020.max, 90.0);
        assert_eq!(y2020.sum, 170.0);
        assert_eq!(y2020.count, 2);
        assert_eq!(groups[&2021].count, 1);
    }

    #[test]
    fn test_finalize_rounds_average_half_to_even() {
        // 1.5 and 2.5 both sit exactly between integers; banker's rounding
        // sends both to 2.
        let down = reduce(map_records(&[record(2020, 2.0), record(2020, 3.0)]));
        assert_eq!(finalize(down)[&2020].avg, 2);

        let up = reduce(map_records(&[record(2020, 1.0), record(2020, 2.0)]));
        assert_eq!(finalize(up)[&2020].avg, 2);

        let odd = reduce(map_records(&[record(2020, 3.0), record(2020, 4.0)]));
        assert_eq!(finalize(odd)[&2020].avg, 4);
    }

    #[test]
    fn test_min_never_exceeds_max() {
        let batch = vec![
            record(2019, 55.5),
            record(2019, 12.0),
            record(2020, 99.9),
            record(2020, 0.1),
            record(2021, 42.0),
        ];

        let stats = process_batch(&batch).unwrap();

        for (year, entry) in &stats {
            assert!(entry.min <= entry.max, "year {year} has min > max");
        }
    }

    #[test]
    fn test_single_record_batch() {
        let stats = process_batch(&[record(2022, 61.4)]).unwrap();

        let entry = &stats[&2022];
        assert_eq!(entry.min, 61.4);
        assert_eq!(entry.max, 61.4);
        assert_eq!(entry.avg, 61);
    }

    // ============================================================
    // TEST 3: Chunked map phase
    // ============================================================

    #[test]
    fn test_chunking_does_not_change_results() {
        let batch: Vec<Record> = (0..103)
            .map(|i| record(2000 + (i % 7), f64::from(i) * 1.5))
            .collect();

        let single = finalize(reduce(run_map_phase(&batch, 1).unwrap()));
        let chunked = finalize(reduce(run_map_phase(&batch, 4).unwrap()));

        assert_eq!(single.len(), chunked.len());
        for (year, expected) in &single {
            assert_eq!(&chunked[year], expected, "year {year} diverged");
        }
    }

    #[test]
    fn test_more_workers_than_records() {
        let batch = vec![record(2020, 1.0), record(2021, 2.0), record(2022, 3.0)];

        let pairs = run_map_phase(&batch, 16).unwrap();

        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_empty_batch_yields_empty_map() {
        let stats = process_batch(&[]).unwrap();

        assert!(stats.is_empty());
    }

    #[test]
    fn test_worker_count_is_at_least_one() {
        assert!(worker_count() >= 1);
    }
}
