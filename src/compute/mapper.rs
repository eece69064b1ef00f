use super::types::PartialAggregate;
use crate::protocol::types::Record;

/// Maps one record to its `(year, seed aggregate)` pair.
pub fn map_record(record: &Record) -> (i32, PartialAggregate) {
    (record.year, PartialAggregate::seed(record.score))
}

/// Maps a contiguous chunk of records, preserving their order.
pub fn map_records(records: &[Record]) -> Vec<(i32, PartialAggregate)> {
    records.iter().map(map_record).collect()
}
