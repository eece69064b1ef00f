//! Result Merge & Output
//!
//! Folds every successful engine response into one table keyed by year and
//! writes the final report.

use crate::protocol::types::YearStats;

use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::Path;

/// Cross-engine statistics for one year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedStats {
    pub min: f64,
    pub max: f64,
    /// Unweighted mean of the per-response averages, rounded half to even.
    pub avg: i64,
    /// How many engine responses contributed to this year.
    pub responses: u64,
}

struct Accumulator {
    min: f64,
    max: f64,
    sum: f64,
    count: u64,
}

/// Merges per-engine responses into one ascending table keyed by year.
///
/// Each response gets exactly one vote per year it reports: `min` and `max`
/// fold normally, while the final average is the mean of the incoming
/// per-response averages regardless of how many records each response
/// covered. The per-year response count is kept on the result so consumers
/// can see that weighting. Year keys that do not parse as integers are
/// skipped.
pub fn merge_results(responses: &[HashMap<String, YearStats>]) -> BTreeMap<i32, MergedStats> {
    let mut merged: BTreeMap<i32, Accumulator> = BTreeMap::new();

    for response in responses {
        for (key, stats) in response {
            let Ok(year) = key.parse::<i32>() else {
                tracing::warn!("Skipping unparseable year key {:?}", key);
                continue;
            };

            merged
                .entry(year)
                .and_modify(|acc| {
                    acc.min = acc.min.min(stats.min);
                    acc.max = acc.max.max(stats.max);
                    acc.sum += stats.avg as f64;
                    acc.count += 1;
                })
                .or_insert(Accumulator {
                    min: stats.min,
                    max: stats.max,
                    sum: stats.avg as f64,
                    count: 1,
                });
        }
    }

    merged
        .into_iter()
        .map(|(year, acc)| {
            let avg = (acc.sum / acc.count as f64).round_ties_even() as i64;
            (
                year,
                MergedStats {
                    min: acc.min,
                    max: acc.max,
                    avg,
                    responses: acc.count,
                },
            )
        })
        .collect()
}

/// Writes one `year,min,max,avg` line per year, ascending, to `path`.
///
/// The statistics are truncated to whole numbers in the artifact. Each line
/// is also logged in a human-readable form as it is written.
pub fn write_output(merged: &BTreeMap<i32, MergedStats>, path: &Path) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;

    for (year, stats) in merged {
        writeln!(
            file,
            "{},{},{},{}",
            year, stats.min as i64, stats.max as i64, stats.avg
        )?;
        tracing::info!(
            "Year {}: min={}, max={}, avg={} ({} response(s))",
            year,
            stats.min as i64,
            stats.max as i64,
            stats.avg,
            stats.responses
        );
    }

    Ok(())
}
