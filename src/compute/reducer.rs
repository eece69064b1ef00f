use super::types::PartialAggregate;
use crate::protocol::types::YearStats;
use std::collections::HashMap;

/// Sequentially folds mapped pairs into one aggregate per year.
pub fn reduce(pairs: Vec<(i32, PartialAggregate)>) -> HashMap<i32, PartialAggregate> {
    let mut groups: HashMap<i32, PartialAggregate> = HashMap::new();

    for (year, aggregate) in pairs {
        groups
            .entry(year)
            .and_modify(|acc| acc.absorb(&aggregate))
            .or_insert(aggregate);
    }

    groups
}

/// Converts each year's final aggregate into its reported statistics.
///
/// The average is rounded half to even, the rounding mode the rest of the
/// pipeline expects; `sum` and `count` are dropped from the output shape.
pub fn finalize(groups: HashMap<i32, PartialAggregate>) -> HashMap<i32, YearStats> {
    groups
        .into_iter()
        .map(|(year, aggregate)| {
            let avg = (aggregate.sum / aggregate.count as f64).round_ties_even() as i64;
            (
                year,
                YearStats {
                    min: aggregate.min,
                    max: aggregate.max,
                    avg,
                },
            )
        })
        .collect()
}
