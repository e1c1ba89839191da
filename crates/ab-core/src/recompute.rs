//! Live statistics recomputation from a generated activity log.
//!
//! Recomputes per-event mean and std-dev over the values a run actually
//! produced, so days can be re-scored against observed history instead of
//! the configured baseline. Population statistics, matching the pool
//! normalization convention.

use crate::generate::DailyRecord;
use crate::stats::{EventStatistic, StatisticsTable};
use ab_common::{Error, Result};
use ab_math::population_moments;
use std::collections::BTreeMap;

/// Variance over a run needs at least this many days.
const MIN_DAYS: usize = 2;

/// Recompute per-event statistics over all days of one run.
///
/// Fails with `InsufficientSampleSize` for fewer than 2 days.
pub fn recompute_statistics(records: &[DailyRecord]) -> Result<StatisticsTable> {
    if records.len() < MIN_DAYS {
        return Err(Error::InsufficientSampleSize {
            n: records.len(),
            min: MIN_DAYS,
        });
    }

    let mut observed: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        for (name, value) in &record.values {
            observed.entry(name.as_str()).or_default().push(*value);
        }
    }

    let mut stats = BTreeMap::new();
    for (name, values) in observed {
        let Some(m) = population_moments(&values) else {
            continue;
        };
        stats.insert(
            name.to_string(),
            EventStatistic {
                mean: m.mean,
                std_dev: m.std_dev,
            },
        );
    }

    Ok(StatisticsTable::from_statistics(stats))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, values: &[(&str, f64)]) -> DailyRecord {
        DailyRecord {
            day,
            values: values.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn recomputes_population_moments_per_event() {
        let records = vec![
            record(1, &[("A", 2.0), ("B", 10.0)]),
            record(2, &[("A", 4.0), ("B", 10.0)]),
            record(3, &[("A", 6.0), ("B", 10.0)]),
        ];
        let table = recompute_statistics(&records).unwrap();

        let a = table.get("A").unwrap();
        assert!((a.mean - 4.0).abs() < 1e-12);
        // Population std of {2, 4, 6} is sqrt(8/3).
        assert!((a.std_dev - (8.0f64 / 3.0).sqrt()).abs() < 1e-12);

        let b = table.get("B").unwrap();
        assert_eq!(b.mean, 10.0);
        assert_eq!(b.std_dev, 0.0);
    }

    #[test]
    fn single_day_is_insufficient_sample_size() {
        let err = recompute_statistics(&[record(1, &[("A", 1.0)])]).unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientSampleSize { n: 1, min: 2 }
        ));
    }

    #[test]
    fn empty_run_is_insufficient_sample_size() {
        let err = recompute_statistics(&[]).unwrap_err();
        assert!(matches!(err, Error::InsufficientSampleSize { n: 0, .. }));
    }

    #[test]
    fn events_absent_on_some_days_use_observed_values_only() {
        let records = vec![
            record(1, &[("A", 1.0), ("Rare", 5.0)]),
            record(2, &[("A", 3.0)]),
        ];
        let table = recompute_statistics(&records).unwrap();
        assert_eq!(table.get("A").unwrap().mean, 2.0);
        let rare = table.get("Rare").unwrap();
        assert_eq!(rare.mean, 5.0);
        assert_eq!(rare.std_dev, 0.0);
    }
}
