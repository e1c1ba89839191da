//! Baseline merging and alert-threshold derivation.
//!
//! Merges the event catalog and statistics table into one record per event
//! and derives the catalog-wide alert threshold (twice the sum of merged
//! weights). The merge is a pure fold: the result never depends on map
//! iteration order, and names present in only one source are dropped with a
//! warning rather than merged.

use crate::catalog::{EventCatalog, EventKind};
use crate::stats::StatisticsTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-event merge of configured statistics and structural parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub mean: f64,
    pub std_dev: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub weight: u32,
    pub kind: EventKind,
}

/// Merged reference distributions plus the alert threshold.
///
/// An entry exists iff the event name appears in both the catalog and the
/// statistics table. Built once per (catalog, statistics) pair; a new round
/// with different statistics gets a fresh Baseline, never a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    entries: BTreeMap<String, BaselineEntry>,
    threshold: f64,
}

impl Baseline {
    /// Build directly from entries, deriving the threshold.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, BaselineEntry)>) -> Self {
        let entries: BTreeMap<String, BaselineEntry> = entries.into_iter().collect();
        let threshold = 2.0 * entries.values().map(|e| f64::from(e.weight)).sum::<f64>();
        Baseline { entries, threshold }
    }

    /// Alert threshold: `2 × Σ weight` over merged events.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn get(&self, name: &str) -> Option<&BaselineEntry> {
        self.entries.get(name)
    }

    /// Event names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BaselineEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which source a dropped event was missing from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSide {
    Catalog,
    Statistics,
}

impl std::fmt::Display for MissingSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingSide::Catalog => write!(f, "events file"),
            MissingSide::Statistics => write!(f, "statistics file"),
        }
    }
}

/// An event present in one source only, excluded from the merge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedEvent {
    pub name: String,
    pub missing_from: MissingSide,
}

/// Result of a merge: the baseline plus every name that fell out of it.
#[derive(Debug, Clone, Serialize)]
pub struct MergeOutcome {
    pub baseline: Baseline,
    pub dropped: Vec<DroppedEvent>,
}

/// Merge catalog and statistics into a Baseline.
///
/// Never fails: an empty overlap produces an empty baseline with threshold
/// zero. Dropped names are returned and logged, one warning each.
pub fn build_baseline(catalog: &EventCatalog, stats: &StatisticsTable) -> MergeOutcome {
    let mut entries = BTreeMap::new();
    let mut dropped = Vec::new();

    for (name, stat) in stats.iter() {
        match catalog.get(name) {
            Some(def) => {
                entries.insert(
                    name.to_string(),
                    BaselineEntry {
                        mean: stat.mean,
                        std_dev: stat.std_dev,
                        min: def.min,
                        max: def.max,
                        weight: def.weight,
                        kind: def.kind,
                    },
                );
            }
            None => dropped.push(DroppedEvent {
                name: name.to_string(),
                missing_from: MissingSide::Catalog,
            }),
        }
    }

    for (name, _) in catalog.iter() {
        if stats.get(name).is_none() {
            dropped.push(DroppedEvent {
                name: name.to_string(),
                missing_from: MissingSide::Statistics,
            });
        }
    }

    for d in &dropped {
        tracing::warn!(event = %d.name, missing_from = %d.missing_from, "dropping event from baseline merge");
    }

    MergeOutcome {
        baseline: Baseline::from_entries(entries),
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EventDefinition;
    use crate::stats::EventStatistic;

    fn event(name: &str, weight: u32) -> EventDefinition {
        EventDefinition {
            name: name.to_string(),
            kind: EventKind::Continuous,
            min: Some(0.0),
            max: Some(10.0),
            weight,
        }
    }

    fn stat(mean: f64, std_dev: f64) -> EventStatistic {
        EventStatistic { mean, std_dev }
    }

    #[test]
    fn merges_overlap_and_derives_threshold() {
        let catalog = EventCatalog::from_definitions([event("A", 1), event("B", 2)]);
        let stats = StatisticsTable::from_statistics([
            ("A".to_string(), stat(5.0, 1.0)),
            ("B".to_string(), stat(3.0, 0.5)),
        ]);

        let outcome = build_baseline(&catalog, &stats);
        assert_eq!(outcome.baseline.len(), 2);
        assert_eq!(outcome.baseline.threshold(), 6.0);
        assert!(outcome.dropped.is_empty());

        let a = outcome.baseline.get("A").unwrap();
        assert_eq!(a.mean, 5.0);
        assert_eq!(a.std_dev, 1.0);
        assert_eq!(a.min, Some(0.0));
        assert_eq!(a.max, Some(10.0));
        assert_eq!(a.weight, 1);
        assert_eq!(a.kind, EventKind::Continuous);
    }

    #[test]
    fn partial_overlap_drops_both_sides() {
        // Catalog {A, B}, statistics {A, C}: baseline holds A only; B is
        // missing from statistics, C from the catalog.
        let catalog = EventCatalog::from_definitions([event("A", 1), event("B", 2)]);
        let stats = StatisticsTable::from_statistics([
            ("A".to_string(), stat(5.0, 1.0)),
            ("C".to_string(), stat(9.0, 2.0)),
        ]);

        let outcome = build_baseline(&catalog, &stats);
        assert_eq!(outcome.baseline.len(), 1);
        assert!(outcome.baseline.get("A").is_some());
        assert_eq!(outcome.baseline.threshold(), 2.0);

        assert_eq!(outcome.dropped.len(), 2);
        assert!(outcome.dropped.contains(&DroppedEvent {
            name: "C".to_string(),
            missing_from: MissingSide::Catalog,
        }));
        assert!(outcome.dropped.contains(&DroppedEvent {
            name: "B".to_string(),
            missing_from: MissingSide::Statistics,
        }));
    }

    #[test]
    fn empty_overlap_gives_empty_baseline_threshold_zero() {
        let catalog = EventCatalog::from_definitions([event("A", 1)]);
        let stats = StatisticsTable::from_statistics([("Z".to_string(), stat(1.0, 1.0))]);

        let outcome = build_baseline(&catalog, &stats);
        assert!(outcome.baseline.is_empty());
        assert_eq!(outcome.baseline.threshold(), 0.0);
        assert_eq!(outcome.dropped.len(), 2);
    }

    #[test]
    fn threshold_is_independent_of_insertion_order() {
        let defs = [event("A", 1), event("B", 2), event("C", 4)];
        let stat_rows = [
            ("A".to_string(), stat(1.0, 1.0)),
            ("B".to_string(), stat(2.0, 1.0)),
            ("C".to_string(), stat(3.0, 1.0)),
        ];

        let forward = build_baseline(
            &EventCatalog::from_definitions(defs.clone()),
            &StatisticsTable::from_statistics(stat_rows.clone()),
        );
        let reversed = build_baseline(
            &EventCatalog::from_definitions(defs.into_iter().rev()),
            &StatisticsTable::from_statistics(stat_rows.into_iter().rev()),
        );

        assert_eq!(forward.baseline.threshold(), 14.0);
        assert_eq!(forward.baseline, reversed.baseline);
    }

    #[test]
    fn single_event_baseline_has_threshold_two() {
        // Catalog {A: C,0,10,weight=1}, statistics {A: mean=5, std=1}.
        let catalog = EventCatalog::from_definitions([event("A", 1)]);
        let stats = StatisticsTable::from_statistics([("A".to_string(), stat(5.0, 1.0))]);

        let outcome = build_baseline(&catalog, &stats);
        assert_eq!(outcome.baseline.threshold(), 2.0);
        let a = outcome.baseline.get("A").unwrap();
        assert_eq!((a.mean, a.std_dev, a.min, a.max, a.weight), (5.0, 1.0, Some(0.0), Some(10.0), 1));
    }
}
