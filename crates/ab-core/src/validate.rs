//! Consistency validation between the event catalog and statistics table.
//!
//! Findings are returned to the caller as data, never thrown; the caller
//! decides whether to abort. Neither input is mutated.

use crate::catalog::{EventCatalog, EventKind};
use crate::stats::StatisticsTable;
use serde::Serialize;
use std::collections::BTreeSet;

/// A single inconsistency between the two configuration sources.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The sources disagree on the event name set. Reported once,
    /// aggregated, regardless of how many names differ.
    NameSetMismatch {
        only_in_catalog: Vec<String>,
        only_in_stats: Vec<String>,
    },
    /// A continuous event with both bounds declared has a configured mean
    /// outside them. Reported once per offending event.
    MeanOutsideBounds {
        name: String,
        mean: f64,
        min: f64,
        max: f64,
    },
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::NameSetMismatch {
                only_in_catalog,
                only_in_stats,
            } => write!(
                f,
                "event name sets disagree (only in events file: {:?}; only in statistics file: {:?})",
                only_in_catalog, only_in_stats
            ),
            Finding::MeanOutsideBounds {
                name,
                mean,
                min,
                max,
            } => write!(
                f,
                "{name}: mean {mean} is outside the declared bounds [{min}, {max}]"
            ),
        }
    }
}

/// Check that catalog and statistics agree on the event set and that every
/// fully-bounded continuous event's mean lies within its bounds.
///
/// Returns an ordered finding list; empty means consistent.
pub fn check_consistency(catalog: &EventCatalog, stats: &StatisticsTable) -> Vec<Finding> {
    let mut findings = Vec::new();

    let catalog_names: BTreeSet<&str> = catalog.names().collect();
    let stat_names: BTreeSet<&str> = stats.names().collect();
    if catalog_names != stat_names {
        findings.push(Finding::NameSetMismatch {
            only_in_catalog: catalog_names
                .difference(&stat_names)
                .map(|s| s.to_string())
                .collect(),
            only_in_stats: stat_names
                .difference(&catalog_names)
                .map(|s| s.to_string())
                .collect(),
        });
    }

    for (name, def) in catalog.iter() {
        let Some(stat) = stats.get(name) else {
            continue;
        };
        if def.kind != EventKind::Continuous {
            continue;
        }
        // Both bounds must be explicitly declared; an unspecified bound
        // never participates in the range check.
        if let (Some(min), Some(max)) = (def.min, def.max) {
            if stat.mean < min || stat.mean > max {
                findings.push(Finding::MeanOutsideBounds {
                    name: name.to_string(),
                    mean: stat.mean,
                    min,
                    max,
                });
            }
        }
    }

    findings
}
