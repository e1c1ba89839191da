//! Per-day anomaly scoring against a statistics source.
//!
//! A day is scored by summing, over its events, the weighted std-dev-
//! normalized absolute deviation from the source mean. Two named sources
//! are supported: `configured` scores against the baseline the run was
//! generated from (drift from a fixed external reference), `live` scores
//! against statistics recomputed from the generated log itself (drift from
//! your own recent history). Weights are structural and always come from
//! the baseline, whichever source supplies mean and spread.

use crate::baseline::Baseline;
use crate::generate::DailyRecord;
use crate::stats::StatisticsTable;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Day classification relative to the alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    Normal,
    Flagged,
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DayStatus::Normal => write!(f, "normal"),
            DayStatus::Flagged => write!(f, "FLAGGED"),
        }
    }
}

/// Scored day. Derived from a DailyRecord, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    pub day: u32,
    /// Per-event contribution; only events present in the statistics
    /// source appear here.
    pub per_event: BTreeMap<String, f64>,
    pub total: f64,
    pub status: DayStatus,
}

/// Which statistics feed the scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Score against the configured baseline.
    #[default]
    Configured,
    /// Score against statistics recomputed from the generated log.
    Live,
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringMode::Configured => write!(f, "configured"),
            ScoringMode::Live => write!(f, "live"),
        }
    }
}

/// Per-event scoring parameters resolved from the active source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringStat {
    pub mean: f64,
    pub std_dev: f64,
    pub weight: u32,
}

/// A statistics source resolved for scoring, plus the alert threshold.
///
/// The threshold derives from the baseline's weights in both modes; live
/// statistics replace mean and spread only.
#[derive(Debug, Clone, Serialize)]
pub struct ScoringSource {
    mode: ScoringMode,
    stats: BTreeMap<String, ScoringStat>,
    threshold: f64,
}

impl ScoringSource {
    /// Score against the configured baseline itself.
    pub fn configured(baseline: &Baseline) -> Self {
        let stats = baseline
            .iter()
            .map(|(name, e)| {
                (
                    name.to_string(),
                    ScoringStat {
                        mean: e.mean,
                        std_dev: e.std_dev,
                        weight: e.weight,
                    },
                )
            })
            .collect();
        ScoringSource {
            mode: ScoringMode::Configured,
            stats,
            threshold: baseline.threshold(),
        }
    }

    /// Score against live recomputed statistics, weights from the baseline.
    ///
    /// Events present in only one of the two inputs are skipped with a
    /// warning; scoring proceeds over the overlap.
    pub fn live(baseline: &Baseline, live: &StatisticsTable) -> Self {
        let mut stats = BTreeMap::new();
        for (name, stat) in live.iter() {
            match baseline.get(name) {
                Some(entry) => {
                    stats.insert(
                        name.to_string(),
                        ScoringStat {
                            mean: stat.mean,
                            std_dev: stat.std_dev,
                            weight: entry.weight,
                        },
                    );
                }
                None => {
                    tracing::warn!(event = name, "live statistics cover an event the baseline lacks; skipping");
                }
            }
        }
        for name in baseline.names() {
            if live.get(name).is_none() {
                tracing::warn!(event = name, "baseline event missing from live statistics; skipping");
            }
        }
        ScoringSource {
            mode: ScoringMode::Live,
            stats,
            threshold: baseline.threshold(),
        }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    fn get(&self, name: &str) -> Option<&ScoringStat> {
        self.stats.get(name)
    }
}

/// Score one day's record against the source.
///
/// Per-event score is `|mean − value| / std_dev × weight`, defined as zero
/// for a constant event (std dev zero). Events missing from the source are
/// skipped with a warning, never fatal. A day is Flagged iff its total
/// strictly exceeds the threshold.
pub fn score_day(record: &DailyRecord, source: &ScoringSource) -> AnomalyRecord {
    let mut per_event = BTreeMap::new();
    let mut total = 0.0;

    for (name, value) in &record.values {
        let Some(stat) = source.get(name) else {
            tracing::warn!(
                day = record.day,
                event = %name,
                "event missing from statistics source; skipping"
            );
            continue;
        };
        let score = if stat.std_dev > 0.0 {
            (stat.mean - value).abs() / stat.std_dev * f64::from(stat.weight)
        } else {
            0.0
        };
        total += score;
        per_event.insert(name.clone(), score);
    }

    let status = if total > source.threshold() {
        DayStatus::Flagged
    } else {
        DayStatus::Normal
    };

    AnomalyRecord {
        day: record.day,
        per_event,
        total,
        status,
    }
}

/// Score a whole run in day order.
pub fn score_run(records: &[DailyRecord], source: &ScoringSource) -> Vec<AnomalyRecord> {
    records.iter().map(|r| score_day(r, source)).collect()
}
