//! Text report adapters for the engine's records.
//!
//! The engine is agnostic to encodings; these writers/readers carry its
//! records to and from fixed-width text. Columns are separated by two or
//! more spaces so multi-word event names survive the round trip, and
//! unspecified bounds render as `-`, never `0`, so they stay distinct from
//! an explicit zero bound after reparsing.

use crate::baseline::{Baseline, BaselineEntry};
use crate::catalog::EventKind;
use crate::generate::DailyRecord;
use crate::score::{AnomalyRecord, DayStatus, ScoringMode};
use crate::stats::StatisticsTable;
use ab_common::{Error, Result, RunId};
use std::fmt::Write as _;

/// File name for one run's artifact of the given kind.
pub fn artifact_file_name(kind: &str, run: &RunId) -> String {
    format!("{kind}-{run}.txt")
}

/// Render the merged baseline as a fixed-width table.
pub fn render_baseline_table(baseline: &Baseline) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "# activity baseline table (generated {})",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    );
    let _ = writeln!(out, "# alert threshold: {:.2}", baseline.threshold());
    let _ = writeln!(
        out,
        "{:<18}  {:>8}  {:>8}  {:>8}  {:>8}  {:>6}  {:>4}",
        "Event Name", "Mean", "Std Dev", "Min", "Max", "Weight", "Kind"
    );
    for (name, entry) in baseline.iter() {
        let _ = writeln!(
            out,
            "{:<18}  {:>8.2}  {:>8.2}  {:>8}  {:>8}  {:>6}  {:>4}",
            name,
            entry.mean,
            entry.std_dev,
            render_bound(entry.min),
            render_bound(entry.max),
            entry.weight,
            entry.kind.code()
        );
    }
    out
}

fn render_bound(bound: Option<f64>) -> String {
    match bound {
        Some(v) => format!("{v:.2}"),
        None => "-".to_string(),
    }
}

/// Reparse a baseline table written by [`render_baseline_table`].
///
/// The threshold is rederived from the parsed weights.
pub fn parse_baseline_table(file_label: &str, input: &str) -> Result<Baseline> {
    let mut entries = Vec::new();
    let mut header_seen = false;

    for (idx, line) in input.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if !header_seen {
            header_seen = true;
            continue;
        }

        let malformed = |reason: String| Error::MalformedRecord {
            file: file_label.to_string(),
            line: line_no,
            reason,
        };

        let columns = split_columns(trimmed);
        if columns.len() != 7 {
            return Err(malformed(format!(
                "expected 7 columns, found {}",
                columns.len()
            )));
        }

        let mean = parse_number(columns[1]).map_err(|v| malformed(format!("invalid mean {v:?}")))?;
        let std_dev =
            parse_number(columns[2]).map_err(|v| malformed(format!("invalid std dev {v:?}")))?;
        let min = parse_bound(columns[3]).map_err(|v| malformed(format!("invalid min {v:?}")))?;
        let max = parse_bound(columns[4]).map_err(|v| malformed(format!("invalid max {v:?}")))?;
        let weight: u32 = columns[5]
            .parse()
            .map_err(|_| malformed(format!("invalid weight {:?}", columns[5])))?;
        let kind = EventKind::from_code(columns[6])
            .ok_or_else(|| malformed(format!("invalid kind {:?}", columns[6])))?;

        entries.push((
            columns[0].to_string(),
            BaselineEntry {
                mean,
                std_dev,
                min,
                max,
                weight,
                kind,
            },
        ));
    }

    Ok(Baseline::from_entries(entries))
}

/// Split a record line on runs of two or more spaces.
fn split_columns(line: &str) -> Vec<&str> {
    let mut columns = Vec::new();
    let mut rest = line.trim();
    while !rest.is_empty() {
        match rest.find("  ") {
            Some(cut) => {
                columns.push(&rest[..cut]);
                rest = rest[cut..].trim_start();
            }
            None => {
                columns.push(rest);
                break;
            }
        }
    }
    columns
}

fn parse_number(field: &str) -> std::result::Result<f64, String> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(field.to_string()),
    }
}

fn parse_bound(field: &str) -> std::result::Result<Option<f64>, String> {
    if field == "-" {
        return Ok(None);
    }
    parse_number(field).map(Some)
}

/// Render a run's daily records as the day-block activity log.
pub fn render_activity_log(records: &[DailyRecord]) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "Day {} Activity:", record.day);
        for (name, value) in &record.values {
            let _ = writeln!(out, "{name}: {value}");
        }
        out.push('\n');
    }
    out
}

/// Render recomputed statistics in the analysis-results shape.
pub fn render_statistics_summary(stats: &StatisticsTable) -> String {
    let mut out = String::from("Event Analysis Results:\n");
    for (name, stat) in stats.iter() {
        let _ = writeln!(
            out,
            "{name}: Mean = {:.2}, Std Dev = {:.2}",
            stat.mean, stat.std_dev
        );
    }
    out
}

/// Render the per-day anomaly report, with per-event contributions for
/// flagged days.
pub fn render_anomaly_report(
    records: &[AnomalyRecord],
    threshold: f64,
    mode: ScoringMode,
) -> String {
    let flagged = records
        .iter()
        .filter(|r| r.status == DayStatus::Flagged)
        .count();

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Anomaly report: {} days scored, {} flagged, threshold {:.2}, mode {}",
        records.len(),
        flagged,
        threshold,
        mode
    );
    let _ = writeln!(out, "{:<6}  {:>10}  {:>8}", "Day", "Total", "Status");
    for record in records {
        let _ = writeln!(
            out,
            "{:<6}  {:>10.2}  {:>8}",
            record.day, record.total, record.status
        );
        if record.status == DayStatus::Flagged {
            for (name, score) in &record.per_event {
                let _ = writeln!(out, "    {name}: {score:.2}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample_baseline() -> Baseline {
        Baseline::from_entries([
            (
                "Emails sent".to_string(),
                BaselineEntry {
                    mean: 12.5,
                    std_dev: 3.0,
                    min: Some(0.0),
                    max: None,
                    weight: 1,
                    kind: EventKind::Discrete,
                },
            ),
            (
                "Time online".to_string(),
                BaselineEntry {
                    mean: 20.5,
                    std_dev: 3.0,
                    min: Some(0.0),
                    max: Some(24.0),
                    weight: 2,
                    kind: EventKind::Continuous,
                },
            ),
        ])
    }

    #[test]
    fn baseline_table_round_trips() {
        let baseline = sample_baseline();
        let rendered = render_baseline_table(&baseline);
        let reparsed = parse_baseline_table("baseline.txt", &rendered).unwrap();
        assert_eq!(reparsed, baseline);
    }

    #[test]
    fn unspecified_bound_survives_round_trip() {
        let rendered = render_baseline_table(&sample_baseline());
        let reparsed = parse_baseline_table("baseline.txt", &rendered).unwrap();
        let emails = reparsed.get("Emails sent").unwrap();
        assert_eq!(emails.max, None);
        assert_eq!(emails.min, Some(0.0));
    }

    #[test]
    fn multi_word_names_survive_round_trip() {
        let rendered = render_baseline_table(&sample_baseline());
        let reparsed = parse_baseline_table("baseline.txt", &rendered).unwrap();
        assert!(reparsed.get("Time online").is_some());
    }

    #[test]
    fn truncated_table_row_is_malformed() {
        let err = parse_baseline_table(
            "baseline.txt",
            "Event Name  Mean\nLogins  4.00  1.50\n",
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn activity_log_uses_day_blocks() {
        let records = vec![DailyRecord {
            day: 1,
            values: BTreeMap::from([
                ("Logins".to_string(), 4.0),
                ("Time online".to_string(), 20.53),
            ]),
        }];
        let log = render_activity_log(&records);
        assert!(log.starts_with("Day 1 Activity:\n"));
        assert!(log.contains("Logins: 4\n"));
        assert!(log.contains("Time online: 20.53\n"));
    }

    #[test]
    fn anomaly_report_lists_contributions_for_flagged_days_only() {
        let records = vec![
            AnomalyRecord {
                day: 1,
                per_event: BTreeMap::from([("A".to_string(), 0.5)]),
                total: 0.5,
                status: DayStatus::Normal,
            },
            AnomalyRecord {
                day: 2,
                per_event: BTreeMap::from([("A".to_string(), 7.25)]),
                total: 7.25,
                status: DayStatus::Flagged,
            },
        ];
        let report = render_anomaly_report(&records, 2.0, ScoringMode::Configured);
        assert!(report.contains("2 days scored, 1 flagged"));
        assert!(report.contains("FLAGGED"));
        assert!(report.contains("    A: 7.25"));
        assert!(!report.contains("    A: 0.50"));
    }

    #[test]
    fn artifact_names_carry_the_run_id() {
        let run = RunId::parse("ab-20260115-143022-a7xq").unwrap();
        assert_eq!(
            artifact_file_name("anomaly", &run),
            "anomaly-ab-20260115-143022-a7xq.txt"
        );
    }
}
