//! Statistics table: per-event mean and standard deviation.
//!
//! Loaded once from a statistics file and read-only thereafter. Encoding:
//!
//! ```text
//! 2
//! Logins:4:1.5
//! Time online:20.5:3
//! ```
//!
//! Mean and std dev are required numeric fields and are never defaulted.

use crate::catalog::parse_count;
use ab_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Configured (or recomputed) first and second moments for one event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventStatistic {
    pub mean: f64,
    /// Non-negative. Zero declares the event constant.
    pub std_dev: f64,
}

/// Immutable per-event statistics, keyed by event name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsTable {
    stats: BTreeMap<String, EventStatistic>,
}

impl StatisticsTable {
    /// Build a table from already-validated statistics.
    pub fn from_statistics(stats: impl IntoIterator<Item = (String, EventStatistic)>) -> Self {
        StatisticsTable {
            stats: stats.into_iter().collect(),
        }
    }

    /// Load and parse a statistics file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Parse the count-prefixed statistics encoding.
    pub fn parse(file_label: &str, input: &str) -> Result<Self> {
        let mut lines = input.lines().enumerate();
        let declared = parse_count(file_label, lines.next())?;

        let mut stats = BTreeMap::new();
        let mut found = 0usize;
        for (idx, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (name, stat) = parse_record(file_label, idx + 1, line)?;
            if stats.contains_key(&name) {
                return Err(Error::MalformedRecord {
                    file: file_label.to_string(),
                    line: idx + 1,
                    reason: format!("duplicate event name {:?}", name),
                });
            }
            stats.insert(name, stat);
            found += 1;
        }

        if found != declared {
            return Err(Error::RecordCountMismatch {
                file: file_label.to_string(),
                declared,
                found,
            });
        }
        Ok(StatisticsTable { stats })
    }

    pub fn get(&self, name: &str) -> Option<&EventStatistic> {
        self.stats.get(name)
    }

    /// Event names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stats.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventStatistic)> {
        self.stats.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}

fn parse_record(
    file_label: &str,
    line_no: usize,
    line: &str,
) -> Result<(String, EventStatistic)> {
    let malformed = |reason: String| Error::MalformedRecord {
        file: file_label.to_string(),
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 3 {
        return Err(malformed(format!(
            "expected 3 colon-delimited fields, found {}",
            fields.len()
        )));
    }

    let name = fields[0].trim();
    if name.is_empty() {
        return Err(malformed("empty event name".to_string()));
    }

    let mean = parse_required(fields[1]).map_err(|v| malformed(format!("invalid mean {:?}", v)))?;
    let std_dev =
        parse_required(fields[2]).map_err(|v| malformed(format!("invalid std dev {:?}", v)))?;
    if std_dev < 0.0 {
        return Err(malformed(format!("std dev must be non-negative, got {std_dev}")));
    }

    Ok((name.to_string(), EventStatistic { mean, std_dev }))
}

fn parse_required(field: &str) -> std::result::Result<f64, String> {
    match field.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(field.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATS: &str = "\
2
Logins:4:1.5
Time online:20.5:3
";

    #[test]
    fn parses_statistics_file() {
        let table = StatisticsTable::parse("stats.txt", STATS).unwrap();
        assert_eq!(table.len(), 2);

        let logins = table.get("Logins").unwrap();
        assert_eq!(logins.mean, 4.0);
        assert_eq!(logins.std_dev, 1.5);
    }

    #[test]
    fn missing_field_is_malformed() {
        let err = StatisticsTable::parse("stats.txt", "1\nLogins:4\n").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn non_numeric_mean_is_malformed() {
        let err = StatisticsTable::parse("stats.txt", "1\nLogins:four:1.5\n").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn negative_std_dev_is_malformed() {
        let err = StatisticsTable::parse("stats.txt", "1\nLogins:4:-1\n").unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { .. }));
    }

    #[test]
    fn zero_std_dev_is_allowed() {
        let table = StatisticsTable::parse("stats.txt", "1\nLogins:4:0\n").unwrap();
        assert_eq!(table.get("Logins").unwrap().std_dev, 0.0);
    }

    #[test]
    fn overdeclared_count_is_mismatch() {
        let err = StatisticsTable::parse("stats.txt", "5\nLogins:4:1.5\n").unwrap_err();
        assert!(matches!(
            err,
            Error::RecordCountMismatch {
                declared: 5,
                found: 1,
                ..
            }
        ));
    }
}
