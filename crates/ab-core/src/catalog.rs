//! Event catalog: structural definitions of the monitored activity counters.
//!
//! The catalog is loaded once from an events file and is read-only
//! thereafter. The text encoding is count-prefixed and colon-delimited:
//!
//! ```text
//! 3
//! Logins:D:0::2
//! Time online:C:0:24:3
//! Emails sent:D:0::1
//! ```
//!
//! An empty min or max field means "unspecified", which is distinct from an
//! explicit zero bound. Required fields (kind, weight) are never defaulted;
//! a record that cannot be parsed is fatal to loading.

use ab_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Whether an event's values are real-valued or integer-valued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// Real-valued; generated values carry two decimal places.
    Continuous,
    /// Integer-valued.
    Discrete,
}

impl EventKind {
    /// Single-letter code used by the text encodings.
    pub fn code(self) -> &'static str {
        match self {
            EventKind::Continuous => "C",
            EventKind::Discrete => "D",
        }
    }

    /// Parse the single-letter code from the text encodings.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "C" => Some(EventKind::Continuous),
            "D" => Some(EventKind::Discrete),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Continuous => write!(f, "continuous"),
            EventKind::Discrete => write!(f, "discrete"),
        }
    }
}

/// One monitored event: kind, optional bounds, and alert weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    pub kind: EventKind,
    /// Lower bound if declared. `None` means unspecified, never zero.
    pub min: Option<f64>,
    /// Upper bound if declared. `None` means unspecified, never zero.
    pub max: Option<f64>,
    /// Positive alert weight.
    pub weight: u32,
}

/// Immutable set of event definitions, keyed by event name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventCatalog {
    events: BTreeMap<String, EventDefinition>,
}

impl EventCatalog {
    /// Build a catalog from already-validated definitions.
    pub fn from_definitions(defs: impl IntoIterator<Item = EventDefinition>) -> Self {
        EventCatalog {
            events: defs.into_iter().map(|d| (d.name.clone(), d)).collect(),
        }
    }

    /// Load and parse an events file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&path.display().to_string(), &text)
    }

    /// Parse the count-prefixed events encoding.
    ///
    /// `file_label` only feeds error messages.
    pub fn parse(file_label: &str, input: &str) -> Result<Self> {
        let mut lines = input.lines().enumerate();
        let declared = parse_count(file_label, lines.next())?;

        let mut events = BTreeMap::new();
        let mut found = 0usize;
        for (idx, line) in lines {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = parse_record(file_label, idx + 1, line)?;
            if events.contains_key(&record.name) {
                return Err(Error::MalformedRecord {
                    file: file_label.to_string(),
                    line: idx + 1,
                    reason: format!("duplicate event name {:?}", record.name),
                });
            }
            events.insert(record.name.clone(), record);
            found += 1;
        }

        if found != declared {
            return Err(Error::RecordCountMismatch {
                file: file_label.to_string(),
                declared,
                found,
            });
        }
        Ok(EventCatalog { events })
    }

    pub fn get(&self, name: &str) -> Option<&EventDefinition> {
        self.events.get(name)
    }

    /// Event names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EventDefinition)> {
        self.events.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub(crate) fn parse_count(file_label: &str, first: Option<(usize, &str)>) -> Result<usize> {
    let (idx, line) = first.ok_or_else(|| Error::MalformedRecord {
        file: file_label.to_string(),
        line: 1,
        reason: "empty file; expected a leading record count".to_string(),
    })?;
    line.trim().parse::<usize>().map_err(|_| Error::MalformedRecord {
        file: file_label.to_string(),
        line: idx + 1,
        reason: format!("invalid record count {:?}", line.trim()),
    })
}

fn parse_record(file_label: &str, line_no: usize, line: &str) -> Result<EventDefinition> {
    let malformed = |reason: String| Error::MalformedRecord {
        file: file_label.to_string(),
        line: line_no,
        reason,
    };

    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 5 {
        return Err(malformed(format!(
            "expected 5 colon-delimited fields, found {}",
            fields.len()
        )));
    }

    let name = fields[0].trim();
    if name.is_empty() {
        return Err(malformed("empty event name".to_string()));
    }

    let kind = EventKind::from_code(fields[1].trim())
        .ok_or_else(|| malformed(format!("event kind must be C or D, got {:?}", fields[1])))?;

    let min = parse_bound(fields[2]).map_err(|v| malformed(format!("invalid min {:?}", v)))?;
    let max = parse_bound(fields[3]).map_err(|v| malformed(format!("invalid max {:?}", v)))?;

    let weight: u32 = fields[4]
        .trim()
        .parse()
        .map_err(|_| malformed(format!("invalid weight {:?}", fields[4])))?;
    if weight == 0 {
        return Err(malformed("weight must be a positive integer".to_string()));
    }

    Ok(EventDefinition {
        name: name.to_string(),
        kind,
        min,
        max,
        weight,
    })
}

/// Empty field encodes "unspecified". An explicit value must be numeric.
fn parse_bound(field: &str) -> std::result::Result<Option<f64>, String> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(field.to_string()),
    }
}
