//! Run identity for report artifacts.
//!
//! Each CLI invocation mints one `RunId` and threads it through every report
//! writer, so artifacts from successive simulation rounds never collide. The
//! engine itself is stateless across runs; the id lives entirely with the
//! orchestrating caller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Run ID for naming one simulation round's artifacts.
///
/// Format: `ab-YYYYMMDD-HHMMSS-XXXX`
/// Example: `ab-20260115-143022-a7xq`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    /// Generate a new run ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let suffix = generate_base32_suffix();
        RunId(format!(
            "ab-{}-{}-{}",
            now.format("%Y%m%d"),
            now.format("%H%M%S"),
            suffix
        ))
    }

    /// Parse an existing run ID string.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != 23 {
            return None;
        }
        let bytes = s.as_bytes();
        if bytes.first() != Some(&b'a')
            || bytes.get(1) != Some(&b'b')
            || bytes.get(2) != Some(&b'-')
            || bytes.get(11) != Some(&b'-')
            || bytes.get(18) != Some(&b'-')
        {
            return None;
        }
        let date = &s[3..11];
        let time = &s[12..18];
        let suffix = &s[19..23];
        if !date.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !time.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        if !suffix.chars().all(|c| matches!(c, 'a'..='z' | '2'..='7')) {
            return None;
        }
        Some(RunId(s.to_string()))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn generate_base32_suffix() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    let mut value = ((bytes[0] as u32) << 16) | ((bytes[1] as u32) << 8) | (bytes[2] as u32);
    value &= 0x000F_FFFF;
    let alphabet = b"abcdefghijklmnopqrstuvwxyz234567";
    let mut out = String::with_capacity(4);
    for shift in [15_u32, 10, 5, 0] {
        let idx = ((value >> shift) & 0x1F) as usize;
        out.push(alphabet[idx] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_format() {
        let rid = RunId::new();
        assert!(rid.0.starts_with("ab-"));
        assert_eq!(rid.0.len(), 23);
    }

    #[test]
    fn test_run_id_round_trips_through_parse() {
        let rid = RunId::new();
        assert_eq!(RunId::parse(&rid.0), Some(rid));
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(RunId::parse(""), None);
        assert_eq!(RunId::parse("xy-20260115-143022-a7xq"), None);
        assert_eq!(RunId::parse("ab-2026x115-143022-a7xq"), None);
        assert_eq!(RunId::parse("ab-20260115-143022-A7XQ"), None);
        assert_eq!(RunId::parse("ab-20260115-143022-a7xq9"), None);
    }

    #[test]
    fn test_parse_accepts_well_formed() {
        assert!(RunId::parse("ab-20260115-143022-a7xq").is_some());
    }
}
