//! In-memory log capture backing `GET /api/logs`.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub category: String,
    pub message: String,
}

/// A bounded ring buffer of recent log entries, mutated by a tracing layer
/// and read by the `/api/logs` handler.
pub struct LogStore {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
}

impl LogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, level: impl Into<String>, category: impl Into<String>, message: impl Into<String>) {
        let mut entries = self.entries.lock().unwrap();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(LogEntry {
            timestamp: Utc::now(),
            level: level.into(),
            category: category.into(),
            message: message.into(),
        });
    }

    /// Returns entries matching the given filters, oldest first.
    pub fn query(
        &self,
        since: Option<DateTime<Utc>>,
        max_count: Option<usize>,
        level: Option<&str>,
        category: Option<&str>,
    ) -> Vec<LogEntry> {
        let entries = self.entries.lock().unwrap();
        let mut matched: Vec<LogEntry> = entries
            .iter()
            .filter(|e| since.is_none_or(|s| e.timestamp >= s))
            .filter(|e| level.is_none_or(|l| e.level.eq_ignore_ascii_case(l)))
            .filter(|e| category.is_none_or(|c| e.category == c))
            .cloned()
            .collect();
        if let Some(max) = max_count {
            let start = matched.len().saturating_sub(max);
            matched = matched.split_off(start);
        }
        matched
    }
}

/// Parses the `since=` query parameter grammar: ISO-8601 with fractional
/// seconds, Unix seconds as a decimal, or a relative `(\d+)([smhd])` offset
/// from now.
pub fn parse_since(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(secs) = raw.parse::<f64>() {
        let nanos = (secs.fract() * 1e9) as u32;
        return DateTime::from_timestamp(secs.trunc() as i64, nanos);
    }

    let re = Regex::new(r"^(\d+)([smhd])$").expect("static pattern");
    let caps = re.captures(raw)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit_secs = match caps.get(2)?.as_str() {
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => return None,
    };
    Some(Utc::now() - chrono::Duration::seconds(amount * unit_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso8601() {
        assert!(parse_since("2024-01-01T00:00:00Z").is_some());
    }

    #[test]
    fn parses_unix_seconds() {
        let parsed = parse_since("1700000000").unwrap();
        assert_eq!(parsed.timestamp(), 1700000000);
    }

    #[test]
    fn parses_relative_offsets() {
        assert!(parse_since("30s").is_some());
        assert!(parse_since("5m").is_some());
        assert!(parse_since("2h").is_some());
        assert!(parse_since("1d").is_some());
        assert!(parse_since("bogus").is_none());
    }

    #[test]
    fn query_filters_by_level_and_count() {
        let store = LogStore::new(10);
        store.push("info", "tts", "one");
        store.push("error", "stt", "two");
        store.push("info", "tts", "three");

        let errors = store.query(None, None, Some("error"), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "two");

        let last_one = store.query(None, Some(1), None, None);
        assert_eq!(last_one.len(), 1);
        assert_eq!(last_one[0].message, "three");
    }
}
