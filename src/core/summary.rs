//! Session summary: totals and elapsed time for a finished session.

use crate::core::histogram::Histogram;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Wall-clock duration split into hours, minutes and seconds.
///
/// Serialized as `[hours, minutes, seconds]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u64; 3]", into = "[u64; 3]")]
pub struct ElapsedTime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl ElapsedTime {
    pub fn from_secs(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }

    /// Elapsed time between two instants. A negative span counts as zero.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let secs = (end - start).num_seconds().max(0) as u64;
        Self::from_secs(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

impl From<[u64; 3]> for ElapsedTime {
    fn from([hours, minutes, seconds]: [u64; 3]) -> Self {
        Self {
            hours,
            minutes,
            seconds,
        }
    }
}

impl From<ElapsedTime> for [u64; 3] {
    fn from(elapsed: ElapsedTime) -> Self {
        [elapsed.hours, elapsed.minutes, elapsed.seconds]
    }
}

impl std::fmt::Display for ElapsedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds
        )
    }
}

/// Immutable summary computed once when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// Sum of all press counts
    pub total_count: u64,
    /// Number of distinct keys pressed
    pub distinct_keys: usize,
    pub elapsed: ElapsedTime,
}

impl SessionSummary {
    pub fn compute(histogram: &Histogram, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ended_at,
            total_count: histogram.total(),
            distinct_keys: histogram.len(),
            elapsed: ElapsedTime::between(started_at, ended_at),
        }
    }
}

/// Format the end-of-session statistics table.
pub fn format_report(summary: &SessionSummary, histogram: &Histogram) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "TOTAL KEYS PRESSED: {}", summary.total_count);
    let _ = writeln!(out, "DISTINCT KEYS: {}", summary.distinct_keys);
    let _ = writeln!(out, "DURATION: {}", summary.elapsed);
    let _ = writeln!(out, "--------------");
    let _ = writeln!(out, "COUNT PER KEY (DESCENDING ORDER):");
    for (key, count) in histogram.ranked() {
        let plural = if count == 1 { "time" } else { "times" };
        let _ = writeln!(out, "{key} -> Pressed {count} {plural}.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_elapsed_decomposition() {
        let elapsed = ElapsedTime::from_secs(3 * 3600 + 25 * 60 + 7);
        assert_eq!(elapsed.hours, 3);
        assert_eq!(elapsed.minutes, 25);
        assert_eq!(elapsed.seconds, 7);
        assert_eq!(elapsed.as_secs(), 3 * 3600 + 25 * 60 + 7);
        assert_eq!(elapsed.to_string(), "03:25:07");
    }

    #[test]
    fn test_elapsed_serializes_as_triple() {
        let json = serde_json::to_string(&ElapsedTime::from_secs(3661)).unwrap();
        assert_eq!(json, "[1,1,1]");
        let back: ElapsedTime = serde_json::from_str("[0,2,30]").unwrap();
        assert_eq!(back.as_secs(), 150);
    }

    #[test]
    fn test_negative_span_is_zero() {
        let now = Utc::now();
        let elapsed = ElapsedTime::between(now, now - Duration::seconds(30));
        assert_eq!(elapsed.as_secs(), 0);
    }

    #[test]
    fn test_summary_totals() {
        let histogram: Histogram = [("a", 3), ("b", 7), ("c", 5)].into_iter().collect();
        let start = Utc::now();
        let summary = SessionSummary::compute(&histogram, start, start + Duration::seconds(95));

        assert_eq!(summary.total_count, 15);
        assert_eq!(summary.distinct_keys, 3);
        assert_eq!(summary.elapsed, ElapsedTime::from_secs(95));
    }

    #[test]
    fn test_report_lists_keys_descending() {
        let histogram: Histogram = [("a", 1), ("b", 7)].into_iter().collect();
        let start = Utc::now();
        let summary = SessionSummary::compute(&histogram, start, start);
        let report = format_report(&summary, &histogram);

        assert!(report.contains("TOTAL KEYS PRESSED: 8"));
        let b = report.find("b -> Pressed 7 times.").unwrap();
        let a = report.find("a -> Pressed 1 time.").unwrap();
        assert!(b < a);
    }
}
