//! Time-related utilities with clock abstraction for testability.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};

/// Clock trait for dependency injection and testing
pub trait Clock: Send + Sync {
    /// Current wall-clock instant (UTC, sub-second precision)
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation (uses actual system time)
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fixed clock implementation for testing (returns a fixed time)
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    fixed_time: DateTime<Utc>,
}

impl FixedClock {
    /// Create a new fixed clock with the given instant
    pub fn new(fixed_time: DateTime<Utc>) -> Self {
        Self { fixed_time }
    }

    /// Create a new fixed clock from a Unix timestamp in milliseconds.
    ///
    /// Returns `None` when the value is out of chrono's representable range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        Utc.timestamp_millis_opt(millis).single().map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.fixed_time
    }
}

/// Current Unix timestamp in seconds, used as a default display name
pub fn unix_seconds() -> i64 {
    Utc::now().timestamp()
}

/// Format an instant as RFC 3339 in UTC, keeping microsecond precision
pub fn to_rfc3339_micros(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Format an instant for terminal display in the local time zone
pub fn to_local_display(timestamp: &DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S%.3f")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_returns_increasing_timestamps() {
        // テスト項目: SystemClock が呼び出すたびに増加する時刻を返す
        // given (前提条件):
        let clock = SystemClock;

        // when (操作):
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let second = clock.now();

        // then (期待する結果):
        assert!(second >= first);
    }

    #[test]
    fn test_fixed_clock_returns_consistent_timestamp() {
        // テスト項目: FixedClock が複数回呼び出しても同じ時刻を返す
        // given (前提条件):
        let clock = FixedClock::from_millis(1_672_498_800_123).unwrap();

        // when (操作):
        let first = clock.now();
        let second = clock.now();

        // then (期待する結果):
        assert_eq!(first, second);
        assert_eq!(first.timestamp_millis(), 1_672_498_800_123);
    }

    #[test]
    fn test_to_rfc3339_micros_keeps_sub_second_precision() {
        // テスト項目: RFC 3339 形式への変換でサブ秒精度が保持される
        // given (前提条件):
        let timestamp = Utc.timestamp_opt(1_672_531_200, 123_456_000).unwrap();

        // when (操作):
        let result = to_rfc3339_micros(&timestamp);

        // then (期待する結果):
        assert_eq!(result, "2023-01-01T00:00:00.123456Z");
    }

    #[test]
    fn test_to_local_display_has_millisecond_suffix() {
        // テスト項目: 表示用フォーマットがミリ秒まで含む
        // given (前提条件):
        let timestamp = Utc.timestamp_opt(1_672_531_200, 5_000_000).unwrap();

        // when (操作):
        let result = to_local_display(&timestamp);

        // then (期待する結果):
        assert!(result.ends_with(".005"));
    }

    #[test]
    fn test_unix_seconds_returns_positive_value() {
        // テスト項目: unix_seconds が正の値を返す
        // when (操作):
        let seconds = unix_seconds();

        // then (期待する結果):
        assert!(seconds > 0);
    }
}
