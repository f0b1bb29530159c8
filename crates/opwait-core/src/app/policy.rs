//! Wait policy: decides poll pacing and how much not-found to tolerate.

use std::time::Duration;

use crate::ports::operation_client::{POLL_INTERVAL_METADATA_KEY, ResponseMetadata};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Fresh operations are sometimes not on every read replica yet, so the
/// first few not-found replies are ignored.
pub const DEFAULT_MAX_NOT_FOUND_RETRIES: u32 = 3;

/// Configuration of one wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Base delay between polls, used when the server sends no hint.
    pub poll_interval: Duration,

    /// Not-found replies absorbed (per wait) before giving up.
    pub max_not_found_retries: u32,
}

impl WaitPolicy {
    /// 1 second between polls, 3 not-found retries.
    pub fn default_v1() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_not_found_retries: DEFAULT_MAX_NOT_FOUND_RETRIES,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_not_found_retries(mut self, retries: u32) -> Self {
        self.max_not_found_retries = retries;
        self
    }

    /// Interval to sleep before the next poll.
    ///
    /// A parseable `x-operation-poll-interval` header (integer seconds)
    /// overrides the base interval. Zero or negative hints resolve to
    /// `Duration::ZERO`, meaning "poll again right away".
    pub fn next_interval(&self, metadata: &ResponseMetadata) -> Duration {
        match poll_interval_hint(metadata) {
            Some(secs) if secs > 0 => Duration::from_secs(secs as u64),
            Some(_) => Duration::ZERO,
            None => self.poll_interval,
        }
    }
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self::default_v1()
    }
}

/// Server-suggested interval in seconds, if the header is present and an
/// integer. Only the first value counts.
pub fn poll_interval_hint(metadata: &ResponseMetadata) -> Option<i64> {
    metadata
        .first(POLL_INTERVAL_METADATA_KEY)
        .and_then(|v| v.trim().parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn hinted(value: &str) -> ResponseMetadata {
        ResponseMetadata::new().with(POLL_INTERVAL_METADATA_KEY, value)
    }

    #[test]
    fn default_policy_has_reasonable_values() {
        let policy = WaitPolicy::default();
        assert_eq!(policy.poll_interval, Duration::from_secs(1));
        assert_eq!(policy.max_not_found_retries, 3);
        assert_eq!(policy, WaitPolicy::default_v1());
    }

    #[test]
    fn no_hint_uses_base_interval() {
        let policy = WaitPolicy::default().with_poll_interval(Duration::from_millis(250));
        assert_eq!(
            policy.next_interval(&ResponseMetadata::new()),
            Duration::from_millis(250)
        );
    }

    #[rstest]
    #[case("5", Duration::from_secs(5))]
    #[case(" 12 ", Duration::from_secs(12))]
    #[case("0", Duration::ZERO)]
    #[case("-3", Duration::ZERO)]
    #[case("1.5", Duration::from_secs(1))]
    #[case("soon", Duration::from_secs(1))]
    #[case("", Duration::from_secs(1))]
    fn header_hint_overrides_base(#[case] value: &str, #[case] expected: Duration) {
        let policy = WaitPolicy::default();
        assert_eq!(policy.next_interval(&hinted(value)), expected);
    }

    #[test]
    fn only_first_header_value_counts() {
        let md = hinted("x").with(POLL_INTERVAL_METADATA_KEY, "9");
        assert_eq!(poll_interval_hint(&md), None);
    }
}
