use hyper::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Used when a 429 arrives without a usable `x-rate-limit-reset`.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    /// Unix seconds at which the window resets.
    pub reset: Option<u64>,
}

impl RateLimitInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        fn parse<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        }

        Self {
            limit: parse(headers, "x-rate-limit-limit"),
            remaining: parse(headers, "x-rate-limit-remaining"),
            reset: parse(headers, "x-rate-limit-reset"),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    pub fn time_until_reset(&self, now: SystemTime) -> Option<Duration> {
        let reset = UNIX_EPOCH + Duration::from_secs(self.reset?);
        reset.duration_since(now).ok()
    }

    /// How long to block before retrying a rate limited call. A reset instant already in
    /// the past still waits one second so we don't hammer the endpoint.
    pub fn wait_duration(&self, now: SystemTime) -> Duration {
        match self.reset {
            Some(_) => self
                .time_until_reset(now)
                .map_or(Duration::from_secs(1), |d| d + Duration::from_secs(1)),
            None => DEFAULT_WAIT,
        }
    }
}
