//! Per-domain request pacing for scrape targets and rate-limited APIs.
//!
//! Wraps any [`Fetcher`] with two independent rules:
//!
//! * a pause of `delay + uniform(jitter)` before every request, which keeps
//!   scrapers under the target site's radar;
//! * a minimum interval between consecutive requests to the same domain,
//!   which is what authenticated APIs with strict quotas need.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scout_core::throttle::{RateLimitedFetcher, ThrottleConfig};
//!
//! # #[derive(Clone)] struct MyFetcher;
//! # impl scout_core::Fetcher for MyFetcher {
//! #     async fn fetch(&self, _: &scout_core::FetchRequest) -> Result<String, scout_core::AppError> { todo!() }
//! # }
//! let scrape = RateLimitedFetcher::new(MyFetcher, ThrottleConfig::scrape(Duration::from_secs(1)));
//! let api = RateLimitedFetcher::new(MyFetcher, ThrottleConfig::api(Duration::from_secs(1)));
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use url::Url;

use crate::error::AppError;
use crate::traits::{FetchRequest, Fetcher};

/// Pacing rules for a [`RateLimitedFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleConfig {
    /// Fixed pause before every request.
    pub delay: Duration,

    /// Random extra pause, uniform in `[jitter_min, jitter_max)`.
    pub jitter_min: Duration,
    pub jitter_max: Duration,

    /// Minimum time between two requests to the same domain.
    pub min_interval: Duration,
}

impl ThrottleConfig {
    /// Fixed delay, no jitter, no interval.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            jitter_min: Duration::ZERO,
            jitter_max: Duration::ZERO,
            min_interval: Duration::ZERO,
        }
    }

    /// Scraping profile: `base + uniform(0.5s, 1.5s)` before every request.
    pub fn scrape(base: Duration) -> Self {
        Self::new(base).with_jitter(Duration::from_millis(500), Duration::from_millis(1500))
    }

    /// API profile: no per-call pause, but at least `min_interval` between calls.
    pub fn api(min_interval: Duration) -> Self {
        Self::new(Duration::ZERO).with_min_interval(min_interval)
    }

    /// No pacing at all.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn with_jitter(mut self, min: Duration, max: Duration) -> Self {
        self.jitter_min = min.min(max);
        self.jitter_max = max.max(min);
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    /// Pause taken before a single request (delay + random jitter).
    fn pre_request_pause(&self) -> Duration {
        let lo = self.jitter_min.as_millis() as u64;
        let hi = self.jitter_max.as_millis() as u64;
        self.delay + Duration::from_millis(rand_between_ms(lo, hi))
    }
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self::scrape(Duration::from_secs(1))
    }
}

/// A [`Fetcher`] wrapper that paces requests per domain.
///
/// Concurrent callers to the same domain reserve consecutive slots, so the
/// minimum interval holds even when requests are fanned out.
#[derive(Clone)]
pub struct RateLimitedFetcher<F> {
    inner: F,
    config: ThrottleConfig,
    /// Time of the most recent (or next reserved) request per domain.
    last_request: Arc<Mutex<HashMap<String, Instant>>>,
}

impl<F: Fetcher> RateLimitedFetcher<F> {
    pub fn new(inner: F, config: ThrottleConfig) -> Self {
        Self {
            inner,
            config,
            last_request: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Extract the domain key from a URL (scheme://host:port).
    fn domain_key(url_str: &str) -> Option<String> {
        let url = Url::parse(url_str).ok()?;
        let host = url.host_str()?;
        let port = url
            .port_or_known_default()
            .map(|p| format!(":{p}"))
            .unwrap_or_default();
        Some(format!("{}://{}{}", url.scheme(), host, port))
    }

    /// When the last request to this domain was sent (or is scheduled).
    pub async fn last_request(&self, url: &str) -> Option<Instant> {
        let domain = Self::domain_key(url)?;
        self.last_request.lock().await.get(&domain).copied()
    }

    async fn wait_for_slot(&self, domain: &str) {
        let mut map = self.last_request.lock().await;
        let now = Instant::now();

        let interval_wait = map
            .get(domain)
            .map(|&last| {
                let since = now.saturating_duration_since(last);
                // A reservation in the future also counts as "not yet elapsed".
                let ahead = last.saturating_duration_since(now);
                (self.config.min_interval + ahead).saturating_sub(since)
            })
            .unwrap_or(Duration::ZERO);
        let wait = self.config.pre_request_pause().max(interval_wait);

        map.insert(domain.to_string(), now + wait);
        // Release the lock before sleeping so other domains are not blocked.
        drop(map);

        if !wait.is_zero() {
            tracing::debug!(
                domain = %domain,
                sleep_ms = %wait.as_millis(),
                "Throttling request"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

impl<F: Fetcher> Fetcher for RateLimitedFetcher<F> {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, AppError> {
        if let Some(domain) = Self::domain_key(&request.url) {
            self.wait_for_slot(&domain).await;
        }
        self.inner.fetch(request).await
    }
}

// Jitter from an xorshift seeded by the clock; keeps `rand` out of the tree.
fn rand_between_ms(lo: u64, hi: u64) -> u64 {
    if hi <= lo {
        return lo;
    }
    let mut x = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    lo + x % (hi - lo)
}
