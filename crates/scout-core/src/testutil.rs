//! Test utilities: mock implementations of all core traits.
//!
//! Handwritten mocks for dependency injection in unit and integration tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::clock::Clock;
use crate::error::{AppError, FailureKind};
use crate::insight::CompanyInfo;
use crate::models::{JobDraft, JobRecord, SourceTag, Tier};
use crate::query::JobQuery;
use crate::reporter::{FallbackEvent, FallbackReporter};
use crate::traits::{CompanyDirectory, FetchRequest, Fetcher, JobSource, Prompt, TextGenerator};

/// A complete job record attributed to `origin`'s scrape tier.
pub fn sample_job(title: &str, company: &str, origin: &str) -> JobRecord {
    JobDraft {
        title: Some(title.to_string()),
        company: Some(company.to_string()),
        ..Default::default()
    }
    .finish(SourceTag::new(origin, Tier::Scrape), &JobQuery::new(title))
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns queued responses and records every request.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns `fail_status` as an HTTP error or a default page.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    fail_status: Option<u16>,
    requests: Arc<Mutex<Vec<FetchRequest>>>,
}

impl MockFetcher {
    pub fn new(body: &str) -> Self {
        Self::with_responses(vec![Ok(body.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            fail_status: None,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request fails with the given HTTP status.
    pub fn always_status(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::with_responses(Vec::new())
        }
    }

    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let mut responses = self.responses.lock().unwrap();
        if !responses.is_empty() {
            return responses.remove(0);
        }
        match self.fail_status {
            Some(status) => Err(AppError::HttpError {
                status,
                message: "mock failure".to_string(),
            }),
            None => Ok("<html><body>default</body></html>".to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// MockTextGenerator
// ---------------------------------------------------------------------------

/// Mock text generator with a queue of completions.
#[derive(Clone)]
pub struct MockTextGenerator {
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    prompts: Arc<Mutex<Vec<Prompt>>>,
}

impl MockTextGenerator {
    pub fn new(completion: &str) -> Self {
        Self::with_responses(vec![Ok(completion.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, prompt: &Prompt) -> Result<String, AppError> {
        self.prompts.lock().unwrap().push(prompt.clone());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Err(AppError::LlmError {
                message: "no scripted completion".to_string(),
                status_code: 500,
            })
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockJobSource
// ---------------------------------------------------------------------------

/// Mock job source; an exhausted queue answers with an empty list.
#[derive(Clone)]
pub struct MockJobSource {
    name: String,
    tier: Tier,
    responses: Arc<Mutex<Vec<Result<Vec<JobRecord>, AppError>>>>,
    queries: Arc<Mutex<Vec<JobQuery>>>,
    delay: Duration,
}

impl MockJobSource {
    pub fn new(name: &str, tier: Tier) -> Self {
        Self::with_responses(name, tier, Vec::new())
    }

    pub fn with_jobs(name: &str, tier: Tier, jobs: Vec<JobRecord>) -> Self {
        Self::with_responses(name, tier, vec![Ok(jobs)])
    }

    pub fn with_error(name: &str, tier: Tier, error: AppError) -> Self {
        Self::with_responses(name, tier, vec![Err(error)])
    }

    pub fn with_responses(
        name: &str,
        tier: Tier,
        responses: Vec<Result<Vec<JobRecord>, AppError>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            tier,
            responses: Arc::new(Mutex::new(responses)),
            queries: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<JobQuery> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobSource for MockJobSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        self.tier
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        self.queries.lock().unwrap().push(query.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(Vec::new())
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// MockCompanyDirectory
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockCompanyDirectory {
    name: String,
    responses: Arc<Mutex<Vec<Result<Option<CompanyInfo>, AppError>>>>,
    lookups: Arc<Mutex<Vec<String>>>,
}

impl MockCompanyDirectory {
    pub fn new(name: &str, response: Result<Option<CompanyInfo>, AppError>) -> Self {
        Self {
            name: name.to_string(),
            responses: Arc::new(Mutex::new(vec![response])),
            lookups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl CompanyDirectory for MockCompanyDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, company: &str) -> Result<Option<CompanyInfo>, AppError> {
        self.lookups.lock().unwrap().push(company.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(None)
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// ManualClock
// ---------------------------------------------------------------------------

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Starts at 2024-06-10 12:00:00 UTC.
    pub fn new() -> Self {
        Self::starting_at(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap())
    }

    pub fn starting_at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ---------------------------------------------------------------------------
// RecordingReporter
// ---------------------------------------------------------------------------

/// Owned copy of a [`FallbackEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedEvent {
    CacheHit {
        key: String,
    },
    TierAttempt {
        key: String,
        tier: String,
    },
    TierFailed {
        key: String,
        tier: String,
        reason: FailureKind,
    },
    Served {
        key: String,
        tier: String,
        records: usize,
    },
}

/// Reporter that records every event for later assertions.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Tags of every tier attempted, in order.
    pub fn attempts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::TierAttempt { tier, .. } => Some(tier),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<(String, FailureKind)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::TierFailed { tier, reason, .. } => Some((tier, reason)),
                _ => None,
            })
            .collect()
    }

    pub fn served(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RecordedEvent::Served { tier, .. } => Some(tier),
                _ => None,
            })
            .collect()
    }

    pub fn cache_hits(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, RecordedEvent::CacheHit { .. }))
            .count()
    }
}

impl FallbackReporter for RecordingReporter {
    fn report(&self, event: FallbackEvent<'_>) {
        let recorded = match event {
            FallbackEvent::CacheHit { key } => RecordedEvent::CacheHit {
                key: key.to_string(),
            },
            FallbackEvent::TierAttempt { key, tier } => RecordedEvent::TierAttempt {
                key: key.to_string(),
                tier: tier.to_string(),
            },
            FallbackEvent::TierFailed {
                key, tier, reason, ..
            } => RecordedEvent::TierFailed {
                key: key.to_string(),
                tier: tier.to_string(),
                reason,
            },
            FallbackEvent::Served { key, tier, records } => RecordedEvent::Served {
                key: key.to_string(),
                tier: tier.to_string(),
                records,
            },
        };
        self.events.lock().unwrap().push(recorded);
    }
}
