use std::sync::{Arc, Mutex};

use scout_client::{GlassdoorSource, IndeedSource, LinkedInSource, TalentSource};
use scout_core::error::AppError;
use scout_core::orchestrator::FallbackOrchestrator;
use scout_core::synthetic::SyntheticGenerator;
use scout_core::testutil::{MockTextGenerator, RecordingReporter};
use scout_core::throttle::{RateLimitedFetcher, ThrottleConfig};
use scout_core::traits::{FetchRequest, Fetcher, JobSource, TextGenerator};

pub const INDEED_PAGE: &str = r#"<html><body>
  <div class="job_seen_beacon">
    <h2 class="jobTitle"><a href="/rc/clk?jk=r1"><span title="Rust Backend Engineer">Rust Backend Engineer</span></a></h2>
    <span class="companyName">Ferrous Systems</span>
    <div class="companyLocation">Berlin</div>
    <div class="job-snippet">Rust, PostgreSQL and Docker in production.</div>
    <span class="date">Just posted</span>
  </div>
  <div class="job_seen_beacon">
    <h2 class="jobTitle"><span title="Embedded Rust Developer">Embedded Rust Developer</span></h2>
    <span class="companyName">Oxide</span>
  </div>
</body></html>"#;

pub const LINKEDIN_POSTINGS: &str = r#"{"elements": [
  {"jobPostingId": 77, "jobPostingInfo": {"jobTitle": "Rust Platform Engineer",
   "description": {"text": "Kubernetes operators in Rust"}}, "companyDetails": {"companyName": "Initech"}}
]}"#;

/// Answers by URL fragment; anything unrouted gets a 503.
#[derive(Clone, Default)]
pub struct RoutedFetcher {
    routes: Vec<(String, Result<String, u16>)>,
    hits: Arc<Mutex<Vec<String>>>,
}

impl RoutedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, fragment: &str, body: &str) -> Self {
        self.routes.push((fragment.to_string(), Ok(body.to_string())));
        self
    }

    pub fn fail(mut self, fragment: &str, status: u16) -> Self {
        self.routes.push((fragment.to_string(), Err(status)));
        self
    }

    /// URLs requested so far.
    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }
}

impl Fetcher for RoutedFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<String, AppError> {
        self.hits.lock().unwrap().push(request.url.clone());
        let answer = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or(Err(503));
        match answer {
            Ok(body) => Ok(body),
            Err(429) => Err(AppError::RateLimitExceeded),
            Err(status) => Err(AppError::HttpError {
                status,
                message: "Service Unavailable".to_string(),
            }),
        }
    }
}

/// Credentials handed to the API adapters.
#[derive(Default)]
pub struct Credentials {
    pub linkedin: Option<String>,
    pub talent_key: Option<String>,
    pub talent_project: Option<String>,
}

/// The production chain order over `fetcher`, without pacing.
pub fn sources(fetcher: &RoutedFetcher, creds: Credentials) -> Vec<Arc<dyn JobSource>> {
    let http = RateLimitedFetcher::new(fetcher.clone(), ThrottleConfig::disabled());
    let mut sources: Vec<Arc<dyn JobSource>> = Vec::new();
    sources.push(Arc::new(LinkedInSource::new(http.clone(), creds.linkedin)));
    sources.push(Arc::new(TalentSource::new(
        http.clone(),
        creds.talent_key,
        creds.talent_project,
    )));
    sources.push(Arc::new(IndeedSource::new(http.clone())));
    sources.push(Arc::new(GlassdoorSource::new(http)));
    sources
}

pub fn orchestrator(
    sources: Vec<Arc<dyn JobSource>>,
    generator: Option<MockTextGenerator>,
) -> (FallbackOrchestrator, RecordingReporter) {
    let reporter = RecordingReporter::new();
    let synthetic =
        SyntheticGenerator::new(generator.map(|g| Arc::new(g) as Arc<dyn TextGenerator>));
    let orchestrator = FallbackOrchestrator::new(synthetic)
        .with_sources(sources)
        .with_reporter(Arc::new(reporter.clone()));
    (orchestrator, reporter)
}
