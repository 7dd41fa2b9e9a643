//! Fallback orchestration: the policy that always produces an answer.
//!
//! Every request walks an explicit chain:
//!
//! ```text
//! cache ─► source[0] ─► source[1] ─► … ─► synthetic model ─► synthetic static
//! ```
//!
//! A stage is abandoned when it fails, times out, or answers with nothing.
//! The static stage cannot fail, so the public operations return plain
//! values rather than `Result`s. The cache is consulted once before the
//! walk and written once after it, whichever stage served.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::cache::{DEFAULT_TTL, ResultCache};
use crate::clock::{Clock, SystemClock};
use crate::dedup;
use crate::error::AppError;
use crate::insight::{CompanyInfo, MarketTrends, SalaryInsight};
use crate::models::{JobRecord, Payload, SourceTag, Tier};
use crate::query::{CacheKey, JobQuery};
use crate::reporter::{FallbackEvent, FallbackReporter, TracingReporter};
use crate::synthetic::{
    SyntheticGenerator, SyntheticRequest, static_company, static_jobs, static_salary,
    static_skills, static_trends,
};
use crate::traits::{CompanyDirectory, JobSource};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Upper bound on a single source call; exceeding it is a network failure.
    pub adapter_timeout: Duration,
    /// Upper bound on a single text-generation call.
    pub model_timeout: Duration,
    pub cache_ttl: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            adapter_timeout: Duration::from_secs(10),
            model_timeout: Duration::from_secs(30),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// One live stage ahead of the synthetic tiers.
enum Stage<'a> {
    Jobs(&'a Arc<dyn JobSource>),
    Directory(&'a Arc<dyn CompanyDirectory>),
}

impl Stage<'_> {
    fn tag(&self) -> SourceTag {
        match self {
            Stage::Jobs(source) => SourceTag::new(source.name(), source.tier()),
            Stage::Directory(directory) => SourceTag::new(directory.name(), Tier::Api),
        }
    }

    /// Run the stage; an answer with nothing in it is an [`AppError::EmptyResult`].
    async fn run(&self, request: SyntheticRequest<'_>) -> Result<Payload, AppError> {
        match (self, request) {
            (Stage::Jobs(source), SyntheticRequest::Jobs { query, .. }) => {
                let mut jobs = source.search(query).await?;
                if jobs.is_empty() {
                    return Err(AppError::EmptyResult);
                }
                jobs.truncate(query.effective_limit());
                dedup::ensure_unique_ids(&mut jobs);
                Ok(Payload::Jobs(jobs))
            }
            (Stage::Directory(directory), SyntheticRequest::Company { name }) => directory
                .lookup(name)
                .await?
                .map(Payload::Company)
                .ok_or(AppError::EmptyResult),
            _ => Err(AppError::ConfigError(format!(
                "stage {} cannot answer a {} request",
                self.tag(),
                request.kind()
            ))),
        }
    }
}

/// Position of a request in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChainState {
    Live(usize),
    SyntheticModel,
    SyntheticStatic,
}

impl ChainState {
    fn start(live_stages: usize) -> Self {
        if live_stages == 0 {
            ChainState::SyntheticModel
        } else {
            ChainState::Live(0)
        }
    }

    fn after_live(index: usize, live_stages: usize) -> Self {
        if index + 1 < live_stages {
            ChainState::Live(index + 1)
        } else {
            ChainState::SyntheticModel
        }
    }
}

/// Owns the fallback chain, the result cache and the reporter.
pub struct FallbackOrchestrator {
    sources: Vec<Arc<dyn JobSource>>,
    directories: Vec<Arc<dyn CompanyDirectory>>,
    synthetic: SyntheticGenerator,
    cache: ResultCache<Payload>,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn FallbackReporter>,
    config: OrchestratorConfig,
}

impl FallbackOrchestrator {
    /// A chain with no live sources: synthetic model, then static.
    pub fn new(synthetic: SyntheticGenerator) -> Self {
        let config = OrchestratorConfig::default();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            sources: Vec::new(),
            directories: Vec::new(),
            synthetic,
            cache: ResultCache::with_clock(config.cache_ttl, clock.clone()),
            clock,
            reporter: Arc::new(TracingReporter),
            config,
        }
    }

    /// Append a job source; sources are tried in the order added.
    pub fn with_source(mut self, source: Arc<dyn JobSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn with_sources(mut self, sources: impl IntoIterator<Item = Arc<dyn JobSource>>) -> Self {
        self.sources.extend(sources);
        self
    }

    pub fn with_directory(mut self, directory: Arc<dyn CompanyDirectory>) -> Self {
        self.directories.push(directory);
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn FallbackReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replaces the clock. The cache is rebuilt, so call this before use.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.cache = ResultCache::with_clock(self.config.cache_ttl, clock.clone());
        self.clock = clock;
        self
    }

    /// Replaces the configuration. The cache is rebuilt, so call this before use.
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.cache = ResultCache::with_clock(config.cache_ttl, self.clock.clone());
        self.config = config;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Names of the configured job sources, in priority order.
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Jobs from the first stage that has any, never empty.
    pub async fn search_jobs(&self, query: &JobQuery) -> Vec<JobRecord> {
        let key = query.cache_key("jobs");
        let stages: Vec<Stage<'_>> = self.sources.iter().map(Stage::Jobs).collect();
        let request = SyntheticRequest::Jobs {
            query,
            origin: None,
        };
        match self.serve(key, stages, request).await {
            Payload::Jobs(jobs) => jobs,
            _ => static_jobs(query, None),
        }
    }

    /// Every source runs its own chain for a share of the limit; the results
    /// are merged in source order, deduplicated and cut to the limit.
    pub async fn aggregate_jobs(&self, query: &JobQuery) -> Vec<JobRecord> {
        if self.sources.is_empty() {
            return self.search_jobs(query).await;
        }

        let key = query.cache_key("aggregate");
        if let Some(Payload::Jobs(jobs)) = self.cache.get(&key) {
            self.reporter.report(FallbackEvent::CacheHit { key: &key });
            return jobs;
        }

        let limit = query.effective_limit();
        let share = query.with_share(limit.div_ceil(self.sources.len()));
        let chains = self.sources.iter().map(|source| {
            let request = SyntheticRequest::Jobs {
                query: &share,
                origin: Some(source.name()),
            };
            self.walk(&key, vec![Stage::Jobs(source)], request)
        });
        let lists: Vec<Vec<JobRecord>> = join_all(chains)
            .await
            .into_iter()
            .filter_map(|payload| match payload {
                Payload::Jobs(jobs) => Some(jobs),
                _ => None,
            })
            .collect();

        let mut merged = dedup::merge(lists, self.clock.now().date_naive());
        merged.truncate(limit);
        tracing::info!(%key, records = merged.len(), "Aggregated job search");

        self.cache.put(key, Payload::Jobs(merged.clone()));
        merged
    }

    pub async fn get_salary_insights(&self, title: &str, location: &str) -> SalaryInsight {
        let key = CacheKey::new("salary")
            .param("title", title)
            .param("location", location)
            .build();
        let request = SyntheticRequest::Salary { title, location };
        match self.serve(key, Vec::new(), request).await {
            Payload::Salary(insight) => insight,
            _ => static_salary(title, location),
        }
    }

    pub async fn get_trending_skills(&self, industry: &str, keywords: &str) -> Vec<String> {
        let key = CacheKey::new("skills")
            .param("industry", industry)
            .param("keywords", keywords)
            .build();
        let request = SyntheticRequest::Skills { industry, keywords };
        match self.serve(key, Vec::new(), request).await {
            Payload::Skills(skills) => skills,
            _ => static_skills(industry, keywords),
        }
    }

    /// Directories first (not-found falls through), then synthetic.
    pub async fn get_company_insights(&self, name: &str) -> CompanyInfo {
        let key = CacheKey::new("company").param("name", name).build();
        let stages: Vec<Stage<'_>> = self.directories.iter().map(Stage::Directory).collect();
        let request = SyntheticRequest::Company { name };
        match self.serve(key, stages, request).await {
            Payload::Company(info) => info,
            _ => static_company(name),
        }
    }

    pub async fn get_market_trends(&self, industry: &str) -> MarketTrends {
        let key = CacheKey::new("trends").param("industry", industry).build();
        let request = SyntheticRequest::Trends { industry };
        match self.serve(key, Vec::new(), request).await {
            Payload::Trends(trends) => trends,
            _ => static_trends(industry),
        }
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop expired cache entries; returns how many went.
    pub fn sweep_expired_cache(&self) -> usize {
        self.cache.sweep_expired()
    }

    /// Cache lookup, chain walk, cache write.
    async fn serve(
        &self,
        key: String,
        stages: Vec<Stage<'_>>,
        request: SyntheticRequest<'_>,
    ) -> Payload {
        if let Some(payload) = self.cache.get(&key) {
            self.reporter.report(FallbackEvent::CacheHit { key: &key });
            return payload;
        }
        let payload = self.walk(&key, stages, request).await;
        self.cache.put(key, payload.clone());
        payload
    }

    async fn walk(
        &self,
        key: &str,
        stages: Vec<Stage<'_>>,
        request: SyntheticRequest<'_>,
    ) -> Payload {
        let mut state = ChainState::start(stages.len());
        loop {
            state = match state {
                ChainState::Live(index) => {
                    let stage = &stages[index];
                    let tag = stage.tag();
                    self.reporter
                        .report(FallbackEvent::TierAttempt { key, tier: &tag });
                    match bounded(self.config.adapter_timeout, stage.run(request)).await {
                        Ok(payload) => return self.served(key, &tag, payload),
                        Err(e) => self.failed(key, &tag, &e),
                    }
                    ChainState::after_live(index, stages.len())
                }
                ChainState::SyntheticModel => {
                    let tag = request.tag(Tier::AiGenerated);
                    self.reporter
                        .report(FallbackEvent::TierAttempt { key, tier: &tag });
                    match bounded(
                        self.config.model_timeout,
                        self.synthetic.generate_model(request),
                    )
                    .await
                    {
                        Ok(payload) => return self.served(key, &tag, payload),
                        Err(e) => self.failed(key, &tag, &e),
                    }
                    ChainState::SyntheticStatic
                }
                ChainState::SyntheticStatic => {
                    let tag = request.tag(Tier::StaticFallback);
                    self.reporter
                        .report(FallbackEvent::TierAttempt { key, tier: &tag });
                    let payload = self.synthetic.generate_static(request);
                    return self.served(key, &tag, payload);
                }
            };
        }
    }

    fn served(&self, key: &str, tier: &SourceTag, payload: Payload) -> Payload {
        self.reporter.report(FallbackEvent::Served {
            key,
            tier,
            records: payload.record_count(),
        });
        payload
    }

    fn failed(&self, key: &str, tier: &SourceTag, error: &AppError) {
        let detail = error.to_string();
        self.reporter.report(FallbackEvent::TierFailed {
            key,
            tier,
            reason: error.kind(),
            detail: &detail,
        });
    }
}

/// Run `fut` for at most `limit`; running out of time is a [`AppError::Timeout`].
async fn bounded<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, AppError>>,
) -> Result<T, AppError> {
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or_else(|_| Err(AppError::Timeout(limit.as_secs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::testutil::{
        ManualClock, MockCompanyDirectory, MockJobSource, MockTextGenerator, RecordedEvent,
        RecordingReporter, sample_job,
    };

    fn build(
        sources: Vec<MockJobSource>,
        generator: Option<MockTextGenerator>,
    ) -> (FallbackOrchestrator, RecordingReporter, ManualClock) {
        let reporter = RecordingReporter::new();
        let clock = ManualClock::new();
        let synthetic = SyntheticGenerator::new(
            generator.map(|g| Arc::new(g) as Arc<dyn crate::traits::TextGenerator>),
        );
        let orchestrator = FallbackOrchestrator::new(synthetic)
            .with_sources(
                sources
                    .into_iter()
                    .map(|s| Arc::new(s) as Arc<dyn JobSource>),
            )
            .with_clock(Arc::new(clock.clone()))
            .with_reporter(Arc::new(reporter.clone()));
        (orchestrator, reporter, clock)
    }

    fn unavailable() -> AppError {
        AppError::HttpError {
            status: 503,
            message: "Service Unavailable".into(),
        }
    }

    #[tokio::test]
    async fn everything_down_serves_static_jobs() {
        let linkedin =
            MockJobSource::with_error("linkedin", Tier::Api, AppError::CredentialMissing("linkedin".into()));
        let indeed = MockJobSource::with_error("indeed", Tier::Scrape, unavailable());
        let (orchestrator, reporter, _) = build(vec![linkedin, indeed], None);

        let query = JobQuery::new("Data Scientist")
            .with_location("Remote")
            .with_limit(5);
        let jobs = orchestrator.search_jobs(&query).await;

        assert_eq!(jobs.len(), 5);
        for job in &jobs {
            assert!(job.source.to_string().ends_with("fallback"));
            assert!(!job.title.is_empty() && !job.company.is_empty() && !job.skills.is_empty());
        }
        assert_eq!(
            reporter.failures(),
            vec![
                ("linkedin_api".to_string(), FailureKind::CredentialMissing),
                ("indeed_scrape".to_string(), FailureKind::NetworkError),
                ("ai_fallback".to_string(), FailureKind::CredentialMissing),
            ]
        );
        assert_eq!(reporter.served(), vec!["static_fallback".to_string()]);
    }

    #[tokio::test]
    async fn primary_failure_tries_next_tier_once() {
        let primary = MockJobSource::with_error("linkedin", Tier::Api, AppError::NetworkError("refused".into()));
        let secondary = MockJobSource::with_jobs(
            "indeed",
            Tier::Scrape,
            vec![sample_job("Rust Engineer", "Ferrous", "indeed")],
        );
        let tertiary = MockJobSource::with_jobs(
            "glassdoor",
            Tier::Scrape,
            vec![sample_job("Go Engineer", "Gopher", "glassdoor")],
        );
        let (orchestrator, reporter, _) = build(
            vec![primary.clone(), secondary.clone(), tertiary.clone()],
            None,
        );

        let jobs = orchestrator.search_jobs(&JobQuery::new("rust")).await;

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].company, "Ferrous");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
        assert_eq!(tertiary.calls(), 0);
        assert_eq!(reporter.attempts(), vec!["linkedin_api", "indeed_scrape"]);
    }

    #[tokio::test]
    async fn empty_listing_falls_through() {
        let empty = MockJobSource::new("indeed", Tier::Scrape);
        let model = MockTextGenerator::new(r#"[{"title": "Data Analyst", "company": "Quanta"}]"#);
        let (orchestrator, reporter, _) = build(vec![empty], Some(model));

        let jobs = orchestrator.search_jobs(&JobQuery::new("data")).await;

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source.to_string(), "ai_fallback");
        assert_eq!(
            reporter.failures(),
            vec![("indeed_scrape".to_string(), FailureKind::EmptyResult)]
        );
    }

    #[tokio::test]
    async fn source_results_are_cut_to_limit() {
        let jobs: Vec<_> = (0..8)
            .map(|i| sample_job(&format!("Role {i}"), "Acme", "indeed"))
            .collect();
        let source = MockJobSource::with_jobs("indeed", Tier::Scrape, jobs);
        let (orchestrator, _, _) = build(vec![source], None);

        let jobs = orchestrator
            .search_jobs(&JobQuery::new("role").with_limit(3))
            .await;
        assert_eq!(jobs.len(), 3);
    }

    #[tokio::test]
    async fn repeated_query_is_served_from_cache() {
        let source = MockJobSource::with_error("indeed", Tier::Scrape, unavailable());
        let model = MockTextGenerator::with_error(AppError::RateLimitExceeded);
        let (orchestrator, reporter, _) =
            build(vec![source.clone()], Some(model.clone()));
        let query = JobQuery::new("Data Scientist").with_limit(5);

        let first = orchestrator.search_jobs(&query).await;
        let second = orchestrator
            .search_jobs(&JobQuery::new("data  scientist").with_limit(5))
            .await;

        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);
        assert_eq!(model.prompts().len(), 1);
        assert_eq!(reporter.cache_hits(), 1);
    }

    #[tokio::test]
    async fn expired_cache_entry_is_recomputed() {
        let source = MockJobSource::with_responses(
            "indeed",
            Tier::Scrape,
            vec![
                Ok(vec![sample_job("First", "Acme", "indeed")]),
                Ok(vec![sample_job("Second", "Acme", "indeed")]),
            ],
        );
        let (orchestrator, _, clock) = build(vec![source.clone()], None);
        let query = JobQuery::new("x");

        assert_eq!(orchestrator.search_jobs(&query).await[0].title, "First");
        clock.advance(Duration::from_secs(3599));
        assert_eq!(orchestrator.search_jobs(&query).await[0].title, "First");
        clock.advance(Duration::from_secs(2));
        assert_eq!(orchestrator.search_jobs(&query).await[0].title, "Second");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn slow_source_times_out_and_falls_through() {
        let slow = MockJobSource::with_jobs(
            "talent",
            Tier::Api,
            vec![sample_job("Too Late", "Sloth", "talent")],
        )
        .with_delay(Duration::from_millis(500));
        let (orchestrator, reporter, _) = build(vec![slow], None);
        let orchestrator = orchestrator.with_config(OrchestratorConfig {
            adapter_timeout: Duration::from_millis(50),
            ..OrchestratorConfig::default()
        });

        let jobs = orchestrator
            .search_jobs(&JobQuery::new("x").with_limit(2))
            .await;

        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.source.to_string() == "static_fallback"));
        assert_eq!(
            reporter.failures()[0],
            ("talent_api".to_string(), FailureKind::NetworkError)
        );
    }

    #[tokio::test]
    async fn no_tier_is_attempted_twice() {
        let a = MockJobSource::with_error("a", Tier::Scrape, unavailable());
        let b = MockJobSource::new("b", Tier::Scrape);
        let model = MockTextGenerator::new("definitely not json");
        let (orchestrator, reporter, _) = build(vec![a, b], Some(model));

        orchestrator.search_jobs(&JobQuery::new("x")).await;

        let attempts = reporter.attempts();
        assert_eq!(
            attempts,
            vec!["a_scrape", "b_scrape", "ai_fallback", "static_fallback"]
        );
        let failures = reporter.failures();
        assert_eq!(failures[2].1, FailureKind::ParseError);
    }

    #[tokio::test]
    async fn aggregate_merges_sources_in_priority_order() {
        let linkedin = MockJobSource::with_jobs(
            "linkedin",
            Tier::Api,
            vec![
                sample_job("Data Scientist", "Acme", "linkedin"),
                sample_job("ML Engineer", "Beta", "linkedin"),
            ],
        );
        let indeed = MockJobSource::with_jobs(
            "indeed",
            Tier::Scrape,
            vec![
                sample_job("data scientist", "ACME", "indeed"),
                sample_job("Analyst", "Gamma", "indeed"),
            ],
        );
        let glassdoor = MockJobSource::with_error("glassdoor", Tier::Scrape, unavailable());
        let (orchestrator, _, _) = build(vec![linkedin, indeed, glassdoor], None);

        let jobs = orchestrator
            .aggregate_jobs(&JobQuery::new("data").with_limit(6))
            .await;

        assert_eq!(jobs.len(), 5);
        let acme: Vec<_> = jobs
            .iter()
            .filter(|j| j.company.eq_ignore_ascii_case("acme"))
            .collect();
        assert_eq!(acme.len(), 1);
        assert_eq!(acme[0].source.to_string(), "linkedin_scrape");
        let glassdoor_jobs = jobs
            .iter()
            .filter(|j| j.source.to_string() == "glassdoor_static_fallback")
            .count();
        assert_eq!(glassdoor_jobs, 2);
    }

    #[tokio::test]
    async fn aggregate_without_sources_uses_synthetic_chain() {
        let (orchestrator, _, _) = build(Vec::new(), None);
        let jobs = orchestrator
            .aggregate_jobs(&JobQuery::new("x").with_limit(4))
            .await;
        assert_eq!(jobs.len(), 4);
    }

    #[tokio::test]
    async fn aggregate_cuts_off_a_hanging_source() {
        let fast = MockJobSource::with_jobs(
            "indeed",
            Tier::Scrape,
            vec![
                sample_job("Rust Engineer", "Ferrous", "indeed"),
                sample_job("Rust SRE", "Oxide", "indeed"),
            ],
        );
        let hanging = MockJobSource::with_jobs(
            "talent",
            Tier::Api,
            vec![sample_job("Too Late", "Sloth", "talent")],
        )
        .with_delay(Duration::from_secs(5));
        let (orchestrator, reporter, _) = build(vec![hanging, fast], None);
        let orchestrator = orchestrator.with_config(OrchestratorConfig {
            adapter_timeout: Duration::from_millis(100),
            ..OrchestratorConfig::default()
        });

        let started = std::time::Instant::now();
        let jobs = orchestrator
            .aggregate_jobs(&JobQuery::new("rust").with_limit(4))
            .await;
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
        assert_eq!(jobs.len(), 4);
        let tags: Vec<String> = jobs.iter().map(|j| j.source.to_string()).collect();
        assert_eq!(tags.iter().filter(|t| *t == "indeed_scrape").count(), 2);
        assert_eq!(
            tags.iter().filter(|t| *t == "talent_static_fallback").count(),
            2
        );
        assert!(jobs.iter().all(|j| j.company != "Sloth"));
        assert!(
            reporter
                .failures()
                .contains(&("talent_api".to_string(), FailureKind::NetworkError))
        );
    }

    #[tokio::test]
    async fn served_list_has_distinct_ids() {
        let indeed = MockJobSource::with_jobs(
            "indeed",
            Tier::Scrape,
            vec![
                sample_job("Backend Developer", "Acme", "indeed"),
                sample_job("Backend Developer", "Acme", "indeed"),
            ],
        );
        let (orchestrator, _, _) = build(vec![indeed], None);

        let jobs = orchestrator.search_jobs(&JobQuery::new("backend")).await;

        assert_eq!(jobs.len(), 2);
        assert_ne!(jobs[0].id, jobs[1].id);
    }

    #[tokio::test]
    async fn salary_served_twice_from_single_computation() {
        let model = MockTextGenerator::new("not json");
        let (orchestrator, reporter, _) = build(Vec::new(), Some(model.clone()));

        let first = orchestrator
            .get_salary_insights("Senior Software Engineer", "")
            .await;
        let second = orchestrator
            .get_salary_insights("Senior Software Engineer", "")
            .await;

        assert_eq!(first, second);
        assert_eq!(model.prompts().len(), 1);
        assert_eq!(reporter.cache_hits(), 1);
        for band in [first.entry, first.mid, first.senior] {
            assert!(band.min() <= band.median() && band.median() <= band.max());
        }
    }

    #[tokio::test]
    async fn company_directory_not_found_falls_through() {
        let directory = MockCompanyDirectory::new("linkedin", Ok(None));
        let reporter = RecordingReporter::new();
        let orchestrator = FallbackOrchestrator::new(SyntheticGenerator::static_only())
            .with_directory(Arc::new(directory.clone()))
            .with_reporter(Arc::new(reporter.clone()));

        let info = orchestrator.get_company_insights("Acme").await;

        assert_eq!(info.company_name, "Acme");
        assert_eq!(info.source.to_string(), "static_fallback");
        assert_eq!(directory.calls(), 1);
        assert_eq!(
            reporter.failures()[0],
            ("linkedin_api".to_string(), FailureKind::EmptyResult)
        );
    }

    #[tokio::test]
    async fn company_directory_hit_is_served() {
        let found = CompanyInfo {
            source: SourceTag::new("linkedin", Tier::Api),
            ..static_company("Acme")
        };
        let directory = MockCompanyDirectory::new("linkedin", Ok(Some(found.clone())));
        let orchestrator = FallbackOrchestrator::new(SyntheticGenerator::static_only())
            .with_directory(Arc::new(directory));

        assert_eq!(orchestrator.get_company_insights("Acme").await, found);
    }

    #[tokio::test]
    async fn skills_and_trends_prefer_the_model() {
        let model = MockTextGenerator::with_responses(vec![
            Ok(r#"["Rust", "WebAssembly"]"#.to_string()),
            Ok(r#"{"industry": "fintech", "hot_roles": ["Quant Developer"]}"#.to_string()),
        ]);
        let (orchestrator, _, _) = build(Vec::new(), Some(model));

        let skills = orchestrator.get_trending_skills("technology", "systems").await;
        assert_eq!(skills, vec!["Rust", "WebAssembly"]);

        let trends = orchestrator.get_market_trends("fintech").await;
        assert_eq!(trends.hot_roles, vec!["Quant Developer"]);
        assert_eq!(trends.source.to_string(), "ai_fallback");
    }

    #[tokio::test]
    async fn clear_and_sweep_cache() {
        let (orchestrator, _, clock) = build(Vec::new(), None);
        orchestrator.get_market_trends("technology").await;
        orchestrator.get_trending_skills("finance", "").await;

        clock.advance(Duration::from_secs(3600));
        orchestrator.get_market_trends("healthcare").await;
        assert_eq!(orchestrator.sweep_expired_cache(), 2);

        orchestrator.clear_cache();
        assert_eq!(orchestrator.sweep_expired_cache(), 0);
    }

    #[tokio::test]
    async fn reporter_sees_every_transition_in_order() {
        let source = MockJobSource::with_error("indeed", Tier::Scrape, unavailable());
        let (orchestrator, reporter, _) = build(vec![source], None);
        orchestrator.search_jobs(&JobQuery::new("x").with_limit(1)).await;

        let events = reporter.events();
        assert!(matches!(events.first(), Some(RecordedEvent::TierAttempt { .. })));
        assert!(matches!(
            events.last(),
            Some(RecordedEvent::Served { records: 1, .. })
        ));
    }
}
