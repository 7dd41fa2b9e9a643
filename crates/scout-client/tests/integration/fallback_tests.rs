use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scout_client::build_with_fetcher;
use scout_core::config::ScoutConfig;
use scout_core::error::FailureKind;
use scout_core::query::JobQuery;
use scout_core::testutil::{MockFetcher, MockTextGenerator, RecordingReporter};

use crate::common::{
    Credentials, INDEED_PAGE, LINKEDIN_POSTINGS, RoutedFetcher, orchestrator, sources,
};

#[tokio::test]
async fn every_live_source_down_serves_static_records() {
    let config = ScoutConfig {
        scrape_delay: Duration::ZERO,
        api_min_interval: Duration::ZERO,
        ..ScoutConfig::default()
    };
    let reporter = RecordingReporter::new();
    let orchestrator = build_with_fetcher(&config, MockFetcher::always_status(503))
        .unwrap()
        .with_reporter(Arc::new(reporter.clone()));

    let jobs = orchestrator
        .search_jobs(&JobQuery::new("python developer").with_location("New York").with_limit(5))
        .await;

    assert_eq!(jobs.len(), 5);
    assert!(jobs.iter().all(|j| j.source.is_fallback()));
    assert!(jobs.iter().all(|j| j.source.to_string() == "static_fallback"));
    assert_eq!(
        reporter.attempts(),
        vec![
            "linkedin_api",
            "google_api",
            "indeed_scrape",
            "glassdoor_scrape",
            "ai_fallback",
            "static_fallback"
        ]
    );
    assert_eq!(
        reporter.failures(),
        vec![
            ("linkedin_api".to_string(), FailureKind::CredentialMissing),
            ("google_api".to_string(), FailureKind::CredentialMissing),
            ("indeed_scrape".to_string(), FailureKind::NetworkError),
            ("glassdoor_scrape".to_string(), FailureKind::NetworkError),
            ("ai_fallback".to_string(), FailureKind::CredentialMissing),
        ]
    );
}

#[tokio::test]
async fn scrape_serves_when_api_credentials_are_absent() {
    let fetcher = RoutedFetcher::new().route("indeed.com", INDEED_PAGE);
    let (orchestrator, reporter) = orchestrator(sources(&fetcher, Credentials::default()), None);

    let jobs = orchestrator.search_jobs(&JobQuery::new("rust")).await;

    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.source.to_string() == "indeed_scrape"));
    assert_eq!(jobs[0].company, "Ferrous Systems");
    assert_eq!(
        reporter.attempts(),
        vec!["linkedin_api", "google_api", "indeed_scrape"]
    );
    assert_eq!(fetcher.hits().len(), 1);
}

#[tokio::test]
async fn configured_api_is_tried_first() {
    let fetcher = RoutedFetcher::new()
        .route("api.linkedin.com", LINKEDIN_POSTINGS)
        .route("indeed.com", INDEED_PAGE);
    let creds = Credentials {
        linkedin: Some("token".into()),
        ..Credentials::default()
    };
    let (orchestrator, reporter) = orchestrator(sources(&fetcher, creds), None);

    let jobs = orchestrator.search_jobs(&JobQuery::new("rust")).await;

    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "linkedin_77");
    assert_eq!(reporter.served(), vec!["linkedin_api"]);
    assert!(fetcher.hits().iter().all(|u| u.contains("linkedin")));
}

#[tokio::test]
async fn rate_limited_api_falls_through_without_retry() {
    let fetcher = RoutedFetcher::new()
        .fail("api.linkedin.com", 429)
        .route("indeed.com", INDEED_PAGE);
    let creds = Credentials {
        linkedin: Some("token".into()),
        ..Credentials::default()
    };
    let (orchestrator, reporter) = orchestrator(sources(&fetcher, creds), None);

    let jobs = orchestrator.search_jobs(&JobQuery::new("rust")).await;

    assert!(jobs.iter().all(|j| j.source.to_string() == "indeed_scrape"));
    assert_eq!(
        reporter.failures()[0],
        ("linkedin_api".to_string(), FailureKind::NetworkError)
    );
    let linkedin_hits = fetcher
        .hits()
        .iter()
        .filter(|u| u.contains("linkedin"))
        .count();
    assert_eq!(linkedin_hits, 1);
}

#[tokio::test]
async fn talent_api_parse_failure_is_recorded() {
    let fetcher = RoutedFetcher::new()
        .route("jobs.googleapis.com", "<html>maintenance</html>")
        .route("indeed.com", INDEED_PAGE);
    let creds = Credentials {
        talent_key: Some("key".into()),
        talent_project: Some("proj".into()),
        ..Credentials::default()
    };
    let (orchestrator, reporter) = orchestrator(sources(&fetcher, creds), None);

    orchestrator.search_jobs(&JobQuery::new("rust")).await;

    assert!(
        reporter
            .failures()
            .contains(&("google_api".to_string(), FailureKind::ParseError))
    );
    assert_eq!(reporter.served(), vec!["indeed_scrape"]);
}

#[tokio::test]
async fn model_tier_fills_in_for_failed_sources() {
    let fetcher = RoutedFetcher::new();
    let generator = MockTextGenerator::new(
        "```json\n[{\"title\": \"Rust Engineer\", \"company\": \"Acme\", \"location\": \"Remote\"},\n {\"title\": \"Rust SRE\", \"company\": \"Globex\"}]\n```",
    );
    let (orchestrator, reporter) = orchestrator(
        sources(&fetcher, Credentials::default()),
        Some(generator.clone()),
    );

    let jobs = orchestrator
        .search_jobs(&JobQuery::new("rust").with_limit(10))
        .await;

    assert_eq!(jobs.len(), 2);
    assert!(jobs.iter().all(|j| j.source.to_string() == "ai_fallback"));
    assert!(jobs.iter().all(|j| j.source.is_fallback()));
    assert_eq!(reporter.served(), vec!["ai_fallback"]);
    assert_eq!(generator.prompts().len(), 1);
}

#[tokio::test]
async fn salary_lookup_is_cached() {
    let (orchestrator, reporter) = orchestrator(Vec::new(), None);

    let first = orchestrator
        .get_salary_insights("Software Engineer", "Seattle")
        .await;
    let second = orchestrator
        .get_salary_insights("software  engineer", "seattle")
        .await;

    assert_eq!(first, second);
    assert!(first.source.is_fallback());
    assert_eq!(reporter.cache_hits(), 1);
    assert_eq!(reporter.attempts(), vec!["ai_fallback", "static_fallback"]);
}

#[tokio::test]
async fn aggregate_mixes_live_and_fallback_sources() {
    let fetcher = RoutedFetcher::new().route("indeed.com", INDEED_PAGE);
    let (orchestrator, _reporter) =
        orchestrator(sources(&fetcher, Credentials::default()), None);

    let jobs = orchestrator
        .aggregate_jobs(&JobQuery::new("rust").with_limit(8))
        .await;

    assert_eq!(jobs.len(), 8);
    let mut per_tag: HashMap<String, usize> = HashMap::new();
    for job in &jobs {
        *per_tag.entry(job.source.to_string()).or_default() += 1;
    }
    assert_eq!(per_tag["indeed_scrape"], 2);
    assert_eq!(per_tag["linkedin_static_fallback"], 2);
    assert_eq!(per_tag["google_static_fallback"], 2);
    assert_eq!(per_tag["glassdoor_static_fallback"], 2);

    let today = chrono::Utc::now().date_naive();
    let ages: Vec<i64> = jobs.iter().map(|j| j.posted_date.age_days(today)).collect();
    assert!(ages.windows(2).all(|w| w[0] <= w[1]));
}
