use std::sync::Arc;

use scout_core::config::ScoutConfig;
use scout_core::error::AppError;
use scout_core::orchestrator::FallbackOrchestrator;
use scout_core::synthetic::SyntheticGenerator;
use scout_core::throttle::RateLimitedFetcher;
use scout_core::traits::{CompanyDirectory, Fetcher, JobSource, TextGenerator};

use crate::fetcher::ReqwestFetcher;
use crate::glassdoor::GlassdoorSource;
use crate::indeed::IndeedSource;
use crate::linkedin::LinkedInSource;
use crate::llm::OpenAiGenerator;
use crate::talent::TalentSource;

/// Live sources in priority order: LinkedIn API, Cloud Talent API, Indeed
/// scrape, Glassdoor scrape.
///
/// API sources share one pacing policy and the scrapers another; both wrap
/// the same HTTP client.
pub fn default_sources<F: Fetcher + 'static>(
    config: &ScoutConfig,
    http: F,
) -> Vec<Arc<dyn JobSource>> {
    let api = RateLimitedFetcher::new(http.clone(), config.api_throttle());
    let scrape = RateLimitedFetcher::new(http, config.scrape_throttle());

    let mut sources: Vec<Arc<dyn JobSource>> = Vec::with_capacity(4);
    sources.push(Arc::new(LinkedInSource::new(
        api.clone(),
        config.linkedin_token.clone(),
    )));
    sources.push(Arc::new(TalentSource::new(
        api,
        config.talent_api_key.clone(),
        config.talent_project_id.clone(),
    )));
    sources.push(Arc::new(IndeedSource::new(scrape.clone())));
    sources.push(Arc::new(GlassdoorSource::new(scrape)));
    sources
}

/// The text-generation backend, if a key is configured.
pub fn text_generator(config: &ScoutConfig) -> Result<Option<Arc<dyn TextGenerator>>, AppError> {
    let Some(key) = config.llm_api_key.as_deref() else {
        return Ok(None);
    };
    let generator = OpenAiGenerator::with_base_url(key, &config.llm_model, &config.llm_base_url)?
        .with_timeout(config.model_timeout)?;
    Ok(Some(Arc::new(generator)))
}

/// Assemble an orchestrator over `http` from configuration.
pub fn build_with_fetcher<F: Fetcher + 'static>(
    config: &ScoutConfig,
    http: F,
) -> Result<FallbackOrchestrator, AppError> {
    let directory: Arc<dyn CompanyDirectory> = Arc::new(LinkedInSource::new(
        RateLimitedFetcher::new(http.clone(), config.api_throttle()),
        config.linkedin_token.clone(),
    ));

    let orchestrator = FallbackOrchestrator::new(SyntheticGenerator::new(text_generator(config)?))
        .with_config(config.orchestrator())
        .with_sources(default_sources(config, http))
        .with_directory(directory);

    tracing::info!(
        sources = ?orchestrator.source_names(),
        model = config.llm_api_key.is_some(),
        "orchestrator ready"
    );
    Ok(orchestrator)
}

/// Assemble the default orchestrator with a real HTTP client.
pub fn build_orchestrator(config: &ScoutConfig) -> Result<FallbackOrchestrator, AppError> {
    let http = ReqwestFetcher::with_timeout(config.adapter_timeout)?;
    build_with_fetcher(config, http)
}
