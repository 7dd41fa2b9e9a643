use async_trait::async_trait;
use scout_core::dedup;
use scout_core::error::AppError;
use scout_core::models::{JobDraft, JobRecord, SourceTag, Tier};
use scout_core::query::{JobQuery, MAX_LIMIT};
use scout_core::traits::{FetchRequest, Fetcher, JobSource};
use scraper::Selector;

use crate::html;

const SEARCH_URL: &str = "https://www.indeed.com/jobs";
const SITE: &str = "https://www.indeed.com";

/// Scrapes Indeed's public search results page.
#[derive(Clone)]
pub struct IndeedSource<F> {
    fetcher: F,
}

impl<F: Fetcher> IndeedSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    fn request(query: &JobQuery) -> FetchRequest {
        FetchRequest::get(SEARCH_URL)
            .with_param("q", &query.keywords)
            .with_param("l", &query.location)
            .with_param("sort", "date")
            .with_param("limit", query.effective_limit().min(MAX_LIMIT))
    }
}

struct CardSelectors {
    cards: Vec<Selector>,
    title: Vec<Selector>,
    company: Vec<Selector>,
    location: Vec<Selector>,
    link: Vec<Selector>,
    job_key: Vec<Selector>,
    salary: Vec<Selector>,
    snippet: Vec<Selector>,
    date: Vec<Selector>,
}

impl CardSelectors {
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            cards: html::selectors(&["div.job_seen_beacon", "a[data-jk]"])?,
            title: html::selectors(&["span[title]", "h2.jobTitle"])?,
            company: html::selectors(&[
                "span.companyName",
                "a[data-testid=\"company-name\"]",
                "span[data-testid=\"company-name\"]",
            ])?,
            location: html::selectors(&[
                "div[data-testid=\"job-location\"]",
                "div.companyLocation",
            ])?,
            link: html::selectors(&["a[href]"])?,
            job_key: html::selectors(&["[data-jk]"])?,
            salary: html::selectors(&[
                "span.salary-snippet",
                "span[data-testid=\"attribute_snippet_testid\"]",
            ])?,
            snippet: html::selectors(&["div.job-snippet", "ul.jobsearch-jobDescriptionText"])?,
            date: html::selectors(&["span.date", "span[data-testid=\"myJobsStateDate\"]"])?,
        })
    }
}

/// Parse a results page into records; a page with no cards yields none.
fn parse_results(body: &str, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
    let document = html::parse_page(body, "indeed")?;
    let sel = CardSelectors::new()?;

    let mut jobs: Vec<JobRecord> = html::cards(&document, &sel.cards)
        .into_iter()
        .take(query.effective_limit())
        .map(|card| {
            let title = html::first(card, &sel.title)
                .and_then(|el| html::attr(el, "title").or_else(|| html::text_of(el)));
            let href = if card.value().name() == "a" {
                html::attr(card, "href")
            } else {
                html::first(card, &sel.link).and_then(|el| html::attr(el, "href"))
            };
            let id = html::attr(card, "data-jk")
                .or_else(|| {
                    html::first(card, &sel.job_key).and_then(|el| html::attr(el, "data-jk"))
                })
                .or_else(|| href.as_deref().and_then(job_key_from_link));
            let url = href
                .filter(|h| h.starts_with('/'))
                .map(|h| html::absolute_link(SITE, &h));

            JobDraft {
                id,
                title,
                company: html::first_text(card, &sel.company),
                location: html::first_text(card, &sel.location),
                description: html::first_text(card, &sel.snippet),
                salary_range: html::first_text(card, &sel.salary),
                posted_date: html::first_text(card, &sel.date),
                url,
                ..Default::default()
            }
            .finish(SourceTag::new("indeed", Tier::Scrape), query)
        })
        .collect();

    dedup::ensure_unique_ids(&mut jobs);
    Ok(jobs)
}

/// The `jk` query parameter of a result link.
fn job_key_from_link(href: &str) -> Option<String> {
    let (_, query) = href.split_once('?')?;
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("jk="))
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl<F: Fetcher + 'static> JobSource for IndeedSource<F> {
    fn name(&self) -> &str {
        "indeed"
    }

    fn tier(&self) -> Tier {
        Tier::Scrape
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        let body = self.fetcher.fetch(&Self::request(query)).await?;
        let jobs = parse_results(&body, query)?;
        tracing::debug!(count = jobs.len(), "indeed cards parsed");
        Ok(jobs)
    }
}
