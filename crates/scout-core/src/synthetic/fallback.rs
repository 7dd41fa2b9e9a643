//! Hand-authored data for the terminal tier.

use std::collections::BTreeSet;

use crate::insight::{CompanyInfo, MarketTrends, SalaryBand, SalaryInsight};
use crate::models::{
    CompanySize, DEFAULT_COMPANY, DEFAULT_INDUSTRY, EmploymentType, JobRecord, RemoteType, SourceTag,
    Tier,
};
use crate::posted::PostedDate;
use crate::query::JobQuery;
use crate::text;

use super::MAX_TRENDING_SKILLS;

/// `{}` is replaced by the search keywords.
const TITLE_TEMPLATES: [&str; 7] = [
    "Senior {} Developer",
    "{} Engineer",
    "Lead {} Specialist",
    "Full Stack {} Developer",
    "{} Software Engineer",
    "Junior {} Developer",
    "Principal {} Engineer",
];

const DEFAULT_COMPANIES: [&str; 9] = [
    "TechFlow Solutions",
    "DataDrive Inc",
    "CloudNext Corp",
    "InnovateLabs",
    "CodeCraft Systems",
    "Digital Dynamics",
    "FutureTech Inc",
    "AgileWorks",
    "SmartSolutions Co",
];

const INDEED_COMPANIES: [&str; 8] = [
    "TechFlow Solutions",
    "DataDrive Inc",
    "CloudNext Corp",
    "InnovateLabs",
    "CodeCraft Systems",
    "Digital Dynamics",
    "FutureTech Inc",
    "AgileWorks",
];

const LINKEDIN_COMPANIES: [&str; 8] = [
    "Microsoft",
    "Google",
    "Amazon",
    "Meta",
    "Netflix",
    "Salesforce",
    "Adobe",
    "Oracle",
];

const GLASSDOOR_COMPANIES: [&str; 8] = [
    "Stripe",
    "Airbnb",
    "Uber",
    "Spotify",
    "Dropbox",
    "Shopify",
    "Atlassian",
    "Slack",
];

const TALENT_COMPANIES: [&str; 8] = [
    "IBM",
    "Intel",
    "Cisco",
    "NVIDIA",
    "SAP",
    "VMware",
    "Twilio",
    "Datadog",
];

const LOCATIONS: [&str; 8] = [
    "San Francisco, CA",
    "New York, NY",
    "Seattle, WA",
    "Austin, TX",
    "Remote",
    "Los Angeles, CA",
    "Chicago, IL",
    "Boston, MA",
];

const SIZES: [CompanySize; 3] = [CompanySize::Small, CompanySize::Medium, CompanySize::Large];

fn company_pool(origin: Option<&str>) -> &'static [&'static str] {
    match origin {
        Some("indeed") => &INDEED_COMPANIES,
        Some("linkedin") => &LINKEDIN_COMPANIES,
        Some("glassdoor") => &GLASSDOOR_COMPANIES,
        Some("google") => &TALENT_COMPANIES,
        _ => &DEFAULT_COMPANIES,
    }
}

fn salary_for_title(title: &str) -> &'static str {
    let lower = title.to_lowercase();
    if lower.contains("senior") || lower.contains("lead") || lower.contains("principal") {
        "$120,000 - $180,000"
    } else if lower.contains("junior") || lower.contains("entry") {
        "$70,000 - $100,000"
    } else {
        "$90,000 - $140,000"
    }
}

/// Exactly `query.limit` distinct jobs built from fixed tables.
///
/// Titles and companies cycle with coprime periods, so every
/// (title, company) pair in one result is different.
pub fn static_jobs(query: &JobQuery, origin: Option<&str>) -> Vec<JobRecord> {
    let keywords = match query.keywords.trim() {
        "" => "Software",
        k => k,
    };
    let companies = company_pool(origin);
    let source = SourceTag::with_origin(Tier::StaticFallback, origin);
    let skills: BTreeSet<String> = text::skills_for_keywords(keywords).into_iter().collect();

    (0..query.effective_limit())
        .map(|i| {
            let title = TITLE_TEMPLATES[i % TITLE_TEMPLATES.len()].replace("{}", keywords);
            let company = companies[i % companies.len()].to_string();
            let location = if query.remote {
                "Remote".to_string()
            } else if query.location.trim().is_empty() {
                LOCATIONS[i % LOCATIONS.len()].to_string()
            } else {
                query.location.trim().to_string()
            };
            let remote_type = if query.remote || location == "Remote" {
                RemoteType::Remote
            } else if i % 3 == 0 {
                RemoteType::Hybrid
            } else {
                RemoteType::OnSite
            };
            let id = match origin {
                Some(origin) => format!("{origin}_fallback_{i}"),
                None => format!("fallback_{i}"),
            };
            let slug: String = company
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();

            JobRecord {
                id,
                description: format!(
                    "Join {company} as a {title}. Work on {keywords} projects with a talented team."
                ),
                employment_type: query.employment_type.unwrap_or(EmploymentType::FullTime),
                posted_date: PostedDate::DaysAgo((i % 7) as u32),
                salary_range: Some(salary_for_title(&title).to_string()),
                requirements: vec![
                    format!("{keywords} experience"),
                    "Problem-solving skills".to_string(),
                    "Team collaboration".to_string(),
                ],
                skills: skills.clone(),
                company_size: query.company_size.unwrap_or(SIZES[i % SIZES.len()]),
                industry: DEFAULT_INDUSTRY.to_string(),
                url: format!("https://careers.{slug}.com/jobs/{i}"),
                source: source.clone(),
                remote_type: Some(remote_type),
                title,
                company,
                location,
            }
        })
        .collect()
}

/// Display form of a location parameter.
pub(super) fn display_location(location: &str) -> String {
    match location.trim() {
        "" => "All locations".to_string(),
        l => l.to_string(),
    }
}

fn base_salary(title: &str) -> f64 {
    let lower = title.to_lowercase();
    if lower.contains("senior") || lower.contains("lead") {
        130_000.0
    } else if lower.contains("junior") || lower.contains("entry") {
        70_000.0
    } else if lower.contains("data scientist") {
        115_000.0
    } else if lower.contains("manager") {
        140_000.0
    } else {
        95_000.0
    }
}

fn location_multiplier(location: &str) -> f64 {
    let lower = location.to_lowercase();
    [
        ("san francisco", 1.4),
        ("new york", 1.3),
        ("seattle", 1.2),
        ("boston", 1.15),
        ("austin", 1.05),
    ]
    .iter()
    .find(|(city, _)| lower.contains(city))
    .map_or(1.0, |(_, m)| *m)
}

/// Deterministic estimate from title keywords and location.
pub fn static_salary(title: &str, location: &str) -> SalaryInsight {
    let base = base_salary(title) * location_multiplier(location);
    SalaryInsight {
        job_title: title.to_string(),
        location: display_location(location),
        currency: "USD".to_string(),
        entry: SalaryBand::scaled(base, [0.6, 0.7, 0.8]),
        mid: SalaryBand::scaled(base, [0.8, 1.0, 1.2]),
        senior: SalaryBand::scaled(base, [1.2, 1.5, 1.8]),
        factors: strings(&["Experience level", "Location", "Company size"]),
        trending_skills: strings(&["Python", "Cloud", "AI/ML", "DevOps"]),
        market_outlook: "Growing".to_string(),
        note: Some("Fallback estimate".to_string()),
        source: SourceTag::tier_only(Tier::StaticFallback),
    }
}

const TECHNOLOGY_SKILLS: &[&str] = &[
    "Artificial Intelligence",
    "Machine Learning",
    "Cloud Computing",
    "Cybersecurity",
    "Data Science",
    "DevOps",
    "Kubernetes",
    "React",
    "Python",
    "Blockchain",
    "IoT",
    "Microservices",
];

const MARKETING_SKILLS: &[&str] = &[
    "Digital Marketing",
    "Content Strategy",
    "Social Media Marketing",
    "SEO/SEM",
    "Marketing Analytics",
    "Growth Hacking",
    "Email Marketing",
    "Influencer Marketing",
    "Marketing Automation",
];

const FINANCE_SKILLS: &[&str] = &[
    "Financial Analysis",
    "Risk Management",
    "Fintech",
    "Cryptocurrency",
    "ESG Investing",
    "Robo-Advisory",
    "Regulatory Compliance",
    "Financial Modeling",
    "Investment Banking",
];

const HEALTHCARE_SKILLS: &[&str] = &[
    "Telemedicine",
    "Health Informatics",
    "Medical AI",
    "Clinical Research",
    "Healthcare Analytics",
    "Digital Health",
    "Biotechnology",
    "Medical Device Development",
    "Genomics",
];

/// Industry skill list (technology when unknown), extended by the first
/// matching keyword family and capped.
pub fn static_skills(industry: &str, keywords: &str) -> Vec<String> {
    let base = match industry.trim().to_lowercase().as_str() {
        "marketing" => MARKETING_SKILLS,
        "finance" => FINANCE_SKILLS,
        "healthcare" => HEALTHCARE_SKILLS,
        _ => TECHNOLOGY_SKILLS,
    };

    let lower = keywords.to_lowercase();
    let extra: &[&str] = if lower.contains("data") {
        &["Pandas", "NumPy", "TensorFlow", "Jupyter"]
    } else if lower.contains("web") {
        &["HTML", "CSS", "Bootstrap", "REST APIs"]
    } else if lower.contains("mobile") {
        &["React Native", "Flutter", "Swift", "Kotlin"]
    } else {
        &[]
    };

    let mut out: Vec<String> = Vec::with_capacity(MAX_TRENDING_SKILLS);
    for skill in base.iter().chain(extra) {
        if out.len() == MAX_TRENDING_SKILLS {
            break;
        }
        if !out.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            out.push((*skill).to_string());
        }
    }
    out
}

pub fn static_company(name: &str) -> CompanyInfo {
    let company_name = match name.trim() {
        "" => DEFAULT_COMPANY,
        n => n,
    };
    CompanyInfo {
        company_name: company_name.to_string(),
        industry: DEFAULT_INDUSTRY.to_string(),
        size: CompanySize::Medium.to_string(),
        founded_year: Some(2015),
        location: "San Francisco, CA".to_string(),
        culture: strings(&["Innovation", "Collaboration", "Growth"]),
        benefits: strings(&["Health insurance", "Remote work", "Learning budget"]),
        tech_stack: strings(&["Python", "React", "AWS"]),
        growth_stage: "Growing".to_string(),
        rating: Some(4.0),
        notable_for: "Innovative technology solutions".to_string(),
        source: SourceTag::tier_only(Tier::StaticFallback),
    }
}

pub fn static_trends(industry: &str) -> MarketTrends {
    let industry = match industry.trim() {
        "" => "technology".to_string(),
        i => i.to_lowercase(),
    };
    MarketTrends {
        industry,
        hot_roles: strings(&["AI Engineer", "DevOps Engineer", "Full Stack Developer"]),
        emerging_skills: strings(&["AI/ML", "Cloud Computing", "Cybersecurity"]),
        salary_trends: "Increasing".to_string(),
        remote_work_trend: "High adoption".to_string(),
        hiring_outlook: "Strong".to_string(),
        key_trends: strings(&[
            "AI and machine learning integration",
            "Remote-first work culture",
            "Cloud-native development",
        ]),
        growth_areas: strings(&["AI/ML", "Cloud", "Cybersecurity"]),
        competitive_factors: strings(&["Technical skills", "Experience"]),
        source: SourceTag::tier_only(Tier::StaticFallback),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
