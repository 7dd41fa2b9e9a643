use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use scout_client::build_orchestrator;
use scout_core::config::ScoutConfig;
use scout_core::models::{CompanySize, EmploymentType};
use scout_core::query::{DEFAULT_LIMIT, ExperienceLevel, JobQuery};

#[derive(Parser)]
#[command(name = "scout", version, about = "Job search that never comes back empty")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search job listings across the configured sources
    Jobs {
        /// Search phrase (e.g. "rust developer")
        #[arg(short, long)]
        keywords: String,

        /// Location filter
        #[arg(short, long, default_value = "")]
        location: String,

        /// Entry, Mid, Senior or Executive
        #[arg(short, long, value_parser = parse_experience)]
        experience: Option<ExperienceLevel>,

        /// Startup, Small, Medium, Large or Enterprise
        #[arg(long, value_parser = parse_company_size)]
        company_size: Option<CompanySize>,

        /// Full-time, Part-time, Contract, Temporary or Internship
        #[arg(long, value_parser = parse_employment_type)]
        employment_type: Option<EmploymentType>,

        /// Only remote positions
        #[arg(long, default_value_t = false)]
        remote: bool,

        /// Number of results (1-50)
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,

        /// Query every source and merge the results
        #[arg(long, default_value_t = false)]
        aggregate: bool,
    },

    /// Salary bands for a job title
    Salary {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        location: String,
    },

    /// Trending skills for an industry
    Skills {
        #[arg(short, long, default_value = "technology")]
        industry: String,

        /// Keywords that widen the list (e.g. "data", "mobile")
        #[arg(short, long, default_value = "")]
        keywords: String,
    },

    /// Company profile
    Company {
        #[arg(short, long)]
        name: String,
    },

    /// Hiring-market trends for an industry
    Trends {
        #[arg(short, long, default_value = "technology")]
        industry: String,
    },
}

fn parse_experience(raw: &str) -> Result<ExperienceLevel, String> {
    ExperienceLevel::parse_loose(raw).ok_or_else(|| format!("unknown experience level '{raw}'"))
}

fn parse_company_size(raw: &str) -> Result<CompanySize, String> {
    CompanySize::parse_loose(raw).ok_or_else(|| format!("unknown company size '{raw}'"))
}

fn parse_employment_type(raw: &str) -> Result<EmploymentType, String> {
    EmploymentType::parse_loose(raw).ok_or_else(|| format!("unknown employment type '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr; stdout carries only JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = ScoutConfig::from_env().context("Invalid configuration")?;
    let orchestrator =
        build_orchestrator(&config).context("Failed to set up job sources")?;

    match cli.command {
        Commands::Jobs {
            keywords,
            location,
            experience,
            company_size,
            employment_type,
            remote,
            limit,
            aggregate,
        } => {
            let mut query = JobQuery::new(keywords)
                .with_location(location)
                .with_remote(remote)
                .with_limit(limit);
            if let Some(level) = experience {
                query = query.with_experience_level(level);
            }
            if let Some(size) = company_size {
                query = query.with_company_size(size);
            }
            if let Some(kind) = employment_type {
                query = query.with_employment_type(kind);
            }

            let jobs = if aggregate {
                orchestrator.aggregate_jobs(&query).await
            } else {
                orchestrator.search_jobs(&query).await
            };
            let fallback = jobs.iter().filter(|j| j.source.is_fallback()).count();
            tracing::info!(total = jobs.len(), fallback, "Jobs served");
            print_json(&jobs)?;
        }
        Commands::Salary { title, location } => {
            print_json(&orchestrator.get_salary_insights(&title, &location).await)?;
        }
        Commands::Skills { industry, keywords } => {
            print_json(&orchestrator.get_trending_skills(&industry, &keywords).await)?;
        }
        Commands::Company { name } => {
            print_json(&orchestrator.get_company_insights(&name).await)?;
        }
        Commands::Trends { industry } => {
            print_json(&orchestrator.get_market_trends(&industry).await)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{output}");
    Ok(())
}
