//! Non-listing results: salary bands, company profiles and market trends.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::SourceTag;

/// Plausible annual salary range in currency units; anything outside is
/// treated as parsing garbage.
pub const SALARY_FLOOR: u32 = 20_000;
pub const SALARY_CEILING: u32 = 2_000_000;

/// One seniority band. Construct through [`SalaryBand::new`] so that
/// `min <= median <= max` and the plausibility range always hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalaryBand {
    min: u32,
    median: u32,
    max: u32,
}

impl SalaryBand {
    pub fn new(min: u32, median: u32, max: u32) -> Result<Self, AppError> {
        for value in [min, median, max] {
            if !(SALARY_FLOOR..=SALARY_CEILING).contains(&value) {
                return Err(AppError::ParseError(format!(
                    "salary value {value} outside plausible range"
                )));
            }
        }
        if !(min <= median && median <= max) {
            return Err(AppError::ParseError(format!(
                "salary band out of order: {min}/{median}/{max}"
            )));
        }
        Ok(Self { min, median, max })
    }

    /// Band scaled from a base salary. Values are clamped into the
    /// plausible range and ordered, so the result is always valid.
    pub(crate) fn scaled(base: f64, factors: [f64; 3]) -> Self {
        let mut values = factors.map(|f| {
            let v = (base * f).round();
            v.clamp(f64::from(SALARY_FLOOR), f64::from(SALARY_CEILING)) as u32
        });
        values.sort_unstable();
        let [min, median, max] = values;
        Self { min, median, max }
    }

    pub fn min(&self) -> u32 {
        self.min
    }

    pub fn median(&self) -> u32 {
        self.median
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

#[derive(Deserialize)]
struct RawBand {
    #[serde(alias = "min_salary")]
    min: f64,
    #[serde(alias = "median_salary")]
    median: f64,
    #[serde(alias = "max_salary")]
    max: f64,
}

impl<'de> Deserialize<'de> for SalaryBand {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawBand::deserialize(deserializer)?;
        let to_units = |v: f64| -> Result<u32, D::Error> {
            if v.is_finite() && v >= 0.0 && v <= f64::from(u32::MAX) {
                Ok(v.round() as u32)
            } else {
                Err(serde::de::Error::custom(format!("invalid salary value {v}")))
            }
        };
        SalaryBand::new(to_units(raw.min)?, to_units(raw.median)?, to_units(raw.max)?)
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryInsight {
    pub job_title: String,
    pub location: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(alias = "entry_level")]
    pub entry: SalaryBand,
    #[serde(alias = "mid_level")]
    pub mid: SalaryBand,
    #[serde(alias = "senior_level")]
    pub senior: SalaryBand,
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub trending_skills: Vec<String>,
    #[serde(default)]
    pub market_outlook: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(skip_deserializing, default = "unknown_source")]
    pub source: SourceTag,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn unknown_source() -> SourceTag {
    SourceTag::tier_only(crate::models::Tier::AiGenerated)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub company_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub founded_year: Option<u16>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub culture: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub growth_stage: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub notable_for: String,
    #[serde(skip_deserializing, default = "unknown_source")]
    pub source: SourceTag,
}

impl CompanyInfo {
    /// Reject profiles with no name or an impossible rating.
    pub fn validate(self) -> Result<Self, AppError> {
        if self.company_name.trim().is_empty() {
            return Err(AppError::ParseError("company profile without a name".into()));
        }
        if let Some(rating) = self.rating
            && !(0.0..=5.0).contains(&rating)
        {
            return Err(AppError::ParseError(format!("rating {rating} outside 0-5")));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrends {
    pub industry: String,
    #[serde(default)]
    pub hot_roles: Vec<String>,
    #[serde(default)]
    pub emerging_skills: Vec<String>,
    #[serde(default)]
    pub salary_trends: String,
    #[serde(default)]
    pub remote_work_trend: String,
    #[serde(default)]
    pub hiring_outlook: String,
    #[serde(default)]
    pub key_trends: Vec<String>,
    #[serde(default)]
    pub growth_areas: Vec<String>,
    #[serde(default)]
    pub competitive_factors: Vec<String>,
    #[serde(skip_deserializing, default = "unknown_source")]
    pub source: SourceTag,
}

impl MarketTrends {
    pub fn validate(self) -> Result<Self, AppError> {
        if self.hot_roles.is_empty() && self.emerging_skills.is_empty() {
            return Err(AppError::ParseError("market trends without content".into()));
        }
        Ok(self)
    }
}
