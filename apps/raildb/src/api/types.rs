//! Request and response bodies of the HTTP API.

use super::error::ApiError;
use raildb_core::analytics::{PerfectScore, StudentStats};
use raildb_core::fragility::{DEFAULT_DAMAGE_STATE, ScenarioOutcome, VariableMap};
use raildb_core::grade::{DEFAULT_PAGE_LIMIT, GradeFilter, Page};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ENVELOPES
// =============================================================================

/// Success envelope for mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }
}

/// Error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

// =============================================================================
// SYSTEM
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub records: u64,
    pub timestamp: String,
}

// =============================================================================
// STUDENTS
// =============================================================================

/// Query of `GET /students/grades`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeQuery {
    pub aem: Option<u32>,
    pub test: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl GradeQuery {
    /// Split into a filter and a validated page.
    pub fn into_parts(self) -> Result<(GradeFilter, Page), ApiError> {
        let page = Page::new(
            self.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
            self.offset.unwrap_or(0),
        )?;
        let filter = GradeFilter::new(self.aem, self.test.as_deref(), self.year);
        Ok((filter, page))
    }
}

/// Query of `GET /students/stats`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    pub limit: Option<usize>,
    pub min_tests: Option<usize>,
}

pub const STATS_DEFAULT_LIMIT: usize = 50;
pub const STATS_MAX_LIMIT: usize = 100;

impl StatsQuery {
    /// `(limit, min_tests)` after range checks.
    pub fn validated(&self) -> Result<(usize, usize), ApiError> {
        let limit = bounded_limit(self.limit, STATS_DEFAULT_LIMIT, STATS_MAX_LIMIT)?;
        let min_tests = self.min_tests.unwrap_or(1);
        if min_tests < 1 {
            return Err(ApiError::BadRequest(
                "min_tests must be at least 1".to_string(),
            ));
        }
        Ok((limit, min_tests))
    }
}

/// Query of `GET /analytics/top-students`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopStudentsQuery {
    pub limit: Option<usize>,
}

pub const TOP_DEFAULT_LIMIT: usize = 10;
pub const TOP_MAX_LIMIT: usize = 50;

impl TopStudentsQuery {
    pub fn validated(&self) -> Result<usize, ApiError> {
        bounded_limit(self.limit, TOP_DEFAULT_LIMIT, TOP_MAX_LIMIT)
    }
}

fn bounded_limit(limit: Option<usize>, default: usize, max: usize) -> Result<usize, ApiError> {
    match limit {
        None => Ok(default),
        Some(limit) if limit <= max => Ok(limit),
        Some(limit) => Err(ApiError::BadRequest(format!(
            "limit {limit} exceeds maximum of {max}"
        ))),
    }
}

// =============================================================================
// ANALYTICS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopStudentsResponse {
    pub top_students: Vec<StudentStats>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerfectScoresResponse {
    pub total_perfect_scores: usize,
    pub perfect_scores: Vec<PerfectScore>,
}

// =============================================================================
// FRAGILITY
// =============================================================================

/// Fragility curve parameters, as query string or JSON body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragilityParameters {
    pub pga: f64,
    pub pga_mean: f64,
    pub beta: f64,
    #[serde(default = "default_damage_state")]
    pub damage_state: String,
}

fn default_damage_state() -> String {
    DEFAULT_DAMAGE_STATE.to_string()
}

/// A reference equation evaluated for concrete parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterizedEquation {
    pub name: String,
    pub category: String,
    pub latex: String,
    pub description: Option<String>,
    pub variables: Option<VariableMap>,
    pub parameters: BTreeMap<String, f64>,
    pub latex_with_values: String,
    pub numerical_result: f64,
}

/// One entry of `GET /latex/fragility/examples`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleEntry {
    Evaluated {
        scenario: String,
        parameters: BTreeMap<String, f64>,
        probability: f64,
        percentage: String,
        latex: String,
    },
    Failed {
        scenario: String,
        error: String,
    },
}

impl From<ScenarioOutcome> for ExampleEntry {
    fn from(outcome: ScenarioOutcome) -> Self {
        let s = outcome.scenario;
        Self::Evaluated {
            scenario: s.name.to_string(),
            parameters: BTreeMap::from([
                ("PGA".to_string(), s.pga),
                ("PGA_mean".to_string(), s.pga_mean),
                ("beta".to_string(), s.beta),
            ]),
            probability: (outcome.result.probability * 10_000.0).round() / 10_000.0,
            percentage: outcome.percentage,
            latex: outcome.latex,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamplesResponse {
    pub description: String,
    pub base_equation: String,
    pub examples: Vec<ExampleEntry>,
}
