//! # Grade Records
//!
//! Typed records for the `student_grades` table.
//!
//! Rows are decoded into [`GradeRecord`] once, at the storage boundary.
//! Everything downstream (analytics, HTTP, CLI) works on these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lowest valid grade.
pub const MIN_GRADE: f64 = 0.0;

/// Highest valid grade.
pub const MAX_GRADE: f64 = 10.0;

/// Grades at or above this value pass.
pub const PASS_THRESHOLD: f64 = 5.0;

/// Maximum length of a test name.
pub const MAX_TEST_NAME_LEN: usize = 50;

/// Default page size for grade listings.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: usize = 1000;

// =============================================================================
// ERRORS
// =============================================================================

/// Validation failures for grade input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeError {
    #[error("grade {0} out of range 0..=10")]
    OutOfRange(f64),

    #[error("test name must not be empty")]
    EmptyTestName,

    #[error("test name exceeds 50 characters")]
    TestNameTooLong,

    #[error("limit {0} exceeds maximum of 1000")]
    LimitTooLarge(usize),
}

/// Check a grade value lies in `[0, 10]`.
pub fn validate_grade(grade: f64) -> Result<f64, GradeError> {
    if (MIN_GRADE..=MAX_GRADE).contains(&grade) {
        Ok(grade)
    } else {
        Err(GradeError::OutOfRange(grade))
    }
}

fn validate_test_name(test: &str) -> Result<String, GradeError> {
    let trimmed = test.trim();
    if trimmed.is_empty() {
        return Err(GradeError::EmptyTestName);
    }
    if trimmed.chars().count() > MAX_TEST_NAME_LEN {
        return Err(GradeError::TestNameTooLong);
    }
    Ok(trimmed.to_string())
}

/// `true` when the grade meets the pass threshold.
#[must_use]
pub fn is_passing(grade: f64) -> bool {
    grade >= PASS_THRESHOLD
}

// =============================================================================
// RECORDS
// =============================================================================

/// A stored grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub id: u64,
    pub aem: u32,
    pub test: String,
    pub grade: f64,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Natural key: one grade per student, test and year.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GradeKey {
    pub aem: u32,
    pub test: String,
    pub year: i32,
}

impl GradeKey {
    /// Build a key. The test name is trimmed the same way [`NewGrade::new`]
    /// trims it, so keys from paths match stored records.
    #[must_use]
    pub fn new(aem: u32, test: impl Into<String>, year: i32) -> Self {
        let mut test = test.into();
        let trimmed = test.trim();
        if trimmed.len() != test.len() {
            test = trimmed.to_string();
        }
        Self { aem, test, year }
    }
}

impl std::fmt::Display for GradeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "student {}, test {}, year {}",
            self.aem, self.test, self.year
        )
    }
}

/// Write model for creating (or overwriting) a grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGrade {
    pub aem: u32,
    pub test: String,
    pub grade: f64,
    pub year: i32,
}

impl NewGrade {
    /// Validate and normalize a new grade. The test name is trimmed.
    pub fn new(aem: u32, test: &str, grade: f64, year: i32) -> Result<Self, GradeError> {
        Ok(Self {
            aem,
            test: validate_test_name(test)?,
            grade: validate_grade(grade)?,
            year,
        })
    }

    /// Re-run validation on a deserialized value.
    pub fn validated(self) -> Result<Self, GradeError> {
        Self::new(self.aem, &self.test, self.grade, self.year)
    }

    /// Natural key of the record this grade writes.
    #[must_use]
    pub fn key(&self) -> GradeKey {
        GradeKey::new(self.aem, self.test.clone(), self.year)
    }
}

/// Patch model for an existing grade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeUpdate {
    #[serde(default)]
    pub grade: Option<f64>,
}

// =============================================================================
// LISTING
// =============================================================================

/// Optional equality filters for listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradeFilter {
    pub aem: Option<u32>,
    pub test: Option<String>,
    pub year: Option<i32>,
}

impl GradeFilter {
    /// Build a filter; the test name is trimmed and a blank one is ignored.
    #[must_use]
    pub fn new(aem: Option<u32>, test: Option<&str>, year: Option<i32>) -> Self {
        Self {
            aem,
            test: test
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            year,
        }
    }

    /// Check whether a record passes every set filter.
    #[must_use]
    pub fn matches(&self, record: &GradeRecord) -> bool {
        self.aem.is_none_or(|aem| record.aem == aem)
            && self.test.as_deref().is_none_or(|test| record.test == test)
            && self.year.is_none_or(|year| record.year == year)
    }
}

/// Limit/offset pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    /// Build a page, rejecting limits above [`MAX_PAGE_LIMIT`].
    pub fn new(limit: usize, offset: usize) -> Result<Self, GradeError> {
        if limit > MAX_PAGE_LIMIT {
            return Err(GradeError::LimitTooLarge(limit));
        }
        Ok(Self { limit, offset })
    }
}

/// Listing order: newest year first, then student, then test.
pub fn listing_order(a: &GradeRecord, b: &GradeRecord) -> std::cmp::Ordering {
    b.year
        .cmp(&a.year)
        .then_with(|| a.aem.cmp(&b.aem))
        .then_with(|| a.test.cmp(&b.test))
}

// =============================================================================
// TESTS
// =============================================================================
