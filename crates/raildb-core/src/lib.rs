//! # RailDB Core
//!
//! Pure, synchronous logic for RailDB.
//!
//! - [`fragility`]: lognormal fragility calculator, formatter and equation catalog
//! - [`grade`]: grade records and validation
//! - [`analytics`]: aggregations over grade records
//! - [`formats`]: grade import payloads
//! - [`storage`]: redb-backed grade store
//!
//! Nothing here is async or knows about HTTP. The app crate maps these
//! errors to status codes.

pub mod analytics;
pub mod formats;
pub mod fragility;
pub mod grade;
pub mod storage;

pub use analytics::{
    AnalysisReport, GradeBucket, GradeSummary, PerfectScore, StudentStats, TestStats, YearBreakdown,
    YearlyStats,
};
pub use formats::{ImportError, ImportReport, parse_import};
pub use fragility::{
    DEFAULT_DAMAGE_STATE, FragilityError, FragilityInput, FragilityReport, FragilityResult,
    calculate, compute_fragility,
};
pub use grade::{GradeError, GradeFilter, GradeKey, GradeRecord, GradeUpdate, NewGrade, Page};
pub use storage::{GradeStore, StoreError, UpsertOutcome};
