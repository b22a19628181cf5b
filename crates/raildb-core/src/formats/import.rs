//! Grade import payload.
//!
//! The payload is a JSON array of objects with `AEM`, `Test`, `Grade` and
//! `Year` keys. Exported files wrap the array in a JavaScript declaration
//! (`const grades = [...];`), so anything before the first `[` and a
//! trailing `;` are ignored.

use crate::grade::{GradeError, NewGrade};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from [`parse_import`].
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("no JSON array found in import payload")]
    MissingArray,

    #[error("malformed import payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record {index}: {source}")]
    InvalidRecord {
        index: usize,
        source: serde_json::Error,
    },

    #[error("record {index}: {source}")]
    InvalidGrade { index: usize, source: GradeError },
}

/// One record as it appears in the payload.
#[derive(Debug, Clone, Deserialize)]
struct ImportRecord {
    #[serde(rename = "AEM")]
    aem: u32,
    #[serde(rename = "Test")]
    test: String,
    #[serde(rename = "Grade")]
    grade: f64,
    #[serde(rename = "Year")]
    year: i32,
}

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub updated: usize,
    pub total: usize,
}

impl ImportReport {
    /// Count one upserted record.
    pub fn record(&mut self, created: bool) {
        if created {
            self.inserted += 1;
        } else {
            self.updated += 1;
        }
        self.total += 1;
    }
}

/// Strip the optional JavaScript wrapper around the array.
fn extract_array(content: &str) -> Result<&str, ImportError> {
    let start = content.find('[').ok_or(ImportError::MissingArray)?;
    let body = content[start..].trim_end();
    Ok(body.strip_suffix(';').unwrap_or(body).trim_end())
}

/// Parse and validate an import payload.
///
/// Stops at the first invalid record and reports its zero-based index.
pub fn parse_import(content: &str) -> Result<Vec<NewGrade>, ImportError> {
    let array = extract_array(content)?;
    let values: Vec<serde_json::Value> = serde_json::from_str(array)?;

    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let record: ImportRecord = serde_json::from_value(value)
                .map_err(|source| ImportError::InvalidRecord { index, source })?;
            NewGrade::new(record.aem, &record.test, record.grade, record.year)
                .map_err(|source| ImportError::InvalidGrade { index, source })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_array() {
        let grades = parse_import(r#"[{"AEM": 6609, "Test": "Test 1", "Grade": 7.5, "Year": 2024}]"#);
        let grades = grades.unwrap_or_default();
        assert_eq!(grades.len(), 1);
        assert_eq!(grades[0].aem, 6609);
        assert_eq!(grades[0].test, "Test 1");
        assert_eq!(grades[0].grade, 7.5);
        assert_eq!(grades[0].year, 2024);
    }

    #[test]
    fn strips_javascript_declaration() {
        let content = "const betongrades = [\n  {\"AEM\": 1, \"Test\": \"Test 2\", \"Grade\": 10, \"Year\": 2023},\n  {\"AEM\": 2, \"Test\": \"Test 2\", \"Grade\": 4.25, \"Year\": 2023}\n];\n";
        let grades = parse_import(content).unwrap_or_default();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].grade, 10.0);
    }

    #[test]
    fn missing_array_is_rejected() {
        assert!(matches!(
            parse_import("const grades = {};"),
            Err(ImportError::MissingArray)
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(parse_import("[{"), Err(ImportError::Json(_))));
    }

    #[test]
    fn invalid_record_reports_index() {
        let content = r#"[
            {"AEM": 1, "Test": "Test 1", "Grade": 5.0, "Year": 2024},
            {"AEM": 2, "Test": "Test 1", "Year": 2024}
        ]"#;
        assert!(matches!(
            parse_import(content),
            Err(ImportError::InvalidRecord { index: 1, .. })
        ));

        let content = r#"[{"AEM": 1, "Test": "Test 1", "Grade": 11.0, "Year": 2024}]"#;
        assert!(matches!(
            parse_import(content),
            Err(ImportError::InvalidGrade {
                index: 0,
                source: GradeError::OutOfRange(_)
            })
        ));
    }

    #[test]
    fn report_counts_outcomes() {
        let mut report = ImportReport::default();
        report.record(true);
        report.record(false);
        report.record(true);
        assert_eq!(
            report,
            ImportReport {
                inserted: 2,
                updated: 1,
                total: 3
            }
        );
    }
}
