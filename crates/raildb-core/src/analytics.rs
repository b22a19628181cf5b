//! # Grade Analytics
//!
//! Aggregations over typed grade records.
//!
//! Rounding follows the reports the service has always produced:
//! averages, minimums and maximums to 2 decimals, distribution
//! percentages to 1 decimal, pass rates unrounded.

use crate::grade::{GradeRecord, MAX_GRADE, is_passing};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Students need at least this many tests to appear in the top list.
pub const TOP_STUDENT_MIN_TESTS: usize = 3;

/// Length of the top-student list in the analysis report.
pub const REPORT_TOP_STUDENTS: usize = 10;

/// Perfect scores listed individually in the text report.
pub const REPORT_PERFECT_SCORES: usize = 10;

// =============================================================================
// RECORD TYPES
// =============================================================================

/// Per-student aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStats {
    pub aem: u32,
    pub total_tests: usize,
    pub average_grade: f64,
    pub min_grade: f64,
    pub max_grade: f64,
}

/// Per-test aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStats {
    pub test: String,
    pub total_attempts: usize,
    pub average_grade: f64,
    /// Attempts with grade >= 5.0.
    pub passing_count: usize,
    /// Percentage of attempts with grade >= 5.0.
    pub pass_rate: f64,
    pub min_grade: f64,
    pub max_grade: f64,
    pub std_dev: f64,
}

/// Per-year aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyStats {
    pub year: i32,
    pub total_records: usize,
    pub unique_students: usize,
    pub average_grade: f64,
    pub std_dev: f64,
}

/// One bucket of the grade histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBucket {
    pub grade_range: String,
    pub count: usize,
    pub percentage: f64,
}

/// A grade of exactly 10.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfectScore {
    pub aem: u32,
    pub test: String,
    pub year: i32,
    pub grade: f64,
}

/// Whole-table summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSummary {
    pub total_records: usize,
    pub unique_students: usize,
    /// `"<min year>-<max year>"`.
    pub years_covered: String,
    pub available_tests: Vec<String>,
    pub average_grade: f64,
    pub min_grade: f64,
    pub max_grade: f64,
    pub std_dev: f64,
    pub median: f64,
    pub percentile_25: f64,
    pub percentile_75: f64,
}

// =============================================================================
// HELPERS
// =============================================================================

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Running min/max/sum over grades.
#[derive(Debug, Clone)]
struct Accumulator {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
    passing: usize,
    grades: Vec<f64>,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            passing: 0,
            grades: Vec::new(),
        }
    }
}

impl Accumulator {
    fn push(&mut self, grade: f64) {
        self.count += 1;
        self.sum += grade;
        self.grades.push(grade);
        self.min = self.min.min(grade);
        self.max = self.max.max(grade);
        if is_passing(grade) {
            self.passing += 1;
        }
    }

    fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    fn std_dev(&self) -> f64 {
        sample_std_dev(&self.grades)
    }

    fn into_test_stats(self, test: &str) -> TestStats {
        TestStats {
            test: test.to_string(),
            total_attempts: self.count,
            average_grade: round_to(self.average(), 2),
            passing_count: self.passing,
            pass_rate: self.passing as f64 * 100.0 / self.count as f64,
            min_grade: round_to(self.min, 2),
            max_grade: round_to(self.max, 2),
            std_dev: round_to(self.std_dev(), 2),
        }
    }
}

/// Linear interpolation between closest ranks over sorted values.
///
/// `fraction` is clamped to `[0, 1]`. Returns `None` for an empty slice.
#[must_use]
pub fn percentile(sorted: &[f64], fraction: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let position = fraction.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Sample standard deviation; `0.0` with fewer than two values.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (squares / (n - 1.0)).sqrt()
}

// =============================================================================
// AGGREGATIONS
// =============================================================================

/// Whole-table summary, `None` when there are no records.
#[must_use]
pub fn summary(records: &[GradeRecord]) -> Option<GradeSummary> {
    let min_year = records.iter().map(|r| r.year).min()?;
    let max_year = records.iter().map(|r| r.year).max()?;

    let mut acc = Accumulator::default();
    let mut students = BTreeSet::new();
    let mut tests = BTreeSet::new();
    let mut grades = Vec::with_capacity(records.len());

    for record in records {
        acc.push(record.grade);
        students.insert(record.aem);
        tests.insert(record.test.clone());
        grades.push(record.grade);
    }
    grades.sort_by(f64::total_cmp);

    Some(GradeSummary {
        total_records: records.len(),
        unique_students: students.len(),
        years_covered: format!("{min_year}-{max_year}"),
        available_tests: tests.into_iter().collect(),
        average_grade: round_to(acc.average(), 2),
        min_grade: round_to(acc.min, 2),
        max_grade: round_to(acc.max, 2),
        std_dev: round_to(sample_std_dev(&grades), 2),
        median: round_to(percentile(&grades, 0.5)?, 2),
        percentile_25: round_to(percentile(&grades, 0.25)?, 2),
        percentile_75: round_to(percentile(&grades, 0.75)?, 2),
    })
}

/// Per-student statistics for students with at least `min_tests` grades,
/// best average first, at most `limit` entries.
#[must_use]
pub fn student_stats(records: &[GradeRecord], limit: usize, min_tests: usize) -> Vec<StudentStats> {
    let mut by_student: BTreeMap<u32, Accumulator> = BTreeMap::new();
    for record in records {
        by_student.entry(record.aem).or_default().push(record.grade);
    }

    let mut stats: Vec<StudentStats> = by_student
        .into_iter()
        .filter(|(_, acc)| acc.count >= min_tests)
        .map(|(aem, acc)| StudentStats {
            aem,
            total_tests: acc.count,
            average_grade: round_to(acc.average(), 2),
            min_grade: round_to(acc.min, 2),
            max_grade: round_to(acc.max, 2),
        })
        .collect();

    // Stable sort keeps ascending aem among equal averages.
    stats.sort_by(|a, b| b.average_grade.total_cmp(&a.average_grade));
    stats.truncate(limit);
    stats
}

/// Best students with at least [`TOP_STUDENT_MIN_TESTS`] grades.
#[must_use]
pub fn top_students(records: &[GradeRecord], limit: usize) -> Vec<StudentStats> {
    student_stats(records, limit, TOP_STUDENT_MIN_TESTS)
}

fn group_by_test<'a>(records: impl Iterator<Item = &'a GradeRecord>) -> Vec<TestStats> {
    let mut by_test: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in records {
        by_test
            .entry(record.test.as_str())
            .or_default()
            .push(record.grade);
    }

    by_test
        .into_iter()
        .map(|(test, acc)| acc.into_test_stats(test))
        .collect()
}

/// Per-test statistics, easiest test (highest average) first.
#[must_use]
pub fn test_stats(records: &[GradeRecord]) -> Vec<TestStats> {
    let mut stats = group_by_test(records.iter());
    stats.sort_by(|a, b| b.average_grade.total_cmp(&a.average_grade));
    stats
}

/// Per-test statistics restricted to one year, ordered by test name.
#[must_use]
pub fn test_stats_for_year(records: &[GradeRecord], year: i32) -> Vec<TestStats> {
    group_by_test(records.iter().filter(|r| r.year == year))
}

/// Per-year statistics, most recent year first.
#[must_use]
pub fn yearly_stats(records: &[GradeRecord]) -> Vec<YearlyStats> {
    let mut by_year: BTreeMap<i32, (Accumulator, BTreeSet<u32>)> = BTreeMap::new();
    for record in records {
        let (acc, students) = by_year.entry(record.year).or_default();
        acc.push(record.grade);
        students.insert(record.aem);
    }

    by_year
        .into_iter()
        .rev()
        .map(|(year, (acc, students))| YearlyStats {
            year,
            total_records: acc.count,
            unique_students: students.len(),
            average_grade: round_to(acc.average(), 2),
            std_dev: round_to(acc.std_dev(), 2),
        })
        .collect()
}

// =============================================================================
// DISTRIBUTION
// =============================================================================

/// Histogram labels; bucket `i` covers `[i, i+1)`, the last one `[9, 10]`.
pub const BUCKET_LABELS: [&str; 10] = [
    "0.0-0.9",
    "1.0-1.9",
    "2.0-2.9",
    "3.0-3.9",
    "4.0-4.9 (Fail)",
    "5.0-5.9 (Pass)",
    "6.0-6.9",
    "7.0-7.9",
    "8.0-8.9",
    "9.0-10.0 (Excellent)",
];

/// Bucket index for a grade. Edges sit at every integer grade; 10.0 shares
/// the top bucket with the 9s.
#[must_use]
pub fn bucket_index(grade: f64) -> usize {
    let last = BUCKET_LABELS.len() - 1;
    if grade <= 0.0 {
        0
    } else {
        (grade.floor() as usize).min(last)
    }
}

/// Grade histogram. Empty buckets are omitted; order is ascending grade.
#[must_use]
pub fn grade_distribution(records: &[GradeRecord]) -> Vec<GradeBucket> {
    let mut counts = [0usize; BUCKET_LABELS.len()];
    for record in records {
        counts[bucket_index(record.grade)] += 1;
    }

    let total = records.len();
    counts
        .iter()
        .zip(BUCKET_LABELS)
        .filter(|(count, _)| **count > 0)
        .map(|(&count, label)| GradeBucket {
            grade_range: label.to_string(),
            count,
            percentage: round_to(count as f64 * 100.0 / total as f64, 1),
        })
        .collect()
}

/// Every perfect score, most recent year first, then student and test.
#[must_use]
pub fn perfect_scores(records: &[GradeRecord]) -> Vec<PerfectScore> {
    let mut perfect: Vec<&GradeRecord> = records.iter().filter(|r| r.grade >= MAX_GRADE).collect();
    perfect.sort_by(|a, b| crate::grade::listing_order(a, b));
    perfect
        .into_iter()
        .map(|r| PerfectScore {
            aem: r.aem,
            test: r.test.clone(),
            year: r.year,
            grade: r.grade,
        })
        .collect()
}

// =============================================================================
// ANALYSIS REPORT
// =============================================================================

/// Per-test results of a single year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearBreakdown {
    pub year: i32,
    pub tests: Vec<TestStats>,
}

/// Everything the `summary` command reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: GradeSummary,
    pub top_students: Vec<StudentStats>,
    pub yearly_stats: Vec<YearlyStats>,
    pub test_stats: Vec<TestStats>,
    pub grade_distribution: Vec<GradeBucket>,
    pub perfect_scores: Vec<PerfectScore>,
    pub year_breakdown: YearBreakdown,
}

/// Full analysis of the table, `None` when there are no records.
///
/// The per-test breakdown covers `year`, or the most recent year on
/// record when none is given.
#[must_use]
pub fn analysis_report(records: &[GradeRecord], year: Option<i32>) -> Option<AnalysisReport> {
    let summary = summary(records)?;
    let year = match year {
        Some(year) => year,
        None => records.iter().map(|r| r.year).max()?,
    };

    Some(AnalysisReport {
        summary,
        top_students: top_students(records, REPORT_TOP_STUDENTS),
        yearly_stats: yearly_stats(records),
        test_stats: test_stats(records),
        grade_distribution: grade_distribution(records),
        perfect_scores: perfect_scores(records),
        year_breakdown: YearBreakdown {
            year,
            tests: test_stats_for_year(records, year),
        },
    })
}

// =============================================================================
// TEXT REPORT
// =============================================================================

impl GradeSummary {
    /// Plain-text report for terminals.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str("│ STUDENT GRADES SUMMARY              │\n");
        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str(&format!("│ Total records:   {}\n", self.total_records));
        output.push_str(&format!("│ Unique students: {}\n", self.unique_students));
        output.push_str(&format!("│ Years covered:   {}\n", self.years_covered));
        output.push_str(&format!(
            "│ Tests:           {}\n",
            self.available_tests.join(", ")
        ));
        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str(&format!("│ Average: {:.2}\n", self.average_grade));
        output.push_str(&format!(
            "│ Range:   {:.2} - {:.2}\n",
            self.min_grade, self.max_grade
        ));
        output.push_str(&format!("│ Std dev: {:.2}\n", self.std_dev));
        output.push_str(&format!(
            "│ Quartiles: {:.2} / {:.2} / {:.2}\n",
            self.percentile_25, self.median, self.percentile_75
        ));
        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

impl AnalysisReport {
    /// Plain-text report: summary box followed by one section per table.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = self.summary.to_text();

        output.push_str(&format!(
            "\nTop {REPORT_TOP_STUDENTS} students (at least {TOP_STUDENT_MIN_TESTS} tests):\n"
        ));
        for (rank, student) in self.top_students.iter().enumerate() {
            output.push_str(&format!(
                "{:>4}. AEM {}: avg {:.2} ({} tests, range {:.2}-{:.2})\n",
                rank + 1,
                student.aem,
                student.average_grade,
                student.total_tests,
                student.min_grade,
                student.max_grade
            ));
        }

        output.push_str("\nRecords by year:\n");
        for year in &self.yearly_stats {
            output.push_str(&format!(
                "  {}: avg {:.2} ({} students, {} records, σ={:.2})\n",
                year.year, year.average_grade, year.unique_students, year.total_records, year.std_dev
            ));
        }

        output.push_str("\nRecords by test:\n");
        for test in &self.test_stats {
            output.push_str(&format!(
                "  {}: avg {:.2}, {:.1}% pass rate ({}/{}, σ={:.2})\n",
                test.test,
                test.average_grade,
                test.pass_rate,
                test.passing_count,
                test.total_attempts,
                test.std_dev
            ));
        }

        output.push_str("\nGrade distribution:\n");
        output.push_str(&distribution_to_text(&self.grade_distribution));

        output.push_str(&format!(
            "\nPerfect scores: {}\n",
            self.perfect_scores.len()
        ));
        for score in self.perfect_scores.iter().take(REPORT_PERFECT_SCORES) {
            output.push_str(&format!(
                "  AEM {} - {} ({})\n",
                score.aem, score.test, score.year
            ));
        }
        let more = self.perfect_scores.len().saturating_sub(REPORT_PERFECT_SCORES);
        if more > 0 {
            output.push_str(&format!("  ... and {more} more\n"));
        }

        output.push_str(&format!("\n{} performance:\n", self.year_breakdown.year));
        if self.year_breakdown.tests.is_empty() {
            output.push_str("  no records\n");
        }
        for test in &self.year_breakdown.tests {
            output.push_str(&format!(
                "  {}: avg {:.2}, {:.1}% pass rate ({}/{})\n",
                test.test,
                test.average_grade,
                test.pass_rate,
                test.passing_count,
                test.total_attempts
            ));
        }

        output
    }
}

/// Histogram lines with a bar of at most 20 blocks.
#[must_use]
pub fn distribution_to_text(buckets: &[GradeBucket]) -> String {
    let mut output = String::new();
    for bucket in buckets {
        let bar = "█".repeat((bucket.percentage as usize).min(20));
        output.push_str(&format!(
            "{:<20}: {:>4} ({:>4.1}%) {}\n",
            bucket.grade_range, bucket.count, bucket.percentage, bar
        ));
    }
    output
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(aem: u32, test: &str, grade: f64, year: i32) -> GradeRecord {
        let now = Utc::now();
        GradeRecord {
            id: u64::from(aem),
            aem,
            test: test.to_string(),
            grade,
            year,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<GradeRecord> {
        vec![
            record(1, "Test 1", 9.0, 2023),
            record(1, "Test 2", 8.0, 2023),
            record(1, "Test 3", 10.0, 2024),
            record(2, "Test 1", 4.0, 2023),
            record(2, "Test 2", 5.0, 2024),
            record(2, "Test 3", 6.0, 2024),
            record(3, "Test 1", 10.0, 2024),
        ]
    }

    #[test]
    fn summary_of_empty_table_is_none() {
        assert!(summary(&[]).is_none());
    }

    #[test]
    fn summary_covers_table() {
        let s = summary(&sample());
        let s = s.as_ref();
        assert_eq!(s.map(|s| s.total_records), Some(7));
        assert_eq!(s.map(|s| s.unique_students), Some(3));
        assert_eq!(s.map(|s| s.years_covered.as_str()), Some("2023-2024"));
        assert_eq!(s.map(|s| s.available_tests.len()), Some(3));
        assert_eq!(s.map(|s| s.average_grade), Some(7.43));
        assert_eq!(s.map(|s| s.min_grade), Some(4.0));
        assert_eq!(s.map(|s| s.max_grade), Some(10.0));
        assert_eq!(s.map(|s| s.median), Some(8.0));
        assert_eq!(s.map(|s| s.percentile_25), Some(5.5));
        assert_eq!(s.map(|s| s.percentile_75), Some(9.5));
    }

    #[test]
    fn percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.5), Some(2.5));
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn std_dev_is_sample_based() {
        assert_eq!(sample_std_dev(&[5.0]), 0.0);
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((sd - 2.138_089_935_299_395).abs() < 1e-12);
    }

    #[test]
    fn student_stats_respects_min_tests_and_limit() {
        let stats = student_stats(&sample(), 50, 1);
        let order: Vec<_> = stats.iter().map(|s| s.aem).collect();
        assert_eq!(order, vec![3, 1, 2]);

        let stats = student_stats(&sample(), 1, 2);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].aem, 1);
        assert_eq!(stats[0].average_grade, 9.0);
    }

    #[test]
    fn top_students_need_three_tests() {
        let top = top_students(&sample(), 10);
        let aems: Vec<_> = top.iter().map(|s| s.aem).collect();
        assert_eq!(aems, vec![1, 2]);
    }

    #[test]
    fn test_stats_pass_rate_is_inclusive() {
        let stats = test_stats(&sample());
        let test2 = stats.iter().find(|s| s.test == "Test 2");
        assert_eq!(test2.map(|s| s.pass_rate), Some(100.0));

        let test1 = stats.iter().find(|s| s.test == "Test 1");
        assert!(test1.is_some_and(|s| (s.pass_rate - 200.0 / 3.0).abs() < 1e-9));
        assert_eq!(stats[0].test, "Test 3");
    }

    #[test]
    fn test_stats_carry_passing_count_and_spread() {
        let stats = test_stats(&sample());
        let test1 = stats.iter().find(|s| s.test == "Test 1");
        assert_eq!(test1.map(|s| s.passing_count), Some(2));
        assert_eq!(test1.map(|s| s.std_dev), Some(3.21));

        let test3 = stats.iter().find(|s| s.test == "Test 3");
        assert_eq!(test3.map(|s| s.std_dev), Some(2.83));
    }

    #[test]
    fn test_stats_for_year_filters_and_sorts_by_name() {
        let stats = test_stats_for_year(&sample(), 2024);
        let names: Vec<_> = stats.iter().map(|s| s.test.as_str()).collect();
        assert_eq!(names, vec!["Test 1", "Test 2", "Test 3"]);
        assert_eq!(stats[2].total_attempts, 2);
        assert_eq!(stats[2].passing_count, 2);

        assert!(test_stats_for_year(&sample(), 1999).is_empty());
    }

    #[test]
    fn yearly_stats_newest_first() {
        let stats = yearly_stats(&sample());
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].year, 2024);
        assert_eq!(stats[0].total_records, 4);
        assert_eq!(stats[0].unique_students, 3);
        assert_eq!(stats[1].average_grade, 7.0);
        assert_eq!(stats[1].std_dev, 2.65);
    }

    #[test]
    fn bucket_edges_sit_on_integers() {
        assert_eq!(bucket_index(0.0), 0);
        assert_eq!(bucket_index(0.99), 0);
        assert_eq!(bucket_index(4.99), 4);
        assert_eq!(bucket_index(5.0), 5);
        assert_eq!(bucket_index(7.99), 7);
        assert_eq!(bucket_index(8.0), 8);
        assert_eq!(bucket_index(8.5), 8);
        assert_eq!(bucket_index(9.0), 9);
        assert_eq!(bucket_index(10.0), 9);
    }

    #[test]
    fn distribution_omits_empty_buckets() {
        let buckets = grade_distribution(&sample());
        let labels: Vec<_> = buckets.iter().map(|b| b.grade_range.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "4.0-4.9 (Fail)",
                "5.0-5.9 (Pass)",
                "6.0-6.9",
                "8.0-8.9",
                "9.0-10.0 (Excellent)"
            ]
        );
        let top = buckets.last();
        assert_eq!(top.map(|b| b.count), Some(3));
        assert_eq!(top.map(|b| b.percentage), Some(42.9));
    }

    #[test]
    fn perfect_scores_sorted() {
        let perfect = perfect_scores(&sample());
        let keys: Vec<_> = perfect.iter().map(|p| (p.aem, p.year)).collect();
        assert_eq!(keys, vec![(1, 2024), (3, 2024)]);
    }

    #[test]
    fn analysis_report_defaults_to_latest_year() {
        assert!(analysis_report(&[], None).is_none());

        let report = analysis_report(&sample(), None);
        let report = report.as_ref();
        assert_eq!(report.map(|r| r.year_breakdown.year), Some(2024));
        assert_eq!(report.map(|r| r.top_students.len()), Some(2));
        assert_eq!(report.map(|r| r.perfect_scores.len()), Some(2));

        let report = analysis_report(&sample(), Some(2023));
        assert_eq!(
            report.map(|r| r.year_breakdown.tests.len()),
            Some(2)
        );
    }

    #[test]
    fn analysis_text_has_every_section() {
        let text = analysis_report(&sample(), None)
            .map(|r| r.to_text())
            .unwrap_or_default();
        assert!(text.contains("Top 10 students (at least 3 tests):"));
        assert!(text.contains("   1. AEM 1: avg 9.00 (3 tests, range 8.00-10.00)"));
        assert!(text.contains("  2023: avg 7.00 (2 students, 3 records, σ=2.65)"));
        assert!(text.contains("  Test 1: avg 7.67, 66.7% pass rate (2/3, σ=3.21)"));
        assert!(text.contains("Perfect scores: 2"));
        assert!(text.contains("  AEM 3 - Test 1 (2024)"));
        assert!(text.contains("2024 performance:"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn analysis_text_truncates_perfect_scores() {
        let records: Vec<_> = (1..=12)
            .map(|aem| record(aem, "Final", 10.0, 2024))
            .collect();
        let text = analysis_report(&records, None)
            .map(|r| r.to_text())
            .unwrap_or_default();
        assert!(text.contains("Perfect scores: 12"));
        assert!(text.contains("  ... and 2 more"));
        assert!(!text.contains("AEM 11 - Final"));
    }

    #[test]
    fn text_report_lists_fields() {
        let text = summary(&sample()).map(|s| s.to_text()).unwrap_or_default();
        assert!(text.contains("STUDENT GRADES SUMMARY"));
        assert!(text.contains("Years covered:   2023-2024"));
        assert!(text.contains("Test 1, Test 2, Test 3"));

        let histogram = distribution_to_text(&grade_distribution(&sample()));
        assert_eq!(histogram.lines().count(), 5);
    }
}
