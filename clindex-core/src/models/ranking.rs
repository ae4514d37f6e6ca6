//! Process-wide ranking tables for ClinVar review status and clinical
//! significance.
//!
//! Both tables are read-only constants. The review-status rank doubles as the
//! "gold stars" value published with each record. Significance severities are
//! integers on the pathogenic spectrum; values outside the five-category
//! spectrum (drug response, association, ...) rank below everything in it.

/// Review status awarded one star: a single submitter provided criteria.
pub const REVSTAT_SINGLE_SUBMITTER: &str = "criteria provided, single submitter";

/// Review status a pair of agreeing single-submitter records is promoted to.
pub const REVSTAT_MULTIPLE_NO_CONFLICT: &str =
    "criteria provided, multiple submitters, no conflicts";

/// Review status string → rank (0-4). Unrecognized statuses rank 0.
///
/// The rank is also the number of gold stars displayed for the record.
const REVIEW_STATUS_RANKING: &[(&str, u32)] = &[
    ("no assertion provided", 0),
    ("no assertion for the individual variant", 0),
    ("no assertion criteria provided", 0),
    ("criteria provided, single submitter", 1),
    ("criteria provided, conflicting interpretations", 1),
    ("criteria provided, multiple submitters, no conflicts", 2),
    ("reviewed by expert panel", 3),
    ("practice guideline", 4),
];

/// Clinical significance description → severity on the pathogenic spectrum.
///
/// Values are the historical spectrum ranks doubled, so that uncertain
/// significance keeps its position between likely benign and likely
/// pathogenic (historically 3.5) with integer arithmetic.
const SIGNIFICANCE_SEVERITY: &[(&str, u32)] = &[
    ("benign", 4),
    ("likely benign", 6),
    ("uncertain significance", 7),
    ("likely pathogenic", 8),
    ("pathogenic", 10),
];

/// Rank a review-status description (case-insensitive). Unknown statuses
/// rank 0, the same as "no assertion provided".
pub fn review_status_rank(status: &str) -> u32 {
    let status = status.trim().to_lowercase();
    REVIEW_STATUS_RANKING
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, rank)| *rank)
        .unwrap_or(0)
}

/// Severity of a clinical-significance description (case-insensitive).
/// Descriptions outside the pathogenic spectrum rank 0.
pub fn significance_severity(description: &str) -> u32 {
    let description = description.trim().to_lowercase();
    SIGNIFICANCE_SEVERITY
        .iter()
        .find(|(name, _)| *name == description)
        .map(|(_, severity)| *severity)
        .unwrap_or(0)
}

/// Whether a description is one of the five pathogenic-spectrum categories.
pub fn is_pathogenic_spectrum(description: &str) -> bool {
    significance_severity(description) > 0
}
