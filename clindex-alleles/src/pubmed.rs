//! PubMed-ID scanning of free-text comments.
//!
//! Submitters cite literature inside comment prose as often as in structured
//! citation nodes, so comments are pattern-scanned: after the first
//! `PubMed`/`PMID` trigger, every run of digits in the remaining text is
//! treated as a literature ID. The scan is best-effort and never fails on
//! malformed text; results are deduplicated against structured citations by
//! the caller.

use once_cell::sync::Lazy;
use regex::Regex;

static TRIGGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"PubMed|PMID").unwrap());
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Lazily yield every candidate PubMed ID mentioned in `text`.
///
/// Yields nothing when no trigger word is present. Terminates when no
/// further digit run exists after the trigger.
pub fn scan_comment(text: &str) -> impl Iterator<Item = &str> {
    let tail = match TRIGGER.find(text) {
        Some(m) => &text[m.end()..],
        None => "",
    };
    DIGIT_RUN.find_iter(tail).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ids(text: &str) -> Vec<&str> {
        scan_comment(text).collect()
    }

    #[rstest]
    #[case(
        "Reported pathogenic (PubMed 12345, 67890; see also PMID: 222).",
        vec!["12345", "67890", "222"]
    )]
    #[case("PMID:9883021", vec!["9883021"])]
    #[case("Exon 11 deletion, PubMed 444", vec!["444"])] // digits before the trigger are ignored
    #[case("de novo variant in 3 probands", vec![])]
    #[case("", vec![])]
    #[case("see PubMed for details", vec![])]
    #[case("PMID", vec![])]
    fn scan_cases(#[case] text: &str, #[case] expected: Vec<&str>) {
        assert_eq!(ids(text), expected);
    }

    #[test]
    fn malformed_text_never_panics() {
        assert_eq!(ids("PubMed \u{fffd}\u{0}\t 77"), vec!["77"]);
    }
}
