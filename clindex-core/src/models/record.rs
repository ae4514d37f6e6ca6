//! The typed per-allele row schema shared by the extractor and consolidator.
//!
//! One `AlleleRecord` is one clinical submission's view of one allele (as
//! produced by extraction) or the merge of every submission sharing a key (as
//! produced by consolidation). Fields fall into fixed classes that determine
//! how they merge:
//!
//! - deduplicated list fields (`Vec<String>`, first-occurrence order)
//! - `_ordered` list fields (`Vec<String>`, submission order, never deduped)
//! - count fields ([`SignificanceCounts`], summed)
//! - ranked categorical fields (`clinical_significance`, `review_status`)
//! - flags (`conflicted`, monotonic; `mutant_allele`, REF/ALT marker)

use crate::errors::RowError;
use crate::models::ranking;
use crate::models::variant::VariantKey;

/// Output column order. The header row is this list joined with tabs, and
/// every serialized record presents its fields in this order.
pub const COLUMNS: [&str; 34] = [
    "chrom",
    "pos",
    "ref",
    "alt",
    "mut",
    "measureset_type",
    "measureset_id",
    "rcv",
    "allele_id",
    "symbol",
    "hgvs_c",
    "hgvs_p",
    "molecular_consequence",
    "clinical_significance",
    "clinical_significance_ordered",
    "pathogenic",
    "likely_pathogenic",
    "uncertain_significance",
    "likely_benign",
    "benign",
    "review_status",
    "review_status_ordered",
    "all_submitters",
    "submitters_ordered",
    "all_traits",
    "all_pmids",
    "inheritance_modes",
    "age_of_onset",
    "prevalence",
    "disease_mechanism",
    "origin",
    "xrefs",
    "gold_stars",
    "conflicted",
];

/// Which allele a submission asserts about. ClinVar encodes "this assertion
/// describes the reference allele" only through an `=` in the HGVS cDNA
/// notation; such records are REF and lose against an ALT record with the
/// same key during consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutantAllele {
    Ref,
    #[default]
    Alt,
}

impl MutantAllele {
    pub fn as_str(self) -> &'static str {
        match self {
            MutantAllele::Ref => "REF",
            MutantAllele::Alt => "ALT",
        }
    }

    pub fn parse(value: &str) -> Result<Self, RowError> {
        match value {
            "REF" => Ok(MutantAllele::Ref),
            "ALT" => Ok(MutantAllele::Alt),
            other => Err(RowError::InvalidMutantAllele {
                value: other.to_string(),
            }),
        }
    }
}

/// Per-category tallies of pathogenic-spectrum assertions. Summed across
/// contributors during consolidation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignificanceCounts {
    pub pathogenic: u32,
    pub likely_pathogenic: u32,
    pub uncertain_significance: u32,
    pub likely_benign: u32,
    pub benign: u32,
}

impl SignificanceCounts {
    /// Increment the tally matching a significance description, if it is one
    /// of the five spectrum categories.
    pub fn record(&mut self, description: &str) {
        match description.trim().to_lowercase().as_str() {
            "pathogenic" => self.pathogenic += 1,
            "likely pathogenic" => self.likely_pathogenic += 1,
            "uncertain significance" => self.uncertain_significance += 1,
            "likely benign" => self.likely_benign += 1,
            "benign" => self.benign += 1,
            _ => {}
        }
    }

    pub fn add(&mut self, other: &SignificanceCounts) {
        self.pathogenic += other.pathogenic;
        self.likely_pathogenic += other.likely_pathogenic;
        self.uncertain_significance += other.uncertain_significance;
        self.likely_benign += other.likely_benign;
        self.benign += other.benign;
    }
}

/// One table row: a single submission's assertions about one allele, or the
/// consolidated merge of all submissions sharing a [`VariantKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct AlleleRecord {
    pub key: VariantKey,
    pub mutant_allele: MutantAllele,

    // Deduplicated list fields.
    pub measureset_type: Vec<String>,
    pub measureset_id: Vec<String>,
    pub rcv: Vec<String>,
    pub allele_id: Vec<String>,
    pub symbol: Vec<String>,
    pub hgvs_c: Vec<String>,
    pub hgvs_p: Vec<String>,
    pub molecular_consequence: Vec<String>,
    pub all_submitters: Vec<String>,
    pub all_traits: Vec<String>,
    pub all_pmids: Vec<String>,
    pub inheritance_modes: Vec<String>,
    pub age_of_onset: Vec<String>,
    pub prevalence: Vec<String>,
    pub disease_mechanism: Vec<String>,
    pub origin: Vec<String>,
    pub xrefs: Vec<String>,

    // Ordered list fields: one entry per submission, aligned across the
    // three columns, never deduplicated.
    pub clinical_significance_ordered: Vec<String>,
    pub review_status_ordered: Vec<String>,
    pub submitters_ordered: Vec<String>,

    // Ranked categorical fields.
    pub clinical_significance: String,
    pub review_status: String,

    pub counts: SignificanceCounts,
    pub gold_stars: u32,
    pub conflicted: bool,
}

impl AlleleRecord {
    /// A blank record for `key`: empty lists, zero counts, ALT orientation.
    pub fn new(key: VariantKey) -> Self {
        AlleleRecord {
            key,
            mutant_allele: MutantAllele::Alt,
            measureset_type: Vec::new(),
            measureset_id: Vec::new(),
            rcv: Vec::new(),
            allele_id: Vec::new(),
            symbol: Vec::new(),
            hgvs_c: Vec::new(),
            hgvs_p: Vec::new(),
            molecular_consequence: Vec::new(),
            all_submitters: Vec::new(),
            all_traits: Vec::new(),
            all_pmids: Vec::new(),
            inheritance_modes: Vec::new(),
            age_of_onset: Vec::new(),
            prevalence: Vec::new(),
            disease_mechanism: Vec::new(),
            origin: Vec::new(),
            xrefs: Vec::new(),
            clinical_significance_ordered: Vec::new(),
            review_status_ordered: Vec::new(),
            submitters_ordered: Vec::new(),
            clinical_significance: String::new(),
            review_status: String::new(),
            counts: SignificanceCounts::default(),
            gold_stars: 0,
            conflicted: false,
        }
    }

    /// Recompute `gold_stars` from the current review status.
    pub fn update_gold_stars(&mut self) {
        self.gold_stars = ranking::review_status_rank(&self.review_status);
    }

    /// The tab-separated header line for the output table.
    pub fn header() -> String {
        COLUMNS.join("\t")
    }

    /// Serialize in [`COLUMNS`] order. Missing values are empty strings;
    /// list fields are semicolon-joined.
    pub fn to_tsv_row(&self) -> String {
        let fields: [String; 34] = [
            self.key.chrom.clone(),
            self.key.pos.to_string(),
            self.key.ref_allele.clone(),
            self.key.alt_allele.clone(),
            self.mutant_allele.as_str().to_string(),
            join_list(&self.measureset_type),
            join_list(&self.measureset_id),
            join_list(&self.rcv),
            join_list(&self.allele_id),
            join_list(&self.symbol),
            join_list(&self.hgvs_c),
            join_list(&self.hgvs_p),
            join_list(&self.molecular_consequence),
            self.clinical_significance.clone(),
            join_list(&self.clinical_significance_ordered),
            self.counts.pathogenic.to_string(),
            self.counts.likely_pathogenic.to_string(),
            self.counts.uncertain_significance.to_string(),
            self.counts.likely_benign.to_string(),
            self.counts.benign.to_string(),
            self.review_status.clone(),
            join_list(&self.review_status_ordered),
            join_list(&self.all_submitters),
            join_list(&self.submitters_ordered),
            join_list(&self.all_traits),
            join_list(&self.all_pmids),
            join_list(&self.inheritance_modes),
            join_list(&self.age_of_onset),
            join_list(&self.prevalence),
            join_list(&self.disease_mechanism),
            join_list(&self.origin),
            join_list(&self.xrefs),
            self.gold_stars.to_string(),
            if self.conflicted { "1" } else { "0" }.to_string(),
        ];
        fields.join("\t")
    }

    /// Parse a row previously produced by [`to_tsv_row`](Self::to_tsv_row).
    pub fn from_tsv_row(line: &str) -> Result<Self, RowError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != COLUMNS.len() {
            return Err(RowError::ColumnCount {
                expected: COLUMNS.len(),
                found: fields.len(),
            });
        }

        let pos: u64 = fields[1].parse().map_err(|_| RowError::InvalidPosition {
            value: fields[1].to_string(),
        })?;
        if pos < 1 {
            return Err(RowError::InvalidPosition {
                value: fields[1].to_string(),
            });
        }

        let key = VariantKey::new(fields[0], pos, fields[2], fields[3]);
        let mut record = AlleleRecord::new(key);
        record.mutant_allele = MutantAllele::parse(fields[4])?;
        record.measureset_type = split_list(fields[5]);
        record.measureset_id = split_list(fields[6]);
        record.rcv = split_list(fields[7]);
        record.allele_id = split_list(fields[8]);
        record.symbol = split_list(fields[9]);
        record.hgvs_c = split_list(fields[10]);
        record.hgvs_p = split_list(fields[11]);
        record.molecular_consequence = split_list(fields[12]);
        record.clinical_significance = fields[13].to_string();
        record.clinical_significance_ordered = split_list(fields[14]);
        record.counts = SignificanceCounts {
            pathogenic: parse_count(fields[15], "pathogenic")?,
            likely_pathogenic: parse_count(fields[16], "likely_pathogenic")?,
            uncertain_significance: parse_count(fields[17], "uncertain_significance")?,
            likely_benign: parse_count(fields[18], "likely_benign")?,
            benign: parse_count(fields[19], "benign")?,
        };
        record.review_status = fields[20].to_string();
        record.review_status_ordered = split_list(fields[21]);
        record.all_submitters = split_list(fields[22]);
        record.submitters_ordered = split_list(fields[23]);
        record.all_traits = split_list(fields[24]);
        record.all_pmids = split_list(fields[25]);
        record.inheritance_modes = split_list(fields[26]);
        record.age_of_onset = split_list(fields[27]);
        record.prevalence = split_list(fields[28]);
        record.disease_mechanism = split_list(fields[29]);
        record.origin = split_list(fields[30]);
        record.xrefs = split_list(fields[31]);
        record.gold_stars = parse_count(fields[32], "gold_stars")?;
        record.conflicted = fields[33] == "1";
        Ok(record)
    }
}

/// Join list values with the column separator. Values are sanitized at
/// extraction time so they cannot contain `;` themselves.
pub fn join_list(values: &[String]) -> String {
    values.join(";")
}

/// Split a semicolon-joined column back into values, dropping empties.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect()
}

fn parse_count(value: &str, column: &'static str) -> Result<u32, RowError> {
    value.parse().map_err(|_| RowError::InvalidInteger {
        column,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> AlleleRecord {
        let mut record = AlleleRecord::new(VariantKey::new("1", 55_518_287, "G", "T"));
        record.measureset_type = vec!["Variant".to_string()];
        record.measureset_id = vec!["12345".to_string()];
        record.rcv = vec!["RCV000001".to_string()];
        record.allele_id = vec!["54321".to_string()];
        record.symbol = vec!["PCSK9".to_string()];
        record.clinical_significance = "pathogenic".to_string();
        record.clinical_significance_ordered =
            vec!["pathogenic".to_string(), "pathogenic".to_string()];
        record.counts.pathogenic = 2;
        record.review_status = "criteria provided, single submitter".to_string();
        record.review_status_ordered = vec![
            "criteria provided, single submitter".to_string(),
            "criteria provided, single submitter".to_string(),
        ];
        record.all_submitters = vec!["LabA".to_string(), "LabB".to_string()];
        record.submitters_ordered = vec!["LabA".to_string(), "LabB".to_string()];
        record.all_traits = vec!["Hypercholesterolemia".to_string()];
        record.all_pmids = vec!["25741868".to_string()];
        record.update_gold_stars();
        record
    }

    #[test]
    fn header_matches_column_list() {
        assert_eq!(AlleleRecord::header().split('\t').count(), COLUMNS.len());
        assert!(AlleleRecord::header().starts_with("chrom\tpos\tref\talt\tmut"));
        assert!(AlleleRecord::header().ends_with("gold_stars\tconflicted"));
    }

    #[test]
    fn row_round_trips() {
        let record = sample_record();
        let row = record.to_tsv_row();
        let parsed = AlleleRecord::from_tsv_row(&row).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn missing_values_serialize_as_empty_strings() {
        let record = AlleleRecord::new(VariantKey::new("7", 100, "A", "C"));
        let row = record.to_tsv_row();
        let fields: Vec<&str> = row.split('\t').collect();
        assert_eq!(fields.len(), COLUMNS.len());
        assert_eq!(fields[9], ""); // symbol
        assert_eq!(fields[15], "0"); // pathogenic count
        assert_eq!(fields[33], "0"); // conflicted
    }

    #[test]
    fn bad_column_count_is_rejected() {
        let err = AlleleRecord::from_tsv_row("1\t2\tA\tT").unwrap_err();
        assert!(matches!(err, RowError::ColumnCount { found: 4, .. }));
    }

    #[test]
    fn bad_position_is_rejected() {
        let mut fields = vec![""; COLUMNS.len()];
        fields[0] = "1";
        fields[1] = "zero";
        fields[4] = "ALT";
        let line = fields.join("\t");
        assert!(matches!(
            AlleleRecord::from_tsv_row(&line).unwrap_err(),
            RowError::InvalidPosition { .. }
        ));
    }

    #[test]
    fn counts_record_only_spectrum_categories() {
        let mut counts = SignificanceCounts::default();
        counts.record("Pathogenic");
        counts.record("pathogenic");
        counts.record("Likely benign");
        counts.record("drug response");
        assert_eq!(counts.pathogenic, 2);
        assert_eq!(counts.likely_benign, 1);
        assert_eq!(counts.likely_pathogenic, 0);
    }
}
