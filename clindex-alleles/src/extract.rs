//! Projection of ClinVar entries into flat per-allele records.
//!
//! Each `<ClinVarSet>` entry holds one reference assertion (the aggregate
//! view, with the measure set describing the variant) plus one
//! `<ClinVarAssertion>` per submitting lab. The extractor projects every
//! constituent measure (allele) into an [`AlleleRecord`], normalizing its
//! coordinates on the way. Entries or alleles that cannot be projected are
//! skipped and counted by reason; a skip never aborts the stream.
//!
//! Measure sets bundling more than one allele (haplotypes, compound
//! heterozygotes) route their records to a separate multi-allele stream, so
//! downstream per-allele consolidation is not polluted by co-reported
//! variants.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use fxhash::FxHashSet;
use indicatif::ProgressBar;
use serde::Serialize;

use clindex_core::utils::{get_dynamic_reader, sanitize_text};
use clindex_core::{AlleleRecord, MutantAllele, VariantKey, ranking};
use clindex_refseq::ReferenceSequence;

use crate::normalize::{NormalizeError, normalize};
use crate::pubmed::scan_comment;
use crate::xml::{Element, SubtreeReader};

/// Which output stream a record belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Routed {
    /// The measure set described exactly one allele.
    Single(AlleleRecord),
    /// The measure set bundled several alleles; this record is one of them.
    Multi(AlleleRecord),
}

impl Routed {
    pub fn record(&self) -> &AlleleRecord {
        match self {
            Routed::Single(r) | Routed::Multi(r) => r,
        }
    }
}

/// Extraction options. `genome_build` selects which `SequenceLocation`
/// blocks are usable (ClinVar annotates each variant on several builds).
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub genome_build: String,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            genome_build: "GRCh37".to_string(),
        }
    }
}

/// Progress and skip tally for one extraction run. Counts are for
/// observability only; they never affect the emitted stream.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExtractStats {
    pub entries: u64,
    pub single_records: u64,
    pub multi_records: u64,
    pub skipped_missing_measure: u64,
    pub skipped_ambiguous_measure_set: u64,
    pub skipped_missing_coordinate: u64,
    pub skipped_invalid_sequence: u64,
    pub skipped_ref_mismatch: u64,
    pub skipped_ref_equals_alt: u64,
    pub skipped_reference_error: u64,
}

impl ExtractStats {
    fn note_normalization_error(&mut self, error: &NormalizeError) {
        match error {
            NormalizeError::InvalidSequence { .. } => self.skipped_invalid_sequence += 1,
            NormalizeError::RefMismatch { .. } => self.skipped_ref_mismatch += 1,
            NormalizeError::RefEqualsAlt { .. } => self.skipped_ref_equals_alt += 1,
            NormalizeError::ContigStart { .. } | NormalizeError::Fetch(_) => {
                self.skipped_reference_error += 1
            }
        }
    }

    pub fn total_skipped(&self) -> u64 {
        self.skipped_missing_measure
            + self.skipped_ambiguous_measure_set
            + self.skipped_missing_coordinate
            + self.skipped_invalid_sequence
            + self.skipped_ref_mismatch
            + self.skipped_ref_equals_alt
            + self.skipped_reference_error
    }

    /// Machine-readable run report for the orchestration layer.
    pub fn report(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

/// Submission-level context shared by every allele of one entry.
struct SubmissionFields {
    measureset_type: Vec<String>,
    measureset_id: Vec<String>,
    rcv: Vec<String>,
    mutant_allele: MutantAllele,
    clinical_significance: String,
    review_status: String,
    clinical_significance_ordered: Vec<String>,
    review_status_ordered: Vec<String>,
    submitters_ordered: Vec<String>,
    all_submitters: Vec<String>,
    counts: clindex_core::SignificanceCounts,
    conflicted: bool,
    all_traits: Vec<String>,
    all_pmids: Vec<String>,
    inheritance_modes: Vec<String>,
    age_of_onset: Vec<String>,
    prevalence: Vec<String>,
    disease_mechanism: Vec<String>,
    origin: Vec<String>,
    trait_xrefs: Vec<String>,
}

/// Push `value` if the list does not already hold it (first-seen order).
fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

/// Preferred `ElementValue` text under a `Name`-like wrapper element.
fn preferred_value(element: &Element) -> Option<String> {
    element
        .find_all("ElementValue")
        .find(|v| v.attr("Type") == Some("Preferred"))
        .map(|v| sanitize_text(v.text_trimmed()))
        .filter(|v| !v.is_empty())
}

/// Extracts [`AlleleRecord`]s from ClinVar entries against one reference
/// genome and genome build.
pub struct Extractor<'r, R: ReferenceSequence + ?Sized> {
    reference: &'r mut R,
    genome_build: String,
}

impl<'r, R: ReferenceSequence + ?Sized> Extractor<'r, R> {
    pub fn new(reference: &'r mut R, options: &ExtractOptions) -> Self {
        Extractor {
            reference,
            genome_build: options.genome_build.clone(),
        }
    }

    /// Project one `<ClinVarSet>` entry into zero or more routed records.
    /// Skips are counted on `stats`; the returned vector is empty for a
    /// skipped entry.
    pub fn project(&mut self, entry: &Element, stats: &mut ExtractStats) -> Vec<Routed> {
        stats.entries += 1;

        let Some(reference_assertion) = entry.find("ReferenceClinVarAssertion") else {
            stats.skipped_missing_measure += 1;
            return Vec::new();
        };

        let measure_sets: Vec<&Element> = reference_assertion
            .find_descendants("MeasureSet")
            .collect();
        let measure_set = match measure_sets.as_slice() {
            [] => {
                stats.skipped_missing_measure += 1;
                return Vec::new();
            }
            [only] => *only,
            _ => {
                stats.skipped_ambiguous_measure_set += 1;
                return Vec::new();
            }
        };

        let measures: Vec<&Element> = measure_set.find_all("Measure").collect();
        if measures.is_empty() {
            stats.skipped_missing_measure += 1;
            return Vec::new();
        }
        let multi = measures.len() > 1;

        let submission = self.submission_fields(entry, reference_assertion, measure_set);

        let mut routed = Vec::with_capacity(measures.len());
        for measure in &measures {
            let Some(location) = self.usable_location(measure) else {
                stats.skipped_missing_coordinate += 1;
                // A lone measure without coordinates skips the entry; in a
                // bundle the sibling alleles still emit.
                if !multi {
                    return Vec::new();
                }
                continue;
            };

            let key = match self.normalized_key(&location) {
                Ok(key) => key,
                Err(error) => {
                    stats.note_normalization_error(&error);
                    if !multi {
                        return Vec::new();
                    }
                    continue;
                }
            };

            let record = build_record(key, &submission, measure);
            if multi {
                stats.multi_records += 1;
                routed.push(Routed::Multi(record));
            } else {
                stats.single_records += 1;
                routed.push(Routed::Single(record));
            }
        }
        routed
    }

    /// The last genome-build-matched `SequenceLocation` carrying all four
    /// coordinate attributes, as raw strings.
    fn usable_location(&self, measure: &Element) -> Option<RawLocation> {
        measure
            .find_descendants("SequenceLocation")
            .filter(|loc| loc.attr("Assembly") == Some(self.genome_build.as_str()))
            .filter_map(|loc| {
                Some(RawLocation {
                    chrom: loc.attr("Chr")?.to_string(),
                    start: loc.attr("start")?.to_string(),
                    ref_allele: loc.attr("referenceAllele")?.to_string(),
                    alt_allele: loc.attr("alternateAllele")?.to_string(),
                })
            })
            .last()
    }

    fn normalized_key(&mut self, location: &RawLocation) -> Result<VariantKey, NormalizeError> {
        let pos: u64 = location.start.parse().map_err(|_| {
            NormalizeError::InvalidSequence {
                chrom: location.chrom.clone(),
                pos: 0,
                ref_allele: location.ref_allele.clone(),
                alt_allele: location.alt_allele.clone(),
            }
        })?;
        normalize(
            self.reference,
            &location.chrom,
            pos,
            &location.ref_allele,
            &location.alt_allele,
        )
    }

    /// Collect every submission-level field of one entry.
    fn submission_fields(
        &self,
        entry: &Element,
        reference_assertion: &Element,
        measure_set: &Element,
    ) -> SubmissionFields {
        let mut fields = SubmissionFields {
            measureset_type: Vec::new(),
            measureset_id: Vec::new(),
            rcv: Vec::new(),
            mutant_allele: MutantAllele::Alt,
            clinical_significance: String::new(),
            review_status: String::new(),
            clinical_significance_ordered: Vec::new(),
            review_status_ordered: Vec::new(),
            submitters_ordered: Vec::new(),
            all_submitters: Vec::new(),
            counts: Default::default(),
            conflicted: false,
            all_traits: Vec::new(),
            all_pmids: Vec::new(),
            inheritance_modes: Vec::new(),
            age_of_onset: Vec::new(),
            prevalence: Vec::new(),
            disease_mechanism: Vec::new(),
            origin: Vec::new(),
            trait_xrefs: Vec::new(),
        };

        if let Some(t) = measure_set.attr("Type") {
            push_unique(&mut fields.measureset_type, sanitize_text(t));
        }
        if let Some(id) = measure_set.attr("ID") {
            push_unique(&mut fields.measureset_id, sanitize_text(id));
        }
        if let Some(accession) = reference_assertion.find("ClinVarAccession") {
            if let Some(acc) = accession.attr("Acc").filter(|a| a.starts_with("RCV")) {
                push_unique(&mut fields.rcv, sanitize_text(acc));
            }
        }

        // Aggregate classification from the reference assertion.
        if let Some(significance) = reference_assertion.find("ClinicalSignificance") {
            if let Some(description) = significance.find("Description") {
                fields.clinical_significance =
                    sanitize_text(description.text_trimmed()).to_lowercase();
            }
            if let Some(status) = significance.find("ReviewStatus") {
                fields.review_status = sanitize_text(status.text_trimmed()).to_lowercase();
            }
        }

        // Per-submitter classifications, in submission order.
        let mut spectrum_descriptions: FxHashSet<String> = FxHashSet::default();
        for assertion in entry.find_all("ClinVarAssertion") {
            if let Some(submission_id) = assertion.find_descendants("ClinVarSubmissionID").next() {
                if let Some(submitter) = submission_id.attr("submitter") {
                    let submitter = sanitize_text(submitter);
                    if !submitter.is_empty() {
                        fields.submitters_ordered.push(submitter.clone());
                        push_unique(&mut fields.all_submitters, submitter);
                    }
                }
            }
            let Some(significance) = assertion.find("ClinicalSignificance") else {
                continue;
            };
            if let Some(description) = significance.find("Description") {
                let description = sanitize_text(description.text_trimmed()).to_lowercase();
                if !description.is_empty() {
                    fields.counts.record(&description);
                    if ranking::is_pathogenic_spectrum(&description) {
                        spectrum_descriptions.insert(description.clone());
                    }
                    fields.clinical_significance_ordered.push(description);
                }
            }
            if let Some(status) = significance.find("ReviewStatus") {
                let status = sanitize_text(status.text_trimmed()).to_lowercase();
                if !status.is_empty() {
                    fields.review_status_ordered.push(status);
                }
            }
        }
        fields.conflicted = spectrum_descriptions.len() > 1;

        // ClinVar's only encoding of "this assertion describes the reference
        // allele" is an equals sign in the HGVS cDNA notation.
        for attribute in entry.find_descendants("Attribute") {
            if let Some(attribute_type) = attribute.attr("Type") {
                if attribute_type.contains("HGVS")
                    && !attribute_type.contains("protein")
                    && attribute.text.contains('=')
                {
                    fields.mutant_allele = MutantAllele::Ref;
                }
            }
        }

        // Literature: structured citations unioned with the comment scan.
        let mut seen_pmids: FxHashSet<String> = FxHashSet::default();
        for citation in entry.find_descendants("Citation") {
            for id_node in citation.find_descendants("ID") {
                if id_node.attr("Source") == Some("PubMed") {
                    let pmid = sanitize_text(id_node.text_trimmed());
                    if !pmid.is_empty() && seen_pmids.insert(pmid.clone()) {
                        fields.all_pmids.push(pmid);
                    }
                }
            }
        }
        for comment in entry.find_descendants("Comment") {
            for pmid in scan_comment(&comment.text) {
                if seen_pmids.insert(pmid.to_string()) {
                    fields.all_pmids.push(pmid.to_string());
                }
            }
        }

        // Condition(s) and their descriptive attributes.
        for trait_set in reference_assertion.find_descendants("TraitSet") {
            for trait_el in trait_set.find_all("Trait") {
                for name in trait_el.find_all("Name") {
                    if let Some(value) = preferred_value(name) {
                        push_unique(&mut fields.all_traits, value);
                    }
                }
                for attribute_set in trait_el.find_all("AttributeSet") {
                    let Some(attribute) = attribute_set.find("Attribute") else {
                        continue;
                    };
                    let value = sanitize_text(attribute.text_trimmed());
                    if value.is_empty() {
                        continue;
                    }
                    match attribute.attr("Type") {
                        Some("ModeOfInheritance") => {
                            push_unique(&mut fields.inheritance_modes, value)
                        }
                        Some("age of onset") => push_unique(&mut fields.age_of_onset, value),
                        Some("prevalence") => push_unique(&mut fields.prevalence, value),
                        Some("disease mechanism") => {
                            push_unique(&mut fields.disease_mechanism, value)
                        }
                        _ => {}
                    }
                }
                for xref in trait_el.find_all("XRef") {
                    if let Some(formatted) = format_xref(xref) {
                        push_unique(&mut fields.trait_xrefs, formatted);
                    }
                }
            }
        }

        for origin in reference_assertion.find_descendants("Origin") {
            push_unique(&mut fields.origin, sanitize_text(origin.text_trimmed()));
        }

        fields
    }
}

struct RawLocation {
    chrom: String,
    start: String,
    ref_allele: String,
    alt_allele: String,
}

fn format_xref(xref: &Element) -> Option<String> {
    let db = xref.attr("DB")?;
    let id = xref.attr("ID")?;
    let formatted = sanitize_text(&format!("{}:{}", db, id));
    (!formatted.is_empty()).then_some(formatted)
}

/// Combine the submission-level context with one measure's own fields.
fn build_record(key: VariantKey, submission: &SubmissionFields, measure: &Element) -> AlleleRecord {
    let mut record = AlleleRecord::new(key);
    record.mutant_allele = submission.mutant_allele;
    record.measureset_type = submission.measureset_type.clone();
    record.measureset_id = submission.measureset_id.clone();
    record.rcv = submission.rcv.clone();
    record.clinical_significance = submission.clinical_significance.clone();
    record.review_status = submission.review_status.clone();
    record.clinical_significance_ordered = submission.clinical_significance_ordered.clone();
    record.review_status_ordered = submission.review_status_ordered.clone();
    record.submitters_ordered = submission.submitters_ordered.clone();
    record.all_submitters = submission.all_submitters.clone();
    record.counts = submission.counts;
    record.conflicted = submission.conflicted;
    record.all_traits = submission.all_traits.clone();
    record.all_pmids = submission.all_pmids.clone();
    record.inheritance_modes = submission.inheritance_modes.clone();
    record.age_of_onset = submission.age_of_onset.clone();
    record.prevalence = submission.prevalence.clone();
    record.disease_mechanism = submission.disease_mechanism.clone();
    record.origin = submission.origin.clone();
    record.xrefs = submission.trait_xrefs.clone();
    record.update_gold_stars();

    if let Some(id) = measure.attr("ID") {
        push_unique(&mut record.allele_id, sanitize_text(id));
    }

    for symbol in measure.find_descendants("Symbol") {
        if let Some(value) = preferred_value(symbol) {
            push_unique(&mut record.symbol, value);
            break;
        }
    }

    for attribute in measure.find_descendants("Attribute") {
        let value = sanitize_text(attribute.text_trimmed());
        if value.is_empty() {
            continue;
        }
        match attribute.attr("Type") {
            Some("HGVS, coding, RefSeq") => push_unique(&mut record.hgvs_c, value),
            Some("HGVS, protein, RefSeq") => push_unique(&mut record.hgvs_p, value),
            Some("MolecularConsequence") => {
                push_unique(&mut record.molecular_consequence, value)
            }
            _ => {}
        }
    }

    for xref in measure.find_descendants("XRef") {
        if let Some(formatted) = format_xref(xref) {
            push_unique(&mut record.xrefs, formatted);
        }
    }

    record
}

/// Run extraction over a whole release file, writing the single-allele and
/// multi-allele TSV streams. Returns the run tally.
pub fn extract_file<R: ReferenceSequence + ?Sized>(
    xml_path: &Path,
    reference: &mut R,
    options: &ExtractOptions,
    single_out: &mut dyn Write,
    multi_out: &mut dyn Write,
) -> Result<ExtractStats> {
    let reader = get_dynamic_reader(xml_path)
        .with_context(|| format!("Failed to open ClinVar release: {:?}", xml_path))?;
    let mut subtrees = SubtreeReader::new(reader, "ClinVarSet");
    let mut extractor = Extractor::new(reference, options);
    let mut stats = ExtractStats::default();

    writeln!(single_out, "{}", AlleleRecord::header())?;
    writeln!(multi_out, "{}", AlleleRecord::header())?;

    let progress = ProgressBar::new_spinner();
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message("parsing ClinVarSet entries");

    while let Some(entry) = subtrees
        .next_subtree()
        .context("ClinVar XML stream is malformed")?
    {
        for routed in extractor.project(&entry, &mut stats) {
            match routed {
                Routed::Single(record) => writeln!(single_out, "{}", record.to_tsv_row())?,
                Routed::Multi(record) => writeln!(multi_out, "{}", record.to_tsv_row())?,
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    eprintln!(
        "{} entries: {} single-allele records, {} multi-allele records, {} skipped",
        stats.entries,
        stats.single_records,
        stats.multi_records,
        stats.total_skipped()
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clindex_refseq::InMemoryReference;
    use pretty_assertions::assert_eq;

    const ENTRY: &str = r#"
<ClinVarSet ID="92147">
  <ReferenceClinVarAssertion>
    <ClinVarAccession Acc="RCV000000012" Type="RCV"/>
    <ClinicalSignificance>
      <ReviewStatus>criteria provided, single submitter</ReviewStatus>
      <Description>Pathogenic</Description>
    </ClinicalSignificance>
    <ObservedIn><Sample><Origin>germline</Origin></Sample></ObservedIn>
    <MeasureSet Type="Variant" ID="18397">
      <Measure Type="single nucleotide variant" ID="33436">
        <AttributeSet>
          <Attribute Type="HGVS, coding, RefSeq">NM_000518.4:c.20A&gt;T</Attribute>
        </AttributeSet>
        <AttributeSet>
          <Attribute Type="HGVS, protein, RefSeq">NP_000509.1:p.Glu7Val</Attribute>
        </AttributeSet>
        <AttributeSet>
          <Attribute Type="MolecularConsequence">missense variant</Attribute>
        </AttributeSet>
        <MeasureRelationship Type="variant in gene">
          <Symbol>
            <ElementValue Type="Preferred">HBB</ElementValue>
          </Symbol>
        </MeasureRelationship>
        <SequenceLocation Assembly="GRCh38" Chr="11" start="999" referenceAllele="T" alternateAllele="A"/>
        <SequenceLocation Assembly="GRCh37" Chr="1" start="3" referenceAllele="G" alternateAllele="T"/>
        <XRef DB="dbSNP" ID="rs334"/>
      </Measure>
    </MeasureSet>
    <TraitSet Type="Disease">
      <Trait Type="Disease">
        <Name><ElementValue Type="Preferred">Sickle cell anemia; severe</ElementValue></Name>
        <Name><ElementValue Type="Alternate">HbS disease</ElementValue></Name>
        <AttributeSet><Attribute Type="ModeOfInheritance">Autosomal recessive inheritance</Attribute></AttributeSet>
        <AttributeSet><Attribute Type="prevalence">1:600</Attribute></AttributeSet>
        <XRef DB="OMIM" ID="603903"/>
      </Trait>
    </TraitSet>
  </ReferenceClinVarAssertion>
  <ClinVarAssertion>
    <ClinVarSubmissionID submitter="OMIM"/>
    <ClinicalSignificance>
      <ReviewStatus>no assertion criteria provided</ReviewStatus>
      <Description>Pathogenic</Description>
    </ClinicalSignificance>
    <Citation><ID Source="PubMed">20301551</ID></Citation>
    <Comment>Severe phenotype, see PubMed 6101203 and 20301551.</Comment>
  </ClinVarAssertion>
</ClinVarSet>"#;

    fn parse_entry(xml: &str) -> Element {
        SubtreeReader::new(xml.as_bytes(), "ClinVarSet")
            .next_subtree()
            .unwrap()
            .expect("entry")
    }

    fn grch37_reference() -> InMemoryReference {
        InMemoryReference::new().with_contig("1", "ACGTACGT")
    }

    #[test]
    fn projects_a_single_allele_entry() {
        let entry = parse_entry(ENTRY);
        let mut reference = grch37_reference();
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        let routed = extractor.project(&entry, &mut stats);
        assert_eq!(routed.len(), 1);
        let record = match &routed[0] {
            Routed::Single(r) => r,
            other => panic!("expected single-allele routing, got {other:?}"),
        };

        assert_eq!(record.key, VariantKey::new("1", 3, "G", "T"));
        assert_eq!(record.rcv, vec!["RCV000000012"]);
        assert_eq!(record.allele_id, vec!["33436"]);
        assert_eq!(record.measureset_id, vec!["18397"]);
        assert_eq!(record.symbol, vec!["HBB"]);
        assert_eq!(record.hgvs_c, vec!["NM_000518.4:c.20A>T"]);
        assert_eq!(record.hgvs_p, vec!["NP_000509.1:p.Glu7Val"]);
        assert_eq!(record.molecular_consequence, vec!["missense variant"]);
        assert_eq!(record.clinical_significance, "pathogenic");
        assert_eq!(record.review_status, "criteria provided, single submitter");
        assert_eq!(record.gold_stars, 1);
        assert_eq!(record.counts.pathogenic, 1);
        assert!(!record.conflicted);
        assert_eq!(record.all_submitters, vec!["OMIM"]);
        assert_eq!(record.submitters_ordered, vec!["OMIM"]);
        // Embedded semicolon sanitized, alternate name ignored.
        assert_eq!(record.all_traits, vec!["Sickle cell anemia: severe"]);
        assert_eq!(record.inheritance_modes, vec!["Autosomal recessive inheritance"]);
        assert_eq!(record.prevalence, vec!["1:600"]);
        assert_eq!(record.origin, vec!["germline"]);
        assert_eq!(record.xrefs, vec!["OMIM:603903", "dbSNP:rs334"]);
        // Citation and comment PMIDs unioned and deduplicated.
        assert_eq!(record.all_pmids, vec!["20301551", "6101203"]);

        assert_eq!(stats.entries, 1);
        assert_eq!(stats.single_records, 1);
        assert_eq!(stats.total_skipped(), 0);
    }

    #[test]
    fn multi_measure_sets_route_to_the_multi_stream() {
        let xml = r#"
<ClinVarSet>
  <ReferenceClinVarAssertion>
    <ClinVarAccession Acc="RCV000000099" Type="RCV"/>
    <MeasureSet Type="Haplotype" ID="700">
      <Measure ID="1">
        <SequenceLocation Assembly="GRCh37" Chr="1" start="2" referenceAllele="C" alternateAllele="A"/>
      </Measure>
      <Measure ID="2">
        <SequenceLocation Assembly="GRCh37" Chr="1" start="7" referenceAllele="G" alternateAllele="C"/>
      </Measure>
      <Measure ID="3"/>
    </MeasureSet>
  </ReferenceClinVarAssertion>
</ClinVarSet>"#;
        let entry = parse_entry(xml);
        let mut reference = grch37_reference();
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        let routed = extractor.project(&entry, &mut stats);
        assert_eq!(routed.len(), 2, "measure without a location is skipped");
        assert!(routed.iter().all(|r| matches!(r, Routed::Multi(_))));
        assert_eq!(routed[0].record().key, VariantKey::new("1", 2, "C", "A"));
        assert_eq!(routed[1].record().key, VariantKey::new("1", 7, "G", "C"));
        assert_eq!(stats.multi_records, 2);
        assert_eq!(stats.skipped_missing_coordinate, 1);
    }

    #[test]
    fn entry_without_usable_location_is_skipped_and_counted() {
        let xml = r#"
<ClinVarSet>
  <ReferenceClinVarAssertion>
    <MeasureSet Type="Variant" ID="1">
      <Measure ID="10">
        <SequenceLocation Assembly="GRCh38" Chr="1" start="3" referenceAllele="G" alternateAllele="T"/>
        <SequenceLocation Assembly="GRCh37" Chr="1" start="3" referenceAllele="G"/>
      </Measure>
    </MeasureSet>
  </ReferenceClinVarAssertion>
</ClinVarSet>"#;
        let entry = parse_entry(xml);
        let mut reference = grch37_reference();
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        assert!(extractor.project(&entry, &mut stats).is_empty());
        assert_eq!(stats.skipped_missing_coordinate, 1);
    }

    #[test]
    fn ambiguous_and_missing_measure_sets_are_counted() {
        let two_sets = r#"
<ClinVarSet>
  <ReferenceClinVarAssertion>
    <MeasureSet ID="1"><Measure ID="1"/></MeasureSet>
    <MeasureSet ID="2"><Measure ID="2"/></MeasureSet>
  </ReferenceClinVarAssertion>
</ClinVarSet>"#;
        let none = r#"<ClinVarSet><ReferenceClinVarAssertion/></ClinVarSet>"#;

        let mut reference = grch37_reference();
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        assert!(extractor.project(&parse_entry(two_sets), &mut stats).is_empty());
        assert!(extractor.project(&parse_entry(none), &mut stats).is_empty());
        assert_eq!(stats.skipped_ambiguous_measure_set, 1);
        assert_eq!(stats.skipped_missing_measure, 1);
    }

    #[test]
    fn ref_mismatch_skips_the_record_not_the_stream() {
        let xml = r#"
<ClinVarSet>
  <ReferenceClinVarAssertion>
    <MeasureSet Type="Variant" ID="1">
      <Measure ID="10">
        <SequenceLocation Assembly="GRCh37" Chr="1" start="3" referenceAllele="T" alternateAllele="A"/>
      </Measure>
    </MeasureSet>
  </ReferenceClinVarAssertion>
</ClinVarSet>"#;
        let entry = parse_entry(xml);
        let mut reference = grch37_reference(); // true base at pos 3 is G
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        assert!(extractor.project(&entry, &mut stats).is_empty());
        assert_eq!(stats.skipped_ref_mismatch, 1);
    }

    #[test]
    fn equals_sign_in_cdna_hgvs_marks_the_reference_allele() {
        let xml = r#"
<ClinVarSet>
  <ReferenceClinVarAssertion>
    <MeasureSet Type="Variant" ID="1">
      <Measure ID="10">
        <AttributeSet>
          <Attribute Type="HGVS, coding, RefSeq">NM_000000.1:c.100=</Attribute>
        </AttributeSet>
        <SequenceLocation Assembly="GRCh37" Chr="1" start="3" referenceAllele="G" alternateAllele="T"/>
      </Measure>
    </MeasureSet>
  </ReferenceClinVarAssertion>
</ClinVarSet>"#;
        let entry = parse_entry(xml);
        let mut reference = grch37_reference();
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        let routed = extractor.project(&entry, &mut stats);
        assert_eq!(routed[0].record().mutant_allele, MutantAllele::Ref);
    }

    #[test]
    fn conflicting_scv_descriptions_flag_the_entry() {
        let xml = r#"
<ClinVarSet>
  <ReferenceClinVarAssertion>
    <ClinicalSignificance>
      <ReviewStatus>criteria provided, conflicting interpretations</ReviewStatus>
      <Description>Conflicting interpretations of pathogenicity</Description>
    </ClinicalSignificance>
    <MeasureSet Type="Variant" ID="1">
      <Measure ID="10">
        <SequenceLocation Assembly="GRCh37" Chr="1" start="3" referenceAllele="G" alternateAllele="T"/>
      </Measure>
    </MeasureSet>
  </ReferenceClinVarAssertion>
  <ClinVarAssertion>
    <ClinicalSignificance><Description>Pathogenic</Description></ClinicalSignificance>
  </ClinVarAssertion>
  <ClinVarAssertion>
    <ClinicalSignificance><Description>Benign</Description></ClinicalSignificance>
  </ClinVarAssertion>
  <ClinVarAssertion>
    <ClinicalSignificance><Description>not provided</Description></ClinicalSignificance>
  </ClinVarAssertion>
</ClinVarSet>"#;
        let entry = parse_entry(xml);
        let mut reference = grch37_reference();
        let mut extractor = Extractor::new(&mut reference, &ExtractOptions::default());
        let mut stats = ExtractStats::default();

        let routed = extractor.project(&entry, &mut stats);
        let record = routed[0].record();
        assert!(record.conflicted);
        assert_eq!(record.counts.pathogenic, 1);
        assert_eq!(record.counts.benign, 1);
        assert_eq!(
            record.clinical_significance_ordered,
            vec!["pathogenic", "benign", "not provided"]
        );
        assert_eq!(record.gold_stars, 1);
    }
}
