//! End-to-end run of the pipeline stages: extraction from a small release
//! document, an in-process key sort standing in for the external `sort`, and
//! consolidation of the sorted stream.

use std::io::Write;

use pretty_assertions::assert_eq;

use clindex_alleles::consolidate::{KeyMode, consolidate_file};
use clindex_alleles::extract::{ExtractOptions, extract_file};
use clindex_core::{AlleleRecord, VariantKey};
use clindex_refseq::InMemoryReference;

// Two entries assert the same variant (chr1:3 G>T, once written with
// redundant context), a third asserts a different one, and a fourth carries
// no usable coordinates.
const RELEASE: &str = r#"<?xml version="1.0"?>
<ReleaseSet Dated="2017-01-04">
  <ClinVarSet>
    <ReferenceClinVarAssertion>
      <ClinVarAccession Acc="RCV000000001" Type="RCV"/>
      <ClinicalSignificance>
        <ReviewStatus>criteria provided, single submitter</ReviewStatus>
        <Description>Pathogenic</Description>
      </ClinicalSignificance>
      <MeasureSet Type="Variant" ID="100">
        <Measure ID="1000">
          <SequenceLocation Assembly="GRCh37" Chr="1" start="3" referenceAllele="G" alternateAllele="T"/>
        </Measure>
      </MeasureSet>
    </ReferenceClinVarAssertion>
    <ClinVarAssertion>
      <ClinVarSubmissionID submitter="LabA"/>
      <ClinicalSignificance>
        <ReviewStatus>criteria provided, single submitter</ReviewStatus>
        <Description>Pathogenic</Description>
      </ClinicalSignificance>
      <Citation><ID Source="PubMed">11111</ID></Citation>
    </ClinVarAssertion>
  </ClinVarSet>
  <ClinVarSet>
    <ReferenceClinVarAssertion>
      <ClinVarAccession Acc="RCV000000002" Type="RCV"/>
      <ClinicalSignificance>
        <ReviewStatus>criteria provided, single submitter</ReviewStatus>
        <Description>Pathogenic</Description>
      </ClinicalSignificance>
      <MeasureSet Type="Variant" ID="100">
        <Measure ID="1000">
          <SequenceLocation Assembly="GRCh37" Chr="1" start="2" referenceAllele="CGT" alternateAllele="CTT"/>
        </Measure>
      </MeasureSet>
    </ReferenceClinVarAssertion>
    <ClinVarAssertion>
      <ClinVarSubmissionID submitter="LabB"/>
      <ClinicalSignificance>
        <ReviewStatus>criteria provided, single submitter</ReviewStatus>
        <Description>Pathogenic</Description>
      </ClinicalSignificance>
      <Comment>Previously reported, PubMed 11111 and 22222.</Comment>
    </ClinVarAssertion>
  </ClinVarSet>
  <ClinVarSet>
    <ReferenceClinVarAssertion>
      <ClinVarAccession Acc="RCV000000003" Type="RCV"/>
      <ClinicalSignificance>
        <ReviewStatus>reviewed by expert panel</ReviewStatus>
        <Description>Benign</Description>
      </ClinicalSignificance>
      <MeasureSet Type="Variant" ID="200">
        <Measure ID="2000">
          <SequenceLocation Assembly="GRCh37" Chr="1" start="7" referenceAllele="G" alternateAllele="A"/>
        </Measure>
      </MeasureSet>
    </ReferenceClinVarAssertion>
  </ClinVarSet>
  <ClinVarSet>
    <ReferenceClinVarAssertion>
      <ClinVarAccession Acc="RCV000000004" Type="RCV"/>
      <MeasureSet Type="Variant" ID="300">
        <Measure ID="3000"/>
      </MeasureSet>
    </ReferenceClinVarAssertion>
  </ClinVarSet>
</ReleaseSet>"#;

#[test]
fn extract_sort_consolidate() {
    let dir = tempfile::tempdir().unwrap();
    let xml_path = dir.path().join("release.xml");
    std::fs::write(&xml_path, RELEASE).unwrap();

    let mut reference = InMemoryReference::new().with_contig("1", "ACGTACGT");
    let mut single_out: Vec<u8> = Vec::new();
    let mut multi_out: Vec<u8> = Vec::new();

    let stats = extract_file(
        &xml_path,
        &mut reference,
        &ExtractOptions::default(),
        &mut single_out,
        &mut multi_out,
    )
    .unwrap();

    assert_eq!(stats.entries, 4);
    assert_eq!(stats.single_records, 3);
    assert_eq!(stats.multi_records, 0);
    assert_eq!(stats.skipped_missing_coordinate, 1);

    let single_text = String::from_utf8(single_out).unwrap();
    let mut lines = single_text.lines();
    assert_eq!(lines.next().unwrap(), AlleleRecord::header());
    let mut records: Vec<AlleleRecord> = lines
        .map(|line| AlleleRecord::from_tsv_row(line).unwrap())
        .collect();
    assert_eq!(records.len(), 3);

    // The padded representation of the second entry normalized to the same
    // key as the first.
    assert_eq!(records[0].key, VariantKey::new("1", 3, "G", "T"));
    assert_eq!(records[1].key, VariantKey::new("1", 3, "G", "T"));
    assert_eq!(records[2].key, VariantKey::new("1", 7, "G", "A"));

    // The multi-allele stream holds only its header.
    let multi_text = String::from_utf8(multi_out).unwrap();
    assert_eq!(multi_text.trim_end(), AlleleRecord::header());

    // Stand-in for the external key sort between the stages.
    records.sort_by(|a, b| a.key.cmp(&b.key));
    let sorted_path = dir.path().join("sorted.tsv");
    let mut sorted = std::fs::File::create(&sorted_path).unwrap();
    writeln!(sorted, "{}", AlleleRecord::header()).unwrap();
    for record in &records {
        writeln!(sorted, "{}", record.to_tsv_row()).unwrap();
    }
    drop(sorted);

    let mut consolidated_out: Vec<u8> = Vec::new();
    let (rows_read, rows_written) =
        consolidate_file(&sorted_path, &mut consolidated_out, KeyMode::Coordinates).unwrap();
    assert_eq!((rows_read, rows_written), (3, 2));

    let text = String::from_utf8(consolidated_out).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), AlleleRecord::header());
    let rows: Vec<AlleleRecord> = lines
        .map(|line| AlleleRecord::from_tsv_row(line).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);

    let merged = &rows[0];
    assert_eq!(merged.key, VariantKey::new("1", 3, "G", "T"));
    assert_eq!(merged.rcv, vec!["RCV000000001", "RCV000000002"]);
    assert_eq!(merged.all_submitters, vec!["LabA", "LabB"]);
    // Citation and comment PMIDs merged without duplicating 11111.
    assert_eq!(merged.all_pmids, vec!["11111", "22222"]);
    assert_eq!(merged.counts.pathogenic, 2);
    assert!(!merged.conflicted);
    assert_eq!(
        merged.review_status,
        "criteria provided, multiple submitters, no conflicts"
    );
    assert_eq!(merged.gold_stars, 2);

    let expert = &rows[1];
    assert_eq!(expert.key, VariantKey::new("1", 7, "G", "A"));
    assert_eq!(expert.clinical_significance, "benign");
    assert_eq!(expert.gold_stars, 3);
}
