//! Consolidation of a key-sorted record stream into one row per allele.
//!
//! Extraction emits one record per ClinVar entry, so an allele asserted by
//! several entries appears several times. After an external sort on the
//! variant key, consolidation merges each run of equal-key records into a
//! single row: list fields union in first-seen order, `_ordered` fields
//! concatenate, counts sum, and the ranked categorical fields resolve to the
//! highest-confidence contributor.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use thiserror::Error;

use clindex_core::errors::RowError;
use clindex_core::models::record::join_list;
use clindex_core::ranking::{
    REVSTAT_MULTIPLE_NO_CONFLICT, REVSTAT_SINGLE_SUBMITTER, review_status_rank,
    significance_severity,
};
use clindex_core::utils::get_dynamic_reader;
use clindex_core::{AlleleRecord, MutantAllele};

#[derive(Error, Debug)]
pub enum ConsolidateError {
    #[error("input is not sorted by variant key: {previous} precedes {current}")]
    UnsortedInput { previous: String, current: String },

    #[error("input contains no records")]
    EmptyInput,

    #[error("cannot merge records with different keys: {left} vs {right}")]
    KeyMismatch { left: String, right: String },

    #[error(transparent)]
    Row(#[from] RowError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What makes two records "the same allele".
///
/// `Coordinates` treats the variant key alone as identity; this is the final
/// deduplication pass where all rows for one site collapse. In
/// `CoordinatesAndAllele` mode records must also share their allele IDs, so
/// distinct ClinVar alleles that normalize to the same coordinates stay
/// separate rows; the input must then be sorted by allele ID within each
/// coordinate as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    #[default]
    Coordinates,
    CoordinatesAndAllele,
}

fn same_group(mode: KeyMode, a: &AlleleRecord, b: &AlleleRecord) -> bool {
    if a.key != b.key {
        return false;
    }
    match mode {
        KeyMode::Coordinates => true,
        KeyMode::CoordinatesAndAllele => a.allele_id == b.allele_id,
    }
}

fn group_label(mode: KeyMode, record: &AlleleRecord) -> String {
    match mode {
        KeyMode::Coordinates => record.key.to_string(),
        KeyMode::CoordinatesAndAllele => {
            format!("{} allele {}", record.key, join_list(&record.allele_id))
        }
    }
}

fn merge_list(into: &mut Vec<String>, from: Vec<String>) {
    for value in from {
        if !into.contains(&value) {
            into.push(value);
        }
    }
}

/// Merge `other` into `into`. Both records must share a variant key.
///
/// A REF-orientation record loses to an ALT record outright: the ALT side
/// replaces it wholesale rather than mixing assertions about two different
/// alleles into one row.
pub fn merge(into: &mut AlleleRecord, other: AlleleRecord) -> Result<(), ConsolidateError> {
    if into.key != other.key {
        return Err(ConsolidateError::KeyMismatch {
            left: into.key.to_string(),
            right: other.key.to_string(),
        });
    }

    match (into.mutant_allele, other.mutant_allele) {
        (MutantAllele::Ref, MutantAllele::Alt) => {
            *into = other;
            return Ok(());
        }
        (MutantAllele::Alt, MutantAllele::Ref) => return Ok(()),
        _ => {}
    }

    let into_status = into.review_status.to_lowercase();
    let other_status = other.review_status.to_lowercase();
    let into_rank = review_status_rank(&into.review_status);
    let other_rank = review_status_rank(&other.review_status);

    // Two assertions disagree when both carry a significance and the values
    // differ.
    let disagree = !into.clinical_significance.is_empty()
        && !other.clinical_significance.is_empty()
        && into.clinical_significance.to_lowercase() != other.clinical_significance.to_lowercase();
    into.conflicted |= other.conflicted || disagree;

    let other_wins = other_rank > into_rank
        || (other_rank == into_rank
            && significance_severity(&other.clinical_significance)
                > significance_severity(&into.clinical_significance));
    if other_wins {
        into.clinical_significance = other.clinical_significance;
        into.review_status = other.review_status;
    }

    merge_list(&mut into.measureset_type, other.measureset_type);
    merge_list(&mut into.measureset_id, other.measureset_id);
    merge_list(&mut into.rcv, other.rcv);
    merge_list(&mut into.allele_id, other.allele_id);
    merge_list(&mut into.symbol, other.symbol);
    merge_list(&mut into.hgvs_c, other.hgvs_c);
    merge_list(&mut into.hgvs_p, other.hgvs_p);
    merge_list(&mut into.molecular_consequence, other.molecular_consequence);
    merge_list(&mut into.all_submitters, other.all_submitters);
    merge_list(&mut into.all_traits, other.all_traits);
    merge_list(&mut into.all_pmids, other.all_pmids);
    merge_list(&mut into.inheritance_modes, other.inheritance_modes);
    merge_list(&mut into.age_of_onset, other.age_of_onset);
    merge_list(&mut into.prevalence, other.prevalence);
    merge_list(&mut into.disease_mechanism, other.disease_mechanism);
    merge_list(&mut into.origin, other.origin);
    merge_list(&mut into.xrefs, other.xrefs);

    into.clinical_significance_ordered
        .extend(other.clinical_significance_ordered);
    into.review_status_ordered.extend(other.review_status_ordered);
    into.submitters_ordered.extend(other.submitters_ordered);

    into.counts.add(&other.counts);

    // Two agreeing single-submitter assertions amount to multiple submitters
    // without conflict.
    if into_status == REVSTAT_SINGLE_SUBMITTER
        && other_status == REVSTAT_SINGLE_SUBMITTER
        && !into.conflicted
    {
        into.review_status = REVSTAT_MULTIPLE_NO_CONFLICT.to_string();
    }
    into.update_gold_stars();
    Ok(())
}

/// Adapts a key-sorted record iterator into an iterator of consolidated
/// records, one per group. Groups are formed by [`KeyMode`]; key order is
/// verified as the stream is consumed.
pub struct Consolidator<I: Iterator<Item = Result<AlleleRecord, ConsolidateError>>> {
    source: I,
    mode: KeyMode,
    pending: Option<AlleleRecord>,
    emitted_any: bool,
    finished: bool,
}

impl<I: Iterator<Item = Result<AlleleRecord, ConsolidateError>>> Consolidator<I> {
    fn emit(&mut self, next_pending: Option<AlleleRecord>) -> Option<AlleleRecord> {
        let done = std::mem::replace(&mut self.pending, next_pending);
        if done.is_some() {
            self.emitted_any = true;
        }
        done
    }
}

impl<I: Iterator<Item = Result<AlleleRecord, ConsolidateError>>> Iterator for Consolidator<I> {
    type Item = Result<AlleleRecord, ConsolidateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let record = match self.source.next() {
                Some(Ok(record)) => record,
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    return match self.emit(None) {
                        Some(done) => Some(Ok(done)),
                        None if self.emitted_any => None,
                        None => Some(Err(ConsolidateError::EmptyInput)),
                    };
                }
            };

            let Some(pending) = self.pending.as_mut() else {
                self.pending = Some(record);
                continue;
            };

            // A coordinate step backward is always unsorted; in allele-keyed
            // mode a step backward within one coordinate is too, since an
            // interleaved allele would otherwise split its group silently.
            let backward = record.key < pending.key
                || (self.mode == KeyMode::CoordinatesAndAllele
                    && record.key == pending.key
                    && record.allele_id < pending.allele_id);
            if backward {
                self.finished = true;
                return Some(Err(ConsolidateError::UnsortedInput {
                    previous: group_label(self.mode, pending),
                    current: group_label(self.mode, &record),
                }));
            }
            if same_group(self.mode, pending, &record) {
                if let Err(e) = merge(pending, record) {
                    self.finished = true;
                    return Some(Err(e));
                }
                continue;
            }
            return self.emit(Some(record)).map(Ok);
        }
    }
}

/// Consolidate a key-sorted record stream.
pub fn consolidate<I>(source: I, mode: KeyMode) -> Consolidator<I::IntoIter>
where
    I: IntoIterator<Item = Result<AlleleRecord, ConsolidateError>>,
{
    Consolidator {
        source: source.into_iter(),
        mode,
        pending: None,
        emitted_any: false,
        finished: false,
    }
}

/// Consolidate a sorted TSV file into `output`. The input must start with the
/// standard header row. Returns `(rows_read, rows_written)`.
pub fn consolidate_file(
    input: &Path,
    output: &mut dyn Write,
    mode: KeyMode,
) -> Result<(u64, u64)> {
    let reader = get_dynamic_reader(input)
        .with_context(|| format!("Failed to open sorted allele table: {:?}", input))?;
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => bail!("{:?} is empty; expected a header row", input),
    };
    if header != AlleleRecord::header() {
        bail!(
            "unexpected header in {:?}: expected {:?} columns starting with \"chrom\"",
            input,
            clindex_core::COLUMNS.len()
        );
    }

    let mut rows_read: u64 = 0;
    let records = lines.filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => {
            rows_read += 1;
            Some(AlleleRecord::from_tsv_row(&line).map_err(ConsolidateError::from))
        }
        Err(e) => Some(Err(ConsolidateError::Io(e))),
    });

    writeln!(output, "{}", AlleleRecord::header())?;
    let mut rows_written: u64 = 0;
    for consolidated in consolidate(records, mode) {
        let record = consolidated
            .with_context(|| format!("Failed to consolidate {:?}", input))?;
        writeln!(output, "{}", record.to_tsv_row())?;
        rows_written += 1;
    }

    eprintln!(
        "consolidated {} rows into {} alleles from {:?}",
        rows_read, rows_written, input
    );
    Ok((rows_read, rows_written))
}
