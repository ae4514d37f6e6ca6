//! Variant normalization to the VCF minimal representation.
//!
//! Implementation of the algorithm from Tan et al. 2015 ("Unified
//! representation of genetic variants", Bioinformatics 31(13)). Coordinates
//! translated from HGVS - as found in the ClinVar dump - may be non-minimal,
//! right-aligned rather than left-aligned, and may use `-` for an empty
//! allele; this converts all of them to the unique left-aligned form.

use clindex_core::VariantKey;
use clindex_refseq::{ReferenceSequence, RefseqError};
use thiserror::Error;

/// Per-record normalization failures. None of these abort the stream; the
/// caller skips and counts the offending record.
#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("invalid nucleotide sequence: {chrom} {pos} {ref_allele} {alt_allele}")]
    InvalidSequence {
        chrom: String,
        pos: u64,
        ref_allele: String,
        alt_allele: String,
    },

    #[error("incorrect REF value: {chrom} {pos} {claimed} (actual REF is {actual})")]
    RefMismatch {
        chrom: String,
        pos: u64,
        claimed: String,
        actual: String,
    },

    #[error("REF and ALT alleles are the same: {chrom} {pos} {allele}")]
    RefEqualsAlt {
        chrom: String,
        pos: u64,
        allele: String,
    },

    #[error("cannot left-extend past the start of contig {chrom}")]
    ContigStart { chrom: String },

    #[error(transparent)]
    Fetch(#[from] RefseqError),
}

fn is_valid_base(c: char) -> bool {
    matches!(c, 'A' | 'C' | 'G' | 'T' | 'N' | '-')
}

fn is_snv_base(allele: &str) -> bool {
    allele.len() == 1 && matches!(allele.as_bytes()[0], b'A' | b'C' | b'G' | b'T')
}

/// Normalize `(chrom, pos, ref, alt)` against the reference genome.
///
/// `pos` is 1-based. `ref_allele`/`alt_allele` may be mixed case and may use
/// the `-` placeholder for an empty allele. On success the returned key is
/// minimal and left-aligned; normalizing it again is a no-op.
pub fn normalize<R: ReferenceSequence + ?Sized>(
    reference: &mut R,
    chrom: &str,
    pos: u64,
    ref_allele: &str,
    alt_allele: &str,
) -> Result<VariantKey, NormalizeError> {
    let mut ref_allele = ref_allele.to_uppercase();
    let mut alt_allele = alt_allele.to_uppercase();
    let mut pos = pos;

    // pos is 1-based; 0 cannot be anchored anywhere.
    if pos == 0
        || ref_allele.chars().chain(alt_allele.chars()).any(|c| !is_valid_base(c))
    {
        return Err(NormalizeError::InvalidSequence {
            chrom: chrom.to_string(),
            pos,
            ref_allele,
            alt_allele,
        });
    }

    // The dump writes empty alleles as a hyphen.
    if ref_allele == "-" {
        ref_allele.clear();
    }
    if alt_allele == "-" {
        alt_allele.clear();
    }

    let true_ref = reference
        .fetch(chrom, pos - 1, pos - 1 + ref_allele.len() as u64)?
        .to_uppercase();
    if ref_allele != true_ref {
        return Err(NormalizeError::RefMismatch {
            chrom: chrom.to_string(),
            pos,
            claimed: ref_allele,
            actual: true_ref,
        });
    }

    // REF == ALT occurs in the dump and would loop forever below.
    if ref_allele == alt_allele {
        return Err(NormalizeError::RefEqualsAlt {
            chrom: chrom.to_string(),
            pos,
            allele: ref_allele,
        });
    }

    // Fast path for SNVs that are already minimal.
    if is_snv_base(&ref_allele) && is_snv_base(&alt_allele) {
        return Ok(VariantKey::new(chrom, pos, ref_allele, alt_allele));
    }

    // Algorithm 1 lines 1-6: right-trim shared suffix bases, left-extending
    // from the reference whenever an allele empties out.
    loop {
        let mut worked = false;
        if !ref_allele.is_empty()
            && !alt_allele.is_empty()
            && ref_allele.as_bytes().last() == alt_allele.as_bytes().last()
        {
            ref_allele.pop();
            alt_allele.pop();
            worked = true;
        }
        if ref_allele.is_empty() || alt_allele.is_empty() {
            if pos < 2 {
                return Err(NormalizeError::ContigStart {
                    chrom: chrom.to_string(),
                });
            }
            let preceding = reference.fetch(chrom, pos - 2, pos - 1)?.to_uppercase();
            ref_allele.insert_str(0, &preceding);
            alt_allele.insert_str(0, &preceding);
            pos -= 1;
            worked = true;
        }
        if !worked {
            break;
        }
    }

    // Algorithm 1 lines 7-8: left-trim shared prefix bases.
    while ref_allele.len() > 1
        && alt_allele.len() > 1
        && ref_allele.as_bytes()[0] == alt_allele.as_bytes()[0]
    {
        ref_allele.remove(0);
        alt_allele.remove(0);
        pos += 1;
    }

    Ok(VariantKey::new(chrom, pos, ref_allele, alt_allele))
}
