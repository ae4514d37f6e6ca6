//! # Reference sequence access for clindex
//!
//! Variant normalization needs many tiny random-access lookups into a
//! multi-gigabase reference genome. This crate provides the
//! [`ReferenceSequence`] trait plus two implementations:
//!
//! - [`fasta::IndexedFasta`] - FAI-indexed FASTA file, reading only the
//!   requested window from disk (no whole-chromosome loads)
//! - [`memory::InMemoryReference`] - contig strings held in memory, for
//!   tests and small fixtures

pub mod fasta;
pub mod memory;

use thiserror::Error;

pub use fasta::IndexedFasta;
pub use memory::InMemoryReference;

#[derive(Error, Debug)]
pub enum RefseqError {
    #[error("contig '{contig}' not present in the reference")]
    UnknownContig { contig: String },

    #[error("interval {start}..{end} on '{contig}' exceeds contig length {length}")]
    OutOfRange {
        contig: String,
        start: u64,
        end: u64,
        length: u64,
    },

    #[error("invalid interval {start}..{end} (start must not exceed end)")]
    InvalidInterval { start: u64, end: u64 },

    #[error("FASTA index not found for {path} (expected a samtools faidx .fai file)")]
    MissingIndex { path: String },

    #[error("FASTA index record for '{contig}' is malformed (zero bases per line)")]
    InvalidIndex { contig: String },

    #[error("reference sequence holds non-text bytes on contig '{contig}'")]
    InvalidData { contig: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Random access into a reference genome.
///
/// `start..end` is a 0-based half-open interval. Implementations return the
/// literal bases as stored (case is preserved; callers normalize case).
pub trait ReferenceSequence {
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<String, RefseqError>;
}
