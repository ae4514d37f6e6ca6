//! # ClinVar allele extraction and consolidation
//!
//! This crate is the algorithmic stage of the clindex pipeline:
//!
//! - `xml` - stream `<ClinVarSet>` subtrees out of the full-release dump
//! - `extract` - project each subtree into flat per-allele records, routed
//!   to a single-allele or multi-allele stream, with per-reason skip counts
//! - `normalize` - convert coordinates to the VCF minimal representation
//!   (Tan et al. 2015) against an indexed reference genome
//! - `pubmed` - best-effort PubMed-ID scanning of free-text comments
//! - `consolidate` - merge a key-sorted record stream into one row per
//!   unique allele with ranked conflict resolution
//!
//! The stages are connected by sorted TSV streams; sorting itself is left to
//! the surrounding orchestration. Note that the expected order is not a
//! plain `sort -k1,1n`: numeric chromosomes (1-22) sort numerically first,
//! then the X/Y/MT rows follow lexicographically, i.e. two passes
//! (`grep -v '^[XYM]' | sort -k1,1n -k2,2n -k3,3 -k4,4` followed by
//! `grep '^[XYM]' | sort -k1,1 -k2,2n -k3,3 -k4,4` appended). `VariantKey`'s
//! `Ord` implements exactly this order, and the consolidator rejects input
//! that violates it.

pub mod consolidate;
pub mod extract;
pub mod normalize;
pub mod pubmed;
pub mod xml;

pub use consolidate::{Consolidator, ConsolidateError, KeyMode, consolidate, consolidate_file, merge};
pub use extract::{ExtractOptions, ExtractStats, Extractor, Routed, extract_file};
pub use normalize::{NormalizeError, normalize};
pub use pubmed::scan_comment;
pub use xml::{Element, SubtreeReader, XmlError};
