//! # Core library for clindex
//!
//! Shared data model for turning the ClinVar release into a per-allele table:
//!
//! - `models::variant` - the `VariantKey` identity key for a genomic allele
//! - `models::record` - the typed `AlleleRecord` row schema and its TSV form
//! - `models::ranking` - process-wide review-status / significance rankings
//! - `utils` - gzip-aware readers and field text sanitization

pub mod errors;
pub mod models;
pub mod utils;

pub use errors::RowError;
pub use models::ranking;
pub use models::record::{AlleleRecord, MutantAllele, SignificanceCounts, COLUMNS};
pub use models::variant::VariantKey;
