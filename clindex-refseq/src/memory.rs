//! In-memory reference, used by tests and small fixtures.

use fxhash::FxHashMap;

use crate::{ReferenceSequence, RefseqError};

/// Reference genome held as plain contig strings.
#[derive(Debug, Default, Clone)]
pub struct InMemoryReference {
    contigs: FxHashMap<String, String>,
}

impl InMemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style contig insertion.
    pub fn with_contig(mut self, name: impl Into<String>, sequence: impl Into<String>) -> Self {
        self.contigs.insert(name.into(), sequence.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, sequence: impl Into<String>) {
        self.contigs.insert(name.into(), sequence.into());
    }
}

impl ReferenceSequence for InMemoryReference {
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<String, RefseqError> {
        if start > end {
            return Err(RefseqError::InvalidInterval { start, end });
        }
        let sequence = self
            .contigs
            .get(chrom)
            .ok_or_else(|| RefseqError::UnknownContig {
                contig: chrom.to_string(),
            })?;
        let length = sequence.len() as u64;
        if end > length {
            return Err(RefseqError::OutOfRange {
                contig: chrom.to_string(),
                start,
                end,
                length,
            });
        }
        Ok(sequence[start as usize..end as usize].to_string())
    }
}
