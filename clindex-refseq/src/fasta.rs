//! FAI-indexed FASTA access.
//!
//! Reads the samtools faidx `.fai` sidecar, then serves each fetch by
//! seeking straight to the byte window that holds the requested bases and
//! stripping line terminators. Lookups are O(1) in the genome size, so the
//! normalizer can issue millions of single-base fetches cheaply.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use fxhash::FxHashMap;
use noodles::fasta::fai;

use crate::{ReferenceSequence, RefseqError};

#[derive(Debug, Clone)]
struct ContigIndex {
    length: u64,
    offset: u64,
    line_bases: u64,
    line_width: u64,
}

impl ContigIndex {
    /// Byte offset of the base at 0-based sequence position `pos`.
    fn file_offset(&self, pos: u64) -> u64 {
        self.offset + (pos / self.line_bases) * self.line_width + pos % self.line_bases
    }
}

/// Find the `.fai` sidecar for a FASTA file: `ref.fa.fai` first (samtools
/// convention), then `ref.fai`.
fn find_fai_path(fasta_path: &Path) -> Option<PathBuf> {
    let appended = PathBuf::from(format!("{}.fai", fasta_path.display()));
    if appended.exists() {
        return Some(appended);
    }
    let replaced = fasta_path.with_extension("fai");
    if replaced.exists() {
        return Some(replaced);
    }
    None
}

/// An open FASTA file plus its FAI index.
pub struct IndexedFasta {
    file: File,
    contigs: FxHashMap<String, ContigIndex>,
}

impl IndexedFasta {
    /// Open a FASTA file that has been indexed with `samtools faidx`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RefseqError> {
        let path = path.as_ref();
        let fai_path = find_fai_path(path).ok_or_else(|| RefseqError::MissingIndex {
            path: path.display().to_string(),
        })?;

        let index = fai::read(&fai_path)?;
        let records: &[fai::Record] = index.as_ref();

        let mut contigs =
            FxHashMap::with_capacity_and_hasher(records.len(), Default::default());
        for record in records {
            let name = String::from_utf8_lossy(record.name().as_ref()).into_owned();
            // line_bases divides every fetch offset.
            if record.line_bases() == 0 {
                return Err(RefseqError::InvalidIndex { contig: name });
            }
            contigs.insert(
                name,
                ContigIndex {
                    length: record.length(),
                    offset: record.offset(),
                    line_bases: record.line_bases(),
                    line_width: record.line_width(),
                },
            );
        }

        let file = File::open(path)?;
        Ok(IndexedFasta { file, contigs })
    }

    /// Length of a contig, if present.
    pub fn contig_length(&self, chrom: &str) -> Option<u64> {
        self.contigs.get(chrom).map(|c| c.length)
    }
}

impl ReferenceSequence for IndexedFasta {
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<String, RefseqError> {
        if start > end {
            return Err(RefseqError::InvalidInterval { start, end });
        }
        let contig = self
            .contigs
            .get(chrom)
            .ok_or_else(|| RefseqError::UnknownContig {
                contig: chrom.to_string(),
            })?
            .clone();
        if end > contig.length {
            return Err(RefseqError::OutOfRange {
                contig: chrom.to_string(),
                start,
                end,
                length: contig.length,
            });
        }
        if start == end {
            return Ok(String::new());
        }

        let needed = (end - start) as usize;
        let raw_start = contig.file_offset(start);
        let raw_end = contig.file_offset(end);
        let raw_span = raw_end - raw_start;

        self.file.seek(SeekFrom::Start(raw_start))?;
        let mut raw = Vec::with_capacity(raw_span as usize);
        // take() tolerates a final line without a trailing terminator.
        (&mut self.file).take(raw_span).read_to_end(&mut raw)?;

        let bases: Vec<u8> = raw
            .into_iter()
            .filter(|b| *b != b'\n' && *b != b'\r')
            .take(needed)
            .collect();
        if bases.len() != needed {
            return Err(RefseqError::OutOfRange {
                contig: chrom.to_string(),
                start,
                end,
                length: contig.length,
            });
        }

        String::from_utf8(bases).map_err(|_| RefseqError::InvalidData {
            contig: chrom.to_string(),
        })
    }
}
