use std::cmp::Ordering;
use std::fmt;

/// Identity key for a genomic allele: `(chrom, pos, ref, alt)` in the VCF
/// minimal representation.
///
/// `pos` is 1-based. After normalization `ref_allele`/`alt_allele` contain
/// only `A`/`C`/`G`/`T`/`N`; equality is exact byte equality, so two inputs
/// that differ only in representation must be normalized before comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_allele: String,
}

impl VariantKey {
    pub fn new(
        chrom: impl Into<String>,
        pos: u64,
        ref_allele: impl Into<String>,
        alt_allele: impl Into<String>,
    ) -> Self {
        VariantKey {
            chrom: chrom.into(),
            pos,
            ref_allele: ref_allele.into(),
            alt_allele: alt_allele.into(),
        }
    }
}

/// Orders chromosome names the way the sorted table is produced: numeric
/// contigs (1-22) in numeric order, then non-numeric contigs (X, Y, MT)
/// lexicographically after them.
fn chrom_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Ord for VariantKey {
    fn cmp(&self, other: &Self) -> Ordering {
        chrom_cmp(&self.chrom, &other.chrom)
            .then_with(|| self.pos.cmp(&other.pos))
            .then_with(|| self.ref_allele.cmp(&other.ref_allele))
            .then_with(|| self.alt_allele.cmp(&other.alt_allele))
    }
}

impl PartialOrd for VariantKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.chrom, self.pos, self.ref_allele, self.alt_allele
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keys_order_by_numeric_chrom_then_pos() {
        let a = VariantKey::new("2", 100, "A", "T");
        let b = VariantKey::new("10", 5, "A", "T");
        assert!(a < b, "chrom 2 must sort before chrom 10");

        let c = VariantKey::new("2", 99, "A", "T");
        assert!(c < a);
    }

    #[test]
    fn non_numeric_chroms_sort_after_numeric() {
        let x = VariantKey::new("X", 1, "A", "T");
        let n = VariantKey::new("22", 999_999_999, "A", "T");
        assert!(n < x);

        let mt = VariantKey::new("MT", 1, "A", "T");
        assert!(mt < x, "MT sorts lexicographically before X");
    }

    #[test]
    fn equal_coordinates_tie_break_on_alleles() {
        let a = VariantKey::new("1", 100, "A", "C");
        let b = VariantKey::new("1", 100, "A", "G");
        assert!(a < b);
        assert_eq!(a, a.clone());
    }
}
