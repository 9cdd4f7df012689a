use crate::types::Exon;

/// Transcript model: an id and the exons annotated for it.
///
/// Exons are kept exactly as they were added: unsorted, and with coordinate
/// duplicates retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub id: String,
    exons: Vec<Exon>,
}

impl Transcript {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            exons: Vec::new(),
        }
    }

    pub fn add_exon(&mut self, exon: Exon) {
        self.exons.push(exon);
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }

    /// Naive sum of exon lengths. Overlapping exons are counted twice.
    ///
    /// Summed as `u128`: a single exon length already fills a `u64`.
    pub fn length(&self) -> u128 {
        self.exons.iter().map(|e| u128::from(e.len())).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_sums_exons_including_duplicates() {
        let mut tx = Transcript::new("T1");
        tx.add_exon(Exon::new(201, 300).unwrap());
        tx.add_exon(Exon::new(1, 100).unwrap());
        tx.add_exon(Exon::new(1, 100).unwrap());

        assert_eq!(tx.exons().len(), 3);
        assert_eq!(tx.length(), 300);
    }

    #[test]
    fn empty_transcript() {
        let tx = Transcript::new("T1");
        assert_eq!(tx.length(), 0);
    }

    #[test]
    fn length_of_huge_exons_does_not_overflow() {
        let mut tx = Transcript::new("T1");
        tx.add_exon(Exon::new(1, u64::MAX).unwrap());
        tx.add_exon(Exon::new(1, u64::MAX).unwrap());

        assert_eq!(tx.length(), 2 * u128::from(u64::MAX));
    }
}
