use crate::lengths::LengthError;

/// A genomic position on the annotation's 1-based axis.
pub type Pos = u64;

/// A single exon as a closed interval.
/// Coordinates are 1-based and inclusive on both ends: [start, end]
///
/// Two exons with identical coordinates are still distinct values; callers
/// keep every copy they are given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exon {
    start: Pos,
    end: Pos,
}

impl Exon {
    /// Create a new exon. Fails unless `0 < start <= end`.
    pub fn new(start: Pos, end: Pos) -> Result<Self, LengthError> {
        if start == 0 || end < start {
            return Err(LengthError::InvalidExon { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn start(self) -> Pos {
        self.start
    }

    #[inline]
    pub fn end(self) -> Pos {
        self.end
    }

    /// Number of bases covered, `end - start + 1`. Never zero.
    #[inline]
    pub fn len(self) -> u64 {
        self.end - self.start + 1
    }
}
