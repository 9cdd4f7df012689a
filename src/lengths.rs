//! Per-gene length metrics.
//!
//! Two numbers are computed for every gene:
//! - `gene_length`: bases covered by the union of all exons of all transcripts
//! - `max_transcript_length`: the largest naive exon-length sum of any one transcript
//!
//! The union is measured with a boundary sweep over a depth counter. At each
//! boundary locus exons starting there are opened first, the locus is counted
//! if any exon is open, and exons ending there are closed afterwards. Exons
//! are closed intervals, so an exon ending at P and another starting at P
//! leave no gap at P.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::model::transcript::Transcript;
use crate::types::{Exon, Pos};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LengthError {
    #[error("invalid exon coordinates: start={start}, end={end} (need 0 < start <= end)")]
    InvalidExon { start: Pos, end: Pos },

    #[error("exon record without a {what} id")]
    MissingId { what: &'static str },

    #[error("{gene}: max transcript length ({max_transcript_length}) cannot exceed gene length ({gene_length})")]
    Inconsistent {
        gene: String,
        max_transcript_length: u128,
        gene_length: u64,
    },
}

/// Result row for one gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneLengths {
    pub gene_id: String,
    pub gene_length: u64,
    /// Naive sums may exceed any single coordinate range.
    pub max_transcript_length: u128,
}

impl GeneLengths {
    /// A single transcript can never cover more bases than the union of all
    /// transcripts of its gene.
    pub fn check(&self) -> Result<(), LengthError> {
        if self.max_transcript_length > u128::from(self.gene_length) {
            return Err(LengthError::Inconsistent {
                gene: self.gene_id.clone(),
                max_transcript_length: self.max_transcript_length,
                gene_length: self.gene_length,
            });
        }
        Ok(())
    }
}

/// Number of positions covered by at least one exon.
///
/// Duplicated and nested exons do not add coverage. An empty input yields 0.
///
/// Only boundary loci are visited; the stretch between two consecutive
/// boundaries has a constant depth and is counted in one step.
pub fn covered_length<'a, I>(exons: I) -> u64
where
    I: IntoIterator<Item = &'a Exon>,
{
    let mut starts_at: HashMap<Pos, u64> = HashMap::new();
    let mut ends_at: HashMap<Pos, u64> = HashMap::new();

    for exon in exons {
        *starts_at.entry(exon.start()).or_insert(0) += 1;
        *ends_at.entry(exon.end()).or_insert(0) += 1;
    }

    let mut boundaries: Vec<Pos> = starts_at.keys().chain(ends_at.keys()).copied().collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut depth: u64 = 0;
    let mut covered: u64 = 0;

    for (i, &locus) in boundaries.iter().enumerate() {
        depth += starts_at.get(&locus).copied().unwrap_or(0);

        if depth > 0 {
            covered += 1;
        }

        // every exon ending here started at or before `locus`, so it is open
        depth -= ends_at.get(&locus).copied().unwrap_or(0);

        if depth > 0 {
            if let Some(&next) = boundaries.get(i + 1) {
                covered += next - locus - 1;
            }
        }
    }

    debug_assert_eq!(depth, 0);
    covered
}

/// Largest naive exon-length sum over `transcripts`; 0 when there are none.
///
/// Overlapping exons inside one transcript are not merged.
pub fn max_transcript_length<'a, I>(transcripts: I) -> u128
where
    I: IntoIterator<Item = &'a Transcript>,
{
    let mut max_len: u128 = 0;
    for tx in transcripts {
        let len = tx.length();
        debug!("Transcript {} length {}", tx.id, len);
        max_len = max_len.max(len);
    }
    max_len
}
