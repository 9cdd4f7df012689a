use std::collections::BTreeMap;

use crate::lengths::{covered_length, max_transcript_length, GeneLengths};
use crate::model::transcript::Transcript;
use crate::types::Exon;

/// Gene model: an id and its transcripts keyed by transcript id.
///
/// Genes are only created when an exon is seen for them, so every gene built
/// by the catalog has at least one exon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub id: String,
    transcripts: BTreeMap<String, Transcript>,
}

impl Gene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transcripts: BTreeMap::new(),
        }
    }

    /// Append an exon to `tx_id`, creating the transcript on first use.
    pub fn add_exon(&mut self, tx_id: &str, exon: Exon) {
        self.transcripts
            .entry(tx_id.to_string())
            .or_insert_with(|| Transcript::new(tx_id))
            .add_exon(exon);
    }

    pub fn transcript(&self, tx_id: &str) -> Option<&Transcript> {
        self.transcripts.get(tx_id)
    }

    pub fn transcripts(&self) -> impl Iterator<Item = &Transcript> {
        self.transcripts.values()
    }

    pub fn n_transcripts(&self) -> usize {
        self.transcripts.len()
    }

    /// All exons of all transcripts, one multiset.
    pub fn exons(&self) -> impl Iterator<Item = &Exon> {
        self.transcripts.values().flat_map(|tx| tx.exons())
    }

    /// Bases covered by the union of all exons.
    pub fn gene_length(&self) -> u64 {
        covered_length(self.exons())
    }

    pub fn max_transcript_length(&self) -> u128 {
        max_transcript_length(self.transcripts())
    }

    pub fn lengths(&self) -> GeneLengths {
        GeneLengths {
            gene_id: self.id.clone(),
            gene_length: self.gene_length(),
            max_transcript_length: self.max_transcript_length(),
        }
    }
}
