use std::collections::BTreeMap;
use std::fmt;
use std::io::BufRead;

use log::info;

use crate::annotation::io::{AnnotationReader, ParseError};
use crate::lengths::{GeneLengths, LengthError};
use crate::model::gene::Gene;
use crate::types::{Exon, Pos};

const PROGRESS_EVERY: usize = 1000;

/// Configure which attribute keys are used to extract:
/// - gene identifier
/// - transcript identifier
/// - (GFF3) exon -> transcript linking keys (usually Parent)
///
/// Notes:
/// - We allow multiple keys per category; first present wins.
/// - For GFF3 Parent values, we split by ',' and treat each parent as a transcript ID.
#[derive(Debug, Clone)]
pub struct AttributeKeys {
    pub gene_id_keys: Vec<String>,
    pub transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage (most commonly: Parent)
    pub parent_keys: Vec<String>,

    /// Feature types that count as exons (default: ["exon"])
    pub exon_feature_types: Vec<String>,
}

impl Default for AttributeKeys {
    fn default() -> Self {
        Self {
            gene_id_keys: vec!["gene_id".into()],
            transcript_id_keys: vec!["transcript_id".into()],
            parent_keys: vec!["Parent".into()],
            exon_feature_types: vec!["exon".into()],
        }
    }
}

/// One exon as handed over by an annotation parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExonRecord {
    pub gene_id: String,
    pub transcript_id: String,
    pub start: Pos,
    pub end: Pos,
}

impl ExonRecord {
    pub fn new(gene_id: impl Into<String>, transcript_id: impl Into<String>, start: Pos, end: Pos) -> Self {
        Self {
            gene_id: gene_id.into(),
            transcript_id: transcript_id.into(),
            start,
            end,
        }
    }
}

/// All exons of a run grouped as gene -> transcript -> exons.
///
/// The catalog is filled once and then only read. Exons are appended as they
/// arrive and never merged or deduplicated; an exon listed twice counts twice
/// toward its transcript's length.
#[derive(Debug, Clone, Default)]
pub struct GeneCatalog {
    genes: BTreeMap<String, Gene>,
    n_exons: usize,
}

impl fmt::Display for GeneCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n_txs: usize = self.genes.values().map(|g| g.n_transcripts()).sum();
        write!(
            f,
            "GeneCatalog: {} genes, {} transcripts, {} exons",
            self.genes.len(),
            n_txs,
            self.n_exons
        )
    }
}

impl GeneCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one exon to `gene_id`/`transcript_id`.
    pub fn add_exon(&mut self, gene_id: &str, transcript_id: &str, exon: Exon) {
        match self.genes.get_mut(gene_id) {
            Some(gene) => gene.add_exon(transcript_id, exon),
            None => {
                let mut gene = Gene::new(gene_id);
                gene.add_exon(transcript_id, exon);
                self.genes.insert(gene_id.to_string(), gene);
            }
        }
        self.n_exons += 1;
    }

    /// Validate and add a parser record.
    pub fn add_record(&mut self, rec: &ExonRecord) -> Result<(), LengthError> {
        if rec.gene_id.is_empty() {
            return Err(LengthError::MissingId { what: "gene" });
        }
        if rec.transcript_id.is_empty() {
            return Err(LengthError::MissingId { what: "transcript" });
        }
        let exon = Exon::new(rec.start, rec.end)?;
        self.add_exon(&rec.gene_id, &rec.transcript_id, exon);
        Ok(())
    }

    /// Build a catalog from exon records. Any invalid record aborts the build.
    pub fn from_records<I>(records: I) -> Result<Self, LengthError>
    where
        I: IntoIterator<Item = ExonRecord>,
    {
        let mut catalog = Self::new();
        for rec in records {
            catalog.add_record(&rec)?;
        }
        Ok(catalog)
    }

    /// Build a catalog directly from a GTF/GFF3 reader.
    ///
    /// Only features listed in `keys.exon_feature_types` are used; everything
    /// else in the file is skipped.
    ///
    /// ```
    /// use std::io::Cursor;
    /// use gene_lengths::catalog::{AttributeKeys, GeneCatalog};
    ///
    /// let gtf = "\
    /// chr1\tsrc\texon\t1\t100\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n\
    /// chr1\tsrc\texon\t201\t300\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n\
    /// chr1\tsrc\texon\t50\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T2\";\n";
    ///
    /// let catalog = GeneCatalog::from_reader(Cursor::new(gtf.as_bytes()), &AttributeKeys::default())
    ///     .unwrap();
    ///
    /// let rows = catalog.gene_lengths();
    /// assert_eq!(rows[0].gene_length, 300);
    /// assert_eq!(rows[0].max_transcript_length, 201);
    /// ```
    pub fn from_reader<R: BufRead>(reader: R, keys: &AttributeKeys) -> Result<Self, ParseError> {
        let mut catalog = Self::new();

        for rec in AnnotationReader::new(reader).records() {
            let rec = rec?;

            if !rec.is_exon_feature(&keys.exon_feature_types) {
                continue;
            }

            let gene_id = rec.pick_first_attr(&keys.gene_id_keys).ok_or_else(|| {
                ParseError::MissingAttribute {
                    line_no: rec.line_no,
                    what: "gene id",
                    tried: keys.gene_id_keys.clone(),
                }
            })?;

            let tx_key_raw = rec
                .pick_first_attr(&keys.transcript_id_keys)
                .or_else(|| rec.pick_first_attr(&keys.parent_keys))
                .ok_or_else(|| {
                    let mut tried = keys.transcript_id_keys.clone();
                    tried.extend(keys.parent_keys.iter().cloned());
                    ParseError::MissingAttribute {
                        line_no: rec.line_no,
                        what: "transcript id",
                        tried,
                    }
                })?;

            // Parent can be comma-separated in GFF3; the exon belongs to each.
            for tx_id in split_gff3_parent_list(&tx_key_raw) {
                catalog.add_exon(&gene_id, &tx_id, rec.exon);
            }
        }

        info!("...read transcript information for {} genes", catalog.len());
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn n_exons(&self) -> usize {
        self.n_exons
    }

    pub fn gene(&self, gene_id: &str) -> Option<&Gene> {
        self.genes.get(gene_id)
    }

    /// Genes in ascending order of gene id.
    pub fn genes(&self) -> impl Iterator<Item = &Gene> {
        self.genes.values()
    }

    /// Both length metrics for every gene, sorted by gene id.
    ///
    /// Each gene is computed from its own exons only.
    pub fn gene_lengths(&self) -> Vec<GeneLengths> {
        info!("Calculating gene lengths...");
        let mut gene_lengths = Vec::with_capacity(self.len());
        for (n, gene) in self.genes().enumerate() {
            gene_lengths.push(gene.gene_length());
            log_progress(n + 1);
        }

        info!("Calculating maximum transcript lengths...");
        let mut rows = Vec::with_capacity(self.len());
        for (n, (gene, gene_length)) in self.genes().zip(gene_lengths).enumerate() {
            rows.push(GeneLengths {
                gene_id: gene.id.clone(),
                gene_length,
                max_transcript_length: gene.max_transcript_length(),
            });
            log_progress(n + 1);
        }

        rows
    }
}

fn log_progress(n_done: usize) {
    if n_done % PROGRESS_EVERY == 0 {
        info!("...processed {} genes.", n_done);
    }
}

/// Split Parent= list (GFF3) by commas; also trim whitespace.
fn split_gff3_parent_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
