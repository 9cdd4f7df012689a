//! gene_lengths
//!
//! Per-gene length metrics from transcript annotations (GTF/GFF3):
//! - gene length: bases covered by the union of all exons of the gene,
//!   UTRs included
//! - maximum transcript length: the largest summed exon length of any one
//!   transcript of the gene
//!
//! Exons are closed intervals on the annotation's 1-based axis.

pub mod types;
pub mod model;
pub mod annotation;
pub mod catalog;
pub mod lengths;
pub mod report;

pub use annotation::{AnnotationBuilder, ParseError};
pub use catalog::{AttributeKeys, ExonRecord, GeneCatalog};
pub use lengths::{covered_length, max_transcript_length, GeneLengths, LengthError};
pub use model::{Gene, Transcript};
pub use report::{write_table, ReportError};
pub use types::{Exon, Pos};
