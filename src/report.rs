//! The result table.
//!
//! ```text
//! gene,gene_length,max_transcript_length
//! G1,300,201
//! G2,1,1
//! ```

use std::io::{self, Write};

use log::info;
use thiserror::Error;

use crate::lengths::{GeneLengths, LengthError};

pub const HEADER: &str = "gene,gene_length,max_transcript_length";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Inconsistent(#[from] LengthError),

    #[error("failed to write length table: {0}")]
    Io(#[from] io::Error),
}

/// Write the header and one row per gene, in ascending gene id order.
///
/// Each row is checked before it is written. On the first inconsistent gene
/// the rows written so far are flushed and no further rows are produced.
pub fn write_table<'a, W, I>(out: &mut W, rows: I) -> Result<usize, ReportError>
where
    W: Write,
    I: IntoIterator<Item = &'a GeneLengths>,
{
    info!("Printing gene and maximum transcript lengths...");

    let mut rows: Vec<&GeneLengths> = rows.into_iter().collect();
    rows.sort_by(|a, b| a.gene_id.cmp(&b.gene_id));

    writeln!(out, "{HEADER}")?;

    for row in &rows {
        if let Err(err) = row.check() {
            out.flush()?;
            return Err(err.into());
        }
        writeln!(
            out,
            "{},{},{}",
            row.gene_id, row.gene_length, row.max_transcript_length
        )?;
    }

    out.flush()?;
    Ok(rows.len())
}
