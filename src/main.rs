use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use gene_lengths::{write_table, AnnotationBuilder, AttributeKeys};

/// Write per-gene maximum transcript lengths and gene lengths (the latter
/// defined as the number of bases contained in the union of all exons of the
/// gene, including 3' and 5' UTRs).
#[derive(Parser, Debug)]
#[command(name = "gene-lengths")]
#[command(author, version, about)]
struct Cli {
    /// File containing transcript definitions in GTF format (.gtf, .gff3, optionally .gz)
    #[arg(value_name = "TRANSCRIPT_GTF_FILE")]
    transcript_gtf_file: PathBuf,

    /// Logging level (written to stderr)
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Attribute keys to use for gene ID (repeatable, first present wins)
    #[arg(
        long = "gene-id-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["gene_id".to_string()]
    )]
    gene_id_keys: Vec<String>,

    /// Attribute keys to use for transcript ID (repeatable, first present wins)
    #[arg(
        long = "transcript-id-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["transcript_id".to_string()]
    )]
    transcript_id_keys: Vec<String>,

    /// GFF3 exon->transcript linkage keys, used when no transcript ID key is present
    #[arg(
        long = "parent-key",
        value_name = "KEY",
        num_args = 1..,
        default_values_t = vec!["Parent".to_string()]
    )]
    parent_keys: Vec<String>,

    /// Feature types that count as exons (repeatable)
    #[arg(
        long = "exon-feature-type",
        value_name = "TYPE",
        num_args = 1..,
        default_values_t = vec!["exon".to_string()]
    )]
    exon_feature_types: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn setup_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.into())
        .format_timestamp_secs()
        .init();
}

/// Read the annotation named on the command line and write the length table
/// to `out`. Returns the number of gene rows written.
fn run<W: Write>(cli: Cli, out: &mut W) -> Result<usize> {
    let path = &cli.transcript_gtf_file;
    if !path.is_file() {
        bail!("Transcript GTF file must exist: {}", path.display());
    }

    let keys = AttributeKeys {
        gene_id_keys: cli.gene_id_keys,
        transcript_id_keys: cli.transcript_id_keys,
        parent_keys: cli.parent_keys,
        exon_feature_types: cli.exon_feature_types,
    };

    let catalog = AnnotationBuilder::with_keys(keys)
        .build_from_path(path)
        .with_context(|| format!("reading transcript info from {}", path.display()))?;

    log::debug!("{catalog}");

    let rows = catalog.gene_lengths();
    Ok(write_table(out, &rows)?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.log_level);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    run(cli, &mut out)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::path::Path;

    fn cli_for(path: &Path) -> Cli {
        Cli::try_parse_from([OsStr::new("gene-lengths"), path.as_os_str()]).unwrap()
    }

    fn write_gtf(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("genes.gtf");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn writes_table_for_valid_annotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gtf(
            dir.path(),
            "\
chr1\tsrc\texon\t10\t10\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T1\";
chr1\tsrc\texon\t1\t100\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t201\t300\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t50\t250\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T2\";
",
        );

        let mut out = Vec::new();
        assert_eq!(run(cli_for(&path), &mut out).unwrap(), 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "gene,gene_length,max_transcript_length\nG1,300,201\nG2,1,1\n"
        );
    }

    #[test]
    fn missing_file_is_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.gtf");

        let mut out = Vec::new();
        let err = run(cli_for(&path), &mut out).unwrap_err();

        assert!(err.to_string().starts_with("Transcript GTF file must exist"));
        assert!(out.is_empty());
    }

    #[test]
    fn inconsistent_gene_fails_after_earlier_rows() {
        let dir = tempfile::tempdir().unwrap();
        // B lists the same exon twice, so its naive transcript sum exceeds its coverage
        let path = write_gtf(
            dir.path(),
            "\
chr1\tsrc\texon\t1\t10\t.\t+\t.\tgene_id \"A\"; transcript_id \"T1\";
chr1\tsrc\texon\t1\t10\t.\t+\t.\tgene_id \"B\"; transcript_id \"T2\";
chr1\tsrc\texon\t1\t10\t.\t+\t.\tgene_id \"B\"; transcript_id \"T2\";
chr1\tsrc\texon\t1\t10\t.\t+\t.\tgene_id \"C\"; transcript_id \"T3\";
",
        );

        let mut out = Vec::new();
        let err = run(cli_for(&path), &mut out).unwrap_err();

        assert_eq!(
            err.to_string(),
            "B: max transcript length (20) cannot exceed gene length (10)"
        );
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "gene,gene_length,max_transcript_length\nA,10,10\n"
        );
    }

    #[test]
    fn log_level_is_validated() {
        let parsed = Cli::try_parse_from(["gene-lengths", "--log-level", "loud", "x.gtf"]);
        assert!(parsed.is_err());

        let cli = Cli::try_parse_from(["gene-lengths", "--log-level", "debug", "x.gtf"]).unwrap();
        assert_eq!(cli.log_level, LogLevel::Debug);
        assert_eq!(LevelFilter::from(cli.log_level), LevelFilter::Debug);
    }
}
