use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use log::info;

use crate::annotation::io::ParseError;
use crate::catalog::{AttributeKeys, GeneCatalog};

/// High-level builder for creating a `GeneCatalog` from a GTF/GFF3 file.
///
/// - parses the whole file (optionally gzipped)
/// - configurable attribute keys for gene and transcript ids
/// - configurable feature types that count as exons
#[derive(Debug, Clone, Default)]
pub struct AnnotationBuilder {
    pub keys: AttributeKeys,
}

impl AnnotationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: AttributeKeys) -> Self {
        Self { keys }
    }

    /// Convenience: set a single key (or first-preference key) for gene id.
    pub fn gene_id_key(mut self, key: &str) -> Self {
        self.keys.gene_id_keys = vec![key.to_string()];
        self
    }

    pub fn transcript_id_keys(mut self, keys: &[&str]) -> Self {
        self.keys.transcript_id_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    /// GFF3 exon->transcript linking keys (usually ["Parent"]).
    pub fn parent_keys(mut self, keys: &[&str]) -> Self {
        self.keys.parent_keys = keys.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn exon_feature_types(mut self, types: &[&str]) -> Self {
        self.keys.exon_feature_types = types.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<GeneCatalog, ParseError> {
        info!("Reading transcript info...");
        GeneCatalog::from_reader(reader, &self.keys)
    }

    /// Build a catalog from a file path; `.gz` files are decompressed on the fly.
    pub fn build_from_path<P: AsRef<Path>>(&self, path: P) -> Result<GeneCatalog, ParseError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| ParseError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        let is_gz = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let result = if is_gz {
            self.build_from_reader(BufReader::new(GzDecoder::new(file)))
        } else {
            self.build_from_reader(BufReader::new(file))
        };

        // the streaming reader cannot know the file name
        result.map_err(|err| match err {
            ParseError::Io { source, .. } => ParseError::Io {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    const GTF: &str = "\
chr1\tsrc\texon\t1\t5\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\texon\t6\t10\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T2\";
chr1\tsrc\texon\t21\t25\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T3\";
chr1\tsrc\texon\t27\t30\t.\t+\t.\tgene_id \"G2\"; transcript_id \"T3\";
";

    #[test]
    fn builder_gtf_default_keys() {
        let catalog = AnnotationBuilder::new()
            .build_from_reader(Cursor::new(GTF.as_bytes()))
            .unwrap();

        assert_eq!(catalog.len(), 2);
        // touching exons leave no gap, disjoint ones do
        assert_eq!(catalog.gene("G1").unwrap().gene_length(), 10);
        assert_eq!(catalog.gene("G2").unwrap().gene_length(), 9);
    }

    #[test]
    fn builder_gff3_parent_linking() {
        let gff = "\
chr2\tsrc\texon\t5\t20\t.\t-\t.\tParent=tx1;geneID=G9
chr2\tsrc\texon\t30\t40\t.\t-\t.\tParent=tx1;geneID=G9
";
        let catalog = AnnotationBuilder::new()
            .transcript_id_keys(&[])
            .parent_keys(&["Parent"])
            .gene_id_key("geneID")
            .build_from_reader(Cursor::new(gff.as_bytes()))
            .unwrap();

        let gene = catalog.gene("G9").unwrap();
        assert!(gene.transcript("tx1").is_some());
        assert_eq!(gene.gene_length(), 27);
    }

    #[test]
    fn builder_respects_exon_feature_types_filter() {
        let gtf = "\
chr1\tsrc\texon\t101\t150\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";
chr1\tsrc\tCDS\t201\t250\t.\t+\t0\tgene_id \"G1\"; transcript_id \"T1\";
";
        let exons_only = AnnotationBuilder::new()
            .build_from_reader(Cursor::new(gtf.as_bytes()))
            .unwrap();
        assert_eq!(exons_only.n_exons(), 1);

        let with_cds = AnnotationBuilder::new()
            .exon_feature_types(&["exon", "CDS"])
            .build_from_reader(Cursor::new(gtf.as_bytes()))
            .unwrap();
        assert_eq!(with_cds.n_exons(), 2);
        assert_eq!(with_cds.gene("G1").unwrap().gene_length(), 100);
    }

    #[test]
    fn builder_reads_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("genes.gtf");
        std::fs::write(&plain, GTF).unwrap();

        let gz = dir.path().join("genes.gtf.gz");
        let mut enc = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        enc.write_all(GTF.as_bytes()).unwrap();
        enc.finish().unwrap();

        let a = AnnotationBuilder::new().build_from_path(&plain).unwrap();
        let b = AnnotationBuilder::new().build_from_path(&gz).unwrap();
        assert_eq!(a.gene_lengths(), b.gene_lengths());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = AnnotationBuilder::new()
            .build_from_path("/nonexistent/genes.gtf")
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/genes.gtf"));
    }
}
