use std::collections::HashMap;
use std::io::BufRead;

use thiserror::Error;

use crate::types::{Exon, Pos};

/// A single parsed record line from GTF/GFF3.
///
/// The exon keeps the file's coordinates: 1-based and inclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub line_no: usize,
    pub feature_type: String,
    pub exon: Exon,
    pub attrs: HashMap<String, String>,
}

impl AnnotationRecord {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn is_exon_feature(&self, exon_types: &[String]) -> bool {
        exon_types.iter().any(|t| t == &self.feature_type)
    }

    /// First non-empty value among `keys`.
    pub fn pick_first_attr(&self, keys: &[String]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.attr(k))
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error while reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line_no}: malformed GTF/GFF line ({problem}): {line}")]
    MalformedLine {
        line_no: usize,
        problem: &'static str,
        line: String,
    },

    #[error("line {line_no}: bad coordinates (need 0 < start <= end): {line}")]
    BadCoordinates { line_no: usize, line: String },

    #[error("line {line_no}: missing {what} attribute (tried keys: {tried:?})")]
    MissingAttribute {
        line_no: usize,
        what: &'static str,
        tried: Vec<String>,
    },
}

/// Low-level streaming parser for GTF/GFF3 files.
///
/// Most callers want [`crate::annotation::AnnotationBuilder`], which turns a
/// file straight into a [`crate::GeneCatalog`].
///
/// ```no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use gene_lengths::annotation::AnnotationReader;
///
/// let file = File::open("genes.gtf").unwrap();
/// for rec in AnnotationReader::new(BufReader::new(file)).records() {
///     let rec = rec.unwrap();
///     println!("{} {}-{}", rec.feature_type, rec.exon.start(), rec.exon.end());
/// }
/// ```
pub struct AnnotationReader<R: BufRead> {
    reader: R,
    buf: String,
    line_no: usize,
}

impl<R: BufRead> AnnotationReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
        }
    }

    /// Returns an iterator over parsed records.
    ///
    /// - Skips blank lines
    /// - Skips comment lines starting with '#'
    pub fn records(mut self) -> impl Iterator<Item = Result<AnnotationRecord, ParseError>> {
        std::iter::from_fn(move || loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => {
                    return Some(Err(ParseError::Io {
                        path: "<reader>".to_string(),
                        source: e,
                    }))
                }
            }

            let line = self.buf.trim_end_matches(&['\n', '\r'][..]);
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            return Some(parse_record_line(line, self.line_no));
        })
    }
}

/// Parse a single non-comment line into an `AnnotationRecord`.
pub fn parse_record_line(line: &str, line_no: usize) -> Result<AnnotationRecord, ParseError> {
    // seqname source feature start end score strand phase attributes
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 {
        return Err(ParseError::MalformedLine {
            line_no,
            problem: "expected 9 tab-separated columns",
            line: line.to_string(),
        });
    }

    let bad_coords = || ParseError::BadCoordinates {
        line_no,
        line: line.to_string(),
    };

    let start: Pos = fields[3].trim().parse().map_err(|_| bad_coords())?;
    let end: Pos = fields[4].trim().parse().map_err(|_| bad_coords())?;
    let exon = Exon::new(start, end).map_err(|_| bad_coords())?;

    Ok(AnnotationRecord {
        line_no,
        feature_type: fields[2].to_string(),
        exon,
        attrs: parse_attributes(fields[8]),
    })
}

/// Parse the attributes field for either GFF3 or GTF.
///
/// The syntax is decided per attribute, so `=` inside a quoted GTF value
/// does not turn the line into GFF3:
/// - `key=value` (the `=` comes before any whitespace) => GFF3
/// - `key "value"` or `key value` => GTF
pub fn parse_attributes(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();

    for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = split_attribute(part);
        let value = unquote(value);
        if !key.is_empty() && !value.is_empty() {
            map.insert(key.to_string(), value);
        }
    }

    map
}

fn split_attribute(part: &str) -> (&str, &str) {
    let ws = part.find(char::is_whitespace);
    let eq = part.find('=');
    let quote = part.find('"');

    let gff3 = match eq {
        Some(eq) => ws.map_or(true, |w| eq < w) && quote.map_or(true, |q| eq < q),
        None => false,
    };

    let pair = if gff3 {
        part.split_once('=')
    } else {
        part.split_once(char::is_whitespace)
    };
    match pair {
        Some((k, v)) => (k.trim(), v.trim()),
        None => (part.trim(), ""),
    }
}

fn unquote(v: &str) -> String {
    let v = v.trim();
    let v = v.strip_prefix('"').unwrap_or(v);
    let v = v.strip_suffix('"').unwrap_or(v);
    v.to_string()
}
