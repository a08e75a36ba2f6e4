use crate::error::{Result, ScanError};
use crate::types::FrequencyMatrix;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One motif from a JASPAR flat file: its matrix identifier, transcription
/// factor name and count matrix.
#[derive(Debug, Clone)]
pub struct MotifRecord {
    /// JASPAR matrix identifier, e.g. `MA0002.1`
    pub matrix_id: String,
    /// Transcription factor name from the header; falls back to the matrix
    /// identifier when the header carries no name
    pub name: String,
    /// Observation counts per symbol and position
    pub counts: FrequencyMatrix,
}

impl MotifRecord {
    /// Number of motif positions L
    pub fn motif_length(&self) -> usize {
        self.counts.motif_length()
    }

    /// Highest-count symbol per position
    pub fn consensus(&self) -> String {
        self.counts.consensus()
    }
}

/// An in-memory motif collection loaded from a JASPAR flat file, kept in
/// file order.
#[derive(Debug, Clone)]
pub struct MotifSet {
    motifs: Vec<MotifRecord>,
}

impl MotifSet {
    /// Number of motifs in the set
    pub fn len(&self) -> usize {
        self.motifs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.motifs.is_empty()
    }

    /// Iterates over the motifs in file order
    pub fn iter(&self) -> std::slice::Iter<'_, MotifRecord> {
        self.motifs.iter()
    }

    /// Looks up a motif by its exact matrix identifier, ignoring case.
    ///
    /// # Arguments
    /// * `matrix_id` - Identifier such as `MA0002.1`
    ///
    /// # Returns
    /// * `Option<&MotifRecord>` - The motif, when one matches
    pub fn get(&self, matrix_id: &str) -> Option<&MotifRecord> {
        self.motifs
            .iter()
            .find(|record| record.matrix_id.eq_ignore_ascii_case(matrix_id))
    }

    /// Searches the set by matrix identifier or transcription factor name.
    ///
    /// Identifier-shaped queries (starting with `MA` and containing a `.`)
    /// resolve to the exact matrix first; any other query, or an identifier
    /// with no exact match, falls back to a case-insensitive substring match
    /// against names and identifiers. Results keep file order.
    ///
    /// # Arguments
    /// * `query` - Identifier or name fragment, e.g. `MA0002.1` or `runx`
    ///
    /// # Returns
    /// * `Vec<&MotifRecord>` - Matching motifs; empty for a blank query
    pub fn search(&self, query: &str) -> Vec<&MotifRecord> {
        let needle = query.trim().to_uppercase();
        if needle.is_empty() {
            return Vec::new();
        }
        if is_matrix_id(&needle) {
            if let Some(record) = self.get(&needle) {
                return vec![record];
            }
        }
        self.motifs
            .iter()
            .filter(|record| {
                record.name.to_uppercase().contains(&needle)
                    || record.matrix_id.to_uppercase().contains(&needle)
            })
            .collect()
    }
}

fn is_matrix_id(query: &str) -> bool {
    query.to_uppercase().starts_with("MA") && query.contains('.')
}

struct Block {
    matrix_id: String,
    name: String,
    rows: Vec<(usize, String)>,
}

/// Parses motifs from JASPAR flat-file text.
///
/// Each motif starts with a `>` header holding the matrix identifier and,
/// separated by whitespace, the factor name. The four count rows follow in
/// either the bracketed form (`A  [ 10 12  4 ]`, any symbol order) or as
/// four unlabelled rows in A, C, G, T order.
///
/// # Arguments
/// * `text` - JASPAR flat-file text
///
/// # Returns
/// * `Result<MotifSet>` - Parsed motifs in file order
///
/// # Errors
/// * `ScanError::InvalidFileFormat` - If the text has no motifs, rows appear
///   outside a motif block, a header lacks an identifier, or a block has the
///   wrong row structure
/// * `ScanError::MalformedMatrix` - If a count fails to parse or the rows do
///   not form a valid matrix
///
/// # Example
/// ```
/// use tfbs_scan_rs::jaspar::parse_jaspar;
///
/// let text = ">MA0004.1\tARNT\n\
///            A  [  4 19  0  0  0  0 ]\n\
///            C  [ 16  0 20  0  0  0 ]\n\
///            G  [  0  1  0 20  0 20 ]\n\
///            T  [  0  0  0  0 20  0 ]\n";
/// let motifs = parse_jaspar(text).unwrap();
/// assert_eq!(motifs.len(), 1);
/// assert_eq!(motifs.get("MA0004.1").unwrap().consensus(), "CACGTG");
/// ```
pub fn parse_jaspar(text: &str) -> Result<MotifSet> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;

    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(block) = current.take() {
                blocks.push(block);
            }
            let mut parts = header.trim().splitn(2, char::is_whitespace);
            let matrix_id = parts.next().unwrap_or("").to_string();
            if matrix_id.is_empty() {
                return Err(ScanError::InvalidFileFormat(format!(
                    "header without a matrix identifier at line {}",
                    line_number + 1
                )));
            }
            let name = parts
                .next()
                .map(|rest| rest.trim().to_string())
                .filter(|rest| !rest.is_empty())
                .unwrap_or_else(|| matrix_id.clone());
            current = Some(Block {
                matrix_id,
                name,
                rows: Vec::new(),
            });
        } else {
            match current.as_mut() {
                Some(block) => block.rows.push((line_number + 1, line.to_string())),
                None => {
                    return Err(ScanError::InvalidFileFormat(format!(
                        "matrix row outside a motif block at line {}",
                        line_number + 1
                    )))
                }
            }
        }
    }
    if let Some(block) = current.take() {
        blocks.push(block);
    }

    if blocks.is_empty() {
        return Err(ScanError::InvalidFileFormat("no motifs found".into()));
    }

    let motifs = blocks
        .into_iter()
        .map(build_motif)
        .collect::<Result<Vec<_>>>()?;
    Ok(MotifSet { motifs })
}

/// Reads motifs from a JASPAR flat file.
///
/// # Arguments
/// * `path` - Path to the file to read
///
/// # Returns
/// * `Result<MotifSet>` - Parsed motifs in file order
pub fn read_jaspar<P: AsRef<Path>>(path: P) -> Result<MotifSet> {
    let text = fs::read_to_string(path)?;
    parse_jaspar(&text)
}

fn build_motif(block: Block) -> Result<MotifRecord> {
    if block.rows.is_empty() {
        return Err(ScanError::InvalidFileFormat(format!(
            "motif {} has no matrix rows",
            block.matrix_id
        )));
    }

    // Rows opening with a number mean the unlabelled four-row form
    let bare = first_token(&block.rows[0].1)
        .map(|token| token.parse::<f64>().is_ok())
        .unwrap_or(false);

    let counts = if bare {
        parse_bare_block(&block)
    } else {
        parse_labelled_block(&block)
    };
    let counts = counts.map_err(|e| match e {
        ScanError::MalformedMatrix(message) => {
            ScanError::malformed_matrix(format!("{}: {}", block.matrix_id, message))
        }
        other => other,
    })?;

    Ok(MotifRecord {
        matrix_id: block.matrix_id,
        name: block.name,
        counts,
    })
}

fn parse_labelled_block(block: &Block) -> Result<FrequencyMatrix> {
    let mut by_symbol: HashMap<char, Vec<f64>> = HashMap::new();
    for (line_number, row) in &block.rows {
        let mut parts = row.splitn(2, char::is_whitespace);
        let label = parts.next().unwrap_or("");
        let symbol = match label.to_ascii_uppercase().as_str() {
            "A" => 'A',
            "C" => 'C',
            "G" => 'G',
            "T" => 'T',
            _ => {
                return Err(ScanError::InvalidFileFormat(format!(
                    "unrecognized row label {:?} at line {}",
                    label, line_number
                )))
            }
        };
        let values = parse_counts(parts.next().unwrap_or(""), *line_number)?;
        if by_symbol.insert(symbol, values).is_some() {
            return Err(ScanError::malformed_matrix(format!(
                "duplicate row for symbol {} at line {}",
                symbol, line_number
            )));
        }
    }
    FrequencyMatrix::from_counts(&by_symbol)
}

fn parse_bare_block(block: &Block) -> Result<FrequencyMatrix> {
    if block.rows.len() != 4 {
        return Err(ScanError::InvalidFileFormat(format!(
            "motif {} has {} unlabelled rows, expected 4 in A, C, G, T order",
            block.matrix_id,
            block.rows.len()
        )));
    }
    let mut rows = block
        .rows
        .iter()
        .map(|(line_number, row)| parse_counts(row, *line_number));
    // exactly 4 rows, checked above
    let a = rows.next().transpose()?.unwrap_or_default();
    let c = rows.next().transpose()?.unwrap_or_default();
    let g = rows.next().transpose()?.unwrap_or_default();
    let t = rows.next().transpose()?.unwrap_or_default();
    FrequencyMatrix::from_rows(a, c, g, t)
}

fn parse_counts(text: &str, line_number: usize) -> Result<Vec<f64>> {
    text.split(|c: char| c.is_whitespace() || c == '[' || c == ']')
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                ScanError::malformed_matrix(format!(
                    "invalid count {:?} at line {}",
                    token, line_number
                ))
            })
        })
        .collect()
}

fn first_token(row: &str) -> Option<&str> {
    row.split(|c: char| c.is_whitespace() || c == '[' || c == ']')
        .find(|token| !token.is_empty())
}
