use crate::error::{Result, ScanError};
use phf::phf_map;
use std::fs;
use std::path::Path;

/// Complement of each supported DNA symbol.
static COMPLEMENT: phf::Map<char, char> = phf_map! {
    'A' => 'T',
    'T' => 'A',
    'C' => 'G',
    'G' => 'C',
};

/// A single FASTA record with its identifier, optional description and
/// uppercased sequence text.
#[derive(Debug, Clone, PartialEq)]
pub struct FastaRecord {
    /// First whitespace-delimited token of the header line
    pub id: String,
    /// Remainder of the header line, if any
    pub description: Option<String>,
    /// Sequence text with line breaks removed, uppercased
    pub sequence: String,
}

/// Parses FASTA-formatted text into a list of records.
///
/// Header lines start with `>`; the first whitespace-delimited token becomes
/// the record identifier and the remainder, when present, the description.
/// Sequence lines are concatenated and uppercased. Blank lines are skipped
/// anywhere in the input.
///
/// # Arguments
/// * `text` - FASTA-formatted text
///
/// # Returns
/// * `Result<Vec<FastaRecord>>` - Records in file order
///
/// # Errors
/// * `ScanError::EmptyFasta` - If the text contains no records
/// * `ScanError::InvalidFasta` - If sequence data precedes the first header
///   or a header carries no identifier
pub fn parse_fasta(text: &str) -> Result<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(mut record) = current.take() {
                record.sequence = record.sequence.to_uppercase();
                records.push(record);
            }
            let mut parts = header.trim().splitn(2, char::is_whitespace);
            let id = parts.next().unwrap_or("").to_string();
            if id.is_empty() {
                return Err(ScanError::InvalidFasta(format!(
                    "header without an identifier at line {}",
                    line_number + 1
                )));
            }
            let description = parts
                .next()
                .map(|rest| rest.trim().to_string())
                .filter(|rest| !rest.is_empty());
            current = Some(FastaRecord {
                id,
                description,
                sequence: String::new(),
            });
        } else {
            match current.as_mut() {
                Some(record) => record.sequence.push_str(line),
                None => {
                    return Err(ScanError::InvalidFasta(format!(
                        "sequence data before the first header at line {}",
                        line_number + 1
                    )))
                }
            }
        }
    }

    if let Some(mut record) = current.take() {
        record.sequence = record.sequence.to_uppercase();
        records.push(record);
    }

    if records.is_empty() {
        return Err(ScanError::EmptyFasta);
    }

    Ok(records)
}

/// Reads FASTA records from a file.
///
/// # Arguments
/// * `path` - Path to the FASTA file to read
///
/// # Returns
/// * `Result<Vec<FastaRecord>>` - Records in file order
pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>> {
    let text = fs::read_to_string(path)?;
    parse_fasta(&text)
}

/// Interprets raw input as either FASTA text or a bare sequence.
///
/// Input whose first non-blank character is `>` is parsed as FASTA and the
/// first record is taken; anything else is treated as a plain sequence and
/// uppercased. Returns the record identifier, when one exists, together with
/// the sequence text.
///
/// # Arguments
/// * `raw` - Pasted or file-sourced input text
///
/// # Returns
/// * `Result<(Option<String>, String)>` - Identifier and sequence
pub fn extract_sequence(raw: &str) -> Result<(Option<String>, String)> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('>') {
        let records = parse_fasta(trimmed)?;
        let first = records.into_iter().next().ok_or(ScanError::EmptyFasta)?;
        Ok((Some(first.id), first.sequence))
    } else {
        Ok((None, raw.trim().to_uppercase()))
    }
}

/// Checks that a sequence contains only the symbols A, C, G and T.
///
/// # Arguments
/// * `sequence` - Sequence text to check
///
/// # Returns
/// * `Result<()>` - Ok when every symbol is supported
///
/// # Errors
/// * `ScanError::InvalidSequence` - Reports the first offending symbol and
///   its zero-based position
pub fn validate_sequence(sequence: &str) -> Result<()> {
    for (position, symbol) in sequence.chars().enumerate() {
        if !matches!(symbol, 'A' | 'C' | 'G' | 'T') {
            return Err(ScanError::invalid_sequence(
                position,
                format!("symbol {symbol:?} is not one of A, C, G, T"),
            ));
        }
    }
    Ok(())
}

/// Returns the reverse complement of a DNA sequence.
///
/// # Arguments
/// * `sequence` - Sequence containing only A, C, G and T
///
/// # Returns
/// * `String` - The reverse complement
///
/// # Panics
/// Panics on symbols outside A, C, G and T. Run [`validate_sequence`] first
/// for untrusted input.
///
/// # Example
/// ```
/// use tfbs_scan_rs::fasta::rev_comp;
///
/// assert_eq!(rev_comp("ACGT"), "ACGT");
/// assert_eq!(rev_comp("AACG"), "CGTT");
/// ```
pub fn rev_comp(sequence: &str) -> String {
    sequence
        .chars()
        .rev()
        .map(|symbol| match COMPLEMENT.get(&symbol) {
            Some(&complement) => complement,
            None => panic!("unsupported symbol in sequence: {}", symbol),
        })
        .collect()
}
