use crate::error::{Result, ScanError};
use ndarray::{Array2, Axis};
use std::collections::HashMap;

/// Symbols of the DNA alphabet, in matrix row order
pub const ALPHABET: [char; 4] = ['A', 'C', 'G', 'T'];

/// Maps a sequence byte to its matrix row, `None` for anything outside the alphabet
pub(crate) fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Represents a Position Frequency Matrix (PFM)
///
/// Per-position symbol counts from aligned binding-site examples, stored as a
/// 4 x L array with rows in [`ALPHABET`] order. Counts may be fractional
/// (database records sometimes report scaled counts) but never negative, and
/// every row has the same length L, the motif length. The constructors enforce
/// these invariants, so a value of this type is always structurally valid.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyMatrix {
    counts: Array2<f64>,
}

impl FrequencyMatrix {
    /// Builds a frequency matrix from one count row per symbol, in A, C, G, T order.
    ///
    /// # Errors
    /// * `ScanError::MalformedMatrix` - If the rows disagree in length, the motif
    ///   length is zero, or any count is negative or non-finite
    pub fn from_rows(a: Vec<f64>, c: Vec<f64>, g: Vec<f64>, t: Vec<f64>) -> Result<Self> {
        let length = a.len();
        if length == 0 {
            return Err(ScanError::malformed_matrix("matrix has no positions"));
        }

        let rows = [a, c, g, t];
        for (symbol, row) in ALPHABET.iter().zip(rows.iter()) {
            if row.len() != length {
                return Err(ScanError::malformed_matrix(format!(
                    "row {} has {} positions, expected {}",
                    symbol,
                    row.len(),
                    length
                )));
            }
            for (position, &value) in row.iter().enumerate() {
                if !value.is_finite() || value < 0.0 {
                    return Err(ScanError::malformed_matrix(format!(
                        "invalid count {} for {} at position {}",
                        value, symbol, position
                    )));
                }
            }
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let counts = Array2::from_shape_vec((4, length), flat)
            .map_err(|e| ScanError::malformed_matrix(e.to_string()))?;
        Ok(FrequencyMatrix { counts })
    }

    /// Builds a frequency matrix from a symbol-keyed mapping, the shape motif
    /// database records use (exactly the four keys A, C, G, T).
    ///
    /// # Errors
    /// * `ScanError::MalformedMatrix` - If a symbol is missing, an extra key is
    ///   present, or the rows fail the checks of [`FrequencyMatrix::from_rows`]
    pub fn from_counts(counts: &HashMap<char, Vec<f64>>) -> Result<Self> {
        if counts.len() != 4 {
            return Err(ScanError::malformed_matrix(format!(
                "expected exactly 4 symbol rows, found {}",
                counts.len()
            )));
        }
        let fetch = |symbol: char| {
            counts.get(&symbol).cloned().ok_or_else(|| {
                ScanError::malformed_matrix(format!("missing row for symbol {}", symbol))
            })
        };
        // four keys total plus one hit per alphabet symbol rules out extras
        Self::from_rows(fetch('A')?, fetch('C')?, fetch('G')?, fetch('T')?)
    }

    /// Number of motif positions L
    pub fn motif_length(&self) -> usize {
        self.counts.ncols()
    }

    /// Most frequent symbol at each position; ties resolve to the earlier
    /// [`ALPHABET`] symbol
    pub fn consensus(&self) -> String {
        self.counts
            .axis_iter(Axis(1))
            .map(|column| {
                let mut best = 0;
                for row in 1..ALPHABET.len() {
                    if column[row] > column[best] {
                        best = row;
                    }
                }
                ALPHABET[best]
            })
            .collect()
    }

    pub(crate) fn counts(&self) -> &Array2<f64> {
        &self.counts
    }
}

/// Represents a Position-Specific Scoring Matrix (PSSM)
///
/// Per-position log-odds scores in bits, derived from a [`FrequencyMatrix`] by
/// [`crate::pssm::build_pssm`]. Same 4 x L layout as the frequency matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringMatrix {
    scores: Array2<f64>,
}

impl ScoringMatrix {
    pub(crate) fn new(scores: Array2<f64>) -> Self {
        ScoringMatrix { scores }
    }

    /// Number of motif positions L
    pub fn motif_length(&self) -> usize {
        self.scores.ncols()
    }

    /// Log-odds score of `base` at `position`, `None` for a symbol outside the
    /// alphabet.
    ///
    /// # Panics
    /// * Panics if `position` is not below the motif length
    pub fn score(&self, base: u8, position: usize) -> Option<f64> {
        base_index(base).map(|row| self.scores[[row, position]])
    }

    /// Row-indexed lookup for the scan loop, which resolves symbols to rows
    /// up front
    pub(crate) fn row_score(&self, row: usize, position: usize) -> f64 {
        self.scores[[row, position]]
    }

    /// Best attainable window score: the per-position maximum summed over all
    /// positions
    pub fn max_score(&self) -> f64 {
        self.scores
            .axis_iter(Axis(1))
            .map(|column| column.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .sum()
    }
}
