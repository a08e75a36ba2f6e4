use crate::types::{base_index, ScoringMatrix};
use serde::Serialize;

/// Score contributed by a window position whose symbol is outside the matrix
/// alphabet. In log2-odds terms this is a likelihood ratio of 2^-100, so a
/// window containing such a symbol stays out of contention without aborting
/// the scan.
pub const UNKNOWN_BASE_PENALTY: f64 = -100.0;

/// Fraction of the best observed score a window must reach under
/// [`HitPolicy::Relative`]
pub const RELATIVE_HIT_FRACTION: f64 = 0.8;

/// How windows are promoted from the score series to reported hits.
///
/// The two reference deployments of this scanner disagreed on what counts as
/// a hit, so the choice is an explicit configuration value rather than a
/// built-in default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPolicy {
    /// Keep windows scoring above the background expectation (score > 0)
    Absolute,
    /// Keep windows scoring within [`RELATIVE_HIT_FRACTION`] of the best
    /// score in the series (score >= 0.8 * max)
    Relative,
}

/// One reported binding-site candidate: a window whose score cleared the
/// selection policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    /// Window start, 0-indexed
    pub start: usize,
    /// One past the last window position (start + motif length)
    pub end: usize,
    /// Window log-odds score in bits
    pub score: f64,
    /// The literal window subsequence
    pub sequence: String,
}

/// Everything produced by scanning one sequence: the full score series, the
/// parallel window start positions, and the ranked hits. This is the structure
/// the calling layer serializes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub scores: Vec<f64>,
    pub positions: Vec<usize>,
    pub hits: Vec<Hit>,
}

impl ScanResult {
    /// The result of scanning a sequence with no eligible windows
    pub fn empty() -> Self {
        ScanResult {
            scores: Vec::new(),
            positions: Vec::new(),
            hits: Vec::new(),
        }
    }
}

/// Scans a sequence with a scoring matrix and returns the per-window score
/// series plus the ranked hits selected by `policy`.
///
/// Every window start in `[0, len - L]` is scored as the sum of the matrix
/// scores of its symbols; a symbol outside the alphabet contributes
/// [`UNKNOWN_BASE_PENALTY`] instead of failing, so the scan never aborts
/// mid-sequence. A sequence shorter than the motif (including the empty
/// sequence) yields an empty result, not an error. Hits are ordered by score
/// descending with ties broken by ascending start position, so the output is
/// fully deterministic.
///
/// The sequence is expected to be uppercase; lowercase symbols are outside
/// the matrix alphabet and score the penalty.
///
/// # Arguments
/// * `sequence` - Uppercase nucleotide sequence to scan
/// * `matrix` - The scoring matrix, see [`crate::pssm::build_pssm`]
/// * `policy` - Hit selection policy
///
/// # Example
/// ```
/// use tfbs_scan_rs::pssm::build_pssm;
/// use tfbs_scan_rs::scan::{scan_sequence, HitPolicy};
/// use tfbs_scan_rs::types::FrequencyMatrix;
///
/// // motif "AC": A dominates position 0, C dominates position 1
/// let pfm = FrequencyMatrix::from_rows(
///     vec![4.0, 0.0],
///     vec![0.0, 4.0],
///     vec![0.0, 0.0],
///     vec![0.0, 0.0],
/// )
/// .unwrap();
/// let pssm = build_pssm(&pfm, 0.1).unwrap();
///
/// let result = scan_sequence("ACGTAC", &pssm, HitPolicy::Absolute);
/// assert_eq!(result.scores.len(), 5); // 6 - 2 + 1 windows
/// assert_eq!(result.hits.len(), 2); // "AC" at 0 and at 4
/// assert_eq!(result.hits[0].start, 0);
/// ```
pub fn scan_sequence(sequence: &str, matrix: &ScoringMatrix, policy: HitPolicy) -> ScanResult {
    let span = matrix.motif_length();
    let bytes = sequence.as_bytes();
    let last_start = match bytes.len().checked_sub(span) {
        Some(last) => last,
        None => return ScanResult::empty(),
    };

    // resolve symbols to matrix rows once for the whole sequence
    let rows: Vec<Option<usize>> = bytes.iter().map(|&b| base_index(b)).collect();

    let mut scores = Vec::with_capacity(last_start + 1);
    let mut positions = Vec::with_capacity(last_start + 1);
    for start in 0..=last_start {
        let mut total = 0.0;
        for offset in 0..span {
            total += match rows[start + offset] {
                Some(row) => matrix.row_score(row, offset),
                None => UNKNOWN_BASE_PENALTY,
            };
        }
        scores.push(total);
        positions.push(start);
    }

    let hits = select_hits(&scores, bytes, span, policy);
    ScanResult {
        scores,
        positions,
        hits,
    }
}

/// Applies the hit policy to the score series and ranks the survivors
fn select_hits(scores: &[f64], bytes: &[u8], span: usize, policy: HitPolicy) -> Vec<Hit> {
    let cutoff = match policy {
        HitPolicy::Absolute => 0.0,
        HitPolicy::Relative => {
            let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            if !best.is_finite() {
                // empty series
                return Vec::new();
            }
            RELATIVE_HIT_FRACTION * best
        }
    };

    let keep = |score: f64| match policy {
        HitPolicy::Absolute => score > cutoff,
        HitPolicy::Relative => score >= cutoff,
    };

    let mut hits: Vec<Hit> = scores
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, score)| keep(*score))
        .map(|(start, score)| Hit {
            start,
            end: start + span,
            score,
            sequence: String::from_utf8_lossy(&bytes[start..start + span]).into_owned(),
        })
        .collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.start.cmp(&b.start)));
    hits
}
