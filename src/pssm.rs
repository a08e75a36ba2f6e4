use crate::error::{Result, ScanError};
use crate::types::{FrequencyMatrix, ScoringMatrix};
use ndarray::Axis;

/// Assumed background frequency of every symbol (uniform over the 4-letter alphabet)
pub const BACKGROUND_FREQ: f64 = 0.25;

/// Default pseudocount added to every count before normalizing
pub const DEFAULT_PSEUDOCOUNT: f64 = 0.1;

/// Floor substituted for a non-positive probability before taking the logarithm
const PROB_FLOOR: f64 = 1e-9;

/// Converts a Position Frequency Matrix (PFM) into a Position-Specific Scoring
/// Matrix (PSSM) of log-odds scores.
///
/// For every position j and symbol s the count column is smoothed and
/// normalized to a probability, then converted to a log-odds score against the
/// uniform background:
///
/// ```text
/// p[s][j]     = (counts[s][j] + pseudocount) / (total[j] + 4 * pseudocount)
/// score[s][j] = log2(p[s][j] / 0.25)
/// ```
///
/// A positive pseudocount keeps every probability above zero, so every score is
/// finite. With a zero pseudocount a zero count would make the logarithm
/// undefined; those probabilities are floored to a very small positive value
/// first, so a never-observed symbol yields a large negative but still finite
/// score instead of negative infinity.
///
/// # Arguments
/// * `counts` - The validated frequency matrix to convert
/// * `pseudocount` - Smoothing constant, >= 0; reference deployments used 0.1
///   ([`DEFAULT_PSEUDOCOUNT`]) and 0.8
///
/// # Returns
/// * `Result<ScoringMatrix>` - A scoring matrix with the same motif length as
///   the input
///
/// # Errors
/// * `ScanError::InvalidParameter` - If `pseudocount` is negative, NaN, or
///   infinite
///
/// # Example
/// ```
/// use tfbs_scan_rs::pssm::build_pssm;
/// use tfbs_scan_rs::types::FrequencyMatrix;
///
/// // uniform counts match the background exactly, so every score is zero
/// let pfm = FrequencyMatrix::from_rows(
///     vec![5.0, 5.0],
///     vec![5.0, 5.0],
///     vec![5.0, 5.0],
///     vec![5.0, 5.0],
/// )
/// .unwrap();
/// let pssm = build_pssm(&pfm, 0.0).unwrap();
/// assert_eq!(pssm.score(b'A', 0), Some(0.0));
/// ```
pub fn build_pssm(counts: &FrequencyMatrix, pseudocount: f64) -> Result<ScoringMatrix> {
    if !pseudocount.is_finite() || pseudocount < 0.0 {
        return Err(ScanError::invalid_parameter(
            "pseudocount",
            pseudocount,
            "must be finite and non-negative",
        ));
    }

    let raw = counts.counts();
    let totals = raw.sum_axis(Axis(0)) + 4.0 * pseudocount;
    let probabilities = (raw + pseudocount) / &totals;
    // NaN from an all-zero column with a zero pseudocount fails the > 0 test
    // and is floored along with genuine zeros
    let scores = probabilities.mapv(|p| {
        let p = if p > 0.0 { p } else { PROB_FLOOR };
        (p / BACKGROUND_FREQ).log2()
    });

    Ok(ScoringMatrix::new(scores))
}
