use std::collections::HashMap;
use tfbs_scan_rs::error::ScanError;
use tfbs_scan_rs::pssm::{build_pssm, DEFAULT_PSEUDOCOUNT};
use tfbs_scan_rs::types::FrequencyMatrix;

/// Counts whose consensus is ACGA, with one fully unobserved symbol.
fn skewed_counts() -> FrequencyMatrix {
    FrequencyMatrix::from_rows(
        vec![10.0, 0.0, 0.0, 10.0],
        vec![0.0, 10.0, 0.0, 0.0],
        vec![0.0, 0.0, 10.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0],
    )
    .unwrap()
}

#[test]
fn test_uniform_counts_score_zero() {
    let counts = FrequencyMatrix::from_rows(
        vec![25.0, 25.0, 25.0],
        vec![25.0, 25.0, 25.0],
        vec![25.0, 25.0, 25.0],
        vec![25.0, 25.0, 25.0],
    )
    .unwrap();

    // 25/100 and (25+1)/(100+4) are both exactly the 0.25 background
    for pseudocount in [0.0, 1.0] {
        let matrix = build_pssm(&counts, pseudocount).unwrap();
        for base in [b'A', b'C', b'G', b'T'] {
            for position in 0..matrix.motif_length() {
                assert_eq!(matrix.score(base, position), Some(0.0));
            }
        }
        assert_eq!(matrix.max_score(), 0.0);
    }
}

#[test]
fn test_scores_finite_with_positive_pseudocount() {
    let matrix = build_pssm(&skewed_counts(), DEFAULT_PSEUDOCOUNT).unwrap();
    for base in [b'A', b'C', b'G', b'T'] {
        for position in 0..4 {
            let score = matrix.score(base, position).unwrap();
            assert!(
                score.is_finite(),
                "score for {} at {} is {}",
                base as char,
                position,
                score
            );
        }
    }
}

#[test]
fn test_zero_counts_floored_to_finite_scores() {
    // column 1 has no observations at all
    let counts = FrequencyMatrix::from_rows(
        vec![4.0, 0.0],
        vec![0.0, 0.0],
        vec![0.0, 0.0],
        vec![0.0, 0.0],
    )
    .unwrap();
    let matrix = build_pssm(&counts, 0.0).unwrap();

    // p = 1.0 gives log2(4) exactly
    assert_eq!(matrix.score(b'A', 0), Some(2.0));
    for base in [b'A', b'C', b'G', b'T'] {
        let score = matrix.score(base, 1).unwrap();
        assert!(score.is_finite());
        assert!(score < -20.0);
    }
}

#[test]
fn test_log_odds_formula() {
    let matrix = build_pssm(&skewed_counts(), 0.1).unwrap();

    let dominant = ((10.0 + 0.1) / (10.0 + 4.0 * 0.1) / 0.25_f64).log2();
    let absent = ((0.0 + 0.1) / (10.0 + 4.0 * 0.1) / 0.25_f64).log2();

    assert!((matrix.score(b'A', 0).unwrap() - dominant).abs() < 1e-9);
    assert!((matrix.score(b'T', 0).unwrap() - absent).abs() < 1e-9);
    assert!(matrix.score(b'A', 0).unwrap() > 0.0);
    assert!(matrix.score(b'T', 0).unwrap() < 0.0);
}

#[test]
fn test_max_score_sums_column_maxima() {
    let matrix = build_pssm(&skewed_counts(), 0.1).unwrap();
    let best: f64 = [b'A', b'C', b'G', b'A']
        .iter()
        .enumerate()
        .map(|(position, &base)| matrix.score(base, position).unwrap())
        .sum();
    assert!((matrix.max_score() - best).abs() < 1e-9);
}

#[test]
fn test_consensus_and_length() {
    let counts = skewed_counts();
    assert_eq!(counts.motif_length(), 4);
    assert_eq!(counts.consensus(), "ACGA");

    // ties resolve to the earlier symbol in A, C, G, T order
    let tied = FrequencyMatrix::from_rows(vec![5.0], vec![5.0], vec![0.0], vec![0.0]).unwrap();
    assert_eq!(tied.consensus(), "A");
}

#[test]
fn test_invalid_pseudocount_rejected() {
    let counts = skewed_counts();
    assert!(matches!(
        build_pssm(&counts, -0.5).unwrap_err(),
        ScanError::InvalidParameter { .. }
    ));
    assert!(matches!(
        build_pssm(&counts, f64::NAN).unwrap_err(),
        ScanError::InvalidParameter { .. }
    ));
}

#[test]
fn test_malformed_matrix_rejected() {
    // ragged rows
    let err = FrequencyMatrix::from_rows(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0], vec![1.0, 2.0])
        .unwrap_err();
    assert!(matches!(err, ScanError::MalformedMatrix(_)));

    // no positions
    let err = FrequencyMatrix::from_rows(Vec::new(), Vec::new(), Vec::new(), Vec::new())
        .unwrap_err();
    assert!(matches!(err, ScanError::MalformedMatrix(_)));

    // negative count
    let err =
        FrequencyMatrix::from_rows(vec![1.0], vec![-1.0], vec![1.0], vec![1.0]).unwrap_err();
    assert!(matches!(err, ScanError::MalformedMatrix(_)));

    // missing symbol key
    let mut counts: HashMap<char, Vec<f64>> = HashMap::new();
    counts.insert('A', vec![1.0]);
    counts.insert('C', vec![1.0]);
    counts.insert('G', vec![1.0]);
    assert!(matches!(
        FrequencyMatrix::from_counts(&counts).unwrap_err(),
        ScanError::MalformedMatrix(_)
    ));

    // extra key on top of the full alphabet
    counts.insert('T', vec![1.0]);
    counts.insert('N', vec![1.0]);
    assert!(matches!(
        FrequencyMatrix::from_counts(&counts).unwrap_err(),
        ScanError::MalformedMatrix(_)
    ));
}
