use tfbs_scan_rs::error::ScanError;
use tfbs_scan_rs::fasta;

#[test]
fn test_read_fasta() {
    let path = "tests/data/test1.fasta";
    let records = fasta::read_fasta(path).unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].id, "chr19-48309341-48309411");
    assert_eq!(
        records[0].description.as_deref(),
        Some("GATA1 promoter fragment")
    );
    // wrapped sequence lines are concatenated
    assert_eq!(records[0].sequence.len(), 42);

    // lowercase input is uppercased
    assert_eq!(records[1].sequence, "TTTTGCGCAAAATGCGCAA");
    assert!(records[1].description.is_none());

    assert_eq!(records[2].id, "spacer-ctrl");

    // test file does not exist
    let result = fasta::read_fasta("tests/data/nonexistent.fasta");
    assert!(result.is_err());
}

#[test]
fn test_parse_fasta_multiline_records() {
    let text = ">first sample record\nacgt\nACGT\n\n>second\nTTTT\n";
    let records = fasta::parse_fasta(text).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "first");
    assert_eq!(records[0].description.as_deref(), Some("sample record"));
    assert_eq!(records[0].sequence, "ACGTACGT");
    assert_eq!(records[1].id, "second");
    assert!(records[1].description.is_none());
    assert_eq!(records[1].sequence, "TTTT");
}

#[test]
fn test_parse_fasta_rejects_stray_data() {
    // sequence before any header
    let err = fasta::parse_fasta("ACGT\n>first\nACGT\n").unwrap_err();
    assert!(matches!(err, ScanError::InvalidFasta(_)));

    // header without an identifier
    let err = fasta::parse_fasta(">\nACGT\n").unwrap_err();
    assert!(matches!(err, ScanError::InvalidFasta(_)));
}

#[test]
fn test_parse_fasta_empty_input() {
    assert!(matches!(
        fasta::parse_fasta("").unwrap_err(),
        ScanError::EmptyFasta
    ));
    assert!(matches!(
        fasta::parse_fasta("  \n\n").unwrap_err(),
        ScanError::EmptyFasta
    ));
}

#[test]
fn test_extract_sequence() {
    let (name, sequence) = fasta::extract_sequence(">rec1 promoter\nACGT\nacgt\n").unwrap();
    assert_eq!(name.as_deref(), Some("rec1"));
    assert_eq!(sequence, "ACGTACGT");

    // raw text is trimmed and uppercased
    let (name, sequence) = fasta::extract_sequence("  acgtT \n").unwrap();
    assert!(name.is_none());
    assert_eq!(sequence, "ACGTT");
}

#[test]
fn test_validate_sequence() {
    assert!(fasta::validate_sequence("ACGTACGT").is_ok());
    assert!(fasta::validate_sequence("").is_ok());

    let err = fasta::validate_sequence("ACGNT").unwrap_err();
    match err {
        ScanError::InvalidSequence { position, .. } => assert_eq!(position, 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_rev_comp() {
    assert_eq!(fasta::rev_comp("ACGT"), "ACGT");
    assert_eq!(fasta::rev_comp("AACG"), "CGTT");
    assert_eq!(fasta::rev_comp(""), "");
}

#[test]
#[should_panic]
fn test_rev_comp_unknown_symbol() {
    fasta::rev_comp("ACGN");
}
