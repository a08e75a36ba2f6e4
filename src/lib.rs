//! Position weight matrix scanning for transcription factor binding sites in Rust

pub mod error;
pub mod fasta;
pub mod jaspar;
pub mod pssm;
pub mod scan;
pub mod types;
