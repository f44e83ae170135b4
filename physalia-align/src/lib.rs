//! Local sequence alignment for the Physalia similarity-network toolkit.
//!
//! Provides pairwise local alignment via Smith-Waterman with a linear gap
//! penalty, scored against a dense 32x32 substitution table indexed by
//! `byte & 31` (PAM250 and uniform match/mismatch schemes built in).
//!
//! # Quick start
//!
//! ```
//! use physalia_align::{align_local, SubstitutionMatrix};
//!
//! let matrix = SubstitutionMatrix::simple(2.0, -1.0);
//! let aln = align_local(b"ACACACTA", b"AGCACACA", &matrix, -1.0).unwrap();
//! assert_eq!(aln.score, 12.0);
//! ```

pub mod scoring;
pub mod smith_waterman;
pub mod types;

pub use scoring::{SubstitutionMatrix, MATRIX_DIM};
pub use smith_waterman::align_local;
pub use types::{AlignmentColumn, LocalAlignment, GAP};
