//! Smith-Waterman local alignment with a linear gap penalty.
//!
//! Fills an `(m+1) x (n+1)` grid of `f32` scores clamped to zero, tracks
//! the best cell, then traces back from it. The traceback decides each
//! step by exact equality against the three candidate predecessors, so
//! fill and traceback must use the same arithmetic on the same type;
//! the branch order (diagonal, then up, then left) is part of the
//! contract and must not be reordered.

use crate::scoring::SubstitutionMatrix;
use crate::types::{AlignmentColumn, LocalAlignment, GAP};
use physalia_core::{PhysaliaError, Result};

/// Perform local (Smith-Waterman) alignment with a linear gap penalty.
///
/// `gap` is the score added per gap column, conventionally negative.
/// Columns in the result are tail-first (see [`LocalAlignment`]).
///
/// Empty inputs produce an empty alignment with score 0.
///
/// # Errors
///
/// Returns an error if the scoring grid would exceed addressable size.
pub fn align_local(
    seq_a: &[u8],
    seq_b: &[u8],
    matrix: &SubstitutionMatrix,
    gap: f32,
) -> Result<LocalAlignment> {
    let m = seq_a.len();
    let n = seq_b.len();

    if m == 0 || n == 0 {
        return Ok(LocalAlignment::empty());
    }

    let cols = n + 1;
    let cells = (m + 1).checked_mul(cols).ok_or_else(|| {
        PhysaliaError::InvalidInput(format!("scoring grid {}x{} overflows", m + 1, cols))
    })?;

    let mut h = vec![0.0f32; cells];
    let idx = |i: usize, j: usize| -> usize { i * cols + j };

    // Row 0 and column 0 stay zero (local alignment).

    let mut max_val = 0.0f32;
    let mut max_i = 0usize;
    let mut max_j = 0usize;

    for i in 1..=m {
        for j in 1..=n {
            let sub = matrix.score(seq_a[i - 1], seq_b[j - 1]);
            let diag = h[idx(i - 1, j - 1)] + sub;
            let up = h[idx(i - 1, j)] + gap;
            let left = h[idx(i, j - 1)] + gap;

            let score = diag.max(up).max(left).max(0.0);
            h[idx(i, j)] = score;

            // Strict comparison: the first maximal cell in row-major
            // order wins.
            if score > max_val {
                max_val = score;
                max_i = i;
                max_j = j;
            }
        }
    }

    if max_val <= 0.0 {
        return Ok(LocalAlignment::empty());
    }

    let mut columns = Vec::with_capacity(m + n);
    let mut i = max_i;
    let mut j = max_j;

    while i > 0 && j > 0 && h[idx(i, j)] > 0.0 {
        let current = h[idx(i, j)];
        let diagonal = h[idx(i - 1, j - 1)];
        let up = h[idx(i - 1, j)];
        let sub = matrix.score(seq_a[i - 1], seq_b[j - 1]);

        if current == diagonal + sub {
            columns.push(AlignmentColumn {
                a: (i - 1) as i32,
                b: (j - 1) as i32,
            });
            i -= 1;
            j -= 1;
        } else if current == up + gap {
            columns.push(AlignmentColumn {
                a: (i - 1) as i32,
                b: GAP,
            });
            i -= 1;
        } else {
            columns.push(AlignmentColumn {
                a: GAP,
                b: (j - 1) as i32,
            });
            j -= 1;
        }
    }

    Ok(LocalAlignment {
        score: max_val,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::MATRIX_DIM;

    fn custom_matrix(entries: &[(u8, u8, f32)], default: f32) -> SubstitutionMatrix {
        let mut table = vec![default; MATRIX_DIM * MATRIX_DIM];
        for &(a, b, v) in entries {
            table[((a & 31) as usize) * MATRIX_DIM + ((b & 31) as usize)] = v;
        }
        SubstitutionMatrix::from_scores(table).unwrap()
    }

    #[test]
    fn classic_local_alignment() {
        let m = SubstitutionMatrix::simple(2.0, -1.0);
        let aln = align_local(b"ACACACTA", b"AGCACACA", &m, -1.0).unwrap();
        assert_eq!(aln.score, 12.0);
        let text = aln.render(b"ACACACTA", b"AGCACACA");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "A-CACACTA");
        assert_eq!(lines[2], "AGCACAC-A");
    }

    #[test]
    fn dissimilar_sequences_align_empty() {
        let m = SubstitutionMatrix::simple(1.0, -1.0);
        let aln = align_local(b"AAAA", b"TTTT", &m, -1.0).unwrap();
        assert_eq!(aln.score, 0.0);
        assert!(aln.is_empty());
    }

    #[test]
    fn empty_inputs_align_empty() {
        let m = SubstitutionMatrix::simple(1.0, -1.0);
        assert!(align_local(b"", b"ACGT", &m, -1.0).unwrap().is_empty());
        assert!(align_local(b"ACGT", b"", &m, -1.0).unwrap().is_empty());
    }

    #[test]
    fn perfect_match_scores_full_length() {
        let m = SubstitutionMatrix::simple(2.0, -1.0);
        let aln = align_local(b"WNDW", b"WNDW", &m, -1.0).unwrap();
        assert_eq!(aln.score, 8.0);
        assert_eq!(aln.len(), 4);
        assert_eq!(aln.seq_a_range(), Some((0, 3)));
    }

    #[test]
    fn local_region_in_poor_flanks() {
        let m = SubstitutionMatrix::simple(2.0, -1.0);
        let aln = align_local(b"TTTGATTACATTT", b"CCGATTACACC", &m, -1.0).unwrap();
        assert_eq!(aln.score, 14.0);
        let text = aln.render(b"TTTGATTACATTT", b"CCGATTACACC");
        assert!(text.lines().next().unwrap().contains("GATTACA"));
    }

    #[test]
    fn pam250_twilight_pair() {
        let m = SubstitutionMatrix::pam250();
        let a = b"MKLLVILLFSALALAAQKPGGAPTTSLIGNESRSDQPSTVAAA";
        let b = b"MVTAQKPGGAPTTQLLGNESRSDQPSTVGGG";
        let aln = align_local(a, b, &m, -10.0).unwrap();
        assert!(aln.score > 0.0);
        // The conserved block covers the tails of both sequences.
        let (_, a_end) = aln.seq_a_range().unwrap();
        assert!(a_end >= 38);
    }

    #[test]
    fn diagonal_preferred_over_up_on_ties() {
        // H[2][1] can be reached by diagonal (0 + s(Y,P) = 2) or by up
        // (H[1][1] + gap = 3 - 1 = 2); the max cell at (3,2) traces
        // through it either way.
        let m = custom_matrix(
            &[(b'X', b'P', 3.0), (b'Y', b'P', 2.0), (b'Z', b'Q', 4.0)],
            -10.0,
        );
        let aln = align_local(b"XYZ", b"PQ", &m, -1.0).unwrap();
        assert_eq!(aln.score, 6.0);
        assert_eq!(
            aln.columns,
            vec![
                AlignmentColumn { a: 2, b: 1 },
                AlignmentColumn { a: 1, b: 0 },
            ]
        );
    }

    #[test]
    fn up_preferred_over_left_on_ties() {
        // H[2][2] ties between up (via H[1][2]) and left (via H[2][1]);
        // the diagonal does not match there. Expect the gap to land in
        // sequence B.
        let m = custom_matrix(
            &[(b'X', b'P', 3.0), (b'Z', b'R', 10.0)],
            -10.0,
        );
        let aln = align_local(b"XYZ", b"PQR", &m, -1.0).unwrap();
        assert_eq!(aln.score, 11.0);
        assert_eq!(
            aln.columns,
            vec![
                AlignmentColumn { a: 2, b: 2 },
                AlignmentColumn { a: 1, b: GAP },
                AlignmentColumn { a: GAP, b: 1 },
                AlignmentColumn { a: 0, b: 0 },
            ]
        );
    }

    #[test]
    fn gap_columns_mark_exactly_one_side() {
        let m = SubstitutionMatrix::pam250();
        let aln = align_local(b"HEAGAWGHEE", b"PAWHEAE", &m, -8.0).unwrap();
        for col in &aln.columns {
            assert!(!(col.is_gap_a() && col.is_gap_b()));
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn protein_seq(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
        proptest::collection::vec(
            proptest::sample::select(b"ARNDCQEGHILKMFPSTWYV".to_vec()),
            1..=max_len,
        )
    }

    proptest! {
        #[test]
        fn score_is_nonnegative(a in protein_seq(40), b in protein_seq(40)) {
            let m = SubstitutionMatrix::pam250();
            let aln = align_local(&a, &b, &m, -10.0).unwrap();
            prop_assert!(aln.score >= 0.0);
        }

        #[test]
        fn alignment_is_deterministic(a in protein_seq(40), b in protein_seq(40)) {
            let m = SubstitutionMatrix::pam250();
            let r1 = align_local(&a, &b, &m, -10.0).unwrap();
            let r2 = align_local(&a, &b, &m, -10.0).unwrap();
            prop_assert_eq!(r1, r2);
        }

        #[test]
        fn column_deltas_reconstruct_score(a in protein_seq(40), b in protein_seq(40)) {
            let m = SubstitutionMatrix::pam250();
            let gap = -10.0f32;
            let aln = align_local(&a, &b, &m, gap).unwrap();

            // Replaying the per-column deltas head-to-tail repeats the
            // fill arithmetic exactly, so the sum equals the score
            // without tolerance.
            let mut total = 0.0f32;
            for col in aln.columns.iter().rev() {
                if col.is_gap_a() || col.is_gap_b() {
                    total += gap;
                } else {
                    total += m.score(a[col.a as usize], b[col.b as usize]);
                }
            }
            prop_assert_eq!(total, aln.score);
        }

        #[test]
        fn gap_convention_holds(a in protein_seq(40), b in protein_seq(40)) {
            let m = SubstitutionMatrix::pam250();
            let aln = align_local(&a, &b, &m, -10.0).unwrap();
            for col in &aln.columns {
                prop_assert!(!(col.is_gap_a() && col.is_gap_b()));
                prop_assert!(col.a >= GAP && col.b >= GAP);
            }
        }
    }
}
