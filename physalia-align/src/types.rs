//! Result types for local alignment.

/// Marker for the gapped side of an alignment column.
pub const GAP: i32 = -1;

/// One column of a pairwise alignment.
///
/// `a` and `b` are zero-based indices into the two input sequences.
/// Exactly one of them is [`GAP`] on a gap column; both are `>= 0` on a
/// match/mismatch column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignmentColumn {
    pub a: i32,
    pub b: i32,
}

impl AlignmentColumn {
    /// True if sequence A contributes no residue to this column.
    pub fn is_gap_a(&self) -> bool {
        self.a == GAP
    }

    /// True if sequence B contributes no residue to this column.
    pub fn is_gap_b(&self) -> bool {
        self.b == GAP
    }
}

/// Result of a local alignment.
///
/// `columns` is stored in traceback order: the first element is the column
/// at the maximum-scoring cell, the last is where the traceback stopped.
/// Iterate it reversed for left-to-right order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalAlignment {
    /// The maximum cell value in the scoring grid.
    pub score: f32,
    /// Alignment columns, tail-first.
    pub columns: Vec<AlignmentColumn>,
}

impl LocalAlignment {
    /// An alignment with no positive-scoring region.
    pub fn empty() -> Self {
        Self {
            score: 0.0,
            columns: Vec::new(),
        }
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True if no positive-scoring region was found.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Inclusive index range of sequence A covered by the alignment.
    pub fn seq_a_range(&self) -> Option<(usize, usize)> {
        let start = self.columns.iter().rev().find(|c| !c.is_gap_a())?.a;
        let end = self.columns.iter().find(|c| !c.is_gap_a())?.a;
        Some((start as usize, end as usize))
    }

    /// Inclusive index range of sequence B covered by the alignment.
    pub fn seq_b_range(&self) -> Option<(usize, usize)> {
        let start = self.columns.iter().rev().find(|c| !c.is_gap_b())?.b;
        let end = self.columns.iter().find(|c| !c.is_gap_b())?.b;
        Some((start as usize, end as usize))
    }

    /// Render the alignment as three text lines: sequence A, a match line
    /// (`|` match, `.` mismatch, space at gaps), and sequence B.
    pub fn render(&self, seq_a: &[u8], seq_b: &[u8]) -> String {
        let mut line_a = String::with_capacity(self.len());
        let mut line_m = String::with_capacity(self.len());
        let mut line_b = String::with_capacity(self.len());

        for col in self.columns.iter().rev() {
            let ca = if col.is_gap_a() {
                '-'
            } else {
                seq_a[col.a as usize] as char
            };
            let cb = if col.is_gap_b() {
                '-'
            } else {
                seq_b[col.b as usize] as char
            };
            line_a.push(ca);
            line_b.push(cb);
            line_m.push(if ca == '-' || cb == '-' {
                ' '
            } else if ca == cb {
                '|'
            } else {
                '.'
            });
        }

        format!("{line_a}\n{line_m}\n{line_b}")
    }
}
