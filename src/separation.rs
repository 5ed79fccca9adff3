//! Block-mean separation scores.
//!
//! For every candidate split between bin `i` and bin `i + 1`, the separation
//! score compares how densely the upstream block `[0, i]` and the downstream
//! block `[i + 1, n)` interact with themselves against how densely they
//! interact with each other:
//!
//! ```text
//! score[i] = mean(upstream) + mean(downstream) - 2 * mean(cross)
//! ```
//!
//! The score peaks at genuine domain boundaries and sits near zero within a
//! uniform domain. It is a diagnostic signal only: boundary calling in
//! [`Caller`](crate::Caller) does not consume it.
//!
//! Non-finite values are not rejected here. They propagate only into the
//! scores of the splits whose blocks contain them.

use crate::ContactMatrix;

/// Summed-area table over a square matrix.
struct Prefix {
    /// The side length of the matrix.
    n: usize,

    /// `(n + 1) * (n + 1)` prefix sums, where the cell at `(r, c)` holds the
    /// sum of every value in rows `< r` and columns `< c`.
    sums: Vec<f64>,
}

impl Prefix {
    /// Builds the table for a square matrix.
    fn new(matrix: &ContactMatrix) -> Self {
        let n = matrix.rows();
        let width = n + 1;
        let mut sums = vec![0.0; width * width];

        for r in 0..n {
            let mut row_sum = 0.0;
            for (c, value) in matrix.row(r).iter().enumerate() {
                row_sum += value;
                sums[(r + 1) * width + c + 1] = sums[r * width + c + 1] + row_sum;
            }
        }

        Self { n, sums }
    }

    /// Sums the block spanning rows `[r0, r1)` and columns `[c0, c1)`.
    fn block(&self, r0: usize, r1: usize, c0: usize, c1: usize) -> f64 {
        let width = self.n + 1;
        self.sums[r1 * width + c1] - self.sums[r0 * width + c1] - self.sums[r1 * width + c0]
            + self.sums[r0 * width + c0]
    }
}

/// Sums the block spanning rows `[r0, r1)` and columns `[c0, c1)` cell by cell.
fn direct_block(matrix: &ContactMatrix, r0: usize, r1: usize, c0: usize, c1: usize) -> f64 {
    (r0..r1)
        .map(|r| matrix.row(r)[c0..c1].iter().sum::<f64>())
        .sum()
}

/// Computes the separation score for every candidate split of a square
/// matrix.
///
/// An `n x n` matrix yields `n - 1` scores, where index `i` scores the split
/// between bin `i` and bin `i + 1`. A non-square matrix yields an empty
/// vector rather than an error so that callers can branch on the length.
///
/// # Examples
///
/// ```
/// use clustertad::ContactMatrix;
/// use clustertad::separation;
///
/// let matrix = ContactMatrix::try_from_rows([
///     [100.0, 100.0, 1.0, 1.0],
///     [100.0, 100.0, 1.0, 1.0],
///     [1.0, 1.0, 100.0, 100.0],
///     [1.0, 1.0, 100.0, 100.0],
/// ])?;
///
/// assert_eq!(separation::scores(&matrix), vec![88.0, 198.0, 88.0]);
///
/// let wide = ContactMatrix::from_fn(2, 3, |_, _| 1.0);
/// assert!(separation::scores(&wide).is_empty());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn scores(matrix: &ContactMatrix) -> Vec<f64> {
    if !matrix.is_square() {
        return Vec::new();
    }

    let n = matrix.rows();
    if n < 2 {
        return Vec::new();
    }

    // NOTE: a summed-area table would smear a non-finite cell into every
    // block, so those matrices are summed block by block instead.
    let prefix = matrix.is_finite().then(|| Prefix::new(matrix));
    let block = |r0, r1, c0, c1| match &prefix {
        Some(prefix) => prefix.block(r0, r1, c0, c1),
        None => direct_block(matrix, r0, r1, c0, c1),
    };

    let mut scores = Vec::with_capacity(n - 1);

    for i in 0..n - 1 {
        let upstream = (i + 1) as f64;
        let downstream = (n - i - 1) as f64;

        let mean_a = block(0, i + 1, 0, i + 1) / (upstream * upstream);
        let mean_b = block(i + 1, n, i + 1, n) / (downstream * downstream);
        let mean_c = block(0, i + 1, i + 1, n) / (upstream * downstream);

        scores.push(mean_a + mean_b - 2.0 * mean_c);
    }

    scores
}

/// Computes the separation score of the whole matrix as the sum of the
/// per-split [`scores()`].
///
/// [`None`] is returned for a non-square matrix.
///
/// # Examples
///
/// ```
/// use clustertad::ContactMatrix;
/// use clustertad::separation;
///
/// let matrix = ContactMatrix::try_from_rows([
///     [100.0, 100.0, 1.0, 1.0],
///     [100.0, 100.0, 1.0, 1.0],
///     [1.0, 1.0, 100.0, 100.0],
///     [1.0, 1.0, 100.0, 100.0],
/// ])?;
///
/// assert_eq!(separation::total(&matrix), Some(374.0));
/// assert_eq!(separation::total(&ContactMatrix::from_fn(1, 2, |_, _| 1.0)), None);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn total(matrix: &ContactMatrix) -> Option<f64> {
    if !matrix.is_square() {
        return None;
    }

    Some(scores(matrix).iter().sum())
}
