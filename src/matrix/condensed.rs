//! The condensed (upper-triangular) form of a pairwise distance matrix.

use crate::ContactMatrix;

/// A condensed pairwise distance matrix over `n` observations.
///
/// Only the strictly upper triangle is stored, row by row, so the distance
/// between observations `i < j` lives at index `n*i - i*(i+1)/2 + (j-i-1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Condensed {
    /// The number of observations.
    n: usize,

    /// The `n * (n - 1) / 2` pairwise distances.
    values: Vec<f64>,
}

impl Condensed {
    /// Creates the condensed form of a square matrix by reading its strictly
    /// upper triangle.
    ///
    /// The lower triangle and the diagonal are never read. [`None`] is
    /// returned when `matrix` is not square.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    /// use clustertad::matrix::Condensed;
    ///
    /// let matrix = ContactMatrix::try_from_rows([
    ///     [0.0, 1.0, 2.0],
    ///     [1.0, 0.0, 3.0],
    ///     [2.0, 3.0, 0.0],
    /// ])?;
    ///
    /// let condensed = Condensed::from_matrix(&matrix).unwrap();
    /// assert_eq!(condensed.as_slice(), &[1.0, 2.0, 3.0]);
    /// assert_eq!(condensed.get(2, 1), 3.0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_matrix(matrix: &ContactMatrix) -> Option<Self> {
        if !matrix.is_square() {
            return None;
        }

        let n = matrix.rows();
        let mut values = Vec::with_capacity(n * n.saturating_sub(1) / 2);

        for i in 0..n {
            values.extend_from_slice(&matrix.row(i)[i + 1..]);
        }

        Some(Self { n, values })
    }

    /// Gets the number of observations.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Gets the pairwise distances in condensed order.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Gets the distance between two distinct observations.
    ///
    /// # Panics
    ///
    /// Panics if `i == j` or either index is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[self.index(i, j)]
    }

    /// Sets the distance between two distinct observations.
    ///
    /// # Panics
    ///
    /// Panics if `i == j` or either index is out of bounds.
    pub(crate) fn set(&mut self, i: usize, j: usize, value: f64) {
        let index = self.index(i, j);
        self.values[index] = value;
    }

    /// Computes the condensed index of the pair `(i, j)`.
    fn index(&self, i: usize, j: usize) -> usize {
        assert!(i != j, "no condensed entry for the pair ({i}, {i})");
        assert!(
            i < self.n && j < self.n,
            "pair ({i}, {j}) out of bounds for {} observations",
            self.n
        );

        let (i, j) = if i < j { (i, j) } else { (j, i) };
        self.n * i - i * (i + 1) / 2 + (j - i - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_square_has_no_condensed_form() {
        let matrix = ContactMatrix::from_fn(2, 3, |_, _| 1.0);
        assert!(Condensed::from_matrix(&matrix).is_none());
    }

    #[test]
    fn test_ignores_lower_triangle() -> Result<(), Box<dyn std::error::Error>> {
        let matrix = ContactMatrix::try_from_rows([
            [9.0, 1.0, 2.0, 3.0],
            [7.0, 9.0, 4.0, 5.0],
            [7.0, 7.0, 9.0, 6.0],
            [7.0, 7.0, 7.0, 9.0],
        ])?;

        let condensed = Condensed::from_matrix(&matrix).unwrap();
        assert_eq!(condensed.n(), 4);
        assert_eq!(condensed.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_eq!(condensed.get(i, j), matrix.get(i, j));
                assert_eq!(condensed.get(j, i), matrix.get(i, j));
            }
        }

        Ok(())
    }

    #[test]
    fn test_single_observation() {
        let matrix = ContactMatrix::from_fn(1, 1, |_, _| 4.0);
        let condensed = Condensed::from_matrix(&matrix).unwrap();
        assert_eq!(condensed.n(), 1);
        assert!(condensed.as_slice().is_empty());
    }

    #[test]
    fn test_set() {
        let matrix = ContactMatrix::from_fn(3, 3, |_, _| 1.0);
        let mut condensed = Condensed::from_matrix(&matrix).unwrap();
        condensed.set(2, 0, 8.0);
        assert_eq!(condensed.get(0, 2), 8.0);
    }

    #[test]
    #[should_panic(expected = "no condensed entry")]
    fn test_diagonal_pair_panics() {
        let matrix = ContactMatrix::from_fn(3, 3, |_, _| 1.0);
        let condensed = Condensed::from_matrix(&matrix).unwrap();
        condensed.get(1, 1);
    }
}
