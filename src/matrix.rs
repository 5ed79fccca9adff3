//! Dense contact matrices.

pub mod condensed;

pub use condensed::Condensed;

/// An error related to constructing a [`ContactMatrix`].
#[derive(Debug)]
pub enum Error {
    /// A row did not have the same number of columns as the first row.
    ///
    /// The fields are the row index, the expected number of columns, and the
    /// number of columns found.
    RaggedRow(usize, usize, usize),

    /// The backing data did not have `rows * cols` values.
    ///
    /// The fields are the expected and the actual number of values.
    DataLength(usize, usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::RaggedRow(row, expected, found) => write!(
                f,
                "ragged row {row}: expected {expected} columns, found {found} columns"
            ),
            Error::DataLength(expected, found) => {
                write!(f, "expected {expected} values, found {found} values")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A dense, row-major matrix of pairwise contact values between bins.
///
/// A contact matrix is square and symmetric in practice, but neither
/// property is enforced at construction: squareness is checked by the
/// operations that need it, and only the upper triangle is ever read when the
/// matrix is treated as a distance structure.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactMatrix {
    /// The number of rows.
    rows: usize,

    /// The number of columns.
    cols: usize,

    /// The values in row-major order.
    data: Vec<f64>,
}

impl ContactMatrix {
    /// Attempts to create a new contact matrix from its dimensions and
    /// row-major values.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    ///
    /// let matrix = ContactMatrix::try_new(2, 3, vec![0.0; 6])?;
    /// assert_eq!(matrix.shape(), (2, 3));
    ///
    /// assert!(ContactMatrix::try_new(2, 2, vec![0.0; 3]).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::DataLength(rows * cols, data.len()));
        }

        Ok(Self { rows, cols, data })
    }

    /// Attempts to create a new contact matrix from a set of rows.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    ///
    /// let matrix = ContactMatrix::try_from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]])?;
    /// assert_eq!(matrix.get(0, 1), 1.0);
    ///
    /// let err = ContactMatrix::try_from_rows(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "ragged row 1: expected 2 columns, found 1 columns"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_rows<R>(rows: impl IntoIterator<Item = R>) -> Result<Self>
    where
        R: AsRef<[f64]>,
    {
        let mut data = Vec::new();
        let mut cols = None;
        let mut n_rows = 0;

        for (i, row) in rows.into_iter().enumerate() {
            let row = row.as_ref();

            match cols {
                Some(expected) if expected != row.len() => {
                    return Err(Error::RaggedRow(i, expected, row.len()));
                }
                Some(_) => {}
                None => cols = Some(row.len()),
            }

            data.extend_from_slice(row);
            n_rows += 1;
        }

        Ok(Self {
            rows: n_rows,
            cols: cols.unwrap_or(0),
            data,
        })
    }

    /// Creates a new contact matrix by calling `f(row, col)` for every cell.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    ///
    /// let matrix = ContactMatrix::from_fn(3, 3, |i, j| if i == j { 1.0 } else { 0.0 });
    /// assert_eq!(matrix.get(1, 1), 1.0);
    /// assert_eq!(matrix.get(1, 2), 0.0);
    /// ```
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);

        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }

        Self { rows, cols, data }
    }

    /// Gets the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Gets the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Gets the `(rows, cols)` shape of the matrix.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns whether the matrix has as many rows as columns.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    ///
    /// assert!(ContactMatrix::from_fn(2, 2, |_, _| 1.0).is_square());
    /// assert!(!ContactMatrix::from_fn(2, 3, |_, _| 1.0).is_square());
    /// ```
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Gets the value at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );

        self.data[row * self.cols + col]
    }

    /// Sets the value at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );

        self.data[row * self.cols + col] = value;
    }

    /// Gets a row of the matrix as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Gets the values of the matrix in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Overwrites every cell on the main diagonal with `value`.
    ///
    /// For non-square matrices, the diagonal runs until either dimension is
    /// exhausted.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    ///
    /// let mut matrix = ContactMatrix::from_fn(2, 2, |_, _| 5.0);
    /// matrix.fill_diagonal(0.0);
    ///
    /// assert_eq!(matrix.as_slice(), &[0.0, 5.0, 5.0, 0.0]);
    /// ```
    pub fn fill_diagonal(&mut self, value: f64) {
        for i in 0..self.rows.min(self.cols) {
            self.data[i * self.cols + i] = value;
        }
    }

    /// Returns whether every value in the matrix is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    /// Replaces every NaN or infinite value with `value`, returning the number
    /// of replaced cells.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::ContactMatrix;
    ///
    /// let mut matrix = ContactMatrix::try_new(1, 3, vec![f64::NAN, 1.0, f64::INFINITY])?;
    /// assert_eq!(matrix.replace_non_finite(0.0), 2);
    /// assert_eq!(matrix.as_slice(), &[0.0, 1.0, 0.0]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn replace_non_finite(&mut self, value: f64) -> usize {
        let mut replaced = 0;

        for cell in self.data.iter_mut().filter(|cell| !cell.is_finite()) {
            *cell = value;
            replaced += 1;
        }

        replaced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rows() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let matrix = ContactMatrix::try_from_rows(Vec::<Vec<f64>>::new())?;
        assert_eq!(matrix.shape(), (0, 0));
        assert!(matrix.is_square());
        Ok(())
    }

    #[test]
    fn test_rows_round_trip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let matrix = ContactMatrix::try_from_rows([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]])?;

        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(matrix.get(0, 2), 3.0);
        Ok(())
    }

    #[test]
    fn test_fill_diagonal_on_wide_matrix() {
        let mut matrix = ContactMatrix::from_fn(2, 3, |_, _| 1.0);
        matrix.fill_diagonal(0.0);
        assert_eq!(matrix.as_slice(), &[0.0, 1.0, 1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_set_and_finiteness() {
        let mut matrix = ContactMatrix::from_fn(2, 2, |_, _| 1.0);
        assert!(matrix.is_finite());

        matrix.set(1, 0, f64::NAN);
        assert!(!matrix.is_finite());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds() {
        let matrix = ContactMatrix::from_fn(2, 2, |_, _| 1.0);
        matrix.get(2, 0);
    }

    #[test]
    fn test_data_length_error() {
        let err = ContactMatrix::try_new(3, 3, vec![0.0; 8]).unwrap_err();
        assert_eq!(err.to_string(), "expected 9 values, found 8 values");
    }
}
