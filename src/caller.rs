//! Calling domains from a contact matrix.

use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::Boundaries;
use crate::ContactMatrix;
use crate::cluster;
use crate::cluster::Assignment;
use crate::cluster::Clustering;
use crate::cluster::Criterion;
use crate::cluster::Method;
use crate::cluster::NearestNeighborChain;
use crate::matrix::Condensed;

pub mod builder;

pub use builder::Builder;

/// The default flat-cut threshold.
///
/// Cutting by inconsistency at zero keeps a subtree together only when none of
/// its merges stands out from its neighborhood at all, which is what makes the
/// default caller free of tunable parameters.
pub const DEFAULT_THRESHOLD: f64 = 0.0;

/// An error related to calling domains.
#[derive(Debug)]
pub enum Error {
    /// The matrix was not square (only under [`ShapePolicy::Strict`]).
    ///
    /// The fields are the number of rows and columns.
    NotSquare(usize, usize),

    /// A clustering error.
    Clustering(cluster::Error),

    /// A file path was provided instead of an in-memory matrix.
    UnsupportedInput(PathBuf),

    /// An I/O error while writing domains.
    Io(io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotSquare(rows, cols) => {
                write!(f, "matrix must be square, found {rows}x{cols}")
            }
            Error::Clustering(err) => write!(f, "clustering error: {err}"),
            Error::UnsupportedInput(path) => write!(
                f,
                "loading a matrix from a file path is not supported: {}",
                path.display()
            ),
            Error::Io(err) => write!(f, "i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// How a non-square matrix is handled.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ShapePolicy {
    /// Return empty boundaries (and empty scores) without an error.
    #[default]
    Sentinel,

    /// Return [`Error::NotSquare`].
    Strict,
}

/// The input to [`Caller::call_tads()`].
#[derive(Debug)]
pub enum Source<'a> {
    /// An in-memory matrix. Its diagonal is zeroed by the call.
    Matrix(&'a mut ContactMatrix),

    /// A path to a matrix on disk, which is always rejected.
    Path(&'a Path),
}

impl<'a> From<&'a mut ContactMatrix> for Source<'a> {
    fn from(matrix: &'a mut ContactMatrix) -> Self {
        Source::Matrix(matrix)
    }
}

impl<'a> From<&'a Path> for Source<'a> {
    fn from(path: &'a Path) -> Self {
        Source::Path(path)
    }
}

/// The outcome of clustering a square matrix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Detection {
    /// The flat cluster of every bin.
    assignment: Assignment,

    /// The domain boundaries.
    boundaries: Boundaries,
}

impl Detection {
    /// Gets the flat cluster of every bin.
    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Gets the domain boundaries.
    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    /// Consumes `self` and returns the domain boundaries.
    pub fn into_boundaries(self) -> Boundaries {
        self.boundaries
    }
}

/// A domain caller.
///
/// The matrix is treated as a pairwise distance structure over its bins:
/// its diagonal is zeroed, its upper triangle is agglomerated with the
/// configured [`Method`], and the resulting dendrogram is cut into flat
/// clusters with the configured [`Criterion`] and threshold. Boundaries are
/// placed wherever adjacent bins land in different clusters.
///
/// A caller holds no state between calls and can be shared across threads.
/// Generally, you will want to use a [`Builder`] to construct one of these.
///
/// # Examples
///
/// ```
/// use clustertad::Caller;
/// use clustertad::ContactMatrix;
///
/// let mut matrix = ContactMatrix::try_from_rows([
///     [0.0, 1.0, 50.0, 50.0, 50.0],
///     [1.0, 0.0, 50.0, 50.0, 50.0],
///     [50.0, 50.0, 0.0, 1.0, 1.0],
///     [50.0, 50.0, 1.0, 0.0, 1.0],
///     [50.0, 50.0, 1.0, 1.0, 0.0],
/// ])?;
///
/// let boundaries = Caller::new().detect_boundaries(&mut matrix)?;
/// assert_eq!(boundaries.as_slice(), &[0, 2, 5]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Caller<C = NearestNeighborChain> {
    /// The clustering capability.
    clustering: C,

    /// The linkage method.
    method: Method,

    /// The flat-cut criterion.
    criterion: Criterion,

    /// The flat-cut threshold.
    threshold: f64,

    /// The policy for non-square matrices.
    shape_policy: ShapePolicy,
}

impl Caller {
    /// Creates a caller with the default configuration.
    pub fn new() -> Self {
        Builder::new().build()
    }
}

impl Default for Caller {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Caller<C>
where
    C: Clustering,
{
    /// Gets the linkage method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Gets the flat-cut criterion.
    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    /// Gets the flat-cut threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Gets the policy for non-square matrices.
    pub fn shape_policy(&self) -> ShapePolicy {
        self.shape_policy
    }

    /// Clusters the bins of `matrix` and derives domain boundaries.
    ///
    /// The diagonal of `matrix` is overwritten with zeros. [`None`] is returned
    /// for a non-square matrix under [`ShapePolicy::Sentinel`], in which case
    /// the matrix is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Caller;
    /// use clustertad::ContactMatrix;
    ///
    /// let mut matrix = ContactMatrix::try_from_rows([
    ///     [7.0, 1.0, 9.0, 9.0],
    ///     [1.0, 7.0, 9.0, 9.0],
    ///     [9.0, 9.0, 7.0, 1.0],
    ///     [9.0, 9.0, 1.0, 7.0],
    /// ])?;
    ///
    /// let detection = Caller::new().detect(&mut matrix)?.unwrap();
    ///
    /// assert_eq!(detection.assignment().as_slice(), &[1, 1, 2, 2]);
    /// assert_eq!(detection.boundaries().as_slice(), &[0, 2, 4]);
    /// assert_eq!(matrix.get(0, 0), 0.0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn detect(&self, matrix: &mut ContactMatrix) -> Result<Option<Detection>> {
        let Some(distances) = Condensed::from_matrix(matrix) else {
            let (rows, cols) = matrix.shape();

            return match self.shape_policy {
                ShapePolicy::Sentinel => {
                    debug!(rows, cols, "matrix is not square: no boundaries called");
                    Ok(None)
                }
                ShapePolicy::Strict => Err(Error::NotSquare(rows, cols)),
            };
        };

        debug!(bins = distances.n(), method = %self.method, "clustering bins");
        matrix.fill_diagonal(0.0);

        let dendrogram = self
            .clustering
            .linkage(&distances, self.method)
            .map_err(Error::Clustering)?;

        let assignment = self
            .clustering
            .cut(&dendrogram, self.threshold, self.criterion);
        let boundaries = Boundaries::from_assignment(&assignment);

        debug!(
            merges = dendrogram.merges().len(),
            clusters = assignment.clusters(),
            domains = boundaries.len().saturating_sub(1),
            "called domains"
        );

        Ok(Some(Detection {
            assignment,
            boundaries,
        }))
    }

    /// Detects domain boundaries, zeroing the diagonal of `matrix` in place.
    ///
    /// A non-square matrix yields empty boundaries under
    /// [`ShapePolicy::Sentinel`] and [`Error::NotSquare`] under
    /// [`ShapePolicy::Strict`]. Matrices with fewer than two bins and matrices
    /// with non-finite values off the diagonal are rejected with
    /// [`Error::Clustering`].
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Caller;
    /// use clustertad::ContactMatrix;
    ///
    /// let mut uniform = ContactMatrix::from_fn(5, 5, |_, _| 1.0);
    /// let boundaries = Caller::new().detect_boundaries(&mut uniform)?;
    /// assert_eq!(boundaries.as_slice(), &[0, 5]);
    ///
    /// let mut wide = ContactMatrix::from_fn(3, 4, |_, _| 1.0);
    /// assert!(Caller::new().detect_boundaries(&mut wide)?.is_empty());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn detect_boundaries(&self, matrix: &mut ContactMatrix) -> Result<Boundaries> {
        Ok(self
            .detect(matrix)?
            .map(Detection::into_boundaries)
            .unwrap_or_default())
    }

    /// Detects domain boundaries on a copy of `matrix`, leaving the original
    /// untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Caller;
    /// use clustertad::ContactMatrix;
    ///
    /// let matrix = ContactMatrix::from_fn(3, 3, |_, _| 2.0);
    /// let boundaries = Caller::new().detect_boundaries_cloned(&matrix)?;
    ///
    /// assert_eq!(boundaries.as_slice(), &[0, 3]);
    /// assert_eq!(matrix.get(1, 1), 2.0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn detect_boundaries_cloned(&self, matrix: &ContactMatrix) -> Result<Boundaries> {
        let mut matrix = matrix.clone();
        self.detect_boundaries(&mut matrix)
    }

    /// Calls domains and optionally writes them to `output`.
    ///
    /// Only in-memory matrices are accepted: a [`Source::Path`] fails with
    /// [`Error::UnsupportedInput`] without touching the filesystem. When
    /// `output` is provided, it is created (or truncated) and receives one
    /// `start<TAB>end` line per domain. The boundaries are returned either way.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use clustertad::Caller;
    /// use clustertad::ContactMatrix;
    ///
    /// let mut matrix = ContactMatrix::from_fn(4, 4, |_, _| 1.0);
    /// let boundaries = Caller::new().call_tads(&mut matrix, None)?;
    /// assert_eq!(boundaries.as_slice(), &[0, 4]);
    ///
    /// let err = Caller::new()
    ///     .call_tads(Path::new("matrix.txt"), None)
    ///     .unwrap_err();
    /// assert_eq!(
    ///     err.to_string(),
    ///     "loading a matrix from a file path is not supported: matrix.txt"
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn call_tads<'a>(
        &self,
        source: impl Into<Source<'a>>,
        output: Option<&Path>,
    ) -> Result<Boundaries> {
        let matrix = match source.into() {
            Source::Matrix(matrix) => matrix,
            Source::Path(path) => return Err(Error::UnsupportedInput(path.to_path_buf())),
        };

        let boundaries = self.detect_boundaries(matrix)?;

        if let Some(path) = output {
            let file = File::create(path).map_err(Error::Io)?;
            boundaries
                .write_tads(BufWriter::new(file))
                .map_err(Error::Io)?;
            debug!(path = %path.display(), "wrote domains");
        }

        Ok(boundaries)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rand::Rng as _;
    use rand::SeedableRng as _;
    use rand::rngs::StdRng;
    use tempdir::TempDir;

    use super::*;
    use crate::cluster::Dendrogram;

    /// Builds a block matrix with the given block sizes: bins in the same block
    /// are `inside` apart and bins in different blocks are `cross` apart.
    fn blocks(sizes: &[usize], inside: f64, cross: f64) -> ContactMatrix {
        let labels = sizes
            .iter()
            .enumerate()
            .flat_map(|(label, &size)| std::iter::repeat(label).take(size))
            .collect::<Vec<_>>();
        let n = labels.len();

        ContactMatrix::from_fn(n, n, |i, j| match labels[i] == labels[j] {
            true => inside,
            false => cross,
        })
    }

    fn random_symmetric(rng: &mut StdRng, n: usize) -> ContactMatrix {
        let mut matrix = ContactMatrix::from_fn(n, n, |_, _| 0.0);

        for i in 0..n {
            for j in i..n {
                let value = rng.gen_range(0.0..10.0);
                matrix.set(i, j, value);
                matrix.set(j, i, value);
            }
        }

        matrix
    }

    #[test]
    fn test_uniform_matrix_is_one_domain() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut matrix = ContactMatrix::from_fn(5, 5, |_, _| 1.0);
        let boundaries = Caller::new().detect_boundaries(&mut matrix)?;
        assert_eq!(boundaries.as_slice(), &[0, 5]);
        Ok(())
    }

    #[test]
    fn test_dense_contact_blocks() -> std::result::Result<(), Box<dyn std::error::Error>> {
        // High contact values read as large distances, so each bin clusters
        // with its counterpart in the other block rather than with its
        // neighbor, and every bin becomes its own domain.
        let mut matrix = ContactMatrix::try_from_rows([
            [100.0, 100.0, 1.0, 1.0],
            [100.0, 100.0, 1.0, 1.0],
            [1.0, 1.0, 100.0, 100.0],
            [1.0, 1.0, 100.0, 100.0],
        ])?;

        let detection = Caller::new().detect(&mut matrix)?.unwrap();
        assert_eq!(detection.assignment().as_slice(), &[1, 2, 1, 2]);
        assert_eq!(detection.boundaries().as_slice(), &[0, 1, 2, 3, 4]);
        Ok(())
    }

    #[test]
    fn test_distance_blocks() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let caller = Caller::new();

        for (sizes, expected) in [
            (vec![2, 2], vec![0, 2, 4]),
            (vec![2, 2, 2], vec![0, 2, 4, 6]),
            (vec![3, 3], vec![0, 3, 6]),
            (vec![2, 3], vec![0, 2, 5]),
            (vec![3, 2, 2], vec![0, 3, 5, 7]),
        ] {
            let mut matrix = blocks(&sizes, 1.0, 50.0);
            let boundaries = caller.detect_boundaries(&mut matrix)?;
            assert_eq!(boundaries.as_slice(), expected.as_slice(), "sizes: {sizes:?}");
        }

        Ok(())
    }

    #[test]
    fn test_uneven_block() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut matrix = ContactMatrix::try_from_rows([
            [0.0, 2.0, 9.0, 9.0, 9.0],
            [2.0, 0.0, 9.0, 9.0, 9.0],
            [9.0, 9.0, 0.0, 3.0, 4.0],
            [9.0, 9.0, 3.0, 0.0, 3.0],
            [9.0, 9.0, 4.0, 3.0, 0.0],
        ])?;

        let detection = Caller::new().detect(&mut matrix)?.unwrap();
        assert_eq!(detection.assignment().as_slice(), &[1, 1, 2, 2, 3]);
        assert_eq!(detection.boundaries().as_slice(), &[0, 2, 4, 5]);
        Ok(())
    }

    #[test]
    fn test_threshold_is_overridable() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut matrix = blocks(&[2, 2], 1.0, 100.0);

        let boundaries = Caller::new().detect_boundaries(&mut matrix)?;
        assert_eq!(boundaries.as_slice(), &[0, 2, 4]);

        // The root merge has an inconsistency coefficient of 2/sqrt(3).
        let caller = Builder::new().threshold(1.2)?.build();
        assert_eq!(caller.detect_boundaries(&mut matrix)?.as_slice(), &[0, 4]);

        let caller = Builder::new().threshold(-1.0)?.build();
        assert_eq!(
            caller.detect_boundaries(&mut matrix)?.as_slice(),
            &[0, 1, 2, 3, 4]
        );

        Ok(())
    }

    #[test]
    fn test_two_bins() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut matrix = ContactMatrix::try_from_rows([[3.0, 5.0], [5.0, 3.0]])?;
        assert_eq!(Caller::new().detect_boundaries(&mut matrix)?.as_slice(), &[0, 2]);
        Ok(())
    }

    #[test]
    fn test_too_few_bins() {
        for n in [0, 1] {
            let mut matrix = ContactMatrix::from_fn(n, n, |_, _| 1.0);
            let err = Caller::new().detect_boundaries(&mut matrix).unwrap_err();
            assert!(matches!(
                err,
                Error::Clustering(cluster::Error::TooFewObservations(found)) if found == n
            ));
        }
    }

    #[test]
    fn test_non_square_sentinel() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut matrix = ContactMatrix::from_fn(3, 4, |_, _| 1.0);
        let untouched = matrix.clone();

        assert!(Caller::new().detect(&mut matrix)?.is_none());
        assert!(Caller::new().detect_boundaries(&mut matrix)?.is_empty());
        assert_eq!(matrix, untouched);
        Ok(())
    }

    #[test]
    fn test_non_square_strict() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let caller = Builder::new().shape_policy(ShapePolicy::Strict).build();
        let mut matrix = ContactMatrix::from_fn(3, 4, |_, _| 1.0);

        let err = caller.detect_boundaries(&mut matrix).unwrap_err();
        assert_eq!(err.to_string(), "matrix must be square, found 3x4");
        Ok(())
    }

    #[test]
    fn test_non_finite_off_diagonal() {
        let mut matrix = ContactMatrix::from_fn(3, 3, |_, _| 1.0);
        matrix.set(2, 1, f64::NAN);
        matrix.set(1, 2, f64::NAN);

        let err = Caller::new().detect_boundaries(&mut matrix).unwrap_err();
        assert!(matches!(err, Error::Clustering(cluster::Error::NonFinite)));
    }

    #[test]
    fn test_non_finite_diagonal_is_zeroed() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut matrix = ContactMatrix::from_fn(3, 3, |i, j| match i == j {
            true => f64::NAN,
            false => 1.0,
        });

        let boundaries = Caller::new().detect_boundaries(&mut matrix)?;
        assert_eq!(boundaries.as_slice(), &[0, 3]);
        assert!(matrix.is_finite());
        Ok(())
    }

    #[test]
    fn test_diagonal_is_zeroed_in_place() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut matrix = ContactMatrix::from_fn(4, 4, |i, j| (i + j + 1) as f64);
        Caller::new().detect_boundaries(&mut matrix)?;

        for i in 0..4 {
            assert_eq!(matrix.get(i, i), 0.0);
        }

        assert_eq!(matrix.get(0, 1), 2.0);
        Ok(())
    }

    #[test]
    fn test_cloned_detection_leaves_matrix() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let matrix = blocks(&[2, 3], 5.0, 40.0);
        let original = matrix.clone();

        let boundaries = Caller::new().detect_boundaries_cloned(&matrix)?;
        assert_eq!(boundaries.as_slice(), &[0, 2, 5]);
        assert_eq!(matrix, original);
        Ok(())
    }

    #[test]
    fn test_call_tads_rejects_paths() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("clustertad")?;
        let input = dir.path().join("matrix.txt");
        fs::write(&input, "0\t1\n1\t0\n")?;
        let output = dir.path().join("tads.txt");

        let err = Caller::new()
            .call_tads(input.as_path(), Some(output.as_path()))
            .unwrap_err();

        assert!(matches!(err, Error::UnsupportedInput(ref path) if path == &input));
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_call_tads_writes_output() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("clustertad")?;
        let output = dir.path().join("tads.txt");
        fs::write(&output, "stale contents that should be overwritten\n")?;

        let mut matrix = blocks(&[3, 4, 3], 1.0, 20.0);
        let boundaries = Caller::new().call_tads(&mut matrix, Some(output.as_path()))?;

        assert_eq!(boundaries.as_slice(), &[0, 3, 7, 10]);
        assert_eq!(fs::read_to_string(&output)?, "0\t3\n3\t7\n7\t10\n");
        Ok(())
    }

    #[test]
    fn test_call_tads_writes_empty_file_for_sentinel()
    -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("clustertad")?;
        let output = dir.path().join("tads.txt");

        let mut matrix = ContactMatrix::from_fn(2, 3, |_, _| 1.0);
        let boundaries = Caller::new().call_tads(&mut matrix, Some(output.as_path()))?;

        assert!(boundaries.is_empty());
        assert_eq!(fs::read_to_string(&output)?, "");
        Ok(())
    }

    #[test]
    fn test_call_tads_surfaces_io_errors() {
        let mut matrix = ContactMatrix::from_fn(3, 3, |_, _| 1.0);
        let output = Path::new("/this/directory/does/not/exist/tads.txt");

        let err = Caller::new().call_tads(&mut matrix, Some(output)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_random_matrices_keep_invariants() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut rng = StdRng::seed_from_u64(2024);
        let caller = Caller::new();

        for _ in 0..50 {
            let n = rng.gen_range(2..24);
            let mut matrix = random_symmetric(&mut rng, n);

            let first = caller.detect_boundaries(&mut matrix)?;
            let second = caller.detect_boundaries(&mut matrix)?;
            assert_eq!(first, second);

            let boundaries = first.as_slice();
            assert_eq!(boundaries.first(), Some(&0));
            assert_eq!(boundaries.last(), Some(&n));
            assert!(boundaries.len() <= n + 1);
            assert!(boundaries.windows(2).all(|pair| pair[0] < pair[1]));
        }

        Ok(())
    }

    #[test]
    fn test_deterministic_across_copies() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut rng = StdRng::seed_from_u64(7);
        let matrix = random_symmetric(&mut rng, 30);

        let caller = Caller::new();
        let a = caller.detect_boundaries_cloned(&matrix)?;
        let b = caller.detect_boundaries_cloned(&matrix)?;
        assert_eq!(a, b);
        Ok(())
    }

    /// Puts every bin into the same cluster regardless of the dendrogram.
    struct Everything;

    impl Clustering for Everything {
        fn linkage(
            &self,
            distances: &Condensed,
            method: Method,
        ) -> std::result::Result<Dendrogram, cluster::Error> {
            NearestNeighborChain.linkage(distances, method)
        }

        fn cut(&self, dendrogram: &Dendrogram, _: f64, _: Criterion) -> Assignment {
            Assignment::from(vec![1; dendrogram.leaves()])
        }
    }

    #[test]
    fn test_pluggable_clustering() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let caller = Builder::new().clustering(Everything).build();
        let mut matrix = blocks(&[2, 2, 2], 1.0, 50.0);

        assert_eq!(caller.detect_boundaries(&mut matrix)?.as_slice(), &[0, 6]);
        Ok(())
    }
}
