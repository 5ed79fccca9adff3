//! Agglomerative hierarchical clustering over condensed distance matrices.
//!
//! Clustering happens in two steps behind the [`Clustering`] trait:
//!
//! - [`Clustering::linkage()`] agglomerates the observations into a
//!   [`Dendrogram`] using a [`Method`].
//! - [`Clustering::cut()`] cuts the dendrogram into flat clusters according to
//!   a [`Criterion`] and a threshold, yielding an [`Assignment`].
//!
//! [`NearestNeighborChain`] is the provided implementation.
//!
//! ```
//! use clustertad::ContactMatrix;
//! use clustertad::cluster::Clustering as _;
//! use clustertad::cluster::Criterion;
//! use clustertad::cluster::Method;
//! use clustertad::cluster::NearestNeighborChain;
//! use clustertad::matrix::Condensed;
//!
//! let matrix = ContactMatrix::try_from_rows([
//!     [0.0, 1.0, 9.0, 9.0],
//!     [1.0, 0.0, 9.0, 9.0],
//!     [9.0, 9.0, 0.0, 1.0],
//!     [9.0, 9.0, 1.0, 0.0],
//! ])?;
//!
//! let distances = Condensed::from_matrix(&matrix).unwrap();
//! let dendrogram = NearestNeighborChain.linkage(&distances, Method::Ward)?;
//! let assignment = NearestNeighborChain.cut(&dendrogram, 0.0, Criterion::default());
//!
//! assert_eq!(assignment.as_slice(), &[1, 1, 2, 2]);
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dendrogram;
pub mod flat;
pub mod inconsistency;
pub mod linkage;

pub use dendrogram::Dendrogram;
pub use dendrogram::Merge;
pub use flat::Assignment;

use crate::matrix::Condensed;

/// The neighborhood depth used by [`Criterion::Inconsistent`] by default.
pub const DEFAULT_DEPTH: usize = 2;

/// An error related to clustering.
#[derive(Debug)]
pub enum Error {
    /// Fewer than two observations were provided.
    TooFewObservations(usize),

    /// A distance was NaN or infinite.
    NonFinite,

    /// A dendrogram did not have one merge fewer than it has observations.
    ///
    /// The fields are the expected and the actual number of merges.
    MergeCount(usize, usize),

    /// A recorded merge referred to an observation that does not exist.
    ///
    /// The fields are the observation and the number of observations.
    UnknownObservation(usize, usize),

    /// The recorded merge at the given index joined two observations that
    /// were already in the same cluster.
    RedundantMerge(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TooFewObservations(n) => write!(
                f,
                "at least two observations are required for clustering, found {n}"
            ),
            Error::NonFinite => write!(f, "distances must contain only finite values"),
            Error::MergeCount(expected, found) => {
                write!(f, "expected {expected} merges, found {found} merges")
            }
            Error::UnknownObservation(observation, leaves) => write!(
                f,
                "observation {observation} does not exist among {leaves} observations"
            ),
            Error::RedundantMerge(index) => write!(
                f,
                "merge {index} joins observations that are already in the same cluster"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// The criterion used to update the distance between a newly merged cluster
/// and every remaining cluster.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Method {
    /// The nearest point in either cluster.
    Single,

    /// The farthest point in either cluster.
    Complete,

    /// The size-weighted average of the two merged clusters' distances.
    Average,

    /// The unweighted average of the two merged clusters' distances.
    Weighted,

    /// Ward's minimum variance criterion.
    #[default]
    Ward,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Single => write!(f, "single"),
            Method::Complete => write!(f, "complete"),
            Method::Average => write!(f, "average"),
            Method::Weighted => write!(f, "weighted"),
            Method::Ward => write!(f, "ward"),
        }
    }
}

/// The criterion used to cut a [`Dendrogram`] into flat clusters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Criterion {
    /// Keeps a subtree together when no merge within it has an inconsistency
    /// coefficient above the threshold.
    ///
    /// The coefficient of each merge is computed over the merges at most
    /// `depth` levels below and including it.
    Inconsistent {
        /// The neighborhood depth of the inconsistency statistic.
        depth: usize,
    },

    /// Keeps a subtree together when no merge within it is higher than the
    /// threshold.
    Distance,
}

impl Default for Criterion {
    fn default() -> Self {
        Criterion::Inconsistent {
            depth: DEFAULT_DEPTH,
        }
    }
}

/// A hierarchical clustering capability.
pub trait Clustering {
    /// Agglomerates the observations of `distances` into a [`Dendrogram`].
    fn linkage(&self, distances: &Condensed, method: Method) -> Result<Dendrogram, Error>;

    /// Cuts `dendrogram` into flat clusters.
    fn cut(&self, dendrogram: &Dendrogram, threshold: f64, criterion: Criterion) -> Assignment;
}

/// Clustering through the nearest-neighbor chain algorithm.
///
/// Merges are sorted by height and relabeled once agglomeration finishes, so
/// the resulting [`Dendrogram`] does not depend on the order in which
/// reciprocal nearest neighbors were found.
#[derive(Clone, Copy, Debug, Default)]
pub struct NearestNeighborChain;

impl Clustering for NearestNeighborChain {
    fn linkage(&self, distances: &Condensed, method: Method) -> Result<Dendrogram, Error> {
        linkage::linkage(distances, method)
    }

    fn cut(&self, dendrogram: &Dendrogram, threshold: f64, criterion: Criterion) -> Assignment {
        flat::cut(dendrogram, threshold, criterion)
    }
}
