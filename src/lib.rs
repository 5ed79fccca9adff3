//! `clustertad` is a crate for calling topologically associating domains (TADs)
//! from Hi-C contact matrices without any tunable parameters.
//!
//! The crate provides two main points of entry:
//!
//! - Calling domain boundaries from a square contact matrix.
//! - Scoring how well each bin separates the matrix into two blocks.
//!
//! ## Calling domains
//!
//! A [`Caller`] treats a [`ContactMatrix`] as a pairwise distance structure
//! over its bins. It zeroes the diagonal, agglomerates the bins into a
//! [dendrogram](crate::cluster::Dendrogram) with Ward linkage, and cuts the
//! dendrogram wherever a merge is inconsistent with its neighborhood (an
//! [inconsistency coefficient](crate::cluster::inconsistency) above
//! [`caller::DEFAULT_THRESHOLD`]). The flat clusters are then turned into
//! [`Boundaries`]: a boundary falls wherever two adjacent bins land in
//! different clusters.
//!
//! ```
//! use clustertad::Caller;
//! use clustertad::ContactMatrix;
//!
//! let mut matrix = ContactMatrix::try_from_rows([
//!     [0.0, 1.0, 50.0, 50.0, 50.0, 50.0],
//!     [1.0, 0.0, 50.0, 50.0, 50.0, 50.0],
//!     [50.0, 50.0, 0.0, 1.0, 50.0, 50.0],
//!     [50.0, 50.0, 1.0, 0.0, 50.0, 50.0],
//!     [50.0, 50.0, 50.0, 50.0, 0.0, 1.0],
//!     [50.0, 50.0, 50.0, 50.0, 1.0, 0.0],
//! ])?;
//!
//! let boundaries = Caller::new().detect_boundaries(&mut matrix)?;
//! assert_eq!(boundaries.as_slice(), &[0, 2, 4, 6]);
//!
//! for (start, end) in boundaries.domains() {
//!     println!("domain: bins {start} to {end}");
//! }
//!
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The caller can be configured through a [`caller::Builder`] (the linkage
//! [method](crate::cluster::Method), the cut
//! [criterion](crate::cluster::Criterion) and threshold, and how non-square
//! matrices are treated), and any [`cluster::Clustering`] implementation can
//! be plugged in. Boundaries can be written out as `start<TAB>end` lines with
//! [`Boundaries::write_tads()`] or placed on the genome with
//! [`genomic::Region::domains()`].
//!
//! ## Separation scores
//!
//! [`separation::scores()`] computes, for every split point of a square
//! matrix, the mean contact within the two diagonal blocks minus twice the
//! mean contact between them.
//!
//! ```
//! use clustertad::ContactMatrix;
//! use clustertad::separation;
//!
//! let matrix = ContactMatrix::from_fn(4, 4, |_, _| 3.0);
//! assert_eq!(separation::scores(&matrix), vec![0.0, 0.0, 0.0]);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]
#![warn(missing_debug_implementations)]
#![warn(clippy::missing_docs_in_private_items)]
#![warn(rustdoc::broken_intra_doc_links)]

pub mod boundary;
pub mod caller;
pub mod cluster;
pub mod genomic;
pub mod matrix;
pub mod separation;

pub use boundary::Boundaries;
pub use caller::Caller;
pub use matrix::ContactMatrix;
