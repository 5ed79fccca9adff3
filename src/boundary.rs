//! Domain boundaries derived from a flat cluster assignment.

use std::io;
use std::io::Write;

use crate::cluster::Assignment;

/// The delimiter between the start and end of a domain when written out.
const DELIMITER: char = '\t';

/// An error related to constructing [`Boundaries`] from a raw list.
#[derive(Debug)]
pub enum Error {
    /// The list had fewer than two boundaries.
    TooShort(usize),

    /// The list did not start at zero.
    NonZeroStart(usize),

    /// The list was not strictly increasing at the given index.
    NotIncreasing(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::TooShort(len) => {
                write!(f, "at least two boundaries are required, found {len}")
            }
            Error::NonZeroStart(start) => {
                write!(f, "boundaries must start at 0, found {start}")
            }
            Error::NotIncreasing(index) => {
                write!(f, "boundaries must be strictly increasing: index {index}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// An ordered list of domain boundaries over a matrix's bins.
///
/// A non-empty list always starts at `0`, ends at the number of bins, and is
/// strictly increasing; each consecutive pair `[boundaries[i],
/// boundaries[i + 1])` is one domain. An empty list is the sentinel returned
/// for input that has no boundaries to call (e.g. a non-square matrix).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Boundaries(Vec<usize>);

impl Boundaries {
    /// Creates the empty sentinel list.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Extracts boundaries from a cluster assignment.
    ///
    /// A boundary is placed at `0`, at every bin whose cluster differs from
    /// the previous bin's, and at the number of bins. Only adjacency matters:
    /// two separated runs of the same cluster are still separate domains.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Boundaries;
    /// use clustertad::cluster::Assignment;
    ///
    /// let assignment = Assignment::from(vec![1, 1, 2, 2, 2, 1, 3]);
    /// let boundaries = Boundaries::from_assignment(&assignment);
    ///
    /// assert_eq!(boundaries.as_slice(), &[0, 2, 5, 6, 7]);
    /// ```
    pub fn from_assignment(assignment: &Assignment) -> Self {
        let ids = assignment.as_slice();
        let mut boundaries = vec![0];

        boundaries.extend(
            ids.windows(2)
                .enumerate()
                .filter(|(_, pair)| pair[0] != pair[1])
                .map(|(i, _)| i + 1),
        );
        boundaries.push(ids.len());

        // NOTE: the scan already yields a strictly increasing list (apart from
        // a zero-bin assignment, where the start and end coincide).
        boundaries.sort_unstable();
        boundaries.dedup();

        Self(boundaries)
    }

    /// Gets the boundaries as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Gets the number of boundaries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether this is the empty sentinel list.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets an iterator over the `(start, end)` bin ranges of each domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Boundaries;
    /// use clustertad::cluster::Assignment;
    ///
    /// let boundaries = Boundaries::from_assignment(&Assignment::from(vec![1, 1, 1, 2, 2]));
    /// let domains = boundaries.domains().collect::<Vec<_>>();
    ///
    /// assert_eq!(domains, vec![(0, 3), (3, 5)]);
    /// ```
    pub fn domains(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Writes one `start<TAB>end` line per domain.
    ///
    /// Nothing is written for the empty sentinel list.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Boundaries;
    ///
    /// let boundaries = Boundaries::try_from(vec![0, 3, 7, 10])?;
    /// let mut buffer = Vec::new();
    /// boundaries.write_tads(&mut buffer)?;
    ///
    /// assert_eq!(String::from_utf8(buffer)?, "0\t3\n3\t7\n7\t10\n");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_tads<W>(&self, mut writer: W) -> io::Result<()>
    where
        W: Write,
    {
        for (start, end) in self.domains() {
            writeln!(writer, "{start}{DELIMITER}{end}")?;
        }

        writer.flush()
    }

    /// Consumes `self` and returns the inner list.
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl TryFrom<Vec<usize>> for Boundaries {
    type Error = Error;

    fn try_from(boundaries: Vec<usize>) -> Result<Self, Self::Error> {
        if boundaries.len() < 2 {
            return Err(Error::TooShort(boundaries.len()));
        }

        if boundaries[0] != 0 {
            return Err(Error::NonZeroStart(boundaries[0]));
        }

        if let Some(index) = boundaries.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(Error::NotIncreasing(index + 1));
        }

        Ok(Self(boundaries))
    }
}

impl std::fmt::Display for Boundaries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self.0.iter().map(|b| b.to_string()).collect::<Vec<_>>();
        write!(f, "[{}]", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundaries(ids: &[usize]) -> Boundaries {
        Boundaries::from_assignment(&Assignment::from(ids.to_vec()))
    }

    #[test]
    fn test_single_cluster() {
        assert_eq!(boundaries(&[4, 4, 4, 4, 4]).as_slice(), &[0, 5]);
    }

    #[test]
    fn test_every_bin_its_own_cluster() {
        assert_eq!(boundaries(&[1, 2, 3, 4]).as_slice(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_non_adjacent_runs_stay_separate() {
        let boundaries = boundaries(&[1, 2, 1, 2]);
        assert_eq!(boundaries.as_slice(), &[0, 1, 2, 3, 4]);
        assert_eq!(boundaries.domains().count(), 4);
    }

    #[test]
    fn test_single_bin() {
        assert_eq!(boundaries(&[1]).as_slice(), &[0, 1]);
    }

    #[test]
    fn test_zero_bins_collapse() {
        assert_eq!(boundaries(&[]).as_slice(), &[0]);
    }

    #[test]
    fn test_strictly_increasing() {
        let boundaries = boundaries(&[3, 3, 1, 1, 1, 2, 5, 5, 3]);
        assert_eq!(boundaries.as_slice(), &[0, 2, 5, 6, 8, 9]);
        assert!(boundaries.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_write_empty_sentinel() -> Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        Boundaries::empty().write_tads(&mut buffer)?;
        assert!(buffer.is_empty());
        Ok(())
    }

    #[test]
    fn test_try_from() {
        assert!(Boundaries::try_from(vec![0, 3, 7, 10]).is_ok());

        let err = Boundaries::try_from(vec![0]).unwrap_err();
        assert_eq!(err.to_string(), "at least two boundaries are required, found 1");

        let err = Boundaries::try_from(vec![1, 3]).unwrap_err();
        assert_eq!(err.to_string(), "boundaries must start at 0, found 1");

        let err = Boundaries::try_from(vec![0, 3, 3, 5]).unwrap_err();
        assert_eq!(err.to_string(), "boundaries must be strictly increasing: index 2");
    }

    #[test]
    fn test_display() {
        assert_eq!(boundaries(&[1, 1, 2]).to_string(), "[0, 2, 3]");
        assert_eq!(Boundaries::empty().to_string(), "[]");
    }
}
