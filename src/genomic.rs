//! Placing called domains on the genome.
//!
//! A contact matrix covers a contiguous [`Region`] of one contig at a fixed
//! bin size (the resolution). Mapping [`Boundaries`] back onto that region
//! yields one [`Domain`] per pair of consecutive boundaries.

use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::LazyLock;

use omics::coordinate;
use omics::coordinate::Coordinate;
use omics::coordinate::Strand;
use omics::coordinate::interval::interbase::Interval;
use omics::coordinate::position::Number;
use omics::coordinate::system::Interbase;
use regex::Regex;

use crate::Boundaries;

/// The pattern for a region (e.g., `chr1:1,000,000-2,000,000`).
static REGION: LazyLock<Regex> = LazyLock::new(|| {
    // SAFETY: the pattern is a valid regular expression.
    Regex::new(r"^([^:\s]+):([0-9,]+)-([0-9,]+)$").unwrap()
});

/// A parse error related to a [`Region`].
#[derive(Debug)]
pub enum ParseError {
    /// The value was not of the form `contig:start-end`.
    Format(String),

    /// A position could not be parsed.
    Position(String, ParseIntError),

    /// The start of the region was after its end.
    Inverted(Number, Number),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Format(value) => {
                write!(f, "invalid region `{value}`: expected `contig:start-end`")
            }
            ParseError::Position(value, err) => {
                write!(f, "invalid position `{value}`: {err}")
            }
            ParseError::Inverted(start, end) => {
                write!(f, "region start ({start}) is after its end ({end})")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An error related to genomic coordinates.
#[derive(Debug)]
pub enum Error {
    /// A parse error.
    Parse(ParseError),

    /// An interval error.
    Interval(coordinate::interval::Error),

    /// The position of a boundary did not fit in a genomic position.
    ///
    /// The fields are the boundary (in bins) and the resolution.
    Overflow(usize, Number),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "parse error: {err}"),
            Error::Interval(err) => write!(f, "interval error: {err}"),
            Error::Overflow(bin, resolution) => write!(
                f,
                "position of bin {bin} at a resolution of {resolution} overflows"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Parses a position, ignoring thousands separators.
fn parse_position(value: &str) -> std::result::Result<Number, ParseError> {
    value
        .replace(',', "")
        .parse::<Number>()
        .map_err(|err| ParseError::Position(value.to_string(), err))
}

/// A contiguous stretch of a contig covered by a contact matrix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Region {
    /// The contig name.
    contig: String,

    /// The zero-based start of the region.
    start: Number,

    /// The zero-based, exclusive end of the region.
    end: Number,
}

impl Region {
    /// Attempts to create a new region.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::genomic::Region;
    ///
    /// let region = Region::try_new("chr1", 1000, 2000)?;
    /// assert_eq!(region.contig(), "chr1");
    ///
    /// assert!(Region::try_new("chr1", 2000, 1000).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(contig: impl Into<String>, start: Number, end: Number) -> Result<Self> {
        if start > end {
            return Err(Error::Parse(ParseError::Inverted(start, end)));
        }

        Ok(Self {
            contig: contig.into(),
            start,
            end,
        })
    }

    /// Gets the contig name.
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Gets the start of the region.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the end of the region.
    pub fn end(&self) -> Number {
        self.end
    }

    /// Places every domain in `boundaries` within the region.
    ///
    /// Boundary `b` sits at `start + b * resolution`. The last domain is not
    /// clamped to the end of the region, so a matrix whose final bin runs past
    /// the region yields a domain that does too.
    ///
    /// An [`Error::Overflow`] is returned when a boundary's position does not
    /// fit in a [`Number`].
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Boundaries;
    /// use clustertad::genomic::Region;
    ///
    /// let region = "chr2:1,000,000-1,100,000".parse::<Region>()?;
    /// let boundaries = Boundaries::try_from(vec![0, 3, 10])?;
    /// let domains = region.domains(&boundaries, 10_000)?;
    ///
    /// assert_eq!(domains.len(), 2);
    /// assert_eq!(domains[0].start(), 1_000_000);
    /// assert_eq!(domains[0].end(), 1_030_000);
    /// assert_eq!(domains[1].end(), 1_100_000);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn domains(&self, boundaries: &Boundaries, resolution: Number) -> Result<Vec<Domain>> {
        let position = |bin: usize| {
            Number::try_from(bin)
                .ok()
                .and_then(|bin| bin.checked_mul(resolution))
                .and_then(|offset| self.start.checked_add(offset))
                .ok_or(Error::Overflow(bin, resolution))
        };

        boundaries
            .domains()
            .map(|(start, end)| {
                Ok(Domain {
                    contig: self.contig.clone(),
                    start: position(start)?,
                    end: position(end)?,
                })
            })
            .collect()
    }
}

impl FromStr for Region {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let captures = REGION
            .captures(s.trim())
            .ok_or_else(|| ParseError::Format(s.to_string()))?;

        let start = parse_position(&captures[2])?;
        let end = parse_position(&captures[3])?;

        if start > end {
            return Err(ParseError::Inverted(start, end));
        }

        Ok(Self {
            contig: captures[1].to_string(),
            start,
            end,
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}

/// A domain placed on the genome.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Domain {
    /// The contig name.
    contig: String,

    /// The zero-based start of the domain.
    start: Number,

    /// The zero-based, exclusive end of the domain.
    end: Number,
}

impl Domain {
    /// Gets the contig name.
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Gets the start of the domain.
    pub fn start(&self) -> Number {
        self.start
    }

    /// Gets the end of the domain.
    pub fn end(&self) -> Number {
        self.end
    }

    /// Converts the domain into an interbase interval on the positive strand.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::Boundaries;
    /// use clustertad::genomic::Region;
    /// use omics::coordinate::interval::interbase::Interval;
    ///
    /// let region = Region::try_new("chr1", 0, 50_000)?;
    /// let boundaries = Boundaries::try_from(vec![0, 2, 5])?;
    /// let domains = region.domains(&boundaries, 10_000)?;
    ///
    /// assert_eq!(
    ///     domains[1].to_interval()?,
    ///     "chr1:+:20000-50000".parse::<Interval>()?
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn to_interval(&self) -> Result<Interval> {
        let start =
            Coordinate::<Interbase>::new(self.contig.as_str(), Strand::Positive, self.start);
        let end = Coordinate::<Interbase>::new(self.contig.as_str(), Strand::Positive, self.end);
        Interval::try_new(start, end).map_err(Error::Interval)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.contig, self.start, self.end)
    }
}
