//! A builder for a [`Caller`].

use crate::Caller;
use crate::caller::DEFAULT_THRESHOLD;
use crate::caller::ShapePolicy;
use crate::cluster::Clustering;
use crate::cluster::Criterion;
use crate::cluster::Method;
use crate::cluster::NearestNeighborChain;

/// An error related to a [`Builder`].
#[derive(Debug)]
pub enum Error {
    /// An inconsistency depth of zero was requested.
    ZeroDepth,

    /// The threshold was NaN.
    NanThreshold,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ZeroDepth => write!(f, "inconsistency depth must be at least 1"),
            Error::NanThreshold => write!(f, "threshold must not be NaN"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`Caller`].
#[derive(Clone, Debug)]
pub struct Builder<C = NearestNeighborChain> {
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

impl Builder {
    /// Creates a builder with the default configuration: Ward linkage cut at
    /// an inconsistency of [`DEFAULT_THRESHOLD`] over a neighborhood depth of
    /// [`DEFAULT_DEPTH`](crate::cluster::DEFAULT_DEPTH).
    pub fn new() -> Self {
        Self {
            clustering: NearestNeighborChain,
            method: Method::default(),
            criterion: Criterion::default(),
            threshold: DEFAULT_THRESHOLD,
            shape_policy: ShapePolicy::default(),
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Builder<C>
where
    C: Clustering,
{
    /// Sets the clustering capability.
    pub fn clustering<D>(self, clustering: D) -> Builder<D>
    where
        D: Clustering,
    {
        Builder {
            clustering,
            method: self.method,
            criterion: self.criterion,
            threshold: self.threshold,
            shape_policy: self.shape_policy,
        }
    }

    /// Sets the linkage method.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::caller::Builder;
    /// use clustertad::cluster::Method;
    ///
    /// let caller = Builder::new().method(Method::Average).build();
    /// assert_eq!(caller.method(), Method::Average);
    /// ```
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the flat-cut criterion.
    pub fn criterion(mut self, criterion: Criterion) -> Result<Self> {
        if let Criterion::Inconsistent { depth: 0 } = criterion {
            return Err(Error::ZeroDepth);
        }

        self.criterion = criterion;
        Ok(self)
    }

    /// Cuts by inconsistency with the given neighborhood depth.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::caller::Builder;
    /// use clustertad::cluster::Criterion;
    ///
    /// let caller = Builder::new().depth(3)?.build();
    /// assert_eq!(caller.criterion(), Criterion::Inconsistent { depth: 3 });
    ///
    /// assert!(Builder::new().depth(0).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn depth(self, depth: usize) -> Result<Self> {
        self.criterion(Criterion::Inconsistent { depth })
    }

    /// Sets the flat-cut threshold.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::caller::Builder;
    ///
    /// let caller = Builder::new().threshold(1.5)?.build();
    /// assert_eq!(caller.threshold(), 1.5);
    ///
    /// assert!(Builder::new().threshold(f64::NAN).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn threshold(mut self, threshold: f64) -> Result<Self> {
        if threshold.is_nan() {
            return Err(Error::NanThreshold);
        }

        self.threshold = threshold;
        Ok(self)
    }

    /// Sets the policy for non-square matrices.
    pub fn shape_policy(mut self, policy: ShapePolicy) -> Self {
        self.shape_policy = policy;
        self
    }

    /// Builds a [`Caller`] from the builder.
    pub fn build(self) -> Caller<C> {
        Caller {
            clustering: self.clustering,
            method: self.method,
            criterion: self.criterion,
            threshold: self.threshold,
            shape_policy: self.shape_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let caller = Builder::new().build();

        assert_eq!(caller.method(), Method::Ward);
        assert_eq!(caller.criterion(), Criterion::Inconsistent { depth: 2 });
        assert_eq!(caller.threshold(), 0.0);
        assert_eq!(caller.shape_policy(), ShapePolicy::Sentinel);
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let err = Builder::new()
            .criterion(Criterion::Inconsistent { depth: 0 })
            .unwrap_err();
        assert_eq!(err.to_string(), "inconsistency depth must be at least 1");
    }

    #[test]
    fn test_distance_criterion() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let caller = Builder::new()
            .criterion(Criterion::Distance)?
            .threshold(10.0)?
            .shape_policy(ShapePolicy::Strict)
            .build();

        assert_eq!(caller.criterion(), Criterion::Distance);
        assert_eq!(caller.threshold(), 10.0);
        assert_eq!(caller.shape_policy(), ShapePolicy::Strict);
        Ok(())
    }
}
