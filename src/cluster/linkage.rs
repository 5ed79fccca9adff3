//! Agglomeration through the nearest-neighbor chain algorithm.

use tracing::trace;

use crate::cluster::Dendrogram;
use crate::cluster::Error;
use crate::cluster::Merge;
use crate::cluster::Method;
use crate::matrix::Condensed;

impl Method {
    /// Computes the Lance-Williams update for the distance between cluster
    /// `i` and the union of clusters `x` and `y`.
    fn update(
        &self,
        d_xi: f64,
        d_yi: f64,
        d_xy: f64,
        size_x: usize,
        size_y: usize,
        size_i: usize,
    ) -> f64 {
        match self {
            Method::Single => d_xi.min(d_yi),
            Method::Complete => d_xi.max(d_yi),
            Method::Average => {
                let size_x = size_x as f64;
                let size_y = size_y as f64;
                (size_x * d_xi + size_y * d_yi) / (size_x + size_y)
            }
            Method::Weighted => 0.5 * (d_xi + d_yi),
            Method::Ward => {
                let t = 1.0 / (size_x + size_y + size_i) as f64;
                ((size_i + size_x) as f64 * t * d_xi * d_xi
                    + (size_i + size_y) as f64 * t * d_yi * d_yi
                    - size_i as f64 * t * d_xy * d_xy)
                    .sqrt()
            }
        }
    }
}

/// Agglomerates the observations of `distances` into a [`Dendrogram`].
///
/// Each step follows a chain of nearest neighbors from the first active
/// cluster until two clusters are each other's nearest neighbor, merges them,
/// and updates the distances to the merged cluster with `method`. Ties favor
/// the previous link in the chain and then the lowest cluster index, so the
/// result is fully deterministic.
///
/// # Examples
///
/// ```
/// use clustertad::ContactMatrix;
/// use clustertad::cluster::Method;
/// use clustertad::cluster::linkage::linkage;
/// use clustertad::matrix::Condensed;
///
/// let matrix = ContactMatrix::try_from_rows([
///     [0.0, 1.0, 4.0],
///     [1.0, 0.0, 4.0],
///     [4.0, 4.0, 0.0],
/// ])?;
///
/// let dendrogram = linkage(&Condensed::from_matrix(&matrix).unwrap(), Method::Single)?;
/// let heights = dendrogram
///     .merges()
///     .iter()
///     .map(|merge| merge.height())
///     .collect::<Vec<_>>();
///
/// assert_eq!(heights, vec![1.0, 4.0]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn linkage(distances: &Condensed, method: Method) -> Result<Dendrogram, Error> {
    let n = distances.n();

    if n < 2 {
        return Err(Error::TooFewObservations(n));
    }

    if !distances.as_slice().iter().all(|d| d.is_finite()) {
        return Err(Error::NonFinite);
    }

    let mut d = distances.clone();
    // A size of zero marks a cluster that has been merged away.
    let mut size = vec![1usize; n];
    let mut chain = Vec::<usize>::with_capacity(n);
    let mut recorded = Vec::with_capacity(n - 1);

    for _ in 0..n - 1 {
        if chain.is_empty() {
            let first = size.iter().position(|&s| s > 0).unwrap_or(0);
            chain.push(first);
        }

        let (x, y, height) = loop {
            let x = chain[chain.len() - 1];
            let previous = chain.len().checked_sub(2).map(|i| chain[i]);

            let (mut y, mut current) = match previous {
                Some(p) => (p, d.get(x, p)),
                None => (x, f64::INFINITY),
            };

            for (i, &s) in size.iter().enumerate() {
                if s == 0 || i == x {
                    continue;
                }

                let distance = d.get(x, i);
                if distance < current {
                    current = distance;
                    y = i;
                }
            }

            if previous == Some(y) {
                break (x, y, current);
            }

            chain.push(y);
        };

        chain.truncate(chain.len() - 2);

        let (x, y) = if x < y { (x, y) } else { (y, x) };
        let (size_x, size_y) = (size[x], size[y]);

        trace!(x, y, height, "merging clusters");
        recorded.push(Merge::new(x, y, height, size_x + size_y));

        size[x] = 0;
        size[y] = size_x + size_y;

        for i in 0..n {
            let size_i = size[i];
            if size_i == 0 || i == y {
                continue;
            }

            let updated = method.update(d.get(i, x), d.get(i, y), height, size_x, size_y, size_i);
            d.set(i, y, updated);
        }
    }

    Dendrogram::try_from_recorded(n, recorded)
}
