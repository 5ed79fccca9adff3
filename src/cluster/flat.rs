//! Cutting a [`Dendrogram`] into flat clusters.

use crate::cluster::Criterion;
use crate::cluster::Dendrogram;
use crate::cluster::inconsistency::inconsistency;

/// A flat cluster id for every original observation.
///
/// Cluster ids start at one and are handed out in the order in which a
/// top-down, left-first traversal of the dendrogram settles them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assignment(Vec<usize>);

impl Assignment {
    /// Gets the cluster ids as a slice.
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Gets the number of observations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no observations.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the number of distinct clusters.
    pub fn clusters(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }

    /// Consumes `self` and returns the cluster ids.
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl From<Vec<usize>> for Assignment {
    fn from(ids: Vec<usize>) -> Self {
        Self(ids)
    }
}

/// Computes, for every merge, the largest value of `criterion` among the
/// merge itself and every merge below it.
fn subtree_maxima(dendrogram: &Dendrogram, criterion: impl Fn(usize) -> f64) -> Vec<f64> {
    let leaves = dendrogram.leaves();
    let mut maxima: Vec<f64> = Vec::with_capacity(dendrogram.merges().len());

    for (i, merge) in dendrogram.merges().iter().enumerate() {
        let mut max = criterion(i);

        for child in [merge.left(), merge.right()] {
            if let Some(below) = child.checked_sub(leaves).map(|index| maxima[index]) {
                max = max.max(below);
            }
        }

        maxima.push(max);
    }

    maxima
}

/// Cuts `dendrogram` into flat clusters.
///
/// The `criterion` is turned into a value for every merge that never
/// decreases towards the root. Walking down from the root, the first merge
/// whose value is at most `threshold` keeps its whole subtree as one cluster;
/// observations never covered by such a merge become singleton clusters.
///
/// # Examples
///
/// ```
/// use clustertad::cluster::Criterion;
/// use clustertad::cluster::Dendrogram;
/// use clustertad::cluster::Merge;
/// use clustertad::cluster::flat::cut;
///
/// let dendrogram = Dendrogram::try_from_recorded(
///     3,
///     vec![Merge::new(0, 1, 1.0, 2), Merge::new(0, 2, 3.0, 3)],
/// )?;
///
/// assert_eq!(cut(&dendrogram, 2.0, Criterion::Distance).as_slice(), &[1, 1, 2]);
/// assert_eq!(cut(&dendrogram, 0.5, Criterion::Distance).as_slice(), &[1, 2, 3]);
/// assert_eq!(cut(&dendrogram, 3.0, Criterion::Distance).as_slice(), &[1, 1, 1]);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn cut(dendrogram: &Dendrogram, threshold: f64, criterion: Criterion) -> Assignment {
    let leaves = dendrogram.leaves();
    let mut ids = vec![0; leaves];

    let Some(root) = dendrogram.root() else {
        if leaves == 1 {
            ids[0] = 1;
        }

        return Assignment(ids);
    };

    let maxima = match criterion {
        Criterion::Inconsistent { depth } => {
            let statistics = inconsistency(dendrogram, depth);
            subtree_maxima(dendrogram, |i| statistics[i].coefficient())
        }
        Criterion::Distance => {
            subtree_maxima(dendrogram, |i| dendrogram.merges()[i].height())
        }
    };

    // Each frame is a merge id and whether its children were already pushed.
    let mut stack = vec![(root - leaves, false)];
    // The merge whose subtree is currently being collected into one cluster.
    let mut leader: Option<usize> = None;
    let mut clusters = 0;

    while let Some((index, expanded)) = stack.pop() {
        let merge = dendrogram.merges()[index];

        if !expanded {
            if leader.is_none() && maxima[index] <= threshold {
                leader = Some(index);
                clusters += 1;
            }

            stack.push((index, true));
            for child in [merge.right(), merge.left()] {
                if child >= leaves {
                    stack.push((child - leaves, false));
                }
            }

            continue;
        }

        for child in [merge.left(), merge.right()] {
            if child < leaves {
                if leader.is_none() {
                    clusters += 1;
                }

                ids[child] = clusters;
            }
        }

        if leader == Some(index) {
            leader = None;
        }
    }

    Assignment(ids)
}
