//! Inconsistency statistics for the merges of a [`Dendrogram`].
//!
//! The inconsistency coefficient of a merge compares its height against the
//! heights of the merges in its neighborhood: the merge itself and every merge
//! at most `depth - 1` levels below it. Merges whose neighborhood has no
//! spread in height, including every merge of two original observations, have
//! a coefficient of zero.

use crate::cluster::Dendrogram;

/// The inconsistency statistics of a single merge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Statistics {
    /// The mean height of the merges in the neighborhood.
    mean: f64,

    /// The standard deviation of the heights in the neighborhood.
    std: f64,

    /// The number of merges in the neighborhood.
    count: usize,

    /// The inconsistency coefficient.
    coefficient: f64,
}

impl Statistics {
    /// Gets the mean height of the merges in the neighborhood.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Gets the standard deviation of the heights in the neighborhood.
    pub fn std(&self) -> f64 {
        self.std
    }

    /// Gets the number of merges in the neighborhood.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Gets the inconsistency coefficient.
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }
}

/// Accumulates heights in post-order (left subtree, right subtree, node),
/// descending at most `depth - 1` levels below `node`.
fn accumulate(dendrogram: &Dendrogram, node: usize, depth: usize, heights: &mut Vec<f64>) {
    // Each frame is a node id, its level below `node`, and whether its
    // children were already pushed.
    let mut stack = vec![(node, 0usize, false)];

    while let Some((node, level, expanded)) = stack.pop() {
        let Some(merge) = dendrogram.merge(node) else {
            continue;
        };

        if !expanded && level + 1 < depth {
            stack.push((node, level, true));
            stack.push((merge.right(), level + 1, false));
            stack.push((merge.left(), level + 1, false));
            continue;
        }

        heights.push(merge.height());
    }
}

/// Computes the inconsistency [`Statistics`] of every merge in `dendrogram`,
/// in merge order.
///
/// The standard deviation uses `count - 1` degrees of freedom. A `depth` of
/// zero is treated as a depth of one (the merge alone).
///
/// # Examples
///
/// ```
/// use clustertad::cluster::Dendrogram;
/// use clustertad::cluster::Merge;
/// use clustertad::cluster::inconsistency::inconsistency;
///
/// let dendrogram = Dendrogram::try_from_recorded(
///     4,
///     vec![
///         Merge::new(0, 1, 1.0, 2),
///         Merge::new(2, 3, 1.0, 2),
///         Merge::new(1, 3, 4.0, 4),
///     ],
/// )?;
///
/// let statistics = inconsistency(&dendrogram, 2);
///
/// assert_eq!(statistics[0].coefficient(), 0.0);
/// assert_eq!(statistics[2].count(), 3);
/// assert_eq!(statistics[2].mean(), 2.0);
/// assert!((statistics[2].coefficient() - 1.1547005383792515).abs() < 1e-12);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn inconsistency(dendrogram: &Dendrogram, depth: usize) -> Vec<Statistics> {
    let leaves = dendrogram.leaves();
    let mut heights = Vec::new();

    dendrogram
        .merges()
        .iter()
        .enumerate()
        .map(|(i, merge)| {
            heights.clear();
            accumulate(dendrogram, leaves + i, depth, &mut heights);

            let count = heights.len();
            let n = count as f64;
            let sum = heights.iter().sum::<f64>();
            let sum_of_squares = heights.iter().map(|h| h * h).sum::<f64>();

            let mean = sum / n;
            let variance = match count {
                0 | 1 => (sum_of_squares - sum * sum) / n,
                _ => (sum_of_squares - sum * sum / n) / (n - 1.0),
            };

            match variance > 0.0 {
                true => {
                    let std = variance.sqrt();
                    Statistics {
                        mean,
                        std,
                        count,
                        coefficient: (merge.height() - mean) / std,
                    }
                }
                false => Statistics {
                    mean,
                    std: 0.0,
                    count,
                    coefficient: 0.0,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::Merge;

    #[test]
    fn test_merge_of_leaves_is_consistent() {
        let dendrogram =
            Dendrogram::try_from_recorded(2, vec![Merge::new(0, 1, 5.0, 2)]).unwrap();
        let statistics = inconsistency(&dendrogram, 2);

        assert_eq!(statistics.len(), 1);
        assert_eq!(statistics[0].mean(), 5.0);
        assert_eq!(statistics[0].std(), 0.0);
        assert_eq!(statistics[0].count(), 1);
        assert_eq!(statistics[0].coefficient(), 0.0);
    }

    #[test]
    fn test_equal_heights_are_consistent() {
        let dendrogram = Dendrogram::try_from_recorded(
            5,
            vec![
                Merge::new(0, 1, 1.0, 2),
                Merge::new(1, 2, 1.0, 3),
                Merge::new(2, 3, 1.0, 4),
                Merge::new(3, 4, 1.0, 5),
            ],
        )
        .unwrap();

        for statistics in inconsistency(&dendrogram, 2) {
            assert_eq!(statistics.coefficient(), 0.0);
        }
    }

    #[test]
    fn test_unbalanced_chain() {
        // ((0, 1) at 2.0, 2) at 3.0, then (3, 4) at 3.0, then all at 13.5.
        let dendrogram = Dendrogram::try_from_recorded(
            5,
            vec![
                Merge::new(0, 1, 2.0, 2),
                Merge::new(2, 3, 3.0, 2),
                Merge::new(2, 4, 3.0, 3),
                Merge::new(0, 4, 13.5, 5),
            ],
        )
        .unwrap();

        let statistics = inconsistency(&dendrogram, 2);
        assert_eq!(statistics[2].count(), 2);
        assert_eq!(statistics[2].mean(), 3.0);
        assert_eq!(statistics[2].coefficient(), 0.0);

        assert_eq!(statistics[3].count(), 3);
        assert_eq!(statistics[3].mean(), 6.166666666666667);
        assert!(statistics[3].coefficient() > 0.0);
    }

    #[test]
    fn test_depth_controls_neighborhood() {
        let dendrogram = Dendrogram::try_from_recorded(
            4,
            vec![
                Merge::new(0, 1, 1.0, 2),
                Merge::new(0, 2, 2.0, 3),
                Merge::new(0, 3, 6.0, 4),
            ],
        )
        .unwrap();

        let counts = |depth| {
            inconsistency(&dendrogram, depth)
                .iter()
                .map(|s| s.count())
                .collect::<Vec<_>>()
        };

        assert_eq!(counts(0), vec![1, 1, 1]);
        assert_eq!(counts(1), vec![1, 1, 1]);
        assert_eq!(counts(2), vec![1, 2, 2]);
        assert_eq!(counts(3), vec![1, 2, 3]);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() -> Result<(), Box<dyn std::error::Error>> {
        let n = 20_000;
        let recorded = (1..n)
            .map(|i| Merge::new(0, i, i as f64, i + 1))
            .collect::<Vec<_>>();
        let dendrogram = Dendrogram::try_from_recorded(n, recorded)?;

        let statistics = inconsistency(&dendrogram, usize::MAX);
        let root = statistics[n - 2];

        assert_eq!(root.count(), n - 1);
        assert_eq!(root.mean(), 10_000.0);
        assert!(root.coefficient() > 0.0);
        Ok(())
    }
}
