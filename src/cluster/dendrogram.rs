//! Binary merge trees produced by agglomerative clustering.

use crate::cluster::Error;

/// A single merge within a [`Dendrogram`].
///
/// Node ids below the number of leaves refer to the original observations;
/// the node id `leaves + i` refers to the cluster created by merge `i`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Merge {
    /// The smaller of the two merged node ids.
    left: usize,

    /// The larger of the two merged node ids.
    right: usize,

    /// The distance at which the two nodes were merged.
    height: f64,

    /// The number of observations in the merged cluster.
    size: usize,
}

impl Merge {
    /// Creates a new merge.
    ///
    /// The node ids are stored in ascending order regardless of the order in
    /// which they were provided.
    pub fn new(a: usize, b: usize, height: f64, size: usize) -> Self {
        let (left, right) = if a < b { (a, b) } else { (b, a) };

        Self {
            left,
            right,
            height,
            size,
        }
    }

    /// Gets the smaller of the two merged node ids.
    pub fn left(&self) -> usize {
        self.left
    }

    /// Gets the larger of the two merged node ids.
    pub fn right(&self) -> usize {
        self.right
    }

    /// Gets the distance at which the two nodes were merged.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Gets the number of observations in the merged cluster.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// A disjoint-set forest used to relabel merges once they are sorted.
struct UnionFind {
    /// The parent of each node.
    parent: Vec<usize>,

    /// The number of observations under each node.
    size: Vec<usize>,

    /// The id given to the next merged cluster.
    next: usize,
}

impl UnionFind {
    /// Creates a forest over `leaves` singleton observations.
    fn new(leaves: usize) -> Self {
        let nodes = (2 * leaves).saturating_sub(1);

        Self {
            parent: (0..nodes).collect(),
            size: vec![1; nodes],
            next: leaves,
        }
    }

    /// Finds the current root of `node`, compressing the path along the way.
    fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merges two roots under a new node and returns the new cluster's size.
    fn merge(&mut self, a: usize, b: usize) -> usize {
        let size = self.size[a] + self.size[b];

        self.parent[a] = self.next;
        self.parent[b] = self.next;
        self.size[self.next] = size;
        self.next += 1;

        size
    }
}

/// A binary merge tree over a set of observations.
#[derive(Clone, Debug, PartialEq)]
pub struct Dendrogram {
    /// The number of original observations.
    leaves: usize,

    /// The merges in order of non-decreasing height.
    merges: Vec<Merge>,
}

impl Dendrogram {
    /// Attempts to create a dendrogram from merges recorded in the order they
    /// were performed.
    ///
    /// Each recorded merge names the two clusters it joined by the id of any
    /// observation they contain. The merges are stably sorted by height and
    /// relabeled so that merge `i` creates node `leaves + i` and its children
    /// refer to the nodes that exist at that point.
    ///
    /// The merges must join all `leaves` observations into a single tree:
    /// there must be exactly `leaves - 1` of them, every id must name an
    /// existing observation, and no merge may join two observations that are
    /// already in the same cluster.
    ///
    /// # Examples
    ///
    /// ```
    /// use clustertad::cluster::Dendrogram;
    /// use clustertad::cluster::Merge;
    ///
    /// let dendrogram = Dendrogram::try_from_recorded(
    ///     3,
    ///     vec![Merge::new(0, 2, 5.0, 3), Merge::new(0, 1, 1.0, 2)],
    /// )?;
    ///
    /// let merges = dendrogram.merges();
    /// assert_eq!((merges[0].left(), merges[0].right()), (0, 1));
    /// assert_eq!((merges[1].left(), merges[1].right()), (2, 3));
    /// assert_eq!(merges[1].size(), 3);
    ///
    /// assert!(Dendrogram::try_from_recorded(3, vec![Merge::new(0, 1, 1.0, 2)]).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_recorded(leaves: usize, recorded: Vec<Merge>) -> Result<Self, Error> {
        let expected = leaves.saturating_sub(1);
        if recorded.len() != expected {
            return Err(Error::MergeCount(expected, recorded.len()));
        }

        if let Some(observation) = recorded
            .iter()
            .map(|merge| merge.right)
            .find(|&observation| observation >= leaves)
        {
            return Err(Error::UnknownObservation(observation, leaves));
        }

        let mut recorded = recorded.into_iter().enumerate().collect::<Vec<_>>();
        recorded.sort_by(|(_, a), (_, b)| a.height.total_cmp(&b.height));

        let mut forest = UnionFind::new(leaves);
        let mut merges = Vec::with_capacity(expected);

        for (index, merge) in recorded {
            let a = forest.find(merge.left);
            let b = forest.find(merge.right);

            if a == b {
                return Err(Error::RedundantMerge(index));
            }

            let size = forest.merge(a, b);
            merges.push(Merge::new(a, b, merge.height, size));
        }

        Ok(Self { leaves, merges })
    }

    /// Gets the number of original observations.
    pub fn leaves(&self) -> usize {
        self.leaves
    }

    /// Gets the merges in order of non-decreasing height.
    pub fn merges(&self) -> &[Merge] {
        &self.merges
    }

    /// Gets the node id of the root, if the dendrogram has any merges.
    pub fn root(&self) -> Option<usize> {
        match self.merges.is_empty() {
            true => None,
            false => Some(self.leaves + self.merges.len() - 1),
        }
    }

    /// Gets the merge that created `node`, if `node` is not an original
    /// observation.
    pub fn merge(&self, node: usize) -> Option<&Merge> {
        node.checked_sub(self.leaves)
            .and_then(|index| self.merges.get(index))
    }
}
