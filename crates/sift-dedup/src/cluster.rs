//! Duplicate cluster construction.
//!
//! Confirmed edges are merged with a disjoint-set structure (path
//! compression plus union-by-rank). Clusters are the connected components
//! with at least two members, so membership is transitive even for pairs
//! that were never compared directly.

use crate::corpus::DocId;
use crate::jaccard::Edge;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Disjoint sets over the documents of one corpus.
#[derive(Debug, Clone)]
pub struct UnionFind {
    /// `parent[i] == i` marks a root.
    parent: Vec<usize>,
    /// Upper bound on tree height, only meaningful at roots.
    rank: Vec<u8>,
}

impl UnionFind {
    /// `n` singleton sets, one per document.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of the set holding `doc`.
    ///
    /// Every node visited on the way up is re-pointed at the root.
    pub fn find(&mut self, doc: DocId) -> DocId {
        DocId::new(self.root(doc.index()))
    }

    fn root(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut node = x;
        while node != root {
            node = std::mem::replace(&mut self.parent[node], root);
        }

        root
    }

    /// Merge the sets holding `a` and `b`.
    ///
    /// Returns false if they already shared a set.
    pub fn union(&mut self, a: DocId, b: DocId) -> bool {
        let ra = self.root(a.index());
        let rb = self.root(b.index());
        if ra == rb {
            return false;
        }

        match self.rank[ra].cmp(&self.rank[rb]) {
            Ordering::Less => self.parent[ra] = rb,
            Ordering::Greater => self.parent[rb] = ra,
            Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }

    /// Whether `a` and `b` share a set.
    pub fn connected(&mut self, a: DocId, b: DocId) -> bool {
        self.root(a.index()) == self.root(b.index())
    }

    /// Sets with two or more members, each listed in ascending id order.
    ///
    /// Sets are ordered by their smallest member.
    pub fn components(&mut self) -> Vec<Vec<DocId>> {
        let mut by_root: BTreeMap<usize, Vec<DocId>> = BTreeMap::new();
        for i in 0..self.parent.len() {
            let root = self.root(i);
            by_root.entry(root).or_default().push(DocId::new(i));
        }

        // Members are pushed in index order, so each list is already sorted.
        let mut groups: Vec<Vec<DocId>> = by_root
            .into_values()
            .filter(|members| members.len() > 1)
            .collect();
        groups.sort_unstable_by_key(|members| members[0]);
        groups
    }

    /// Number of documents tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether no documents are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }
}

/// A connected component of confirmed duplicates (two or more documents).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DuplicateCluster {
    /// Members in ascending id order.
    pub members: Vec<DocId>,
}

impl DuplicateCluster {
    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for emitted clusters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `id` is a member.
    #[must_use]
    pub fn contains(&self, id: DocId) -> bool {
        self.members.binary_search(&id).is_ok()
    }
}

/// Group documents into duplicate clusters.
///
/// Must run after every edge is known. Documents without a confirmed edge
/// never appear in a cluster. Output is sorted (members ascending, clusters
/// by first member) so it is independent of edge order.
#[must_use]
pub fn build_clusters(edges: &[Edge], num_docs: usize) -> Vec<DuplicateCluster> {
    let mut sets = UnionFind::new(num_docs);
    for edge in edges {
        sets.union(edge.a, edge.b);
    }

    sets.components()
        .into_iter()
        .map(|members| DuplicateCluster { members })
        .collect()
}
