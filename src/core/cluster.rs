//! Size-capped clustering, rebuilt from positions every tick.
//!
//! Each particle walks its in-range neighbours nearest first and joins their
//! cluster only while the merged size stays within `MAX_CLUSTER_SIZE`. Nothing
//! survives between ticks, so removals never leave stale roots behind.

use std::collections::{BTreeMap, HashSet};

use crate::{config, spatial::SpatialHash, types::Vec2};

/// Result of a capped union attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Union {
    Joined,
    AlreadyJoined,
    OverCap,
}

/// Union-find with union by size and iterative path compression.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Size of the set containing `x`.
    pub fn size_of(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }

    pub fn union_capped(&mut self, a: usize, b: usize, cap: usize) -> Union {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return Union::AlreadyJoined;
        }
        let merged = self.size[ra] + self.size[rb];
        if merged > cap {
            return Union::OverCap;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[small] = big;
        self.size[big] = merged;
        Union::Joined
    }
}

/// Unordered particle pair, stored with `a < b`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond {
    pub a: usize,
    pub b: usize,
}

impl Bond {
    pub fn new(i: usize, j: usize) -> Self {
        if i <= j {
            Self { a: i, b: j }
        } else {
            Self { a: j, b: i }
        }
    }
}

/// One tick's cluster assignment.
#[derive(Clone, Debug)]
pub struct Clusters {
    sets: DisjointSet,
    neighbors: Vec<Vec<usize>>,
    bonds: Vec<Bond>,
}

impl Clusters {
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn size_of(&mut self, i: usize) -> usize {
        self.sets.size_of(i)
    }

    pub fn same_cluster(&mut self, i: usize, j: usize) -> bool {
        self.sets.find(i) == self.sets.find(j)
    }

    /// Joins the clusters of `i` and `j` when the result fits the cap.
    pub fn merge(&mut self, i: usize, j: usize) -> Union {
        self.sets.union_capped(i, j, config::MAX_CLUSTER_SIZE)
    }

    /// Valid bonded neighbours recorded for `i`, nearest first.
    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    /// Each bonded pair once, sorted.
    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    /// Root for every particle.
    pub fn cluster_of(&mut self) -> Vec<usize> {
        (0..self.len()).map(|i| self.sets.find(i)).collect()
    }

    /// Member count per root.
    pub fn cluster_sizes(&mut self) -> BTreeMap<usize, usize> {
        let mut sizes = BTreeMap::new();
        for root in self.cluster_of() {
            *sizes.entry(root).or_insert(0) += 1;
        }
        sizes
    }

    #[cfg(test)]
    pub fn from_groups(n: usize, groups: &[&[usize]]) -> Self {
        let mut sets = DisjointSet::new(n);
        for group in groups {
            for pair in group.windows(2) {
                sets.union_capped(pair[0], pair[1], usize::MAX);
            }
        }
        Self {
            sets,
            neighbors: vec![Vec::new(); n],
            bonds: Vec::new(),
        }
    }
}

pub fn compute_clusters(positions: &[Vec2], spatial: &SpatialHash) -> Clusters {
    let n = positions.len();
    let mut sets = DisjointSet::new(n);
    let mut neighbors = vec![Vec::new(); n];
    let mut seen: HashSet<Bond> = HashSet::new();
    let mut candidates = Vec::new();

    for i in 0..n {
        spatial.within(positions, i, config::CONNECTION_RADIUS, &mut candidates);
        for &(j, _) in &candidates {
            if neighbors[i].len() >= config::MAX_NEIGHBORS {
                break;
            }
            match sets.union_capped(i, j, config::MAX_CLUSTER_SIZE) {
                Union::Joined | Union::AlreadyJoined => {
                    neighbors[i].push(j);
                    seen.insert(Bond::new(i, j));
                }
                Union::OverCap => {}
            }
        }
    }

    let mut bonds: Vec<Bond> = seen.into_iter().collect();
    bonds.sort_unstable();
    Clusters {
        sets,
        neighbors,
        bonds,
    }
}
