//! Weighted disjoint-set union with path compression.
//!
//! The structure partitions a fixed universe of `n` items and only ever
//! coarsens: there is no split or removal. Region growth keeps one instance
//! per sweep and reads each vertex's final label from [`DisjointSet::find`].
//!
//! Indices outside `0..n` are programming errors and panic.

/// A forest of parent links where each tree is one region.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<u32>,
    weight: Vec<u32>,
    components: usize,
}

impl DisjointSet {
    /// Create `n` singleton components.
    pub fn new(n: usize) -> Self {
        assert!(
            n <= u32::MAX as usize,
            "disjoint set supports at most {} items, got {}",
            u32::MAX,
            n
        );
        Self {
            parent: (0..n as u32).collect(),
            weight: vec![1; n],
            components: n,
        }
    }

    /// Number of items in the universe.
    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Whether the universe is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Number of distinct components.
    #[inline]
    pub fn component_count(&self) -> usize {
        self.components
    }

    /// Canonical representative of the component containing `item`.
    ///
    /// Every node on the search path is re-pointed directly at the root.
    #[track_caller]
    pub fn find(&mut self, item: u32) -> u32 {
        self.check(item);

        let mut root = item;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        let mut node = item;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }

        root
    }

    /// Whether `a` and `b` are in the same component.
    #[track_caller]
    pub fn connected(&mut self, a: u32, b: u32) -> bool {
        self.find(a) == self.find(b)
    }

    /// Merge the components containing `a` and `b`.
    ///
    /// The lighter tree is attached under the root of the heavier one. On a
    /// tie the root of `a` goes under the root of `b`. Returns `false` when
    /// both were already in the same component.
    #[track_caller]
    pub fn union(&mut self, a: u32, b: u32) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        let (child, parent) = if self.weight[root_a as usize] > self.weight[root_b as usize] {
            (root_b, root_a)
        } else {
            (root_a, root_b)
        };

        self.parent[child as usize] = parent;
        self.weight[parent as usize] += self.weight[child as usize];
        self.components -= 1;
        true
    }

    /// Size of the component containing `item`.
    #[track_caller]
    pub fn component_size(&mut self, item: u32) -> usize {
        let root = self.find(item);
        self.weight[root as usize] as usize
    }

    /// Whether `item` is currently the representative of its component.
    #[track_caller]
    pub fn is_root(&self, item: u32) -> bool {
        self.check(item);
        self.parent[item as usize] == item
    }

    /// Representative of every item, in index order.
    pub fn labels(&mut self) -> Vec<u32> {
        (0..self.len() as u32).map(|i| self.find(i)).collect()
    }

    #[inline]
    #[track_caller]
    fn check(&self, item: u32) {
        assert!(
            (item as usize) < self.parent.len(),
            "disjoint set index {} out of range for {} items",
            item,
            self.parent.len()
        );
    }
}
