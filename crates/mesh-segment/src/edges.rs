//! Undirected edge set derived from triangle faces.
//!
//! Region growth does not read edges; merges are decided by distance and
//! normal compatibility alone. The set is kept as a diagnostic of the input
//! connectivity.

use hashbrown::HashSet;

/// Deduplicated undirected edges, stored as `(min, max)` vertex pairs.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: HashSet<(u32, u32)>,
}

impl EdgeSet {
    /// Collect the three edges of every face.
    pub fn from_faces(faces: &[[u32; 3]]) -> Self {
        let mut edges = HashSet::with_capacity(faces.len() * 3 / 2);
        for &[a, b, c] in faces {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                if u != v {
                    edges.insert(normalize_edge(u, v));
                }
            }
        }
        Self { edges }
    }

    /// Number of distinct edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether there are no edges.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether `a` and `b` share a face edge, in either order.
    #[inline]
    pub fn contains(&self, a: u32, b: u32) -> bool {
        self.edges.contains(&normalize_edge(a, b))
    }
}

#[inline]
fn normalize_edge(a: u32, b: u32) -> (u32, u32) {
    if a < b { (a, b) } else { (b, a) }
}
