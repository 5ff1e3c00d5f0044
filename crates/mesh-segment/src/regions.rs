//! Region statistics over final labels.
//!
//! A label array maps every vertex to its region representative. This module
//! groups vertices by label and summarizes region sizes, mainly for logging
//! and for consumers that color or export regions.

use std::cmp::Reverse;

use hashbrown::HashMap;

/// Size statistics for one labeling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSummary {
    /// Number of distinct regions.
    pub region_count: usize,
    /// Regions with exactly one vertex.
    pub singleton_count: usize,
    /// Vertices that belong to a region of two or more.
    pub merged_vertex_count: usize,
    /// Size of the largest region (0 for an empty labeling).
    pub largest_region_size: usize,
    /// Region sizes, largest first.
    pub sizes: Vec<usize>,
}

impl RegionSummary {
    /// Whether every vertex ended in one region.
    pub fn is_single_region(&self) -> bool {
        self.region_count == 1
    }
}

impl std::fmt::Display for RegionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Region Summary:")?;
        writeln!(f, "  Regions: {}", self.region_count)?;
        if self.region_count > 0 {
            writeln!(f, "  Largest region: {} vertices", self.largest_region_size)?;
            writeln!(f, "  Singletons: {}", self.singleton_count)?;
            writeln!(f, "  Merged vertices: {}", self.merged_vertex_count)?;
        }
        Ok(())
    }
}

/// Summarize the regions of a label array.
pub fn summarize_labels(labels: &[u32]) -> RegionSummary {
    let mut counts: HashMap<u32, usize> = HashMap::new();
    for &label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut sizes: Vec<usize> = counts.into_values().collect();
    sizes.sort_unstable_by_key(|&s| Reverse(s));

    RegionSummary {
        region_count: sizes.len(),
        singleton_count: sizes.iter().filter(|&&s| s == 1).count(),
        merged_vertex_count: sizes.iter().filter(|&&s| s > 1).sum(),
        largest_region_size: sizes.first().copied().unwrap_or(0),
        sizes,
    }
}

/// Vertex indices of every region, largest region first.
///
/// Regions of equal size are ordered by their smallest vertex index, and
/// vertices inside a region are ascending.
pub fn group_by_label(labels: &[u32]) -> Vec<Vec<u32>> {
    let mut groups: HashMap<u32, Vec<u32>> = HashMap::new();
    for (vertex, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(vertex as u32);
    }

    let mut regions: Vec<Vec<u32>> = groups.into_values().collect();
    regions.sort_unstable_by_key(|r| (Reverse(r.len()), r[0]));
    regions
}
