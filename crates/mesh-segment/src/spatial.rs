//! Fixed-radius neighbor queries over the vertex set.
//!
//! The index is built once from all vertex positions and is read-only
//! afterwards, so it can be shared across threads and across radius steps.
//!
//! Coincident vertices are stored as one site in the k-d tree and expanded
//! back to vertex indices on every query, so heavily duplicated or planar
//! inputs keep the tree small.

use hashbrown::HashMap;
use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;
use rayon::prelude::*;
use tracing::debug;

/// Relative slack added to the squared radius handed to the tree. Results are
/// filtered again with an exact `<=` so boundary points are always included.
const RADIUS_SLACK: f64 = 1e-9;

/// Spatial index over vertex positions.
pub struct SpatialIndex {
    tree: Option<ImmutableKdTree<f64, 3>>,
    /// Distinct positions, in order of first appearance.
    sites: Vec<[f64; 3]>,
    /// Vertex indices at each site, ascending.
    members: Vec<Vec<u32>>,
    /// Site of each vertex.
    site_of: Vec<u32>,
    /// Bounding box diagonal of all sites; no two sites are farther apart.
    diameter: f64,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("points", &self.site_of.len())
            .field("sites", &self.sites.len())
            .finish()
    }
}

impl SpatialIndex {
    /// Build the index from vertex positions.
    pub fn build(vertices: &[Point3<f64>]) -> Self {
        let mut sites: Vec<[f64; 3]> = Vec::new();
        let mut members: Vec<Vec<u32>> = Vec::new();
        let mut site_of = Vec::with_capacity(vertices.len());
        let mut lookup: HashMap<[u64; 3], u32> = HashMap::with_capacity(vertices.len());

        for (i, p) in vertices.iter().enumerate() {
            let position = [p.x, p.y, p.z];
            let site = *lookup.entry(position_key(&position)).or_insert_with(|| {
                sites.push(position);
                members.push(Vec::new());
                (sites.len() - 1) as u32
            });
            members[site as usize].push(i as u32);
            site_of.push(site);
        }

        let diameter = bounding_diagonal(&sites);
        let tree = if sites.is_empty() {
            None
        } else {
            Some(ImmutableKdTree::new_from_slice(&sites))
        };
        debug!(
            "Built spatial index over {} points at {} distinct positions",
            site_of.len(),
            sites.len()
        );

        Self {
            tree,
            sites,
            members,
            site_of,
            diameter,
        }
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.site_of.len()
    }

    /// Whether the index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.site_of.is_empty()
    }

    /// Indices of all points within Euclidean distance `radius` of `query`,
    /// boundary included. A point at `query` itself is part of the result.
    /// Order is unspecified.
    pub fn within_radius(&self, query: &Point3<f64>, radius: f64) -> Vec<u32> {
        self.within_radius_sq(query, radius)
            .into_iter()
            .map(|(i, _)| i)
            .collect()
    }

    /// Like [`within_radius`](Self::within_radius), also returning the
    /// squared distance of each hit.
    pub fn within_radius_sq(&self, query: &Point3<f64>, radius: f64) -> Vec<(u32, f64)> {
        let q = [query.x, query.y, query.z];
        self.sites_within(&q, radius)
            .into_iter()
            .flat_map(|(site, d)| self.members[site as usize].iter().map(move |&i| (i, d)))
            .collect()
    }

    /// Nearest point to `points[index]` at a strictly positive distance.
    ///
    /// Coincident points are skipped; among equally distant candidates the
    /// lowest index wins. Returns `(neighbor, distance)`.
    pub fn nearest_other(&self, index: u32) -> Option<(u32, f64)> {
        let own = *self.site_of.get(index as usize)?;
        self.nearest_site(own)
            .map(|(site, d)| (self.members[site as usize][0], d.sqrt()))
    }

    /// Minimum and maximum distance between points at distinct positions.
    ///
    /// Useful for choosing a radius range: nothing merges below `min`, and
    /// every compatible pair is within reach at `max`. Returns `None` when
    /// fewer than two distinct positions exist.
    pub fn distance_extent(&self) -> Option<DistanceExtent> {
        if self.sites.len() < 2 {
            return None;
        }

        let min_sq = (0..self.sites.len() as u32)
            .into_par_iter()
            .filter_map(|s| self.nearest_site(s).map(|(_, d)| d))
            .min_by(|a, b| a.total_cmp(b))?;

        let max_sq = self
            .sites
            .par_iter()
            .enumerate()
            .map(|(i, a)| {
                self.sites[i + 1..]
                    .iter()
                    .map(|b| squared_distance(a, b))
                    .fold(0.0f64, f64::max)
            })
            .reduce(|| 0.0, f64::max);

        Some(DistanceExtent {
            min: min_sq.sqrt(),
            max: max_sq.sqrt(),
        })
    }

    /// Sites within `radius` of `q` with their squared distances.
    fn sites_within(&self, q: &[f64; 3], radius: f64) -> Vec<(u32, f64)> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };
        if radius.is_nan() || radius < 0.0 {
            return Vec::new();
        }

        let radius_sq = radius * radius;
        // Never query with zero so coincident points survive a strict comparison
        let query_sq = radius_sq * (1.0 + RADIUS_SLACK) + f64::MIN_POSITIVE;
        tree.within_unsorted::<SquaredEuclidean>(q, query_sq)
            .into_iter()
            .filter_map(|n| {
                let site = n.item as usize;
                let d = squared_distance(&self.sites[site], q);
                (d <= radius_sq).then_some((site as u32, d))
            })
            .collect()
    }

    /// Closest other site to `own` with its squared distance.
    ///
    /// Searches a growing radius, starting at the mean site spacing, until a
    /// hit appears or the radius covers the whole bounding box.
    fn nearest_site(&self, own: u32) -> Option<(u32, f64)> {
        if self.sites.len() < 2 || !self.diameter.is_finite() {
            return None;
        }

        let q = &self.sites[own as usize];
        let limit = self.diameter * (1.0 + RADIUS_SLACK);
        let mut radius = self.diameter / (self.sites.len() as f64).cbrt();
        loop {
            let found = self
                .sites_within(q, radius)
                .into_iter()
                .filter(|&(site, _)| site != own)
                .min_by(|a, b| {
                    a.1.total_cmp(&b.1)
                        .then(self.members[a.0 as usize][0].cmp(&self.members[b.0 as usize][0]))
                });
            if found.is_some() {
                return found;
            }
            if radius >= limit {
                return None;
            }
            radius = (radius * 2.0).min(limit);
        }
    }
}

/// Closest and farthest separation between distinct vertex positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceExtent {
    /// Smallest non-zero pairwise distance.
    pub min: f64,
    /// Largest pairwise distance.
    pub max: f64,
}

impl std::fmt::Display for DistanceExtent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "min distance {:.6}, max distance {:.6}", self.min, self.max)
    }
}

/// Hash key for a position; `-0.0` and `0.0` map to the same key.
#[inline]
fn position_key(p: &[f64; 3]) -> [u64; 3] {
    p.map(|c| (c + 0.0).to_bits())
}

fn bounding_diagonal(points: &[[f64; 3]]) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    let (min, max) = points.iter().fold((*first, *first), |(mut lo, mut hi), p| {
        for k in 0..3 {
            lo[k] = lo[k].min(p[k]);
            hi[k] = hi[k].max(p[k]);
        }
        (lo, hi)
    });
    squared_distance(&min, &max).sqrt()
}

#[inline]
fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_points() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.5, 0.0, 0.0),
            Point3::new(100.0, 0.0, 0.0),
        ]
    }

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_within_radius_includes_self() {
        let index = SpatialIndex::build(&line_points());
        assert_eq!(
            sorted(index.within_radius(&Point3::new(0.0, 0.0, 0.0), 0.5)),
            vec![0]
        );
    }

    #[test]
    fn test_within_radius_boundary_inclusive() {
        let index = SpatialIndex::build(&line_points());
        assert_eq!(
            sorted(index.within_radius(&Point3::new(0.0, 0.0, 0.0), 1.0)),
            vec![0, 1]
        );
        assert_eq!(
            sorted(index.within_radius(&Point3::new(1.0, 0.0, 0.0), 1.5)),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_within_radius_external_query() {
        let index = SpatialIndex::build(&line_points());
        assert_eq!(
            sorted(index.within_radius(&Point3::new(50.0, 0.0, 0.0), 10.0)),
            Vec::<u32>::new()
        );
        // x = 0 and x = 100 sit exactly on the boundary
        assert_eq!(
            sorted(index.within_radius(&Point3::new(50.0, 0.0, 0.0), 50.0)),
            vec![0, 1, 2, 3]
        );
        assert_eq!(
            sorted(index.within_radius(&Point3::new(50.0, 0.0, 0.0), 49.0)),
            vec![1, 2]
        );

        let mut points = line_points();
        points.push(Point3::new(45.0, 0.0, 0.0));
        let index = SpatialIndex::build(&points);
        assert_eq!(
            sorted(index.within_radius(&Point3::new(50.0, 0.0, 0.0), 10.0)),
            vec![4]
        );
    }

    fn planar_grid(side: usize, spacing: f64) -> Vec<Point3<f64>> {
        (0..side)
            .flat_map(|i| {
                (0..side).map(move |j| Point3::new(i as f64 * spacing, j as f64 * spacing, 0.0))
            })
            .collect()
    }

    #[test]
    fn test_planar_grid_queries() {
        let points = planar_grid(60, 1.0);
        let index = SpatialIndex::build(&points);
        assert_eq!(index.len(), 3600);

        // Interior vertex (10, 10) at index 10 * 60 + 10
        let center = 610u32;
        let hits = sorted(index.within_radius(&points[center as usize], 1.0));
        assert_eq!(hits, vec![550, 609, 610, 611, 670]);
        assert_eq!(index.within_radius(&points[center as usize], 1.5).len(), 9);

        let (_, dist) = index.nearest_other(center).unwrap();
        assert_relative_eq!(dist, 1.0);
        let extent = index.distance_extent().unwrap();
        assert_relative_eq!(extent.min, 1.0);
        assert_relative_eq!(extent.max, 59.0 * 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn test_many_coincident_points() {
        let mut points = vec![Point3::new(2.0, 2.0, 2.0); 300];
        points.push(Point3::new(2.0, 2.0, 5.0));
        let index = SpatialIndex::build(&points);
        assert_eq!(index.len(), 301);

        let hits = index.within_radius(&Point3::new(2.0, 2.0, 2.0), 0.0);
        assert_eq!(hits.len(), 300);
        assert_eq!(index.within_radius(&Point3::new(2.0, 2.0, 2.0), 3.0).len(), 301);

        let (nearest, dist) = index.nearest_other(17).unwrap();
        assert_eq!(nearest, 300);
        assert_relative_eq!(dist, 3.0);
        let (nearest, _) = index.nearest_other(300).unwrap();
        assert_eq!(nearest, 0);
    }

    #[test]
    fn test_signed_zero_is_one_position() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(-0.0, 0.0, -0.0)];
        let index = SpatialIndex::build(&points);
        assert!(index.distance_extent().is_none());
        assert_eq!(sorted(index.within_radius(&Point3::origin(), 0.0)), vec![0, 1]);
    }

    #[test]
    fn test_within_radius_reports_squared_distance() {
        let index = SpatialIndex::build(&line_points());
        let mut hits = index.within_radius_sq(&Point3::new(0.0, 0.0, 0.0), 3.0);
        hits.sort_by_key(|h| h.0);
        assert_eq!(hits.len(), 3);
        assert_relative_eq!(hits[2].1, 6.25);
    }

    #[test]
    fn test_zero_radius_finds_coincident() {
        let points = vec![Point3::new(1.0, 1.0, 1.0), Point3::new(1.0, 1.0, 1.0)];
        let index = SpatialIndex::build(&points);
        assert_eq!(
            sorted(index.within_radius(&Point3::new(1.0, 1.0, 1.0), 0.0)),
            vec![0, 1]
        );
        assert!(index.within_radius(&Point3::new(1.0, 1.0, 1.0), -1.0).is_empty());
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.within_radius(&Point3::origin(), 10.0).is_empty());
        assert!(index.distance_extent().is_none());
    }

    #[test]
    fn test_nearest_other_skips_coincident() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 3.0, 0.0),
        ];
        let index = SpatialIndex::build(&points);
        let (nearest, dist) = index.nearest_other(0).unwrap();
        assert_eq!(nearest, 3);
        assert_relative_eq!(dist, 3.0);
    }

    #[test]
    fn test_nearest_other_all_coincident() {
        let points = vec![Point3::new(1.0, 1.0, 1.0); 3];
        let index = SpatialIndex::build(&points);
        assert!(index.nearest_other(0).is_none());
        assert!(index.distance_extent().is_none());
    }

    #[test]
    fn test_distance_extent() {
        let index = SpatialIndex::build(&line_points());
        let extent = index.distance_extent().unwrap();
        assert_relative_eq!(extent.min, 1.0);
        assert_relative_eq!(extent.max, 100.0);
        assert!(extent.to_string().contains("max distance 100.000000"));
    }
}
