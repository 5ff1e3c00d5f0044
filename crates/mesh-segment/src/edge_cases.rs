//! Edge case tests for segmentation robustness.
//!
//! Degenerate geometry and unusual parameters must either produce a
//! well-defined segmentation or a typed error, never a panic.

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use nalgebra::{Point3, Vector3};

    use crate::compat::{AlwaysCompatible, NormalAngle};
    use crate::error::ErrorCode;
    use crate::growth::{GrowthParams, grow_regions};
    use crate::sweep::{SweepConfig, run_sweep};
    use crate::types::{FaceCorner, SegmentationInput};

    // ==================== Degenerate Geometry ====================

    #[test]
    fn test_single_vertex() {
        let input =
            SegmentationInput::from_points_and_normals(vec![Point3::origin()], vec![Vector3::z()])
                .unwrap();
        let outcome = grow_regions(&input, &GrowthParams::reference(), &AlwaysCompatible).unwrap();
        assert_eq!(outcome.labels, vec![0]);
        assert!(outcome.death_times[0].is_infinite());
    }

    #[test]
    fn test_coincident_vertices_merge_at_zero_radius() {
        let input = SegmentationInput::from_points_and_normals(
            vec![Point3::new(1.0, 2.0, 3.0); 4],
            vec![Vector3::z(); 4],
        )
        .unwrap();
        let params = GrowthParams::with_range(0.0, 1.0, 0.5);
        let outcome = grow_regions(&input, &params, &NormalAngle::new(0.0)).unwrap();

        assert_eq!(outcome.labels, vec![0, 0, 0, 0]);
        assert!(outcome.death_times[0].is_infinite());
        assert!(outcome.death_times[1..].iter().all(|&t| t == 0.0));
        assert_eq!(outcome.component_history[0], 1);
    }

    #[test]
    fn test_flat_grid_with_duplicate_cluster() {
        let mut points: Vec<Point3<f64>> = (0..40)
            .flat_map(|i| (0..40).map(move |j| Point3::new(i as f64, j as f64, 0.0)))
            .collect();
        points.extend(std::iter::repeat_n(Point3::new(100.0, 100.0, 0.0), 300));
        let n = points.len();
        let input =
            SegmentationInput::from_points_and_normals(points, vec![Vector3::z(); n]).unwrap();

        let params = GrowthParams::with_range(0.5, 1.0, 0.5);
        let outcome = grow_regions(&input, &params, &NormalAngle::pi_over(36.0)).unwrap();

        // The cluster collapses at the first radius, the grid at the second
        assert_eq!(outcome.component_history, vec![1601, 2]);
        let grid_label = outcome.labels[0];
        assert!(outcome.labels[..1600].iter().all(|&l| l == grid_label));
        assert!(outcome.labels[1600..].iter().all(|&l| l == 1600));
        assert!(outcome.death_times[1600].is_infinite());
        assert!(outcome.death_times[1601..].iter().all(|&t| t == 0.5));

        let cached = grow_regions(
            &input,
            &params.clone().cache_neighbors(true),
            &NormalAngle::pi_over(36.0),
        )
        .unwrap();
        assert_eq!(cached.labels, outcome.labels);
        assert_eq!(cached.death_times, outcome.death_times);
    }

    #[test]
    fn test_zero_length_normal_never_merges() {
        let input = SegmentationInput::from_points_and_normals(
            vec![Point3::origin(), Point3::new(0.1, 0.0, 0.0)],
            vec![Vector3::zeros(), Vector3::z()],
        )
        .unwrap();
        let params = GrowthParams::with_range(0.5, 1.0, 0.5);
        let outcome = grow_regions(&input, &params, &NormalAngle::new(PI)).unwrap();
        assert_eq!(outcome.labels, vec![0, 1]);
    }

    #[test]
    fn test_antiparallel_normals_at_full_tolerance() {
        let input = SegmentationInput::from_points_and_normals(
            vec![Point3::origin(), Point3::new(0.1, 0.0, 0.0)],
            vec![Vector3::z(), -Vector3::z()],
        )
        .unwrap();
        let params = GrowthParams::with_range(0.5, 0.5, 0.1);
        let outcome = grow_regions(&input, &params, &NormalAngle::new(PI)).unwrap();
        assert_eq!(outcome.labels, vec![0, 0]);
    }

    #[test]
    fn test_radius_beyond_extent_merges_in_one_step() {
        let points: Vec<Point3<f64>> = (0..12)
            .map(|i| Point3::new(i as f64, (i * i) as f64 * 0.1, 0.3 * i as f64))
            .collect();
        let input =
            SegmentationInput::from_points_and_normals(points, vec![Vector3::x(); 12]).unwrap();
        let params = GrowthParams::with_range(1000.0, 1000.0, 1.0);
        let outcome = grow_regions(&input, &params, &NormalAngle::pi_over(36.0)).unwrap();
        assert_eq!(outcome.component_history, vec![1]);
        assert!(outcome.death_times[1..].iter().all(|&t| t == 1000.0));
    }

    // ==================== Invalid Input ====================

    #[test]
    fn test_non_finite_coordinate_rejected() {
        let err = SegmentationInput::from_points_and_normals(
            vec![Point3::new(0.0, f64::NAN, 0.0)],
            vec![Vector3::z()],
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCoordinate);
    }

    #[test]
    fn test_non_finite_normal_rejected() {
        let err = SegmentationInput::from_points_and_normals(
            vec![Point3::origin()],
            vec![Vector3::new(f64::INFINITY, 0.0, 0.0)],
        )
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidNormal);
    }

    #[test]
    fn test_missing_normal_index_rejected() {
        let err = SegmentationInput::new(vec![Point3::origin()], vec![], vec![Some(0)], vec![])
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidNormalIndex);
    }

    #[test]
    fn test_corner_with_missing_vertex_rejected() {
        let faces = [[
            FaceCorner::new(0, None),
            FaceCorner::new(1, None),
            FaceCorner::new(7, None),
        ]];
        let err =
            SegmentationInput::from_corners(vec![Point3::origin(); 2], vec![], &faces).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidVertexIndex);
    }

    // ==================== Unusual Parameters ====================

    #[test]
    fn test_zero_tolerance_merges_identical_normals_only() {
        let input = SegmentationInput::from_points_and_normals(
            vec![
                Point3::origin(),
                Point3::new(0.5, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            vec![Vector3::z(), Vector3::z(), Vector3::new(0.0, 0.01, 1.0)],
        )
        .unwrap();
        let config = SweepConfig::new(0.5, 2.0, 0.5, vec![0.0]);
        let outcomes = run_sweep(&input, &config).unwrap();
        assert_eq!(outcomes[0].labels(), &[0, 0, 2]);
    }

    #[test]
    fn test_step_larger_than_range() {
        let schedule = GrowthParams::with_range(0.0, 1.0, 5.0).schedule().unwrap();
        assert_eq!(schedule.iter().collect::<Vec<_>>(), vec![0.0]);
    }

    #[test]
    fn test_infinite_step_rejected() {
        let err = GrowthParams::with_range(0.0, 1.0, f64::INFINITY)
            .schedule()
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRadiusStep);
    }
}
