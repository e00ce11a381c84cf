//! Tessellation of the Bézier segment between two consecutive nodes.
//!
//! A [`SplineSegment`] samples its curve at `segments + 1` evenly spaced
//! parameters and keeps the resulting polyline together with per-sample and
//! cumulative distances. Lengths and closest-point queries all work on that
//! piecewise-linear approximation.

use bevy::prelude::*;

use super::bezier::cubic_bezier;

/// Minimum number of tessellation steps for a segment.
pub const MIN_SEGMENTS: u32 = 2;

/// A tessellated sample on a segment.
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct SplinePoint {
    /// World position of the sample.
    pub position: Vec3,
    /// Distance from the previous sample (0 for the first one).
    pub distance: f32,
    /// Cumulative distance from the segment start.
    pub total_distance: f32,
}

/// Result of a closest-point query against one segment's polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentClosestPoint {
    /// Closest point on the polyline.
    pub point: Vec3,
    /// Index of the nearest sample.
    pub index: usize,
    /// Index of the neighbouring sample the point was projected towards.
    pub neighbor: usize,
    /// Distance from the query to `point`.
    pub distance: f32,
}

/// The tessellated cubic Bézier curve from a node to its successor.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct SplineSegment {
    segments: u32,
    start: Vec3,
    start_handle: Vec3,
    end_handle: Vec3,
    end: Vec3,
    points: Vec<SplinePoint>,
    length: f32,
    endpoint_distance: f32,
}

impl SplineSegment {
    /// Build and tessellate a segment.
    ///
    /// Handles are world-space control points. `segments` below
    /// [`MIN_SEGMENTS`] is clamped.
    pub fn new(
        segments: u32,
        start: Vec3,
        start_handle: Vec3,
        end: Vec3,
        end_handle: Vec3,
    ) -> Self {
        let mut segment = Self {
            segments: segments.max(MIN_SEGMENTS),
            start,
            start_handle,
            end_handle,
            end,
            points: Vec::new(),
            length: 0.0,
            endpoint_distance: 0.0,
        };
        segment.tessellate();
        segment
    }

    fn tessellate(&mut self) {
        let steps = self.segments as usize;
        self.points.clear();
        self.points.reserve(steps + 1);

        let mut total_distance = 0.0;
        let mut prev_point = self.start;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let position = self.evaluate(t);
            let distance = if i == 0 {
                0.0
            } else {
                position.distance(prev_point)
            };
            total_distance += distance;

            self.points.push(SplinePoint {
                position,
                distance,
                total_distance,
            });
            prev_point = position;
        }

        self.length = total_distance;
        self.endpoint_distance = self.start.distance(self.end);
    }

    /// Evaluate the underlying curve at `t`.
    pub fn evaluate(&self, t: f32) -> Vec3 {
        cubic_bezier(self.start, self.start_handle, self.end_handle, self.end, t)
    }

    /// Tessellation samples, ordered from start to end.
    pub fn samples(&self) -> &[SplinePoint] {
        &self.points
    }

    /// Number of tessellation steps (samples minus one).
    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Piecewise-linear arc length.
    pub fn length(&self) -> f32 {
        self.length
    }

    /// Straight-line distance between the two endpoints.
    pub fn endpoint_distance(&self) -> f32 {
        self.endpoint_distance
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// Find the closest point on the sampled polyline.
    ///
    /// The nearest sample is found first, then the query is projected onto
    /// the polyline edge towards whichever neighbour sample is closer.
    pub fn closest_point(&self, query: Vec3) -> Option<SegmentClosestPoint> {
        let (index, _) = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.position.distance_squared(query)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let previous = index
            .checked_sub(1)
            .map(|i| (i, self.points[i].position.distance_squared(query)));
        let next = self
            .points
            .get(index + 1)
            .map(|p| (index + 1, p.position.distance_squared(query)));

        let neighbor = match (previous, next) {
            (Some((p, dp)), Some((n, dn))) => {
                if dp < dn {
                    p
                } else {
                    n
                }
            }
            (Some((p, _)), None) => p,
            (None, Some((n, _))) => n,
            (None, None) => index,
        };

        let point = project_onto_segment(
            self.points[index].position,
            self.points[neighbor].position,
            query,
        );

        Some(SegmentClosestPoint {
            point,
            index,
            neighbor,
            distance: point.distance(query),
        })
    }
}

/// Project `point` onto the line segment `a`-`b`, clamped to its endpoints.
pub fn project_onto_segment(a: Vec3, b: Vec3, point: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }

    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curved() -> SplineSegment {
        SplineSegment::new(
            16,
            Vec3::ZERO,
            Vec3::new(0.0, 4.0, 0.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(10.0, 4.0, 2.0),
        )
    }

    #[test]
    fn test_sample_count_and_distances() {
        for segments in [2, 3, 7, 32] {
            let segment = SplineSegment::new(
                segments,
                Vec3::ZERO,
                Vec3::new(1.0, 3.0, 0.0),
                Vec3::new(5.0, 0.0, 1.0),
                Vec3::new(4.0, -2.0, 0.0),
            );
            let samples = segment.samples();
            assert_eq!(samples.len(), segments as usize + 1);
            assert_eq!(samples[0].total_distance, 0.0);
            assert_eq!(samples[0].distance, 0.0);
            for pair in samples.windows(2) {
                assert!(pair[1].total_distance >= pair[0].total_distance);
            }
            assert_eq!(segment.length(), samples[samples.len() - 1].total_distance);
        }
    }

    #[test]
    fn test_segment_count_clamped() {
        let segment = SplineSegment::new(0, Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::X);
        assert_eq!(segment.segments(), MIN_SEGMENTS);
        assert_eq!(segment.samples().len(), 3);
    }

    #[test]
    fn test_length_at_least_endpoint_distance() {
        let segment = curved();
        assert!(segment.length() >= segment.endpoint_distance());
        assert!((segment.endpoint_distance() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_straight_segment_length() {
        let start = Vec3::ZERO;
        let end = Vec3::new(10.0, 0.0, 0.0);
        let segment = SplineSegment::new(4, start, start, end, end);
        assert!((segment.length() - 10.0).abs() < 1e-4);
        assert!((segment.samples()[4].position - end).length() < 1e-5);
    }

    #[test]
    fn test_closest_point_on_sample() {
        let segment = curved();
        let sample = segment.samples()[5];
        let closest = segment.closest_point(sample.position).unwrap();

        assert_eq!(closest.index, 5);
        assert!((closest.point - sample.position).length() < 1e-5);
        assert!(closest.distance < 1e-5);
    }

    #[test]
    fn test_closest_point_projects_between_samples() {
        let start = Vec3::ZERO;
        let end = Vec3::new(8.0, 0.0, 0.0);
        let segment = SplineSegment::new(4, start, start, end, end);

        let closest = segment.closest_point(Vec3::new(2.5, 3.0, 0.0)).unwrap();
        assert!((closest.point - Vec3::new(2.5, 0.0, 0.0)).length() < 1e-3);
        assert!((closest.distance - 3.0).abs() < 1e-3);
        assert_ne!(closest.index, closest.neighbor);
    }

    #[test]
    fn test_closest_point_clamps_past_end() {
        let start = Vec3::ZERO;
        let end = Vec3::new(8.0, 0.0, 0.0);
        let segment = SplineSegment::new(4, start, start, end, end);

        let closest = segment.closest_point(Vec3::new(12.0, 1.0, 0.0)).unwrap();
        assert!((closest.point - end).length() < 1e-3);
        assert_eq!(closest.index, 4);
    }

    #[test]
    fn test_project_onto_degenerate_segment() {
        let a = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(project_onto_segment(a, a, Vec3::ZERO), a);
    }

    #[test]
    fn test_rebuild_is_deterministic() {
        assert_eq!(curved().samples(), curved().samples());
    }
}
