//! Segment gap filling
//!
//! Every gap of `dt` whole seconds (`dt > 1`) between two adjacent
//! timestamped points is bridged by `dt - 1` synthetic points, one per
//! second, with position (and elevation when both ends have one) linearly
//! interpolated. Original points are never altered or dropped.

use crate::conversion::{add_seconds, lerp, whole_second_gap};
use crate::types::{Segment, TrackPoint};
use log::{trace, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling how synthetic points are built
#[derive(Debug, Clone)]
pub struct InterpolationOptions {
    /// Interpolate elevation when both bounding points carry one
    pub interpolate_elevation: bool,
}

impl Default for InterpolationOptions {
    fn default() -> Self {
        Self {
            interpolate_elevation: true,
        }
    }
}

/// One entry of a densified segment
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedPoint {
    /// Copy of the input point at this index
    Original(usize),
    /// Newly computed point
    Synthetic(TrackPoint),
}

/// Counters describing what happened to a single segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentStats {
    pub original_points: usize,
    pub filled_gaps: usize,
    pub inserted_points: usize,
    /// Adjacent pairs left alone because an endpoint had no usable time, or
    /// a gap had an endpoint without a usable position
    pub skipped_pairs: usize,
}

/// Densified layout of a segment, expressed against the input points
///
/// Containers that keep extra per-point data (raw XML, extensions) use the
/// `Original` indices to re-emit their own copy of each input point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentPlan {
    pub points: Vec<PlannedPoint>,
    pub stats: SegmentStats,
}

impl SegmentPlan {
    /// Resolve the plan into concrete points
    pub fn materialize(&self, originals: &[TrackPoint]) -> Option<Vec<TrackPoint>> {
        self.points
            .iter()
            .map(|planned| match planned {
                PlannedPoint::Original(index) => originals.get(*index).cloned(),
                PlannedPoint::Synthetic(point) => Some(point.clone()),
            })
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.stats.inserted_points > 0
    }
}

/// Plan the densified version of `points`
pub fn plan_segment(points: &[TrackPoint], options: &InterpolationOptions) -> SegmentPlan {
    let mut stats = SegmentStats {
        original_points: points.len(),
        ..SegmentStats::default()
    };

    if points.len() < 2 {
        return SegmentPlan {
            points: (0..points.len()).map(PlannedPoint::Original).collect(),
            stats,
        };
    }

    let mut planned = Vec::with_capacity(points.len());

    for (index, pair) in points.windows(2).enumerate() {
        let (cur, next) = (&pair[0], &pair[1]);
        planned.push(PlannedPoint::Original(index));

        let (start, end) = match (cur.time, next.time) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                trace!("Pair {} has no usable timestamp, leaving gap unfilled", index);
                stats.skipped_pairs += 1;
                continue;
            }
        };

        let dt = whole_second_gap(&start, &end);
        if dt < 0 {
            warn!(
                "Timestamps go backwards at point {} ({}s), leaving gap unfilled",
                index + 1,
                dt
            );
        }
        if dt <= 1 {
            continue;
        }
        if !(cur.has_position() && next.has_position()) {
            trace!("Gap after point {} has no usable position, leaving it unfilled", index);
            stats.skipped_pairs += 1;
            continue;
        }

        stats.filled_gaps += 1;
        let elevations = match (cur.elevation, next.elevation) {
            (Some(a), Some(b)) if options.interpolate_elevation => Some((a, b)),
            _ => None,
        };

        for s in 1..dt {
            let alpha = s as f64 / dt as f64;
            planned.push(PlannedPoint::Synthetic(TrackPoint {
                time: Some(add_seconds(&start, s)),
                latitude: lerp(cur.latitude, next.latitude, alpha),
                longitude: lerp(cur.longitude, next.longitude, alpha),
                elevation: elevations.map(|(a, b)| lerp(a, b, alpha)),
            }));
            stats.inserted_points += 1;
        }
    }

    planned.push(PlannedPoint::Original(points.len() - 1));

    SegmentPlan {
        points: planned,
        stats,
    }
}

/// Return a densified copy of `segment` using default options
pub fn interpolate_segment(segment: &Segment) -> Segment {
    interpolate_segment_with(segment, &InterpolationOptions::default())
}

/// Return a densified copy of `segment`
pub fn interpolate_segment_with(segment: &Segment, options: &InterpolationOptions) -> Segment {
    let plan = plan_segment(&segment.points, options);
    let points = plan
        .points
        .into_iter()
        .map(|planned| match planned {
            PlannedPoint::Original(index) => segment.points[index].clone(),
            PlannedPoint::Synthetic(point) => point,
        })
        .collect();
    Segment::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::TimeDelta::seconds(seconds)
    }

    fn point(seconds: i64, lat: f64, lon: f64) -> TrackPoint {
        TrackPoint::new(lat, lon).with_time(at(seconds))
    }

    #[test]
    fn test_plan_marks_originals_and_synthetics() {
        let points = vec![point(0, 0.0, 0.0), point(3, 3.0, 3.0)];
        let plan = plan_segment(&points, &InterpolationOptions::default());

        assert_eq!(plan.points.len(), 4);
        assert_eq!(plan.points[0], PlannedPoint::Original(0));
        assert!(matches!(plan.points[1], PlannedPoint::Synthetic(_)));
        assert!(matches!(plan.points[2], PlannedPoint::Synthetic(_)));
        assert_eq!(plan.points[3], PlannedPoint::Original(1));
        assert_eq!(plan.stats.filled_gaps, 1);
        assert_eq!(plan.stats.inserted_points, 2);
        assert!(plan.has_changes());
    }

    #[test]
    fn test_gap_without_position_is_skipped() {
        let points = vec![
            point(0, 0.0, 0.0),
            point(3, f64::NAN, 1.0),
            point(4, 1.0, 1.0),
            point(6, 1.0, 3.0),
        ];
        let plan = plan_segment(&points, &InterpolationOptions::default());

        assert_eq!(plan.stats.skipped_pairs, 1);
        assert_eq!(plan.stats.filled_gaps, 1);
        assert_eq!(plan.stats.inserted_points, 1);
        assert_eq!(plan.points[0], PlannedPoint::Original(0));
        assert_eq!(plan.points[1], PlannedPoint::Original(1));
        assert_eq!(plan.points[2], PlannedPoint::Original(2));
        match &plan.points[3] {
            PlannedPoint::Synthetic(p) => assert_eq!(p.longitude, 2.0),
            other => panic!("expected synthetic point, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_segments_pass_through() {
        let options = InterpolationOptions::default();

        let empty = plan_segment(&[], &options);
        assert!(empty.points.is_empty());
        assert!(!empty.has_changes());

        let single = plan_segment(&[point(0, 1.0, 1.0)], &options);
        assert_eq!(single.points, vec![PlannedPoint::Original(0)]);
    }

    #[test]
    fn test_synthetic_times_step_one_second() {
        let points = vec![point(10, 0.0, 0.0), point(15, 5.0, 5.0)];
        let segment = interpolate_segment(&Segment::new(points));

        let times: Vec<_> = segment.points.iter().map(|p| p.time.unwrap()).collect();
        let expected: Vec<_> = (10..=15).map(at).collect();
        assert_eq!(times, expected);
    }

    #[test]
    fn test_elevation_needs_both_ends() {
        let points = vec![
            point(0, 0.0, 0.0).with_elevation(10.0),
            point(2, 1.0, 1.0),
            point(4, 2.0, 2.0).with_elevation(30.0),
        ];
        let segment = interpolate_segment(&Segment::new(points.clone()));
        assert_eq!(segment.len(), 5);
        assert_eq!(segment.points[1].elevation, None);
        assert_eq!(segment.points[3].elevation, None);

        let points = vec![
            point(0, 0.0, 0.0).with_elevation(10.0),
            point(2, 1.0, 1.0).with_elevation(20.0),
        ];
        let segment = interpolate_segment(&Segment::new(points));
        assert_eq!(segment.points[1].elevation, Some(15.0));
    }

    #[test]
    fn test_elevation_interpolation_can_be_disabled() {
        let points = vec![
            point(0, 0.0, 0.0).with_elevation(10.0),
            point(2, 1.0, 1.0).with_elevation(20.0),
        ];
        let options = InterpolationOptions {
            interpolate_elevation: false,
        };
        let segment = interpolate_segment_with(&Segment::new(points), &options);
        assert_eq!(segment.len(), 3);
        assert_eq!(segment.points[1].elevation, None);
        assert_eq!(segment.points[2].elevation, Some(20.0));
    }

    #[test]
    fn test_missing_time_skips_only_that_pair() {
        let points = vec![
            point(0, 0.0, 0.0),
            TrackPoint::new(1.0, 1.0),
            point(5, 2.0, 2.0),
            point(8, 3.0, 3.0),
        ];
        let plan = plan_segment(&points, &InterpolationOptions::default());
        assert_eq!(plan.stats.skipped_pairs, 2);
        assert_eq!(plan.stats.filled_gaps, 1);
        assert_eq!(plan.stats.inserted_points, 2);
        assert_eq!(plan.points.len(), 6);
    }

    #[test]
    fn test_backwards_time_is_left_alone() {
        let points = vec![point(10, 0.0, 0.0), point(2, 1.0, 1.0), point(5, 2.0, 2.0)];
        let segment = interpolate_segment(&Segment::new(points.clone()));
        // 10 -> 2 is not filled, 2 -> 5 gets two points
        assert_eq!(segment.len(), 5);
        assert_eq!(segment.points[0], points[0]);
        assert_eq!(segment.points[1], points[1]);
        assert_eq!(segment.points[4], points[2]);
    }

    #[test]
    fn test_materialize_rejects_bad_index() {
        let plan = SegmentPlan {
            points: vec![PlannedPoint::Original(3)],
            stats: SegmentStats::default(),
        };
        assert!(plan.materialize(&[point(0, 0.0, 0.0)]).is_none());
    }
}
