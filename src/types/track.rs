use crate::types::TrackPoint;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One continuous run of track points in recording order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub points: Vec<TrackPoint>,
}

impl Segment {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A named track made of ordered segments
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Track {
    pub name: Option<String>,
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn new(name: Option<String>) -> Self {
        Self {
            name,
            segments: Vec::new(),
        }
    }

    pub fn add_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Get total number of points across all segments
    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }
}
