//! Running the interpolator over a whole track file
//!
//! The interpolator itself knows nothing about file formats. A format is
//! plugged in through [`TrackFormat`] (bytes in, bytes out) and the decoded
//! document exposes its segments through [`TrackContainer`].

use crate::error::Result;
use crate::export::write_gpx_file;
use crate::interpolate::{plan_segment, InterpolationOptions, SegmentPlan};
use crate::parser::gpx::parse_gpx_file;
use crate::types::Track;
use log::{debug, info};
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Decoded track file whose segments can be replaced in place
pub trait TrackContainer {
    /// Tracks in document order
    fn tracks(&self) -> &[Track];

    /// Replace segment `segment` of track `track` with a densified plan
    ///
    /// The plan's `Original` indices refer to the segment as it was read.
    fn replace_segment(&mut self, track: usize, segment: usize, plan: SegmentPlan) -> Result<()>;
}

/// Reader/writer pair for one container format
pub trait TrackFormat {
    type Document: TrackContainer;

    fn decode(&self, bytes: &[u8]) -> Result<Self::Document>;

    fn encode(&self, document: &Self::Document) -> Result<Vec<u8>>;
}

/// Summary of a densification run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DensifyReport {
    pub tracks: usize,
    pub segments: usize,
    /// Segments with fewer than two points
    pub passthrough_segments: usize,
    pub original_points: usize,
    pub filled_gaps: usize,
    pub inserted_points: usize,
    pub skipped_pairs: usize,
}

impl DensifyReport {
    /// No segments were found, or none needed new points
    pub fn is_unchanged(&self) -> bool {
        self.segments == 0 || self.inserted_points == 0
    }

    /// Total number of points after densification
    pub fn output_points(&self) -> usize {
        self.original_points + self.inserted_points
    }
}

/// Densify every segment of every track in `container`
///
/// Plans are independent per segment; they are applied in document order so
/// segment positions never change.
pub fn densify_container<C: TrackContainer>(
    container: &mut C,
    options: &InterpolationOptions,
) -> Result<DensifyReport> {
    let plans = plan_all(container.tracks(), options);

    let mut report = DensifyReport {
        tracks: container.tracks().len(),
        ..DensifyReport::default()
    };

    for (track, segment, plan) in plans {
        let stats = plan.stats;
        report.segments += 1;
        if stats.original_points < 2 {
            report.passthrough_segments += 1;
        }
        report.original_points += stats.original_points;
        report.filled_gaps += stats.filled_gaps;
        report.inserted_points += stats.inserted_points;
        report.skipped_pairs += stats.skipped_pairs;

        debug!(
            "Track {} segment {}: {} points, {} gaps filled, {} points inserted",
            track, segment, stats.original_points, stats.filled_gaps, stats.inserted_points
        );
        container.replace_segment(track, segment, plan)?;
    }

    info!(
        "Densified {} segments in {} tracks: {} -> {} points",
        report.segments,
        report.tracks,
        report.original_points,
        report.output_points()
    );
    Ok(report)
}

#[cfg(not(feature = "parallel"))]
fn plan_all(tracks: &[Track], options: &InterpolationOptions) -> Vec<(usize, usize, SegmentPlan)> {
    tracks
        .iter()
        .enumerate()
        .flat_map(|(t, track)| {
            track
                .segments
                .iter()
                .enumerate()
                .map(move |(s, segment)| (t, s, plan_segment(&segment.points, options)))
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn plan_all(tracks: &[Track], options: &InterpolationOptions) -> Vec<(usize, usize, SegmentPlan)> {
    use rayon::prelude::*;

    let jobs: Vec<_> = tracks
        .iter()
        .enumerate()
        .flat_map(|(t, track)| {
            track
                .segments
                .iter()
                .enumerate()
                .map(move |(s, segment)| (t, s, segment))
        })
        .collect();

    // collect() on an indexed parallel iterator keeps input order
    jobs.par_iter()
        .map(|(t, s, segment)| (*t, *s, plan_segment(&segment.points, options)))
        .collect()
}

/// Decode `input` with `format`, densify it and encode the result
pub fn densify_bytes<F: TrackFormat>(
    format: &F,
    input: &[u8],
    options: &InterpolationOptions,
) -> Result<(Vec<u8>, DensifyReport)> {
    let mut document = format.decode(input)?;
    let report = densify_container(&mut document, options)?;
    let output = format.encode(&document)?;
    Ok((output, report))
}

/// Densify the GPX file at `input` and write the result to `output`
///
/// The output file is only written after every segment has been processed.
pub fn densify_file(
    input: &Path,
    output: &Path,
    options: &InterpolationOptions,
) -> Result<DensifyReport> {
    let mut document = parse_gpx_file(input)?;
    let report = densify_container(&mut document, options)?;
    write_gpx_file(&document, output)?;
    Ok(report)
}
