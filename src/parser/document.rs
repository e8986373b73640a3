//! Lossless in-memory GPX document
//!
//! The document keeps every XML event of the source so it can be written
//! back unchanged outside the segments that were rewritten. Each `trkseg`
//! is stored separately, with each `trkpt` kept as its own slice of events
//! next to the decoded `TrackPoint`.

use crate::densify::{TrackContainer, TrackFormat};
use crate::error::{DensifyError, Result};
use crate::interpolate::SegmentPlan;
use crate::types::Track;
use quick_xml::events::{BytesEnd, BytesStart, Event};

/// Top-level piece of the document, in source order
#[derive(Debug, Clone)]
pub(crate) enum Part {
    Event(Event<'static>),
    /// Index into `GpxDocument::segments`
    Segment(usize),
}

/// Raw events of a single `trkpt`
#[derive(Debug, Clone, Default)]
pub(crate) struct RawPoint {
    /// Whitespace, comments and foreign elements found before the point
    pub lead: Vec<Event<'static>>,
    /// The `trkpt` element itself, start to end
    pub body: Vec<Event<'static>>,
}

impl RawPoint {
    /// Leading text if it is pure whitespace, used to indent synthetic points
    pub fn indent(&self) -> Option<&Event<'static>> {
        match self.lead.as_slice() {
            [event @ Event::Text(text)] if text.iter().all(|b| b.is_ascii_whitespace()) => {
                Some(event)
            }
            _ => None,
        }
    }
}

/// Raw events of a `trkseg` plus its position in the logical model
#[derive(Debug, Clone)]
pub(crate) struct RawSegment {
    pub track: usize,
    pub index: usize,
    /// Opening tag, or the whole element for `<trkseg/>`
    pub open: BytesStart<'static>,
    pub close: Option<BytesEnd<'static>>,
    pub points: Vec<RawPoint>,
    /// Everything after the last `trkpt` (extensions, whitespace)
    pub trailing: Vec<Event<'static>>,
    pub plan: Option<SegmentPlan>,
}

impl RawSegment {
    /// Namespace prefix of the segment tag including the colon, e.g. `gpx:`
    pub fn prefix(&self) -> String {
        match self.open.name().prefix() {
            Some(prefix) => format!("{}:", String::from_utf8_lossy(prefix.as_ref())),
            None => String::new(),
        }
    }
}

/// Parsed GPX file ready for densification and re-encoding
#[derive(Debug, Clone, Default)]
pub struct GpxDocument {
    pub(crate) parts: Vec<Part>,
    pub(crate) segments: Vec<RawSegment>,
    pub(crate) tracks: Vec<Track>,
    pub(crate) has_declaration: bool,
}

impl GpxDocument {
    /// Get total number of segments across all tracks
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Get total number of track points across all tracks
    pub fn point_count(&self) -> usize {
        self.tracks.iter().map(|t| t.point_count()).sum()
    }
}

impl TrackContainer for GpxDocument {
    fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    fn replace_segment(&mut self, track: usize, segment: usize, plan: SegmentPlan) -> Result<()> {
        let raw = self
            .segments
            .iter_mut()
            .find(|s| s.track == track && s.index == segment)
            .ok_or(DensifyError::UnknownSegment { track, segment })?;

        let logical = self
            .tracks
            .get_mut(track)
            .and_then(|t| t.segments.get_mut(segment))
            .ok_or(DensifyError::UnknownSegment { track, segment })?;

        // Plans always refer to the points as read from the source
        if raw.plan.is_some() {
            return Err(DensifyError::InvalidPlan(format!(
                "segment {} of track {} was already replaced",
                segment, track
            )));
        }

        let points = plan.materialize(&logical.points).ok_or_else(|| {
            DensifyError::InvalidPlan(format!(
                "plan for segment {} of track {} refers to a point outside 0..{}",
                segment,
                track,
                logical.points.len()
            ))
        })?;

        logical.points = points;
        raw.plan = Some(plan);
        Ok(())
    }
}

/// GPX 1.0/1.1 reader/writer pair
#[derive(Debug, Clone, Copy, Default)]
pub struct GpxFormat;

impl TrackFormat for GpxFormat {
    type Document = GpxDocument;

    fn decode(&self, bytes: &[u8]) -> Result<GpxDocument> {
        crate::parser::gpx::parse_gpx_bytes(bytes)
    }

    fn encode(&self, document: &GpxDocument) -> Result<Vec<u8>> {
        crate::export::encode_gpx(document)
    }
}
