//! GPX reader
//!
//! Streams the source with `quick-xml` and builds a [`GpxDocument`]. Elements
//! are matched by local name so both GPX 1.0 and 1.1 files (prefixed or not)
//! are accepted. Only `trk/trkseg/trkpt` content is decoded; everything else
//! is kept as opaque events.
//!
//! Files declaring a non-UTF-8 encoding are decoded up front and their
//! declaration is rewritten to UTF-8, the encoding the writer produces.

use crate::conversion::{parse_coordinate, parse_elevation, parse_timestamp};
use crate::error::{DensifyError, Result};
use crate::parser::document::{GpxDocument, Part, RawPoint, RawSegment};
use crate::types::{Segment, Track, TrackPoint};
use log::{debug, trace};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Decoder, Reader};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a GPX document from text
pub fn parse_gpx_str(xml: &str) -> Result<GpxDocument> {
    GpxParser::default().run(xml)
}

/// Parse a GPX document from raw bytes
///
/// UTF-8 input (with or without BOM) is read as is. Input whose XML
/// declaration names another encoding is decoded with it first.
pub fn parse_gpx_bytes(bytes: &[u8]) -> Result<GpxDocument> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let decoder = declared_decoder(bytes);
    let encoding = decoder.encoding();

    if encoding.name() == "UTF-8" {
        return parse_gpx_str(std::str::from_utf8(bytes)?);
    }

    debug!("Decoding {} input as UTF-8", encoding.name());
    let text = decoder.decode(bytes).map_err(quick_xml::Error::from)?;
    GpxParser {
        reencode: true,
        ..GpxParser::default()
    }
    .run(&text)
}

/// Read and parse a GPX file
pub fn parse_gpx_file(path: &Path) -> Result<GpxDocument> {
    let bytes = std::fs::read(path)?;
    parse_gpx_bytes(&bytes)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PointField {
    Time,
    Elevation,
}

struct OpenTrack {
    index: usize,
    depth: usize,
    in_name: bool,
}

struct OpenSegment {
    open: BytesStart<'static>,
    depth: usize,
    raw_points: Vec<RawPoint>,
    points: Vec<TrackPoint>,
    pending: Vec<Event<'static>>,
}

struct OpenPoint {
    depth: usize,
    lead: Vec<Event<'static>>,
    body: Vec<Event<'static>>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    field: Option<PointField>,
    time_text: Option<String>,
    ele_text: Option<String>,
}

impl OpenPoint {
    fn push_text(&mut self, text: &str) {
        let slot = match self.field {
            Some(PointField::Time) => &mut self.time_text,
            Some(PointField::Elevation) => &mut self.ele_text,
            None => return,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn into_point(self) -> (RawPoint, TrackPoint) {
        let time = self.time_text.as_deref().and_then(|text| {
            let parsed = parse_timestamp(text);
            if parsed.is_none() {
                trace!("Ignoring unparsable time {:?}", text);
            }
            parsed
        });
        let elevation = self.ele_text.as_deref().and_then(|text| {
            let parsed = parse_elevation(text);
            if parsed.is_none() && !text.trim().is_empty() {
                trace!("Ignoring unparsable elevation {:?}", text);
            }
            parsed
        });

        if self.latitude.is_none() || self.longitude.is_none() {
            trace!("Point has no usable lat/lon, it will not bound a filled gap");
        }

        let point = TrackPoint {
            time,
            latitude: self.latitude.unwrap_or(f64::NAN),
            longitude: self.longitude.unwrap_or(f64::NAN),
            elevation,
        };
        let raw = RawPoint {
            lead: self.lead,
            body: self.body,
        };
        (raw, point)
    }
}

#[derive(Default)]
struct GpxParser {
    doc: GpxDocument,
    /// Local names of the currently open elements
    path: Vec<Vec<u8>>,
    track: Option<OpenTrack>,
    segment: Option<OpenSegment>,
    point: Option<OpenPoint>,
    saw_root: bool,
    /// Source was transcoded, so its declaration must name UTF-8
    reencode: bool,
}

impl GpxParser {
    fn run(mut self, xml: &str) -> Result<GpxDocument> {
        let mut reader = Reader::from_str(xml);

        loop {
            let event = reader.read_event().map_err(|e| {
                DensifyError::Xml(format!("{} (at byte {})", e, reader.buffer_position()))
            })?;

            match event {
                Event::Eof => break,
                Event::Start(e) => self.start(e.into_owned(), false)?,
                Event::Empty(e) => self.start(e.into_owned(), true)?,
                Event::End(e) => self.end(e.into_owned())?,
                Event::Decl(e) => {
                    self.doc.has_declaration = true;
                    let decl = if self.reencode {
                        utf8_declaration(&e)?
                    } else {
                        e.into_owned()
                    };
                    self.other(Event::Decl(decl))?;
                }
                other => self.other(other.into_owned())?,
            }
        }

        if let Some(open) = self.path.last() {
            return Err(DensifyError::Xml(format!(
                "unexpected end of file inside <{}>",
                String::from_utf8_lossy(open)
            )));
        }
        if !self.saw_root {
            return Err(DensifyError::Xml("document has no root element".to_string()));
        }

        debug!(
            "Read {} tracks, {} segments, {} points",
            self.doc.tracks.len(),
            self.doc.segment_count(),
            self.doc.point_count()
        );
        Ok(self.doc)
    }

    fn start(&mut self, e: BytesStart<'static>, empty: bool) -> Result<()> {
        let depth = self.path.len();
        let local = e.local_name().as_ref().to_vec();
        if depth == 0 {
            self.saw_root = true;
        }
        let event = if empty {
            Event::Empty(e.clone())
        } else {
            Event::Start(e.clone())
        };

        if let Some(point) = self.point.as_mut() {
            if depth == point.depth + 1 && !empty {
                point.field = match local.as_slice() {
                    b"time" => Some(PointField::Time),
                    b"ele" => Some(PointField::Elevation),
                    _ => None,
                };
            }
            point.body.push(event);
        } else if let Some(segment) = self.segment.as_mut() {
            if depth == segment.depth + 1 && local == b"trkpt" {
                let latitude = read_coordinate(&e, "lat")?;
                let longitude = read_coordinate(&e, "lon")?;
                self.point = Some(OpenPoint {
                    depth,
                    lead: std::mem::take(&mut segment.pending),
                    body: vec![event],
                    latitude,
                    longitude,
                    field: None,
                    time_text: None,
                    ele_text: None,
                });
                if empty {
                    self.finish_point()?;
                }
            } else {
                segment.pending.push(event);
            }
        } else if self.is_segment_start(depth, &local) {
            self.segment = Some(OpenSegment {
                open: e,
                depth,
                raw_points: Vec::new(),
                points: Vec::new(),
                pending: Vec::new(),
            });
            if empty {
                self.finish_segment(None)?;
            }
        } else {
            if let Some(track) = self.track.as_mut() {
                if depth == track.depth + 1 && local == b"name" && !empty {
                    track.in_name = true;
                }
            } else if local == b"trk" {
                self.doc.tracks.push(Track::new(None));
                if !empty {
                    self.track = Some(OpenTrack {
                        index: self.doc.tracks.len() - 1,
                        depth,
                        in_name: false,
                    });
                }
            }
            self.doc.parts.push(Part::Event(event));
        }

        if !empty {
            self.path.push(local);
        }
        Ok(())
    }

    fn end(&mut self, e: BytesEnd<'static>) -> Result<()> {
        let local = self.path.pop().ok_or_else(|| {
            DensifyError::Xml(format!(
                "unexpected closing tag </{}>",
                String::from_utf8_lossy(e.name().as_ref())
            ))
        })?;
        let depth = self.path.len();

        if let Some(point) = self.point.as_mut() {
            point.body.push(Event::End(e));
            if depth == point.depth {
                self.finish_point()?;
            } else if depth == point.depth + 1 {
                point.field = None;
            }
            return Ok(());
        }

        if let Some(segment) = self.segment.as_mut() {
            if depth == segment.depth {
                self.finish_segment(Some(e))?;
            } else {
                segment.pending.push(Event::End(e));
            }
            return Ok(());
        }

        if let Some(track) = self.track.as_mut() {
            if depth == track.depth {
                self.track = None;
            } else if depth == track.depth + 1 && local == b"name" {
                track.in_name = false;
            }
        }
        self.doc.parts.push(Part::Event(Event::End(e)));
        Ok(())
    }

    fn other(&mut self, event: Event<'static>) -> Result<()> {
        if let Some(point) = self.point.as_mut() {
            if self.path.len() == point.depth + 2 {
                if let Some(text) = event_text(&event)? {
                    point.push_text(&text);
                }
            }
            point.body.push(event);
        } else if let Some(segment) = self.segment.as_mut() {
            segment.pending.push(event);
        } else {
            if let Some(track) = self.track.as_ref().filter(|t| t.in_name) {
                if let Some(text) = event_text(&event)? {
                    self.doc.tracks[track.index]
                        .name
                        .get_or_insert_with(String::new)
                        .push_str(&text);
                }
            }
            self.doc.parts.push(Part::Event(event));
        }
        Ok(())
    }

    fn is_segment_start(&self, depth: usize, local: &[u8]) -> bool {
        local == b"trkseg" && self.track.as_ref().is_some_and(|t| depth == t.depth + 1)
    }

    fn finish_point(&mut self) -> Result<()> {
        let point = self
            .point
            .take()
            .ok_or_else(|| DensifyError::Xml("no open <trkpt>".to_string()))?;
        let segment = self
            .segment
            .as_mut()
            .ok_or_else(|| DensifyError::Xml("<trkpt> outside <trkseg>".to_string()))?;

        let (raw, point) = point.into_point();
        segment.raw_points.push(raw);
        segment.points.push(point);
        Ok(())
    }

    fn finish_segment(&mut self, close: Option<BytesEnd<'static>>) -> Result<()> {
        let segment = self
            .segment
            .take()
            .ok_or_else(|| DensifyError::Xml("no open <trkseg>".to_string()))?;
        let track_index = self
            .track
            .as_ref()
            .map(|t| t.index)
            .ok_or_else(|| DensifyError::Xml("<trkseg> outside <trk>".to_string()))?;

        let track = &mut self.doc.tracks[track_index];
        let index = track.segments.len();
        trace!(
            "Segment {} of track {} has {} points",
            index,
            track_index,
            segment.points.len()
        );
        track.add_segment(Segment::new(segment.points));

        self.doc.segments.push(RawSegment {
            track: track_index,
            index,
            open: segment.open,
            close,
            points: segment.raw_points,
            trailing: segment.pending,
            plan: None,
        });
        self.doc
            .parts
            .push(Part::Segment(self.doc.segments.len() - 1));
        Ok(())
    }
}

/// Read a `lat`/`lon` attribute, `None` when absent or not a finite number
fn read_coordinate(e: &BytesStart<'_>, name: &str) -> Result<Option<f64>> {
    let Some(attr) = e.try_get_attribute(name)? else {
        return Ok(None);
    };
    let value = std::str::from_utf8(&attr.value)?;
    Ok(unescape(value).ok().and_then(|v| parse_coordinate(&v)))
}

/// Decoder for the encoding named in the XML declaration, UTF-8 otherwise
fn declared_decoder(bytes: &[u8]) -> Decoder {
    let mut reader = Reader::from_reader(bytes);
    // The declaration can only be the first event; reading it switches the decoder
    let _ = reader.read_event();
    reader.decoder()
}

fn utf8_declaration(decl: &BytesDecl<'_>) -> Result<BytesDecl<'static>> {
    let version = decl.version()?;
    let version = std::str::from_utf8(&version)?;
    let standalone = decl.standalone().transpose()?;
    let standalone = match &standalone {
        Some(value) => Some(std::str::from_utf8(value)?),
        None => None,
    };
    Ok(BytesDecl::new(version, Some("UTF-8"), standalone))
}

fn event_text(event: &Event<'_>) -> Result<Option<String>> {
    match event {
        Event::Text(text) => Ok(Some(text.unescape()?.into_owned())),
        Event::CData(data) => Ok(Some(std::str::from_utf8(data)?.to_string())),
        _ => Ok(None),
    }
}
