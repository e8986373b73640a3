//! GPX writer
//!
//! Re-emits a [`GpxDocument`] event by event. Segments that were replaced
//! are written from their plan: original points are copied verbatim,
//! synthetic points are written with fixed precision and indented like
//! their neighbours.

use crate::conversion::{format_coordinate, format_elevation, format_timestamp};
use crate::error::Result;
use crate::interpolate::PlannedPoint;
use crate::parser::document::{GpxDocument, Part, RawPoint, RawSegment};
use crate::types::TrackPoint;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Encode the document into GPX bytes
pub fn encode_gpx(document: &GpxDocument) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_gpx(document, &mut out)?;
    Ok(out)
}

/// Write the document as GPX to any writer
pub fn write_gpx<W: Write>(document: &GpxDocument, out: W) -> Result<()> {
    let mut writer = Writer::new(out);

    if !document.has_declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::Text(BytesText::new("\n")))?;
    }

    for part in &document.parts {
        match part {
            Part::Event(event) => writer.write_event(event.clone())?,
            Part::Segment(index) => write_segment(&mut writer, &document.segments[*index])?,
        }
    }

    Ok(())
}

/// Write the document to `path`, creating missing parent directories
pub fn write_gpx_file(document: &GpxDocument, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = encode_gpx(document)?;
    fs::write(path, &bytes)?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn write_segment<W: Write>(writer: &mut Writer<W>, segment: &RawSegment) -> Result<()> {
    let plan = match &segment.plan {
        Some(plan) if plan.has_changes() => plan,
        _ => return write_segment_verbatim(writer, segment),
    };

    writer.write_event(Event::Start(segment.open.clone()))?;

    let prefix = segment.prefix();
    let mut last_original: Option<usize> = None;
    for planned in &plan.points {
        match planned {
            PlannedPoint::Original(index) => {
                write_raw_point(writer, &segment.points[*index])?;
                last_original = Some(*index);
            }
            PlannedPoint::Synthetic(point) => {
                if let Some(indent) = synthetic_indent(segment, last_original) {
                    writer.write_event(indent.clone())?;
                }
                write_synthetic_point(writer, &prefix, point)?;
            }
        }
    }

    for event in &segment.trailing {
        writer.write_event(event.clone())?;
    }
    match &segment.close {
        Some(close) => writer.write_event(Event::End(close.clone()))?,
        None => writer.write_event(Event::End(segment.open.to_end()))?,
    }
    Ok(())
}

fn write_segment_verbatim<W: Write>(writer: &mut Writer<W>, segment: &RawSegment) -> Result<()> {
    let Some(close) = &segment.close else {
        writer.write_event(Event::Empty(segment.open.clone()))?;
        return Ok(());
    };

    writer.write_event(Event::Start(segment.open.clone()))?;
    for point in &segment.points {
        write_raw_point(writer, point)?;
    }
    for event in &segment.trailing {
        writer.write_event(event.clone())?;
    }
    writer.write_event(Event::End(close.clone()))?;
    Ok(())
}

fn write_raw_point<W: Write>(writer: &mut Writer<W>, point: &RawPoint) -> Result<()> {
    for event in point.lead.iter().chain(point.body.iter()) {
        writer.write_event(event.clone())?;
    }
    Ok(())
}

/// Whitespace to put before a synthetic point that follows `last_original`
fn synthetic_indent(segment: &RawSegment, last_original: Option<usize>) -> Option<&Event<'static>> {
    let next = last_original.map_or(0, |i| i + 1);
    segment
        .points
        .get(next)
        .and_then(RawPoint::indent)
        .or_else(|| last_original.and_then(|i| segment.points.get(i)?.indent()))
}

fn write_synthetic_point<W: Write>(
    writer: &mut Writer<W>,
    prefix: &str,
    point: &TrackPoint,
) -> Result<()> {
    let tag = format!("{}trkpt", prefix);
    let latitude = format_coordinate(point.latitude);
    let longitude = format_coordinate(point.longitude);

    let mut start = BytesStart::new(tag.as_str());
    start.push_attribute(("lat", latitude.as_str()));
    start.push_attribute(("lon", longitude.as_str()));
    writer.write_event(Event::Start(start))?;

    if let Some(elevation) = point.elevation {
        write_text_element(writer, &format!("{}ele", prefix), &format_elevation(elevation))?;
    }
    if let Some(time) = &point.time {
        write_text_element(writer, &format!("{}time", prefix), &format_timestamp(time))?;
    }

    writer.write_event(Event::End(BytesEnd::new(tag.as_str())))?;
    Ok(())
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
