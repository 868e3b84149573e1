//! The zone markup convention.
//!
//! A zone is persisted as `<zone ulx=".." uly=".." lrx=".." lry=".."/>`.
//! On the read path the four attributes travel as one comma-joined tuple
//! (`"25,25,180,60"`), on the write path as `name="value"` pairs.

mod query;

pub use query::{TextRange, ZoneQuery};

use tracing::warn;

use crate::geometry::Region;

pub const ZONE_ELEMENT: &str = "zone";

/// Coordinate attribute names in tuple order: left, top, right, bottom.
pub const COORDINATE_ATTRS: [&str; 4] = ["ulx", "uly", "lrx", "lry"];

/// Serialize a region as a self-closing zone element.
///
/// Also used for clipboard export.
pub fn zone_element(region: Region) -> String {
    let attrs = COORDINATE_ATTRS
        .iter()
        .map(|name| attribute(name, coordinate(region, name).unwrap_or_default()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("<{ZONE_ELEMENT} {attrs}/>")
}

pub fn attribute(name: &str, value: i32) -> String {
    format!("{name}=\"{value}\"")
}

/// The value `region` gives to a coordinate attribute, by local name.
pub fn coordinate(region: Region, name: &str) -> Option<i32> {
    let local = name.rsplit(':').next().unwrap_or(name);
    match local {
        "ulx" => Some(region.left),
        "uly" => Some(region.top),
        "lrx" => Some(region.right),
        "lry" => Some(region.bottom),
        _ => None,
    }
}

/// Name part of an attribute's source text (`ulx` for `ulx = '3'`).
pub fn attribute_name(source: &str) -> Option<&str> {
    let (name, _) = source.split_once('=')?;
    let name = name.trim();
    (!name.is_empty()).then_some(name)
}

/// Numeric value of an attribute's source text, quotes and padding
/// stripped: `ulx = '025'` reads as 25.
pub fn attribute_value(source: &str) -> Option<i32> {
    let (_, value) = source.split_once('=')?;
    let value = value.trim();
    let unquoted = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))?;
    unquoted.trim().parse().ok()
}

/// Parse the tuples returned for a zone query.
///
/// Each input slot yields one output slot so document ordinals are kept;
/// tuples that do not parse become `None` and are logged.
pub fn parse_tuples(tuples: &[String]) -> Vec<Option<Region>> {
    tuples
        .iter()
        .enumerate()
        .map(|(ordinal, tuple)| match tuple.parse::<Region>() {
            Ok(region) => Some(region),
            Err(err) => {
                warn!(ordinal, %tuple, %err, "skipping zone with unreadable coordinates");
                None
            }
        })
        .collect()
}

/// One replacement against the flat character offsets of a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextEdit {
    /// Change in buffer length once this edit is applied.
    #[allow(clippy::cast_possible_wrap)]
    pub fn delta(&self) -> isize {
        self.text.chars().count() as isize - (self.end - self.start) as isize
    }
}

/// Work out the attribute rewrites that move a zone element to `updated`.
///
/// `attrs` holds each attribute's offsets and current source text. Attributes
/// whose value already equals the target produce no edit, whatever their
/// quoting or padding, so an unchanged region plans nothing at all.
pub fn plan_attribute_edits(attrs: &[(usize, usize, String)], updated: Region) -> Vec<TextEdit> {
    attrs
        .iter()
        .filter_map(|(start, end, source)| {
            let name = attribute_name(source)?;
            let value = coordinate(updated, name)?;
            (attribute_value(source) != Some(value)).then(|| TextEdit {
                start: *start,
                end: *end,
                text: attribute(name, value),
            })
        })
        .collect()
}
