use std::fmt;

use crate::geometry::Region;

use super::{COORDINATE_ATTRS, ZONE_ELEMENT};

/// Structural predicate understood by a [`crate::document::DocumentAccess`]
/// collaborator.
///
/// Rendered through `Display` as the equivalent XPath, which is what ends up
/// in logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneQuery {
    /// Every zone element, in document order.
    Zones,
    /// Zone elements whose four coordinate attributes read exactly `region`.
    ZoneAt(Region),
    /// The zone element at a zero-based document ordinal.
    NthZone(usize),
    /// The coordinate attributes of the zones selected by the inner query.
    Coordinates(Box<ZoneQuery>),
    /// Innermost zone element enclosing the caret.
    EnclosingZone,
    /// Image reference element (`graphic`) whose `url` equals the value.
    GraphicByUrl(String),
}

impl ZoneQuery {
    pub fn coordinates(inner: Self) -> Self {
        Self::Coordinates(Box::new(inner))
    }

    /// Whether the query selects zone elements (and so evaluates to
    /// coordinate tuples).
    pub fn selects_zones(&self) -> bool {
        matches!(
            self,
            Self::Zones | Self::ZoneAt(_) | Self::NthZone(_) | Self::EnclosingZone
        )
    }
}

impl fmt::Display for ZoneQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zones => write!(f, "//{ZONE_ELEMENT}"),
            Self::ZoneAt(r) => {
                let [ulx, uly, lrx, lry] = COORDINATE_ATTRS;
                write!(
                    f,
                    "//{ZONE_ELEMENT}[@{ulx}='{}'][@{uly}='{}'][@{lrx}='{}'][@{lry}='{}']",
                    r.left, r.top, r.right, r.bottom
                )
            }
            Self::NthZone(n) => write!(f, "(//{ZONE_ELEMENT})[{}]", n + 1),
            Self::Coordinates(inner) => {
                let names = COORDINATE_ATTRS
                    .iter()
                    .map(|name| format!("local-name()='{name}'"))
                    .collect::<Vec<_>>()
                    .join(" or ");
                write!(f, "{inner}/@*[{names}]")
            }
            Self::EnclosingZone => write!(f, "ancestor-or-self::{ZONE_ELEMENT}[1]"),
            Self::GraphicByUrl(url) => write!(f, "//*:graphic[@url='{url}']"),
        }
    }
}

/// A span of buffer text as reported by the query collaborator.
///
/// Lines and columns are 1-based; the end position is the one just after
/// the last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TextRange {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl TextRange {
    pub const fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    pub const fn start(&self) -> (usize, usize) {
        (self.start_line, self.start_col)
    }

    pub const fn end(&self) -> (usize, usize) {
        (self.end_line, self.end_col)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_at_renders_exact_match_predicate() {
        let q = ZoneQuery::ZoneAt(Region::new(25, 25, 180, 60));
        assert_eq!(
            q.to_string(),
            "//zone[@ulx='25'][@uly='25'][@lrx='180'][@lry='60']"
        );
    }

    #[test]
    fn test_coordinates_wraps_inner_query() {
        let q = ZoneQuery::coordinates(ZoneQuery::NthZone(0));
        assert_eq!(
            q.to_string(),
            "(//zone)[1]/@*[local-name()='ulx' or local-name()='uly' or local-name()='lrx' or local-name()='lry']"
        );
        assert!(!q.selects_zones());
    }

    #[test]
    fn test_graphic_lookup_uses_wildcard_namespace() {
        let q = ZoneQuery::GraphicByUrl("folio-12r.png".to_string());
        assert_eq!(q.to_string(), "//*:graphic[@url='folio-12r.png']");
    }

    #[test]
    fn test_ranges_order_by_start_then_end() {
        let a = TextRange::new(1, 10, 1, 20);
        let b = TextRange::new(2, 1, 2, 5);
        let c = TextRange::new(1, 3, 1, 8);
        let mut v = vec![a, b, c];
        v.sort();
        assert_eq!(v, vec![c, a, b]);
    }
}
