//! The document collaborator contract.
//!
//! The synchronizer never touches text directly: everything goes through
//! [`DocumentAccess`], which answers structural zone queries, maps
//! line/column positions to flat character offsets and performs raw edits
//! inside undo groups. [`crate::editor::XmlBuffer`] is the in-crate
//! implementation.

mod listeners;
pub mod scan;

pub use listeners::{Listener, ListenerRegistry, Subscription};

use thiserror::Error;

use crate::markup::{TextRange, ZoneQuery};

/// Change notifications pushed to subscribed listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentNotice {
    /// Text was inserted or deleted.
    Changed,
    /// The caret moved to the given character offset.
    CaretMoved(usize),
}

/// The collaborator could not evaluate a structural query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unsupported query {0}")]
    Unsupported(String),
    #[error("malformed markup at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },
}

/// An offset or line did not exist in the live buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("offset {offset} outside buffer of {len} chars")]
    Offset { offset: usize, len: usize },
    #[error("range {start}..{end} is reversed")]
    Reversed { start: usize, end: usize },
    #[error("line {line} outside buffer of {lines} lines")]
    Line { line: usize, lines: usize },
}

/// Live text buffer as seen by the synchronizer.
///
/// Offsets are character offsets into the whole buffer. Lines and columns in
/// [`TextRange`] are 1-based. Edit groups nest: only the outermost
/// `end_edit_group` closes the undo entry.
pub trait DocumentAccess {
    /// Evaluate a query to strings: coordinate tuples (`"l,t,r,b"`) for
    /// zone-selecting queries, attribute values otherwise.
    fn evaluate(&self, query: &ZoneQuery) -> Result<Vec<String>, QueryError>;

    /// Source spans of whatever the query selects, in document order.
    fn find_ranges(&self, query: &ZoneQuery) -> Result<Vec<TextRange>, QueryError>;

    /// Offset of the first character of a 1-based line.
    fn line_start_offset(&self, line: usize) -> Result<usize, BoundsError>;

    fn text(&self, start: usize, end: usize) -> Result<String, BoundsError>;

    fn len_chars(&self) -> usize;

    fn selected_text(&self) -> Option<String>;

    fn selection(&self) -> Option<(usize, usize)>;

    fn caret(&self) -> usize;

    fn select(&mut self, start: usize, end: usize) -> Result<(), BoundsError>;

    fn begin_edit_group(&mut self);

    fn end_edit_group(&mut self);

    fn insert_text(&mut self, offset: usize, text: &str) -> Result<(), BoundsError>;

    fn delete_text(&mut self, start: usize, end: usize) -> Result<(), BoundsError>;

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    fn subscribe(&mut self, listener: Listener) -> Subscription;

    /// Flat offset of a 1-based (line, column) position.
    fn offset_of(&self, (line, col): (usize, usize)) -> Result<usize, BoundsError> {
        let offset = self.line_start_offset(line)? + col.saturating_sub(1);
        let len = self.len_chars();
        if offset > len {
            return Err(BoundsError::Offset { offset, len });
        }
        Ok(offset)
    }

    /// Flat `start..end` offsets of a range.
    fn offsets(&self, range: &TextRange) -> Result<(usize, usize), BoundsError> {
        Ok((self.offset_of(range.start())?, self.offset_of(range.end())?))
    }
}
