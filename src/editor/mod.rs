//! Rope-backed markup buffer.
//!
//! [`XmlBuffer`] is both the text the source pane edits and the document
//! collaborator the synchronizer queries.

mod buffer;

pub use buffer::{Cursor, Direction, XmlBuffer};
