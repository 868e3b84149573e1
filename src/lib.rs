// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. zone::ZoneEvent)
    clippy::module_name_repetitions
)]

//! # Zonemark
//!
//! A terminal editor for facsimile zones: rectangles drawn over a page
//! image, kept in sync with `<zone ulx uly lrx lry/>` elements in an XML
//! file.
//!
//! Dragging a zone in the image pane rewrites its coordinates in the
//! markup; typing in the source pane rebuilds the zones after a short
//! pause, and moving the caret into a `<zone>` makes it active.
//!
//! ## Architecture
//!
//! Zonemark uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: State transitions, including markup edits
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`geometry`]: Document and view coordinates, the zoom transform
//! - [`zone`]: Live zones, drag sessions and overlay painting
//! - [`markup`]: Zone element formatting, attribute edit planning, queries
//! - [`document`]: The text-document seam the synchronizer works through
//! - [`editor`]: The rope-backed XML buffer
//! - [`sync`]: Two-way mirroring between zones and markup
//! - [`scheduler`]: Coalescing timers for deferred resyncs
//! - [`image`]: Image probing and `graphic/@url` resolution
//! - [`ui`]: Terminal UI components
//! - [`app`]: Main application loop and state
//! - [`config`]: Rc-file defaults

pub mod app;
pub mod config;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod image;
pub mod markup;
pub mod scheduler;
pub mod sync;
pub mod ui;
pub mod zone;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::XmlBuffer;
    pub use crate::geometry::{DocPoint, Region, ScaleTransform, ViewPoint};
    pub use crate::sync::MarkupSynchronizer;
    pub use crate::zone::{RegionDecorator, Zone, ZoneEvent, ZoneId};
}
