use crate::app::{Focus, Model, ToastLevel};
use crate::editor::Direction;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
/// Pointer positions are cells relative to the image pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Image pane pointer
    /// Button pressed: grab a handle or start drawing
    PointerDown(u16, u16),
    /// Pointer moved with the button held
    PointerDrag(u16, u16),
    /// Button released: commit the gesture
    PointerUp,
    /// Pointer moved with no button held
    PointerMoved(u16, u16),
    /// Activate the smallest zone under a pane cell
    SelectAt(u16, u16),

    // Image pane view
    /// Double the scale around a pane cell
    ZoomIn(u16, u16),
    /// Halve the scale around a pane cell
    ZoomOut(u16, u16),
    /// Largest power-of-two scale showing the whole image
    ZoomFit,
    /// Pan by view units
    Pan(i32, i32),
    /// Show or hide the image pane
    ToggleImagePane,

    // Zones
    /// Copy the active zone below itself
    DuplicateZone,
    /// Delete the active zone and its markup
    RemoveZone,
    /// Copy the active zone's element to the clipboard
    CopyZone,
    /// Deselect the active zone
    ClearActive,

    // Source pane
    /// Insert a character at the cursor
    EditorInsertChar(char),
    /// Delete character before cursor (Backspace)
    EditorDeleteBack,
    /// Delete character at cursor (Delete)
    EditorDeleteForward,
    /// Split line at cursor (Enter)
    EditorSplitLine,
    /// Move cursor in a direction
    EditorMoveCursor(Direction),
    /// Move cursor to beginning of line (Home)
    EditorMoveHome,
    /// Move cursor to end of line (End)
    EditorMoveEnd,
    /// Move cursor to start of buffer (Ctrl+Home)
    EditorMoveToStart,
    /// Move cursor to end of buffer (Ctrl+End)
    EditorMoveToEnd,
    /// Move cursor to absolute position (line, col) - e.g. from mouse click
    EditorMoveTo(usize, usize),
    /// Scroll source viewport up by n lines
    EditorScrollUp(usize),
    /// Scroll source viewport down by n lines
    EditorScrollDown(usize),
    /// Revert the last edit group
    Undo,
    /// Write the buffer to the markup file
    Save,

    // Application
    /// Switch keyboard focus between panes
    SwitchFocus,
    /// Focus a specific pane
    Focus(Focus),
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Re-read the markup file from disk
    ForceReload,
    /// Terminal resized
    Resize(u16, u16),
    /// Redraw screen
    Redraw,
    /// Quit the application
    Quit,
}

/// Updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. Zone
/// gestures are mirrored into the markup buffer before returning; file and
/// clipboard I/O happens in the side-effect pass.
pub fn update(mut model: Model, msg: Message) -> Model {
    // Reset the quit confirmation on any action other than quitting or saving.
    if !matches!(msg, Message::Quit | Message::Save) {
        model.quit_confirmed = false;
    }
    let follows_caret = matches!(
        msg,
        Message::EditorInsertChar(_)
            | Message::EditorDeleteBack
            | Message::EditorDeleteForward
            | Message::EditorSplitLine
            | Message::EditorMoveCursor(_)
            | Message::EditorMoveHome
            | Message::EditorMoveEnd
            | Message::EditorMoveToStart
            | Message::EditorMoveToEnd
            | Message::Undo
    );

    match msg {
        // Image pane pointer
        Message::PointerDown(col, row) => {
            model.focus = Focus::Image;
            let at = model.viewport.screen_to_view(col, row);
            model.decorator.pointer_down(at, model.viewport.scale());
        }
        Message::SelectAt(col, row) => {
            model.focus = Focus::Image;
            let at = model.viewport.screen_to_document(col, row);
            let hit = model.decorator.zone_at(at).map(|zone| zone.id);
            model.decorator.set_active(hit);
        }
        Message::PointerDrag(col, row) => {
            let at = model.viewport.screen_to_view(col, row);
            model.decorator.pointer_drag(at, model.viewport.scale());
        }
        Message::PointerUp => {
            if let Some(outcome) = model.decorator.pointer_up(model.viewport.scale()) {
                tracing::debug!(?outcome, "gesture finished");
            }
            model.apply_zone_events();
        }
        Message::PointerMoved(col, row) => {
            let at = model.viewport.screen_to_view(col, row);
            model.decorator.pointer_moved(at, model.viewport.scale());
        }

        // Image pane view
        Message::ZoomIn(col, row) => {
            if !model.viewport.zoom_in_at(col, row) {
                model.show_toast(ToastLevel::Info, "Maximum zoom");
            }
        }
        Message::ZoomOut(col, row) => {
            if !model.viewport.zoom_out_at(col, row) {
                model.show_toast(ToastLevel::Info, "Minimum zoom");
            }
        }
        Message::ZoomFit => model.viewport.zoom_to_fit(),
        Message::Pan(dx, dy) => model.viewport.scroll_by(dx, dy),
        Message::ToggleImagePane => {
            let visible = !model.viewport.is_visible();
            model.set_image_visible(visible);
        }

        // Zones
        Message::DuplicateZone => match model.decorator.active() {
            Some(id) => {
                let bounds = model.image_bounds();
                if model.decorator.duplicate(id, bounds).is_some() {
                    model.apply_zone_events();
                } else {
                    model.show_toast(ToastLevel::Warning, "No room for a copy inside the image");
                }
            }
            None => model.show_toast(ToastLevel::Info, "No active zone"),
        },
        Message::RemoveZone => match model.decorator.active() {
            Some(id) => {
                model.decorator.remove(id);
                model.apply_zone_events();
            }
            None => model.show_toast(ToastLevel::Info, "No active zone"),
        },
        Message::ClearActive => {
            model.decorator.set_active(None);
        }

        // Source pane
        Message::EditorInsertChar(ch) => model.buffer.insert_char(ch),
        Message::EditorDeleteBack => {
            model.buffer.delete_back();
        }
        Message::EditorDeleteForward => {
            model.buffer.delete_forward();
        }
        Message::EditorSplitLine => model.buffer.split_line(),
        Message::EditorMoveCursor(dir) => model.buffer.move_cursor(dir),
        Message::EditorMoveHome => model.buffer.move_home(),
        Message::EditorMoveEnd => model.buffer.move_end(),
        Message::EditorMoveToStart => model.buffer.move_to_start(),
        Message::EditorMoveToEnd => model.buffer.move_to_end(),
        Message::EditorMoveTo(line, col) => {
            model.focus = Focus::Source;
            model.buffer.move_to(line, col);
        }
        Message::EditorScrollUp(n) => model.source_view.scroll_up(n),
        Message::EditorScrollDown(n) => model.source_view.scroll_down(n),
        Message::Undo => {
            if !model.buffer.undo() {
                model.show_toast(ToastLevel::Info, "Nothing to undo");
            }
        }

        // Application
        Message::SwitchFocus => {
            model.focus = match model.focus {
                Focus::Image => Focus::Source,
                Focus::Source if model.viewport.is_visible() => Focus::Image,
                Focus::Source => Focus::Source,
            };
        }
        Message::Focus(focus) => model.focus = focus,
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }
        Message::Resize(width, height) => model.set_terminal_size(width, height),
        Message::Quit => {
            if model.buffer.is_dirty() && !model.quit_confirmed {
                model.show_toast(
                    ToastLevel::Warning,
                    "Unsaved changes! Press q again to quit, or Ctrl+S to save",
                );
                model.quit_confirmed = true;
            } else {
                model.should_quit = true;
            }
        }
        // CopyZone/Save/ForceReload: handled in effects (I/O)
        // Redraw: no state change needed
        Message::CopyZone | Message::Save | Message::ForceReload | Message::Redraw => {}
    }

    if follows_caret {
        model.source_view.set_total_lines(model.buffer.line_count());
        model.follow_caret();
    }
    model
}
