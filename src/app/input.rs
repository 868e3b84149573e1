use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Focus, Message, Model};
use crate::editor::Direction;
use crate::ui::PaneLayout;

use super::event_loop::ResizeDebouncer;

/// View units per pan key press.
const PAN_STEP: i32 = 4;
/// Source lines per wheel notch.
const SCROLL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Resize(w, h) => {
                tracing::trace!(width = w, height = h, "resize queued");
                resize_debouncer.queue(*w, *h, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return None;
        }
        let layout = current_layout(model);

        if let Some(image) = layout.image {
            let in_image = point_in_rect(mouse.column, mouse.row, image);
            // Drags keep reporting outside the pane so a zone can be pulled
            // past the edge.
            let col = mouse.column.saturating_sub(image.x);
            let row = mouse.row.saturating_sub(image.y);
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) if in_image => {
                    return Some(Message::PointerDown(col, row));
                }
                MouseEventKind::Down(MouseButton::Right) if in_image => {
                    return Some(Message::SelectAt(col, row));
                }
                MouseEventKind::Drag(MouseButton::Left) if model.decorator.is_dragging() => {
                    return Some(Message::PointerDrag(col, row));
                }
                MouseEventKind::Up(MouseButton::Left) if model.decorator.is_dragging() => {
                    return Some(Message::PointerUp);
                }
                MouseEventKind::Moved if in_image => {
                    return Some(Message::PointerMoved(col, row));
                }
                MouseEventKind::ScrollUp if in_image => {
                    return Some(wheel_over_image(mouse.modifiers, col, row, -1));
                }
                MouseEventKind::ScrollDown if in_image => {
                    return Some(wheel_over_image(mouse.modifiers, col, row, 1));
                }
                _ => {}
            }
        }

        if !point_in_rect(mouse.column, mouse.row, layout.source) {
            return None;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let line = model.source_view.offset() + usize::from(mouse.row - layout.source.y);
                let line = line.min(model.buffer.line_count().saturating_sub(1));
                let gutter = usize::from(crate::ui::line_number_width(model.buffer.line_count())) + 1;
                let display_col =
                    usize::from(mouse.column - layout.source.x).saturating_sub(gutter);
                let text = model.buffer.line_at(line).unwrap_or_default();
                Some(Message::EditorMoveTo(
                    line,
                    crate::ui::char_col_at(&text, display_col),
                ))
            }
            MouseEventKind::ScrollUp => Some(Message::EditorScrollUp(SCROLL_LINES)),
            MouseEventKind::ScrollDown => Some(Message::EditorScrollDown(SCROLL_LINES)),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return Some(Message::HideHelp);
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global shortcuts
        match key.code {
            KeyCode::Char('q' | 'c') if ctrl => return Some(Message::Quit),
            KeyCode::Char('s') if ctrl => return Some(Message::Save),
            KeyCode::Char('z') if ctrl => return Some(Message::Undo),
            KeyCode::Char('r') if ctrl => return Some(Message::ForceReload),
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::F(2) => return Some(Message::ToggleImagePane),
            KeyCode::Tab => return Some(Message::SwitchFocus),
            _ => {}
        }

        match model.focus {
            Focus::Image if model.viewport.is_visible() => Self::handle_image_key(key, model),
            _ => Self::handle_source_key(key),
        }
    }

    fn handle_image_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let (cx, cy) = (model.viewport.width() / 2, model.viewport.height() / 2);
        match key.code {
            KeyCode::Char('+' | '=') => Some(Message::ZoomIn(cx, cy)),
            KeyCode::Char('-') => Some(Message::ZoomOut(cx, cy)),
            KeyCode::Char('0') => Some(Message::ZoomFit),
            KeyCode::Char('h') | KeyCode::Left => Some(Message::Pan(-PAN_STEP, 0)),
            KeyCode::Char('l') | KeyCode::Right => Some(Message::Pan(PAN_STEP, 0)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::Pan(0, -PAN_STEP)),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::Pan(0, PAN_STEP)),
            KeyCode::Char('d') => Some(Message::DuplicateZone),
            KeyCode::Char('x') | KeyCode::Delete => Some(Message::RemoveZone),
            KeyCode::Char('y') => Some(Message::CopyZone),
            KeyCode::Char('r') => Some(Message::ForceReload),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Esc => Some(Message::ClearActive),
            _ => None,
        }
    }

    fn handle_source_key(key: KeyEvent) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Home if ctrl => Some(Message::EditorMoveToStart),
            KeyCode::End if ctrl => Some(Message::EditorMoveToEnd),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                Some(Message::EditorInsertChar(c))
            }
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::PageUp => Some(Message::EditorScrollUp(SCROLL_LINES * 5)),
            KeyCode::PageDown => Some(Message::EditorScrollDown(SCROLL_LINES * 5)),
            KeyCode::Esc => Some(Message::Focus(Focus::Image)),
            _ => None,
        }
    }

    pub(super) fn view(model: &Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}

/// Ctrl zooms at the pointer, Shift pans sideways, plain wheel pans up/down.
fn wheel_over_image(modifiers: KeyModifiers, col: u16, row: u16, dir: i32) -> Message {
    if modifiers.contains(KeyModifiers::CONTROL) {
        if dir < 0 {
            Message::ZoomIn(col, row)
        } else {
            Message::ZoomOut(col, row)
        }
    } else if modifiers.contains(KeyModifiers::SHIFT) {
        Message::Pan(dir * PAN_STEP, 0)
    } else {
        Message::Pan(0, dir * PAN_STEP)
    }
}

fn current_layout(model: &Model) -> PaneLayout {
    let (w, h) = model.terminal_size();
    crate::ui::pane_layout(Rect::new(0, 0, w, h), model.viewport.is_visible())
}

fn point_in_rect(col: u16, row: u16, rect: Rect) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_ctrl_s_saves_from_either_pane() {
        let mut model = Model::default();
        assert_eq!(
            App::handle_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL), &model),
            Some(Message::Save)
        );
        model.focus = Focus::Source;
        assert_eq!(
            App::handle_key(key(KeyCode::Char('s'), KeyModifiers::CONTROL), &model),
            Some(Message::Save)
        );
    }

    #[test]
    fn test_letters_insert_in_source_focus() {
        let mut model = Model::default();
        model.focus = Focus::Source;
        assert_eq!(
            App::handle_key(key(KeyCode::Char('d'), KeyModifiers::NONE), &model),
            Some(Message::EditorInsertChar('d'))
        );
    }

    #[test]
    fn test_letters_act_on_zones_in_image_focus() {
        let model = Model::default();
        assert_eq!(
            App::handle_key(key(KeyCode::Char('d'), KeyModifiers::NONE), &model),
            Some(Message::DuplicateZone)
        );
        assert_eq!(
            App::handle_key(key(KeyCode::Delete, KeyModifiers::NONE), &model),
            Some(Message::RemoveZone)
        );
    }

    #[test]
    fn test_any_key_hides_help() {
        let mut model = Model::default();
        model.help_visible = true;
        assert_eq!(
            App::handle_key(key(KeyCode::Char('x'), KeyModifiers::NONE), &model),
            Some(Message::HideHelp)
        );
    }

    #[test]
    fn test_press_in_image_pane_is_pane_relative() {
        let model = Model::default();
        let layout = current_layout(&model);
        let image = layout.image.unwrap();
        let msg = App::handle_mouse(
            mouse(
                MouseEventKind::Down(MouseButton::Left),
                image.x + 3,
                image.y + 2,
            ),
            &model,
        );
        assert_eq!(msg, Some(Message::PointerDown(3, 2)));
    }

    #[test]
    fn test_right_click_in_image_pane_selects() {
        let model = Model::default();
        let image = current_layout(&model).image.unwrap();
        let msg = App::handle_mouse(
            mouse(
                MouseEventKind::Down(MouseButton::Right),
                image.x + 5,
                image.y + 4,
            ),
            &model,
        );
        assert_eq!(msg, Some(Message::SelectAt(5, 4)));
    }

    #[test]
    fn test_right_click_outside_image_pane_is_ignored() {
        let model = Model::default();
        let layout = current_layout(&model);
        let msg = App::handle_mouse(
            mouse(
                MouseEventKind::Down(MouseButton::Right),
                layout.source.x + 2,
                layout.source.y + 2,
            ),
            &model,
        );
        assert_eq!(msg, None);
    }

    #[test]
    fn test_release_without_drag_is_ignored() {
        let model = Model::default();
        let image = current_layout(&model).image.unwrap();
        let msg = App::handle_mouse(
            mouse(MouseEventKind::Up(MouseButton::Left), image.x, image.y),
            &model,
        );
        assert_eq!(msg, None);
    }

    #[test]
    fn test_ctrl_wheel_zooms_at_pointer() {
        let msg = wheel_over_image(KeyModifiers::CONTROL, 5, 6, -1);
        assert_eq!(msg, Message::ZoomIn(5, 6));
        let msg = wheel_over_image(KeyModifiers::NONE, 5, 6, 1);
        assert_eq!(msg, Message::Pan(0, PAN_STEP));
    }

    #[test]
    fn test_click_in_source_moves_cursor() {
        let model = Model::default();
        let source = current_layout(&model).source;
        let msg = App::handle_mouse(
            mouse(
                MouseEventKind::Down(MouseButton::Left),
                source.x + 2,
                source.y,
            ),
            &model,
        );
        // One-digit gutter plus a space; the empty line clamps to column 0
        assert_eq!(msg, Some(Message::EditorMoveTo(0, 0)));
    }
}
