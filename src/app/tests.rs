use std::path::PathBuf;

use tempfile::tempdir;

use crate::editor::XmlBuffer;
use crate::geometry::Region;
use crate::scheduler::SyncTask;

use super::{App, Focus, Message, Model, ModelOptions, update};

const ONE_ZONE: &str = "<surface>\n  <graphic url=\"p1.png\"/>\n  <zone ulx=\"2\" uly=\"2\" lrx=\"10\" lry=\"8\"/>\n</surface>\n";

fn model_from(text: &str) -> Model {
    let mut model = Model::new(
        PathBuf::from("test.xml"),
        XmlBuffer::from_text(text),
        None,
        ModelOptions::default(),
        (80, 24),
    );
    model.resync();
    // Drop the notices the initial load produced
    model.pump_notices(0);
    model.scheduler.clear();
    model
}

fn drag(model: Model, from: (u16, u16), to: (u16, u16)) -> Model {
    let model = update(model, Message::PointerDown(from.0, from.1));
    let model = update(model, Message::PointerDrag(to.0, to.1));
    update(model, Message::PointerUp)
}

#[test]
fn test_model_loads_zones_from_markup() {
    let model = model_from(ONE_ZONE);
    assert_eq!(model.decorator.zones().len(), 1);
    assert_eq!(model.decorator.zones()[0].region, Region::new(2, 2, 10, 8));
    assert!(!model.buffer.is_dirty());
}

#[test]
fn test_corner_drag_rewrites_lower_right() {
    let model = drag(model_from(ONE_ZONE), (10, 8), (20, 15));
    assert_eq!(
        model.buffer.contents(),
        ONE_ZONE.replace("lrx=\"10\" lry=\"8\"", "lrx=\"20\" lry=\"15\"")
    );
    assert_eq!(model.decorator.zones()[0].region, Region::new(2, 2, 20, 15));
    assert_eq!(model.decorator.active(), Some(model.decorator.zones()[0].id));
    assert!(model.buffer.is_dirty());
}

#[test]
fn test_drawing_inserts_after_closest_zone() {
    let model = drag(model_from(ONE_ZONE), (20, 10), (30, 18));
    assert_eq!(model.decorator.zones().len(), 2);
    assert_eq!(
        model.buffer.contents(),
        "<surface>\n  <graphic url=\"p1.png\"/>\n  <zone ulx=\"2\" uly=\"2\" lrx=\"10\" lry=\"8\"/>\n  <zone ulx=\"20\" uly=\"10\" lrx=\"30\" lry=\"18\"/>\n</surface>\n"
    );
}

#[test]
fn test_click_without_drag_adds_nothing() {
    let model = update(model_from(ONE_ZONE), Message::PointerDown(25, 12));
    let model = update(model, Message::PointerUp);
    assert_eq!(model.decorator.zones().len(), 1);
    assert_eq!(model.buffer.contents(), ONE_ZONE);
}

#[test]
fn test_sync_edits_do_not_schedule_reload() {
    let mut model = drag(model_from(ONE_ZONE), (10, 8), (20, 15));
    model.pump_notices(0);
    assert!(!model.is_task_pending(SyncTask::ReloadZones));
}

#[test]
fn test_typing_schedules_reload() {
    let mut model = model_from(ONE_ZONE);
    model.focus = Focus::Source;
    let mut model = update(model, Message::EditorInsertChar(' '));
    assert!(model.pump_notices(1_000));
    assert!(model.is_task_pending(SyncTask::ReloadZones));
    assert_eq!(model.next_deadline(), Some(1_000 + model.options().caret_delay_ms));

    assert!(!model.run_due(1_000 + model.options().caret_delay_ms - 1));
    assert!(model.run_due(1_000 + model.options().reload_delay_ms));
    assert!(model.scheduler.is_idle());
}

#[test]
fn test_repeated_edits_coalesce_into_one_reload() {
    let mut model = model_from(ONE_ZONE);
    model.buffer.insert_char(' ');
    model.pump_notices(0);
    model.buffer.insert_char(' ');
    model.pump_notices(500);
    // Rescheduled from the second edit
    assert!(model.scheduler.take_due(800).is_empty());
    assert!(model.is_task_pending(SyncTask::ReloadZones));
}

#[test]
fn test_reload_picks_up_typed_zone() {
    let mut model = model_from(ONE_ZONE);
    model.buffer.replace_all(&ONE_ZONE.replace(
        "</surface>",
        "  <zone ulx=\"1\" uly=\"1\" lrx=\"4\" lry=\"4\"/>\n</surface>",
    ));
    model.pump_notices(0);
    assert!(model.run_due(model.options().reload_delay_ms));
    assert_eq!(model.decorator.zones().len(), 2);
}

#[test]
fn test_hidden_pane_defers_reload_until_shown() {
    let mut model = model_from(ONE_ZONE);
    model = update(model, Message::ToggleImagePane);
    assert!(!model.viewport.is_visible());
    assert_eq!(model.focus, Focus::Source);

    model.buffer.replace_all("<surface>\n</surface>\n");
    model.pump_notices(0);
    assert!(!model.run_due(10_000));
    assert!(model.resync_pending());
    assert_eq!(model.decorator.zones().len(), 1);

    let model = update(model, Message::ToggleImagePane);
    assert!(model.viewport.is_visible());
    assert!(!model.resync_pending());
    assert!(model.decorator.zones().is_empty());
}

#[test]
fn test_showing_pane_without_dropped_work_keeps_zones() {
    let mut model = model_from(ONE_ZONE);
    let id = model.decorator.zones()[0].id;
    model.decorator.set_active(Some(id));
    model = update(model, Message::ToggleImagePane);
    assert!(!model.resync_pending());

    let model = update(model, Message::ToggleImagePane);
    assert!(model.viewport.is_visible());
    assert_eq!(model.decorator.active(), Some(id));
    assert_eq!(model.decorator.zones()[0].id, id);
}

#[test]
fn test_right_click_selects_innermost_zone() {
    const NESTED: &str = "<surface>\n  <zone ulx=\"0\" uly=\"0\" lrx=\"40\" lry=\"20\"/>\n  <zone ulx=\"10\" uly=\"5\" lrx=\"20\" lry=\"10\"/>\n</surface>\n";
    let model = model_from(NESTED);
    let inner = model.decorator.zones()[1].id;
    let image = crate::ui::pane_layout(ratatui::layout::Rect::new(0, 0, 80, 24), true)
        .image
        .unwrap();
    let event = crossterm::event::MouseEvent {
        kind: crossterm::event::MouseEventKind::Down(crossterm::event::MouseButton::Right),
        column: image.x + 15,
        row: image.y + 7,
        modifiers: crossterm::event::KeyModifiers::NONE,
    };
    let msg = App::handle_mouse(event, &model).unwrap();
    assert_eq!(msg, Message::SelectAt(15, 7));

    let model = update(model, msg);
    assert_eq!(model.focus, Focus::Image);
    assert_eq!(model.decorator.active(), Some(inner));
}

#[test]
fn test_right_click_on_empty_image_clears_active() {
    let mut model = model_from(ONE_ZONE);
    let id = model.decorator.zones()[0].id;
    model.decorator.set_active(Some(id));
    let model = update(model, Message::SelectAt(30, 18));
    assert!(model.decorator.active().is_none());
}

#[test]
fn test_remove_deletes_element() {
    let mut model = model_from(ONE_ZONE);
    let id = model.decorator.zones()[0].id;
    model.decorator.set_active(Some(id));
    let model = update(model, Message::RemoveZone);
    assert!(model.decorator.zones().is_empty());
    assert_eq!(
        model.buffer.contents(),
        "<surface>\n  <graphic url=\"p1.png\"/>\n  \n</surface>\n"
    );
}

#[test]
fn test_remove_without_active_zone_is_noop() {
    let model = update(model_from(ONE_ZONE), Message::RemoveZone);
    assert_eq!(model.decorator.zones().len(), 1);
    assert_eq!(model.buffer.contents(), ONE_ZONE);
    assert!(model.active_toast().is_some());
}

#[test]
fn test_duplicate_places_copy_below() {
    let mut model = model_from(ONE_ZONE);
    let id = model.decorator.zones()[0].id;
    model.decorator.set_active(Some(id));
    let model = update(model, Message::DuplicateZone);
    assert_eq!(model.decorator.zones().len(), 2);
    assert!(
        model
            .buffer
            .contents()
            .contains("<zone ulx=\"2\" uly=\"10\" lrx=\"10\" lry=\"16\"/>")
    );
}

#[test]
fn test_undo_reverts_a_drag_in_one_step() {
    let model = drag(model_from(ONE_ZONE), (10, 8), (20, 15));
    let model = update(model, Message::Undo);
    assert_eq!(model.buffer.contents(), ONE_ZONE);
}

#[test]
fn test_quit_with_unsaved_changes_needs_confirmation() {
    let mut model = model_from(ONE_ZONE);
    model.buffer.insert_char(' ');

    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
    assert!(model.active_toast().is_some());

    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_other_message_resets_quit_confirmation() {
    let mut model = model_from(ONE_ZONE);
    model.buffer.insert_char(' ');
    let model = update(model, Message::Quit);
    let model = update(model, Message::ToggleHelp);
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
}

#[test]
fn test_clean_buffer_quits_immediately() {
    let model = update(model_from(ONE_ZONE), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_switch_focus_skips_hidden_image_pane() {
    let model = update(model_from(ONE_ZONE), Message::SwitchFocus);
    assert_eq!(model.focus, Focus::Source);
    let model = update(model, Message::SwitchFocus);
    assert_eq!(model.focus, Focus::Image);

    let model = update(model, Message::ToggleImagePane);
    let model = update(model, Message::SwitchFocus);
    assert_eq!(model.focus, Focus::Source);
}

#[test]
fn test_resize_reflows_panes() {
    let model = update(model_from(ONE_ZONE), Message::Resize(120, 40));
    assert_eq!(model.terminal_size(), (120, 40));
    assert_eq!(model.viewport.width(), 58);
    assert_eq!(model.viewport.height(), 36);
}

#[test]
fn test_zoom_in_doubles_scale() {
    let model = update(model_from(ONE_ZONE), Message::ZoomIn(0, 0));
    assert!((model.viewport.scale().scale() - 2.0).abs() < f64::EPSILON);
    let model = update(model, Message::ZoomOut(0, 0));
    assert!((model.viewport.scale().scale() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_save_writes_buffer_and_clears_dirty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("page.xml");
    std::fs::write(&path, ONE_ZONE).unwrap();

    let mut model = model_from(ONE_ZONE);
    model.file_path.clone_from(&path);
    let mut model = drag(model, (10, 8), (20, 15));
    App::handle_message_side_effects(&mut model, &Message::Save);

    assert!(!model.buffer.is_dirty());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("lrx=\"20\" lry=\"15\""));
}

#[test]
fn test_force_reload_reads_disk_and_resyncs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("page.xml");
    std::fs::write(&path, ONE_ZONE).unwrap();

    let mut model = model_from(ONE_ZONE);
    model.file_path.clone_from(&path);
    std::fs::write(&path, "<surface>\n</surface>\n").unwrap();
    App::handle_message_side_effects(&mut model, &Message::ForceReload);

    assert_eq!(model.buffer.contents(), "<surface>\n</surface>\n");
    assert!(model.decorator.zones().is_empty());
}

#[test]
fn test_failed_save_shows_error() {
    let dir = tempdir().unwrap();
    let mut model = model_from(ONE_ZONE);
    model.file_path = dir.path().join("missing").join("page.xml");
    App::handle_message_side_effects(&mut model, &Message::Save);
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, super::ToastLevel::Error);
    assert!(message.starts_with("Save failed"));
}
