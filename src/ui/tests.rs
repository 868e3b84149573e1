use super::*;
use crate::app::{Message, Model, ModelOptions, update};
use crate::editor::XmlBuffer;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use std::path::PathBuf;

const ONE_ZONE: &str = "<surface>\n  <graphic url=\"p1.png\"/>\n  <zone ulx=\"2\" uly=\"2\" lrx=\"10\" lry=\"8\"/>\n</surface>\n";

fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(80, 24);
    Terminal::new(backend).unwrap()
}

fn create_test_model(text: &str) -> Model {
    let mut model = Model::new(
        PathBuf::from("test.xml"),
        XmlBuffer::from_text(text),
        None,
        ModelOptions::default(),
        (80, 24),
    );
    model.resync();
    model
}

fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.width)
        .map(|x| buffer[(x, y)].symbol().to_string())
        .collect()
}

fn symbol_at(terminal: &Terminal<TestBackend>, x: u16, y: u16) -> String {
    terminal.backend().buffer()[(x, y)].symbol().to_string()
}

#[test]
fn test_render_draws_zone_outline() {
    let model = create_test_model(ONE_ZONE);
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    // Pane border puts the image origin at (1, 1)
    assert_eq!(symbol_at(&terminal, 3, 3), "┌");
    assert_eq!(symbol_at(&terminal, 10, 3), "┐");
    assert_eq!(symbol_at(&terminal, 3, 8), "└");
    assert_eq!(symbol_at(&terminal, 10, 8), "┘");
    assert_eq!(symbol_at(&terminal, 6, 3), "─");
    assert_eq!(symbol_at(&terminal, 3, 5), "│");
}

#[test]
fn test_zoom_scales_outline() {
    let model = update(create_test_model(ONE_ZONE), Message::ZoomIn(0, 0));
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    assert_eq!(symbol_at(&terminal, 5, 5), "┌");
    assert_eq!(symbol_at(&terminal, 20, 16), "┘");
}

#[test]
fn test_status_bar_shows_zone_count_and_cursor() {
    let model = create_test_model(ONE_ZONE);
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    let status = row_text(&terminal, 23);
    assert!(status.contains("test.xml"), "status: {status}");
    assert!(status.contains("zones 1"), "status: {status}");
    assert!(status.contains("zoom 1x"), "status: {status}");
    assert!(status.contains("Ln 1, Col 1"), "status: {status}");
}

#[test]
fn test_source_pane_shows_markup_with_line_numbers() {
    let model = create_test_model(ONE_ZONE);
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    let third = row_text(&terminal, 3);
    assert!(third.contains("3   <zone ulx=\"2\""), "row: {third}");
}

#[test]
fn test_hidden_image_pane_gives_source_full_width() {
    let model = update(create_test_model(ONE_ZONE), Message::ToggleImagePane);
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    let top = row_text(&terminal, 0);
    assert!(!top.contains("no image"), "top: {top}");
    assert!(top.contains("test.xml"), "top: {top}");
    assert!(row_text(&terminal, 23).contains("[image hidden]"));
}

#[test]
fn test_help_overlay_lists_keys() {
    let model = update(create_test_model(ONE_ZONE), Message::ToggleHelp);
    let mut terminal = create_test_terminal();
    terminal.draw(|frame| render(&model, frame)).unwrap();

    let screen: String = (0..24).map(|y| row_text(&terminal, y)).collect();
    assert!(screen.contains("Duplicate active zone"));
    assert!(screen.contains("Remove active zone"));
}

#[test]
fn test_pane_layout_splits_and_reserves_footer() {
    let layout = pane_layout(Rect::new(0, 0, 80, 24), true);
    assert_eq!(layout.image_outer, Some(Rect::new(0, 0, 40, 22)));
    assert_eq!(layout.image, Some(Rect::new(1, 1, 38, 20)));
    assert_eq!(layout.source_outer, Rect::new(40, 0, 40, 22));
    assert_eq!(layout.toast, Rect::new(0, 22, 80, 1));
    assert_eq!(layout.status, Rect::new(0, 23, 80, 1));

    let hidden = pane_layout(Rect::new(0, 0, 80, 24), false);
    assert_eq!(hidden.image, None);
    assert_eq!(hidden.source, Rect::new(1, 1, 78, 20));
}

#[test]
fn test_char_col_at_accounts_for_wide_chars() {
    assert_eq!(char_col_at("abc", 1), 1);
    assert_eq!(char_col_at("abc", 10), 3);
    // Each CJK glyph takes two columns
    assert_eq!(char_col_at("日本語", 0), 0);
    assert_eq!(char_col_at("日本語", 1), 0);
    assert_eq!(char_col_at("日本語", 2), 1);
}

#[test]
fn test_line_number_width_grows_with_digits() {
    assert_eq!(line_number_width(9), 1);
    assert_eq!(line_number_width(10), 2);
    assert_eq!(line_number_width(12_345), 5);
}

#[test]
fn test_zoom_label_uses_fractions_below_one() {
    assert_eq!(zoom_label(2.0), "2x");
    assert_eq!(zoom_label(1.0), "1x");
    assert_eq!(zoom_label(0.25), "1/4x");
}
