use zonemark::document::DocumentAccess;
use zonemark::editor::XmlBuffer;
use zonemark::geometry::{Region, ScaleTransform, ViewPoint};
use zonemark::sync::MarkupSynchronizer;
use zonemark::zone::{DecoratorOptions, RegionDecorator, ZoneEvent};

const PAGE: &str = "<facsimile>\n  <surface>\n    <graphic url=\"p1.png\"/>\n    <zone ulx=\"25\" uly=\"25\" lrx=\"180\" lry=\"60\"/>\n  </surface>\n</facsimile>\n";

struct Session {
    buffer: XmlBuffer,
    decorator: RegionDecorator,
    sync: MarkupSynchronizer,
    scale: ScaleTransform,
}

impl Session {
    fn load(text: &str) -> Self {
        let buffer = XmlBuffer::from_text(text);
        let mut decorator = RegionDecorator::new(DecoratorOptions::default());
        let mut sync = MarkupSynchronizer::new(Some("p1.png".to_string()));
        sync.reload(&buffer, &mut decorator).unwrap();
        Self {
            buffer,
            decorator,
            sync,
            scale: ScaleTransform::identity(),
        }
    }

    fn drag(&mut self, from: (i32, i32), to: (i32, i32)) {
        let scale = self.scale;
        self.decorator
            .pointer_down(ViewPoint::new(from.0, from.1), &scale);
        self.decorator.pointer_drag(ViewPoint::new(to.0, to.1), &scale);
        self.decorator.pointer_up(&scale);
        self.flush();
    }

    fn flush(&mut self) {
        for event in self.decorator.take_events() {
            self.sync
                .apply(&mut self.buffer, &mut self.decorator, &event)
                .unwrap();
        }
    }
}

#[test]
fn test_corner_drag_rewrites_lower_right_only() {
    let mut s = Session::load(PAGE);
    s.drag((180, 60), (190, 70));

    assert_eq!(
        s.buffer.contents(),
        PAGE.replace("lrx=\"180\" lry=\"60\"", "lrx=\"190\" lry=\"70\"")
    );
    assert_eq!(s.decorator.zones()[0].region, Region::new(25, 25, 190, 70));
    assert_eq!(
        s.buffer.selected_text().as_deref(),
        Some("ulx=\"25\" uly=\"25\" lrx=\"190\" lry=\"70\"")
    );
}

#[test]
fn test_drag_at_double_zoom_maps_back_to_document() {
    let mut s = Session::load(PAGE);
    s.scale = ScaleTransform::from_exponent(1);
    s.drag((50, 50), (40, 30));

    assert!(s.buffer.contents().contains("<zone ulx=\"20\" uly=\"15\" lrx=\"180\" lry=\"60\"/>"));
}

#[test]
fn test_markup_reload_after_external_edit() {
    let mut s = Session::load(PAGE);
    s.drag((180, 60), (190, 70));
    let count = s.sync.reload(&s.buffer, &mut s.decorator).unwrap();
    assert_eq!(count, 1);
    assert_eq!(s.decorator.zones()[0].region, Region::new(25, 25, 190, 70));
}

#[test]
fn test_unchanged_update_is_idempotent() {
    let mut s = Session::load(PAGE);
    let zone = s.decorator.zones()[0];
    let event = ZoneEvent::Updated {
        id: zone.id,
        original: zone.region,
        updated: zone.region,
    };
    s.sync.apply(&mut s.buffer, &mut s.decorator, &event).unwrap();
    s.sync.apply(&mut s.buffer, &mut s.decorator, &event).unwrap();
    assert_eq!(s.buffer.contents(), PAGE);
    assert!(!s.buffer.is_dirty());
}

#[test]
fn test_new_zone_is_inserted_after_closest() {
    let mut s = Session::load(PAGE);
    s.drag((30, 80), (170, 120));

    assert_eq!(s.decorator.zones().len(), 2);
    assert_eq!(
        s.buffer.contents(),
        PAGE.replace(
            "lry=\"60\"/>\n",
            "lry=\"60\"/>\n    <zone ulx=\"30\" uly=\"80\" lrx=\"170\" lry=\"120\"/>\n"
        )
    );
}

#[test]
fn test_remove_then_undo_restores_markup() {
    let mut s = Session::load(PAGE);
    let id = s.decorator.zones()[0].id;
    s.decorator.remove(id);
    s.flush();
    assert!(!s.buffer.contents().contains("<zone"));

    assert!(s.buffer.undo());
    assert_eq!(s.buffer.contents(), PAGE);
}

#[test]
fn test_caret_inside_zone_activates_it() {
    let mut s = Session::load(PAGE);
    s.buffer.move_to(3, 12);
    let active = s.sync.sync_caret(&s.buffer, &mut s.decorator).unwrap();
    assert_eq!(active, Some(s.decorator.zones()[0].id));
    assert_eq!(s.decorator.active(), active);
}
