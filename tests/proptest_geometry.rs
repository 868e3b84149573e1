use proptest::prelude::*;
use zonemark::geometry::{DocPoint, Region, ScaleTransform, ViewPoint, ViewRect};

fn scale_strategy() -> impl Strategy<Value = ScaleTransform> {
    (-2..=2_i32).prop_map(ScaleTransform::from_exponent)
}

proptest! {
    #[test]
    fn document_round_trip_stays_within_one_view_cell(
        x in -10_000..10_000_i32,
        y in -10_000..10_000_i32,
        scale in scale_strategy(),
    ) {
        let p = DocPoint::new(x, y);
        let back = scale.to_document(scale.to_view(p));
        let slack = (1.0 / scale.scale()).max(1.0);
        prop_assert!(f64::from((back.x - p.x).abs()) < slack);
        prop_assert!(f64::from((back.y - p.y).abs()) < slack);
    }

    #[test]
    fn view_round_trip_stays_within_one_document_unit(
        x in -10_000..10_000_i32,
        y in -10_000..10_000_i32,
        scale in scale_strategy(),
    ) {
        let p = ViewPoint::new(x, y);
        let back = scale.to_view(scale.to_document(p));
        let slack = scale.scale().max(1.0);
        prop_assert!(f64::from((back.x - p.x).abs()) < slack);
        prop_assert!(f64::from((back.y - p.y).abs()) < slack);
    }

    #[test]
    fn shared_edges_stay_shared(
        left in 0..1_000_i32,
        top in 0..1_000_i32,
        w in 1..500_i32,
        h in 1..500_i32,
        w2 in 1..500_i32,
        scale in scale_strategy(),
    ) {
        let a = Region::new(left, top, left + w, top + h);
        let b = Region::new(left + w, top, left + w + w2, top + h);
        prop_assert_eq!(scale.region_to_view(a).right, scale.region_to_view(b).left);
    }

    #[test]
    fn rect_round_trip_keeps_corners_within_one_scale_step(
        left in 0..10_000_i32,
        top in 0..10_000_i32,
        w in 4..2_000_i32,
        h in 4..2_000_i32,
        scale in scale_strategy(),
    ) {
        let r = ViewRect::new(left, top, left + w, top + h);
        let back = scale.region_to_view(scale.rect_to_document(r));
        let slack = scale.scale().max(1.0);
        for (got, want) in [
            (back.left, r.left),
            (back.top, r.top),
            (back.right, r.right),
            (back.bottom, r.bottom),
        ] {
            prop_assert!(f64::from((got - want).abs()) < slack);
        }
        prop_assert!(f64::from((back.width() - r.width()).abs()) < slack);
        prop_assert!(f64::from((back.height() - r.height()).abs()) < slack);
    }
}
