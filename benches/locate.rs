//! Benchmarks for finding zone markup in large documents.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use zonemark::document::DocumentAccess;
use zonemark::editor::XmlBuffer;
use zonemark::geometry::Region;
use zonemark::markup::ZoneQuery;
use zonemark::sync::MarkupSynchronizer;
use zonemark::zone::{DecoratorOptions, RegionDecorator, ZoneEvent};

fn page_with_zones(count: i32) -> String {
    let mut xml = String::from("<surface>\n  <graphic url=\"p1.png\"/>\n");
    for i in 0..count {
        let top = i * 12;
        xml.push_str(&format!(
            "  <zone ulx=\"10\" uly=\"{top}\" lrx=\"400\" lry=\"{}\"/>\n",
            top + 10
        ));
    }
    xml.push_str("</surface>\n");
    xml
}

fn bench_query_zones(c: &mut Criterion) {
    let buffer = XmlBuffer::from_text(&page_with_zones(500));
    c.bench_function("query_500_zones", |b| {
        b.iter(|| buffer.find_ranges(black_box(&ZoneQuery::Zones)).unwrap())
    });
}

fn bench_reload(c: &mut Criterion) {
    let buffer = XmlBuffer::from_text(&page_with_zones(500));
    let mut sync = MarkupSynchronizer::new(None);
    let mut decorator = RegionDecorator::new(DecoratorOptions::default());
    c.bench_function("reload_500_zones", |b| {
        b.iter(|| sync.reload(&buffer, &mut decorator).unwrap())
    });
}

fn bench_update_last_zone(c: &mut Criterion) {
    let text = page_with_zones(500);
    c.bench_function("update_last_of_500", |b| {
        b.iter_batched(
            || {
                let buffer = XmlBuffer::from_text(&text);
                let mut sync = MarkupSynchronizer::new(None);
                let mut decorator = RegionDecorator::new(DecoratorOptions::default());
                sync.reload(&buffer, &mut decorator).unwrap();
                (buffer, sync, decorator)
            },
            |(mut buffer, mut sync, mut decorator)| {
                let last = *decorator.zones().last().unwrap();
                let event = ZoneEvent::Updated {
                    id: last.id,
                    original: last.region,
                    updated: Region::new(10, 5988, 420, 6000),
                };
                sync.apply(&mut buffer, &mut decorator, &event).unwrap();
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_query_zones,
    bench_reload,
    bench_update_last_zone
);
criterion_main!(benches);
