use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use swlevel_levels::{
    Document, FormatOptions, Layer, MapFormat, MapObject, ObjectLayer, PropertyValue, TileLayer,
};

/// Square level with a crate on every other tile and a button wired to
/// the first few of them
fn crowded_level(side: usize) -> Document {
    let tiles = TileLayer::filled("Main", side, side, 3);
    let mut objects = Vec::new();
    let mut id = 1;

    for y in 0..side {
        for x in (y % 2..side).step_by(2) {
            objects.push(MapObject::new(
                id,
                "crate",
                (x * 16) as f64,
                ((y + 1) * 16) as f64,
            ));
            id += 1;
        }
    }

    let mut button = MapObject::new(id, "button", 0.0, 16.0)
        .with_property("numTargets", PropertyValue::Number(7.0));
    for slot in 1..=7 {
        button = button.with_property(
            &format!("target{}id", slot),
            PropertyValue::Object { id: slot },
        );
    }
    objects.push(button);

    Document::new(side, side)
        .with_layer(Layer::Tile(tiles))
        .with_layer(Layer::Object(ObjectLayer::new("objects", objects)))
}

fn benchmark_soko_export(c: &mut Criterion) {
    let options = FormatOptions::default();
    let mut group = c.benchmark_group("soko_export");

    for side in [16, 64, 255] {
        let doc = crowded_level(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &doc, |b, doc| {
            b.iter(|| MapFormat::Soko.write(black_box(doc), &options))
        });
    }

    group.finish();
}

fn benchmark_swadge_land_export(c: &mut Criterion) {
    let options = FormatOptions::default();
    let mut tiles = TileLayer::filled("Main", 128, 64, 50);
    for x in 0..16 {
        tiles.set_tile(x * 8, 10, Some(x as u32 + 1));
    }
    let doc = Document::new(128, 64).with_layer(Layer::Tile(tiles));

    c.bench_function("swadge_land_export", |b| {
        b.iter(|| MapFormat::SwadgeLand.write(black_box(&doc), &options))
    });
}

criterion_group!(benches, benchmark_soko_export, benchmark_swadge_land_export);
criterion_main!(benches);
