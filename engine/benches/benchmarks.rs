//! Performance benchmarks for ecole-engine

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ecole_engine::{Reconciler, SchoolSnapshot};
use serde_json::{json, Value};

/// A school of `size` students with roughly one broken reference in four.
fn messy_document(size: usize) -> Value {
    let classes: Vec<Value> = (0..(size / 25).max(1))
        .map(|i| json!({"id": format!("C{}", i), "nom": format!("Classe {}", i)}))
        .collect();
    let parents: Vec<Value> = (0..(size / 2))
        .map(|i| {
            json!({
                "id": format!("P{}", i),
                "elevesIds": [format!("S{}", i * 2), format!("S{}", size + i)]
            })
        })
        .collect();
    let eleves: Vec<Value> = (0..size)
        .map(|i| {
            json!({
                "id": format!("S{}", i),
                "nom": format!("Eleve {}", i),
                "parentId": format!("P{}", i / 2),
                "classeId": format!("C{}", i % 40)
            })
        })
        .collect();
    let cours: Vec<Value> = (0..(size / 10))
        .map(|i| json!({"id": format!("CR{}", i)}))
        .collect();

    json!({
        "classes": classes,
        "parents": parents,
        "eleves": eleves,
        "cours": cours,
        "admins": [{"id": "1"}, {"id": "2"}]
    })
}

fn reconciler() -> Reconciler {
    Reconciler::new(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap())
}

fn bench_reconciliation(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconciliation");

    for size in [100, 1000, 5000].iter() {
        let snapshot = SchoolSnapshot::from_value(messy_document(*size)).unwrap();

        group.bench_with_input(BenchmarkId::new("reconcile", size), &snapshot, |b, s| {
            b.iter(|| reconciler().reconcile_owned(black_box(s.clone())))
        });

        let (clean, _) = reconciler().reconcile_owned(snapshot.clone());
        group.bench_with_input(BenchmarkId::new("reconcile_clean", size), &clean, |b, s| {
            b.iter(|| reconciler().reconcile_owned(black_box(s.clone())))
        });

        group.bench_with_input(BenchmarkId::new("audit", size), &clean, |b, s| {
            b.iter(|| black_box(s).audit())
        });
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    let text = serde_json::to_string(&messy_document(1000)).unwrap();
    group.bench_function("snapshot_from_json", |b| {
        b.iter(|| SchoolSnapshot::from_json(black_box(&text)))
    });

    let snapshot = SchoolSnapshot::from_json(&text).unwrap();
    group.bench_function("snapshot_to_json_pretty", |b| {
        b.iter(|| black_box(&snapshot).to_json_pretty())
    });

    group.finish();
}

criterion_group!(benches, bench_reconciliation, bench_serialization);
criterion_main!(benches);
