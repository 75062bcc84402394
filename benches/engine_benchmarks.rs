use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use decotrack_api::eligibility;
use decotrack_api::events::{DecoEvent, DecorationPatch, EventKind};
use decotrack_api::models::component::{Component, DecorationStatus, TeamDecorationRecord};
use decotrack_api::models::item::Item;
use decotrack_api::models::order::Order;
use decotrack_api::propagator::{apply_update, bucket_for};
use decotrack_api::sequence::{DecoSequence, TeamId};

fn component_with_chain(teams: usize) -> Component {
    let raw = (0..teams)
        .map(|i| format!("team{i}"))
        .collect::<Vec<_>>()
        .join("_");
    let mut component = Component {
        component_id: "c1".into(),
        deco_sequence: DecoSequence::parse(&raw),
        is_deco_approved: true,
        ..Default::default()
    };
    for team in component.deco_sequence.teams().to_vec() {
        component.decorations.insert(
            team,
            TeamDecorationRecord {
                qty: 1000,
                completed_qty: 500,
                status: DecorationStatus::InProgress,
            },
        );
    }
    component
}

fn order_with_components(components: usize) -> Order {
    let mut order = Order::new("ORD-BENCH", "Acme Bottling");
    order.items.push(Item {
        item_id: "i1".into(),
        name: "bench item".into(),
        status: None,
        components: (0..components)
            .map(|i| {
                let mut c = component_with_chain(3);
                c.component_id = format!("c{i}");
                c
            })
            .collect(),
    });
    order
}

// Benchmark sequence parsing across chain lengths
fn sequence_parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_parse");
    for teams in [1usize, 3, 6, 12].iter() {
        let raw = (0..*teams)
            .map(|i| format!("team{i}"))
            .collect::<Vec<_>>()
            .join("_");
        group.bench_with_input(BenchmarkId::from_parameter(teams), &raw, |b, raw| {
            b.iter(|| DecoSequence::parse(black_box(raw)));
        });
    }
    group.finish();
}

// Benchmark the full eligibility pipeline for the last team in the chain
fn eligibility_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("eligibility");
    for teams in [2usize, 4, 8].iter() {
        let component = component_with_chain(*teams);
        let last = TeamId::from(format!("team{}", teams - 1));
        group.bench_with_input(
            BenchmarkId::from_parameter(teams),
            &(component, last),
            |b, (component, last)| {
                b.iter(|| eligibility::can_edit(black_box(component), black_box(last)));
            },
        );
    }
    group.finish();
}

// Benchmark bucket derivation across order sizes
fn bucket_for_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("bucket_for");
    for components in [1usize, 10, 50].iter() {
        let order = order_with_components(*components);
        group.bench_with_input(
            BenchmarkId::from_parameter(components),
            &order,
            |b, order| {
                b.iter(|| bucket_for(black_box(order)));
            },
        );
    }
    group.finish();
}

// Benchmark applying one production event to a cached order
fn apply_update_benchmark(c: &mut Criterion) {
    c.bench_function("apply_update", |b| {
        let order = order_with_components(10);
        let mut event = DecoEvent::new(EventKind::ProductionUpdated, "ORD-BENCH", "i1", "c5");
        event.updated_component.decorations = Some(HashMap::from([(
            TeamId::from("team1"),
            DecorationPatch {
                qty: None,
                completed_qty: Some(750),
                status: Some(DecorationStatus::InProgress),
            },
        )]));
        b.iter(|| {
            let mut order = order.clone();
            apply_update(black_box(&mut order), black_box(&event))
        });
    });
}

criterion_group!(
    benches,
    sequence_parse_benchmark,
    eligibility_benchmark,
    bucket_for_benchmark,
    apply_update_benchmark
);
criterion_main!(benches);
