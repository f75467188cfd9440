use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use abp_terminal::aggregate::{self, NumericStat, ViewInput, ViewRequest};
use abp_terminal::filter::{self, Dimension, FilterSpec};
use abp_terminal::network::{self, GraphLayout, SpringLayout};
use abp_terminal::sample::sample_table;

const ROWS: usize = 5_000;

fn busy_spec() -> FilterSpec {
    FilterSpec::new()
        .with_values(Dimension::SetPieceType, ["Córner", "Falta lateral"])
        .with_values(Dimension::MatchHalf, ["Primera"])
        .with_values(Dimension::TimeBucket, ["0-15", "16-30", "31-45"])
        .with_matchdays(5, 30)
}

fn bench_filter_apply(c: &mut Criterion) {
    let table = sample_table(7, ROWS);
    let spec = busy_spec();
    c.bench_function("filter_apply", |b| {
        b.iter(|| {
            let filtered = filter::apply(black_box(&table), black_box(&spec));
            black_box(filtered.len());
        })
    });
}

fn bench_views(c: &mut Criterion) {
    let table = sample_table(7, ROWS);
    let spec = busy_spec();
    let filtered = filter::apply(&table, &spec);
    let input = ViewInput {
        full: &table,
        filtered: &filtered,
        spec: &spec,
    };
    let requests = [
        ViewRequest::Kpis,
        ViewRequest::Distribution {
            dimension: Dimension::AttackingTeam,
        },
        ViewRequest::MatchdaySeries,
        ViewRequest::CumulativeXg,
        ViewRequest::GroupedXg {
            group: Dimension::SetPieceType,
            stat: NumericStat::Mean,
        },
        ViewRequest::DefensiveRanking { top_n: 10 },
    ];
    c.bench_function("dashboard_views", |b| {
        b.iter(|| {
            for request in &requests {
                let _ = black_box(aggregate::compute(black_box(&input), request));
            }
        })
    });
}

fn bench_network(c: &mut Criterion) {
    let table = sample_table(7, ROWS);
    let layout = SpringLayout::default();
    c.bench_function("network_build_and_layout", |b| {
        b.iter(|| {
            let Ok(graph) = network::build_actor_graph(black_box(&table)) else {
                return;
            };
            black_box(layout.layout(&graph));
        })
    });
}

criterion_group!(benches, bench_filter_apply, bench_views, bench_network);
criterion_main!(benches);
