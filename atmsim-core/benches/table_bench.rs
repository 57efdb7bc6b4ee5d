#[macro_use]
extern crate criterion;

use criterion::{BatchSize, Criterion, Throughput};

use atmsim_core::table::ResourceTable;
use atmsim_core::types::{IfConfig, IfType, RequestKind, ResponseBatch, VcConfig, XcConfig, XcType};

fn table_with_vcs(count: u32) -> ResourceTable {
    let table = ResourceTable::new();
    let mut batch = ResponseBatch::with_capacity(RequestKind::IfSet, 1);
    table.set_interfaces(&[IfConfig::new(1, IfType::Uni)], &mut batch);
    let vcs: Vec<_> = (0..count)
        .map(|link| VcConfig::new(link, 1, (link / 1024) as u16, (link % 1024) as u16))
        .collect();
    let mut batch = ResponseBatch::with_capacity(RequestKind::VcSet, vcs.len());
    table.set_vcs(&vcs, &mut batch);
    table
}

fn bench_vc_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("vc_set");

    for count in [64u32, 1024, 8192] {
        let entries: Vec<_> = (0..count)
            .map(|link| VcConfig::new(link, 1, (link / 1024) as u16, (link % 1024) as u16))
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("entries_{}", count), |b| {
            b.iter_batched(
                || table_with_vcs(0),
                |table| {
                    let mut batch = ResponseBatch::with_capacity(RequestKind::VcSet, entries.len());
                    table.set_vcs(&entries, &mut batch)
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_cross_connect_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("cross_connect_set");

    for count in [64u32, 1024, 4096] {
        let entries: Vec<_> = (0..count)
            .map(|i| XcConfig::new(i, 2 * i, 2 * i + 1, XcType::ExtToExt))
            .collect();
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("entries_{}", count), |b| {
            b.iter_batched(
                || table_with_vcs(2 * count),
                |table| {
                    let mut batch =
                        ResponseBatch::with_capacity(RequestKind::VcLinkXcSet, entries.len());
                    table.set_cross_connects(&entries, &mut batch)
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_vc_set, bench_cross_connect_set);
criterion_main!(benches);
