//! Criterion benchmarks for health evaluation.
//!
//! Clusters are generated once per size; each iteration snapshots the store
//! and evaluates the whole tree.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use health_core::config::HealthConfig;
use health_core::models::{ClusterHealthChunkQuery, ClusterHealthQuery, PagingQuery};
use health_core::traits::IHealthQuery;
use health_eval::HealthEngine;
use test_fixtures::{generated_cluster, upgrade_domain, TopologySpec};

fn engine(applications: usize) -> HealthEngine {
    let spec = TopologySpec {
        nodes: 20,
        upgrade_domains: 5,
        applications,
        services_per_application: 5,
        partitions_per_service: 4,
        replicas_per_partition: 3,
        error_replica_every: 7,
    };
    let store = generated_cluster(spec).build();
    HealthEngine::with_store(Arc::new(store), HealthConfig::default()).unwrap_or_else(|e| panic!("engine: {e}"))
}

fn bench_cluster_health(c: &mut Criterion) {
    let mut group = c.benchmark_group("cluster_health");
    for applications in [1, 10, 50] {
        let engine = engine(applications);
        let query = ClusterHealthQuery {
            include_health_statistics: true,
            ..ClusterHealthQuery::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(applications), &engine, |b, engine| {
            b.iter(|| engine.get_cluster_health(&query))
        });
    }
    group.finish();
}

fn bench_upgrade_check(c: &mut Criterion) {
    let engine = engine(10);
    let domains: Vec<String> = (0..5).map(upgrade_domain).collect();
    let baseline = engine
        .capture_upgrade_snapshot(&domains)
        .unwrap_or_else(|e| panic!("baseline: {e}"));

    c.bench_function("upgrade_check_10_apps", |b| {
        b.iter(|| engine.check_cluster_upgrade_health(&domains, None, None, None, Some(&baseline)))
    });
}

fn bench_queries(c: &mut Criterion) {
    let engine = engine(10);
    let chunk_query = ClusterHealthChunkQuery::default();

    c.bench_function("cluster_health_chunk_10_apps", |b| {
        b.iter(|| engine.get_cluster_health_chunk(&chunk_query))
    });
    c.bench_function("paged_nodes_first_page", |b| {
        b.iter(|| engine.get_nodes_aggregated_health_states(&PagingQuery::first(5)))
    });
}

criterion_group!(benches, bench_cluster_health, bench_upgrade_check, bench_queries);
criterion_main!(benches);
