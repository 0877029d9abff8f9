//! Performance benchmarks for the livability engine.
//!
//! Covers the hot paths used when a map is rendered:
//! - Single affordability rating (library and HTTP)
//! - Candidate scoring across many ZIPs at each rent tier
//! - Livability scoring and ranking of many neighborhoods
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use livability_engine::api::{AppState, create_router};
use livability_engine::calculation::{
    rank_neighborhoods, rate_affordability, score_candidates, score_neighborhoods,
};
use livability_engine::config::{RateTables, TableLoader};
use livability_engine::models::{
    DependentStatus, Grade, LivabilityWeights, NeighborhoodMetrics, ZipCode,
};

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn load_tables() -> RateTables {
    TableLoader::load("./data/sample").expect("Failed to load sample dataset")
}

fn zip(code: &str) -> ZipCode {
    ZipCode::new(code).unwrap()
}

/// Candidate ZIPs cycling through ZIP, county and national rent tiers.
fn candidate_zips(count: usize) -> Vec<ZipCode> {
    ["22201", "22202", "21202", "88888", "20002", "02134"]
        .iter()
        .cycle()
        .take(count)
        .map(|z| zip(z))
        .collect()
}

fn neighborhoods(count: usize) -> Vec<NeighborhoodMetrics> {
    (0..count)
        .map(|i| NeighborhoodMetrics {
            id: format!("block_{:05}", i),
            zip: None,
            crime_index: Some(Decimal::new((i % 900) as i64, 2)),
            distance: Decimal::new((i % 500) as i64, 3),
            walkability: Some(Decimal::new((i % 20) as i64 + 1, 0)),
            school_rating: Some(Decimal::new((i % 10) as i64 + 1, 0)),
            brewery_count: Some((i % 4) as u32),
            affordability_ratio: Some(Decimal::new(80 + (i % 50) as i64, 2)),
        })
        .collect()
}

/// Benchmark: One affordability rating with full audit trace.
fn bench_single_rating(c: &mut Criterion) {
    let tables = load_tables();
    let duty = zip("20001");
    let candidate = zip("22202");

    c.bench_function("single_rating", |b| {
        b.iter(|| {
            black_box(
                rate_affordability(
                    &tables,
                    &duty,
                    &candidate,
                    DependentStatus::WithDependents,
                    Grade::O4,
                )
                .unwrap(),
            )
        })
    });
}

/// Benchmark: POST /affordability through the router.
fn bench_http_rating(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_tables()));
    let body = serde_json::json!({
        "duty_zip": "20001",
        "candidate_zip": "22201",
        "dependent_status": "W",
        "grade": "O04"
    })
    .to_string();

    c.bench_function("http_rating", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/affordability")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: Candidate scoring at increasing ZIP counts.
fn bench_candidate_scaling(c: &mut Criterion) {
    let tables = load_tables();
    let duty = zip("20001");
    let mut group = c.benchmark_group("candidate_scoring");

    for count in [10usize, 100, 1_000, 10_000] {
        let candidates = candidate_zips(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("zips", count), &candidates, |b, candidates| {
            b.iter(|| {
                black_box(
                    score_candidates(
                        &tables,
                        &duty,
                        candidates,
                        DependentStatus::WithoutDependents,
                        Grade::E5,
                    )
                    .unwrap(),
                )
            })
        });
    }

    group.finish();
}

/// Benchmark: Livability scoring and ranking.
fn bench_livability_ranking(c: &mut Criterion) {
    let weights = LivabilityWeights::default();
    let mut group = c.benchmark_group("livability_ranking");

    for count in [100usize, 1_000, 10_000] {
        let metrics = neighborhoods(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("neighborhoods", count), &metrics, |b, metrics| {
            b.iter(|| {
                let scores = score_neighborhoods(metrics, &weights).unwrap();
                black_box(rank_neighborhoods(scores, 10))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_rating,
    bench_http_rating,
    bench_candidate_scaling,
    bench_livability_ranking,
);
criterion_main!(benches);
