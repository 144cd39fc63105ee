//! Analysis pipeline performance benchmarks.
//!
//! Measures normalization, K-Means, correlation and the full pipeline.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use churnlab::stats::{ClusteringConfig, KMeans};
use churnlab::{AnalyticsConfig, Churnlab, CorrelationMatrix, NumericField, RawRecord, normalize};

/// Generate realistic telco customer rows.
fn generate_customers(rows: usize) -> Vec<RawRecord> {
    let contracts = ["Month-to-month", "One year", "Two year"];
    let internet = ["DSL", "Fiber optic", "No"];
    let payments = [
        "Electronic check",
        "Mailed check",
        "Bank transfer (automatic)",
        "Credit card (automatic)",
    ];

    let data: Vec<Value> = (0..rows)
        .map(|row| {
            let tenure = (row * 7) % 72 + 1;
            let monthly = 18.0 + ((row * 37) % 10_000) as f64 / 100.0;
            json!({
                "customerID": format!("{:04}-BENCH", row),
                "gender": if row % 2 == 0 { "Female" } else { "Male" },
                "SeniorCitizen": u8::from(row % 6 == 0),
                "Partner": if row % 3 == 0 { "Yes" } else { "No" },
                "tenure": tenure,
                "InternetService": internet[row % internet.len()],
                "Contract": contracts[row % contracts.len()],
                "PaymentMethod": payments[row % payments.len()],
                "MonthlyCharges": format!("{:.2}", monthly),
                "TotalCharges": format!("{:.2}", monthly * tenure as f64),
                "Churn": if row % 4 == 0 { "Yes" } else { "No" },
            })
        })
        .collect();

    serde_json::from_value(Value::Array(data)).unwrap()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for rows in [100, 1_000, 10_000].iter() {
        let raw = generate_customers(*rows);
        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("flat_rows", rows), &raw, |b, raw| {
            b.iter(|| black_box(normalize(raw, None).unwrap()))
        });
    }

    group.finish();
}

fn bench_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans");

    for rows in [100, 1_000, 5_000].iter() {
        let records = normalize(&generate_customers(*rows), None).unwrap();
        let engine = KMeans::with_config(ClusteringConfig {
            k: 4,
            max_iterations: 100,
            seed: Some(42),
        });
        group.bench_with_input(BenchmarkId::new("k4", rows), &records, |b, records| {
            b.iter(|| black_box(engine.run(records).unwrap()))
        });
    }

    group.finish();
}

fn bench_correlation(c: &mut Criterion) {
    let mut group = c.benchmark_group("correlation");

    for rows in [1_000, 10_000].iter() {
        let records = normalize(&generate_customers(*rows), None).unwrap();
        group.bench_with_input(BenchmarkId::new("all_fields", rows), &records, |b, records| {
            b.iter(|| black_box(CorrelationMatrix::compute(records, &NumericField::ALL)))
        });
    }

    group.finish();
}

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_analysis");
    group.sample_size(20);

    let mut config = AnalyticsConfig::default();
    config.clustering.seed = Some(42);
    let churnlab = Churnlab::with_config(config);

    for rows in [500, 5_000].iter() {
        let raw = generate_customers(*rows);
        group.bench_with_input(BenchmarkId::new("rows", rows), &raw, |b, raw| {
            b.iter(|| black_box(churnlab.analyze(raw, None).unwrap()))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_normalize,
    bench_kmeans,
    bench_correlation,
    bench_full_analysis
);
criterion_main!(benches);
