//! Integration tests for Churnlab.

use std::io::Write;

use serde_json::{Value, json};
use tempfile::NamedTempFile;

use churnlab::compare::{Direction, KpiMetric};
use churnlab::filter::{CategoryField, FilterKey, RangeField};
use churnlab::insights::InsightCategory;
use churnlab::stats::{AnomalyKind, ClusteringConfig, KMeans, LabelThresholds};
use churnlab::{
    AnalyticsConfig, CanonicalRecord, Churnlab, ChurnlabError, ComparisonEngine,
    CorrelationMatrix, FilterEngine, InsightSeverity, NumericField, RawRecord, RecordStructure,
    RecordValidator, SchemaNormalizer, StructureDetector, detect_anomalies, normalize,
    read_records,
};

/// Helper to create a temporary file with given content and suffix.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn raw(value: Value) -> Vec<RawRecord> {
    serde_json::from_value(value).expect("raw records")
}

fn flat_customer() -> Value {
    json!({
        "customerID": "7590-VHVEG",
        "gender": "Female",
        "SeniorCitizen": 0,
        "Partner": "Yes",
        "Dependents": "No",
        "tenure": 12,
        "PhoneService": "Yes",
        "MultipleLines": "No",
        "InternetService": "Fiber optic",
        "OnlineSecurity": "No",
        "StreamingTV": "Yes",
        "Contract": "Month-to-month",
        "PaperlessBilling": "Yes",
        "PaymentMethod": "Electronic check",
        "MonthlyCharges": 70.35,
        "TotalCharges": "844.20",
        "Churn": "Yes"
    })
}

fn nested_customer() -> Value {
    json!({
        "customerID": "7590-VHVEG",
        "Churn": "Yes",
        "customer": {
            "gender": "Female",
            "SeniorCitizen": 0,
            "Partner": "Yes",
            "Dependents": "No",
            "tenure": 12
        },
        "phone": {"PhoneService": "Yes", "MultipleLines": "No"},
        "internet": {
            "InternetService": "Fiber optic",
            "OnlineSecurity": "No",
            "StreamingTV": "Yes"
        },
        "account": {
            "Contract": "Month-to-month",
            "PaperlessBilling": "Yes",
            "PaymentMethod": "Electronic check",
            "Charges": {"Monthly": 70.35, "Total": "844.20"}
        }
    })
}

fn prefixed_customer() -> Value {
    json!({
        "customerID": "7590-VHVEG",
        "Churn": "Yes",
        "customer.gender": "Female",
        "customer.SeniorCitizen": 0,
        "customer.Partner": "Yes",
        "customer.Dependents": "No",
        "customer.tenure": 12,
        "phone.PhoneService": "Yes",
        "phone.MultipleLines": "No",
        "internet.InternetService": "Fiber optic",
        "internet.OnlineSecurity": "No",
        "internet.StreamingTV": "Yes",
        "account.Contract": "Month-to-month",
        "account.PaperlessBilling": "Yes",
        "account.PaymentMethod": "Electronic check",
        "account.Charges.Monthly": 70.35,
        "account.Charges.Total": "844.20"
    })
}

/// A varied flat dataset with a known churn count.
fn telco_rows(n: usize, churned: usize) -> Vec<RawRecord> {
    let contracts = ["Month-to-month", "One year", "Two year"];
    let internet = ["DSL", "Fiber optic", "No"];
    let payments = ["Electronic check", "Mailed check", "Credit card (automatic)"];
    let rows: Vec<Value> = (0..n)
        .map(|i| {
            let tenure = (i * 7) % 72 + 1;
            let monthly = 18.25 + ((i * 13) % 100) as f64;
            json!({
                "customerID": format!("{:04}-CUST", i),
                "gender": if i % 2 == 0 { "Female" } else { "Male" },
                "SeniorCitizen": if i % 5 == 0 { 1 } else { 0 },
                "tenure": tenure,
                "InternetService": internet[i % 3],
                "Contract": contracts[i % 3],
                "PaymentMethod": payments[i % 3],
                "MonthlyCharges": monthly,
                "TotalCharges": format!("{:.2}", monthly * tenure as f64),
                "Churn": if i < churned { "Yes" } else { "No" },
            })
        })
        .collect();
    raw(json!(rows))
}

fn records_with_churn(n: usize, churned: usize) -> Vec<CanonicalRecord> {
    (0..n)
        .map(|i| {
            let mut r = CanonicalRecord::new(format!("C{}", i), i < churned);
            r.demographics.tenure_months = 24;
            r.billing.monthly_charge = 65.0;
            r.billing.total_charge = 1560.0;
            r
        })
        .collect()
}

// =============================================================================
// Normalization Tests
// =============================================================================

#[test]
fn test_all_structures_normalize_identically() {
    let flat = normalize(&raw(json!([flat_customer()])), None).unwrap();
    let nested = normalize(&raw(json!([nested_customer()])), None).unwrap();
    let prefixed = normalize(&raw(json!([prefixed_customer()])), None).unwrap();

    assert_eq!(flat, nested);
    assert_eq!(flat, prefixed);

    let r = &flat[0];
    assert_eq!(r.customer_id, "7590-VHVEG");
    assert!(r.churned);
    assert_eq!(r.demographics.tenure_months, 12);
    assert_eq!(r.billing.total_charge, 844.2);
    assert!(r.services.streaming_tv.is_yes());
}

#[test]
fn test_structure_detection_is_shared() {
    let nested = raw(json!([nested_customer()]));
    let prefixed = raw(json!([prefixed_customer()]));

    assert_eq!(StructureDetector::detect_dataset(&nested), RecordStructure::Nested);
    assert_eq!(StructureDetector::detect_dataset(&prefixed), RecordStructure::Prefixed);

    let report = RecordValidator::new().validate(&nested).unwrap();
    assert_eq!(report.structure, RecordStructure::Nested);
}

#[test]
fn test_unknown_structure_degrades_to_flat() {
    let records = raw(json!([{"foo": 1, "bar": "x"}]));
    assert!(matches!(
        StructureDetector::classify(&records[0]),
        Err(ChurnlabError::UnknownStructure(_))
    ));
    assert_eq!(StructureDetector::detect(&records[0]), RecordStructure::Flat);

    let normalized = SchemaNormalizer::new().normalize(&records).unwrap();
    assert_eq!(normalized[0], CanonicalRecord::default());
}

#[test]
fn test_normalize_empty_input() {
    assert!(matches!(normalize(&[], None), Err(ChurnlabError::EmptyInput(_))));
}

#[test]
fn test_read_csv_and_normalize() {
    let content = "customerID,tenure,MonthlyCharges,TotalCharges,Contract,Churn\n\
                   A1,5,\"$1,029.50\",,Month-to-month,Yes\n\
                   A2,40,55.10,2204,Two year,no\n";
    let file = create_test_file(content, ".csv");

    let raw = read_records(file.path()).expect("read failed");
    let records = normalize(&raw, None).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].billing.monthly_charge, 1029.5);
    assert_eq!(records[0].billing.total_charge, 0.0);
    assert!(!records[1].churned);
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_duplicate_ids_counted_per_repeat() {
    let mut data = telco_rows(10, 2);
    data.push(data[3].clone());
    data.push(data[3].clone());
    data.push(data[5].clone());

    let report = RecordValidator::new().validate(&data).unwrap();
    assert_eq!(report.stats.duplicates, 3);
    let duplicate_warnings = report
        .warnings
        .iter()
        .filter(|w| w.message.starts_with("Duplicate customerID"))
        .count();
    assert_eq!(duplicate_warnings, 3);
    assert!(report.is_valid);
}

#[test]
fn test_validation_reports_rows_one_based() {
    let data = raw(json!([
        {"customerID": "A", "Churn": "No", "tenure": 3},
        {"Churn": "Yes", "tenure": 1}
    ]));
    let report = RecordValidator::new().validate(&data).unwrap();

    assert!(!report.is_valid);
    assert_eq!(report.stats.invalid_rows, 1);
    assert!(report.errors.iter().any(|e| e.row == Some(2)));
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_clear_restores_baseline() {
    let records = normalize(&telco_rows(30, 9), None).unwrap();
    let mut engine = FilterEngine::new(&records);

    engine.set_range(RangeField::Tenure, 10.0, 40.0);
    engine.set_category(CategoryField::Contract, &["month-to-month"]);
    let narrowed = engine.set_search("fiber");
    assert!(narrowed.len() < records.len());
    assert_eq!(engine.stats().active_filters, 3);

    engine.clear(None);
    let restored = engine.apply();
    assert_eq!(restored.len(), records.len());
    assert!(restored.iter().zip(&records).all(|(a, b)| *a == b));
}

#[test]
fn test_clear_single_filter() {
    let records = normalize(&telco_rows(30, 9), None).unwrap();
    let mut engine = FilterEngine::new(&records);

    let churned = engine.set_category(CategoryField::Churn, &["Yes"]);
    assert_eq!(churned.len(), 9);
    engine.set_senior_citizen(Some(true));

    let after = engine.clear(Some(FilterKey::SeniorCitizen));
    assert_eq!(after.len(), 9);
}

// =============================================================================
// Statistics Tests
// =============================================================================

#[test]
fn test_self_correlation_and_symmetry() {
    let records = normalize(&telco_rows(50, 12), None).unwrap();
    let matrix = CorrelationMatrix::compute(&records, &NumericField::ALL);

    for i in 0..matrix.variables.len() {
        assert_eq!(matrix.matrix[i][i], 1.0);
        for j in 0..matrix.variables.len() {
            assert_eq!(matrix.matrix[i][j], matrix.matrix[j][i]);
        }
    }
}

#[test]
fn test_identical_records_give_identity_matrix() {
    for (tenure, monthly, total) in [(10, 50.0, 500.0), (34, 70.7, 151.65), (1, 29.85, 1889.5)] {
        let records: Vec<CanonicalRecord> = (0..100)
            .map(|_| {
                let mut r = CanonicalRecord::new("SAME", true);
                r.demographics.tenure_months = tenure;
                r.billing.monthly_charge = monthly;
                r.billing.total_charge = total;
                r
            })
            .collect();

        let matrix = CorrelationMatrix::compute(&records, &NumericField::ALL);
        for (i, row) in matrix.matrix.iter().enumerate() {
            for (j, &r) in row.iter().enumerate() {
                assert_eq!(r, if i == j { 1.0 } else { 0.0 }, "charges {monthly}/{total}");
            }
        }
    }
}

#[test]
fn test_single_cluster_converges_to_mean() {
    let records = normalize(&telco_rows(25, 5), None).unwrap();
    let config = ClusteringConfig {
        k: 1,
        max_iterations: 50,
        seed: Some(3),
    };
    let result = KMeans::new(config, LabelThresholds::default())
        .run(&records)
        .unwrap();

    assert_eq!(result.iterations, 1);
    assert!(result.converged);

    let scaled: Vec<[f64; 3]> = records
        .iter()
        .map(|r| {
            result.scaling.scale(&[
                f64::from(r.demographics.tenure_months),
                r.billing.monthly_charge,
                r.billing.total_charge,
            ])
        })
        .collect();
    for d in 0..3 {
        let mean = scaled.iter().map(|p| p[d]).sum::<f64>() / scaled.len() as f64;
        assert!((result.centroids[0][d] - mean).abs() < 1e-9);
    }
}

#[test]
fn test_seeded_kmeans_is_reproducible() {
    let records = normalize(&telco_rows(60, 15), None).unwrap();
    let config = ClusteringConfig {
        k: 4,
        max_iterations: 100,
        seed: Some(11),
    };
    let a = KMeans::with_config(config).run(&records).unwrap();
    let b = KMeans::with_config(config).run(&records).unwrap();

    assert_eq!(a.assignments, b.assignments);
    assert_eq!(a.profiles.iter().map(|p| p.size).sum::<usize>(), 60);
}

#[test]
fn test_iqr_flags_upper_outlier() {
    let records: Vec<CanonicalRecord> = [10.0, 10.0, 10.0, 10.0, 100.0]
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let mut r = CanonicalRecord::new(format!("C{}", i), false);
            r.billing.monthly_charge = v;
            r
        })
        .collect();

    let set = detect_anomalies(&records, NumericField::MonthlyCharge, 1.5);
    assert_eq!(set.anomalies.len(), 1);
    assert_eq!(set.anomalies[0].value, 100.0);
    assert_eq!(set.anomalies[0].kind, AnomalyKind::Upper);
}

// =============================================================================
// Comparison & Insight Tests
// =============================================================================

#[test]
fn test_churn_increase_between_datasets() {
    let result = ComparisonEngine::new()
        .compare(&[records_with_churn(100, 20), records_with_churn(100, 35)])
        .unwrap();

    let pair = &result.comparisons[0];
    let delta = pair.delta(KpiMetric::ChurnRate).unwrap();
    assert_eq!(delta.absolute, 15.0);
    assert_eq!(delta.direction, Direction::Increase);

    let churn = pair
        .insights
        .iter()
        .find(|i| i.category == InsightCategory::Churn)
        .expect("churn insight");
    assert!(matches!(
        churn.severity,
        InsightSeverity::Critical | InsightSeverity::Warning
    ));
}

#[test]
fn test_compare_single_dataset_fails() {
    let err = ComparisonEngine::new()
        .compare(&[records_with_churn(10, 1)])
        .unwrap_err();
    assert!(matches!(err, ChurnlabError::InsufficientData { .. }));
}

// =============================================================================
// Pipeline Tests
// =============================================================================

#[test]
fn test_analyze_json_file() {
    let rows: Vec<Value> = (0..3)
        .map(|i| {
            let mut row = nested_customer();
            row["customerID"] = json!(format!("N{}", i));
            row
        })
        .collect();
    let file = create_test_file(&json!({ "data": rows }).to_string(), ".json");

    let raw = read_records(file.path()).unwrap();
    let result = Churnlab::new().analyze(&raw, None).unwrap();

    assert_eq!(result.structure, RecordStructure::Nested);
    assert_eq!(result.kpis.customer_count, 3);
    assert_eq!(result.kpis.churn_rate, 100.0);
    assert!(
        result
            .insights
            .iter()
            .any(|i| i.severity == InsightSeverity::Critical)
    );
}

#[test]
fn test_analyze_honours_config() {
    let mut config = AnalyticsConfig::default();
    config.clustering = ClusteringConfig {
        k: 2,
        max_iterations: 20,
        seed: Some(5),
    };
    config.correlation.variables = vec![NumericField::Tenure, NumericField::TotalCharge];

    let result = Churnlab::with_config(config)
        .analyze(&telco_rows(40, 10), None)
        .unwrap();

    assert_eq!(result.clusters.k, 2);
    assert_eq!(result.correlation.variables.len(), 2);
    assert!(result.validation.is_valid);
}
