//! Prediction path benchmarks
//!
//! Measures form parsing plus single-row inference, and batch inference.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pronostico::config::titanic_config;
use pronostico::data::Dataset;
use pronostico::engine::{Engine, LogisticModel, Predictor};
use pronostico::monitor::ServiceMetrics;
use pronostico::server::{parse_form, predict_row};

fn passengers(rows: usize) -> Dataset {
    let mut csv = String::from("Survived,Pclass,Sex,Age,SibSp,Parch,Fare\n");
    for i in 0..rows {
        let female = i % 2 == 0;
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{},{}",
            u8::from(female),
            i % 3 + 1,
            if female { "female" } else { "male" },
            18 + i % 50,
            i % 4,
            i % 3,
            7.25 + (i % 20) as f64
        );
    }
    Dataset::from_csv_str(&csv).expect("valid csv")
}

fn trained_model() -> LogisticModel {
    let mut model = LogisticModel::new(titanic_config(), 42).expect("valid config");
    model.train(&passengers(500)).expect("training succeeds");
    model
}

/// Form parsing plus one-row prediction, as served by POST /predict
fn bench_predict_row(c: &mut Criterion) {
    let model = trained_model();
    let form: HashMap<String, String> = [
        ("Pclass", "3"),
        ("Sex", "male"),
        ("Age", "22"),
        ("SibSp", "1"),
        ("Parch", "0"),
        ("Fare", "7.25"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    c.bench_function("predict_row", |b| {
        b.iter(|| {
            let row = parse_form(black_box(&form)).expect("valid form");
            black_box(predict_row(&model, &row).expect("prediction"))
        });
    });
}

fn bench_batch_predict(c: &mut Criterion) {
    let model = trained_model();
    let mut group = c.benchmark_group("batch_predict");

    for size in [10, 100, 1_000] {
        let data = passengers(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| black_box(model.predict(data).expect("prediction")));
        });
    }
    group.finish();
}

/// Overhead of counting a prediction
fn bench_record_prediction(c: &mut Criterion) {
    let metrics = ServiceMetrics::new().expect("metrics registry");
    c.bench_function("record_prediction", |b| {
        b.iter(|| metrics.record_prediction(black_box(Duration::from_micros(250))));
    });
}

criterion_group!(
    benches,
    bench_predict_row,
    bench_batch_predict,
    bench_record_prediction
);
criterion_main!(benches);
