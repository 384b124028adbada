//! Performance benchmarks for the attendance engine.
//!
//! This benchmark suite covers:
//! - Resolving one assignment over a month and over a year
//! - Classifying a month of punches, including attribution
//! - Batch runs of 100 and 1000 employees on the worker pool
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::hint::black_box;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use attendance_engine::calculation::{
    BatchSnapshot, EmployeeInput, ScheduleResolver, classify_days, run_batch, summarize,
};
use attendance_engine::config::{ConfigLoader, ScheduleCatalog};
use attendance_engine::models::{Assignment, DateRange, Punch};

fn load_catalog() -> ScheduleCatalog {
    ConfigLoader::load("./config/default")
        .expect("Failed to load config")
        .into_catalog()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn assignment(employee_id: &str, shift_id: &str) -> Assignment {
    Assignment {
        id: format!("asg_{}", employee_id),
        employee_id: employee_id.to_string(),
        shift_id: shift_id.to_string(),
        start_date: date(2024, 1, 1),
        end_date: None,
    }
}

/// Two punches per weekday of January 2024, the entry drifting a few
/// minutes late on some days.
fn month_of_punches(employee_id: &str) -> Vec<Punch> {
    (0..31u64)
        .flat_map(|offset| {
            let day = date(2024, 1, 1).checked_add_days(Days::new(offset)).unwrap();
            let late = (offset % 4) as u32 * 7;
            [
                Punch::at(employee_id, day.and_hms_opt(8, late, 0).unwrap()),
                Punch::at(employee_id, day.and_hms_opt(17, 2, 0).unwrap()),
            ]
        })
        .collect()
}

fn employees(count: usize) -> Vec<EmployeeInput> {
    (0..count)
        .map(|i| {
            let employee_id = format!("emp_{:04}", i);
            let shift_id = if i % 3 == 0 { "rotation" } else { "office" };
            EmployeeInput {
                assignments: vec![assignment(&employee_id, shift_id)],
                punches: month_of_punches(&employee_id),
                leaves: vec![],
                employee_id,
            }
        })
        .collect()
}

/// Benchmark: schedule resolution for one assignment.
fn bench_resolve(c: &mut Criterion) {
    let catalog = load_catalog();
    let resolver = ScheduleResolver::new(&catalog, &[]);
    let asg = assignment("emp_bench", "office");

    let mut group = c.benchmark_group("resolve");
    for (label, end) in [("month", date(2024, 1, 31)), ("year", date(2024, 12, 31))] {
        let range = DateRange::new(date(2024, 1, 1), end).unwrap();
        group.throughput(Throughput::Elements(range.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(label), &range, |b, range| {
            b.iter(|| black_box(resolver.resolve(&asg, *range).unwrap()))
        });
    }
    group.finish();
}

/// Benchmark: attribution, classification and summary for one month.
fn bench_classify_month(c: &mut Criterion) {
    let catalog = load_catalog();
    let resolver = ScheduleResolver::new(&catalog, &[]);
    let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
    let days = resolver
        .resolve(&assignment("emp_bench", "office"), range)
        .unwrap()
        .days;
    let punches = month_of_punches("emp_bench");

    c.bench_function("classify_month", |b| {
        b.iter(|| {
            let records = classify_days(&days, &punches, &[]);
            black_box(summarize("emp_bench", &records))
        })
    });
}

/// Benchmark: batch runs on the worker pool.
fn bench_batch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let snapshot = Arc::new(BatchSnapshot {
        catalog: load_catalog(),
        exceptions: vec![],
        period: DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap(),
    });
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);

    let mut group = c.benchmark_group("batch_processing");
    group.sample_size(10);
    for count in [100usize, 1000] {
        let inputs = employees(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &inputs, |b, inputs| {
            b.to_async(&rt).iter(|| {
                let snapshot = Arc::clone(&snapshot);
                let inputs = inputs.clone();
                async move { black_box(run_batch(snapshot, inputs, workers).await) }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_classify_month, bench_batch);
criterion_main!(benches);
