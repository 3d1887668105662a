use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::time::Duration;
use uuid::Uuid;

use influence_api::models::{AlertKind, AlertSeverity, PaceStatus};
use influence_api::services::alerts::{sort_alerts, Alert};
use influence_api::services::pacing::{evaluate_pacing, PaceThresholds, PacingInput};
use influence_api::webhooks::SignatureGenerator;

fn bench_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).expect("valid date")
}

// Benchmark for a single pacing evaluation
fn evaluate_pacing_benchmark(c: &mut Criterion) {
    let input = PacingInput {
        goal: Some(250_000),
        start_date: Some(bench_date() - ChronoDuration::days(12)),
        duration_days: Some(30),
        allocation_units: 120_000,
        placement_units: 90_000,
    };
    let thresholds = PaceThresholds::default();

    c.bench_function("evaluate_pacing", |b| {
        b.iter(|| black_box(evaluate_pacing(black_box(&input), thresholds, bench_date())));
    });
}

fn build_portfolio(size: usize) -> Vec<PacingInput> {
    (0..size)
        .map(|i| {
            let goal = 50_000 + (i as i64 * 1_373) % 450_000;
            let duration = 14 + (i as i32 % 60);
            let elapsed = 1 + (i as i64 % 90);
            PacingInput {
                goal: Some(goal),
                start_date: Some(bench_date() - ChronoDuration::days(elapsed)),
                duration_days: Some(duration),
                // Spread delivery from far behind to ahead of schedule.
                allocation_units: goal * (i as i64 % 14) / 10,
                placement_units: goal * (i as i64 % 7) / 10,
            }
        })
        .collect()
}

// Benchmark for sweeping pacing across an active roster, the hot loop behind
// the ops-status and platform-health snapshots
fn portfolio_sweep_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_sweep");
    let thresholds = PaceThresholds::default();

    for size in [10usize, 100, 1_000].iter() {
        let inputs = build_portfolio(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &inputs, |b, inputs| {
            b.iter(|| {
                let mut critical = 0u32;
                for input in inputs {
                    let report = evaluate_pacing(black_box(input), thresholds, bench_date());
                    if report.status == PaceStatus::Critical {
                        critical += 1;
                    }
                }
                black_box(critical)
            });
        });
    }

    group.finish();
}

fn build_alerts(size: usize) -> Vec<Alert> {
    let base = Utc::now();
    (0..size)
        .map(|i| {
            let (kind, severity) = match i % 4 {
                0 => (AlertKind::CampaignPaceCritical, AlertSeverity::Critical),
                1 => (AlertKind::CampaignBehindPace, AlertSeverity::Warning),
                2 => (AlertKind::DeliveryStalled, AlertSeverity::Warning),
                _ => (AlertKind::InvoiceOverdue, AlertSeverity::Info),
            };
            Alert {
                kind,
                severity,
                message: format!("alert {}", i),
                campaign_id: Some(Uuid::new_v4()),
                invoice_id: None,
                client_id: None,
                triggered_at: base - ChronoDuration::seconds(i as i64 * 37 % 86_400),
            }
        })
        .collect()
}

// Benchmark for ordering the alert feed
fn alert_sorting_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("alert_sorting");

    for size in [100usize, 1_000].iter() {
        let alerts = build_alerts(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &alerts, |b, alerts| {
            b.iter_batched(
                || alerts.clone(),
                |mut batch| {
                    sort_alerts(&mut batch);
                    black_box(batch)
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// Benchmark for signing webhook payloads
fn webhook_signing_benchmark(c: &mut Criterion) {
    let generator = SignatureGenerator::new("bench-secret-0123456789abcdef".to_string());
    let body = serde_json::json!({
        "id": "550e8400-e29b-41d4-a716-446655440000",
        "created_at": "2026-06-01T12:00:00Z",
        "event": "campaign_pace_critical",
        "data": {
            "campaign_id": "123e4567-e89b-12d3-a456-426614174000",
            "pace": 0.42,
            "expected_units": 50000.0,
            "actual_units": 21000
        }
    })
    .to_string();

    c.bench_function("webhook_signing", |b| {
        b.iter(|| black_box(generator.sign_payload("2026-06-01T12:00:00+00:00", &body)));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(100);
    targets =
        evaluate_pacing_benchmark,
        portfolio_sweep_benchmark,
        alert_sorting_benchmark,
        webhook_signing_benchmark
}

criterion_main!(benches);
