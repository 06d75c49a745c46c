//! Scaling and mark building on large synthetic result sets

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use perf_console_core::data::{AlertStatus, BoundaryLimit, JsonDimension, JsonMeasure};
use perf_console_core::query::{Toggles, XAxis};
use perf_console_core::series::{PerfAlert, PerfPoint, PerfResult, ThresholdRef};
use perf_console_core::{build_marks, scale_results, LinkContext, MarkConfig};

fn dimension(uuid: &str, name: &str) -> JsonDimension {
    JsonDimension {
        uuid: uuid.to_string(),
        name: name.to_string(),
        slug: None,
    }
}

fn synthetic_results(series: usize, points: usize) -> Vec<PerfResult> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..series)
        .map(|s| {
            let points = (0..points)
                .map(|p| {
                    let value = 2_500_000.0 + ((s * 31 + p * 17) % 1000) as f64 * 1_000.0;
                    let lower_limit = (p % 7 != 0).then_some(value * 0.8);
                    PerfPoint {
                        report: format!("report-{s}-{p}"),
                        metric: format!("metric-{s}-{p}"),
                        iteration: 0,
                        start_time: start + Duration::hours(p as i64),
                        version_number: p as u32,
                        version_hash: None,
                        value,
                        lower_value: Some(value * 0.95),
                        upper_value: Some(value * 1.05),
                        lower_limit,
                        upper_limit: Some(value * 1.2),
                        threshold: Some(ThresholdRef {
                            uuid: format!("threshold-{s}"),
                            model_uuid: format!("model-{s}"),
                            lower_boundary: true,
                            upper_boundary: true,
                        }),
                        alert: (p % 50 == 0).then(|| PerfAlert {
                            uuid: format!("alert-{s}-{p}"),
                            status: AlertStatus::Active,
                            limit: BoundaryLimit::Upper,
                        }),
                    }
                })
                .collect();
            PerfResult {
                branch: dimension("b", "main"),
                testbed: dimension("t", "localhost"),
                benchmark: dimension(&format!("k{s}"), &format!("bench_{s}")),
                measure: JsonMeasure {
                    uuid: "m".to_string(),
                    name: "Latency".to_string(),
                    slug: None,
                    units: Some("nanoseconds (ns)".to_string()),
                },
                points,
            }
        })
        .collect()
}

fn all_toggles() -> Toggles {
    Toggles {
        lower_value: true,
        upper_value: true,
        lower_boundary: true,
        upper_boundary: true,
    }
}

fn bench_scaling(c: &mut Criterion) {
    let results = synthetic_results(20, 500);
    let active = vec![true; results.len()];
    let toggles = all_toggles();

    c.bench_function("scale::20x500", |b| {
        b.iter(|| scale_results(black_box(&results), &active, &toggles, 0.1))
    });
}

fn bench_marks(c: &mut Criterion) {
    let results = synthetic_results(20, 500);
    let active = vec![true; results.len()];
    let toggles = all_toggles();
    let plot = scale_results(&results, &active, &toggles, 0.1);
    let links = LinkContext::public("project");
    let config = MarkConfig::default();

    c.bench_function("marks::20x500", |b| {
        b.iter(|| build_marks(black_box(&plot), &toggles, XAxis::DateTime, &links, &config))
    });

    c.bench_function("marks::scale_and_build_20x500", |b| {
        b.iter(|| {
            let plot = scale_results(black_box(&results), &active, &toggles, 0.1);
            build_marks(&plot, &toggles, XAxis::Version, &links, &config)
        })
    });
}

criterion_group!(scaling, bench_scaling);
criterion_group!(marks, bench_marks);

criterion_main!(scaling, marks);
