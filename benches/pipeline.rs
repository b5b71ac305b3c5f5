use chrono::{Duration, FixedOffset, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use datarods::{aggregate_daily, merge_observations, rolling_summary, Observation, Variable};

/// Ten years of 3-hourly observations from two overlapping versions.
fn observations() -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2005, 1, 1, 0, 0, 0).unwrap();
    let steps = 10 * 365 * 8;
    let mut out = Vec::with_capacity(steps * Variable::ALL.len() * 2);
    for (version, offset) in [("v2.0", 0.0), ("v2.1", 0.5)] {
        for step in 0..steps {
            let timestamp = start + Duration::hours(3 * step as i64);
            for variable in Variable::ALL {
                out.push(Observation {
                    timestamp,
                    variable,
                    version: version.to_string(),
                    value: Some((step % 97) as f64 + offset),
                });
            }
        }
    }
    out
}

fn bench_pipeline(c: &mut Criterion) {
    let observations = observations();
    let offset = FixedOffset::east_opt(6 * 3600).unwrap();
    let merged = merge_observations(&observations);
    let daily = aggregate_daily(&merged, offset, None);

    c.bench_function("merge_observations", |b| {
        b.iter(|| merge_observations(black_box(&observations)))
    });
    c.bench_function("aggregate_daily", |b| {
        b.iter(|| aggregate_daily(black_box(&merged), offset, None))
    });
    c.bench_function("rolling_summary_7", |b| {
        b.iter(|| rolling_summary(black_box(&daily), 7))
    });
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
