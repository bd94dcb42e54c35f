use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stridecoin::models::{GpsPoint, TransportMode};
use stridecoin::services::reward::{
    compute_reward, DaySegment, RewardInputs, SegmentInput, Weather,
};
use stridecoin::services::trajectory::validate_track;

/// A realistic one-hour walk: ~3,600 points at 1 Hz, small jitter, a few
/// bad-accuracy samples and one teleport spike.
fn synthetic_track() -> Vec<GpsPoint> {
    (0..3_600)
        .map(|i| {
            let accuracy = if i % 400 == 0 { 120.0 } else { 8.0 };
            let lat = if i == 1_800 {
                37.6 // teleport spike mid-track
            } else {
                37.0 + i as f64 * 0.000_012
            };
            GpsPoint {
                lat,
                lng: 127.0 + (i % 7) as f64 * 0.000_001,
                timestamp_ms: i64::from(i) * 1_000,
                accuracy_m: Some(accuracy),
                speed_mps: None,
            }
        })
        .collect()
}

fn benchmark_validate_track(c: &mut Criterion) {
    let points = synthetic_track();

    let mut group = c.benchmark_group("movement_pipeline");

    group.bench_function("validate_one_hour_track", |b| {
        b.iter(|| validate_track(black_box(&points), 500.0, 50.0))
    });

    let track = validate_track(&points, 500.0, 50.0);
    let inputs = RewardInputs {
        segments: vec![SegmentInput {
            mode: TransportMode::Walking,
            distance_m: track.distance_m,
        }],
        stride_multiplier: 1.25,
        day_segment: DaySegment::MorningCommute,
        weather: Weather::Clouds,
        equipment_bonus_percent: 9.5,
        condition_multiplier: 0.85,
        flat_bonus_sc: 10,
        booster_multiplier: 1.0,
        daily_cap: 1_200,
        sc_earned_today: 340,
    };

    group.bench_function("compute_reward", |b| {
        b.iter(|| compute_reward(black_box(&inputs)))
    });

    group.finish();
}

criterion_group!(benches, benchmark_validate_track);
criterion_main!(benches);
