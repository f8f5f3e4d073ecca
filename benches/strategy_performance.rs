use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pitwall::strategy::{FuelModel, TireDegradationModel};
use pitwall::{
    Compound, PitRecommendation, PitRequest, StrategyConfig, TireStint, compare_compounds,
    evaluate_pit_recommendation,
};
use std::time::Duration;

fn create_sample_request(lap: i64) -> PitRequest {
    PitRequest {
        current_lap: lap,
        total_laps: 60,
        current_position: 4,
        fuel_remaining: 200.0 - lap as f64 * 3.0,
        tire_compound: "medium".to_string(),
        tire_stint_laps: lap % 25,
        gap_ahead: 1.2,
        gap_behind: 0.8,
        is_caution: false,
        track_temp: Some(32.0),
        fuel_consumption_rate: Some(3.0),
    }
}

fn bench_models(c: &mut Criterion) {
    let mut group = c.benchmark_group("models");
    let config = StrategyConfig::default();
    let model = TireDegradationModel::new(&config);
    let stint = TireStint {
        compound: Compound::Soft,
        stint_laps: 9,
        track_temp: 38.0,
    };

    group.bench_function("evaluate_tire_stint", |b| {
        b.iter(|| black_box(model.evaluate(black_box(&stint))));
    });

    let laps: Vec<(u32, f64)> = (1..=30).map(|lap| (lap, 92.0 + lap as f64 * 0.05)).collect();
    group.bench_function("lap_time_trend_30_laps", |b| {
        b.iter(|| black_box(TireDegradationModel::lap_time_trend(black_box(&laps))));
    });

    let samples: Vec<f64> = (0..20).map(|i| 3.0 + (i % 3) as f64 * 0.1).collect();
    group.bench_function("estimate_consumption_rate", |b| {
        b.iter(|| black_box(FuelModel::estimate_consumption_rate(black_box(&samples))));
    });

    group.finish();
}

fn bench_recommendations(c: &mut Criterion) {
    let mut group = c.benchmark_group("recommendations");
    let config = StrategyConfig::default();

    group.bench_function("evaluate_single_request", |b| {
        let request = create_sample_request(20);
        b.iter(|| black_box(evaluate_pit_recommendation(black_box(&request), &config)));
    });

    group.bench_function("evaluate_full_race", |b| {
        let requests: Vec<PitRequest> = (1..60).map(create_sample_request).collect();
        b.iter(|| {
            for request in &requests {
                let _ = black_box(evaluate_pit_recommendation(request, &config));
            }
        });
    });

    group.bench_function("compare_compounds", |b| {
        b.iter(|| black_box(compare_compounds(black_box(60), black_box(12), &config)));
    });

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");
    let config = StrategyConfig::default();

    let recommendation = evaluate_pit_recommendation(&create_sample_request(20), &config).unwrap();
    group.bench_function("serialize_recommendation", |b| {
        b.iter(|| black_box(serde_json::to_string(&recommendation).unwrap()));
    });

    let json = serde_json::to_string(&recommendation).unwrap();
    group.bench_function("deserialize_recommendation", |b| {
        b.iter(|| black_box(serde_json::from_str::<PitRecommendation>(&json).unwrap()));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(10))
        .sample_size(100);
    targets = bench_models, bench_recommendations, bench_serialization
}
criterion_main!(benches);
