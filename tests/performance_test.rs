// Performance tests for the strategy engine
//
// The pit wall asks for a fresh recommendation every lap, often for several cars at once,
// so evaluations must stay cheap and independent of each other.

use std::thread;
use std::time::Instant;

use pitwall::{PitRequest, StrategyConfig, compare_compounds, evaluate_pit_recommendation};

fn sample_request(lap: i64) -> PitRequest {
    PitRequest {
        current_lap: lap,
        total_laps: 60,
        current_position: 4,
        fuel_remaining: 200.0 - lap as f64 * 3.0,
        tire_compound: "medium".to_string(),
        tire_stint_laps: lap % 25,
        gap_ahead: 1.2,
        gap_behind: 0.8,
        is_caution: lap % 17 == 0,
        track_temp: Some(32.0),
        fuel_consumption_rate: Some(3.0),
    }
}

/// Test that a single recommendation is fast enough to run every lap
#[test]
fn test_recommendation_throughput() {
    let config = StrategyConfig::default();
    let requests: Vec<PitRequest> = (1..60).map(sample_request).collect();

    let iterations = 100;
    let start = Instant::now();
    for _ in 0..iterations {
        for request in &requests {
            let recommendation = evaluate_pit_recommendation(request, &config).unwrap();
            assert!(!recommendation.reasoning.is_empty());
        }
    }
    let elapsed = start.elapsed();

    let evaluations = iterations * requests.len() as u128;
    println!(
        "Evaluated {} recommendations in {:?} ({:.2}μs each)",
        evaluations,
        elapsed,
        elapsed.as_micros() as f64 / evaluations as f64
    );

    // ~6000 evaluations should finish well under a second
    assert!(
        elapsed.as_millis() < 1000,
        "Recommendations too slow: {:?}ms (target: <1000ms)",
        elapsed.as_millis()
    );
}

/// Test that compound comparison scales to long races
#[test]
fn test_compare_long_race() {
    let config = StrategyConfig::default();

    let start = Instant::now();
    for current_lap in 0..1000 {
        let comparison = compare_compounds(1000, current_lap, &config).unwrap();
        assert_eq!(comparison.strategies.len(), 3);
    }
    let elapsed = start.elapsed();

    println!("Compared 1000 race states in {:?}", elapsed);

    assert!(
        elapsed.as_millis() < 500,
        "Comparison too slow: {:?}ms (target: <500ms)",
        elapsed.as_millis()
    );
}

/// Test that concurrent callers get the same answers as a single caller
#[test]
fn test_parallel_evaluations_agree() {
    let config = StrategyConfig::default();
    let expected: Vec<String> = (1..60)
        .map(|lap| {
            serde_json::to_string(&evaluate_pit_recommendation(&sample_request(lap), &config).unwrap())
                .unwrap()
        })
        .collect();

    let start = Instant::now();
    let results: Vec<Vec<String>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (1..60)
                        .map(|lap| {
                            let recommendation =
                                evaluate_pit_recommendation(&sample_request(lap), &config).unwrap();
                            serde_json::to_string(&recommendation).unwrap()
                        })
                        .collect::<Vec<String>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    println!("8 threads finished in {:?}", start.elapsed());

    for result in results {
        assert_eq!(result, expected);
    }
}
