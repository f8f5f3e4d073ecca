use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use simple_moving_average::{SMA, SumTreeSMA};

use crate::config::StrategyConfig;

use super::{Compound, TireCondition, TireStatus, TireStint};

/// Below this performance index the tire is worn enough to plan a stop
pub const WARNING_THRESHOLD: f64 = 60.0;
/// Below this performance index the tire has to come off now
pub const CRITICAL_THRESHOLD: f64 = 30.0;

/// Rolling window used to smooth observed lap times
const TREND_WINDOW: usize = 5;

/// Lap time standard deviation (s) under which a stint counts as consistent
const CONSISTENT_STD_DEV_S: f64 = 0.5;

/// Observed lap time degradation over a stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapTimeTrend {
    /// Least-squares slope of the smoothed lap times, seconds per lap
    pub degradation_rate: f64,
    /// Last minus first smoothed lap time
    pub total_degradation: f64,
    pub consistent: bool,
}

/// Compound wear model with a track temperature adjustment.
///
/// Usable life peaks at the nominal track temperature and falls off quadratically on either
/// side, faster when the track is hot. The degradation rate grows by the same factor.
#[derive(Debug, Clone)]
pub struct TireDegradationModel {
    nominal_track_temp: f64,
    hot_temp_sensitivity: f64,
    cold_temp_sensitivity: f64,
}

impl TireDegradationModel {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            nominal_track_temp: config.nominal_track_temp,
            hot_temp_sensitivity: config.hot_temp_sensitivity,
            cold_temp_sensitivity: config.cold_temp_sensitivity,
        }
    }

    pub fn nominal_track_temp(&self) -> f64 {
        self.nominal_track_temp
    }

    /// Multiplier on usable life, 1.0 at nominal temperature and shrinking away from it.
    pub fn life_factor(&self, track_temp: f64) -> f64 {
        let delta = track_temp - self.nominal_track_temp;
        let sensitivity = if delta > 0.0 {
            self.hot_temp_sensitivity
        } else {
            self.cold_temp_sensitivity
        };
        1.0 / (1.0 + sensitivity * delta * delta)
    }

    /// Usable life in whole laps, never less than one.
    pub fn adjusted_life(&self, compound: Compound, track_temp: f64) -> u32 {
        let life = (compound.base_life_laps() as f64 * self.life_factor(track_temp)).floor();
        (life as u32).max(1)
    }

    pub fn degradation_rate(&self, compound: Compound, track_temp: f64) -> f64 {
        compound.base_degradation_rate() / self.life_factor(track_temp)
    }

    pub fn performance_index(stint_laps: u32, tire_life: u32) -> f64 {
        let used = stint_laps as f64 / tire_life.max(1) as f64;
        (100.0 * (1.0 - used)).clamp(0.0, 100.0)
    }

    pub fn condition(performance_index: f64) -> TireCondition {
        if performance_index < CRITICAL_THRESHOLD {
            TireCondition::Critical
        } else if performance_index < WARNING_THRESHOLD {
            TireCondition::Warning
        } else {
            TireCondition::Good
        }
    }

    pub fn evaluate(&self, stint: &TireStint) -> TireStatus {
        let tire_life = self.adjusted_life(stint.compound, stint.track_temp);
        let performance_index = Self::performance_index(stint.stint_laps, tire_life);
        let status = TireStatus {
            compound: stint.compound,
            stint_laps: stint.stint_laps,
            tire_life,
            performance_index,
            status: Self::condition(performance_index),
            estimated_remaining_laps: tire_life.saturating_sub(stint.stint_laps),
            degradation_rate: self.degradation_rate(stint.compound, stint.track_temp),
        };
        debug!(
            "{} tires after {} laps at {:.1}°C: index {:.1} ({}), {} laps left",
            status.compound,
            status.stint_laps,
            stint.track_temp,
            status.performance_index,
            status.status,
            status.estimated_remaining_laps
        );
        status
    }

    /// Laps from now until the index first drops below the warning threshold.
    pub fn laps_until_warning(status: &TireStatus) -> u32 {
        (status.stint_laps..=status.tire_life)
            .find(|&laps| Self::performance_index(laps, status.tire_life) < WARNING_THRESHOLD)
            .map(|laps| laps - status.stint_laps)
            .unwrap_or(0)
    }

    /// Expected lap time `stint_lap` laps into a stint that started at `base_lap_time`.
    pub fn predict_lap_time(
        &self,
        base_lap_time: f64,
        compound: Compound,
        stint_lap: u32,
        track_temp: f64,
    ) -> f64 {
        base_lap_time + self.degradation_rate(compound, track_temp) * stint_lap as f64
    }

    /// Fits a degradation trend to observed `(lap, lap_time)` samples.
    pub fn lap_time_trend(laps: &[(u32, f64)]) -> LapTimeTrend {
        if laps.len() < TREND_WINDOW {
            return LapTimeTrend {
                degradation_rate: 0.0,
                total_degradation: 0.0,
                consistent: true,
            };
        }

        let sorted = laps
            .iter()
            .copied()
            .sorted_by(|a, b| a.0.cmp(&b.0))
            .collect_vec();

        let mut window: SumTreeSMA<f64, f64, TREND_WINDOW> = SumTreeSMA::new();
        let smoothed = sorted
            .iter()
            .map(|&(lap, lap_time)| {
                window.add_sample(lap_time);
                (lap as f64, window.get_average())
            })
            .collect_vec();

        let n = smoothed.len() as f64;
        let mean_x = smoothed.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = smoothed.iter().map(|(_, y)| y).sum::<f64>() / n;
        let covariance: f64 = smoothed
            .iter()
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();
        let variance: f64 = smoothed.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        let degradation_rate = if variance > 0.0 {
            covariance / variance
        } else {
            0.0
        };

        let raw_mean = sorted.iter().map(|(_, t)| t).sum::<f64>() / n;
        let raw_variance =
            sorted.iter().map(|(_, t)| (t - raw_mean).powi(2)).sum::<f64>() / (n - 1.0);

        LapTimeTrend {
            degradation_rate,
            total_degradation: smoothed[smoothed.len() - 1].1 - smoothed[0].1,
            consistent: raw_variance.sqrt() < CONSISTENT_STD_DEV_S,
        }
    }
}
