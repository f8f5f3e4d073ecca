use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;

use super::{Compound, TireDegradationModel};

/// Running the rest of the race on one compound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundStrategy {
    pub compound: Compound,
    /// Usable life at nominal track temperature, in laps
    pub tire_life: u32,
    pub can_finish: bool,
    pub pit_stops_needed: u32,
    pub degradation_per_lap: f64,
    /// Seconds lost to tire wear over all remaining stints
    pub total_degradation: f64,
    /// Pit losses plus wear losses, in seconds
    pub total_time_impact: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundComparison {
    /// Best strategy first
    pub strategies: Vec<CompoundStrategy>,
}

impl CompoundComparison {
    pub fn recommended(&self) -> Option<&CompoundStrategy> {
        self.strategies.iter().find(|s| s.recommended)
    }
}

/// Compares whole-race strategies across all dry compounds, independent of the live stint.
#[derive(Debug, Clone)]
pub struct CompoundComparator {
    tire_model: TireDegradationModel,
    pit_stop_time_loss: f64,
    max_pit_stops: u32,
}

impl CompoundComparator {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            tire_model: TireDegradationModel::new(config),
            pit_stop_time_loss: config.pit_stop_time_loss,
            max_pit_stops: config.max_pit_stops,
        }
    }

    /// Splits `laps` into `stints` runs whose lengths differ by at most one lap.
    /// Returns `(short_stint_laps, long_stints)`; `long_stints` of the runs are one lap longer.
    fn stint_split(laps: u32, stints: u32) -> (u32, u32) {
        let stints = stints.max(1);
        (laps / stints, laps % stints)
    }

    /// Lap time lost over a stint whose lap times grow linearly with tire age.
    fn stint_degradation(rate: f64, laps: u32) -> f64 {
        let laps = laps as f64;
        rate * laps * (laps + 1.0) / 2.0
    }

    fn strategy(&self, compound: Compound, remaining_laps: u32) -> CompoundStrategy {
        let nominal_temp = self.tire_model.nominal_track_temp();
        let tire_life = self.tire_model.adjusted_life(compound, nominal_temp);
        let degradation_per_lap = self.tire_model.degradation_rate(compound, nominal_temp);

        let pit_stops_needed = remaining_laps.div_ceil(tire_life).saturating_sub(1);
        let can_finish = tire_life as u64 * (pit_stops_needed as u64 + 1) >= remaining_laps as u64
            && pit_stops_needed <= self.max_pit_stops;

        let stints = pit_stops_needed.saturating_add(1);
        let (short_laps, long_stints) = Self::stint_split(remaining_laps, stints);
        let total_degradation = long_stints as f64
            * Self::stint_degradation(degradation_per_lap, short_laps.saturating_add(1))
            + (stints - long_stints) as f64
                * Self::stint_degradation(degradation_per_lap, short_laps);
        let total_time_impact =
            pit_stops_needed as f64 * self.pit_stop_time_loss + total_degradation;

        CompoundStrategy {
            compound,
            tire_life,
            can_finish,
            pit_stops_needed,
            degradation_per_lap,
            total_degradation,
            total_time_impact,
            recommended: false,
        }
    }

    pub fn compare(&self, total_laps: u32, current_lap: u32) -> CompoundComparison {
        let remaining_laps = total_laps.saturating_sub(current_lap);

        let mut strategies = Compound::ALL
            .iter()
            .map(|compound| self.strategy(*compound, remaining_laps))
            .sorted_by(|a, b| {
                b.can_finish
                    .cmp(&a.can_finish)
                    .then_with(|| a.total_time_impact.total_cmp(&b.total_time_impact))
                    .then_with(|| a.pit_stops_needed.cmp(&b.pit_stops_needed))
                    .then_with(|| a.degradation_per_lap.total_cmp(&b.degradation_per_lap))
            })
            .collect_vec();

        if let Some(best) = strategies.first_mut().filter(|s| s.can_finish) {
            best.recommended = true;
        }

        debug!(
            "Compared compounds over {} laps: {}",
            remaining_laps,
            strategies
                .iter()
                .map(|s| format!(
                    "{} {} stops {:.1}s",
                    s.compound, s.pit_stops_needed, s.total_time_impact
                ))
                .join(", ")
        );
        CompoundComparison { strategies }
    }
}
