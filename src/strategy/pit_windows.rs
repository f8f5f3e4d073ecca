use std::cmp::Ordering;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;

use super::{GapAssessment, RaceState, TireDegradationModel, TireStatus};

const TIRE_CONFIDENCE: f64 = 0.75;
const FUEL_CONFIDENCE: f64 = 0.9;
const CAUTION_CONFIDENCE: f64 = 0.9;
const UNDERCUT_BASE_CONFIDENCE: f64 = 0.5;
const UNDERCUT_OPPORTUNITY_WEIGHT: f64 = 0.3;
const CLEAR_AIR_CONFIDENCE: f64 = 0.6;

/// Confidence added for every other window covering an overlapping lap range
const AGREEMENT_BONUS: f64 = 0.05;
/// Distance (laps) at which a window's confidence is halved
const PROXIMITY_HORIZON_LAPS: f64 = 10.0;
/// Width of the fuel window ahead of its last safe lap
const FUEL_WINDOW_SPAN_LAPS: u32 = 2;
/// Share of the race distance the clear-air window is centred on
const CLEAR_AIR_ANCHOR_FRACTION: f64 = 0.5;
/// Laps either side of the clear-air anchor
const CLEAR_AIR_HALF_SPAN_LAPS: u32 = 2;

/// What anchored a pit window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowReason {
    TireWear,
    FuelShortfall,
    Caution,
    Undercut,
    ClearAir,
}

impl std::fmt::Display for WindowReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WindowReason::TireWear => write!(f, "tire wear"),
            WindowReason::FuelShortfall => write!(f, "fuel shortfall"),
            WindowReason::Caution => write!(f, "caution"),
            WindowReason::Undercut => write!(f, "undercut"),
            WindowReason::ClearAir => write!(f, "clear air"),
        }
    }
}

/// A range of laps in which stopping makes sense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitWindow {
    pub lap_start: u32,
    pub lap_end: u32,
    pub reason: WindowReason,
    /// Seconds lost by stopping in this window
    pub estimated_time_loss: f64,
    /// 0-1
    pub confidence: f64,
}

impl PitWindow {
    fn overlaps(&self, other: &PitWindow) -> bool {
        self.lap_start <= other.lap_end && other.lap_start <= self.lap_end
    }
}

/// Orders windows by start lap, then higher confidence, then lower time loss.
pub(crate) fn window_order(a: &PitWindow, b: &PitWindow) -> Ordering {
    a.lap_start
        .cmp(&b.lap_start)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.estimated_time_loss.total_cmp(&b.estimated_time_loss))
}

/// Builds candidate pit windows from the tire, fuel and gap signals.
#[derive(Debug, Clone)]
pub struct PitWindowPlanner {
    pit_stop_time_loss: f64,
    fuel_margin_laps: u32,
    min_undercut_stint_laps: u32,
    clear_air_gap_s: f64,
    clear_air_min_race_fraction: f64,
}

impl PitWindowPlanner {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            pit_stop_time_loss: config.pit_stop_time_loss,
            fuel_margin_laps: config.fuel_margin_laps,
            min_undercut_stint_laps: config.min_undercut_stint_laps,
            clear_air_gap_s: config.clear_air_gap_s,
            clear_air_min_race_fraction: config.clear_air_min_race_fraction,
        }
    }

    /// Candidate windows sorted by [`window_order`]. The first one is the preferred stop.
    pub fn plan(
        &self,
        race: &RaceState,
        tire: &TireStatus,
        laps_on_fuel: f64,
        gaps: &GapAssessment,
    ) -> Vec<PitWindow> {
        let current_lap = race.current_lap;
        let total_laps = race.total_laps;
        let remaining_laps = race.remaining_laps();

        // (window, base confidence) pairs; confidence is settled once all candidates are known
        let mut candidates: Vec<(PitWindow, f64)> = Vec::new();

        if tire.estimated_remaining_laps < remaining_laps {
            let lap_start = current_lap
                .saturating_add(TireDegradationModel::laps_until_warning(tire))
                .min(total_laps);
            let lap_end = current_lap
                .saturating_add(tire.estimated_remaining_laps)
                .max(lap_start)
                .min(total_laps);
            candidates.push((
                self.window(race, lap_start.min(lap_end), lap_end, WindowReason::TireWear, gaps),
                TIRE_CONFIDENCE,
            ));
        }

        if laps_on_fuel < remaining_laps as f64 {
            let empty_lap = current_lap.saturating_add(laps_on_fuel.floor() as u32);
            let lap_end = empty_lap
                .saturating_sub(self.fuel_margin_laps)
                .max(current_lap);
            let lap_start = lap_end
                .saturating_sub(FUEL_WINDOW_SPAN_LAPS)
                .max(current_lap);
            candidates.push((
                self.window(race, lap_start, lap_end, WindowReason::FuelShortfall, gaps),
                FUEL_CONFIDENCE,
            ));
        }

        if race.is_caution {
            candidates.push((
                self.window(race, current_lap, current_lap, WindowReason::Caution, gaps),
                CAUTION_CONFIDENCE,
            ));
        }

        if gaps.undercut_opportunity > 0.0
            && gaps.undercut_viable
            && tire.stint_laps >= self.min_undercut_stint_laps
        {
            let lap_start = current_lap.saturating_add(1).min(total_laps);
            let lap_end = current_lap.saturating_add(2).min(total_laps);
            candidates.push((
                self.window(race, lap_start, lap_end, WindowReason::Undercut, gaps),
                UNDERCUT_BASE_CONFIDENCE + UNDERCUT_OPPORTUNITY_WEIGHT * gaps.undercut_opportunity,
            ));
        }

        if race.gap_behind > self.clear_air_gap_s
            && current_lap as f64 > total_laps as f64 * self.clear_air_min_race_fraction
        {
            let anchor = (total_laps as f64 * CLEAR_AIR_ANCHOR_FRACTION).floor() as u32;
            let lap_start = anchor
                .saturating_sub(CLEAR_AIR_HALF_SPAN_LAPS)
                .max(current_lap);
            let lap_end = anchor
                .saturating_add(CLEAR_AIR_HALF_SPAN_LAPS)
                .min(total_laps);
            // skipped once the middle of the race is behind us
            if lap_start <= lap_end {
                candidates.push((
                    self.window(race, lap_start, lap_end, WindowReason::ClearAir, gaps),
                    CLEAR_AIR_CONFIDENCE,
                ));
            }
        }

        let mut windows: Vec<PitWindow> = candidates
            .iter()
            .enumerate()
            .map(|(idx, (window, base_confidence))| {
                let agreeing = candidates
                    .iter()
                    .enumerate()
                    .filter(|(other_idx, (other, _))| *other_idx != idx && window.overlaps(other))
                    .count();
                let distance = window.lap_start.saturating_sub(current_lap) as f64;
                let confidence = (base_confidence + AGREEMENT_BONUS * agreeing as f64)
                    / (1.0 + distance / PROXIMITY_HORIZON_LAPS);
                PitWindow {
                    confidence: confidence.clamp(0.0, 1.0),
                    ..window.clone()
                }
            })
            .collect();

        windows.sort_by(window_order);
        debug!("Planned {} pit windows: {:?}", windows.len(), windows);
        windows
    }

    fn window(
        &self,
        race: &RaceState,
        lap_start: u32,
        lap_end: u32,
        reason: WindowReason,
        gaps: &GapAssessment,
    ) -> PitWindow {
        // the caution discount only holds for a stop taken while the field is still slowed
        let estimated_time_loss = if race.is_caution && lap_start == race.current_lap {
            gaps.pit_lane_loss
        } else {
            self.pit_stop_time_loss
        };
        PitWindow {
            lap_start,
            lap_end,
            reason,
            estimated_time_loss: estimated_time_loss.max(0.0),
            confidence: 0.0,
        }
    }
}
