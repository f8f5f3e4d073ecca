use serde::{Deserialize, Serialize};

use crate::config::StrategyConfig;

/// Time gained on the in-lap while the rival slows for pit entry
const IN_LAP_GAIN_S: f64 = 0.5;
/// Laps over which the fresh tire advantage keeps paying out on the out-lap
const OUT_LAP_GAIN_LAPS: f64 = 2.0;
/// Cap on the tire age advantage that counts towards an undercut
const MAX_TIRE_AGE_ADVANTAGE_LAPS: u32 = 5;

/// Weights the planner draws from the gaps around us.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAssessment {
    /// 0-1, rises as the car ahead gets closer
    pub undercut_opportunity: f64,
    /// 0-1, rises as the car behind gets closer
    pub overcut_risk: f64,
    /// Seconds lost stopping on this lap
    pub pit_lane_loss: f64,
    /// Seconds an undercut should gain on the car ahead
    pub undercut_gain: f64,
    /// The undercut gains more than the gap to the car ahead
    pub undercut_viable: bool,
}

/// Turns gaps to the rivals around us into undercut and overcut signals.
#[derive(Debug, Clone)]
pub struct GapAnalyzer {
    pit_stop_time_loss: f64,
    caution_discount: f64,
    undercut_window_s: f64,
    fresh_tire_gain_per_lap: f64,
}

impl GapAnalyzer {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            pit_stop_time_loss: config.pit_stop_time_loss,
            caution_discount: config.caution_discount.clamp(0.0, 1.0),
            undercut_window_s: config.undercut_window_s,
            fresh_tire_gain_per_lap: config.fresh_tire_gain_per_lap,
        }
    }

    fn closeness(&self, gap: f64) -> f64 {
        if self.undercut_window_s <= 0.0 {
            return 0.0;
        }
        (1.0 - gap / self.undercut_window_s).clamp(0.0, 1.0)
    }

    pub fn undercut_opportunity(&self, gap_ahead: f64) -> f64 {
        self.closeness(gap_ahead)
    }

    pub fn overcut_risk(&self, gap_behind: f64) -> f64 {
        self.closeness(gap_behind)
    }

    pub fn pit_lane_loss(&self, is_caution: bool) -> f64 {
        if is_caution {
            self.pit_stop_time_loss * (1.0 - self.caution_discount)
        } else {
            self.pit_stop_time_loss
        }
    }

    /// Time an undercut gains: out-lap and in-lap gains plus the tire age advantage.
    pub fn undercut_gain(&self, tire_age_difference: u32) -> f64 {
        let out_lap_gain = self.fresh_tire_gain_per_lap * OUT_LAP_GAIN_LAPS;
        let age_gain = self.fresh_tire_gain_per_lap
            * tire_age_difference.min(MAX_TIRE_AGE_ADVANTAGE_LAPS) as f64;
        out_lap_gain + IN_LAP_GAIN_S + age_gain
    }

    pub fn assess(
        &self,
        gap_ahead: f64,
        gap_behind: f64,
        is_caution: bool,
        tire_age_difference: u32,
    ) -> GapAssessment {
        let undercut_gain = self.undercut_gain(tire_age_difference);
        GapAssessment {
            undercut_opportunity: self.undercut_opportunity(gap_ahead),
            overcut_risk: self.overcut_risk(gap_behind),
            pit_lane_loss: self.pit_lane_loss(is_caution),
            undercut_gain,
            undercut_viable: undercut_gain > gap_ahead,
        }
    }
}
