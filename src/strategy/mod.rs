use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::PitwallError;
use crate::config::StrategyConfig;

pub mod compound_comparator;
pub mod fuel_model;
pub mod gap_analyzer;
pub mod pit_windows;
pub mod recommendations;
pub mod request;
pub mod tire_model;


pub use compound_comparator::{CompoundComparator, CompoundComparison, CompoundStrategy};
pub use fuel_model::FuelModel;
pub use gap_analyzer::{GapAnalyzer, GapAssessment};
pub use pit_windows::{PitWindow, PitWindowPlanner, WindowReason};
pub use recommendations::{
    AlternativeStrategy, DecisionState, PitRecommendation, RecommendationEngine, StrategyTag,
};
pub use request::PitRequest;
pub use tire_model::{LapTimeTrend, TireDegradationModel};

/// Dry tire compounds, ordered from fastest-wearing to most durable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Compound {
    Soft,
    Medium,
    Hard,
}

impl Compound {
    pub const ALL: [Compound; 3] = [Compound::Soft, Compound::Medium, Compound::Hard];

    /// Laps before performance collapses at nominal track temperature.
    pub fn base_life_laps(self) -> u32 {
        match self {
            Compound::Soft => 15,
            Compound::Medium => 25,
            Compound::Hard => 35,
        }
    }

    /// Lap time lost per lap of wear (seconds) at nominal track temperature.
    pub fn base_degradation_rate(self) -> f64 {
        match self {
            Compound::Soft => 0.08,
            Compound::Medium => 0.05,
            Compound::Hard => 0.03,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compound::Soft => "soft",
            Compound::Medium => "medium",
            Compound::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Compound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Compound {
    type Err = PitwallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soft" => Ok(Compound::Soft),
            "medium" => Ok(Compound::Medium),
            "hard" => Ok(Compound::Hard),
            _ => Err(PitwallError::UnknownCompound { tag: s.to_string() }),
        }
    }
}

/// Snapshot of the race as seen from our car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceState {
    pub current_lap: u32,
    pub total_laps: u32,
    pub current_position: u32,
    /// Liters left in the tank
    pub fuel_remaining: f64,
    /// Seconds to the car ahead
    pub gap_ahead: f64,
    /// Seconds to the car behind
    pub gap_behind: f64,
    pub is_caution: bool,
}

impl RaceState {
    pub fn remaining_laps(&self) -> u32 {
        self.total_laps.saturating_sub(self.current_lap)
    }
}

/// The set of tires currently on the car.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireStint {
    pub compound: Compound,
    pub stint_laps: u32,
    /// Track surface temperature in °C
    pub track_temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TireCondition {
    Good,
    Warning,
    Critical,
}

impl std::fmt::Display for TireCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TireCondition::Good => write!(f, "good"),
            TireCondition::Warning => write!(f, "warning"),
            TireCondition::Critical => write!(f, "critical"),
        }
    }
}

/// Wear assessment of a tire stint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TireStatus {
    pub compound: Compound,
    pub stint_laps: u32,
    /// Usable life in laps after the track temperature adjustment
    pub tire_life: u32,
    /// 0-100, where 100 is a fresh tire
    pub performance_index: f64,
    pub status: TireCondition,
    pub estimated_remaining_laps: u32,
    /// Seconds per lap
    pub degradation_rate: f64,
}

/// Wear status of a tire stint. Without a track temperature the nominal one is assumed.
pub fn evaluate_tire_status(
    compound: &str,
    current_stint_laps: i64,
    track_temp: Option<f64>,
    config: &StrategyConfig,
) -> Result<TireStatus, PitwallError> {
    let stint = request::validate_tire_stint(compound, current_stint_laps, track_temp, config)?;
    Ok(TireDegradationModel::new(config).evaluate(&stint))
}

/// Full pit recommendation for one race snapshot.
pub fn evaluate_pit_recommendation(
    request: &PitRequest,
    config: &StrategyConfig,
) -> Result<PitRecommendation, PitwallError> {
    let (race, stint) = request.validate(config)?;
    RecommendationEngine::new(config).evaluate(
        &race,
        &stint,
        request.fuel_consumption_rate,
    )
}

/// Ranks single-compound strategies for the rest of the race.
pub fn compare_compounds(
    total_laps: i64,
    current_lap: i64,
    config: &StrategyConfig,
) -> Result<CompoundComparison, PitwallError> {
    let (total_laps, current_lap) = request::validate_race_distance(total_laps, current_lap)?;
    Ok(CompoundComparator::new(config).compare(total_laps, current_lap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compound_parsing_is_case_insensitive() {
        assert_eq!("Soft".parse::<Compound>().unwrap(), Compound::Soft);
        assert_eq!(" MEDIUM ".parse::<Compound>().unwrap(), Compound::Medium);
        assert_eq!("hard".parse::<Compound>().unwrap(), Compound::Hard);
    }

    #[test]
    fn test_unknown_compound_is_rejected() {
        let err = "intermediate".parse::<Compound>().unwrap_err();
        assert!(matches!(err, PitwallError::UnknownCompound { ref tag } if tag == "intermediate"));
    }

    #[test]
    fn test_life_is_inverse_to_wear_rate() {
        for pair in Compound::ALL.windows(2) {
            assert!(pair[0].base_degradation_rate() > pair[1].base_degradation_rate());
            assert!(pair[0].base_life_laps() < pair[1].base_life_laps());
        }
    }

    #[test]
    fn test_compound_serializes_as_lowercase_tag() {
        assert_eq!(serde_json::to_string(&Compound::Medium).unwrap(), "\"medium\"");
        assert_eq!(
            serde_json::to_string(&TireCondition::Critical).unwrap(),
            "\"critical\""
        );
    }

    #[test]
    fn test_evaluate_tire_status_defaults_to_nominal_temperature() {
        let config = StrategyConfig::default();
        let status = evaluate_tire_status("medium", 20, None, &config).unwrap();
        assert_eq!(status.tire_life, 25);
        assert!((status.performance_index - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_compare_compounds_rejects_finished_race() {
        let config = StrategyConfig::default();
        let err = compare_compounds(50, 50, &config).unwrap_err();
        assert!(matches!(err, PitwallError::InvalidInput { ref field, .. } if field == "current_lap"));
    }
}
