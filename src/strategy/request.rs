use serde::{Deserialize, Serialize};

use crate::PitwallError;
use crate::config::StrategyConfig;

use super::{Compound, RaceState, TireStint};

/// Flat parameter set sent by the pit wall for one evaluation.
///
/// Integer fields are signed so that out-of-range values reach validation and are reported
/// by field name instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitRequest {
    pub current_lap: i64,
    pub total_laps: i64,
    pub current_position: i64,
    pub fuel_remaining: f64,
    pub tire_compound: String,
    pub tire_stint_laps: i64,
    pub gap_ahead: f64,
    pub gap_behind: f64,
    #[serde(default)]
    pub is_caution: bool,
    /// Track temperature in °C, nominal when absent
    #[serde(default)]
    pub track_temp: Option<f64>,
    /// Measured liters per lap, reference rate when absent
    #[serde(default)]
    pub fuel_consumption_rate: Option<f64>,
}

impl PitRequest {
    /// Checks every field and builds the engine's typed snapshot.
    pub fn validate(&self, config: &StrategyConfig) -> Result<(RaceState, TireStint), PitwallError> {
        let (total_laps, current_lap) = validate_race_distance(self.total_laps, self.current_lap)?;
        if self.current_position < 1 {
            return Err(PitwallError::invalid_input(
                "current_position",
                "must be 1 or greater",
            ));
        }
        let race = RaceState {
            current_lap,
            total_laps,
            current_position: count("current_position", self.current_position)?,
            fuel_remaining: non_negative("fuel_remaining", self.fuel_remaining)?,
            gap_ahead: non_negative("gap_ahead", self.gap_ahead)?,
            gap_behind: non_negative("gap_behind", self.gap_behind)?,
            is_caution: self.is_caution,
        };
        let stint = validate_tire_stint(
            &self.tire_compound,
            self.tire_stint_laps,
            self.track_temp,
            config,
        )?;
        Ok((race, stint))
    }
}

fn count(field: &str, value: i64) -> Result<u32, PitwallError> {
    if value < 0 {
        return Err(PitwallError::invalid_input(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    u32::try_from(value)
        .map_err(|_| PitwallError::invalid_input(field, format!("is too large, got {value}")))
}

fn non_negative(field: &str, value: f64) -> Result<f64, PitwallError> {
    if !value.is_finite() {
        return Err(PitwallError::invalid_input(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(PitwallError::invalid_input(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(value)
}

/// Returns `(total_laps, current_lap)` once the race is known to still be running.
pub(crate) fn validate_race_distance(
    total_laps: i64,
    current_lap: i64,
) -> Result<(u32, u32), PitwallError> {
    let current_lap = count("current_lap", current_lap)?;
    let total_laps = count("total_laps", total_laps)?;
    if current_lap >= total_laps {
        return Err(PitwallError::invalid_input(
            "current_lap",
            format!("must be lower than total_laps ({total_laps}), got {current_lap}"),
        ));
    }
    Ok((total_laps, current_lap))
}

pub(crate) fn validate_tire_stint(
    compound: &str,
    stint_laps: i64,
    track_temp: Option<f64>,
    config: &StrategyConfig,
) -> Result<TireStint, PitwallError> {
    let compound: Compound = compound.parse()?;
    let stint_laps = count("tire_stint_laps", stint_laps)?;
    let track_temp = match track_temp {
        Some(temp) => validate_track_temp(temp)?,
        None => config.nominal_track_temp,
    };
    Ok(TireStint {
        compound,
        stint_laps,
        track_temp,
    })
}

pub(crate) fn validate_track_temp(track_temp: f64) -> Result<f64, PitwallError> {
    if !track_temp.is_finite() {
        return Err(PitwallError::invalid_input(
            "track_temp",
            "must be a finite number",
        ));
    }
    Ok(track_temp)
}

/// Checks a snapshot built directly by a library caller.
pub(crate) fn validate_race_state(race: &RaceState) -> Result<(), PitwallError> {
    validate_race_distance(race.total_laps as i64, race.current_lap as i64)?;
    if race.current_position < 1 {
        return Err(PitwallError::invalid_input(
            "current_position",
            "must be 1 or greater",
        ));
    }
    non_negative("fuel_remaining", race.fuel_remaining)?;
    non_negative("gap_ahead", race.gap_ahead)?;
    non_negative("gap_behind", race.gap_behind)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PitRequest {
        PitRequest {
            current_lap: 20,
            total_laps: 50,
            current_position: 4,
            fuel_remaining: 80.0,
            tire_compound: "medium".to_string(),
            tire_stint_laps: 8,
            gap_ahead: 2.5,
            gap_behind: 4.0,
            is_caution: false,
            track_temp: None,
            fuel_consumption_rate: None,
        }
    }

    fn failed_field(result: Result<(RaceState, TireStint), PitwallError>) -> String {
        match result {
            Err(PitwallError::InvalidInput { field, .. }) => field,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_request_builds_snapshot() {
        let config = StrategyConfig::default();
        let (race, stint) = request().validate(&config).unwrap();

        assert_eq!(race.current_lap, 20);
        assert_eq!(race.remaining_laps(), 30);
        assert_eq!(stint.compound, Compound::Medium);
        assert_eq!(stint.track_temp, config.nominal_track_temp);
    }

    #[test]
    fn test_each_field_is_named_on_failure() {
        let config = StrategyConfig::default();

        let cases: Vec<(&str, PitRequest)> = vec![
            ("current_lap", PitRequest { current_lap: -1, ..request() }),
            ("current_lap", PitRequest { current_lap: 50, ..request() }),
            ("total_laps", PitRequest { total_laps: -5, ..request() }),
            ("current_position", PitRequest { current_position: 0, ..request() }),
            ("fuel_remaining", PitRequest { fuel_remaining: -0.5, ..request() }),
            ("fuel_remaining", PitRequest { fuel_remaining: f64::NAN, ..request() }),
            ("gap_ahead", PitRequest { gap_ahead: -1.0, ..request() }),
            ("gap_behind", PitRequest { gap_behind: f64::INFINITY, ..request() }),
            ("tire_stint_laps", PitRequest { tire_stint_laps: -3, ..request() }),
            ("track_temp", PitRequest { track_temp: Some(f64::NAN), ..request() }),
        ];

        for (field, case) in cases {
            assert_eq!(failed_field(case.validate(&config)), field);
        }
    }

    #[test]
    fn test_unknown_compound_is_rejected() {
        let config = StrategyConfig::default();
        let result = PitRequest {
            tire_compound: "wet".to_string(),
            ..request()
        }
        .validate(&config);
        assert!(matches!(result, Err(PitwallError::UnknownCompound { .. })));
    }

    #[test]
    fn test_request_deserializes_without_optional_fields() {
        let json = r#"{
            "current_lap": 12, "total_laps": 40, "current_position": 2,
            "fuel_remaining": 60.0, "tire_compound": "soft", "tire_stint_laps": 6,
            "gap_ahead": 1.2, "gap_behind": 3.4
        }"#;
        let parsed: PitRequest = serde_json::from_str(json).unwrap();
        assert!(!parsed.is_caution);
        assert_eq!(parsed.track_temp, None);
        assert_eq!(parsed.fuel_consumption_rate, None);
    }
}
