use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::PitwallError;

const CONFIG_DIR_NAME: &str = "pitwall";
const CONFIG_FILE_NAME: &str = "strategy.json";

/// Tunable constants for the strategy engine.
///
/// Every evaluation is a pure function of (race snapshot, config). Fields missing from a
/// config file fall back to their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StrategyConfig {
    /// Track temperature (°C) at which tires reach their full usable life
    pub nominal_track_temp: f64,
    /// Life loss per squared degree above nominal
    pub hot_temp_sensitivity: f64,
    /// Life loss per squared degree below nominal
    pub cold_temp_sensitivity: f64,
    /// Seconds lost driving through the pit lane under green
    pub pit_stop_time_loss: f64,
    /// Fraction of the pit loss saved when the field is slowed by a caution
    pub caution_discount: f64,
    /// Liters per lap used when no measured rate is supplied
    pub default_fuel_consumption: f64,
    /// Laps of fuel to keep in hand when planning a fuel stop
    pub fuel_margin_laps: u32,
    /// Gap (s) under which a rival ahead can be undercut, or a rival behind can undercut us
    pub undercut_window_s: f64,
    /// Minimum stint age before an undercut is worth considering
    pub min_undercut_stint_laps: u32,
    /// Lap time gained per lap on fresh tires
    pub fresh_tire_gain_per_lap: f64,
    /// Minimum window confidence for the engine to open the pit window
    pub acceptance_threshold: f64,
    /// How many laps ahead a window may start and still open now
    pub lookahead_laps: u32,
    /// Strategies needing more stops than this cannot finish the race
    pub max_pit_stops: u32,
    /// Gap (s) to the car behind above which we can stop and rejoin in clear air
    pub clear_air_gap_s: f64,
    /// Share of the race that must be run before a mid-race clear-air stop is planned
    pub clear_air_min_race_fraction: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            nominal_track_temp: 25.0,
            hot_temp_sensitivity: 0.003,
            cold_temp_sensitivity: 0.001,
            pit_stop_time_loss: 25.0,
            caution_discount: 0.6,
            default_fuel_consumption: 3.5,
            fuel_margin_laps: 2,
            undercut_window_s: 3.0,
            min_undercut_stint_laps: 8,
            fresh_tire_gain_per_lap: 0.4,
            acceptance_threshold: 0.6,
            lookahead_laps: 2,
            max_pit_stops: 3,
            clear_air_gap_s: 5.0,
            clear_air_min_race_fraction: 0.3,
        }
    }
}

impl StrategyConfig {
    fn local_config_path() -> Option<PathBuf> {
        Some(
            dirs::config_dir()?
                .join(CONFIG_DIR_NAME)
                .join(CONFIG_FILE_NAME),
        )
    }

    /// Loads the user's config file, if one was saved.
    pub fn from_local_file() -> Result<Option<Self>, PitwallError> {
        match Self::local_config_path() {
            Some(config_path) if config_path.exists() => Self::from_path(&config_path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn from_path(config_path: &Path) -> Result<Self, PitwallError> {
        let file = std::fs::File::open(config_path)
            .map_err(|e| PitwallError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the models cannot work with, naming the first bad field.
    pub fn validate(&self) -> Result<(), PitwallError> {
        finite("nominal_track_temp", self.nominal_track_temp)?;
        at_least("hot_temp_sensitivity", self.hot_temp_sensitivity, 0.0)?;
        at_least("cold_temp_sensitivity", self.cold_temp_sensitivity, 0.0)?;
        at_least("pit_stop_time_loss", self.pit_stop_time_loss, 0.0)?;
        fraction("caution_discount", self.caution_discount)?;
        positive("default_fuel_consumption", self.default_fuel_consumption)?;
        positive("undercut_window_s", self.undercut_window_s)?;
        at_least("fresh_tire_gain_per_lap", self.fresh_tire_gain_per_lap, 0.0)?;
        fraction("acceptance_threshold", self.acceptance_threshold)?;
        at_least("clear_air_gap_s", self.clear_air_gap_s, 0.0)?;
        fraction("clear_air_min_race_fraction", self.clear_air_min_race_fraction)?;
        Ok(())
    }

    /// Explicit path first, then the local config file, then defaults.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self, PitwallError> {
        match config_path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::from_local_file()?.unwrap_or_default()),
        }
    }

    pub fn save(&self) -> Result<(), PitwallError> {
        let config_path = Self::local_config_path().ok_or(PitwallError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), PitwallError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| PitwallError::ConfigIOError { source: e })?;
            }
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }
}

fn finite(field: &str, value: f64) -> Result<f64, PitwallError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PitwallError::invalid_input(field, "must be a finite number"))
    }
}

fn at_least(field: &str, value: f64, min: f64) -> Result<(), PitwallError> {
    if finite(field, value)? < min {
        return Err(PitwallError::invalid_input(
            field,
            format!("must be at least {min}, got {value}"),
        ));
    }
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), PitwallError> {
    if finite(field, value)? <= 0.0 {
        return Err(PitwallError::invalid_input(
            field,
            format!("must be positive, got {value}"),
        ));
    }
    Ok(())
}

fn fraction(field: &str, value: f64) -> Result<(), PitwallError> {
    if !(0.0..=1.0).contains(&finite(field, value)?) {
        return Err(PitwallError::invalid_input(
            field,
            format!("must be between 0 and 1, got {value}"),
        ));
    }
    Ok(())
}
