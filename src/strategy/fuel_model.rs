use log::debug;
use simple_moving_average::{SMA, SumTreeSMA};

use crate::PitwallError;

/// Number of recent laps averaged when estimating consumption
const CONSUMPTION_WINDOW: usize = 5;

/// Fuel burn model for a fixed per-lap consumption rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelModel {
    consumption_rate: f64,
}

impl FuelModel {
    /// Fails for a rate that is not a positive, finite number of liters per lap.
    pub fn new(consumption_rate: f64) -> Result<Self, PitwallError> {
        if !consumption_rate.is_finite() || consumption_rate <= 0.0 {
            return Err(PitwallError::InvalidConsumptionRate {
                rate: consumption_rate,
            });
        }
        Ok(Self { consumption_rate })
    }

    /// Uses the supplied rate when present, the reference rate otherwise.
    pub fn with_default(
        consumption_rate: Option<f64>,
        default_rate: f64,
    ) -> Result<Self, PitwallError> {
        Self::new(consumption_rate.unwrap_or(default_rate))
    }

    /// Average of the last few per-lap fuel usage samples.
    pub fn estimate_consumption_rate(samples: &[f64]) -> Option<f64> {
        let mut window: SumTreeSMA<f64, f64, CONSUMPTION_WINDOW> = SumTreeSMA::new();
        samples
            .iter()
            .filter(|sample| sample.is_finite() && **sample > 0.0)
            .for_each(|sample| window.add_sample(*sample));

        if window.get_num_samples() == 0 {
            return None;
        }
        let rate = window.get_average();
        debug!(
            "Estimated fuel consumption {:.2} L/lap from {} samples",
            rate,
            window.get_num_samples()
        );
        Some(rate)
    }

    pub fn consumption_rate(&self) -> f64 {
        self.consumption_rate
    }

    pub fn laps_on_fuel(&self, fuel_remaining: f64) -> f64 {
        fuel_remaining.max(0.0) / self.consumption_rate
    }

    pub fn fuel_needed(&self, laps: u32) -> f64 {
        laps as f64 * self.consumption_rate
    }

    /// Laps short of the finish on the current fuel load, 0 when the car can make it.
    pub fn shortfall_laps(&self, fuel_remaining: f64, remaining_laps: u32) -> f64 {
        (remaining_laps as f64 - self.laps_on_fuel(fuel_remaining)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laps_on_fuel() {
        let model = FuelModel::new(2.0).unwrap();
        assert_eq!(model.laps_on_fuel(10.0), 5.0);
        assert_eq!(model.shortfall_laps(10.0, 10), 5.0);
        assert_eq!(model.shortfall_laps(30.0, 10), 0.0);
        assert_eq!(model.fuel_needed(10), 20.0);
    }

    #[test]
    fn test_empty_tank() {
        let model = FuelModel::new(3.5).unwrap();
        assert_eq!(model.laps_on_fuel(0.0), 0.0);
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                FuelModel::new(rate),
                Err(PitwallError::InvalidConsumptionRate { .. })
            ));
        }
    }

    #[test]
    fn test_default_rate_applies_when_none_supplied() {
        let model = FuelModel::with_default(None, 3.5).unwrap();
        assert_eq!(model.consumption_rate(), 3.5);

        let model = FuelModel::with_default(Some(2.8), 3.5).unwrap();
        assert_eq!(model.consumption_rate(), 2.8);
    }

    #[test]
    fn test_estimate_uses_recent_laps() {
        // only the last five samples count
        let samples = [10.0, 10.0, 3.0, 3.0, 3.0, 4.0, 4.0];
        let rate = FuelModel::estimate_consumption_rate(&samples).unwrap();
        assert!((rate - 3.4).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_without_samples() {
        assert_eq!(FuelModel::estimate_consumption_rate(&[]), None);
        assert_eq!(FuelModel::estimate_consumption_rate(&[0.0, -2.0]), None);
    }
}
