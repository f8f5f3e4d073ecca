use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::PitwallError;
use crate::config::StrategyConfig;

use super::request::{validate_race_state, validate_track_temp};
use super::{
    FuelModel, GapAnalyzer, GapAssessment, PitWindow, PitWindowPlanner, RaceState,
    TireCondition, TireDegradationModel, TireStatus, TireStint, WindowReason,
};

/// Share of the race distance at which the late-stop alternative is placed
const LATE_PIT_RACE_FRACTION: f64 = 0.7;
/// Laps from now for the early-stop alternative
const EARLY_PIT_OFFSET_LAPS: u32 = 2;

/// Outcome of one evaluation of the pit decision state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionState {
    StayOut,
    PitWindowOpen,
    PitNow,
}

impl DecisionState {
    pub fn should_pit(self) -> bool {
        !matches!(self, DecisionState::StayOut)
    }
}

/// Short label for the rule that decided the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyTag {
    TireCritical,
    FuelCritical,
    Caution,
    Undercut,
    TireWindow,
    FuelWindow,
    ClearAir,
    Conservative,
}

impl std::fmt::Display for StrategyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyTag::TireCritical => write!(f, "tire-critical"),
            StrategyTag::FuelCritical => write!(f, "fuel-critical"),
            StrategyTag::Caution => write!(f, "caution"),
            StrategyTag::Undercut => write!(f, "undercut"),
            StrategyTag::TireWindow => write!(f, "tire-window"),
            StrategyTag::FuelWindow => write!(f, "fuel-window"),
            StrategyTag::ClearAir => write!(f, "clear-air"),
            StrategyTag::Conservative => write!(f, "conservative"),
        }
    }
}

impl From<WindowReason> for StrategyTag {
    fn from(value: WindowReason) -> Self {
        match value {
            WindowReason::TireWear => StrategyTag::TireWindow,
            WindowReason::FuelShortfall => StrategyTag::FuelWindow,
            WindowReason::Caution => StrategyTag::Caution,
            WindowReason::Undercut => StrategyTag::Undercut,
            WindowReason::ClearAir => StrategyTag::ClearAir,
        }
    }
}

/// A different plan the engineer could follow instead of staying out as advised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeStrategy {
    pub name: String,
    pub lap: u32,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// The advice returned to the pit wall for one race snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitRecommendation {
    pub should_pit: bool,
    pub decision: DecisionState,
    pub strategy: StrategyTag,
    /// Lap to stop on, only set when stopping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimal_lap: Option<u32>,
    /// One entry per triggered rule, in evaluation order
    pub reasoning: Vec<String>,
    pub windows: Vec<PitWindow>,
    pub laps_on_fuel: f64,
    /// Liters per lap
    pub fuel_consumption_rate: f64,
    pub tire: TireStatus,
    pub alternatives: Vec<AlternativeStrategy>,
}

/// Everything the rules look at, computed once per evaluation.
struct RuleContext<'a> {
    race: &'a RaceState,
    tire: &'a TireStatus,
    laps_on_fuel: f64,
    gaps: &'a GapAssessment,
    windows: &'a [PitWindow],
}

/// A rule that fired, with the state it leads to.
struct Trigger {
    decision: DecisionState,
    strategy: StrategyTag,
    optimal_lap: u32,
    reason: String,
}

/// Decision rules in the order they are evaluated. The first one to fire decides the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    TireCritical,
    FuelCritical,
    CautionWindow,
    AcceptedWindow,
}

const RULE_ORDER: [Rule; 4] = [
    Rule::TireCritical,
    Rule::FuelCritical,
    Rule::CautionWindow,
    Rule::AcceptedWindow,
];

/// Runs the tire, fuel and gap models, plans windows, and decides whether to pit.
///
/// The engine keeps no state between calls: the same snapshot always produces the same
/// recommendation.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    tire_model: TireDegradationModel,
    gap_analyzer: GapAnalyzer,
    planner: PitWindowPlanner,
    default_fuel_consumption: f64,
    min_undercut_stint_laps: u32,
    acceptance_threshold: f64,
    lookahead_laps: u32,
}

impl RecommendationEngine {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            tire_model: TireDegradationModel::new(config),
            gap_analyzer: GapAnalyzer::new(config),
            planner: PitWindowPlanner::new(config),
            default_fuel_consumption: config.default_fuel_consumption,
            min_undercut_stint_laps: config.min_undercut_stint_laps,
            acceptance_threshold: config.acceptance_threshold,
            lookahead_laps: config.lookahead_laps,
        }
    }

    /// Evaluates one snapshot. Without a measured consumption rate the reference rate is used.
    pub fn evaluate(
        &self,
        race: &RaceState,
        stint: &TireStint,
        fuel_consumption_rate: Option<f64>,
    ) -> Result<PitRecommendation, PitwallError> {
        validate_race_state(race)?;
        validate_track_temp(stint.track_temp)?;

        let tire = self.tire_model.evaluate(stint);
        let fuel_model =
            FuelModel::with_default(fuel_consumption_rate, self.default_fuel_consumption)?;
        let laps_on_fuel = fuel_model.laps_on_fuel(race.fuel_remaining);
        let gaps = self.gap_analyzer.assess(
            race.gap_ahead,
            race.gap_behind,
            race.is_caution,
            stint.stint_laps.saturating_sub(self.min_undercut_stint_laps),
        );
        let windows = self.planner.plan(race, &tire, laps_on_fuel, &gaps);

        let context = RuleContext {
            race,
            tire: &tire,
            laps_on_fuel,
            gaps: &gaps,
            windows: &windows,
        };
        let triggers: Vec<Trigger> = RULE_ORDER
            .iter()
            .filter_map(|rule| self.check(*rule, &context))
            .collect();

        let mut reasoning: Vec<String> = triggers.iter().map(|t| t.reason.clone()).collect();
        let (decision, strategy, optimal_lap) = match triggers.first() {
            Some(trigger) => (
                trigger.decision,
                trigger.strategy,
                Some(trigger.optimal_lap),
            ),
            None => {
                reasoning.push(Self::stay_out_reason(&context));
                (DecisionState::StayOut, StrategyTag::Conservative, None)
            }
        };

        info!(
            "Lap {}/{}: {:?} ({}), optimal lap {:?}",
            race.current_lap, race.total_laps, decision, strategy, optimal_lap
        );

        let alternatives = if decision.should_pit() {
            Vec::new()
        } else {
            Self::alternatives(race)
        };

        Ok(PitRecommendation {
            should_pit: decision.should_pit(),
            decision,
            strategy,
            optimal_lap,
            reasoning,
            windows,
            laps_on_fuel,
            fuel_consumption_rate: fuel_model.consumption_rate(),
            tire,
            alternatives,
        })
    }

    fn check(&self, rule: Rule, context: &RuleContext) -> Option<Trigger> {
        let race = context.race;
        match rule {
            Rule::TireCritical => (context.tire.status == TireCondition::Critical).then(|| Trigger {
                decision: DecisionState::PitNow,
                strategy: StrategyTag::TireCritical,
                optimal_lap: race.current_lap,
                reason: format!(
                    "Tire life critical: {} at {:.1}% performance, {} laps remaining",
                    context.tire.compound,
                    context.tire.performance_index,
                    context.tire.estimated_remaining_laps
                ),
            }),
            Rule::FuelCritical => {
                let remaining_laps = race.remaining_laps();
                if context.laps_on_fuel >= remaining_laps as f64 {
                    return None;
                }
                warn!(
                    "Fuel for {:.1} laps with {} laps to go",
                    context.laps_on_fuel, remaining_laps
                );
                Some(Trigger {
                    decision: DecisionState::PitNow,
                    strategy: StrategyTag::FuelCritical,
                    optimal_lap: race.current_lap,
                    reason: format!(
                        "Fuel critical: only {:.1} laps of fuel for {} laps remaining",
                        context.laps_on_fuel, remaining_laps
                    ),
                })
            }
            Rule::CautionWindow => {
                if !race.is_caution {
                    return None;
                }
                let window = context
                    .windows
                    .iter()
                    .find(|w| w.reason == WindowReason::Caution)?;
                Some(Trigger {
                    decision: DecisionState::PitWindowOpen,
                    strategy: StrategyTag::Caution,
                    optimal_lap: race.current_lap,
                    reason: format!(
                        "Caution period: pitting now costs {:.1}s instead of {:.1}s",
                        window.estimated_time_loss,
                        self.gap_analyzer.pit_lane_loss(false)
                    ),
                })
            }
            Rule::AcceptedWindow => {
                let window = context.windows.first()?;
                if window.lap_start > race.current_lap.saturating_add(self.lookahead_laps)
                    || window.confidence <= self.acceptance_threshold
                {
                    return None;
                }
                Some(Trigger {
                    decision: DecisionState::PitWindowOpen,
                    strategy: window.reason.into(),
                    optimal_lap: window.lap_start,
                    reason: format!(
                        "{} window open: laps {}-{} at {:.0}% confidence",
                        window.reason,
                        window.lap_start,
                        window.lap_end,
                        window.confidence * 100.0
                    ),
                })
            }
        }
    }

    fn stay_out_reason(context: &RuleContext) -> String {
        let mut reason = format!(
            "Continue: {:.1} fuel laps, {} tire laps remaining",
            context.laps_on_fuel, context.tire.estimated_remaining_laps
        );
        if context.gaps.overcut_risk > 0.0 {
            reason.push_str(&format!(
                "; risk: car {:.1}s behind may undercut",
                context.race.gap_behind
            ));
        }
        reason
    }

    fn alternatives(race: &RaceState) -> Vec<AlternativeStrategy> {
        let late_lap = (race.total_laps as f64 * LATE_PIT_RACE_FRACTION).floor() as u32;
        let candidates = [
            AlternativeStrategy {
                name: "Early pit".to_string(),
                lap: race.current_lap.saturating_add(EARLY_PIT_OFFSET_LAPS),
                pros: vec!["Fresh tires".to_string(), "Clear air".to_string()],
                cons: vec!["Potential overcut vulnerability".to_string()],
            },
            AlternativeStrategy {
                name: "Late pit".to_string(),
                lap: late_lap,
                pros: vec![
                    "Track position".to_string(),
                    "Tire advantage at end".to_string(),
                ],
                cons: vec!["Fuel/tire risk".to_string()],
            },
        ];
        candidates
            .into_iter()
            .filter(|alt| alt.lap > race.current_lap && alt.lap <= race.total_laps)
            .collect()
    }
}
