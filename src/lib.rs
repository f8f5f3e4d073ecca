// Library interface for pitwall
// This allows integration tests and benches to access the strategy engine

pub mod config;
pub mod errors;
pub mod strategy;
pub mod writer;

// Re-export commonly used types
pub use config::StrategyConfig;
pub use errors::PitwallError;
pub use strategy::{
    Compound, CompoundComparison, CompoundStrategy, PitRecommendation, PitRequest, PitWindow,
    RaceState, TireStatus, TireStint, compare_compounds, evaluate_pit_recommendation,
    evaluate_tire_status,
};
