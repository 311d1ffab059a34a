//! Shock impedance matching on tabulated or fitted Hugoniots.
//!
//! Given the Hugoniots of a driver and a target material, the library finds the
//! pressure and particle velocity shared by both materials at their interface
//! after a shock crosses it. Units are km/s, GPa, g/cm^3 and kJ/g throughout.

pub use config::RunConfig;
pub use constants::SolverSettings;
pub use construct::{CurveConstructor, CurveRole, HugoniotSource, ImpactCondition, MatchQuery};
pub use curve::{CurveKind, CurvePoint, HugoniotCurve};
pub use errors::{ConfigError, FailureReason, HugoniotError, MatchFailure};
pub use layered::{InterfaceMatch, LayeredImpact};
pub use material::{Gruneisen, HugoniotPoint, MaterialRecord, MaterialSet};
pub use solver::{
    match_query, ImpedanceMatch, ImpedanceMatchSolver, JumpSummary, MatchResult, MatchState,
    WaveRegime,
};
pub use sweep::{SweepPoint, VelocitySweep};

mod config;
pub mod constants;
mod construct;
mod curve;
mod errors;
pub mod hugoniot;
pub mod intersection;
mod layered;
mod material;
pub mod release;
mod solver;
mod sweep;
