//! Impedance-match solver: the common (Up, P) state of driver and target.

use log::{debug, warn};

use crate::{
    constants::SolverSettings,
    construct::{CurveConstructor, ImpactCondition, MatchQuery},
    curve::{CurvePoint, HugoniotCurve},
    errors::{FailureReason, MatchFailure},
    intersection::{bracketed_roots, polyline_intersections, Crossing},
    material::MaterialSet,
    release::ReleaseModel,
};

/// Which wave the driver sees at the matched state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveRegime {
    /// An unshocked driver hits the target.
    Impact,
    /// A shocked driver releases into a lower impedance target.
    Release,
    /// A shocked driver is reshocked by a higher impedance target.
    Reshock,
}

/// Shocked state of one material at the matched interface state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpSummary {
    /// R / R00
    pub compression: f64,
    /// R (g/cm^3)
    pub density: f64,
    /// E - E0 (kJ/g)
    pub energy: f64,
}

impl JumpSummary {
    fn new(point: &CurvePoint, curve: &HugoniotCurve) -> Self {
        Self {
            compression: point.compression,
            density: curve.initial_state().density * point.compression,
            energy: point.energy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchState {
    pub particle_velocity: f64,
    pub pressure: f64,
    pub driver: JumpSummary,
    pub target: JumpSummary,
}

/// A successful match. Curves crossing more than once give secondary states.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpedanceMatch {
    pub primary: MatchState,
    /// Other crossings, ascending in Up.
    pub secondary: Vec<MatchState>,
    pub regime: WaveRegime,
}

impl ImpedanceMatch {
    pub fn is_ambiguous(&self) -> bool {
        !self.secondary.is_empty()
    }
}

/// Outcome of a query together with the curves it was solved on, when they
/// could be built.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub driver_curve: Option<HugoniotCurve>,
    pub target_curve: Option<HugoniotCurve>,
    pub outcome: Result<ImpedanceMatch, MatchFailure>,
}

impl MatchResult {
    pub fn failure(failure: MatchFailure) -> Self {
        Self {
            driver_curve: None,
            target_curve: None,
            outcome: Err(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn primary(&self) -> Option<&MatchState> {
        self.outcome.as_ref().ok().map(|m| &m.primary)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImpedanceMatchSolver {
    settings: SolverSettings,
}

impl ImpedanceMatchSolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    /// Particle velocity of the known driver state that crossings are ranked by.
    fn pivot(driver: &HugoniotCurve, query: &MatchQuery) -> Result<f64, MatchFailure> {
        match query.impact {
            ImpactCondition::ImpactVelocity(v) => Ok(0.5 * v),
            _ => driver.anchor().map(|a| a.particle_velocity).ok_or_else(|| {
                MatchFailure::new(
                    FailureReason::InvalidQuery,
                    format!(
                        "driver curve of {} does not mark its shocked state",
                        driver.material()
                    ),
                )
            }),
        }
    }

    /// Intersect the driver's release/reshock locus with the target Hugoniot.
    pub fn solve_match(
        &self,
        driver: &HugoniotCurve,
        target: &HugoniotCurve,
        query: &MatchQuery,
    ) -> MatchResult {
        MatchResult {
            driver_curve: Some(driver.clone()),
            target_curve: Some(target.clone()),
            outcome: self.find_match(driver, target, query),
        }
    }

    fn find_match(
        &self,
        driver: &HugoniotCurve,
        target: &HugoniotCurve,
        query: &MatchQuery,
    ) -> Result<ImpedanceMatch, MatchFailure> {
        let pivot = Self::pivot(driver, query)?;
        let driver_range = driver.up_range();
        let target_range = target.up_range();
        let extrapolate = query.extrapolate;

        let (lo, hi) = if extrapolate {
            (driver_range.0.min(target_range.0), driver_range.1.max(target_range.1))
        } else {
            (driver_range.0.max(target_range.0), driver_range.1.min(target_range.1))
        };
        if lo > hi {
            return Err(MatchFailure::new(
                FailureReason::NonOverlappingDomains,
                format!(
                    "{} and {} curves share no particle velocity range",
                    driver.material(),
                    target.material()
                ),
            )
            .with_ranges(driver_range, target_range));
        }

        let crossings = if driver.is_smooth() && target.is_smooth() {
            self.smooth_crossings(driver, target, lo, hi, extrapolate)?
        } else if extrapolate {
            let driver = driver.extended_to(lo, hi)?;
            let target = target.extended_to(lo, hi)?;
            polyline_intersections(&driver.points(), &target.points(), &self.settings)
        } else {
            polyline_intersections(&driver.points(), &target.points(), &self.settings)
        };
        debug!("{} crossing(s) on [{lo:.4}, {hi:.4}] km/s", crossings.len());

        let mut states: Vec<MatchState> = crossings
            .iter()
            .map(|c| MatchState {
                particle_velocity: c.particle_velocity,
                pressure: c.pressure,
                driver: JumpSummary::new(&c.driver, driver),
                target: JumpSummary::new(&c.target, target),
            })
            .collect();
        if states.is_empty() {
            return Err(MatchFailure::new(
                FailureReason::NoIntersection,
                format!(
                    "{} and {} curves do not cross",
                    driver.material(),
                    target.material()
                ),
            )
            .with_ranges(driver_range, target_range));
        }

        // Closest to the known driver state wins
        let primary_index = states
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                (a.particle_velocity - pivot)
                    .abs()
                    .total_cmp(&(b.particle_velocity - pivot).abs())
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let primary = states.remove(primary_index);
        if !states.is_empty() {
            warn!(
                "{} / {}: {} more crossing(s), keeping Up = {:.4} km/s nearest Up1 = {:.4} km/s",
                driver.material(),
                target.material(),
                states.len(),
                primary.particle_velocity,
                pivot
            );
        }

        let regime = match (query.impact, driver.anchor()) {
            (ImpactCondition::ImpactVelocity(_), _) | (_, None) => WaveRegime::Impact,
            (_, Some(anchor)) => {
                let target_pressure = target
                    .pressure_at(anchor.particle_velocity, true)
                    .unwrap_or(primary.pressure);
                if target_pressure > anchor.pressure {
                    WaveRegime::Reshock
                } else {
                    WaveRegime::Release
                }
            }
        };

        Ok(ImpedanceMatch {
            primary,
            secondary: states,
            regime,
        })
    }

    fn smooth_crossings(
        &self,
        driver: &HugoniotCurve,
        target: &HugoniotCurve,
        lo: f64,
        hi: f64,
        extrapolate: bool,
    ) -> Result<Vec<Crossing>, MatchFailure> {
        let residual = |up: f64| {
            let p_target = target.pressure_at(up, extrapolate).ok()?;
            let p_driver = driver.pressure_at(up, extrapolate).ok()?;
            Some(p_target - p_driver)
        };
        bracketed_roots(residual, lo, hi, &self.settings)?
            .into_iter()
            .map(|up| -> Result<Crossing, MatchFailure> {
                let driver_state = driver.state_at(up, extrapolate)?;
                let target_state = target.state_at(up, extrapolate)?;
                Ok(Crossing {
                    particle_velocity: up,
                    pressure: target_state.pressure,
                    driver: driver_state,
                    target: target_state,
                })
            })
            .collect()
    }
}

/// Build both curves of `query` from `materials` and solve for their crossing.
pub fn match_query(
    materials: &MaterialSet,
    query: &MatchQuery,
    settings: &SolverSettings,
    release: &dyn ReleaseModel,
) -> MatchResult {
    let constructor = CurveConstructor::new(materials, *settings, release);
    match constructor.build_pair(query) {
        Ok((driver, target)) => {
            ImpedanceMatchSolver::new(*settings).solve_match(&driver, &target, query)
        }
        Err(failure) => MatchResult::failure(failure),
    }
}
