use rayon::prelude::*;

use crate::{
    constants::SolverSettings,
    construct::{HugoniotSource, ImpactCondition, MatchQuery},
    errors::{HugoniotError, MatchFailure},
    material::MaterialSet,
    release::ReleaseModel,
    solver::{match_query, MatchState},
};

/// Impact velocities to solve for one driver/target pair.
#[derive(Debug, Clone, PartialEq)]
pub struct VelocitySweep {
    pub driver: String,
    pub target: String,
    pub velocities: Vec<f64>,
    pub source: HugoniotSource,
    pub extrapolate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    pub impact_velocity: f64,
    pub outcome: Result<MatchState, MatchFailure>,
}

impl VelocitySweep {
    pub fn new(driver: impl Into<String>, target: impl Into<String>, velocities: Vec<f64>) -> Self {
        Self {
            driver: driver.into(),
            target: target.into(),
            velocities,
            source: HugoniotSource::Auto,
            extrapolate: false,
        }
    }

    /// `steps` velocities evenly spaced on [start, stop].
    pub fn linear(
        driver: impl Into<String>,
        target: impl Into<String>,
        start: f64,
        stop: f64,
        steps: usize,
    ) -> Result<Self, HugoniotError> {
        if steps < 2 || !(stop > start) || start <= 0. {
            return Err(HugoniotError::InvalidParameter(format!(
                "cannot sweep {steps} velocities over [{start}, {stop}] km/s"
            )));
        }
        let velocities = (0..steps)
            .map(|i| start + (stop - start) * i as f64 / (steps - 1) as f64)
            .collect();
        Ok(Self::new(driver, target, velocities))
    }

    pub fn with_source(mut self, source: HugoniotSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    /// Solve every velocity independently and in parallel. Results keep the
    /// order of `velocities`.
    pub fn solve(
        &self,
        materials: &MaterialSet,
        settings: &SolverSettings,
        release: &dyn ReleaseModel,
    ) -> Vec<SweepPoint> {
        self.velocities
            .par_iter()
            .map(|&v| {
                let query = MatchQuery::new(
                    self.driver.clone(),
                    self.target.clone(),
                    ImpactCondition::ImpactVelocity(v),
                )
                .with_source(self.source)
                .with_extrapolation(self.extrapolate);
                let outcome = match_query(materials, &query, settings, release)
                    .outcome
                    .map(|matched| matched.primary);
                SweepPoint {
                    impact_velocity: v,
                    outcome,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{hugoniot::ShockVelocityFit, material::MaterialRecord, release::MirroredHugoniot};

    use float_cmp::assert_approx_eq;

    #[test]
    fn test_sweep_matches_single_queries() {
        let materials = MaterialSet::from_records([
            MaterialRecord::new("Iron", 7.85)
                .unwrap()
                .with_fit(ShockVelocityFit::Linear { c0: 3.57, s: 1.92 }, None)
                .unwrap(),
            MaterialRecord::new("Quartz", 2.65)
                .unwrap()
                .with_fit(ShockVelocityFit::Linear { c0: 1.75, s: 1.8 }, None)
                .unwrap(),
        ])
        .unwrap();
        let settings = SolverSettings::default();
        let sweep = VelocitySweep::linear("Iron", "Quartz", 1., 10., 10).unwrap();
        let points = sweep.solve(&materials, &settings, &MirroredHugoniot);
        assert_eq!(points.len(), 10);

        let mut previous = 0.;
        for point in points.iter() {
            let state = point.outcome.as_ref().unwrap();
            assert!(state.pressure > previous);
            previous = state.pressure;

            let impact = ImpactCondition::ImpactVelocity(point.impact_velocity);
            let query = MatchQuery::new("Iron", "Quartz", impact);
            let single = match_query(&materials, &query, &settings, &MirroredHugoniot);
            assert_approx_eq!(f64, single.primary().unwrap().pressure, state.pressure);
        }
    }

    #[test]
    fn test_invalid_sweep() {
        assert!(VelocitySweep::linear("Iron", "Quartz", 3., 1., 10).is_err());
        assert!(VelocitySweep::linear("Iron", "Quartz", 1., 3., 1).is_err());
    }
}
