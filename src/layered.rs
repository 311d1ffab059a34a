use log::info;

use crate::{
    constants::SolverSettings,
    construct::{HugoniotSource, ImpactCondition, MatchQuery},
    errors::{FailureReason, MatchFailure},
    material::MaterialSet,
    release::ReleaseModel,
    solver::{match_query, MatchResult},
};

/// An impactor hitting a stack of layers. Every interface after the first is
/// driven by the previous layer in the shocked state found for it.
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredImpact {
    pub impactor: String,
    pub layers: Vec<String>,
    pub impact_velocity: f64,
    pub source: HugoniotSource,
    pub extrapolate: bool,
}

/// Match at one interface of a layered impact.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceMatch {
    pub driver: String,
    pub target: String,
    pub query: MatchQuery,
    pub result: MatchResult,
}

impl LayeredImpact {
    pub fn new(impactor: impl Into<String>, layers: Vec<String>, impact_velocity: f64) -> Self {
        Self {
            impactor: impactor.into(),
            layers,
            impact_velocity,
            source: HugoniotSource::Auto,
            extrapolate: false,
        }
    }

    pub fn with_source(mut self, source: HugoniotSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_extrapolation(mut self, extrapolate: bool) -> Self {
        self.extrapolate = extrapolate;
        self
    }

    /// Solve the interfaces front to back, stopping after the first one that
    /// fails.
    pub fn solve(
        &self,
        materials: &MaterialSet,
        settings: &SolverSettings,
        release: &dyn ReleaseModel,
    ) -> Vec<InterfaceMatch> {
        let mut interfaces = Vec::with_capacity(self.layers.len());
        if self.layers.is_empty() {
            return interfaces;
        }

        let mut driver = self.impactor.clone();
        let mut condition = ImpactCondition::ImpactVelocity(self.impact_velocity);
        for layer in self.layers.iter() {
            let query = MatchQuery::new(driver.clone(), layer.clone(), condition)
                .with_source(self.source)
                .with_extrapolation(self.extrapolate);
            let result = match_query(materials, &query, settings, release);
            let next = result.primary().map(|state| state.particle_velocity);
            match &result.outcome {
                Ok(matched) => info!(
                    "{driver} -> {layer}: Up = {:.4} km/s, P = {:.4} GPa ({:?})",
                    matched.primary.particle_velocity, matched.primary.pressure, matched.regime
                ),
                Err(failure) => info!("{driver} -> {layer}: {failure}"),
            }
            interfaces.push(InterfaceMatch {
                driver: driver.clone(),
                target: layer.clone(),
                query,
                result,
            });

            match next {
                Some(up) => {
                    driver = layer.clone();
                    condition = ImpactCondition::ParticleVelocity(up);
                }
                None => break,
            }
        }
        interfaces
    }

    /// The state of the last layer reached, or the failure that stopped the
    /// chain.
    pub fn final_state(interfaces: &[InterfaceMatch]) -> Result<&InterfaceMatch, MatchFailure> {
        let last = interfaces.last().ok_or_else(|| {
            MatchFailure::new(FailureReason::InvalidQuery, "layered impact has no layers")
        })?;
        match &last.result.outcome {
            Ok(_) => Ok(last),
            Err(failure) => Err(failure.clone()),
        }
    }
}
