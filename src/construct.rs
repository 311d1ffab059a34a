//! Building the driver and target curves of an impedance match.

use log::debug;

use crate::{
    constants::SolverSettings,
    curve::{CurveKind, CurvePoint, HugoniotCurve},
    errors::{FailureReason, MatchFailure},
    hugoniot::{FittedHugoniot, HugoniotModel, InitialState, TabulatedHugoniot},
    material::{MaterialRecord, MaterialSet},
    release::ReleaseModel,
};

/// What is known about the driver when the match is requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImpactCondition {
    /// An unshocked driver hits the target at this velocity (km/s).
    ImpactVelocity(f64),
    /// The driver has already been shocked to this particle velocity (km/s).
    ParticleVelocity(f64),
    /// The driver has been shocked by a wave travelling at this velocity (km/s).
    ShockVelocity(f64),
}

impl ImpactCondition {
    fn value(&self) -> f64 {
        match *self {
            ImpactCondition::ImpactVelocity(v)
            | ImpactCondition::ParticleVelocity(v)
            | ImpactCondition::ShockVelocity(v) => v,
        }
    }
}

/// Which representation of a material's Hugoniot to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HugoniotSource {
    /// The fitted relation when the material has one, the measured points
    /// otherwise.
    #[default]
    Auto,
    Fitted,
    Tabulated,
}

/// Which side of the interface a curve is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveRole {
    Driver,
    Target,
}

/// Input of a single impedance match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub driver: String,
    pub target: String,
    pub impact: ImpactCondition,
    pub source: HugoniotSource,
    /// Allow evaluation outside measured or fitted Hugoniot envelopes.
    pub extrapolate: bool,
    /// Pre-impact state of the driver, overriding the one of its material.
    pub driver_initial: Option<InitialState>,
}

impl MatchQuery {
    pub fn new(
        driver: impl Into<String>,
        target: impl Into<String>,
        impact: ImpactCondition,
    ) -> Self {
        Self {
            driver: driver.into(),
            target: target.into(),
            impact,
            source: HugoniotSource::Auto,
            extrapolate: false,
            driver_initial: None,
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

    pub fn with_driver_initial(mut self, initial: InitialState) -> Self {
        self.driver_initial = Some(initial);
        self
    }

    fn validate(&self) -> Result<(), MatchFailure> {
        let value = self.impact.value();
        if !(value > 0. && value.is_finite()) {
            return Err(MatchFailure::new(
                FailureReason::InvalidQuery,
                format!("{:?} must be a positive velocity", self.impact),
            ));
        }
        if let Some(initial) = self.driver_initial {
            if !(initial.density > 0. && initial.pressure >= 0.) {
                return Err(MatchFailure::new(
                    FailureReason::InvalidQuery,
                    format!("invalid driver initial state {initial:?}"),
                ));
            }
        }
        Ok(())
    }
}

/// Hugoniot of one material in the representation chosen by a query.
#[derive(Debug, Clone)]
enum Representation {
    Fitted(FittedHugoniot),
    Tabulated(TabulatedHugoniot),
}

impl Representation {
    fn model(&self) -> &dyn HugoniotModel {
        match self {
            Representation::Fitted(model) => model,
            Representation::Tabulated(model) => model,
        }
    }
}

/// Builds the two curves compared by the impedance-match solver from an
/// injected, read-only material set.
#[derive(Debug, Clone, Copy)]
pub struct CurveConstructor<'a> {
    materials: &'a MaterialSet,
    settings: SolverSettings,
    release: &'a dyn ReleaseModel,
}

impl<'a> CurveConstructor<'a> {
    pub fn new(
        materials: &'a MaterialSet,
        settings: SolverSettings,
        release: &'a dyn ReleaseModel,
    ) -> Self {
        Self {
            materials,
            settings,
            release,
        }
    }

    fn representation(
        &self,
        record: &MaterialRecord,
        role: CurveRole,
        query: &MatchQuery,
    ) -> Result<Representation, MatchFailure> {
        let source = match query.source {
            HugoniotSource::Auto if record.fit().is_some() => HugoniotSource::Fitted,
            HugoniotSource::Auto => HugoniotSource::Tabulated,
            source => source,
        };
        let initial = match (role, query.driver_initial) {
            (CurveRole::Driver, Some(initial)) => Some(initial),
            _ => None,
        };
        Ok(match source {
            HugoniotSource::Fitted => {
                let mut model = record.fitted()?;
                if let Some(initial) = initial {
                    model = model.with_initial_state(initial);
                }
                Representation::Fitted(model)
            }
            _ => {
                if initial.is_some() {
                    debug!(
                        "Measured points of {} fix its initial state, ignoring the driver override",
                        record.name()
                    );
                }
                Representation::Tabulated(record.tabulated(self.settings.porosity_tolerance)?)
            }
        })
    }

    /// Particle velocity of the shocked driver, Up1. For an impact the
    /// symmetric estimate v / 2 is returned.
    fn shocked_particle_velocity(
        &self,
        model: &dyn HugoniotModel,
        query: &MatchQuery,
    ) -> Result<f64, MatchFailure> {
        Ok(match query.impact {
            ImpactCondition::ImpactVelocity(v) => 0.5 * v,
            ImpactCondition::ParticleVelocity(u) => u,
            ImpactCondition::ShockVelocity(us) => {
                model.particle_velocity_for_shock(us, query.extrapolate)?
            }
        })
    }

    /// Velocity setting the extent of fitted curve grids. Both curves of a query
    /// share it so that their samples cover the same Up interval.
    fn reference_velocity(&self, query: &MatchQuery) -> Result<f64, MatchFailure> {
        Ok(match query.impact {
            ImpactCondition::ImpactVelocity(v) => v,
            _ => {
                let driver = self.materials.get(&query.driver)?;
                let representation = self.representation(driver, CurveRole::Driver, query)?;
                2. * self.shocked_particle_velocity(representation.model(), query)?
            }
        })
    }

    fn principal_curve(
        &self,
        representation: &Representation,
        query: &MatchQuery,
    ) -> Result<HugoniotCurve, MatchFailure> {
        match representation {
            Representation::Tabulated(model) => {
                let samples = model
                    .points()
                    .iter()
                    .map(|p| {
                        CurvePoint::new(p.particle_velocity, p.pressure, p.compression, p.energy)
                    })
                    .collect();
                Ok(HugoniotCurve::new(
                    model.material(),
                    CurveKind::Principal,
                    model.initial_state(),
                    samples,
                )?)
            }
            Representation::Fitted(model) => {
                let extent = self.settings.grid_extent_factor * self.reference_velocity(query)?;
                let (lo, hi) = match model.up_range() {
                    Some((lo, hi)) if !query.extrapolate => (lo.max(0.), hi.min(extent)),
                    _ => (0., extent),
                };
                if !(hi > lo) {
                    return Err(MatchFailure::new(
                        FailureReason::OutOfRange,
                        format!(
                            "fit of {} is valid on [{lo}, {hi}] km/s, outside [0, {extent}] km/s",
                            model.material()
                        ),
                    ));
                }
                let n = self.settings.grid_points.max(2) - 1;
                debug!(
                    "Sampling {} {} fit on [{lo:.4}, {hi:.4}] km/s with {} points",
                    model.material(),
                    model.fit().form_name(),
                    n + 1
                );
                let grid = (0..=n).map(|i| lo + (hi - lo) * i as f64 / n as f64);
                Ok(HugoniotCurve::sample(model, grid, query.extrapolate)?
                    .with_model(model.clone(), query.extrapolate))
            }
        }
    }

    /// Curve of `material_id` in the role it plays in `query`: the principal
    /// Hugoniot for the target, the release/reshock locus through the shocked
    /// state for the driver.
    pub fn build_curve(
        &self,
        material_id: &str,
        role: CurveRole,
        query: &MatchQuery,
    ) -> Result<HugoniotCurve, MatchFailure> {
        query.validate()?;
        let record = self.materials.get(material_id)?;
        let representation = self.representation(record, role, query)?;
        let principal = self.principal_curve(&representation, query)?;
        if role == CurveRole::Target {
            return Ok(principal);
        }

        let model = representation.model();
        let up1 = self.shocked_particle_velocity(model, query)?;
        if let ImpactCondition::ImpactVelocity(v) = query.impact {
            // The driver is unshocked: it follows its principal Hugoniot in its
            // own rest frame, which is the mirror image about v / 2 in the lab.
            debug!("{material_id} impacts at {v} km/s");
            return Ok(principal.reflect(up1));
        }

        let shocked = CurvePoint::from(&model.state_at(up1, query.extrapolate)?);
        debug!(
            "{material_id} shocked to Up1 = {:.4} km/s, P1 = {:.4} GPa, {} release",
            shocked.particle_velocity,
            shocked.pressure,
            self.release.name()
        );
        Ok(self.release.driver_curve(&principal, &shocked, record.gruneisen())?)
    }

    /// The (driver, target) curves of a query.
    pub fn build_pair(
        &self,
        query: &MatchQuery,
    ) -> Result<(HugoniotCurve, HugoniotCurve), MatchFailure> {
        let driver = self.build_curve(&query.driver, CurveRole::Driver, query)?;
        let target = self.build_curve(&query.target, CurveRole::Target, query)?;
        Ok((driver, target))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        hugoniot::ShockVelocityFit,
        release::{MieGruneisen, MirroredHugoniot},
    };

    use float_cmp::assert_approx_eq;

    fn materials() -> MaterialSet {
        MaterialSet::from_records([
            MaterialRecord::new("Aluminium", 2.7)
                .unwrap()
                .with_fit(ShockVelocityFit::Linear { c0: 5.35, s: 1.34 }, None)
                .unwrap(),
            MaterialRecord::new("Quartz", 2.65)
                .unwrap()
                .with_fit(ShockVelocityFit::Linear { c0: 1.75, s: 1.8 }, Some((1., 6.)))
                .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_impact_driver_is_mirrored() {
        let materials = materials();
        let release = MirroredHugoniot;
        let constructor = CurveConstructor::new(&materials, SolverSettings::default(), &release);
        let query = MatchQuery::new("aluminium", "Quartz", ImpactCondition::ImpactVelocity(3.));
        let (driver, target) = constructor.build_pair(&query).unwrap();

        assert_eq!(driver.kind(), CurveKind::Reflected);
        assert_eq!(target.kind(), CurveKind::Principal);
        assert!(driver.is_smooth());
        assert_eq!(driver.points().len(), 2001);
        // Driver at rest relative to itself at the impact velocity
        assert_approx_eq!(f64, driver.pressure_at(3., false).unwrap(), 0.);
        assert_eq!(driver.up_range(), (-3., 3.));
        // Quartz fit window clips the target grid
        assert_eq!(target.up_range(), (1., 6.));
    }

    #[test]
    fn test_shock_velocity_condition() {
        let materials = materials();
        let release = MieGruneisen;
        let constructor = CurveConstructor::new(&materials, SolverSettings::default(), &release);
        let query = MatchQuery::new(
            "Aluminium",
            "Quartz",
            ImpactCondition::ShockVelocity(5.35 + 1.34 * 1.5),
        );
        let driver = constructor
            .build_curve("Aluminium", CurveRole::Driver, &query)
            .unwrap();
        assert_eq!(driver.kind(), CurveKind::Release);
        let anchor = driver.anchor().unwrap();
        assert_approx_eq!(f64, anchor.particle_velocity, 1.5, epsilon = 1e-12);
        assert_approx_eq!(f64, anchor.pressure, 2.7 * (5.35 + 1.34 * 1.5) * 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_driver_initial_override() {
        let materials = materials();
        let release = MirroredHugoniot;
        let constructor = CurveConstructor::new(&materials, SolverSettings::default(), &release);
        let query = MatchQuery::new("Aluminium", "Aluminium", ImpactCondition::ImpactVelocity(2.))
            .with_driver_initial(InitialState::new(2.0, 0.));
        let (driver, target) = constructor.build_pair(&query).unwrap();
        assert_eq!(driver.initial_state().density, 2.0);
        assert_eq!(target.initial_state().density, 2.7);
    }

    #[test]
    fn test_query_failures() {
        let materials = materials();
        let release = MirroredHugoniot;
        let constructor = CurveConstructor::new(&materials, SolverSettings::default(), &release);

        let query = MatchQuery::new("Aluminium", "Granite", ImpactCondition::ImpactVelocity(2.));
        assert_eq!(
            constructor.build_pair(&query).unwrap_err().reason,
            FailureReason::UnknownMaterial
        );

        let query = MatchQuery::new("Aluminium", "Quartz", ImpactCondition::ImpactVelocity(-1.));
        assert_eq!(
            constructor.build_pair(&query).unwrap_err().reason,
            FailureReason::InvalidQuery
        );

        let query = MatchQuery::new("Aluminium", "Quartz", ImpactCondition::ImpactVelocity(2.))
            .with_source(HugoniotSource::Tabulated);
        assert_eq!(
            constructor.build_pair(&query).unwrap_err().reason,
            FailureReason::MissingHugoniot
        );
    }
}
