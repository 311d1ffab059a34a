use std::collections::BTreeMap;

use crate::{
    errors::HugoniotError,
    hugoniot::{FittedHugoniot, InitialState, ShockVelocityFit, TabulatedHugoniot},
};

/// One measured shock state of a material.
#[derive(Debug, Clone, PartialEq)]
pub struct HugoniotPoint {
    /// Porosity m of the sample the point was measured on.
    pub porosity: f64,
    /// U (km/s)
    pub particle_velocity: f64,
    /// D (km/s)
    pub shock_velocity: f64,
    /// P (GPa)
    pub pressure: f64,
    /// R/R0
    pub compression: f64,
    /// R (g/cm^3)
    pub density: f64,
    /// E - E0 (kJ/g)
    pub energy: f64,
    pub reference: Option<String>,
}

impl HugoniotPoint {
    /// Complete a point from its particle velocity and pressure through the
    /// jump conditions.
    pub fn from_jump(
        porosity: f64,
        particle_velocity: f64,
        pressure: f64,
        initial: &InitialState,
    ) -> Self {
        let shock_velocity = (pressure - initial.pressure) / (initial.density * particle_velocity);
        let compression = shock_velocity / (shock_velocity - particle_velocity);
        Self {
            porosity,
            particle_velocity,
            shock_velocity,
            pressure,
            compression,
            density: initial.density * compression,
            energy: 0.5 * (pressure + initial.pressure) * particle_velocity
                / (initial.density * shock_velocity),
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    fn validate(&self, material: &str, index: usize) -> Result<(), HugoniotError> {
        let invalid = |reason: String| HugoniotError::InvalidPoint {
            material: material.to_string(),
            index,
            reason,
        };
        let values = [
            self.porosity,
            self.particle_velocity,
            self.shock_velocity,
            self.pressure,
            self.compression,
            self.density,
            self.energy,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(invalid("non-finite value".to_string()));
        }
        if self.porosity <= 0. {
            return Err(invalid(format!("porosity m = {} must be positive", self.porosity)));
        }
        if self.particle_velocity < 0. {
            return Err(invalid(format!("U = {} km/s is negative", self.particle_velocity)));
        }
        if self.shock_velocity < self.particle_velocity {
            return Err(invalid(format!(
                "D = {} km/s is below U = {} km/s",
                self.shock_velocity, self.particle_velocity
            )));
        }
        if self.pressure < 0. {
            return Err(invalid(format!("P = {} GPa is negative", self.pressure)));
        }
        if self.compression < 1. {
            return Err(invalid(format!("R/R0 = {} is below 1", self.compression)));
        }
        Ok(())
    }
}

/// Grüneisen parameter gamma = gamma0 (V / V00)^q.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gruneisen {
    pub gamma0: f64,
    pub q: f64,
}

impl Gruneisen {
    pub fn new(gamma0: f64, q: f64) -> Self {
        Self { gamma0, q }
    }

    pub fn gamma(&self, specific_volume: f64, reference_volume: f64) -> f64 {
        self.gamma0 * (specific_volume / reference_volume).powf(self.q)
    }
}

/// A substance and everything known about its shock response.
///
/// Records are validated when built and are read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRecord {
    name: String,
    reference_density: f64,
    porosity: f64,
    initial_pressure: f64,
    points: Vec<HugoniotPoint>,
    fit: Option<ShockVelocityFit>,
    fit_range: Option<(f64, f64)>,
    gruneisen: Option<Gruneisen>,
    note: Option<String>,
}

impl MaterialRecord {
    /// A record with reference (fully dense) density R0 in g/cm^3.
    pub fn new(name: impl Into<String>, reference_density: f64) -> Result<Self, HugoniotError> {
        let name = name.into();
        if !(reference_density > 0. && reference_density.is_finite()) {
            return Err(HugoniotError::InvalidParameter(format!(
                "{name}: reference density must be positive, got {reference_density}"
            )));
        }
        Ok(Self {
            name,
            reference_density,
            porosity: 1.,
            initial_pressure: 0.,
            points: vec![],
            fit: None,
            fit_range: None,
            gruneisen: None,
            note: None,
        })
    }

    /// Porosity m = R0 / R00, at least 1.
    pub fn with_porosity(mut self, porosity: f64) -> Result<Self, HugoniotError> {
        if !(porosity >= 1. && porosity.is_finite()) {
            return Err(HugoniotError::InvalidParameter(format!(
                "{}: porosity must be at least 1, got {porosity}",
                self.name
            )));
        }
        self.porosity = porosity;
        Ok(self)
    }

    pub fn with_initial_pressure(mut self, pressure: f64) -> Result<Self, HugoniotError> {
        if !(pressure >= 0. && pressure.is_finite()) {
            return Err(HugoniotError::InvalidParameter(format!(
                "{}: initial pressure must be non-negative, got {pressure}",
                self.name
            )));
        }
        self.initial_pressure = pressure;
        Ok(self)
    }

    /// Attach measured points, rejecting any that is not a physical shock state.
    pub fn with_points(mut self, mut points: Vec<HugoniotPoint>) -> Result<Self, HugoniotError> {
        for (index, point) in points.iter().enumerate() {
            point.validate(&self.name, index)?;
        }
        points.sort_by(|a, b| a.particle_velocity.total_cmp(&b.particle_velocity));
        self.points = points;
        Ok(self)
    }

    pub fn with_fit(
        mut self,
        fit: ShockVelocityFit,
        up_range: Option<(f64, f64)>,
    ) -> Result<Self, HugoniotError> {
        if let Some((lo, hi)) = up_range {
            if !(lo >= 0. && hi > lo) {
                return Err(HugoniotError::InvalidParameter(format!(
                    "{}: fit validity window [{lo}, {hi}] km/s is empty",
                    self.name
                )));
            }
        }
        self.fit = Some(fit);
        self.fit_range = up_range;
        Ok(self)
    }

    pub fn with_gruneisen(mut self, gruneisen: Gruneisen) -> Self {
        self.gruneisen = Some(gruneisen);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reference_density(&self) -> f64 {
        self.reference_density
    }

    pub fn porosity(&self) -> f64 {
        self.porosity
    }

    /// R00 = R0 / m
    pub fn initial_density(&self) -> f64 {
        self.reference_density / self.porosity
    }

    pub fn initial_pressure(&self) -> f64 {
        self.initial_pressure
    }

    pub fn initial_state(&self) -> InitialState {
        InitialState::new(self.initial_density(), self.initial_pressure)
    }

    pub fn points(&self) -> &[HugoniotPoint] {
        &self.points
    }

    /// Measured points taken on samples of this record's porosity.
    pub fn points_at_porosity(&self, tolerance: f64) -> impl Iterator<Item = &HugoniotPoint> {
        let porosity = self.porosity;
        self.points
            .iter()
            .filter(move |p| (p.porosity - porosity).abs() <= tolerance)
    }

    pub fn fit(&self) -> Option<&ShockVelocityFit> {
        self.fit.as_ref()
    }

    pub fn fit_range(&self) -> Option<(f64, f64)> {
        self.fit_range
    }

    pub fn gruneisen(&self) -> Option<Gruneisen> {
        self.gruneisen
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn has_points(&self) -> bool {
        !self.points.is_empty()
    }

    pub fn tabulated(&self, porosity_tolerance: f64) -> Result<TabulatedHugoniot, HugoniotError> {
        let points: Vec<HugoniotPoint> =
            self.points_at_porosity(porosity_tolerance).cloned().collect();
        if points.is_empty() {
            return Err(HugoniotError::MissingHugoniot {
                material: self.name.clone(),
                representation: "tabulated",
            });
        }
        TabulatedHugoniot::new(self.name.clone(), self.initial_state(), points)
    }

    pub fn fitted(&self) -> Result<FittedHugoniot, HugoniotError> {
        let fit = self.fit.ok_or_else(|| HugoniotError::MissingHugoniot {
            material: self.name.clone(),
            representation: "fitted",
        })?;
        Ok(FittedHugoniot::new(self.name.clone(), fit, self.initial_state())
            .with_valid_range(self.fit_range))
    }
}

/// Read-only collection of materials, looked up by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct MaterialSet {
    records: BTreeMap<String, MaterialRecord>,
}

impl MaterialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(
        records: impl IntoIterator<Item = MaterialRecord>,
    ) -> Result<Self, HugoniotError> {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, record: MaterialRecord) -> Result<(), HugoniotError> {
        let key = record.name().to_lowercase();
        if self.records.contains_key(&key) {
            return Err(HugoniotError::InvalidParameter(format!(
                "material {} is defined twice",
                record.name()
            )));
        }
        self.records.insert(key, record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&MaterialRecord, HugoniotError> {
        self.records
            .get(&name.to_lowercase())
            .ok_or_else(|| HugoniotError::UnknownMaterial(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialRecord> {
        self.records.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.values().map(|r| r.name())
    }
}
