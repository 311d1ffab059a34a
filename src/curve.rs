//! Hugoniot curves in pressure-particle velocity space.

use crate::{
    errors::HugoniotError,
    hugoniot::{FittedHugoniot, HugoniotModel, InitialState, ShockState},
};

/// A state on a curve in the (Up, P) plane together with the material state it
/// stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub particle_velocity: f64,
    pub pressure: f64,
    /// R / R00
    pub compression: f64,
    /// E - E0 (kJ/g)
    pub energy: f64,
}

impl CurvePoint {
    pub fn new(particle_velocity: f64, pressure: f64, compression: f64, energy: f64) -> Self {
        Self {
            particle_velocity,
            pressure,
            compression,
            energy,
        }
    }

    fn lerp(&self, other: &Self, t: f64) -> Self {
        let lerp = |a: f64, b: f64| a + t * (b - a);
        Self {
            particle_velocity: lerp(self.particle_velocity, other.particle_velocity),
            pressure: lerp(self.pressure, other.pressure),
            compression: lerp(self.compression, other.compression),
            energy: lerp(self.energy, other.energy),
        }
    }
}

impl From<&ShockState> for CurvePoint {
    fn from(state: &ShockState) -> Self {
        Self::new(
            state.particle_velocity,
            state.pressure,
            state.compression,
            state.energy,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    /// States reachable by a single shock from the initial state.
    Principal,
    /// A principal Hugoniot mirrored about a vertical line Up = Up1.
    Reflected,
    /// Release isentrope and reshock Hugoniot through a known shocked state.
    Release,
}

/// Displayed Up = sign * stored Up + offset. `sign` is always +1 or -1.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    sign: f64,
    offset: f64,
}

impl Frame {
    const IDENTITY: Frame = Frame {
        sign: 1.,
        offset: 0.,
    };

    fn to_display(&self, up: f64) -> f64 {
        self.sign * up + self.offset
    }

    fn to_source(&self, up: f64) -> f64 {
        self.sign * (up - self.offset)
    }
}

/// Ordered (Up, P) samples of one material.
///
/// Samples are stored once in the frame they were generated in; reflections
/// only change the frame, so reflecting twice about the same line restores
/// the original curve exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct HugoniotCurve {
    material: String,
    kind: CurveKind,
    initial: InitialState,
    samples: Vec<CurvePoint>,
    frame: Frame,
    model: Option<FittedHugoniot>,
    extrapolate: bool,
    anchor: Option<CurvePoint>,
}

impl HugoniotCurve {
    /// Build a curve from samples, which are sorted ascending in Up.
    pub fn new(
        material: impl Into<String>,
        kind: CurveKind,
        initial: InitialState,
        mut samples: Vec<CurvePoint>,
    ) -> Result<Self, HugoniotError> {
        let material = material.into();
        samples.retain(|p| p.particle_velocity.is_finite() && p.pressure.is_finite());
        samples.sort_by(|a, b| a.particle_velocity.total_cmp(&b.particle_velocity));
        if samples.len() < 2 {
            return Err(HugoniotError::InsufficientData {
                material,
                needed: 2,
                found: samples.len(),
            });
        }
        Ok(Self {
            material,
            kind,
            initial,
            samples,
            frame: Frame::IDENTITY,
            model: None,
            extrapolate: false,
            anchor: None,
        })
    }

    /// Sample any Hugoniot model at the given particle velocities. Velocities at
    /// which the model cannot be evaluated are skipped.
    pub fn sample(
        model: &dyn HugoniotModel,
        particle_velocities: impl IntoIterator<Item = f64>,
        extrapolate: bool,
    ) -> Result<Self, HugoniotError> {
        let samples = particle_velocities
            .into_iter()
            .filter_map(|up| model.state_at(up, extrapolate).ok())
            .map(|state| CurvePoint::from(&state))
            .collect();
        Self::new(
            model.material(),
            CurveKind::Principal,
            model.initial_state(),
            samples,
        )
    }

    /// Attach the fitted relation the samples came from so that the curve can
    /// be evaluated exactly between samples.
    pub fn with_model(mut self, model: FittedHugoniot, extrapolate: bool) -> Self {
        self.model = Some(model);
        self.extrapolate = extrapolate;
        self
    }

    /// Mark the known driver state the curve passes through. `anchor` is given
    /// in the current (displayed) frame.
    pub fn with_anchor(mut self, anchor: CurvePoint) -> Self {
        self.anchor = Some(CurvePoint {
            particle_velocity: self.frame.to_source(anchor.particle_velocity),
            ..anchor
        });
        self
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn kind(&self) -> CurveKind {
        self.kind
    }

    pub fn initial_state(&self) -> InitialState {
        self.initial
    }

    pub fn is_smooth(&self) -> bool {
        self.model.is_some()
    }

    pub fn anchor(&self) -> Option<CurvePoint> {
        self.anchor.map(|a| self.display(&a))
    }

    fn display(&self, point: &CurvePoint) -> CurvePoint {
        CurvePoint {
            particle_velocity: self.frame.to_display(point.particle_velocity),
            ..*point
        }
    }

    /// Mirror the curve about the vertical line Up = `pivot`, mapping every
    /// (Up, P) to (2 pivot - Up, P).
    ///
    /// Used as the driver's release and reshock locus this is only an
    /// approximation: the true release path is an isentrope, which lies close
    /// to but below the mirrored Hugoniot.
    pub fn reflect(&self, pivot: f64) -> Self {
        let kind = match self.kind {
            CurveKind::Principal => CurveKind::Reflected,
            CurveKind::Reflected => CurveKind::Principal,
            CurveKind::Release => CurveKind::Release,
        };
        Self {
            kind,
            frame: Frame {
                sign: -self.frame.sign,
                offset: 2. * pivot - self.frame.offset,
            },
            ..self.clone()
        }
    }

    /// Samples in displayed coordinates, ascending in Up.
    pub fn points(&self) -> Vec<CurvePoint> {
        let displayed = self.samples.iter().map(|p| self.display(p));
        if self.frame.sign < 0. {
            displayed.rev().collect()
        } else {
            displayed.collect()
        }
    }

    /// Particle velocity interval covered by the samples.
    pub fn up_range(&self) -> (f64, f64) {
        let first = self.frame.to_display(self.samples[0].particle_velocity);
        let last = self.frame.to_display(self.samples[self.samples.len() - 1].particle_velocity);
        (first.min(last), first.max(last))
    }

    pub fn pressure_range(&self) -> (f64, f64) {
        self.samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.pressure), hi.max(p.pressure))
            })
    }

    /// State on the curve at a displayed particle velocity.
    ///
    /// Smooth curves evaluate their fitted relation; sampled curves are
    /// interpolated linearly and, with `extrapolate`, extended along their end
    /// segments.
    pub fn state_at(&self, up: f64, extrapolate: bool) -> Result<CurvePoint, HugoniotError> {
        if let Some(model) = &self.model {
            let state = model.state_at(self.frame.to_source(up), extrapolate && self.extrapolate)?;
            return Ok(CurvePoint {
                particle_velocity: up,
                ..CurvePoint::from(&state)
            });
        }

        let (min, max) = self.up_range();
        if !up.is_finite() || (!extrapolate && (up < min || up > max)) {
            return Err(HugoniotError::OutOfRange { up, min, max });
        }
        self.interpolate(&self.points(), up)
    }

    /// Linear interpolation on sorted samples, extended along the end segments
    /// outside them.
    fn interpolate(&self, points: &[CurvePoint], up: f64) -> Result<CurvePoint, HugoniotError> {
        let segments: Vec<(&CurvePoint, &CurvePoint)> = points
            .windows(2)
            .filter(|w| w[1].particle_velocity > w[0].particle_velocity)
            .map(|w| (&w[0], &w[1]))
            .collect();
        let below = points.first().map_or(false, |p| up < p.particle_velocity);
        let (a, b) = segments
            .iter()
            .find(|(a, b)| a.particle_velocity <= up && up <= b.particle_velocity)
            .or_else(|| if below { segments.first() } else { segments.last() })
            .copied()
            .ok_or_else(|| {
                HugoniotError::InvalidParameter(format!(
                    "curve of {} has no extent in particle velocity",
                    self.material
                ))
            })?;
        let t = (up - a.particle_velocity) / (b.particle_velocity - a.particle_velocity);
        Ok(CurvePoint {
            particle_velocity: up,
            ..a.lerp(b, t)
        })
    }

    pub fn pressure_at(&self, up: f64, extrapolate: bool) -> Result<f64, HugoniotError> {
        Ok(self.state_at(up, extrapolate)?.pressure)
    }

    /// A sampled copy covering at least [lo, hi], extending the end segments
    /// linearly where the curve falls short. The copy drops any fitted model.
    pub fn extended_to(&self, lo: f64, hi: f64) -> Result<Self, HugoniotError> {
        let (min, max) = self.up_range();
        let mut points = self.points();
        if lo < min {
            let first = self.interpolate(&points, lo)?;
            points.insert(0, first);
        }
        if hi > max {
            let last = self.interpolate(&points, hi)?;
            points.push(last);
        }
        Ok(Self {
            material: self.material.clone(),
            kind: self.kind,
            initial: self.initial,
            samples: points,
            frame: Frame::IDENTITY,
            model: None,
            extrapolate: false,
            anchor: self.anchor(),
        })
    }
}
