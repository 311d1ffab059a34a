//! Single-material shock response.
//!
//! A material's principal Hugoniot is either a set of measured shock states
//! ([`TabulatedHugoniot`]) or a fitted shock-velocity relation combined with the
//! Rankine-Hugoniot jump conditions ([`FittedHugoniot`]).

use std::fmt::Debug;

use crate::errors::HugoniotError;

mod fit;
mod fitted;
mod tabulated;

pub use fit::{least_squares_fit, FitForm, FitQuality};
pub use fitted::{FittedHugoniot, ShockVelocityFit};
pub use tabulated::TabulatedHugoniot;

/// Pre-shock state of a material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialState {
    /// Initial density R00 (g/cm^3), already corrected for porosity.
    pub density: f64,
    /// Initial pressure P0 (GPa).
    pub pressure: f64,
}

impl InitialState {
    pub fn new(density: f64, pressure: f64) -> Self {
        Self { density, pressure }
    }

    pub fn specific_volume(&self) -> f64 {
        1. / self.density
    }
}

/// One shocked state on a Hugoniot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShockState {
    pub particle_velocity: f64,
    pub shock_velocity: f64,
    pub pressure: f64,
    /// R / R00
    pub compression: f64,
    pub density: f64,
    /// Specific energy jump E - E0 (kJ/g)
    pub energy: f64,
}

impl ShockState {
    pub fn specific_volume(&self) -> f64 {
        1. / self.density
    }
}

/// Rankine-Hugoniot jump conditions across a steady shock.
///
/// P - P0 = R00 Us Up, R/R00 = Us / (Us - Up) and
/// E - E0 = (P + P0) (V00 - V) / 2, which for P0 = 0 is P Up / (2 R00 Us).
pub fn jump_conditions(
    particle_velocity: f64,
    shock_velocity: f64,
    initial: &InitialState,
) -> Result<ShockState, HugoniotError> {
    if shock_velocity == particle_velocity {
        return Err(HugoniotError::DivisionSingularity {
            up: particle_velocity,
        });
    }
    if shock_velocity < particle_velocity {
        return Err(HugoniotError::NonPhysicalState {
            up: particle_velocity,
            us: shock_velocity,
        });
    }

    let pressure = initial.pressure + initial.density * shock_velocity * particle_velocity;
    let compression = shock_velocity / (shock_velocity - particle_velocity);
    let energy = 0.5 * (pressure + initial.pressure) * particle_velocity
        / (initial.density * shock_velocity);

    Ok(ShockState {
        particle_velocity,
        shock_velocity,
        pressure,
        compression,
        density: initial.density * compression,
        energy,
    })
}

/// Common interface of tabulated and fitted Hugoniots.
///
/// All methods are pure functions of the stored parameters. `extrapolate`
/// allows evaluation outside the measured (or fitted) envelope; without it such
/// queries fail with [`HugoniotError::OutOfRange`].
pub trait HugoniotModel: Debug + Send + Sync {
    fn material(&self) -> &str;

    fn initial_state(&self) -> InitialState;

    /// Particle velocity envelope, `None` when the model is valid for all Up >= 0.
    fn up_range(&self) -> Option<(f64, f64)>;

    fn state_at(&self, up: f64, extrapolate: bool) -> Result<ShockState, HugoniotError>;

    /// Particle velocity of the state reached by a shock travelling at `us`.
    fn particle_velocity_for_shock(&self, us: f64, extrapolate: bool)
        -> Result<f64, HugoniotError>;

    fn pressure_at(&self, up: f64, extrapolate: bool) -> Result<f64, HugoniotError> {
        Ok(self.state_at(up, extrapolate)?.pressure)
    }

    fn compression_at(&self, up: f64, extrapolate: bool) -> Result<f64, HugoniotError> {
        Ok(self.state_at(up, extrapolate)?.compression)
    }

    fn shock_velocity_at(&self, up: f64, extrapolate: bool) -> Result<f64, HugoniotError> {
        Ok(self.state_at(up, extrapolate)?.shock_velocity)
    }

    fn energy_at(&self, up: f64, extrapolate: bool) -> Result<f64, HugoniotError> {
        Ok(self.state_at(up, extrapolate)?.energy)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use float_cmp::assert_approx_eq;

    #[test]
    fn test_jump_conditions() {
        let initial = InitialState::new(2.86, 0.);
        let state = jump_conditions(1., 4.5, &initial).unwrap();
        assert_approx_eq!(f64, state.pressure, 2.86 * 4.5);
        assert_approx_eq!(f64, state.compression, 4.5 / 3.5);
        assert_approx_eq!(f64, state.density, 2.86 * 4.5 / 3.5);
        // E - E0 = Up^2 / 2 when P0 = 0
        assert_approx_eq!(f64, state.energy, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_jump_conditions_initial_pressure() {
        let initial = InitialState::new(1., 0.5);
        let state = jump_conditions(2., 5., &initial).unwrap();
        assert_approx_eq!(f64, state.pressure, 10.5);
        let dv = initial.specific_volume() - state.specific_volume();
        assert_approx_eq!(f64, state.energy, 0.5 * (10.5 + 0.5) * dv, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_and_nonphysical() {
        let initial = InitialState::new(1., 0.);
        assert_eq!(
            jump_conditions(2., 2., &initial),
            Err(HugoniotError::DivisionSingularity { up: 2. })
        );
        assert!(matches!(
            jump_conditions(3., 2., &initial),
            Err(HugoniotError::NonPhysicalState { .. })
        ));
    }
}
