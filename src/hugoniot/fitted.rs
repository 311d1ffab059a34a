use crate::errors::HugoniotError;

use super::{jump_conditions, HugoniotModel, InitialState, ShockState};

/// Fitted shock velocity as a function of particle velocity (km/s).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShockVelocityFit {
    /// Us = c0 + s Up
    Linear { c0: f64, s: f64 },
    /// Us = c0 + s1 Up + s2 Up^2
    Quadratic { c0: f64, s1: f64, s2: f64 },
    /// Modified universal liquid Hugoniot, Us = a + b Up - c Up exp(-d Up)
    UniversalLiquid { a: f64, b: f64, c: f64, d: f64 },
}

impl ShockVelocityFit {
    pub fn shock_velocity(&self, up: f64) -> f64 {
        match *self {
            ShockVelocityFit::Linear { c0, s } => c0 + s * up,
            ShockVelocityFit::Quadratic { c0, s1, s2 } => c0 + s1 * up + s2 * up * up,
            ShockVelocityFit::UniversalLiquid { a, b, c, d } => {
                a + b * up - c * up * (-d * up).exp()
            }
        }
    }

    /// Bulk sound speed intercept at Up = 0.
    pub fn intercept(&self) -> f64 {
        match *self {
            ShockVelocityFit::Linear { c0, .. } => c0,
            ShockVelocityFit::Quadratic { c0, .. } => c0,
            ShockVelocityFit::UniversalLiquid { a, .. } => a,
        }
    }

    pub fn form_name(&self) -> &'static str {
        match self {
            ShockVelocityFit::Linear { .. } => "linear",
            ShockVelocityFit::Quadratic { .. } => "quadratic",
            ShockVelocityFit::UniversalLiquid { .. } => "universal liquid",
        }
    }
}

/// A Hugoniot evaluated from a fitted Us-Up relation and the jump conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedHugoniot {
    material: String,
    fit: ShockVelocityFit,
    initial: InitialState,
    valid_range: Option<(f64, f64)>,
}

impl FittedHugoniot {
    pub fn new(material: impl Into<String>, fit: ShockVelocityFit, initial: InitialState) -> Self {
        Self {
            material: material.into(),
            fit,
            initial,
            valid_range: None,
        }
    }

    /// Restrict evaluation to the Up window the fit was made on.
    pub fn with_valid_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.valid_range = range;
        self
    }

    pub fn with_initial_state(mut self, initial: InitialState) -> Self {
        self.initial = initial;
        self
    }

    pub fn fit(&self) -> &ShockVelocityFit {
        &self.fit
    }

    fn check_range(&self, up: f64, extrapolate: bool) -> Result<(), HugoniotError> {
        if up < 0. || !up.is_finite() {
            let (_, max) = self.valid_range.unwrap_or((0., f64::INFINITY));
            return Err(HugoniotError::OutOfRange { up, min: 0., max });
        }
        match self.valid_range {
            Some((min, max)) if !extrapolate && (up < min || up > max) => {
                Err(HugoniotError::OutOfRange { up, min, max })
            }
            _ => Ok(()),
        }
    }

    fn invert_by_bisection(&self, us: f64) -> Result<f64, HugoniotError> {
        let g = |up: f64| self.fit.shock_velocity(up) - us;
        let mut lo = 0.;
        let mut hi = us.max(1.);
        let mut counter = 0;
        while g(hi) < 0. {
            hi *= 2.;
            counter += 1;
            if counter > 64 {
                return Err(HugoniotError::InvalidParameter(format!(
                    "shock velocity {us} km/s is never reached by the {} fit of {}",
                    self.fit.form_name(),
                    self.material
                )));
            }
        }
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if g(mid) < 0. {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo < 1e-12 * hi.max(1.) {
                break;
            }
        }
        Ok(0.5 * (lo + hi))
    }
}

impl HugoniotModel for FittedHugoniot {
    fn material(&self) -> &str {
        &self.material
    }

    fn initial_state(&self) -> InitialState {
        self.initial
    }

    fn up_range(&self) -> Option<(f64, f64)> {
        self.valid_range
    }

    fn state_at(&self, up: f64, extrapolate: bool) -> Result<ShockState, HugoniotError> {
        self.check_range(up, extrapolate)?;
        jump_conditions(up, self.fit.shock_velocity(up), &self.initial)
    }

    fn particle_velocity_for_shock(
        &self,
        us: f64,
        extrapolate: bool,
    ) -> Result<f64, HugoniotError> {
        if us < self.fit.intercept() {
            let max = match self.valid_range {
                Some((_, hi)) if !extrapolate => self.fit.shock_velocity(hi),
                _ => f64::INFINITY,
            };
            return Err(HugoniotError::ShockOutOfRange {
                us,
                min: self.fit.intercept(),
                max,
            });
        }
        let up = match self.fit {
            ShockVelocityFit::Linear { c0, s } if s != 0. => (us - c0) / s,
            ShockVelocityFit::Quadratic { c0, s1, s2 } if s2 != 0. => {
                let discriminant = s1 * s1 - 4. * s2 * (c0 - us);
                if discriminant < 0. {
                    // Us peaks at the vertex of a concave fit
                    return Err(HugoniotError::ShockOutOfRange {
                        us,
                        min: c0,
                        max: c0 - s1 * s1 / (4. * s2),
                    });
                }
                // Root continuously connected to Up = 0 at Us = c0
                2. * (us - c0) / (s1 + discriminant.sqrt())
            }
            ShockVelocityFit::Quadratic { c0, s1, .. } if s1 != 0. => (us - c0) / s1,
            _ => self.invert_by_bisection(us)?,
        };
        self.check_range(up, extrapolate)?;
        Ok(up)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use float_cmp::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn basalt() -> FittedHugoniot {
        FittedHugoniot::new(
            "Basalt",
            ShockVelocityFit::Linear { c0: 2.6, s: 1.6 },
            InitialState::new(2.86, 0.),
        )
    }

    #[test]
    fn test_linear_pressure() {
        let hugoniot = basalt();
        let p = hugoniot.pressure_at(2., false).unwrap();
        assert_approx_eq!(f64, p, 2.86 * (2.6 + 3.2) * 2.);
        assert_approx_eq!(f64, hugoniot.pressure_at(0., false).unwrap(), 0.);
        assert_approx_eq!(f64, hugoniot.compression_at(0., false).unwrap(), 1.);
    }

    #[test]
    fn test_compression_consistent_with_pressure() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..200 {
            let c0 = rng.gen_range(0.5..6.);
            let s = rng.gen_range(1.0..2.2);
            let rho = rng.gen_range(0.9..8.);
            let up = rng.gen_range(1e-3..10.);
            let hugoniot = FittedHugoniot::new(
                "random",
                ShockVelocityFit::Linear { c0, s },
                InitialState::new(rho, 0.),
            );
            let compression = hugoniot.compression_at(up, false).unwrap();
            assert!(compression > 1.);
            // Us = c Up / (c - 1), P = R00 Us Up
            let us = compression * up / (compression - 1.);
            let p = rho * us * up;
            assert_approx_eq!(
                f64,
                p,
                hugoniot.pressure_at(up, false).unwrap(),
                epsilon = 1e-9 * p.max(1.)
            );
        }
    }

    #[test]
    fn test_valid_range() {
        let hugoniot = basalt().with_valid_range(Some((0.5, 4.)));
        assert!(matches!(
            hugoniot.pressure_at(5., false),
            Err(HugoniotError::OutOfRange { .. })
        ));
        assert!(hugoniot.pressure_at(5., true).is_ok());
        assert!(hugoniot.pressure_at(-0.1, true).is_err());
    }

    #[test]
    fn test_singular_fit() {
        // Us = Up everywhere
        let hugoniot = FittedHugoniot::new(
            "degenerate",
            ShockVelocityFit::Linear { c0: 0., s: 1. },
            InitialState::new(1., 0.),
        );
        assert_eq!(
            hugoniot.compression_at(1., false),
            Err(HugoniotError::DivisionSingularity { up: 1. })
        );
    }

    #[test]
    fn test_unreachable_shock_velocity() {
        assert_eq!(
            basalt().particle_velocity_for_shock(2., false),
            Err(HugoniotError::ShockOutOfRange {
                us: 2.,
                min: 2.6,
                max: f64::INFINITY
            })
        );

        let bounded = basalt().with_valid_range(Some((0.5, 4.)));
        assert_eq!(
            bounded.particle_velocity_for_shock(2., false),
            Err(HugoniotError::ShockOutOfRange {
                us: 2.,
                min: 2.6,
                max: 2.6 + 1.6 * 4.
            })
        );

        let quadratic = FittedHugoniot::new(
            "quadratic",
            ShockVelocityFit::Quadratic { c0: 1.5, s1: 1.8, s2: -0.03 },
            InitialState::new(1., 0.),
        );
        let Err(HugoniotError::ShockOutOfRange { max, .. }) =
            quadratic.particle_velocity_for_shock(30., false)
        else {
            panic!("expected a shock velocity range error");
        };
        assert_approx_eq!(f64, max, 1.5 + 1.8 * 1.8 / 0.12, epsilon = 1e-12);
    }

    #[test]
    fn test_inversion() {
        let hugoniot = basalt();
        assert_approx_eq!(
            f64,
            hugoniot.particle_velocity_for_shock(2.6 + 1.6 * 1.5, false).unwrap(),
            1.5,
            epsilon = 1e-12
        );

        let quadratic = FittedHugoniot::new(
            "quadratic",
            ShockVelocityFit::Quadratic { c0: 1.5, s1: 1.8, s2: -0.03 },
            InitialState::new(1., 0.),
        );
        let us = quadratic.shock_velocity_at(3., false).unwrap();
        assert_approx_eq!(
            f64,
            quadratic.particle_velocity_for_shock(us, false).unwrap(),
            3.,
            epsilon = 1e-10
        );

        let liquid = FittedHugoniot::new(
            "water",
            ShockVelocityFit::UniversalLiquid { a: 1.7, b: 1.4, c: 1.2, d: 0.5 },
            InitialState::new(1., 0.),
        );
        let us = liquid.shock_velocity_at(2.2, false).unwrap();
        assert_approx_eq!(
            f64,
            liquid.particle_velocity_for_shock(us, false).unwrap(),
            2.2,
            epsilon = 1e-9
        );
    }
}
