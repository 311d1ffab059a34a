use crate::{errors::HugoniotError, material::HugoniotPoint};

use super::{HugoniotModel, InitialState, ShockState};

/// A Hugoniot given by measured shock states, linearly interpolated in Up.
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedHugoniot {
    material: String,
    initial: InitialState,
    points: Vec<HugoniotPoint>,
}

impl TabulatedHugoniot {
    /// Build from measured points. Points are sorted by particle velocity and at
    /// least two distinct particle velocities are required.
    pub fn new(
        material: impl Into<String>,
        initial: InitialState,
        mut points: Vec<HugoniotPoint>,
    ) -> Result<Self, HugoniotError> {
        let material = material.into();
        points.sort_by(|a, b| a.particle_velocity.total_cmp(&b.particle_velocity));
        let distinct = points
            .windows(2)
            .filter(|w| w[1].particle_velocity > w[0].particle_velocity)
            .count();
        if distinct == 0 {
            return Err(HugoniotError::InsufficientData {
                material,
                needed: 2,
                found: points.len().min(1),
            });
        }
        Ok(Self {
            material,
            initial,
            points,
        })
    }

    pub fn points(&self) -> &[HugoniotPoint] {
        &self.points
    }

    fn envelope(&self) -> (f64, f64) {
        (
            self.points[0].particle_velocity,
            self.points[self.points.len() - 1].particle_velocity,
        )
    }

    /// Locate the bracketing pair and the interpolation fraction. Fractions
    /// outside [0, 1] only occur when extrapolating.
    fn bracket(&self, up: f64, extrapolate: bool) -> Result<(usize, f64), HugoniotError> {
        let (min, max) = self.envelope();
        if !up.is_finite() || (!extrapolate && (up < min || up > max)) {
            return Err(HugoniotError::OutOfRange { up, min, max });
        }
        let segments = || {
            self.points
                .windows(2)
                .enumerate()
                .filter(|(_, w)| w[1].particle_velocity > w[0].particle_velocity)
        };
        let fraction = |i: usize| {
            let (a, b) = (&self.points[i], &self.points[i + 1]);
            (up - a.particle_velocity) / (b.particle_velocity - a.particle_velocity)
        };

        if let Some((i, _)) = segments()
            .find(|(_, w)| w[0].particle_velocity <= up && up <= w[1].particle_velocity)
        {
            return Ok((i, fraction(i)));
        }
        // Only reachable when extrapolating
        let (i, _) = if up < min {
            segments().next()
        } else {
            segments().last()
        }
        .ok_or(HugoniotError::OutOfRange { up, min, max })?;
        Ok((i, fraction(i)))
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

impl HugoniotModel for TabulatedHugoniot {
    fn material(&self) -> &str {
        &self.material
    }

    fn initial_state(&self) -> InitialState {
        self.initial
    }

    fn up_range(&self) -> Option<(f64, f64)> {
        Some(self.envelope())
    }

    fn state_at(&self, up: f64, extrapolate: bool) -> Result<ShockState, HugoniotError> {
        let (i, t) = self.bracket(up, extrapolate)?;
        let (a, b) = (&self.points[i], &self.points[i + 1]);
        Ok(ShockState {
            particle_velocity: up,
            shock_velocity: lerp(a.shock_velocity, b.shock_velocity, t),
            pressure: lerp(a.pressure, b.pressure, t),
            compression: lerp(a.compression, b.compression, t),
            density: lerp(a.density, b.density, t),
            energy: lerp(a.energy, b.energy, t),
        })
    }

    fn particle_velocity_for_shock(
        &self,
        us: f64,
        extrapolate: bool,
    ) -> Result<f64, HugoniotError> {
        let hit = self.points.windows(2).find(|w| {
            let (lo, hi) = if w[0].shock_velocity <= w[1].shock_velocity {
                (w[0].shock_velocity, w[1].shock_velocity)
            } else {
                (w[1].shock_velocity, w[0].shock_velocity)
            };
            lo <= us && us <= hi && hi > lo
        });
        let w = match hit {
            Some(w) => w,
            None if extrapolate => {
                let first = &self.points[..2];
                let last = &self.points[self.points.len() - 2..];
                if us < self.points[0].shock_velocity {
                    first
                } else {
                    last
                }
            }
            None => {
                let (min, max) = self
                    .points
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |acc, p| {
                        (acc.0.min(p.shock_velocity), acc.1.max(p.shock_velocity))
                    });
                return Err(HugoniotError::ShockOutOfRange { us, min, max });
            }
        };
        if w[1].shock_velocity == w[0].shock_velocity {
            return Err(HugoniotError::InvalidParameter(format!(
                "measured shock velocities of {} are degenerate near {us} km/s",
                self.material
            )));
        }
        let t = (us - w[0].shock_velocity) / (w[1].shock_velocity - w[0].shock_velocity);
        Ok(lerp(w[0].particle_velocity, w[1].particle_velocity, t))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use float_cmp::assert_approx_eq;

    fn basalt() -> TabulatedHugoniot {
        let initial = InitialState::new(2.86, 0.);
        let points = vec![
            HugoniotPoint::from_jump(1., 1.530, 21.463, &initial),
            HugoniotPoint::from_jump(1., 0.790, 10.280, &initial),
            HugoniotPoint::from_jump(1., 2.450, 40.120, &initial),
        ];
        TabulatedHugoniot::new("Basalt", initial, points).unwrap()
    }

    #[test]
    fn test_interpolation_between_first_rows() {
        let basalt = basalt();
        let p = basalt.pressure_at(1., false).unwrap();
        assert!(p > 10.280 && p < 21.463);
        assert_approx_eq!(
            f64,
            p,
            10.280 + (1. - 0.790) / (1.530 - 0.790) * (21.463 - 10.280),
            epsilon = 1e-12
        );

        let mut previous = basalt.pressure_at(0.790, false).unwrap();
        for i in 1..=20 {
            let up = 0.790 + i as f64 * (1.530 - 0.790) / 20.;
            let p = basalt.pressure_at(up, false).unwrap();
            assert!(p > previous);
            previous = p;
        }
    }

    #[test]
    fn test_out_of_range() {
        let basalt = basalt();
        assert_eq!(
            basalt.pressure_at(0.5, false),
            Err(HugoniotError::OutOfRange {
                up: 0.5,
                min: 0.790,
                max: 2.450
            })
        );
        let p = basalt.pressure_at(0.5, true).unwrap();
        assert!(p < 10.280);
        assert!(basalt.pressure_at(3., true).unwrap() > 40.120);
    }

    #[test]
    fn test_measured_values_reproduced() {
        let basalt = basalt();
        assert_approx_eq!(f64, basalt.pressure_at(1.530, false).unwrap(), 21.463);
        let us = basalt.shock_velocity_at(1.530, false).unwrap();
        assert_approx_eq!(
            f64,
            basalt.particle_velocity_for_shock(us, false).unwrap(),
            1.530,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_shock_velocity_outside_measured_rows() {
        let basalt = basalt();
        let Err(HugoniotError::ShockOutOfRange { us, min, max }) =
            basalt.particle_velocity_for_shock(9., false)
        else {
            panic!("expected a shock velocity range error");
        };
        assert_approx_eq!(f64, us, 9.);
        assert_approx_eq!(f64, min, 10.280 / (2.86 * 0.790), epsilon = 1e-12);
        assert_approx_eq!(f64, max, 40.120 / (2.86 * 2.450), epsilon = 1e-12);

        assert!(basalt.particle_velocity_for_shock(9., true).unwrap() > 2.450);
    }

    #[test]
    fn test_requires_two_distinct_points() {
        let initial = InitialState::new(2.86, 0.);
        let points = vec![
            HugoniotPoint::from_jump(1., 1., 12., &initial),
            HugoniotPoint::from_jump(1., 1., 13., &initial),
        ];
        assert!(matches!(
            TabulatedHugoniot::new("Basalt", initial, points),
            Err(HugoniotError::InsufficientData { .. })
        ));
    }
}
