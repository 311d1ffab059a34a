use log::{debug, warn};

use crate::{
    constants::{DEFAULT_GAMMA0, DEFAULT_GAMMA_EXPONENT},
    curve::{CurveKind, CurvePoint, HugoniotCurve},
    errors::HugoniotError,
    material::Gruneisen,
};

use super::ReleaseModel;

/// Release isentrope and reshock Hugoniot from a Mie-Grüneisen equation of
/// state referenced to the principal Hugoniot:
///
/// P - P_H(V) = (gamma / V) (E - E_H(V)), with gamma = gamma0 (V / V00)^q.
///
/// Both branches are evaluated at the specific volumes of the principal
/// Hugoniot samples. The isentrope integrates dE = -P dV with the trapezoidal
/// rule and recovers the particle velocity from the Riemann invariant
/// du = sqrt(-dP dV). States where the model turns non-physical end the
/// branch.
#[derive(Debug, Clone, Copy, Default)]
pub struct MieGruneisen;

/// State on the principal Hugoniot in the (V, P, E) space.
#[derive(Debug, Clone, Copy)]
struct VolumeState {
    volume: f64,
    pressure: f64,
    energy: f64,
    particle_velocity: f64,
}

impl MieGruneisen {
    fn release_branch(
        shocked: &VolumeState,
        hugoniot: &[VolumeState],
        gruneisen: &Gruneisen,
        reference_volume: f64,
    ) -> Vec<VolumeState> {
        let mut branch = vec![];
        let mut previous = *shocked;
        // Expansion: larger volumes, walked away from the shocked state
        for h in hugoniot
            .iter()
            .rev()
            .filter(|h| h.particle_velocity < shocked.particle_velocity)
        {
            let dv = h.volume - previous.volume;
            if dv <= 0. {
                continue;
            }
            let g = gruneisen.gamma(h.volume, reference_volume) / h.volume;
            let offset = previous.energy - 0.5 * previous.pressure * dv - h.energy;
            let pressure = (h.pressure + g * offset) / (1. + 0.5 * g * dv);
            if !pressure.is_finite() || pressure < 0. || pressure > previous.pressure {
                debug!("Release isentrope ends at V = {:.5} cm^3/g", h.volume);
                break;
            }
            let energy = previous.energy - 0.5 * (pressure + previous.pressure) * dv;
            let particle_velocity =
                previous.particle_velocity + ((previous.pressure - pressure) * dv).sqrt();
            previous = VolumeState {
                volume: h.volume,
                pressure,
                energy,
                particle_velocity,
            };
            branch.push(previous);
        }
        branch
    }

    fn reshock_branch(
        shocked: &VolumeState,
        hugoniot: &[VolumeState],
        gruneisen: &Gruneisen,
        reference_volume: f64,
    ) -> Vec<VolumeState> {
        let mut branch = vec![];
        let mut last_pressure = shocked.pressure;
        for h in hugoniot
            .iter()
            .filter(|h| h.particle_velocity > shocked.particle_velocity)
        {
            let dv = shocked.volume - h.volume;
            if dv <= 0. {
                continue;
            }
            let g = gruneisen.gamma(h.volume, reference_volume) / h.volume;
            let denominator = 1. - 0.5 * g * dv;
            if denominator <= 0. {
                debug!(
                    "Reshock Hugoniot reaches its compression limit at V = {:.5} cm^3/g",
                    h.volume
                );
                break;
            }
            let offset = shocked.energy + 0.5 * shocked.pressure * dv - h.energy;
            let pressure = (h.pressure + g * offset) / denominator;
            if !pressure.is_finite() || pressure < last_pressure {
                debug!("Reshock Hugoniot rolls over at V = {:.5} cm^3/g", h.volume);
                break;
            }
            last_pressure = pressure;
            branch.push(VolumeState {
                volume: h.volume,
                pressure,
                energy: shocked.energy + 0.5 * (pressure + shocked.pressure) * dv,
                particle_velocity: shocked.particle_velocity
                    - ((pressure - shocked.pressure) * dv).sqrt(),
            });
        }
        branch
    }
}

impl ReleaseModel for MieGruneisen {
    fn name(&self) -> &'static str {
        "mie_gruneisen"
    }

    fn driver_curve(
        &self,
        principal: &HugoniotCurve,
        shocked: &CurvePoint,
        gruneisen: Option<Gruneisen>,
    ) -> Result<HugoniotCurve, HugoniotError> {
        if principal.kind() != CurveKind::Principal {
            return Err(HugoniotError::InvalidParameter(format!(
                "release of {} must start from its principal Hugoniot",
                principal.material()
            )));
        }
        let gruneisen = gruneisen.unwrap_or_else(|| {
            warn!(
                "No Grüneisen parameters for {}, assuming gamma0 = {}, q = {}",
                principal.material(),
                DEFAULT_GAMMA0,
                DEFAULT_GAMMA_EXPONENT
            );
            Gruneisen::new(DEFAULT_GAMMA0, DEFAULT_GAMMA_EXPONENT)
        });

        let initial = principal.initial_state();
        let reference_volume = initial.specific_volume();
        let to_volume_state = |p: &CurvePoint| VolumeState {
            volume: reference_volume / p.compression,
            pressure: p.pressure,
            energy: p.energy,
            particle_velocity: p.particle_velocity,
        };
        let hugoniot: Vec<VolumeState> = principal.points().iter().map(to_volume_state).collect();
        let state = to_volume_state(shocked);

        let release = Self::release_branch(&state, &hugoniot, &gruneisen, reference_volume);
        let reshock = Self::reshock_branch(&state, &hugoniot, &gruneisen, reference_volume);
        debug!(
            "{} release: {} isentrope and {} reshock states",
            principal.material(),
            release.len(),
            reshock.len()
        );

        let to_curve_point = |s: &VolumeState| {
            CurvePoint::new(s.particle_velocity, s.pressure, reference_volume / s.volume, s.energy)
        };
        let samples = reshock
            .iter()
            .chain(release.iter())
            .map(to_curve_point)
            .chain(std::iter::once(*shocked))
            .collect();
        Ok(
            HugoniotCurve::new(principal.material(), CurveKind::Release, initial, samples)?
                .with_anchor(*shocked),
        )
    }
}
