use crate::{
    curve::{CurvePoint, HugoniotCurve},
    errors::HugoniotError,
    material::Gruneisen,
};

use super::ReleaseModel;

/// Approximates both the release isentrope and the reshock Hugoniot of the
/// driver by its principal Hugoniot mirrored about Up = Up1.
///
/// This is the classic impedance-match simplification. It is exact only at
/// the shocked state itself; away from it the mirrored curve slightly
/// overestimates the release pressure.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirroredHugoniot;

impl ReleaseModel for MirroredHugoniot {
    fn name(&self) -> &'static str {
        "mirrored"
    }

    fn driver_curve(
        &self,
        principal: &HugoniotCurve,
        shocked: &CurvePoint,
        _gruneisen: Option<Gruneisen>,
    ) -> Result<HugoniotCurve, HugoniotError> {
        Ok(principal
            .reflect(shocked.particle_velocity)
            .with_anchor(*shocked))
    }
}
