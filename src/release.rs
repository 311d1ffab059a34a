//! Release and reshock loci of a shocked driver.
//!
//! Once the driver sits at a known shocked state (Up1, P1) the interface state
//! with a second material lies on the set of states reachable from there:
//! the release isentrope when the second material is softer, a reshock
//! Hugoniot when it is stiffer. Implementations of [`ReleaseModel`] build this
//! locus in the lab frame as a [`HugoniotCurve`].

use std::fmt::Debug;

use crate::{
    curve::{CurvePoint, HugoniotCurve},
    errors::HugoniotError,
    material::Gruneisen,
};

mod mie_gruneisen;
mod mirrored;

pub use mie_gruneisen::MieGruneisen;
pub use mirrored::MirroredHugoniot;

pub trait ReleaseModel: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Locus of driver states through `shocked`, given the driver's principal
    /// Hugoniot in the (Up, P) plane.
    fn driver_curve(
        &self,
        principal: &HugoniotCurve,
        shocked: &CurvePoint,
        gruneisen: Option<Gruneisen>,
    ) -> Result<HugoniotCurve, HugoniotError>;
}

impl Default for Box<dyn ReleaseModel> {
    fn default() -> Self {
        Box::new(MirroredHugoniot)
    }
}
