use glam::{DMat2, DMat3, DVec3};

use crate::{
    constants::FIT_SINGULARITY_TOLERANCE, errors::HugoniotError, material::MaterialRecord,
};

use super::ShockVelocityFit;

/// Polynomial form of a least-squares Us-Up fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitForm {
    Linear,
    Quadratic,
}

impl FitForm {
    fn coefficients(&self) -> usize {
        match self {
            FitForm::Linear => 2,
            FitForm::Quadratic => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitQuality {
    /// Number of measured points the fit was made on.
    pub points: usize,
    /// Population standard deviation of the Us residuals (km/s).
    pub residual_stdev: f64,
}

/// Fit Us = c0 + s1 Up (+ s2 Up^2) to the measured points of `record` at its
/// own porosity. When `up_window` is given only points strictly inside it are
/// used.
pub fn least_squares_fit(
    record: &MaterialRecord,
    form: FitForm,
    up_window: Option<(f64, f64)>,
    porosity_tolerance: f64,
) -> Result<(ShockVelocityFit, FitQuality), HugoniotError> {
    let samples: Vec<(f64, f64)> = record
        .points_at_porosity(porosity_tolerance)
        .filter(|p| match up_window {
            Some((lo, hi)) => p.particle_velocity > lo && p.particle_velocity < hi,
            None => true,
        })
        .map(|p| (p.particle_velocity, p.shock_velocity))
        .collect();

    let n = form.coefficients();
    if samples.len() < n {
        return Err(HugoniotError::InsufficientData {
            material: record.name().to_string(),
            needed: n,
            found: samples.len(),
        });
    }

    // Normal equations A^T A c = A^T y with A_ij = Up_i^j
    let mut matrix = DMat3::ZERO;
    let mut rhs = DVec3::ZERO;
    for &(up, us) in samples.iter() {
        let powers = DVec3::new(1., up, up * up);
        matrix += DMat3::from_cols(powers.x * powers, powers.y * powers, powers.z * powers);
        rhs += us * powers;
    }

    let singular = || {
        HugoniotError::InvalidParameter(format!(
            "measured particle velocities of {} do not determine a {} fit",
            record.name(),
            match form {
                FitForm::Linear => "linear",
                FitForm::Quadratic => "quadratic",
            }
        ))
    };

    let fit = match form {
        FitForm::Linear => {
            let matrix = DMat2::from_cols(matrix.x_axis.truncate(), matrix.y_axis.truncate());
            let scale = matrix.to_cols_array().into_iter().map(f64::abs).fold(0., f64::max);
            if matrix.determinant().abs() <= FIT_SINGULARITY_TOLERANCE * scale.powi(2) {
                return Err(singular());
            }
            let coefficients = matrix.inverse().mul_vec2(rhs.truncate());
            ShockVelocityFit::Linear {
                c0: coefficients.x,
                s: coefficients.y,
            }
        }
        FitForm::Quadratic => {
            let scale = matrix.to_cols_array().into_iter().map(f64::abs).fold(0., f64::max);
            if matrix.determinant().abs() <= FIT_SINGULARITY_TOLERANCE * scale.powi(3) {
                return Err(singular());
            }
            let coefficients = matrix.inverse().mul_vec3(rhs);
            ShockVelocityFit::Quadratic {
                c0: coefficients.x,
                s1: coefficients.y,
                s2: coefficients.z,
            }
        }
    };

    let mean_square = samples
        .iter()
        .map(|&(up, us)| (us - fit.shock_velocity(up)).powi(2))
        .sum::<f64>()
        / samples.len() as f64;

    Ok((
        fit,
        FitQuality {
            points: samples.len(),
            residual_stdev: mean_square.sqrt(),
        },
    ))
}
