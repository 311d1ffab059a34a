/// Number of uniform samples used to bracket sign changes of the residual
/// between two fitted curves.
pub const BRACKET_SAMPLES: usize = 200;

/// Bisection stops once the bracket is narrower than this (in km/s).
pub const ROOT_TOLERANCE: f64 = 1e-4;

/// Upper bound on bisection steps per bracket.
pub const MAX_BISECTION_ITERATIONS: usize = 100;

/// Segments whose cross product falls below this are treated as parallel.
pub const SEGMENT_EPSILON: f64 = 1e-12;

/// Crossings closer than this in Up (km/s) are the same crossing.
pub const COINCIDENCE_TOLERANCE: f64 = 1e-9;

/// Samples per fitted Hugoniot curve.
pub const GRID_POINTS: usize = 2001;

/// Fitted curves are sampled on Up in [0, factor * reference velocity].
pub const GRID_EXTENT_FACTOR: f64 = 2.;

/// Tolerance used when selecting measured rows by porosity.
pub const POROSITY_TOLERANCE: f64 = 1e-6;

/// Least-squares normal equations whose determinant falls below this,
/// relative to their largest entry, are singular.
pub const FIT_SINGULARITY_TOLERANCE: f64 = 1e-12;

/// Default Grüneisen parameter when a material does not configure one.
pub const DEFAULT_GAMMA0: f64 = 1.;

/// Default exponent of the Grüneisen volume dependence.
pub const DEFAULT_GAMMA_EXPONENT: f64 = 1.;

/// Numerical thresholds for curve construction and intersection.
///
/// Every tolerance the solver compares against lives here so that callers
/// (and tests) can pin exact boundary behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    pub bracket_samples: usize,
    pub root_tolerance: f64,
    pub max_bisection_iterations: usize,
    pub segment_epsilon: f64,
    pub coincidence_tolerance: f64,
    pub grid_points: usize,
    pub grid_extent_factor: f64,
    pub porosity_tolerance: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            bracket_samples: BRACKET_SAMPLES,
            root_tolerance: ROOT_TOLERANCE,
            max_bisection_iterations: MAX_BISECTION_ITERATIONS,
            segment_epsilon: SEGMENT_EPSILON,
            coincidence_tolerance: COINCIDENCE_TOLERANCE,
            grid_points: GRID_POINTS,
            grid_extent_factor: GRID_EXTENT_FACTOR,
            porosity_tolerance: POROSITY_TOLERANCE,
        }
    }
}
