use std::fmt::{self, Display};

use yaml_rust::Yaml;

/// Errors raised while evaluating or building a single material's Hugoniot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HugoniotError {
    #[error("Particle velocity {up} km/s is outside the Hugoniot envelope [{min}, {max}] km/s")]
    OutOfRange { up: f64, min: f64, max: f64 },

    #[error("Shock velocity {us} km/s is outside the Hugoniot envelope [{min}, {max}] km/s")]
    ShockOutOfRange { us: f64, min: f64, max: f64 },

    #[error("Shock velocity equals particle velocity ({up} km/s): jump relations are singular")]
    DivisionSingularity { up: f64 },

    #[error("Shock velocity {us} km/s is below particle velocity {up} km/s")]
    NonPhysicalState { up: f64, us: f64 },

    #[error("Invalid Hugoniot point {index} for {material}: {reason}")]
    InvalidPoint {
        material: String,
        index: usize,
        reason: String,
    },

    #[error("{material} needs at least {needed} Hugoniot points, found {found}")]
    InsufficientData {
        material: String,
        needed: usize,
        found: usize,
    },

    #[error("{material} has no {representation} Hugoniot")]
    MissingHugoniot {
        material: String,
        representation: &'static str,
    },

    #[error("Unknown material: {0}")]
    UnknownMaterial(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Machine readable reason attached to a failed [`MatchFailure`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, num_enum::IntoPrimitive, num_enum::TryFromPrimitive,
)]
#[repr(u8)]
pub enum FailureReason {
    OutOfRange = 1,
    DivisionSingularity = 2,
    NonOverlappingDomains = 3,
    NoIntersection = 4,
    NonConvergence = 5,
    UnknownMaterial = 6,
    MissingHugoniot = 7,
    InvalidQuery = 8,
}

impl FailureReason {
    pub fn code(self) -> u8 {
        self.into()
    }
}

impl Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureReason::OutOfRange => "OutOfRange",
            FailureReason::DivisionSingularity => "DivisionSingularity",
            FailureReason::NonOverlappingDomains => "NonOverlappingDomains",
            FailureReason::NoIntersection => "NoIntersection",
            FailureReason::NonConvergence => "NonConvergence",
            FailureReason::UnknownMaterial => "UnknownMaterial",
            FailureReason::MissingHugoniot => "MissingHugoniot",
            FailureReason::InvalidQuery => "InvalidQuery",
        };
        write!(f, "{name}")
    }
}

/// A recoverable impedance-match failure, ready to be shown to a user.
///
/// The Up ranges of both curves are attached whenever they were known at the
/// time of failure.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchFailure {
    pub reason: FailureReason,
    pub message: String,
    pub driver_range: Option<(f64, f64)>,
    pub target_range: Option<(f64, f64)>,
}

impl MatchFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
            driver_range: None,
            target_range: None,
        }
    }

    pub fn with_ranges(mut self, driver: (f64, f64), target: (f64, f64)) -> Self {
        self.driver_range = Some(driver);
        self.target_range = Some(target);
        self
    }
}

impl Display for MatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.reason, self.message)?;
        if let (Some(d), Some(t)) = (self.driver_range, self.target_range) {
            write!(
                f,
                " (driver Up in [{:.4}, {:.4}], target Up in [{:.4}, {:.4}] km/s)",
                d.0, d.1, t.0, t.1
            )?;
        }
        Ok(())
    }
}

impl std::error::Error for MatchFailure {}

impl From<HugoniotError> for MatchFailure {
    fn from(error: HugoniotError) -> Self {
        let reason = match &error {
            HugoniotError::OutOfRange { .. } | HugoniotError::ShockOutOfRange { .. } => {
                FailureReason::OutOfRange
            }
            HugoniotError::DivisionSingularity { .. } => FailureReason::DivisionSingularity,
            HugoniotError::UnknownMaterial(_) => FailureReason::UnknownMaterial,
            HugoniotError::MissingHugoniot { .. } | HugoniotError::InsufficientData { .. } => {
                FailureReason::MissingHugoniot
            }
            HugoniotError::NonPhysicalState { .. }
            | HugoniotError::InvalidPoint { .. }
            | HugoniotError::InvalidParameter(_) => FailureReason::InvalidQuery,
        };
        MatchFailure::new(reason, error.to_string())
    }
}

/// Errors raised while reading a YAML run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required parameter in configuration: {0}")]
    MissingParameter(String),

    #[error("Unknown release model configured: {0}")]
    UnknownReleaseModel(String),

    #[error("Unknown Hugoniot fit form configured: {0}")]
    UnknownFitForm(String),

    #[error("Unknown Hugoniot source configured: {0}")]
    UnknownHugoniotSource(String),

    #[error("Expected array but found: {0:?}")]
    InvalidArrayFormat(Yaml),

    #[error("Expected array of length {0}, but found {1}")]
    InvalidArrayLength(usize, usize),

    #[error("Invalid material {0}: {1}")]
    InvalidMaterial(String, #[source] HugoniotError),

    #[error("Invalid sweep {0}: {1}")]
    InvalidSweep(String, #[source] HugoniotError),

    #[error("Invalid YAML: {0}")]
    InvalidYaml(#[from] yaml_rust::ScanError),
}
