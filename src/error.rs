use thiserror::Error;

/// User-recoverable failures of the annotation core.
///
/// None of these are fatal: the operation that produced one has left the
/// session untouched and the user can simply retry.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RoiError {
    #[error("set the reference radius first")]
    NotCalibrated,
    #[error("'{0}' is not a valid reference size, enter a positive number")]
    InvalidCalibrationInput(String),
    #[error("{0}")]
    DegenerateShape(String),
    #[error("load an image before calibrating")]
    NoImageLoaded,
    #[error("the reference circle must be placed before it can be confirmed")]
    CalibrationNotEditing,
    #[error("cannot encode export: {0}")]
    Serialize(String),
}

impl RoiError {
    pub fn title(&self) -> &'static str {
        match self {
            Self::NotCalibrated => "Not calibrated",
            Self::InvalidCalibrationInput(_) => "Invalid reference size",
            Self::DegenerateShape(_) => "Shape discarded",
            Self::NoImageLoaded => "No image",
            Self::CalibrationNotEditing => "Reference radius",
            Self::Serialize(_) => "Export failed",
        }
    }
}

impl From<serde_json::Error> for RoiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}
