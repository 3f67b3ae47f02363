// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

use crate::services::forecast::Instrument;

pub type Result<T> = std::result::Result<T, SimulationError>;

#[derive(Error, Debug)]
pub enum SimulationError {
    /// A model artifact could not be read or parsed at startup.
    #[error("Failed to load {} model from {}: {}", .instrument, .path.display(), .message)]
    ModelLoadFailure {
        instrument: Instrument,
        path: PathBuf,
        message: String,
    },

    /// The model raised while predicting.
    #[error("Prediction failed for {instrument}: {message}")]
    PredictionFailure {
        instrument: Instrument,
        message: String,
    },

    #[error("'{field}' column not found in {instrument} predictions")]
    MissingPredictionField {
        instrument: Instrument,
        field: &'static str,
    },

    #[error("Malformed input: {message}")]
    MalformedInput { message: String },
}

impl SimulationError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }
}
