use std::io;
use std::process::ExitStatus;

use thiserror::Error;

/// Problems with the form, caught before any work starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a valid URL.")]
    EmptyUrl,
    #[error("Please select a video quality.")]
    MissingQuality,
    #[error("Please select a save location.")]
    EmptySavePath,
}

impl ValidationError {
    /// Localization key for the user-facing message.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::EmptyUrl => "error-empty-url",
            Self::MissingQuality => "error-missing-quality",
            Self::EmptySavePath => "error-empty-save-path",
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("yt-dlp not found. Please install yt-dlp and make sure it's in your PATH.")]
    NotFound,
    /// A parameter the engine refuses; the message is shown to the user as is.
    #[error("{0}")]
    InvalidParameter(String),
    #[error("failed to start yt-dlp: {0}")]
    Spawn(#[source] io::Error),
    #[error("I/O error while talking to yt-dlp: {0}")]
    Io(#[from] io::Error),
    #[error("yt-dlp exited with {status}: {message}")]
    Failed { status: ExitStatus, message: String },
}

#[derive(Debug, Error)]
pub enum StartError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A download is already in progress.")]
    Busy,
    #[error("failed to spawn download worker: {0}")]
    Worker(#[source] io::Error),
}

impl StartError {
    /// Localization key for the popup text. `Worker` also shows its cause.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Validation(validation) => validation.message_key(),
            Self::Busy => "error-busy",
            Self::Worker(_) => "error-worker",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_parameter_displays_bare_message() {
        let err = EngineError::InvalidParameter("Invalid video quality choice.".into());
        assert_eq!(err.to_string(), "Invalid video quality choice.");
    }

    #[test]
    fn validation_errors_convert_into_start_errors() {
        let err: StartError = ValidationError::EmptySavePath.into();
        assert_eq!(err.to_string(), "Please select a save location.");
    }

    #[test]
    fn start_errors_map_to_localization_keys() {
        let worker = StartError::Worker(io::Error::new(io::ErrorKind::Other, "no threads"));
        assert_eq!(worker.message_key(), "error-worker");
        assert_eq!(StartError::Busy.message_key(), "error-busy");
        assert_eq!(
            StartError::from(ValidationError::MissingQuality).message_key(),
            "error-missing-quality"
        );
    }
}
