//! Error types for the submit → extract → download pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// A form step of the submission sequence failed.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Submission step {step} could not be sent")]
    Request {
        step: &'static str,
        #[source]
        source: wreq::Error,
    },

    #[error("Submission step {step} returned HTTP {status}")]
    Status { step: &'static str, status: u16 },
}

/// No usable job identifier in the submission response.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No job identifier found in submission response ({body_len} bytes)")]
    NotFound { body_len: usize },

    #[error("Invalid job identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Fetching or storing the result archive failed.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Download request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: wreq::Error,
    },

    #[error("Download from {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Download from {url} returned an empty body")]
    EmptyBody { url: String },

    #[error("Failed to write result archive to {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Bad environment or params file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read trajectory params from {path}")]
    ParamsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse trajectory params in {path}")]
    ParamsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Submission(#[from] SubmissionError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client")]
    Client(#[source] wreq::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
