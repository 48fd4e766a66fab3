pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod request;
pub mod types;

pub use client::{HysplitClient, archive_file_name, download_url, results_page_url};
pub use config::HysplitConfig;
pub use error::{ConfigError, DownloadError, Error, ExtractionError, Result, SubmissionError};
pub use extract::extract_job_id;
pub use types::{Direction, JobIdentifier, ResultArchive, TrajectoryParams};
