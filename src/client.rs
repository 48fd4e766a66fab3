use std::path::{Path, PathBuf};

use wreq::{Client, header};
use wreq_util::Emulation;

use crate::config::HysplitConfig;
use crate::error::{DownloadError, Error, Result, SubmissionError};
use crate::extract::{extract_job_id, job_id_from_url};
use crate::request::{self, FormStep, RESULTS_DIR_PATH, RESULTS_PAGE_PATH};
use crate::types::{JobIdentifier, ResultArchive};

const ARCHIVE_CONTENT_TYPES: [&str; 2] = ["application/zip", "application/octet-stream"];
const MAX_REDIRECTS: usize = 10;

/// Name of the result archive for a job, e.g. `gis_123456.zip`
pub fn archive_file_name(job_id: &JobIdentifier) -> String {
    format!("gis_{}.zip", job_id)
}

/// Download URL of the GIS result archive for a job
pub fn download_url(base_url: &str, job_id: &JobIdentifier) -> String {
    format!(
        "{}{}/{}",
        base_url.trim_end_matches('/'),
        RESULTS_DIR_PATH,
        archive_file_name(job_id)
    )
}

/// Human-facing results page for a job
pub fn results_page_url(base_url: &str, job_id: &JobIdentifier) -> String {
    format!(
        "{}{}?jobidno={}",
        base_url.trim_end_matches('/'),
        RESULTS_PAGE_PATH,
        job_id
    )
}

/// Body and post-redirect URL of a form response
#[derive(Debug, Default)]
struct FormResponse {
    body: String,
    final_url: String,
}

pub struct HysplitClient {
    http_client: Client,
    config: HysplitConfig,
}

impl HysplitClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HysplitConfig::default())
    }

    pub fn with_config(config: HysplitConfig) -> Result<Self> {
        // The cookie store carries the form session across the submission steps
        let mut http_builder = Client::builder()
            .emulation(Emulation::Chrome143)
            .cookie_store(true)
            .redirect(wreq::redirect::Policy::limited(MAX_REDIRECTS))
            .gzip(true)
            .brotli(true)
            .zstd(true);

        if let Some(timeout) = config.request_timeout {
            http_builder = http_builder.timeout(timeout);
        }

        let http_client = http_builder.build().map_err(Error::Client)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &HysplitConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Submit, wait the fixed delay, then download the result archive.
    pub async fn run(&self) -> Result<ResultArchive> {
        let job_id = self.submit().await?;
        tracing::info!(
            job_id = %job_id,
            results_page = %results_page_url(&self.config.base_url, &job_id),
            "Job submitted"
        );

        tracing::info!(
            job_id = %job_id,
            wait_secs = self.config.result_wait.as_secs_f64(),
            "Waiting before downloading results"
        );
        tokio::time::sleep(self.config.result_wait).await;

        let archive = self.fetch_result(&job_id).await?;
        Ok(archive)
    }

    /// Walk the submission form sequence and return the assigned job id.
    ///
    /// The id is read from the final response body, or failing that from the
    /// URL the final POST was redirected to.
    pub async fn submit(&self) -> Result<JobIdentifier> {
        let steps = request::submission_steps(&self.config.params);
        let mut last = FormResponse::default();

        for (i, step) in steps.iter().enumerate() {
            if i > 0 && !self.config.step_delay.is_zero() {
                tokio::time::sleep(self.config.step_delay).await;
            }
            last = self.post_form(step).await?;
        }

        let job_id = extract_job_id(&last.body).or_else(|err| {
            let from_url = job_id_from_url(&last.final_url);
            if from_url.is_some() {
                tracing::debug!(url = %last.final_url, "Found job identifier in redirect URL");
            }
            from_url.ok_or(err)
        })?;
        Ok(job_id)
    }

    async fn post_form(
        &self,
        step: &FormStep,
    ) -> std::result::Result<FormResponse, SubmissionError> {
        let url = self.url(step.path);
        tracing::info!(step = step.name, url = %url, "Posting form");

        let response = self
            .http_client
            .post(&url)
            .header(header::CACHE_CONTROL, "max-age=0")
            .header(header::REFERER, self.url(step.referer_path))
            .header("sec-fetch-user", "?1")
            .form(&step.fields)
            .send()
            .await
            .map_err(|source| SubmissionError::Request {
                step: step.name,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SubmissionError::Status {
                step: step.name,
                status: status.as_u16(),
            });
        }

        let final_url = response.uri().to_string();
        let body = response
            .text()
            .await
            .map_err(|source| SubmissionError::Request {
                step: step.name,
                source,
            })?;

        tracing::debug!(
            step = step.name,
            status = status.as_u16(),
            bytes = body.len(),
            final_url = %final_url,
            "Form accepted"
        );
        Ok(FormResponse { body, final_url })
    }

    /// Download the result archive for a job and write it to the output dir.
    ///
    /// One attempt only. Nothing is written unless the server answered with
    /// a success status and a non-empty body.
    pub async fn fetch_result(
        &self,
        job_id: &JobIdentifier,
    ) -> std::result::Result<ResultArchive, DownloadError> {
        let url = download_url(&self.config.base_url, job_id);
        tracing::info!(job_id = %job_id, url = %url, "Downloading result archive");

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url,
                status: status.as_u16(),
            });
        }

        // Direct file links are not always labelled correctly, so only warn
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !ARCHIVE_CONTENT_TYPES
            .iter()
            .any(|expected| content_type.contains(expected))
        {
            tracing::warn!(content_type = %content_type, "Unexpected content-type, proceeding with download");
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.clone(),
                source,
            })?
            .to_vec();

        if bytes.is_empty() {
            return Err(DownloadError::EmptyBody { url });
        }

        let path = self.config.output_dir.join(archive_file_name(job_id));
        write_archive(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Saved result archive");
        Ok(ResultArchive {
            job_id: job_id.clone(),
            path,
            bytes,
        })
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    PathBuf::from(part)
}

/// Write via a `.part` sibling and rename, so a failed write leaves nothing
/// under the final name.
async fn write_archive(path: &Path, bytes: &[u8]) -> std::result::Result<(), DownloadError> {
    let part = part_path(path);

    let written = async {
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&part, bytes).await?;
        tokio::fs::rename(&part, path).await
    }
    .await;

    if let Err(source) = written {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(DownloadError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}
