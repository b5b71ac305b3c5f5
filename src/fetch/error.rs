use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Failed to create artifact directory '{0}'")]
    ArtifactDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Request timed out for {0}")]
    Timeout(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write artifact '{0}'")]
    ArtifactWrite(PathBuf, #[source] std::io::Error),
}

impl FetchError {
    pub(crate) fn from_request(url: String, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(url, e)
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus {
                url,
                status,
                source: e,
            }
        } else {
            FetchError::NetworkRequest(url, e)
        }
    }
}
