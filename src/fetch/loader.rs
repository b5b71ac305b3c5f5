use crate::fetch::error::FetchError;
use crate::request::query::QueryDescriptor;
use futures_util::future::join_all;
use log::{info, warn};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Where an artifact on disk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource {
    Downloaded { bytes: usize },
    Reused,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchedArtifact {
    pub path: PathBuf,
    pub source: ArtifactSource,
}

/// Downloads query results into the artifact directory.
pub struct ArtifactLoader {
    artifact_dir: PathBuf,
    download_client: Client,
    reuse_artifacts: bool,
}

impl ArtifactLoader {
    pub fn new(
        artifact_dir: &Path,
        timeout: Duration,
        reuse_artifacts: bool,
    ) -> Result<ArtifactLoader, FetchError> {
        let download_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(ArtifactLoader {
            artifact_dir: artifact_dir.to_path_buf(),
            download_client,
            reuse_artifacts,
        })
    }

    pub fn artifact_path(&self, query: &QueryDescriptor) -> PathBuf {
        self.artifact_dir.join(query.artifact_name())
    }

    /// Fetches every query concurrently. Each result is independent of the others.
    pub async fn fetch_all(
        &self,
        queries: &[QueryDescriptor],
    ) -> Vec<Result<FetchedArtifact, FetchError>> {
        join_all(queries.iter().map(|q| self.fetch(q))).await
    }

    /// Makes the artifact for `query` available on disk.
    ///
    /// On failure nothing is written at the artifact path.
    pub async fn fetch(&self, query: &QueryDescriptor) -> Result<FetchedArtifact, FetchError> {
        let path = self.artifact_path(query);

        if self.reuse_artifacts && fs::metadata(&path).await.is_ok() {
            info!(
                "Reusing artifact for {} {} at {:?}",
                query.version, query.variable, path
            );
            return Ok(FetchedArtifact {
                path,
                source: ArtifactSource::Reused,
            });
        }

        let body = self.download(&query.url).await?;

        fs::create_dir_all(&self.artifact_dir)
            .await
            .map_err(|e| FetchError::ArtifactDirCreation(self.artifact_dir.clone(), e))?;

        // Write next to the target and rename so a failed write never leaves a partial artifact.
        let partial = path.with_extension("csv.part");
        if let Err(e) = fs::write(&partial, &body).await {
            let _ = fs::remove_file(&partial).await;
            return Err(FetchError::ArtifactWrite(path, e));
        }
        fs::rename(&partial, &path)
            .await
            .map_err(|e| FetchError::ArtifactWrite(path.clone(), e))?;

        info!(
            "Saved {} bytes for {} {} to {:?}",
            body.len(),
            query.version,
            query.variable,
            path
        );
        Ok(FetchedArtifact {
            path,
            source: ArtifactSource::Downloaded { bytes: body.len() },
        })
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        info!("Downloading data from {}", url);

        let response = self
            .download_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_request(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(FetchError::from_request(url.to_string(), e));
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_request(url.to_string(), e))?;
        Ok(bytes.to_vec())
    }
}
