use std::time::Duration;

use octocrab::models::repos::Release;
use octocrab::Octocrab;
use regex::Regex;
use reqwest::Client;

use crate::error::{GhGetError, Result};
use crate::retry::{with_retry, RetryConfig};

/// Thin wrapper over the GitHub API: release/tag lookups go through
/// octocrab, asset downloads stream through reqwest. Lookup calls are
/// issued exactly once per invocation; only the download transport is
/// wrapped in bounded retry.
pub struct GitHubClient {
    octocrab: Octocrab,
    http_client: Client,
    retry_config: RetryConfig,
}

impl GitHubClient {
    /// Create a client, optionally pointed at a GitHub Enterprise API
    /// endpoint. A `GITHUB_TOKEN` environment variable is used when present.
    pub fn new(api_endpoint: Option<&str>) -> Result<Self> {
        Self::with_retry_config(api_endpoint, RetryConfig::default())
    }

    pub fn with_retry_config(api_endpoint: Option<&str>, retry_config: RetryConfig) -> Result<Self> {
        let mut builder = Octocrab::builder();
        if let Some(endpoint) = api_endpoint {
            builder = builder.base_uri(endpoint)?;
        }

        let octocrab = if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            builder.personal_token(token).build()?
        } else {
            builder.build()?
        };

        let http_client = Client::builder()
            .user_agent(concat!("ghget/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            octocrab,
            http_client,
            retry_config,
        })
    }

    /// Fetch the latest release of `owner/repo`.
    pub async fn get_latest_release(&self, owner: &str, repo: &str) -> Result<Release> {
        tracing::debug!("fetching latest release for {}/{}", owner, repo);
        Ok(self
            .octocrab
            .repos(owner, repo)
            .releases()
            .get_latest()
            .await?)
    }

    /// Fetch the release published under an exact tag.
    pub async fn get_release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> Result<Release> {
        tracing::debug!("fetching release '{}' for {}/{}", tag, owner, repo);
        Ok(self
            .octocrab
            .repos(owner, repo)
            .releases()
            .get_by_tag(tag)
            .await?)
    }

    /// List every tag name of `owner/repo`, in API order.
    pub async fn list_tag_refs(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        tracing::debug!("listing tags for {}/{}", owner, repo);
        let page = self
            .octocrab
            .repos(owner, repo)
            .list_tags()
            .per_page(100)
            .send()
            .await?;
        let tags = self.octocrab.all_pages(page).await?;
        Ok(tags.into_iter().map(|tag| tag.name).collect())
    }

    /// Download an asset into a temporary file, streaming chunk by chunk.
    pub async fn download_asset(&self, asset: &ReleaseAsset) -> Result<tempfile::NamedTempFile> {
        tracing::info!("downloading asset: {}", asset.name);

        let operation_name = format!("Downloading {}", asset.name);
        let url_clone = asset.url.clone();
        let http_client = self.http_client.clone();

        with_retry(&operation_name, &self.retry_config, || {
            let http_client = http_client.clone();
            let url = url_clone.clone();

            async move {
                let response = http_client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to send download request: {}", e))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error response".to_string());
                    return Err(anyhow::anyhow!(
                        "Download failed with status {}: {}",
                        status,
                        error_text
                    ));
                }

                let mut temp_file = tempfile::NamedTempFile::new()
                    .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

                let mut stream = response.bytes_stream();

                use futures_util::StreamExt;
                use std::io::Write;

                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| anyhow::anyhow!("Failed to read chunk: {}", e))?;
                    temp_file
                        .write_all(&chunk)
                        .map_err(|e| anyhow::anyhow!("Failed to write to temp file: {}", e))?;
                }

                Ok(temp_file)
            }
        })
        .await
        .map_err(|e| GhGetError::DownloadFailed {
            asset: asset.name.clone(),
            url: asset.url.clone(),
            message: e.to_string(),
        })
    }
}

/// The slice of an asset the rest of the pipeline needs: a name to match
/// against and an opaque handle (the download URL) to fetch bytes with.
#[derive(Debug, Clone)]
pub struct ReleaseAsset {
    pub name: String,
    pub url: String,
    pub size: u64,
}

/// Project a release's assets into [`ReleaseAsset`] values, preserving
/// the API's listing order.
pub fn release_assets(release: &Release) -> Vec<ReleaseAsset> {
    release
        .assets
        .iter()
        .map(|asset| ReleaseAsset {
            name: asset.name.clone(),
            url: asset.browser_download_url.to_string(),
            size: asset.size as u64,
        })
        .collect()
}

/// Return the first asset whose name matches `pattern`, treated as a
/// regular expression. First match in list order wins; callers wanting a
/// specific asset must write a more specific pattern.
pub fn select_asset<'a>(
    assets: &'a [ReleaseAsset],
    pattern: &str,
    release_tag: &str,
) -> Result<&'a ReleaseAsset> {
    let re = Regex::new(pattern).map_err(|e| GhGetError::InvalidPattern {
        pattern: pattern.to_string(),
        source: e,
    })?;

    assets
        .iter()
        .find(|asset| re.is_match(&asset.name))
        .ok_or_else(|| GhGetError::NoAssetMatch {
            pattern: pattern.to_string(),
            release_tag: release_tag.to_string(),
            available: if assets.is_empty() {
                "none".to_string()
            } else {
                assets
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            },
        })
}
