use serde::Deserialize;

use crate::error::{Result, RunnerError};
use crate::status;

/// Release metadata as returned by the GitHub releases API.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable asset attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Name predicate for selecting an asset: the name must start with `prefix`
/// and end with `suffix`.
#[derive(Debug, Clone, Copy)]
pub struct AssetFilter<'a> {
    pub prefix: &'a str,
    pub suffix: &'a str,
}

impl AssetFilter<'_> {
    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(self.prefix) && name.ends_with(self.suffix)
    }
}

/// First asset matching the filter, in the order the index returned them.
pub fn pick_asset<'r>(release: &'r ReleaseInfo, filter: AssetFilter<'_>) -> Option<&'r ReleaseAsset> {
    release.assets.iter().find(|a| filter.matches(&a.name))
}

/// Queries the release index for the most recent published release and
/// returns the download URL and name of the first asset matching `filter`.
///
/// A release with no matching asset (including zero assets) is a hard
/// `AssetNotFound` failure; the pipeline cannot proceed without an artifact.
pub async fn locate_latest(
    client: &reqwest::Client,
    index_url: &str,
    filter: AssetFilter<'_>,
) -> Result<(String, String)> {
    status::step("Finding latest server release...");

    let response = client
        .get(index_url)
        .header("User-Agent", "tankroyale-runner")
        .header("Accept", "application/vnd.github+json")
        .send()
        .await?
        .error_for_status()?;

    let release: ReleaseInfo = response.json().await?;

    match pick_asset(&release, filter) {
        Some(asset) => {
            status::success(&format!("Found latest release: {}", release.tag_name));
            status::info(&format!("Artifact: {}", asset.name));
            Ok((asset.browser_download_url.clone(), asset.name.clone()))
        }
        None => Err(RunnerError::AssetNotFound(format!(
            "no asset matching {}*{} in release {}",
            filter.prefix, filter.suffix, release.tag_name
        ))),
    }
}
