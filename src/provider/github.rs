use serde::Deserialize;

use super::{Provider, ReleaseSource};
use crate::models::{Asset, Release};
use crate::repository::Repository;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// GitHub REST API v3, including GitHub Enterprise hosts.
pub struct GitHub {
    api_base: String,
}

#[derive(Deserialize)]
struct ReleaseResponse {
    tag_name: String,
    name: Option<String>,
    #[serde(default)]
    draft: bool,
    prerelease: bool,
    created_at: Option<String>,
    assets: Vec<AssetEntry>,
}

#[derive(Deserialize)]
struct AssetEntry {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: u64,
}

impl GitHub {
    pub fn new(repository: &Repository, api_url: Option<&str>) -> Self {
        let api_base = match (api_url, repository.host.as_deref()) {
            (Some(url), _) => url.trim_end_matches('/').to_owned(),
            (None, None | Some("github.com") | Some("www.github.com")) => GITHUB_API_BASE.to_owned(),
            (None, Some(host)) => format!("{}://{host}/api/v3", repository.scheme),
        };
        Self { api_base }
    }
}

impl ReleaseSource for GitHub {
    fn provider(&self) -> Provider {
        Provider::GitHub
    }

    fn releases_url(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}/releases?per_page=100",
            self.api_base, repository.owner, repository.name
        )
    }

    fn authorization(&self, token: &str) -> String {
        format!("Bearer {token}")
    }

    fn accept(&self) -> &'static str {
        "application/vnd.github+json"
    }

    fn parse_releases(&self, body: &str) -> serde_json::Result<Vec<Release>> {
        let releases: Vec<ReleaseResponse> = serde_json::from_str(body)?;
        Ok(releases
            .into_iter()
            .filter(|release| !release.draft)
            .map(|release| Release {
                tag_name: release.tag_name,
                title: release.name,
                prerelease: release.prerelease,
                created_at: release.created_at,
                assets: release
                    .assets
                    .into_iter()
                    .map(|asset| Asset {
                        name: asset.name,
                        download_url: asset.browser_download_url,
                        size: asset.size,
                    })
                    .collect(),
            })
            .collect())
    }
}
