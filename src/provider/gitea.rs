use serde::Deserialize;

use super::{Provider, ReleaseSource};
use crate::models::{Asset, Release};
use crate::repository::Repository;

/// Gitea (and Forgejo) API v1.
pub struct Gitea {
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
    #[serde(default)]
    assets: Vec<AttachmentEntry>,
}

#[derive(Deserialize)]
struct AttachmentEntry {
    name: String,
    browser_download_url: String,
    #[serde(default)]
    size: u64,
}

impl Gitea {
    pub fn new(repository: &Repository, api_url: Option<&str>) -> Self {
        let api_base = match api_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!(
                "{}://{}{}/api/v1",
                repository.scheme,
                repository.host.as_deref().unwrap_or_default(),
                repository.sub_path.as_deref().unwrap_or_default()
            ),
        };
        Self { api_base }
    }
}

impl ReleaseSource for Gitea {
    fn provider(&self) -> Provider {
        Provider::Gitea
    }

    fn releases_url(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}/releases?limit=50",
            self.api_base, repository.owner, repository.name
        )
    }

    fn authorization(&self, token: &str) -> String {
        format!("token {token}")
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
                    .map(|attachment| Asset {
                        name: attachment.name,
                        download_url: attachment.browser_download_url,
                        size: attachment.size,
                    })
                    .collect(),
            })
            .collect())
    }
}
