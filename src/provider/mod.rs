//! Release listing clients, one per hosting provider.
//!
//! Each provider implements [`ReleaseSource`]: where its release list lives,
//! how it authenticates and how its JSON maps onto [`Release`]. The HTTP round
//! trip itself is shared in [`list_releases`], so a new provider is one more
//! [`Provider`] variant plus one more implementation.

pub mod gitea;
pub mod github;

use std::fmt;

use clap::ValueEnum;
use log::debug;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::Release;
use crate::repository::Repository;

pub use gitea::Gitea;
pub use github::GitHub;

/// Release API dialects `grd` can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lower")]
pub enum Provider {
    GitHub,
    Gitea,
}

impl Provider {
    /// Build the client for this provider, rooted at `api_url` if given.
    pub fn source(self, repository: &Repository, api_url: Option<&str>) -> Box<dyn ReleaseSource> {
        match self {
            Provider::GitHub => Box::new(GitHub::new(repository, api_url)),
            Provider::Gitea => Box::new(Gitea::new(repository, api_url)),
        }
    }

    /// Environment variable holding a token for this provider.
    pub fn token_env(self) -> &'static str {
        match self {
            Provider::GitHub => "GITHUB_TOKEN",
            Provider::Gitea => "GITEA_TOKEN",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::GitHub => "GitHub",
            Provider::Gitea => "Gitea",
        })
    }
}

/// One provider's release API.
pub trait ReleaseSource: Send + Sync {
    fn provider(&self) -> Provider;

    /// URL of the release list, newest first.
    fn releases_url(&self, repository: &Repository) -> String;

    /// Value of the `Authorization` header for `token`.
    fn authorization(&self, token: &str) -> String;

    /// Media type requested from the API.
    fn accept(&self) -> &'static str {
        "application/json"
    }

    /// Convert a release list response body into releases, in API order.
    fn parse_releases(&self, body: &str) -> serde_json::Result<Vec<Release>>;
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

/// Fetch and parse the release list of `repository`.
pub async fn list_releases(
    client: &Client,
    source: &dyn ReleaseSource,
    repository: &Repository,
) -> Result<Vec<Release>> {
    let url = source.releases_url(repository);
    debug!("requesting {} releases from {url}", source.provider());

    let resp = client
        .get(&url)
        .header(ACCEPT, HeaderValue::from_static(source.accept()))
        .send()
        .await
        .map_err(|e| Error::Network {
            url: url.clone(),
            source: e,
        })?;

    let status = resp.status();
    let body = resp.text().await.map_err(|e| Error::Network {
        url: url.clone(),
        source: e,
    })?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => format!("{} returned {status}: {}", source.provider(), err.message),
            Err(_) => format!("{} returned {status}", source.provider()),
        };
        return Err(Error::Api { url, message });
    }

    let releases = source.parse_releases(&body).map_err(|e| Error::Api {
        url: url.clone(),
        message: format!("could not parse release list: {e}"),
    })?;
    debug!("{url} lists {} releases", releases.len());
    Ok(releases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip_through_clap() {
        assert_eq!(Provider::from_str("github", true), Ok(Provider::GitHub));
        assert_eq!(Provider::from_str("GitHub", true), Ok(Provider::GitHub));
        assert_eq!(Provider::from_str("gitea", true), Ok(Provider::Gitea));
        assert!(Provider::from_str("gitlab", true).is_err());
    }

    #[test]
    fn source_matches_provider() {
        let repository = Repository::parse("codeberg.org/a/b", None, None).unwrap();
        let source = repository.provider.source(&repository, None);
        assert_eq!(source.provider(), Provider::Gitea);
        assert_eq!(source.authorization("abc"), "token abc");
    }
}
