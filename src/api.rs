use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Proxy};

use crate::downloader::{Downloader, ProgressFn};
use crate::error::{Error, Result};
use crate::models::{Asset, Release};
use crate::progress::default_progress_fn;
use crate::provider::{self, ReleaseSource};
use crate::repository::Repository;
use crate::select;

const USER_AGENT: &str = concat!("gitweb-release-downloader/", env!("CARGO_PKG_VERSION"));
// Bounds connecting only, not the transfer.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ──────────────────────────────────────────────────────────────────────────────
// Api
// ──────────────────────────────────────────────────────────────────────────────

/// Top-level entry-point with a chainable builder API.
///
/// # Example
/// ```rust,no_run
/// use gitweb_release_downloader::{Api, Repository};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> gitweb_release_downloader::Result<()> {
///     let repository = Repository::parse("github.com/VSCodium/vscodium", None, None)?;
///     let repo = Api::new().repo(repository)?;
///     let release = repo.release(None, false).await?;
///     let path = repo.download_matching(&release, r"\.deb$", None).await?;
///     println!("{}", path.display());
///     Ok(())
/// }
/// ```
pub struct Api {
    token: Option<String>,
    api_url: Option<String>,
    proxy: Option<String>,
    use_proxy: bool,
    progress: Option<ProgressFn>,
}

impl Api {
    /// Create a new `Api` with sensible defaults.
    ///
    /// Proxy is read from `HTTP_PROXY` / `HTTPS_PROXY` environment variables.
    pub fn new() -> Self {
        let proxy = std::env::var("HTTP_PROXY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("HTTPS_PROXY").ok().filter(|s| !s.is_empty()));

        Self {
            token: None,
            api_url: None,
            proxy,
            use_proxy: true,
            progress: Some(default_progress_fn()),
        }
    }

    /// Set the API token (builder). Without one, the provider's token
    /// environment variable is consulted.
    pub fn set_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    /// Override the provider API base URL (builder).
    pub fn set_api_url(mut self, url: &str) -> Self {
        self.api_url = Some(url.to_owned());
        self
    }

    /// Connect directly, ignoring explicit and system proxies (builder).
    pub fn no_proxy(mut self) -> Self {
        self.proxy = None;
        self.use_proxy = false;
        self
    }

    /// Override the progress callback (builder).
    pub fn set_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Disable progress output (builder).
    pub fn no_progress(mut self) -> Self {
        self.progress = None;
        self
    }

    /// Select a repository and return a [`RepoApi`] bound to its provider.
    pub fn repo(self, repository: Repository) -> Result<RepoApi> {
        let source = repository
            .provider
            .source(&repository, self.api_url.as_deref());
        let token = self.token.clone().or_else(|| {
            std::env::var(repository.provider.token_env())
                .ok()
                .filter(|s| !s.is_empty())
        });
        let client = self
            .build_client(source.as_ref(), token.as_deref())
            .map_err(|e| Error::Network {
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
                source: e,
            })?;

        Ok(RepoApi {
            downloader: Downloader::new(client.clone(), self.progress),
            client,
            source,
            repository,
        })
    }

    /// Build an HTTP client, optionally with proxy support and authentication.
    fn build_client(
        &self,
        source: &dyn ReleaseSource,
        token: Option<&str>,
    ) -> std::result::Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            debug!("adding a token to {} requests", source.provider());
            // A token with characters illegal in a header is dropped rather than sent mangled.
            match HeaderValue::from_str(&source.authorization(token)) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("ignoring API token with invalid characters"),
            }
        }

        let mut builder = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if !self.use_proxy {
            builder = builder.no_proxy();
        } else if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }
        builder.build()
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// RepoApi
// ──────────────────────────────────────────────────────────────────────────────

/// Intermediate builder after a repository has been specified.
///
/// Every method issues at most one request and awaits it before returning.
pub struct RepoApi {
    client: Client,
    source: Box<dyn ReleaseSource>,
    downloader: Downloader,
    repository: Repository,
}

impl RepoApi {
    /// All releases, newest first as delivered by the provider.
    pub async fn releases(&self) -> Result<Vec<Release>> {
        provider::list_releases(&self.client, self.source.as_ref(), &self.repository).await
    }

    /// The release tagged `tag`, or the latest one if `tag` is `None`.
    pub async fn release(&self, tag: Option<&str>, allow_prerelease: bool) -> Result<Release> {
        let releases = self.releases().await?;
        let release = select::find_release(&releases, tag, allow_prerelease)?;
        debug!("selected release {} of {}", release.tag_name, self.repository);
        Ok(release.clone())
    }

    /// Download the single asset of `release` matching `pattern`.
    ///
    /// Returns the path written, `output` or the asset name in the current
    /// directory.
    pub async fn download_matching(
        &self,
        release: &Release,
        pattern: &str,
        output: Option<&Path>,
    ) -> Result<PathBuf> {
        let pattern: Regex = select::compile_pattern(pattern)?;
        let asset = select::find_single_asset(release, &pattern)?;
        self.download(asset, output).await
    }

    /// Download `asset`, overwriting any existing file.
    pub async fn download(&self, asset: &Asset, output: Option<&Path>) -> Result<PathBuf> {
        let dest = Downloader::destination(asset, output)?;
        info!("Downloading \"{}\"", asset.name);
        self.downloader.download(asset, &dest).await?;
        info!("Successfully wrote to file \"{}\"", dest.display());
        Ok(dest)
    }
}
