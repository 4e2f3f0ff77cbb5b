//! # gitweb-release-downloader
//!
//! Resolve the latest (or a tagged) release of a GitHub or Gitea repository,
//! pick the one asset matching a regex and stream it to disk. The `grd`
//! binary wraps this library; the same flow is available through a chainable
//! API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gitweb_release_downloader::{Api, Repository};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> gitweb_release_downloader::Result<()> {
//!     let repository = Repository::parse("codeberg.org/forgejo/forgejo", None, None)?;
//!     let repo = Api::new().repo(repository)?;
//!     for release in repo.releases().await? {
//!         println!("{}", release.tag_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod downloader;
pub mod error;
pub mod models;
pub mod progress;
pub mod provider;
pub mod report;
pub mod repository;
pub mod select;

pub use api::{Api, RepoApi};
pub use downloader::{Downloader, ProgressFn};
pub use error::{DownloadFailure, Error, Result};
pub use models::{Asset, Release};
pub use progress::default_progress_fn;
pub use provider::{Provider, ReleaseSource};
pub use repository::Repository;
