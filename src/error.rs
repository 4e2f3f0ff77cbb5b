use std::path::PathBuf;

use thiserror::Error;

/// Every way a `grd` invocation can fail. None of them is retried.
#[derive(Error, Debug)]
pub enum Error {
    #[error("could not recognize the hosting provider of \"{0}\"")]
    UnrecognizedProvider(String),

    #[error("invalid repository \"{input}\": {reason}")]
    InvalidRepository { input: String, reason: String },

    #[error("HTTP request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request to {url} failed: {message}")]
    Api { url: String, message: String },

    #[error("could not find release with tag \"{0}\"")]
    ReleaseNotFound(String),

    #[error("no release found")]
    NoReleaseFound { include_prereleases: bool },

    #[error("invalid asset pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("no asset of release \"{tag}\" matches pattern \"{pattern}\"")]
    NoAssetFound { tag: String, pattern: String },

    #[error(
        "pattern \"{pattern}\" matches {} assets of release \"{tag}\": {}",
        .names.len(),
        .names.join(", ")
    )]
    AmbiguousAsset {
        tag: String,
        pattern: String,
        names: Vec<String>,
    },

    #[error("failed to download {url} to \"{}\"", .path.display())]
    Download {
        url: String,
        path: PathBuf,
        #[source]
        source: DownloadFailure,
    },

    #[error("could not write to standard output")]
    Output(#[source] std::io::Error),
}

/// Cause of an [`Error::Download`].
#[derive(Error, Debug)]
pub enum DownloadFailure {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("server responded with {0}")]
    Status(reqwest::StatusCode),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("asset name \"{0}\" is not a usable file name")]
    InvalidFileName(String),
}

impl Error {
    /// A remediation line shown below the full error report.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::UnrecognizedProvider(_) => {
                Some("pass --website-type to choose the provider explicitly")
            }
            Error::NoReleaseFound {
                include_prereleases: false,
            } => Some("prereleases are excluded, pass --prerelease to include them"),
            Error::AmbiguousAsset { .. } => {
                Some("narrow the asset pattern so it matches exactly one asset")
            }
            Error::NoAssetFound { .. } => {
                Some("use `grd query assets` to list the assets of the release")
            }
            _ => None,
        }
    }

    /// The message followed by its cause chain and hint, one per line.
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            report.push_str(&format!("\n  caused by: {cause}"));
            source = cause.source();
        }
        if let Some(hint) = self.hint() {
            report.push_str(&format!("\n  hint: {hint}"));
        }
        report
    }
}

pub type Result<T> = std::result::Result<T, Error>;
