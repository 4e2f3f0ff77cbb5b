use std::ffi::OsString;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;

use crate::api::{Api, RepoApi};
use crate::error::{Error, Result};
use crate::provider::Provider;
use crate::repository::Repository;
use crate::{report, select};

/// Download assets of GitHub and Gitea releases.
#[derive(Parser, Debug)]
#[command(name = "grd", version, about, long_about = None)]
pub struct Cli {
    /// Do not print anything
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log more details to stderr (-vv for trace output)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download an asset (default if no subcommand is specified)
    Download(DownloadArgs),
    /// Query information about releases or assets of a repository
    Query {
        #[command(subcommand)]
        query: QueryCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum QueryCommand {
    /// List the latest releases
    Releases(ReleasesQueryArgs),
    /// List the assets of one release
    Assets(AssetsQueryArgs),
}

// Where the repository lives and how to reach its API.
#[derive(Args, Debug)]
pub struct RepositoryArgs {
    /// Repository, e.g. github.com/owner/name or https://codeberg.org/owner/name
    pub repository: String,

    /// Hosting provider; guessed from the repository host if omitted
    #[arg(short = 'w', long, ignore_case = true)]
    pub website_type: Option<Provider>,

    /// Sub path of a self-hosted Gitea (https://example.com/gitea/user/repo -> /gitea)
    #[arg(short = 's', long)]
    pub sub_path: Option<String>,

    /// Base URL of the provider API, replacing the one derived from the host
    #[arg(long, env = "GRD_API_URL")]
    pub api_url: Option<String>,

    /// API token; defaults to GITHUB_TOKEN or GITEA_TOKEN depending on the provider
    #[arg(long, env = "GRD_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Regex pattern of the asset to download; it must match exactly one asset
    pub asset_pattern: String,

    /// Tag of the release (latest if omitted)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Include prereleases
    #[arg(short, long)]
    pub prerelease: bool,

    /// Print only the downloaded filename to stdout
    #[arg(short = 'f', long)]
    pub print_filename: bool,

    /// Write to this file instead of the asset's name in the current directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReleasesQueryArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Include prereleases
    #[arg(short, long)]
    pub prerelease: bool,

    /// The last n releases to show
    #[arg(short, long, default_value = "1")]
    pub count: NonZeroUsize,

    /// Show title, creation time and asset count
    #[arg(short, long)]
    pub details: bool,
}

#[derive(Args, Debug)]
pub struct AssetsQueryArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// Tag of the release (latest if omitted)
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Asset regex pattern to match against; all assets if omitted
    #[arg(short, long, default_value = ".*")]
    pub asset_pattern: String,

    /// Consider prereleases when picking the latest release
    #[arg(short, long)]
    pub prerelease: bool,

    /// Show size and download URL
    #[arg(short, long)]
    pub details: bool,
}

/// Insert the `download` subcommand when none was given.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let start = args
        .iter()
        .skip(1)
        .position(|arg| !is_global_flag(arg))
        .map(|i| i + 1);
    if let Some(i) = start {
        let is_command = matches!(
            args[i].to_str(),
            Some("download" | "query" | "help" | "--help" | "-h" | "--version" | "-V")
        );
        if !is_command {
            args.insert(i, "download".into());
        }
    }
    args
}

/// `-q`, `-v`, `--quiet`, `--verbose` and bundles such as `-vv` or `-qv`.
fn is_global_flag(arg: &OsString) -> bool {
    match arg.to_str() {
        Some("--quiet" | "--verbose") => true,
        Some(short) => match short.strip_prefix('-') {
            Some(flags) => !flags.is_empty() && flags.chars().all(|c| matches!(c, 'q' | 'v')),
            None => false,
        },
        None => false,
    }
}

impl RepositoryArgs {
    fn connect(&self, progress: bool) -> Result<RepoApi> {
        let repository = Repository::parse(
            &self.repository,
            self.website_type,
            self.sub_path.as_deref(),
        )?;

        let mut api = Api::new();
        if let Some(token) = &self.token {
            api = api.set_token(token);
        }
        if let Some(url) = &self.api_url {
            api = api.set_api_url(url);
        }
        if !progress {
            api = api.no_progress();
        }
        api.repo(repository)
    }
}

impl Cli {
    /// Parse `std::env::args`, defaulting to the `download` subcommand.
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Whether errors should be reduced to a single line.
    pub fn minimal_errors(&self) -> bool {
        matches!(&self.command, Command::Download(args) if args.print_filename)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }
        if self.minimal_errors() {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub async fn execute(self) -> Result<()> {
        let quiet = self.quiet;
        match self.command {
            Command::Download(args) => download(args, quiet).await,
            Command::Query { query } => match query {
                QueryCommand::Releases(args) => query_releases(args, quiet).await,
                QueryCommand::Assets(args) => query_assets(args, quiet).await,
            },
        }
    }
}

async fn download(args: DownloadArgs, quiet: bool) -> Result<()> {
    // Compiled before any request is made.
    let pattern = select::compile_pattern(&args.asset_pattern)?;
    let repo = args
        .repository
        .connect(!quiet && !args.print_filename)?;

    let release = repo.release(args.tag.as_deref(), args.prerelease).await?;
    let asset = select::find_single_asset(&release, &pattern)?;
    let path = repo.download(asset, args.output.as_deref()).await?;

    if args.print_filename && !quiet {
        println!("{}", path.display());
    }
    Ok(())
}

async fn query_releases(args: ReleasesQueryArgs, quiet: bool) -> Result<()> {
    let repo = args.repository.connect(false)?;
    let releases = repo.releases().await?;
    if quiet {
        return Ok(());
    }
    let mut out = io::stdout().lock();
    report::write_releases(
        &mut out,
        &releases,
        args.count.get(),
        args.prerelease,
        args.details,
    )
    .and_then(|()| out.flush())
    .or_else(stdout_error)
}

async fn query_assets(args: AssetsQueryArgs, quiet: bool) -> Result<()> {
    let pattern = select::compile_pattern(&args.asset_pattern)?;
    let repo = args.repository.connect(false)?;
    let release = repo.release(args.tag.as_deref(), args.prerelease).await?;
    if quiet {
        return Ok(());
    }
    let assets = select::find_assets_in_release(&release, &pattern);
    let mut out = io::stdout().lock();
    report::write_assets(&mut out, &assets, args.details)
        .and_then(|()| out.flush())
        .or_else(stdout_error)
}

// A reader that stops early, like `head`, is not a failure.
fn stdout_error(e: io::Error) -> Result<()> {
    match e.kind() {
        io::ErrorKind::BrokenPipe => Ok(()),
        _ => Err(Error::Output(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(normalize_args(args.iter().copied())).unwrap()
    }

    #[test]
    fn download_is_the_default_subcommand() {
        let cli = parse(&["grd", "github.com/VSCodium/vscodium", r"\.deb$"]);
        let Command::Download(args) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(args.repository.repository, "github.com/VSCodium/vscodium");
        assert_eq!(args.asset_pattern, r"\.deb$");
        assert!(!args.prerelease);
    }

    #[test]
    fn global_flags_before_default_subcommand() {
        let cli = parse(&["grd", "-q", "github.com/a/b", "x", "-t", "v1"]);
        assert!(cli.quiet);
        assert_eq!(cli.log_level(), LevelFilter::Off);
        let Command::Download(args) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(args.tag.as_deref(), Some("v1"));
    }

    #[test]
    fn global_flags_before_query() {
        let cli = parse(&["grd", "-q", "query", "releases", "github.com/a/b"]);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Command::Query {
                query: QueryCommand::Releases(_)
            }
        ));

        let cli = parse(&["grd", "-v", "query", "assets", "github.com/a/b"]);
        assert_eq!(cli.verbose, 1);
        let Command::Query {
            query: QueryCommand::Assets(args),
        } = cli.command
        else {
            panic!("expected query assets");
        };
        assert_eq!(args.repository.repository, "github.com/a/b");

        let cli = parse(&["grd", "--quiet", "-vv", "download", "github.com/a/b", "x"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Download(_)));
    }

    #[test]
    fn global_flags_alone_get_the_default_subcommand() {
        let args = normalize_args(["grd", "-vq", "github.com/a/b", "x"]);
        assert_eq!(args[2], OsString::from("download"));
        let args = normalize_args(["grd", "-q"]);
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn commands_are_left_alone() {
        let args = normalize_args(["grd", "query", "releases", "github.com/a/b"]);
        assert_eq!(args.len(), 4);
        let args = normalize_args(["grd", "--version"]);
        assert_eq!(args, vec![OsString::from("grd"), OsString::from("--version")]);
        let args = normalize_args(["grd"]);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn query_releases_defaults() {
        let cli = parse(&["grd", "query", "releases", "github.com/a/b"]);
        let Command::Query {
            query: QueryCommand::Releases(args),
        } = cli.command
        else {
            panic!("expected query releases");
        };
        assert_eq!(args.count.get(), 1);
        assert!(!args.prerelease);
    }

    #[test]
    fn query_assets_defaults_to_all_assets() {
        let cli = parse(&["grd", "query", "assets", "github.com/a/b", "-t", "v2"]);
        let Command::Query {
            query: QueryCommand::Assets(args),
        } = cli.command
        else {
            panic!("expected query assets");
        };
        assert_eq!(args.asset_pattern, ".*");
        assert_eq!(args.tag.as_deref(), Some("v2"));
    }

    #[test]
    fn zero_count_is_rejected() {
        let result = Cli::try_parse_from(["grd", "query", "releases", "github.com/a/b", "-c", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn website_type_ignores_case() {
        let cli = parse(&["grd", "example.com/a/b", "x", "-w", "GitHub"]);
        let Command::Download(args) = cli.command else {
            panic!("expected download");
        };
        assert_eq!(args.repository.website_type, Some(Provider::GitHub));
    }

    #[test]
    fn print_filename_reduces_logging() {
        let cli = parse(&["grd", "github.com/a/b", "x", "--print-filename", "-v"]);
        assert!(cli.minimal_errors());
        assert_eq!(cli.log_level(), LevelFilter::Error);

        let cli = parse(&["grd", "github.com/a/b", "x", "-vv"]);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
    }
}
