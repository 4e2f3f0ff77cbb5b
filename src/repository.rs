use std::fmt;

use log::debug;

use crate::error::{Error, Result};
use crate::provider::Provider;

/// Hostnames whose provider is known without a `--website-type`.
const KNOWN_HOSTS: &[(&str, Provider)] = &[
    ("github.com", Provider::GitHub),
    ("www.github.com", Provider::GitHub),
    ("gitea.com", Provider::Gitea),
    ("codeberg.org", Provider::Gitea),
];

/// Map a hostname to the provider serving it, if it is a well-known one.
pub fn detect_provider(host: &str) -> Option<Provider> {
    KNOWN_HOSTS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(host))
        .map(|(_, provider)| *provider)
}

/// A repository on some hosting provider, parsed from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub provider: Provider,
    /// `https` unless the input explicitly said `http://`.
    pub scheme: String,
    pub host: Option<String>,
    /// Path below the web root of a self-hosted instance, e.g. `/gitea`.
    pub sub_path: Option<String>,
    pub owner: String,
    pub name: String,
    /// The string the repository was parsed from, for messages.
    pub passed_string: String,
}

impl Repository {
    /// Parse `owner/name`, `host/owner/name` or a full URL.
    ///
    /// `provider` overrides detection from the host. `sub_path` is removed
    /// after the host for self-hosted Gitea instances and ignored for GitHub.
    pub fn parse(input: &str, provider: Option<Provider>, sub_path: Option<&str>) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRepository {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        let trimmed = input.trim();
        let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
            (Some("https"), rest)
        } else if let Some(rest) = trimmed.strip_prefix("http://") {
            (Some("http"), rest)
        } else {
            (None, trimmed)
        };
        let rest = rest.trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(invalid("empty path segment"));
        }

        // Without a scheme, only a third segment tells us the first one is a host.
        let (host, path) = if scheme.is_some() || segments.len() > 2 {
            (Some(segments[0]), &segments[1..])
        } else {
            (None, &segments[..])
        };

        let provider = match provider {
            Some(provider) => provider,
            None => host
                .and_then(detect_provider)
                .ok_or_else(|| Error::UnrecognizedProvider(input.to_owned()))?,
        };

        let sub_path = match provider {
            Provider::GitHub => None,
            Provider::Gitea => normalize_sub_path(sub_path),
        };

        let path = match &sub_path {
            Some(sub) => {
                let sub_segments: Vec<&str> = sub.trim_matches('/').split('/').collect();
                if !path.starts_with(&sub_segments) {
                    return Err(invalid(&format!("path does not start with sub path {sub}")));
                }
                &path[sub_segments.len()..]
            }
            None => path,
        };

        let [owner, name] = path else {
            return Err(invalid("expected <owner>/<name> after the host"));
        };

        if provider == Provider::Gitea && host.is_none() {
            return Err(invalid("a Gitea repository needs a host"));
        }

        let repository = Repository {
            provider,
            scheme: scheme.unwrap_or("https").to_owned(),
            host: host.map(str::to_ascii_lowercase),
            sub_path,
            owner: (*owner).to_owned(),
            name: (*name).to_owned(),
            passed_string: input.to_owned(),
        };
        debug!("parsed repository {input:?} as {repository} ({})", repository.provider);
        Ok(repository)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn normalize_sub_path(sub_path: Option<&str>) -> Option<String> {
    let trimmed = sub_path?.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{trimmed}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_provider() {
        assert_eq!(detect_provider("github.com"), Some(Provider::GitHub));
        assert_eq!(detect_provider("GitHub.com"), Some(Provider::GitHub));
        assert_eq!(detect_provider("codeberg.org"), Some(Provider::Gitea));
        assert_eq!(detect_provider("gitlab.com"), None);
    }

    #[test]
    fn test_parse_github_full_url_repository() {
        let repository = Repository::parse(
            "https://github.com/cm-auto/gitweb-release-downloader",
            None,
            None,
        )
        .unwrap();
        let expected = Repository {
            provider: Provider::GitHub,
            scheme: "https".into(),
            host: Some("github.com".into()),
            sub_path: None,
            owner: "cm-auto".into(),
            name: "gitweb-release-downloader".into(),
            passed_string: "https://github.com/cm-auto/gitweb-release-downloader".into(),
        };
        assert_eq!(repository, expected);
    }

    #[test]
    fn test_parse_github_domain_and_repository() {
        let repository = Repository::parse("github.com/VSCodium/vscodium/", None, None).unwrap();
        assert_eq!(repository.provider, Provider::GitHub);
        assert_eq!(repository.host.as_deref(), Some("github.com"));
        assert_eq!(repository.to_string(), "VSCodium/vscodium");
    }

    #[test]
    fn test_git_suffix_is_stripped() {
        let repository =
            Repository::parse("https://codeberg.org/forgejo/forgejo.git", None, None).unwrap();
        assert_eq!(repository.provider, Provider::Gitea);
        assert_eq!(repository.name, "forgejo");
    }

    #[test]
    fn detection_agrees_with_explicit_override() {
        for input in [
            "github.com/VSCodium/vscodium",
            "https://github.com/houseabsolute/ubi",
            "http://www.github.com/a/b",
            "gitea.com/gitea/tea",
            "https://codeberg.org/forgejo/forgejo",
        ] {
            let detected = Repository::parse(input, None, None).unwrap();
            let explicit = Repository::parse(input, Some(detected.provider), None).unwrap();
            assert_eq!(detected, explicit, "detection differs for {input}");
        }
    }

    #[test]
    fn unknown_host_needs_override() {
        let err = Repository::parse("git.example.com/team/tool", None, None).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedProvider(_)));

        let repository =
            Repository::parse("git.example.com/team/tool", Some(Provider::Gitea), None).unwrap();
        assert_eq!(repository.host.as_deref(), Some("git.example.com"));
        assert_eq!(repository.owner, "team");
    }

    #[test]
    fn owner_and_name_without_host() {
        let err = Repository::parse("VSCodium/vscodium", None, None).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedProvider(_)));

        let repository =
            Repository::parse("VSCodium/vscodium", Some(Provider::GitHub), None).unwrap();
        assert_eq!(repository.host, None);

        let err = Repository::parse("team/tool", Some(Provider::Gitea), None).unwrap_err();
        assert!(matches!(err, Error::InvalidRepository { .. }));
    }

    #[test]
    fn sub_path_is_stripped_for_gitea() {
        let repository = Repository::parse(
            "https://example.com/gitea/user/repo",
            Some(Provider::Gitea),
            Some("gitea/"),
        )
        .unwrap();
        assert_eq!(repository.sub_path.as_deref(), Some("/gitea"));
        assert_eq!(repository.owner, "user");
        assert_eq!(repository.name, "repo");

        let err = Repository::parse(
            "https://example.com/other/user/repo",
            Some(Provider::Gitea),
            Some("/gitea"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidRepository { .. }));
    }

    #[test]
    fn rejects_malformed_paths() {
        for input in [
            "https://github.com/only-owner",
            "github.com/a/b/releases",
            "github.com//b",
        ] {
            let err = Repository::parse(input, None, None).unwrap_err();
            assert!(
                matches!(err, Error::InvalidRepository { .. }),
                "{input} should be invalid, got {err:?}"
            );
        }
    }
}
