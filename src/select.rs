use log::debug;
use regex::Regex;

use crate::error::{Error, Result};
use crate::models::{Asset, Release};

/// Pick the target release.
///
/// A tag selects the release with exactly that tag, prerelease or not.
/// Without a tag the first release in provider order wins, skipping
/// prereleases unless `allow_prerelease` is set.
pub fn find_release<'a>(
    releases: &'a [Release],
    tag: Option<&str>,
    allow_prerelease: bool,
) -> Result<&'a Release> {
    match tag {
        Some(tag) => releases
            .iter()
            .find(|release| release.tag_name == tag)
            .ok_or_else(|| Error::ReleaseNotFound(tag.to_owned())),
        None => releases
            .iter()
            .find(|release| allow_prerelease || !release.prerelease)
            .ok_or(Error::NoReleaseFound {
                include_prereleases: allow_prerelease,
            }),
    }
}

pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Ok(Regex::new(pattern)?)
}

/// All assets of `release` whose name matches `pattern`, in release order.
pub fn find_assets_in_release<'a>(release: &'a Release, pattern: &Regex) -> Vec<&'a Asset> {
    release
        .assets
        .iter()
        .filter(|asset| pattern.is_match(&asset.name))
        .collect()
}

/// The single asset of `release` matching `pattern`.
///
/// Downloads insist on exactly one match; more than one is an error rather
/// than a guess.
pub fn find_single_asset<'a>(release: &'a Release, pattern: &Regex) -> Result<&'a Asset> {
    let mut matches = find_assets_in_release(release, pattern);
    debug!(
        "{} of {} assets in {} match {}",
        matches.len(),
        release.assets.len(),
        release.tag_name,
        pattern.as_str()
    );
    match matches.len() {
        0 => Err(Error::NoAssetFound {
            tag: release.tag_name.clone(),
            pattern: pattern.as_str().to_owned(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousAsset {
            tag: release.tag_name.clone(),
            pattern: pattern.as_str().to_owned(),
            names: matches.iter().map(|asset| asset.name.clone()).collect(),
        }),
    }
}
