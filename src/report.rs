//! Plain-text listings for `grd query`.
//!
//! Output is one entry per line so it pipes into other tools; `details` adds
//! tab-separated columns.

use std::io::{self, Write};

use indicatif::HumanBytes;

use crate::models::{Asset, Release};

/// Write up to `count` releases, newest first as delivered by the provider.
pub fn write_releases<W: Write>(
    out: &mut W,
    releases: &[Release],
    count: usize,
    allow_prerelease: bool,
    details: bool,
) -> io::Result<()> {
    let shown = releases
        .iter()
        .filter(|release| allow_prerelease || !release.prerelease)
        .take(count);
    for release in shown {
        if details {
            writeln!(
                out,
                "{}\t{}\t{}\t{}\t{} assets",
                release.tag_name,
                release.display_title(),
                release.created_at.as_deref().unwrap_or("-"),
                if release.prerelease { "prerelease" } else { "release" },
                release.assets.len()
            )?;
        } else {
            writeln!(out, "{}", release.tag_name)?;
        }
    }
    Ok(())
}

/// Write the given assets of one release.
pub fn write_assets<W: Write>(out: &mut W, assets: &[&Asset], details: bool) -> io::Result<()> {
    for asset in assets {
        if details {
            writeln!(
                out,
                "{}\t{}\t{}",
                asset.name,
                HumanBytes(asset.size),
                asset.download_url
            )?;
        } else {
            writeln!(out, "{}", asset.name)?;
        }
    }
    Ok(())
}
