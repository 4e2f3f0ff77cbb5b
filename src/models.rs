//! Provider-independent view of releases and their assets.
//!
//! Each provider deserializes its own wire format and converts it into these
//! types, so everything past the provider client works the same for GitHub
//! and Gitea.

/// A tagged publication of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag_name: String,
    /// Human title; providers allow it to be empty.
    pub title: Option<String>,
    pub prerelease: bool,
    pub created_at: Option<String>,
    pub assets: Vec<Asset>,
}

/// A downloadable file attached to a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub name: String,
    pub download_url: String,
    pub size: u64,
}

impl Release {
    /// The title if one is set, otherwise the tag.
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title,
            _ => &self.tag_name,
        }
    }
}
