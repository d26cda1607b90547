//! Tag blacklist
//!
//! # The Blacklist
//! Some tags are never wanted in the output, no matter which site they come from. The
//! blacklist removes them while a page is being parsed, before they reach the
//! [`TagMap`](btx_common::TagMap).
//!
//! Matching is by **substring** and case-insensitive: the entry `gore` removes `gore`,
//! `Guro Gore` and `goretober` alike. Entries are normalized the same way scraped tags are
//! (underscores become spaces, runs of whitespace collapse), so `long_hair` and `long hair`
//! are the same entry.
//!
//! ## Config file
//! A default list can be declared in the `[extract]` table of `config.toml`:
//! ```toml
//! [extract]
//! blacklist = ["tag_1", "tag_2"]
//! ```
//! Requests can add their own entries on top of it.
use ahash::AHashSet;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::parser::normalize_token;

/// Case-insensitive substring filter for scraped tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagBlacklist {
    /// Normalized, lowercased entries.
    entries: AHashSet<String>,
}

impl TagBlacklist {
    /// Builds a blacklist from raw entries. Blank entries are ignored.
    ///
    /// # Arguments
    /// * `entries`: tag fragments as typed by the user, in any casing or separator style.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries: AHashSet<String> = entries
            .into_iter()
            .map(|e| normalize_token(e.as_ref()).to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        if !entries.is_empty() {
            debug!("Blacklist setup with {} entries", entries.len());
        }

        Self { entries }
    }

    /// Returns a new blacklist holding the entries of both lists.
    #[must_use]
    pub fn merged<I, S>(&self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut merged = self.clone();
        merged.entries.extend(Self::new(extra).entries);
        merged
    }

    /// Returns `true` when `tag` contains any blacklisted entry.
    ///
    /// # Arguments
    /// * `tag`: a tag that already went through normalization.
    #[inline]
    pub fn is_blocked(&self, tag: &str) -> bool {
        if self.entries.is_empty() {
            return false;
        }

        let tag = tag.to_lowercase();
        self.entries.iter().any(|entry| tag.contains(entry.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<String>> for TagBlacklist {
    fn from(entries: Vec<String>) -> Self {
        Self::new(entries)
    }
}

impl From<TagBlacklist> for Vec<String> {
    fn from(blacklist: TagBlacklist) -> Self {
        let mut entries: Vec<String> = blacklist.entries.into_iter().collect();
        entries.sort();
        entries
    }
}
