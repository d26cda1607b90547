//! # Tag Module
//!
//! Tags scraped from a post page are grouped into a closed set of five categories.
//!
//! - [`TagCategory`]: the category a tag belongs to.
//! - [`TagEntry`]: a single normalized tag and its category.
//! - [`TagMap`]: the ordered, de-duplicated collection returned for one post.
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// Categorizes the nature of a [`TagEntry`].
///
/// Sites disagree on how many categories they expose. Everything is folded into these five,
/// in this order, which is also the order used when rendering a [`TagMap`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagCategory {
    /// Series, franchise or source material.
    Copyright,
    /// Specific characters depicted.
    Character,
    /// Descriptive tags about the content.
    General,
    /// Tags about the post itself (resolution, medium, style).
    Meta,
    /// Artists and everything that doesn't fit elsewhere.
    Other,
}

impl TagCategory {
    pub const ALL: [Self; 5] = [
        Self::Copyright,
        Self::Character,
        Self::General,
        Self::Meta,
        Self::Other,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copyright => "copyright",
            Self::Character => "character",
            Self::General => "general",
            Self::Meta => "meta",
            Self::Other => "other",
        }
    }
}

impl Display for TagCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TagCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copyright" => Ok(Self::Copyright),
            "character" => Ok(Self::Character),
            "general" => Ok(Self::General),
            "meta" => Ok(Self::Meta),
            "other" => Ok(Self::Other),
            other => Err(format!("Unknown tag category: {other}")),
        }
    }
}

/// A single normalized tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    value: String,
    category: TagCategory,
}

impl TagEntry {
    pub fn new(value: &str, category: TagCategory) -> Self {
        Self {
            value: value.to_string(),
            category,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub const fn category(&self) -> TagCategory {
        self.category
    }
}

type RawTagMap = BTreeMap<TagCategory, Vec<String>>;

/// Category-keyed collection of tags for a single post.
///
/// All five categories are always present, even when empty. Inside a category tags keep the
/// order in which they were first inserted, and a tag whose lowercase form is already present
/// in the same category is ignored. The first spelling seen wins.
///
/// On the wire this is a JSON object with the five category names as keys and arrays of tag
/// strings as values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawTagMap", into = "RawTagMap")]
pub struct TagMap {
    entries: BTreeMap<TagCategory, Vec<TagEntry>>,
    seen: AHashSet<(TagCategory, String)>,
}

impl Default for TagMap {
    fn default() -> Self {
        Self::new()
    }
}

impl TagMap {
    pub fn new() -> Self {
        let entries = TagCategory::ALL
            .into_iter()
            .map(|category| (category, Vec::new()))
            .collect();

        Self {
            entries,
            seen: AHashSet::new(),
        }
    }

    /// Inserts a tag into `category`.
    ///
    /// Returns `false` when the value is blank or already present in that category
    /// (compared case-insensitively).
    pub fn insert(&mut self, value: &str, category: TagCategory) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }

        if !self.seen.insert((category, value.to_lowercase())) {
            return false;
        }

        self.entries
            .entry(category)
            .or_default()
            .push(TagEntry::new(value, category));
        true
    }

    pub fn get(&self, category: TagCategory) -> &[TagEntry] {
        self.entries.get(&category).map_or(&[], Vec::as_slice)
    }

    pub fn values(&self, category: TagCategory) -> impl Iterator<Item = &str> {
        self.get(category).iter().map(TagEntry::value)
    }

    pub fn contains(&self, category: TagCategory, value: &str) -> bool {
        self.seen.contains(&(category, value.trim().to_lowercase()))
    }

    /// Iterates over every tag, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &TagEntry> {
        self.entries.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn categories(&self) -> impl Iterator<Item = TagCategory> + '_ {
        self.entries.keys().copied()
    }
}

impl From<RawTagMap> for TagMap {
    fn from(raw: RawTagMap) -> Self {
        let mut map = Self::new();
        for (category, values) in raw {
            for value in values {
                map.insert(&value, category);
            }
        }
        map
    }
}

impl From<TagMap> for RawTagMap {
    fn from(map: TagMap) -> Self {
        map.entries
            .into_iter()
            .map(|(category, entries)| {
                (
                    category,
                    entries.into_iter().map(|entry| entry.value).collect(),
                )
            })
            .collect()
    }
}
