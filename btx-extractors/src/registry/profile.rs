use ahash::AHashSet;
use btx_common::TagCategory;
use regex::Regex;
use scraper::Selector;

use super::normalize_host;
use crate::{
    error::RegistryError,
    extractor_config::{CategoryScheme, ProfileSpec, TagRuleSpec},
};

/// Compiled form of [`TagRuleSpec`].
#[derive(Debug, Clone)]
pub enum TagRule {
    ClassList {
        items: Selector,
        link: Selector,
    },
    Sections {
        container: Selector,
        link: Selector,
    },
    DataAttribute {
        items: Selector,
        attribute: String,
        name: Selector,
        scheme: CategoryScheme,
    },
    ClassNames {
        items: Selector,
    },
    Delimited {
        container: Selector,
        separator: String,
        category: TagCategory,
    },
    DefinitionList {
        container: Selector,
    },
    PerCategory {
        selectors: Vec<(TagCategory, Selector)>,
    },
}

#[derive(Debug, Clone)]
pub struct ImageSource {
    pub selector: Selector,
    pub attribute: String,
}

#[derive(Debug, Clone)]
pub struct TitleSource {
    pub selector: Option<Selector>,
    pub attribute: Option<String>,
    pub before_paren: bool,
}

/// A site profile ready for matching and parsing. Never mutated after load.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub name: String,
    pub domain: String,
    /// Normalized hostnames (lowercase, no `www.`).
    pub hosts: Vec<String>,
    pub path_pattern: Option<Regex>,
    pub rank: u32,
    pub probe_url: String,
    pub mirror_host: Option<String>,
    pub tags: TagRule,
    pub image: Vec<ImageSource>,
    pub title: Vec<TitleSource>,
    /// Lowercased tag names dropped for this site.
    pub ignore: AHashSet<String>,
}

impl SiteProfile {
    pub fn compile(spec: &ProfileSpec) -> Result<Self, RegistryError> {
        let profile = spec.name.as_str();
        let sel = |s: &str| compile_selector(profile, s);

        let mut hosts: Vec<String> = spec.hosts.iter().map(|h| normalize_host(h)).collect();
        if hosts.is_empty() && !spec.domain.is_empty() {
            hosts.push(normalize_host(&spec.domain));
        }
        if hosts.is_empty() {
            return Err(RegistryError::NoHosts {
                profile: spec.name.clone(),
            });
        }

        let path_pattern = spec
            .path_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|source| RegistryError::InvalidPattern {
                profile: spec.name.clone(),
                source,
            })?;

        let tags = match &spec.tags {
            TagRuleSpec::ClassList { items, link } => TagRule::ClassList {
                items: sel(items)?,
                link: sel(link)?,
            },
            TagRuleSpec::Sections { container, link } => TagRule::Sections {
                container: sel(container)?,
                link: sel(link)?,
            },
            TagRuleSpec::DataAttribute {
                items,
                attribute,
                name,
                scheme,
            } => TagRule::DataAttribute {
                items: sel(items)?,
                attribute: attribute.clone(),
                name: sel(name)?,
                scheme: *scheme,
            },
            TagRuleSpec::ClassNames { items } => TagRule::ClassNames { items: sel(items)? },
            TagRuleSpec::Delimited {
                container,
                separator,
                category,
            } => TagRule::Delimited {
                container: sel(container)?,
                separator: separator.clone(),
                category: *category,
            },
            TagRuleSpec::DefinitionList { container } => TagRule::DefinitionList {
                container: sel(container)?,
            },
            TagRuleSpec::PerCategory { selectors } => TagRule::PerCategory {
                selectors: selectors
                    .iter()
                    .map(|(category, s)| Ok((*category, sel(s)?)))
                    .collect::<Result<_, RegistryError>>()?,
            },
        };

        let image = spec
            .image
            .iter()
            .map(|src| {
                Ok(ImageSource {
                    selector: sel(&src.selector)?,
                    attribute: src.attribute.clone(),
                })
            })
            .collect::<Result<_, RegistryError>>()?;

        let title = spec
            .title
            .iter()
            .map(|src| {
                Ok(TitleSource {
                    selector: src.selector.as_deref().map(sel).transpose()?,
                    attribute: src.attribute.clone(),
                    before_paren: src.before_paren,
                })
            })
            .collect::<Result<_, RegistryError>>()?;

        let probe_url = spec
            .probe_url
            .clone()
            .unwrap_or_else(|| format!("https://{}/", spec.domain));

        Ok(Self {
            name: spec.name.clone(),
            domain: spec.domain.clone(),
            hosts,
            path_pattern,
            rank: spec.rank,
            probe_url,
            mirror_host: spec.mirror_host.as_deref().map(normalize_host),
            tags,
            image,
            title,
            ignore: spec.ignore.iter().map(|t| t.trim().to_lowercase()).collect(),
        })
    }

    /// Returns `true` when this profile claims `host` (already normalized) and `path`.
    pub fn matches(&self, host: &str, path_and_query: &str) -> bool {
        if !self.hosts.iter().any(|h| h == host) {
            return false;
        }

        self.path_pattern
            .as_ref()
            .map_or(true, |re| re.is_match(path_and_query))
    }
}

pub(crate) fn compile_selector(profile: &str, selector: &str) -> Result<Selector, RegistryError> {
    Selector::parse(selector).map_err(|e| RegistryError::InvalidSelector {
        profile: profile.to_string(),
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}
