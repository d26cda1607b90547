//! Declarative site profiles.
//!
//! A [`ProfileSpec`] describes how to recognize a post URL of one site and where its tags,
//! image and title live in the page markup. Specs are plain data: they are compiled into
//! [`SiteProfile`](crate::registry::SiteProfile)s by the [`SiteRegistry`](crate::registry::SiteRegistry)
//! once at startup, which is also where invalid selectors and patterns are reported.
//!
//! The built-in catalog lives in [`DEFAULT_PROFILES`]. Extra sites can be declared in a TOML
//! file, see [`serialize`].
use btx_common::TagCategory;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt::Display};

use crate::site_profile;

/// Browser user agent sent with page and image fetches.
pub const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Crawler user agent used as the last step of the health probe ladder.
pub const BOT_UA: &str = concat!(
    "Mozilla/5.0 (compatible; BooruTagExtractor/",
    env!("CARGO_PKG_VERSION"),
    "; +https://github.com/booru-tag-extractor)"
);

pub mod macros;
pub mod serialize;

/// How the tags of a post are laid out in the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagRuleSpec {
    /// Each `items` element carries a `tag-type-*` class and contains a `link` with the tag name.
    ClassList { items: String, link: String },
    /// Children of `container` alternate between category headers and tag lists.
    Sections { container: String, link: String },
    /// Each `items` element names its category in `attribute` and its tag text in `name`.
    DataAttribute {
        items: String,
        attribute: String,
        name: String,
        scheme: CategoryScheme,
    },
    /// Each `items` element is a tag whose own class names give the category.
    ClassNames { items: String },
    /// A single text node holding every tag, split by `separator`.
    Delimited {
        container: String,
        separator: String,
        category: TagCategory,
    },
    /// `dt` headers followed by `dd.quicktag` holding `span.tag a` links.
    DefinitionList { container: String },
    /// One selector per category; every match is a tag.
    PerCategory {
        selectors: BTreeMap<TagCategory, String>,
    },
}

/// Vocabulary used by a site for its category attribute values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryScheme {
    /// `data-category` values used by e621 and e926.
    E621,
    /// `data-type` values used by Moebooru sites such as Konachan and Yande.re.
    Moebooru,
}

impl CategoryScheme {
    pub fn category(self, value: &str) -> TagCategory {
        let value = value.trim().to_lowercase();
        match self {
            Self::E621 => match value.as_str() {
                "copyright" => TagCategory::Copyright,
                "character" => TagCategory::Character,
                "general" | "species" => TagCategory::General,
                "meta" => TagCategory::Meta,
                _ => TagCategory::Other,
            },
            Self::Moebooru => match value.as_str() {
                "copyright" => TagCategory::Copyright,
                "character" => TagCategory::Character,
                "general" => TagCategory::General,
                "style" => TagCategory::Meta,
                _ => TagCategory::Other,
            },
        }
    }
}

/// An element holding the post's media URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSourceSpec {
    pub selector: String,
    #[serde(default = "default_image_attribute")]
    pub attribute: String,
}

fn default_image_attribute() -> String {
    String::from("src")
}

impl ImageSourceSpec {
    pub fn new(selector: &str, attribute: &str) -> Self {
        Self {
            selector: selector.to_string(),
            attribute: attribute.to_string(),
        }
    }
}

/// Where to read a candidate post title from.
///
/// With only a `selector`, the element text is used (`alt` for images). With only an
/// `attribute`, the first element carrying it is used. With both, the attribute of the
/// selected element is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleSourceSpec {
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
    /// Keep only the text before the first ` (`.
    #[serde(default)]
    pub before_paren: bool,
}

impl TitleSourceSpec {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            ..Default::default()
        }
    }

    pub fn attribute(name: &str) -> Self {
        Self {
            attribute: Some(name.to_string()),
            ..Default::default()
        }
    }

    pub fn attribute_of(selector: &str, name: &str) -> Self {
        Self {
            selector: Some(selector.to_string()),
            attribute: Some(name.to_string()),
            before_paren: false,
        }
    }

    #[must_use]
    pub const fn before_paren(mut self) -> Self {
        self.before_paren = true;
        self
    }
}

/// Declarative description of one supported site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub name: String,
    pub domain: String,
    /// Hostnames served by this profile. Defaults to `[domain]` when empty.
    #[serde(default)]
    pub hosts: Vec<String>,
    /// Regex matched against the URL path plus `?query`.
    #[serde(default)]
    pub path_pattern: Option<String>,
    #[serde(default = "default_rank")]
    pub rank: u32,
    /// URL probed by the health monitor. Defaults to the site root.
    #[serde(default)]
    pub probe_url: Option<String>,
    /// Host to retry against when the primary host refuses probes.
    #[serde(default)]
    pub mirror_host: Option<String>,
    pub tags: TagRuleSpec,
    #[serde(default)]
    pub image: Vec<ImageSourceSpec>,
    #[serde(default)]
    pub title: Vec<TitleSourceSpec>,
    /// Extra tag names dropped for this site only.
    #[serde(default)]
    pub ignore: Vec<String>,
}

const fn default_rank() -> u32 {
    100
}

impl Display for ProfileSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

const DONMAI_TAGS: &str = r#"#tag-list li[class*="tag-type-"]"#;
const GELBOORU_LINK: &str = r#"a[href*="page=post"]"#;
const GELBOORU_VIEW: &str = r"(?i)^/(index\.php)?\?page=post&s=view&id=\d+";

fn donmai_rule() -> TagRuleSpec {
    TagRuleSpec::ClassList {
        items: DONMAI_TAGS.to_string(),
        link: String::from("a.search-tag"),
    }
}

fn sidebar_sections(container: &str) -> TagRuleSpec {
    TagRuleSpec::Sections {
        container: container.to_string(),
        link: GELBOORU_LINK.to_string(),
    }
}

/// Built-in site catalog, in match order.
pub static DEFAULT_PROFILES: Lazy<Vec<ProfileSpec>> = Lazy::new(|| {
    vec![
        site_profile!(
            name: "Danbooru",
            domain: "danbooru.donmai.us",
            hosts: ["danbooru.donmai.us"],
            path: r"(?i)^/posts/\d+",
            rank: 1,
            probe: "https://danbooru.donmai.us/posts/1",
            tags: donmai_rule(),
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Safebooru (Donmai)",
            domain: "safebooru.donmai.us",
            hosts: ["safebooru.donmai.us"],
            path: r"(?i)^/posts/\d+",
            rank: 2,
            probe: "https://safebooru.donmai.us/posts/1",
            tags: donmai_rule(),
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Hijiribe",
            domain: "hijiribe.donmai.us",
            hosts: ["hijiribe.donmai.us"],
            path: r"(?i)^/posts/\d+",
            rank: 3,
            probe: "https://hijiribe.donmai.us/posts/1",
            tags: donmai_rule(),
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Safebooru (Org)",
            domain: "safebooru.org",
            hosts: ["safebooru.org"],
            path: r"(?i)^/(index\.php\?page=post&s=view&id=\d+|post/view/\d+)",
            rank: 4,
            probe: "https://safebooru.org/index.php?page=post&s=view&id=1",
            tags: TagRuleSpec::Sections {
                container: String::from("#tag-sidebar"),
                link: format!("{GELBOORU_LINK}:last-of-type"),
            },
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Gelbooru",
            domain: "gelbooru.com",
            hosts: ["gelbooru.com"],
            path: GELBOORU_VIEW,
            rank: 5,
            probe: "https://gelbooru.com/index.php?page=post&s=view&id=1",
            tags: TagRuleSpec::ClassList {
                items: String::from(
                    r#".tag-list li[class*="tag-type-"], #tag-sidebar li[class*="tag-type-"]"#
                ),
                link: GELBOORU_LINK.to_string(),
            },
            image: [("#image, #gelcomVideoPlayer source", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Rule34",
            domain: "rule34.xxx",
            hosts: ["rule34.xxx"],
            path: GELBOORU_VIEW,
            rank: 6,
            probe: "https://rule34.xxx/index.php?page=post&s=view&id=1",
            tags: sidebar_sections("#tag-sidebar, .sidebar > div:last-of-type"),
            image: [(
                "#image, #gelcomVideoPlayer source, video#videoelement source",
                "src"
            )],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "TBIB",
            domain: "tbib.org",
            hosts: ["tbib.org"],
            path: GELBOORU_VIEW,
            rank: 7,
            probe: "https://tbib.org/index.php?page=post&s=view&id=1",
            tags: sidebar_sections("#tag-sidebar"),
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Realbooru",
            domain: "realbooru.com",
            hosts: ["realbooru.com"],
            path: GELBOORU_VIEW,
            rank: 8,
            probe: "https://realbooru.com/index.php?page=post&s=view&id=1",
            tags: TagRuleSpec::ClassList {
                items: String::from(
                    r#".tag-list li[class*="tag-type-"], #tag-sidebar li[class*="tag-type-"]"#
                ),
                link: GELBOORU_LINK.to_string(),
            },
            image: [("#image, video source", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "e621",
            domain: "e621.net",
            hosts: ["e621.net", "e926.net"],
            path: r"(?i)^/posts/\d+",
            rank: 9,
            probe: "https://e621.net/posts/1",
            tags: TagRuleSpec::DataAttribute {
                items: String::from("section#tag-list > ul > li.tag-list-item"),
                attribute: String::from("data-category"),
                name: String::from("a.tag-list-search > span:not(.tag-list-count)"),
                scheme: CategoryScheme::E621,
            },
            image: [(
                "#image, #image-container img, #image-container video source",
                "src"
            )],
            title: [
                TitleSourceSpec::attribute("data-title"),
                TitleSourceSpec::text("#image-container h5"),
                TitleSourceSpec::text("title"),
            ],
        ),
        site_profile!(
            name: "AIBooru",
            domain: "aibooru.online",
            hosts: ["aibooru.online"],
            path: r"(?i)^/posts/\d+",
            rank: 10,
            probe: "https://aibooru.online/posts/1",
            tags: TagRuleSpec::ClassList {
                items: String::from(r#"div.categorized-tag-list li[class*="tag-type-"]"#),
                link: String::from("a.search-tag"),
            },
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Yande.re",
            domain: "yande.re",
            hosts: ["yande.re"],
            path: r"(?i)^/post/show/\d+",
            rank: 11,
            probe: "https://yande.re/post/show/1",
            tags: TagRuleSpec::ClassList {
                items: String::from(r#"#tag-sidebar li[class*="tag-type-"]"#),
                link: String::from(r#"a[href*="/post?tags="]"#),
            },
            image: [("#image", "src"), ("img.fit-width", "src")],
            title: [TitleSourceSpec::text("title")],
        ),
        site_profile!(
            name: "Konachan",
            domain: "konachan.com",
            hosts: ["konachan.com", "konachan.net"],
            path: r"(?i)^/post/show/\d+",
            rank: 12,
            probe: "https://konachan.com/post/show/1",
            tags: TagRuleSpec::DataAttribute {
                items: String::from("ul#tag-sidebar li.tag-link"),
                attribute: String::from("data-type"),
                name: String::from("a:nth-of-type(2)"),
                scheme: CategoryScheme::Moebooru,
            },
            image: [("#image", "src")],
            title: [TitleSourceSpec::text("title")],
            mirror: "konachan.net",
            ignore: ["tagme (character)"],
        ),
        site_profile!(
            name: "Anime-Pictures",
            domain: "anime-pictures.net",
            hosts: ["anime-pictures.net"],
            path: r"(?i)^/posts/\d+",
            rank: 13,
            probe: "https://anime-pictures.net/posts/1",
            tags: TagRuleSpec::ClassNames {
                items: String::from("ul.tags li a"),
            },
            image: [("img#big_preview", "src")],
            title: [
                TitleSourceSpec::text("img#big_preview"),
                TitleSourceSpec::text("title"),
            ],
        ),
        site_profile!(
            name: "Zerochan",
            domain: "zerochan.net",
            hosts: ["zerochan.net"],
            path: r"^/\d+",
            rank: 14,
            probe: "https://zerochan.net/1",
            tags: TagRuleSpec::Delimited {
                container: String::from("#large > p"),
                separator: String::from(","),
                category: TagCategory::General,
            },
            image: [
                ("#large > a.preview", "href"),
                ("#large > a.preview > img.jpg", "src"),
            ],
            title: [
                TitleSourceSpec::text("title"),
                TitleSourceSpec::attribute_of("#large > a.preview > img.jpg", "title").before_paren(),
            ],
        ),
        site_profile!(
            name: "E-Shuushuu",
            domain: "e-shuushuu.net",
            hosts: ["e-shuushuu.net"],
            path: r"(?i)^/image/\d+",
            rank: 15,
            probe: "https://e-shuushuu.net/image/1",
            tags: TagRuleSpec::DefinitionList {
                container: String::from("div.meta dl"),
            },
            image: [("a.thumb_image", "href")],
            title: [
                TitleSourceSpec::text("div.title h2 a"),
                TitleSourceSpec::text("title"),
            ],
        ),
    ]
});
