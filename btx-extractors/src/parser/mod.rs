//! Tag parser & categorizer.
//!
//! A single interpreter runs the [`TagRule`] of a [`SiteProfile`] over a parsed document,
//! then normalizes, filters and de-duplicates every token it finds. Parsing is a pure
//! function of its inputs: the same HTML, profile and blacklist always produce the same
//! [`ExtractionResult`].
use btx_common::{extraction::NO_TAGS_WARNING, ExtractionResult, TagCategory};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    blacklist::TagBlacklist,
    registry::{ImageSource, SiteProfile, TagRule, TitleSource},
};

pub mod blocked;
pub mod title;

pub use blocked::detect_blocked;
pub use title::clean_title;

static COUNT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r" \(\d+\.?\d*[kM]?\)$").expect("valid regex"));

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("valid regex"));

pub(crate) static ANY_TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("valid selector"));

static SOURCE: Lazy<Selector> = Lazy::new(|| Selector::parse("source").expect("valid selector"));

static DT: Lazy<Selector> = Lazy::new(|| Selector::parse("dt").expect("valid selector"));

static QUICKTAG_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.tag a").expect("valid selector"));

static H6: Lazy<Selector> = Lazy::new(|| Selector::parse("h6").expect("valid selector"));

/// Category names that class-list sites render as items of their own tag lists.
const CATEGORY_NAMES: [&str; 10] = [
    "copyright",
    "copyrights",
    "character",
    "characters",
    "general",
    "meta",
    "metadata",
    "artist",
    "artists",
    "tags",
];

/// Sidebar leftovers of sectioned tag lists.
const SECTION_NOISE: [&str; 2] = ["tag list", "?"];

/// Normalizes a raw token: drops a trailing post count such as ` (1.2k)` and a leading `? `,
/// collapses runs of whitespace and underscores to a single space and trims.
pub fn normalize_token(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_count = COUNT_SUFFIX.replace(trimmed, "");
    let without_marker = without_count
        .strip_prefix("? ")
        .unwrap_or(&without_count);

    SEPARATORS
        .replace_all(without_marker, " ")
        .trim()
        .to_string()
}

/// Maps `tag-type-*` class names to a category. Unknown `tag-type-*` values fall back to
/// `General`; `None` means the element has no `tag-type-*` class at all.
pub fn category_from_tag_type(el: &ElementRef<'_>) -> Option<TagCategory> {
    let classes: Vec<&str> = el
        .value()
        .classes()
        .filter(|c| c.starts_with("tag-type-"))
        .collect();

    if classes.is_empty() {
        return None;
    }

    let has = |names: &[&str]| classes.iter().any(|c| names.contains(c));

    let category = if has(&["tag-type-copyright", "tag-type-3"]) {
        TagCategory::Copyright
    } else if has(&["tag-type-character", "tag-type-4"]) {
        TagCategory::Character
    } else if has(&["tag-type-general", "tag-type-0"]) {
        TagCategory::General
    } else if has(&[
        "tag-type-metadata",
        "tag-type-5",
        "tag-type-meta",
        "tag-type-style",
    ]) {
        TagCategory::Meta
    } else if has(&["tag-type-artist", "tag-type-1"]) {
        TagCategory::Other
    } else {
        TagCategory::General
    };

    Some(category)
}

/// Category of `el` from its own `tag-type-*` class or that of its closest ancestor carrying one.
fn category_from_classes(el: &ElementRef<'_>) -> TagCategory {
    std::iter::once(*el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .find_map(|node| category_from_tag_type(&node))
        .unwrap_or(TagCategory::General)
}

fn category_from_header(text: &str) -> TagCategory {
    let text = text.trim().to_lowercase();
    if text.contains("copyright") || text.contains("source:") {
        TagCategory::Copyright
    } else if text.contains("character") {
        TagCategory::Character
    } else if text.contains("general") || text.contains("tags:") {
        TagCategory::General
    } else if text.contains("meta") {
        TagCategory::Meta
    } else {
        TagCategory::Other
    }
}

fn category_from_class_names(el: &ElementRef<'_>) -> TagCategory {
    let has = |name: &str| el.value().classes().any(|c| c == name);
    if has("copyright") {
        TagCategory::Copyright
    } else if has("character") {
        TagCategory::Character
    } else if has("artist") {
        TagCategory::Other
    } else {
        TagCategory::General
    }
}

fn definition_category(header: &str) -> Option<TagCategory> {
    match header.trim().to_lowercase().as_str() {
        "tags:" => Some(TagCategory::General),
        "source:" => Some(TagCategory::Copyright),
        "characters:" => Some(TagCategory::Character),
        "artist:" => Some(TagCategory::Other),
        _ => None,
    }
}

pub(crate) fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

/// Collects tokens into an [`ExtractionResult`], applying every filter on the way in.
pub(crate) struct TagSink<'a> {
    result: ExtractionResult,
    blacklist: &'a TagBlacklist,
    ignore: Option<&'a ahash::AHashSet<String>>,
}

impl<'a> TagSink<'a> {
    pub(crate) fn new(
        site_name: &str,
        blacklist: &'a TagBlacklist,
        ignore: Option<&'a ahash::AHashSet<String>>,
    ) -> Self {
        Self {
            result: ExtractionResult::new(site_name),
            blacklist,
            ignore,
        }
    }

    pub(crate) fn push(&mut self, raw: &str, category: TagCategory) {
        self.push_except(raw, category, &[]);
    }

    /// Like [`TagSink::push`], also dropping tokens equal to one of `noise` (lowercase).
    pub(crate) fn push_except(&mut self, raw: &str, category: TagCategory, noise: &[&str]) {
        let token = normalize_token(raw);
        if token.is_empty() {
            return;
        }

        let lowered = token.to_lowercase();
        if noise.contains(&lowered.as_str()) {
            return;
        }
        if self.ignore.is_some_and(|ignore| ignore.contains(&lowered)) {
            return;
        }
        if self.blacklist.is_blocked(&token) {
            return;
        }

        self.result.tags.insert(&token, category);
    }

    pub(crate) fn finish(mut self) -> ExtractionResult {
        if self.result.tags.is_empty() {
            self.result.add_warning(NO_TAGS_WARNING);
        }
        self.result
    }

    pub(crate) fn result_mut(&mut self) -> &mut ExtractionResult {
        &mut self.result
    }
}

/// Parses a post page with `profile`.
///
/// # Arguments
/// * `html`: the page source.
/// * `page_url`: URL the page was served from, used to resolve relative media URLs.
/// * `profile`: the site profile that claimed the URL.
/// * `blacklist`: tags containing any of its entries are dropped.
pub fn parse(
    html: &str,
    page_url: &Url,
    profile: &SiteProfile,
    blacklist: &TagBlacklist,
) -> ExtractionResult {
    let document = Html::parse_document(html);
    parse_document(&document, page_url, profile, blacklist)
}

/// Same as [`parse`], over an already parsed document.
pub fn parse_document(
    document: &Html,
    page_url: &Url,
    profile: &SiteProfile,
    blacklist: &TagBlacklist,
) -> ExtractionResult {
    let mut sink = TagSink::new(&profile.name, blacklist, Some(&profile.ignore));

    collect_tags(document, &profile.tags, &mut sink);

    let result = sink.result_mut();
    result.image_url = extract_image(document, &profile.image, page_url);
    result.title = extract_title(document, &profile.title);

    sink.finish()
}

fn collect_tags(document: &Html, rule: &TagRule, sink: &mut TagSink<'_>) {
    match rule {
        TagRule::ClassList { items, link } => {
            for item in document.select(items) {
                if let Some(tag) = item.select(link).next() {
                    sink.push_except(
                        &element_text(&tag),
                        category_from_classes(&item),
                        &CATEGORY_NAMES,
                    );
                }
            }
        }
        TagRule::Sections { container, link } => {
            if let Some(container) = document.select(container).next() {
                collect_sections(&container, link, sink);
            }
        }
        TagRule::DataAttribute {
            items,
            attribute,
            name,
            scheme,
        } => {
            for item in document.select(items) {
                let category = scheme.category(item.value().attr(attribute).unwrap_or_default());
                if let Some(tag) = item.select(name).next() {
                    sink.push(&element_text(&tag), category);
                }
            }
        }
        TagRule::ClassNames { items } => {
            for item in document.select(items) {
                sink.push(&element_text(&item), category_from_class_names(&item));
            }
        }
        TagRule::Delimited {
            container,
            separator,
            category,
        } => {
            if let Some(container) = document.select(container).next() {
                let text = element_text(&container);
                for token in text.split(separator.as_str()) {
                    sink.push(token, *category);
                }
            }
        }
        TagRule::DefinitionList { container } => {
            if let Some(container) = document.select(container).next() {
                collect_definitions(&container, sink);
            }
        }
        TagRule::PerCategory { selectors } => {
            for (category, selector) in selectors {
                for tag in document.select(selector) {
                    sink.push(&element_text(&tag), *category);
                }
            }
        }
    }
}

fn is_section_header(el: &ElementRef<'_>) -> bool {
    let name = el.value().name();
    let has_class = |c: &str| el.value().classes().any(|class| class == c);

    name == "h3"
        || name == "h6"
        || has_class("tag-type-header")
        || has_class("tag-sidebar-header")
        || (name == "li" && el.select(&H6).next().is_some())
}

fn collect_sections(container: &ElementRef<'_>, link: &Selector, sink: &mut TagSink<'_>) {
    let mut current = TagCategory::Other;

    for child in container.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();

        if is_section_header(&child) {
            let text = element_text(&child);
            if !text.trim().is_empty() {
                current = category_from_header(&text);
            }
            continue;
        }

        let is_tag_item = name == "li" && child.value().classes().any(|c| c == "tag");
        let items: Vec<ElementRef<'_>> = if name == "ul" {
            child
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|li| li.value().name() == "li")
                .collect()
        } else if is_tag_item {
            vec![child]
        } else {
            continue;
        };

        for item in items {
            let mut category = category_from_classes(&item);
            if category == TagCategory::General && current != TagCategory::General {
                category = current;
            }

            if let Some(tag) = item.select(link).next() {
                sink.push_except(&element_text(&tag), category, &SECTION_NOISE);
            }
        }
    }
}

fn collect_definitions(container: &ElementRef<'_>, sink: &mut TagSink<'_>) {
    for dt in container.select(&DT) {
        let Some(category) = definition_category(&element_text(&dt)) else {
            continue;
        };

        let Some(dd) = dt.next_siblings().find_map(ElementRef::wrap) else {
            continue;
        };

        let is_quicktag = dd.value().name() == "dd" && dd.value().classes().any(|c| c == "quicktag");
        if !is_quicktag {
            continue;
        }

        for link in dd.select(&QUICKTAG_LINK) {
            sink.push(&element_text(&link), category);
        }
    }
}

/// Resolves a media reference against the page URL. Protocol-relative URLs become `https:`.
pub(crate) fn resolve_media_url(raw: &str, page_url: &Url) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(rest) = raw.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    page_url.join(raw).ok().map(String::from)
}

/// Reads the media URL of `el`, falling back to `src` and, for videos, to a nested `<source>`.
pub(crate) fn media_src(el: &ElementRef<'_>, attribute: &str) -> Option<String> {
    let value = el.value();
    let src = value
        .attr(attribute)
        .or_else(|| value.attr("src"))
        .filter(|s| !s.trim().is_empty());

    match src {
        Some(src) => Some(src.to_string()),
        None if value.name() == "video" => el
            .select(&SOURCE)
            .find_map(|source| source.value().attr("src"))
            .map(str::to_string),
        None => None,
    }
}

fn extract_image(document: &Html, sources: &[ImageSource], page_url: &Url) -> Option<String> {
    sources.iter().find_map(|source| {
        let el = document.select(&source.selector).next()?;
        let raw = media_src(&el, &source.attribute)?;
        resolve_media_url(&raw, page_url)
    })
}

fn read_title(document: &Html, source: &TitleSource) -> Option<String> {
    let raw = match (&source.selector, &source.attribute) {
        (Some(selector), Some(attribute)) => document
            .select(selector)
            .next()?
            .value()
            .attr(attribute)?
            .to_string(),
        (Some(selector), None) => {
            let el = document.select(selector).next()?;
            if el.value().name() == "img" {
                el.value().attr("alt")?.to_string()
            } else {
                element_text(&el)
            }
        }
        (None, Some(attribute)) => document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .find_map(|el| el.value().attr(attribute))?
            .to_string(),
        (None, None) => return None,
    };

    let raw = if source.before_paren {
        title::before_paren(&raw)
    } else {
        raw
    };

    clean_title(&raw)
}

/// Tries each title source in order, then the document `<title>`.
pub(crate) fn extract_title(document: &Html, sources: &[TitleSource]) -> Option<String> {
    sources
        .iter()
        .find_map(|source| read_title(document, source))
        .or_else(|| {
            document
                .select(&ANY_TITLE)
                .next()
                .and_then(|t| clean_title(&element_text(&t)))
        })
}

#[cfg(test)]
mod test;
