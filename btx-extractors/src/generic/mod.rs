//! Best-effort extraction for pages no site profile claims.
//!
//! Looks for anything that resembles a tag list (containers whose class or id mentions
//! `tag` or `categor`), guesses categories from class names and picks the largest media
//! element on the page. Results always carry
//! [`UNSUPPORTED_SITE_WARNING`](btx_common::extraction::UNSUPPORTED_SITE_WARNING).
use btx_common::{extraction::UNSUPPORTED_SITE_WARNING, ExtractionResult, TagCategory};
use log::debug;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    blacklist::TagBlacklist,
    parser::{
        category_from_tag_type, clean_title, element_text, media_src, normalize_token,
        resolve_media_url, TagSink, ANY_TITLE,
    },
};

static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").expect("valid selector"));

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").expect("valid selector"));

static MEDIA: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img, video").expect("valid selector"));

static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"meta[property="og:image"]"#).expect("valid selector"));

const EXCLUDED_REGIONS: [&str; 3] = ["nav", "header", "footer"];

const NEVER_CONTAINERS: [&str; 5] = ["html", "head", "body", "script", "style"];

/// Parses a page from an unknown site.
///
/// Never fails: a page with nothing recognizable yields an empty tag map and warnings.
pub fn parse_generic(html: &str, base_url: &Url, blacklist: &TagBlacklist) -> ExtractionResult {
    let document = Html::parse_document(html);
    parse_generic_document(&document, base_url, blacklist)
}

/// Same as [`parse_generic`], over an already parsed document.
pub fn parse_generic_document(
    document: &Html,
    base_url: &Url,
    blacklist: &TagBlacklist,
) -> ExtractionResult {
    let site_name = base_url.host_str().unwrap_or_default();
    let mut sink = TagSink::new(site_name, blacklist, None);

    let containers = tag_containers(document);
    debug!("Generic extractor found {} tag containers", containers.len());

    for container in &containers {
        let items: Vec<ElementRef<'_>> = if container.value().name() == "li" {
            vec![*container]
        } else {
            container
                .select(&LIST_ITEM)
                .filter(|item| !in_excluded_region(item))
                .collect()
        };

        for item in items {
            let text = item_text(&item);
            sink.push(&text, item_category(&item, container));
        }
    }

    let result = sink.result_mut();
    result.image_url = largest_media(document, base_url);
    result.title = document
        .select(&ANY_TITLE)
        .next()
        .and_then(|t| clean_title(&element_text(&t)));
    result.add_warning(UNSUPPORTED_SITE_WARNING);

    sink.finish()
}

fn in_excluded_region(el: &ElementRef<'_>) -> bool {
    std::iter::once(*el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(|node| EXCLUDED_REGIONS.contains(&node.value().name()))
}

fn looks_like_container(el: &ElementRef<'_>) -> bool {
    if NEVER_CONTAINERS.contains(&el.value().name()) {
        return false;
    }

    let value = el.value();
    [value.attr("class"), value.id()]
        .into_iter()
        .flatten()
        .map(str::to_lowercase)
        .any(|s| s.contains("tag") || s.contains("categor"))
}

/// Outermost candidate containers in document order.
fn tag_containers(document: &Html) -> Vec<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| looks_like_container(el) && !in_excluded_region(el))
        .filter(|el| {
            !el.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|parent| looks_like_container(&parent))
        })
        .collect()
}

fn is_trivial(text: &str) -> bool {
    let text = text.trim();
    let count = text.trim_end_matches(['k', 'M']);
    text.is_empty()
        || matches!(text, "?" | "+" | "-")
        || (!count.is_empty() && count.chars().all(|c| c.is_ascii_digit() || c == '.'))
}

/// Text of the last meaningful link in `item`, or the item text when it has none.
fn item_text(item: &ElementRef<'_>) -> String {
    item.select(&LINK)
        .map(|a| element_text(&a))
        .filter(|text| !is_trivial(&normalize_token(text)))
        .last()
        .unwrap_or_else(|| element_text(item))
}

fn category_from_class_substrings(el: &ElementRef<'_>) -> Option<TagCategory> {
    if let Some(category) = category_from_tag_type(el) {
        return Some(category);
    }

    let class = el.value().attr("class")?.to_lowercase();
    if class.contains("copyright") {
        Some(TagCategory::Copyright)
    } else if class.contains("character") {
        Some(TagCategory::Character)
    } else if class.contains("general") {
        Some(TagCategory::General)
    } else if class.contains("meta") {
        Some(TagCategory::Meta)
    } else if class.contains("artist") {
        Some(TagCategory::Other)
    } else {
        None
    }
}

/// Walks from `item` up to `container` (inclusive) looking for a category hint.
fn item_category(item: &ElementRef<'_>, container: &ElementRef<'_>) -> TagCategory {
    let mut node = Some(*item);
    while let Some(el) = node {
        if let Some(category) = category_from_class_substrings(&el) {
            return category;
        }
        if el == *container {
            break;
        }
        node = el.parent().and_then(ElementRef::wrap);
    }
    TagCategory::General
}

fn dimension(el: &ElementRef<'_>, name: &str) -> u64 {
    el.value()
        .attr(name)
        .and_then(|v| v.trim().trim_end_matches("px").parse().ok())
        .unwrap_or(0)
}

/// The largest `img`/`video` by declared area, then `og:image`, then the first media element.
fn largest_media(document: &Html, base_url: &Url) -> Option<String> {
    let candidates: Vec<(u64, String)> = document
        .select(&MEDIA)
        .filter(|el| !in_excluded_region(el))
        .filter_map(|el| {
            let src = media_src(&el, "src")?;
            let area = dimension(&el, "width").saturating_mul(dimension(&el, "height"));
            Some((area, src))
        })
        .collect();

    let mut best: Option<&(u64, String)> = None;
    for candidate in candidates.iter().filter(|(area, _)| *area > 0) {
        if best.map_or(true, |(area, _)| candidate.0 > *area) {
            best = Some(candidate);
        }
    }

    let chosen = best
        .map(|(_, src)| src.clone())
        .or_else(|| {
            document
                .select(&OG_IMAGE)
                .find_map(|meta| meta.value().attr("content"))
                .map(str::to_string)
        })
        .or_else(|| candidates.first().map(|(_, src)| src.clone()))?;

    resolve_media_url(&chosen, base_url)
}
