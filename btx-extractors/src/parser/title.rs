//! Post title cleanup.
//!
//! Page titles carry site names, post numbers and dimension tails that are noise for the
//! caller. The rules run in a fixed order, each at most once unless noted.
use once_cell::sync::Lazy;
use regex::Regex;

struct Rule {
    pattern: Regex,
    replacement: &'static str,
    all: bool,
}

fn rule(pattern: &str, replacement: &'static str, all: bool) -> Rule {
    Rule {
        pattern: Regex::new(pattern).expect("title rules are valid regexes"),
        replacement,
        all,
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        rule(
            r"(?i) - (Danbooru|Safebooru|Gelbooru|Rule 34 -|Yande\.re|Konachan\.com - Anime Wallpapers \|)",
            "",
            false,
        ),
        rule(r"(?i)aibooru \| #\d+ \| ", "", false),
        rule(r" » ", " - ", true),
        rule(r"(?i)^Post #\d+ ", "", false),
        rule(r"(?i) \| Post #\d+$", "", false),
        rule(r"(?i) - e621$", "", false),
        rule(r"(?i) \| Anime-Pictures\.net$", "", false),
        rule(r"(?i)Anime picture \d+x\d+ with ", "", false),
        rule(r"(?i)^Image #\d+\s?", "", false),
        rule(r"(?i) Image #\d+$", "", false),
        rule(r"(?i)\s+\(\d+✕\d+\s+\d+(\.\d+)?\s*k?B\)$", "", false),
    ]
});

static WITH_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r" with.*$").expect("valid regex"));

static ZEROCHAN_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i) - Zerochan Anime Image Board$").expect("valid regex"));

static BEFORE_PAREN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^(]+)\s+\(").expect("valid regex"));

const TAG_DUMP_MARKER: &str = " single tall image";

/// Board names that sites use as a page title when the post has none.
const GENERIC_TITLES: [&str; 2] = ["zerochan anime image board", "zerochan"];

/// Strips site decorations from a raw title.
///
/// Returns `None` when nothing meaningful is left, including generic board names, so the
/// caller can move on to its next title source.
pub fn clean_title(raw: &str) -> Option<String> {
    let mut title = raw.trim().to_string();
    if title.is_empty() {
        return None;
    }

    for rule in RULES.iter() {
        title = if rule.all {
            rule.pattern.replace_all(&title, rule.replacement).into_owned()
        } else {
            rule.pattern.replace(&title, rule.replacement).into_owned()
        };
    }

    if let Some(idx) = title.find(TAG_DUMP_MARKER) {
        if idx > 0 {
            title.truncate(idx);
        }
    }

    title = WITH_TAIL.replace(&title, "").into_owned();
    title = ZEROCHAN_SUFFIX.replace(&title, "").trim().to_string();

    let lowered = title.to_lowercase();
    if title.is_empty() || GENERIC_TITLES.contains(&lowered.as_str()) {
        return None;
    }

    Some(title)
}

/// Keeps the text before the first ` (`, as used by attribute titles like
/// `"Hatsune Miku (1200x1800 350kB)"`.
pub fn before_paren(raw: &str) -> String {
    BEFORE_PAREN
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map_or_else(
            || raw.split(" (").next().unwrap_or(raw).trim().to_string(),
            |m| m.as_str().trim().to_string(),
        )
}
