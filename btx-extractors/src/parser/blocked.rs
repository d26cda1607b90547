//! Detection of challenge pages, captchas and login walls served with a 2xx status.
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

/// Title fragments and the block reason they indicate.
const TITLE_MARKERS: [(&str, &str); 12] = [
    ("just a moment", "Cloudflare Protection"),
    ("attention required", "Cloudflare Protection"),
    ("cloudflare", "Cloudflare Protection"),
    ("access denied", "Access Denied"),
    ("rate limit", "Rate Limited"),
    ("too many requests", "Rate Limited"),
    ("captcha", "Captcha Required"),
    ("javascript required", "JavaScript Required"),
    ("enable cookies", "Cookies Required"),
    ("checking your browser", "Browser Check"),
    ("ddos protection", "DDoS Protection"),
    ("security check", "Security Check"),
];

const LOGIN_MARKERS: [&str; 5] = [
    "you must be logged in",
    "requires an account",
    "please login",
    "sign in required",
    "authentication required",
];

static CHALLENGE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "#challenge-running, #challenge-form, #cf-wrapper, .cf-error-code, .cf-error-details, .cf-browser-verification",
    )
    .expect("valid selector")
});

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid selector"));

/// Returns a human readable reason when `document` is not a real post page.
pub fn detect_blocked(document: &Html) -> Option<String> {
    let title = document
        .select(&TITLE)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_lowercase())
        .unwrap_or_default();

    if let Some((_, reason)) = TITLE_MARKERS.iter().find(|(marker, _)| title.contains(marker)) {
        return Some(format!("{reason} (page title: {title})"));
    }

    if let Some(marker) = LOGIN_MARKERS.iter().find(|marker| title.contains(*marker)) {
        return Some(format!("Login Required ({marker})"));
    }

    if document.select(&CHALLENGE).next().is_some() {
        return Some(String::from("Cloudflare Protection (challenge page)"));
    }

    None
}
