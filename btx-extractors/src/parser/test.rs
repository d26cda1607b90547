use super::*;
use crate::extractor_config::{ImageSourceSpec, ProfileSpec, TagRuleSpec, DEFAULT_PROFILES};
use btx_common::TagCategory::*;
use std::collections::BTreeMap;

fn profile(name: &str) -> SiteProfile {
    let spec = DEFAULT_PROFILES
        .iter()
        .find(|p| p.name == name)
        .unwrap_or_else(|| panic!("no built-in profile {name}"));
    SiteProfile::compile(spec).unwrap()
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

fn values(result: &ExtractionResult, category: TagCategory) -> Vec<&str> {
    result.tags.values(category).collect()
}

const DANBOORU_POST: &str = r##"<!DOCTYPE html>
<html><head><title>hatsune miku (vocaloid) drawn by kei - Danbooru</title></head>
<body>
<section id="tag-list">
  <ul class="artist-tag-list">
    <li class="tag-type-1" data-tag-name="kei_(keigarou)"><a class="wiki-link" href="/wiki_pages/kei_(keigarou)">?</a> <a class="search-tag" href="/posts?tags=kei_%28keigarou%29">kei (keigarou)</a> <span class="post-count">1.2k</span></li>
  </ul>
  <ul class="copyright-tag-list">
    <li class="tag-type-3"><a class="search-tag" href="#">vocaloid</a></li>
  </ul>
  <ul class="character-tag-list">
    <li class="tag-type-4"><a class="search-tag" href="#">hatsune_miku</a></li>
  </ul>
  <ul class="general-tag-list">
    <li class="tag-type-0"><a class="search-tag" href="#">1girl</a></li>
    <li class="tag-type-0"><a class="search-tag" href="#">long   hair</a></li>
    <li class="tag-type-0"><a class="search-tag" href="#">Long_Hair</a></li>
    <li class="tag-type-0"><a class="search-tag" href="#">guro</a></li>
    <li class="tag-type-0"><a class="search-tag" href="#">  </a></li>
  </ul>
  <ul class="meta-tag-list">
    <li class="tag-type-5"><a class="search-tag" href="#">highres</a></li>
  </ul>
</section>
<section id="content"><img id="image" src="/data/original/ab/cd/abcd.jpg"></section>
</body></html>"##;

#[test]
fn class_list_profile() {
    let result = parse(
        DANBOORU_POST,
        &url("https://danbooru.donmai.us/posts/1"),
        &profile("Danbooru"),
        &TagBlacklist::new(["GUR"]),
    );

    assert_eq!(result.site_name, "Danbooru");
    assert_eq!(values(&result, Other), vec!["kei (keigarou)"]);
    assert_eq!(values(&result, Copyright), vec!["vocaloid"]);
    assert_eq!(values(&result, Character), vec!["hatsune miku"]);
    assert_eq!(values(&result, General), vec!["1girl", "long hair"]);
    assert_eq!(values(&result, Meta), vec!["highres"]);
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://danbooru.donmai.us/data/original/ab/cd/abcd.jpg")
    );
    assert_eq!(
        result.title.as_deref(),
        Some("hatsune miku (vocaloid) drawn by kei")
    );
    assert!(result.warnings.is_empty());
}

#[test]
fn parsing_is_idempotent() {
    let page = url("https://danbooru.donmai.us/posts/1");
    let profile = profile("Danbooru");
    let blacklist = TagBlacklist::new(["hair"]);

    let first = parse(DANBOORU_POST, &page, &profile, &blacklist);
    let second = parse(DANBOORU_POST, &page, &profile, &blacklist);
    assert_eq!(first, second);
}

#[test]
fn blacklisted_substrings_never_surface() {
    let blacklist = TagBlacklist::new(["i", "O"]);
    let result = parse(
        DANBOORU_POST,
        &url("https://danbooru.donmai.us/posts/1"),
        &profile("Danbooru"),
        &blacklist,
    );

    for entry in result.tags.iter() {
        assert!(!blacklist.is_blocked(entry.value()), "{} leaked", entry.value());
    }
    assert_eq!(result.tags.categories().count(), 5);
}

const SAFEBOORU_POST: &str = r##"<html><head><title>Safebooru / touhou hakurei reimu</title></head><body>
<ul id="tag-sidebar">
  <li><h6>Copyright</h6></li>
  <li class="tag-type-copyright tag"><a href="index.php?page=wiki&amp;s=list&amp;search=touhou">?</a> <a href="index.php?page=post&amp;s=list&amp;tags=touhou">touhou</a> <span class="tag-count">5000</span></li>
  <li><h6>Character</h6></li>
  <li class="tag"><a href="index.php?page=wiki&amp;s=list">?</a> <a href="index.php?page=post&amp;s=list&amp;tags=hakurei_reimu">hakurei reimu</a></li>
  <li><h6>General</h6></li>
  <li class="tag-type-general tag"><a href="index.php?page=post&amp;s=list&amp;tags=1girl">1girl</a></li>
  <li class="tag"><a href="index.php?page=post&amp;s=list&amp;tags=red_bow">red_bow (12)</a></li>
  <li><h6>Tag List</h6></li>
</ul>
<img id="image" src="//safebooru.org/images/1/abc.png">
</body></html>"##;

#[test]
fn sections_profile_switches_category_on_headers() {
    let result = parse(
        SAFEBOORU_POST,
        &url("https://safebooru.org/index.php?page=post&s=view&id=1"),
        &profile("Safebooru (Org)"),
        &TagBlacklist::default(),
    );

    assert_eq!(values(&result, Copyright), vec!["touhou"]);
    assert_eq!(values(&result, Character), vec!["hakurei reimu"]);
    assert_eq!(values(&result, General), vec!["1girl", "red bow"]);
    assert!(values(&result, Other).is_empty());
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://safebooru.org/images/1/abc.png")
    );
}

const E621_POST: &str = r##"<html><head><title>wolf portrait - e621</title></head><body>
<section id="tag-list"><ul>
  <li class="tag-list-item" data-category="artist"><a class="tag-list-search" href="/posts?tags=somebody"><span>somebody</span> <span class="tag-list-count">12</span></a></li>
  <li class="tag-list-item" data-category="species"><a class="tag-list-search" href="#"><span>wolf</span><span class="tag-list-count">1k</span></a></li>
  <li class="tag-list-item" data-category="lore"><a class="tag-list-search" href="#"><span>lore_tag</span></a></li>
  <li class="tag-list-item" data-category="meta"><a class="tag-list-search" href="#"><span>hi res</span></a></li>
</ul></section>
<section id="image-container" data-title="Wolf portrait"><img id="image" src="//static1.e621.net/data/aa/bb/aabb.png"></section>
</body></html>"##;

#[test]
fn data_attribute_profile_with_e621_scheme() {
    let result = parse(
        E621_POST,
        &url("https://e621.net/posts/1"),
        &profile("e621"),
        &TagBlacklist::default(),
    );

    assert_eq!(values(&result, Other), vec!["somebody", "lore tag"]);
    assert_eq!(values(&result, General), vec!["wolf"]);
    assert_eq!(values(&result, Meta), vec!["hi res"]);
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://static1.e621.net/data/aa/bb/aabb.png")
    );
    assert_eq!(result.title.as_deref(), Some("Wolf portrait"));
}

const KONACHAN_POST: &str = r##"<html><head><title>Konachan.com - Anime Wallpapers | watercolor</title></head><body>
<ul id="tag-sidebar">
  <li class="tag-link" data-type="artist"><a href="/wiki/show">?</a> <a href="/post?tags=some_artist">some_artist</a></li>
  <li class="tag-link" data-type="style"><a href="#">?</a> <a href="#">watercolor</a></li>
  <li class="tag-link" data-type="character"><a href="#">?</a> <a href="#">tagme (character)</a></li>
  <li class="tag-link" data-type="circle"><a href="#">?</a> <a href="#">studio x</a></li>
</ul>
<img id="image" src="https://konachan.com/image/abc.jpg">
</body></html>"##;

#[test]
fn moebooru_scheme_and_site_ignores() {
    let result = parse(
        KONACHAN_POST,
        &url("https://konachan.com/post/show/1"),
        &profile("Konachan"),
        &TagBlacklist::default(),
    );

    assert_eq!(values(&result, Other), vec!["some artist", "studio x"]);
    assert_eq!(values(&result, Meta), vec!["watercolor"]);
    assert!(values(&result, Character).is_empty());
}

const ANIME_PICTURES_POST: &str = r##"<html><head><title>Anime picture | Anime-Pictures.net</title></head><body>
<ul class="tags">
  <li><a class="svelte-1a4tkgo copyright" href="#">touhou</a></li>
  <li><a class="svelte-1a4tkgo character" href="#">Hakurei Reimu</a></li>
  <li><a class="svelte-1a4tkgo artist" href="#">zun</a></li>
  <li><a class="svelte-1a4tkgo reference" href="#">red bow</a></li>
</ul>
<img id="big_preview" src="https://images.anime-pictures.net/abc.jpg" alt="Anime picture 1920x1080 with touhou hakurei reimu">
</body></html>"##;

#[test]
fn class_names_profile() {
    let result = parse(
        ANIME_PICTURES_POST,
        &url("https://anime-pictures.net/posts/1"),
        &profile("Anime-Pictures"),
        &TagBlacklist::default(),
    );

    assert_eq!(values(&result, Copyright), vec!["touhou"]);
    assert_eq!(values(&result, Character), vec!["Hakurei Reimu"]);
    assert_eq!(values(&result, Other), vec!["zun"]);
    assert_eq!(values(&result, General), vec!["red bow"]);
    assert_eq!(result.title.as_deref(), Some("touhou hakurei reimu"));
}

const ZEROCHAN_POST: &str = r##"<html><head><title>Zerochan Anime Image Board</title></head><body>
<div id="large">
  <a class="preview" href="https://static.zerochan.net/Saber.full.1.jpg"><img class="jpg" src="https://s1.zerochan.net/Saber.600.1.jpg" title="Saber (1200x1800 350kB)"></a>
  <p>Saber, Fate/stay night, , Type-Moon</p>
</div>
</body></html>"##;

#[test]
fn delimited_profile_and_title_fallback() {
    let result = parse(
        ZEROCHAN_POST,
        &url("https://www.zerochan.net/1"),
        &profile("Zerochan"),
        &TagBlacklist::default(),
    );

    assert_eq!(
        values(&result, General),
        vec!["Saber", "Fate/stay night", "Type-Moon"]
    );
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://static.zerochan.net/Saber.full.1.jpg")
    );
    assert_eq!(result.title.as_deref(), Some("Saber"));
}

const SHUUSHUU_POST: &str = r##"<html><head><title>e-shuushuu kawaii imageboard</title></head><body>
<div class="title"><h2><a href="/image/1/">Sakura in spring</a></h2></div>
<a class="thumb_image" href="/images/2024-01-01-1.jpeg"><img src="/thumbs/1.jpeg"></a>
<div class="meta"><dl>
  <dt>Submitted By:</dt><dd>someone</dd>
  <dt>Tags:</dt><dd class="quicktag"><span class="tag">"<a href="/tags/1">cherry blossoms</a>"</span> <span class="tag">"<a href="/tags/2">dress</a>"</span></dd>
  <dt>Source:</dt><dd class="quicktag"><span class="tag">"<a href="/tags/3">Cardcaptor Sakura</a>"</span></dd>
  <dt>Characters:</dt><dd class="quicktag"><span class="tag">"<a href="/tags/4">Kinomoto Sakura</a>"</span></dd>
  <dt>Artist:</dt><dd class="quicktag"><span class="tag">"<a href="/tags/5">Clamp</a>"</span></dd>
</dl></div>
</body></html>"##;

#[test]
fn definition_list_profile() {
    let result = parse(
        SHUUSHUU_POST,
        &url("https://e-shuushuu.net/image/1/"),
        &profile("E-Shuushuu"),
        &TagBlacklist::default(),
    );

    assert_eq!(values(&result, General), vec!["cherry blossoms", "dress"]);
    assert_eq!(values(&result, Copyright), vec!["Cardcaptor Sakura"]);
    assert_eq!(values(&result, Character), vec!["Kinomoto Sakura"]);
    assert_eq!(values(&result, Other), vec!["Clamp"]);
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://e-shuushuu.net/images/2024-01-01-1.jpeg")
    );
    assert_eq!(result.title.as_deref(), Some("Sakura in spring"));
}

#[test]
fn page_without_tags_warns() {
    let result = parse(
        "<html><head><title>Danbooru</title></head><body><p>nothing here</p></body></html>",
        &url("https://danbooru.donmai.us/posts/1"),
        &profile("Danbooru"),
        &TagBlacklist::default(),
    );

    assert!(result.tags.is_empty());
    assert_eq!(result.tags.categories().count(), 5);
    assert_eq!(result.warnings, vec![NO_TAGS_WARNING.to_string()]);
    assert_eq!(result.image_url, None);
}

#[test]
fn per_category_rule_from_declared_profile() {
    let mut selectors = BTreeMap::new();
    selectors.insert(Character, String::from(".chars a"));
    selectors.insert(General, String::from(".tags a"));

    let spec = ProfileSpec {
        name: String::from("Custom"),
        domain: String::from("custom.example"),
        hosts: Vec::new(),
        path_pattern: None,
        rank: 50,
        probe_url: None,
        mirror_host: None,
        tags: TagRuleSpec::PerCategory { selectors },
        image: vec![ImageSourceSpec::new("video", "data-src")],
        title: Vec::new(),
        ignore: Vec::new(),
    };
    let profile = SiteProfile::compile(&spec).unwrap();
    assert_eq!(profile.hosts, vec!["custom.example"]);
    assert_eq!(profile.probe_url, "https://custom.example/");

    let html = r##"<html><head><title>Clip #4 - custom</title></head><body>
        <div class="chars"><a href="#">Alice</a></div>
        <div class="tags"><a href="#">outdoors</a><a href="#">Outdoors</a></div>
        <video><source src="media/clip.webm"></video>
    </body></html>"##;

    let result = parse(html, &url("https://custom.example/clips/4"), &profile, &TagBlacklist::default());
    assert_eq!(values(&result, Character), vec!["Alice"]);
    assert_eq!(values(&result, General), vec!["outdoors"]);
    assert_eq!(
        result.image_url.as_deref(),
        Some("https://custom.example/clips/media/clip.webm")
    );
    assert_eq!(result.title.as_deref(), Some("Clip #4 - custom"));
}

#[test]
fn token_normalization() {
    assert_eq!(normalize_token("  hatsune_miku  "), "hatsune miku");
    assert_eq!(normalize_token("long hair (1.2k)"), "long hair");
    assert_eq!(normalize_token("red bow (12)"), "red bow");
    assert_eq!(normalize_token("? touhou"), "touhou");
    assert_eq!(normalize_token("a \t\n b"), "a b");
    assert_eq!(normalize_token("___"), "");
}

#[test]
fn media_urls_resolve_against_page() {
    let page = url("https://gelbooru.com/index.php?page=post&s=view&id=9");
    assert_eq!(
        resolve_media_url("//img3.gelbooru.com/a.png", &page).as_deref(),
        Some("https://img3.gelbooru.com/a.png")
    );
    assert_eq!(
        resolve_media_url("images/a.png", &page).as_deref(),
        Some("https://gelbooru.com/images/a.png")
    );
    assert_eq!(resolve_media_url("  ", &page), None);
}

#[test]
fn category_words_are_only_noise_in_class_lists() {
    let class_list = r##"<html><body><section id="tag-list"><ul>
        <li class="tag-type-5"><a class="search-tag" href="#">meta</a></li>
        <li class="tag-type-0"><a class="search-tag" href="#">General</a></li>
        <li class="tag-type-0"><a class="search-tag" href="#">smile</a></li>
    </ul></section></body></html>"##;

    let result = parse(
        class_list,
        &url("https://danbooru.donmai.us/posts/2"),
        &profile("Danbooru"),
        &TagBlacklist::default(),
    );
    assert!(values(&result, Meta).is_empty());
    assert_eq!(values(&result, General), vec!["smile"]);

    let mut selectors = BTreeMap::new();
    selectors.insert(Meta, String::from(".meta a"));
    selectors.insert(General, String::from(".tags a"));
    let spec = ProfileSpec {
        name: String::from("Custom"),
        domain: String::from("custom.example"),
        hosts: Vec::new(),
        path_pattern: None,
        rank: 50,
        probe_url: None,
        mirror_host: None,
        tags: TagRuleSpec::PerCategory { selectors },
        image: Vec::new(),
        title: Vec::new(),
        ignore: Vec::new(),
    };
    let custom = SiteProfile::compile(&spec).unwrap();

    let per_category = r##"<html><body>
        <div class="meta"><a href="#">meta</a></div>
        <div class="tags"><a href="#">general</a><a href="#">tags</a></div>
    </body></html>"##;

    let result = parse(per_category, &url("https://custom.example/p/1"), &custom, &TagBlacklist::default());
    assert_eq!(values(&result, Meta), vec!["meta"]);
    assert_eq!(values(&result, General), vec!["general", "tags"]);
}
