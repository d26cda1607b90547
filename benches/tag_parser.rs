use std::fmt::Write;

use btx_extractors::{
    blacklist::TagBlacklist, extractor_config::DEFAULT_PROFILES, generic::parse_generic,
    parser::parse, registry::SiteProfile,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};
use url::Url;

const TAGS: [&str; 27] = [
    "dog",
    "cat",
    "anthro",
    "gore",
    "male",
    "female",
    "skadi_(arknights)",
    "colored_nails",
    "claws",
    "abs",
    "shirt",
    "sex",
    "tall",
    "abstract",
    "pokemon",
    "human",
    "wolf",
    "fox",
    "cervid",
    "deer",
    "whale",
    "helicopter",
    "sword",
    "gun",
    "blood",
    "painting",
    "breasts",
];

const TAG_TYPES: [u8; 5] = [0, 1, 3, 4, 5];

/// Builds a Danbooru-like post page holding `num` tags.
fn seed_page(num: usize) -> String {
    let mut rng = thread_rng();
    let mut page = String::from(
        "<html><head><title>bench post - Danbooru</title></head><body><section id=\"tag-list\"><ul>",
    );

    for i in 0..num {
        let tag = TAGS.choose(&mut rng).unwrap_or(&"tag");
        let tag_type = TAG_TYPES.choose(&mut rng).unwrap_or(&0);
        let count = rng.gen_range(1..5000);
        let _ = write!(
            page,
            r#"<li class="tag-type-{tag_type}"><a class="search-tag" href="/posts?tags={tag}">{tag}_{i}</a> <span class="post-count">{count}</span></li>"#
        );
    }

    page.push_str(
        r#"</ul></section><section id="content"><img id="image" src="/data/sample.jpg" width="850" height="1200"></section></body></html>"#,
    );
    page
}

fn seed_blacklist() -> TagBlacklist {
    let mut rng = thread_rng();
    let size = rng.gen_range(1..=8);
    TagBlacklist::new(TAGS.choose_multiple(&mut rng, size).copied())
}

fn tag_parser_bench(c: &mut Criterion) {
    let Some(spec) = DEFAULT_PROFILES.iter().find(|p| p.name == "Danbooru") else {
        return;
    };
    let Ok(profile) = SiteProfile::compile(spec) else {
        return;
    };
    let Ok(page_url) = Url::parse("https://danbooru.donmai.us/posts/1") else {
        return;
    };

    for num in [20, 100, 1000] {
        let page = seed_page(num);
        let blacklist = seed_blacklist();

        c.bench_function(&format!("Parse {num} tags"), |b| {
            b.iter(|| parse(black_box(&page), &page_url, &profile, &blacklist));
        });
        c.bench_function(&format!("Generic parse {num} tags"), |b| {
            b.iter(|| parse_generic(black_box(&page), &page_url, &blacklist));
        });
    }
}

criterion_group!(benches, tag_parser_bench);
criterion_main!(benches);
