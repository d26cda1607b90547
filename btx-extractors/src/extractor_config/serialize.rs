//! Extra site profiles loaded from a TOML catalog.
//!
//! ```toml
//! [sites.scatbooru]
//! name = "Scatbooru"
//! domain = "scatbooru.co.uk"
//! path_pattern = '^/(index\.php)?\?page=post&s=view&id=\d+'
//! rank = 40
//!
//! [sites.scatbooru.tags]
//! kind = "sections"
//! container = "#tag-sidebar"
//! link = 'a[href*="page=post"]'
//! ```
use log::debug;
use serde::Deserialize;
use std::{collections::BTreeMap, fs::read_to_string, fs::File, io::Write, path::Path};

use super::ProfileSpec;
use crate::error::RegistryError;

const SAMPLE_CATALOG_TOML: &str = include_str!("sample.toml");

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    sites: BTreeMap<String, ProfileSpec>,
}

/// Parses a catalog from its TOML text. Profiles come back ordered by rank.
pub fn parse_catalog(contents: &str) -> Result<Vec<ProfileSpec>, RegistryError> {
    let catalog: Catalog = toml::from_str(contents)?;

    let mut profiles: Vec<ProfileSpec> = catalog.sites.into_values().collect();
    profiles.sort_by_key(|p| p.rank);

    Ok(profiles)
}

/// Appends the profiles declared in the catalog file at `path` to `profiles`.
///
/// A commented sample catalog is written when the file does not exist yet.
pub fn read_catalog_file(path: &Path, profiles: &mut Vec<ProfileSpec>) -> Result<(), RegistryError> {
    if !path.exists() {
        let mut sample = File::create(path)?;
        sample.write_all(SAMPLE_CATALOG_TOML.as_bytes())?;
    }

    let contents = read_to_string(path)?;
    let extra = parse_catalog(&contents)?;

    debug!(
        "Catalog {} declares {} extra sites",
        path.display(),
        extra.len()
    );

    profiles.extend(extra);
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::extractor_config::TagRuleSpec;
    use btx_common::TagCategory;

    #[test]
    fn sample_catalog_is_empty() {
        assert!(parse_catalog(SAMPLE_CATALOG_TOML).unwrap().is_empty());
    }

    #[test]
    fn parses_sites_sorted_by_rank() {
        let toml = r##"
            [sites.zeta]
            name = "Zeta"
            domain = "zeta.example"
            rank = 50
            [sites.zeta.tags]
            kind = "class_names"
            items = "ul.tags a"

            [sites.alpha]
            name = "Alpha"
            domain = "alpha.example"
            hosts = ["alpha.example", "img.alpha.example"]
            path_pattern = '^/p/\d+'
            rank = 20
            image = [{ selector = "#main-image" }]
            [sites.alpha.tags]
            kind = "per_category"
            [sites.alpha.tags.selectors]
            character = ".char a"
            general = ".tags a"
        "##;

        let profiles = parse_catalog(toml).unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].name, "Alpha");
        assert_eq!(profiles[0].image[0].attribute, "src");
        assert_eq!(profiles[1].name, "Zeta");

        let TagRuleSpec::PerCategory { selectors } = &profiles[0].tags else {
            panic!("expected per_category rule");
        };
        assert_eq!(selectors.get(&TagCategory::Character).unwrap(), ".char a");
    }

    #[test]
    fn rejects_unknown_rule_kind() {
        let toml = r#"
            [sites.broken]
            name = "Broken"
            domain = "broken.example"
            [sites.broken.tags]
            kind = "telepathy"
        "#;
        assert!(matches!(
            parse_catalog(toml),
            Err(RegistryError::CatalogParse { .. })
        ));
    }
}
