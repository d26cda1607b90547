//! Resolution of post URLs to site profiles.
use ahash::AHashMap;
use log::debug;
use url::Url;

use crate::{
    error::RegistryError,
    extractor_config::{ProfileSpec, DEFAULT_PROFILES},
};

pub mod profile;

pub use profile::{ImageSource, SiteProfile, TagRule, TitleSource};

/// Lowercases a hostname and strips a leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Ordered, immutable collection of compiled site profiles.
///
/// Built once at startup and shared read-only between requests.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    profiles: Vec<SiteProfile>,
}

impl SiteRegistry {
    /// Compiles `specs` in order.
    ///
    /// # Errors
    /// Fails on the first invalid selector or path pattern, and when two profiles claim the
    /// same host while either lacks a path pattern or both use the same one.
    pub fn new(specs: &[ProfileSpec]) -> Result<Self, RegistryError> {
        let profiles = specs
            .iter()
            .map(SiteProfile::compile)
            .collect::<Result<Vec<_>, _>>()?;

        check_ambiguity(&profiles)?;

        debug!("Site registry loaded with {} profiles", profiles.len());

        Ok(Self { profiles })
    }

    /// Registry holding only the built-in catalog.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        Self::new(&DEFAULT_PROFILES)
    }

    /// Finds the first profile claiming `url`.
    pub fn resolve(&self, url: &Url) -> Option<&SiteProfile> {
        let host = normalize_host(url.host_str()?);
        let path_and_query = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        self.profiles
            .iter()
            .find(|profile| profile.matches(&host, &path_and_query))
    }

    /// Profiles in match order.
    pub fn profiles(&self) -> &[SiteProfile] {
        &self.profiles
    }

    /// Profiles ordered by rank, ties keeping match order.
    pub fn ranked(&self) -> Vec<&SiteProfile> {
        let mut ranked: Vec<&SiteProfile> = self.profiles.iter().collect();
        ranked.sort_by_key(|p| p.rank);
        ranked
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn check_ambiguity(profiles: &[SiteProfile]) -> Result<(), RegistryError> {
    let mut claims: AHashMap<&str, Vec<usize>> = AHashMap::new();

    for (idx, profile) in profiles.iter().enumerate() {
        for host in &profile.hosts {
            let owners = claims.entry(host.as_str()).or_default();
            if owners.contains(&idx) {
                continue;
            }

            for &other_idx in owners.iter() {
                let other = &profiles[other_idx];
                let clash = match (&other.path_pattern, &profile.path_pattern) {
                    (Some(a), Some(b)) => a.as_str() == b.as_str(),
                    _ => true,
                };

                if clash {
                    return Err(RegistryError::AmbiguousHost {
                        host: host.clone(),
                        first: other.name.clone(),
                        second: profile.name.clone(),
                    });
                }
            }
            owners.push(idx);
        }
    }

    Ok(())
}
