//! All internal logic for turning booru post pages into categorized tag sets.
//!
//! The pieces, from the outside in:
//! * [`extractor`]: the orchestrator callers talk to.
//! * [`registry`] and [`extractor_config`]: which site a URL belongs to and how its pages are laid out.
//! * [`gateway`]: outbound HTTP with browser headers and failure classification.
//! * [`parser`] and [`generic`]: HTML to tags, for known and unknown sites.

extern crate btx_common;

pub mod blacklist;
pub mod error;
pub mod extractor;
pub mod extractor_config;
pub mod gateway;
pub mod generic;
pub mod parser;
pub mod prelude;
pub mod registry;

pub use crate::extractor::TagExtractor;
pub use crate::gateway::{FetchGateway, PageSource};
pub use crate::registry::SiteRegistry;
