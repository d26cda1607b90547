pub use crate::blacklist::TagBlacklist;
pub use crate::error::{ExtractorError, RegistryError};
pub use crate::extractor::TagExtractor;
pub use crate::extractor_config::{ProfileSpec, DEFAULT_PROFILES};
pub use crate::gateway::{FetchGateway, FetchOutcome, FetchedBody, PageSource, ProbeMethod};
pub use crate::registry::{SiteProfile, SiteRegistry};
pub use btx_common::{ExtractionRequest, ExtractionResult, TagCategory};
