use std::sync::Arc;

use btx_common::{ExtractionRequest, ExtractionResult, TagCategory};
use btx_core::AppConfig;
use btx_extractors::registry::SiteRegistry;
use clap::Args;
use log::debug;

use crate::{cli::extra::validate_target, error::CliError, CategoryArg};

#[derive(Debug, Args)]
pub struct Extract {
    /// URL of the post page
    #[clap(value_parser = validate_target, value_name = "URL")]
    pub url: String,

    /// Use the generic extractor when no site profile matches the URL
    #[clap(long, value_parser, default_value_t = false, help_heading = "EXTRACT")]
    pub allow_unsupported: bool,

    /// Drop every tag containing this text (can be repeated)
    #[clap(short, long, value_name = "TAG", help_heading = "EXTRACT")]
    pub blacklist: Vec<String>,

    /// Only print these categories
    #[clap(long, value_enum, value_name = "CATEGORY", help_heading = "OUTPUT")]
    pub only: Vec<CategoryArg>,

    /// Print the raw JSON result
    #[clap(long, value_parser, default_value_t = false, help_heading = "OUTPUT")]
    pub json: bool,
}

impl Extract {
    pub fn request(&self) -> ExtractionRequest {
        ExtractionRequest {
            target_url: self.url.clone(),
            allow_unsupported_sites: self.allow_unsupported,
            blacklist: self.blacklist.clone(),
        }
    }

    /// Categories selected for display, all of them when `--only` was not given.
    pub fn categories(&self) -> Vec<TagCategory> {
        if self.only.is_empty() {
            return TagCategory::ALL.to_vec();
        }
        TagCategory::ALL
            .into_iter()
            .filter(|cat| self.only.iter().any(|arg| arg.0 == *cat))
            .collect()
    }

    pub async fn run(
        &self,
        config: &AppConfig,
        registry: Arc<SiteRegistry>,
    ) -> Result<ExtractionResult, CliError> {
        let extractor = config.extractor(registry)?;
        debug!("Extracting tags from {}", self.url);
        Ok(extractor.extract(&self.request()).await?)
    }
}
