use btx_common::TagCategory;
use clap::ValueEnum;

pub use clap;

pub mod cli;
pub mod error;
pub mod progress_bars;

/// Tag category as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct CategoryArg(pub TagCategory);

impl ValueEnum for CategoryArg {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self(TagCategory::Copyright),
            Self(TagCategory::Character),
            Self(TagCategory::General),
            Self(TagCategory::Meta),
            Self(TagCategory::Other),
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        let value = clap::builder::PossibleValue::new(self.0.as_str());
        Some(match self.0 {
            TagCategory::Copyright => value.help("Series or franchise the post belongs to"),
            TagCategory::Character => value.help("Characters depicted in the post"),
            TagCategory::General => value.help("Descriptive tags"),
            TagCategory::Meta => value.help("Tags about the file itself"),
            TagCategory::Other => value.help("Artists and anything left uncategorized"),
        })
    }
}
