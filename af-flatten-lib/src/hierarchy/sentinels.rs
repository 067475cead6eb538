use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Placeholder used for a top-level element without a usable name, in the legacy style.
pub const UNNAMED_TOP_LEVEL_ELEMENT: &str = "(unnamed element)";

/// Placeholder used for any other node without a usable name.
pub const UNNAMED: &str = "(unnamed)";

/// Selects which placeholder names are substituted for unnamed nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[value(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SentinelStyle {
    /// Top-level elements become `(unnamed element)`; nested elements and
    /// attributes become `(unnamed)`.
    #[default]
    Legacy,

    /// Every unnamed node becomes `(unnamed)`.
    Unified,
}

/// The placeholder names substituted for absent or blank node names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnnamedSentinels {
    pub top_level_element: &'static str,
    pub nested_element: &'static str,
    pub attribute: &'static str,
}

impl UnnamedSentinels {
    #[must_use]
    pub const fn for_style(style: SentinelStyle) -> Self {
        match style {
            SentinelStyle::Legacy => Self {
                top_level_element: UNNAMED_TOP_LEVEL_ELEMENT,
                nested_element: UNNAMED,
                attribute: UNNAMED,
            },
            SentinelStyle::Unified => Self {
                top_level_element: UNNAMED,
                nested_element: UNNAMED,
                attribute: UNNAMED,
            },
        }
    }

    pub(super) const fn element(&self, top_level: bool) -> &'static str {
        if top_level { self.top_level_element } else { self.nested_element }
    }
}

impl Default for UnnamedSentinels {
    fn default() -> Self {
        Self::for_style(SentinelStyle::default())
    }
}
