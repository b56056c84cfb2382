// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-tiered instruction fragments.

use serde::Deserialize;

/// Priority tier of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Always emitted; must fit the budget on its own.
    Essential,
    /// Emitted in order until the first one that does not fit.
    Important,
    /// Same rule as important, using whatever budget is left.
    Optional,
}

bw_core::simple_display! {
    Tier {
        Essential => "essential",
        Important => "important",
        Optional => "optional",
    }
}

/// A piece of instruction text with its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub tier: Tier,
}

impl Fragment {
    pub fn new(text: impl Into<String>, tier: Tier) -> Self {
        Self { text: text.into(), tier }
    }

    pub fn essential(text: impl Into<String>) -> Self {
        Self::new(text, Tier::Essential)
    }

    pub fn important(text: impl Into<String>) -> Self {
        Self::new(text, Tier::Important)
    }

    pub fn optional(text: impl Into<String>) -> Self {
        Self::new(text, Tier::Optional)
    }
}

/// Where the page's subject/scene fragment sits in the priority order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicPosition {
    /// Right after the essential fragments, before any important one.
    #[default]
    AfterEssential,
    /// After the important fragments, before the optional ones.
    AfterImportant,
    /// After everything else.
    AfterOptional,
    /// No dynamic content in this list (typical for exclusions).
    Omit,
}

/// Stage of budgeted concatenation following the essential fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Dynamic,
    Tier(Tier),
}

/// Ordered fragments plus the position of the dynamic content fragment.
///
/// Deserialized from tier-grouped TOML:
///
/// ```toml
/// dynamic = "after_essential"
/// essential = ["black white line art", "coloring book page"]
/// important = ["thick outlines only"]
/// optional = ["simple", "bold lines"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "FragmentListFile")]
pub struct FragmentList {
    fragments: Vec<Fragment>,
    dynamic: DynamicPosition,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FragmentListFile {
    #[serde(default)]
    dynamic: Option<DynamicPosition>,
    #[serde(default)]
    essential: Vec<String>,
    #[serde(default)]
    important: Vec<String>,
    #[serde(default)]
    optional: Vec<String>,
}

impl From<FragmentListFile> for FragmentList {
    fn from(file: FragmentListFile) -> Self {
        let fragments = file
            .essential
            .into_iter()
            .map(Fragment::essential)
            .chain(file.important.into_iter().map(Fragment::important))
            .chain(file.optional.into_iter().map(Fragment::optional))
            .collect();
        Self { fragments, dynamic: file.dynamic.unwrap_or_default() }
    }
}

impl FragmentList {
    pub fn new(fragments: Vec<Fragment>, dynamic: DynamicPosition) -> Self {
        Self { fragments, dynamic }
    }

    pub fn dynamic(&self) -> DynamicPosition {
        self.dynamic
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Fragments of one tier, in declared order.
    pub fn tier(&self, tier: Tier) -> impl Iterator<Item = &str> {
        self.fragments.iter().filter(move |f| f.tier == tier).map(|f| f.text.as_str())
    }

    /// Non-essential stages in priority order.
    pub(crate) fn stages(&self) -> &'static [Stage] {
        const IMPORTANT: Stage = Stage::Tier(Tier::Important);
        const OPTIONAL: Stage = Stage::Tier(Tier::Optional);
        match self.dynamic {
            DynamicPosition::AfterEssential => &[Stage::Dynamic, IMPORTANT, OPTIONAL],
            DynamicPosition::AfterImportant => &[IMPORTANT, Stage::Dynamic, OPTIONAL],
            DynamicPosition::AfterOptional => &[IMPORTANT, OPTIONAL, Stage::Dynamic],
            DynamicPosition::Omit => &[IMPORTANT, OPTIONAL],
        }
    }
}
