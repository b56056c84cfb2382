// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Style profiles: fragment lists per page kind.

use crate::fragment::FragmentList;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading a style profile
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to read style profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid style profile: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Instruction and exclusion fragments for one kind of page.
///
/// The exclusion list never receives the page's dynamic content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageStyle {
    #[serde(default)]
    pub instruction: FragmentList,
    #[serde(default)]
    pub exclusions: FragmentList,
}

/// Complete style profile, authored as TOML:
///
/// ```toml
/// separator = ", "
///
/// [cover.instruction]
/// essential = ["colorful illustration", "book cover"]
///
/// [cover.exclusions]
/// essential = ["text", "words"]
///
/// [content.instruction]
/// dynamic = "after_essential"
/// essential = ["black white line art"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StyleProfile {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub cover: PageStyle,
    #[serde(default)]
    pub content: PageStyle,
}

fn default_separator() -> String {
    ", ".to_string()
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            cover: PageStyle::default(),
            content: PageStyle::default(),
        }
    }
}

impl StyleProfile {
    pub fn from_toml_str(content: &str) -> Result<Self, ProfileError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ProfileError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn page_style(&self, is_cover: bool) -> &PageStyle {
        if is_cover {
            &self.cover
        } else {
            &self.content
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
