// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic catalog: the immutable source of content variety.
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! [[topic]]
//! id = "fruits"
//! name = "Fruits"
//! items = ["Apple", "Banana", "Pear"]
//!
//! [[topic]]
//! id = "dogs"
//! name = "Dogs"
//! items = ["Husky", "Beagle"]
//! actions = ["playing", "sleeping"]
//! locations = ["in park", "at home"]
//! ```
//!
//! `actions` and `locations` are optional; content pages of a topic that has
//! them get a scene such as "playing in park".

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading or validating a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("topic id must not be empty")]
    EmptyId,
    #[error("duplicate topic id '{0}'")]
    DuplicateTopic(String),
    #[error("topic '{0}' has no items")]
    EmptyItems(String),
}

/// One themed content unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntry {
    #[serde(rename = "id")]
    pub topic_id: String,
    #[serde(rename = "name")]
    pub display_name: String,
    pub items: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
}

impl TopicEntry {
    pub fn new(
        topic_id: impl Into<String>,
        display_name: impl Into<String>,
        items: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            display_name: display_name.into(),
            items: items.into_iter().map(Into::into).collect(),
            actions: Vec::new(),
            locations: Vec::new(),
        }
    }

    /// Give content pages action/location scenes.
    pub fn with_scenes(
        mut self,
        actions: impl IntoIterator<Item = impl Into<String>>,
        locations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.actions = actions.into_iter().map(Into::into).collect();
        self.locations = locations.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "topic")]
    topics: Vec<TopicEntry>,
}

/// Validated, ordered list of topics. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    topics: Vec<TopicEntry>,
}

impl Catalog {
    /// Build a catalog, rejecting empty ids, duplicate ids and topics without
    /// items. Blank items, actions and locations are dropped.
    pub fn new(topics: Vec<TopicEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        let mut validated = Vec::with_capacity(topics.len());
        for mut topic in topics {
            if topic.topic_id.trim().is_empty() {
                return Err(CatalogError::EmptyId);
            }
            if !seen.insert(topic.topic_id.clone()) {
                return Err(CatalogError::DuplicateTopic(topic.topic_id));
            }
            topic.items.retain(|item| !item.trim().is_empty());
            topic.actions.retain(|action| !action.trim().is_empty());
            topic.locations.retain(|location| !location.trim().is_empty());
            if topic.items.is_empty() {
                return Err(CatalogError::EmptyItems(topic.topic_id));
            }
            validated.push(topic);
        }
        Ok(Self { topics: validated })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.topics)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn topics(&self) -> &[TopicEntry] {
        &self.topics
    }

    pub fn get(&self, topic_id: &str) -> Option<&TopicEntry> {
        self.topics.iter().find(|t| t.topic_id == topic_id)
    }

    /// Topic ids in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|t| t.topic_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
