// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic generator: picks an unused topic and emits one pending job for it.
//!
//! Reservation comes first. If the descriptor cannot be enqueued afterwards,
//! the reservation is compensated with a ledger release so the topic is not
//! lost.

use crate::seed::scene_seed;
use bw_core::{Catalog, Clock, JobDescriptor, JobId, PageSpec, SystemClock, TopicEntry};
use bw_storage::{JobStore, Ledger, LedgerError, StoreError};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Items listed in the cover scene.
const COVER_ITEMS: usize = 4;

/// Characters of the job id suffix shown in titles.
const TITLE_SHORT_LEN: usize = 8;

/// Errors from job generation
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("all catalog topics have been used; reset the ledger to start over")]
    Exhausted,
    #[error("topic '{0}' was reserved concurrently by another generator")]
    Contended(String),
    #[error("pages per job must be at least 2 (cover plus content), got {0}")]
    InvalidPageCount(usize),
    #[error("ledger error: {0}")]
    Ledger(LedgerError),
    #[error("job store error: {0}")]
    Store(#[from] StoreError),
}

impl From<LedgerError> for GeneratorError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::Exhausted => GeneratorError::Exhausted,
            other => GeneratorError::Ledger(other),
        }
    }
}

/// How the next topic is picked from the unused ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// First unused topic in catalog order.
    #[default]
    First,
    Random,
}

/// What to do when every topic has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExhausted {
    /// Fail with [`GeneratorError::Exhausted`].
    #[default]
    Stop,
    /// Reset the ledger (logged at warn) and start over.
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub pages_per_job: usize,
    pub selection: Selection,
    pub on_exhausted: OnExhausted,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self { pages_per_job: 12, selection: Selection::First, on_exhausted: OnExhausted::Stop }
    }
}

pub struct TopicGenerator<C: Clock = SystemClock> {
    catalog: Catalog,
    ledger: Ledger<C>,
    store: Arc<JobStore<C>>,
    config: GeneratorConfig,
    clock: C,
}

impl<C: Clock> TopicGenerator<C> {
    pub fn new(
        catalog: Catalog,
        ledger: Ledger<C>,
        store: Arc<JobStore<C>>,
        config: GeneratorConfig,
        clock: C,
    ) -> Result<Self, GeneratorError> {
        if config.pages_per_job < 2 {
            return Err(GeneratorError::InvalidPageCount(config.pages_per_job));
        }
        Ok(Self { catalog, ledger, store, config, clock })
    }

    pub fn ledger(&self) -> &Ledger<C> {
        &self.ledger
    }

    /// Reserve an unused topic and enqueue a pending job for it.
    pub fn generate(&mut self) -> Result<JobDescriptor, GeneratorError> {
        let topic = self.pick_topic()?;
        if !self.ledger.reserve(&topic.topic_id)? {
            return Err(GeneratorError::Contended(topic.topic_id));
        }

        let created_at_ms = self.clock.epoch_ms();
        let descriptor =
            build_descriptor(&topic, JobId::new(), self.config.pages_per_job, created_at_ms);
        if let Err(e) = self.store.enqueue(&descriptor) {
            let reason = format!("enqueue of {} failed: {e}", descriptor.job_id);
            if let Err(release_err) = self.ledger.release(&topic.topic_id, &reason) {
                error!(
                    topic_id = %topic.topic_id,
                    error = %release_err,
                    "failed to release reservation after enqueue failure"
                );
            }
            return Err(e.into());
        }

        info!(
            job_id = %descriptor.job_id,
            topic_id = %topic.topic_id,
            pages = descriptor.pages.len(),
            "generated job"
        );
        Ok(descriptor)
    }

    fn pick_topic(&mut self) -> Result<TopicEntry, GeneratorError> {
        let unused = match self.ledger.list_unused(&self.catalog) {
            Ok(unused) => unused,
            Err(LedgerError::Exhausted) if self.config.on_exhausted == OnExhausted::Reset => {
                warn!(topics = self.catalog.len(), "topic catalog exhausted, resetting ledger");
                self.ledger.reset()?;
                self.ledger.list_unused(&self.catalog)?
            }
            Err(e) => return Err(e.into()),
        };
        let picked = match self.config.selection {
            Selection::First => unused.first(),
            Selection::Random => unused.choose(&mut rand::rng()),
        };
        picked.map(|t| (*t).clone()).ok_or(GeneratorError::Exhausted)
    }
}

/// Build the descriptor for `topic`: a cover page followed by
/// `pages_per_job - 1` content pages.
pub fn build_descriptor(
    topic: &TopicEntry,
    job_id: JobId,
    pages_per_job: usize,
    created_at_ms: u64,
) -> JobDescriptor {
    let title = format!(
        "{} Coloring Book {}",
        topic.display_name,
        job_id.short(TITLE_SHORT_LEN).to_uppercase()
    );
    JobDescriptor {
        title,
        topic_id: topic.topic_id.clone(),
        pages: build_pages(topic, &job_id, pages_per_job),
        created_at_ms,
        state: Default::default(),
        job_id,
    }
}

/// Cover plus one content page per item.
///
/// Items are used in catalog order without repeats; only when the topic has
/// fewer items than content pages does the list wrap around. Scenes come
/// from the topic's actions and locations, picked by [`scene_seed`], so the
/// same job id always yields the same pages.
pub fn build_pages(topic: &TopicEntry, job_id: &JobId, pages_per_job: usize) -> Vec<PageSpec> {
    let mut pages = Vec::with_capacity(pages_per_job);
    if pages_per_job == 0 {
        return pages;
    }

    let listed: Vec<&str> = topic.items.iter().take(COVER_ITEMS).map(String::as_str).collect();
    pages.push(PageSpec::cover(
        format!("{} collection", topic.display_name),
        format!("{} together", listed.join(", ")),
    ));

    pages.extend(
        topic
            .items
            .iter()
            .cycle()
            .take(pages_per_job - 1)
            .enumerate()
            .map(|(offset, item)| {
                let scene = content_scene(topic, item, scene_seed(job_id, offset + 1));
                PageSpec::content(item.as_str(), scene)
            }),
    );
    pages
}

/// "<action> <location>" when the topic has both lists, whichever one it
/// has otherwise, and the bare item for topics without scene lists.
fn content_scene(topic: &TopicEntry, item: &str, seed: u64) -> String {
    let action = pick(&topic.actions, seed);
    let location = pick(&topic.locations, seed >> 32);
    match (action, location) {
        (Some(action), Some(location)) => format!("{action} {location}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => item.to_string(),
    }
}

fn pick(list: &[String], seed: u64) -> Option<&str> {
    if list.is_empty() {
        return None;
    }
    let index = (seed % list.len() as u64) as usize;
    list.get(index).map(String::as_str)
}

#[cfg(test)]
#[path = "topic_generator_tests.rs"]
mod tests;
