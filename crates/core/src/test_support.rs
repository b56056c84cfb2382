// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Catalog, TopicEntry};

/// Proptest strategies for core data model types.
pub mod strategies {
    use crate::job::{JobDescriptor, JobId, JobState, PageSpec};
    use proptest::prelude::*;

    pub fn arb_word() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    pub fn arb_page_spec() -> impl Strategy<Value = PageSpec> {
        (any::<bool>(), "[a-z]{1,8}( [a-z]{1,8}){0,3}", "[a-z]{1,8}( [a-z]{1,8}){0,5}")
            .prop_map(|(is_cover, subject, scene)| PageSpec { is_cover, subject, scene })
    }

    pub fn arb_job_id() -> impl Strategy<Value = JobId> {
        "[a-z0-9]{6,12}".prop_map(|s| JobId::from_string(format!("job-{s}")))
    }

    pub fn arb_descriptor() -> impl Strategy<Value = JobDescriptor> {
        (arb_job_id(), arb_word(), prop::collection::vec(arb_page_spec(), 0..8), 0u64..u64::MAX / 2)
            .prop_map(|(job_id, topic_id, pages, created_at_ms)| JobDescriptor {
                job_id,
                title: format!("{topic_id} book"),
                topic_id,
                pages,
                created_at_ms,
                state: JobState::Pending,
            })
    }
}

/// The two-topic catalog used throughout the pipeline scenarios.
pub fn fruit_and_animal_catalog() -> Catalog {
    Catalog::new(vec![
        TopicEntry::new("fruit", "Fruit", ["apple", "pear"]),
        TopicEntry::new("animal", "Animal", ["cat", "dog"]),
    ])
    .unwrap_or_default()
}
