// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bw-core: Core data model for the bookworks content pipeline

pub mod macros;

pub mod catalog;
pub mod clock;
pub mod id;
pub mod job;
pub mod time_fmt;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use catalog::{Catalog, CatalogError, TopicEntry};
pub use clock::{Clock, FakeClock, SystemClock};
#[cfg(any(test, feature = "test-support"))]
pub use job::JobDescriptorBuilder;
pub use job::{JobDescriptor, JobId, JobState, PageSpec};
pub use time_fmt::{format_elapsed, format_epoch_ms, format_utc_now};
