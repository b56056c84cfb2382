// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bw-storage: durable state for the bookworks pipeline
//!
//! - [`Ledger`]: append-only record of used topics
//! - [`JobStore`]: directory-backed job descriptors

mod files;
mod ledger;
mod store;

pub use ledger::{Ledger, LedgerError, LedgerRecord, UsedTopic};
pub use store::{FailureRecord, JobStore, Location, StoreCounts, StoreError};
