// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-page seeds derived from the job id, stable across reprocessing.

use bw_core::JobId;
use sha2::{Digest, Sha256};

/// Seed for one page: first 8 bytes of `sha256("{job_id}:{page_index}")`.
pub fn page_seed(job_id: &JobId, page_index: usize) -> u64 {
    digest_u64(&format!("{job_id}:{page_index}"))
}

/// Seed for picking one page's scene, independent of its image seed.
pub fn scene_seed(job_id: &JobId, page_index: usize) -> u64 {
    digest_u64(&format!("{job_id}:{page_index}:scene"))
}

fn digest_u64(input: &str) -> u64 {
    let digest = Sha256::digest(input.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
