// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bw-prompt: budgeted instruction compilation
//!
//! Turns a [`PageSpec`](bw_core::PageSpec) and a [`StyleProfile`] into the
//! instruction and exclusion strings handed to the image generator. The
//! generator only reads a bounded prefix of its input, so fragments are
//! emitted in priority order and anything that does not fit is dropped
//! rather than truncated mid-fragment.

mod compiler;
mod fragment;
mod profile;
mod tokens;

pub use compiler::{Budget, CompileError, CompiledPrompt, CompiledText, InstructionCompiler};
pub use fragment::{DynamicPosition, Fragment, FragmentList, Tier};
pub use profile::{PageStyle, ProfileError, StyleProfile};
pub use tokens::TokenEstimate;
