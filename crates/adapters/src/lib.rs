// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bw-adapters: external collaborators of the pipeline

pub mod assembler;
pub mod generator;
pub mod image;
pub mod subprocess;

pub use assembler::{AssemblerAdapter, AssemblyError, CommandAssembler};
pub use generator::{CommandGenerator, GenerationError, GeneratorAdapter, ImageRequest};
pub use image::RasterImage;
pub use subprocess::CommandSpec;

#[cfg(any(test, feature = "test-support"))]
pub use assembler::{AssembleCall, FakeAssembler};
#[cfg(any(test, feature = "test-support"))]
pub use generator::FakeGenerator;
