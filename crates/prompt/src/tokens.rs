// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token cost estimation.

use serde::{Deserialize, Serialize};

/// How fragment cost is measured against a budget.
///
/// Both estimates are word based, so a joined string never costs more than
/// its fragments plus its separators counted one by one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenEstimate {
    /// One unit per whitespace-separated word.
    Words,
    /// CLIP text encoder estimate: `ceil(words * 4 / 3)`.
    #[default]
    Clip,
}

impl TokenEstimate {
    /// Cost of `text`. Punctuation-only tokens such as a bare `,` or `|`
    /// are free.
    pub fn count(self, text: &str) -> usize {
        let words = text
            .split_whitespace()
            .filter(|word| word.chars().any(char::is_alphanumeric))
            .count();
        match self {
            TokenEstimate::Words => words,
            TokenEstimate::Clip => (words * 4).div_ceil(3),
        }
    }
}

bw_core::simple_display! {
    TokenEstimate {
        Words => "words",
        Clip => "clip",
    }
}

#[cfg(test)]
#[path = "tokens_tests.rs"]
mod tests;
