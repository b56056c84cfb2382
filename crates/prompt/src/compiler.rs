// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Priority-tiered budgeted concatenation.
//!
//! For each fragment list:
//! 1. all essential fragments, in declared order (must fit on their own);
//! 2. the remaining stages (dynamic content, important, optional) in the
//!    order fixed by the list's [`DynamicPosition`]. Within a stage,
//!    fragments are appended in order while the running cost stays within
//!    budget; the first fragment that would overflow closes the stage, so
//!    anything dropped is always a suffix of that stage.
//!
//! Every join is charged the separator's own cost, so a wordy separator
//! eats into the budget like any other fragment.
//!
//! Output order equals priority order.

use crate::fragment::{FragmentList, Stage, Tier};
use crate::profile::StyleProfile;
use crate::tokens::TokenEstimate;
use bw_core::PageSpec;
use serde::Deserialize;
use thiserror::Error;

/// Errors from compiling instructions
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("essential fragments of {list} cost {cost} but the budget is {budget}")]
    BudgetViolation { list: String, cost: usize, budget: usize },
    #[error("{list} contains an empty fragment")]
    EmptyFragment { list: String },
}

/// Token budgets for the two compiled strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Budget {
    pub instruction: usize,
    pub exclusions: usize,
    pub counter: TokenEstimate,
}

impl Default for Budget {
    fn default() -> Self {
        Self { instruction: 77, exclusions: 77, counter: TokenEstimate::Clip }
    }
}

/// One compiled string with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledText {
    pub text: String,
    /// Cost of the included fragments plus one separator per join; never
    /// above the budget.
    pub cost: usize,
    /// Fragments left out for lack of budget, in priority order.
    pub dropped: Vec<String>,
}

/// Result of compiling one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPrompt {
    pub instruction: CompiledText,
    pub exclusions: CompiledText,
}

impl CompiledPrompt {
    pub fn into_strings(self) -> (String, String) {
        (self.instruction.text, self.exclusions.text)
    }
}

/// Pure, deterministic compiler over a style profile and budgets.
#[derive(Debug, Clone)]
pub struct InstructionCompiler {
    profile: StyleProfile,
    budget: Budget,
}

impl InstructionCompiler {
    pub fn new(profile: StyleProfile, budget: Budget) -> Self {
        Self { profile, budget }
    }

    pub fn profile(&self) -> &StyleProfile {
        &self.profile
    }

    pub fn budget(&self) -> Budget {
        self.budget
    }

    /// Check every fragment list of the profile against the budgets.
    ///
    /// Run once at startup so authoring errors surface before any job.
    pub fn validate(&self) -> Result<(), CompileError> {
        for (kind, style) in [("cover", &self.profile.cover), ("content", &self.profile.content)] {
            self.check_list(&style.instruction, self.budget.instruction, kind, "instruction")?;
            self.check_list(&style.exclusions, self.budget.exclusions, kind, "exclusions")?;
        }
        Ok(())
    }

    /// Compile the instruction and exclusion strings for one page.
    pub fn compile(&self, page: &PageSpec) -> Result<CompiledPrompt, CompileError> {
        let kind = if page.is_cover { "cover" } else { "content" };
        let style = self.profile.page_style(page.is_cover);
        let dynamic = dynamic_fragment(page, &self.profile.separator);

        let instruction = self.compile_list(
            &style.instruction,
            dynamic.as_deref(),
            self.budget.instruction,
            kind,
            "instruction",
        )?;
        let exclusions =
            self.compile_list(&style.exclusions, None, self.budget.exclusions, kind, "exclusions")?;

        if !instruction.dropped.is_empty() {
            tracing::debug!(
                kind,
                dropped = instruction.dropped.len(),
                cost = instruction.cost,
                budget = self.budget.instruction,
                "instruction fragments dropped under budget"
            );
        }

        Ok(CompiledPrompt { instruction, exclusions })
    }

    fn check_list(
        &self,
        list: &FragmentList,
        budget: usize,
        kind: &str,
        part: &str,
    ) -> Result<usize, CompileError> {
        if list.fragments().iter().any(|f| f.text.trim().is_empty()) {
            return Err(CompileError::EmptyFragment { list: format!("{kind}.{part}") });
        }
        let counter = self.budget.counter;
        let essentials: Vec<&str> = list.tier(Tier::Essential).collect();
        let joins = essentials.len().saturating_sub(1);
        let cost = essentials.iter().map(|f| counter.count(f)).sum::<usize>()
            + joins * counter.count(&self.profile.separator);
        if cost > budget {
            return Err(CompileError::BudgetViolation {
                list: format!("{kind}.{part}"),
                cost,
                budget,
            });
        }
        Ok(cost)
    }

    fn compile_list(
        &self,
        list: &FragmentList,
        dynamic: Option<&str>,
        budget: usize,
        kind: &str,
        part: &str,
    ) -> Result<CompiledText, CompileError> {
        let counter = self.budget.counter;
        let join_cost = counter.count(&self.profile.separator);
        let mut used = self.check_list(list, budget, kind, part)?;
        let mut parts: Vec<&str> = list.tier(Tier::Essential).collect();
        let mut dropped = Vec::new();

        for stage in list.stages() {
            let candidates: Vec<&str> = match stage {
                Stage::Dynamic => dynamic.into_iter().collect(),
                Stage::Tier(tier) => list.tier(*tier).collect(),
            };
            let mut open = true;
            for text in candidates {
                let join = if parts.is_empty() { 0 } else { join_cost };
                let cost = counter.count(text) + join;
                if open && used + cost <= budget {
                    used += cost;
                    parts.push(text);
                } else {
                    open = false;
                    dropped.push(text.to_string());
                }
            }
        }

        Ok(CompiledText { text: parts.join(&self.profile.separator), cost: used, dropped })
    }
}

/// Render the page's subject and scene as one fragment.
///
/// The scene is omitted when blank or identical to the subject (content
/// pages whose scene is just the item name).
pub(crate) fn dynamic_fragment(page: &PageSpec, separator: &str) -> Option<String> {
    let subject = page.subject.trim();
    let scene = page.scene.trim();
    let text = if scene.is_empty() || scene.eq_ignore_ascii_case(subject) {
        subject.to_string()
    } else if subject.is_empty() {
        scene.to_string()
    } else {
        format!("{subject}{separator}{scene}")
    };
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
