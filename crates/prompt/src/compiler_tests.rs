// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::fragment::{DynamicPosition, Fragment};
use crate::profile::PageStyle;
use bw_core::test_support::strategies::arb_page_spec;
use proptest::prelude::*;

fn words(n: usize, tag: &str) -> String {
    (0..n).map(|i| format!("{tag}{i}")).collect::<Vec<_>>().join(" ")
}

fn profile_with(instruction: FragmentList, exclusions: FragmentList) -> StyleProfile {
    profile_joined_by(", ", instruction, exclusions)
}

fn profile_joined_by(
    separator: &str,
    instruction: FragmentList,
    exclusions: FragmentList,
) -> StyleProfile {
    let style = PageStyle { instruction, exclusions };
    StyleProfile { separator: separator.to_string(), cover: style.clone(), content: style }
}

fn word_budget(instruction: usize, exclusions: usize) -> Budget {
    Budget { instruction, exclusions, counter: TokenEstimate::Words }
}

fn blank_page() -> PageSpec {
    PageSpec::content("", "")
}

#[test]
fn important_fragments_stop_at_first_overflow() {
    // 15 essential units, then 4 + 3 important units against a budget of 20
    let list = FragmentList::new(
        vec![
            Fragment::essential(words(5, "a")),
            Fragment::essential(words(5, "b")),
            Fragment::essential(words(5, "c")),
            Fragment::important(words(4, "d")),
            Fragment::important(words(3, "e")),
        ],
        DynamicPosition::AfterEssential,
    );
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), word_budget(20, 10));

    let out = compiler.compile(&blank_page()).unwrap();

    assert_eq!(out.instruction.cost, 19);
    assert!(out.instruction.text.ends_with(&words(4, "d")));
    assert_eq!(out.instruction.dropped, vec![words(3, "e")]);
}

#[test]
fn shorter_later_fragment_is_not_used_to_fill_the_gap() {
    let list = FragmentList::new(
        vec![
            Fragment::essential("one two"),
            Fragment::optional("three four five"),
            Fragment::optional("six"),
        ],
        DynamicPosition::Omit,
    );
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), word_budget(4, 4));

    let out = compiler.compile(&blank_page()).unwrap();

    assert_eq!(out.instruction.text, "one two");
    assert_eq!(out.instruction.dropped, vec!["three four five", "six"]);
}

#[test]
fn essential_overflow_is_a_budget_violation() {
    let list = FragmentList::new(vec![Fragment::essential(words(6, "x"))], DynamicPosition::Omit);
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), word_budget(5, 5));

    let expected = CompileError::BudgetViolation {
        list: "cover.instruction".to_string(),
        cost: 6,
        budget: 5,
    };
    assert_eq!(compiler.validate(), Err(expected));
    assert!(matches!(
        compiler.compile(&blank_page()),
        Err(CompileError::BudgetViolation { cost: 6, budget: 5, .. })
    ));
}

#[test]
fn wordy_separator_is_charged_per_join() {
    let list = FragmentList::new(
        vec![Fragment::essential("a"), Fragment::important("b"), Fragment::important("c")],
        DynamicPosition::Omit,
    );
    let compiler = InstructionCompiler::new(
        profile_joined_by(" and then ", list, FragmentList::default()),
        word_budget(4, 4),
    );

    let out = compiler.compile(&blank_page()).unwrap();

    assert_eq!(out.instruction.text, "a and then b");
    assert_eq!(out.instruction.cost, 4);
    assert_eq!(TokenEstimate::Words.count(&out.instruction.text), 4);
    assert_eq!(out.instruction.dropped, vec!["c"]);
}

#[test]
fn wordy_separator_between_essentials_can_violate_budget() {
    let list = FragmentList::new(
        vec![Fragment::essential("a"), Fragment::essential("b"), Fragment::essential("c")],
        DynamicPosition::Omit,
    );
    let compiler = InstructionCompiler::new(
        profile_joined_by(" and then ", list, FragmentList::default()),
        word_budget(3, 3),
    );

    let expected = CompileError::BudgetViolation {
        list: "cover.instruction".to_string(),
        cost: 7,
        budget: 3,
    };
    assert_eq!(compiler.validate(), Err(expected));
}

#[test]
fn exclusions_use_their_own_budget() {
    let exclusions = FragmentList::new(
        vec![
            Fragment::essential("text"),
            Fragment::important("words"),
            Fragment::important("gray"),
        ],
        DynamicPosition::AfterEssential,
    );
    let compiler = InstructionCompiler::new(
        profile_with(FragmentList::default(), exclusions),
        word_budget(50, 2),
    );

    let out = compiler.compile(&PageSpec::content("apple", "apple")).unwrap();

    assert_eq!(out.exclusions.text, "text, words");
    assert!(!out.exclusions.text.contains("apple"));
    assert_eq!(out.instruction.text, "apple");
}

#[test]
fn exclusion_violation_is_reported_by_validate() {
    let exclusions =
        FragmentList::new(vec![Fragment::essential("a b c")], DynamicPosition::Omit);
    let compiler = InstructionCompiler::new(
        profile_with(FragmentList::default(), exclusions),
        word_budget(50, 2),
    );
    assert!(matches!(
        compiler.validate(),
        Err(CompileError::BudgetViolation { list, .. }) if list == "cover.exclusions"
    ));
}

#[test]
fn empty_fragment_is_rejected() {
    let list = FragmentList::new(vec![Fragment::optional("  ")], DynamicPosition::Omit);
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), word_budget(5, 5));
    assert!(matches!(compiler.validate(), Err(CompileError::EmptyFragment { .. })));
}

#[yare::parameterized(
    after_essential = { DynamicPosition::AfterEssential, "ess, sub, imp, opt" },
    after_important = { DynamicPosition::AfterImportant, "ess, imp, sub, opt" },
    after_optional  = { DynamicPosition::AfterOptional,  "ess, imp, opt, sub" },
    omitted         = { DynamicPosition::Omit,           "ess, imp, opt" },
)]
fn dynamic_position(position: DynamicPosition, expected: &str) {
    let list = FragmentList::new(
        vec![Fragment::essential("ess"), Fragment::important("imp"), Fragment::optional("opt")],
        position,
    );
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), word_budget(10, 10));
    let out = compiler.compile(&PageSpec::content("sub", "sub")).unwrap();
    assert_eq!(out.instruction.text, expected);
}

#[test]
fn dynamic_fragment_that_does_not_fit_leaves_later_stages_open() {
    let list = FragmentList::new(
        vec![Fragment::essential("ess"), Fragment::important("imp")],
        DynamicPosition::AfterEssential,
    );
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), word_budget(2, 2));
    let out = compiler.compile(&PageSpec::content("long subject", "long subject")).unwrap();
    assert_eq!(out.instruction.text, "ess, imp");
    assert_eq!(out.instruction.dropped, vec!["long subject"]);
}

#[yare::parameterized(
    same_scene      = { "apple",            "apple",                 Some("apple") },
    same_case       = { "Apple",            "apple",                 Some("Apple") },
    blank_scene     = { "apple",            " ",                     Some("apple") },
    blank_subject   = { "",                 "in the park",           Some("in the park") },
    both            = { "Fruit collection", "apple, pear together",  Some("Fruit collection, apple, pear together") },
    nothing         = { " ",                "",                      None },
)]
fn dynamic_rendering(subject: &str, scene: &str, expected: Option<&str>) {
    let page = PageSpec::content(subject, scene);
    assert_eq!(dynamic_fragment(&page, ", ").as_deref(), expected);
}

#[test]
fn compile_is_deterministic() {
    let list = FragmentList::new(
        vec![Fragment::essential("coloring book page"), Fragment::optional("bold lines")],
        DynamicPosition::AfterEssential,
    );
    let compiler =
        InstructionCompiler::new(profile_with(list, FragmentList::default()), Budget::default());
    let page = PageSpec::cover("Fruit collection", "apple, pear together");
    assert_eq!(compiler.compile(&page).unwrap(), compiler.compile(&page).unwrap());
}

// ── Property tests ──────────────────────────────────────────────────────────

// Tier texts use distinct uppercase prefixes so they never collide with each
// other or with the lowercase page content.
fn arb_tier_texts(prefix: &'static str) -> impl Strategy<Value = Vec<String>> {
    let pattern = format!("{prefix}[A-Z]{{1,5}}( [A-Z]{{1,6}}){{0,3}}");
    prop::collection::vec(proptest::string::string_regex(&pattern).unwrap(), 0..6)
}

fn arb_position() -> impl Strategy<Value = DynamicPosition> {
    prop_oneof![
        Just(DynamicPosition::AfterEssential),
        Just(DynamicPosition::AfterImportant),
        Just(DynamicPosition::AfterOptional),
        Just(DynamicPosition::Omit),
    ]
}

fn arb_separator() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just(", "), Just(" | "), Just(" and then "), Just(" with a ")]
}

fn arb_estimate() -> impl Strategy<Value = TokenEstimate> {
    prop_oneof![Just(TokenEstimate::Words), Just(TokenEstimate::Clip)]
}

fn build_list(
    essential: &[String],
    important: &[String],
    optional: &[String],
    position: DynamicPosition,
) -> FragmentList {
    let fragments = essential
        .iter()
        .map(Fragment::essential)
        .chain(important.iter().map(Fragment::important))
        .chain(optional.iter().map(Fragment::optional))
        .collect();
    FragmentList::new(fragments, position)
}

proptest! {
    #[test]
    fn compiled_output_respects_budget_and_priority(
        essential in arb_tier_texts("E"),
        important in arb_tier_texts("I"),
        optional in arb_tier_texts("O"),
        position in arb_position(),
        estimate in arb_estimate(),
        separator in arb_separator(),
        slack in 0usize..40,
        page in arb_page_spec(),
    ) {
        let join_cost = estimate.count(separator);
        let essential_cost: usize = essential.iter().map(|t| estimate.count(t)).sum::<usize>()
            + essential.len().saturating_sub(1) * join_cost;
        let budget = essential_cost + slack;
        let list = build_list(&essential, &important, &optional, position);
        let compiler = InstructionCompiler::new(
            profile_joined_by(separator, list, FragmentList::default()),
            Budget { instruction: budget, exclusions: budget, counter: estimate },
        );

        // essential-fitting profiles never violate
        prop_assert!(compiler.validate().is_ok());
        let out = compiler.compile(&page).unwrap();

        // length never exceeds budget
        prop_assert!(out.instruction.cost <= budget);
        prop_assert!(estimate.count(&out.instruction.text) <= budget);

        // essentials appear verbatim, first, in declared order
        if !essential.is_empty() {
            prop_assert!(out.instruction.text.starts_with(&essential.join(separator)));
        }

        // dropped optionals are exactly a suffix of the optional list
        let dropped_optional: Vec<&String> =
            out.instruction.dropped.iter().filter(|d| optional.contains(d)).collect();
        let kept = optional.len() - dropped_optional.len();
        for (d, o) in dropped_optional.iter().zip(&optional[kept..]) {
            prop_assert_eq!(*d, o);
        }

        // dynamic content placed right after essentials is present whenever it fits
        if position == DynamicPosition::AfterEssential {
            if let Some(dynamic) = dynamic_fragment(&page, separator) {
                let join = if essential.is_empty() { 0 } else { join_cost };
                if essential_cost + join + estimate.count(&dynamic) <= budget {
                    prop_assert!(out.instruction.text.contains(&dynamic));
                }
            }
        }
    }

    #[test]
    fn essentials_over_budget_always_violate(
        essential in prop::collection::vec("[a-z]{1,6}( [a-z]{1,6}){0,3}", 1..6),
        estimate in arb_estimate(),
    ) {
        let essential_cost: usize = essential.iter().map(|t| estimate.count(t)).sum();
        let list = build_list(&essential, &[], &[], DynamicPosition::Omit);
        let compiler = InstructionCompiler::new(
            profile_with(list, FragmentList::default()),
            Budget { instruction: essential_cost - 1, exclusions: 10, counter: estimate },
        );
        let violated = matches!(compiler.validate(), Err(CompileError::BudgetViolation { .. }));
        prop_assert!(violated);
    }
}
