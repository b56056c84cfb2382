// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{DynamicPosition, Tier};

const PROFILE: &str = r#"
separator = "; "

[cover.instruction]
dynamic = "after_important"
essential = ["colorful illustration", "book cover"]
important = ["no text no title"]
optional = ["cartoon"]

[cover.exclusions]
essential = ["text", "words"]

[content.instruction]
essential = ["black white line art"]
"#;

#[test]
fn parses_tier_groups_in_priority_order() {
    let profile = StyleProfile::from_toml_str(PROFILE).unwrap();
    let cover = &profile.cover.instruction;
    let tiers: Vec<Tier> = cover.fragments().iter().map(|f| f.tier).collect();
    assert_eq!(tiers, vec![Tier::Essential, Tier::Essential, Tier::Important, Tier::Optional]);
    assert_eq!(
        cover.tier(Tier::Essential).collect::<Vec<_>>(),
        vec!["colorful illustration", "book cover"]
    );
    assert_eq!(cover.dynamic(), DynamicPosition::AfterImportant);
}

#[test]
fn dynamic_defaults_to_after_essential() {
    let profile = StyleProfile::from_toml_str(PROFILE).unwrap();
    assert_eq!(profile.content.instruction.dynamic(), DynamicPosition::AfterEssential);
}

#[test]
fn missing_sections_default_to_empty() {
    let profile = StyleProfile::from_toml_str("").unwrap();
    assert_eq!(profile.separator, ", ");
    assert!(profile.cover.instruction.fragments().is_empty());
    assert!(profile.content.exclusions.fragments().is_empty());
}

#[test]
fn page_style_selects_by_cover_flag() {
    let profile = StyleProfile::from_toml_str(PROFILE).unwrap();
    assert_eq!(profile.page_style(true), &profile.cover);
    assert_eq!(profile.page_style(false), &profile.content);
}

#[test]
fn unknown_tier_is_rejected() {
    let err =
        StyleProfile::from_toml_str("[content.instruction]\ncritical = [\"x\"]\n").unwrap_err();
    assert!(matches!(err, ProfileError::Parse(_)));
}
