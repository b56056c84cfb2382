// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw compile` specs

use crate::prelude::*;

#[test]
fn content_page_leads_with_line_art_essentials() {
    let temp = Project::empty();

    let out =
        temp.bw().args(&["compile", "Golden Retriever", "Golden Retriever"]).passes().stdout();

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("instruction"));
    assert!(lines[1].starts_with("black white line art, coloring book page"));
    assert!(lines[1].contains("Golden Retriever"));
    assert!(lines[3].starts_with("color, gray, shading"));
}

#[test]
fn cover_page_uses_cover_style() {
    let temp = Project::empty();

    temp.bw()
        .args(&["compile", "--cover", "Dogs collection", "Beagle, Poodle together"])
        .passes()
        .stdout_has("book cover")
        .stdout_lacks("coloring book page");
}
