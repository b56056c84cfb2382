// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw generate` / `bw status` specs

use crate::prelude::*;

#[test]
fn generate_enqueues_one_job_per_topic_in_catalog_order() {
    let temp = Project::with_cat_pipeline();

    let out = temp.bw().args(&["generate", "--count", "2"]).passes().stdout();

    let topics: Vec<&str> = out.lines().filter_map(|l| l.split_whitespace().nth(1)).collect();
    assert_eq!(topics, vec!["fruit", "animals"]);
    assert!(out.contains("Fruit Coloring Book "));
    assert_eq!(temp.list("pending").len(), 2);
}

#[test]
fn descriptor_has_cover_then_cycled_items() {
    let temp = Project::with_cat_pipeline();

    let out = temp.bw().args(&["generate", "--json"]).passes().stdout();

    let jobs: serde_json::Value = serde_json::from_str(&out).unwrap();
    let pages = jobs[0]["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0]["is_cover"], true);
    assert_eq!(pages[0]["subject"], "Fruit collection");
    assert_eq!(pages[0]["scene"], "apple, pear, plum together");
    assert_eq!(pages[1]["subject"], "apple");
    assert_eq!(pages[2]["subject"], "pear");
}

#[test]
fn builtin_dog_pages_get_action_and_location_scenes() {
    let temp = Project::empty();

    let out = temp.bw().args(&["generate", "--json"]).passes().stdout();

    let jobs: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(jobs[0]["topic_id"], "dogs");
    let pages = jobs[0]["pages"].as_array().unwrap();
    assert_eq!(pages[1]["subject"], "Husky");
    let scene = pages[1]["scene"].as_str().unwrap();
    assert_ne!(scene, "Husky");
    assert!(scene.split_whitespace().count() >= 2, "scene {scene:?}");
}

#[test]
fn exhausted_catalog_exits_with_code_3() {
    let temp = Project::with_cat_pipeline();
    temp.bw().args(&["generate", "--count", "2"]).passes();

    temp.bw()
        .args(&["generate"])
        .fails()
        .code(3)
        .stderr_has("topic catalog exhausted");
    assert_eq!(temp.list("pending").len(), 2);
}

#[test]
fn partial_batch_reports_jobs_then_exhaustion() {
    let temp = Project::with_cat_pipeline();

    temp.bw()
        .args(&["generate", "--count", "5"])
        .fails()
        .code(3)
        .stdout_has("fruit")
        .stdout_has("animals")
        .stderr_has("after 2 new job(s)");
}

#[test]
fn reset_policy_reuses_topics_after_exhaustion() {
    let temp = Project::with_cat_pipeline();
    temp.file(
        "bookworks.toml",
        &format!("{}\n", CAT_PIPELINE.replace("[topics]", "[topics]\non_exhausted = \"reset\"")),
    );

    temp.bw().args(&["generate", "--count", "3"]).passes();

    assert_eq!(temp.list("pending").len(), 3);
    assert!(temp.list("").contains(&"ledger.bak".to_string()));
}

#[test]
fn status_reports_jobs_and_topics() {
    let temp = Project::with_cat_pipeline();
    temp.bw().args(&["generate"]).passes();

    let out = temp.bw().args(&["status", "--json"]).passes().stdout();

    let status: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(status["jobs"]["pending"], 1);
    assert_eq!(status["jobs"]["done"], 0);
    assert_eq!(status["topics"]["used"], 1);
    assert_eq!(status["topics"]["unused"], 1);
}
