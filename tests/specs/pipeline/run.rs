// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bw run` specs, using `cat` as generator and assembler

use crate::prelude::*;

#[test]
fn run_once_archives_job_and_writes_artifact() {
    let temp = Project::with_cat_pipeline();
    let out = temp.bw().args(&["generate"]).passes().stdout();
    let job_id = out.split_whitespace().next().unwrap().to_string();

    temp.bw().args(&["run", "--once"]).passes().stdout_has(&format!("{job_id}  done"));

    assert!(temp.list("pending").is_empty());
    assert_eq!(temp.list("archive"), vec![format!("{job_id}.json")]);
    assert_eq!(
        temp.list("output"),
        vec![format!("{job_id}.meta.json"), format!("{job_id}.pdf")]
    );

    // Each page is the JSON request the generator received, in page order.
    let artifact =
        std::fs::read_to_string(temp.state_path(&format!("output/{job_id}.pdf"))).unwrap();
    let cover = artifact.find("vibrant colors, Fruit collection").unwrap();
    let first_content = artifact.find("coloring book page").unwrap();
    assert!(cover < first_content);
    assert_eq!(artifact.matches("\"seed\"").count(), 3);

    let log = std::fs::read_to_string(temp.state_path(&format!("logs/job/{job_id}.log"))).unwrap();
    assert!(log.contains("[archiving]"));
    assert!(temp.state_path("logs/pipeline.log").exists());
}

#[test]
fn run_once_with_nothing_pending() {
    let temp = Project::with_cat_pipeline();

    temp.bw().args(&["run", "--once"]).passes().stdout_has("no pending jobs");
}

#[test]
fn failing_generator_moves_job_to_failed_and_retry_requeues() {
    let temp = Project::with_cat_pipeline();
    let config = CAT_PIPELINE
        .replace("[generator]\nprogram = \"cat\"", "[generator]\nprogram = \"false\"")
        .replace("pages_per_job = 3", "pages_per_job = 3\npage_retries = 0");
    temp.file("bookworks.toml", &config);
    let out = temp.bw().args(&["generate"]).passes().stdout();
    let job_id = out.split_whitespace().next().unwrap().to_string();

    temp.bw().args(&["run", "--once"]).passes().stdout_has(&format!("{job_id}  failed"));
    temp.bw()
        .args(&["failed"])
        .passes()
        .stdout_has(&job_id)
        .stdout_has("page 1 failed after 1 attempts");
    assert_eq!(temp.list("failed").len(), 2);

    temp.bw().args(&["retry", &job_id]).passes();
    assert_eq!(temp.list("pending"), vec![format!("{job_id}.json")]);
    assert!(temp.list("failed").is_empty());
}

#[test]
fn run_without_generator_command_fails() {
    let temp = Project::empty();
    temp.bw().args(&["generate"]).passes();

    temp.bw().args(&["run", "--once"]).fails().stderr_has("no [generator] command configured");
}

#[test]
fn retry_rejects_unsafe_job_id() {
    let temp = Project::empty();

    temp.bw().args(&["retry", "../etc/passwd"]).fails().stderr_has("invalid job id");
}
