// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for `bw` specs.

use std::path::PathBuf;
use std::process::Output;

/// Two topics, so exhaustion is quick to reach.
pub const FRUIT_AND_ANIMALS: &str = r#"
[[topic]]
id = "fruit"
name = "Fruit"
items = ["apple", "pear", "plum"]

[[topic]]
id = "animals"
name = "Animals"
items = ["cat", "dog"]
"#;

/// `cat` stands in for both collaborators: the generator echoes the request
/// back as image data and the assembler concatenates the page files.
pub const CAT_PIPELINE: &str = r#"
[pipeline]
pages_per_job = 3

[topics]
catalog = "catalog.toml"

[generator]
program = "cat"

[assembler]
program = "cat"
"#;

fn bw_binary() -> PathBuf {
    assert_cmd::cargo::cargo_bin("bw")
}

/// A `bw` invocation against a throwaway state directory.
pub fn cli() -> CliBuilder {
    CliBuilder::new(std::env::temp_dir().join("bw-specs-scratch"))
}

/// Temporary state directory for one spec.
pub struct Project {
    dir: tempfile::TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self { dir: tempfile::tempdir().unwrap() }
    }

    /// Small catalog plus `cat` collaborators.
    pub fn with_cat_pipeline() -> Self {
        let project = Self::empty();
        project.file("catalog.toml", FRUIT_AND_ANIMALS);
        project.file("bookworks.toml", CAT_PIPELINE);
        project
    }

    pub fn state_path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn file(&self, rel: &str, content: &str) {
        let path = self.state_path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Sorted file names in a state subdirectory; empty if it does not exist.
    pub fn list(&self, rel: &str) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(self.state_path(rel)) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    pub fn bw(&self) -> CliBuilder {
        CliBuilder::new(self.dir.path().to_path_buf())
    }
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
    state_dir: PathBuf,
}

impl CliBuilder {
    fn new(state_dir: PathBuf) -> Self {
        Self { args: Vec::new(), envs: Vec::new(), state_dir }
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn run(self) -> (String, RunAssert) {
        let mut cmd = std::process::Command::new(bw_binary());
        cmd.args(&self.args)
            .env_remove("BW_CONFIG")
            .env_remove("BW_POLL_INTERVAL_MS")
            .env("BW_STATE_DIR", &self.state_dir)
            .env("BW_LOG", "warn")
            .env("NO_COLOR", "1");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        let output = cmd.output().unwrap();
        (self.args.join(" "), RunAssert { output })
    }

    pub fn passes(self) -> RunAssert {
        let (shown, run) = self.run();
        assert!(run.output.status.success(), "`bw {shown}` failed:\n{}", run.describe());
        run
    }

    pub fn fails(self) -> RunAssert {
        let (shown, run) = self.run();
        assert!(!run.output.status.success(), "`bw {shown}` succeeded:\n{}", run.describe());
        run
    }
}

pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    fn describe(&self) -> String {
        format!("stdout:\n{}\nstderr:\n{}", self.stdout(), self.stderr())
    }

    pub fn code(self, expected: i32) -> Self {
        assert_eq!(self.output.status.code(), Some(expected), "{}", self.describe());
        self
    }

    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout().contains(needle), "stdout lacks {needle:?}:\n{}", self.describe());
        self
    }

    pub fn stdout_lacks(self, needle: &str) -> Self {
        assert!(!self.stdout().contains(needle), "stdout has {needle:?}:\n{}", self.describe());
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr().contains(needle), "stderr lacks {needle:?}:\n{}", self.describe());
        self
    }
}
