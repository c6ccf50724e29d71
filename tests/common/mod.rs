//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a base and a comparison library
pub struct LibraryFixture {
    pub temp_dir: TempDir,
}

impl LibraryFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        fs::create_dir(temp_dir.path().join("base")).expect("create base dir");
        fs::create_dir(temp_dir.path().join("comp")).expect("create comp dir");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn base_dir(&self) -> PathBuf {
        self.root().join("base")
    }

    pub fn comp_dir(&self) -> PathBuf {
        self.root().join("comp")
    }

    /// Write a CSV file under the temp root; `rows[0]` is the header
    pub fn write_csv(&self, relative: &str, rows: &[&[&str]]) -> PathBuf {
        let path = self.root().join(relative);
        let content: String = rows
            .iter()
            .map(|row| format!("{}\n", row.join(",")))
            .collect();
        fs::write(&path, content).expect("write csv");
        path
    }

    pub fn write_json(&self, relative: &str, body: &str) -> PathBuf {
        let path = self.root().join(relative);
        fs::write(&path, body).expect("write json");
        path
    }
}
