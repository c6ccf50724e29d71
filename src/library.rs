//! Pairs datasets across two directories and compares each pair

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::{CompareOptions, ReadOptions};
use crate::diff::{ComparisonReport, DiffEngine, SchemaDiff};
use crate::error::{CompareError, Result};
use crate::parser::ParserFactory;

/// Outcome of comparing one dataset present in both directories
#[derive(Debug, Clone, Serialize)]
pub struct DatasetReport {
    pub row_count_match: bool,
    pub ds1_rows: usize,
    pub ds2_rows: usize,
    /// Columns only in the base dataset
    pub vars_left: Vec<String>,
    /// Columns only in the comparison dataset
    pub vars_right: Vec<String>,
    pub vars_both: Vec<String>,
    pub comparison: ComparisonReport,
}

/// Outcome of comparing two directories of datasets
#[derive(Debug, Clone, Default, Serialize)]
pub struct LibraryReport {
    /// Per-dataset results, ordered by dataset name
    pub datasets: BTreeMap<String, DatasetReport>,
    pub base_only_datasets: Vec<String>,
    pub comp_only_datasets: Vec<String>,
}

impl LibraryReport {
    /// True when every shared dataset matched and no dataset is one-sided
    pub fn all_match(&self) -> bool {
        self.base_only_datasets.is_empty()
            && self.comp_only_datasets.is_empty()
            && self.datasets.values().all(|d| d.comparison.is_match)
    }
}

/// Compares every dataset two directories have in common
pub struct LibraryComparator {
    options: CompareOptions,
    sort_columns: Vec<String>,
    read_options: ReadOptions,
    factory: ParserFactory,
}

impl LibraryComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self {
            options,
            sort_columns: Vec::new(),
            read_options: ReadOptions::default(),
            factory: ParserFactory::new(),
        }
    }

    /// Columns to pre-sort by and to match observations on
    pub fn with_sort_columns(mut self, sort_columns: Vec<String>) -> Self {
        self.sort_columns = sort_columns;
        self
    }

    pub fn with_read_options(mut self, read_options: ReadOptions) -> Self {
        self.read_options = read_options;
        self
    }

    /// Compare the datasets of `base_dir` against those of `comp_dir`
    pub fn compare(&self, base_dir: &Path, comp_dir: &Path) -> Result<LibraryReport> {
        let base = self.discover(base_dir)?;
        let comp = self.discover(comp_dir)?;

        let shared: Vec<(&String, &PathBuf, &PathBuf)> = base
            .iter()
            .filter_map(|(name, base_path)| {
                comp.get(name).map(|comp_path| (name, base_path, comp_path))
            })
            .collect();

        log::info!(
            "Comparing {} shared dataset(s) between {} and {}",
            shared.len(),
            base_dir.display(),
            comp_dir.display()
        );

        let reports = shared
            .par_iter()
            .map(|&(name, base_path, comp_path)| {
                let report = self.compare_pair(base_path, comp_path)?;
                Ok((name.clone(), report))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LibraryReport {
            datasets: reports.into_iter().collect(),
            base_only_datasets: base
                .keys()
                .filter(|name| !comp.contains_key(*name))
                .cloned()
                .collect(),
            comp_only_datasets: comp
                .keys()
                .filter(|name| !base.contains_key(*name))
                .cloned()
                .collect(),
        })
    }

    /// Map lowercase file stem to path for every readable file directly in `dir`
    fn discover(&self, dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
        if !dir.is_dir() {
            return Err(CompareError::directory_not_found(dir));
        }

        let mut found = BTreeMap::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !self.factory.supports(path) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            match found.entry(stem.to_lowercase()) {
                Entry::Vacant(slot) => {
                    log::debug!("Found dataset {}", path.display());
                    slot.insert(path.to_path_buf());
                }
                Entry::Occupied(slot) => {
                    log::warn!(
                        "Ignoring {}: dataset '{}' already provided by {}",
                        path.display(),
                        slot.key(),
                        slot.get().display()
                    );
                }
            }
        }
        Ok(found)
    }

    fn compare_pair(&self, base_path: &Path, comp_path: &Path) -> Result<DatasetReport> {
        let (base, _) = self.factory.read(base_path, &self.read_options)?;
        let (comp, _) = self.factory.read(comp_path, &self.read_options)?;
        let base = base.normalize_missing();
        let comp = comp.normalize_missing();

        let presort: Vec<String> = self
            .sort_columns
            .iter()
            .filter(|name| base.has_column(name) && comp.has_column(name))
            .cloned()
            .collect();
        let base = base.sorted_by(&presort);
        let comp = comp.sorted_by(&presort);

        let columns = SchemaDiff::compare_columns(&base, &comp);
        let base_both = base.select(&columns.in_both);
        let comp_both = comp.select(&columns.in_both);

        let engine = DiffEngine::new(self.options.clone().with_by(self.sort_columns.clone()));
        let comparison = engine.compare(&base_both, &comp_both);

        Ok(DatasetReport {
            row_count_match: base.row_count() == comp.row_count(),
            ds1_rows: base.row_count(),
            ds2_rows: comp.row_count(),
            vars_left: columns.only_in_base,
            vars_right: columns.only_in_comp,
            vars_both: columns.in_both,
            comparison,
        })
    }
}

/// Convenience function to compare two directories of datasets
pub fn compare_libraries(
    base_dir: &Path,
    comp_dir: &Path,
    sort_columns: &[String],
    options: &CompareOptions,
) -> Result<LibraryReport> {
    LibraryComparator::new(options.clone())
        .with_sort_columns(sort_columns.to_vec())
        .compare(base_dir, comp_dir)
}
