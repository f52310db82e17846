//! Grouping scanned files into category buckets.

use crate::file_category::{Category, FileMapper};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Files grouped by category.
///
/// Only categories with at least one file have a bucket. Buckets iterate in
/// category order and keep files in the order they were classified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    buckets: BTreeMap<Category, Vec<PathBuf>>,
}

impl Classification {
    /// Classifies `files` in a single pass.
    pub fn classify<P: AsRef<Path>>(files: &[P], mapper: &FileMapper) -> Self {
        let mut classification = Self::default();
        for file in files {
            let path = file.as_ref();
            classification.insert(mapper.category_for_path(path), path.to_path_buf());
        }
        classification
    }

    fn insert(&mut self, category: Category, path: PathBuf) {
        self.buckets.entry(category).or_default().push(path);
    }

    /// The files in one category, if any.
    pub fn files(&self, category: Category) -> &[PathBuf] {
        self.buckets.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty categories with their files, in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[PathBuf])> {
        self.buckets
            .iter()
            .map(|(category, files)| (*category, files.as_slice()))
    }

    /// Non-empty categories, in category order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.buckets.keys().copied()
    }

    /// Total number of classified files.
    pub fn total_files(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
