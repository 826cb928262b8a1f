use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use serde::Deserialize;
use serde_json::Value;

pub const MIN_MAX_FILE_SIZE_KB: u64 = 1;
pub const MAX_MAX_FILE_SIZE_KB: u64 = 1024 * 64;
pub const DEFAULT_FILE_EXTENSION: &str = "xref";

#[derive(Debug, Clone, PartialEq)]
pub struct IndexingSettings {
    /// Scan workspace folders on startup.
    pub enable: bool,
    pub file_extensions: Vec<String>,
    pub exclude_paths: Vec<String>,
    pub max_file_size_kb: u64,
}

impl Default for IndexingSettings {
    fn default() -> Self {
        Self {
            enable: true,
            file_extensions: vec![DEFAULT_FILE_EXTENSION.to_string()],
            exclude_paths: Vec::new(),
            max_file_size_kb: 512,
        }
    }
}

impl IndexingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: IndexingSettingsPatch,
    ) {
        if let Some(v) = patch.enable {
            self.enable = v;
        }
        if let Some(v) = patch.file_extensions {
            self.file_extensions = v;
        }
        if let Some(v) = patch.exclude_paths {
            self.exclude_paths = v;
        }
        if let Some(v) = patch.max_file_size_kb {
            self.max_file_size_kb = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.max_file_size_kb = self.max_file_size_kb.clamp(MIN_MAX_FILE_SIZE_KB, MAX_MAX_FILE_SIZE_KB);

        let mut seen = HashSet::new();
        self.file_extensions = self
            .file_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .filter(|ext| seen.insert(ext.clone()))
            .collect();
        if self.file_extensions.is_empty() {
            self.file_extensions.push(DEFAULT_FILE_EXTENSION.to_string());
        }

        let mut seen = HashSet::new();
        self.exclude_paths = self
            .exclude_paths
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .filter(|p| seen.insert(p.clone()))
            .collect();
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_kb.saturating_mul(1024)
    }

    /// Whether `path` has one of the configured document extensions.
    pub fn matches_extension(
        &self,
        path: &Path,
    ) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.file_extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct IndexingSettingsPatch {
    pub(crate) enable: Option<bool>,
    pub(crate) file_extensions: Option<Vec<String>>,
    pub(crate) exclude_paths: Option<Vec<String>>,
    pub(crate) max_file_size_kb: Option<u64>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
