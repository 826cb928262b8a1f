//! Server configuration.
//!
//! Settings are split into one file per category. [`ServerSettings`]
//! aggregates all categories and handles JSON deserialization from LSP
//! initialization options and `didChangeConfiguration` payloads.

pub(crate) mod indexing;
pub(crate) mod linking;
pub(crate) mod logging;

use std::collections::HashMap;

use indexing::IndexingSettingsPatch;
pub use indexing::{DEFAULT_FILE_EXTENSION, IndexingSettings, MAX_MAX_FILE_SIZE_KB, MIN_MAX_FILE_SIZE_KB};
use linking::LinkingSettingsPatch;
pub use linking::{LinkingSettings, MAX_YIELD_INTERVAL, MIN_YIELD_INTERVAL, UnresolvedSeverity};
use logging::LoggingSettingsPatch;
pub use logging::{ClientLogLevel, LoggingSettings};
use serde::Deserialize;
use serde_json::Value;

pub const SETTINGS_SECTION_KEY: &str = "crossref-analyzer";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerSettings {
    pub linking: LinkingSettings,
    pub indexing: IndexingSettings,
    pub logging: LoggingSettings,
}

impl ServerSettings {
    pub fn from_lsp_payload(payload: Option<&Value>) -> Self {
        let mut settings = Self::default();
        if let Some(payload) = payload {
            settings = settings.merged_with_payload(payload);
        }
        settings
    }

    /// Apply a payload on top of these settings. Unknown keys and sections
    /// that fail to deserialize are ignored.
    pub fn merged_with_payload(
        &self,
        payload: &Value,
    ) -> Self {
        let mut merged = self.clone();

        for candidate in payload_candidates(payload) {
            if let Ok(patch) = serde_json::from_value::<ServerSettingsPatch>(candidate.clone()) {
                merged.apply_patch(patch);
            }
        }

        merged.normalize();
        merged
    }

    fn apply_patch(
        &mut self,
        patch: ServerSettingsPatch,
    ) {
        if let Some(p) = patch.linking {
            self.linking.apply_patch(p);
        }
        if let Some(p) = patch.indexing {
            self.indexing.apply_patch(p);
        }
        if let Some(p) = patch.logging {
            self.logging.apply_patch(p);
        }
    }

    fn normalize(&mut self) {
        self.linking.normalize();
        self.indexing.normalize();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ServerSettingsPatch {
    linking: Option<LinkingSettingsPatch>,
    indexing: Option<IndexingSettingsPatch>,
    logging: Option<LoggingSettingsPatch>,
    #[serde(flatten)]
    _extra: HashMap<String, Value>,
}

fn payload_candidates(payload: &Value) -> Vec<Value> {
    let mut candidates = Vec::new();
    candidates.push(payload.clone());
    if let Some(scoped) = payload.get(SETTINGS_SECTION_KEY) {
        candidates.push(scoped.clone());
    }
    candidates
}

#[cfg(test)]
#[path = "../../tests/src/config/settings_tests.rs"]
mod tests;
