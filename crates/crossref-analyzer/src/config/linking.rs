use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tower_lsp::lsp_types::DiagnosticSeverity;

use crate::linker::DEFAULT_YIELD_INTERVAL;

pub const MIN_YIELD_INTERVAL: usize = 1;
pub const MAX_YIELD_INTERVAL: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedSeverity {
    #[default]
    Error,
    Warning,
    Information,
    Hint,
}

impl UnresolvedSeverity {
    pub fn to_lsp(self) -> DiagnosticSeverity {
        match self {
            UnresolvedSeverity::Error => DiagnosticSeverity::ERROR,
            UnresolvedSeverity::Warning => DiagnosticSeverity::WARNING,
            UnresolvedSeverity::Information => DiagnosticSeverity::INFORMATION,
            UnresolvedSeverity::Hint => DiagnosticSeverity::HINT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkingSettings {
    /// Nodes visited between cooperative yields of a link pass.
    pub yield_interval: usize,
    /// Publish linking errors as diagnostics.
    pub report_unresolved: bool,
    pub unresolved_severity: UnresolvedSeverity,
}

impl Default for LinkingSettings {
    fn default() -> Self {
        Self {
            yield_interval: DEFAULT_YIELD_INTERVAL,
            report_unresolved: true,
            unresolved_severity: UnresolvedSeverity::Error,
        }
    }
}

impl LinkingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: LinkingSettingsPatch,
    ) {
        if let Some(v) = patch.yield_interval {
            self.yield_interval = v;
        }
        if let Some(v) = patch.report_unresolved {
            self.report_unresolved = v;
        }
        if let Some(v) = patch.unresolved_severity {
            self.unresolved_severity = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.yield_interval = self.yield_interval.clamp(MIN_YIELD_INTERVAL, MAX_YIELD_INTERVAL);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LinkingSettingsPatch {
    pub(crate) yield_interval: Option<usize>,
    pub(crate) report_unresolved: Option<bool>,
    pub(crate) unresolved_severity: Option<UnresolvedSeverity>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
