use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tower_lsp::lsp_types::MessageType;

/// Lowest message kind mirrored to the client's output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ClientLogLevel {
    Off,
    Error,
    Warning,
    #[default]
    Info,
    Log,
}

impl ClientLogLevel {
    pub fn mirrors(
        self,
        kind: MessageType,
    ) -> bool {
        let rank = match kind {
            MessageType::ERROR => ClientLogLevel::Error,
            MessageType::WARNING => ClientLogLevel::Warning,
            MessageType::INFO => ClientLogLevel::Info,
            _ => ClientLogLevel::Log,
        };
        self != ClientLogLevel::Off && rank <= self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub client_level: ClientLogLevel,
    /// Send a one-line summary to the client after every build.
    pub build_summary: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            client_level: ClientLogLevel::Info,
            build_summary: false,
        }
    }
}

impl LoggingSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: LoggingSettingsPatch,
    ) {
        if let Some(level) = patch.client_level {
            self.client_level = level;
        }
        if let Some(enabled) = patch.build_summary {
            self.build_summary = enabled;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LoggingSettingsPatch {
    pub(crate) client_level: Option<ClientLogLevel>,
    pub(crate) build_summary: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, Value>,
}
