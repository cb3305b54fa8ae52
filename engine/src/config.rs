//! Engine configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::TransactionEngineConfig;

/// Configuration values for the transaction engine and its binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TAG_ENGINE")]
pub struct EngineSettings {
    /// Pause before polling restarts after several tags were detected.
    pub multi_tag_retry_ms: Option<u64>,
    /// Emit logs as JSON lines.
    #[ortho_config(default = false)]
    pub json_logs: bool,
}

impl EngineSettings {
    /// Return the multiple-tag retry delay, falling back to the default.
    #[must_use]
    pub fn multi_tag_retry_delay(&self) -> Duration {
        self.multi_tag_retry_ms.map_or_else(
            || TransactionEngineConfig::default().multi_tag_retry_delay,
            Duration::from_millis,
        )
    }

    /// Engine configuration derived from these settings.
    #[must_use]
    pub fn engine_config(&self) -> TransactionEngineConfig {
        TransactionEngineConfig {
            multi_tag_retry_delay: self.multi_tag_retry_delay(),
        }
    }
}
