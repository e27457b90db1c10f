use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// How many times a whole cascade is re-run after losing a copy race.
    pub copy_conflict_retries: u32,
    /// SQLite busy timeout for the engine's connection.
    pub busy_timeout_ms: u64,
}

impl EngineConfig {
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            copy_conflict_retries: 1,
            busy_timeout_ms: 5000,
        }
    }
}
