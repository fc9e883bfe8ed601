//! Engine configuration.
//!
//! Stored as pretty JSON. Every field has a default, so a partial file is
//! enough.
//!
//! ```ignore
//! use exmem_core::{EngineConfig, PointerWidth};
//!
//! let config = EngineConfig::builder()
//!     .pointer_width(PointerWidth::Bits32)
//!     .max_string_len(128)
//!     .build();
//! config.save("exmem.json")?;
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::PointerWidth;
use crate::engine::{SequenceOptions, Throttle};
use crate::error::Result;
use crate::memory::AccessorConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pointer width and string bound of the target
    pub accessor: AccessorConfig,
    /// Options for sequences read on their own (embedded sequences carry
    /// their own options in the layout)
    pub sequence: SequenceOptions,
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Builder for EngineConfig
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    pointer_width: Option<PointerWidth>,
    max_string_len: Option<usize>,
    max_capacity: Option<usize>,
    throttle: Option<Throttle>,
}

impl EngineConfigBuilder {
    /// Set the pointer width of the target process
    pub fn pointer_width(mut self, width: PointerWidth) -> Self {
        self.pointer_width = Some(width);
        self
    }

    /// Set the maximum number of bytes fetched for a pointed-to string
    pub fn max_string_len(mut self, len: usize) -> Self {
        self.max_string_len = Some(len);
        self
    }

    /// Set the largest element count accepted from a sequence header
    pub fn max_capacity(mut self, max: usize) -> Self {
        self.max_capacity = Some(max);
        self
    }

    /// Pause `delay_ms` after every `every` sequence elements
    pub fn throttle(mut self, every: usize, delay_ms: u64) -> Self {
        self.throttle = Some(Throttle { every, delay_ms });
        self
    }

    /// Build the configuration
    pub fn build(self) -> EngineConfig {
        let default = EngineConfig::default();
        EngineConfig {
            accessor: AccessorConfig {
                pointer_width: self
                    .pointer_width
                    .unwrap_or(default.accessor.pointer_width),
                max_string_len: self
                    .max_string_len
                    .unwrap_or(default.accessor.max_string_len),
            },
            sequence: SequenceOptions {
                max_capacity: self.max_capacity.unwrap_or(default.sequence.max_capacity),
                throttle: self.throttle.unwrap_or(default.sequence.throttle),
                ..default.sequence
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ElementMode;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builder_defaults() {
        let config = EngineConfig::builder().build();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.accessor.pointer_width, PointerWidth::Bits64);
        assert_eq!(config.accessor.max_string_len, 64);
        assert_eq!(config.sequence.max_capacity, 0x20000);
    }

    #[test]
    fn test_builder_overrides() {
        let config = EngineConfig::builder()
            .pointer_width(PointerWidth::Bits32)
            .max_string_len(128)
            .max_capacity(100)
            .throttle(50, 2)
            .build();

        assert_eq!(config.accessor.pointer_size(), 4);
        assert_eq!(config.accessor.max_string_len, 128);
        assert_eq!(config.sequence.max_capacity, 100);
        assert_eq!(config.sequence.throttle.every, 50);
        assert!(config.sequence.throttle.is_enabled());
        assert_eq!(config.sequence.mode, ElementMode::Pointer);
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = EngineConfig::builder().max_string_len(32).build();
        config.save(temp_file.path()).unwrap();

        let loaded = EngineConfig::load(temp_file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_file() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "accessor": { "pointer_width": "bits32" }, "sequence": { "mode": "inline" } }"#,
        )
        .unwrap();
        assert_eq!(config.accessor.pointer_width, PointerWidth::Bits32);
        assert_eq!(config.accessor.max_string_len, 64);
        assert_eq!(config.sequence.mode, ElementMode::Inline);
        assert_eq!(config.sequence.max_capacity, 0x20000);
    }

    #[test]
    fn test_load_missing_file() {
        let err = EngineConfig::load("/nonexistent/exmem.json").unwrap_err();
        assert!(err.is_not_found());
    }
}
