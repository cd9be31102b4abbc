//! Configuration for cmdlog
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Main configuration for a cmdlog engine
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the durable file store
    /// Internal structure:
    ///   {data_dir}/
    ///     └── store.log        (append-only record file)
    pub data_dir: PathBuf,

    /// Sync strategy: how often to fsync the record file
    pub store_sync_strategy: StoreSyncStrategy,

    // -------------------------------------------------------------------------
    // Sync Protocol Configuration
    // -------------------------------------------------------------------------
    /// How batch envelopes are decoded
    pub envelope_mode: EnvelopeMode,

    /// Serialize writers per log (one exclusive writer per count key)
    pub serialize_writers: bool,

    // -------------------------------------------------------------------------
    // Operation Configuration
    // -------------------------------------------------------------------------
    /// Key written by the `init` operation
    pub init_key: String,
}

/// Record file sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreSyncStrategy {
    /// fsync after every put (safest, slowest)
    EveryWrite,

    /// fsync after N unsynced puts (balanced durability/performance)
    EveryNEntries { count: usize },
}

/// Batch envelope decoding mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeMode {
    /// Strip the first occurrence of each wrapper token and split the rest
    #[default]
    Lenient,

    /// Reject payloads not wrapped by both tokens
    Strict,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./cmdlog_data"),
            store_sync_strategy: StoreSyncStrategy::EveryNEntries { count: 100 },
            envelope_mode: EnvelopeMode::Lenient,
            serialize_writers: true,
            init_key: "hello_world".to_string(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for the file store)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the store sync strategy
    pub fn store_sync_strategy(mut self, strategy: StoreSyncStrategy) -> Self {
        self.config.store_sync_strategy = strategy;
        self
    }

    /// Set the envelope decoding mode
    pub fn envelope_mode(mut self, mode: EnvelopeMode) -> Self {
        self.config.envelope_mode = mode;
        self
    }

    /// Enable or disable per-log writer serialization
    pub fn serialize_writers(mut self, enabled: bool) -> Self {
        self.config.serialize_writers = enabled;
        self
    }

    /// Set the key written by `init`
    pub fn init_key(mut self, key: impl Into<String>) -> Self {
        self.config.init_key = key.into();
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
