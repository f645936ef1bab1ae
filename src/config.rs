//! Configuration for skiptable
//!
//! Centralized configuration with sensible defaults.

use crate::error::{Result, TableError};

/// Main configuration for a MemTable instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Arena Configuration
    // -------------------------------------------------------------------------
    /// Size of each block the arenas carve buffers from (in bytes)
    pub arena_block_size: usize,

    /// Upper bound on bytes reserved by the durable (entry) arena.
    /// `None` lets it grow until the process runs out of memory.
    pub arena_capacity: Option<usize>,

    /// Upper bound on bytes reserved by the scratch (lookup) arena.
    /// Lookups keep reserving blocks for the table's lifetime, so a bound
    /// here eventually fails every read. Defaults to `None`.
    pub scratch_capacity: Option<usize>,

    // -------------------------------------------------------------------------
    // Record Limits
    // -------------------------------------------------------------------------
    /// Largest accepted user key (in bytes)
    pub max_key_size: usize,

    /// Largest accepted value (in bytes)
    pub max_value_size: usize,

    // -------------------------------------------------------------------------
    // Flush Configuration
    // -------------------------------------------------------------------------
    /// Durable arena usage at which the table reports it should be flushed
    pub memtable_size_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena_block_size: 4 * 1024,
            arena_capacity: None,
            scratch_capacity: None,
            max_key_size: 64 * 1024,               // 64 KB
            max_value_size: 16 * 1024 * 1024,      // 16 MB
            memtable_size_limit: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the configuration for values the table cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.arena_block_size == 0 {
            return Err(TableError::Config(
                "arena_block_size must be non-zero".to_string(),
            ));
        }

        if self.max_key_size > u32::MAX as usize || self.max_value_size > u32::MAX as usize {
            return Err(TableError::Config(format!(
                "record limits must not exceed {} bytes",
                u32::MAX
            )));
        }

        let capacities = [
            ("arena_capacity", self.arena_capacity),
            ("scratch_capacity", self.scratch_capacity),
        ];
        for (name, capacity) in capacities {
            if let Some(capacity) = capacity {
                if capacity < self.arena_block_size {
                    return Err(TableError::Config(format!(
                        "{} ({}) is smaller than one block ({})",
                        name, capacity, self.arena_block_size
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the arena block size (in bytes)
    pub fn arena_block_size(mut self, size: usize) -> Self {
        self.config.arena_block_size = size;
        self
    }

    /// Cap the bytes the durable arena may reserve
    pub fn arena_capacity(mut self, capacity: usize) -> Self {
        self.config.arena_capacity = Some(capacity);
        self
    }

    /// Cap the bytes the scratch arena may reserve
    pub fn scratch_capacity(mut self, capacity: usize) -> Self {
        self.config.scratch_capacity = Some(capacity);
        self
    }

    /// Set the maximum key size (in bytes)
    pub fn max_key_size(mut self, size: usize) -> Self {
        self.config.max_key_size = size;
        self
    }

    /// Set the maximum value size (in bytes)
    pub fn max_value_size(mut self, size: usize) -> Self {
        self.config.max_value_size = size;
        self
    }

    /// Set the memtable size limit (in bytes)
    pub fn memtable_size_limit(mut self, size: usize) -> Self {
        self.config.memtable_size_limit = size;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
