use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use crate::error::{CacheError, Result};

/// A simulation run: a single cache, and optionally the addresses to feed it
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub cache: CacheConfig,
    #[serde(default)]
    pub addresses: Vec<i64>,
}

impl SimulationConfig {
    /// Reads a simulation configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| CacheError::InvalidConfiguration(format!("couldn't parse the config file: {e}")))
    }
}

/// The configuration for a single cache
///
/// Sizes are signed so that a caller can hand over whatever the user typed; validation happens
/// when the model is built
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheConfig {
    pub memory_size: i64,
    pub cache_size: i64,
    pub block_size: i64,
    pub mapping: MappingConfig,
    #[serde(default)]
    pub replacement_policy: ReplacementPolicyConfig,
    /// Seed for the random replacement policy
    #[serde(default)]
    pub seed: u64,
}

impl CacheConfig {
    pub fn new(memory_size: i64, cache_size: i64, block_size: i64, mapping: MappingConfig, replacement_policy: ReplacementPolicyConfig) -> Self {
        Self {
            memory_size,
            cache_size,
            block_size,
            mapping,
            replacement_policy,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// How addresses are placed into the cache - direct mapped or fully associative
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum MappingConfig {
    #[serde(alias = "direct", alias = "Direct Mapping")]
    #[value(alias = "direct")]
    DirectMapped,
    #[serde(alias = "full", alias = "Fully Associative")]
    #[value(alias = "full")]
    FullyAssociative,
}

impl Display for MappingConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingConfig::DirectMapped => f.write_str("Direct Mapping"),
            MappingConfig::FullyAssociative => f.write_str("Fully Associative"),
        }
    }
}

/// The replacement policy, only used by fully associative caches. Defaults to LRU.
///
/// Names are matched case insensitively. Anything unrecognised is kept as written, so that the
/// error can be reported once the policy actually matters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReplacementPolicyConfig {
    LeastRecentlyUsed,
    FirstInFirstOut,
    Random,
    LeastFrequentlyUsed,
    MostRecentlyUsed,
    Unrecognised(String),
}

impl ReplacementPolicyConfig {
    /// The short name of the policy, as shown to users
    pub fn name(&self) -> &str {
        match self {
            ReplacementPolicyConfig::LeastRecentlyUsed => "LRU",
            ReplacementPolicyConfig::FirstInFirstOut => "FIFO",
            ReplacementPolicyConfig::Random => "RANDOM",
            ReplacementPolicyConfig::LeastFrequentlyUsed => "LFU",
            ReplacementPolicyConfig::MostRecentlyUsed => "MRU",
            ReplacementPolicyConfig::Unrecognised(name) => name,
        }
    }
}

impl Default for ReplacementPolicyConfig {
    fn default() -> Self {
        ReplacementPolicyConfig::LeastRecentlyUsed
    }
}

impl From<&str> for ReplacementPolicyConfig {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "lru" | "leastrecentlyused" => ReplacementPolicyConfig::LeastRecentlyUsed,
            "fifo" | "firstinfirstout" => ReplacementPolicyConfig::FirstInFirstOut,
            "random" => ReplacementPolicyConfig::Random,
            "lfu" | "leastfrequentlyused" => ReplacementPolicyConfig::LeastFrequentlyUsed,
            "mru" | "mostrecentlyused" => ReplacementPolicyConfig::MostRecentlyUsed,
            _ => ReplacementPolicyConfig::Unrecognised(value.to_string()),
        }
    }
}

impl From<String> for ReplacementPolicyConfig {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<ReplacementPolicyConfig> for String {
    fn from(value: ReplacementPolicyConfig) -> Self {
        value.name().to_string()
    }
}

impl Display for ReplacementPolicyConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
