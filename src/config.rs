//! Configuration management for BeatChain

use crate::blockchain::core::chain::{check_difficulty, DEFAULT_DIFFICULTY, DEFAULT_REWARD};
use crate::error::{ChainError, Result};
use crate::miner::{SealOptions, DEFAULT_BATCH_SIZE};
use crate::transaction::Amount;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "beatchain.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub miner: MinerConfig,
}

/// Fixed for the lifetime of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_difficulty")]
    pub difficulty: u32,
    #[serde(default = "default_reward")]
    pub reward: Amount,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            reward: default_reward(),
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<()> {
        check_difficulty(self.difficulty)?;
        if !self.reward.is_finite() || self.reward <= 0.0 {
            return Err(ChainError::InvalidConfig(format!(
                "reward must be a positive number, got {}",
                self.reward
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: default_batch_size(),
        }
    }
}

impl MinerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ChainError::InvalidConfig("miner.workers must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ChainError::InvalidConfig("miner.batch_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

impl From<&MinerConfig> for SealOptions {
    fn from(config: &MinerConfig) -> Self {
        SealOptions {
            workers: config.workers,
            batch_size: config.batch_size,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.ledger.validate()?;
        self.miner.validate()
    }
}

/// Load `beatchain.toml` from the working directory.
pub fn load_config() -> Result<Config> {
    load_config_from(Path::new(DEFAULT_CONFIG_PATH))
}

/// Load and validate a config file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

fn default_difficulty() -> u32 {
    DEFAULT_DIFFICULTY
}

fn default_reward() -> Amount {
    DEFAULT_REWARD
}

fn default_workers() -> usize {
    1
}

fn default_batch_size() -> u64 {
    DEFAULT_BATCH_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ledger.difficulty, 3);
        assert_eq!(config.ledger.reward, 50.0);
        assert_eq!(config.miner.workers, 1);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let file = write_config("[ledger]\ndifficulty = 4\n");
        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.ledger.difficulty, 4);
        assert_eq!(config.ledger.reward, 50.0);
        assert_eq!(config.miner, MinerConfig::default());
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            "[ledger]\ndifficulty = 2\nreward = 12.5\n\n[miner]\nworkers = 4\nbatch_size = 256\n",
        );
        let config = load_config_from(file.path()).unwrap();
        assert_eq!(config.ledger, LedgerConfig { difficulty: 2, reward: 12.5 });
        let options = SealOptions::from(&config.miner);
        assert_eq!(options, SealOptions { workers: 4, batch_size: 256 });
    }

    #[test]
    fn test_invalid_values_rejected() {
        let file = write_config("[ledger]\ndifficulty = 0\n");
        assert!(matches!(load_config_from(file.path()), Err(ChainError::InvalidConfig(_))));

        let file = write_config("[ledger]\nreward = -1.0\n");
        assert!(matches!(load_config_from(file.path()), Err(ChainError::InvalidConfig(_))));

        let file = write_config("[miner]\nworkers = 0\n");
        assert!(matches!(load_config_from(file.path()), Err(ChainError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let file = write_config("[ledger\ndifficulty = ");
        assert!(matches!(load_config_from(file.path()), Err(ChainError::Parse(_))));
    }
}
