//! Runtime configuration, read from the environment.

use std::path::PathBuf;

use anyhow::Context;
use chrono::TimeDelta;

use crate::store::DEFAULT_TTL;

/// Settings of the referee process. Every one of them is optional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Every command line has to start with this prefix (`ARBITER_PREFIX`).
    /// Empty means no prefix.
    pub prefix: String,
    /// Group the games are played in (`ARBITER_GROUP`). Part of the game id.
    pub group: String,
    /// How long an untouched active game is kept (`ARBITER_GAME_TTL_HOURS`).
    pub game_ttl: TimeDelta,
    /// Games are stored under this directory (`ARBITER_DATA_DIR`); without it
    /// they are kept in memory.
    pub data_dir: Option<PathBuf>,
    /// Seed for assigning sides (`ARBITER_SEED`), random if not set.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            group: "local".to_string(),
            game_ttl: DEFAULT_TTL,
            data_dir: None,
            seed: None,
        }
    }
}

impl Config {
    /// Reads the configuration from process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration using `lookup` to get the value of each
    /// variable. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(prefix) = get("ARBITER_PREFIX") {
            config.prefix = prefix.trim().to_string();
        }
        if let Some(group) = get("ARBITER_GROUP") {
            config.group = group.trim().to_string();
        }
        if let Some(hours) = get("ARBITER_GAME_TTL_HOURS") {
            let hours: u32 = hours
                .trim()
                .parse()
                .with_context(|| format!("ARBITER_GAME_TTL_HOURS should be a number of hours, got \"{hours}\""))?;
            config.game_ttl = TimeDelta::try_hours(i64::from(hours))
                .context("ARBITER_GAME_TTL_HOURS is out of range")?;
        }
        config.data_dir = get("ARBITER_DATA_DIR").map(PathBuf::from);
        if let Some(seed) = get("ARBITER_SEED") {
            config.seed = Some(
                seed.trim()
                    .parse()
                    .with_context(|| format!("ARBITER_SEED should be an integer, got \"{seed}\""))?,
            );
        }
        Ok(config)
    }
}
