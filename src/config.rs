//! Configuration for the `cardbox` binary.
//!
//! Each value is resolved with priority: command line > `cardbox.toml` >
//! environment (`.env` included) > default.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::scheduler::DEFAULT_MULTIPLIER;

pub const CONFIG_FILE: &str = "cardbox.toml";
pub const ROOT_VAR: &str = "CARDBOX_ROOT";
pub const MULTIPLIER_VAR: &str = "CARDBOX_MULTIPLIER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one subdirectory per category.
    pub root: PathBuf,
    pub multiplier: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

/// Structure of `cardbox.toml`
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    storage: Option<StorageSection>,
    scheduler: Option<SchedulerSection>,
}

#[derive(Debug, Deserialize)]
struct StorageSection {
    root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct SchedulerSection {
    multiplier: Option<u32>,
}

/// Values given on the command line.
#[derive(Debug, Default)]
pub struct Overrides {
    pub root: Option<PathBuf>,
    pub multiplier: Option<u32>,
}

impl Config {
    /// Loads the configuration, reading `file` if it exists.
    pub fn load(file: &Path, overrides: Overrides) -> Result<Config> {
        let _ = dotenvy::dotenv();
        let parsed = match std::fs::read_to_string(file) {
            Ok(contents) => {
                tracing::info!("Using config file {}", file.display());
                toml::from_str::<ConfigFile>(&contents)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFile::default(),
            Err(e) => return Err(e.into()),
        };
        let env = |key: &str| std::env::var(key).ok();
        Self::resolve(parsed, env, overrides)
    }

    fn resolve<E>(file: ConfigFile, env: E, overrides: Overrides) -> Result<Config>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let root = overrides
            .root
            .or_else(|| file.storage.and_then(|s| s.root))
            .or_else(|| env(ROOT_VAR).map(PathBuf::from))
            .unwrap_or(defaults.root);

        let multiplier = match overrides
            .multiplier
            .or_else(|| file.scheduler.and_then(|s| s.multiplier))
        {
            Some(m) => m,
            None => match env(MULTIPLIER_VAR) {
                Some(value) => value.trim().parse().map_err(|_| {
                    Error::Config(format!("{} is not a number: {:?}", MULTIPLIER_VAR, value))
                })?,
                None => defaults.multiplier,
            },
        };
        if multiplier == 0 {
            return Err(Error::Config("multiplier must be at least 1".to_string()));
        }

        tracing::info!("Using root {} and multiplier {}", root.display(), multiplier);
        Ok(Config { root, multiplier })
    }
}

#[test]
fn test_defaults() {
    let config = Config::resolve(ConfigFile::default(), |_| None, Overrides::default()).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_priority_order() {
    let file: ConfigFile = toml::from_str("[storage]\nroot = \"from-file\"\n").unwrap();
    let env = |key: &str| match key {
        ROOT_VAR => Some(String::from("from-env")),
        MULTIPLIER_VAR => Some(String::from("3")),
        _ => None,
    };
    let config = Config::resolve(file, env, Overrides::default()).unwrap();
    assert_eq!(config.root, PathBuf::from("from-file"));
    assert_eq!(config.multiplier, 3);

    let overrides = Overrides {
        root: Some(PathBuf::from("from-cli")),
        multiplier: Some(4),
    };
    let config = Config::resolve(ConfigFile::default(), env, overrides).unwrap();
    assert_eq!(config.root, PathBuf::from("from-cli"));
    assert_eq!(config.multiplier, 4);
}

#[test]
fn test_bad_multiplier() {
    let env = |key: &str| (key == MULTIPLIER_VAR).then(|| String::from("two"));
    assert!(matches!(
        Config::resolve(ConfigFile::default(), env, Overrides::default()),
        Err(Error::Config(_))
    ));
    let file: ConfigFile = toml::from_str("[scheduler]\nmultiplier = 0\n").unwrap();
    assert!(Config::resolve(file, |_| None, Overrides::default()).is_err());
}
