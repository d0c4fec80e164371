//! Initial monitored-source configuration loading.

use std::path::Path;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::models::{SocialAccount, Subscriber, TrackedWallet};

/// The seed set of monitored sources, loaded at startup. The runtime
/// registry can diverge from this file afterwards; it is never written
/// back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourcesConfig {
    /// Social accounts to monitor from startup.
    #[serde(default)]
    pub accounts: Vec<SocialAccount>,

    /// Wallets to track from startup.
    #[serde(default)]
    pub wallets: Vec<TrackedWallet>,

    /// SMS subscribers registered from startup.
    #[serde(default)]
    pub subscribers: Vec<Subscriber>,
}

impl SourcesConfig {
    /// Loads the sources configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let s = Config::builder().add_source(File::from(path)).build()?;
        s.try_deserialize()
    }
}
