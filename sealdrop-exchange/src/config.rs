//! Exchange configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the document exchange.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Secret the master key is derived from. When absent, a random
    /// secret is generated at startup — development only, since every
    /// document encrypted under it becomes undecryptable on restart.
    pub master_secret: Option<String>,

    /// Interval between expiry sweeps (seconds).
    pub sweep_interval_secs: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            master_secret: None,
            sweep_interval_secs: 300,
        }
    }
}

impl ExchangeConfig {
    /// Loads configuration from the environment.
    ///
    /// `SEALDROP_MASTER_SECRET` supplies the key-derivation secret;
    /// `SEALDROP_SWEEP_INTERVAL_SECS` overrides the sweep cadence.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            master_secret: std::env::var("SEALDROP_MASTER_SECRET").ok(),
            sweep_interval_secs: std::env::var("SEALDROP_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.sweep_interval_secs),
        }
    }
}
