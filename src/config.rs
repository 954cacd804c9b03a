use std::env;
use std::path::PathBuf;

use anyhow::Context;

/// Start-up settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Listings file loaded at start-up. Without it the window opens empty.
    pub data_path: Option<PathBuf>,
    /// Upper bound of the price range selector.
    pub price_max: u32,
    pub price_step: u32,
    pub rating_step: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            price_max: 50_000,
            price_step: 1_000,
            rating_step: 10,
        }
    }
}

impl Config {
    /// Read `AIRBNB_*` variables; the first CLI argument overrides
    /// `AIRBNB_DATA_PATH`.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::from_lookup(|key| env::var(key).ok())?;
        if let Some(path) = env::args_os().nth(1) {
            cfg.data_path = Some(PathBuf::from(path));
        }
        Ok(cfg)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let number = |key: &str, default: u32| -> anyhow::Result<u32> {
            match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{key} must be a non-negative integer, got {raw:?}")),
                None => Ok(default),
            }
        };

        let cfg = Self {
            data_path: lookup("AIRBNB_DATA_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            price_max: number("AIRBNB_PRICE_MAX", defaults.price_max)?,
            price_step: number("AIRBNB_PRICE_STEP", defaults.price_step)?.max(1),
            rating_step: number("AIRBNB_RATING_STEP", defaults.rating_step)?.max(1),
        };
        Ok(cfg)
    }
}
