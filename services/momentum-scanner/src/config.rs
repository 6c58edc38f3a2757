//! Scanner Settings
//!
//! Layered from built-in defaults, an optional TOML file and `SCANNER_*`
//! environment variables, in that order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};

/// Default settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "scanner.toml";

/// Run configuration for a scan
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Settings {
    /// Currency units risked per trade
    pub risk_amount: Decimal,
    /// Reward multiple applied to the stop distance
    pub rr_ratio: Decimal,
    /// Size of the market-cap ranked universe
    pub coin_count: usize,
    /// Minimum absolute 24h change, in percent
    pub momentum_threshold: Decimal,
    /// Credential passed through to the reasoning service
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    #[serde(default)]
    pub coingecko_api_key: Option<String>,
    pub vs_currency: String,
    pub history_days: u32,
    /// Cap on simultaneous candidate analyses; unset means one per candidate
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            risk_amount: Decimal::from(10),
            rr_ratio: Decimal::from(3),
            coin_count: 50,
            momentum_threshold: Decimal::from(3),
            gemini_api_key: None,
            gemini_model: default_gemini_model(),
            coingecko_api_key: None,
            vs_currency: "usd".to_string(),
            history_days: 1,
            max_concurrency: None,
        }
    }
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Settings {
    /// Load settings, reading the file named by `SCANNER_CONFIG` if set
    pub fn load() -> Result<Self> {
        let path = std::env::var("SCANNER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SETTINGS_FILE));
        Self::load_from(&path)
    }

    /// Load settings from a specific file; a missing file is not an error
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Settings::default();

        let built = config::Config::builder()
            .set_default("risk_amount", defaults.risk_amount.to_string())?
            .set_default("rr_ratio", defaults.rr_ratio.to_string())?
            .set_default("coin_count", defaults.coin_count as i64)?
            .set_default("momentum_threshold", defaults.momentum_threshold.to_string())?
            .set_default("gemini_model", defaults.gemini_model)?
            .set_default("vs_currency", defaults.vs_currency)?
            .set_default("history_days", defaults.history_days as i64)?
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("SCANNER"))
            .build()?;

        let mut settings: Settings = built.try_deserialize()?;

        if settings.gemini_api_key.is_none() {
            settings.gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check numeric ranges
    pub fn validate(&self) -> Result<()> {
        validate_scan_parameters(self.momentum_threshold, self.risk_amount, self.rr_ratio)?;
        if self.coin_count == 0 {
            return Err(ScanError::Configuration(
                "coin_count must be at least 1".to_string(),
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(ScanError::Configuration(
                "max_concurrency must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// The reasoning credential, required before any network activity
    pub fn credential(&self) -> Result<&str> {
        require_credential(self.gemini_api_key.as_deref())
    }
}

/// Range checks shared by settings validation and direct pipeline runs
pub(crate) fn validate_scan_parameters(
    threshold: Decimal,
    risk_amount: Decimal,
    rr_ratio: Decimal,
) -> Result<()> {
    if risk_amount <= Decimal::ZERO {
        return Err(ScanError::Configuration(
            "risk_amount must be positive".to_string(),
        ));
    }
    if rr_ratio <= Decimal::ZERO {
        return Err(ScanError::Configuration(
            "rr_ratio must be positive".to_string(),
        ));
    }
    if threshold < Decimal::ZERO {
        return Err(ScanError::Configuration(
            "momentum_threshold must not be negative".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn require_credential(credential: Option<&str>) -> Result<&str> {
    match credential.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(ScanError::Configuration(
            "missing reasoning service credential (set gemini_api_key or GEMINI_API_KEY)"
                .to_string(),
        )),
    }
}
