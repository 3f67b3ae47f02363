// src/config.rs
use anyhow::{Context, Result};
use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use warp::http::uri::Authority;
use warp::http::HeaderValue;

use crate::services::forecast::ChangeBasis;

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub model_dir: PathBuf,
    /// `None` allows any origin.
    pub cors_origin: Option<String>,
    pub max_in_flight: usize,
    pub prediction_timeout: Duration,
    pub max_num_days: u32,
    pub change_basis: ChangeBasis,
    pub strict_risk_tolerance: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: 5000,
            model_dir: PathBuf::from("./models"),
            cors_origin: Some("http://localhost:5173".to_string()),
            max_in_flight: 8,
            prediction_timeout: Duration::from_secs(30),
            max_num_days: 36_500,
            change_basis: ChangeBasis::DayOverDay,
            strict_risk_tolerance: false,
        }
    }
}

fn var_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        Err(_) => {
            warn!("${} not set, defaulting to {}", name, default);
            Ok(default)
        }
    }
}

/// `*` means any origin; anything else must be a bare `scheme://host[:port]`.
fn parse_cors_origin(raw: &str) -> Result<Option<String>> {
    let origin = raw.trim();
    if origin == "*" {
        return Ok(None);
    }

    let (scheme, host) = origin
        .split_once("://")
        .with_context(|| format!("CORS_ORIGIN '{}' must look like scheme://host", origin))?;
    if scheme.is_empty() || host.is_empty() || host.contains('/') {
        anyhow::bail!("CORS_ORIGIN '{}' must look like scheme://host", origin);
    }
    host.parse::<Authority>()
        .with_context(|| format!("CORS_ORIGIN '{}' has an invalid host", origin))?;
    HeaderValue::from_str(origin)
        .with_context(|| format!("CORS_ORIGIN '{}' is not a valid header value", origin))?;

    Ok(Some(origin.to_string()))
}

impl Settings {
    /// Reads settings from the environment. Unset variables keep their
    /// defaults; malformed ones are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Settings::default();

        let model_dir = env::var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let cors_origin = match env::var("CORS_ORIGIN") {
            Ok(raw) => parse_cors_origin(&raw)?,
            Err(_) => defaults.cors_origin,
        };

        let change_basis = match env::var("CHANGE_BASIS") {
            Ok(raw) => raw
                .parse::<ChangeBasis>()
                .map_err(|e| anyhow::anyhow!("CHANGE_BASIS: {}", e))?,
            Err(_) => defaults.change_basis,
        };

        let max_in_flight: usize = var_or("MAX_IN_FLIGHT", defaults.max_in_flight)?;
        if max_in_flight == 0 {
            anyhow::bail!("MAX_IN_FLIGHT must be at least 1");
        }

        let timeout_secs: u64 = var_or(
            "PREDICTION_TIMEOUT_SECS",
            defaults.prediction_timeout.as_secs(),
        )?;

        let settings = Settings {
            port: var_or("PORT", defaults.port)?,
            model_dir,
            cors_origin,
            max_in_flight,
            prediction_timeout: Duration::from_secs(timeout_secs),
            max_num_days: var_or("MAX_NUM_DAYS", defaults.max_num_days)?,
            change_basis,
            strict_risk_tolerance: var_or("STRICT_RISK_TOLERANCE", defaults.strict_risk_tolerance)?,
        };
        info!("Loaded settings: {:?}", settings);
        Ok(settings)
    }
}
