// src/services/registry.rs
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use log::info;
use serde::Deserialize;
use std::f64::consts::PI;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, SimulationError};
use crate::services::forecast::{ForecastModel, Instrument, Prediction, POINT_ESTIMATE};

const YEAR_DAYS: f64 = 365.25;

/// The three forecasting models, built once and shared read-only.
#[derive(Clone)]
pub struct ModelRegistry {
    nifty: Arc<dyn ForecastModel>,
    bonds: Arc<dyn ForecastModel>,
    bitcoin: Arc<dyn ForecastModel>,
}

impl ModelRegistry {
    pub fn new(
        nifty: Arc<dyn ForecastModel>,
        bonds: Arc<dyn ForecastModel>,
        bitcoin: Arc<dyn ForecastModel>,
    ) -> Self {
        Self { nifty, bonds, bitcoin }
    }

    /// Loads every artifact from `dir`. Fails if any single model is unusable.
    pub fn load(dir: &Path) -> Result<Self> {
        let nifty = load_model(dir, Instrument::Nifty)?;
        let bonds = load_model(dir, Instrument::Bonds)?;
        let bitcoin = load_model(dir, Instrument::Bitcoin)?;
        info!("Models loaded successfully from {}", dir.display());

        Ok(Self::new(Arc::new(nifty), Arc::new(bonds), Arc::new(bitcoin)))
    }

    pub fn model(&self, instrument: Instrument) -> &dyn ForecastModel {
        match instrument {
            Instrument::Nifty => self.nifty.as_ref(),
            Instrument::Bonds => self.bonds.as_ref(),
            Instrument::Bitcoin => self.bitcoin.as_ref(),
        }
    }
}

pub fn model_file(instrument: Instrument) -> &'static str {
    match instrument {
        Instrument::Nifty => "nifty_prophet_model.json",
        Instrument::Bonds => "bonds_prophet_model.json",
        Instrument::Bitcoin => "bitcoin_prophet_model.json",
    }
}

fn load_model(dir: &Path, instrument: Instrument) -> Result<ProphetModel> {
    let path = dir.join(model_file(instrument));
    info!("Loading {} model from {}", instrument, path.display());

    ProphetModel::from_file(&path).map_err(|e| SimulationError::ModelLoadFailure {
        instrument,
        path,
        message: format!("{:#}", e),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct Changepoint {
    pub day: f64,
    pub slope_delta: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FourierTerm {
    pub cos: f64,
    pub sin: f64,
}

/// Additive trend + seasonality model exported from a fitted forecaster.
///
/// `yhat(t) = trend(t) + yearly(t) + weekly[weekday]` where `t` is the
/// number of days since `anchor`. The trend is piecewise linear: each
/// changepoint adds `slope_delta` to the slope from `day` onwards.
#[derive(Debug, Clone, Deserialize)]
pub struct ProphetModel {
    pub anchor: NaiveDate,
    pub intercept: f64,
    pub slope: f64,
    #[serde(default)]
    pub changepoints: Vec<Changepoint>,
    #[serde(default)]
    pub yearly: Vec<FourierTerm>,
    /// Offsets indexed Monday = 0 .. Sunday = 6.
    #[serde(default)]
    pub weekly: Option<[f64; 7]>,
}

impl ProphetModel {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let model: ProphetModel = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let coefficients = [self.intercept, self.slope]
            .into_iter()
            .chain(self.changepoints.iter().flat_map(|c| [c.day, c.slope_delta]))
            .chain(self.yearly.iter().flat_map(|t| [t.cos, t.sin]))
            .chain(self.weekly.iter().flatten().copied());

        for value in coefficients {
            if !value.is_finite() {
                anyhow::bail!("model contains a non-finite coefficient");
            }
        }
        Ok(())
    }

    fn trend(&self, t: f64) -> f64 {
        let shifted: f64 = self
            .changepoints
            .iter()
            .filter(|c| t > c.day)
            .map(|c| c.slope_delta * (t - c.day))
            .sum();
        self.intercept + self.slope * t + shifted
    }

    fn yearly_seasonality(&self, t: f64) -> f64 {
        self.yearly
            .iter()
            .enumerate()
            .map(|(k, term)| {
                let angle = 2.0 * PI * (k as f64 + 1.0) * t / YEAR_DAYS;
                term.cos * angle.cos() + term.sin * angle.sin()
            })
            .sum()
    }

    fn weekly_seasonality(&self, date: NaiveDate) -> f64 {
        self.weekly
            .map(|w| w[date.weekday().num_days_from_monday() as usize])
            .unwrap_or(0.0)
    }
}

impl ForecastModel for ProphetModel {
    fn predict(&self, dates: &[NaiveDate]) -> anyhow::Result<Prediction> {
        let mut trend = Vec::with_capacity(dates.len());
        let mut yhat = Vec::with_capacity(dates.len());

        for &date in dates {
            let t = (date - self.anchor).num_days() as f64;
            let base = self.trend(t);
            trend.push(base);
            yhat.push(base + self.yearly_seasonality(t) + self.weekly_seasonality(date));
        }

        Ok(Prediction::new()
            .with_column("trend", trend)
            .with_column(POINT_ESTIMATE, yhat))
    }
}
