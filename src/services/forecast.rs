// src/services/forecast.rs
use chrono::{Duration, NaiveDate};
use log::{debug, error};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimulationError};
use crate::services::registry::ModelRegistry;

/// Column holding the model's point estimate.
pub const POINT_ESTIMATE: &str = "yhat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instrument {
    Nifty,
    Bonds,
    Bitcoin,
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Instrument::Nifty => "Nifty",
            Instrument::Bonds => "Bonds",
            Instrument::Bitcoin => "Bitcoin",
        };
        write!(f, "{}", name)
    }
}

/// Per-date output of a forecasting model, one column per named series.
#[derive(Debug, Clone, Default)]
pub struct Prediction {
    columns: HashMap<String, Vec<f64>>,
}

impl Prediction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }
}

/// An opaque, pre-trained predictor. Instances are shared across requests,
/// so `predict` must only read.
pub trait ForecastModel: Send + Sync {
    fn predict(&self, dates: &[NaiveDate]) -> anyhow::Result<Prediction>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChangeBasis {
    /// `(p[i] - p[i-1]) / p[0] * 100`
    #[default]
    DayOverDay,
    /// `(p[i] - p[0]) / p[0] * 100`
    SinceStart,
}

impl FromStr for ChangeBasis {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day_over_day" => Ok(ChangeBasis::DayOverDay),
            "since_start" => Ok(ChangeBasis::SinceStart),
            other => Err(format!("unknown change basis '{}'", other)),
        }
    }
}

/// Daily percentage changes for the three forecast-driven buckets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forecasts {
    pub nifty: Vec<f64>,
    pub bonds: Vec<f64>,
    pub bitcoin: Vec<f64>,
}

pub fn future_dates(start: NaiveDate, num_days: usize) -> Vec<NaiveDate> {
    (0..num_days)
        .map(|offset| start + Duration::days(offset as i64))
        .collect()
}

/// Converts a price path into percentage changes normalized by the first
/// price. The first entry is always zero.
pub fn percent_changes(prices: &[f64], basis: ChangeBasis) -> Vec<f64> {
    let Some(&first) = prices.first() else {
        return Vec::new();
    };

    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let reference = match basis {
                ChangeBasis::DayOverDay if i > 0 => prices[i - 1],
                _ => first,
            };
            (price - reference) / first * 100.0
        })
        .collect()
}

fn changes_for(
    registry: &ModelRegistry,
    instrument: Instrument,
    dates: &[NaiveDate],
    basis: ChangeBasis,
) -> Result<Vec<f64>> {
    let prediction = registry.model(instrument).predict(dates).map_err(|e| {
        error!("Error during prediction for {}: {:#}", instrument, e);
        SimulationError::PredictionFailure {
            instrument,
            message: format!("{:#}", e),
        }
    })?;

    let prices = prediction
        .column(POINT_ESTIMATE)
        .ok_or(SimulationError::MissingPredictionField {
            instrument,
            field: POINT_ESTIMATE,
        })?;

    if prices.len() != dates.len() {
        return Err(SimulationError::malformed(format!(
            "{} model returned {} estimates for {} dates",
            instrument,
            prices.len(),
            dates.len()
        )));
    }

    let changes = percent_changes(prices, basis);
    if changes.iter().any(|c| !c.is_finite()) {
        return Err(SimulationError::malformed(format!(
            "{} forecast produced non-finite changes (first estimate {})",
            instrument,
            prices.first().copied().unwrap_or_default()
        )));
    }

    debug!("Derived {} daily changes for {}", changes.len(), instrument);
    Ok(changes)
}

/// Runs all three models over `num_days` dates starting at `start`.
/// Fails as a whole if any instrument fails.
pub fn generate_forecasts(
    registry: &ModelRegistry,
    start: NaiveDate,
    num_days: usize,
    basis: ChangeBasis,
) -> Result<Forecasts> {
    let dates = future_dates(start, num_days);

    let nifty = changes_for(registry, Instrument::Nifty, &dates, basis)?;
    let bonds = changes_for(registry, Instrument::Bonds, &dates, basis)?;
    let bitcoin = changes_for(registry, Instrument::Bitcoin, &dates, basis)?;

    Ok(Forecasts {
        nifty,
        bonds,
        bitcoin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct FixedPrices(Vec<f64>);

    impl ForecastModel for FixedPrices {
        fn predict(&self, dates: &[NaiveDate]) -> anyhow::Result<Prediction> {
            let prices = self.0.iter().copied().take(dates.len()).collect();
            Ok(Prediction::new().with_column(POINT_ESTIMATE, prices))
        }
    }

    struct Failing;

    impl ForecastModel for Failing {
        fn predict(&self, _dates: &[NaiveDate]) -> anyhow::Result<Prediction> {
            anyhow::bail!("model exploded")
        }
    }

    struct NoPointEstimate;

    impl ForecastModel for NoPointEstimate {
        fn predict(&self, dates: &[NaiveDate]) -> anyhow::Result<Prediction> {
            Ok(Prediction::new().with_column("trend", vec![1.0; dates.len()]))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<Vec<NaiveDate>>>);

    impl ForecastModel for Recording {
        fn predict(&self, dates: &[NaiveDate]) -> anyhow::Result<Prediction> {
            self.0.lock().unwrap().push(dates.to_vec());
            Ok(Prediction::new().with_column(POINT_ESTIMATE, vec![100.0; dates.len()]))
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 27).unwrap()
    }

    fn fixed(prices: &[f64]) -> Arc<dyn ForecastModel> {
        Arc::new(FixedPrices(prices.to_vec()))
    }

    #[test]
    fn dates_are_consecutive_from_start() {
        let dates = future_dates(start(), 4);
        let expected: Vec<NaiveDate> = ["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01"]
            .iter()
            .map(|d| d.parse().unwrap())
            .collect();
        assert_eq!(dates, expected);
        assert!(future_dates(start(), 0).is_empty());
    }

    #[test]
    fn day_over_day_changes_are_normalized_by_first_price() {
        let changes = percent_changes(&[100.0, 110.0, 99.0], ChangeBasis::DayOverDay);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0], 0.0);
        assert!((changes[1] - 10.0).abs() < 1e-12);
        assert!((changes[2] + 11.0).abs() < 1e-12);
    }

    #[test]
    fn since_start_changes_compare_against_first_price() {
        let changes = percent_changes(&[200.0, 210.0, 190.0], ChangeBasis::SinceStart);
        assert_eq!(changes[0], 0.0);
        assert!((changes[1] - 5.0).abs() < 1e-12);
        assert!((changes[2] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn change_basis_parses_from_config_strings() {
        assert_eq!("day_over_day".parse::<ChangeBasis>(), Ok(ChangeBasis::DayOverDay));
        assert_eq!(" Since_Start ".parse::<ChangeBasis>(), Ok(ChangeBasis::SinceStart));
        assert!("weekly".parse::<ChangeBasis>().is_err());
    }

    #[test]
    fn forecasts_cover_each_instrument() {
        let registry = ModelRegistry::new(
            fixed(&[100.0, 101.0]),
            fixed(&[50.0, 50.0]),
            fixed(&[10.0, 12.0]),
        );
        let forecasts = generate_forecasts(&registry, start(), 2, ChangeBasis::DayOverDay).unwrap();
        assert_eq!(forecasts.nifty[0], 0.0);
        assert!((forecasts.nifty[1] - 1.0).abs() < 1e-12);
        assert_eq!(forecasts.bonds, vec![0.0, 0.0]);
        assert!((forecasts.bitcoin[1] - 20.0).abs() < 1e-12);
    }

    #[test]
    fn every_model_sees_the_same_dates() {
        let recorder = Arc::new(Recording::default());
        let registry = ModelRegistry::new(recorder.clone(), recorder.clone(), recorder.clone());
        generate_forecasts(&registry, start(), 3, ChangeBasis::DayOverDay).unwrap();

        let calls = recorder.0.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|dates| *dates == future_dates(start(), 3)));
    }

    #[test]
    fn zero_days_passes_empty_dates() {
        let recorder = Arc::new(Recording::default());
        let registry = ModelRegistry::new(recorder.clone(), recorder.clone(), recorder.clone());
        let forecasts = generate_forecasts(&registry, start(), 0, ChangeBasis::DayOverDay).unwrap();

        assert!(forecasts.nifty.is_empty());
        assert!(recorder.0.lock().unwrap().iter().all(Vec::is_empty));
    }

    #[test]
    fn failing_model_fails_the_whole_forecast() {
        let registry = ModelRegistry::new(fixed(&[1.0]), Arc::new(Failing), fixed(&[1.0]));
        let err = generate_forecasts(&registry, start(), 1, ChangeBasis::DayOverDay).unwrap_err();
        match err {
            SimulationError::PredictionFailure { instrument, message } => {
                assert_eq!(instrument, Instrument::Bonds);
                assert!(message.contains("model exploded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_point_estimate_names_the_instrument() {
        let registry = ModelRegistry::new(fixed(&[1.0]), fixed(&[1.0]), Arc::new(NoPointEstimate));
        let err = generate_forecasts(&registry, start(), 1, ChangeBasis::DayOverDay).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::MissingPredictionField {
                instrument: Instrument::Bitcoin,
                field: "yhat"
            }
        ));
        assert_eq!(err.to_string(), "'yhat' column not found in Bitcoin predictions");
    }

    #[test]
    fn short_or_degenerate_predictions_are_rejected() {
        let registry = ModelRegistry::new(fixed(&[1.0]), fixed(&[1.0, 1.0]), fixed(&[1.0, 1.0]));
        let err = generate_forecasts(&registry, start(), 2, ChangeBasis::DayOverDay).unwrap_err();
        assert!(matches!(err, SimulationError::MalformedInput { .. }));

        let registry = ModelRegistry::new(fixed(&[0.0, 1.0]), fixed(&[1.0, 1.0]), fixed(&[1.0, 1.0]));
        let err = generate_forecasts(&registry, start(), 2, ChangeBasis::DayOverDay).unwrap_err();
        assert!(matches!(err, SimulationError::MalformedInput { .. }));
    }

    #[test]
    fn since_start_basis_compounds_against_the_first_price() {
        let registry = ModelRegistry::new(
            fixed(&[100.0, 101.0, 102.0]),
            fixed(&[50.0, 50.0, 50.0]),
            fixed(&[10.0, 10.0, 10.0]),
        );
        let since_start = generate_forecasts(&registry, start(), 3, ChangeBasis::SinceStart).unwrap();
        let day_over_day = generate_forecasts(&registry, start(), 3, ChangeBasis::DayOverDay).unwrap();
        assert!((since_start.nifty[2] - 2.0).abs() < 1e-12);
        assert!((day_over_day.nifty[2] - 1.0).abs() < 1e-12);

        let tier = crate::models::RiskTolerance::High;
        let result = crate::services::simulation::simulate(1_000.0, &tier, &since_start).unwrap();
        assert!((result.holdings.nifty - 350.0 * 1.01 * 1.02).abs() < 1e-9);
        assert_eq!(result.holdings.bonds, 1_000.0 * 0.10);
    }
}
