// src/services/simulation.rs
use log::{debug, info};

use crate::error::{Result, SimulationError};
use crate::models::{MonthlySnapshot, RiskTolerance, SimulationResult};
use crate::services::allocation::initial_holdings;
use crate::services::forecast::Forecasts;

pub const BANK_ANNUAL_RATE: f64 = 0.065;
pub const MUTUAL_FUND_ANNUAL_RATE: f64 = 0.10;
pub const DAYS_PER_YEAR: f64 = 365.0;
pub const SNAPSHOT_INTERVAL_DAYS: usize = 30;

fn check_lengths(forecasts: &Forecasts) -> Result<usize> {
    let days = forecasts.nifty.len();
    if forecasts.bonds.len() != days || forecasts.bitcoin.len() != days {
        return Err(SimulationError::malformed(format!(
            "forecast lengths differ: nifty={}, bonds={}, bitcoin={}",
            days,
            forecasts.bonds.len(),
            forecasts.bitcoin.len()
        )));
    }
    Ok(days)
}

/// Compounds each bucket once per forecast day and records the portfolio
/// total every 30th day.
pub fn simulate(
    initial_investment: f64,
    tolerance: &RiskTolerance,
    forecasts: &Forecasts,
) -> Result<SimulationResult> {
    let days = check_lengths(forecasts)?;

    let bank_growth = 1.0 + BANK_ANNUAL_RATE / DAYS_PER_YEAR;
    let mutual_fund_growth = 1.0 + MUTUAL_FUND_ANNUAL_RATE / DAYS_PER_YEAR;

    let mut holdings = initial_holdings(initial_investment, tolerance);
    let mut monthly = Vec::with_capacity(days / SNAPSHOT_INTERVAL_DAYS);

    for day in 0..days {
        holdings.bank *= bank_growth;
        holdings.mutual_fund *= mutual_fund_growth;

        holdings.bonds *= 1.0 + forecasts.bonds[day] / 100.0;
        holdings.nifty *= 1.0 + forecasts.nifty[day] / 100.0;
        holdings.bitcoin *= 1.0 + forecasts.bitcoin[day] / 100.0;

        if (day + 1) % SNAPSHOT_INTERVAL_DAYS == 0 {
            let snapshot = MonthlySnapshot {
                month: monthly.len() + 1,
                day: day + 1,
                total: holdings.total(),
                holdings,
            };
            debug!("Month {} value: {:.2}", snapshot.month, snapshot.total);
            monthly.push(snapshot);
        }
    }

    let final_investment_value = holdings.total();
    let total_returns = final_investment_value - initial_investment;
    info!(
        "Simulated {} days for '{}' tolerance: final {:.2}, returns {:.2}",
        days, tolerance, final_investment_value, total_returns
    );

    Ok(SimulationResult {
        holdings,
        final_investment_value,
        total_returns,
        monthly,
    })
}
