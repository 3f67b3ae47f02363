// src/handlers/simulate.rs
use chrono::Local;
use log::{error, info, warn};
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use warp::reply::Json;
use warp::{Rejection, Reply};

use super::error::ApiError;
use crate::config::Settings;
use crate::models::{RiskTolerance, SimulationRequest, SimulationResponse, SimulationResult};
use crate::services::export::monthly_csv;
use crate::services::forecast::generate_forecasts;
use crate::services::simulation::simulate;
use crate::state::AppState;

fn validate(request: &SimulationRequest, settings: &Settings) -> Result<(), ApiError> {
    if !request.initial_investment.is_finite() || request.initial_investment <= 0.0 {
        return Err(ApiError::bad_request(format!(
            "initial_investment must be a positive number, got {}",
            request.initial_investment
        )));
    }

    if request.num_days > settings.max_num_days {
        return Err(ApiError::bad_request(format!(
            "num_days must be at most {}, got {}",
            settings.max_num_days, request.num_days
        )));
    }

    if settings.strict_risk_tolerance {
        if let RiskTolerance::Unrecognized(label) = &request.risk_tolerance {
            return Err(ApiError::bad_request(format!(
                "risk_tolerance must be one of low, medium, high; got '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// Forecasts and simulates on the blocking pool, bounded by the in-flight
/// limiter and the prediction timeout.
async fn run_simulation(
    request: SimulationRequest,
    state: &AppState,
) -> Result<SimulationResult, ApiError> {
    validate(&request, &state.settings)?;

    let permit = state.limiter.clone().try_acquire_owned().map_err(|_| {
        warn!("Rejecting simulation request: too many in flight");
        ApiError::unavailable("Too many simulations in progress, try again shortly")
    })?;

    let registry = state.registry.clone();
    let basis = state.settings.change_basis;
    let start = Local::now().date_naive();

    let task = tokio::task::spawn_blocking(move || {
        // Held until the computation ends, even if the caller timed out.
        let _permit = permit;
        let forecasts =
            generate_forecasts(&registry, start, request.num_days as usize, basis)?;
        simulate(request.initial_investment, &request.risk_tolerance, &forecasts)
    });

    match tokio::time::timeout(state.settings.prediction_timeout, task).await {
        Ok(Ok(result)) => result.map_err(|e| {
            error!("Simulation failed: {}", e);
            ApiError::from(e)
        }),
        Ok(Err(join_error)) => {
            error!("Simulation task panicked: {}", join_error);
            Err(ApiError::internal("Simulation task failed"))
        }
        Err(_) => {
            error!(
                "Simulation exceeded {:?} timeout",
                state.settings.prediction_timeout
            );
            Err(ApiError::timeout("Forecasting took too long"))
        }
    }
}

pub async fn simulate_investment(
    request: SimulationRequest,
    state: AppState,
) -> Result<Json, Rejection> {
    info!(
        "Handling simulation: {} over {} days at '{}' risk",
        request.initial_investment, request.num_days, request.risk_tolerance
    );

    let result = run_simulation(request, &state)
        .await
        .map_err(warp::reject::custom)?;

    Ok(warp::reply::json(&SimulationResponse::from(result)))
}

pub async fn simulate_investment_csv(
    request: SimulationRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    info!(
        "Handling CSV simulation: {} over {} days at '{}' risk",
        request.initial_investment, request.num_days, request.risk_tolerance
    );

    let result = run_simulation(request, &state)
        .await
        .map_err(warp::reject::custom)?;

    let body = monthly_csv(&result).map_err(|e| {
        error!("Failed to write CSV: {:#}", e);
        warp::reject::custom(ApiError::internal("Failed to build CSV export"))
    })?;

    Ok(warp::reply::with_header(
        warp::reply::with_header(body, CONTENT_TYPE, "text/csv; charset=utf-8"),
        CONTENT_DISPOSITION,
        "attachment; filename=\"investment_simulation_results.csv\"",
    ))
}
