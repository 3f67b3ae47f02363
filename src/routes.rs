// src/routes.rs
use log::{error, info};
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::config::Settings;
use crate::handlers::error::ApiError;
use crate::handlers::simulate::{simulate_investment, simulate_investment_csv};
use crate::models::SimulationRequest;
use crate::state::AppState;

const MAX_BODY_BYTES: u64 = 16 * 1024;

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = StatusCode::BAD_REQUEST;
        message = format!("Invalid request body: {}", e);
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        message = "Request body too large".to_string();
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        code = StatusCode::LENGTH_REQUIRED;
        message = "Content-Length header is required".to_string();
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Expected a JSON body".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        message = "Method Not Allowed".to_string();
    } else {
        error!("Unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

fn json_body() -> impl Filter<Extract = (SimulationRequest,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    info!("Configuring routes...");

    let state_filter = warp::any().map(move || state.clone());

    let simulate_route = warp::path!("simulate")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(simulate_investment);

    let csv_route = warp::path!("simulate" / "csv")
        .and(warp::post())
        .and(json_body())
        .and(state_filter.clone())
        .and_then(simulate_investment_csv);

    info!("All routes configured successfully.");

    simulate_route.or(csv_route).recover(handle_rejection)
}

pub fn cors(settings: &Settings) -> warp::cors::Builder {
    let builder = match &settings.cors_origin {
        Some(origin) => warp::cors().allow_origin(origin.as_str()),
        None => warp::cors().allow_any_origin(),
    };
    builder
        .allow_header("content-type")
        .allow_methods(vec!["POST"])
}
