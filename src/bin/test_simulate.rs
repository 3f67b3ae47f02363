// src/bin/test_simulate.rs
use dotenv::dotenv;
use investimate_backend::models::SimulationResponse;
use serde_json::json;
use std::env;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();

    let base = env::var("SIMULATE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let mut args = env::args().skip(1);
    let initial_investment: f64 = args.next().as_deref().unwrap_or("100000").parse()?;
    let risk_tolerance = args.next().unwrap_or_else(|| "medium".to_string());
    let num_days: u32 = args.next().as_deref().unwrap_or("365").parse()?;

    let response = reqwest::Client::new()
        .post(format!("{}/simulate", base))
        .json(&json!({
            "initial_investment": initial_investment,
            "risk_tolerance": risk_tolerance,
            "num_days": num_days,
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        println!("Request failed ({}): {}", response.status(), response.text().await?);
        return Ok(());
    }

    let result: SimulationResponse = response.json().await?;
    println!("Final value:   {:.2}", result.final_investment_value);
    println!("Total returns: {:.2}", result.total_returns);
    for (month, value) in result.monthly_values.iter().enumerate() {
        println!("Month {:>3}:     {:.2}", month + 1, value);
    }
    println!("Breakdown:     {:?}", result.investment_breakdown);
    Ok(())
}
