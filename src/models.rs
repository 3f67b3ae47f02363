// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk tier selecting an allocation table. Labels other than
/// low/medium/high are kept as `Unrecognized` instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RiskTolerance {
    Low,
    Medium,
    High,
    Unrecognized(String),
}

impl From<String> for RiskTolerance {
    fn from(label: String) -> Self {
        match label.as_str() {
            "low" => RiskTolerance::Low,
            "medium" => RiskTolerance::Medium,
            "high" => RiskTolerance::High,
            _ => RiskTolerance::Unrecognized(label),
        }
    }
}

impl From<&str> for RiskTolerance {
    fn from(label: &str) -> Self {
        RiskTolerance::from(label.to_string())
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RiskTolerance::Low => write!(f, "low"),
            RiskTolerance::Medium => write!(f, "medium"),
            RiskTolerance::High => write!(f, "high"),
            RiskTolerance::Unrecognized(label) => write!(f, "{}", label),
        }
    }
}

/// Money held in each bucket. Serialized as the `investment_breakdown` object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Holdings {
    pub bank: f64,
    pub mutual_fund: f64,
    pub bonds: f64,
    pub nifty: f64,
    pub bitcoin: f64,
}

impl Holdings {
    pub fn total(&self) -> f64 {
        self.bank + self.mutual_fund + self.bonds + self.nifty + self.bitcoin
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySnapshot {
    pub month: usize,
    pub day: usize,
    pub total: f64,
    pub holdings: Holdings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub holdings: Holdings,
    pub final_investment_value: f64,
    pub total_returns: f64,
    pub monthly: Vec<MonthlySnapshot>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    pub initial_investment: f64,
    pub risk_tolerance: RiskTolerance,
    pub num_days: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub final_investment_value: f64,
    pub total_returns: f64,
    pub monthly_values: Vec<f64>,
    pub investment_breakdown: Holdings,
}

impl From<SimulationResult> for SimulationResponse {
    fn from(result: SimulationResult) -> Self {
        SimulationResponse {
            final_investment_value: result.final_investment_value,
            total_returns: result.total_returns,
            monthly_values: result.monthly.iter().map(|s| s.total).collect(),
            investment_breakdown: result.holdings,
        }
    }
}
