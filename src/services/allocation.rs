// src/services/allocation.rs
use log::warn;

use crate::models::{Holdings, RiskTolerance};

/// Fraction of initial capital placed in each bucket.
pub type RiskAllocation = Holdings;

const LOW: RiskAllocation = Holdings {
    bank: 0.45,
    mutual_fund: 0.25,
    bonds: 0.30,
    nifty: 0.0,
    bitcoin: 0.0,
};

const MEDIUM: RiskAllocation = Holdings {
    bank: 0.20,
    mutual_fund: 0.40,
    bonds: 0.10,
    nifty: 0.25,
    bitcoin: 0.05,
};

const HIGH: RiskAllocation = Holdings {
    bank: 0.10,
    mutual_fund: 0.35,
    bonds: 0.10,
    nifty: 0.35,
    bitcoin: 0.10,
};

const NONE: RiskAllocation = Holdings {
    bank: 0.0,
    mutual_fund: 0.0,
    bonds: 0.0,
    nifty: 0.0,
    bitcoin: 0.0,
};

/// Unrecognized tiers allocate nothing, so every bucket starts at zero.
pub fn allocation_for(tolerance: &RiskTolerance) -> RiskAllocation {
    match tolerance {
        RiskTolerance::Low => LOW,
        RiskTolerance::Medium => MEDIUM,
        RiskTolerance::High => HIGH,
        RiskTolerance::Unrecognized(label) => {
            warn!("Unrecognized risk tolerance '{}', allocating nothing", label);
            NONE
        }
    }
}

pub fn initial_holdings(initial_investment: f64, tolerance: &RiskTolerance) -> Holdings {
    let fractions = allocation_for(tolerance);
    Holdings {
        bank: initial_investment * fractions.bank,
        mutual_fund: initial_investment * fractions.mutual_fund,
        bonds: initial_investment * fractions.bonds,
        nifty: initial_investment * fractions.nifty,
        bitcoin: initial_investment * fractions.bitcoin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(a: RiskAllocation) -> [f64; 5] {
        [a.bank, a.bonds, a.mutual_fund, a.nifty, a.bitcoin]
    }

    #[test]
    fn tables_match_published_allocations() {
        assert_eq!(row(allocation_for(&RiskTolerance::Low)), [0.45, 0.30, 0.25, 0.0, 0.0]);
        assert_eq!(row(allocation_for(&RiskTolerance::Medium)), [0.20, 0.10, 0.40, 0.25, 0.05]);
        assert_eq!(row(allocation_for(&RiskTolerance::High)), [0.10, 0.10, 0.35, 0.35, 0.10]);
    }

    #[test]
    fn unknown_tier_allocates_nothing() {
        let tier = RiskTolerance::from("aggressive");
        assert_eq!(allocation_for(&tier), Holdings::default());
        assert_eq!(initial_holdings(5000.0, &tier).total(), 0.0);
    }

    #[test]
    fn tier_labels_are_case_sensitive() {
        assert_eq!(RiskTolerance::from("low"), RiskTolerance::Low);
        assert_eq!(
            RiskTolerance::from("Low"),
            RiskTolerance::Unrecognized("Low".to_string())
        );
    }

    #[test]
    fn holdings_scale_with_capital() {
        let holdings = initial_holdings(100_000.0, &RiskTolerance::Medium);
        assert_eq!(holdings.bank, 100_000.0 * 0.20);
        assert_eq!(holdings.mutual_fund, 100_000.0 * 0.40);
        assert_eq!(holdings.bonds, 100_000.0 * 0.10);
        assert_eq!(holdings.nifty, 100_000.0 * 0.25);
        assert_eq!(holdings.bitcoin, 100_000.0 * 0.05);
    }
}
