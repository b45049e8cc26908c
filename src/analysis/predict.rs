//! Nearest-neighbour income prediction and lifetime value.
//!
//! The prediction is an average over comparable customers, not a fitted
//! model. The broad fallback tolerance and its fixed confidence are carried
//! over unchanged so results stay comparable with the dashboard.

use crate::analysis::aggregator::{average_income, records};
use crate::analysis::stats::round_unsigned;
use crate::models::{Customer, Gender, MaritalStatus, NameValue};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use tracing::debug;

/// Constants of the two-tier matching ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionSettings {
    /// Age window of the strict tier.
    pub age_tolerance: u32,
    /// Age window of the broad tier.
    pub broad_age_tolerance: u32,
    /// Confidence reported when only the broad tier matched.
    pub broad_confidence: u32,
    /// Strict matches needed for 100% confidence.
    pub full_confidence_matches: u32,
}

impl Default for PredictionSettings {
    fn default() -> Self {
        Self {
            age_tolerance: 5,
            broad_age_tolerance: 10,
            broad_confidence: 30,
            full_confidence_matches: 10,
        }
    }
}

/// Profile to predict an income for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionQuery {
    pub age: u32,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
}

/// Which tier of the ladder produced the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Strict,
    Broad,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub income: u64,
    /// Heuristic 0-100 score.
    pub confidence: u32,
    pub tier: MatchTier,
    pub match_count: usize,
}

/// Predict income from customers of similar age, gender and marital status.
///
/// Falls back to an age-only match inside the broad window at a fixed
/// confidence, and to zero income and zero confidence when nothing matches.
pub fn nearest_neighbor_predict<C: Borrow<Customer>>(
    customers: &[C],
    query: PredictionQuery,
    settings: PredictionSettings,
) -> Prediction {
    let strict: Vec<&Customer> = records(customers)
        .filter(|c| {
            c.age.abs_diff(query.age) <= settings.age_tolerance
                && c.gender == query.gender
                && c.marital_status == query.marital_status
                && c.has_income()
        })
        .collect();

    if !strict.is_empty() {
        let full = settings.full_confidence_matches.max(1) as f64;
        let confidence = (strict.len() as f64 / full).min(1.0) * 100.0;
        debug!("Strict prediction tier matched {} customers", strict.len());
        return Prediction {
            income: average_income(&strict),
            confidence: round_unsigned(confidence) as u32,
            tier: MatchTier::Strict,
            match_count: strict.len(),
        };
    }

    let broad: Vec<&Customer> = records(customers)
        .filter(|c| c.age.abs_diff(query.age) <= settings.broad_age_tolerance && c.has_income())
        .collect();

    if !broad.is_empty() {
        debug!("Broad prediction tier matched {} customers", broad.len());
        return Prediction {
            income: average_income(&broad),
            confidence: settings.broad_confidence,
            tier: MatchTier::Broad,
            match_count: broad.len(),
        };
    }

    Prediction {
        income: 0,
        confidence: 0,
        tier: MatchTier::None,
        match_count: 0,
    }
}

/// Customers within the strict age window, regardless of profile.
pub fn similar_age_count<C: Borrow<Customer>>(customers: &[C], age: u32, tolerance: u32) -> usize {
    records(customers)
        .filter(|c| c.age.abs_diff(age) <= tolerance)
        .count()
}

/// One point of the income projection chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub name: String,
    pub value: u64,
    pub projected: bool,
}

const PROJECTION_GROUPS: &[(u32, u32)] = &[(20, 29), (30, 39), (40, 49), (50, 59), (60, 69)];

/// Average income of married earners per decade of age. Decades beyond the
/// oldest customer are marked projected and grown by 5%.
pub fn income_projection<C: Borrow<Customer>>(customers: &[C]) -> Vec<ProjectionPoint> {
    let oldest = records(customers).map(|c| c.age).max();

    PROJECTION_GROUPS
        .iter()
        .map(|&(min, max)| {
            let group: Vec<&Customer> = records(customers)
                .filter(|c| {
                    c.age >= min
                        && c.age <= max
                        && c.has_income()
                        && c.marital_status == MaritalStatus::Married
                })
                .collect();
            let avg = average_income(&group);
            let projected = oldest.map_or(false, |o| min > o);
            let value = if projected {
                round_unsigned(avg as f64 * 1.05)
            } else {
                avg
            };

            ProjectionPoint {
                name: format!("{}-{}", min, max),
                value,
                projected,
            }
        })
        .collect()
}

/// Simple lifetime value: 5% of income for every year until 65.
pub fn lifetime_value(customer: &Customer) -> u64 {
    if !customer.has_income() {
        return 0;
    }
    let years_remaining = 65u32.saturating_sub(customer.age);
    round_unsigned(customer.income as f64 * 0.05 * years_remaining as f64)
}

/// Customers with the highest lifetime value. Ties keep dataset order.
pub fn top_by_lifetime_value<C: Borrow<Customer>>(customers: &[C], n: usize) -> Vec<NameValue> {
    let mut ranked: Vec<(&Customer, u64)> = records(customers)
        .map(|c| (c, lifetime_value(c)))
        .collect();
    ranked.sort_by_key(|(_, ltv)| std::cmp::Reverse(*ltv));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(c, ltv)| NameValue::new(format!("{} ({})", c.name, c.id), ltv))
        .collect()
}
