//! Key performance indicators for the report view.
//!
//! The previous period is simulated as a fixed fraction of the current one,
//! and the targets are fixed. Retention, satisfaction, market share and
//! acquisition cost are reference figures: the dataset carries nothing they
//! could be computed from.

use crate::analysis::stats::{round_half_up, round_unsigned};
use crate::analysis::{average_income, records, share, total_income, IncomeThresholds};
use crate::models::Customer;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

const TARGET_CUSTOMERS: u64 = 60;
const TARGET_TOTAL_INCOME: u64 = 3_000_000;
const TARGET_AVERAGE_INCOME: u64 = 50_000;
const TARGET_HIGH_VALUE_PERCENTAGE: u64 = 25;

const PREVIOUS_CUSTOMERS_FACTOR: f64 = 0.9;
const PREVIOUS_TOTAL_INCOME_FACTOR: f64 = 0.85;
const PREVIOUS_AVERAGE_INCOME_FACTOR: f64 = 0.95;
const PREVIOUS_HIGH_VALUE_FACTOR: f64 = 0.9;

/// How a KPI stands against its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KpiStatus {
    OnTrack,
    AtRisk,
    OffTrack,
}

impl KpiStatus {
    /// `>= 90` on track, `>= 70` at risk, otherwise off track.
    pub fn from_progress(progress: u64) -> Self {
        if progress >= 90 {
            KpiStatus::OnTrack
        } else if progress >= 70 {
            KpiStatus::AtRisk
        } else {
            KpiStatus::OffTrack
        }
    }
}

impl fmt::Display for KpiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiStatus::OnTrack => write!(f, "on track"),
            KpiStatus::AtRisk => write!(f, "at risk"),
            KpiStatus::OffTrack => write!(f, "off track"),
        }
    }
}

/// Display unit of a KPI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiUnit {
    Count,
    Currency,
    Percent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub unit: KpiUnit,
    pub current: u64,
    pub target: u64,
    pub previous: u64,
    /// Percent of target reached, capped at 100.
    pub progress: u64,
    /// Period-over-period change in percent.
    pub change: i64,
    pub status: KpiStatus,
    /// Whether a smaller value is the better one.
    pub lower_is_better: bool,
}

impl Kpi {
    pub fn new(name: &str, unit: KpiUnit, current: u64, target: u64, previous: u64) -> Self {
        let progress = progress(current, target);
        Self {
            name: name.to_string(),
            unit,
            current,
            target,
            previous,
            progress,
            change: change(current, previous),
            status: KpiStatus::from_progress(progress),
            lower_is_better: false,
        }
    }

    /// A KPI where staying under the target counts as reaching it.
    pub fn inverse(name: &str, unit: KpiUnit, current: u64, target: u64, previous: u64) -> Self {
        let progress = progress(target, current);
        Self {
            name: name.to_string(),
            unit,
            current,
            target,
            previous,
            progress,
            change: change(previous, current),
            status: KpiStatus::from_progress(progress),
            lower_is_better: true,
        }
    }
}

/// `min(round(current / target * 100), 100)`, zero for a zero target.
pub fn progress(current: u64, target: u64) -> u64 {
    if target == 0 {
        return 0;
    }
    round_unsigned(current as f64 / target as f64 * 100.0).min(100)
}

/// `round((current - previous) / previous * 100)`, zero for a zero previous.
pub fn change(current: u64, previous: u64) -> i64 {
    if previous == 0 {
        return 0;
    }
    round_half_up((current as f64 - previous as f64) / previous as f64 * 100.0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMetrics {
    pub customer: Vec<Kpi>,
    pub financial: Vec<Kpi>,
}

/// Customer and financial KPIs of a collection.
pub fn key_metrics<C: Borrow<Customer>>(customers: &[C], thresholds: IncomeThresholds) -> KeyMetrics {
    let total = customers.len() as u64;
    let income = total_income(customers);
    let average = average_income(customers);
    let high_value = records(customers)
        .filter(|c| c.income >= thresholds.high)
        .count();
    let high_value_percentage = share(high_value, customers.len());

    let previous = |value: u64, factor: f64| round_unsigned(value as f64 * factor);

    KeyMetrics {
        customer: vec![
            Kpi::new(
                "Total Customers",
                KpiUnit::Count,
                total,
                TARGET_CUSTOMERS,
                previous(total, PREVIOUS_CUSTOMERS_FACTOR),
            ),
            Kpi::new(
                "High Value Customers",
                KpiUnit::Percent,
                high_value_percentage,
                TARGET_HIGH_VALUE_PERCENTAGE,
                previous(high_value_percentage, PREVIOUS_HIGH_VALUE_FACTOR),
            ),
            Kpi::new("Customer Retention", KpiUnit::Percent, 83, 85, 82),
            Kpi::new("Customer Satisfaction", KpiUnit::Percent, 88, 90, 87),
        ],
        financial: vec![
            Kpi::new(
                "Total Income",
                KpiUnit::Currency,
                income,
                TARGET_TOTAL_INCOME,
                previous(income, PREVIOUS_TOTAL_INCOME_FACTOR),
            ),
            Kpi::new(
                "Average Income",
                KpiUnit::Currency,
                average,
                TARGET_AVERAGE_INCOME,
                previous(average, PREVIOUS_AVERAGE_INCOME_FACTOR),
            ),
            Kpi::new("Market Share", KpiUnit::Percent, 14, 15, 12),
            Kpi::inverse("Customer Acquisition Cost", KpiUnit::Currency, 520, 500, 550),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_customers;

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(progress(50, 60), 83);
        assert_eq!(progress(90, 60), 100);
        assert_eq!(progress(10, 0), 0);
    }

    #[test]
    fn test_change_guards_zero_previous() {
        assert_eq!(change(50, 45), 11);
        assert_eq!(change(40, 50), -20);
        assert_eq!(change(10, 0), 0);
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(KpiStatus::from_progress(90), KpiStatus::OnTrack);
        assert_eq!(KpiStatus::from_progress(89), KpiStatus::AtRisk);
        assert_eq!(KpiStatus::from_progress(70), KpiStatus::AtRisk);
        assert_eq!(KpiStatus::from_progress(69), KpiStatus::OffTrack);
    }

    #[test]
    fn test_reference_key_metrics() {
        let metrics = key_metrics(&reference_customers(), IncomeThresholds::default());

        let customers = &metrics.customer[0];
        assert_eq!((customers.current, customers.previous), (50, 45));
        assert_eq!((customers.progress, customers.change), (83, 11));
        assert_eq!(customers.status, KpiStatus::AtRisk);

        let high_value = &metrics.customer[1];
        assert_eq!((high_value.current, high_value.previous), (14, 13));
        assert_eq!((high_value.progress, high_value.change), (56, 8));

        let income = &metrics.financial[0];
        assert_eq!(income.previous, 1_556_198);
        assert_eq!((income.progress, income.change), (61, 18));
        assert_eq!(income.status, KpiStatus::OffTrack);

        let average = &metrics.financial[1];
        assert_eq!((average.current, average.previous), (49_482, 47_008));
        assert_eq!((average.progress, average.change), (99, 5));
        assert_eq!(average.status, KpiStatus::OnTrack);
    }

    #[test]
    fn test_acquisition_cost_is_inverse() {
        let metrics = key_metrics::<Customer>(&[], IncomeThresholds::default());
        let cost = &metrics.financial[3];
        assert!(cost.lower_is_better);
        assert_eq!((cost.progress, cost.change), (96, 6));

        assert_eq!(metrics.customer[0].progress, 0);
        assert_eq!(metrics.customer[0].change, 0);
    }
}
