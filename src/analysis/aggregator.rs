//! Customer aggregation and filtering.
//!
//! This module provides the grouped counts, averages, percentages and
//! segment breakdowns that feed every report view. All functions accept any
//! slice whose items borrow as [`Customer`], so both the full collection and
//! filtered views can be passed directly.

use crate::analysis::stats::round_unsigned;
use crate::models::{
    Customer, CustomerField, FilterCriteria, Gender, MaritalStatus, NameValue, OverviewMetrics,
    SegmentMetrics,
};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;

/// A labelled inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub label: &'static str,
    pub min: u64,
    pub max: u64,
}

impl Bucket {
    pub const fn new(label: &'static str, min: u64, max: u64) -> Self {
        Self { label, min, max }
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Age groups used by the demographics view.
pub const DEMOGRAPHIC_AGE_GROUPS: &[Bucket] = &[
    Bucket::new("20-29", 20, 29),
    Bucket::new("30-39", 30, 39),
    Bucket::new("40-49", 40, 49),
    Bucket::new("50+", 50, 100),
];

/// Age groups used by the overview distribution. The outer buckets are open
/// so no customer is dropped.
pub const DISTRIBUTION_AGE_GROUPS: &[Bucket] = &[
    Bucket::new("20-29", 0, 29),
    Bucket::new("30-39", 30, 39),
    Bucket::new("40-49", 40, 49),
    Bucket::new("50+", 50, u64::MAX),
];

/// Income ranges used by the overview distribution.
pub const INCOME_DISTRIBUTION: &[Bucket] = &[
    Bucket::new("No Income", 0, 0),
    Bucket::new("1-25K", 1, 24_999),
    Bucket::new("25K-50K", 25_000, 49_999),
    Bucket::new("50K-75K", 50_000, 74_999),
    Bucket::new("75K+", 75_000, u64::MAX),
];

/// Income ranges used by the customer value distribution.
pub const VALUE_DISTRIBUTION: &[Bucket] = &[
    Bucket::new("No Income", 0, 0),
    Bucket::new("$1 - $25K", 1, 25_000),
    Bucket::new("$25K - $50K", 25_001, 50_000),
    Bucket::new("$50K - $75K", 50_001, 75_000),
    Bucket::new("$75K - $100K", 75_001, 100_000),
    Bucket::new("$100K+", 100_001, u64::MAX),
];

/// Income cut-offs separating low, mid and high value customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeThresholds {
    /// Lowest income of the mid value tier.
    pub mid: u64,
    /// Lowest income of the high value tier.
    pub high: u64,
}

impl Default for IncomeThresholds {
    fn default() -> Self {
        Self {
            mid: 25_000,
            high: 75_000,
        }
    }
}

/// Income contributed by one range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeShare {
    pub name: String,
    pub income: u64,
    pub percentage: u64,
}

/// Iterate the customers behind any borrowed slice.
pub fn records<C: Borrow<Customer>>(customers: &[C]) -> impl Iterator<Item = &Customer> {
    customers.iter().map(|c| Borrow::<Customer>::borrow(c))
}

/// `round(numerator / denominator * 100)`, or `0` when the denominator is zero.
pub fn percentage(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    round_unsigned(numerator as f64 / denominator as f64 * 100.0)
}

/// Percentage of `count` out of `total` items.
pub fn share(count: usize, total: usize) -> u64 {
    percentage(count as u64, total as u64)
}

/// Count customers per distinct value of `field`, in first-seen order.
pub fn group_count<C: Borrow<Customer>>(customers: &[C], field: CustomerField) -> Vec<NameValue> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<NameValue> = Vec::new();

    for customer in records(customers) {
        let key = customer.field_value(field);
        match index.get(&key) {
            Some(&i) => counts[i].value += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push(NameValue::new(key, 1));
            }
        }
    }

    counts
}

/// Sum of all incomes.
pub fn total_income<C: Borrow<Customer>>(customers: &[C]) -> u64 {
    records(customers).map(|c| c.income).sum()
}

/// Number of customers that reported an income.
pub fn with_income_count<C: Borrow<Customer>>(customers: &[C]) -> usize {
    records(customers).filter(|c| c.has_income()).count()
}

/// Rounded mean income over customers with a non-zero income.
pub fn average_income<C: Borrow<Customer>>(customers: &[C]) -> u64 {
    let earners = with_income_count(customers);
    if earners == 0 {
        return 0;
    }
    round_unsigned(total_income(customers) as f64 / earners as f64)
}

/// Rounded mean age; `0` for an empty collection.
pub fn average_age<C: Borrow<Customer>>(customers: &[C]) -> u64 {
    if customers.is_empty() {
        return 0;
    }
    let sum: u64 = records(customers).map(|c| c.age as u64).sum();
    round_unsigned(sum as f64 / customers.len() as f64)
}

/// Count customers per age bucket. Customers outside every bucket are dropped.
pub fn age_bucket<C: Borrow<Customer>>(customers: &[C], buckets: &[Bucket]) -> Vec<NameValue> {
    count_into_buckets(customers, buckets, |c| c.age as u64)
}

/// Count customers per income bucket. Customers outside every bucket are dropped.
pub fn income_bucket<C: Borrow<Customer>>(customers: &[C], buckets: &[Bucket]) -> Vec<NameValue> {
    count_into_buckets(customers, buckets, |c| c.income)
}

fn count_into_buckets<C, F>(customers: &[C], buckets: &[Bucket], key: F) -> Vec<NameValue>
where
    C: Borrow<Customer>,
    F: Fn(&Customer) -> u64,
{
    buckets
        .iter()
        .map(|bucket| {
            let count = records(customers)
                .filter(|c| bucket.contains(key(*c)))
                .count();
            NameValue::new(bucket.label, count as u64)
        })
        .collect()
}

/// Income summed per range with its share of total income. Ranges that
/// contribute nothing are omitted.
pub fn income_contribution<C: Borrow<Customer>>(
    customers: &[C],
    buckets: &[Bucket],
) -> Vec<IncomeShare> {
    let total = total_income(customers);

    buckets
        .iter()
        .map(|bucket| {
            let income: u64 = records(customers)
                .map(|c| c.income)
                .filter(|i| bucket.contains(*i))
                .sum();
            IncomeShare {
                name: bucket.label.to_string(),
                income,
                percentage: percentage(income, total),
            }
        })
        .filter(|s| s.income > 0)
        .collect()
}

/// Customers matching every populated criteria field, in input order.
pub fn filter_customers<'a>(
    customers: &'a [Customer],
    criteria: &FilterCriteria,
) -> Vec<&'a Customer> {
    customers.iter().filter(|c| criteria.matches(c)).collect()
}

/// Metrics for a segment measured against a population.
pub fn segment_metrics<C: Borrow<Customer>>(
    name: &str,
    segment: &[C],
    population: usize,
    population_income: u64,
) -> SegmentMetrics {
    let count = segment.len();
    let males = records(segment)
        .filter(|c| c.gender == Gender::Male)
        .count();
    let married = records(segment)
        .filter(|c| c.marital_status == MaritalStatus::Married)
        .count();
    let income = total_income(segment);

    SegmentMetrics {
        name: name.to_string(),
        count,
        average_age: average_age(segment),
        average_income: average_income(segment),
        percentage: share(count, population),
        male_percentage: share(males, count),
        married_percentage: share(married, count),
        total_income: income,
        income_share: percentage(income, population_income),
    }
}

/// Partition into High Value, Mid Value, Low Value and No Income segments.
pub fn segment_by_income<C: Borrow<Customer>>(
    customers: &[C],
    thresholds: IncomeThresholds,
) -> Vec<SegmentMetrics> {
    let tiers: [(&str, Box<dyn Fn(u64) -> bool>); 4] = [
        ("High Value", Box::new(move |i: u64| i >= thresholds.high)),
        (
            "Mid Value",
            Box::new(move |i: u64| i >= thresholds.mid && i < thresholds.high),
        ),
        ("Low Value", Box::new(move |i: u64| i > 0 && i < thresholds.mid)),
        ("No Income", Box::new(|i: u64| i == 0)),
    ];

    partition(customers, &tiers, |c| c.income)
}

/// Partition into Young (< 30), Middle-aged (30-44) and Senior (45+) segments.
pub fn segment_by_age<C: Borrow<Customer>>(customers: &[C]) -> Vec<SegmentMetrics> {
    let tiers: [(&str, Box<dyn Fn(u64) -> bool>); 3] = [
        ("Young (< 30)", Box::new(|a: u64| a < 30)),
        ("Middle-aged (30-44)", Box::new(|a: u64| (30..45).contains(&a))),
        ("Senior (45+)", Box::new(|a: u64| a >= 45)),
    ];

    partition(customers, &tiers, |c| c.age as u64)
}

fn partition<C, F>(
    customers: &[C],
    tiers: &[(&str, Box<dyn Fn(u64) -> bool>)],
    key: F,
) -> Vec<SegmentMetrics>
where
    C: Borrow<Customer>,
    F: Fn(&Customer) -> u64,
{
    let population_income = total_income(customers);

    tiers
        .iter()
        .map(|(name, accepts)| {
            let members: Vec<&Customer> = records(customers)
                .filter(|c| accepts(key(*c)))
                .collect();
            segment_metrics(name, &members, customers.len(), population_income)
        })
        .collect()
}

/// Share of customers whose income is strictly above `income`.
pub fn share_above_income<C: Borrow<Customer>>(customers: &[C], income: u64) -> u64 {
    let above = records(customers).filter(|c| c.income > income).count();
    share(above, customers.len())
}

/// Headline metrics for a collection.
pub fn overview_metrics<C: Borrow<Customer>>(customers: &[C]) -> OverviewMetrics {
    let total = customers.len();
    let with_income = with_income_count(customers);
    let males = records(customers)
        .filter(|c| c.gender == Gender::Male)
        .count();
    let married = records(customers)
        .filter(|c| c.marital_status == MaritalStatus::Married)
        .count();

    OverviewMetrics {
        total_customers: total,
        customers_with_income: with_income,
        income_percentage: share(with_income, total),
        total_income: total_income(customers),
        average_income: average_income(customers),
        male_customers: males,
        female_customers: total - males,
        male_percentage: share(males, total),
        married_percentage: share(married, total),
        average_age: average_age(customers),
    }
}
