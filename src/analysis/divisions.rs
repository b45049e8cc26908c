//! Per-division and cross-tabulated income metrics.

use crate::analysis::aggregator::{average_age, average_income, records, share, Bucket};
use crate::data::unique_values;
use crate::models::{Customer, CustomerField, Gender, MaritalStatus, NameValue};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Five-year age groups used by the income trend chart.
pub const TREND_AGE_GROUPS: &[Bucket] = &[
    Bucket::new("20-24", 20, 24),
    Bucket::new("25-29", 25, 29),
    Bucket::new("30-34", 30, 34),
    Bucket::new("35-39", 35, 39),
    Bucket::new("40-44", 40, 44),
    Bucket::new("45-49", 45, 49),
    Bucket::new("50-54", 50, 54),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivisionMetrics {
    pub division: String,
    pub customer_count: usize,
    pub average_income: u64,
    pub average_age: u64,
    pub male_percentage: u64,
    pub married_percentage: u64,
}

/// One cell of the division x marital status heat map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatCell {
    pub division: String,
    pub marital_status: String,
    pub average_income: u64,
}

/// Average income per marital status within one age group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub name: String,
    pub by_status: Vec<NameValue>,
}

/// Gender split of one division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderSplit {
    pub division: String,
    pub male: usize,
    pub female: usize,
    pub male_percentage: u64,
    pub total: usize,
}

fn owned<C: Borrow<Customer>>(customers: &[C]) -> Vec<Customer> {
    records(customers).cloned().collect()
}

/// Metrics for every division, in first-seen order.
pub fn division_metrics<C: Borrow<Customer>>(customers: &[C]) -> Vec<DivisionMetrics> {
    let all = owned(customers);

    unique_values(&all, CustomerField::Division)
        .into_iter()
        .map(|division| {
            let members: Vec<&Customer> = all.iter().filter(|c| c.division == division).collect();
            let males = members.iter().filter(|c| c.gender == Gender::Male).count();
            let married = members
                .iter()
                .filter(|c| c.marital_status == MaritalStatus::Married)
                .count();

            DivisionMetrics {
                customer_count: members.len(),
                average_income: average_income(&members),
                average_age: average_age(&members),
                male_percentage: share(males, members.len()),
                married_percentage: share(married, members.len()),
                division,
            }
        })
        .collect()
}

/// Division metrics sorted by average income, highest first.
pub fn rank_by_income(mut metrics: Vec<DivisionMetrics>) -> Vec<DivisionMetrics> {
    metrics.sort_by_key(|m| std::cmp::Reverse(m.average_income));
    metrics
}

/// Average income per division, in first-seen order.
pub fn average_income_by_division<C: Borrow<Customer>>(customers: &[C]) -> Vec<NameValue> {
    division_metrics(customers)
        .into_iter()
        .map(|m| NameValue::new(m.division, m.average_income))
        .collect()
}

/// Average income for every division and marital status pair.
pub fn income_heat_map<C: Borrow<Customer>>(customers: &[C]) -> Vec<HeatCell> {
    let all = owned(customers);
    let statuses = unique_values(&all, CustomerField::MaritalStatus);

    unique_values(&all, CustomerField::Division)
        .into_iter()
        .flat_map(|division| {
            statuses
                .iter()
                .map(|status| {
                    let members: Vec<&Customer> = all
                        .iter()
                        .filter(|c| c.division == division && c.marital_status.to_string() == *status)
                        .collect();
                    HeatCell {
                        division: division.clone(),
                        marital_status: status.clone(),
                        average_income: average_income(&members),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Average income by age group and marital status.
pub fn income_by_age_and_status<C: Borrow<Customer>>(
    customers: &[C],
    groups: &[Bucket],
) -> Vec<TrendPoint> {
    let all = owned(customers);
    let statuses = unique_values(&all, CustomerField::MaritalStatus);

    groups
        .iter()
        .map(|group| {
            let by_status = statuses
                .iter()
                .map(|status| {
                    let members: Vec<&Customer> = all
                        .iter()
                        .filter(|c| {
                            group.contains(c.age as u64) && c.marital_status.to_string() == *status
                        })
                        .collect();
                    NameValue::new(status.clone(), average_income(&members))
                })
                .collect();

            TrendPoint {
                name: group.label.to_string(),
                by_status,
            }
        })
        .collect()
}

/// Average income of earners per age group.
pub fn income_by_age<C: Borrow<Customer>>(customers: &[C], groups: &[Bucket]) -> Vec<NameValue> {
    groups
        .iter()
        .map(|group| {
            let members: Vec<&Customer> = records(customers)
                .filter(|c| group.contains(c.age as u64))
                .collect();
            NameValue::new(group.label, average_income(&members))
        })
        .collect()
}

/// Male/female counts per division, largest division first.
pub fn gender_by_division<C: Borrow<Customer>>(customers: &[C]) -> Vec<GenderSplit> {
    let all = owned(customers);

    let mut splits: Vec<GenderSplit> = unique_values(&all, CustomerField::Division)
        .into_iter()
        .map(|division| {
            let members: Vec<&Customer> = all.iter().filter(|c| c.division == division).collect();
            let male = members.iter().filter(|c| c.gender == Gender::Male).count();
            GenderSplit {
                male,
                female: members.len() - male,
                male_percentage: share(male, members.len()),
                total: members.len(),
                division,
            }
        })
        .collect();

    splits.sort_by_key(|s| std::cmp::Reverse(s.total));
    splits
}

/// Count per marital status for one gender, in first-seen status order.
pub fn marital_by_gender<C: Borrow<Customer>>(customers: &[C], gender: Gender) -> Vec<NameValue> {
    let all = owned(customers);

    unique_values(&all, CustomerField::MaritalStatus)
        .into_iter()
        .map(|status| {
            let count = all
                .iter()
                .filter(|c| c.gender == gender && c.marital_status.to_string() == status)
                .count();
            NameValue::new(status, count as u64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::aggregator::DEMOGRAPHIC_AGE_GROUPS;
    use crate::data::reference_customers;

    #[test]
    fn test_division_metrics() {
        let metrics = division_metrics(&reference_customers());
        assert_eq!(metrics.len(), 8);

        let dhaka = &metrics[0];
        assert_eq!(dhaka.division, "Dhaka");
        assert_eq!(dhaka.customer_count, 6);
        assert_eq!(dhaka.average_income, 63_414);
        assert_eq!(dhaka.average_age, 38);
        assert_eq!(dhaka.male_percentage, 50);
        assert_eq!(dhaka.married_percentage, 67);

        let total: usize = metrics.iter().map(|m| m.customer_count).sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn test_rank_by_income() {
        let ranked = rank_by_income(division_metrics(&reference_customers()));
        assert_eq!(ranked[0].division, "Khulna");
        assert_eq!(ranked.last().map(|m| m.division.as_str()), Some("Barishal"));
    }

    #[test]
    fn test_heat_map_covers_every_pair() {
        let cells = income_heat_map(&reference_customers());
        assert_eq!(cells.len(), 8 * 3);

        let dhaka_married = cells
            .iter()
            .find(|c| c.division == "Dhaka" && c.marital_status == "Married")
            .unwrap();
        assert_eq!(dhaka_married.average_income, 64_830);
    }

    #[test]
    fn test_income_by_age_and_status() {
        let trend = income_by_age_and_status(&reference_customers(), TREND_AGE_GROUPS);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].name, "20-24");
        assert_eq!(trend[0].by_status[0], NameValue::new("Married", 75_690));
        assert_eq!(trend[1].by_status[1], NameValue::new("Single", 66_880));
    }

    #[test]
    fn test_gender_by_division_sorted_by_size() {
        let splits = gender_by_division(&reference_customers());
        assert!(splits.windows(2).all(|w| w[0].total >= w[1].total));
        assert!(splits.iter().all(|s| s.male + s.female == s.total));
    }

    #[test]
    fn test_marital_by_gender_counts() {
        let customers = reference_customers();
        let male: u64 = marital_by_gender(&customers, Gender::Male)
            .iter()
            .map(|n| n.value)
            .sum();
        assert_eq!(male, 24);

        let by_age = income_by_age(&customers, DEMOGRAPHIC_AGE_GROUPS);
        assert_eq!(by_age.len(), 4);
    }
}
