//! Outlier and unusual-pattern detection.
//!
//! Outliers are customers further than `sigma` population standard deviations
//! from the mean. Income statistics only consider customers with an income.

use crate::analysis::aggregator::{records, share};
use crate::analysis::stats::{mean, round_unsigned, standard_deviation};
use crate::data::unique_values;
use crate::models::{Customer, CustomerField, Gender};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// Tuning knobs for anomaly detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnomalySettings {
    /// Width of the normal band in standard deviations.
    pub sigma: f64,
    /// Male/female average income ratio above which a division is flagged.
    pub disparity_ratio: f64,
}

impl Default for AnomalySettings {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            disparity_ratio: 1.5,
        }
    }
}

/// Mean, standard deviation and the resulting normal band of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub mean: f64,
    pub std_dev: f64,
    pub lower: f64,
    pub upper: f64,
}

impl Band {
    pub fn new(values: &[f64], sigma: f64) -> Self {
        let m = mean(values);
        let sd = standard_deviation(values);
        Self {
            mean: m,
            std_dev: sd,
            lower: m - sigma * sd,
            upper: m + sigma * sd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualPattern {
    pub title: String,
    pub description: String,
    pub count: usize,
}

/// Simple data-quality facts shown next to the outliers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub no_income_count: usize,
    pub no_income_percentage: u64,
    pub male_count: usize,
    pub female_count: usize,
    pub min_age: u32,
    pub max_age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub income_band: Band,
    pub high_income_outliers: Vec<Customer>,
    pub low_income_outliers: Vec<Customer>,
    pub age_band: Band,
    pub age_outliers: Vec<Customer>,
    pub patterns: Vec<UnusualPattern>,
    pub quality: DataQuality,
}

/// Run every detector over the collection.
pub fn detect_anomalies<C: Borrow<Customer>>(
    customers: &[C],
    settings: AnomalySettings,
) -> AnomalyReport {
    let earners: Vec<&Customer> = records(customers).filter(|c| c.has_income()).collect();
    let incomes: Vec<f64> = earners.iter().map(|c| c.income as f64).collect();
    let income_band = Band::new(&incomes, settings.sigma);

    let high_income_outliers = earners
        .iter()
        .filter(|c| c.income as f64 > income_band.upper)
        .map(|c| (*c).clone())
        .collect();
    let low_income_outliers = earners
        .iter()
        .filter(|c| (c.income as f64) < income_band.lower)
        .map(|c| (*c).clone())
        .collect();

    let ages: Vec<f64> = records(customers).map(|c| c.age as f64).collect();
    let age_band = Band::new(&ages, settings.sigma);
    let age_outliers = records(customers)
        .filter(|c| (c.age as f64 - age_band.mean).abs() > settings.sigma * age_band.std_dev)
        .cloned()
        .collect();

    AnomalyReport {
        income_band,
        high_income_outliers,
        low_income_outliers,
        age_band,
        age_outliers,
        patterns: unusual_patterns(customers, income_band.mean, settings.disparity_ratio),
        quality: data_quality(customers),
    }
}

/// Young high earners, division gender income gaps and skewed marital mixes.
pub fn unusual_patterns<C: Borrow<Customer>>(
    customers: &[C],
    mean_income: f64,
    disparity_ratio: f64,
) -> Vec<UnusualPattern> {
    let mut patterns = Vec::new();

    let young_high_earners = records(customers)
        .filter(|c| c.age < 30 && c.income as f64 > mean_income * 1.5)
        .count();
    if young_high_earners > 0 {
        patterns.push(UnusualPattern {
            title: "Young High Earners".to_string(),
            description: format!(
                "{} customers under 30 with income 50% above average",
                young_high_earners
            ),
            count: young_high_earners,
        });
    }

    let owned: Vec<Customer> = records(customers).cloned().collect();

    for division in unique_values(&owned, CustomerField::Division) {
        let earners: Vec<&Customer> = owned
            .iter()
            .filter(|c| c.division == division && c.has_income())
            .collect();
        let male: Vec<f64> = earners
            .iter()
            .filter(|c| c.gender == Gender::Male)
            .map(|c| c.income as f64)
            .collect();
        let female: Vec<f64> = earners
            .iter()
            .filter(|c| c.gender == Gender::Female)
            .map(|c| c.income as f64)
            .collect();

        if male.is_empty() || female.is_empty() {
            continue;
        }

        let (male_avg, female_avg) = (mean(&male), mean(&female));
        let ratio = male_avg.max(female_avg) / male_avg.min(female_avg);
        if ratio > disparity_ratio {
            patterns.push(UnusualPattern {
                title: format!("Gender Income Gap in {}", division),
                description: format!(
                    "{:.1}x difference between male and female average income",
                    ratio
                ),
                count: earners.len(),
            });
        }
    }

    if !owned.is_empty() {
        for status in unique_values(&owned, CustomerField::MaritalStatus) {
            let count = owned
                .iter()
                .filter(|c| c.marital_status.to_string() == status)
                .count();
            let pct = count as f64 / owned.len() as f64 * 100.0;

            if pct < 10.0 || pct > 70.0 {
                patterns.push(UnusualPattern {
                    title: format!("Unusual {} Distribution", status),
                    description: format!("{}% of customers are {}", round_unsigned(pct), status),
                    count,
                });
            }
        }
    }

    patterns
}

/// Missing-income share, gender counts and age range.
pub fn data_quality<C: Borrow<Customer>>(customers: &[C]) -> DataQuality {
    let no_income_count = records(customers).filter(|c| !c.has_income()).count();
    let male_count = records(customers)
        .filter(|c| c.gender == Gender::Male)
        .count();

    DataQuality {
        no_income_count,
        no_income_percentage: share(no_income_count, customers.len()),
        male_count,
        female_count: customers.len() - male_count,
        min_age: records(customers).map(|c| c.age).min().unwrap_or(0),
        max_age: records(customers).map(|c| c.age).max().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_customers;
    use crate::models::MaritalStatus;

    fn customer(id: &str, age: u32, income: u64) -> Customer {
        Customer {
            id: id.to_string(),
            name: id.to_string(),
            division: "Sylhet".to_string(),
            gender: Gender::Male,
            marital_status: MaritalStatus::Married,
            age,
            income,
        }
    }

    #[test]
    fn test_extreme_income_is_high_outlier() {
        let mut customers: Vec<Customer> = (0..12)
            .map(|i| customer(&format!("C{}", i), 40, 40_000 + i * 100))
            .collect();
        customers.push(customer("RICH", 40, 1_000_000));
        customers.push(customer("NONE", 40, 0));

        let report = detect_anomalies(&customers, AnomalySettings::default());
        assert_eq!(report.high_income_outliers.len(), 1);
        assert_eq!(report.high_income_outliers[0].id, "RICH");
        assert!(report.low_income_outliers.is_empty());
        assert_eq!(report.quality.no_income_count, 1);
    }

    #[test]
    fn test_age_outlier() {
        let mut customers: Vec<Customer> = (0..10)
            .map(|i| customer(&format!("C{}", i), 30 + (i % 3) as u32, 0))
            .collect();
        customers.push(customer("OLD", 95, 0));

        let report = detect_anomalies(&customers, AnomalySettings::default());
        assert_eq!(report.age_outliers.len(), 1);
        assert_eq!(report.age_outliers[0].id, "OLD");
    }

    #[test]
    fn test_empty_collection() {
        let report = detect_anomalies::<Customer>(&[], AnomalySettings::default());
        assert!(report.high_income_outliers.is_empty());
        assert!(report.patterns.is_empty());
        assert_eq!(report.income_band.mean, 0.0);
        assert_eq!(report.quality, DataQuality::default());
    }

    #[test]
    fn test_reference_dataset_patterns() {
        let customers = reference_customers();
        let report = detect_anomalies(&customers, AnomalySettings::default());

        assert!(report.high_income_outliers.is_empty());
        assert!(report.age_outliers.is_empty());

        let titles: Vec<&str> = report.patterns.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Young High Earners",
                "Gender Income Gap in Rajshahi",
                "Gender Income Gap in Mymensingh",
                "Unusual Divorced Distribution",
            ]
        );
        assert_eq!(report.patterns[0].count, 2);
        assert_eq!(report.patterns[3].description, "8% of customers are Divorced");

        assert_eq!(report.quality.no_income_count, 13);
        assert_eq!(report.quality.no_income_percentage, 26);
        assert_eq!((report.quality.min_age, report.quality.max_age), (24, 50));
    }
}
