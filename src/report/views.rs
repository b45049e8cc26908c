//! Data behind each dashboard view.
//!
//! Builders here only call into [`crate::analysis`]; the results are plain
//! serializable structs shared by the Markdown and JSON renderers.

use crate::analysis::anomaly::{detect_anomalies, AnomalyReport, AnomalySettings};
use crate::analysis::divisions::{
    average_income_by_division, division_metrics, gender_by_division, income_by_age,
    income_by_age_and_status, income_heat_map, marital_by_gender, rank_by_income,
    DivisionMetrics, GenderSplit, HeatCell, TrendPoint, TREND_AGE_GROUPS,
};
use crate::analysis::predict::{
    income_projection, nearest_neighbor_predict, similar_age_count, top_by_lifetime_value,
    Prediction, PredictionQuery, PredictionSettings, ProjectionPoint,
};
use crate::analysis::stats::{classify_correlation, pearson_correlation, CorrelationSummary};
use crate::analysis::{
    age_bucket, group_count, income_bucket, income_contribution, overview_metrics, records,
    segment_by_age, segment_by_income, share, share_above_income, total_income, IncomeShare,
    IncomeThresholds, DEMOGRAPHIC_AGE_GROUPS, DISTRIBUTION_AGE_GROUPS, INCOME_DISTRIBUTION,
    VALUE_DISTRIBUTION,
};
use crate::cli::View;
use crate::models::{
    Customer, CustomerField, Gender, MaritalStatus, NameValue, OverviewMetrics, SegmentMetrics,
};
use crate::report::metrics::{key_metrics, KeyMetrics};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Reverse;

/// Number of customers listed in the lifetime value ranking.
const TOP_LIFETIME_VALUE: usize = 10;

/// Income above which a customer under 30 counts as a young high earner in
/// the recommendations.
const YOUNG_HIGH_EARNER_INCOME: u64 = 50_000;

/// Settings every builder may need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSettings {
    pub thresholds: IncomeThresholds,
    pub prediction: PredictionSettings,
    pub anomaly: AnomalySettings,
    pub query: PredictionQuery,
}

/// Computed data of one view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewData {
    Overview(OverviewReport),
    Segments(SegmentsReport),
    Demographics(DemographicsReport),
    Analytics(Box<AnalyticsReport>),
    Report(Box<CustomerReport>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewReport {
    pub metrics: OverviewMetrics,
    /// Share of customers earning more than the average income.
    pub above_average_income_percentage: u64,
    pub by_division: Vec<NameValue>,
    pub average_income_by_division: Vec<NameValue>,
    pub by_gender: Vec<NameValue>,
    pub by_marital_status: Vec<NameValue>,
    pub age_distribution: Vec<NameValue>,
    pub income_distribution: Vec<NameValue>,
    pub value_distribution: Vec<NameValue>,
    pub income_contribution: Vec<IncomeShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentsReport {
    pub thresholds: IncomeThresholds,
    pub income_segments: Vec<SegmentMetrics>,
    pub age_segments: Vec<SegmentMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicsReport {
    pub gender_by_division: Vec<GenderSplit>,
    pub age_groups: Vec<NameValue>,
    pub income_by_age: Vec<NameValue>,
    pub marital_status_male: Vec<NameValue>,
    pub marital_status_female: Vec<NameValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSection {
    pub query: PredictionQuery,
    pub result: Prediction,
    /// Customers within the strict age window, whatever their profile.
    pub similar_age_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Age against income over customers reporting an income.
    pub age_income_correlation: CorrelationSummary,
    pub income_heat_map: Vec<HeatCell>,
    pub income_trend: Vec<TrendPoint>,
    pub anomalies: AnomalyReport,
    pub division_ranking: Vec<DivisionMetrics>,
    pub prediction: PredictionSection,
    pub income_projection: Vec<ProjectionPoint>,
    pub top_lifetime_value: Vec<NameValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overview: OverviewMetrics,
    pub female_percentage: u64,
    pub majority_gender: Gender,
    pub married_majority: bool,
    pub largest_division: Option<NameValue>,
    pub largest_division_percentage: u64,
    pub high_income_threshold: u64,
    pub high_income_percentage: u64,
    pub no_income_percentage: u64,
    pub by_division: Vec<NameValue>,
    pub income_distribution: Vec<NameValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentReport {
    pub value_segments: Vec<SegmentMetrics>,
    pub age_segments: Vec<SegmentMetrics>,
    pub high_value_by_division: Vec<NameValue>,
}

/// One row of the regional performance table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalRow {
    #[serde(flatten)]
    pub metrics: DivisionMetrics,
    pub total_income: u64,
    pub high_value_percentage: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub high_value_count: usize,
    pub high_value_percentage: u64,
    pub young_high_earners: usize,
    pub highest_income_division: Option<NameValue>,
    pub lowest_income_division: Option<NameValue>,
    pub male_percentage: u64,
    pub female_percentage: u64,
    pub married_high_value: usize,
    pub single_high_value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerReport {
    pub executive_summary: ExecutiveSummary,
    pub key_metrics: KeyMetrics,
    pub segments: SegmentReport,
    pub regional_performance: Vec<RegionalRow>,
    pub recommendations: Recommendations,
}

/// Compute the data for `view`.
pub fn build_view<C: Borrow<Customer>>(
    view: View,
    customers: &[C],
    settings: &ViewSettings,
) -> ViewData {
    match view {
        View::Overview => ViewData::Overview(overview(customers)),
        View::Segments => ViewData::Segments(segments(customers, settings.thresholds)),
        View::Demographics => ViewData::Demographics(demographics(customers)),
        View::Analytics => ViewData::Analytics(Box::new(analytics(customers, settings))),
        View::Report => {
            ViewData::Report(Box::new(customer_report(customers, settings.thresholds)))
        }
    }
}

pub fn overview<C: Borrow<Customer>>(customers: &[C]) -> OverviewReport {
    let metrics = overview_metrics(customers);

    OverviewReport {
        above_average_income_percentage: share_above_income(customers, metrics.average_income),
        by_division: group_count(customers, CustomerField::Division),
        average_income_by_division: average_income_by_division(customers),
        by_gender: group_count(customers, CustomerField::Gender),
        by_marital_status: group_count(customers, CustomerField::MaritalStatus),
        age_distribution: age_bucket(customers, DISTRIBUTION_AGE_GROUPS),
        income_distribution: income_bucket(customers, INCOME_DISTRIBUTION),
        value_distribution: income_bucket(customers, VALUE_DISTRIBUTION),
        income_contribution: income_contribution(customers, VALUE_DISTRIBUTION),
        metrics,
    }
}

pub fn segments<C: Borrow<Customer>>(customers: &[C], thresholds: IncomeThresholds) -> SegmentsReport {
    SegmentsReport {
        thresholds,
        income_segments: segment_by_income(customers, thresholds),
        age_segments: segment_by_age(customers),
    }
}

pub fn demographics<C: Borrow<Customer>>(customers: &[C]) -> DemographicsReport {
    DemographicsReport {
        gender_by_division: gender_by_division(customers),
        age_groups: age_bucket(customers, DEMOGRAPHIC_AGE_GROUPS),
        income_by_age: income_by_age(customers, DEMOGRAPHIC_AGE_GROUPS),
        marital_status_male: marital_by_gender(customers, Gender::Male),
        marital_status_female: marital_by_gender(customers, Gender::Female),
    }
}

pub fn analytics<C: Borrow<Customer>>(customers: &[C], settings: &ViewSettings) -> AnalyticsReport {
    let (ages, incomes): (Vec<f64>, Vec<f64>) = records(customers)
        .filter(|c| c.has_income())
        .map(|c| (c.age as f64, c.income as f64))
        .unzip();

    AnalyticsReport {
        age_income_correlation: classify_correlation(pearson_correlation(&ages, &incomes)),
        income_heat_map: income_heat_map(customers),
        income_trend: income_by_age_and_status(customers, TREND_AGE_GROUPS),
        anomalies: detect_anomalies(customers, settings.anomaly),
        division_ranking: rank_by_income(division_metrics(customers)),
        prediction: PredictionSection {
            query: settings.query,
            result: nearest_neighbor_predict(customers, settings.query, settings.prediction),
            similar_age_customers: similar_age_count(
                customers,
                settings.query.age,
                settings.prediction.age_tolerance,
            ),
        },
        income_projection: income_projection(customers),
        top_lifetime_value: top_by_lifetime_value(customers, TOP_LIFETIME_VALUE),
    }
}

fn high_value<C: Borrow<Customer>>(customers: &[C], thresholds: IncomeThresholds) -> Vec<&Customer> {
    records(customers)
        .filter(|c| c.income >= thresholds.high)
        .collect()
}

/// Division counts, largest first. Ties keep first-seen order.
fn divisions_by_size<C: Borrow<Customer>>(customers: &[C]) -> Vec<NameValue> {
    let mut counts = group_count(customers, CustomerField::Division);
    counts.sort_by_key(|n| Reverse(n.value));
    counts
}

pub fn executive_summary<C: Borrow<Customer>>(
    customers: &[C],
    thresholds: IncomeThresholds,
) -> ExecutiveSummary {
    let overview = overview_metrics(customers);
    let total = customers.len();
    let by_division = divisions_by_size(customers);
    let largest_division = by_division.first().cloned();
    let no_income = total - overview.customers_with_income;

    ExecutiveSummary {
        female_percentage: if total == 0 {
            0
        } else {
            100 - overview.male_percentage
        },
        majority_gender: if overview.male_percentage > 50 {
            Gender::Male
        } else {
            Gender::Female
        },
        married_majority: overview.married_percentage > 50,
        largest_division_percentage: largest_division
            .as_ref()
            .map_or(0, |d| share(d.value as usize, total)),
        largest_division,
        high_income_threshold: thresholds.high,
        high_income_percentage: share(high_value(customers, thresholds).len(), total),
        no_income_percentage: share(no_income, total),
        by_division,
        income_distribution: income_bucket(customers, INCOME_DISTRIBUTION),
        overview,
    }
}

pub fn segment_report<C: Borrow<Customer>>(
    customers: &[C],
    thresholds: IncomeThresholds,
) -> SegmentReport {
    let premium = high_value(customers, thresholds);
    let mut high_value_by_division = group_count(&premium, CustomerField::Division);
    high_value_by_division.sort_by_key(|n| Reverse(n.value));

    SegmentReport {
        value_segments: segment_by_income(customers, thresholds),
        age_segments: segment_by_age(customers),
        high_value_by_division,
    }
}

/// Division metrics with total income and high-value share, highest total
/// income first.
pub fn regional_performance<C: Borrow<Customer>>(
    customers: &[C],
    thresholds: IncomeThresholds,
) -> Vec<RegionalRow> {
    let mut rows: Vec<RegionalRow> = division_metrics(customers)
        .into_iter()
        .map(|metrics| {
            let members: Vec<&Customer> = records(customers)
                .filter(|c| c.division == metrics.division)
                .collect();
            let premium = members
                .iter()
                .filter(|c| c.income >= thresholds.high)
                .count();
            RegionalRow {
                total_income: total_income(&members),
                high_value_percentage: share(premium, members.len()),
                metrics,
            }
        })
        .collect();

    rows.sort_by_key(|r| Reverse(r.total_income));
    rows
}

pub fn recommendations<C: Borrow<Customer>>(
    customers: &[C],
    thresholds: IncomeThresholds,
) -> Recommendations {
    let total = customers.len();
    let premium = high_value(customers, thresholds);
    let overview = overview_metrics(customers);

    let earning: Vec<NameValue> = rank_by_income(division_metrics(customers))
        .into_iter()
        .filter(|d| d.average_income > 0)
        .map(|d| NameValue::new(d.division, d.average_income))
        .collect();
    let highest_income_division = earning.first().cloned();
    let lowest_income_division = earning.last().cloned();

    let with_status = |status: MaritalStatus| {
        premium
            .iter()
            .filter(|c| c.marital_status == status)
            .count()
    };

    Recommendations {
        high_value_count: premium.len(),
        high_value_percentage: share(premium.len(), total),
        young_high_earners: records(customers)
            .filter(|c| c.age < 30 && c.income >= YOUNG_HIGH_EARNER_INCOME)
            .count(),
        highest_income_division,
        lowest_income_division,
        male_percentage: overview.male_percentage,
        female_percentage: if total == 0 {
            0
        } else {
            100 - overview.male_percentage
        },
        married_high_value: with_status(MaritalStatus::Married),
        single_high_value: with_status(MaritalStatus::Single),
    }
}

pub fn customer_report<C: Borrow<Customer>>(
    customers: &[C],
    thresholds: IncomeThresholds,
) -> CustomerReport {
    CustomerReport {
        executive_summary: executive_summary(customers, thresholds),
        key_metrics: key_metrics(customers, thresholds),
        segments: segment_report(customers, thresholds),
        regional_performance: regional_performance(customers, thresholds),
        recommendations: recommendations(customers, thresholds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stats::{CorrelationDirection, CorrelationStrength};
    use crate::data::reference_customers;

    fn settings() -> ViewSettings {
        ViewSettings {
            thresholds: IncomeThresholds::default(),
            prediction: PredictionSettings::default(),
            anomaly: AnomalySettings::default(),
            query: PredictionQuery {
                age: 30,
                gender: Gender::Male,
                marital_status: MaritalStatus::Single,
            },
        }
    }

    #[test]
    fn test_overview_distributions() {
        let report = overview(&reference_customers());
        assert_eq!(report.metrics.total_customers, 50);
        assert_eq!(report.by_division.len(), 8);
        assert_eq!(report.average_income_by_division.len(), 8);
        assert_eq!(report.by_gender[0], NameValue::new("F", 26));
        let bucketed: u64 = report.income_distribution.iter().map(|n| n.value).sum();
        assert_eq!(bucketed, 50);
        let contributed: u64 = report.income_contribution.iter().map(|s| s.income).sum();
        assert_eq!(contributed, report.metrics.total_income);
    }

    #[test]
    fn test_analytics_correlation_is_weak_negative() {
        let report = analytics(&reference_customers(), &settings());
        let correlation = report.age_income_correlation;
        assert!((correlation.coefficient - -0.0417).abs() < 1e-3);
        assert_eq!(correlation.strength, CorrelationStrength::Weak);
        assert_eq!(correlation.direction, CorrelationDirection::Negative);

        assert_eq!(report.prediction.result.income, 83_689);
        assert_eq!(report.top_lifetime_value.len(), 10);
        assert_eq!(report.division_ranking[0].division, "Khulna");
    }

    #[test]
    fn test_executive_summary() {
        let summary = executive_summary(&reference_customers(), IncomeThresholds::default());
        assert_eq!(summary.largest_division, Some(NameValue::new("Khulna", 7)));
        assert_eq!(summary.largest_division_percentage, 14);
        assert_eq!(summary.high_income_percentage, 14);
        assert_eq!(summary.no_income_percentage, 26);
        assert_eq!(summary.majority_gender, Gender::Female);
        assert_eq!(summary.female_percentage, 52);
        assert!(summary.married_majority);
    }

    #[test]
    fn test_segment_report_high_value_divisions() {
        let report = segment_report(&reference_customers(), IncomeThresholds::default());
        assert_eq!(report.high_value_by_division[0], NameValue::new("Khulna", 2));
        let premium: u64 = report.high_value_by_division.iter().map(|n| n.value).sum();
        assert_eq!(premium, 7);
        assert_eq!(report.value_segments[0].total_income, 613_209);
        assert_eq!(report.value_segments[0].income_share, 33);
    }

    #[test]
    fn test_regional_performance_sorted_by_total_income() {
        let rows = regional_performance(&reference_customers(), IncomeThresholds::default());
        assert_eq!(rows[0].metrics.division, "Khulna");
        assert_eq!(rows[0].total_income, 382_133);
        assert_eq!(rows[0].high_value_percentage, 29);
        assert!(rows.windows(2).all(|w| w[0].total_income >= w[1].total_income));
    }

    #[test]
    fn test_recommendations() {
        let recs = recommendations(&reference_customers(), IncomeThresholds::default());
        assert_eq!(recs.high_value_count, 7);
        assert_eq!(recs.high_value_percentage, 14);
        assert_eq!(recs.young_high_earners, 4);
        assert_eq!(
            recs.highest_income_division,
            Some(NameValue::new("Khulna", 63_689))
        );
        assert_eq!(
            recs.lowest_income_division,
            Some(NameValue::new("Barishal", 30_930))
        );
        assert_eq!((recs.married_high_value, recs.single_high_value), (5, 2));
    }

    #[test]
    fn test_recommendations_skip_divisions_without_income() {
        let no_income: Vec<Customer> = reference_customers()
            .into_iter()
            .map(|c| Customer { income: 0, ..c })
            .collect();
        let recs = recommendations(&no_income, IncomeThresholds::default());
        assert_eq!(recs.highest_income_division, None);
        assert_eq!(recs.lowest_income_division, None);
        assert_eq!(recs.high_value_count, 0);
    }

    #[test]
    fn test_empty_collection_builds_every_view() {
        let empty: Vec<&Customer> = Vec::new();
        for view in [
            View::Overview,
            View::Segments,
            View::Demographics,
            View::Analytics,
            View::Report,
        ] {
            build_view(view, &empty, &settings());
        }
        let recs = recommendations(&empty, IncomeThresholds::default());
        assert_eq!(recs.highest_income_division, None);
        assert_eq!(recs.female_percentage, 0);
    }
}
