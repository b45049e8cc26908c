//! Markdown and JSON report generation.
//!
//! Every view is rendered as a sequence of sections, each built by a
//! `generate_*_section` function and appended to the output.

use crate::analysis::anomaly::AnomalyReport;
use crate::analysis::divisions::{DivisionMetrics, HeatCell, TrendPoint};
use crate::analysis::predict::{MatchTier, ProjectionPoint};
use crate::analysis::IncomeShare;
use crate::models::{Customer, NameValue, OverviewMetrics, SegmentMetrics};
use crate::report::metrics::{KeyMetrics, Kpi, KpiUnit};
use crate::report::views::{
    AnalyticsReport, CustomerReport, DemographicsReport, ExecutiveSummary, OverviewReport,
    PredictionSection, Recommendations, RegionalRow, SegmentReport, SegmentsReport, ViewData,
};
use crate::report::{Document, ReportMetadata};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(document: &Document) -> String {
    let mut output = String::new();

    // Title
    output.push_str(&format!("# custlens {}\n\n", document.metadata.title));

    output.push_str(&generate_metadata_section(&document.metadata));

    if !document.lookups.is_empty() {
        output.push_str(&generate_lookup_section(&document.lookups));
    }

    match &document.data {
        ViewData::Overview(report) => output.push_str(&generate_overview(report)),
        ViewData::Segments(report) => output.push_str(&generate_segments(report)),
        ViewData::Demographics(report) => output.push_str(&generate_demographics(report)),
        ViewData::Analytics(report) => output.push_str(&generate_analytics(report)),
        ViewData::Report(report) => output.push_str(&generate_customer_report(report)),
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(document: &Document) -> Result<String> {
    serde_json::to_string_pretty(document).map_err(Into::into)
}

/// Format a whole-dollar amount with thousands separators, e.g. `$1,830,821`.
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

/// Format a signed percentage change, e.g. `+11%`.
pub fn format_change(change: i64) -> String {
    if change > 0 {
        format!("+{}%", change)
    } else {
        format!("{}%", change)
    }
}

fn format_kpi_value(value: u64, unit: KpiUnit) -> String {
    match unit {
        KpiUnit::Count => value.to_string(),
        KpiUnit::Currency => format_money(value),
        KpiUnit::Percent => format!("{}%", value),
    }
}

/// A two-column table of labelled values.
fn name_value_table(label: &str, value: &str, rows: &[NameValue], money: bool) -> String {
    let mut table = String::new();

    table.push_str(&format!("| {} | {} |\n", label, value));
    table.push_str("|:---|---:|\n");
    for row in rows {
        let formatted = if money {
            format_money(row.value)
        } else {
            row.value.to_string()
        };
        table.push_str(&format!("| {} | {} |\n", row.name, formatted));
    }
    table.push('\n');

    table
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Dataset:** {}\n", metadata.source));
    section.push_str(&format!("- **Filter:** {}\n", metadata.filter));
    section.push_str(&format!("- **Customers:** {}\n", metadata.customer_count));
    if !metadata.deleted.is_empty() {
        section.push_str(&format!("- **Deleted:** {}\n", metadata.deleted.join(", ")));
    }
    section.push('\n');

    section
}

fn customer_table(customers: &[Customer]) -> String {
    let mut table = String::new();

    table.push_str("| ID | Name | Division | Gender | Marital Status | Age | Income |\n");
    table.push_str("|:---|:---|:---|:---:|:---|---:|---:|\n");
    for c in customers {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            c.id,
            c.name,
            c.division,
            c.gender,
            c.marital_status,
            c.age,
            format_money(c.income)
        ));
    }
    table.push('\n');

    table
}

fn generate_lookup_section(customers: &[Customer]) -> String {
    let mut section = String::new();

    section.push_str("## Customer Lookup\n\n");
    section.push_str(&customer_table(customers));

    section
}

fn generate_overview(report: &OverviewReport) -> String {
    let mut output = String::new();

    output.push_str(&generate_headline_section(
        &report.metrics,
        report.above_average_income_percentage,
    ));

    output.push_str("## Distributions\n\n");
    output.push_str("### By Division\n\n");
    output.push_str(&name_value_table("Division", "Customers", &report.by_division, false));
    output.push_str("### Average Income by Division\n\n");
    output.push_str(&name_value_table(
        "Division",
        "Avg Income",
        &report.average_income_by_division,
        true,
    ));
    output.push_str("### By Gender\n\n");
    output.push_str(&name_value_table("Gender", "Customers", &report.by_gender, false));
    output.push_str("### By Marital Status\n\n");
    output.push_str(&name_value_table(
        "Marital Status",
        "Customers",
        &report.by_marital_status,
        false,
    ));
    output.push_str("### Age Distribution\n\n");
    output.push_str(&name_value_table("Age Group", "Customers", &report.age_distribution, false));
    output.push_str("### Income Distribution\n\n");
    output.push_str(&name_value_table(
        "Income Range",
        "Customers",
        &report.income_distribution,
        false,
    ));
    output.push_str("### Customer Value Distribution\n\n");
    output.push_str(&name_value_table(
        "Value Range",
        "Customers",
        &report.value_distribution,
        false,
    ));
    output.push_str(&generate_contribution_section(&report.income_contribution));

    output
}

fn generate_headline_section(metrics: &OverviewMetrics, above_average: u64) -> String {
    let mut section = String::new();

    section.push_str("## Headline Metrics\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|---:|\n");
    section.push_str(&format!("| Total Customers | {} |\n", metrics.total_customers));
    section.push_str(&format!(
        "| Customers with Income | {} ({}%) |\n",
        metrics.customers_with_income, metrics.income_percentage
    ));
    section.push_str(&format!(
        "| Total Income | {} |\n",
        format_money(metrics.total_income)
    ));
    section.push_str(&format!(
        "| Average Income | {} |\n",
        format_money(metrics.average_income)
    ));
    section.push_str(&format!(
        "| Earning Above Average | {}% |\n",
        above_average
    ));
    section.push_str(&format!(
        "| Gender Ratio (M / F) | {} / {} ({}% male) |\n",
        metrics.male_customers, metrics.female_customers, metrics.male_percentage
    ));
    section.push_str(&format!("| Married | {}% |\n", metrics.married_percentage));
    section.push_str(&format!("| Average Age | {} |\n", metrics.average_age));
    section.push('\n');

    section
}

fn generate_contribution_section(shares: &[IncomeShare]) -> String {
    let mut section = String::new();

    section.push_str("### Income Contribution\n\n");
    if shares.is_empty() {
        section.push_str("No customer in this view reports an income.\n\n");
        return section;
    }

    section.push_str("| Range | Income | Share |\n");
    section.push_str("|:---|---:|---:|\n");
    for share in shares {
        section.push_str(&format!(
            "| {} | {} | {}% |\n",
            share.name,
            format_money(share.income),
            share.percentage
        ));
    }
    section.push('\n');

    section
}

fn generate_segments(report: &SegmentsReport) -> String {
    let mut output = String::new();

    output.push_str("## Income Segments\n\n");
    output.push_str(&format!(
        "*High Value: {}+ | Mid Value: {} - {} | Low Value: under {}*\n\n",
        format_money(report.thresholds.high),
        format_money(report.thresholds.mid),
        format_money(report.thresholds.high.saturating_sub(1)),
        format_money(report.thresholds.mid)
    ));
    output.push_str(&segment_table(&report.income_segments));

    output.push_str("## Age Segments\n\n");
    output.push_str(&segment_table(&report.age_segments));

    output
}

fn segment_table(segments: &[SegmentMetrics]) -> String {
    let mut table = String::new();

    table.push_str(
        "| Segment | Customers | Share | Avg Age | Avg Income | Male | Married | Income Share |\n",
    );
    table.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|\n");
    for s in segments {
        table.push_str(&format!(
            "| {} | {} | {}% | {} | {} | {}% | {}% | {}% |\n",
            s.name,
            s.count,
            s.percentage,
            s.average_age,
            format_money(s.average_income),
            s.male_percentage,
            s.married_percentage,
            s.income_share
        ));
    }
    table.push('\n');

    table
}

fn generate_demographics(report: &DemographicsReport) -> String {
    let mut output = String::new();

    output.push_str("## Gender by Division\n\n");
    output.push_str("| Division | Male | Female | Male % | Total |\n");
    output.push_str("|:---|---:|---:|---:|---:|\n");
    for split in &report.gender_by_division {
        output.push_str(&format!(
            "| {} | {} | {} | {}% | {} |\n",
            split.division, split.male, split.female, split.male_percentage, split.total
        ));
    }
    output.push('\n');

    output.push_str("## Age Groups\n\n");
    output.push_str(&name_value_table("Age Group", "Customers", &report.age_groups, false));

    output.push_str("## Income by Age\n\n");
    output.push_str(&name_value_table("Age Group", "Average Income", &report.income_by_age, true));

    output.push_str("## Marital Status by Gender\n\n");
    output.push_str("| Marital Status | Male | Female |\n");
    output.push_str("|:---|---:|---:|\n");
    for (male, female) in report
        .marital_status_male
        .iter()
        .zip(report.marital_status_female.iter())
    {
        output.push_str(&format!("| {} | {} | {} |\n", male.name, male.value, female.value));
    }
    output.push('\n');

    output
}

fn generate_analytics(report: &AnalyticsReport) -> String {
    let mut output = String::new();

    let correlation = &report.age_income_correlation;
    output.push_str("## Correlation Analysis\n\n");
    output.push_str(&format!(
        "The correlation between age and income is {} and {} (r = {:.2}).\n\n",
        correlation.strength, correlation.direction, correlation.coefficient
    ));
    output.push_str(&generate_heat_map_section(&report.income_heat_map));
    output.push_str(&generate_trend_section(&report.income_trend));
    output.push_str(&generate_anomaly_section(&report.anomalies));
    output.push_str(&generate_division_section(&report.division_ranking));
    output.push_str(&generate_prediction_section(
        &report.prediction,
        &report.income_projection,
        &report.top_lifetime_value,
    ));

    output
}

/// Render the division x marital status grid, rows and columns in
/// first-seen order.
fn generate_heat_map_section(cells: &[HeatCell]) -> String {
    let mut section = String::new();

    section.push_str("### Income Heat Map\n\n");

    let mut divisions: Vec<&str> = Vec::new();
    let mut statuses: Vec<&str> = Vec::new();
    for cell in cells {
        if !divisions.contains(&cell.division.as_str()) {
            divisions.push(&cell.division);
        }
        if !statuses.contains(&cell.marital_status.as_str()) {
            statuses.push(&cell.marital_status);
        }
    }

    section.push_str(&format!("| Division | {} |\n", statuses.join(" | ")));
    section.push_str(&format!("|:---|{}\n", "---:|".repeat(statuses.len())));
    for division in &divisions {
        let values: Vec<String> = statuses
            .iter()
            .map(|status| {
                cells
                    .iter()
                    .find(|c| c.division == *division && c.marital_status == *status)
                    .map_or_else(|| "-".to_string(), |c| format_money(c.average_income))
            })
            .collect();
        section.push_str(&format!("| {} | {} |\n", division, values.join(" | ")));
    }
    section.push('\n');

    section
}

fn generate_trend_section(points: &[TrendPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Trend Analysis\n\n");
    section.push_str("Average income by age group and marital status.\n\n");

    let statuses: Vec<&str> = points
        .first()
        .map(|p| p.by_status.iter().map(|s| s.name.as_str()).collect())
        .unwrap_or_default();

    section.push_str(&format!("| Age Group | {} |\n", statuses.join(" | ")));
    section.push_str(&format!("|:---|{}\n", "---:|".repeat(statuses.len())));
    for point in points {
        let values: Vec<String> = point
            .by_status
            .iter()
            .map(|s| format_money(s.value))
            .collect();
        section.push_str(&format!("| {} | {} |\n", point.name, values.join(" | ")));
    }
    section.push('\n');

    section
}

fn generate_anomaly_section(report: &AnomalyReport) -> String {
    let mut section = String::new();

    section.push_str("## Anomaly Detection\n\n");
    section.push_str(&format!(
        "- **Income:** mean {}, standard deviation {}, normal range {} - {}\n",
        format_money(report.income_band.mean.round() as u64),
        format_money(report.income_band.std_dev.round() as u64),
        format_money(report.income_band.lower.max(0.0).round() as u64),
        format_money(report.income_band.upper.max(0.0).round() as u64)
    ));
    section.push_str(&format!(
        "- **Age:** mean {:.1}, standard deviation {:.1}, normal range {:.1} - {:.1}\n\n",
        report.age_band.mean, report.age_band.std_dev, report.age_band.lower, report.age_band.upper
    ));

    for (title, outliers) in [
        ("High Income Outliers", &report.high_income_outliers),
        ("Low Income Outliers", &report.low_income_outliers),
        ("Age Outliers", &report.age_outliers),
    ] {
        section.push_str(&format!("### {}\n\n", title));
        if outliers.is_empty() {
            section.push_str("None detected.\n\n");
        } else {
            section.push_str(&customer_table(outliers));
        }
    }

    section.push_str("### Unusual Patterns\n\n");
    if report.patterns.is_empty() {
        section.push_str("No unusual patterns detected.\n\n");
    } else {
        for pattern in &report.patterns {
            section.push_str(&format!(
                "- **{}** ({} customers): {}\n",
                pattern.title, pattern.count, pattern.description
            ));
        }
        section.push('\n');
    }

    let quality = &report.quality;
    section.push_str("### Data Quality\n\n");
    section.push_str(&format!(
        "- Customers without income: {} ({}%)\n",
        quality.no_income_count, quality.no_income_percentage
    ));
    section.push_str(&format!(
        "- Gender: {} male, {} female\n",
        quality.male_count, quality.female_count
    ));
    section.push_str(&format!(
        "- Age range: {} - {}\n\n",
        quality.min_age, quality.max_age
    ));

    section
}

fn generate_division_section(ranking: &[DivisionMetrics]) -> String {
    let mut section = String::new();

    section.push_str("## Division Comparison\n\n");
    section.push_str("| Rank | Division | Customers | Avg Income | Avg Age | Male | Married |\n");
    section.push_str("|---:|:---|---:|---:|---:|---:|---:|\n");
    for (i, d) in ranking.iter().enumerate() {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {}% | {}% |\n",
            i + 1,
            d.division,
            d.customer_count,
            format_money(d.average_income),
            d.average_age,
            d.male_percentage,
            d.married_percentage
        ));
    }
    section.push('\n');

    section
}

fn generate_prediction_section(
    prediction: &PredictionSection,
    projection: &[ProjectionPoint],
    top: &[NameValue],
) -> String {
    let mut section = String::new();

    section.push_str("## Predictive Analytics\n\n");
    section.push_str("### Income Prediction\n\n");

    let query = &prediction.query;
    let result = &prediction.result;
    section.push_str(&format!(
        "- **Profile:** age {}, {}, {}\n",
        query.age,
        query.gender.label(),
        query.marital_status
    ));
    match result.tier {
        MatchTier::None => {
            section.push_str("- **Predicted Income:** no comparable customers\n");
        }
        tier => {
            let basis = if tier == MatchTier::Strict {
                "same gender and marital status"
            } else {
                "age only"
            };
            section.push_str(&format!(
                "- **Predicted Income:** {}\n",
                format_money(result.income)
            ));
            section.push_str(&format!(
                "- **Based on:** {} customers matched on {}\n",
                result.match_count, basis
            ));
        }
    }
    section.push_str(&format!("- **Confidence:** {}%\n", result.confidence));
    section.push_str(&format!(
        "- **Customers of similar age:** {}\n\n",
        prediction.similar_age_customers
    ));

    section.push_str("### Income Projection\n\n");
    section.push_str("Average income of married customers by age group.\n\n");
    section.push_str("| Age Group | Income | |\n");
    section.push_str("|:---|---:|:---|\n");
    for point in projection {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            point.name,
            format_money(point.value),
            if point.projected { "projected" } else { "" }
        ));
    }
    section.push('\n');

    section.push_str("### Top Customers by Lifetime Value\n\n");
    section.push_str(&name_value_table("Customer", "Lifetime Value", top, true));

    section
}

fn generate_customer_report(report: &CustomerReport) -> String {
    let mut output = String::new();

    output.push_str(&generate_executive_summary(&report.executive_summary));
    output.push_str(&generate_key_metrics_section(&report.key_metrics));
    output.push_str(&generate_segment_report(&report.segments));
    output.push_str(&generate_regional_section(&report.regional_performance));
    output.push_str(&generate_recommendations_section(&report.recommendations));

    output
}

fn generate_executive_summary(summary: &ExecutiveSummary) -> String {
    let mut section = String::new();
    let overview = &summary.overview;

    section.push_str("## Executive Summary\n\n");
    section.push_str(&format!(
        "- **Customers:** {} ({} with income, {}%)\n",
        overview.total_customers, overview.customers_with_income, overview.income_percentage
    ));
    section.push_str(&format!(
        "- **Average Income:** {}\n",
        format_money(overview.average_income)
    ));
    section.push_str(&format!(
        "- **Gender:** {}% male, {}% female\n",
        overview.male_percentage, summary.female_percentage
    ));
    if let Some(ref largest) = summary.largest_division {
        section.push_str(&format!(
            "- **Largest Division:** {} with {} customers ({}% of total)\n",
            largest.name, largest.value, summary.largest_division_percentage
        ));
    }
    section.push_str(&format!(
        "- **High Income:** {}% of customers earn {} or more\n",
        summary.high_income_percentage,
        format_money(summary.high_income_threshold)
    ));
    section.push_str(&format!("- **Average Age:** {}\n\n", overview.average_age));

    section.push_str(&format!(
        "The customer base has a {} majority and a {} share of married customers.",
        summary.majority_gender.label(),
        if summary.married_majority {
            "majority"
        } else {
            "minority"
        }
    ));
    if let Some(ref largest) = summary.largest_division {
        section.push_str(&format!(
            " {} is the largest market and the natural first target for regional campaigns.",
            largest.name
        ));
    }
    section.push_str(&format!(
        " {}% of customers fall into the high-income bracket while {}% report no income.\n\n",
        summary.high_income_percentage, summary.no_income_percentage
    ));

    section.push_str("### Customers by Division\n\n");
    section.push_str(&name_value_table("Division", "Customers", &summary.by_division, false));
    section.push_str("### Income Distribution\n\n");
    section.push_str(&name_value_table(
        "Income Range",
        "Customers",
        &summary.income_distribution,
        false,
    ));

    section
}

fn kpi_table(kpis: &[Kpi]) -> String {
    let mut table = String::new();

    table.push_str("| KPI | Current | Target | Previous | Progress | Change | Status |\n");
    table.push_str("|:---|---:|---:|---:|---:|---:|:---|\n");
    for kpi in kpis {
        table.push_str(&format!(
            "| {} | {} | {} | {} | {}% | {} | {} |\n",
            kpi.name,
            format_kpi_value(kpi.current, kpi.unit),
            format_kpi_value(kpi.target, kpi.unit),
            format_kpi_value(kpi.previous, kpi.unit),
            kpi.progress,
            format_change(kpi.change),
            kpi.status
        ));
    }
    table.push('\n');

    table
}

fn generate_key_metrics_section(metrics: &KeyMetrics) -> String {
    let mut section = String::new();

    section.push_str("## Key Metrics\n\n");
    section.push_str("### Customer Metrics\n\n");
    section.push_str(&kpi_table(&metrics.customer));
    section.push_str("### Financial Metrics\n\n");
    section.push_str(&kpi_table(&metrics.financial));

    section
}

fn generate_segment_report(report: &SegmentReport) -> String {
    let mut section = String::new();

    section.push_str("## Segment Report\n\n");
    section.push_str("### Value Segments\n\n");
    section.push_str(&segment_table(&report.value_segments));
    section.push_str("### Age Segments\n\n");
    section.push_str(&segment_table(&report.age_segments));
    section.push_str("### High Value Customers by Division\n\n");
    if report.high_value_by_division.is_empty() {
        section.push_str("No high value customers.\n\n");
    } else {
        section.push_str(&name_value_table(
            "Division",
            "Customers",
            &report.high_value_by_division,
            false,
        ));
    }

    section
}

fn generate_regional_section(rows: &[RegionalRow]) -> String {
    let mut section = String::new();

    section.push_str("## Regional Performance\n\n");
    section.push_str(
        "| Division | Customers | Total Income | Avg Income | Avg Age | Male | Married | High Value |\n",
    );
    section.push_str("|:---|---:|---:|---:|---:|---:|---:|---:|\n");
    for row in rows {
        let m = &row.metrics;
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {}% | {}% | {}% |\n",
            m.division,
            m.customer_count,
            format_money(row.total_income),
            format_money(m.average_income),
            m.average_age,
            m.male_percentage,
            m.married_percentage,
            row.high_value_percentage
        ));
    }
    section.push('\n');

    section
}

fn recommendation_items(recs: &Recommendations) -> Vec<String> {
    let mut items = vec![
        format!(
            "Launch a premium loyalty program for the {} high-value customers who make up {}% of the customer base.",
            recs.high_value_count, recs.high_value_percentage
        ),
        "Target mid-value customers with upselling and tiered offerings; they have the most room to move up a segment."
            .to_string(),
        format!(
            "Create offerings for the {} young high earners (under 30 with an income of $50,000 or more).",
            recs.young_high_earners
        ),
    ];

    if let Some(ref highest) = recs.highest_income_division {
        items.push(format!(
            "Prioritise expansion in {}, where average income is {}.",
            highest.name,
            format_money(highest.value)
        ));
    }
    if let Some(ref lowest) = recs.lowest_income_division {
        items.push(format!(
            "Build an improvement plan for {}, where average income is {}.",
            lowest.name,
            format_money(lowest.value)
        ));
    }

    items.push(format!(
        "Tailor campaigns to the {}% male and {}% female split. Married customers hold {} high-value positions than single customers ({} vs {}).",
        recs.male_percentage,
        recs.female_percentage,
        if recs.married_high_value > recs.single_high_value {
            "more"
        } else {
            "no more"
        },
        recs.married_high_value,
        recs.single_high_value
    ));

    items
}

fn generate_recommendations_section(recs: &Recommendations) -> String {
    let mut section = String::new();

    section.push_str("## Recommendations\n\n");
    for (i, item) in recommendation_items(recs).iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, item));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by custlens v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::anomaly::AnomalySettings;
    use crate::analysis::predict::{PredictionQuery, PredictionSettings};
    use crate::analysis::IncomeThresholds;
    use crate::cli::View;
    use crate::data::reference_customers;
    use crate::models::{Gender, MaritalStatus};
    use crate::report::views::{build_view, ViewSettings};

    fn create_test_document(view: View) -> Document {
        let customers = reference_customers();
        let settings = ViewSettings {
            thresholds: IncomeThresholds::default(),
            prediction: PredictionSettings::default(),
            anomaly: AnomalySettings::default(),
            query: PredictionQuery {
                age: 36,
                gender: Gender::Female,
                marital_status: MaritalStatus::Married,
            },
        };
        let metadata = ReportMetadata::new(view, "built-in reference dataset", "none", customers.len());
        Document::new(metadata, build_view(view, &customers, &settings))
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0), "$0");
        assert_eq!(format_money(999), "$999");
        assert_eq!(format_money(49_482), "$49,482");
        assert_eq!(format_money(1_830_821), "$1,830,821");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(11), "+11%");
        assert_eq!(format_change(0), "0%");
        assert_eq!(format_change(-4), "-4%");
    }

    #[test]
    fn test_overview_markdown() {
        let markdown = generate_markdown_report(&create_test_document(View::Overview));

        assert!(markdown.contains("# custlens Overview"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Headline Metrics"));
        assert!(markdown.contains("| Total Income | $1,830,821 |"));
        assert!(markdown.contains("### Average Income by Division"));
        assert!(markdown.contains("### Income Contribution"));
        assert!(markdown.contains("*Report generated by custlens"));
    }

    #[test]
    fn test_segments_markdown() {
        let markdown = generate_markdown_report(&create_test_document(View::Segments));

        assert!(markdown.contains("## Income Segments"));
        assert!(markdown.contains("## Age Segments"));
        assert!(markdown.contains("| High Value | 7 | 14% |"));
    }

    #[test]
    fn test_demographics_markdown() {
        let markdown = generate_markdown_report(&create_test_document(View::Demographics));

        assert!(markdown.contains("## Gender by Division"));
        assert!(markdown.contains("## Income by Age"));
        assert!(markdown.contains("## Marital Status by Gender"));
    }

    #[test]
    fn test_analytics_markdown() {
        let markdown = generate_markdown_report(&create_test_document(View::Analytics));

        assert!(markdown.contains("## Correlation Analysis"));
        assert!(markdown.contains("weak and negative (r = -0.04)"));
        assert!(markdown.contains("### Income Heat Map"));
        assert!(markdown.contains("| Division | Married | Single | Divorced |"));
        assert!(markdown.contains("## Anomaly Detection"));
        assert!(markdown.contains("**Young High Earners**"));
        assert!(markdown.contains("## Predictive Analytics"));
        assert!(markdown.contains("- **Predicted Income:** $56,263"));
        assert!(markdown.contains("- **Confidence:** 70%"));
    }

    #[test]
    fn test_customer_report_markdown() {
        let markdown = generate_markdown_report(&create_test_document(View::Report));

        assert!(markdown.contains("## Executive Summary"));
        assert!(markdown.contains("Khulna with 7 customers (14% of total)"));
        assert!(markdown.contains("## Key Metrics"));
        assert!(markdown.contains("| Total Customers | 50 | 60 | 45 | 83% | +11% | at risk |"));
        assert!(markdown.contains("## Segment Report"));
        assert!(markdown.contains("## Regional Performance"));
        assert!(markdown.contains("## Recommendations"));
        assert!(markdown.contains("Build an improvement plan for Barishal"));
    }

    #[test]
    fn test_lookup_and_deleted_metadata() {
        let mut document = create_test_document(View::Overview);
        document.metadata.deleted = vec!["QZ44356".to_string()];
        let document = document.with_lookups(reference_customers().into_iter().take(1).collect());

        let markdown = generate_markdown_report(&document);
        assert!(markdown.contains("- **Deleted:** QZ44356"));
        assert!(markdown.contains("## Customer Lookup"));
        assert!(markdown.contains("| BU79786 | Andrew | Dhaka | F | Married | 36 | $56,274 |"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_document(View::Segments)).unwrap();

        assert!(json.contains("\"view\": \"segments\""));
        assert!(json.contains("\"income_segments\""));
        assert!(json.contains("\"generated_at\""));
        assert!(!json.contains("\"lookups\""));
    }
}
