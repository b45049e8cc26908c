//! Data models for customer analytics.
//!
//! This module contains the customer record, the filter criteria applied
//! to it, and the plain result structures handed to the report renderers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender as recorded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Gender {
    /// Male
    #[serde(rename = "M")]
    #[value(name = "M", alias = "m")]
    Male,
    /// Female
    #[serde(rename = "F")]
    #[value(name = "F", alias = "f")]
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "M"),
            Gender::Female => write!(f, "F"),
        }
    }
}

impl Gender {
    /// Returns the long-form label used in narrative text.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

/// Marital status as recorded in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaritalStatus::Single => write!(f, "Single"),
            MaritalStatus::Married => write!(f, "Married"),
            MaritalStatus::Divorced => write!(f, "Divorced"),
        }
    }
}

/// A single customer record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique opaque identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Region label.
    pub division: String,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    /// Age in years.
    pub age: u32,
    /// Annual income. Zero means no income was reported.
    pub income: u64,
}

impl Customer {
    /// Whether the customer reported an income.
    pub fn has_income(&self) -> bool {
        self.income > 0
    }

    /// Returns the value of a field as a display string.
    pub fn field_value(&self, field: CustomerField) -> String {
        match field {
            CustomerField::Id => self.id.clone(),
            CustomerField::Name => self.name.clone(),
            CustomerField::Division => self.division.clone(),
            CustomerField::Gender => self.gender.to_string(),
            CustomerField::MaritalStatus => self.marital_status.to_string(),
            CustomerField::Age => self.age.to_string(),
            CustomerField::Income => self.income.to_string(),
        }
    }
}

/// Field selector for grouping and unique-value queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    Id,
    Name,
    Division,
    Gender,
    MaritalStatus,
    Age,
    Income,
}

/// Exact-match filter criteria. Every populated field must match.
///
/// Empty strings and zero numbers impose no constraint, the same as an
/// absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<u64>,
}

impl FilterCriteria {
    /// Whether no field imposes a constraint.
    pub fn is_empty(&self) -> bool {
        text_empty(&self.id)
            && text_empty(&self.name)
            && text_empty(&self.division)
            && self.gender.is_none()
            && self.marital_status.is_none()
            && self.age.unwrap_or(0) == 0
            && self.income.unwrap_or(0) == 0
    }

    /// Whether a customer satisfies every populated field.
    pub fn matches(&self, customer: &Customer) -> bool {
        text_matches(&self.id, &customer.id)
            && text_matches(&self.name, &customer.name)
            && text_matches(&self.division, &customer.division)
            && self.gender.map_or(true, |g| g == customer.gender)
            && self
                .marital_status
                .map_or(true, |s| s == customer.marital_status)
            && self.age.map_or(true, |a| a == 0 || a == customer.age)
            && self.income.map_or(true, |i| i == 0 || i == customer.income)
    }

    /// Returns a short human-readable description, e.g. `division=Dhaka, gender=M`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(ref id) = self.id {
            if !id.is_empty() {
                parts.push(format!("id={}", id));
            }
        }
        if let Some(ref name) = self.name {
            if !name.is_empty() {
                parts.push(format!("name={}", name));
            }
        }
        if let Some(ref division) = self.division {
            if !division.is_empty() {
                parts.push(format!("division={}", division));
            }
        }
        if let Some(gender) = self.gender {
            parts.push(format!("gender={}", gender));
        }
        if let Some(status) = self.marital_status {
            parts.push(format!("maritalStatus={}", status));
        }
        if let Some(age) = self.age.filter(|a| *a > 0) {
            parts.push(format!("age={}", age));
        }
        if let Some(income) = self.income.filter(|i| *i > 0) {
            parts.push(format!("income={}", income));
        }

        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn text_empty(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn text_matches(wanted: &Option<String>, actual: &str) -> bool {
    match wanted.as_deref() {
        None | Some("") => true,
        Some(w) => w == actual,
    }
}

/// A labelled value, the shape chart code consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: u64,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Metrics for one customer segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetrics {
    /// Segment label, e.g. "High Value".
    pub name: String,
    /// Number of customers in the segment.
    pub count: usize,
    /// Rounded average age (0 for an empty segment).
    pub average_age: u64,
    /// Rounded average of the non-zero incomes.
    pub average_income: u64,
    /// Share of all customers, in percent.
    pub percentage: u64,
    /// Share of the segment that is male, in percent.
    pub male_percentage: u64,
    /// Share of the segment that is married, in percent.
    pub married_percentage: u64,
    /// Summed income of the segment.
    pub total_income: u64,
    /// Share of all income, in percent.
    pub income_share: u64,
}

/// Headline metrics for the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewMetrics {
    pub total_customers: usize,
    pub customers_with_income: usize,
    pub income_percentage: u64,
    pub total_income: u64,
    pub average_income: u64,
    pub male_customers: usize,
    pub female_customers: usize,
    pub male_percentage: u64,
    pub married_percentage: u64,
    pub average_age: u64,
}
