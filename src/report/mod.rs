//! Report assembly and rendering.

pub mod generator;
pub mod metrics;
pub mod views;

use crate::cli::View;
use crate::models::Customer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use generator::{generate_json_report, generate_markdown_report};
pub use views::{build_view, ViewData, ViewSettings};

/// Where the report's data came from and what was applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    /// Dataset path, or `built-in reference dataset`.
    pub source: String,
    /// Filter description, `none` when unfiltered.
    pub filter: String,
    /// Customers left after deletes and filtering.
    pub customer_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

/// A rendered view together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub metadata: ReportMetadata,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lookups: Vec<Customer>,
    pub data: ViewData,
}

impl ReportMetadata {
    /// Metadata stamped with the current time.
    pub fn new(
        view: View,
        source: impl Into<String>,
        filter: impl Into<String>,
        customer_count: usize,
    ) -> Self {
        Self {
            title: view.title().to_string(),
            generated_at: Utc::now(),
            source: source.into(),
            filter: filter.into(),
            customer_count,
            deleted: Vec::new(),
        }
    }
}

impl Document {
    pub fn new(metadata: ReportMetadata, data: ViewData) -> Self {
        Self {
            metadata,
            lookups: Vec::new(),
            data,
        }
    }

    pub fn with_lookups(mut self, lookups: Vec<Customer>) -> Self {
        self.lookups = lookups;
        self
    }
}
