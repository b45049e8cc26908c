//! Customer repository.
//!
//! Lookups and mutations go through [`CustomerRepository`] so the in-memory
//! store can be swapped for real persistence without touching callers.

pub mod actions;

use crate::models::{Customer, Gender, MaritalStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

pub use actions::{apply_actions, ActionOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("customer not found: {0}")]
    NotFound(String),
}

/// Partial update of a customer. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub id: String,
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

impl CustomerUpdate {
    fn apply(self, customer: &mut Customer) {
        if let Some(name) = self.name {
            customer.name = name;
        }
        if let Some(division) = self.division {
            customer.division = division;
        }
        if let Some(gender) = self.gender {
            customer.gender = gender;
        }
        if let Some(status) = self.marital_status {
            customer.marital_status = status;
        }
        if let Some(age) = self.age {
            customer.age = age;
        }
        if let Some(income) = self.income {
            customer.income = income;
        }
    }
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn get(&self, id: &str) -> Result<Customer, StoreError>;
    async fn list(&self) -> Vec<Customer>;
    async fn update(&self, update: CustomerUpdate) -> Result<Customer, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Repository backed by a vector, preserving insertion order.
pub struct InMemoryRepository {
    customers: RwLock<Vec<Customer>>,
    latency: Duration,
}

impl InMemoryRepository {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self {
            customers: RwLock::new(customers),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency` to mimic a remote store.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl CustomerRepository for InMemoryRepository {
    async fn get(&self, id: &str) -> Result<Customer, StoreError> {
        self.simulate_latency().await;

        let customers = self.customers.read().await;
        customers
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn list(&self) -> Vec<Customer> {
        self.simulate_latency().await;
        self.customers.read().await.clone()
    }

    async fn update(&self, update: CustomerUpdate) -> Result<Customer, StoreError> {
        self.simulate_latency().await;

        let mut customers = self.customers.write().await;
        let customer = customers
            .iter_mut()
            .find(|c| c.id == update.id)
            .ok_or_else(|| StoreError::NotFound(update.id.clone()))?;

        debug!("Updating customer {}", update.id);
        update.apply(customer);
        Ok(customer.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.simulate_latency().await;

        let mut customers = self.customers.write().await;
        let index = customers
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        customers.remove(index);
        info!("Deleted customer {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_customers;
    use tokio_test::{assert_err, assert_ok};

    fn repository() -> InMemoryRepository {
        InMemoryRepository::new(reference_customers())
    }

    #[tokio::test]
    async fn test_get_existing_customer() {
        let repo = repository();
        let customer = assert_ok!(repo.get("SJ95423").await);
        assert_eq!(customer.name, "Grant");
        assert_eq!(customer.income, 99_845);
    }

    #[tokio::test]
    async fn test_get_unknown_customer() {
        let repo = repository();
        let err = assert_err!(repo.get("NOPE").await);
        assert_eq!(err, StoreError::NotFound("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_update_merges_provided_fields() {
        let repo = repository();
        let updated = assert_ok!(
            repo.update(CustomerUpdate {
                id: "QZ44356".to_string(),
                income: Some(42_000),
                ..Default::default()
            })
            .await
        );

        assert_eq!(updated.income, 42_000);
        assert_eq!(updated.name, "Anne");
        assert_eq!(updated.division, "Rajshahi");
        assert_eq!(assert_ok!(repo.get("QZ44356").await), updated);
    }

    #[tokio::test]
    async fn test_update_unknown_customer() {
        let repo = repository();
        assert_err!(
            repo.update(CustomerUpdate {
                id: "NOPE".to_string(),
                age: Some(40),
                ..Default::default()
            })
            .await
        );
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let repo = repository();
        assert_ok!(repo.delete("BU79786").await);
        assert_err!(repo.get("BU79786").await);
        assert_err!(repo.delete("BU79786").await);

        let remaining = repo.list().await;
        assert_eq!(remaining.len(), 49);
        assert_eq!(remaining[0].id, "QZ44356");
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let repo = repository().with_latency(Duration::from_millis(500));
        let start = tokio::time::Instant::now();
        assert_ok!(repo.get("BU79786").await);
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
