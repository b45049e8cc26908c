//! Batched updates, lookups and deletes against a repository.

use super::{CustomerRepository, CustomerUpdate, StoreError};
use crate::models::Customer;
use futures::future::join_all;
use tracing::{debug, warn};

/// What a batch of repository actions produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Ids that were updated, in request order.
    pub updated: Vec<String>,
    /// Customers found by the lookups, in request order.
    pub found: Vec<Customer>,
    /// Ids that were deleted, in request order.
    pub deleted: Vec<String>,
    /// Ids that no update, lookup or delete could find.
    pub missing: Vec<String>,
}

impl ActionOutcome {
    pub fn all_found(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Run the updates, then the lookups, then the deletes. Actions of one kind
/// are issued concurrently.
///
/// Lookups therefore see updated records, and looking up and deleting the
/// same id in one batch reports the customer as it was before deletion.
pub async fn apply_actions(
    repo: &dyn CustomerRepository,
    updates: &[CustomerUpdate],
    lookups: &[String],
    deletes: &[String],
) -> ActionOutcome {
    let mut outcome = ActionOutcome::default();

    let updated = join_all(updates.iter().cloned().map(|u| repo.update(u))).await;
    for (update, result) in updates.iter().zip(updated) {
        match result {
            Ok(_) => outcome.updated.push(update.id.clone()),
            Err(StoreError::NotFound(_)) => {
                warn!("Update failed, customer not found: {}", update.id);
                outcome.missing.push(update.id.clone());
            }
        }
    }

    let found = join_all(lookups.iter().map(|id| repo.get(id))).await;
    for (id, result) in lookups.iter().zip(found) {
        match result {
            Ok(customer) => {
                debug!("Found customer {}", id);
                outcome.found.push(customer);
            }
            Err(StoreError::NotFound(_)) => {
                warn!("Lookup failed, customer not found: {}", id);
                outcome.missing.push(id.clone());
            }
        }
    }

    let removed = join_all(deletes.iter().map(|id| repo.delete(id))).await;
    for (id, result) in deletes.iter().zip(removed) {
        match result {
            Ok(()) => outcome.deleted.push(id.clone()),
            Err(StoreError::NotFound(_)) => {
                warn!("Delete failed, customer not found: {}", id);
                outcome.missing.push(id.clone());
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::reference_customers;
    use crate::store::InMemoryRepository;
    use std::time::Duration;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_lookups_and_deletes() {
        let repo = InMemoryRepository::new(reference_customers());
        let outcome = apply_actions(
            &repo,
            &[],
            &ids(&["SJ95423", "BU79786"]),
            &ids(&["QZ44356"]),
        )
        .await;

        assert!(outcome.all_found());
        assert_eq!(outcome.found.len(), 2);
        assert_eq!(outcome.found[0].name, "Grant");
        assert_eq!(outcome.deleted, vec!["QZ44356"]);
        assert_eq!(repo.list().await.len(), 49);
    }

    #[tokio::test]
    async fn test_missing_ids_are_collected() {
        let repo = InMemoryRepository::new(reference_customers());
        let outcome = apply_actions(&repo, &[], &ids(&["NOPE"]), &ids(&["GONE", "BU79786"])).await;

        assert!(!outcome.all_found());
        assert_eq!(outcome.missing, vec!["NOPE", "GONE"]);
        assert_eq!(outcome.deleted, vec!["BU79786"]);
        assert!(outcome.found.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_sees_customer_before_delete() {
        let repo = InMemoryRepository::new(reference_customers());
        let outcome = apply_actions(&repo, &[], &ids(&["BU79786"]), &ids(&["BU79786"])).await;

        assert_eq!(outcome.found[0].id, "BU79786");
        assert_eq!(outcome.deleted, vec!["BU79786"]);
        assert_eq!(outcome.missing, Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_lookup_sees_update() {
        let repo = InMemoryRepository::new(reference_customers());
        let updates = vec![
            CustomerUpdate {
                id: "QZ44356".to_string(),
                income: Some(31_000),
                ..Default::default()
            },
            CustomerUpdate {
                id: "NOPE".to_string(),
                age: Some(44),
                ..Default::default()
            },
        ];
        let outcome = apply_actions(&repo, &updates, &ids(&["QZ44356"]), &[]).await;

        assert_eq!(outcome.updated, vec!["QZ44356"]);
        assert_eq!(outcome.missing, vec!["NOPE"]);
        assert_eq!(outcome.found[0].income, 31_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_run_concurrently() {
        let repo = InMemoryRepository::new(reference_customers())
            .with_latency(Duration::from_millis(200));
        let start = tokio::time::Instant::now();

        apply_actions(&repo, &[], &ids(&["BU79786", "SJ95423", "QZ44356"]), &[]).await;

        assert!(start.elapsed() < Duration::from_millis(400));
    }
}
