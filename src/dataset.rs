//! In-memory banking dataset
//!
//! Loaded once at startup from `public/mock/accounts.json` and shared
//! read-only across all requests. Never re-read from disk.

use crate::error::AgentError;
use crate::models::{Account, Transaction};
use crate::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Default dataset location, relative to the working directory. The
/// server must be started from the project root for this to resolve;
/// a wrong cwd fails loudly at startup rather than at request time.
pub const DEFAULT_DATASET_PATH: &str = "public/mock/accounts.json";

/// Immutable account/transaction store.
#[derive(Debug, Clone, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Dataset {
    /// Load the dataset from disk. Any failure here is startup-fatal;
    /// the process must not serve requests without data.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AgentError::DatasetError(format!("cannot read {}: {}", path.display(), e))
        })?;
        let dataset: Dataset = serde_json::from_str(&raw).map_err(|e| {
            AgentError::DatasetError(format!("cannot parse {}: {}", path.display(), e))
        })?;

        info!(
            accounts = dataset.accounts.len(),
            transactions = dataset.transactions.len(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    /// Case-insensitive account lookup by display name. Norwegian
    /// account names carry non-ASCII letters, so folding must be
    /// Unicode-aware.
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        let wanted = name.to_lowercase();
        self.accounts
            .iter()
            .find(|a| a.name.to_lowercase() == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_shape() {
        let raw = r#"{
            "accounts": [
                {"id": "a1", "name": "Everyday", "balance": 12450.75},
                {"id": "a2", "name": "Savings", "currency": "NOK", "balance": 50200.0}
            ],
            "transactions": [
                {"accountId": "a1", "date": "2024-01-01", "amount": -200.0}
            ]
        }"#;

        let dataset: Dataset = serde_json::from_str(raw).unwrap();
        assert_eq!(dataset.accounts.len(), 2);
        assert_eq!(dataset.transactions.len(), 1);
        // Currency defaults to NOK when the JSON omits it.
        assert_eq!(dataset.accounts[0].currency, "NOK");
        assert_eq!(dataset.transactions[0].account_id, "a1");
    }

    #[test]
    fn test_account_lookup_is_case_insensitive() {
        let raw = r#"{"accounts": [{"id": "a1", "name": "Everyday", "balance": 100.0}], "transactions": []}"#;
        let dataset: Dataset = serde_json::from_str(raw).unwrap();

        assert!(dataset.account_by_name("everyday").is_some());
        assert!(dataset.account_by_name("EVERYDAY").is_some());
        assert!(dataset.account_by_name("Pension").is_none());
    }

    #[test]
    fn test_account_lookup_folds_non_ascii_names() {
        let raw = r#"{"accounts": [{"id": "a1", "name": "Lønnskonto", "balance": 100.0}], "transactions": []}"#;
        let dataset: Dataset = serde_json::from_str(raw).unwrap();

        assert!(dataset.account_by_name("LØNNSKONTO").is_some());
        assert!(dataset.account_by_name("lønnskonto").is_some());
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let result = Dataset::load("does/not/exist.json");
        assert!(matches!(result, Err(AgentError::DatasetError(_))));
    }
}
