//! Where a pipeline run gets its customers and transactions from.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use insight_core::types::{Customer, Transaction};
use insight_core::{InsightError, InsightResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Everything one run needs for a single domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Dataset {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    /// Accepted for ingestion parity; not consulted by the economics model.
    #[serde(default)]
    pub past_campaigns: Vec<serde_json::Value>,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn load(&self, domain: &str) -> InsightResult<Dataset>;
}

/// Reads `<data_dir>/<domain>/customers.json` and `transactions.json`.
#[derive(Debug, Clone)]
pub struct StaticDataSource {
    data_dir: PathBuf,
}

impl StaticDataSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    async fn read_json<T: DeserializeOwned>(path: &Path) -> InsightResult<T> {
        let raw = tokio::fs::read(path).await.map_err(|e| {
            InsightError::DataSource(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_slice(&raw).map_err(|e| {
            InsightError::DataSource(format!("invalid JSON in {}: {e}", path.display()))
        })
    }
}

#[async_trait]
impl DataSource for StaticDataSource {
    async fn load(&self, domain: &str) -> InsightResult<Dataset> {
        let dir = self.data_dir.join(domain);
        let customers: Vec<Customer> = Self::read_json(&dir.join("customers.json")).await?;
        let transactions: Vec<Transaction> = Self::read_json(&dir.join("transactions.json")).await?;

        debug!(
            domain = %domain,
            dir = %dir.display(),
            customers = customers.len(),
            transactions = transactions.len(),
            "Static dataset loaded"
        );

        Ok(Dataset {
            customers,
            transactions,
            past_campaigns: Vec::new(),
        })
    }
}

/// A caller-supplied payload, served as-is for any domain.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataSource {
    dataset: Dataset,
}

impl InMemoryDataSource {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    async fn load(&self, _domain: &str) -> InsightResult<Dataset> {
        Ok(self.dataset.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_data_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
    }

    #[tokio::test]
    async fn test_static_source_reads_shipped_data() {
        let source = StaticDataSource::new(repo_data_dir());
        let dataset = source.load("supermarket").await.unwrap();
        assert!(!dataset.customers.is_empty());
        assert!(!dataset.transactions.is_empty());
        assert!(dataset.past_campaigns.is_empty());
    }

    #[tokio::test]
    async fn test_missing_domain_dir_is_data_source_error() {
        let source = StaticDataSource::new(repo_data_dir());
        let err = source.load("pharmacy").await.unwrap_err();
        match err {
            InsightError::DataSource(msg) => assert!(msg.contains("customers.json")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_in_memory_source_returns_payload() {
        let dataset = Dataset {
            customers: vec![Customer::new("C1")],
            transactions: Vec::new(),
            past_campaigns: vec![serde_json::json!({"name": "spring"})],
        };
        let source = InMemoryDataSource::new(dataset.clone());
        assert_eq!(source.load("oil").await.unwrap(), dataset);
    }
}
