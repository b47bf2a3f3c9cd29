use crate::adapters::MemorySource;
use crate::domain::model::CpuRecord;
use crate::domain::ports::CpuRecordSource;
use crate::utils::error::{Result, ValuationError};
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;

/// An immutable, fully validated copy of the CPU reference table.
#[derive(Debug)]
pub struct CpuTable {
    records: Vec<CpuRecord>,
    index: HashMap<String, usize>,
    generation: u64,
    loaded_at: DateTime<Utc>,
    source: String,
}

impl CpuTable {
    /// Validates the record set and builds the lookup index. Rejects the
    /// whole set on any bad record.
    pub fn build(mut records: Vec<CpuRecord>, generation: u64, source: &str) -> Result<Self> {
        let mut seen = HashSet::new();
        for record in &records {
            if record.name.trim().is_empty() {
                return Err(ValuationError::store_unavailable(
                    source,
                    "record with an empty name",
                ));
            }
            if !record.benchmark_score.is_finite() || record.benchmark_score <= 0.0 {
                return Err(ValuationError::store_unavailable(
                    source,
                    format!(
                        "record '{}' has a non-positive benchmark score ({})",
                        record.name, record.benchmark_score
                    ),
                ));
            }
            if !seen.insert(record.name.as_str()) {
                return Err(ValuationError::store_unavailable(
                    source,
                    format!("duplicate record name '{}'", record.name),
                ));
            }
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        let index = records
            .iter()
            .enumerate()
            .map(|(i, record)| (record.name.clone(), i))
            .collect();

        Ok(Self {
            records,
            index,
            generation,
            loaded_at: Utc::now(),
            source: source.to_string(),
        })
    }

    /// Exact lookup by record name.
    pub fn get(&self, key: &str) -> Result<&CpuRecord> {
        self.index
            .get(key)
            .map(|&i| &self.records[i])
            .ok_or_else(|| ValuationError::NotFound {
                key: key.to_string(),
            })
    }

    /// All records, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &CpuRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Read-mostly holder of the current `CpuTable`.
///
/// Readers clone the `Arc` under a short read lock and then work on their own
/// snapshot. Loads are serialized and publish a complete table with a single
/// pointer swap, so readers never observe a partially loaded table.
pub struct ReferenceStore {
    source: Arc<dyn CpuRecordSource>,
    current: RwLock<Option<Arc<CpuTable>>>,
    load_lock: Mutex<()>,
}

impl ReferenceStore {
    /// Creates an unloaded store. The first `snapshot` call loads it.
    pub fn new(source: Arc<dyn CpuRecordSource>) -> Self {
        Self {
            source,
            current: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    pub async fn open(source: Arc<dyn CpuRecordSource>) -> Result<Self> {
        let store = Self::new(source);
        store.reload().await?;
        Ok(store)
    }

    pub async fn from_records(records: Vec<CpuRecord>) -> Result<Self> {
        Self::open(Arc::new(MemorySource::new(records))).await
    }

    /// The currently published table, if any load has succeeded.
    pub fn current(&self) -> Option<Arc<CpuTable>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the current table, loading it first if no load has succeeded
    /// yet. A failed load leaves the store unloaded so the next call retries.
    pub async fn snapshot(&self) -> Result<Arc<CpuTable>> {
        if let Some(table) = self.current() {
            return Ok(table);
        }

        let _guard = self.load_lock.lock().await;
        // Another caller may have finished loading while we waited.
        if let Some(table) = self.current() {
            return Ok(table);
        }
        self.load_and_publish().await
    }

    /// Replaces the whole table with freshly loaded records. On failure the
    /// previous table stays in service. Returns the new generation.
    pub async fn reload(&self) -> Result<u64> {
        let _guard = self.load_lock.lock().await;
        let table = self.load_and_publish().await?;
        Ok(table.generation())
    }

    // Callers must hold `load_lock`.
    async fn load_and_publish(&self) -> Result<Arc<CpuTable>> {
        let source_name = self.source.describe();
        let records = match self.source.load_records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Failed to load CPU table from {}: {}", source_name, e);
                return Err(into_store_error(e, &source_name));
            }
        };

        let next_generation = self.current().map_or(0, |t| t.generation()) + 1;
        let table = Arc::new(
            CpuTable::build(records, next_generation, &source_name).inspect_err(|e| {
                tracing::warn!("Rejected CPU table from {}: {}", source_name, e);
            })?,
        );

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&table));

        tracing::info!(
            "Loaded {} CPU records from {} (generation {})",
            table.len(),
            source_name,
            next_generation
        );
        Ok(table)
    }
}

fn into_store_error(err: ValuationError, source_name: &str) -> ValuationError {
    match err {
        ValuationError::StoreUnavailable { .. } => err,
        other => ValuationError::store_unavailable(source_name, other.to_string()),
    }
}
