use crate::domain::model::CpuRecord;
use crate::domain::ports::CpuRecordSource;
use crate::utils::error::{Result, ValuationError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// CPU table stored as a CSV file with a header row matching `CpuRecord`.
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses CSV text into records. Empty cells become `None` for optional
/// fields; a bad row fails the whole parse.
pub fn parse_csv_records(data: &[u8], source_name: &str) -> Result<Vec<CpuRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<CpuRecord>().enumerate() {
        let record = row.map_err(|e| {
            ValuationError::store_unavailable(
                source_name,
                format!("row {} could not be parsed: {}", index + 2, e),
            )
        })?;
        records.push(record);
    }
    Ok(records)
}

#[async_trait]
impl CpuRecordSource for CsvFileSource {
    async fn load_records(&self) -> Result<Vec<CpuRecord>> {
        let source_name = self.describe();
        let data = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ValuationError::store_unavailable(&source_name, e.to_string()))?;

        tracing::debug!("Read {} bytes from {}", data.len(), source_name);
        parse_csv_records(&data, &source_name)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fixed record set held in memory. Used for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<CpuRecord>,
}

impl MemorySource {
    pub fn new(records: Vec<CpuRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl CpuRecordSource for MemorySource {
    async fn load_records(&self) -> Result<Vec<CpuRecord>> {
        Ok(self.records.clone())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}
