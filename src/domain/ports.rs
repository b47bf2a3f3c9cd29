use crate::domain::model::CpuRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Backing storage for the CPU reference table.
///
/// Implementations return the full record set on every call; the store
/// validates it and swaps it in whole. Read failures should surface as
/// `ValuationError::StoreUnavailable`.
#[async_trait]
pub trait CpuRecordSource: Send + Sync {
    async fn load_records(&self) -> Result<Vec<CpuRecord>>;

    /// Human readable location, used in logs and error messages.
    fn describe(&self) -> String;
}
