pub mod engine;
pub mod normalizer;
pub mod pricing;
pub mod reference_store;
pub mod search;

pub use crate::domain::model::{CandidateResult, CpuRecord, PriceBreakdown, ValuationInput};
pub use crate::domain::ports::CpuRecordSource;
pub use crate::utils::error::Result;
