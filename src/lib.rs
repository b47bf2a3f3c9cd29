pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CsvFileSource, MemorySource};
pub use config::ValuationConfig;
pub use core::{
    engine::ValuationEngine,
    pricing::{PriceCalculator, PricingWeights, RoundingPolicy},
    reference_store::{CpuTable, ReferenceStore},
};
pub use domain::model::{
    CandidateResult, CpuRecord, CpuSource, Drive, MediaType, PriceBreakdown, RamType,
    ValuationInput,
};
pub use utils::error::{Result, ValuationError};
