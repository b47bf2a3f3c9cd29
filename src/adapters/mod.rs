// Adapters layer: concrete record sources for the reference store.

pub mod storage;

pub use storage::{CsvFileSource, MemorySource};
