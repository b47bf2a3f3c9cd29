use crate::config::toml_config::{SearchConfig, ValuationConfig};
use crate::core::normalizer;
use crate::core::pricing::{PriceCalculator, PricingWeights};
use crate::core::reference_store::ReferenceStore;
use crate::core::search;
use crate::domain::model::{CandidateResult, PriceBreakdown};
use crate::utils::error::Result;
use serde_json::Value;
use std::sync::Arc;

/// Entry point for callers: CPU search and price calculation over a shared
/// reference store.
pub struct ValuationEngine {
    store: Arc<ReferenceStore>,
    search: SearchConfig,
    calculator: PriceCalculator,
}

impl ValuationEngine {
    pub fn new(store: Arc<ReferenceStore>, search: SearchConfig, weights: PricingWeights) -> Self {
        Self {
            store,
            search,
            calculator: PriceCalculator::new(weights),
        }
    }

    pub fn from_config(store: Arc<ReferenceStore>, config: &ValuationConfig) -> Self {
        Self::new(store, config.search.clone(), config.pricing.clone())
    }

    pub fn store(&self) -> &Arc<ReferenceStore> {
        &self.store
    }

    pub fn calculator(&self) -> &PriceCalculator {
        &self.calculator
    }

    /// Ranked CPU candidates for `query`. Queries shorter than two characters
    /// return an empty list without touching the store.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<CandidateResult>> {
        if search::is_query_too_short(query) {
            tracing::debug!("Query {:?} too short, skipping search", query);
            return Ok(Vec::new());
        }

        let limit = self.search.effective_limit(Some(limit));
        let table = self.store.snapshot().await?;
        let results = search::search(&table, query, limit);
        tracing::debug!(
            "Search {:?} returned {} candidates (generation {})",
            query,
            results.len(),
            table.generation()
        );
        Ok(results)
    }

    /// Normalizes `raw` and prices it. A manual score skips the store
    /// entirely.
    pub async fn calculate(&self, raw: &Value, manual_benchmark_score: Option<f64>) -> Result<PriceBreakdown> {
        let input = normalizer::normalize(raw, manual_benchmark_score)?;

        let result = if input.manual_benchmark_score.is_some() {
            self.calculator.calculate(None, &input)
        } else {
            let table = self.store.snapshot().await?;
            self.calculator.calculate(Some(table.as_ref()), &input)
        };

        match &result {
            Ok(price) => tracing::info!(
                "💰 Valued {} at {} ({:?})",
                price.specs_used.cpu_model.as_deref().unwrap_or("manual CPU"),
                price.final_price,
                price.specs_used.cpu_source
            ),
            Err(e) => tracing::warn!("Valuation failed ({:?}): {}", e.category(), e),
        }
        result
    }

    /// Atomically swaps in a freshly loaded table. Returns its generation.
    pub async fn reload(&self) -> Result<u64> {
        self.store.reload().await
    }
}
