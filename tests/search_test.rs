use anyhow::Result;
use async_trait::async_trait;
use buildsheet_valuation::config::{SearchConfig, ValuationConfig};
use buildsheet_valuation::domain::ports::CpuRecordSource;
use buildsheet_valuation::{CpuRecord, ReferenceStore, ValuationEngine, ValuationError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn cpu(name: &str, year: u16, score: f64) -> CpuRecord {
    CpuRecord {
        name: name.to_string(),
        release_year: Some(year),
        core_count: Some(4),
        thread_count: Some(8),
        base_clock_ghz: Some(1.8),
        turbo_clock_ghz: Some(4.0),
        benchmark_score: score,
    }
}

fn sample_records() -> Vec<CpuRecord> {
    vec![
        cpu("Intel Core i5-8350U", 2017, 4200.0),
        cpu("Intel Core i7-8550U", 2017, 6000.0),
        cpu("Intel Core i5-8250U", 2017, 5950.0),
        cpu("Intel Core i5-10310U", 2020, 6650.0),
        cpu("Intel Core 2 Duo E8400", 2008, 1250.0),
        cpu("AMD Ryzen 5 3600", 2019, 17800.0),
        cpu("AMD Ryzen 5 PRO 4650U", 2020, 14400.0),
    ]
}

async fn engine_with(records: Vec<CpuRecord>) -> Result<ValuationEngine> {
    let store = Arc::new(ReferenceStore::from_records(records).await?);
    Ok(ValuationEngine::from_config(store, &ValuationConfig::default()))
}

/// Source that counts loads and always fails.
struct CountingBrokenSource {
    loads: AtomicUsize,
}

#[async_trait]
impl CpuRecordSource for CountingBrokenSource {
    async fn load_records(&self) -> buildsheet_valuation::Result<Vec<CpuRecord>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Err(ValuationError::store_unavailable("broken", "disk on fire"))
    }

    fn describe(&self) -> String {
        "broken".to_string()
    }
}

#[tokio::test]
async fn test_i5_ranks_above_i7() -> Result<()> {
    let engine = engine_with(sample_records()).await?;

    let results = engine.search("i5", 5).await?;
    let position = |name: &str| results.iter().position(|c| c.record.name == name);

    let i5 = position("Intel Core i5-8350U").expect("i5-8350U should match");
    match position("Intel Core i7-8550U") {
        Some(i7) => {
            assert!(i5 < i7);
            assert!(results[i5].relevance_score > results[i7].relevance_score);
        }
        None => assert!(results.iter().all(|c| !c.record.name.contains("i7"))),
    }
    Ok(())
}

#[tokio::test]
async fn test_identical_query_returns_exact_record_first() -> Result<()> {
    let engine = engine_with(sample_records()).await?;

    for record in sample_records() {
        let results = engine.search(&record.name, 3).await?;
        assert_eq!(results[0].record.name, record.name);
        assert_eq!(results[0].relevance_score, 1000.0);
    }

    let results = engine.search("intel core i5-8350u", 3).await?;
    assert_eq!(results[0].record.name, "Intel Core i5-8350U");
    Ok(())
}

#[tokio::test]
async fn test_results_are_sorted_and_bounded() -> Result<()> {
    let engine = engine_with(sample_records()).await?;

    for query in ["intel", "core", "i5", "ryzen 5", "U", "8", "amd pro", "e8400"] {
        for limit in [1, 2, 3, 10] {
            let results = engine.search(query, limit).await?;
            assert!(results.len() <= limit, "{} / {}", query, limit);
            for pair in results.windows(2) {
                assert!(pair[0].relevance_score >= pair[1].relevance_score);
            }
            assert!(results.iter().all(|c| c.relevance_score > 0.0));
        }
    }
    Ok(())
}

#[tokio::test]
async fn test_equal_scores_prefer_newer_release() -> Result<()> {
    let engine = engine_with(sample_records()).await?;

    let results = engine.search("zz ryzen", 10).await?;
    let names: Vec<&str> = results.iter().map(|c| c.record.name.as_str()).collect();
    assert_eq!(names, vec!["AMD Ryzen 5 PRO 4650U", "AMD Ryzen 5 3600"]);
    Ok(())
}

#[tokio::test]
async fn test_no_match_is_empty() -> Result<()> {
    let engine = engine_with(sample_records()).await?;
    assert!(engine.search("zzz-nonexistent-cpu", 10).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_short_query_never_touches_store() -> Result<()> {
    let source = Arc::new(CountingBrokenSource {
        loads: AtomicUsize::new(0),
    });
    let store = Arc::new(ReferenceStore::new(source.clone()));
    let engine = ValuationEngine::new(store, SearchConfig::default(), Default::default());

    for query in ["", " ", "i", "  5  ", "\t\n"] {
        assert!(engine.search(query, 10).await?.is_empty());
    }
    assert_eq!(source.loads.load(Ordering::SeqCst), 0);

    // A real query does reach the (broken) store.
    let err = engine.search("i5", 10).await.unwrap_err();
    assert!(matches!(err, ValuationError::StoreUnavailable { .. }));
    assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn test_limit_is_capped_by_config() -> Result<()> {
    let store = Arc::new(ReferenceStore::from_records(sample_records()).await?);
    let search = SearchConfig {
        default_limit: 2,
        max_limit: 2,
    };
    let engine = ValuationEngine::new(store, search, Default::default());

    assert_eq!(engine.search("intel", 100).await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_search_is_repeatable() -> Result<()> {
    let engine = engine_with(sample_records()).await?;
    let first = engine.search("core i5", 10).await?;
    let second = engine.search("core i5", 10).await?;
    assert_eq!(first, second);
    Ok(())
}
