//! Free-text ranking of CPU records.
//!
//! Scores fall into fixed tiers so that the ordering guarantees hold for any
//! table: an exact name beats a name prefix, which beats whole-word matches,
//! which beat partial word overlap, which beats a loose substring hit.

use crate::core::reference_store::CpuTable;
use crate::domain::model::{CandidateResult, CpuRecord};
use std::cmp::Ordering;

pub const MIN_QUERY_CHARS: usize = 2;

const EXACT_SCORE: f64 = 1000.0;
const PREFIX_BASE: f64 = 700.0;
const ALL_WORDS_BASE: f64 = 500.0;
const SOME_WORDS_BASE: f64 = 200.0;
const SOME_WORDS_SPAN: f64 = 200.0;
const SUBSTRING_BASE: f64 = 100.0;
const COVERAGE_SPAN: f64 = 50.0;

/// True when the query is too short to search at all.
pub fn is_query_too_short(query: &str) -> bool {
    query.trim().chars().count() < MIN_QUERY_CHARS
}

/// Lowercases and strips the noise that vendors and users add around a
/// model name: trademark marks, clock suffixes after `@`, the word "cpu".
pub fn normalize_name(text: &str) -> String {
    let mut lowered = text.to_lowercase();
    if let Some(at) = lowered.find('@') {
        lowered.truncate(at);
    }
    let cleaned = lowered
        .replace("(r)", " ")
        .replace("(tm)", " ")
        .replace(['®', '™'], " ");

    cleaned
        .split_whitespace()
        .filter(|word| *word != "cpu")
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens(normalized: &str) -> Vec<&str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

fn compact(normalized: &str) -> String {
    normalized.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Relevance of `name` for `query`, in `[0, 1000]`. Zero means no match.
pub fn relevance(query: &str, name: &str) -> f64 {
    let query = normalize_name(query);
    let name = normalize_name(name);
    if query.is_empty() || name.is_empty() {
        return 0.0;
    }

    let coverage = (query.chars().count() as f64 / name.chars().count() as f64).min(1.0);
    let score = if query == name {
        EXACT_SCORE
    } else if name.starts_with(&query) {
        PREFIX_BASE + COVERAGE_SPAN * coverage
    } else {
        let query_tokens = tokens(&query);
        let name_tokens = tokens(&name);
        let matched = query_tokens
            .iter()
            .filter(|q| name_tokens.iter().any(|n| n.starts_with(**q)))
            .count();

        if !query_tokens.is_empty() && matched == query_tokens.len() {
            ALL_WORDS_BASE + COVERAGE_SPAN * coverage
        } else if matched > 0 {
            SOME_WORDS_BASE + SOME_WORDS_SPAN * (matched as f64 / query_tokens.len() as f64)
        } else if compact(&name).contains(&compact(&query)) {
            SUBSTRING_BASE + COVERAGE_SPAN * coverage
        } else {
            0.0
        }
    };

    (score * 1000.0).round() / 1000.0
}

/// Score descending, then newer release first, then name ascending.
pub fn candidate_order(a: &CandidateResult, b: &CandidateResult) -> Ordering {
    b.relevance_score
        .total_cmp(&a.relevance_score)
        .then_with(|| b.record.release_year.cmp(&a.record.release_year))
        .then_with(|| a.record.name.cmp(&b.record.name))
}

/// Ranks every record in `records` against `query` and keeps the best `limit`.
pub fn rank<'a>(
    records: impl Iterator<Item = &'a CpuRecord>,
    query: &str,
    limit: usize,
) -> Vec<CandidateResult> {
    if limit == 0 || is_query_too_short(query) {
        return Vec::new();
    }

    let mut candidates: Vec<CandidateResult> = records
        .filter_map(|record| {
            let score = relevance(query, &record.name);
            (score > 0.0).then(|| CandidateResult {
                record: record.clone(),
                relevance_score: score,
            })
        })
        .collect();

    candidates.sort_by(candidate_order);
    candidates.truncate(limit);
    candidates
}

/// Searches a table snapshot.
pub fn search(table: &CpuTable, query: &str, limit: usize) -> Vec<CandidateResult> {
    rank(table.iter(), query, limit)
}
