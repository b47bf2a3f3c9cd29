use crate::core::reference_store::CpuTable;
use crate::core::search;
use crate::domain::model::{
    Breakdown, CpuRecord, CpuSource, Drive, MediaType, PriceBreakdown, RamType, SpecsUsed,
    ValuationInput,
};
use crate::utils::error::{Result, ValuationError};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CPU: &str = "cpu";
pub const RAM: &str = "ram";
pub const STORAGE: &str = "storage";
pub const GPU: &str = "gpu";
pub const OS: &str = "os";
pub const BASE_FEE: &str = "base_fee";
pub const LAPTOP_ADJUSTMENT: &str = "laptop_adjustment";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingPolicy {
    #[default]
    Nearest,
    Floor,
}

impl RoundingPolicy {
    pub fn apply(self, amount: f64) -> f64 {
        match self {
            Self::Nearest => amount.round(),
            Self::Floor => amount.floor(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuWeights {
    /// Currency per benchmark point up to `ceiling`.
    pub rate_per_point: f64,
    pub ceiling: f64,
    /// Multiplier on `rate_per_point` for points above `ceiling`.
    pub diminishing_factor: f64,
}

impl Default for CpuWeights {
    fn default() -> Self {
        Self {
            rate_per_point: 0.03,
            ceiling: 10_000.0,
            diminishing_factor: 0.25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RamWeights {
    pub ddr3: f64,
    pub ddr4: f64,
    pub ddr5: f64,
    pub unknown: f64,
}

impl Default for RamWeights {
    fn default() -> Self {
        Self {
            ddr3: 2.0,
            ddr4: 4.0,
            ddr5: 6.0,
            unknown: 2.0,
        }
    }
}

impl RamWeights {
    pub fn per_gb(&self, ram_type: RamType) -> f64 {
        match ram_type {
            RamType::Ddr3 => self.ddr3,
            RamType::Ddr4 => self.ddr4,
            RamType::Ddr5 => self.ddr5,
            RamType::Unknown => self.unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageWeights {
    pub hdd: f64,
    pub sata_ssd: f64,
    pub nvme_ssd: f64,
}

impl Default for StorageWeights {
    fn default() -> Self {
        Self {
            hdd: 0.02,
            sata_ssd: 0.06,
            nvme_ssd: 0.08,
        }
    }
}

impl StorageWeights {
    pub fn per_gb(&self, media_type: MediaType) -> f64 {
        match media_type {
            MediaType::Hdd => self.hdd,
            MediaType::SataSsd => self.sata_ssd,
            MediaType::NvmeSsd => self.nvme_ssd,
        }
    }
}

/// Versioned weight table for the price calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingWeights {
    pub version: String,
    pub rounding: RoundingPolicy,
    pub base_fee: f64,
    pub cpu: CpuWeights,
    pub ram_per_gb: RamWeights,
    pub storage_per_gb: StorageWeights,
    /// Share of the cpu + ram + storage subtotal taken off for laptops.
    pub laptop_discount: f64,
    /// Fixed amount per OS family, matched as a lowercase substring of the
    /// OS name.
    pub os_adjustments: BTreeMap<String, f64>,
}

impl Default for PricingWeights {
    fn default() -> Self {
        let os_adjustments = [("windows", 20.0), ("macos", 10.0), ("chrome", 0.0), ("linux", 0.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        Self {
            version: "2026.1".to_string(),
            rounding: RoundingPolicy::Nearest,
            base_fee: 40.0,
            cpu: CpuWeights::default(),
            ram_per_gb: RamWeights::default(),
            storage_per_gb: StorageWeights::default(),
            laptop_discount: 0.10,
            os_adjustments,
        }
    }
}

impl Validate for PricingWeights {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("pricing.version", &self.version)?;
        validate_range("pricing.base_fee", self.base_fee, 0.0, f64::MAX)?;
        validate_range("pricing.cpu.rate_per_point", self.cpu.rate_per_point, 0.0, f64::MAX)?;
        validate_range("pricing.cpu.ceiling", self.cpu.ceiling, f64::MIN_POSITIVE, f64::MAX)?;
        validate_range(
            "pricing.cpu.diminishing_factor",
            self.cpu.diminishing_factor,
            0.0,
            1.0,
        )?;
        validate_range("pricing.laptop_discount", self.laptop_discount, 0.0, 1.0)?;

        let ram = &self.ram_per_gb;
        validate_range("pricing.ram_per_gb.ddr3", ram.ddr3, 0.0, f64::MAX)?;
        validate_range("pricing.ram_per_gb.unknown", ram.unknown, 0.0, f64::MAX)?;
        validate_range("pricing.ram_per_gb.ddr4", ram.ddr4, ram.ddr3, f64::MAX)?;
        validate_range("pricing.ram_per_gb.ddr5", ram.ddr5, ram.ddr4, f64::MAX)?;

        let storage = &self.storage_per_gb;
        validate_range("pricing.storage_per_gb.hdd", storage.hdd, 0.0, f64::MAX)?;
        validate_range("pricing.storage_per_gb.sata_ssd", storage.sata_ssd, storage.hdd, f64::MAX)?;
        validate_range("pricing.storage_per_gb.nvme_ssd", storage.nvme_ssd, storage.hdd, f64::MAX)?;

        for (family, amount) in &self.os_adjustments {
            validate_non_empty_string("pricing.os_adjustments", family)?;
            validate_range(&format!("pricing.os_adjustments.{}", family), *amount, 0.0, f64::MAX)?;
        }
        Ok(())
    }
}

struct ResolvedCpu {
    source: CpuSource,
    record: Option<CpuRecord>,
    score: f64,
}

/// Stateless calculator over an explicit weight table.
#[derive(Debug, Clone, Default)]
pub struct PriceCalculator {
    weights: PricingWeights,
}

impl PriceCalculator {
    pub fn new(weights: PricingWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &PricingWeights {
        &self.weights
    }

    /// Prices `input`. `table` is only consulted when no manual score is
    /// given; callers with a manual score may pass `None`.
    pub fn calculate(&self, table: Option<&CpuTable>, input: &ValuationInput) -> Result<PriceBreakdown> {
        let cpu = resolve_cpu(table, input)?;
        tracing::debug!(
            "Resolved CPU via {:?}: {} (score {})",
            cpu.source,
            cpu.record.as_ref().map_or("<manual>", |r| r.name.as_str()),
            cpu.score
        );

        let breakdown = self.build_breakdown(cpu.score, input)?;
        let final_price = priced("specs", breakdown.total())?.max(0.0);

        Ok(PriceBreakdown {
            final_price,
            breakdown,
            specs_used: SpecsUsed {
                cpu_source: cpu.source,
                cpu_model: cpu.record.as_ref().map(|r| r.name.clone()),
                cpu: cpu.record,
                benchmark_score: cpu.score,
                ram_gb: input.ram_gb,
                ram_type: input.ram_type,
                drives: input.drives.clone(),
                gpu_value: input.gpu_value,
                os_name: input.os_name.clone(),
                is_laptop: input.is_laptop,
                pricing_version: self.weights.version.clone(),
            },
        })
    }

    fn round(&self, amount: f64) -> f64 {
        // `+ 0.0` turns a -0.0 into 0.0.
        self.weights.rounding.apply(amount.max(0.0)) + 0.0
    }

    pub fn cpu_value(&self, score: f64) -> f64 {
        let cpu = &self.weights.cpu;
        let base = score.min(cpu.ceiling).max(0.0) * cpu.rate_per_point;
        let excess = (score - cpu.ceiling).max(0.0) * cpu.rate_per_point * cpu.diminishing_factor;
        base + excess
    }

    pub fn ram_value(&self, ram_gb: f64, ram_type: RamType) -> f64 {
        ram_gb * self.weights.ram_per_gb.per_gb(ram_type)
    }

    pub fn storage_value(&self, drives: &[Drive]) -> f64 {
        drives
            .iter()
            .map(|d| d.capacity_gb * self.weights.storage_per_gb.per_gb(d.media_type))
            .fold(0.0, |total, value| total + value)
    }

    /// First configured family (in key order) contained in the OS name.
    pub fn os_value(&self, os_name: &str) -> f64 {
        let lowered = os_name.to_lowercase();
        self.weights
            .os_adjustments
            .iter()
            .find(|(family, _)| lowered.contains(&family.to_lowercase()))
            .map_or(0.0, |(_, amount)| *amount)
    }

    fn build_breakdown(&self, score: f64, input: &ValuationInput) -> Result<Breakdown> {
        let cpu = priced("manual_benchmark_score", self.round(self.cpu_value(score)))?;
        let ram = priced("ram_gb", self.round(self.ram_value(input.ram_gb, input.ram_type)))?;
        let storage = priced("drives", self.round(self.storage_value(&input.drives)))?;
        // The GPU amount is already a price and goes in as given.
        let gpu = priced("gpu_value", input.gpu_value)?;

        let mut breakdown = Breakdown::new();
        breakdown.push(CPU, cpu);
        breakdown.push(RAM, ram);
        breakdown.push(STORAGE, storage);
        breakdown.push(GPU, gpu);
        breakdown.push(OS, self.round(self.os_value(&input.os_name)));
        if self.weights.base_fee > 0.0 {
            breakdown.push(BASE_FEE, self.round(self.weights.base_fee));
        }

        if input.is_laptop {
            // Bounded by the hardware subtotal, so the total stays >= 0.
            let hardware = priced("specs", cpu + ram + storage)?;
            let discount = self.round(hardware * self.weights.laptop_discount).min(hardware);
            breakdown.push(LAPTOP_ADJUSTMENT, 0.0 - discount);
        }
        Ok(breakdown)
    }
}

/// Rejects amounts that overflowed while pricing, naming the input behind them.
fn priced(field: &str, amount: f64) -> Result<f64> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(ValuationError::invalid_spec(field, "value is too large to price"))
    }
}

fn resolve_cpu(table: Option<&CpuTable>, input: &ValuationInput) -> Result<ResolvedCpu> {
    if let Some(score) = input.manual_benchmark_score {
        return Ok(ResolvedCpu {
            source: CpuSource::Manual,
            record: None,
            score,
        });
    }

    let table = table.ok_or_else(|| {
        ValuationError::store_unavailable("reference store", "no table snapshot supplied")
    })?;

    if let Some(key) = &input.cpu_model_key {
        let record = table.get(key).map_err(|_| ValuationError::NoMatchFound {
            query: key.clone(),
        })?;
        return Ok(ResolvedCpu {
            source: CpuSource::ModelKey,
            score: record.benchmark_score,
            record: Some(record.clone()),
        });
    }

    let top = search::search(table, &input.cpu_query, 1)
        .into_iter()
        .next()
        .ok_or_else(|| ValuationError::NoMatchFound {
            query: input.cpu_query.clone(),
        })?;
    Ok(ResolvedCpu {
        source: CpuSource::Search,
        score: top.record.benchmark_score,
        record: Some(top.record),
    })
}
