use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// One row of the CPU reference table. `name` is the unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuRecord {
    pub name: String,
    #[serde(default)]
    pub release_year: Option<u16>,
    #[serde(default)]
    pub core_count: Option<u32>,
    #[serde(default)]
    pub thread_count: Option<u32>,
    #[serde(default)]
    pub base_clock_ghz: Option<f64>,
    #[serde(default)]
    pub turbo_clock_ghz: Option<f64>,
    pub benchmark_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    #[serde(flatten)]
    pub record: CpuRecord,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "HDD")]
    Hdd,
    #[default]
    #[serde(rename = "SATA-SSD")]
    SataSsd,
    #[serde(rename = "NVMe-SSD")]
    NvmeSsd,
}

impl MediaType {
    /// Anything that is not recognisably a spinning disk or NVMe is treated as
    /// a SATA SSD.
    pub fn parse_lenient(text: &str) -> Self {
        let lowered = text.trim().to_lowercase();
        if lowered.contains("nvme") || lowered.contains("m.2") {
            Self::NvmeSsd
        } else if lowered.contains("hdd")
            || lowered.contains("hard")
            || lowered.contains("spinning")
        {
            Self::Hdd
        } else {
            Self::SataSsd
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hdd => "HDD",
            Self::SataSsd => "SATA-SSD",
            Self::NvmeSsd => "NVMe-SSD",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RamType {
    #[serde(rename = "DDR3")]
    Ddr3,
    #[serde(rename = "DDR4")]
    Ddr4,
    #[serde(rename = "DDR5")]
    Ddr5,
    #[serde(rename = "unknown")]
    Unknown,
}

impl RamType {
    pub fn parse_lenient(text: &str) -> Self {
        let compact: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        // LPDDR and DDRxL variants price like their base generation.
        if compact.contains("ddr5") {
            Self::Ddr5
        } else if compact.contains("ddr4") {
            Self::Ddr4
        } else if compact.contains("ddr3") {
            Self::Ddr3
        } else {
            Self::Unknown
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ddr3 => "DDR3",
            Self::Ddr4 => "DDR4",
            Self::Ddr5 => "DDR5",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drive {
    pub capacity_gb: f64,
    pub media_type: MediaType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationInput {
    pub cpu_query: String,
    pub cpu_model_key: Option<String>,
    pub manual_benchmark_score: Option<f64>,
    pub ram_gb: f64,
    pub ram_type: RamType,
    pub drives: Vec<Drive>,
    pub gpu_value: f64,
    pub os_name: String,
    pub is_laptop: bool,
}

impl ValuationInput {
    pub fn primary_drive(&self) -> Option<&Drive> {
        self.drives.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CpuSource {
    Manual,
    ModelKey,
    Search,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecsUsed {
    pub cpu_source: CpuSource,
    pub cpu_model: Option<String>,
    pub cpu: Option<CpuRecord>,
    pub benchmark_score: f64,
    pub ram_gb: f64,
    pub ram_type: RamType,
    pub drives: Vec<Drive>,
    pub gpu_value: f64,
    pub os_name: String,
    pub is_laptop: bool,
    pub pricing_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComponent {
    pub name: String,
    pub amount: f64,
}

/// Price components in presentation order. Serializes as a JSON object whose
/// key order is the insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    components: Vec<PriceComponent>,
}

impl Breakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, amount: f64) {
        self.components.push(PriceComponent {
            name: name.into(),
            amount,
        });
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.components
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.amount)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceComponent> {
        self.components.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn total(&self) -> f64 {
        self.components.iter().map(|c| c.amount).sum()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl Serialize for Breakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.components.len()))?;
        for component in &self.components {
            map.serialize_entry(&component.name, &component.amount)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub final_price: f64,
    pub breakdown: Breakdown,
    pub specs_used: SpecsUsed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_parsing() {
        assert_eq!(MediaType::parse_lenient("NVMe SSD"), MediaType::NvmeSsd);
        assert_eq!(MediaType::parse_lenient("HDD"), MediaType::Hdd);
        assert_eq!(MediaType::parse_lenient("ssd"), MediaType::SataSsd);
        assert_eq!(MediaType::parse_lenient("mystery"), MediaType::SataSsd);
        assert_eq!(MediaType::parse_lenient(""), MediaType::SataSsd);
    }

    #[test]
    fn test_ram_type_parsing() {
        assert_eq!(RamType::parse_lenient("DDR5"), RamType::Ddr5);
        assert_eq!(RamType::parse_lenient("lpddr4x"), RamType::Ddr4);
        assert_eq!(RamType::parse_lenient("DDR3L"), RamType::Ddr3);
        assert_eq!(RamType::parse_lenient("SDRAM"), RamType::Unknown);
    }

    #[test]
    fn test_breakdown_serializes_in_insertion_order() {
        let mut breakdown = Breakdown::new();
        breakdown.push("cpu", 120.0);
        breakdown.push("ram", 64.0);
        breakdown.push("base_fee", 40.0);

        let json = serde_json::to_string(&breakdown).unwrap();
        assert_eq!(json, r#"{"cpu":120.0,"ram":64.0,"base_fee":40.0}"#);
        assert_eq!(breakdown.total(), 224.0);
    }
}
