use crate::domain::model::{Drive, MediaType, RamType, ValuationInput};
use crate::utils::error::{Result, ValuationError};
use serde_json::{Map, Value};

pub const DEFAULT_OS: &str = "Windows";

/// Returns the first present, non-null value among `keys`, with the key used.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
}

fn text_field(obj: &Map<String, Value>, keys: &[&'static str]) -> Result<Option<String>> {
    match field(obj, keys) {
        None => Ok(None),
        Some((_, Value::String(s))) => Ok(Some(s.trim().to_string())),
        Some((_, Value::Number(n))) => Ok(Some(n.to_string())),
        Some((key, other)) => Err(ValuationError::invalid_spec(
            key,
            format!("expected text, got {}", other),
        )),
    }
}

/// Coerces a loosely typed number. `None` means the value was blank.
fn coerce_number(field_name: &str, value: &Value) -> Result<Option<f64>> {
    let number = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            let trimmed = trimmed
                .strip_suffix("GB")
                .or_else(|| trimmed.strip_suffix("gb"))
                .or_else(|| trimmed.strip_suffix("Gb"))
                .unwrap_or(trimmed)
                .trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Some(trimmed.parse::<f64>().map_err(|_| {
                ValuationError::invalid_spec(field_name, format!("'{}' is not a number", s))
            })?)
        }
        other => {
            return Err(ValuationError::invalid_spec(
                field_name,
                format!("expected a number, got {}", other),
            ))
        }
    };

    match number {
        Some(n) if n.is_finite() => Ok(Some(n)),
        _ => Err(ValuationError::invalid_spec(field_name, "number is not finite")),
    }
}

fn non_negative(field_name: &str, value: Option<&Value>) -> Result<f64> {
    let amount = match value {
        Some(v) => coerce_number(field_name, v)?.unwrap_or(0.0),
        None => 0.0,
    };
    if amount < 0.0 {
        return Err(ValuationError::invalid_spec(
            field_name,
            format!("must not be negative (got {})", amount),
        ));
    }
    Ok(amount)
}

fn coerce_bool(field_name: &str, value: Option<&Value>) -> Result<bool> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::Number(n)) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" | "laptop" => Ok(true),
            "false" | "no" | "off" | "0" | "desktop" | "" => Ok(false),
            _ => Err(ValuationError::invalid_spec(
                field_name,
                format!("'{}' is not a yes/no value", s),
            )),
        },
        Some(other) => Err(ValuationError::invalid_spec(
            field_name,
            format!("expected a boolean, got {}", other),
        )),
    }
}

fn manual_score(value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(score) if !score.is_finite() || score <= 0.0 => Err(ValuationError::invalid_spec(
            "manual_benchmark_score",
            format!("must be a positive number (got {})", score),
        )),
        other => Ok(other),
    }
}

fn normalize_drives(value: Option<&Value>) -> Result<Vec<Drive>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ValuationError::invalid_spec(
                "drives",
                format!("expected a list, got {}", other),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| -> Result<Drive> {
            let obj = item.as_object().ok_or_else(|| {
                ValuationError::invalid_spec(format!("drives[{}]", i), "expected an object")
            })?;
            let capacity_gb = non_negative(
                &format!("drives[{}].capacity_gb", i),
                field(obj, &["capacity_gb", "capacity"]).map(|(_, v)| v),
            )?;
            let media_type = text_field(obj, &["media_type", "type"])?
                .map(|t| MediaType::parse_lenient(&t))
                .unwrap_or_default();
            Ok(Drive {
                capacity_gb,
                media_type,
            })
        })
        .collect()
}

/// Turns raw request data into a `ValuationInput`.
///
/// Accepts both the canonical field names and the form field names the
/// build-sheet front end posts (`cpu_name`, `gpu_price`, `manual_passmark`,
/// drive `capacity`/`type`). An explicit `manual_score` argument takes
/// precedence over one embedded in `raw`.
pub fn normalize(raw: &Value, manual_score_arg: Option<f64>) -> Result<ValuationInput> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ValuationError::invalid_spec("specs", "expected a JSON object"))?;

    let embedded_manual = match field(obj, &["manual_benchmark_score", "manual_passmark"]) {
        Some((key, v)) => coerce_number(key, v)?,
        None => None,
    };
    let manual_benchmark_score = manual_score(manual_score_arg.or(embedded_manual))?;

    let ram_gb = non_negative("ram_gb", field(obj, &["ram_gb"]).map(|(_, v)| v))?;
    let ram_type = text_field(obj, &["ram_type"])?
        .filter(|t| !t.is_empty())
        .map(|t| RamType::parse_lenient(&t))
        .unwrap_or(RamType::Ddr4);

    let gpu_value = non_negative("gpu_value", field(obj, &["gpu_value", "gpu_price"]).map(|(_, v)| v))?;

    Ok(ValuationInput {
        cpu_query: text_field(obj, &["cpu_query", "cpu_name"])?.unwrap_or_default(),
        cpu_model_key: text_field(obj, &["cpu_model_key", "cpu_model_name"])?
            .filter(|k| !k.is_empty()),
        manual_benchmark_score,
        ram_gb,
        ram_type,
        drives: normalize_drives(obj.get("drives"))?,
        gpu_value,
        os_name: text_field(obj, &["os_name"])?
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_OS.to_string()),
        is_laptop: coerce_bool("is_laptop", obj.get("is_laptop"))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_for_missing_fields() {
        let input = normalize(&json!({"cpu_name": "i5-8350U"}), None).unwrap();

        assert_eq!(input.cpu_query, "i5-8350U");
        assert_eq!(input.ram_gb, 0.0);
        assert_eq!(input.ram_type, RamType::Ddr4);
        assert_eq!(input.gpu_value, 0.0);
        assert_eq!(input.os_name, "Windows");
        assert!(input.drives.is_empty());
        assert!(!input.is_laptop);
        assert_eq!(input.manual_benchmark_score, None);
        assert_eq!(input.cpu_model_key, None);
    }

    #[test]
    fn test_blank_os_name_falls_back_to_windows() {
        let input = normalize(&json!({"os_name": "  "}), None).unwrap();
        assert_eq!(input.os_name, DEFAULT_OS);

        let input = normalize(&json!({"os_name": "Linux Mint"}), None).unwrap();
        assert_eq!(input.os_name, "Linux Mint");
    }

    #[test]
    fn test_form_style_strings_are_coerced() {
        let raw = json!({
            "cpu_name": "Intel Core i5-8350U",
            "cpu_model_name": "",
            "ram_gb": "16",
            "ram_type": "DDR5",
            "gpu_price": "",
            "is_laptop": "yes",
            "manual_passmark": "",
            "drives": [
                {"capacity": "512GB", "type": "NVMe SSD"},
                {"capacity": 1000, "type": "HDD"},
                {}
            ]
        });
        let input = normalize(&raw, None).unwrap();

        assert_eq!(input.ram_gb, 16.0);
        assert_eq!(input.ram_type, RamType::Ddr5);
        assert_eq!(input.gpu_value, 0.0);
        assert!(input.is_laptop);
        assert_eq!(input.cpu_model_key, None);
        assert_eq!(input.manual_benchmark_score, None);
        assert_eq!(input.drives.len(), 3);
        assert_eq!(input.drives[0].capacity_gb, 512.0);
        assert_eq!(input.drives[0].media_type, MediaType::NvmeSsd);
        assert_eq!(input.drives[1].media_type, MediaType::Hdd);
        assert_eq!(input.drives[2].capacity_gb, 0.0);
        assert_eq!(input.drives[2].media_type, MediaType::SataSsd);
        assert_eq!(input.primary_drive().unwrap().capacity_gb, 512.0);
    }

    #[test]
    fn test_negative_values_name_the_field() {
        let err = normalize(&json!({"ram_gb": -4}), None).unwrap_err();
        assert!(matches!(err, ValuationError::InvalidSpec { ref field, .. } if field == "ram_gb"));

        let err = normalize(
            &json!({"drives": [{"capacity_gb": 256}, {"capacity_gb": -1}]}),
            None,
        )
        .unwrap_err();
        assert!(
            matches!(err, ValuationError::InvalidSpec { ref field, .. } if field == "drives[1].capacity_gb")
        );
    }

    #[test]
    fn test_garbage_numbers_and_flags_are_rejected() {
        assert!(normalize(&json!({"ram_gb": "lots"}), None).is_err());
        assert!(normalize(&json!({"is_laptop": "maybe"}), None).is_err());
        assert!(normalize(&json!({"drives": "512"}), None).is_err());
        assert!(normalize(&json!(["not", "an", "object"]), None).is_err());
    }

    #[test]
    fn test_manual_score_precedence_and_range() {
        let raw = json!({"manual_passmark": "3100"});
        assert_eq!(normalize(&raw, None).unwrap().manual_benchmark_score, Some(3100.0));
        assert_eq!(
            normalize(&raw, Some(4500.0)).unwrap().manual_benchmark_score,
            Some(4500.0)
        );

        let err = normalize(&json!({}), Some(0.0)).unwrap_err();
        assert!(
            matches!(err, ValuationError::InvalidSpec { ref field, .. } if field == "manual_benchmark_score")
        );
    }
}
