//! Chart defaults from chart_defaults.json
//!
//! The file is embedded at compile time and holds the validation limits per chart family and
//! the defaults of the enumerated/string chart options. Defaults are defined in this one place
//! instead of being scattered through the pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// chart_defaults.json embedded at compile time
const CHART_DEFAULTS_JSON: &str = include_str!("../chart_defaults.json");

/// Upper bounds on what a chart may render
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLimits {
    #[serde(default)]
    pub series: Option<usize>,
    #[serde(default)]
    pub categories: Option<usize>,
    #[serde(default)]
    pub data_points: Option<usize>,
}

impl ChartLimits {
    pub const fn new(series: usize, categories: usize, data_points: Option<usize>) -> Self {
        Self {
            series: Some(series),
            categories: Some(categories),
            data_points,
        }
    }
}

/// Limits used when the embedded file cannot be read
const BUILTIN_LIMITS: ChartLimits = ChartLimits::new(1000, 3000, None);

/// Property definition from chart_defaults.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Enumerated,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProperty {
    name: String,
    kind: String,
    #[serde(default)]
    default_value: String,
    #[serde(default)]
    values: Option<Vec<String>>,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    #[serde(default)]
    limits: HashMap<String, ChartLimits>,
    #[serde(default)]
    properties: Vec<RawProperty>,
}

/// Registry of chart option defaults and limits
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
    limits: HashMap<String, ChartLimits>,
}

impl PropertyRegistry {
    /// Parse the defaults document and build the registry
    pub fn from_json(json: &str) -> Result<Self, String> {
        let raw: RawDefaults = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse chart defaults: {}", e))?;

        let mut properties = HashMap::new();
        for prop in raw.properties {
            let kind = match prop.kind.as_str() {
                "StringProperty" => PropertyKind::String,
                "EnumeratedProperty" => PropertyKind::Enumerated,
                other => return Err(format!("Unknown property kind: {}", other)),
            };
            let valid_values = if kind == PropertyKind::Enumerated {
                prop.values
            } else {
                None
            };
            properties.insert(
                prop.name.clone(),
                PropertyDef {
                    name: prop.name,
                    kind,
                    default_value: prop.default_value,
                    description: prop.description,
                    valid_values,
                },
            );
        }

        Ok(Self {
            properties,
            limits: raw.limits,
        })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true)
    }

    /// Limits stored under `key`, falling back to the `default` entry
    pub fn limits(&self, key: &str) -> ChartLimits {
        self.limits
            .get(key)
            .or_else(|| self.limits.get("default"))
            .copied()
            .unwrap_or(BUILTIN_LIMITS)
    }
}

static REGISTRY: OnceLock<PropertyRegistry> = OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(CHART_DEFAULTS_JSON).unwrap_or_else(|e| {
            log::warn!("{}; using built-in defaults", e);
            PropertyRegistry::default()
        })
    })
}

/// Get a string option: the user value when present and non-empty, else the default
pub fn get_string(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => registry().get_default(name).unwrap_or("").to_string(),
    }
}

/// Get an enumerated option with validation
///
/// Returns the user value if valid, otherwise the default. Logs a warning if the user value
/// is invalid.
pub fn get_enum(name: &str, value: Option<&str>) -> String {
    let reg = registry();
    let default = reg.get_default(name).unwrap_or("");

    if let Some(value) = value.filter(|v| !v.is_empty()) {
        if reg.is_valid_enum_value(name, value) {
            return value.to_string();
        }
        let valid_values = reg
            .get_property(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|v| v.join(", "))
            .unwrap_or_default();
        log::warn!(
            "Invalid value '{}' for option '{}'. Valid values: [{}]. Using default: '{}'",
            value,
            name,
            valid_values,
            default
        );
    }

    default.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("legendLayout").is_some());
        assert!(reg.get_property("primaryChartType").is_some());
        assert_eq!(
            reg.get_property("colorPalette").unwrap().kind,
            PropertyKind::String
        );
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("legendLayout"), Some("horizontal"));
        assert_eq!(reg.get_default("primaryChartType"), Some("column"));
        assert_eq!(reg.get_default("secondaryChartType"), Some("line"));
        assert_eq!(reg.get_default("verticalAlign"), Some("middle"));
    }

    #[test]
    fn test_enum_validation() {
        assert_eq!(get_enum("legendLayout", Some("vertical")), "vertical");
        assert_eq!(get_enum("legendLayout", Some("VERTICAL")), "VERTICAL");
        assert_eq!(get_enum("legendLayout", Some("diagonal")), "horizontal");
        assert_eq!(get_enum("legendLayout", None), "horizontal");
        assert_eq!(get_enum("legendLayout", Some("")), "horizontal");
    }

    #[test]
    fn test_get_string() {
        assert_eq!(get_string("colorPalette", None), "GoodData");
        assert_eq!(get_string("colorPalette", Some("Paired")), "Paired");
    }

    #[test]
    fn test_limits() {
        let reg = registry();
        assert_eq!(reg.limits("default"), ChartLimits::new(1000, 3000, None));
        assert_eq!(reg.limits("pie"), ChartLimits::new(1, 20, None));
        assert_eq!(reg.limits("treemap").data_points, Some(2000));
        assert_eq!(reg.limits("heatmap").data_points, Some(10000));
        assert_eq!(reg.limits("unknown"), reg.limits("default"));
    }

    #[test]
    fn test_malformed_defaults_rejected() {
        assert!(PropertyRegistry::from_json("{").is_err());
        let err = PropertyRegistry::from_json(
            r#"{"properties": [{"name": "a", "kind": "BooleanProperty"}]}"#,
        )
        .unwrap_err();
        assert!(err.contains("BooleanProperty"));
        assert_eq!(PropertyRegistry::default().limits("pie"), BUILTIN_LIMITS);
    }
}
