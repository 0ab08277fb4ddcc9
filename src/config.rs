//! Chart configuration supplied by the caller
//!
//! The configuration is plain data deserialized from camelCase JSON. Everything is optional;
//! enumerated options fall back to the defaults from chart_defaults.json (see [`crate::defaults`]).

use crate::defaults;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Number separators used by the formatter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Separators {
    pub thousand: String,
    pub decimal: String,
}

impl Default for Separators {
    fn default() -> Self {
        Self {
            thousand: ",".to_string(),
            decimal: ".".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// CSS form `rgb(r,g,b)`
    pub fn to_css(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// Read `rgb(r,g,b)`, `rgba(r,g,b,a)` or `#rrggbb`; alpha is dropped
    pub fn from_css(css: &str) -> Option<Self> {
        let css = css.trim();
        if let Some(hex) = css.strip_prefix('#') {
            if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return None;
            }
            let value = u32::from_str_radix(hex, 16).ok()?;
            let [_, r, g, b] = value.to_be_bytes();
            return Some(Self::new(r, g, b));
        }
        let args = css
            .strip_prefix("rgba(")
            .or_else(|| css.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut channels = args.split(',').map(|c| c.trim().parse::<u8>());
        match (channels.next(), channels.next(), channels.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) => Some(Self::new(r, g, b)),
            _ => None,
        }
    }
}

/// One entry of a custom color palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorPaletteItem {
    pub guid: String,
    pub fill: Rgb,
}

/// A color reference: either a palette guid or a literal color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum ColorItem {
    Guid(String),
    Rgb(Rgb),
}

/// User color override for a measure (local id) or attribute item (item id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMappingItem {
    pub id: String,
    pub color: ColorItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub enabled: Option<bool>,
}

/// `dataLabels.visible`: `true`, `false` or `"auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataLabelsVisibility {
    Shown,
    Hidden,
    Auto,
}

impl Serialize for DataLabelsVisibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DataLabelsVisibility::Shown => serializer.serialize_bool(true),
            DataLabelsVisibility::Hidden => serializer.serialize_bool(false),
            DataLabelsVisibility::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for DataLabelsVisibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Bool(true) => Ok(DataLabelsVisibility::Shown),
            serde_json::Value::Bool(false) => Ok(DataLabelsVisibility::Hidden),
            serde_json::Value::String(s) if s == "auto" => Ok(DataLabelsVisibility::Auto),
            other => Err(de::Error::custom(format!(
                "dataLabels.visible must be true, false or \"auto\", got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataLabelsConfig {
    pub visible: Option<DataLabelsVisibility>,
}

/// Axis title options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisNameConfig {
    pub visible: Option<bool>,
    /// `low`, `middle` or `high`
    pub position: Option<String>,
}

/// User options of one axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AxisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels_enabled: Option<bool>,
    /// Label rotation in degrees, or `auto`
    #[serde(
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotation: Option<String>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub min: Option<f64>,
    #[serde(
        deserialize_with = "lenient_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub max: Option<f64>,
    /// Local ids of the measures placed on this (secondary) axis
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<AxisNameConfig>,
}

impl AxisConfig {
    pub fn is_empty(&self) -> bool {
        *self == AxisConfig::default()
    }

    /// Axes are visible unless switched off
    pub fn is_visible(&self) -> bool {
        self.visible.unwrap_or(true)
    }

    pub fn labels_enabled(&self) -> bool {
        self.labels_enabled.unwrap_or(true)
    }

    /// Rotation in degrees; `None` for `auto`, absent or unparseable values
    pub fn rotation_degrees(&self) -> Option<f64> {
        self.rotation
            .as_deref()
            .filter(|r| *r != "auto")
            .and_then(|r| r.trim().parse::<f64>().ok())
    }

    pub fn name_visible(&self) -> bool {
        self.name.as_ref().and_then(|n| n.visible).unwrap_or(true)
    }

    pub fn name_position(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.position.as_deref())
    }
}

/// Accept numbers or numeric strings; empty strings and null mean "unset"
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => Ok(n.as_f64()),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected a number, got '{}'", s))),
        other => Err(de::Error::custom(format!("expected a number, got {}", other))),
    }
}

/// Accept strings or numbers as a string
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s)),
        serde_json::Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(de::Error::custom(format!(
            "expected a string or number, got {}",
            other
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartAlignmentConfig {
    pub vertical_align: Option<String>,
}

/// Recognised chart options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    /// Chart type name; checked against the supported types at the entry point
    #[serde(rename = "type")]
    pub chart_type: Option<String>,
    pub stacking: Option<bool>,
    pub stack_measures: Option<bool>,
    pub stack_measures_to_percent: Option<bool>,
    pub color_palette: Option<Vec<ColorPaletteItem>>,
    pub color_mapping: Vec<ColorMappingItem>,
    pub grid: Option<GridConfig>,
    pub legend_layout: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub x_format: Option<String>,
    pub y_format: Option<String>,
    #[serde(rename = "xaxis")]
    pub xaxis: Option<AxisConfig>,
    #[serde(rename = "yaxis")]
    pub yaxis: Option<AxisConfig>,
    #[serde(rename = "secondary_xaxis")]
    pub secondary_xaxis: Option<AxisConfig>,
    #[serde(rename = "secondary_yaxis")]
    pub secondary_yaxis: Option<AxisConfig>,
    pub data_labels: DataLabelsConfig,
    pub separators: Separators,
    pub primary_chart_type: Option<String>,
    pub secondary_chart_type: Option<String>,
    pub force_disable_drill_on_axes: bool,
    pub chart: Option<ChartAlignmentConfig>,
}

impl ChartConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Config of the given type with everything else defaulted
    pub fn of_type(chart_type: &str) -> Self {
        Self {
            chart_type: Some(chart_type.to_string()),
            ..Self::default()
        }
    }

    pub fn stack_measures(&self) -> bool {
        self.stack_measures.unwrap_or(false)
    }

    pub fn stack_measures_to_percent(&self) -> bool {
        self.stack_measures_to_percent.unwrap_or(false)
    }

    /// Grid lines are on unless disabled
    pub fn grid_enabled(&self) -> bool {
        self.grid.as_ref().and_then(|g| g.enabled).unwrap_or(true)
    }

    /// `horizontal` or `vertical`
    pub fn legend_layout(&self) -> String {
        defaults::get_enum("legendLayout", self.legend_layout.as_deref())
    }

    /// Series type of primary-axis measures in a combo chart
    pub fn primary_chart_type(&self) -> String {
        defaults::get_enum("primaryChartType", self.primary_chart_type.as_deref())
    }

    /// Series type of secondary-axis measures in a combo chart
    pub fn secondary_chart_type(&self) -> String {
        defaults::get_enum("secondaryChartType", self.secondary_chart_type.as_deref())
    }

    pub fn vertical_align(&self) -> String {
        defaults::get_enum(
            "verticalAlign",
            self.chart.as_ref().and_then(|c| c.vertical_align.as_deref()),
        )
    }

    pub fn data_labels_visible(&self) -> Option<DataLabelsVisibility> {
        self.data_labels.visible
    }

    /// True when a custom palette with at least one color is configured
    pub fn has_custom_palette(&self) -> bool {
        self.color_palette
            .as_ref()
            .map(|p| !p.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChartConfig::default();
        assert!(config.grid_enabled());
        assert!(!config.stack_measures());
        assert_eq!(config.legend_layout(), "horizontal");
        assert_eq!(config.primary_chart_type(), "column");
        assert_eq!(config.secondary_chart_type(), "line");
        assert_eq!(config.vertical_align(), "middle");
        assert_eq!(config.separators.thousand, ",");
        assert!(!config.has_custom_palette());
    }

    #[test]
    fn test_from_json() {
        let config = ChartConfig::from_json(
            r##"{
                "type": "column",
                "stackMeasuresToPercent": true,
                "grid": {"enabled": false},
                "legendLayout": "vertical",
                "dataLabels": {"visible": "auto"},
                "secondary_yaxis": {"measures": ["m2"], "min": "0.1", "max": 5, "rotation": 30},
                "yaxis": {"visible": false, "min": "", "name": {"visible": false, "position": "high"}},
                "colorPalette": [{"guid": "blue", "fill": {"r": 0, "g": 0, "b": 255}}],
                "colorMapping": [{"id": "m1", "color": {"type": "rgb", "value": {"r": 1, "g": 2, "b": 3}}},
                                 {"id": "a/1", "color": {"type": "guid", "value": "blue"}}],
                "separators": {"thousand": " ", "decimal": ","},
                "forceDisableDrillOnAxes": true
            }"##,
        )
        .unwrap();

        assert_eq!(config.chart_type.as_deref(), Some("column"));
        assert!(config.stack_measures_to_percent());
        assert!(!config.grid_enabled());
        assert_eq!(config.legend_layout(), "vertical");
        assert_eq!(config.data_labels_visible(), Some(DataLabelsVisibility::Auto));

        let secondary = config.secondary_yaxis.as_ref().unwrap();
        assert_eq!(secondary.measures, vec!["m2".to_string()]);
        assert_eq!(secondary.min, Some(0.1));
        assert_eq!(secondary.max, Some(5.0));
        assert_eq!(secondary.rotation_degrees(), Some(30.0));

        let yaxis = config.yaxis.as_ref().unwrap();
        assert!(!yaxis.is_visible());
        assert_eq!(yaxis.min, None);
        assert!(!yaxis.name_visible());
        assert_eq!(yaxis.name_position(), Some("high"));

        assert!(config.has_custom_palette());
        assert_eq!(
            config.color_mapping[0].color,
            ColorItem::Rgb(Rgb::new(1, 2, 3))
        );
        assert_eq!(
            config.color_mapping[1].color,
            ColorItem::Guid("blue".to_string())
        );
        assert_eq!(config.separators.decimal, ",");
        assert!(config.force_disable_drill_on_axes);
    }

    #[test]
    fn test_rgb_from_css() {
        assert_eq!(Rgb::from_css("rgb(20,178,226)"), Some(Rgb::new(20, 178, 226)));
        assert_eq!(Rgb::from_css(" rgba(1, 2, 3, 0.5) "), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Rgb::from_css("#1f78B4"), Some(Rgb::new(31, 120, 180)));
        assert_eq!(Rgb::from_css("#fff"), None);
        assert_eq!(Rgb::from_css("rgb(1,2)"), None);
        assert_eq!(Rgb::from_css("rgb(300,2,3)"), None);
        assert_eq!(Rgb::from_css("url(#pattern)"), None);
    }

    #[test]
    fn test_data_labels_visibility() {
        let shown: DataLabelsConfig = serde_json::from_str(r#"{"visible": true}"#).unwrap();
        assert_eq!(shown.visible, Some(DataLabelsVisibility::Shown));
        let hidden: DataLabelsConfig = serde_json::from_str(r#"{"visible": false}"#).unwrap();
        assert_eq!(hidden.visible, Some(DataLabelsVisibility::Hidden));
        assert!(serde_json::from_str::<DataLabelsConfig>(r#"{"visible": "yes"}"#).is_err());
        assert_eq!(
            serde_json::to_value(DataLabelsVisibility::Auto).unwrap(),
            serde_json::json!("auto")
        );
    }

    #[test]
    fn test_rotation_auto() {
        let axis = AxisConfig {
            rotation: Some("auto".to_string()),
            ..AxisConfig::default()
        };
        assert_eq!(axis.rotation_degrees(), None);
        assert!(!axis.is_empty());
        assert!(AxisConfig::default().is_empty());
    }
}
