//! Read-only facade over a multidimensional execution result
//!
//! A result is a two-dimensional grid of string-encoded values plus the headers that describe
//! both dimensions:
//! - dimension 0 (stack-by dimension): rows of the matrix, usually stack-by attribute items
//!   and/or the measure group
//! - dimension 1 (view-by dimension): columns of the matrix, usually view-by attribute items
//!
//! Attribute header items are listed per row/column, so nested attributes repeat their items.

use super::error::{ChartError, Result};
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of the dimension holding the stack-by attribute
pub const STACK_BY_DIMENSION_INDEX: usize = 0;

/// Index of the dimension holding the view-by attribute(s)
pub const VIEW_BY_DIMENSION_INDEX: usize = 1;

/// Number of view-by attributes that switches the chart to grouped (parent/child) categories
pub const VIEW_BY_ATTRIBUTES_LIMIT: usize = 2;

/// Bucket names used to tell apart layouts with the same dimensionality
pub mod buckets {
    pub const MEASURES: &str = "measures";
    pub const SECONDARY_MEASURES: &str = "secondary_measures";
    pub const TERTIARY_MEASURES: &str = "tertiary_measures";
    pub const VIEW: &str = "view";
    pub const STACK: &str = "stack";
    pub const SEGMENT: &str = "segment";
}

/// One attribute value (row or column label)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeItem {
    pub id: String,
    pub name: String,
}

/// Categorical dimension header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeHeader {
    pub local_id: String,
    /// Display form name
    pub display_name: String,
    /// Underlying attribute name, used for axis titles and tooltips
    pub form_name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub items: Vec<AttributeItem>,
}

impl AttributeHeader {
    pub fn item(&self, index: usize) -> Option<&AttributeItem> {
        self.items.get(index)
    }

    pub fn item_names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }
}

/// One numeric series definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureDescriptor {
    pub local_id: String,
    pub name: String,
    /// Number format; a `%` anywhere marks the measure as a percentage
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub identifier: Option<String>,
}

impl MeasureDescriptor {
    pub fn is_percentage(&self) -> bool {
        self.format.contains('%')
    }
}

/// Header of a dimension: an attribute or the measure group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionHeader {
    Attribute(AttributeHeader),
    MeasureGroup(Vec<MeasureDescriptor>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub headers: Vec<DimensionHeader>,
}

impl Dimension {
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeHeader> {
        self.headers.iter().filter_map(|header| match header {
            DimensionHeader::Attribute(attribute) => Some(attribute),
            DimensionHeader::MeasureGroup(_) => None,
        })
    }
}

/// The result grid and its headers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    /// Row vectors of string-encoded values; `None` is a missing value
    #[serde(default, deserialize_with = "deserialize_matrix")]
    pub data: Vec<Vec<Option<String>>>,
    /// Bucket name -> "is empty" flag, absent when the result carries no bucket information
    #[serde(default)]
    pub bucket_emptiness: Option<BTreeMap<String, bool>>,
}

impl ResultView {
    pub fn new(dimensions: Vec<Dimension>, data: Vec<Vec<Option<String>>>) -> Self {
        Self {
            dimensions,
            data,
            bucket_emptiness: None,
        }
    }

    /// Attach bucket emptiness flags as `(bucket name, is empty)` pairs
    pub fn with_buckets<'a>(mut self, flags: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        self.bucket_emptiness = Some(
            flags
                .into_iter()
                .map(|(name, empty)| (name.to_string(), empty))
                .collect(),
        );
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Raw matrix, one row per series
    pub fn two_dim_data(&self) -> &[Vec<Option<String>>] {
        &self.data
    }

    /// First measure group found in any dimension
    pub fn measure_group(&self) -> Option<&[MeasureDescriptor]> {
        self.dimensions.iter().find_map(|dimension| {
            dimension.headers.iter().find_map(|header| match header {
                DimensionHeader::MeasureGroup(items) => Some(items.as_slice()),
                DimensionHeader::Attribute(_) => None,
            })
        })
    }

    /// Measure group, failing when the result has none
    pub fn require_measure_group(&self) -> Result<&[MeasureDescriptor]> {
        self.measure_group()
            .ok_or_else(|| ChartError::InvalidResult("result has no measure group".to_string()))
    }

    /// `index`-th attribute header of a dimension
    pub fn attribute(&self, dimension: usize, index: usize) -> Option<&AttributeHeader> {
        self.dimensions
            .get(dimension)
            .and_then(|d| d.attributes().nth(index))
    }

    pub fn attribute_count(&self, dimension: usize) -> usize {
        self.dimensions
            .get(dimension)
            .map(|d| d.attributes().count())
            .unwrap_or(0)
    }

    pub fn has_attributes(&self) -> bool {
        self.dimensions
            .iter()
            .any(|d| d.attributes().next().is_some())
    }

    /// True when bucket information is available
    pub fn has_buckets(&self) -> bool {
        self.bucket_emptiness
            .as_ref()
            .map(|b| !b.is_empty())
            .unwrap_or(false)
    }

    /// Unknown buckets count as empty
    pub fn is_bucket_empty(&self, name: &str) -> bool {
        self.bucket_emptiness
            .as_ref()
            .and_then(|b| b.get(name).copied())
            .unwrap_or(true)
    }
}

/// Accepts strings, numbers and nulls as matrix cells
fn deserialize_matrix<'de, D>(deserializer: D) -> std::result::Result<Vec<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows: Vec<Vec<serde_json::Value>> = Vec::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::Null => None,
                    serde_json::Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .collect())
}

/// Parse a matrix cell as a number; anything non-numeric (or non-finite) is a missing value
pub fn parse_value(value: Option<&str>) -> Option<f64> {
    let parsed = value?.trim().parse::<f64>().ok()?;
    if parsed.is_finite() {
        Some(parsed)
    } else {
        None
    }
}

/// Parse the leading float of a cell, keeping NaN for anything unparseable
pub fn parse_float(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(Some("10")), Some(10.0));
        assert_eq!(parse_value(Some("-1.5")), Some(-1.5));
        assert_eq!(parse_value(Some(" 2 ")), Some(2.0));
        assert_eq!(parse_value(Some("abc")), None);
        assert_eq!(parse_value(Some("")), None);
        assert_eq!(parse_value(Some("NaN")), None);
        assert_eq!(parse_value(Some("inf")), None);
        assert_eq!(parse_value(None), None);
    }

    #[test]
    fn test_parse_float_keeps_nan() {
        assert_eq!(parse_float(Some("3")), 3.0);
        assert!(parse_float(Some("")).is_nan());
        assert!(parse_float(None).is_nan());
    }

    #[test]
    fn test_accessors() {
        let result = view(
            vec![DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")])],
            vec![DimensionHeader::Attribute(attribute(
                "a1",
                "Product",
                &["Computer", "Television"],
            ))],
            &[&["10", "20"]],
        );

        assert_eq!(result.measure_group().unwrap().len(), 1);
        assert_eq!(
            result.attribute(VIEW_BY_DIMENSION_INDEX, 0).unwrap().form_name,
            "Product"
        );
        assert!(result.attribute(STACK_BY_DIMENSION_INDEX, 0).is_none());
        assert_eq!(result.attribute_count(VIEW_BY_DIMENSION_INDEX), 1);
        assert!(!result.has_buckets());
        assert!(result.is_bucket_empty(buckets::MEASURES));
    }

    #[test]
    fn test_bucket_flags() {
        let result = ResultView::default()
            .with_buckets([(buckets::MEASURES, false), (buckets::SECONDARY_MEASURES, true)]);
        assert!(result.has_buckets());
        assert!(!result.is_bucket_empty(buckets::MEASURES));
        assert!(result.is_bucket_empty(buckets::SECONDARY_MEASURES));
        assert!(result.is_bucket_empty(buckets::VIEW));
    }

    #[test]
    fn test_require_measure_group() {
        let err = ResultView::default().require_measure_group().unwrap_err();
        assert!(err.to_string().contains("no measure group"));
    }

    #[test]
    fn test_from_json_accepts_numbers_and_nulls() {
        let json = r##"{
            "dimensions": [
                {"headers": [{"measureGroup": [{"localId": "m1", "name": "Amount", "format": "#,##0"}]}]},
                {"headers": [{"attribute": {"localId": "a1", "displayName": "Product Name",
                    "formName": "Product", "items": [{"id": "1", "name": "A"}, {"id": "2", "name": "B"}]}}]}
            ],
            "data": [["1", 2.5, null]],
            "bucketEmptiness": {"measures": false}
        }"##;
        let result = ResultView::from_json(json).unwrap();
        assert_eq!(
            result.data,
            vec![vec![Some("1".to_string()), Some("2.5".to_string()), None]]
        );
        assert_eq!(result.attribute(1, 0).unwrap().items.len(), 2);
        assert!(!result.is_bucket_empty("measures"));
    }
}
