//! Data point variants
//!
//! Each chart family gets its own point shape so the compiler decides which fields exist.
//! Serialization produces the renderer's point objects directly.

use super::colors::{GRAY, TRANSPARENT, WHITE};
use super::drillability::DrillIntersectionItem;
use serde::Serialize;
use serde_json::{json, Value};

/// The single measured value of a point: `y` for most charts, `value` for treemaps
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureValue {
    Y(Option<f64>),
    Value(Option<f64>),
}

impl MeasureValue {
    pub fn get(&self) -> Option<f64> {
        match self {
            MeasureValue::Y(v) | MeasureValue::Value(v) => *v,
        }
    }
}

/// Drill flags shared by every point variant
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillState {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub drilldown: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drill_intersection: Option<Vec<DrillIntersectionItem>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub enabled: bool,
}

/// Point of a categorical series (bar family, line family, pie family, plain treemap)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPoint {
    #[serde(flatten)]
    pub measure: MeasureValue,
    pub name: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_index: Option<usize>,
    /// Missing values hide the marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    #[serde(flatten)]
    pub drill: DrillState,
}

/// Scatter or bubble point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XyPoint {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Bubble size; NaN renders a default sized bubble and serializes as null
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(flatten)]
    pub drill: DrillState,
}

/// Heatmap cell at (column, row)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub x: usize,
    pub y: usize,
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_padding: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Value>,
    /// Synthetic point that drill events must skip
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignored_in_drill_event_context: bool,
    #[serde(flatten)]
    pub drill: DrillState,
}

/// Hatched fill marking a missing heatmap value
pub fn null_pattern() -> Value {
    json!({
        "pattern": {
            "path": {
                "d": "M 10 0 L 0 10 M 9 11 L 11 9 M 4 11 L 11 4 M -1 1 L 1 -1 M -1 6 L 6 -1",
                "stroke": GRAY,
                "strokeWidth": 1,
                "fill": WHITE,
            },
            "width": 10,
            "height": 10,
        }
    })
}

impl HeatmapCell {
    pub fn with_value(x: usize, y: usize, value: f64) -> Self {
        Self {
            x,
            y,
            value: Some(value),
            border_width: None,
            border_color: None,
            point_padding: None,
            color: None,
            ignored_in_drill_event_context: false,
            drill: DrillState::default(),
        }
    }

    /// The two overlapping points drawn for a missing value: a gray border and a hatched fill
    pub fn missing(x: usize, y: usize) -> [Self; 2] {
        let border = Self {
            value: None,
            border_width: Some(1),
            border_color: Some(GRAY.to_string()),
            color: Some(Value::String(TRANSPARENT.to_string())),
            ..Self::with_value(x, y, 0.0)
        };
        let pattern = Self {
            value: None,
            border_width: Some(0),
            point_padding: Some(2),
            color: Some(null_pattern()),
            ignored_in_drill_event_context: true,
            ..Self::with_value(x, y, 0.0)
        };
        [border, pattern]
    }
}

/// Treemap root (has `id`) or leaf (has `parent`)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreemapNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<usize>,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_index: Option<usize>,
    pub show_in_legend: bool,
    pub format: String,
    #[serde(flatten)]
    pub drill: DrillState,
}

impl TreemapNode {
    pub fn root(index: usize, name: &str, format: &str, color: String) -> Self {
        Self {
            id: Some(index.to_string()),
            parent: None,
            name: name.to_string(),
            value: None,
            x: None,
            y: None,
            color,
            legend_index: Some(index),
            show_in_legend: true,
            format: format.to_string(),
            drill: DrillState::default(),
        }
    }

    pub fn leaf(
        parent: usize,
        name: &str,
        value: Option<f64>,
        (x, y): (usize, usize),
        format: &str,
        color: String,
    ) -> Self {
        Self {
            id: None,
            parent: Some(parent.to_string()),
            name: name.to_string(),
            value,
            x: Some(x),
            y: Some(y),
            color,
            legend_index: None,
            show_in_legend: false,
            format: format.to_string(),
            drill: DrillState::default(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DataPoint {
    Category(CategoryPoint),
    Xy(XyPoint),
    HeatmapCell(HeatmapCell),
    TreemapNode(TreemapNode),
}

impl DataPoint {
    /// Measured value (`y`, or `value` for heatmap and treemap points)
    pub fn value(&self) -> Option<f64> {
        match self {
            DataPoint::Category(p) => p.measure.get(),
            DataPoint::Xy(p) => p.y,
            DataPoint::HeatmapCell(p) => p.value,
            DataPoint::TreemapNode(p) => p.value,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DataPoint::Category(p) => Some(&p.name),
            DataPoint::Xy(p) => p.name.as_deref(),
            DataPoint::HeatmapCell(_) => None,
            DataPoint::TreemapNode(p) => Some(&p.name),
        }
    }

    pub fn color(&self) -> Option<&str> {
        match self {
            DataPoint::Category(p) => p.color.as_deref(),
            DataPoint::TreemapNode(p) => Some(&p.color),
            DataPoint::Xy(_) | DataPoint::HeatmapCell(_) => None,
        }
    }

    pub fn legend_index(&self) -> Option<usize> {
        match self {
            DataPoint::Category(p) => p.legend_index,
            DataPoint::TreemapNode(p) => p.legend_index,
            DataPoint::Xy(_) | DataPoint::HeatmapCell(_) => None,
        }
    }

    pub fn set_legend_index(&mut self, index: usize) {
        match self {
            DataPoint::Category(p) => p.legend_index = Some(index),
            DataPoint::TreemapNode(p) => p.legend_index = Some(index),
            DataPoint::Xy(_) | DataPoint::HeatmapCell(_) => {}
        }
    }

    pub fn drill(&self) -> &DrillState {
        match self {
            DataPoint::Category(p) => &p.drill,
            DataPoint::Xy(p) => &p.drill,
            DataPoint::HeatmapCell(p) => &p.drill,
            DataPoint::TreemapNode(p) => &p.drill,
        }
    }

    pub fn drill_mut(&mut self) -> &mut DrillState {
        match self {
            DataPoint::Category(p) => &mut p.drill,
            DataPoint::Xy(p) => &mut p.drill,
            DataPoint::HeatmapCell(p) => &mut p.drill,
            DataPoint::TreemapNode(p) => &mut p.drill,
        }
    }

    pub fn is_drillable(&self) -> bool {
        self.drill().drilldown
    }

    /// Points the renderer cannot place because a coordinate is missing
    pub fn has_null_coordinate(&self) -> bool {
        match self {
            DataPoint::Xy(p) => p.x.is_none() || p.y.is_none(),
            _ => false,
        }
    }

    pub fn is_treemap_root(&self) -> bool {
        matches!(self, DataPoint::TreemapNode(node) if node.is_root())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(y: Option<f64>) -> CategoryPoint {
        CategoryPoint {
            measure: MeasureValue::Y(y),
            name: "Computer".to_string(),
            format: "#,##0".to_string(),
            color: None,
            legend_index: None,
            marker: None,
            drill: DrillState::default(),
        }
    }

    #[test]
    fn test_category_point_json() {
        let point = DataPoint::Category(category(Some(10.0)));
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"y": 10.0, "name": "Computer", "format": "#,##0"})
        );

        let mut missing = category(None);
        missing.marker = Some(Marker { enabled: false });
        missing.measure = MeasureValue::Value(None);
        assert_eq!(
            serde_json::to_value(DataPoint::Category(missing)).unwrap(),
            json!({"value": null, "name": "Computer", "format": "#,##0", "marker": {"enabled": false}})
        );
    }

    #[test]
    fn test_drill_state_json() {
        let mut point = DataPoint::Category(category(Some(1.0)));
        point.drill_mut().drilldown = true;
        point.drill_mut().drill_intersection = Some(vec![]);
        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["drilldown"], json!(true));
        assert_eq!(value["drillIntersection"], json!([]));
        assert!(point.is_drillable());
    }

    #[test]
    fn test_missing_heatmap_cell() {
        let [border, pattern] = HeatmapCell::missing(1, 2);
        let border = serde_json::to_value(&border).unwrap();
        assert_eq!(border["borderColor"], json!(GRAY));
        assert_eq!(border["color"], json!(TRANSPARENT));
        assert_eq!(border["value"], Value::Null);
        let pattern = serde_json::to_value(&pattern).unwrap();
        assert_eq!(pattern["ignoredInDrillEventContext"], json!(true));
        assert_eq!(pattern["pointPadding"], json!(2));
        assert_eq!(pattern["color"]["pattern"]["width"], json!(10));
    }

    #[test]
    fn test_bubble_nan_size_is_null() {
        let point = DataPoint::Xy(XyPoint {
            x: Some(1.0),
            y: Some(2.0),
            z: Some(f64::NAN),
            name: None,
            format: None,
            drill: DrillState::default(),
        });
        assert_eq!(
            serde_json::to_value(&point).unwrap(),
            json!({"x": 1.0, "y": 2.0, "z": null})
        );
    }

    #[test]
    fn test_treemap_nodes() {
        let root = TreemapNode::root(0, "East", "#,##0", "rgb(1,2,3)".to_string());
        let leaf = TreemapNode::leaf(0, "A", Some(5.0), (0, 1), "#,##0", "rgb(1,2,3)".to_string());
        assert!(DataPoint::TreemapNode(root.clone()).is_treemap_root());
        assert!(!DataPoint::TreemapNode(leaf.clone()).is_treemap_root());
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["id"], json!("0"));
        assert_eq!(json["showInLegend"], json!(true));
        let json = serde_json::to_value(&leaf).unwrap();
        assert_eq!(json["parent"], json!("0"));
        assert_eq!(json["value"], json!(5.0));
    }

    #[test]
    fn test_null_coordinate() {
        let point = DataPoint::Xy(XyPoint {
            x: None,
            y: Some(2.0),
            z: None,
            name: Some(String::new()),
            format: None,
            drill: DrillState::default(),
        });
        assert!(point.has_null_coordinate());
        assert!(!DataPoint::Category(category(None)).has_null_coordinate());
    }
}
