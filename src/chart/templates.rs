//! Renderer defaults laid under the customized configuration
//!
//! The common template applies to every chart; the type template adds the per-type
//! `plotOptions` and axis defaults. Both are merged before the configurator output, so any
//! configurator fragment overrides them.

use super::chart_type::ChartType;
use super::colors::effective_palette;
use crate::config::ChartConfig;
use serde_json::{json, Value};

const DEFAULT_MARKER_RADIUS: f64 = 4.5;

/// Series type the renderer draws a chart type with
pub fn renderer_type(chart_type: ChartType, config: &ChartConfig) -> String {
    match chart_type {
        ChartType::Donut => "pie".to_string(),
        ChartType::Bullet => "bar".to_string(),
        ChartType::Combo => config.primary_chart_type(),
        other => other.as_str().to_string(),
    }
}

pub fn common_template(chart_type: ChartType, config: &ChartConfig) -> Value {
    let colors: Vec<String> = effective_palette(config)
        .iter()
        .map(|item| item.fill.to_css())
        .collect();
    json!({
        "credits": {"enabled": false},
        "title": {"text": ""},
        "legend": {"enabled": false},
        "colors": colors,
        "chart": {"type": renderer_type(chart_type, config)},
        "drilldown": {
            "activeDataLabelStyle": {"color": "#000000", "textDecoration": "none"},
            "activeAxisLabelStyle": {"color": "#000000", "textDecoration": "none"},
        },
        "plotOptions": {"series": {"animation": false}},
    })
}

fn circle_marker() -> Value {
    json!({"symbol": "circle", "radius": DEFAULT_MARKER_RADIUS})
}

fn column_like() -> Value {
    json!({
        "dataLabels": {"enabled": false},
        "borderWidth": 0,
        "groupPadding": 0.2,
        "pointPadding": 0.05,
    })
}

fn pie_like(inner_size: Option<&str>) -> Value {
    let mut pie = json!({
        "size": "100%",
        "allowPointSelect": false,
        "showInLegend": true,
        "dataLabels": {"enabled": false},
        "borderWidth": 0,
    });
    if let Some(inner_size) = inner_size {
        pie["innerSize"] = inner_size.into();
    }
    pie
}

/// Per-type defaults
pub fn type_template(chart_type: ChartType) -> Value {
    match chart_type {
        ChartType::Line => json!({"plotOptions": {"line": {
            "marker": circle_marker(),
            "lineWidth": 2,
            "states": {"hover": {"lineWidth": 3}},
        }}}),
        ChartType::Area => json!({"plotOptions": {"area": {
            "marker": circle_marker(),
            "lineWidth": 2,
            "fillOpacity": 0.6,
        }}}),
        ChartType::Column => json!({"plotOptions": {"column": column_like()}}),
        ChartType::Bar => json!({
            "plotOptions": {"bar": column_like()},
            "yAxis": [{"stackLabels": {"enabled": false}}],
        }),
        ChartType::Pie => json!({"plotOptions": {"pie": pie_like(None)}}),
        ChartType::Donut => json!({"plotOptions": {"pie": pie_like(Some("50%"))}}),
        ChartType::Funnel => json!({"plotOptions": {"funnel": {
            "neckWidth": "0%",
            "neckHeight": "0%",
            "width": "100%",
            "showInLegend": true,
        }}}),
        ChartType::Scatter => json!({"plotOptions": {"scatter": {
            "marker": {"symbol": "circle", "radius": 5},
        }}}),
        ChartType::Bubble => json!({"plotOptions": {"bubble": {
            "minSize": "10%",
            "maxSize": "40%",
        }}}),
        ChartType::Heatmap => json!({
            "plotOptions": {"heatmap": {"borderWidth": 0, "nullColor": "rgba(0,0,0,0)"}},
            "colorAxis": {"dataClassColor": "category"},
        }),
        ChartType::Treemap => json!({"plotOptions": {"treemap": {
            "layoutAlgorithm": "squarified",
            "levelIsConstant": false,
            "showInLegend": true,
        }}}),
        ChartType::Combo => json!({"plotOptions": {
            "column": column_like(),
            "line": {"marker": circle_marker(), "lineWidth": 2},
            "area": {"marker": circle_marker(), "lineWidth": 2, "fillOpacity": 0.6},
        }}),
        ChartType::Bullet => json!({"plotOptions": {
            "bar": {"grouping": false, "borderWidth": 0},
            "bullet": {"targetOptions": {"width": "100%"}},
        }}),
    }
}
