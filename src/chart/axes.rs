//! Axis descriptors
//!
//! The x axis is always a single entry. Y axes are split in two when the chart supports dual
//! axes and the user moved some measures to the secondary axis; an axis without measures is
//! not emitted.

use super::chart_type::ChartType;
use super::colors::ColorStrategy;
use super::result_view::{buckets, AttributeHeader, MeasureDescriptor, ResultView};
use super::series::SeriesItem;
use crate::config::{AxisConfig, ChartConfig};
use serde::Serialize;

/// Number of heatmap color classes
pub const HEATMAP_DATA_CLASSES: usize = 7;

/// Significant digits kept on heatmap class bounds
const HIGHCHARTS_PRECISION: usize = 15;

/// Color index used when every heatmap value is the same
const DEFAULT_HEATMAP_COLOR_INDEX: usize = 1;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisDescriptor {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub opposite: bool,
    /// Series rendered against this axis
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub series_indices: Vec<usize>,
}

impl AxisDescriptor {
    fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn is_percent(&self) -> bool {
        self.format.as_deref().map(|f| f.contains('%')).unwrap_or(false)
    }
}

/// Label and format of a measure, with the user override applied to the first one
#[derive(Debug, Clone, PartialEq)]
struct MeasureAxisItem {
    label: String,
    format: String,
}

fn measure_axis_items(
    measures: &[MeasureDescriptor],
    label: Option<&str>,
    format: Option<&str>,
) -> Vec<MeasureAxisItem> {
    measures
        .iter()
        .enumerate()
        .map(|(index, measure)| {
            let (label, format) = if index == 0 {
                (
                    label.filter(|l| !l.is_empty()).unwrap_or(&measure.name),
                    format.filter(|f| !f.is_empty()).unwrap_or(&measure.format),
                )
            } else {
                (measure.name.as_str(), measure.format.as_str())
            };
            MeasureAxisItem {
                label: label.to_string(),
                format: format.to_string(),
            }
        })
        .collect()
}

fn measure_axis(item: Option<&MeasureAxisItem>) -> AxisDescriptor {
    match item {
        Some(item) => AxisDescriptor {
            label: item.label.clone(),
            format: Some(item.format.clone()),
            ..AxisDescriptor::default()
        },
        None => AxisDescriptor::labelled(""),
    }
}

/// First percentage format among the measures of an axis
fn percent_format<'a>(formats: impl IntoIterator<Item = &'a str>) -> Option<String> {
    formats
        .into_iter()
        .find(|f| f.contains('%'))
        .map(str::to_string)
}

/// X axis descriptors
pub fn build_x_axes(
    result: &ResultView,
    config: &ChartConfig,
    chart_type: ChartType,
    measures: &[MeasureDescriptor],
    view_by: Option<&AttributeHeader>,
) -> Vec<AxisDescriptor> {
    if chart_type.is_scatter_or_bubble() {
        if result.is_bucket_empty(buckets::MEASURES) {
            return vec![AxisDescriptor::labelled("")];
        }
        let items = measure_axis_items(measures, config.x_label.as_deref(), config.x_format.as_deref());
        return vec![measure_axis(items.first())];
    }

    let label = config
        .x_label
        .clone()
        .filter(|l| !l.is_empty())
        .or_else(|| view_by.map(|v| v.form_name.clone()))
        .unwrap_or_default();
    vec![AxisDescriptor::labelled(label)]
}

/// Local ids of the measures the user moved to the secondary axis
fn secondary_axis_measures(config: &ChartConfig, chart_type: ChartType) -> &[String] {
    let axis = if chart_type == ChartType::Bar {
        config.secondary_xaxis.as_ref()
    } else {
        config.secondary_yaxis.as_ref()
    };
    axis.map(|a| a.measures.as_slice()).unwrap_or_default()
}

/// Y axis descriptors
pub fn build_y_axes(
    result: &ResultView,
    config: &ChartConfig,
    chart_type: ChartType,
    measures: &[MeasureDescriptor],
    stack_by: Option<&AttributeHeader>,
) -> Vec<AxisDescriptor> {
    let items = measure_axis_items(measures, config.y_label.as_deref(), config.y_format.as_deref());
    let secondary = secondary_axis_measures(config, chart_type);

    let axes = if chart_type.is_scatter_or_bubble() {
        if result.is_bucket_empty(buckets::SECONDARY_MEASURES) {
            vec![AxisDescriptor::labelled("")]
        } else if result.is_bucket_empty(buckets::MEASURES) {
            vec![measure_axis(items.first())]
        } else {
            vec![measure_axis(items.get(1))]
        }
    } else if chart_type == ChartType::Heatmap {
        vec![AxisDescriptor::labelled(
            stack_by.map(|s| s.form_name.clone()).unwrap_or_default(),
        )]
    } else if chart_type.capabilities().dual_axes && !items.is_empty() && !secondary.is_empty() {
        dual_axes(measures, secondary)
    } else {
        let mut axis = measure_axis(items.first());
        if items.len() > 1 {
            axis.label = String::new();
        }
        if let Some(format) = percent_format(items.iter().map(|i| i.format.as_str())) {
            axis.format = Some(format);
        }
        axis.series_indices = (0..items.len()).collect();
        vec![axis]
    };

    log::debug!("{} y axes for {}", axes.len(), chart_type);
    axes
}

/// Partition measures into primary and secondary axes, keeping their order
fn dual_axes(measures: &[MeasureDescriptor], secondary: &[String]) -> Vec<AxisDescriptor> {
    let (second, first): (Vec<_>, Vec<_>) = measures
        .iter()
        .enumerate()
        .partition(|(_, m)| secondary.contains(&m.local_id));

    [(first, false), (second, true)]
        .into_iter()
        .filter(|(members, _)| !members.is_empty())
        .map(|(members, opposite)| {
            let label = match members.as_slice() {
                [(_, only)] => only.name.clone(),
                _ => String::new(),
            };
            let format = percent_format(members.iter().map(|(_, m)| m.format.as_str()))
                .or_else(|| members.first().map(|(_, m)| m.format.clone()));
            AxisDescriptor {
                label,
                format,
                opposite,
                series_indices: members.iter().map(|(index, _)| *index).collect(),
            }
        })
        .collect()
}

/// Point each series at the axis listing it, defaulting to the primary axis
pub fn assign_y_axes(series: Vec<SeriesItem>, y_axes: &[AxisDescriptor]) -> Vec<SeriesItem> {
    series
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| {
            item.y_axis = y_axes
                .iter()
                .position(|axis| axis.series_indices.contains(&index))
                .unwrap_or(0);
            item
        })
        .collect()
}

/// True when both y axes exist
pub fn is_dual_axis(y_axes: &[AxisDescriptor]) -> bool {
    y_axes.len() > 1
}

/// One heatmap color class
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataClass {
    pub from: f64,
    pub to: f64,
    pub color: String,
}

/// Round to the renderer's precision
fn to_precision(value: f64) -> f64 {
    format!("{:.*e}", HIGHCHARTS_PRECISION - 1, value)
        .parse()
        .unwrap_or(value)
}

/// Equal-width color classes between the smallest and largest heatmap value
pub fn heatmap_data_classes(series: &[SeriesItem], colors: &dyn ColorStrategy) -> Vec<DataClass> {
    let values: Vec<f64> = series
        .first()
        .map(|s| s.data.iter().filter_map(|p| p.value()).filter(|v| !v.is_nan()).collect())
        .unwrap_or_default();
    if values.is_empty() {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![DataClass {
            from: min,
            to: max,
            color: colors.color_by_index(DEFAULT_HEATMAP_COLOR_INDEX),
        }];
    }

    let safe_min = to_precision(min);
    let safe_max = to_precision(max);
    let step = (safe_max - safe_min) / HEATMAP_DATA_CLASSES as f64;
    let mut from = safe_min;
    (0..HEATMAP_DATA_CLASSES)
        .map(|index| {
            let to = if index == HEATMAP_DATA_CLASSES - 1 {
                safe_max
            } else {
                from + step
            };
            let class = DataClass {
                from,
                to,
                color: colors.color_by_index(index),
            };
            from += step;
            class
        })
        .collect()
}

/// User axis options as seen from the rendered axes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisProps {
    pub x_axis_props: AxisConfig,
    pub y_axis_props: AxisConfig,
    #[serde(rename = "secondary_xAxisProps", skip_serializing_if = "Option::is_none")]
    pub secondary_x_axis_props: Option<AxisConfig>,
    #[serde(rename = "secondary_yAxisProps", skip_serializing_if = "Option::is_none")]
    pub secondary_y_axis_props: Option<AxisConfig>,
}

/// Bar charts are rotated, so their x options drive the vertical axis and vice versa
pub fn axis_props(config: &ChartConfig, chart_type: ChartType) -> AxisProps {
    let (x, y, secondary_x, secondary_y) = if chart_type == ChartType::Bar {
        (&config.yaxis, &config.xaxis, &config.secondary_yaxis, &config.secondary_xaxis)
    } else {
        (&config.xaxis, &config.yaxis, &config.secondary_xaxis, &config.secondary_yaxis)
    };
    let non_empty = |axis: &Option<AxisConfig>| axis.clone().filter(|a| !a.is_empty());
    AxisProps {
        x_axis_props: x.clone().unwrap_or_default(),
        y_axis_props: y.clone().unwrap_or_default(),
        secondary_x_axis_props: non_empty(secondary_x),
        secondary_y_axis_props: non_empty(secondary_y),
    }
}
