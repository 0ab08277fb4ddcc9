//! Zero alignment of dual y axes
//!
//! Both axes get a min/max such that their zero lines sit at the same height. User min/max
//! values are respected; an axis whose range is empty is hidden together with its series.

use super::chart_type::ChartType;
use super::options::ChartOptions;
use super::series::SeriesItem;
use super::stacking::StackingMode;
use serde_json::{json, Value};

/// Extremes of one y axis, either user supplied or computed from the data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub is_set_min: bool,
    pub is_set_max: bool,
}

impl AxisRange {
    fn is_user_set(&self) -> bool {
        self.is_set_min || self.is_set_max
    }
}

/// Sign of an extreme: -1, 0 or 1; NaN counts as negative
fn sign(value: f64) -> i8 {
    if value == 0.0 {
        0
    } else if value > 0.0 {
        1
    } else {
        -1
    }
}

fn is_line_type(series_type: Option<&str>) -> bool {
    series_type == Some("line")
}

/// Line axes keep their data range, other axes always include zero
fn is_line_on_axis(chart_type: ChartType, series: &[&SeriesItem]) -> bool {
    match chart_type {
        ChartType::Line => true,
        ChartType::Combo => series.iter().all(|s| is_line_type(s.series_type.as_deref())),
        _ => false,
    }
}

fn series_on_axis(series: &[SeriesItem], axis: usize) -> Vec<&SeriesItem> {
    series.iter().filter(|s| s.y_axis == axis).collect()
}

/// Values at the same point index across series
pub(crate) fn stacked_columns(series: &[&SeriesItem]) -> Vec<Vec<Option<f64>>> {
    let width = series.iter().map(|s| s.data.len()).max().unwrap_or(0);
    (0..width)
        .map(|index| {
            series
                .iter()
                .map(|s| s.data.get(index).and_then(|p| p.value()))
                .collect()
        })
        .collect()
}

/// Shares of the column total in percent; missing and zero values are dropped
fn columns_to_percent(columns: Vec<Vec<Option<f64>>>) -> Vec<Vec<Option<f64>>> {
    columns
        .into_iter()
        .map(|column| {
            let present: Vec<f64> = column.into_iter().flatten().filter(|v| *v != 0.0).collect();
            let total: f64 = present.iter().map(|v| v.abs()).sum();
            present.into_iter().map(|v| Some(v / total * 100.0)).collect()
        })
        .collect()
}

/// Negative values stack downwards, positive values upwards
fn stacked_min_max(columns: &[Vec<Option<f64>>]) -> (f64, f64) {
    if columns.is_empty() {
        return (0.0, 0.0);
    }
    columns
        .iter()
        .map(|column| {
            column.iter().flatten().fold((0.0, 0.0), |(min, max), v| {
                if *v < 0.0 {
                    (min + v, max)
                } else {
                    (min, max + v)
                }
            })
        })
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), (cmin, cmax)| {
            (min.min(cmin), max.max(cmax))
        })
}

fn plain_min_max(series: &[&SeriesItem], line: bool) -> (f64, f64) {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.data.iter().filter_map(|p| p.value()))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        });
    if line {
        (min, max)
    } else {
        (min.min(0.0), max.max(0.0))
    }
}

/// Data extremes of every y axis, overridden by user min/max from the accumulated config
pub fn axis_ranges(options: &ChartOptions, config: &Value) -> Vec<AxisRange> {
    let series = &options.data.series;
    options
        .y_axes
        .iter()
        .enumerate()
        .map(|(index, axis)| {
            let on_axis = series_on_axis(series, index);
            let line = is_line_on_axis(options.chart_type, &on_axis);
            let (data_min, data_max) = match options.stacking {
                Some(stacking) if !line => {
                    let columns = stacked_columns(&on_axis);
                    if stacking == StackingMode::Percent && !axis.opposite {
                        stacked_min_max(&columns_to_percent(columns))
                    } else {
                        stacked_min_max(&columns)
                    }
                }
                _ => plain_min_max(&on_axis, line),
            };
            let user_min = config["yAxis"][index]["min"].as_f64();
            let user_max = config["yAxis"][index]["max"].as_f64();
            AxisRange {
                min: user_min.unwrap_or(data_min),
                max: user_max.unwrap_or(data_max),
                is_set_min: user_min.is_some(),
                is_set_max: user_max.is_some(),
            }
        })
        .collect()
}

fn calculate_min(ranges: &[AxisRange; 2], index: usize, axis: usize) -> f64 {
    let source = ranges[index];
    let fraction = if source.max == 0.0 || source.max.is_nan() {
        source.min
    } else {
        source.min / source.max
    };
    fraction * ranges[axis].max
}

fn calculate_max(ranges: &[AxisRange; 2], index: usize, axis: usize) -> f64 {
    let source = ranges[index];
    let fraction = if source.min == 0.0 || source.min.is_nan() {
        source.max
    } else {
        source.max / source.min
    };
    fraction * ranges[axis].min
}

/// Aligned min/max of one axis
///
/// `min` and `max` are the axis extremes clamped the way the axis draws them.
pub fn aligned_min_max(axis: usize, min: f64, max: f64, ranges: &[AxisRange; 2]) -> (f64, f64) {
    let own = ranges[axis];
    let user_set = ranges.iter().any(AxisRange::is_user_set);
    let canon: Vec<(i8, i8)> = ranges.iter().map(|r| (sign(r.min), sign(r.max))).collect();
    let (mut new_min, mut new_max) = (own.min, own.max);

    if canon.iter().all(|(min, max)| *min <= 0 && *max <= 0) {
        new_max = max.min(0.0);
    } else if canon.iter().all(|(min, max)| *min >= 0 && *max >= 0) {
        new_min = min.max(0.0);
    } else if canon[0].1 == canon[1].1 {
        new_min = if user_set {
            let index = if ranges[0].min <= ranges[1].min { 0 } else { 1 };
            calculate_min(ranges, index, axis)
        } else {
            calculate_min(ranges, 0, axis).min(calculate_min(ranges, 1, axis))
        };
    } else if canon[0].0 == canon[1].0 {
        new_max = if user_set {
            let index = if ranges[0].max > ranges[1].max { 0 } else { 1 };
            calculate_max(ranges, index, axis)
        } else {
            calculate_max(ranges, 0, axis).max(calculate_max(ranges, 1, axis))
        };
    } else if own.min < 0.0 {
        new_max = new_min.abs();
    } else {
        new_min = -new_max;
    }

    (
        if own.is_set_min { own.min } else { new_min },
        if own.is_set_max { own.max } else { new_max },
    )
}

/// Hide axes whose range is empty, and the series drawn against them
fn hide_invalid_axes(options: &ChartOptions, ranges: &[AxisRange]) -> Value {
    let series = &options.data.series;
    let hidden: Vec<bool> = ranges
        .iter()
        .enumerate()
        .map(|(index, range)| {
            if is_line_on_axis(options.chart_type, &series_on_axis(series, index)) {
                range.min > range.max
            } else {
                range.min >= range.max
            }
        })
        .collect();

    let y_axis: Vec<Value> = hidden
        .iter()
        .map(|hide| if *hide { json!({"visible": false}) } else { json!({}) })
        .collect();
    let series: Vec<Value> = series
        .iter()
        .map(|s| {
            if hidden.get(s.y_axis).copied().unwrap_or(false) {
                json!({"visible": false})
            } else {
                json!({})
            }
        })
        .collect();
    json!({"yAxis": y_axis, "series": series})
}

/// Zero-alignment fragment for a dual-axis chart; empty for other charts
pub fn zero_align_configuration(options: &ChartOptions, config: &Value) -> Value {
    if options.y_axes.len() != 2 {
        return json!({});
    }
    let ranges = axis_ranges(options, config);

    if ranges.iter().any(|r| r.min >= r.max) {
        log::debug!("Dual axis chart with an empty axis range: {:?}", ranges);
        return hide_invalid_axes(options, &ranges);
    }

    if ranges.iter().all(|r| r.is_set_min && r.is_set_max) {
        return json!({"yAxis": [{"isUserMinMax": true}, {"isUserMinMax": true}]});
    }

    let pair = [ranges[0], ranges[1]];
    let y_axis: Vec<Value> = (0..2)
        .map(|axis| {
            let line = is_line_on_axis(
                options.chart_type,
                &series_on_axis(&options.data.series, axis),
            );
            let clamp = |v: f64| if line { v } else { v.min(0.0) };
            let (min, max) = aligned_min_max(axis, clamp(pair[axis].min), clamp(pair[axis].max), &pair);
            json!({
                "isUserMinMax": pair[axis].is_user_set(),
                "min": min,
                "max": max,
            })
        })
        .collect();
    json!({"yAxis": y_axis})
}

#[cfg(test)]
mod tests {
    use super::super::axes::AxisDescriptor;
    use super::super::options::{ChartData, ChartOptions};
    use super::super::points::{CategoryPoint, DataPoint, DrillState, MeasureValue};
    use super::*;

    fn point(y: Option<f64>) -> DataPoint {
        DataPoint::Category(CategoryPoint {
            measure: MeasureValue::Y(y),
            name: String::new(),
            format: String::new(),
            color: None,
            legend_index: None,
            marker: None,
            drill: DrillState::default(),
        })
    }

    fn series(y_axis: usize, values: &[f64]) -> SeriesItem {
        let mut item = SeriesItem::new("s", y_axis, values.iter().map(|v| point(Some(*v))).collect());
        item.y_axis = y_axis;
        item
    }

    fn dual(chart_type: ChartType, series: Vec<SeriesItem>) -> ChartOptions {
        ChartOptions {
            y_axes: vec![
                AxisDescriptor::default(),
                AxisDescriptor {
                    opposite: true,
                    ..AxisDescriptor::default()
                },
            ],
            data: ChartData {
                series,
                ..ChartData::default()
            },
            ..ChartOptions::empty(chart_type)
        }
    }

    fn range(min: f64, max: f64) -> AxisRange {
        AxisRange {
            min,
            max,
            is_set_min: false,
            is_set_max: false,
        }
    }

    #[test]
    fn test_single_axis_is_untouched() {
        let options = ChartOptions {
            y_axes: vec![AxisDescriptor::default()],
            ..ChartOptions::empty(ChartType::Column)
        };
        assert_eq!(zero_align_configuration(&options, &json!({})), json!({}));
    }

    #[test]
    fn test_positive_axes_start_at_zero() {
        let options = dual(ChartType::Column, vec![series(0, &[10.0, 20.0]), series(1, &[1.0, 5.0])]);
        let out = zero_align_configuration(&options, &json!({}));
        assert_eq!(out["yAxis"][0]["min"], json!(0.0));
        assert_eq!(out["yAxis"][0]["max"], json!(20.0));
        assert_eq!(out["yAxis"][1]["min"], json!(0.0));
        assert_eq!(out["yAxis"][1]["max"], json!(5.0));
        assert_eq!(out["yAxis"][0]["isUserMinMax"], json!(false));
    }

    #[test]
    fn test_mixed_signs_align_zero() {
        let ranges = [range(-10.0, 20.0), range(0.0, 50.0)];
        // both maxima positive: min follows the axis with the deeper relative minimum
        assert_eq!(aligned_min_max(1, 0.0, 0.0, &ranges).0, -25.0);
        assert_eq!(aligned_min_max(0, -10.0, 0.0, &ranges).0, -10.0);

        let ranges = [range(-10.0, 0.0), range(-20.0, 40.0)];
        let (min, max) = aligned_min_max(0, -10.0, 0.0, &ranges);
        assert_eq!((min, max), (-10.0, 20.0));
    }

    #[test]
    fn test_opposite_signs_center_zero() {
        let ranges = [range(-10.0, 0.0), range(0.0, 10.0)];
        assert_eq!(aligned_min_max(0, -10.0, 0.0, &ranges), (-10.0, 10.0));
        assert_eq!(aligned_min_max(1, 0.0, 0.0, &ranges), (-10.0, 10.0));
    }

    #[test]
    fn test_negative_axes_end_at_zero() {
        let ranges = [range(-10.0, -2.0), range(-5.0, 0.0)];
        assert_eq!(aligned_min_max(0, -10.0, -2.0, &ranges), (-10.0, -2.0_f64.min(0.0)));
        assert_eq!(aligned_min_max(1, -5.0, 0.0, &ranges), (-5.0, 0.0));
    }

    #[test]
    fn test_user_min_max_is_kept() {
        let options = dual(ChartType::Column, vec![series(0, &[10.0]), series(1, &[-5.0, 5.0])]);
        let config = json!({"yAxis": [{"min": 2.0, "max": 8.0}, {"min": -1.0, "max": 1.0}]});
        assert_eq!(
            zero_align_configuration(&options, &config),
            json!({"yAxis": [{"isUserMinMax": true}, {"isUserMinMax": true}]})
        );

        let config = json!({"yAxis": [{"max": 30.0}]});
        let out = zero_align_configuration(&options, &config);
        assert_eq!(out["yAxis"][0]["max"], json!(30.0));
        assert_eq!(out["yAxis"][0]["isUserMinMax"], json!(true));
    }

    #[test]
    fn test_invalid_axis_is_hidden_with_its_series() {
        let options = dual(ChartType::Column, vec![series(0, &[10.0]), series(1, &[5.0])]);
        let config = json!({"yAxis": [{}, {"min": 10.0, "max": 1.0}]});
        assert_eq!(
            zero_align_configuration(&options, &config),
            json!({
                "yAxis": [{}, {"visible": false}],
                "series": [{}, {"visible": false}]
            })
        );
    }

    #[test]
    fn test_percent_stacking_uses_shares() {
        let mut options = dual(
            ChartType::Column,
            vec![series(0, &[30.0, -10.0]), series(0, &[70.0, 30.0]), series(1, &[4.0])],
        );
        options.stacking = Some(StackingMode::Percent);
        let ranges = axis_ranges(&options, &json!({}));
        assert_eq!(ranges[0].min, -25.0);
        assert_eq!(ranges[0].max, 100.0);
        assert_eq!((ranges[1].min, ranges[1].max), (0.0, 4.0));
    }

    #[test]
    fn test_line_axis_keeps_data_range() {
        let mut line = series(1, &[5.0, 9.0]);
        line.series_type = Some("line".to_string());
        let mut column = series(0, &[10.0]);
        column.series_type = Some("column".to_string());
        let options = dual(ChartType::Combo, vec![column, line]);
        let ranges = axis_ranges(&options, &json!({}));
        assert_eq!((ranges[1].min, ranges[1].max), (5.0, 9.0));
        assert_eq!((ranges[0].min, ranges[0].max), (0.0, 10.0));
    }
}
