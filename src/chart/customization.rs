//! Renderer configuration derived from chart options
//!
//! A fixed list of configurators, each producing a fragment from the chart options, the user
//! config and the configuration accumulated so far. Fragments are deep-merged left to right.
//! Order is part of the contract: data labels read the stacking fragment, optional stacking
//! rescales the axis min/max written by the axes fragment, and zero alignment reads both.

use super::axes::AxisDescriptor;
use super::categories::Categories;
use super::chart_type::ChartType;
use super::colors::lighter_color;
use super::error::{ChartError, Result};
use super::format::{escape_angle_brackets, LabelFormatter};
use super::merge::deep_merge;
use super::options::ChartOptions;
use super::series::SeriesItem;
use super::stacking::{can_combo_stack_in_percent, StackingMode};
use super::zero_align::{stacked_columns, zero_align_configuration};
use crate::config::{AxisConfig, ChartConfig, DataLabelsVisibility};
use serde_json::{json, Map, Value};

/// Brightness added to a hovered drillable element
pub const HOVER_BRIGHTNESS: f64 = 0.1;
/// Smallest brightness change the renderer still treats as a hover state
pub const MINIMUM_HC_SAFE_BRIGHTNESS: f64 = -0.01;

const GRID_COLOR: &str = "#ebebeb";
const HEATMAP_HOVER_FALLBACK: &str = "rgb(210,210,210)";
const HEATMAP_DATA_LABELS_LIMIT: usize = 150;
const DRILLING_DISABLED_CLASS: &str = "gd-axis-label-drilling-disabled";
/// Vertical label offsets of the bottom and top axis of a dual-axis bar chart
const DUAL_BAR_LABEL_OFFSETS: [i32; 2] = [16, -5];

const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991.0;
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Inputs shared by every configurator
#[derive(Debug, Clone, Copy)]
pub struct Customization<'a> {
    pub options: &'a ChartOptions,
    pub config: &'a ChartConfig,
    /// Opaque drill settings of the host, passed through to the first x axis
    pub drill_config: Option<&'a Value>,
}

/// One pipeline step: chart inputs and the accumulated configuration to a fragment
pub type Configurator = fn(&Customization<'_>, &Value) -> Result<Value>;

/// Configurators in merge order
pub const CONFIGURATORS: [(&str, Configurator); 15] = [
    ("axes", axes_configuration),
    ("title", title_configuration),
    ("stacking", stacking_configuration),
    ("hideOverlappedLabels", hide_overlapped_labels),
    ("showInPercent", show_in_percent_configuration),
    ("data", data_configuration),
    ("tooltip", tooltip_configuration),
    ("hoverStyles", hover_styles),
    ("grid", grid_configuration),
    ("labels", labels_configuration),
    ("optionalStacking", optional_stacking_configuration),
    ("zeroAlign", zero_align_fragment),
    ("axisName", axis_name_configuration),
    ("chartAlignment", chart_alignment_configuration),
    ("dualBarAxisLabels", dual_bar_axis_labels),
];

/// Run every configurator in order and merge the fragments
pub fn customized_configuration(
    options: &ChartOptions,
    config: &ChartConfig,
    drill_config: Option<&Value>,
) -> Result<Value> {
    let ctx = Customization {
        options,
        config,
        drill_config,
    };
    CONFIGURATORS
        .iter()
        .try_fold(Value::Object(Map::new()), |mut acc, (name, configurator)| {
            let fragment = configurator(&ctx, &acc)?;
            log::trace!("{} configurator: {}", name, fragment);
            deep_merge(&mut acc, fragment);
            Ok(acc)
        })
}

fn insert(map: &mut Map<String, Value>, key: &str, value: impl Into<Value>) {
    map.insert(key.to_string(), value.into());
}

fn empty() -> Value {
    Value::Object(Map::new())
}

fn y_axis_props(options: &ChartOptions, opposite: bool) -> AxisConfig {
    if opposite {
        options.axis_props.secondary_y_axis_props.clone().unwrap_or_default()
    } else {
        options.axis_props.y_axis_props.clone()
    }
}

fn x_axis_props(options: &ChartOptions, opposite: bool) -> AxisConfig {
    if opposite {
        options.axis_props.secondary_x_axis_props.clone().unwrap_or_default()
    } else {
        options.axis_props.x_axis_props.clone()
    }
}

/// Whether the categories plotted along axis `index` (0 = x, 1 = y) have any label
fn has_categories(categories: &Categories, index: usize) -> bool {
    match categories {
        Categories::Flat(names) => names.iter().any(|n| !n.is_empty()),
        Categories::Grid(axes) => axes.get(index).map(|c| !c.is_empty()).unwrap_or(false),
        Categories::Grouped(groups) => !groups.is_empty(),
    }
}

fn labels_enabled(options: &ChartOptions, props: &AxisConfig, check_categories: Option<usize>) -> bool {
    let categories = check_categories
        .map(|index| has_categories(options.categories(), index))
        .unwrap_or(true);
    categories && props.is_visible() && props.labels_enabled()
}

fn line_width(chart_type: ChartType, visible: bool) -> Option<u32> {
    if !visible {
        Some(0)
    } else if chart_type.is_scatter_or_bubble() {
        Some(1)
    } else {
        None
    }
}

fn non_zero_values(series: &SeriesItem) -> impl Iterator<Item = f64> + '_ {
    series
        .data
        .iter()
        .filter_map(|p| p.value())
        .filter(|v| *v != 0.0)
}

fn non_stacked_max(series: &[SeriesItem]) -> f64 {
    series
        .iter()
        .map(|s| non_zero_values(s).fold(MIN_SAFE_INTEGER, f64::max))
        .fold(MIN_SAFE_INTEGER, f64::max)
}

fn non_stacked_min(series: &[SeriesItem]) -> f64 {
    series
        .iter()
        .map(|s| non_zero_values(s).fold(MAX_SAFE_INTEGER, f64::min))
        .fold(MAX_SAFE_INTEGER, f64::min)
}

/// Positive values stack up until a negative one shows up in the column
fn stacked_max(series: &[SeriesItem]) -> f64 {
    let refs: Vec<&SeriesItem> = series.iter().collect();
    stacked_columns(&refs)
        .iter()
        .map(|column| {
            column.iter().flatten().fold(MIN_SAFE_INTEGER, |acc, &v| {
                if v < 0.0 || acc < 0.0 {
                    acc.max(v)
                } else {
                    acc + v
                }
            })
        })
        .reduce(f64::max)
        .unwrap_or(MIN_SAFE_INTEGER)
}

fn stacked_min(series: &[SeriesItem]) -> f64 {
    let refs: Vec<&SeriesItem> = series.iter().collect();
    stacked_columns(&refs)
        .iter()
        .map(|column| {
            column.iter().flatten().fold(MAX_SAFE_INTEGER, |acc, &v| {
                if v > 0.0 || acc > 0.0 {
                    acc.min(v)
                } else {
                    acc + v
                }
            })
        })
        .reduce(f64::min)
        .unwrap_or(MAX_SAFE_INTEGER)
}

/// (min, max) of the plotted data, summed per category when stacked by an attribute
fn data_extremes(options: &ChartOptions) -> (f64, f64) {
    let series = &options.data.series;
    if options.has_stack_by_attribute {
        (stacked_min(series), stacked_max(series))
    } else {
        (non_stacked_min(series), non_stacked_max(series))
    }
}

fn should_start_on_tick(options: &ChartOptions, props: &AxisConfig) -> bool {
    match (props.min, props.max) {
        (None, None) => true,
        (Some(min), Some(max)) => min > max,
        (None, Some(max)) => max <= data_extremes(options).0,
        (Some(_), None) => false,
    }
}

fn should_end_on_tick(options: &ChartOptions, props: &AxisConfig) -> bool {
    match (props.min, props.max) {
        (None, None) => true,
        (Some(min), Some(max)) => min > max,
        (Some(min), None) => min >= data_extremes(options).1,
        (None, Some(_)) => false,
    }
}

fn should_y_start_on_tick_on_bubble_scatter(options: &ChartOptions) -> bool {
    match options.axis_props.y_axis_props.min {
        None => true,
        Some(min) => min > non_stacked_max(&options.data.series),
    }
}

/// User min/max cutting off part of the data
fn is_min_max_limiting_data(options: &ChartOptions, props: Option<&AxisConfig>) -> bool {
    let Some(props) = props else {
        return false;
    };
    if props.min.is_none() && props.max.is_none() {
        return false;
    }
    let (min, max) = data_extremes(options);
    let axis_min = if min >= 0.0 { 0.0 } else { min };
    let axis_max = if max < 0.0 { 0.0 } else { max };
    props.max.map(|m| axis_max > m).unwrap_or(false) || props.min.map(|m| axis_min < m).unwrap_or(false)
}

/// Tooltips follow the pointer when the hovered bar may be cut off by the axis range
fn should_follow_pointer(options: &ChartOptions) -> bool {
    let props = &options.axis_props;
    let secondary = props.secondary_y_axis_props.as_ref();
    if options.y_axes.len() > 1 {
        let any_set = [Some(&props.y_axis_props), secondary]
            .into_iter()
            .flatten()
            .any(|p| p.min.is_some() || p.max.is_some());
        if any_set {
            return true;
        }
    }
    is_min_max_limiting_data(options, Some(&props.y_axis_props))
        || is_min_max_limiting_data(options, secondary)
}

fn axes_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let chart_type = options.chart_type;
    let scatter_like = chart_type.is_scatter_or_bubble();
    let synced_dual_axes = chart_type.capabilities().dual_axes && options.y_axes.len() > 1;

    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .map(|axis| {
            let props = y_axis_props(options, axis.opposite);
            let visible = props.is_visible();
            let mut out = Map::new();
            if let Some(width) = line_width(chart_type, visible) {
                insert(&mut out, "lineWidth", width);
            }

            let mut labels = Map::new();
            let check = (chart_type == ChartType::Heatmap).then_some(1);
            insert(&mut labels, "enabled", labels_enabled(options, &props, check));
            if let Some(rotation) = props.rotation_degrees() {
                insert(&mut labels, "rotation", -rotation);
            }
            insert(&mut out, "labels", labels);
            insert(&mut out, "title", json!({"enabled": visible, "margin": 15}));
            insert(&mut out, "opposite", axis.opposite);

            let side = if axis.opposite { "secondary" } else { "primary" };
            let mut class_name = format!("s-highcharts-{}-yaxis", side);
            if options.force_disable_drill_on_axes {
                class_name.push(' ');
                class_name.push_str(DRILLING_DISABLED_CLASS);
            }
            insert(&mut out, "className", class_name);

            if let Some(max) = props.max {
                insert(&mut out, "max", max);
            }
            if let Some(min) = props.min {
                insert(&mut out, "min", min);
            }
            if scatter_like {
                insert(&mut out, "startOnTick", should_y_start_on_tick_on_bubble_scatter(options));
            } else if !synced_dual_axes {
                insert(&mut out, "startOnTick", should_start_on_tick(options, &props));
                insert(&mut out, "endOnTick", should_end_on_tick(options, &props));
            }
            Value::Object(out)
        })
        .collect();

    let x_axis: Vec<Value> = options
        .x_axes
        .iter()
        .map(|axis| {
            let props = x_axis_props(options, axis.opposite);
            let visible = props.is_visible();
            let mut out = Map::new();
            if let Some(width) = line_width(chart_type, visible) {
                insert(&mut out, "lineWidth", width);
            }
            insert(&mut out, "minorTickLength", 0);
            insert(&mut out, "tickLength", 0);
            insert(&mut out, "maxPadding", 0.05);

            let mut labels = Map::new();
            let check = (!scatter_like).then_some(0);
            insert(&mut labels, "enabled", labels_enabled(options, &props, check));
            insert(&mut labels, "autoRotation", json!([-90]));
            if let Some(rotation) = props.rotation_degrees() {
                insert(&mut labels, "rotation", -rotation);
            }
            insert(
                &mut labels,
                "useHTML",
                chart_type != ChartType::Bar && options.is_view_by_two_attributes,
            );
            insert(&mut out, "labels", labels);
            insert(
                &mut out,
                "title",
                json!({"enabled": visible && !options.is_view_by_two_attributes, "margin": 10}),
            );
            if options.force_disable_drill_on_axes {
                insert(&mut out, "className", DRILLING_DISABLED_CLASS);
            }
            if let Some(max) = props.max {
                insert(&mut out, "max", max);
            }
            if let Some(min) = props.min {
                insert(&mut out, "min", min);
            }
            if scatter_like {
                insert(&mut out, "startOnTick", props.min.is_none());
                insert(&mut out, "endOnTick", false);
            }
            Value::Object(out)
        })
        .collect();

    let x_props = &options.axis_props.x_axis_props;
    let series = if x_props.min.is_some() || x_props.max.is_some() {
        json!({"getExtremesFromAll": true})
    } else {
        empty()
    };

    Ok(json!({
        "plotOptions": {"series": series},
        "yAxis": y_axis,
        "xAxis": x_axis,
    }))
}

fn titles(axes: &[AxisDescriptor]) -> Vec<Value> {
    axes.iter()
        .map(|axis| json!({"title": {"text": escape_angle_brackets(&axis.label)}}))
        .collect()
}

fn title_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    Ok(json!({
        "yAxis": titles(&ctx.options.y_axes),
        "xAxis": titles(&ctx.options.x_axes),
    }))
}

/// Stack totals are shown unless data labels are switched off
fn stack_labels_visible(config: &ChartConfig) -> bool {
    config.data_labels_visible() != Some(DataLabelsVisibility::Hidden)
}

fn stacking_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let Some(stacking) = options.stacking else {
        return Ok(empty());
    };
    let totals = options.chart_type != ChartType::Bar && stack_labels_visible(ctx.config);
    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .map(|_| {
            json!({"stackLabels": {
                "enabled": totals,
                "formatter": Value::from(LabelFormatter::StackLabel),
            }})
        })
        .collect();

    let mut series = Map::new();
    insert(&mut series, "stacking", stacking.as_str());
    if options.chart_type == ChartType::Area {
        insert(&mut series, "connectNulls", true);
    }
    Ok(json!({"plotOptions": {"series": series}, "yAxis": y_axis}))
}

fn hide_overlapped_labels(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let rotation = options.axis_props.x_axis_props.rotation_degrees().unwrap_or(0.0);
    if options.chart_type != ChartType::Bar || !(75.0..=105.0).contains(&rotation) {
        return Ok(empty());
    }
    let formatter = if options.is_view_by_two_attributes {
        LabelFormatter::OverlappingParentCategory
    } else {
        LabelFormatter::OverlappingCategory
    };
    let x_axis: Vec<Value> = options
        .x_axes
        .iter()
        .map(|_| json!({"labels": {"useHTML": true, "formatter": Value::from(formatter)}}))
        .collect();
    Ok(json!({ "xAxis": x_axis }))
}

fn percent_labels(percent: bool) -> Value {
    if percent {
        json!({"labels": {"formatter": Value::from(LabelFormatter::PercentAxis)}})
    } else {
        empty()
    }
}

fn show_in_percent_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let stacked_to_percent = options.stacking == Some(StackingMode::Percent);
    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .map(|axis| percent_labels(axis.is_percent() || (!axis.opposite && stacked_to_percent)))
        .collect();
    let x_axis: Vec<Value> = options
        .x_axes
        .iter()
        .map(|axis| percent_labels(axis.is_percent()))
        .collect();
    Ok(json!({"yAxis": y_axis, "xAxis": x_axis}))
}

/// Series with `<` and `>` escaped in series and point names
fn escaped_series(series: &SeriesItem) -> Result<Value> {
    let mut value = serde_json::to_value(series)?;
    if let Some(name) = value.get("name").and_then(Value::as_str).map(escape_angle_brackets) {
        value["name"] = name.into();
    }
    if let Some(points) = value.get_mut("data").and_then(Value::as_array_mut) {
        for point in points {
            if let Some(name) = point.get("name").and_then(Value::as_str).map(escape_angle_brackets) {
                point["name"] = name.into();
            }
        }
    }
    Ok(value)
}

fn escaped_names(names: &[String]) -> Value {
    names.iter().map(|n| escape_angle_brackets(n)).collect::<Vec<_>>().into()
}

fn escaped_categories(categories: &Categories) -> Value {
    match categories {
        Categories::Flat(names) => escaped_names(names),
        Categories::Grid(axes) => Value::Array(axes.iter().map(|a| escaped_names(a)).collect()),
        Categories::Grouped(groups) => Value::Array(
            groups
                .iter()
                .map(|g| {
                    json!({
                        "name": escape_angle_brackets(&g.name),
                        "categories": escaped_names(&g.categories),
                    })
                })
                .collect(),
        ),
    }
}

fn heatmap_data_configuration(options: &ChartOptions) -> Result<Value> {
    let series = serde_json::to_value(&options.data.series)?;
    let (x, y) = match options.categories() {
        Categories::Grid([x, y]) => (x.clone(), y.clone()),
        _ => (Vec::new(), Vec::new()),
    };
    let data_classes = match &options.color_axis {
        Some(axis) => serde_json::to_value(&axis.data_classes)?,
        None => json!([]),
    };
    Ok(json!({
        "series": series,
        "xAxis": [{"categories": x}],
        "yAxis": [{"categories": y}],
        "colorAxis": {"dataClasses": data_classes},
    }))
}

fn data_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    if options.chart_type == ChartType::Heatmap {
        return heatmap_data_configuration(options);
    }
    let series = options
        .data
        .series
        .iter()
        .map(escaped_series)
        .collect::<Result<Vec<_>>>()?;
    if options.chart_type.is_scatter_or_bubble() {
        return Ok(json!({ "series": series }));
    }
    Ok(json!({
        "series": series,
        "xAxis": [{"categories": escaped_categories(options.categories())}],
    }))
}

fn tooltip_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    if options.tooltip.is_none() {
        return Ok(empty());
    }
    let mut tooltip = json!({
        "borderWidth": 0,
        "borderRadius": 0,
        "shadow": false,
        "useHTML": true,
        "outside": true,
        "formatter": Value::from(LabelFormatter::Tooltip),
    });
    if matches!(
        options.chart_type,
        ChartType::Column | ChartType::Bar | ChartType::Combo | ChartType::Bullet
    ) {
        tooltip["followPointer"] = should_follow_pointer(options).into();
    }
    Ok(json!({ "tooltip": tooltip }))
}

fn line_hover(series: &SeriesItem) -> Value {
    if series.is_drillable {
        let fill = series
            .color
            .as_deref()
            .map(|color| lighter_color(color, HOVER_BRIGHTNESS));
        json!({"marker": {"states": {"hover": {"fillColor": fill}}}})
    } else {
        json!({"states": {"hover": {"halo": {"size": 0}}}})
    }
}

fn bar_hover(series: &SeriesItem) -> Value {
    json!({"states": {"hover": {
        "brightness": HOVER_BRIGHTNESS,
        "enabled": series.is_drillable,
    }}})
}

/// Pie-like charts highlight points; only drillable points brighten
fn point_hover(series: &SeriesItem) -> Value {
    let data: Vec<Value> = series
        .data
        .iter()
        .map(|point| {
            if point.drill().drilldown {
                json!({"states": {"hover": {"brightness": HOVER_BRIGHTNESS}}})
            } else {
                json!({
                    "states": {"hover": {"brightness": MINIMUM_HC_SAFE_BRIGHTNESS}},
                    "halo": {"size": 0},
                })
            }
        })
        .collect();
    json!({ "data": data })
}

/// Second data class color, lightened; the first when there is only one
fn heatmap_hover_color(acc: &Value) -> String {
    let classes = acc["colorAxis"]["dataClasses"].as_array();
    let color = classes
        .and_then(|c| c.get(1).or_else(|| c.first()))
        .and_then(|c| c["color"].as_str())
        .unwrap_or(HEATMAP_HOVER_FALLBACK);
    lighter_color(color, 0.2)
}

fn combo_hover(series: &SeriesItem) -> Result<Value> {
    match series.series_type.as_deref() {
        Some("line") | Some("area") => Ok(line_hover(series)),
        Some("column") => Ok(bar_hover(series)),
        other => Err(ChartError::UnsupportedChartType {
            chart_type: other.unwrap_or_default().to_string(),
            supported: "column, line, area".to_string(),
        }),
    }
}

fn hover_styles(ctx: &Customization<'_>, acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let series = &options.data.series;
    let styles: Vec<Value> = match options.chart_type {
        ChartType::Line | ChartType::Scatter | ChartType::Area | ChartType::Bubble => {
            series.iter().map(line_hover).collect()
        }
        ChartType::Bar | ChartType::Column | ChartType::Bullet => series.iter().map(bar_hover).collect(),
        ChartType::Heatmap => {
            let color = heatmap_hover_color(acc);
            series
                .iter()
                .map(|s| json!({"states": {"hover": {"color": color, "enabled": s.is_drillable}}}))
                .collect()
        }
        ChartType::Combo => series.iter().map(combo_hover).collect::<Result<_>>()?,
        ChartType::Pie | ChartType::Donut | ChartType::Funnel | ChartType::Treemap => {
            series.iter().map(point_hover).collect()
        }
    };

    let mut fragment = json!({ "series": styles });
    let drillable_target = options.chart_type == ChartType::Bullet
        && series
            .iter()
            .any(|s| s.series_type.as_deref() == Some("bullet") && s.is_drillable);
    if drillable_target {
        deep_merge(&mut fragment, json!({"plotOptions": {"bullet": {"cursor": "pointer"}}}));
    }
    Ok(fragment)
}

fn grid_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let grid = if options.grid_enabled {
        json!({"gridLineWidth": 1, "gridLineColor": GRID_COLOR})
    } else {
        json!({"gridLineWidth": 0})
    };
    let y_axis = vec![grid.clone(); options.y_axes.len()];
    if options.chart_type.is_scatter_or_bubble() {
        let x_axis = vec![grid; options.x_axes.len()];
        return Ok(json!({"yAxis": y_axis, "xAxis": x_axis}));
    }
    Ok(json!({ "yAxis": y_axis }))
}

fn white_label() -> Value {
    json!({"color": "#ffffff", "textShadow": "0 0 1px #000000"})
}

fn black_label() -> Value {
    json!({"color": "#000000", "textShadow": "none"})
}

/// Labels drawn inside stacked shapes or treemap cells are white
fn label_style(chart_type: ChartType, stacking: Option<StackingMode>) -> Value {
    if chart_type != ChartType::Area && (stacking.is_some() || chart_type == ChartType::Treemap) {
        white_label()
    } else {
        black_label()
    }
}

/// `true` shows every label, `false` none; `auto` or nothing hides overlapping ones
fn labels_visibility(visible: Option<DataLabelsVisibility>) -> Value {
    match visible {
        Some(DataLabelsVisibility::Shown) => json!({"enabled": true, "allowOverlap": true}),
        Some(DataLabelsVisibility::Hidden) => json!({"enabled": false}),
        Some(DataLabelsVisibility::Auto) | None => json!({"enabled": true, "allowOverlap": false}),
    }
}

fn treemap_labels(multi_level: bool, style: &Value, visibility: &Value) -> Value {
    let mut leaves = json!({
        "enabled": true,
        "padding": 2,
        "formatter": Value::from(LabelFormatter::TreemapLevel2),
        "allowOverlap": false,
        "style": style,
    });
    deep_merge(&mut leaves, visibility.clone());
    if !multi_level {
        return json!({
            "dataLabels": visibility,
            "levels": [{"level": 1, "dataLabels": leaves}],
        });
    }

    let mut root_style = style.clone();
    deep_merge(&mut root_style, json!({"fontSize": "14px"}));
    let mut roots = json!({
        "enabled": true,
        "align": "left",
        "verticalAlign": "top",
        "padding": 5,
        "style": root_style,
        "formatter": Value::from(LabelFormatter::TreemapLevel1),
        "allowOverlap": false,
    });
    deep_merge(&mut roots, visibility.clone());
    json!({
        "dataLabels": visibility,
        "levels": [
            {"level": 1, "dataLabels": roots},
            {"level": 2, "dataLabels": leaves},
        ],
    })
}

fn labels_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let chart_type = options.chart_type;
    let series = &options.data.series;
    let visibility = labels_visibility(ctx.config.data_labels_visible());
    let style = label_style(chart_type, options.stacking);

    let in_percent = ctx.config.stack_measures_to_percent() && can_combo_stack_in_percent(series);
    let value_formatter = if in_percent {
        LabelFormatter::PercentageLabel
    } else {
        LabelFormatter::Label
    };
    let labels = |formatter: LabelFormatter, extra: Value| {
        let mut out = json!({
            "formatter": Value::from(formatter),
            "style": style,
            "allowOverlap": false,
        });
        deep_merge(&mut out, visibility.clone());
        deep_merge(&mut out, extra);
        json!({ "dataLabels": out })
    };
    // the last stacked measure loses its label on a limited percent axis unless drawn inside
    let inside = if in_percent { json!({"inside": true}) } else { empty() };

    let heatmap_disabled = series
        .iter()
        .any(|s| s.data.len() >= HEATMAP_DATA_LABELS_LIMIT);
    let mut heatmap = json!({"formatter": Value::from(LabelFormatter::HeatmapLabel)});
    deep_merge(
        &mut heatmap,
        if heatmap_disabled {
            json!({"enabled": false})
        } else {
            visibility.clone()
        },
    );

    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .map(|axis| json!({"defaultFormat": axis.format}))
        .collect();

    let mut fragment = json!({
        "plotOptions": {
            "bar": labels(value_formatter, inside.clone()),
            "column": labels(value_formatter, inside),
            "area": labels(value_formatter, empty()),
            "line": labels(LabelFormatter::Label, empty()),
            "scatter": labels(LabelFormatter::ScatterLabel, empty()),
            "bubble": labels(LabelFormatter::BubbleLabel, empty()),
            "pie": labels(LabelFormatter::Label, json!({"verticalAlign": "middle"})),
            "funnel": labels(LabelFormatter::Label, json!({"inside": true})),
            "heatmap": {"dataLabels": heatmap},
            "treemap": treemap_labels(options.stacking.is_some(), &style, &visibility),
        },
        "yAxis": y_axis,
    });
    if options.stacking.is_some() || chart_type == ChartType::Treemap {
        deep_merge(
            &mut fragment,
            json!({"drilldown": {"activeDataLabelStyle": {"color": "#ffffff"}}}),
        );
    }
    Ok(fragment)
}

/// Per-series stack settings when measures are stacked
fn series_stack(chart_type: ChartType, series: &SeriesItem, mode: Option<StackingMode>) -> Value {
    let mut out = Map::new();
    if let Some(mode) = mode {
        let combo_line = chart_type == ChartType::Combo && series.series_type.as_deref() == Some("line");
        if combo_line {
            insert(&mut out, "stack", Value::Null);
            insert(&mut out, "stacking", Value::Null);
        } else if series.y_axis > 0 {
            insert(&mut out, "stack", Value::Null);
            insert(&mut out, "stacking", StackingMode::Normal.as_str());
        } else {
            insert(&mut out, "stack", 0);
            insert(&mut out, "stacking", mode.as_str());
        }
    }
    if chart_type == ChartType::Combo {
        let stacked_column = series.series_type.as_deref() == Some("column")
            && out.get("stacking").map(|s| !s.is_null()).unwrap_or(false);
        let style = if stacked_column { white_label() } else { black_label() };
        insert(&mut out, "dataLabels", json!({ "style": style }));
    }
    Value::Object(out)
}

fn optional_stacking_configuration(ctx: &Customization<'_>, acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let chart_type = options.chart_type;
    if !matches!(
        chart_type,
        ChartType::Column | ChartType::Bar | ChartType::Area | ChartType::Combo
    ) {
        return Ok(empty());
    }

    let mut fragment = empty();
    if let Some(drill_config) = ctx.drill_config {
        deep_merge(&mut fragment, json!({"xAxis": [{"drillConfig": drill_config}]}));
    }
    if options.is_view_by_two_attributes && matches!(chart_type, ChartType::Column | ChartType::Bar) {
        let mut parent_labels = json!({"style": {"fontWeight": "bold"}});
        if chart_type == ChartType::Bar {
            parent_labels["x"] = (-5).into();
        }
        deep_merge(
            &mut fragment,
            json!({"xAxis": [{"labels": {"groupedOptions": [parent_labels]}}]}),
        );
    }

    let percent_requested = ctx.config.stack_measures_to_percent();
    if !percent_requested && !ctx.config.stack_measures() {
        return Ok(fragment);
    }
    let series = &options.data.series;
    let percent = percent_requested && (chart_type != ChartType::Combo || can_combo_stack_in_percent(series));
    let mode = if percent {
        Some(StackingMode::Percent)
    } else if ctx.config.stack_measures() {
        Some(StackingMode::Normal)
    } else {
        None
    };

    let series: Vec<Value> = series
        .iter()
        .map(|s| series_stack(chart_type, s, mode))
        .collect();
    let single_axis = options.y_axes.len() == 1;
    let totals = stack_labels_visible(ctx.config);
    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .enumerate()
        .map(|(index, axis)| {
            let mut out = Map::new();
            if chart_type != ChartType::Bar && mode.is_some() {
                let enabled = totals && !(percent && !axis.opposite);
                insert(&mut out, "stackLabels", json!({ "enabled": enabled }));
            }
            if percent && (single_axis || !axis.opposite) {
                // user min/max of a percent axis are fractions
                for key in ["min", "max"] {
                    if let Some(value) = acc["yAxis"][index][key].as_f64() {
                        insert(&mut out, key, value * 100.0);
                    }
                }
            }
            Value::Object(out)
        })
        .collect();

    deep_merge(&mut fragment, json!({"series": series, "yAxis": y_axis}));
    Ok(fragment)
}

fn zero_align_fragment(ctx: &Customization<'_>, acc: &Value) -> Result<Value> {
    Ok(zero_align_configuration(ctx.options, acc))
}

fn axis_name(props: &AxisConfig) -> Value {
    let mut title = Map::new();
    if let Some(align) = props
        .name_position()
        .filter(|p| matches!(*p, "low" | "middle" | "high"))
    {
        insert(&mut title, "align", align);
    }
    if !props.name_visible() {
        insert(&mut title, "text", Value::Null);
    }
    json!({ "title": title })
}

fn axis_name_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    let x_axis: Vec<Value> = options
        .x_axes
        .iter()
        .map(|axis| axis_name(&x_axis_props(options, axis.opposite)))
        .collect();
    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .map(|axis| axis_name(&y_axis_props(options, axis.opposite)))
        .collect();
    Ok(json!({"xAxis": x_axis, "yAxis": y_axis}))
}

fn chart_alignment_configuration(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    if !matches!(
        ctx.options.chart_type,
        ChartType::Pie | ChartType::Donut | ChartType::Funnel | ChartType::Treemap
    ) {
        return Ok(empty());
    }
    Ok(json!({"chart": {"verticalAlign": ctx.config.vertical_align()}}))
}

fn dual_bar_axis_labels(ctx: &Customization<'_>, _acc: &Value) -> Result<Value> {
    let options = ctx.options;
    if options.chart_type != ChartType::Bar || options.y_axes.len() < 2 {
        return Ok(empty());
    }
    let y_axis: Vec<Value> = options
        .y_axes
        .iter()
        .map(|axis| {
            let offset = DUAL_BAR_LABEL_OFFSETS[usize::from(axis.opposite)];
            json!({"labels": {"y": offset}})
        })
        .collect();
    Ok(json!({ "yAxis": y_axis }))
}
