//! Chart options: the typed result of the data-shaping pipeline
//!
//! [`build_chart_options`] runs the stages in a fixed order:
//!
//! 1. resolve the view-by / stack-by attributes
//! 2. pick the color strategy and the stacking mode
//! 3. build the axes and the series
//! 4. decorate the series with drill metadata and y-axis indices
//! 5. derive the categories, then sort pie-like charts by value
//! 6. assemble the chart-family specific options
//!
//! Each stage takes the previous stage's values and returns new ones.

use super::axes::{
    assign_y_axes, axis_props, build_x_axes, build_y_axes, heatmap_data_classes, is_dual_axis,
    AxisDescriptor, AxisProps, DataClass,
};
use super::categories::{build_categories, categories_for_two_attributes, Categories};
use super::chart_type::ChartType;
use super::colors::{create_color_strategy, ColorAssignment};
use super::drillability::{resolve_drillability, DrillContext, HeaderPredicate};
use super::error::Result;
use super::format::DefaultNumberFormatter;
use super::result_view::{
    buckets, AttributeHeader, MeasureDescriptor, ResultView, STACK_BY_DIMENSION_INDEX,
    VIEW_BY_ATTRIBUTES_LIMIT, VIEW_BY_DIMENSION_INDEX,
};
use super::series::{build_series, descending, SeriesContext, SeriesItem};
use super::stacking::{apply_series_stacking, can_combo_stack_in_percent, combo_stacking, resolve_stacking, StackingMode};
use super::tooltip::{build_tooltip_factory, TooltipAttributes, TooltipFactory, TooltipSettings};
use crate::config::{ChartConfig, ColorPaletteItem};
use serde::Serialize;
use std::sync::Arc;

/// Series and the categories they are plotted against
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub series: Vec<SeriesItem>,
    pub categories: Categories,
}

/// Axis titles of a heatmap
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeatmapTitle {
    pub x: String,
    pub y: String,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAxis {
    pub data_classes: Vec<DataClass>,
}

/// Everything the renderer configuration is derived from
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub chart_type: ChartType,
    pub stacking: Option<StackingMode>,
    pub has_stack_by_attribute: bool,
    pub has_view_by_attribute: bool,
    pub is_view_by_two_attributes: bool,
    /// `horizontal` or `vertical`
    pub legend_layout: String,
    pub x_axes: Vec<AxisDescriptor>,
    pub y_axes: Vec<AxisDescriptor>,
    pub data: ChartData,
    pub tooltip: Option<TooltipFactory>,
    pub grid_enabled: bool,
    pub axis_props: AxisProps,
    pub color_assignments: Vec<ColorAssignment>,
    pub color_palette: Option<Vec<ColorPaletteItem>>,
    pub color_axis: Option<ColorAxis>,
    pub title: Option<HeatmapTitle>,
    pub force_disable_drill_on_axes: bool,
}

impl ChartOptions {
    /// Options of a chart without data
    pub fn empty(chart_type: ChartType) -> Self {
        Self {
            chart_type,
            stacking: None,
            has_stack_by_attribute: false,
            has_view_by_attribute: false,
            is_view_by_two_attributes: false,
            legend_layout: "horizontal".to_string(),
            x_axes: Vec::new(),
            y_axes: Vec::new(),
            data: ChartData::default(),
            tooltip: None,
            grid_enabled: true,
            axis_props: AxisProps::default(),
            color_assignments: Vec::new(),
            color_palette: None,
            color_axis: None,
            title: None,
            force_disable_drill_on_axes: false,
        }
    }

    pub fn is_dual_axis(&self) -> bool {
        is_dual_axis(&self.y_axes)
    }

    /// True when any series has a drillable point
    pub fn is_drillable(&self) -> bool {
        self.data.series.iter().any(|s| s.is_drillable)
    }

    pub fn categories(&self) -> &Categories {
        &self.data.categories
    }
}

/// View-by and stack-by attributes of a result
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartAttributes<'a> {
    pub view_by: Option<&'a AttributeHeader>,
    pub view_by_parent: Option<&'a AttributeHeader>,
    pub stack_by: Option<&'a AttributeHeader>,
    pub view_by_two_attributes: bool,
}

/// Treemap attributes when the result carries no bucket information
///
/// One measure with one attribute cannot tell view-by from segment-by here; the first
/// attribute of the stack dimension is taken as view-by.
fn default_treemap_attributes(result: &ResultView) -> (Option<&AttributeHeader>, Option<&AttributeHeader>) {
    let view_by = result
        .attribute(STACK_BY_DIMENSION_INDEX, 0)
        .or_else(|| result.attribute(VIEW_BY_DIMENSION_INDEX, 0));
    let stack_by = result.attribute(STACK_BY_DIMENSION_INDEX, 1);
    (view_by, stack_by)
}

fn treemap_attributes(result: &ResultView) -> (Option<&AttributeHeader>, Option<&AttributeHeader>) {
    if !result.has_buckets() {
        return default_treemap_attributes(result);
    }
    let segment_empty = result.is_bucket_empty(buckets::SEGMENT);
    let view_empty = result.is_bucket_empty(buckets::VIEW);
    match (segment_empty, view_empty) {
        (true, true) => (None, None),
        (true, false) => (result.attribute(VIEW_BY_DIMENSION_INDEX, 0), None),
        (false, true) => (None, result.attribute(VIEW_BY_DIMENSION_INDEX, 0)),
        (false, false) => (
            result.attribute(STACK_BY_DIMENSION_INDEX, 0),
            result.attribute(STACK_BY_DIMENSION_INDEX, 1),
        ),
    }
}

/// Resolve which attributes play the view-by and stack-by roles
pub fn resolve_attributes(result: &ResultView, chart_type: ChartType) -> ChartAttributes<'_> {
    let view_by_two_attributes =
        result.attribute_count(VIEW_BY_DIMENSION_INDEX) == VIEW_BY_ATTRIBUTES_LIMIT;
    let view_by_parent = if view_by_two_attributes {
        result.attribute(VIEW_BY_DIMENSION_INDEX, 0)
    } else {
        None
    };

    let (view_by, stack_by) = if chart_type == ChartType::Treemap {
        treemap_attributes(result)
    } else {
        let child_index = if view_by_two_attributes { 1 } else { 0 };
        (
            result.attribute(VIEW_BY_DIMENSION_INDEX, child_index),
            result.attribute(STACK_BY_DIMENSION_INDEX, 0),
        )
    };

    ChartAttributes {
        view_by,
        view_by_parent,
        stack_by,
        view_by_two_attributes,
    }
}

/// Sort the points of a pie-like series by descending value
///
/// Points keep their colors; legend indices are reset to the new positions. Returns the
/// pre-sort legend index of every sorted point, for reordering the categories.
pub fn sort_points_by_value(mut series: SeriesItem) -> (SeriesItem, Vec<usize>) {
    let mut points: Vec<_> = std::mem::take(&mut series.data).into_iter().enumerate().collect();
    points.sort_by(|(_, a), (_, b)| descending(a.value(), b.value()));

    let order = points
        .iter()
        .map(|(original, point)| point.legend_index().unwrap_or(*original))
        .collect();
    series.data = points
        .into_iter()
        .enumerate()
        .map(|(position, (_, mut point))| {
            point.set_legend_index(position);
            point
        })
        .collect();
    (series, order)
}

/// Series type of each combo series, from the axis it is drawn against
fn combo_series(config: &ChartConfig, series: Vec<SeriesItem>) -> Vec<SeriesItem> {
    let primary = config.primary_chart_type();
    let secondary = config.secondary_chart_type();
    series
        .into_iter()
        .map(|mut item| {
            let series_type = if item.y_axis == 0 { &primary } else { &secondary };
            item.series_type = Some(series_type.clone());
            item
        })
        .collect()
}

/// X, y and size measures shown in scatter and bubble tooltips, following the filled buckets
fn xy_tooltip_measures(
    result: &ResultView,
    chart_type: ChartType,
    measures: &[MeasureDescriptor],
) -> [Option<MeasureDescriptor>; 3] {
    let mut remaining = measures.iter().cloned();
    match chart_type {
        ChartType::Scatter if result.is_bucket_empty(buckets::MEASURES) => {
            [None, measures.first().cloned(), None]
        }
        ChartType::Scatter => [measures.first().cloned(), measures.get(1).cloned(), None],
        ChartType::Bubble => [
            buckets::MEASURES,
            buckets::SECONDARY_MEASURES,
            buckets::TERTIARY_MEASURES,
        ]
        .map(|bucket| {
            if result.is_bucket_empty(bucket) {
                None
            } else {
                remaining.next()
            }
        }),
        _ => [None, None, None],
    }
}

/// Derive the chart options of a result
///
/// Fails when the chart type is missing or unknown, or when the result lacks the structure the
/// chart needs. Malformed values and missing attributes are not errors.
pub fn build_chart_options(
    result: &ResultView,
    config: &ChartConfig,
    predicates: &[&dyn HeaderPredicate],
) -> Result<ChartOptions> {
    let chart_type = ChartType::parse(config.chart_type.as_deref())?;
    let measures = result.require_measure_group()?;
    let attributes = resolve_attributes(result, chart_type);
    let ChartAttributes {
        view_by,
        view_by_parent,
        stack_by,
        view_by_two_attributes,
    } = attributes;

    let colors = create_color_strategy(chart_type, config, view_by, stack_by, result);
    let stacking = resolve_stacking(chart_type, stack_by.is_some(), config);
    let x_axes = build_x_axes(result, config, chart_type, measures, view_by);
    let y_axes = build_y_axes(result, config, chart_type, measures, stack_by);

    let series = build_series(&SeriesContext {
        result,
        measures,
        view_by,
        stack_by,
        chart_type,
        colors: colors.as_ref(),
    })?;
    let series = resolve_drillability(
        &DrillContext {
            result,
            predicates,
            view_by: [view_by, view_by_parent],
            stack_by,
            chart_type,
        },
        series,
    );
    let mut series = assign_y_axes(series, &y_axes);

    let mut categories = match (view_by, view_by_parent) {
        (Some(child), Some(parent)) => categories_for_two_attributes(child, parent),
        _ => build_categories(chart_type, measures, view_by, stack_by),
    };

    if chart_type.capabilities().sorted_by_measure && !series.is_empty() {
        let (sorted, order) = sort_points_by_value(series.remove(0));
        series.insert(0, sorted);
        categories = categories.reorder(&order);
    }

    let mut stack_measures_to_percent = config.stack_measures_to_percent();
    let stacking = if chart_type == ChartType::Combo {
        series = combo_series(config, series);
        stack_measures_to_percent &= can_combo_stack_in_percent(&series);
        combo_stacking(config, &series, stacking)
    } else {
        stacking
    };
    let series = apply_series_stacking(series, stacking);

    let scatter_like = chart_type.is_scatter_or_bubble() || chart_type == ChartType::Heatmap;
    let dual_axis = chart_type != ChartType::Combo && is_dual_axis(&y_axes);
    let tooltip = build_tooltip_factory(
        chart_type,
        TooltipAttributes {
            view_by: view_by.cloned(),
            view_by_parent: view_by_parent.cloned(),
            stack_by: stack_by.cloned(),
            xy_measures: xy_tooltip_measures(result, chart_type, measures),
        },
        TooltipSettings {
            separators: config.separators.clone(),
            stack_measures_to_percent,
            dual_axis,
            formatter: Arc::new(DefaultNumberFormatter),
        },
        view_by_two_attributes,
    );

    let mut props = axis_props(config, chart_type);
    if scatter_like {
        props.secondary_x_axis_props = None;
        props.secondary_y_axis_props = None;
    } else if chart_type == ChartType::Combo {
        props.secondary_x_axis_props = None;
    }

    let (color_axis, title) = if chart_type == ChartType::Heatmap {
        (
            Some(ColorAxis {
                data_classes: heatmap_data_classes(&series, colors.as_ref()),
            }),
            Some(HeatmapTitle {
                x: view_by.map(|a| a.display_name.clone()).unwrap_or_default(),
                y: stack_by.map(|a| a.display_name.clone()).unwrap_or_default(),
                format: measures.first().map(|m| m.format.clone()).unwrap_or_default(),
            }),
        )
    } else {
        (None, None)
    };

    let options = ChartOptions {
        chart_type,
        stacking: if chart_type == ChartType::Heatmap {
            None
        } else {
            stacking
        },
        has_stack_by_attribute: stack_by.is_some(),
        has_view_by_attribute: if chart_type == ChartType::Bubble {
            stack_by.is_some()
        } else {
            view_by.is_some()
        },
        is_view_by_two_attributes: view_by_two_attributes,
        legend_layout: if scatter_like {
            "horizontal".to_string()
        } else {
            config.legend_layout()
        },
        x_axes,
        y_axes,
        data: ChartData { series, categories },
        tooltip: Some(tooltip),
        grid_enabled: chart_type != ChartType::Heatmap && config.grid_enabled(),
        axis_props: props,
        color_assignments: colors.color_assignment().to_vec(),
        color_palette: config.color_palette.clone(),
        color_axis,
        title,
        force_disable_drill_on_axes: config.force_disable_drill_on_axes,
    };

    log::debug!(
        "Chart options for {}: {} series, {} categories, {} y axes, stacking {:?}",
        chart_type,
        options.data.series.len(),
        options.data.categories.count(),
        options.y_axes.len(),
        options.stacking
    );
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::super::drillability::DrillPredicate;
    use super::super::error::ChartError;
    use super::super::points::DataPoint;
    use super::super::result_view::fixtures::*;
    use super::super::result_view::DimensionHeader;
    use super::super::tooltip::TooltipPoint;
    use super::*;
    use crate::config::AxisConfig;
    use proptest::prelude::*;
    use serde_json::json;

    fn build(result: &ResultView, config: &ChartConfig) -> ChartOptions {
        build_chart_options(result, config, &[]).unwrap()
    }

    fn column_result() -> ResultView {
        view(
            vec![DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")])],
            vec![DimensionHeader::Attribute(attribute(
                "a1",
                "Product",
                &["Computer", "Television"],
            ))],
            &[&["10", "20"]],
        )
    }

    fn measures_only(values: &[&str]) -> ResultView {
        let measures = (0..values.len())
            .map(|i| measure(&format!("m{}", i), &format!("Measure {}", i), "#,##0"))
            .collect();
        view(vec![], vec![DimensionHeader::MeasureGroup(measures)], &[values])
    }

    fn three_measures_column() -> ResultView {
        view(
            vec![DimensionHeader::MeasureGroup(vec![
                measure("A", "Revenue", "#,##0"),
                measure("B", "Margin", "#,##0"),
                measure("C", "Cost", "#,##0"),
            ])],
            vec![DimensionHeader::Attribute(attribute("a1", "Product", &["P1", "P2"]))],
            &[&["1", "2"], &["3", "4"], &["5", "6"]],
        )
    }

    #[test]
    fn test_unknown_chart_type() {
        let err = build_chart_options(&column_result(), &ChartConfig::of_type("radar"), &[]).unwrap_err();
        match err {
            ChartError::UnsupportedChartType { chart_type, supported } => {
                assert_eq!(chart_type, "radar");
                assert!(supported.contains("column"));
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(build_chart_options(&column_result(), &ChartConfig::default(), &[]).is_err());
    }

    #[test]
    fn test_column_with_view_by() {
        let options = build(&column_result(), &ChartConfig::of_type("column"));
        assert_eq!(options.data.series.len(), 1);
        let series = &options.data.series[0];
        assert_eq!(series.data.len(), 2);
        let first = serde_json::to_value(&series.data[0]).unwrap();
        assert_eq!(first["y"], json!(10.0));
        assert_eq!(first["name"], json!("Amount"));
        assert_eq!(
            options.data.categories,
            Categories::Flat(vec!["Computer".to_string(), "Television".to_string()])
        );
        assert_eq!(options.x_axes[0].label, "Product");
        assert_eq!(options.y_axes[0].label, "Amount");
        assert!(options.has_view_by_attribute);
        assert!(options.grid_enabled);
        assert_eq!(options.stacking, None);
    }

    #[test]
    fn test_pie_measures_only_sorted() {
        let options = build(&measures_only(&["30", "70"]), &ChartConfig::of_type("pie"));
        let points = &options.data.series[0].data;
        let values: Vec<_> = points.iter().map(|p| p.value()).collect();
        assert_eq!(values, vec![Some(70.0), Some(30.0)]);
        let legend: Vec<_> = points.iter().map(|p| p.legend_index()).collect();
        assert_eq!(legend, vec![Some(0), Some(1)]);

        let unsorted = build(&measures_only(&["70", "30"]), &ChartConfig::of_type("pie"));
        // color follows the measure, not the slice position
        assert_eq!(points[0].color(), unsorted.data.series[0].data[1].color());
        assert_eq!(
            options.data.categories,
            Categories::Flat(vec!["Measure 1".to_string(), "Measure 0".to_string()])
        );
    }

    #[test]
    fn test_dual_axis_percent_demotion() {
        let config = ChartConfig {
            stack_measures_to_percent: Some(true),
            secondary_yaxis: Some(AxisConfig {
                measures: vec!["B".to_string()],
                ..AxisConfig::default()
            }),
            ..ChartConfig::of_type("column")
        };
        let options = build(&three_measures_column(), &config);
        assert_eq!(options.y_axes.len(), 2);
        let series = &options.data.series;
        assert_eq!(series[0].y_axis, 0);
        assert_eq!(series[1].y_axis, 1);
        assert_eq!(series[0].stacking, Some(StackingMode::Percent));
        assert_eq!(series[1].stacking, Some(StackingMode::Normal));
        assert_eq!(series[2].stacking, Some(StackingMode::Percent));
    }

    #[test]
    fn test_combo_series_types() {
        let config = ChartConfig {
            stack_measures_to_percent: Some(true),
            secondary_yaxis: Some(AxisConfig {
                measures: vec!["C".to_string()],
                ..AxisConfig::default()
            }),
            ..ChartConfig::of_type("combo")
        };
        let options = build(&three_measures_column(), &config);
        let types: Vec<_> = options
            .data
            .series
            .iter()
            .map(|s| s.series_type.as_deref())
            .collect();
        assert_eq!(types, vec![Some("column"), Some("column"), Some("line")]);
        assert_eq!(options.stacking, Some(StackingMode::Percent));
        assert_eq!(options.data.series[2].stacking, None);
        assert!(options.axis_props.secondary_x_axis_props.is_none());
    }

    #[test]
    fn test_scatter_filters_null_points() {
        let result = view(
            vec![DimensionHeader::Attribute(attribute("s1", "Store", &["S1", "S2", "S3"]))],
            vec![DimensionHeader::MeasureGroup(vec![
                measure("m1", "Price", "#,##0"),
                measure("m2", "Sales", "#,##0"),
            ])],
            &[&["1", "2"], &["null", "4"], &["5", "x"]],
        )
        .with_buckets([(buckets::MEASURES, false), (buckets::SECONDARY_MEASURES, false)]);
        let options = build(&result, &ChartConfig::of_type("scatter"));
        let data = &options.data.series[0].data;
        assert_eq!(data.len(), 1);
        assert!(data.iter().all(|p| !p.has_null_coordinate()));
        assert_eq!(options.legend_layout, "horizontal");
    }

    #[test]
    fn test_heatmap_options() {
        let result = view(
            vec![DimensionHeader::Attribute(attribute("s1", "Region", &["East", "West"]))],
            vec![
                DimensionHeader::Attribute(attribute("a1", "Product", &["A", "B"])),
                DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")]),
            ],
            &[&["1", "2"], &["null", "4"]],
        );
        let options = build(&result, &ChartConfig::of_type("heatmap"));
        assert!(!options.grid_enabled);
        assert_eq!(options.stacking, None);
        // one missing cell becomes two points
        assert_eq!(options.data.series[0].data.len(), 5);
        let classes = &options.color_axis.as_ref().unwrap().data_classes;
        assert_eq!(classes.len(), 7);
        assert_eq!(options.title.as_ref().unwrap().y, "Region Name");
        assert_eq!(options.y_axes[0].label, "Region");
    }

    #[test]
    fn test_treemap_attribute_resolution() {
        let result = view(
            vec![
                DimensionHeader::Attribute(attribute("v1", "Region", &["East", "East"])),
                DimensionHeader::Attribute(attribute("s1", "Product", &["A", "B"])),
            ],
            vec![DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")])],
            &[&["1"], &["2"]],
        );
        let attributes = resolve_attributes(&result, ChartType::Treemap);
        assert_eq!(attributes.view_by.unwrap().local_id, "v1");
        assert_eq!(attributes.stack_by.unwrap().local_id, "s1");

        let with_buckets = result
            .clone()
            .with_buckets([(buckets::VIEW, false), (buckets::SEGMENT, true)]);
        let attributes = resolve_attributes(&with_buckets, ChartType::Treemap);
        assert!(attributes.view_by.is_none());
        assert!(attributes.stack_by.is_none());

        let options = build(&result, &ChartConfig::of_type("treemap"));
        let data = &options.data.series[0].data;
        assert!(data[0].is_treemap_root());
        assert!(!data[1].is_treemap_root());
    }

    #[test]
    fn test_flat_treemap_points_have_tooltips() {
        let result = view(
            vec![DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")])],
            vec![DimensionHeader::Attribute(attribute("v1", "Region", &["East", "West"]))],
            &[&["10", "20"]],
        );
        let options = build(&result, &ChartConfig::of_type("treemap"));
        let series = &options.data.series[0];
        assert!(matches!(series.data[0], DataPoint::Category(_)));

        let factory = options.tooltip.as_ref().unwrap();
        let point = TooltipPoint::from_series(series, 0, &options.data.categories, false).unwrap();
        let html = factory.render(&point, 320.0, None).unwrap();
        assert!(html.contains("Region"));
        assert!(html.contains("East"));
        assert!(html.contains("Amount"));
        assert!(html.contains(">10<"));
        assert!(!html.contains("West"));
    }

    #[test]
    fn test_two_view_by_attributes() {
        let mut region = attribute("p1", "Region", &["East", "East"]);
        region.items[1].id = region.items[0].id.clone();
        let result = view(
            vec![DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")])],
            vec![
                DimensionHeader::Attribute(region),
                DimensionHeader::Attribute(attribute("c1", "Status", &["Won", "Lost"])),
            ],
            &[&["1", "2"]],
        );
        let options = build(&result, &ChartConfig::of_type("bar"));
        assert!(options.is_view_by_two_attributes);
        assert_eq!(
            serde_json::to_value(&options.data.categories).unwrap(),
            json!([{"name": "East", "categories": ["Won", "Lost"]}])
        );
        assert_eq!(options.x_axes[0].label, "Status");
    }

    #[test]
    fn test_drill_predicates_reach_points() {
        let predicate = DrillPredicate::LocalIdentifier("m1".to_string());
        let predicates: [&dyn HeaderPredicate; 1] = [&predicate];
        let options =
            build_chart_options(&column_result(), &ChartConfig::of_type("column"), &predicates)
                .unwrap();
        assert!(options.is_drillable());
        assert!(options.data.series[0].data.iter().all(DataPoint::is_drillable));
    }

    #[test]
    fn test_zero_rows() {
        let result = view(
            vec![DimensionHeader::MeasureGroup(vec![measure("m1", "Amount", "#,##0")])],
            vec![DimensionHeader::Attribute(attribute("a1", "Product", &[]))],
            &[],
        );
        for chart_type in ["column", "line", "pie", "treemap", "bar"] {
            let options = build(&result, &ChartConfig::of_type(chart_type));
            assert!(options.data.series.iter().all(|s| s.data.is_empty()));
        }
    }

    proptest! {
        #[test]
        fn prop_pipeline_is_idempotent(values in prop::collection::vec(-1000i32..1000, 1..6)) {
            let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
            let result = measures_only(&refs);
            for chart_type in ["column", "pie", "donut", "funnel", "line"] {
                let config = ChartConfig::of_type(chart_type);
                prop_assert_eq!(build(&result, &config), build(&result, &config));
            }
        }

        #[test]
        fn prop_pie_sort_keeps_colors(values in prop::collection::vec(0u32..10_000, 1..8)) {
            let cells: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
            let result = measures_only(&refs);
            let options = build(&result, &ChartConfig::of_type("pie"));
            let colors = create_color_strategy(
                ChartType::Pie,
                &ChartConfig::of_type("pie"),
                None,
                None,
                &result,
            );

            let Categories::Flat(categories) = &options.data.categories else {
                panic!("pie categories are flat");
            };
            let points = &options.data.series[0].data;
            for window in points.windows(2) {
                prop_assert!(window[0].value() >= window[1].value());
            }
            for (position, point) in points.iter().enumerate() {
                prop_assert_eq!(point.legend_index(), Some(position));
                // recover the original slot from the category label
                let original: usize = categories[position]
                    .trim_start_matches("Measure ")
                    .parse()
                    .unwrap();
                prop_assert_eq!(point.value(), Some(values[original] as f64));
                let expected_color = colors.color_by_index(original);
                prop_assert_eq!(point.color(), Some(expected_color.as_str()));
            }
        }
    }
}
