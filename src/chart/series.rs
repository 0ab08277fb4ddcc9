//! Series construction from the raw result matrix
//!
//! The layout is picked from the chart type's capabilities. The default layout produces one
//! series per matrix row and one point per column; heatmap, scatter, bubble, stacked treemap
//! and bullet charts reshape the matrix their own way.

use super::chart_type::{ChartType, SeriesLayout};
use super::colors::{lighter_color, ColorStrategy};
use super::error::{ChartError, Result};
use super::points::{
    CategoryPoint, DataPoint, DrillState, HeatmapCell, Marker, MeasureValue, TreemapNode, XyPoint,
};
use super::result_view::{
    buckets, parse_float, parse_value, AttributeHeader, MeasureDescriptor, ResultView,
};
use super::stacking::StackingMode;
use serde::Serialize;

/// Lightest shade applied to the last leaf of a treemap group
const MAX_COLOR_BRIGHTNESS: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesDataLabels {
    #[serde(rename = "formatGD")]
    pub format_gd: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub legend_index: usize,
    #[serde(rename = "yAxis")]
    pub y_axis: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacking: Option<StackingMode>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub series_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turbo_threshold: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_labels: Option<SeriesDataLabels>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_in_legend: Option<bool>,
    pub is_drillable: bool,
    pub data: Vec<DataPoint>,
}

impl SeriesItem {
    pub fn new(name: impl Into<String>, legend_index: usize, data: Vec<DataPoint>) -> Self {
        Self {
            name: name.into(),
            color: None,
            legend_index,
            y_axis: 0,
            stacking: None,
            series_type: None,
            turbo_threshold: None,
            data_labels: None,
            legend_type: None,
            show_in_legend: None,
            is_drillable: false,
            data,
        }
    }

    fn with_color(mut self, color: String) -> Self {
        self.color = Some(color);
        self
    }
}

/// Everything the series builder reads
pub struct SeriesContext<'a> {
    pub result: &'a ResultView,
    pub measures: &'a [MeasureDescriptor],
    pub view_by: Option<&'a AttributeHeader>,
    pub stack_by: Option<&'a AttributeHeader>,
    pub chart_type: ChartType,
    pub colors: &'a dyn ColorStrategy,
}

impl<'a> SeriesContext<'a> {
    fn measure(&self, index: usize) -> Result<&'a MeasureDescriptor> {
        self.measures.get(index).ok_or_else(|| {
            ChartError::InvalidResult(format!(
                "measure index {} out of range ({} measures)",
                index,
                self.measures.len()
            ))
        })
    }

    fn joined_measure_names(&self) -> String {
        self.measures
            .iter()
            .map(|m| m.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn multi_measure_alternating(&self) -> bool {
        self.chart_type.capabilities().multi_measure_alternating
    }
}

/// Name of the `index`-th item of an attribute the layout requires
pub(crate) fn item_name(attribute: &AttributeHeader, index: usize) -> Result<&str> {
    attribute
        .item(index)
        .map(|item| item.name.as_str())
        .ok_or_else(|| {
            ChartError::InvalidResult(format!(
                "attribute '{}' has no item at index {}",
                attribute.local_id, index
            ))
        })
}

/// Build the series of a chart
pub fn build_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    let series = match ctx.chart_type.capabilities().series {
        SeriesLayout::Heatmap => heatmap_series(ctx)?,
        SeriesLayout::Scatter => scatter_series(ctx)?,
        SeriesLayout::Bubble => bubble_series(ctx)?,
        SeriesLayout::Treemap if ctx.stack_by.is_some() => treemap_stacked_series(ctx)?,
        SeriesLayout::Bullet => bullet_series(ctx)?,
        SeriesLayout::Treemap | SeriesLayout::Default => default_series(ctx)?,
    };
    log::debug!(
        "Built {} series for {} chart",
        series.len(),
        ctx.chart_type
    );
    Ok(series)
}

fn default_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    ctx.result
        .two_dim_data()
        .iter()
        .enumerate()
        .map(|(series_index, row)| {
            let data = series_item_data(ctx, row, series_index)?;
            let name = if let Some(stack_by) = ctx.stack_by {
                item_name(stack_by, series_index)?.to_string()
            } else if ctx.multi_measure_alternating() && ctx.view_by.is_none() {
                ctx.joined_measure_names()
            } else {
                ctx.measure(series_index)?.name.clone()
            };

            let mut item = SeriesItem::new(name, series_index, data)
                .with_color(ctx.colors.color_by_index(series_index));
            if ctx.chart_type == ChartType::Treemap {
                item.turbo_threshold = Some(0);
            }
            Ok(item)
        })
        .collect()
}

/// Points of one default-layout row
pub(crate) fn series_item_data(
    ctx: &SeriesContext<'_>,
    row: &[Option<String>],
    series_index: usize,
) -> Result<Vec<DataPoint>> {
    let alternating = ctx.multi_measure_alternating();
    row.iter()
        .enumerate()
        .map(|(point_index, cell)| {
            let measure_index = if ctx.stack_by.is_some() {
                0
            } else if alternating && ctx.view_by.is_none() {
                point_index
            } else {
                series_index
            };
            let measure = ctx.measure(measure_index)?;

            let parsed = parse_value(cell.as_deref());
            let value = if ctx.chart_type == ChartType::Treemap {
                MeasureValue::Value(parsed)
            } else {
                MeasureValue::Y(parsed)
            };

            let name = match (ctx.stack_by, ctx.view_by) {
                (Some(stack_by), _) => item_name(stack_by, series_index)?.to_string(),
                (None, Some(view_by)) if alternating => item_name(view_by, point_index)?.to_string(),
                _ => measure.name.clone(),
            };

            let (color, legend_index) = if alternating {
                (Some(ctx.colors.color_by_index(point_index)), Some(point_index))
            } else {
                (None, None)
            };

            Ok(DataPoint::Category(CategoryPoint {
                measure: value,
                name,
                format: measure.format.clone(),
                color,
                legend_index,
                marker: cell.is_none().then_some(Marker { enabled: false }),
                drill: DrillState::default(),
            }))
        })
        .collect()
}

fn heatmap_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    let measure = ctx.measure(0)?;
    let data = ctx
        .result
        .two_dim_data()
        .iter()
        .enumerate()
        .flat_map(|(row_index, row)| {
            row.iter()
                .enumerate()
                .flat_map(move |(column_index, cell)| match parse_value(cell.as_deref()) {
                    Some(value) => {
                        vec![DataPoint::HeatmapCell(HeatmapCell::with_value(
                            column_index,
                            row_index,
                            value,
                        ))]
                    }
                    None => HeatmapCell::missing(column_index, row_index)
                        .into_iter()
                        .map(DataPoint::HeatmapCell)
                        .collect(),
                })
        })
        .collect();

    let mut item = SeriesItem::new(measure.name.clone(), 0, data);
    item.turbo_threshold = Some(0);
    item.data_labels = Some(SeriesDataLabels {
        format_gd: measure.format.clone(),
    });
    Ok(vec![item])
}

fn scatter_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    let primary_empty = ctx.result.is_bucket_empty(buckets::MEASURES);
    let secondary_empty = ctx.result.is_bucket_empty(buckets::SECONDARY_MEASURES);

    let data = ctx
        .result
        .two_dim_data()
        .iter()
        .enumerate()
        .map(|(series_index, row)| {
            let value = |i: usize| parse_value(row.get(i).and_then(|c| c.as_deref()));
            let x = if primary_empty { Some(0.0) } else { value(0) };
            let y = match (secondary_empty, primary_empty) {
                (true, _) => Some(0.0),
                (false, true) => value(0),
                (false, false) => value(1),
            };
            let name = match ctx.stack_by {
                Some(stack_by) => item_name(stack_by, series_index)?.to_string(),
                None => String::new(),
            };
            Ok(DataPoint::Xy(XyPoint {
                x,
                y,
                z: None,
                name: Some(name),
                format: None,
                drill: DrillState::default(),
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut item = SeriesItem::new("", 0, data).with_color(ctx.colors.color_by_index(0));
    item.turbo_threshold = Some(0);
    Ok(vec![item])
}

fn bubble_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    let primary_empty = ctx.result.is_bucket_empty(buckets::MEASURES);
    let secondary_empty = ctx.result.is_bucket_empty(buckets::SECONDARY_MEASURES);
    let empty_buckets = usize::from(primary_empty) + usize::from(secondary_empty);
    let format = ctx.measures.last().map(|m| m.format.clone());

    ctx.result
        .two_dim_data()
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let cell = |i: usize| row.get(i).and_then(|c| c.as_deref());
            // only null cells drop the point; an absent size column leaves z as NaN
            let complete = (0..3).all(|i| !matches!(row.get(i), Some(None)));
            let data = if complete {
                vec![DataPoint::Xy(XyPoint {
                    x: if primary_empty {
                        Some(0.0)
                    } else {
                        parse_value(cell(0))
                    },
                    y: if secondary_empty {
                        Some(0.0)
                    } else {
                        parse_value(cell(1 - empty_buckets.min(1)))
                    },
                    z: Some(parse_float(cell(2 - empty_buckets))),
                    name: None,
                    format: format.clone(),
                    drill: DrillState::default(),
                })]
            } else {
                Vec::new()
            };
            let name = match ctx.stack_by {
                Some(stack_by) => item_name(stack_by, index)?.to_string(),
                None => String::new(),
            };
            Ok(SeriesItem::new(name, index, data).with_color(ctx.colors.color_by_index(index)))
        })
        .collect()
}

/// Leaves of one group lighten progressively by position
fn gradient_group(leaves: Vec<TreemapNode>) -> impl Iterator<Item = TreemapNode> {
    let step = MAX_COLOR_BRIGHTNESS / leaves.len().max(1) as f64;
    leaves.into_iter().enumerate().map(move |(index, mut leaf)| {
        leaf.color = lighter_color(&leaf.color, step * index as f64);
        leaf
    })
}

/// Roots are consecutive distinct view-by items, leaves are the stack-by items under them
fn treemap_with_view_by(
    ctx: &SeriesContext<'_>,
    view_by: &AttributeHeader,
    stack_by: &AttributeHeader,
) -> Result<Vec<TreemapNode>> {
    let format = ctx.measure(0)?.format.clone();

    let mut groups: Vec<(TreemapNode, Vec<TreemapNode>)> = Vec::new();
    let mut last_root: Option<&str> = None;
    for (series_index, row) in ctx.result.two_dim_data().iter().enumerate() {
        let root = view_by.item(series_index).ok_or_else(|| {
            ChartError::InvalidResult(format!(
                "attribute '{}' has no item at index {}",
                view_by.local_id, series_index
            ))
        })?;
        if last_root != Some(root.id.as_str()) {
            last_root = Some(root.id.as_str());
            let root_index = groups.len();
            groups.push((
                TreemapNode::root(
                    root_index,
                    &root.name,
                    &format,
                    ctx.colors.color_by_index(root_index),
                ),
                Vec::new(),
            ));
        }
        let root_index = groups.len() - 1;
        let leaf = TreemapNode::leaf(
            root_index,
            item_name(stack_by, series_index)?,
            parse_value(row.first().and_then(|c| c.as_deref())),
            (series_index, series_index),
            &format,
            ctx.colors.color_by_index(root_index),
        );
        if let Some((_, leaves)) = groups.last_mut() {
            leaves.push(leaf);
        }
    }

    let (roots, leaves): (Vec<_>, Vec<_>) = groups.into_iter().unzip();
    Ok(roots
        .into_iter()
        .chain(leaves.into_iter().flat_map(gradient_group))
        .collect())
}

/// Measures are roots, stack-by items the leaves under each measure, sorted by value
fn treemap_with_measures(
    ctx: &SeriesContext<'_>,
    stack_by: &AttributeHeader,
) -> Result<Vec<TreemapNode>> {
    let roots = ctx.measures.iter().enumerate().map(|(index, measure)| {
        TreemapNode::root(
            index,
            &measure.name,
            &measure.format,
            ctx.colors.color_by_index(index),
        )
    });

    let mut leaves = Vec::new();
    for (series_index, row) in ctx.result.two_dim_data().iter().enumerate() {
        let format = &ctx.measure(series_index)?.format;
        let color = ctx.colors.color_by_index(series_index);
        let mut group = row
            .iter()
            .enumerate()
            .map(|(item_index, cell)| {
                Ok(TreemapNode::leaf(
                    series_index,
                    item_name(stack_by, item_index)?,
                    parse_value(cell.as_deref()),
                    (series_index, item_index),
                    format,
                    color.clone(),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        // missing values weigh as zero
        group.sort_by(|a, b| b.value.unwrap_or(0.0).total_cmp(&a.value.unwrap_or(0.0)));
        leaves.extend(gradient_group(group));
    }

    Ok(roots.chain(leaves).collect())
}

/// Descending order with missing values last
pub(crate) fn descending(a: Option<f64>, b: Option<f64>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

fn treemap_stacked_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    let Some(stack_by) = ctx.stack_by else {
        return default_series(ctx);
    };
    let nodes = match ctx.view_by {
        Some(view_by) => treemap_with_view_by(ctx, view_by, stack_by)?,
        None => treemap_with_measures(ctx, stack_by)?,
    };

    let mut item = SeriesItem::new(
        ctx.joined_measure_names(),
        0,
        nodes.into_iter().map(DataPoint::TreemapNode).collect(),
    );
    item.legend_type = Some("point".to_string());
    item.show_in_legend = Some(true);
    item.turbo_threshold = Some(0);
    Ok(vec![item])
}

/// Series type of each bullet role: primary, target, comparative
const BULLET_SERIES_TYPES: [&str; 3] = ["bar", "bullet", "line"];

fn bullet_series(ctx: &SeriesContext<'_>) -> Result<Vec<SeriesItem>> {
    let roles: Vec<usize> = if ctx.result.has_buckets() {
        [
            buckets::MEASURES,
            buckets::SECONDARY_MEASURES,
            buckets::TERTIARY_MEASURES,
        ]
        .iter()
        .enumerate()
        .filter(|(_, bucket)| !ctx.result.is_bucket_empty(bucket))
        .map(|(role, _)| role)
        .collect()
    } else {
        (0..BULLET_SERIES_TYPES.len()).collect()
    };

    ctx.result
        .two_dim_data()
        .iter()
        .zip(roles)
        .enumerate()
        .map(|(index, (row, role))| {
            let measure = ctx.measure(index)?;
            let data = row
                .iter()
                .map(|cell| {
                    DataPoint::Category(CategoryPoint {
                        measure: MeasureValue::Y(parse_value(cell.as_deref())),
                        name: measure.name.clone(),
                        format: measure.format.clone(),
                        color: None,
                        legend_index: None,
                        marker: None,
                        drill: DrillState::default(),
                    })
                })
                .collect();
            let mut item = SeriesItem::new(measure.name.clone(), index, data)
                .with_color(ctx.colors.color_by_index(index));
            item.series_type = Some(BULLET_SERIES_TYPES[role].to_string());
            Ok(item)
        })
        .collect()
}
