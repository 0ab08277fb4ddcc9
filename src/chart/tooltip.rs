//! Tooltip factories
//!
//! A factory turns a hovered point into tooltip markup. Returning `None` means the point shows
//! no tooltip (treemap roots), which is not an error. All user-provided text is escaped before
//! it is embedded.

use super::categories::Categories;
use super::chart_type::{ChartType, TooltipLayout};
use super::format::{escape_html, format_value, percent_formatter, NumberFormatter};
use super::points::DataPoint;
use super::result_view::{AttributeHeader, MeasureDescriptor};
use super::series::SeriesItem;
use crate::config::Separators;
use std::fmt;
use std::sync::Arc;

/// Horizontal padding inside the tooltip box
const TOOLTIP_PADDING: f64 = 10.0;

/// Category of the hovered point; `parent` is set for grouped categories
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipCategory {
    pub name: String,
    pub parent: Option<String>,
}

/// What a tooltip factory may read from the hovered point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipPoint {
    pub series_name: String,
    pub name: Option<String>,
    pub category: Option<TooltipCategory>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub value: Option<f64>,
    pub format: Option<String>,
    /// Series-level format of heatmap cells
    pub series_format: Option<String>,
    /// Point belongs to a series drawn against the secondary axis
    pub opposite_axis: bool,
    /// Treemap node kind; `None` for points without a node hierarchy, which count as leaves
    pub leaf: Option<bool>,
}

impl TooltipPoint {
    /// Describe the `point_index`-th point of a built series
    pub fn from_series(
        series: &SeriesItem,
        point_index: usize,
        categories: &Categories,
        opposite_axis: bool,
    ) -> Option<Self> {
        let point = series.data.get(point_index)?;
        let category = match categories {
            Categories::Flat(names) => names.get(point_index).map(|name| TooltipCategory {
                name: name.clone(),
                parent: None,
            }),
            Categories::Grouped(groups) => groups
                .iter()
                .flat_map(|g| {
                    g.categories.iter().map(move |child| TooltipCategory {
                        name: child.clone(),
                        parent: Some(g.name.clone()),
                    })
                })
                .nth(point_index),
            Categories::Grid(_) => None,
        };

        let mut tooltip = TooltipPoint {
            series_name: series.name.clone(),
            name: point.name().map(str::to_string),
            category,
            opposite_axis,
            series_format: series.data_labels.as_ref().map(|d| d.format_gd.clone()),
            ..TooltipPoint::default()
        };
        match point {
            DataPoint::Category(p) => {
                tooltip.x = Some(point_index as f64);
                tooltip.y = p.measure.get();
                tooltip.value = p.measure.get();
                tooltip.format = Some(p.format.clone());
            }
            DataPoint::Xy(p) => {
                tooltip.x = p.x;
                tooltip.y = p.y;
                tooltip.z = p.z;
                tooltip.format = p.format.clone();
            }
            DataPoint::HeatmapCell(p) => {
                tooltip.x = Some(p.x as f64);
                tooltip.y = Some(p.y as f64);
                tooltip.value = p.value;
            }
            DataPoint::TreemapNode(p) => {
                tooltip.x = p.x.map(|x| x as f64);
                tooltip.y = p.y.map(|y| y as f64);
                tooltip.value = p.value;
                tooltip.format = Some(p.format.clone());
                tooltip.leaf = Some(!p.is_root());
            }
        }
        Some(tooltip)
    }
}

/// Which tooltip layout a factory renders
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipKind {
    SingleAttribute,
    TwoAttributes,
    Xy,
    Heatmap,
    Treemap,
}

type TooltipFn = dyn Fn(&TooltipPoint, f64, Option<f64>) -> Option<String> + Send + Sync;

/// Renders tooltip markup for a point, given the maximal content width and the point's share
/// of its stack
#[derive(Clone)]
pub struct TooltipFactory {
    kind: TooltipKind,
    render: Arc<TooltipFn>,
}

impl TooltipFactory {
    fn new<F>(kind: TooltipKind, render: F) -> Self
    where
        F: Fn(&TooltipPoint, f64, Option<f64>) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            kind,
            render: Arc::new(render),
        }
    }

    pub fn kind(&self) -> TooltipKind {
        self.kind
    }

    pub fn render(&self, point: &TooltipPoint, max_width: f64, percentage: Option<f64>) -> Option<String> {
        (self.render)(point, max_width, percentage)
    }
}

impl fmt::Debug for TooltipFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipFactory").field("kind", &self.kind).finish()
    }
}

/// Factories compare by layout; the closures are derived from the same inputs
impl PartialEq for TooltipFactory {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// Rows of `[title, value]` as tooltip markup
pub fn render_tooltip_html(rows: &[[String; 2]], max_width: f64) -> String {
    let item_width = max_width - TOOLTIP_PADDING * 2.0;
    let title_style = format!("style=\"max-width: {}px;\"", item_width);
    rows.iter()
        .map(|[title, value]| {
            format!(
                "<div class=\"gd-viz-tooltip-item multiline-supported\">\
                 <span class=\"gd-viz-tooltip-title\" {style}>{title}</span>\
                 <div class=\"gd-viz-tooltip-value-wraper\" {style}>\
                 <span class=\"gd-viz-tooltip-value clamp-two-line\" {style}>{value}</span></div>\
                 <div class=\"gd-viz-tooltip-value-wraper\" {style}>\
                 <span class=\"gd-viz-tooltip-value-max-content\" {style}>{value}</span></div>\
                 </div>",
                style = title_style,
                title = title,
                value = value,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Shared inputs of every factory
#[derive(Clone)]
pub struct TooltipSettings {
    pub separators: Separators,
    pub stack_measures_to_percent: bool,
    pub dual_axis: bool,
    pub formatter: Arc<dyn NumberFormatter>,
}

impl fmt::Debug for TooltipSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TooltipSettings")
            .field("separators", &self.separators)
            .field("stack_measures_to_percent", &self.stack_measures_to_percent)
            .field("dual_axis", &self.dual_axis)
            .finish()
    }
}

impl TooltipSettings {
    fn value(&self, value: Option<f64>, format: Option<&str>) -> String {
        escape_html(&format_value(
            self.formatter.as_ref(),
            value,
            format.unwrap_or_default(),
            &self.separators,
        ))
    }

    /// Percent of the stack only on the primary axis of a percent-stacked chart
    fn point_value(&self, point: &TooltipPoint, percentage: Option<f64>) -> String {
        let right_axis = self.dual_axis && point.opposite_axis;
        match percentage {
            Some(percentage) if self.stack_measures_to_percent && !right_axis => {
                percent_formatter(percentage)
            }
            _ => self.value(point.y, point.format.as_deref()),
        }
    }
}

fn item_label(attribute: &AttributeHeader, index: Option<f64>) -> String {
    let name = index
        .filter(|i| *i >= 0.0)
        .and_then(|i| attribute.item(i as usize))
        .map(|item| item.name.as_str())
        .unwrap_or_default();
    escape_html(name)
}

/// Attribute inputs of the factories
#[derive(Debug, Clone, Default)]
pub struct TooltipAttributes {
    pub view_by: Option<AttributeHeader>,
    pub view_by_parent: Option<AttributeHeader>,
    pub stack_by: Option<AttributeHeader>,
    /// X, y and size measures of scatter and bubble charts
    pub xy_measures: [Option<MeasureDescriptor>; 3],
}

/// Pick the factory of a chart type
pub fn build_tooltip_factory(
    chart_type: ChartType,
    attributes: TooltipAttributes,
    settings: TooltipSettings,
    view_by_two_attributes: bool,
) -> TooltipFactory {
    match chart_type.capabilities().tooltip {
        TooltipLayout::Treemap => treemap_factory(attributes, settings),
        TooltipLayout::Xy => xy_factory(attributes, settings),
        TooltipLayout::Heatmap => heatmap_factory(attributes, settings),
        TooltipLayout::Category if view_by_two_attributes => two_attributes_factory(attributes, settings),
        TooltipLayout::Category => single_attribute_factory(chart_type, attributes, settings),
    }
}

fn single_attribute_factory(
    chart_type: ChartType,
    attributes: TooltipAttributes,
    settings: TooltipSettings,
) -> TooltipFactory {
    let alternating = chart_type.capabilities().multi_measure_alternating;
    TooltipFactory::new(TooltipKind::SingleAttribute, move |point, max_width, percentage| {
        let value = settings.point_value(point, percentage);
        let mut rows = vec![[escape_html(&point.series_name), value]];
        if let Some(view_by) = &attributes.view_by {
            let category = point
                .category
                .as_ref()
                .map(|c| c.name.as_str())
                .or(point.name.as_deref())
                .unwrap_or_default();
            rows.insert(0, [escape_html(&view_by.form_name), escape_html(category)]);
        } else if alternating {
            rows[0][0] = escape_html(point.name.as_deref().unwrap_or_default());
        }
        Some(render_tooltip_html(&rows, max_width))
    })
}

fn two_attributes_factory(attributes: TooltipAttributes, settings: TooltipSettings) -> TooltipFactory {
    TooltipFactory::new(TooltipKind::TwoAttributes, move |point, max_width, percentage| {
        let value = settings.point_value(point, percentage);
        let mut rows = vec![[escape_html(&point.series_name), value]];
        if let Some(category) = &point.category {
            if let Some(view_by) = &attributes.view_by {
                rows.insert(0, [escape_html(&view_by.form_name), escape_html(&category.name)]);
            }
            if let (Some(parent), Some(parent_name)) = (&attributes.view_by_parent, &category.parent) {
                rows.insert(0, [escape_html(&parent.form_name), escape_html(parent_name)]);
            }
        }
        Some(render_tooltip_html(&rows, max_width))
    })
}

fn xy_factory(attributes: TooltipAttributes, settings: TooltipSettings) -> TooltipFactory {
    TooltipFactory::new(TooltipKind::Xy, move |point, max_width, _| {
        let mut rows = Vec::new();
        if let Some(stack_by) = &attributes.stack_by {
            let name = point
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(&point.series_name);
            rows.push([escape_html(&stack_by.form_name), escape_html(name)]);
        }
        let coordinates = [point.x, point.y, point.z];
        for (measure, value) in attributes.xy_measures.iter().zip(coordinates) {
            if let Some(measure) = measure {
                rows.push([
                    escape_html(&measure.name),
                    settings.value(value, Some(&measure.format)),
                ]);
            }
        }
        Some(render_tooltip_html(&rows, max_width))
    })
}

fn heatmap_factory(attributes: TooltipAttributes, settings: TooltipSettings) -> TooltipFactory {
    TooltipFactory::new(TooltipKind::Heatmap, move |point, max_width, _| {
        let mut rows = vec![[
            escape_html(&point.series_name),
            settings.value(point.value, point.series_format.as_deref()),
        ]];
        if let Some(view_by) = &attributes.view_by {
            rows.insert(0, [escape_html(&view_by.form_name), item_label(view_by, point.x)]);
        }
        if let Some(stack_by) = &attributes.stack_by {
            rows.insert(0, [escape_html(&stack_by.form_name), item_label(stack_by, point.y)]);
        }
        Some(render_tooltip_html(&rows, max_width))
    })
}

fn treemap_factory(attributes: TooltipAttributes, settings: TooltipSettings) -> TooltipFactory {
    TooltipFactory::new(TooltipKind::Treemap, move |point, max_width, _| {
        if point.leaf == Some(false) {
            return None;
        }
        let value = settings.value(point.value, point.format.as_deref());
        let mut rows = Vec::new();
        if let Some(stack_by) = &attributes.stack_by {
            rows.push([escape_html(&stack_by.form_name), item_label(stack_by, point.y)]);
        }
        match &attributes.view_by {
            Some(view_by) => {
                rows.insert(0, [escape_html(&view_by.form_name), item_label(view_by, point.x)]);
                rows.push([escape_html(&point.series_name), value]);
            }
            None => {
                let category = point.category.as_ref().map(|c| c.name.as_str()).unwrap_or_default();
                rows.push([escape_html(category), value]);
            }
        }
        Some(render_tooltip_html(&rows, max_width))
    })
}
