//! Drill interaction metadata
//!
//! Every point collects the headers it touches: its measure(s), the view-by attribute and item
//! (up to two nested levels), and the stack-by attribute and item. The point is drillable when
//! any of these headers satisfies any registered predicate. Drillable points carry the drill
//! intersection, built from the same headers in a different order.
//!
//! Precondition: the measure group is the last header of its dimension. Stacked charts and
//! measure-only pie-like charts recover the measure of a point as `point index % measure count`,
//! which only holds under that layout.

use super::chart_type::ChartType;
use super::result_view::{AttributeHeader, AttributeItem, DimensionHeader, MeasureDescriptor, ResultView};
use super::series::SeriesItem;
use super::points::DataPoint;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureRef {
    pub local_identifier: String,
    pub name: String,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormOf {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRef {
    pub local_identifier: String,
    pub name: String,
    pub form_of: FormOf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeItemRef {
    pub uri: String,
    pub name: String,
}

/// A header a point maps to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingHeader {
    MeasureHeaderItem(MeasureRef),
    AttributeHeader(AttributeRef),
    AttributeHeaderItem(AttributeItemRef),
}

impl From<&MeasureDescriptor> for MappingHeader {
    fn from(measure: &MeasureDescriptor) -> Self {
        MappingHeader::MeasureHeaderItem(MeasureRef {
            local_identifier: measure.local_id.clone(),
            name: measure.name.clone(),
            format: measure.format.clone(),
            identifier: measure.identifier.clone(),
        })
    }
}

impl From<&AttributeHeader> for MappingHeader {
    fn from(attribute: &AttributeHeader) -> Self {
        MappingHeader::AttributeHeader(AttributeRef {
            local_identifier: attribute.local_id.clone(),
            name: attribute.display_name.clone(),
            form_of: FormOf {
                name: attribute.form_name.clone(),
            },
            identifier: attribute.identifier.clone(),
        })
    }
}

impl From<&AttributeItem> for MappingHeader {
    fn from(item: &AttributeItem) -> Self {
        MappingHeader::AttributeHeaderItem(AttributeItemRef {
            uri: item.id.clone(),
            name: item.name.clone(),
        })
    }
}

/// One element of a drill intersection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrillIntersectionItem {
    pub header: MappingHeader,
}

/// Decides whether a header is drillable
pub trait HeaderPredicate: Send + Sync {
    fn matches(&self, header: &MappingHeader) -> bool;
}

impl<F> HeaderPredicate for F
where
    F: Fn(&MappingHeader) -> bool + Send + Sync,
{
    fn matches(&self, header: &MappingHeader) -> bool {
        self(header)
    }
}

/// Declarative predicates, as found in fixtures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum DrillPredicate {
    /// Measure or attribute with this local identifier
    LocalIdentifier(String),
    /// Measure or attribute with this identifier
    Identifier(String),
    /// Attribute item with this id
    Uri(String),
}

impl HeaderPredicate for DrillPredicate {
    fn matches(&self, header: &MappingHeader) -> bool {
        match (self, header) {
            (DrillPredicate::LocalIdentifier(id), MappingHeader::MeasureHeaderItem(m)) => {
                &m.local_identifier == id
            }
            (DrillPredicate::LocalIdentifier(id), MappingHeader::AttributeHeader(a)) => {
                &a.local_identifier == id
            }
            (DrillPredicate::Identifier(id), MappingHeader::MeasureHeaderItem(m)) => {
                m.identifier.as_ref() == Some(id)
            }
            (DrillPredicate::Identifier(id), MappingHeader::AttributeHeader(a)) => {
                a.identifier.as_ref() == Some(id)
            }
            (DrillPredicate::Uri(uri), MappingHeader::AttributeHeaderItem(item)) => &item.uri == uri,
            _ => false,
        }
    }
}

/// True when any predicate accepts the header
pub fn is_some_predicate_matched(predicates: &[&dyn HeaderPredicate], header: &MappingHeader) -> bool {
    predicates.iter().any(|p| p.matches(header))
}

/// Attribute descriptor and item at `index`
///
/// The descriptor is present whenever the attribute is; the item only when `index` points
/// at one of its items.
fn attribute_headers(
    attribute: Option<&AttributeHeader>,
    index: Option<usize>,
) -> (Option<MappingHeader>, Option<MappingHeader>) {
    match attribute {
        Some(attribute) => (
            Some(attribute.into()),
            index.and_then(|i| attribute.item(i)).map(MappingHeader::from),
        ),
        None => (None, None),
    }
}

/// True when every measure group is the last header of its dimension
pub fn measure_group_is_last(result: &ResultView) -> bool {
    result.dimensions.iter().all(|dimension| {
        match dimension
            .headers
            .iter()
            .position(|h| matches!(h, DimensionHeader::MeasureGroup(_)))
        {
            Some(position) => position + 1 == dimension.headers.len(),
            None => true,
        }
    })
}

pub struct DrillContext<'a> {
    pub result: &'a ResultView,
    pub predicates: &'a [&'a dyn HeaderPredicate],
    /// View-by child, view-by parent
    pub view_by: [Option<&'a AttributeHeader>; 2],
    pub stack_by: Option<&'a AttributeHeader>,
    pub chart_type: ChartType,
}

/// Decorate series with drill flags and intersections
///
/// Scatter points with a missing coordinate are dropped afterwards.
pub fn resolve_drillability(ctx: &DrillContext<'_>, series: Vec<SeriesItem>) -> Vec<SeriesItem> {
    if !measure_group_is_last(ctx.result) {
        log::warn!("Measure group is not the last header of its dimension; drill measures may be misattributed");
    }

    let measures = ctx.result.measure_group().unwrap_or_default();
    let [view_by_child, view_by_parent] = ctx.view_by;
    let chart_type = ctx.chart_type;
    let measures_only_alternating =
        chart_type.capabilities().multi_measure_alternating && view_by_child.is_none();
    let stacked_treemap = chart_type == ChartType::Treemap && ctx.stack_by.is_some();
    let cell_indexed = chart_type == ChartType::Heatmap || stacked_treemap;

    let resolved: Vec<SeriesItem> = series
        .into_iter()
        .enumerate()
        .map(|(series_index, mut item)| {
            let mut series_drillable = false;
            for (point_index, point) in item.data.iter_mut().enumerate() {
                let measure_headers: Vec<&MeasureDescriptor> = match chart_type {
                    ChartType::Scatter => measures.iter().take(2).collect(),
                    ChartType::Bubble => measures.iter().take(3).collect(),
                    _ if stacked_treemap => {
                        let DataPoint::TreemapNode(node) = &*point else {
                            continue;
                        };
                        if node.is_root() {
                            continue;
                        }
                        let measure_index = if view_by_child.is_some() {
                            0
                        } else {
                            node.parent
                                .as_deref()
                                .and_then(|p| p.parse::<usize>().ok())
                                .unwrap_or(0)
                        };
                        measures.get(measure_index).into_iter().collect()
                    }
                    _ => {
                        let measure_index = if ctx.stack_by.is_none() && !measures_only_alternating {
                            Some(series_index)
                        } else if measures.is_empty() {
                            None
                        } else {
                            Some(point_index % measures.len())
                        };
                        measure_index
                            .and_then(|i| measures.get(i))
                            .into_iter()
                            .collect()
                    }
                };

                let (cell_x, cell_y) = cell_indices(point);
                let view_by_index = if cell_indexed { cell_x } else { Some(point_index) };
                let stack_by_index = if chart_type == ChartType::Scatter {
                    view_by_index
                } else if cell_indexed {
                    cell_y
                } else {
                    Some(series_index)
                };

                let (stack_by_attribute, stack_by_item) = attribute_headers(ctx.stack_by, stack_by_index);
                let (child_attribute, child_item) = attribute_headers(view_by_child, view_by_index);
                let (parent_attribute, parent_item) = attribute_headers(view_by_parent, view_by_index);
                let measure_headers: Vec<MappingHeader> =
                    measure_headers.into_iter().map(MappingHeader::from).collect();

                // matching order: measures, then each attribute before its item
                let drilldown = measure_headers
                    .iter()
                    .chain(child_attribute.iter())
                    .chain(child_item.iter())
                    .chain(parent_attribute.iter())
                    .chain(parent_item.iter())
                    .chain(stack_by_attribute.iter())
                    .chain(stack_by_item.iter())
                    .any(|header| is_some_predicate_matched(ctx.predicates, header));

                let drill = point.drill_mut();
                drill.drilldown = drilldown;
                drill.drill_intersection = None;
                if drilldown {
                    // intersection order: measures, then each item before its attribute
                    let intersection = measure_headers
                        .into_iter()
                        .chain(child_item)
                        .chain(child_attribute)
                        .chain(parent_item)
                        .chain(parent_attribute)
                        .chain(stack_by_item)
                        .chain(stack_by_attribute)
                        .map(|header| DrillIntersectionItem { header })
                        .collect();
                    drill.drill_intersection = Some(intersection);
                    series_drillable = true;
                }
            }

            if chart_type == ChartType::Scatter {
                item.data.retain(|point| !point.has_null_coordinate());
            }
            item.is_drillable = series_drillable;
            item
        })
        .collect();

    log::debug!(
        "Drillable series: {}/{}",
        resolved.iter().filter(|s| s.is_drillable).count(),
        resolved.len()
    );
    resolved
}

/// (x, y) grid indices of heatmap cells and treemap leaves
fn cell_indices(point: &DataPoint) -> (Option<usize>, Option<usize>) {
    match point {
        DataPoint::HeatmapCell(cell) => (Some(cell.x), Some(cell.y)),
        DataPoint::TreemapNode(node) => (node.x, node.y),
        DataPoint::Category(_) | DataPoint::Xy(_) => (None, None),
    }
}
