//! Category labels of the x axis (and the y axis for heatmaps)

use super::chart_type::ChartType;
use super::result_view::{AttributeHeader, MeasureDescriptor};
use serde::Serialize;

/// Labels of one parent item and its distinct children
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub name: String,
    pub categories: Vec<String>,
}

/// Shape of the categories depends on the chart family
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Categories {
    Flat(Vec<String>),
    /// Heatmap: x labels then y labels
    Grid([Vec<String>; 2]),
    /// Two view-by attributes: children grouped under their parent
    Grouped(Vec<CategoryGroup>),
}

impl Default for Categories {
    fn default() -> Self {
        Categories::Flat(Vec::new())
    }
}

impl Categories {
    /// Number of categories the validator counts
    ///
    /// Grouped categories count their children, heatmaps their longer axis.
    pub fn count(&self) -> usize {
        match self {
            Categories::Flat(names) => names.len(),
            Categories::Grid([x, y]) => x.len().max(y.len()),
            Categories::Grouped(groups) => groups.iter().map(|g| g.categories.len()).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Categories::Flat(names) => names.is_empty(),
            Categories::Grid([x, y]) => x.is_empty() && y.is_empty(),
            Categories::Grouped(groups) => groups.is_empty(),
        }
    }

    /// Reorder flat categories so that `order[i]` becomes position `i`
    ///
    /// Positions missing from the input are dropped. Other shapes are left alone.
    pub fn reorder(self, order: &[usize]) -> Self {
        match self {
            Categories::Flat(names) => Categories::Flat(
                order
                    .iter()
                    .filter_map(|&index| names.get(index).cloned())
                    .collect(),
            ),
            other => other,
        }
    }
}

fn names_or_blank(attribute: Option<&AttributeHeader>) -> Vec<String> {
    attribute
        .map(AttributeHeader::item_names)
        .unwrap_or_else(|| vec![String::new()])
}

/// Categories of a chart with at most one view-by attribute
pub fn build_categories(
    chart_type: ChartType,
    measures: &[MeasureDescriptor],
    view_by: Option<&AttributeHeader>,
    stack_by: Option<&AttributeHeader>,
) -> Categories {
    match chart_type {
        ChartType::Heatmap => Categories::Grid([names_or_blank(view_by), names_or_blank(stack_by)]),
        ChartType::Scatter => Categories::Flat(names_or_blank(stack_by)),
        ChartType::Bubble => Categories::Flat(vec![String::new()]),
        _ => match view_by {
            Some(view_by) => Categories::Flat(view_by.item_names()),
            // measure-only pie-like and treemap charts are labelled by measure
            None if chart_type.capabilities().multi_measure_alternating => {
                Categories::Flat(measures.iter().map(|m| m.name.clone()).collect())
            }
            None => Categories::default(),
        },
    }
}

/// Children grouped under consecutive parent items
///
/// A child position without a parent item joins the current group. Child names are distinct
/// within a group.
pub fn categories_for_two_attributes(child: &AttributeHeader, parent: &AttributeHeader) -> Categories {
    if parent.items.is_empty() {
        return Categories::Grouped(Vec::new());
    }

    let mut groups: Vec<(Option<&str>, CategoryGroup)> = Vec::new();
    for (index, item) in child.items.iter().enumerate() {
        let parent_item = parent.item(index);
        let starts_group = match (parent_item, groups.last()) {
            (_, None) => true,
            (Some(parent_item), Some((id, _))) => *id != Some(parent_item.id.as_str()),
            (None, Some(_)) => false,
        };
        if starts_group {
            let first = parent_item.or_else(|| parent.item(0));
            groups.push((
                first.map(|p| p.id.as_str()),
                CategoryGroup {
                    name: first.map(|p| p.name.clone()).unwrap_or_default(),
                    categories: Vec::new(),
                },
            ));
        }
        if let Some((_, group)) = groups.last_mut() {
            if !group.categories.contains(&item.name) {
                group.categories.push(item.name.clone());
            }
        }
    }
    Categories::Grouped(groups.into_iter().map(|(_, group)| group).collect())
}

#[cfg(test)]
mod tests {
    use super::super::result_view::fixtures::*;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_view_by_categories() {
        let product = attribute("a1", "Product", &["Computer", "Television"]);
        let categories = build_categories(ChartType::Column, &[], Some(&product), None);
        assert_eq!(
            categories,
            Categories::Flat(vec!["Computer".to_string(), "Television".to_string()])
        );
        assert_eq!(categories.count(), 2);
    }

    #[test]
    fn test_measure_only_categories() {
        let measures = vec![measure("m1", "Won", "#"), measure("m2", "Lost", "#")];
        assert_eq!(
            serde_json::to_value(build_categories(ChartType::Pie, &measures, None, None)).unwrap(),
            json!(["Won", "Lost"])
        );
        assert!(build_categories(ChartType::Column, &measures, None, None).is_empty());
    }

    #[test]
    fn test_heatmap_scatter_bubble_categories() {
        let region = attribute("s1", "Region", &["East", "West"]);
        assert_eq!(
            serde_json::to_value(build_categories(ChartType::Heatmap, &[], None, Some(&region))).unwrap(),
            json!([[""], ["East", "West"]])
        );
        assert_eq!(
            serde_json::to_value(build_categories(ChartType::Scatter, &[], None, None)).unwrap(),
            json!([""])
        );
        assert_eq!(
            serde_json::to_value(build_categories(ChartType::Bubble, &[], None, Some(&region))).unwrap(),
            json!([""])
        );
    }

    #[test]
    fn test_two_attribute_grouping() {
        let child = attribute("a2", "Status", &["Won", "Lost", "Won", "Lost"]);
        let single_parent = attribute("a1", "Department", &["Department"]);
        assert_eq!(
            serde_json::to_value(categories_for_two_attributes(&child, &single_parent)).unwrap(),
            json!([{"name": "Department", "categories": ["Won", "Lost"]}])
        );

        let mut parent = attribute("a1", "Region", &["East", "East", "West", "West"]);
        parent.items[1].id = parent.items[0].id.clone();
        parent.items[3].id = parent.items[2].id.clone();
        let categories = categories_for_two_attributes(&child, &parent);
        assert_eq!(
            serde_json::to_value(&categories).unwrap(),
            json!([
                {"name": "East", "categories": ["Won", "Lost"]},
                {"name": "West", "categories": ["Won", "Lost"]}
            ])
        );
        assert_eq!(categories.count(), 4);

        let empty = attribute("a1", "Region", &[]);
        assert!(categories_for_two_attributes(&child, &empty).is_empty());
    }

    #[test]
    fn test_reorder() {
        let categories = Categories::Flat(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(
            categories.reorder(&[2, 0, 1]),
            Categories::Flat(vec!["c".into(), "a".into(), "b".into()])
        );
    }
}
