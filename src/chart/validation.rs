//! Advisory checks on built chart options
//!
//! Nothing here fails the pipeline: the caller decides whether to warn or refuse to render.

use super::options::ChartOptions;
use super::series::SeriesItem;
use crate::defaults::{self, ChartLimits};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub data_too_large: bool,
    pub has_negative_value: bool,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        !self.data_too_large && !self.has_negative_value
    }
}

/// Limits of the chart family, overridden field by field by the caller's limits
fn effective_limits(options: &ChartOptions, overrides: Option<&ChartLimits>) -> ChartLimits {
    let base = defaults::registry().limits(options.chart_type.capabilities().limits.key());
    match overrides {
        Some(o) => ChartLimits {
            series: o.series.or(base.series),
            categories: o.categories.or(base.categories),
            data_points: o.data_points.or(base.data_points),
        },
        None => base,
    }
}

fn within(count: usize, limit: Option<usize>) -> bool {
    limit.map(|limit| count <= limit).unwrap_or(true)
}

/// Data points that count towards the size limit; treemap roots are structure, not data
fn counted_points(series: &SeriesItem) -> usize {
    series.data.iter().filter(|p| !p.is_treemap_root()).count()
}

fn is_data_of_reasonable_size(options: &ChartOptions, limits: &ChartLimits) -> bool {
    let series = &options.data.series;
    within(series.len(), limits.series)
        && within(options.data.categories.count(), limits.categories)
        && series
            .iter()
            .all(|s| within(counted_points(s), limits.data_points))
}

/// True when any point has a negative `y` or `value`
pub fn is_negative_value_included(series: &[SeriesItem]) -> bool {
    series
        .iter()
        .flat_map(|s| s.data.iter())
        .any(|p| p.value().map(|v| v < 0.0).unwrap_or(false))
}

/// Check data size and negative values against the chart family's limits
pub fn validate(options: &ChartOptions, limits: Option<&ChartLimits>) -> ValidationResult {
    let limits = effective_limits(options, limits);
    let result = ValidationResult {
        data_too_large: !is_data_of_reasonable_size(options, &limits),
        has_negative_value: options.chart_type.capabilities().negative_values_unsupported
            && is_negative_value_included(&options.data.series),
    };
    if !result.is_valid() {
        log::debug!("Validation of {} chart: {:?}", options.chart_type, result);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::super::categories::Categories;
    use super::super::chart_type::ChartType;
    use super::super::options::{ChartData, ChartOptions};
    use super::super::points::{CategoryPoint, DataPoint, DrillState, MeasureValue, TreemapNode};
    use super::*;

    fn point(y: f64) -> DataPoint {
        DataPoint::Category(CategoryPoint {
            measure: MeasureValue::Y(Some(y)),
            name: String::new(),
            format: String::new(),
            color: None,
            legend_index: None,
            marker: None,
            drill: DrillState::default(),
        })
    }

    fn options(chart_type: ChartType, series: Vec<SeriesItem>, categories: usize) -> ChartOptions {
        ChartOptions {
            data: ChartData {
                series,
                categories: Categories::Flat((0..categories).map(|i| i.to_string()).collect()),
            },
            ..ChartOptions::empty(chart_type)
        }
    }

    #[test]
    fn test_pie_limits() {
        let one = options(ChartType::Pie, vec![SeriesItem::new("s", 0, vec![point(1.0)])], 20);
        assert!(validate(&one, None).is_valid());

        let too_many_categories = options(ChartType::Pie, vec![SeriesItem::new("s", 0, vec![])], 21);
        assert!(validate(&too_many_categories, None).data_too_large);

        let two_series = options(
            ChartType::Donut,
            vec![SeriesItem::new("a", 0, vec![]), SeriesItem::new("b", 1, vec![])],
            2,
        );
        assert!(validate(&two_series, None).data_too_large);
    }

    #[test]
    fn test_custom_limits_override_defaults() {
        let chart = options(
            ChartType::Column,
            vec![SeriesItem::new("s", 0, vec![point(1.0), point(2.0), point(3.0)])],
            3,
        );
        assert!(validate(&chart, None).is_valid());
        let limits = ChartLimits {
            data_points: Some(2),
            ..ChartLimits::default()
        };
        assert!(validate(&chart, Some(&limits)).data_too_large);
        let limits = ChartLimits {
            categories: Some(3),
            ..ChartLimits::default()
        };
        assert!(validate(&chart, Some(&limits)).is_valid());
    }

    #[test]
    fn test_negative_values_only_matter_for_some_types() {
        let series = vec![SeriesItem::new("s", 0, vec![point(-1.0), point(2.0)])];
        assert!(validate(&options(ChartType::Pie, series.clone(), 2), None).has_negative_value);
        assert!(!validate(&options(ChartType::Column, series, 2), None).has_negative_value);
    }

    #[test]
    fn test_treemap_roots_do_not_count() {
        let mut limits = ChartLimits {
            data_points: Some(1),
            ..ChartLimits::default()
        };
        let nodes = vec![
            DataPoint::TreemapNode(TreemapNode::root(0, "East", "#", "rgb(0,0,0)".to_string())),
            DataPoint::TreemapNode(TreemapNode::leaf(0, "A", Some(-2.0), (0, 0), "#", "rgb(0,0,0)".to_string())),
        ];
        let chart = options(ChartType::Treemap, vec![SeriesItem::new("s", 0, nodes)], 1);
        let result = validate(&chart, Some(&limits));
        assert!(!result.data_too_large);
        assert!(result.has_negative_value);

        limits.data_points = Some(0);
        assert!(validate(&chart, Some(&limits)).data_too_large);
    }
}
