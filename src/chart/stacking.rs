//! Stacking policy

use super::chart_type::ChartType;
use super::series::SeriesItem;
use crate::config::ChartConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackingMode {
    Normal,
    Percent,
}

impl StackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackingMode::Normal => "normal",
            StackingMode::Percent => "percent",
        }
    }
}

/// Area charts stack unless told otherwise: `stackMeasures` wins, then `stacking`
pub fn is_area_stacking_enabled(chart_type: ChartType, config: &ChartConfig) -> bool {
    if chart_type != ChartType::Area {
        return false;
    }
    match config.stack_measures {
        Some(stack_measures) => stack_measures,
        None => config.stacking.unwrap_or(true),
    }
}

/// Whether a chart type offers the "stack measures" option
fn supports_stack_measures(chart_type: ChartType) -> bool {
    matches!(
        chart_type,
        ChartType::Column | ChartType::Bar | ChartType::Combo
    )
}

/// Decide the chart-level stacking mode
///
/// First match wins:
/// 1. line, area, scatter and bubble never stack, except area with stacking enabled
/// 2. a stack-by attribute stacks every type that supports stacking
/// 3. area with stacking enabled
/// 4. `stackMeasures` / `stackMeasuresToPercent` on column, bar and combo
/// 5. no stacking
pub fn resolve_stacking(
    chart_type: ChartType,
    has_stack_by: bool,
    config: &ChartConfig,
) -> Option<StackingMode> {
    let mode = if config.stack_measures_to_percent() {
        StackingMode::Percent
    } else {
        StackingMode::Normal
    };
    let area_stacking = is_area_stacking_enabled(chart_type, config);

    let resolved = if chart_type.capabilities().stacking_unsupported && !area_stacking {
        None
    } else if has_stack_by || area_stacking {
        Some(mode)
    } else if supports_stack_measures(chart_type)
        && (config.stack_measures() || config.stack_measures_to_percent())
    {
        Some(mode)
    } else {
        None
    };

    log::debug!("Stacking for {}: {:?}", chart_type, resolved);
    resolved
}

/// Stacking of one series
///
/// Secondary-axis series never stack to 100%, they fall back to normal stacking. Combo line
/// series do not stack at all.
pub fn series_stacking(
    mode: Option<StackingMode>,
    y_axis: usize,
    series_type: Option<&str>,
) -> Option<StackingMode> {
    if series_type == Some("line") {
        return None;
    }
    match mode {
        Some(StackingMode::Percent) if y_axis > 0 => Some(StackingMode::Normal),
        other => other,
    }
}

/// Apply the chart stacking to each series
pub fn apply_series_stacking(
    series: Vec<SeriesItem>,
    mode: Option<StackingMode>,
) -> Vec<SeriesItem> {
    series
        .into_iter()
        .map(|mut item| {
            item.stacking = series_stacking(mode, item.y_axis, item.series_type.as_deref());
            item
        })
        .collect()
}

/// Combo charts stack to 100% only when a primary-axis series is not a line
pub fn can_combo_stack_in_percent(series: &[SeriesItem]) -> bool {
    series
        .iter()
        .any(|s| s.y_axis == 0 && s.series_type.as_deref() != Some("line"))
}

/// Chart-level stacking of a combo chart once its series types are known
///
/// Without a non-line primary series nothing can stack to 100%; plain stacking survives only
/// when the user asked to stack measures.
pub fn combo_stacking(
    config: &ChartConfig,
    series: &[SeriesItem],
    default: Option<StackingMode>,
) -> Option<StackingMode> {
    if can_combo_stack_in_percent(series) {
        default
    } else if config.stack_measures() {
        Some(StackingMode::Normal)
    } else {
        None
    }
}
