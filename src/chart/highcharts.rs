//! Final renderer configuration
//!
//! Chart options are built from the result, validated, then turned into the renderer
//! configuration: common template, type template and customization, merged in that order.

use super::customization::customized_configuration;
use super::drillability::HeaderPredicate;
use super::error::Result;
use super::merge::merge_all;
use super::options::{build_chart_options, ChartOptions};
use super::result_view::ResultView;
use super::templates::{common_template, type_template};
use super::tooltip::TooltipFactory;
use super::validation::{validate, ValidationResult};
use crate::config::ChartConfig;
use crate::defaults::ChartLimits;
use serde::Deserialize;
use serde_json::Value;

/// Host settings that do not belong to the chart config
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Passed through to the first x axis of stackable charts
    pub drill_config: Option<Value>,
    /// Overrides of the per-type validation limits
    pub limits: Option<ChartLimits>,
}

/// Renderer configuration plus what the host needs to render it
#[derive(Debug, Clone)]
pub struct HighchartsConfig {
    pub options: Value,
    /// Renders the markup behind the `tooltip` formatter tag
    pub tooltip: Option<TooltipFactory>,
    pub validation: ValidationResult,
}

/// Renderer configuration of already built chart options
pub fn renderer_configuration(
    options: &ChartOptions,
    config: &ChartConfig,
    drill_config: Option<&Value>,
) -> Result<Value> {
    let customized = customized_configuration(options, config, drill_config)?;
    Ok(merge_all([
        common_template(options.chart_type, config),
        type_template(options.chart_type),
        customized,
    ]))
}

/// Build the renderer configuration of a result with default render settings
pub fn build_highcharts_config(
    result: &ResultView,
    config: &ChartConfig,
    predicates: &[&dyn HeaderPredicate],
) -> Result<HighchartsConfig> {
    build_highcharts_config_with(result, config, predicates, &RenderSettings::default())
}

pub fn build_highcharts_config_with(
    result: &ResultView,
    config: &ChartConfig,
    predicates: &[&dyn HeaderPredicate],
    settings: &RenderSettings,
) -> Result<HighchartsConfig> {
    let options = build_chart_options(result, config, predicates)?;
    let validation = validate(&options, settings.limits.as_ref());
    if !validation.is_valid() {
        log::warn!(
            "{} chart failed validation (data too large: {}, negative values: {})",
            options.chart_type,
            validation.data_too_large,
            validation.has_negative_value
        );
    }
    let rendered = renderer_configuration(&options, config, settings.drill_config.as_ref())?;
    log::info!(
        "Renderer configuration built for {} chart with {} series",
        options.chart_type,
        options.data.series.len()
    );
    Ok(HighchartsConfig {
        options: rendered,
        tooltip: options.tooltip,
        validation,
    })
}
