//! Chart options pipeline
//!
//! Turns a tabular execution result plus a chart config into typed chart options, and those
//! into the renderer configuration.
//!
//! Structure:
//! - `options.rs`: `build_chart_options`, the data-shaping entry point
//! - `series.rs`, `points.rs`, `categories.rs`, `axes.rs`: the shaped data
//! - `colors.rs`, `palettes.rs`, `stacking.rs`, `drillability.rs`, `tooltip.rs`: policies
//! - `validation.rs`: advisory size and sign checks
//! - `customization.rs`, `zero_align.rs`, `templates.rs`, `merge.rs`: renderer configuration
//! - `highcharts.rs`: `build_highcharts_config`, the end-to-end entry point

pub mod axes;
pub mod categories;
pub mod chart_type;
pub mod colors;
pub mod customization;
pub mod drillability;
pub mod error;
pub mod format;
pub mod highcharts;
pub mod merge;
pub mod options;
pub mod palettes;
pub mod points;
pub mod result_view;
pub mod series;
pub mod stacking;
pub mod templates;
pub mod tooltip;
pub mod validation;
pub mod zero_align;

// Re-exports for convenience
pub use chart_type::ChartType;
pub use drillability::{DrillPredicate, HeaderPredicate};
pub use error::{ChartError, Result};
pub use highcharts::{build_highcharts_config, build_highcharts_config_with, HighchartsConfig, RenderSettings};
pub use options::{build_chart_options, ChartOptions};
pub use result_view::ResultView;
pub use validation::{validate, ValidationResult};
