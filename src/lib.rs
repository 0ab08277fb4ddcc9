//! Chart options library
//!
//! Builds chart options and Highcharts renderer configuration from execution results.
//! The `chart-options-dev` binary is a thin shell over this library.

pub mod chart;
pub mod config;
pub mod defaults;

pub use chart::{build_chart_options, build_highcharts_config, ChartError, ChartType, HighchartsConfig};
pub use config::ChartConfig;
