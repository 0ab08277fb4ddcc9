//! Chart options - development entry point
//!
//! Reads a JSON fixture and prints the renderer configuration it produces. Handy for checking
//! what a given result and chart config turn into without a host application.
//!
//! Usage:
//! ```bash
//! cargo run --bin chart-options-dev -- fixture.json
//! cat fixture.json | RUST_LOG=debug cargo run --bin chart-options-dev
//! ```
//!
//! Fixture shape:
//! ```json
//! {
//!   "resultView": { "dimensions": [...], "data": [[...]] },
//!   "chartConfig": { "type": "column" },
//!   "drillPredicates": [{ "type": "localIdentifier", "value": "m1" }],
//!   "drillConfig": { ... },
//!   "limits": { "series": 100 }
//! }
//! ```

use anyhow::{Context, Result};
use chart_options::chart::{
    build_highcharts_config_with, DrillPredicate, HeaderPredicate, RenderSettings, ResultView,
};
use chart_options::config::ChartConfig;
use serde::Deserialize;
use serde_json::json;
use std::io::Read;
use std::time::Instant;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    result_view: ResultView,
    #[serde(default)]
    chart_config: ChartConfig,
    #[serde(default)]
    drill_predicates: Vec<DrillPredicate>,
    #[serde(flatten)]
    settings: RenderSettings,
}

fn read_input() -> Result<String> {
    match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read fixture '{}'", path)),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read fixture from stdin")?;
            Ok(input)
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let start = Instant::now();

    let input = read_input()?;
    let fixture: Fixture = serde_json::from_str(&input).context("Invalid fixture JSON")?;
    log::info!(
        "Fixture loaded: {} rows, chart type {:?}, {} drill predicates",
        fixture.result_view.two_dim_data().len(),
        fixture.chart_config.chart_type,
        fixture.drill_predicates.len()
    );

    let predicates: Vec<&dyn HeaderPredicate> = fixture
        .drill_predicates
        .iter()
        .map(|p| p as &dyn HeaderPredicate)
        .collect();
    let config = build_highcharts_config_with(
        &fixture.result_view,
        &fixture.chart_config,
        &predicates,
        &fixture.settings,
    )
    .context("Failed to build renderer configuration")?;

    let output = json!({
        "validation": config.validation,
        "options": config.options,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    log::info!("Done in {:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}
