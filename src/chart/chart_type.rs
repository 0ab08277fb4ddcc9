//! Chart type classification
//!
//! Every supported chart type maps to one static [`Capabilities`] bundle. The rest of the
//! pipeline asks the bundle instead of testing type membership ad hoc, so adding a type means
//! adding one row to the table below.

use super::error::{ChartError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Line,
    Area,
    Bar,
    Column,
    Pie,
    Donut,
    Funnel,
    Scatter,
    Bubble,
    Heatmap,
    Treemap,
    Combo,
    Bullet,
}

/// How the series builder shapes the raw matrix for a chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesLayout {
    /// One series per matrix row, one point per column
    Default,
    /// Single series of (column, row) cells
    Heatmap,
    /// Single series of x/y points
    Scatter,
    /// One series per row with a single x/y/z point
    Bubble,
    /// Default layout, or roots + leaves when a stack-by attribute is present
    Treemap,
    /// Primary, target and comparative series
    Bullet,
}

/// Which tooltip factory renders the chart's points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipLayout {
    /// Category (or parent/child category) + series value
    Category,
    /// Up to three measure/value rows
    Xy,
    /// Row + column attribute labels
    Heatmap,
    /// Leaves only
    Treemap,
}

/// Which default validation limits apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitsKind {
    Default,
    Scatter,
    Pie,
    Treemap,
    Heatmap,
}

impl LimitsKind {
    /// Key of the limits entry in the embedded defaults
    pub fn key(&self) -> &'static str {
        match self {
            LimitsKind::Default => "default",
            LimitsKind::Scatter => "scatter",
            LimitsKind::Pie => "pie",
            LimitsKind::Treemap => "treemap",
            LimitsKind::Heatmap => "heatmap",
        }
    }
}

/// Behaviour bundle of a chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Only many measures, or one measure with one attribute; points pick the measure and color
    pub multi_measure_alternating: bool,
    /// Cannot visually represent negative values
    pub negative_values_unsupported: bool,
    /// Points sorted descending by value
    pub sorted_by_measure: bool,
    /// Stack-by attribute does not imply stacking
    pub stacking_unsupported: bool,
    /// Measures may be split over a secondary axis
    pub dual_axes: bool,
    pub series: SeriesLayout,
    pub tooltip: TooltipLayout,
    pub limits: LimitsKind,
}

const fn caps(
    multi_measure_alternating: bool,
    sorted_by_measure: bool,
    stacking_unsupported: bool,
    dual_axes: bool,
    series: SeriesLayout,
    tooltip: TooltipLayout,
    limits: LimitsKind,
) -> Capabilities {
    Capabilities {
        multi_measure_alternating,
        // the same four types that alternate measures cannot show negatives
        negative_values_unsupported: multi_measure_alternating,
        sorted_by_measure,
        stacking_unsupported,
        dual_axes,
        series,
        tooltip,
        limits,
    }
}

use LimitsKind as L;
use SeriesLayout as S;
use TooltipLayout as T;

const LINE: Capabilities = caps(false, false, true, true, S::Default, T::Category, L::Default);
const AREA: Capabilities = caps(false, false, true, true, S::Default, T::Category, L::Default);
const BAR: Capabilities = caps(false, false, false, true, S::Default, T::Category, L::Default);
const COLUMN: Capabilities = caps(false, false, false, true, S::Default, T::Category, L::Default);
const PIE: Capabilities = caps(true, true, false, false, S::Default, T::Category, L::Pie);
const FUNNEL: Capabilities = caps(true, true, false, false, S::Default, T::Category, L::Pie);
const SCATTER: Capabilities = caps(false, false, true, false, S::Scatter, T::Xy, L::Scatter);
const BUBBLE: Capabilities = caps(false, false, true, false, S::Bubble, T::Xy, L::Default);
const HEATMAP: Capabilities = caps(false, false, false, false, S::Heatmap, T::Heatmap, L::Heatmap);
const TREEMAP: Capabilities = caps(true, false, false, false, S::Treemap, T::Treemap, L::Treemap);
const COMBO: Capabilities = caps(false, false, false, true, S::Default, T::Category, L::Default);
const BULLET: Capabilities = caps(false, false, false, false, S::Bullet, T::Category, L::Default);

impl ChartType {
    /// All supported chart types, in the order they are listed in error messages
    pub const ALL: [ChartType; 13] = [
        ChartType::Line,
        ChartType::Area,
        ChartType::Bar,
        ChartType::Column,
        ChartType::Pie,
        ChartType::Donut,
        ChartType::Funnel,
        ChartType::Scatter,
        ChartType::Bubble,
        ChartType::Heatmap,
        ChartType::Treemap,
        ChartType::Combo,
        ChartType::Bullet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Bar => "bar",
            ChartType::Column => "column",
            ChartType::Pie => "pie",
            ChartType::Donut => "donut",
            ChartType::Funnel => "funnel",
            ChartType::Scatter => "scatter",
            ChartType::Bubble => "bubble",
            ChartType::Heatmap => "heatmap",
            ChartType::Treemap => "treemap",
            ChartType::Combo => "combo",
            ChartType::Bullet => "bullet",
        }
    }

    pub fn capabilities(&self) -> &'static Capabilities {
        match self {
            ChartType::Line => &LINE,
            ChartType::Area => &AREA,
            ChartType::Bar => &BAR,
            ChartType::Column => &COLUMN,
            ChartType::Pie | ChartType::Donut => &PIE,
            ChartType::Funnel => &FUNNEL,
            ChartType::Scatter => &SCATTER,
            ChartType::Bubble => &BUBBLE,
            ChartType::Heatmap => &HEATMAP,
            ChartType::Treemap => &TREEMAP,
            ChartType::Combo => &COMBO,
            ChartType::Bullet => &BULLET,
        }
    }

    /// Parse a chart type, failing with the list of supported types
    ///
    /// `combo2` is the legacy name of the combo chart and resolves to [`ChartType::Combo`].
    pub fn parse(value: Option<&str>) -> Result<Self> {
        let raw = value.unwrap_or_default();
        let found = match raw {
            "combo2" => Some(ChartType::Combo),
            other => Self::ALL.iter().copied().find(|t| t.as_str() == other),
        };
        found.ok_or_else(|| ChartError::UnsupportedChartType {
            chart_type: if raw.is_empty() {
                "undefined".to_string()
            } else {
                raw.to_string()
            },
            supported: Self::supported_list(),
        })
    }

    /// Comma separated list of supported types
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_line_family(&self) -> bool {
        matches!(
            self,
            ChartType::Line | ChartType::Area | ChartType::Scatter | ChartType::Bubble
        )
    }

    pub fn is_scatter_or_bubble(&self) -> bool {
        matches!(self, ChartType::Scatter | ChartType::Bubble)
    }

    pub fn is_pie_like(&self) -> bool {
        matches!(self, ChartType::Pie | ChartType::Donut)
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_supported_types() {
        for chart_type in ChartType::ALL {
            assert_eq!(ChartType::parse(Some(chart_type.as_str())).unwrap(), chart_type);
        }
        assert_eq!("combo2".parse::<ChartType>().unwrap(), ChartType::Combo);
    }

    #[test]
    fn test_unsupported_type_lists_supported() {
        let err = ChartType::parse(Some("radar")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("got: radar"));
        assert!(message.contains("line, area, bar, column"));
        assert!(message.contains("bullet"));

        let err = ChartType::parse(None).unwrap_err();
        assert!(err.to_string().contains("got: undefined"));
    }

    #[test]
    fn test_type_groups() {
        let multi: Vec<_> = ChartType::ALL
            .into_iter()
            .filter(|t| t.capabilities().multi_measure_alternating)
            .collect();
        assert_eq!(
            multi,
            vec![
                ChartType::Pie,
                ChartType::Donut,
                ChartType::Funnel,
                ChartType::Treemap
            ]
        );

        let negative: Vec<_> = ChartType::ALL
            .into_iter()
            .filter(|t| t.capabilities().negative_values_unsupported)
            .collect();
        assert_eq!(negative, multi);

        let sorted: Vec<_> = ChartType::ALL
            .into_iter()
            .filter(|t| t.capabilities().sorted_by_measure)
            .collect();
        assert_eq!(
            sorted,
            vec![ChartType::Pie, ChartType::Donut, ChartType::Funnel]
        );

        let no_stacking: Vec<_> = ChartType::ALL
            .into_iter()
            .filter(|t| t.capabilities().stacking_unsupported)
            .collect();
        assert_eq!(
            no_stacking,
            vec![
                ChartType::Line,
                ChartType::Area,
                ChartType::Scatter,
                ChartType::Bubble
            ]
        );

        let dual: Vec<_> = ChartType::ALL
            .into_iter()
            .filter(|t| t.capabilities().dual_axes)
            .collect();
        assert_eq!(
            dual,
            vec![
                ChartType::Line,
                ChartType::Area,
                ChartType::Bar,
                ChartType::Column,
                ChartType::Combo
            ]
        );
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ChartType::Heatmap).unwrap();
        assert_eq!(json, "\"heatmap\"");
    }
}
