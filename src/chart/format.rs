//! Number formatting, escaping and formatter tags
//!
//! Renderer callbacks (label and tooltip formatters) cannot be expressed as data, so the
//! renderer configuration carries a [`LabelFormatter`] tag in their place. A host resolves the
//! tag back to behaviour with [`LabelFormatter::from_tag`] and [`LabelFormatter::render`].

use crate::config::Separators;
use serde::{Deserialize, Serialize};

/// Format used when a measure carries none
pub const DEFAULT_FORMAT: &str = "#,##0.00";

/// Rendering of a missing value
pub const EMPTY_VALUE: &str = "-";

/// Formats numbers according to a measure format string
pub trait NumberFormatter: Send + Sync {
    fn format(&self, value: f64, format: &str, separators: &Separators) -> String;
}

/// Formatter supporting the common subset of measure formats
///
/// - `[...]` color and condition prefixes are removed
/// - only the first `;` section is used, the sign is always rendered as `-`
/// - `,` inside the number pattern enables thousands grouping
/// - `0` after `.` is a fixed decimal, `#` an optional one
/// - a `%` outside the number pattern multiplies the value by 100
/// - other text around the pattern (quotes and `\` removed) is kept as prefix/suffix
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNumberFormatter;

impl NumberFormatter for DefaultNumberFormatter {
    fn format(&self, value: f64, format: &str, separators: &Separators) -> String {
        if !value.is_finite() {
            return value.to_string();
        }
        let format = if format.trim().is_empty() {
            DEFAULT_FORMAT
        } else {
            format
        };
        let section = strip_conditions(format.split(';').next().unwrap_or_default());
        let Some(start) = section.find(['#', '0']) else {
            return clean_literal(&section);
        };
        let end = section[start..]
            .find(|c: char| !matches!(c, '#' | '0' | ',' | '.'))
            .map(|i| start + i)
            .unwrap_or(section.len());

        let prefix = clean_literal(&section[..start]);
        let suffix = clean_literal(&section[end..]);
        let pattern = &section[start..end];

        let value = if prefix.contains('%') || suffix.contains('%') {
            value * 100.0
        } else {
            value
        };

        let (int_pattern, frac_pattern) = pattern.split_once('.').unwrap_or((pattern, ""));
        let required = frac_pattern.chars().filter(|c| *c == '0').count();
        let optional = frac_pattern.chars().filter(|c| *c == '#').count();
        let fixed = format!("{:.*}", required + optional, value.abs());
        let (int_digits, frac_digits) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

        let mut frac = frac_digits.to_string();
        while frac.len() > required && frac.ends_with('0') {
            frac.pop();
        }

        let int_digits = if int_pattern.contains(',') {
            group_thousands(int_digits, &separators.thousand)
        } else {
            int_digits.to_string()
        };

        let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
        let sign = if value < 0.0 && !is_zero { "-" } else { "" };

        if frac.is_empty() {
            format!("{}{}{}{}", sign, prefix, int_digits, suffix)
        } else {
            format!(
                "{}{}{}{}{}{}",
                sign, prefix, int_digits, separators.decimal, frac, suffix
            )
        }
    }
}

/// Remove `[...]` segments
fn strip_conditions(format: &str) -> String {
    let mut out = String::with_capacity(format.len());
    let mut depth = 0usize;
    for c in format.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn clean_literal(text: &str) -> String {
    text.chars().filter(|c| *c != '"' && *c != '\\').collect()
}

fn group_thousands(digits: &str, separator: &str) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 * separator.len());
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(*c);
    }
    out
}

/// Format an optional value; missing values render as `-`
pub fn format_value(
    formatter: &dyn NumberFormatter,
    value: Option<f64>,
    format: &str,
    separators: &Separators,
) -> String {
    match value {
        Some(v) => formatter.format(v, format, separators),
        None => EMPTY_VALUE.to_string(),
    }
}

/// Share of a stacked total, as shown in percent-stacked tooltips
pub fn percent_formatter(value: f64) -> String {
    if value == 0.0 {
        "0%".to_string()
    } else {
        format!("{:.2}%", value)
    }
}

/// Axis label of a percent axis: the fraction scaled to percent
pub fn percent_axis_label(value: f64) -> String {
    let scaled = format!("{:.12}", value * 100.0)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string();
    let scaled = if scaled == "-0" { "0".to_string() } else { scaled };
    format!("{}%", scaled)
}

/// Escape text for embedding in markup
///
/// Entities already present are decoded first so that escaping twice is a no-op.
pub fn escape_html(text: &str) -> String {
    let decoded = unescape_html(text);
    let mut out = String::with_capacity(decoded.len());
    for c in decoded.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Escape only `<` and `>`, for names the renderer would otherwise parse as markup
pub fn escape_angle_brackets(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Formatter callback placeholders emitted into the renderer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelFormatter {
    /// Point value in the measure format
    Label,
    /// Share of the stack in percent
    PercentageLabel,
    /// Heatmap cell value in the series `formatGD`
    HeatmapLabel,
    /// Treemap root name
    TreemapLevel1,
    /// Treemap leaf value
    TreemapLevel2,
    /// Bubble value, hidden when the bubble lies outside the axis range
    BubbleLabel,
    /// Scatter point name
    ScatterLabel,
    /// Stack total
    StackLabel,
    /// Axis tick of a percent axis
    PercentAxis,
    /// Category label with overlap hiding
    OverlappingCategory,
    /// Parent category label with overlap hiding
    OverlappingParentCategory,
    /// Tooltip markup produced by the chart's tooltip factory
    Tooltip,
}

/// Data a label formatter may read from the point it labels
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelContext<'a> {
    pub value: Option<f64>,
    pub format: &'a str,
    pub percentage: Option<f64>,
    pub name: Option<&'a str>,
}

impl LabelFormatter {
    pub const ALL: [LabelFormatter; 12] = [
        LabelFormatter::Label,
        LabelFormatter::PercentageLabel,
        LabelFormatter::HeatmapLabel,
        LabelFormatter::TreemapLevel1,
        LabelFormatter::TreemapLevel2,
        LabelFormatter::BubbleLabel,
        LabelFormatter::ScatterLabel,
        LabelFormatter::StackLabel,
        LabelFormatter::PercentAxis,
        LabelFormatter::OverlappingCategory,
        LabelFormatter::OverlappingParentCategory,
        LabelFormatter::Tooltip,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            LabelFormatter::Label => "label",
            LabelFormatter::PercentageLabel => "percentageLabel",
            LabelFormatter::HeatmapLabel => "heatmapLabel",
            LabelFormatter::TreemapLevel1 => "treemapLevel1",
            LabelFormatter::TreemapLevel2 => "treemapLevel2",
            LabelFormatter::BubbleLabel => "bubbleLabel",
            LabelFormatter::ScatterLabel => "scatterLabel",
            LabelFormatter::StackLabel => "stackLabel",
            LabelFormatter::PercentAxis => "percentAxis",
            LabelFormatter::OverlappingCategory => "overlappingCategory",
            LabelFormatter::OverlappingParentCategory => "overlappingParentCategory",
            LabelFormatter::Tooltip => "tooltip",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.tag() == tag)
    }

    /// Render the label of one point; `None` hides the label
    ///
    /// The tooltip tag renders nothing here, tooltips come from the tooltip factory.
    pub fn render(
        &self,
        context: &LabelContext<'_>,
        formatter: &dyn NumberFormatter,
        separators: &Separators,
    ) -> Option<String> {
        match self {
            LabelFormatter::Label
            | LabelFormatter::HeatmapLabel
            | LabelFormatter::TreemapLevel2
            | LabelFormatter::BubbleLabel
            | LabelFormatter::StackLabel => context
                .value
                .map(|v| escape_html(&formatter.format(v, context.format, separators))),
            LabelFormatter::PercentageLabel => context
                .percentage
                .or(context.value)
                .map(percent_formatter),
            LabelFormatter::PercentAxis => context.value.map(percent_axis_label),
            LabelFormatter::TreemapLevel1
            | LabelFormatter::ScatterLabel
            | LabelFormatter::OverlappingCategory
            | LabelFormatter::OverlappingParentCategory => context.name.map(escape_html),
            LabelFormatter::Tooltip => None,
        }
    }
}

impl From<LabelFormatter> for serde_json::Value {
    fn from(formatter: LabelFormatter) -> Self {
        serde_json::Value::String(formatter.tag().to_string())
    }
}
