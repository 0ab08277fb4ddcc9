//! Color assignment for series and points
//!
//! A [`ColorStrategy`] answers two questions: which CSS color goes with a legend index, and
//! which header (measure or attribute item) received which palette entry. The strategy is
//! picked per chart type by [`create_color_strategy`].

use super::chart_type::ChartType;
use super::palettes::{palette_colors, PALETTES};
use super::result_view::{AttributeHeader, ResultView};
use crate::config::{ChartConfig, ColorItem, ColorMappingItem, ColorPaletteItem, Rgb};
use crate::defaults;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Debug;

pub const GRAY: &str = "rgb(201,213,223)";
pub const WHITE: &str = "rgb(255,255,255)";
pub const TRANSPARENT: &str = "transparent";

/// Base color of the default heatmap palette
pub const DEFAULT_HEATMAP_BLUE_COLOR: Rgb = Rgb::new(0, 110, 145);

/// Number of shades generated for a custom heatmap color
const HEATMAP_SHADES: usize = 6;

/// Which header received which color
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorAssignment {
    /// Measure local id or attribute item id
    pub id: String,
    pub name: String,
    pub color: ColorItem,
}

pub trait ColorStrategy: Debug + Send + Sync {
    /// Color of the series or point at `index`
    fn color_by_index(&self, index: usize) -> String;

    fn color_assignment(&self) -> &[ColorAssignment];
}

/// Strategy backed by a precomputed list of CSS colors
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteColorStrategy {
    palette: Vec<String>,
    assignment: Vec<ColorAssignment>,
}

impl PaletteColorStrategy {
    pub fn new(palette: Vec<String>, assignment: Vec<ColorAssignment>) -> Self {
        Self {
            palette,
            assignment,
        }
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }
}

impl ColorStrategy for PaletteColorStrategy {
    fn color_by_index(&self, index: usize) -> String {
        if self.palette.is_empty() {
            return GRAY.to_string();
        }
        self.palette[index % self.palette.len()].clone()
    }

    fn color_assignment(&self) -> &[ColorAssignment] {
        &self.assignment
    }
}

/// Custom palette from the config, or the embedded default palette with index guids
pub fn effective_palette(config: &ChartConfig) -> Vec<ColorPaletteItem> {
    if let Some(palette) = config.color_palette.as_ref().filter(|p| !p.is_empty()) {
        return palette.clone();
    }
    let name = defaults::get_string("colorPalette", None);
    palette_colors(&name)
        .into_iter()
        .enumerate()
        .map(|(i, fill)| ColorPaletteItem {
            guid: i.to_string(),
            fill,
        })
        .collect()
}

/// Palette entry with the given guid, else the entry at `index` (wrapping)
fn color_by_guid(palette: &[ColorPaletteItem], guid: &str, index: usize) -> Rgb {
    palette
        .iter()
        .find(|item| item.guid == guid)
        .or_else(|| palette.get(index % palette.len().max(1)))
        .map(|item| item.fill)
        .unwrap_or(DEFAULT_HEATMAP_BLUE_COLOR)
}

fn resolve_rgb(palette: &[ColorPaletteItem], color: &ColorItem, index: usize) -> Rgb {
    match color {
        ColorItem::Guid(guid) => color_by_guid(palette, guid, index),
        ColorItem::Rgb(rgb) => *rgb,
    }
}

/// A mapped color is usable when it is a literal or a guid present in the palette
fn is_valid_mapped_color(color: &ColorItem, palette: &[ColorPaletteItem]) -> bool {
    match color {
        ColorItem::Rgb(_) => true,
        ColorItem::Guid(guid) => palette.iter().any(|item| &item.guid == guid),
    }
}

fn mapped_color<'a>(id: &str, mapping: &'a [ColorMappingItem]) -> Option<&'a ColorItem> {
    mapping
        .iter()
        .find(|m| m.id == id)
        .map(|m| &m.color)
}

fn palette_guid(palette: &[ColorPaletteItem], index: usize) -> ColorItem {
    match palette.get(index % palette.len().max(1)) {
        Some(item) => ColorItem::Guid(item.guid.clone()),
        None => ColorItem::Rgb(DEFAULT_HEATMAP_BLUE_COLOR),
    }
}

/// Mapped color when valid, else the palette entry at `index`
fn assign(
    id: &str,
    name: &str,
    index: usize,
    palette: &[ColorPaletteItem],
    mapping: &[ColorMappingItem],
) -> ColorAssignment {
    let color = match mapped_color(id, mapping) {
        Some(color) if is_valid_mapped_color(color, palette) => color.clone(),
        _ => palette_guid(palette, index),
    };
    ColorAssignment {
        id: id.to_string(),
        name: name.to_string(),
        color,
    }
}

/// One color per unique attribute item
fn attribute_assignment(
    attribute: &AttributeHeader,
    palette: &[ColorPaletteItem],
    mapping: &[ColorMappingItem],
) -> Vec<ColorAssignment> {
    let mut seen = HashSet::new();
    attribute
        .items
        .iter()
        .filter(|item| seen.insert(item.id.as_str()))
        .enumerate()
        .map(|(index, item)| assign(&item.id, &item.name, index, palette, mapping))
        .collect()
}

fn measure_assignment(
    result: &ResultView,
    palette: &[ColorPaletteItem],
    mapping: &[ColorMappingItem],
) -> Vec<ColorAssignment> {
    result
        .measure_group()
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, measure)| assign(&measure.local_id, &measure.name, index, palette, mapping))
        .collect()
}

/// First measure only, shared by every point
fn single_measure_assignment(
    result: &ResultView,
    palette: &[ColorPaletteItem],
    mapping: &[ColorMappingItem],
) -> Vec<ColorAssignment> {
    measure_assignment(result, palette, mapping)
        .into_iter()
        .take(1)
        .collect()
}

fn css_palette(palette: &[ColorPaletteItem], assignment: &[ColorAssignment]) -> Vec<String> {
    assignment
        .iter()
        .enumerate()
        .map(|(index, a)| resolve_rgb(palette, &a.color, index).to_css())
        .collect()
}

/// Seven shades from white to the base color
pub fn heatmap_shades(base: Rgb) -> Vec<String> {
    if let Some(shades) = PALETTES.heatmap_shades(base) {
        if shades.len() == HEATMAP_SHADES + 1 {
            return shades.iter().map(Rgb::to_css).collect();
        }
    }
    let channels = [base.r, base.g, base.b];
    let steps = channels.map(|c| (255.0 - c as f64) / HEATMAP_SHADES as f64);
    let channel = |i: usize, index: usize| (channels[i] as f64 + index as f64 * steps[i]).trunc();
    let generated: Vec<String> = (1..HEATMAP_SHADES)
        .rev()
        .map(|index| {
            format!(
                "rgb({},{},{})",
                channel(0, index),
                channel(1, index),
                channel(2, index)
            )
        })
        .collect();

    let mut shades = Vec::with_capacity(HEATMAP_SHADES + 1);
    shades.push(WHITE.to_string());
    shades.extend(generated);
    shades.push(base.to_css());
    shades
}

fn heatmap_strategy(
    result: &ResultView,
    config: &ChartConfig,
    palette: &[ColorPaletteItem],
) -> PaletteColorStrategy {
    let measure = result.measure_group().and_then(|group| group.first());
    let (id, name) = measure
        .map(|m| (m.local_id.clone(), m.name.clone()))
        .unwrap_or_default();

    let color = match mapped_color(&id, &config.color_mapping) {
        Some(color) => color.clone(),
        None if config.has_custom_palette() => palette_guid(palette, 0),
        None => ColorItem::Rgb(DEFAULT_HEATMAP_BLUE_COLOR),
    };
    let base = resolve_rgb(palette, &color, 0);
    PaletteColorStrategy::new(heatmap_shades(base), vec![ColorAssignment { id, name, color }])
}

/// Pick the color strategy of a chart type
///
/// - heatmap: shades of one color
/// - treemap: view-by items, else measures
/// - scatter: the first measure's color for every point
/// - bubble: stack-by items, else the first measure's color
/// - stack-by present, or a point chart with attributes: attribute items
/// - otherwise: measures
pub fn create_color_strategy(
    chart_type: ChartType,
    config: &ChartConfig,
    view_by: Option<&AttributeHeader>,
    stack_by: Option<&AttributeHeader>,
    result: &ResultView,
) -> Box<dyn ColorStrategy> {
    let palette = effective_palette(config);
    let mapping = &config.color_mapping;

    if chart_type == ChartType::Heatmap {
        return Box::new(heatmap_strategy(result, config, &palette));
    }

    let assignment = match chart_type {
        ChartType::Treemap => match view_by {
            Some(attribute) => attribute_assignment(attribute, &palette, mapping),
            None => measure_assignment(result, &palette, mapping),
        },
        ChartType::Scatter => single_measure_assignment(result, &palette, mapping),
        ChartType::Bubble => match stack_by {
            Some(attribute) => attribute_assignment(attribute, &palette, mapping),
            None => single_measure_assignment(result, &palette, mapping),
        },
        _ => {
            let point_chart = matches!(
                chart_type,
                ChartType::Pie | ChartType::Donut | ChartType::Funnel
            );
            match stack_by.or(view_by) {
                Some(attribute) if stack_by.is_some() || (point_chart && result.has_attributes()) => {
                    attribute_assignment(attribute, &palette, mapping)
                }
                _ => measure_assignment(result, &palette, mapping),
            }
        }
    };

    let css = css_palette(&palette, &assignment);
    log::debug!(
        "Color strategy for {}: {} assignments",
        chart_type,
        assignment.len()
    );
    Box::new(PaletteColorStrategy::new(css, assignment))
}

/// Move every channel `percent` of the way towards white
///
/// Negative percentages darken. Unparseable colors are returned unchanged.
pub fn lighter_color(color: &str, percent: f64) -> String {
    match Rgb::from_css(color) {
        Some(rgb) => {
            let [r, g, b] = [rgb.r, rgb.g, rgb.b].map(|c| {
                let c = c as f64;
                (c + (255.0 - c) * percent).round().clamp(0.0, 255.0) as u8
            });
            Rgb::new(r, g, b).to_css()
        }
        None => {
            log::warn!("Cannot lighten unparseable color '{}'", color);
            color.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::result_view::fixtures::*;
    use super::super::result_view::DimensionHeader;
    use super::*;

    fn two_measures() -> ResultView {
        view(
            vec![DimensionHeader::MeasureGroup(vec![
                measure("m1", "Amount", "#,##0"),
                measure("m2", "Count", "#,##0"),
            ])],
            vec![],
            &[&["1"], &["2"]],
        )
    }

    #[test]
    fn test_lighter_color() {
        assert_eq!(lighter_color("rgb(0,0,0)", 0.5), "rgb(128,128,128)");
        assert_eq!(lighter_color("rgb(255,255,255)", 0.1), "rgb(255,255,255)");
        assert_eq!(lighter_color("#000000", 0.0), "rgb(0,0,0)");
        assert_eq!(lighter_color("rgb(100,100,100)", -0.5), "rgb(23,23,23)");
        assert_eq!(lighter_color("url(#pattern)", 0.2), "url(#pattern)");
    }

    #[test]
    fn test_measure_strategy_uses_palette_order() {
        let config = ChartConfig::of_type("column");
        let strategy = create_color_strategy(ChartType::Column, &config, None, None, &two_measures());
        assert_eq!(strategy.color_by_index(0), "rgb(20,178,226)");
        assert_eq!(strategy.color_by_index(1), "rgb(0,193,141)");
        assert_eq!(strategy.color_by_index(2), strategy.color_by_index(0));
        assert_eq!(strategy.color_assignment().len(), 2);
        assert_eq!(strategy.color_assignment()[1].id, "m2");
    }

    #[test]
    fn test_color_mapping_overrides() {
        let mut config = ChartConfig::of_type("column");
        config.color_mapping = vec![
            ColorMappingItem {
                id: "m2".to_string(),
                color: ColorItem::Rgb(Rgb::new(1, 2, 3)),
            },
            ColorMappingItem {
                id: "m1".to_string(),
                color: ColorItem::Guid("missing".to_string()),
            },
        ];
        let strategy = create_color_strategy(ChartType::Column, &config, None, None, &two_measures());
        assert_eq!(strategy.color_by_index(0), "rgb(20,178,226)");
        assert_eq!(strategy.color_by_index(1), "rgb(1,2,3)");
    }

    #[test]
    fn test_attribute_strategy_for_stack_by() {
        let stack = attribute("a1", "Region", &["East", "West", "East"]);
        let mut stack_unique = stack.clone();
        stack_unique.items[2].id = stack_unique.items[0].id.clone();
        let config = ChartConfig::of_type("bar");
        let strategy = create_color_strategy(
            ChartType::Bar,
            &config,
            None,
            Some(&stack_unique),
            &two_measures(),
        );
        assert_eq!(strategy.color_assignment().len(), 2);
        assert_eq!(strategy.color_assignment()[0].name, "East");
    }

    #[test]
    fn test_custom_palette() {
        let mut config = ChartConfig::of_type("pie");
        config.color_palette = Some(vec![
            ColorPaletteItem {
                guid: "red".to_string(),
                fill: Rgb::new(255, 0, 0),
            },
            ColorPaletteItem {
                guid: "green".to_string(),
                fill: Rgb::new(0, 255, 0),
            },
        ]);
        let strategy = create_color_strategy(ChartType::Pie, &config, None, None, &two_measures());
        assert_eq!(strategy.color_by_index(0), "rgb(255,0,0)");
        assert_eq!(strategy.color_by_index(1), "rgb(0,255,0)");
    }

    #[test]
    fn test_heatmap_default_shades() {
        let config = ChartConfig::of_type("heatmap");
        let strategy = create_color_strategy(ChartType::Heatmap, &config, None, None, &two_measures());
        assert_eq!(strategy.color_by_index(0), WHITE);
        assert_eq!(strategy.color_by_index(6), "rgb(0,110,145)");
        assert_eq!(strategy.color_by_index(7), WHITE);
    }

    #[test]
    fn test_heatmap_custom_shades() {
        let shades = heatmap_shades(Rgb::new(195, 135, 75));
        assert_eq!(shades.len(), 7);
        assert_eq!(shades[0], WHITE);
        assert_eq!(shades[1], "rgb(245,235,225)");
        assert_eq!(shades[5], "rgb(205,155,105)");
        assert_eq!(shades[6], "rgb(195,135,75)");
    }

    #[test]
    fn test_scatter_single_color() {
        let config = ChartConfig::of_type("scatter");
        let strategy = create_color_strategy(ChartType::Scatter, &config, None, None, &two_measures());
        assert_eq!(strategy.color_assignment().len(), 1);
        assert_eq!(strategy.color_by_index(3), "rgb(20,178,226)");
    }
}
