//! Built-in color palettes
//!
//! palettes.json is embedded at compile time. It holds the named categorical palettes the
//! `colorPalette` default can pick from, and the hand-tuned shades of the default heatmap
//! color. Colors are written as CSS and checked when the file is loaded.

use crate::config::Rgb;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;

const PALETTES_JSON: &str = include_str!("../../palettes.json");

pub const DEFAULT_PALETTE: &str = "GoodData";

/// First color of the default palette, used when no palette has colors
const FALLBACK_COLOR: Rgb = Rgb::new(20, 178, 226);

pub static PALETTES: Lazy<Palettes> = Lazy::new(|| {
    Palettes::from_json(PALETTES_JSON).unwrap_or_else(|e| {
        log::warn!("Failed to load palettes.json: {}", e);
        Palettes::default()
    })
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
struct CssColor(Rgb);

impl TryFrom<String> for CssColor {
    type Error = String;

    fn try_from(css: String) -> Result<Self, Self::Error> {
        Rgb::from_css(&css)
            .map(CssColor)
            .ok_or_else(|| format!("unsupported color '{}'", css))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HeatmapShades {
    base: Option<CssColor>,
    #[serde(default)]
    shades: Vec<CssColor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Palettes {
    categorical: BTreeMap<String, Vec<CssColor>>,
    #[serde(default)]
    heatmap: HeatmapShades,
}

impl Palettes {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let palettes: Self = serde_json::from_str(json)?;
        log::debug!(
            "Loaded palettes [{}], {} heatmap shades",
            palettes.categorical.keys().cloned().collect::<Vec<_>>().join(", "),
            palettes.heatmap.shades.len()
        );
        Ok(palettes)
    }

    /// Colors of a non-empty palette, matching its name case-insensitively
    pub fn categorical(&self, name: &str) -> Option<Vec<Rgb>> {
        self.categorical
            .iter()
            .find(|(key, colors)| key.eq_ignore_ascii_case(name) && !colors.is_empty())
            .map(|(_, colors)| colors.iter().map(|c| c.0).collect())
    }

    /// Hand-tuned shades from white to `base`, if `base` has any
    pub fn heatmap_shades(&self, base: Rgb) -> Option<Vec<Rgb>> {
        match self.heatmap.base {
            Some(CssColor(known)) if known == base && !self.heatmap.shades.is_empty() => {
                Some(self.heatmap.shades.iter().map(|c| c.0).collect())
            }
            _ => None,
        }
    }
}

/// Colors of the named palette, else of the default one
pub fn palette_colors(name: &str) -> Vec<Rgb> {
    PALETTES
        .categorical(name)
        .or_else(|| {
            log::warn!("Unknown palette '{}', using '{}'", name, DEFAULT_PALETTE);
            PALETTES.categorical(DEFAULT_PALETTE)
        })
        .unwrap_or_else(|| vec![FALLBACK_COLOR])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_palettes() {
        let colors = PALETTES.categorical(DEFAULT_PALETTE).unwrap();
        assert_eq!(colors.len(), 20);
        assert_eq!(colors[0], FALLBACK_COLOR);
        assert_eq!(PALETTES.categorical("paired").unwrap()[0], Rgb::new(31, 120, 180));
    }

    #[test]
    fn test_unknown_palette_uses_default() {
        assert_eq!(palette_colors("nope"), palette_colors(DEFAULT_PALETTE));
    }

    #[test]
    fn test_heatmap_shades_only_for_known_base() {
        let shades = PALETTES.heatmap_shades(Rgb::new(0, 110, 145)).unwrap();
        assert_eq!(shades.len(), 7);
        assert_eq!(shades[0], Rgb::new(255, 255, 255));
        assert!(PALETTES.heatmap_shades(Rgb::new(1, 2, 3)).is_none());
    }

    #[test]
    fn test_bad_colors_are_rejected() {
        let err = Palettes::from_json(r#"{"categorical": {"X": ["blue"]}}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported color 'blue'"));

        let empty = Palettes::from_json(r#"{"categorical": {"X": []}}"#).unwrap();
        assert!(empty.categorical("X").is_none());
        assert!(empty.heatmap_shades(Rgb::new(0, 110, 145)).is_none());
    }
}
