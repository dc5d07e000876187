//! Cell style resolution.
//!
//! Raw style data arrives from a [`StyleSource`] as loosely populated
//! [`RawCellStyle`] records. [`StyleResolver`] turns each one into a
//! [`CellStyle`] exactly once; downstream code never inspects raw styles.

use crate::error::CellError;
use crate::format::looks_numeric;
use crate::value::CellValue;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Neutral gray with all channels set to `level`.
    pub fn gray(level: f32) -> Self {
        Self::new(level, level, level)
    }

    fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Parse `#RGB` or `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }

        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::from_bytes(r, g, b))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::from_bytes(r, g, b))
            }
            _ => None,
        }
    }

    /// Parse a spreadsheet `AARRGGBB` string; the alpha byte is ignored.
    /// Six-digit `RRGGBB` strings are accepted as well.
    pub fn from_argb(argb: &str) -> Option<Self> {
        let argb = argb.trim_start_matches('#');
        match argb.len() {
            8 if argb.is_ascii() => Self::from_hex(&argb[2..]),
            6 => Self::from_hex(argb),
            _ => None,
        }
    }
}

/// Color reference as stored by the spreadsheet, before palette lookup.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColor {
    /// Direct `AARRGGBB` / `RRGGBB` value.
    pub rgb: Option<String>,
    /// Theme color slot.
    pub theme: Option<u32>,
    /// Legacy indexed color slot.
    pub indexed: Option<u32>,
}

impl RawColor {
    pub fn rgb(value: impl Into<String>) -> Self {
        Self {
            rgb: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn theme(index: u32) -> Self {
        Self {
            theme: Some(index),
            ..Default::default()
        }
    }

    pub fn indexed(index: u32) -> Self {
        Self {
            indexed: Some(index),
            ..Default::default()
        }
    }
}

/// Style attributes as reported by the spreadsheet decoder. Every field is
/// optional because decoders omit what the file does not set.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCellStyle {
    pub background: Option<RawColor>,
    pub font_color: Option<RawColor>,
    pub bold: Option<bool>,
    /// Horizontal alignment keyword (`left`, `center`, `general`, ...).
    pub horizontal: Option<String>,
}

/// Style lookup keyed by 0-based source row and column.
pub trait StyleSource: Send + Sync {
    /// `Ok(None)` means the cell carries no style.
    fn style_of(&self, row: usize, col: usize) -> Result<Option<RawCellStyle>, CellError>;
}

/// A style source for datasets without any styling.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoStyles;

impl StyleSource for NoStyles {
    fn style_of(&self, _row: usize, _col: usize) -> Result<Option<RawCellStyle>, CellError> {
        Ok(None)
    }
}

const PALETTE_HEX: [&str; 16] = [
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "FF00FF", "00FFFF", "800000",
    "008000", "000080", "808000", "800080", "008080", "C0C0C0", "808080",
];

lazy_static! {
    static ref STANDARD_PALETTE: Arc<Palette> = Arc::new(Palette::from_hex_table(&PALETTE_HEX));
}

/// Fixed 16-entry color table used for both theme and indexed references.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    fn from_hex_table(table: &[&str]) -> Self {
        Self {
            colors: table
                .iter()
                .map(|hex| Rgb::from_hex(hex).unwrap_or(Rgb::BLACK))
                .collect(),
        }
    }

    /// The shared standard palette.
    pub fn standard() -> Arc<Palette> {
        Arc::clone(&STANDARD_PALETTE)
    }

    /// Look up a slot. Out-of-range slots resolve to black.
    pub fn get(&self, index: u32) -> Rgb {
        self.colors
            .get(index as usize)
            .copied()
            .unwrap_or(Rgb::BLACK)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Horizontal alignment of cell text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
    /// No explicit alignment; chosen from the content.
    #[default]
    Inherit,
}

impl HorizontalAlign {
    /// Map a spreadsheet alignment keyword.
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_ascii_lowercase().as_str() {
            "left" | "justify" | "fill" | "distributed" => HorizontalAlign::Left,
            "center" | "centercontinuous" => HorizontalAlign::Center,
            "right" => HorizontalAlign::Right,
            _ => HorizontalAlign::Inherit,
        }
    }
}

/// Resolved, read-only style for one cell.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CellStyle {
    pub background: Option<Rgb>,
    pub font_color: Option<Rgb>,
    pub bold: bool,
    pub alignment: HorizontalAlign,
}

impl CellStyle {
    /// Alignment used for drawing. Inherited alignment becomes right for
    /// numeric content and left otherwise.
    pub fn effective_alignment(&self, raw: &CellValue, text: &str) -> HorizontalAlign {
        match self.alignment {
            HorizontalAlign::Inherit => {
                if raw.is_number() || looks_numeric(text) {
                    HorizontalAlign::Right
                } else {
                    HorizontalAlign::Left
                }
            }
            explicit => explicit,
        }
    }
}

/// Resolves raw styles against a palette.
pub struct StyleResolver<'a> {
    source: &'a dyn StyleSource,
    palette: Arc<Palette>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(source: &'a dyn StyleSource, palette: Arc<Palette>) -> Self {
        Self { source, palette }
    }

    /// Resolve the style of a source cell. Lookup failures degrade to the
    /// default style.
    pub fn resolve(&self, row: usize, col: usize) -> CellStyle {
        match self.source.style_of(row, col) {
            Ok(Some(raw)) => self.resolve_raw(&raw),
            Ok(None) => CellStyle::default(),
            Err(err) => {
                debug!("Style degraded to defaults: {}", err);
                CellStyle::default()
            }
        }
    }

    pub fn resolve_raw(&self, raw: &RawCellStyle) -> CellStyle {
        CellStyle {
            background: raw.background.as_ref().and_then(|c| self.color(c)),
            font_color: raw.font_color.as_ref().and_then(|c| self.color(c)),
            bold: raw.bold.unwrap_or(false),
            alignment: raw
                .horizontal
                .as_deref()
                .map(HorizontalAlign::from_keyword)
                .unwrap_or_default(),
        }
    }

    /// Direct RGB first, then the theme slot, then the indexed slot.
    pub fn color(&self, color: &RawColor) -> Option<Rgb> {
        if let Some(rgb) = color.rgb.as_deref().filter(|s| !s.is_empty()) {
            return Rgb::from_argb(rgb);
        }
        if let Some(theme) = color.theme {
            return Some(self.palette.get(theme));
        }
        color.indexed.map(|indexed| self.palette.get(indexed))
    }
}
