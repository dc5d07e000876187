//! Font metrics used for text measurement.
//!
//! The engine only needs advance widths. [`StandardFontMetrics`] carries the
//! AFM widths of the two standard PDF faces the encoder refers to by name, so
//! measured layout and the encoded PDF agree.

use crate::error::CellError;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The two faces used on a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFace {
    Regular,
    Bold,
}

impl FontFace {
    pub fn from_bold(bold: bool) -> Self {
        if bold {
            FontFace::Bold
        } else {
            FontFace::Regular
        }
    }

    pub fn is_bold(&self) -> bool {
        matches!(self, FontFace::Bold)
    }

    /// PDF base font name.
    pub fn base_font(&self) -> &'static str {
        match self {
            FontFace::Regular => "Helvetica",
            FontFace::Bold => "Helvetica-Bold",
        }
    }
}

/// Text width lookup.
pub trait FontMetrics: Send + Sync {
    /// Width in points of `text` set in `face` at `size`.
    fn text_width(&self, text: &str, face: FontFace, size: f32) -> Result<f32, CellError>;

    /// Advance assumed for a character that cannot be measured.
    fn fallback_advance(&self, _face: FontFace, size: f32) -> f32 {
        size
    }
}

/// Measure with `metrics`. Characters the font cannot measure are counted
/// at its fallback advance; the rest keep their real widths.
pub fn measure_or_estimate(
    metrics: &dyn FontMetrics,
    text: &str,
    face: FontFace,
    size: f32,
) -> f32 {
    match metrics.text_width(text, face, size) {
        Ok(width) => width,
        Err(err) => {
            trace!("Estimating unmeasurable glyphs: {}", err);
            let mut buf = [0u8; 4];
            text.chars()
                .map(|ch| {
                    metrics
                        .text_width(ch.encode_utf8(&mut buf), face, size)
                        .unwrap_or_else(|_| metrics.fallback_advance(face, size))
                })
                .sum()
        }
    }
}

/// WinAnsi code of `ch`, the encoding the PDF fonts are written in.
pub fn win_ansi_code(ch: char) -> Option<u8> {
    match ch {
        '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => Some(ch as u8),
        '\u{20ac}' => Some(0x80),
        '\u{2026}' => Some(0x85),
        '\u{2018}' => Some(0x91),
        '\u{2019}' => Some(0x92),
        '\u{201c}' => Some(0x93),
        '\u{201d}' => Some(0x94),
        '\u{2022}' => Some(0x95),
        '\u{2013}' => Some(0x96),
        '\u{2014}' => Some(0x97),
        '\u{2122}' => Some(0x99),
        _ => None,
    }
}

/// Helvetica advance widths (1/1000 em) for U+0020..=U+007E, WinAnsi glyphs.
#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths (1/1000 em) for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Helvetica widths for U+00A0..=U+00FF.
#[rustfmt::skip]
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Helvetica-Bold widths for U+00A0..=U+00FF.
#[rustfmt::skip]
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

/// Widths of the WinAnsi codes in 0x80..=0x9F that the encoder writes.
const HELVETICA_SPECIALS: [(u8, u16); 10] = [
    (0x80, 556),
    (0x85, 1000),
    (0x91, 222),
    (0x92, 222),
    (0x93, 333),
    (0x94, 333),
    (0x95, 350),
    (0x96, 556),
    (0x97, 1000),
    (0x99, 1000),
];

const HELVETICA_BOLD_SPECIALS: [(u8, u16); 10] = [
    (0x80, 556),
    (0x85, 1000),
    (0x91, 278),
    (0x92, 278),
    (0x93, 500),
    (0x94, 500),
    (0x95, 350),
    (0x96, 556),
    (0x97, 1000),
    (0x99, 1000),
];

struct FaceWidths {
    ascii: &'static [u16; 95],
    latin1: &'static [u16; 96],
    specials: &'static [(u8, u16); 10],
}

impl FaceWidths {
    fn of(face: FontFace) -> Self {
        match face {
            FontFace::Regular => Self {
                ascii: &HELVETICA,
                latin1: &HELVETICA_LATIN1,
                specials: &HELVETICA_SPECIALS,
            },
            FontFace::Bold => Self {
                ascii: &HELVETICA_BOLD,
                latin1: &HELVETICA_BOLD_LATIN1,
                specials: &HELVETICA_BOLD_SPECIALS,
            },
        }
    }

    fn widest(&self) -> u16 {
        self.ascii
            .iter()
            .chain(self.latin1.iter())
            .chain(self.specials.iter().map(|(_, width)| width))
            .copied()
            .max()
            .unwrap_or(1000)
    }
}

/// Widths of the standard Helvetica faces.
///
/// Every character with a WinAnsi code is measured. Anything else reports
/// [`CellError::Unmeasurable`] and is estimated at the face's widest glyph.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFontMetrics;

impl StandardFontMetrics {
    pub fn new() -> Self {
        Self
    }

    fn glyph_width(ch: char, face: FontFace) -> Option<u16> {
        let widths = FaceWidths::of(face);
        match win_ansi_code(ch)? {
            code @ 0x20..=0x7E => Some(widths.ascii[(code - 0x20) as usize]),
            code @ 0xA0..=0xFF => Some(widths.latin1[(code - 0xA0) as usize]),
            code => widths
                .specials
                .iter()
                .find(|(special, _)| *special == code)
                .map(|(_, width)| *width),
        }
    }
}

impl FontMetrics for StandardFontMetrics {
    fn text_width(&self, text: &str, face: FontFace, size: f32) -> Result<f32, CellError> {
        let mut units = 0u32;
        for ch in text.chars() {
            units += Self::glyph_width(ch, face).ok_or(CellError::Unmeasurable { ch })? as u32;
        }
        Ok(units as f32 * size / 1000.0)
    }

    fn fallback_advance(&self, face: FontFace, size: f32) -> f32 {
        FaceWidths::of(face).widest() as f32 * size / 1000.0
    }
}

/// Every character advances by the same fraction of the font size.
#[derive(Clone, Copy, Debug)]
pub struct FixedWidthMetrics {
    /// Advance per character in em.
    pub advance: f32,
}

impl FixedWidthMetrics {
    pub fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl FontMetrics for FixedWidthMetrics {
    fn text_width(&self, text: &str, _face: FontFace, size: f32) -> Result<f32, CellError> {
        Ok(text.chars().count() as f32 * self.advance * size)
    }
}
