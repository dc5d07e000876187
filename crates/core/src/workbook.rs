//! XLSX decoding via umya-spreadsheet.
//!
//! Cells are read into a [`Dataset`] and a [`StyleTable`], both addressed by
//! 0-based row and column so that dataset row `i` is the sheet's row `i + 1`.

use crate::error::{CellError, ConversionError, Result};
use crate::style::{RawCellStyle, RawColor, StyleSource};
use crate::value::{CellValue, Dataset};
use std::collections::HashMap;
use std::io::Cursor;
use tracing::debug;
use umya_spreadsheet::structs::{Color, Style};
use umya_spreadsheet::Spreadsheet;

/// A parsed workbook.
pub struct Workbook {
    spreadsheet: Spreadsheet,
    sheet_names: Vec<String>,
}

impl Workbook {
    /// Parse an XLSX workbook from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let cursor = Cursor::new(data);
        let spreadsheet = umya_spreadsheet::reader::xlsx::read_reader(cursor, true)
            .map_err(|e| ConversionError::SpreadsheetParse(e.to_string()))?;

        let sheet_names: Vec<String> = spreadsheet
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect();

        Ok(Self {
            spreadsheet,
            sheet_names,
        })
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Read the values and styles of one sheet.
    pub fn sheet(&self, index: usize) -> Result<Sheet> {
        let not_found = || ConversionError::SheetNotFound {
            index,
            available: self.sheet_names.len(),
        };
        let name = self.sheet_names.get(index).ok_or_else(not_found)?;
        let sheet = self
            .spreadsheet
            .get_sheet_by_name(name)
            .ok_or_else(not_found)?;

        let max_col = sheet.get_highest_column();
        let max_row = sheet.get_highest_row();

        let mut rows = Vec::with_capacity(max_row as usize);
        let mut styles = StyleTable::default();

        for row_idx in 1..=max_row {
            let mut cells = Vec::with_capacity(max_col as usize);
            for col_idx in 1..=max_col {
                let Some(cell) = sheet.get_cell((col_idx, row_idx)) else {
                    cells.push(CellValue::Empty);
                    continue;
                };

                cells.push(parse_value(&cell.get_value()));

                if let Some(style) = read_style(cell.get_style()) {
                    styles.insert((row_idx - 1) as usize, (col_idx - 1) as usize, style);
                }
            }
            rows.push(cells);
        }

        debug!(
            "Read sheet '{}': {} row(s) x {} column(s), {} styled cell(s)",
            name,
            max_row,
            max_col,
            styles.len()
        );

        Ok(Sheet {
            name: name.clone(),
            dataset: Dataset::new(rows),
            styles,
        })
    }
}

/// One worksheet's values and styles.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub name: String,
    pub dataset: Dataset,
    pub styles: StyleTable,
}

/// Raw styles of the styled cells of a sheet.
#[derive(Clone, Debug, Default)]
pub struct StyleTable {
    cells: HashMap<(usize, usize), RawCellStyle>,
}

impl StyleTable {
    pub fn insert(&mut self, row: usize, col: usize, style: RawCellStyle) {
        self.cells.insert((row, col), style);
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl StyleSource for StyleTable {
    fn style_of(
        &self,
        row: usize,
        col: usize,
    ) -> std::result::Result<Option<RawCellStyle>, CellError> {
        Ok(self.cells.get(&(row, col)).cloned())
    }
}

/// Empty strings are empty cells; text that reads as a finite number is a
/// number; anything else stays text.
fn parse_value(raw: &str) -> CellValue {
    if raw.is_empty() {
        return CellValue::Empty;
    }
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}

/// Theme slot Excel assigns to default body text ("Text 1").
const DEFAULT_TEXT_THEME: u32 = 1;

fn read_style(style: &Style) -> Option<RawCellStyle> {
    let (bold, font_color) = match style.get_font() {
        Some(font) => (
            Some(*font.get_bold()),
            raw_color(font.get_color()).filter(|color| !is_default_text(color)),
        ),
        None => (None, None),
    };

    let background = style
        .get_fill()
        .and_then(|fill| fill.get_pattern_fill())
        .and_then(|pattern| pattern.get_foreground_color())
        .and_then(raw_color);

    let horizontal = style
        .get_alignment()
        .map(|alignment| format!("{:?}", alignment.get_horizontal()).to_lowercase());

    let raw = RawCellStyle {
        background,
        font_color,
        bold,
        horizontal,
    };
    (raw != RawCellStyle::default()).then_some(raw)
}

/// Classify a colour by the attribute it was written with.
///
/// umya only exposes the `indexed` and `theme` attributes through getters
/// that default to 0, so a colour counts as indexed (or themed) when
/// re-setting that attribute leaves it unchanged.
fn raw_color(color: &Color) -> Option<RawColor> {
    if *color == Color::default() {
        return None;
    }

    let indexed = *color.get_indexed();
    if *color.clone().set_indexed(indexed) == *color {
        return Some(RawColor::indexed(indexed));
    }

    let theme = *color.get_theme_index();
    if *color.clone().set_theme_index(theme) == *color {
        return Some(RawColor::theme(theme));
    }

    let argb = color.get_argb();
    (!argb.is_empty()).then(|| RawColor::rgb(argb))
}

fn is_default_text(color: &RawColor) -> bool {
    color.rgb.is_none() && color.indexed.is_none() && color.theme == Some(DEFAULT_TEXT_THEME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::{Color, Format, FormatAlign};

    fn styled_workbook() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Medals").unwrap();

        let header = Format::new().set_bold();
        let highlight = Format::new().set_background_color(Color::RGB(0xFFFF00));
        let red = Format::new().set_font_color(Color::Red);
        let center = Format::new().set_align(FormatAlign::Center);

        sheet.write_string_with_format(0, 0, "Country", &header).unwrap();
        sheet.write_string_with_format(0, 1, "Rank", &header).unwrap();
        sheet.write_string_with_format(0, 2, "Total", &header).unwrap();
        sheet.write_string(1, 0, "Norway").unwrap();
        sheet.write_number(1, 1, 1.0).unwrap();
        sheet.write_number_with_format(1, 2, 37.0, &highlight).unwrap();
        sheet.write_string_with_format(2, 0, "Germany", &red).unwrap();
        sheet.write_number_with_format(2, 1, 2.0, &center).unwrap();
        sheet.write_number(2, 2, 0.25).unwrap();

        workbook.add_worksheet().set_name("Notes").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value(""), CellValue::Empty);
        assert_eq!(parse_value("12"), CellValue::Number(12.0));
        assert_eq!(parse_value("0.25"), CellValue::Number(0.25));
        assert_eq!(parse_value("Norway"), CellValue::text("Norway"));
        assert_eq!(parse_value("inf"), CellValue::text("inf"));
        assert_eq!(parse_value("NaN"), CellValue::text("NaN"));
    }

    #[test]
    fn test_sheet_names() {
        let workbook = Workbook::from_bytes(&styled_workbook()).unwrap();
        assert_eq!(workbook.sheet_count(), 2);
        assert_eq!(workbook.sheet_names(), ["Medals", "Notes"]);
    }

    #[test]
    fn test_values_use_zero_based_indices() {
        let workbook = Workbook::from_bytes(&styled_workbook()).unwrap();
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(sheet.name, "Medals");
        assert_eq!(sheet.dataset.len(), 3);
        assert_eq!(sheet.dataset.cell(0, 0), &CellValue::text("Country"));
        assert_eq!(sheet.dataset.cell(1, 2), &CellValue::Number(37.0));
        assert_eq!(sheet.dataset.cell(2, 2), &CellValue::Number(0.25));
    }

    #[test]
    fn test_styles_are_read() {
        let workbook = Workbook::from_bytes(&styled_workbook()).unwrap();
        let sheet = workbook.sheet(0).unwrap();

        let header = sheet.styles.style_of(0, 1).unwrap().unwrap();
        assert_eq!(header.bold, Some(true));

        let highlight = sheet.styles.style_of(1, 2).unwrap().unwrap();
        let rgb = highlight.background.and_then(|c| c.rgb).unwrap();
        assert!(rgb.ends_with("FFFF00"), "{}", rgb);

        let red = sheet.styles.style_of(2, 0).unwrap().unwrap();
        let rgb = red.font_color.and_then(|c| c.rgb).unwrap();
        assert!(rgb.ends_with("FF0000"), "{}", rgb);

        let centered = sheet.styles.style_of(2, 1).unwrap().unwrap();
        assert_eq!(centered.horizontal.as_deref(), Some("center"));
    }

    #[test]
    fn test_theme_background_is_read_as_theme_slot() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        let accent = Format::new().set_background_color(Color::Theme(4, 0));
        sheet.write_string_with_format(0, 0, "Country", &accent).unwrap();
        sheet.write_string(0, 1, "Rank").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let sheet = Workbook::from_bytes(&bytes).unwrap().sheet(0).unwrap();
        let style = sheet.styles.style_of(0, 0).unwrap().unwrap();
        assert_eq!(style.background, Some(RawColor::theme(4)));
        assert_eq!(style.font_color, None);
    }

    #[test]
    fn test_color_attributes() {
        use umya_spreadsheet::structs::Color as XlsxColor;

        assert_eq!(raw_color(&XlsxColor::default()), None);

        let mut indexed = XlsxColor::default();
        indexed.set_indexed(4);
        assert_eq!(raw_color(&indexed), Some(RawColor::indexed(4)));

        let mut first_slot = XlsxColor::default();
        first_slot.set_indexed(0);
        assert_eq!(raw_color(&first_slot), Some(RawColor::indexed(0)));

        let mut theme = XlsxColor::default();
        theme.set_theme_index(5).set_tint(-0.25);
        assert_eq!(raw_color(&theme), Some(RawColor::theme(5)));

        let mut rgb = XlsxColor::default();
        rgb.set_argb("FF123456");
        assert_eq!(raw_color(&rgb), Some(RawColor::rgb("FF123456")));
    }

    #[test]
    fn test_default_text_theme_is_not_a_font_color() {
        assert!(is_default_text(&RawColor::theme(DEFAULT_TEXT_THEME)));
        assert!(!is_default_text(&RawColor::theme(4)));
        assert!(!is_default_text(&RawColor::indexed(1)));
    }

    #[test]
    fn test_missing_sheet() {
        let workbook = Workbook::from_bytes(&styled_workbook()).unwrap();
        assert!(matches!(
            workbook.sheet(5),
            Err(ConversionError::SheetNotFound {
                index: 5,
                available: 2
            })
        ));
    }

    #[test]
    fn test_invalid_bytes() {
        assert!(matches!(
            Workbook::from_bytes(b"not a zip archive"),
            Err(ConversionError::SpreadsheetParse(_))
        ));
    }
}
