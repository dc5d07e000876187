//! Test fixture generator for sheetflow.
//!
//! This binary writes the XLSX workbooks used by the integration tests and
//! benchmarks into `tests/fixtures/output`.

use anyhow::Result;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

const COUNTRIES: [&str; 12] = [
    "Norway",
    "Germany",
    "United States",
    "Sweden",
    "Netherlands",
    "Austria",
    "Switzerland",
    "France",
    "Italy",
    "Canada",
    "Japan",
    "South Korea",
];

fn main() -> Result<()> {
    let output_dir = Path::new("tests/fixtures/output");
    fs::create_dir_all(output_dir)?;

    println!("Generating test fixtures...\n");

    generate_medal_report(output_dir)?;
    generate_long_table(output_dir)?;
    generate_styled(output_dir)?;
    generate_multisheet(output_dir)?;
    generate_no_header(output_dir)?;

    // Error cases
    generate_empty(output_dir)?;
    generate_corrupt(output_dir)?;

    println!("\nAll fixtures generated successfully!");
    Ok(())
}

/// A titled medal table with a keyword header.
fn generate_medal_report(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("medal_report.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name("Medals")?;
    let bold = Format::new().set_bold();

    worksheet.write_string_with_format(0, 0, "Winter Games Medal Report", &bold)?;
    worksheet.write_string(1, 0, "Final standings after all events")?;

    for (col, name) in ["Rank", "Country", "Gold", "Silver", "Bronze", "Total", "Share"]
        .iter()
        .enumerate()
    {
        worksheet.write_string_with_format(3, col as u16, *name, &bold)?;
    }

    let total_medals: f64 = (0..COUNTRIES.len()).map(|i| 46.0 - 3.0 * i as f64).sum();
    for (i, country) in COUNTRIES.iter().enumerate() {
        let row = (i + 4) as u32;
        let total = 46.0 - 3.0 * i as f64;
        worksheet.write_number(row, 0, (i + 1) as f64)?;
        worksheet.write_string(row, 1, *country)?;
        worksheet.write_number(row, 2, (16 - i) as f64)?;
        worksheet.write_number(row, 3, (14 - i) as f64)?;
        worksheet.write_number(row, 4, (16 - i) as f64)?;
        worksheet.write_number(row, 5, total)?;
        worksheet.write_number(row, 6, total / total_medals)?;
    }

    workbook.save(&path)?;
    Ok(())
}

/// Several hundred rows with long notes, spanning many pages.
fn generate_long_table(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("long_table.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, "Year")?;
    worksheet.write_string(0, 1, "Country")?;
    worksheet.write_string(0, 2, "Total")?;
    worksheet.write_string(0, 3, "Notes")?;

    for i in 0..400u32 {
        let row = i + 1;
        worksheet.write_number(row, 0, (1924 + (i / 12) * 4) as f64)?;
        worksheet.write_string(row, 1, COUNTRIES[i as usize % COUNTRIES.len()])?;
        worksheet.write_number(row, 2, (i % 37) as f64 + 0.5)?;
        if i % 5 == 0 {
            worksheet.write_string(
                row,
                3,
                "Totals were revised after a review. Two events were held at a second venue.",
            )?;
        }
    }

    workbook.save(&path)?;
    Ok(())
}

/// Fills, font colors, bold and alignment on individual cells.
fn generate_styled(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("styled.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0x4472C4))
        .set_font_color(Color::White);
    let highlight = Format::new().set_background_color(Color::RGB(0xFFF2CC));
    let red = Format::new().set_font_color(Color::Red);
    let centered = Format::new().set_align(FormatAlign::Center);
    let bold = Format::new().set_bold();

    worksheet.write_string_with_format(0, 0, "Country", &header)?;
    worksheet.write_string_with_format(0, 1, "Rank", &header)?;
    worksheet.write_string_with_format(0, 2, "Total", &header)?;

    worksheet.write_string(1, 0, "Norway")?;
    worksheet.write_number_with_format(1, 1, 1.0, &centered)?;
    worksheet.write_number_with_format(1, 2, 37.0, &highlight)?;

    worksheet.write_string_with_format(2, 0, "Germany", &red)?;
    worksheet.write_number(2, 1, 2.0)?;
    worksheet.write_number(2, 2, 27.0)?;

    worksheet.write_string_with_format(3, 0, "Canada", &bold)?;
    worksheet.write_number(3, 1, 3.0)?;
    worksheet.write_number(3, 2, 26.0)?;

    workbook.save(&path)?;
    Ok(())
}

/// Three sheets for sheet selection tests.
fn generate_multisheet(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("multisheet.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();

    let sheet1 = workbook.add_worksheet().set_name("Summer")?;
    sheet1.write_string(0, 0, "Country")?;
    sheet1.write_string(0, 1, "Gold")?;
    sheet1.write_string(0, 2, "Total")?;
    for (i, country) in COUNTRIES.iter().take(6).enumerate() {
        let row = (i + 1) as u32;
        sheet1.write_string(row, 0, *country)?;
        sheet1.write_number(row, 1, (20 - i) as f64)?;
        sheet1.write_number(row, 2, (60 - 4 * i) as f64)?;
    }

    let sheet2 = workbook.add_worksheet().set_name("Winter")?;
    sheet2.write_string(0, 0, "Country")?;
    sheet2.write_string(0, 1, "Gold")?;
    sheet2.write_string(0, 2, "Total")?;
    for (i, country) in COUNTRIES.iter().rev().take(4).enumerate() {
        let row = (i + 1) as u32;
        sheet2.write_string(row, 0, *country)?;
        sheet2.write_number(row, 1, (10 - i) as f64)?;
        sheet2.write_number(row, 2, (25 - 3 * i) as f64)?;
    }

    workbook.add_worksheet().set_name("Blank")?;

    workbook.save(&path)?;
    Ok(())
}

/// A table without any keyword header; the densest early row is used.
fn generate_no_header(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("no_header.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet.write_string(0, 0, "Alpine")?;
    worksheet.write_string(0, 1, "Nordic")?;
    worksheet.write_string(0, 2, "Sliding")?;
    worksheet.write_string(0, 3, "Skating")?;
    for row in 1..=8u32 {
        for col in 0..4u16 {
            worksheet.write_number(row, col, (row * 10 + col as u32) as f64)?;
        }
    }

    workbook.save(&path)?;
    Ok(())
}

/// A workbook with one empty sheet.
fn generate_empty(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("empty.xlsx");
    println!("  Creating: {}", path.display());

    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    workbook.save(&path)?;
    Ok(())
}

/// Garbage bytes with an xlsx extension.
fn generate_corrupt(output_dir: &Path) -> Result<()> {
    let path = output_dir.join("corrupt.xlsx");
    println!("  Creating: {}", path.display());

    let mut file = File::create(&path)?;
    file.write_all(b"This is not a valid XLSX file. It's just garbage data.")?;
    Ok(())
}
