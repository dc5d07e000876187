//! PDF encoding of page streams with lopdf.
//!
//! Text uses the standard Helvetica faces, which every PDF reader provides,
//! so nothing is embedded. The faces are registered as `F1` (regular) and
//! `F2` (bold) with WinAnsiEncoding.

use crate::draw::{DrawCommand, Page, PageStream};
use crate::error::{ConversionError, Result};
use crate::metrics::{win_ansi_code, FontFace};
use crate::style::Rgb;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

/// Serializes a [`PageStream`] into PDF bytes.
#[derive(Clone, Debug)]
pub struct PdfEncoder {
    title: Option<String>,
    compress: bool,
}

impl Default for PdfEncoder {
    fn default() -> Self {
        Self {
            title: None,
            compress: true,
        }
    }
}

impl PdfEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document title stored in the info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enable or disable Flate compression of content streams.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn encode(&self, stream: &PageStream) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(FontFace::Regular));
        let bold_id = doc.add_object(font_dictionary(FontFace::Bold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                font_resource(FontFace::Regular) => regular_id,
                font_resource(FontFace::Bold) => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(stream.pages.len());
        for page in &stream.pages {
            let page_id = self.add_page(&mut doc, page, pages_id, resources_id)?;
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Count" => kids.len() as i64,
                "Kids" => kids,
                "MediaBox" => media_box(stream.page_width, stream.page_height),
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal(concat!("sheetflow ", env!("CARGO_PKG_VERSION"))),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::string_literal(title.as_str()));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        if self.compress {
            doc.compress();
        }

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| ConversionError::PdfEncoding(e.to_string()))?;

        debug!(
            "Encoded {} page(s) into {} bytes of PDF",
            stream.pages.len(),
            buffer.len()
        );
        Ok(buffer)
    }

    fn add_page(
        &self,
        doc: &mut Document,
        page: &Page,
        pages_id: ObjectId,
        resources_id: ObjectId,
    ) -> Result<ObjectId> {
        let content = Content {
            operations: page_operations(page),
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

        Ok(doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box(page.width, page.height),
            "Contents" => content_id,
            "Resources" => resources_id,
        }))
    }
}

fn font_dictionary(face: FontFace) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

fn font_resource(face: FontFace) -> &'static str {
    match face {
        FontFace::Regular => "F1",
        FontFace::Bold => "F2",
    }
}

fn media_box(width: f32, height: f32) -> Vec<Object> {
    vec![0.into(), 0.into(), width.into(), height.into()]
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![color.r.into(), color.g.into(), color.b.into()]
}

/// Translate draw commands into content stream operators.
fn page_operations(page: &Page) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(page.commands.len() * 4);

    for command in &page.commands {
        match command {
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                ops.push(Operation::new("rg", color_operands(*color)));
                ops.push(Operation::new(
                    "re",
                    vec![(*x).into(), (*y).into(), (*width).into(), (*height).into()],
                ));
                ops.push(Operation::new("f", vec![]));
            }
            DrawCommand::DrawLine {
                x1,
                y1,
                x2,
                y2,
                thickness,
                color,
            } => {
                ops.push(Operation::new("RG", color_operands(*color)));
                ops.push(Operation::new("w", vec![(*thickness).into()]));
                ops.push(Operation::new("m", vec![(*x1).into(), (*y1).into()]));
                ops.push(Operation::new("l", vec![(*x2).into(), (*y2).into()]));
                ops.push(Operation::new("S", vec![]));
            }
            DrawCommand::DrawText {
                x,
                y,
                text,
                font,
                size,
                color,
            } => {
                ops.push(Operation::new("rg", color_operands(*color)));
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font_resource(*font).as_bytes().to_vec()), (*size).into()],
                ));
                ops.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi_bytes(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }

    ops
}

/// Encode text as WinAnsi. Characters without a WinAnsi code become `?`.
pub fn win_ansi_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| win_ansi_code(ch).unwrap_or(b'?'))
        .collect()
}
