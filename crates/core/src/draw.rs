//! Draw commands and the page stream they form.

use crate::metrics::FontFace;
use crate::style::Rgb;
use serde::{Deserialize, Serialize};

/// One drawing instruction. Coordinates are points from the bottom-left
/// corner of the page; text `y` is the baseline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    DrawLine {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        thickness: f32,
        color: Rgb,
    },
    DrawText {
        x: f32,
        y: f32,
        text: String,
        font: FontFace,
        size: f32,
        color: Rgb,
    },
}

impl DrawCommand {
    pub fn is_text(&self) -> bool {
        matches!(self, DrawCommand::DrawText { .. })
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            DrawCommand::DrawText { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A finished page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl Page {
    pub fn new(number: usize, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    /// Text of every text command, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(DrawCommand::text)
    }
}

/// The output of one layout run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PageStream {
    pub page_width: f32,
    pub page_height: f32,
    pub pages: Vec<Page>,
}

impl PageStream {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_json_is_tagged() {
        let cmd = DrawCommand::DrawLine {
            x1: 0.0,
            y1: 1.0,
            x2: 2.0,
            y2: 1.0,
            thickness: 0.5,
            color: Rgb::BLACK,
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["op"], "draw_line");
        assert_eq!(json["thickness"], 0.5);

        let text = DrawCommand::DrawText {
            x: 1.0,
            y: 2.0,
            text: "Rank".to_string(),
            font: FontFace::Bold,
            size: 9.0,
            color: Rgb::BLACK,
        };
        let json = serde_json::to_value(&text).unwrap();
        assert_eq!(json["op"], "draw_text");
        assert_eq!(json["font"], "bold");
    }

    #[test]
    fn test_page_texts() {
        let mut page = Page::new(1, 100.0, 100.0);
        page.push(DrawCommand::FillRect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
            color: Rgb::WHITE,
        });
        page.push(DrawCommand::DrawText {
            x: 0.0,
            y: 0.0,
            text: "a".to_string(),
            font: FontFace::Regular,
            size: 8.0,
            color: Rgb::BLACK,
        });
        assert_eq!(page.texts().collect::<Vec<_>>(), vec!["a"]);
    }
}
