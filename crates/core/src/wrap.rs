//! Text wrapping for table cells.
//!
//! Wrapping runs a chain of tiers, each a pure function with the same
//! signature: the whole string on one line, then sentence packing, then word
//! packing. Word packing hard-splits any word wider than the column by
//! character. The first tier whose lines all fit the column wins.

use crate::config::LayoutConfig;
use crate::metrics::{measure_or_estimate, FontFace, FontMetrics};
use tracing::trace;

/// Measurement context shared by the wrap tiers.
pub struct Measure<'a> {
    metrics: &'a dyn FontMetrics,
    face: FontFace,
    size: f32,
    /// Width available for text, padding already removed.
    pub available: f32,
}

impl<'a> Measure<'a> {
    pub fn new(metrics: &'a dyn FontMetrics, face: FontFace, size: f32, available: f32) -> Self {
        Self {
            metrics,
            face,
            size,
            available,
        }
    }

    pub fn width(&self, text: &str) -> f32 {
        measure_or_estimate(self.metrics, text, self.face, self.size)
    }

    pub fn fits(&self, text: &str) -> bool {
        self.width(text) <= self.available
    }
}

/// A wrapping strategy. `None` means the tier does not apply to the text.
pub type WrapTier = fn(&str, &Measure<'_>) -> Option<Vec<String>>;

/// Tiers in the order they are tried.
pub const WRAP_TIERS: [(&str, WrapTier); 3] = [
    ("whole", fits_whole),
    ("sentence", by_sentence),
    ("word", by_word),
];

/// Breaks cell text into lines that fit a column.
#[derive(Clone, Copy)]
pub struct TextWrapper<'a> {
    metrics: &'a dyn FontMetrics,
    padding_x: f32,
}

impl<'a> TextWrapper<'a> {
    pub fn new(config: &LayoutConfig, metrics: &'a dyn FontMetrics) -> Self {
        Self {
            metrics,
            padding_x: config.cell_padding_x,
        }
    }

    /// Width of `text` in points, estimated when the font cannot measure it.
    pub fn measure(&self, text: &str, face: FontFace, size: f32) -> f32 {
        measure_or_estimate(self.metrics, text, face, size)
    }

    /// Wrap `text` into a column of `column_width` points.
    ///
    /// Always returns at least one line; empty text yields a single empty
    /// line.
    pub fn wrap(&self, text: &str, column_width: f32, face: FontFace, size: f32) -> Vec<String> {
        if text.is_empty() {
            return vec![String::new()];
        }

        let measure = Measure::new(
            self.metrics,
            face,
            size,
            column_width - 2.0 * self.padding_x,
        );

        for (name, tier) in WRAP_TIERS {
            if let Some(lines) = tier(text, &measure) {
                if lines.iter().all(|line| measure.fits(line)) {
                    return lines;
                }
                trace!("Wrap tier '{}' overflowed {}pt", name, measure.available);
            }
        }

        // A single glyph is wider than the column.
        by_word(text, &measure).unwrap_or_else(|| vec![text.to_string()])
    }
}

/// The text unchanged, when it already fits.
pub fn fits_whole(text: &str, m: &Measure<'_>) -> Option<Vec<String>> {
    m.fits(text).then(|| vec![text.to_string()])
}

/// Greedily pack whole sentences onto lines. Applies only to text with at
/// least two sentences; a sentence wider than the column is word-wrapped on
/// its own lines.
pub fn by_sentence(text: &str, m: &Measure<'_>) -> Option<Vec<String>> {
    let sentences = split_sentences(text);
    if sentences.len() < 2 {
        return None;
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let candidate = if current.is_empty() {
            sentence.clone()
        } else {
            format!("{} {}", current, sentence)
        };

        if m.fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if m.fits(&sentence) {
            current = sentence;
        } else {
            lines.extend(by_word(&sentence, m).unwrap_or_default());
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    Some(lines)
}

/// Greedily pack space-separated words; words wider than the column are
/// split by character.
pub fn by_word(text: &str, m: &Measure<'_>) -> Option<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if m.fits(&candidate) {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if m.fits(word) {
            current = word.to_string();
        } else {
            lines.extend(split_to_fit(word, m));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }

    Some(lines)
}

/// Cut `text` into pieces at the last character that still fits. Every piece
/// holds at least one character, so the loop always terminates.
fn split_to_fit(text: &str, m: &Measure<'_>) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        // Byte offsets just past each character.
        let ends: Vec<usize> = rest
            .char_indices()
            .map(|(i, c)| i + c.len_utf8())
            .collect();

        // Prefix widths grow monotonically, so binary search the longest fit.
        let (mut lo, mut hi) = (0usize, ends.len());
        while lo < hi {
            let mid = (lo + hi + 1) / 2;
            if m.fits(&rest[..ends[mid - 1]]) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let take = ends[lo.max(1) - 1];

        pieces.push(rest[..take].to_string());
        rest = &rest[take..];
    }

    pieces
}

/// Split on runs of `.`, `!` and `?`, keeping each sentence's terminator.
/// Blank fragments are dropped.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        current.push(ch);
        if is_terminator(ch) {
            while let Some(&next) = chars.peek() {
                if !is_terminator(next) {
                    break;
                }
                current.push(next);
                chars.next();
            }
            push_sentence(&mut sentences, &current);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.trim_end_matches(is_terminator).trim().is_empty() {
        return;
    }
    sentences.push(trimmed.to_string());
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?')
}
