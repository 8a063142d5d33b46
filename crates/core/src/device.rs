//! Output devices for the content interpreter.
//!
//! The interpreter walks content streams and hands rendered text to a
//! [`Device`]; the device decides what to keep. [`TextDevice`] is the one
//! device shipped here: it assembles plain text, page by page.

use tracing::warn;

use crate::interp::TextState;
use crate::matrix::{Matrix, mat_apply, mat_mul};
use crate::page::Page;

/// One element of a show-text operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TextItem {
    /// Raw string bytes to decode through the current font.
    Show(Vec<u8>),
    /// A `TJ` position adjustment in thousandths of text space.
    Adjust(f64),
}

/// Receiver for interpreter output.
pub trait Device {
    fn begin_page(&mut self, _page: &Page, _ctm: Matrix) {}

    fn end_page(&mut self, _page: &Page) {}

    /// Called once per show-text operator with the text state at that
    /// point and the page's coordinate transform.
    fn render_string(&mut self, state: &TextState, items: &[TextItem], ctm: Matrix);
}

/// Baseline moves larger than this split lines.
const LINE_TOLERANCE: f64 = 0.5;

/// `TJ` adjustments at or below this count as a word gap.
const ADJUST_SPACE: f64 = -150.0;

/// Assembles the text of each page in content order.
///
/// A new line starts whenever the baseline y moves by more than
/// [`LINE_TOLERANCE`]; large negative `TJ` adjustments become single
/// spaces. Each finished page appends its lines and a final newline to
/// the accumulated output.
#[derive(Debug, Default)]
pub struct TextDevice {
    out: String,
    lines: Vec<String>,
    line: String,
    last_y: Option<f64>,
}

impl TextDevice {
    pub fn new() -> TextDevice {
        TextDevice::default()
    }

    /// The accumulated text of every page rendered so far.
    pub fn into_text(self) -> String {
        self.out
    }

    fn flush_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.line));
    }
}

impl Device for TextDevice {
    fn begin_page(&mut self, _page: &Page, _ctm: Matrix) {
        self.lines.clear();
        self.line.clear();
        self.last_y = None;
    }

    fn end_page(&mut self, _page: &Page) {
        self.flush_line();
        self.out.push_str(&self.lines.join("\n"));
        self.out.push('\n');
        self.lines.clear();
    }

    fn render_string(&mut self, state: &TextState, items: &[TextItem], ctm: Matrix) {
        let Some(font) = &state.font else {
            warn!("text shown with no font set");
            return;
        };
        let trm = mat_mul(state.matrix, ctm);
        let (_, y) = mat_apply(trm, (0.0, state.rise));
        if let Some(prev) = self.last_y
            && (y - prev).abs() > LINE_TOLERANCE
        {
            self.flush_line();
        }
        self.last_y = Some(y);

        for item in items {
            match item {
                TextItem::Show(bytes) => {
                    for cid in font.decode(bytes) {
                        match font.to_unicode(cid) {
                            Some(text) => {
                                for ch in text.chars().filter(|&ch| ch != '\0') {
                                    self.line.push(ch);
                                }
                            }
                            None => self.line.push_str(&format!("(cid:{cid})")),
                        }
                    }
                }
                TextItem::Adjust(amount) => {
                    if *amount <= ADJUST_SPACE
                        && !self.line.is_empty()
                        && !self.line.ends_with(' ')
                    {
                        self.line.push(' ');
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::font::Font;
    use crate::matrix::MATRIX_IDENTITY;
    use crate::object::Dict;

    fn blank_page() -> Page {
        Page {
            id: 1,
            attrs: Dict::new(),
            resources: Dict::new(),
            mediabox: (0.0, 0.0, 612.0, 792.0),
            rotate: 0,
            user_unit: 1.0,
        }
    }

    fn state_at(y: f64) -> TextState {
        TextState {
            font: Some(Arc::new(Font::fallback())),
            matrix: (1.0, 0.0, 0.0, 1.0, 72.0, y),
            ..TextState::default()
        }
    }

    #[test]
    fn test_lines_split_on_baseline_moves() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[TextItem::Show(b"Hello".to_vec())],
            MATRIX_IDENTITY,
        );
        dev.render_string(
            &state_at(650.0),
            &[TextItem::Show(b"world".to_vec())],
            MATRIX_IDENTITY,
        );
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "Hello\nworld\n");
    }

    #[test]
    fn test_small_baseline_wobble_stays_on_one_line() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[TextItem::Show(b"Hello ".to_vec())],
            MATRIX_IDENTITY,
        );
        dev.render_string(
            &state_at(700.3),
            &[TextItem::Show(b"world".to_vec())],
            MATRIX_IDENTITY,
        );
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "Hello world\n");
    }

    #[test]
    fn test_rise_offsets_the_baseline() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[TextItem::Show(b"x".to_vec())],
            MATRIX_IDENTITY,
        );
        let raised = TextState {
            rise: 4.0,
            ..state_at(700.0)
        };
        dev.render_string(&raised, &[TextItem::Show(b"2".to_vec())], MATRIX_IDENTITY);
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "x\n2\n");
    }

    #[test]
    fn test_adjust_becomes_word_gap() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[
                TextItem::Show(b"Hello".to_vec()),
                TextItem::Adjust(-250.0),
                TextItem::Show(b"world".to_vec()),
            ],
            MATRIX_IDENTITY,
        );
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "Hello world\n");
    }

    #[test]
    fn test_small_adjust_is_kerning() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[
                TextItem::Show(b"A".to_vec()),
                TextItem::Adjust(-80.0),
                TextItem::Show(b"V".to_vec()),
            ],
            MATRIX_IDENTITY,
        );
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "AV\n");
    }

    #[test]
    fn test_unmapped_code_renders_cid_marker() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[TextItem::Show(b"\x01".to_vec())],
            MATRIX_IDENTITY,
        );
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "(cid:1)\n");
    }

    #[test]
    fn test_missing_font_is_skipped() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        let state = TextState::default();
        dev.render_string(&state, &[TextItem::Show(b"Hello".to_vec())], MATRIX_IDENTITY);
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "\n");
    }

    #[test]
    fn test_each_page_ends_with_newline() {
        let mut dev = TextDevice::new();
        let page = blank_page();
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.render_string(
            &state_at(700.0),
            &[TextItem::Show(b"one".to_vec())],
            MATRIX_IDENTITY,
        );
        dev.end_page(&page);
        dev.begin_page(&page, MATRIX_IDENTITY);
        dev.end_page(&page);
        assert_eq!(dev.into_text(), "one\n\n");
    }
}
