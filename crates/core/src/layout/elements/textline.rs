//! Text lines: characters grouped along one baseline.

use crate::utils::{HasBBox, Rect};

use super::character::{LTAnno, LTChar};
use super::component::LTComponent;

/// Writing direction of a line, box or group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingMode {
    Horizontal,
    Vertical,
}

/// A character or an inferred space/newline inside a text line.
#[derive(Debug, Clone, PartialEq)]
pub enum TextLineElement {
    Char(LTChar),
    Anno(LTAnno),
}

impl TextLineElement {
    pub fn get_text(&self) -> &str {
        match self {
            TextLineElement::Char(c) => c.get_text(),
            TextLineElement::Anno(a) => a.get_text(),
        }
    }
}

/// A line of text in either writing mode.
#[derive(Debug, Clone, PartialEq)]
pub struct LTTextLine {
    pub(crate) component: LTComponent,
    mode: WritingMode,
    word_margin: f64,
    /// Trailing edge of the last character added: x1 for horizontal lines,
    /// y0 for vertical ones.
    tracker: Option<f64>,
    elements: Vec<TextLineElement>,
}

impl LTTextLine {
    pub fn new(mode: WritingMode, word_margin: f64) -> Self {
        Self {
            component: LTComponent::empty(),
            mode,
            word_margin,
            tracker: None,
            elements: Vec::new(),
        }
    }

    pub const fn mode(&self) -> WritingMode {
        self.mode
    }

    pub fn elements(&self) -> &[TextLineElement] {
        &self.elements
    }

    /// Append a character, inserting a word space when the gap to the
    /// previous one exceeds the word margin.
    pub fn add(&mut self, ch: LTChar) {
        let margin = self.word_margin * ch.width().max(ch.height());
        match self.mode {
            WritingMode::Horizontal => {
                if self.tracker.is_some_and(|x1| x1 < ch.x0() - margin) {
                    self.elements.push(TextLineElement::Anno(LTAnno::new(" ")));
                }
                self.tracker = Some(ch.x1());
            }
            WritingMode::Vertical => {
                if self.tracker.is_some_and(|y0| ch.y1() + margin < y0) {
                    self.elements.push(TextLineElement::Anno(LTAnno::new(" ")));
                }
                self.tracker = Some(ch.y0());
            }
        }
        self.component.expand(&ch);
        self.elements.push(TextLineElement::Char(ch));
    }

    /// Terminate the line with a newline.
    pub fn analyze(&mut self) {
        self.elements.push(TextLineElement::Anno(LTAnno::new("\n")));
    }

    pub fn get_text(&self) -> String {
        self.elements.iter().map(TextLineElement::get_text).collect()
    }

    /// True for a degenerate box or a line holding only whitespace.
    pub fn is_empty(&self) -> bool {
        self.component.is_empty() || self.get_text().chars().all(char::is_whitespace)
    }

    /// Whether `other` belongs in the same text box, given the search
    /// distance `d` derived from the line margin.
    pub fn is_neighbor(&self, other: &LTTextLine, d: f64) -> bool {
        if self.mode != other.mode {
            return false;
        }
        match self.mode {
            WritingMode::Horizontal => {
                (other.height() - self.height()).abs() <= d
                    && ((other.x0() - self.x0()).abs() <= d
                        || (other.x1() - self.x1()).abs() <= d
                        || ((other.x0() + other.x1()) - (self.x0() + self.x1())).abs() / 2.0 <= d)
            }
            WritingMode::Vertical => {
                (other.width() - self.width()).abs() <= d
                    && ((other.y0() - self.y0()).abs() <= d
                        || (other.y1() - self.y1()).abs() <= d
                        || ((other.y0() + other.y1()) - (self.y0() + self.y1())).abs() / 2.0 <= d)
            }
        }
    }

    /// Area searched for neighbors: the line box widened across the
    /// baseline by `ratio` times the line's thickness.
    pub fn search_area(&self, ratio: f64) -> (f64, Rect) {
        match self.mode {
            WritingMode::Horizontal => {
                let d = ratio * self.height();
                (d, (self.x0(), self.y0() - d, self.x1(), self.y1() + d))
            }
            WritingMode::Vertical => {
                let d = ratio * self.width();
                (d, (self.x0() - d, self.y0(), self.x1() + d, self.y1()))
            }
        }
    }
}

impl_has_bbox_delegate!(LTTextLine, component);
