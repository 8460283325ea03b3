//! Layout analysis parameters.

use crate::error::{PdfError, Result};

/// Parameters for layout analysis.
///
/// Controls how characters are grouped into lines, words, and text boxes.
#[derive(Debug, Clone, PartialEq)]
pub struct LAParams {
    /// If two characters have more overlap than this they are considered to be
    /// on the same line. Specified relative to the minimum height of both characters.
    pub line_overlap: f64,

    /// If two characters are closer together than this margin they are considered
    /// part of the same line. Specified relative to the width of the character.
    pub char_margin: f64,

    /// If two lines are close together they are considered to be part of the
    /// same paragraph. Specified relative to the height of a line.
    pub line_margin: f64,

    /// If two characters on the same line are further apart than this margin then
    /// they are considered to be two separate words. Specified relative to the
    /// width of the character.
    pub word_margin: f64,

    /// How much horizontal and vertical position matter when ordering text
    /// boxes, from -1.0 (only horizontal) to +1.0 (only vertical). `None`
    /// sorts boxes top-down instead of grouping them.
    pub boxes_flow: Option<f64>,

    /// Whether characters may also be grouped into vertical lines.
    pub detect_vertical: bool,

    /// Whether text inside figures is analyzed too.
    pub all_texts: bool,
}

impl Default for LAParams {
    fn default() -> Self {
        Self {
            line_overlap: 0.5,
            char_margin: 2.0,
            line_margin: 0.5,
            word_margin: 0.1,
            boxes_flow: Some(0.5),
            detect_vertical: false,
            all_texts: false,
        }
    }
}

impl LAParams {
    /// Reject a `boxes_flow` outside [-1, 1].
    pub fn validate(&self) -> Result<()> {
        if let Some(bf) = self.boxes_flow
            && !(-1.0..=1.0).contains(&bf)
        {
            return Err(PdfError::InvalidConfig(format!(
                "boxes_flow should be None, or a number between -1 and +1, got {bf}"
            )));
        }
        Ok(())
    }
}
