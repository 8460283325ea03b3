//! Text Converter - renders analyzed pages as plain text.

use std::sync::Arc;

use tracing::warn;

use super::base::{PDFLayoutAnalyzer, impl_layout_device};
use crate::image::ImageDescriber;
use crate::layout::{LAParams, LTImage, LTItem, LTPage};

/// Plain-text output device.
///
/// Drawing primitives are never recorded. Images are recorded only when a
/// describer is configured, since they contribute nothing otherwise.
pub struct TextConverter {
    analyzer: PDFLayoutAnalyzer,
    output: String,
    show_pageno: bool,
    describer: Option<Arc<dyn ImageDescriber>>,
}

impl TextConverter {
    /// Create a converter numbering pages from `pageno`.
    pub fn new(laparams: Option<LAParams>, pageno: usize, show_pageno: bool) -> Self {
        Self::with_describer(laparams, pageno, show_pageno, None)
    }

    pub fn with_describer(
        laparams: Option<LAParams>,
        pageno: usize,
        show_pageno: bool,
        describer: Option<Arc<dyn ImageDescriber>>,
    ) -> Self {
        let analyzer = PDFLayoutAnalyzer::new(laparams, pageno)
            .record_paths(false)
            .record_images(describer.is_some());
        Self {
            analyzer,
            output: String::new(),
            show_pageno,
            describer,
        }
    }

    pub fn show_pageno(&self) -> bool {
        self.show_pageno
    }

    /// Text written so far.
    pub fn text(&self) -> &str {
        &self.output
    }

    pub fn into_text(self) -> String {
        self.output
    }

    /// Render a finished page: optional header, content, then a form feed.
    pub fn receive_layout(&mut self, ltpage: LTPage) {
        if self.show_pageno {
            self.write_text(&format!("Page {}\n", ltpage.pageid()));
        }
        for item in ltpage.items() {
            self.render(item);
        }
        self.write_text("\x0c");
    }

    fn write_text(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn render(&mut self, item: &LTItem) {
        match item {
            LTItem::Char(c) => self.write_text(c.get_text()),
            LTItem::Anno(a) => self.write_text(a.get_text()),
            LTItem::TextLine(line) => self.write_text(&line.get_text()),
            LTItem::TextBox(tb) => {
                for line in tb.lines() {
                    self.write_text(&line.get_text());
                }
                self.write_text("\n");
            }
            LTItem::Figure(fig) => {
                for child in fig.items() {
                    self.render(child);
                }
            }
            LTItem::Image(image) => self.describe_image(image),
            LTItem::Curve(_) | LTItem::Line(_) | LTItem::Rect(_) => {}
        }
    }

    fn describe_image(&mut self, image: &LTImage) {
        let Some(describer) = &self.describer else {
            return;
        };
        match describer.describe(image) {
            Ok(description) => {
                self.output.push('\n');
                self.output.push_str(&description);
            }
            Err(err) => warn!(image = image.name(), error = %err, "image description failed"),
        }
    }
}

impl_layout_device!(TextConverter);
