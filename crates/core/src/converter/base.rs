//! Layout-building devices.
//!
//! - `PDFLayoutAnalyzer`: turns interpreter events into a layout tree
//! - `PDFPageAggregator`: keeps the analyzed pages for later retrieval
//!
//! The analyzer reports structural problems (unbalanced figures, events
//! without an open page) as errors. Devices built on it remember the first
//! such error of a page and drop that page when it ends.

use std::sync::Arc;

use lopdf::Stream;
use tracing::debug;

use crate::error::{PdfError, Result};
use crate::font::PDFFont;
use crate::interp::PathSegment;
use crate::layout::{
    GlyphPlacement, LAParams, LTChar, LTCurve, LTFigure, LTImage, LTItem, LTLine, LTPage, LTRect,
    PathStyle,
};
use crate::model::{PDFColorSpace, PDFGraphicState};
use crate::utils::{
    HasBBox, MATRIX_IDENTITY, Matrix, Point, Rect, apply_matrix_pt, apply_matrix_rect, mult_matrix,
};

/// The container currently receiving items.
#[derive(Debug)]
enum Container {
    Page(LTPage),
    Figure(LTFigure),
}

impl Container {
    fn add(&mut self, item: LTItem) {
        match self {
            Container::Page(page) => page.add(item),
            Container::Figure(fig) => fig.add(item),
        }
    }
}

/// Builds one layout tree per page from interpreter events.
///
/// Points are stored in device space: every event is transformed by the
/// CTM that was current when it was issued.
#[derive(Debug)]
pub struct PDFLayoutAnalyzer {
    /// Number given to the next finished page (1-based).
    pageno: usize,
    /// Layout analysis parameters; `None` skips the layout pass.
    laparams: Option<LAParams>,
    /// Enclosing containers of `cur_item`, outermost first.
    stack: Vec<Container>,
    cur_item: Option<Container>,
    ctm: Matrix,
    record_paths: bool,
    record_images: bool,
    /// First structural error seen on the current page.
    page_error: Option<PdfError>,
}

impl PDFLayoutAnalyzer {
    /// Create an analyzer numbering pages from `pageno`.
    pub fn new(laparams: Option<LAParams>, pageno: usize) -> Self {
        Self {
            pageno,
            laparams,
            stack: Vec::new(),
            cur_item: None,
            ctm: MATRIX_IDENTITY,
            record_paths: true,
            record_images: true,
            page_error: None,
        }
    }

    /// Whether painted paths become Line/Rect/Curve items.
    pub fn record_paths(mut self, on: bool) -> Self {
        self.record_paths = on;
        self
    }

    /// Whether images become Image items.
    pub fn record_images(mut self, on: bool) -> Self {
        self.record_images = on;
        self
    }

    pub const fn pageno(&self) -> usize {
        self.pageno
    }

    pub const fn laparams(&self) -> Option<&LAParams> {
        self.laparams.as_ref()
    }

    pub const fn ctm(&self) -> Matrix {
        self.ctm
    }

    pub fn set_ctm(&mut self, ctm: Matrix) {
        self.ctm = ctm;
    }

    /// Depth of open figures.
    pub fn figure_depth(&self) -> usize {
        match self.cur_item {
            Some(Container::Figure(_)) => self.stack.len(),
            _ => 0,
        }
    }

    /// Start a page whose media box, mapped through `ctm`, becomes the page box.
    pub fn begin_page(&mut self, mediabox: Rect, ctm: Matrix) {
        let (x0, y0, x1, y1) = apply_matrix_rect(ctm, mediabox);
        let bbox = (0.0, 0.0, (x0 - x1).abs(), (y0 - y1).abs());
        self.stack.clear();
        self.page_error = None;
        self.cur_item = Some(Container::Page(LTPage::new(self.pageno, bbox)));
    }

    /// Close the current page, run the layout pass and hand the page back.
    ///
    /// The page number advances even when the page is rejected, so later
    /// pages keep their numbers.
    pub fn end_page(&mut self) -> Result<LTPage> {
        let pageid = self.pageno;
        self.pageno += 1;
        let open = self.stack.len();
        let cur_item = self.cur_item.take();
        self.stack.clear();
        if let Some(err) = self.page_error.take() {
            return Err(err);
        }
        if open > 0 {
            return Err(PdfError::UnbalancedFigure { pageid, open });
        }
        let Some(Container::Page(mut page)) = cur_item else {
            return Err(PdfError::NoActiveContainer("end_page"));
        };
        if let Some(laparams) = &self.laparams {
            page.analyze(laparams);
        }
        Ok(page)
    }

    /// Open a figure. `matrix` maps figure space into the enclosing space.
    pub fn begin_figure(&mut self, name: &str, bbox: Rect, matrix: Matrix) -> Result<()> {
        let parent = self
            .cur_item
            .take()
            .ok_or(PdfError::NoActiveContainer("begin_figure"))?;
        self.stack.push(parent);
        let matrix = mult_matrix(matrix, self.ctm);
        self.cur_item = Some(Container::Figure(LTFigure::new(name, bbox, matrix)));
        Ok(())
    }

    /// Close the innermost figure and append it to its parent.
    pub fn end_figure(&mut self, name: &str) -> Result<()> {
        let Some(Container::Figure(fig)) = self.cur_item.take_if(|c| matches!(c, Container::Figure(_)))
        else {
            return Err(PdfError::UnmatchedEndFigure(name.to_string()));
        };
        let Some(mut parent) = self.stack.pop() else {
            return Err(PdfError::UnmatchedEndFigure(name.to_string()));
        };
        if fig.name() != name {
            debug!(open = fig.name(), closing = name, "figure names differ");
        }
        parent.add(LTItem::Figure(Box::new(fig)));
        self.cur_item = Some(parent);
        Ok(())
    }

    /// Classify a painted path into lines, rectangles and curves.
    ///
    /// A path must open with a moveto; others are dropped. Each subpath
    /// (split at every moveto) is classified on its own.
    pub fn paint_path(
        &mut self,
        graphicstate: &PDFGraphicState,
        stroke: bool,
        fill: bool,
        evenodd: bool,
        path: &[PathSegment],
    ) -> Result<()> {
        if !self.record_paths {
            return Ok(());
        }
        if !matches!(path.first(), Some(PathSegment::MoveTo(..))) {
            debug!(len = path.len(), "path does not start with moveto, dropped");
            return Ok(());
        }
        let ctm = self.ctm;
        let container = self
            .cur_item
            .as_mut()
            .ok_or(PdfError::NoActiveContainer("paint_path"))?;
        let style = PathStyle::new(graphicstate, stroke, fill, evenodd);
        for subpath in split_subpaths(path) {
            if let Some(item) = classify_subpath(subpath, ctm, &style) {
                container.add(item);
            }
        }
        Ok(())
    }

    /// Place one glyph and return its advance.
    ///
    /// Codes the font cannot map come out as `(cid:N)`.
    #[allow(clippy::too_many_arguments)]
    pub fn render_char(
        &mut self,
        matrix: Matrix,
        font: &Arc<dyn PDFFont>,
        fontsize: f64,
        scaling: f64,
        rise: f64,
        cid: u32,
        _ncs: &PDFColorSpace,
        graphicstate: &PDFGraphicState,
    ) -> Result<f64> {
        let text = font
            .to_unichr(cid)
            .unwrap_or_else(|| handle_undefined_char(font.as_ref(), cid));
        let placement = GlyphPlacement {
            matrix,
            fontsize,
            scaling,
            rise,
            textwidth: font.char_width(cid),
            textdisp: font.char_disp(cid),
        };
        let item = LTChar::new(placement, font, text, graphicstate);
        let adv = item.adv();
        self.cur_item
            .as_mut()
            .ok_or(PdfError::NoActiveContainer("render_char"))?
            .add(LTItem::Char(item));
        Ok(adv)
    }

    /// Add an image spanning the enclosing figure.
    pub fn render_image(&mut self, name: &str, stream: &Stream) -> Result<()> {
        if !self.record_images {
            return Ok(());
        }
        match self.cur_item.as_mut() {
            Some(Container::Figure(fig)) => {
                let item = LTImage::new(name, stream, fig.bbox());
                fig.add(LTItem::Image(item));
                Ok(())
            }
            Some(Container::Page(_)) => {
                debug!(name, "image outside a figure ignored");
                Ok(())
            }
            None => Err(PdfError::NoActiveContainer("render_image")),
        }
    }

    /// Remember a structural error; the page is dropped at `end_page`.
    pub fn record_error(&mut self, err: PdfError) {
        if self.page_error.is_none() {
            self.page_error = Some(err);
        }
    }
}

fn handle_undefined_char(font: &dyn PDFFont, cid: u32) -> String {
    debug!(font = font.fontname(), cid, "undefined char");
    format!("(cid:{cid})")
}

/// Slices of `path` that each start at a moveto. In a path with several
/// movetos, lone ones paint nothing and are skipped; a path that is a single
/// moveto is kept whole.
fn split_subpaths(path: &[PathSegment]) -> impl Iterator<Item = &[PathSegment]> {
    let single = path
        .iter()
        .filter(|seg| matches!(seg, PathSegment::MoveTo(..)))
        .count()
        <= 1;
    let mut rest = path;
    std::iter::from_fn(move || {
        while !rest.is_empty() {
            let end = rest[1..]
                .iter()
                .position(|seg| matches!(seg, PathSegment::MoveTo(..)))
                .map_or(rest.len(), |i| i + 1);
            let (head, tail) = rest.split_at(end);
            rest = tail;
            if single || head.len() > 1 {
                return Some(head);
            }
        }
        None
    })
}

fn classify_subpath(subpath: &[PathSegment], ctm: Matrix, style: &PathStyle) -> Option<LTItem> {
    let start = subpath.first()?.end_point()?;
    let mut shape: String = subpath.iter().map(PathSegment::op).collect();
    let mut pts: Vec<Point> = subpath
        .iter()
        .map(|seg| apply_matrix_pt(ctm, seg.end_point().unwrap_or(start)))
        .collect();

    // "...l h" where the lineto already returns to the start.
    if shape.len() > 3 && shape.ends_with("lh") && pts[pts.len() - 2] == pts[0] {
        shape.truncate(shape.len() - 2);
        shape.push('h');
        pts.pop();
    }

    let original_path = subpath.to_vec();
    let style = style.clone();
    let item = match shape.as_str() {
        "ml" | "mlh" => LTItem::Line(LTLine::new(pts[0], pts[1], style, original_path)),
        "mlllh" | "mllll" => {
            let [(x0, y0), (x1, y1), (x2, y2), (x3, y3), p4] = pts[..] else {
                return None;
            };
            let closed = (x0, y0) == p4;
            let square = (x0 == x1 && y1 == y2 && x2 == x3 && y3 == y0)
                || (y0 == y1 && x1 == x2 && y2 == y3 && x3 == x0);
            if closed && square {
                let bbox = (x0.min(x2), y0.min(y2), x0.max(x2), y0.max(y2));
                LTItem::Rect(LTRect::new(bbox, style, original_path))
            } else {
                LTItem::Curve(LTCurve::new(pts, style, original_path))
            }
        }
        _ => LTItem::Curve(LTCurve::new(pts, style, original_path)),
    };
    Some(item)
}

/// Implements `PDFDevice` and `PDFTextDevice` for a type holding a
/// `PDFLayoutAnalyzer` in `analyzer` and exposing `receive_layout(LTPage)`.
macro_rules! impl_layout_device {
    ($ty:ty) => {
        impl $crate::interp::PDFDevice for $ty {
            fn set_ctm(&mut self, ctm: $crate::utils::Matrix) {
                self.analyzer.set_ctm(ctm);
            }

            fn ctm(&self) -> $crate::utils::Matrix {
                self.analyzer.ctm()
            }

            fn begin_page(
                &mut self,
                _pageid: u32,
                mediabox: $crate::utils::Rect,
                ctm: $crate::utils::Matrix,
            ) {
                self.analyzer.begin_page(mediabox, ctm);
            }

            fn end_page(&mut self, pageid: u32) {
                let pageno = self.analyzer.pageno();
                match self.analyzer.end_page() {
                    Ok(page) => self.receive_layout(page),
                    Err(err) => {
                        ::tracing::warn!(pageno, pageid, error = %err, "dropping page");
                    }
                }
            }

            fn begin_figure(
                &mut self,
                name: &str,
                bbox: $crate::utils::Rect,
                matrix: $crate::utils::Matrix,
            ) {
                if let Err(err) = self.analyzer.begin_figure(name, bbox, matrix) {
                    self.analyzer.record_error(err);
                }
            }

            fn end_figure(&mut self, name: &str) {
                if let Err(err) = self.analyzer.end_figure(name) {
                    self.analyzer.record_error(err);
                }
            }

            fn paint_path(
                &mut self,
                graphicstate: &$crate::model::PDFGraphicState,
                stroke: bool,
                fill: bool,
                evenodd: bool,
                path: &[$crate::interp::PathSegment],
            ) {
                if let Err(err) = self
                    .analyzer
                    .paint_path(graphicstate, stroke, fill, evenodd, path)
                {
                    self.analyzer.record_error(err);
                }
            }

            fn render_image(&mut self, name: &str, stream: &::lopdf::Stream) {
                if let Err(err) = self.analyzer.render_image(name, stream) {
                    self.analyzer.record_error(err);
                }
            }

            fn render_string(
                &mut self,
                textstate: &mut $crate::model::PDFTextState,
                seq: &$crate::interp::PDFTextSeq,
                graphicstate: &$crate::model::PDFGraphicState,
            ) {
                $crate::interp::PDFTextDevice::render_text(self, textstate, seq, graphicstate);
            }
        }

        impl $crate::interp::PDFTextDevice for $ty {
            fn render_char(
                &mut self,
                matrix: $crate::utils::Matrix,
                font: &::std::sync::Arc<dyn $crate::font::PDFFont>,
                fontsize: f64,
                scaling: f64,
                rise: f64,
                cid: u32,
                ncs: &$crate::model::PDFColorSpace,
                graphicstate: &$crate::model::PDFGraphicState,
            ) -> f64 {
                match self.analyzer.render_char(
                    matrix,
                    font,
                    fontsize,
                    scaling,
                    rise,
                    cid,
                    ncs,
                    graphicstate,
                ) {
                    Ok(adv) => adv,
                    Err(err) => {
                        self.analyzer.record_error(err);
                        0.0
                    }
                }
            }
        }
    };
}

pub(crate) use impl_layout_device;

/// Collects analyzed pages.
#[derive(Debug)]
pub struct PDFPageAggregator {
    analyzer: PDFLayoutAnalyzer,
    pages: Vec<LTPage>,
}

impl PDFPageAggregator {
    pub fn new(laparams: Option<LAParams>, pageno: usize) -> Self {
        Self::with_analyzer(PDFLayoutAnalyzer::new(laparams, pageno))
    }

    pub fn with_analyzer(analyzer: PDFLayoutAnalyzer) -> Self {
        Self {
            analyzer,
            pages: Vec::new(),
        }
    }

    pub fn receive_layout(&mut self, ltpage: LTPage) {
        self.pages.push(ltpage);
    }

    /// The most recently finished page.
    pub fn result(&self) -> Option<&LTPage> {
        self.pages.last()
    }

    pub fn pages(&self) -> &[LTPage] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<LTPage> {
        self.pages
    }
}

impl_layout_device!(PDFPageAggregator);
