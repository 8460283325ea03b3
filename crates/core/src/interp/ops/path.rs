//! Path construction and painting operators.
//!
//! Handles: m, l, c, v, y, h, re, S, s, f, F, f*, B, B*, b, b*, n
//!
//! Segments are recorded in user space exactly as written; `v` and `y`
//! keep their own variants so painted paths carry the operator sequence the
//! producer emitted. Clipping (W, W*) has no effect on extraction.

use std::mem;

use crate::interp::device::{PDFDevice, PathSegment};
use crate::interp::interpreter::PDFPageInterpreter;

#[allow(non_snake_case)]
impl<'a, D: PDFDevice> PDFPageInterpreter<'a, D> {
    /// PDF operator: `m`
    pub fn do_m(&mut self, x: f64, y: f64) {
        self.curpath.push(PathSegment::MoveTo(x, y));
        self.current_point = Some((x, y));
    }

    /// PDF operator: `l`
    pub fn do_l(&mut self, x: f64, y: f64) {
        self.curpath.push(PathSegment::LineTo(x, y));
        self.current_point = Some((x, y));
    }

    /// PDF operator: `c`
    pub fn do_c(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.curpath
            .push(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3));
        self.current_point = Some((x3, y3));
    }

    /// Curve whose first control point is the current point.
    ///
    /// PDF operator: `v`
    pub fn do_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.curpath.push(PathSegment::CurveV(x2, y2, x3, y3));
        self.current_point = Some((x3, y3));
    }

    /// Curve whose second control point is its end point.
    ///
    /// PDF operator: `y`
    pub fn do_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.curpath.push(PathSegment::CurveY(x1, y1, x3, y3));
        self.current_point = Some((x3, y3));
    }

    /// Closes the current subpath; the current point returns to its start.
    ///
    /// PDF operator: `h`
    pub fn do_h(&mut self) {
        self.curpath.push(PathSegment::ClosePath);
        self.current_point = self
            .curpath
            .iter()
            .rev()
            .find_map(|seg| match *seg {
                PathSegment::MoveTo(x, y) => Some((x, y)),
                _ => None,
            });
    }

    /// Appends `m l l l h` for the rectangle.
    ///
    /// PDF operator: `re`
    pub fn do_re(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.curpath.extend([
            PathSegment::MoveTo(x, y),
            PathSegment::LineTo(x + w, y),
            PathSegment::LineTo(x + w, y + h),
            PathSegment::LineTo(x, y + h),
            PathSegment::ClosePath,
        ]);
        self.current_point = Some((x, y));
    }

    fn paint_current_path(&mut self, stroke: bool, fill: bool, evenodd: bool) {
        let path = mem::take(&mut self.curpath);
        if !path.is_empty() {
            self.device
                .paint_path(&self.graphicstate, stroke, fill, evenodd, &path);
        }
        self.current_point = None;
    }

    /// PDF operator: `S`
    pub fn do_S(&mut self) {
        self.paint_current_path(true, false, false);
    }

    /// PDF operator: `s`
    pub fn do_s(&mut self) {
        self.do_h();
        self.do_S();
    }

    /// PDF operators: `f`, `F`
    pub fn do_f(&mut self) {
        self.paint_current_path(false, true, false);
    }

    /// PDF operator: `f*`
    pub fn do_f_star(&mut self) {
        self.paint_current_path(false, true, true);
    }

    /// PDF operator: `B`
    pub fn do_B(&mut self) {
        self.paint_current_path(true, true, false);
    }

    /// PDF operator: `B*`
    pub fn do_B_star(&mut self) {
        self.paint_current_path(true, true, true);
    }

    /// PDF operator: `b`
    pub fn do_b(&mut self) {
        self.do_h();
        self.do_B();
    }

    /// PDF operator: `b*`
    pub fn do_b_star(&mut self) {
        self.do_h();
        self.do_B_star();
    }

    /// Ends the path without painting it.
    ///
    /// PDF operator: `n`
    pub fn do_n(&mut self) {
        self.curpath.clear();
        self.current_point = None;
    }
}
