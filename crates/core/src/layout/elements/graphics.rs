//! Graphical elements: LTCurve, LTLine, LTRect, LTImage.

use bytes::Bytes;
use lopdf::{Object, Stream};

use crate::interp::PathSegment;
use crate::model::PDFGraphicState;
use crate::utils::{HasBBox, Point, Rect, get_bound};

use super::component::LTComponent;

/// Paint attributes captured from the graphics state when a path is painted.
#[derive(Debug, Clone, PartialEq)]
pub struct PathStyle {
    pub linewidth: f64,
    pub stroke: bool,
    pub fill: bool,
    pub evenodd: bool,
    pub stroking_color: Vec<f64>,
    pub non_stroking_color: Vec<f64>,
    /// Dash pattern and phase.
    pub dashing_style: Option<(Vec<f64>, f64)>,
}

impl PathStyle {
    pub fn new(graphicstate: &PDFGraphicState, stroke: bool, fill: bool, evenodd: bool) -> Self {
        Self {
            linewidth: graphicstate.linewidth,
            stroke,
            fill,
            evenodd,
            stroking_color: graphicstate.scolor.to_vec(),
            non_stroking_color: graphicstate.ncolor.to_vec(),
            dashing_style: graphicstate.dash.clone(),
        }
    }
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            linewidth: 0.0,
            stroke: true,
            fill: false,
            evenodd: false,
            stroking_color: vec![0.0],
            non_stroking_color: vec![0.0],
            dashing_style: None,
        }
    }
}

/// A painted path that is neither a line nor a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct LTCurve {
    component: LTComponent,
    /// Points in device space.
    pub pts: Vec<Point>,
    pub style: PathStyle,
    /// The subpath's operators as written, in user space.
    pub original_path: Vec<PathSegment>,
}

impl LTCurve {
    pub fn new(pts: Vec<Point>, style: PathStyle, original_path: Vec<PathSegment>) -> Self {
        Self {
            component: LTComponent::new(get_bound(pts.iter().copied())),
            pts,
            style,
            original_path,
        }
    }
}

/// A single straight segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LTLine {
    curve: LTCurve,
}

impl LTLine {
    pub fn new(p0: Point, p1: Point, style: PathStyle, original_path: Vec<PathSegment>) -> Self {
        Self {
            curve: LTCurve::new(vec![p0, p1], style, original_path),
        }
    }

    pub fn pts(&self) -> &[Point] {
        &self.curve.pts
    }

    pub const fn style(&self) -> &PathStyle {
        &self.curve.style
    }

    pub fn original_path(&self) -> &[PathSegment] {
        &self.curve.original_path
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct LTRect {
    curve: LTCurve,
}

impl LTRect {
    /// Build from two diagonal corners.
    pub fn new(bbox: Rect, style: PathStyle, original_path: Vec<PathSegment>) -> Self {
        let (x0, y0, x1, y1) = bbox;
        Self {
            curve: LTCurve::new(
                vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1)],
                style,
                original_path,
            ),
        }
    }

    pub fn pts(&self) -> &[Point] {
        &self.curve.pts
    }

    pub const fn style(&self) -> &PathStyle {
        &self.curve.style
    }

    pub fn original_path(&self) -> &[PathSegment] {
        &self.curve.original_path
    }
}

/// An image placed on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct LTImage {
    component: LTComponent,
    name: String,
    /// Width and height of the source image in samples.
    srcsize: (Option<i64>, Option<i64>),
    bits: Option<i64>,
    imagemask: bool,
    colorspace: Vec<String>,
    filters: Vec<String>,
    data: Bytes,
}

impl LTImage {
    /// Describe an image stream placed over `bbox`.
    pub fn new(name: &str, stream: &Stream, bbox: Rect) -> Self {
        let int = |keys: [&[u8]; 2]| {
            keys.iter()
                .find_map(|k| stream.dict.get(k).ok())
                .and_then(|obj| obj.as_i64().ok())
        };
        let names = |key: &[u8]| -> Vec<String> {
            match stream.dict.get(key) {
                Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).into_owned()],
                Ok(Object::Array(items)) => items
                    .iter()
                    .filter_map(|item| match item {
                        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                        _ => None,
                    })
                    .collect(),
                _ => Vec::new(),
            }
        };
        Self {
            component: LTComponent::new(bbox),
            name: name.to_string(),
            srcsize: (int([b"Width", b"W"]), int([b"Height", b"H"])),
            bits: int([b"BitsPerComponent", b"BPC"]),
            imagemask: matches!(stream.dict.get(b"ImageMask"), Ok(Object::Boolean(true))),
            colorspace: names(b"ColorSpace"),
            filters: names(b"Filter"),
            data: Bytes::copy_from_slice(&stream.content),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn srcsize(&self) -> (Option<i64>, Option<i64>) {
        self.srcsize
    }

    pub const fn bits(&self) -> Option<i64> {
        self.bits
    }

    pub const fn imagemask(&self) -> bool {
        self.imagemask
    }

    /// Color space names: the family first, then any base space names.
    pub fn colorspace(&self) -> &[String] {
        &self.colorspace
    }

    pub fn filters(&self) -> &[String] {
        &self.filters
    }

    /// The stream bytes as stored, still encoded by `filters`.
    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

impl_has_bbox_delegate!(LTCurve, component);
impl_has_bbox_delegate!(LTLine, curve, method);
impl_has_bbox_delegate!(LTRect, curve, method);
impl_has_bbox_delegate!(LTImage, component);
