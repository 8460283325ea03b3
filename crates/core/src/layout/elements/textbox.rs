//! Text boxes and the hierarchical groups used to order them.

use std::cmp::Ordering;

use crate::utils::HasBBox;

use super::component::LTComponent;
use super::textline::{LTTextLine, WritingMode};

/// Lines that read as one block of text.
#[derive(Debug, Clone, PartialEq)]
pub struct LTTextBox {
    pub(crate) component: LTComponent,
    mode: WritingMode,
    lines: Vec<LTTextLine>,
    /// Reading-order position assigned by the layout pass.
    index: Option<usize>,
}

impl LTTextBox {
    pub fn new(mode: WritingMode) -> Self {
        Self {
            component: LTComponent::empty(),
            mode,
            lines: Vec::new(),
            index: None,
        }
    }

    pub fn add(&mut self, line: LTTextLine) {
        self.component.expand(&line);
        self.lines.push(line);
    }

    pub const fn mode(&self) -> WritingMode {
        self.mode
    }

    pub fn lines(&self) -> &[LTTextLine] {
        &self.lines
    }

    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    pub(crate) const fn set_index(&mut self, index: usize) {
        self.index = Some(index);
    }

    /// Close every line and sort lines top-down (horizontal) or
    /// right-to-left (vertical).
    pub fn analyze(&mut self) {
        for line in &mut self.lines {
            line.analyze();
        }
        match self.mode {
            WritingMode::Horizontal => self.lines.sort_by(|a, b| b.y1().total_cmp(&a.y1())),
            WritingMode::Vertical => self.lines.sort_by(|a, b| b.x1().total_cmp(&a.x1())),
        }
    }

    pub fn get_text(&self) -> String {
        self.lines.iter().map(LTTextLine::get_text).collect()
    }
}

/// Member of a text group: a box or a nested group.
#[derive(Debug, Clone, PartialEq)]
pub enum TextGroupElement {
    Box(LTTextBox),
    Group(Box<LTTextGroup>),
}

impl TextGroupElement {
    /// Vertical boxes and groups make any group containing them vertical.
    pub fn mode(&self) -> WritingMode {
        match self {
            TextGroupElement::Box(b) => b.mode(),
            TextGroupElement::Group(g) => g.mode,
        }
    }

    fn analyze(&mut self, boxes_flow: f64) {
        match self {
            TextGroupElement::Box(b) => b.analyze(),
            TextGroupElement::Group(g) => g.analyze(boxes_flow),
        }
    }

    /// Number boxes depth-first, starting at `next`.
    pub(crate) fn assign_indices(&mut self, next: &mut usize) {
        match self {
            TextGroupElement::Box(b) => {
                b.set_index(*next);
                *next += 1;
            }
            TextGroupElement::Group(g) => {
                for child in &mut g.children {
                    child.assign_indices(next);
                }
            }
        }
    }

    /// Boxes in tree order.
    pub fn into_boxes(self) -> Vec<LTTextBox> {
        match self {
            TextGroupElement::Box(b) => vec![b],
            TextGroupElement::Group(g) => g
                .children
                .into_iter()
                .flat_map(TextGroupElement::into_boxes)
                .collect(),
        }
    }
}

impl HasBBox for TextGroupElement {
    fn x0(&self) -> f64 {
        match self {
            TextGroupElement::Box(b) => b.x0(),
            TextGroupElement::Group(g) => g.x0(),
        }
    }
    fn y0(&self) -> f64 {
        match self {
            TextGroupElement::Box(b) => b.y0(),
            TextGroupElement::Group(g) => g.y0(),
        }
    }
    fn x1(&self) -> f64 {
        match self {
            TextGroupElement::Box(b) => b.x1(),
            TextGroupElement::Group(g) => g.x1(),
        }
    }
    fn y1(&self) -> f64 {
        match self {
            TextGroupElement::Box(b) => b.y1(),
            TextGroupElement::Group(g) => g.y1(),
        }
    }
}

/// Two merged neighbors. Horizontal groups read left-to-right,
/// top-to-bottom; vertical ones top-to-bottom, right-to-left.
#[derive(Debug, Clone, PartialEq)]
pub struct LTTextGroup {
    component: LTComponent,
    mode: WritingMode,
    children: Vec<TextGroupElement>,
}

impl LTTextGroup {
    pub fn new(children: Vec<TextGroupElement>) -> Self {
        let mut component = LTComponent::empty();
        for child in &children {
            component.expand(child);
        }
        let mode = if children.iter().any(|c| c.mode() == WritingMode::Vertical) {
            WritingMode::Vertical
        } else {
            WritingMode::Horizontal
        };
        Self {
            component,
            mode,
            children,
        }
    }

    pub const fn mode(&self) -> WritingMode {
        self.mode
    }

    pub fn children(&self) -> &[TextGroupElement] {
        &self.children
    }

    fn analyze(&mut self, boxes_flow: f64) {
        for child in &mut self.children {
            child.analyze(boxes_flow);
        }
        let mode = self.mode;
        let key = |e: &TextGroupElement| match mode {
            WritingMode::Horizontal => {
                (1.0 - boxes_flow) * e.x0() - (1.0 + boxes_flow) * (e.y0() + e.y1())
            }
            WritingMode::Vertical => {
                -(1.0 + boxes_flow) * (e.x0() + e.x1()) - (1.0 - boxes_flow) * e.y1()
            }
        };
        self.children
            .sort_by(|a, b| key(a).partial_cmp(&key(b)).unwrap_or(Ordering::Equal));
    }
}

impl_has_bbox_delegate!(LTTextGroup, component);
impl_has_bbox_delegate!(LTTextBox, component);

/// Analyze a grouping result and return its boxes in reading order.
pub(crate) fn order_groups(mut groups: Vec<TextGroupElement>, boxes_flow: f64) -> Vec<LTTextBox> {
    let mut next = 0;
    for group in &mut groups {
        group.analyze(boxes_flow);
        group.assign_indices(&mut next);
    }
    let mut boxes: Vec<LTTextBox> = groups
        .into_iter()
        .flat_map(TextGroupElement::into_boxes)
        .collect();
    boxes.sort_by_key(|b| b.index());
    boxes
}
