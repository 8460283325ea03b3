//! Layout analysis entry points for pages and figures.

use std::mem;

use crate::utils::HasBBox;

use super::super::elements::{
    LTChar, LTFigure, LTItem, LTPage, LTTextBox, LTTextLine, WritingMode, order_groups,
};
use super::super::params::LAParams;
use super::clustering::group_textboxes;
use super::grouping::{group_objects, group_textlines};

/// Run the layout pass over one container's children.
///
/// Characters are replaced by text boxes in reading order, followed by the
/// other items in paint order and then any whitespace-only lines. Figures
/// are analyzed first; they only group their own text with `all_texts`.
pub fn analyze_items(items: &mut Vec<LTItem>, laparams: &LAParams) {
    for item in items.iter_mut() {
        if let LTItem::Figure(figure) = item {
            figure.analyze(laparams);
        }
    }
    if !items.iter().any(|item| matches!(item, LTItem::Char(_))) {
        return;
    }

    let mut chars: Vec<LTChar> = Vec::new();
    let mut others: Vec<LTItem> = Vec::new();
    for item in mem::take(items) {
        match item {
            LTItem::Char(c) => chars.push(c),
            other => others.push(other),
        }
    }

    let (empties, textlines): (Vec<LTTextLine>, Vec<LTTextLine>) = group_objects(laparams, &chars)
        .into_iter()
        .partition(LTTextLine::is_empty);
    let mut textboxes = group_textlines(laparams, textlines);

    match laparams.boxes_flow {
        None => {
            for textbox in &mut textboxes {
                textbox.analyze();
            }
            textboxes.sort_by(|a, b| {
                let (ka, kb) = (box_sort_key(a), box_sort_key(b));
                ka.0.cmp(&kb.0)
                    .then(ka.1.total_cmp(&kb.1))
                    .then(ka.2.total_cmp(&kb.2))
            });
        }
        Some(boxes_flow) => {
            textboxes = order_groups(group_textboxes(textboxes), boxes_flow);
        }
    }

    items.extend(textboxes.into_iter().map(LTItem::TextBox));
    items.extend(others);
    items.extend(empties.into_iter().map(LTItem::TextLine));
}

/// Vertical boxes first, right to left; then horizontal boxes top-down.
fn box_sort_key(b: &LTTextBox) -> (u8, f64, f64) {
    match b.mode() {
        WritingMode::Vertical => (0, -b.x1(), -b.y0()),
        WritingMode::Horizontal => (1, -b.y0(), b.x0()),
    }
}

impl LTFigure {
    /// Figures keep their characters loose unless `all_texts` is set.
    pub fn analyze(&mut self, laparams: &LAParams) {
        if laparams.all_texts {
            analyze_items(&mut self.items, laparams);
        }
    }
}

impl LTPage {
    pub fn analyze(&mut self, laparams: &LAParams) {
        analyze_items(&mut self.items, laparams);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::MATRIX_IDENTITY;

    fn ch(x0: f64, y0: f64, text: &str) -> LTItem {
        LTItem::Char(LTChar::with_bbox((x0, y0, x0 + 10.0, y0 + 10.0), text, "F"))
    }

    fn box_texts(page: &LTPage) -> Vec<String> {
        page.items()
            .iter()
            .filter_map(|item| match item {
                LTItem::TextBox(b) => Some(b.get_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_analysis_orders_boxes_top_down() {
        for boxes_flow in [None, Some(0.5)] {
            let laparams = LAParams {
                boxes_flow,
                ..LAParams::default()
            };
            let mut page = LTPage::new(1, (0.0, 0.0, 600.0, 800.0));
            page.add(ch(0.0, 100.0, "C"));
            page.add(ch(10.0, 100.0, "D"));
            page.add(ch(0.0, 500.0, "A"));
            page.add(ch(10.0, 500.0, "B"));
            page.analyze(&laparams);
            assert_eq!(box_texts(&page), vec!["AB\n", "CD\n"]);
        }
    }

    #[test]
    fn test_figure_text_left_alone_without_all_texts() {
        let mut figure = LTFigure::new("Fm0", (0.0, 0.0, 100.0, 100.0), MATRIX_IDENTITY);
        figure.add(ch(0.0, 0.0, "X"));
        let mut page = LTPage::new(1, (0.0, 0.0, 600.0, 800.0));
        page.add(LTItem::Figure(Box::new(figure)));
        page.analyze(&LAParams::default());
        let LTItem::Figure(figure) = &page.items()[0] else {
            panic!("expected figure");
        };
        assert!(matches!(figure.items()[0], LTItem::Char(_)));
    }
}
