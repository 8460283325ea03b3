//! Hierarchical grouping of text boxes for reading order.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use ordered_float::OrderedFloat;

use crate::utils::{HasBBox, Rect};

use super::super::elements::{LTTextBox, LTTextGroup, TextGroupElement};

/// Heap entry: (already checked for blockers, distance, id1, id2).
type Candidate = Reverse<(bool, OrderedFloat<f64>, usize, usize)>;

/// Area of the union box minus the areas of both boxes.
fn dist(a: Rect, b: Rect) -> f64 {
    let x0 = a.0.min(b.0);
    let y0 = a.1.min(b.1);
    let x1 = a.2.max(b.2);
    let y1 = a.3.max(b.3);
    (x1 - x0) * (y1 - y0) - (a.2 - a.0) * (a.3 - a.1) - (b.2 - b.0) * (b.3 - b.1)
}

fn union(a: Rect, b: Rect) -> Rect {
    (a.0.min(b.0), a.1.min(b.1), a.2.max(b.2), a.3.max(b.3))
}

fn overlaps(a: Rect, b: Rect) -> bool {
    !(b.2 <= a.0 || a.2 <= b.0 || b.3 <= a.1 || a.3 <= b.1)
}

/// Repeatedly merge the closest pair of boxes or groups into a group until
/// one tree (or several disconnected ones) remains.
///
/// A pair whose union box would cover a third element is deferred once, so
/// that nearer, unobstructed pairs merge first.
pub fn group_textboxes(boxes: Vec<LTTextBox>) -> Vec<TextGroupElement> {
    let mut nodes: Vec<Option<TextGroupElement>> = Vec::with_capacity(boxes.len() * 2);
    let mut bboxes: Vec<Rect> = Vec::with_capacity(boxes.len() * 2);
    for b in boxes {
        bboxes.push(b.bbox());
        nodes.push(Some(TextGroupElement::Box(b)));
    }

    let mut heap: BinaryHeap<Candidate> = BinaryHeap::new();
    for i in 0..bboxes.len() {
        for j in (i + 1)..bboxes.len() {
            heap.push(Reverse((false, OrderedFloat(dist(bboxes[i], bboxes[j])), i, j)));
        }
    }

    let mut plane: BTreeSet<usize> = (0..bboxes.len()).collect();
    while let Some(Reverse((checked, d, id1, id2))) = heap.pop() {
        if !plane.contains(&id1) || !plane.contains(&id2) {
            continue;
        }
        if !checked {
            let area = union(bboxes[id1], bboxes[id2]);
            let blocked = plane
                .iter()
                .any(|&k| k != id1 && k != id2 && overlaps(area, bboxes[k]));
            if blocked {
                heap.push(Reverse((true, d, id1, id2)));
                continue;
            }
        }
        let (Some(a), Some(b)) = (nodes[id1].take(), nodes[id2].take()) else {
            continue;
        };
        plane.remove(&id1);
        plane.remove(&id2);

        let group = LTTextGroup::new(vec![a, b]);
        let gid = nodes.len();
        bboxes.push(group.bbox());
        nodes.push(Some(TextGroupElement::Group(Box::new(group))));
        for &other in &plane {
            heap.push(Reverse((
                false,
                OrderedFloat(dist(bboxes[gid], bboxes[other])),
                gid,
                other,
            )));
        }
        plane.insert(gid);
    }

    plane.into_iter().filter_map(|id| nodes[id].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::elements::{LTChar, LTTextLine, WritingMode};

    fn textbox(x0: f64, y0: f64, text: &str) -> LTTextBox {
        let mut line = LTTextLine::new(WritingMode::Horizontal, 0.1);
        line.add(LTChar::with_bbox((x0, y0, x0 + 10.0, y0 + 10.0), text, "F"));
        let mut b = LTTextBox::new(WritingMode::Horizontal);
        b.add(line);
        b
    }

    #[test]
    fn test_single_box_is_returned_as_is() {
        let groups = group_textboxes(vec![textbox(0.0, 0.0, "A")]);
        assert_eq!(groups.len(), 1);
        assert!(matches!(groups[0], TextGroupElement::Box(_)));
    }

    #[test]
    fn test_nearest_pair_merges_first() {
        let groups = group_textboxes(vec![
            textbox(0.0, 100.0, "A"),
            textbox(0.0, 300.0, "C"),
            textbox(0.0, 85.0, "B"),
        ]);
        assert_eq!(groups.len(), 1);
        let TextGroupElement::Group(root) = &groups[0] else {
            panic!("expected a group");
        };
        let inner = root
            .children()
            .iter()
            .find_map(|c| match c {
                TextGroupElement::Group(g) => Some(g),
                TextGroupElement::Box(_) => None,
            })
            .expect("nested group");
        let texts: Vec<String> = inner
            .children()
            .iter()
            .cloned()
            .flat_map(TextGroupElement::into_boxes)
            .map(|b| b.get_text())
            .collect();
        assert_eq!(texts, vec!["A", "B"]);
    }
}
