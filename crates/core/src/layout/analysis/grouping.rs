//! Character-to-line and line-to-box grouping.

use crate::utils::{HasBBox, Rect};

use super::super::elements::{LTChar, LTTextBox, LTTextLine, Proximity, WritingMode};
use super::super::params::LAParams;

/// Group consecutive characters into text lines.
///
/// Two neighbors share a horizontal line when they overlap vertically by
/// more than `line_overlap` of the smaller height and sit closer than
/// `char_margin` times the wider width; vertical lines are the transpose,
/// considered only with `detect_vertical`.
pub fn group_objects(laparams: &LAParams, objs: &[LTChar]) -> Vec<LTTextLine> {
    let mut result = Vec::new();
    let mut iter = objs.iter();
    let Some(mut obj0) = iter.next() else {
        return result;
    };
    let mut line: Option<LTTextLine> = None;

    for obj1 in iter {
        //   +------+ - - -
        //   | obj0 | - - +------+   -
        //   |      |     | obj1 |   | (line_overlap)
        //   +------+ - - |      |   -
        //          - - - +------+
        //          |<--->|
        //        (char_margin)
        let halign = obj0.is_voverlap(obj1)
            && obj0.height().min(obj1.height()) * laparams.line_overlap < obj0.voverlap(obj1)
            && obj0.hdistance(obj1) < obj0.width().max(obj1.width()) * laparams.char_margin;

        let valign = laparams.detect_vertical
            && obj0.is_hoverlap(obj1)
            && obj0.width().min(obj1.width()) * laparams.line_overlap < obj0.hoverlap(obj1)
            && obj0.vdistance(obj1) < obj0.height().max(obj1.height()) * laparams.char_margin;

        match line.as_mut() {
            Some(current)
                if (current.mode() == WritingMode::Horizontal && halign)
                    || (current.mode() == WritingMode::Vertical && valign) =>
            {
                current.add(obj1.clone());
            }
            Some(_) => result.extend(line.take()),
            None => {
                let mode = if valign && !halign {
                    Some(WritingMode::Vertical)
                } else if halign && !valign {
                    Some(WritingMode::Horizontal)
                } else {
                    None
                };
                match mode {
                    Some(mode) => {
                        let mut started = LTTextLine::new(mode, laparams.word_margin);
                        started.add(obj0.clone());
                        started.add(obj1.clone());
                        line = Some(started);
                    }
                    None => {
                        let mut single =
                            LTTextLine::new(WritingMode::Horizontal, laparams.word_margin);
                        single.add(obj0.clone());
                        result.push(single);
                    }
                }
            }
        }
        obj0 = obj1;
    }

    let last = line.unwrap_or_else(|| {
        let mut single = LTTextLine::new(WritingMode::Horizontal, laparams.word_margin);
        single.add(obj0.clone());
        single
    });
    result.push(last);
    result
}

fn overlaps(a: Rect, b: &impl HasBBox) -> bool {
    !(b.x1() <= a.0 || a.2 <= b.x0() || b.y1() <= a.1 || a.3 <= b.y0())
}

/// Group text lines into boxes of aligned, closely stacked lines.
///
/// Each line pulls in every neighbor found within `line_margin` of it,
/// together with the box that neighbor already belongs to, so boxes merge
/// transitively. Boxes come out in the order of their first line.
pub fn group_textlines(laparams: &LAParams, lines: Vec<LTTextLine>) -> Vec<LTTextBox> {
    let n = lines.len();
    let mut line_to_box: Vec<Option<usize>> = vec![None; n];
    let mut box_members: Vec<Option<Vec<usize>>> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let (d, area) = line.search_area(laparams.line_margin);
        let mut members = vec![i];
        for (j, other) in lines.iter().enumerate() {
            if !overlaps(area, other) || !line.is_neighbor(other, d) {
                continue;
            }
            members.push(j);
            if let Some(existing) = line_to_box[j].and_then(|b| box_members[b].take()) {
                members.extend(existing);
            }
        }
        let mut seen = vec![false; n];
        members.retain(|&m| !std::mem::replace(&mut seen[m], true));

        let box_id = box_members.len();
        for &m in &members {
            line_to_box[m] = Some(box_id);
        }
        box_members.push(Some(members));
    }

    let mut slots: Vec<Option<LTTextLine>> = lines.into_iter().map(Some).collect();
    let mut boxes = Vec::new();
    let mut done = vec![false; box_members.len()];
    for i in 0..n {
        let Some(box_id) = line_to_box[i] else {
            continue;
        };
        if std::mem::replace(&mut done[box_id], true) {
            continue;
        }
        let Some(members) = box_members[box_id].take() else {
            continue;
        };
        let mode = slots[i]
            .as_ref()
            .map_or(WritingMode::Horizontal, LTTextLine::mode);
        let mut textbox = LTTextBox::new(mode);
        for m in members {
            if let Some(line) = slots[m].take() {
                textbox.add(line);
            }
        }
        if !textbox.lines().is_empty() && !(textbox.width() <= 0.0 || textbox.height() <= 0.0) {
            boxes.push(textbox);
        }
    }
    boxes
}
