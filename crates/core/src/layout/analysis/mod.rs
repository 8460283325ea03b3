//! Layout pass: characters into lines, lines into boxes, boxes into
//! reading order.

mod analyze;
mod clustering;
mod grouping;

pub use analyze::analyze_items;
pub use clustering::group_textboxes;
pub use grouping::{group_objects, group_textlines};
