//! Image description hook.
//!
//! Text extraction has no pixels to show for an image. A describer turns
//! an image into text (a caption, OCR output, a placeholder) which the text
//! converter writes inline where the image was painted.

use crate::error::Result;
use crate::layout::LTImage;

/// Produces inline text for an image.
///
/// Called synchronously from the worker that renders the page, so
/// implementations must be shareable across threads.
pub trait ImageDescriber: Send + Sync {
    fn describe(&self, image: &LTImage) -> Result<String>;
}

/// Describes every image by its name and source size.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderDescriber;

impl ImageDescriber for PlaceholderDescriber {
    fn describe(&self, image: &LTImage) -> Result<String> {
        let (w, h) = image.srcsize();
        Ok(format!(
            "[image {} {}x{}]",
            image.name(),
            w.unwrap_or(0),
            h.unwrap_or(0)
        ))
    }
}
